//! Token bucket that spaces out competition-page navigations.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Token bucket rate limiter
#[derive(Clone)]
pub struct RateLimiter {
    state: Arc<Mutex<BucketState>>,
}

struct BucketState {
    tokens: f64,
    last_update: Instant,
    max_tokens: f64,
    refill_rate: f64, // tokens per second
    min_delay: Duration,
    max_delay: Duration,
}

impl RateLimiter {
    /// `requests_per_minute` bucket size, plus a jittered pause of
    /// `min_delay_secs..max_delay_secs` before every request
    pub fn new(requests_per_minute: u32, min_delay_secs: f64, max_delay_secs: f64) -> Self {
        let max_tokens = f64::from(requests_per_minute.max(1));
        let min_delay = Duration::from_secs_f64(min_delay_secs.max(0.0));
        let max_delay = Duration::from_secs_f64(max_delay_secs.max(0.0)).max(min_delay);

        Self {
            state: Arc::new(Mutex::new(BucketState {
                tokens: max_tokens,
                last_update: Instant::now(),
                max_tokens,
                refill_rate: max_tokens / 60.0,
                min_delay,
                max_delay,
            })),
        }
    }

    /// No waiting at all
    pub fn unlimited() -> Self {
        Self::new(u32::MAX, 0.0, 0.0)
    }

    /// Take a token, sleeping until one is available
    pub async fn acquire(&self) {
        let delay = {
            let mut state = self.state.lock().await;

            let now = Instant::now();
            let elapsed = now.duration_since(state.last_update).as_secs_f64();
            state.tokens = (state.tokens + elapsed * state.refill_rate).min(state.max_tokens);
            state.last_update = now;

            if state.tokens >= 1.0 {
                state.tokens -= 1.0;
                let spread = state.max_delay - state.min_delay;
                state.min_delay + spread.mul_f64(jitter())
            } else {
                let wait = (1.0 - state.tokens) / state.refill_rate;
                state.tokens = 0.0;
                Duration::from_secs_f64(wait) + state.min_delay
            }
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Pseudo-random factor in 0.0..1.0
fn jitter() -> f64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or_default();
    f64::from(nanos % 1000) / 1000.0
}
