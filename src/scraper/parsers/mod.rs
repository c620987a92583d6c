//! Text parsers for fixture/result blocks.

pub mod dates;
pub mod game;

pub use game::{GameParser, PageContext};
