//! DOM queries over rendered HTML.

use scraper::{ElementRef, Html, Selector};

use super::browser::DomNode;
use crate::error::ScrapeError;

/// Text of an element with runs of whitespace collapsed to one space
fn collapsed_text(elem: &ElementRef<'_>) -> String {
    elem.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// All elements matching `selector`, in document order
pub fn query_all(html: &str, selector: &str) -> Result<Vec<DomNode>, ScrapeError> {
    let selector = Selector::parse(selector)
        .map_err(|e| ScrapeError::Browser(format!("invalid selector {selector:?}: {e}")))?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&selector)
        .map(|elem| DomNode {
            tag_name: elem.value().name().to_ascii_uppercase(),
            text: collapsed_text(&elem),
            href: elem.value().attr("href").map(str::to_string),
        })
        .collect())
}

/// Document `<title>`
pub fn title(html: &str) -> Option<String> {
    first_text(html, "title")
}

/// First `h1` or `h2`
pub fn first_heading(html: &str) -> Option<String> {
    first_text(html, "h1, h2")
}

fn first_text(html: &str, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let document = Html::parse_document(html);
    document
        .select(&selector)
        .map(|elem| collapsed_text(&elem))
        .find(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>U13 Division 2 | Play Rugby League</title></head>
<body>
<h2>Draw</h2>
<h1>U13 Division 2</h1>
<ul>
    <li>Round 1
        <span>Macquarie</span> v <span>Dudley Redhead</span></li>
    <li><a href="/match-centre/88123">Match centre</a></li>
</ul>
</body>
</html>"#;

    #[test]
    fn test_query_all_collapses_text() {
        let nodes = query_all(SAMPLE_HTML, "li").unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].tag_name, "LI");
        assert_eq!(nodes[0].text, "Round 1 Macquarie v Dudley Redhead");
        assert_eq!(nodes[0].href, None);
    }

    #[test]
    fn test_query_all_links() {
        let nodes = query_all(SAMPLE_HTML, "a[href*='/match-centre/']").unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].href.as_deref(), Some("/match-centre/88123"));
    }

    #[test]
    fn test_title_and_heading() {
        assert_eq!(
            title(SAMPLE_HTML).as_deref(),
            Some("U13 Division 2 | Play Rugby League")
        );
        // document order, h2 comes first here
        assert_eq!(first_heading(SAMPLE_HTML).as_deref(), Some("Draw"));
    }

    #[test]
    fn test_empty_html() {
        assert!(query_all("<html></html>", "div").unwrap().is_empty());
        assert_eq!(title("<html></html>"), None);
        assert_eq!(first_heading(""), None);
    }

    #[test]
    fn test_invalid_selector() {
        assert!(query_all(SAMPLE_HTML, "li[").is_err());
    }
}
