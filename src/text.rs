use scraper::Html;

/// Elements whose text never renders as page copy.
const HIDDEN_ELEMENTS: &[&str] = &["head", "script", "style", "noscript", "template"];

/// Flatten rendered markup to its visible text: each text node trimmed,
/// empty nodes dropped, the rest joined with single spaces in document order.
pub fn flatten_html(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut parts: Vec<&str> = Vec::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            parts.push(trimmed);
        }
    }

    parts.join(" ")
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_nodes_with_single_spaces() {
        let html = "<html><body><h1>  Blue Cash  </h1>\n<p>3%<sup>¤</sup>\n</p><span>CASH BACK</span></body></html>";
        assert_eq!(flatten_html(html), "Blue Cash 3% ¤ CASH BACK");
    }

    #[test]
    fn skips_scripts_styles_and_head() {
        let html = r#"<html><head><title>Card</title><style>p { color: red }</style></head>
            <body><script>window.__STATE__ = {"pct": "9% CASH BACK On Nothing"};</script>
            <noscript>Enable JavaScript</noscript><p>Visible</p></body></html>"#;
        assert_eq!(flatten_html(html), "Visible");
    }

    #[test]
    fn decodes_entities() {
        assert_eq!(
            flatten_html("<p>Rates &amp; Fees</p><p>U.S.&nbsp;Gas</p>"),
            "Rates & Fees U.S.\u{a0}Gas"
        );
    }

    #[test]
    fn empty_document_is_empty_text() {
        assert_eq!(flatten_html(""), "");
    }

    #[test]
    fn fixture_page_flattens_to_reward_copy() {
        let html = std::fs::read_to_string("tests/fixtures/blue_cash_everyday.html").unwrap();
        let text = flatten_html(&html);
        assert!(text.starts_with("Blue Cash Everyday® Card"));
        assert!(text.contains("3% ¤ CASH BACK On U.S. Supermarkets ‡ on up to $6,000"));
        assert!(!text.contains("dataLayer"));
        assert!(text.ends_with("Terms Apply."));
    }
}
