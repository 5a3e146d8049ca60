//! Preview document composition.
//!
//! Builds the complete HTML document the preview frame displays and the
//! PDF export prints: sanitized body markup plus the active stylesheet
//! and a screen-only margin block, with the first H1 promoted to the
//! document title so the PDF header can reference it.

/// Applied on screen only; print output takes its margins from the PDF
/// format settings instead.
pub const SCREEN_CSS: &str = "\n@media screen {\n  body {\n    margin: 1em;\n  }\n}\n";

/// Wraps body markup into a full document.
pub fn compose_document(body_html: &str, title: Option<&str>, css: &str) -> String {
    let mut head = String::from("<meta charset=\"utf-8\">");

    if let Some(title) = title {
        head.push_str("<title>");
        head.push_str(&escape_html(title));
        head.push_str("</title>");
    }

    head.push_str("<style>");
    head.push_str(css);
    head.push_str(SCREEN_CSS);
    head.push_str("</style>");

    format!("<!DOCTYPE html><html><head>{head}</head><body>{body_html}</body></html>")
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Collects the CSS rules whose selector text contains `keyword`.
///
/// This is a best-effort convention: a rule participates in the PDF
/// header/footer when its selector mentions "header" or "footer"
/// anywhere, and the splitter below does not understand nested blocks.
pub fn extract_rules_containing(css: &str, keyword: &str) -> String {
    let mut matched = String::new();

    for rule in css.split('}') {
        let Some((selector, body)) = rule.split_once('{') else { continue };

        if selector.contains(keyword) {
            matched.push_str(selector.trim());
            matched.push_str(" { ");
            matched.push_str(body.trim());
            matched.push_str(" }\n");
        }
    }

    matched
}
