//! Markdown to HTML conversion.
//!
//! Thin wrapper over pulldown-cmark plus ammonia: parse with the GitHub
//! extensions enabled, render to HTML, sanitize the result. The output is
//! body markup only; document composition happens in the preview layer.

use pulldown_cmark::{html, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedMarkdown {
    /// Sanitized body HTML.
    pub html: String,
    /// Plain text of the first top-level heading, if any.
    pub title: Option<String>,
}

fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Converts Markdown source into sanitized HTML.
pub fn render(source: &str) -> RenderedMarkdown {
    let mut raw = String::new();
    html::push_html(&mut raw, Parser::new_ext(source, parser_options()));

    RenderedMarkdown { html: ammonia::clean(&raw), title: first_heading(source) }
}

/// Plain text of the first H1 in the source, used as the document title.
pub fn first_heading(source: &str) -> Option<String> {
    let mut in_heading = false;
    let mut text = String::new();

    for event in Parser::new_ext(source, parser_options()) {
        match event {
            Event::Start(Tag::Heading { level: HeadingLevel::H1, .. }) => in_heading = true,
            Event::End(TagEnd::Heading(HeadingLevel::H1)) => {
                let title = text.trim().to_owned();
                return if title.is_empty() { None } else { Some(title) };
            }
            Event::Text(chunk) | Event::Code(chunk) if in_heading => text.push_str(&chunk),
            _ => {}
        }
    }

    None
}

/// Number of headings of any level in the source.
pub fn heading_count(source: &str) -> usize {
    Parser::new_ext(source, parser_options())
        .filter(|event| matches!(event, Event::Start(Tag::Heading { .. })))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_basic_markup() {
        let rendered = render("# Title\n\nSome *emphasis* here.");

        assert!(rendered.html.contains("<h1>Title</h1>"));
        assert!(rendered.html.contains("<em>emphasis</em>"));
    }

    #[test]
    fn strips_script_elements() {
        let rendered = render("Hello <script>alert('boom')</script> world");

        assert!(!rendered.html.contains("<script"));
        assert!(rendered.html.contains("Hello"));
    }

    #[test]
    fn tables_are_enabled() {
        let rendered = render("| a | b |\n|---|---|\n| 1 | 2 |");

        assert!(rendered.html.contains("<table>"));
    }

    #[test]
    fn counts_headings_of_every_level() {
        assert_eq!(heading_count("# a\n\n## b\n\ntext\n\n### c"), 3);
        assert_eq!(heading_count("plain text"), 0);
    }

    #[test]
    fn title_comes_from_the_first_h1() {
        assert_eq!(render("intro\n\n# First\n\n# Second").title, Some("First".to_owned()));
        assert_eq!(render("## Only a subheading").title, None);
        assert_eq!(render("# `code` title").title, Some("code title".to_owned()));
    }
}
