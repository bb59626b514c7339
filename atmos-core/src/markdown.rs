//! The two ways transcript text reaches HTML.
//!
//! Bot and server text is trusted and goes through the markdown renderer
//! (inline HTML included). User text is never parsed: it is escaped and
//! shows up exactly as typed.

use pulldown_cmark::{Options, Parser, html};

/// Render trusted markdown to an HTML fragment.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Escape untrusted text so it renders literally inside an element.
pub fn escape_text(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

/// Escape text for use inside a double-quoted attribute value.
pub fn escape_attr(text: &str) -> String {
    html_escape::encode_double_quoted_attribute(text).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_markdown_emphasis_and_lists() {
        let html = to_html("**Sunny** skies\n\n- light wind\n- dry");

        assert!(html.contains("<strong>Sunny</strong>"));
        assert!(html.contains("<li>light wind</li>"));
    }

    #[test]
    fn inline_html_passes_through_for_trusted_text() {
        let html = to_html("line one<br>line two");
        assert!(html.contains("<br>"));
    }

    #[test]
    fn escape_keeps_markup_literal() {
        let escaped = escape_text("<b>bold</b> & 'quotes'");

        assert!(!escaped.contains("<b>"));
        assert!(escaped.contains("&lt;b&gt;bold&lt;/b&gt;"));
        assert!(escaped.contains("&amp;"));
    }

    #[test]
    fn escape_attr_handles_quotes() {
        assert_eq!(escape_attr(r#"a"b"#), "a&quot;b");
    }
}
