// src/text.rs
// Markup/whitespace normalization for titles, snippets and fetched bodies.

/// Normalize text: decode HTML entities, strip tags, collapse whitespace,
/// trim, and cap the length.
pub fn clean_html(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize curly quotes to ASCII
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 5) Length cap: 4000 chars is plenty for classification input
    if out.chars().count() > 4000 {
        out = out.chars().take(4000).collect();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_entities() {
        let s = "<b>Hello&nbsp;world</b> &ldquo;ok&rdquo;";
        assert_eq!(clean_html(s), r#"Hello world "ok""#);
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(clean_html("  a\n\t b   c "), "a b c");
    }

    #[test]
    fn caps_length() {
        let long = "x".repeat(5000);
        assert_eq!(clean_html(&long).chars().count(), 4000);
    }
}
