//! Shared regular expressions for body and frontmatter inspection.

use regex::Regex;
use std::sync::LazyLock;

/// Markdown heading line; group 1 is the heading text.
pub static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,6}[ \t]+(.+?)[ \t#\r]*$").unwrap());

/// Inline markdown link or image; group 1 is the target.
pub static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!?\[[^\]]*\]\(\s*<?([^)\s>]+)>?(?:\s+[^)]*)?\)").unwrap());

/// URL scheme prefix such as `https:` or `mailto:`.
pub static URL_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*:").unwrap());

/// Relative path written with Windows separators, e.g. `scripts\run.py`.
pub static WINDOWS_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[\w.-]+(?:\\[\w.-]+)+\.\w+\b").unwrap());

/// XML or HTML tag.
pub static XML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[A-Za-z][\w.-]*(?:\s[^<>]*)?/?>").unwrap());

/// Heading texts of a markdown body, in order.
pub fn headings(body: &str) -> impl Iterator<Item = &str> {
    HEADING
        .captures_iter(body)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

/// True when some heading contains `needle`, ignoring case.
pub fn has_heading(body: &str, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    headings(body).any(|h| h.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings() {
        let body = "# Title\n\ntext\n\n## Examples ##\n#not a heading\n";
        let found: Vec<_> = headings(body).collect();
        assert_eq!(found, vec!["Title", "Examples"]);
        assert!(has_heading(body, "example"));
        assert!(!has_heading(body, "usage"));
    }

    #[test]
    fn test_markdown_link_targets() {
        let body = "See [reference](docs/reference.md) and ![chart](img/chart.png \"Chart\").";
        let targets: Vec<_> = MARKDOWN_LINK
            .captures_iter(body)
            .map(|c| c[1].to_string())
            .collect();
        assert_eq!(targets, vec!["docs/reference.md", "img/chart.png"]);
    }

    #[test]
    fn test_windows_path() {
        assert!(WINDOWS_PATH.is_match(r"run scripts\helper.py first"));
        assert!(!WINDOWS_PATH.is_match("run scripts/helper.py first"));
    }

    #[test]
    fn test_xml_tag() {
        assert!(XML_TAG.is_match("Reads <instructions> blocks"));
        assert!(!XML_TAG.is_match("Compares a < b and c > d"));
    }
}
