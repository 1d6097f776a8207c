//! JSON with a leading `//` comment banner
//!
//! App files start with a few human-readable lines telling people not to edit
//! them by hand. Readers skip the banner and parse the rest as plain JSON.

use serde::Serialize;
use serde::de::DeserializeOwned;

const COMMENT_PREFIX: &str = "//";

/// Render `value` as pretty JSON preceded by one `// ` line per banner entry.
pub fn write<T: Serialize>(value: &T, banner: &[&str]) -> serde_json::Result<String> {
    let body = serde_json::to_string_pretty(value)?;

    let mut out = String::with_capacity(body.len() + banner.len() * 64);
    for line in banner {
        out.push_str(COMMENT_PREFIX);
        out.push(' ');
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&body);
    out.push('\n');
    Ok(out)
}

/// Drop the leading banner (comment and blank lines) and return the JSON body.
#[must_use]
pub fn strip(text: &str) -> &str {
    let mut rest = text;
    loop {
        let (line, tail) = rest.split_once('\n').unwrap_or((rest, ""));
        let trimmed = line.trim_start();
        if (trimmed.is_empty() && !tail.is_empty()) || trimmed.starts_with(COMMENT_PREFIX) {
            rest = tail;
        } else {
            return rest;
        }
    }
}

/// Strip the banner and deserialize the remaining JSON.
pub fn parse<T: DeserializeOwned>(text: &str) -> serde_json::Result<T> {
    serde_json::from_str(strip(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Doc {
        name: String,
    }

    #[test]
    fn test_banner_lines_come_first() {
        let text = write(
            &Doc {
                name: "billing".to_string(),
            },
            &["generated", "do not edit"],
        )
        .unwrap();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("// generated"));
        assert_eq!(lines.next(), Some("// do not edit"));
        assert_eq!(lines.next(), Some("{"));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_parse_ignores_banner() {
        let text = "// one\n// two\n\n{\"name\": \"billing\"}\n";
        let doc: Doc = parse(text).unwrap();
        assert_eq!(doc.name, "billing");
    }

    #[test]
    fn test_parse_without_banner() {
        let doc: Doc = parse("{\"name\": \"plain\"}").unwrap();
        assert_eq!(doc.name, "plain");
    }

    #[test]
    fn test_comment_like_values_are_not_stripped() {
        let text = write(
            &Doc {
                name: "// not a comment".to_string(),
            },
            &["banner"],
        )
        .unwrap();

        let doc: Doc = parse(&text).unwrap();
        assert_eq!(doc.name, "// not a comment");
    }

    #[test]
    fn test_only_banner_is_empty_body() {
        assert_eq!(strip("// just a banner"), "");
        assert!(parse::<Doc>("// just a banner\n").is_err());
    }
}
