//! Markdown metadata extraction
//!
//! A source document may start with a YAML frontmatter block:
//!
//! ```text
//! ---
//! title: Stocks
//! context: Long-term positions
//! order: 2
//! ---
//! # Notes
//! ```
//!
//! Without a frontmatter `context`, the first body paragraph that is not a
//! heading is used.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Frontmatter {
    title: Option<String>,
    context: Option<String>,
    order: Option<i64>,
}

/// Metadata extracted from one markdown document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkdownMeta {
    pub title: Option<String>,
    pub context: Option<String>,
    pub order: Option<i64>,
}

/// Parse markdown metadata. Errors describe a malformed frontmatter block.
pub fn parse_markdown(content: &str) -> Result<MarkdownMeta, String> {
    let content = content.trim_start_matches('\u{feff}');
    let (frontmatter, body) = split_frontmatter(content)?;

    let fm: Frontmatter = match frontmatter {
        Some(raw) if !raw.trim().is_empty() => {
            serde_yaml::from_str(raw).map_err(|e| format!("invalid frontmatter: {}", e))?
        }
        _ => Frontmatter::default(),
    };

    Ok(MarkdownMeta {
        title: fm.title,
        context: fm.context.or_else(|| first_paragraph(body)),
        order: fm.order,
    })
}

/// Returns `(frontmatter, body)`; frontmatter is None when the document has none.
fn split_frontmatter(content: &str) -> Result<(Option<&str>, &str), String> {
    let Some(rest) = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
    else {
        return Ok((None, content));
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            let body = &rest[offset + line.len()..];
            return Ok((Some(&rest[..offset]), body));
        }
        offset += line.len();
    }
    Err("unterminated frontmatter block".to_string())
}

fn first_paragraph(body: &str) -> Option<String> {
    let mut lines = Vec::new();
    for line in body.lines().map(str::trim) {
        let is_break = line.is_empty() || line.starts_with('#');
        if is_break {
            if !lines.is_empty() {
                break;
            }
            continue;
        }
        lines.push(line);
    }
    if lines.is_empty() {
        None
    } else {
        Some(lines.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_frontmatter_when_parsing_then_fields_extracted() {
        let input = "---\ntitle: Stocks\ncontext: Long-term\norder: 2\n---\n# Notes\nBody";
        let meta = parse_markdown(input).unwrap();
        assert_eq!(meta.title.as_deref(), Some("Stocks"));
        assert_eq!(meta.context.as_deref(), Some("Long-term"));
        assert_eq!(meta.order, Some(2));
    }

    #[test]
    fn given_no_frontmatter_when_parsing_then_first_paragraph_is_context() {
        let input = "# Heading\n\nFirst line\nsecond line\n\nOther paragraph\n";
        let meta = parse_markdown(input).unwrap();
        assert_eq!(meta.title, None);
        assert_eq!(meta.context.as_deref(), Some("First line second line"));
    }

    #[test]
    fn given_only_headings_when_parsing_then_no_context() {
        let meta = parse_markdown("# One\n## Two\n").unwrap();
        assert_eq!(meta.context, None);
    }

    #[test]
    fn given_bom_and_frontmatter_when_parsing_then_fields_extracted() {
        let meta = parse_markdown("\u{feff}---\ntitle: X\n---\n").unwrap();
        assert_eq!(meta.title.as_deref(), Some("X"));
    }

    #[test]
    fn given_unterminated_frontmatter_when_parsing_then_errors() {
        assert!(parse_markdown("---\ntitle: X\n").is_err());
    }

    #[test]
    fn given_invalid_yaml_when_parsing_then_errors() {
        assert!(parse_markdown("---\ntitle: [unclosed\n---\n").is_err());
    }
}
