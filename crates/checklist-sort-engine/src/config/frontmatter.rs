use serde_yaml::Value;

use super::{DocumentMetadata, FRONTMATTER_KEY};
use crate::buffer::LineBuffer;

/// Per-document override read from a leading YAML front-matter block.
///
/// ```text
/// ---
/// sort-checklist: false
/// ---
/// ```
///
/// A missing or malformed block, or a value that is not a YAML boolean, is
/// treated as no override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Frontmatter {
    sort_override: Option<bool>,
}

impl Frontmatter {
    /// Read the block starting at line 0, if the document has one.
    pub fn from_buffer<B: LineBuffer + ?Sized>(buffer: &B) -> Self {
        match block_text(buffer) {
            Some(yaml) => Self::parse(&yaml),
            None => Self::default(),
        }
    }

    /// Parse the YAML between the delimiters.
    pub fn parse(yaml: &str) -> Self {
        let value: Value = match serde_yaml::from_str(yaml) {
            Ok(value) => value,
            Err(e) => {
                log::debug!("ignoring unparseable front matter: {e}");
                return Self::default();
            }
        };

        let sort_override = match value.get(FRONTMATTER_KEY) {
            Some(Value::Bool(enabled)) => Some(*enabled),
            Some(other) => {
                log::debug!("ignoring non-boolean {FRONTMATTER_KEY} value: {other:?}");
                None
            }
            None => None,
        };

        Self { sort_override }
    }
}

impl DocumentMetadata for Frontmatter {
    fn sort_override(&self) -> Option<bool> {
        self.sort_override
    }
}

fn is_delimiter(line: &str, closing: bool) -> bool {
    let trimmed = line.trim_end();
    trimmed == "---" || (closing && trimmed == "...")
}

/// Lines between an opening `---` on line 0 and the next `---`/`...`.
fn block_text<B: LineBuffer + ?Sized>(buffer: &B) -> Option<String> {
    let first = buffer.line(0).ok()?;
    if !is_delimiter(&first, false) {
        return None;
    }

    let mut body = Vec::new();
    for index in 1..buffer.line_count() {
        let line = buffer.line(index).ok()?;
        if is_delimiter(&line, true) {
            return Some(body.join("\n"));
        }
        body.push(line.trim_end_matches('\r').to_string());
    }

    log::debug!("front matter block is never closed");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::RopeBuffer;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("---\nsort-checklist: true\n---\n- [ ] a", Some(true))]
    #[case("---\ntitle: Groceries\nsort-checklist: false\n...\n- [ ] a", Some(false))]
    #[case("---\r\nsort-checklist: false\r\n---\r\n", Some(false))]
    #[case("---\ntitle: Groceries\n---\n- [ ] a", None)]
    #[case("- [ ] no front matter", None)]
    #[case("\n---\nsort-checklist: true\n---", None)]
    fn test_from_buffer(#[case] text: &str, #[case] expected: Option<bool>) {
        let frontmatter = Frontmatter::from_buffer(&RopeBuffer::from(text));
        assert_eq!(frontmatter.sort_override(), expected);
    }

    #[rstest]
    #[case("sort-checklist: \"true\"")]
    #[case("sort-checklist: 1")]
    #[case("sort-checklist: [true]")]
    #[case("sort-checklist:")]
    fn test_non_boolean_values_are_absent(#[case] yaml: &str) {
        assert_eq!(Frontmatter::parse(yaml).sort_override(), None);
    }

    #[test]
    fn test_unclosed_block_is_absent() {
        let buffer = RopeBuffer::from("---\nsort-checklist: true\n- [ ] a");
        assert_eq!(Frontmatter::from_buffer(&buffer).sort_override(), None);
    }

    #[test]
    fn test_invalid_yaml_is_absent() {
        assert_eq!(Frontmatter::parse("sort-checklist: [unclosed").sort_override(), None);
    }

    #[test]
    fn test_empty_block_is_absent() {
        let buffer = RopeBuffer::from("---\n---\n- [ ] a");
        assert_eq!(Frontmatter::from_buffer(&buffer).sort_override(), None);
    }
}
