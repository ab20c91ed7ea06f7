//! Extraction of AWS resource blocks and their `tags` from Terraform source.
//!
//! Block headers are located with a regex, but block bodies are delimited by
//! a brace-depth [`Scanner`] which skips over quoted strings, template
//! interpolations and comments. Nested blocks inside a resource body
//! (`ingress { ... }`, `lifecycle { ... }`) therefore never truncate it.
//!
//! Heredoc strings are not recognised; braces and quotes inside them are
//! treated as code.

use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;

static RESOURCE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\Aresource\s+"(aws_[^"]*)"\s+"([^"]*)"\s*\{"#).expect("valid resource regex")
});

static TAGS_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\Atags\s*=\s*\{").expect("valid tags regex"));

static TAG_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:"([^"]*)"|([A-Za-z_][A-Za-z0-9_-]*))\s*[=:]\s*"((?:[^"\\]|\\.)*)""#)
        .expect("valid tag pair regex")
});

/// Tag key/value pairs of a single resource. Keys are unique; when a key is
/// repeated the last value wins.
pub type Tags = BTreeMap<String, String>;

/// An AWS `resource` declaration found in Terraform source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceBlock<'a> {
    /// The resource type, e.g. `aws_vpc`.
    pub kind: &'a str,
    /// The local name of the resource, e.g. `main`.
    pub name: &'a str,
    /// Everything between the opening and closing brace of the block.
    pub body: &'a str,
    /// 1-based line number of the `resource` keyword.
    pub line: usize,
}

impl ResourceBlock<'_> {
    /// Extracts the resource's own `tags = { ... }` attribute.
    ///
    /// Only a `tags` attribute at the top level of the body counts; the first
    /// one found is used. Returns `None` if there is no such attribute.
    #[must_use]
    pub fn tags(&self) -> Option<Tags> {
        let (open, close) = find_top_level(self.body, b't', &TAGS_HEADER)?;
        let block = &self.body[open + 1..close.unwrap_or(self.body.len())];
        Some(parse_tag_pairs(&strip_comments(block)))
    }
}

/// Finds every AWS resource block declared at the top level of `source`.
#[must_use]
pub fn extract_resources(source: &str) -> Vec<ResourceBlock<'_>> {
    let mut resources = Vec::new();
    let mut scanner = Scanner::new(source, 0);
    let mut depth = 0usize;

    while let Some(token) = scanner.next() {
        if !token.code {
            continue;
        }
        match token.byte {
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            b'r' if depth == 0 && starts_word(source, token.offset) => {
                let Some(captures) = RESOURCE_HEADER.captures(&source[token.offset..]) else {
                    continue;
                };
                let (Some(header), Some(kind), Some(name)) =
                    (captures.get(0), captures.get(1), captures.get(2))
                else {
                    continue;
                };

                let open = token.offset + header.end() - 1;
                let close = closing_brace(source, open);
                if close.is_none() {
                    tracing::debug!(
                        "Unterminated body for resource {}.{}",
                        kind.as_str(),
                        name.as_str()
                    );
                }
                let end = close.unwrap_or(source.len());

                resources.push(ResourceBlock {
                    kind: kind.as_str(),
                    name: name.as_str(),
                    body: &source[open + 1..end],
                    line: line_of(source, token.offset),
                });

                scanner = Scanner::new(source, end.saturating_add(1).min(source.len()));
            }
            _ => {}
        }
    }

    resources
}

/// Finds the first match of `header` starting at a top-level `first` byte in
/// `text`. Returns the offset of the header's trailing `{` and of its matching
/// `}`, if there is one.
fn find_top_level(text: &str, first: u8, header: &Regex) -> Option<(usize, Option<usize>)> {
    let mut depth = 0usize;
    for token in Scanner::new(text, 0).filter(|t| t.code) {
        match token.byte {
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            byte if byte == first && depth == 0 && starts_word(text, token.offset) => {
                if let Some(found) = header.find(&text[token.offset..]) {
                    let open = token.offset + found.end() - 1;
                    return Some((open, closing_brace(text, open)));
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_tag_pairs(block: &str) -> Tags {
    TAG_PAIR
        .captures_iter(block)
        .filter_map(|captures| {
            let key = captures.get(1).or_else(|| captures.get(2))?;
            let value = captures.get(3)?;
            Some((key.as_str().to_string(), value.as_str().to_string()))
        })
        .collect()
}

/// Returns the offset of the `}` matching the `{` at `open`.
fn closing_brace(source: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for token in Scanner::new(source, open).filter(|t| t.code) {
        match token.byte {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(token.offset);
                }
            }
            _ => {}
        }
    }
    None
}

fn strip_comments(text: &str) -> String {
    let bytes: Vec<u8> = Scanner::new(text, 0).map(|t| t.byte).collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

fn starts_word(source: &str, offset: usize) -> bool {
    let Some(previous) = offset.checked_sub(1).map(|i| source.as_bytes()[i]) else {
        return true;
    };
    !(previous.is_ascii_alphanumeric() || previous == b'_')
}

fn line_of(source: &str, offset: usize) -> usize {
    source[..offset].bytes().filter(|&b| b == b'\n').count() + 1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Code,
    Str,
    Escape,
    OpenInterpolation,
    LineComment,
    BlockComment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Brace,
    Interpolation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Token {
    offset: usize,
    byte: u8,
    /// `false` for bytes belonging to a quoted string or its delimiters.
    code: bool,
}

/// Walks HCL source byte by byte, dropping comments and marking which bytes
/// are string contents.
///
/// Interpolations (`${ ... }` and `%{ ... }`) switch back to code until their
/// closing brace, so strings nested inside an interpolation are handled.
struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
    mode: Mode,
    frames: Vec<Frame>,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str, start: usize) -> Self {
        Self {
            bytes: source.as_bytes(),
            pos: start,
            mode: Mode::Code,
            frames: Vec::new(),
        }
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }
}

impl Iterator for Scanner<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            let offset = self.pos;
            let byte = *self.bytes.get(offset)?;
            let next = self.peek(1);
            self.pos += 1;

            let code = match self.mode {
                Mode::LineComment => {
                    if byte != b'\n' {
                        continue;
                    }
                    self.mode = Mode::Code;
                    true
                }
                Mode::BlockComment => {
                    if byte == b'*' && next == Some(b'/') {
                        self.pos += 1;
                        self.mode = Mode::Code;
                    }
                    continue;
                }
                Mode::Escape => {
                    self.mode = Mode::Str;
                    false
                }
                Mode::OpenInterpolation => {
                    self.frames.push(Frame::Interpolation);
                    self.mode = Mode::Code;
                    false
                }
                Mode::Str => {
                    match (byte, next) {
                        (b'\\', _) => self.mode = Mode::Escape,
                        (b'"', _) => self.mode = Mode::Code,
                        (b'$' | b'%', Some(b'{')) => self.mode = Mode::OpenInterpolation,
                        _ => {}
                    }
                    false
                }
                Mode::Code => match (byte, next) {
                    (b'#', _) => {
                        self.mode = Mode::LineComment;
                        continue;
                    }
                    (b'/', Some(b'/')) => {
                        self.mode = Mode::LineComment;
                        continue;
                    }
                    (b'/', Some(b'*')) => {
                        self.pos += 1;
                        self.mode = Mode::BlockComment;
                        continue;
                    }
                    (b'"', _) => {
                        self.mode = Mode::Str;
                        false
                    }
                    (b'{', _) => {
                        self.frames.push(Frame::Brace);
                        true
                    }
                    (b'}', _) => {
                        if self.frames.pop() == Some(Frame::Interpolation) {
                            self.mode = Mode::Str;
                            false
                        } else {
                            true
                        }
                    }
                    _ => true,
                },
            };

            return Some(Token { offset, byte, code });
        }
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn extracts_single_line_resource() {
        let source = r#"resource "aws_vpc" "main" { tags = { "team"="infra" "component"="network" "service"="vpc-core" } }"#;

        let resources = extract_resources(source);

        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].kind, "aws_vpc");
        assert_eq!(resources[0].name, "main");
        assert_eq!(resources[0].line, 1);

        let tags = resources[0].tags().unwrap();
        assert_eq!(tags.get("team").map(String::as_str), Some("infra"));
        assert_eq!(tags.get("component").map(String::as_str), Some("network"));
        assert_eq!(tags.get("service").map(String::as_str), Some("vpc-core"));
    }

    #[test]
    fn nested_blocks_do_not_truncate_body() {
        let source = r#"
resource "aws_security_group" "web" {
  name = "web"

  ingress {
    from_port = 443
    to_port   = 443
  }

  tags = {
    team = "infra"
  }
}

resource "aws_eip" "nat" {}
"#;

        let resources = extract_resources(source);

        assert_eq!(resources.len(), 2);
        assert!(resources[0].body.contains("ingress"));
        assert!(resources[0].body.contains("tags"));
        assert_eq!(resources[0].line, 2);
        assert_eq!(
            resources[0].tags().unwrap().get("team").map(String::as_str),
            Some("infra")
        );
        assert_eq!(resources[1].kind, "aws_eip");
        assert_eq!(resources[1].line, 15);
        assert_eq!(resources[1].body, "");
    }

    #[test]
    fn braces_inside_strings_and_interpolations_are_ignored() {
        let source = r#"
resource "aws_iam_policy" "p" {
  description = "not a brace: }"
  name        = "${lookup(var.names, "p}")}-policy"
  tags = { team = "infra" }
}
"#;

        let resources = extract_resources(source);

        assert_eq!(resources.len(), 1);
        assert!(resources[0].tags().is_some());
    }

    #[test]
    fn commented_out_resources_are_skipped() {
        let source = r#"
# resource "aws_vpc" "old" {
// resource "aws_vpc" "older" {
/* resource "aws_vpc" "oldest" { */
resource "aws_vpc" "current" {}
"#;

        let names: Vec<_> = extract_resources(source).iter().map(|r| r.name).collect();

        assert_eq!(names, vec!["current"]);
    }

    #[test]
    fn non_aws_and_data_blocks_are_skipped() {
        let source = r#"
data "aws_vpc" "default" {}
resource "random_id" "suffix" {}
module "vpc" { resource = "aws_vpc" }
"#;

        assert!(extract_resources(source).is_empty());
    }

    #[test]
    fn unterminated_body_runs_to_end_of_file() {
        let source = "resource \"aws_vpc\" \"main\" {\n  cidr_block = \"10.0.0.0/16\"\n";

        let resources = extract_resources(source);

        assert_eq!(resources.len(), 1);
        assert!(resources[0].body.contains("cidr_block"));
    }

    #[test]
    fn nested_tags_are_not_the_resource_tags() {
        let source = r#"
resource "aws_instance" "app" {
  root_block_device {
    tags = { team = "storage" }
  }
}
"#;

        assert_eq!(extract_resources(source)[0].tags(), None);
    }

    #[test]
    fn tags_all_is_not_tags() {
        let source = r#"resource "aws_vpc" "main" { tags_all = { team = "infra" } }"#;

        assert_eq!(extract_resources(source)[0].tags(), None);
    }

    #[test]
    fn commented_pairs_are_ignored() {
        let source = r#"resource "aws_vpc" "main" {
  tags = {
    # team = "legacy"
    team = "infra" // owner
  }
}"#;

        let tags = extract_resources(source)[0].tags().unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags["team"], "infra");
    }

    #[test]
    fn last_duplicate_key_wins() {
        let source = r#"resource "aws_vpc" "main" { tags = { team = "a" team = "b" } }"#;

        assert_eq!(extract_resources(source)[0].tags().unwrap()["team"], "b");
    }

    #[test_case(r#""team" = "infra""#; "quoted key")]
    #[test_case(r#"team = "infra""#; "bare key")]
    #[test_case(r#""team"="infra""#; "no spaces")]
    #[test_case(r#"team: "infra""#; "colon separator")]
    fn tag_pair_syntaxes(pair: &str) {
        let tags = parse_tag_pairs(pair);
        assert_eq!(tags.get("team").map(String::as_str), Some("infra"));
    }

    #[test]
    fn non_literal_values_are_not_pairs() {
        let tags = parse_tag_pairs("team = var.team\nservice = local.service");
        assert!(tags.is_empty());
    }

    #[test]
    fn scanner_marks_string_bytes() {
        let code: String = Scanner::new(r#"a = "{" # }"#, 0)
            .filter(|t| t.code)
            .map(|t| char::from(t.byte))
            .collect();

        assert_eq!(code, "a =  ");
    }
}
