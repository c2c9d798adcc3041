// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! JSDoc blocks and their tags.
//!
//! swc keeps comments out of the tree, keyed by the position of the token
//! they precede. [`leading_js_doc`] reads the `/** ... */` blocks in front of
//! a node and parses their tags.

use swc_common::comments::{Comment, CommentKind, Comments};
use swc_common::BytePos;

/// A tag inside a JSDoc block, e.g. `@internal` or `@param x the value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsDocTag {
    pub tag_name: String,
    pub comment: Option<String>,
}

/// A `/** ... */` comment attached to the declaration that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsDoc {
    /// The comment exactly as written, delimiters included.
    pub text: String,
    /// Free text before the first tag.
    pub comment: Option<String>,
    pub tags: Vec<JsDocTag>,
}

impl JsDoc {
    /// Parse a swc comment, or `None` when it is not a JSDoc block.
    ///
    /// swc stores block comments without their delimiters, so a JSDoc block
    /// is one whose text starts with the second `*`.
    pub fn from_comment(comment: &Comment) -> Option<Self> {
        if comment.kind != CommentKind::Block {
            return None;
        }
        let text: &str = comment.text.as_ref();
        if !text.starts_with('*') || text == "*" {
            return None;
        }
        Some(JsDoc::parse(&format!("/*{}*/", text)))
    }

    /// Parse a raw `/** ... */` comment.
    pub fn parse(raw: &str) -> Self {
        let inner = raw
            .strip_prefix("/**")
            .unwrap_or(raw)
            .strip_suffix("*/")
            .unwrap_or_else(|| raw.strip_prefix("/**").unwrap_or(raw));

        let mut comment_lines: Vec<String> = Vec::new();
        let mut tags: Vec<JsDocTag> = Vec::new();
        let mut current: Option<(String, Vec<String>)> = None;

        for line in inner.lines() {
            let line = line.trim_start();
            let line = line.strip_prefix('*').unwrap_or(line).trim();

            for (index, word) in split_tag_boundaries(line).into_iter().enumerate() {
                if let Some(rest) = word.strip_prefix('@') {
                    let name_len = rest
                        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
                        .unwrap_or(rest.len());
                    if name_len > 0 {
                        if let Some((name, text)) = current.take() {
                            tags.push(finish_tag(name, text));
                        }
                        let name = rest[..name_len].to_string();
                        let text = rest[name_len..].trim().to_string();
                        current = Some((name, vec![text]));
                        continue;
                    }
                }
                match current.as_mut() {
                    Some((_, text)) => {
                        if index == 0 {
                            text.push(word.to_string());
                        } else if let Some(last) = text.last_mut() {
                            last.push(' ');
                            last.push_str(word);
                        }
                    }
                    None => comment_lines.push(word.to_string()),
                }
            }
        }
        if let Some((name, text)) = current.take() {
            tags.push(finish_tag(name, text));
        }

        let comment = join_nonempty(&comment_lines);
        JsDoc {
            text: raw.to_string(),
            comment,
            tags,
        }
    }

    /// Returns true if any tag has the given name.
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|tag| tag.tag_name == name)
    }
}

/// Split a line at `@` characters that start a tag (start of line or after
/// whitespace). Text before the first tag comes back as its own piece.
fn split_tag_boundaries(line: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let bytes = line.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'@' && i > start && bytes[i - 1].is_ascii_whitespace() {
            pieces.push(line[start..i].trim_end());
            start = i;
        }
    }
    pieces.push(&line[start..]);
    pieces
}

fn finish_tag(name: String, text: Vec<String>) -> JsDocTag {
    JsDocTag {
        tag_name: name,
        comment: join_nonempty(&text),
    }
}

fn join_nonempty(lines: &[String]) -> Option<String> {
    let joined = lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

/// JSDoc blocks among the comments leading the token at `pos`.
pub fn leading_js_doc(comments: &dyn Comments, pos: BytePos) -> Vec<JsDoc> {
    comments
        .get_leading(pos)
        .unwrap_or_default()
        .iter()
        .filter_map(JsDoc::from_comment)
        .collect()
}
