//! Extraction of `attribute` declarations from GLSL source.
//!
//! Only top level declarations of the form `attribute <type> <name>;` are recognized.
//! The source does not need to be a valid shader.
use crate::VariableDeclaration;

const ATTRIBUTE_KEYWORD: &str = "attribute";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Code,
    LineComment,
    BlockComment,
}

/// Remove all `//` and `/* */` comments from `source`.
///
/// Block comments do not nest and may contain `//`.
/// The line terminator ending a line comment is kept.
/// An unterminated block comment extends to the end of the source.
pub fn strip_comments(source: &str) -> String {
    let bytes = source.as_bytes();
    let mut output = String::with_capacity(source.len());

    let mut state = ScanState::Code;
    // The start of code not yet copied to the output.
    let mut start = 0;
    let mut i = 0;

    // Comment delimiters are ASCII, so every index where the state changes is a char boundary.
    while i < bytes.len() {
        match state {
            ScanState::Code => {
                if bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'/') {
                    output.push_str(&source[start..i]);
                    state = ScanState::LineComment;
                    i += 2;
                } else if bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'*') {
                    output.push_str(&source[start..i]);
                    state = ScanState::BlockComment;
                    i += 2;
                } else {
                    i += 1;
                }
            }
            ScanState::LineComment => {
                if bytes[i] == b'\n' {
                    state = ScanState::Code;
                    start = i;
                }
                i += 1;
            }
            ScanState::BlockComment => {
                if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
                    state = ScanState::Code;
                    i += 2;
                    start = i;
                } else {
                    i += 1;
                }
            }
        }
    }

    if state == ScanState::Code {
        output.push_str(&source[start..]);
    }

    output
}

/// Find all `attribute` declarations in `source` in the order they are declared.
///
/// Declarations inside comments are ignored.
/// Whitespace between the keyword, type, name, and semicolon may include newlines.
/// Text that does not form a complete declaration is skipped.
/**
```rust
use glsl_vertex_layout::{extract_attributes, VariableDeclaration};

let attributes = extract_attributes("attribute vec3 a_Position; // attribute vec4 a_Color;");
assert_eq!(vec![VariableDeclaration::new("a_Position", "vec3")], attributes);
```
 */
pub fn extract_attributes(source: &str) -> Vec<VariableDeclaration> {
    let code = strip_comments(source);

    let mut attributes = Vec::new();
    let mut search_start = 0;
    for (position, _) in code.match_indices(ATTRIBUTE_KEYWORD) {
        // Skip keywords that are part of a declaration that was already found.
        if position < search_start {
            continue;
        }

        // Identifiers like "vertex_attribute" don't start a declaration.
        if code[..position].chars().next_back().is_some_and(is_word_char) {
            continue;
        }

        let declaration_start = position + ATTRIBUTE_KEYWORD.len();
        if let Some((attribute, length)) = parse_declaration(&code[declaration_start..]) {
            attributes.push(attribute);
            search_start = declaration_start + length;
        }
    }

    log::debug!("Found {} attribute declarations", attributes.len());
    attributes
}

// Parse the `<type> <name>;` following the keyword and return the length of the parsed text.
fn parse_declaration(text: &str) -> Option<(VariableDeclaration, usize)> {
    let after_keyword = required_whitespace(text)?;
    let (ty, after_type) = word(after_keyword)?;
    let after_type = required_whitespace(after_type)?;
    let (name, after_name) = word(after_type)?;
    let remaining = after_name.trim_start().strip_prefix(';')?;

    Some((VariableDeclaration::new(name, ty), text.len() - remaining.len()))
}

fn required_whitespace(text: &str) -> Option<&str> {
    let trimmed = text.trim_start();
    (trimmed.len() < text.len()).then_some(trimmed)
}

fn word(text: &str) -> Option<(&str, &str)> {
    let end = text
        .find(|c: char| !is_word_char(c))
        .unwrap_or(text.len());
    (end > 0).then(|| text.split_at(end))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
