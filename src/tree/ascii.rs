//! ASCII syntax parser.
//!
//! ```text
//! ; comment
//! Objects:  {
//!     Geometry: 10, "Geometry::Cube", "Mesh" {
//!         Vertices: *6 {
//!             a: 0,0,0,1,0,0
//!         }
//!     }
//! }
//! ```
//!
//! A `Name:` starts an element, comma-separated values follow, and an
//! optional `{ ... }` block holds the children. `*N` marks a packed array;
//! the numbers of its `a:` child are collapsed into a single array attribute.

use crate::errors::{FbxError, Result};
use crate::tree::{Attribute, Element, MAX_DEPTH};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Key(String),
    Word(String),
    Str(String),
    Int(i64),
    Float(f64),
    Count(usize),
    Comma,
    Open,
    Close,
}

fn syntax(line: usize, message: impl Into<String>) -> FbxError {
    FbxError::Syntax {
        line,
        message: message.into(),
    }
}

fn tokenize(text: &str) -> Result<Vec<(Token, usize)>> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                line += 1;
                i += 1;
            }
            b' ' | b'\t' | b'\r' => i += 1,
            b';' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b',' => {
                tokens.push((Token::Comma, line));
                i += 1;
            }
            b'{' => {
                tokens.push((Token::Open, line));
                i += 1;
            }
            b'}' => {
                tokens.push((Token::Close, line));
                i += 1;
            }
            b'"' => {
                let start = i + 1;
                let end = text[start..]
                    .find('"')
                    .map(|offset| start + offset)
                    .ok_or_else(|| syntax(line, "unterminated string"))?;
                let value = &text[start..end];
                tokens.push((Token::Str(value.to_string()), line));
                line += value.matches('\n').count();
                i = end + 1;
            }
            b'*' => {
                i += 1;
                let start = i;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                let count = text[start..i]
                    .parse::<usize>()
                    .map_err(|_| syntax(line, "expected an element count after '*'"))?;
                tokens.push((Token::Count(count), line));
            }
            b'0'..=b'9' | b'-' | b'+' | b'.' => {
                let start = i;
                i += 1;
                while i < bytes.len()
                    && matches!(bytes[i], b'0'..=b'9' | b'.' | b'e' | b'E' | b'-' | b'+')
                {
                    i += 1;
                }
                let literal = &text[start..i];
                let token = if let Ok(v) = literal.parse::<i64>() {
                    Token::Int(v)
                } else if let Ok(v) = literal.parse::<f64>() {
                    Token::Float(v)
                } else {
                    return Err(syntax(line, format!("invalid number '{literal}'")));
                };
                tokens.push((token, line));
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                let start = i;
                while i < bytes.len()
                    && (bytes[i].is_ascii_alphanumeric() || matches!(bytes[i], b'_' | b'|' | b'.'))
                {
                    i += 1;
                }
                let word = text[start..i].to_string();
                if i < bytes.len() && bytes[i] == b':' {
                    i += 1;
                    tokens.push((Token::Key(word), line));
                } else {
                    tokens.push((Token::Word(word), line));
                }
            }
            _ => {
                let c = text[i..].chars().next().unwrap_or('?');
                return Err(syntax(line, format!("unexpected character '{c}'")));
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        self.pos += 1;
        token
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos.min(self.tokens.len().saturating_sub(1)))
            .map_or(1, |(_, line)| *line)
    }

    fn element(&mut self, name: String, depth: usize) -> Result<Element> {
        if depth > MAX_DEPTH {
            return Err(syntax(self.line(), format!("'{name}' is nested deeper than {MAX_DEPTH} levels")));
        }
        let mut element = Element::new(name);
        let mut packed = false;

        // `Content: , "..."` style values start with a comma.
        if self.peek() == Some(&Token::Comma) {
            self.pos += 1;
        }

        loop {
            let attribute = match self.peek() {
                Some(Token::Str(s)) => Attribute::String(s.clone()),
                Some(Token::Word(w)) => Attribute::String(w.clone()),
                Some(Token::Int(v)) => Attribute::I64(*v),
                Some(Token::Float(v)) => Attribute::F64(*v),
                Some(Token::Count(_)) => {
                    self.pos += 1;
                    packed = true;
                    break;
                }
                _ => break,
            };
            self.pos += 1;
            element.attributes.push(attribute);

            if self.peek() == Some(&Token::Comma) {
                self.pos += 1;
            } else {
                break;
            }
        }

        if self.peek() == Some(&Token::Open) {
            self.pos += 1;
            loop {
                let line = self.line();
                match self.next() {
                    Some(Token::Close) => break,
                    Some(Token::Key(child)) => {
                        let child = self.element(child, depth + 1)?;
                        element.children.push(child);
                    }
                    Some(other) => {
                        return Err(syntax(line, format!("expected a node name or '}}', found {other:?}")));
                    }
                    None => {
                        return Err(syntax(
                            line,
                            format!("unexpected end of input, '{}' is not closed", element.name),
                        ));
                    }
                }
            }
        }

        if packed {
            for child in element.children.iter_mut().filter(|c| c.name == "a") {
                pack(child);
            }
        }

        Ok(element)
    }
}

/// Collapses the scalar numbers of an `a:` element into one typed array.
fn pack(element: &mut Element) {
    let attributes = &element.attributes;
    if attributes.is_empty() {
        return;
    }

    let mut ints = Vec::with_capacity(attributes.len());
    let mut floats = Vec::with_capacity(attributes.len());
    let mut all_ints = true;
    for attribute in attributes {
        match attribute {
            Attribute::I64(v) => {
                ints.push(*v);
                floats.push(*v as f64);
            }
            Attribute::F64(v) => {
                all_ints = false;
                floats.push(*v);
            }
            _ => return,
        }
    }

    let packed = if !all_ints {
        Attribute::F64Array(floats)
    } else if ints.iter().all(|&v| i32::try_from(v).is_ok()) {
        Attribute::I32Array(ints.into_iter().map(|v| v as i32).collect())
    } else {
        Attribute::I64Array(ints)
    };
    element.attributes = vec![packed];
}

/// Parses ASCII text into a nameless root element holding the top-level nodes.
pub fn parse(text: &str) -> Result<Element> {
    let mut parser = Parser {
        tokens: tokenize(text)?,
        pos: 0,
    };

    let mut root = Element::new("");
    loop {
        let line = parser.line();
        match parser.next() {
            None => break,
            Some(Token::Key(name)) => {
                let element = parser.element(name, 0)?;
                root.children.push(element);
            }
            Some(other) => {
                return Err(syntax(line, format!("expected a node name, found {other:?}")));
            }
        }
    }

    Ok(root)
}
