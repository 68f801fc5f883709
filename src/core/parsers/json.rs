//! Position-aware JSON parsing for locale files.
//!
//! `serde_json` gives us values but no token positions, and diagnostics must
//! point at the exact property key of an unused message. This module parses
//! locale text into a small span-carrying AST, converts it to a
//! `serde_json::Value` for the diff engine, and resolves dotted key paths back
//! to line/column positions.

use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::core::utils::{LineIndex, Position};

/// Nesting limit; deeper documents are rejected instead of overflowing the stack.
const MAX_DEPTH: usize = 512;

/// Byte range of a node in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub lo: usize,
    pub hi: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsonNode {
    Object(JsonObject),
    Array(JsonArray),
    Literal(JsonLiteral),
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonObject {
    pub properties: Vec<Property>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: Identifier,
    pub value: JsonNode,
    pub span: Span,
}

/// A property name. Always a string token in JSON, spanned including quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonArray {
    pub elements: Vec<JsonNode>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonLiteral {
    pub value: LiteralValue,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralValue {
    String(String),
    /// Raw number text, validated against the JSON grammar.
    Number(String),
    Bool(bool),
    Null,
}

impl JsonNode {
    pub fn span(&self) -> Span {
        match self {
            JsonNode::Object(o) => o.span,
            JsonNode::Array(a) => a.span,
            JsonNode::Literal(l) => l.span,
        }
    }

    /// Convert to a plain value tree. Duplicate keys keep the last value,
    /// matching `serde_json`.
    pub fn to_value(&self) -> Value {
        match self {
            JsonNode::Object(object) => {
                let mut map = Map::new();
                for property in &object.properties {
                    map.insert(property.key.name.clone(), property.value.to_value());
                }
                Value::Object(map)
            }
            JsonNode::Array(array) => {
                Value::Array(array.elements.iter().map(JsonNode::to_value).collect())
            }
            JsonNode::Literal(literal) => match &literal.value {
                LiteralValue::String(s) => Value::String(s.clone()),
                LiteralValue::Number(raw) => raw
                    .parse::<Number>()
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
                LiteralValue::Bool(b) => Value::Bool(*b),
                LiteralValue::Null => Value::Null,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at line {}, column {}", position.line, position.col)]
pub struct JsonSyntaxError {
    pub message: String,
    pub position: Position,
}

/// Which token of a matched property a lookup should point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateTarget {
    /// The property name (used by the unused-key rule).
    Key,
    /// The property value.
    Value,
}

/// A parsed locale file: source text, AST and line index.
#[derive(Debug)]
pub struct JsonDocument<'a> {
    pub ast: JsonNode,
    line_index: LineIndex<'a>,
}

impl<'a> JsonDocument<'a> {
    pub fn parse(text: &'a str) -> Result<Self, JsonSyntaxError> {
        let ast = parse_json_ast(text)?;
        Ok(Self {
            ast,
            line_index: LineIndex::new(text),
        })
    }

    pub fn to_value(&self) -> Value {
        self.ast.to_value()
    }

    /// Position of the token addressed by a dotted key path.
    ///
    /// Returns `None` when any segment cannot be matched.
    pub fn locate(&self, key_path: &str, target: LocateTarget) -> Option<Position> {
        let property = self.property(key_path)?;
        let span = match target {
            LocateTarget::Key => property.key.span,
            LocateTarget::Value => property.value.span(),
        };
        Some(self.line_index.position(span.lo))
    }

    /// The property addressed by a dotted key path.
    pub fn property(&self, key_path: &str) -> Option<&Property> {
        let JsonNode::Object(root) = &self.ast else {
            return None;
        };
        find_property(root, key_path)
    }

    /// Locate many paths at once, keeping input order and skipping misses.
    pub fn locate_all<'p, I>(&self, key_paths: I, target: LocateTarget) -> Vec<(&'p str, Position)>
    where
        I: IntoIterator<Item = &'p str>,
    {
        key_paths
            .into_iter()
            .filter_map(|path| self.locate(path, target).map(|pos| (path, pos)))
            .collect()
    }
}

/// Walk `object` one key at a time. A property name containing dots is matched
/// against the joined remaining segments.
fn find_property<'n>(object: &'n JsonObject, key_path: &str) -> Option<&'n Property> {
    for property in &object.properties {
        let name = property.key.name.as_str();
        if key_path == name {
            return Some(property);
        }
        if let Some(rest) = key_path
            .strip_prefix(name)
            .and_then(|r| r.strip_prefix('.'))
            && let JsonNode::Object(child) = &property.value
            && let Some(found) = find_property(child, rest)
        {
            return Some(found);
        }
    }
    None
}

/// Parse JSON text into a span-carrying AST.
pub fn parse_json_ast(text: &str) -> Result<JsonNode, JsonSyntaxError> {
    let mut parser = JsonParser::new(text);
    parser.skip_bom();
    parser.skip_ws();
    let node = parser.parse_value(0)?;
    parser.skip_ws();
    if parser.pos < parser.bytes.len() {
        return Err(parser.error("unexpected trailing characters"));
    }
    Ok(node)
}

struct JsonParser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> JsonParser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> JsonSyntaxError {
        JsonSyntaxError {
            message: message.into(),
            position: LineIndex::new(self.text).position(self.pos),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_bom(&mut self) {
        if self.text.starts_with('\u{feff}') {
            self.pos = '\u{feff}'.len_utf8();
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\n' | b'\r' | b'\t')) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), JsonSyntaxError> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(&format!("expected '{}'", byte as char)))
        }
    }

    fn unexpected(&self, expected: &str) -> JsonSyntaxError {
        match self.text[self.pos..].chars().next() {
            Some(c) => self.error(format!("{}, found '{}'", expected, c)),
            None => self.error(format!("{}, found end of input", expected)),
        }
    }

    fn parse_value(&mut self, depth: usize) -> Result<JsonNode, JsonSyntaxError> {
        if depth > MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        match self.peek() {
            Some(b'{') => self.parse_object(depth).map(JsonNode::Object),
            Some(b'[') => self.parse_array(depth).map(JsonNode::Array),
            Some(b'"') => {
                let lo = self.pos;
                let s = self.parse_string()?;
                Ok(self.literal(LiteralValue::String(s), lo))
            }
            Some(b't') => self.parse_keyword("true", LiteralValue::Bool(true)),
            Some(b'f') => self.parse_keyword("false", LiteralValue::Bool(false)),
            Some(b'n') => self.parse_keyword("null", LiteralValue::Null),
            Some(b'-' | b'0'..=b'9') => {
                let lo = self.pos;
                self.parse_number()?;
                let raw = self.text[lo..self.pos].to_string();
                Ok(self.literal(LiteralValue::Number(raw), lo))
            }
            _ => Err(self.unexpected("expected a value")),
        }
    }

    fn literal(&self, value: LiteralValue, lo: usize) -> JsonNode {
        JsonNode::Literal(JsonLiteral {
            value,
            span: Span { lo, hi: self.pos },
        })
    }

    fn parse_keyword(
        &mut self,
        word: &str,
        value: LiteralValue,
    ) -> Result<JsonNode, JsonSyntaxError> {
        let lo = self.pos;
        if self.text[self.pos..].starts_with(word) {
            self.pos += word.len();
            Ok(self.literal(value, lo))
        } else {
            Err(self.unexpected("expected a value"))
        }
    }

    fn parse_object(&mut self, depth: usize) -> Result<JsonObject, JsonSyntaxError> {
        let lo = self.pos;
        self.expect(b'{')?;
        let mut properties = Vec::new();
        self.skip_ws();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(JsonObject {
                properties,
                span: Span { lo, hi: self.pos },
            });
        }
        loop {
            self.skip_ws();
            if self.peek() != Some(b'"') {
                return Err(self.unexpected("expected a property name"));
            }
            let key_lo = self.pos;
            let name = self.parse_string()?;
            let key = Identifier {
                name,
                span: Span {
                    lo: key_lo,
                    hi: self.pos,
                },
            };
            self.skip_ws();
            self.expect(b':')?;
            self.skip_ws();
            let value = self.parse_value(depth + 1)?;
            properties.push(Property {
                key,
                value,
                span: Span {
                    lo: key_lo,
                    hi: self.pos,
                },
            });
            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.unexpected("expected ',' or '}'")),
            }
        }
        Ok(JsonObject {
            properties,
            span: Span { lo, hi: self.pos },
        })
    }

    fn parse_array(&mut self, depth: usize) -> Result<JsonArray, JsonSyntaxError> {
        let lo = self.pos;
        self.expect(b'[')?;
        let mut elements = Vec::new();
        self.skip_ws();
        if self.peek() == Some(b']') {
            self.pos += 1;
            return Ok(JsonArray {
                elements,
                span: Span { lo, hi: self.pos },
            });
        }
        loop {
            self.skip_ws();
            elements.push(self.parse_value(depth + 1)?);
            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.unexpected("expected ',' or ']'")),
            }
        }
        Ok(JsonArray {
            elements,
            span: Span { lo, hi: self.pos },
        })
    }

    fn parse_string(&mut self) -> Result<String, JsonSyntaxError> {
        self.expect(b'"')?;
        let mut out = String::new();
        let mut run_start = self.pos;
        loop {
            let Some(byte) = self.peek() else {
                return Err(self.error("unterminated string"));
            };
            match byte {
                b'"' => {
                    out.push_str(&self.text[run_start..self.pos]);
                    self.pos += 1;
                    return Ok(out);
                }
                b'\\' => {
                    out.push_str(&self.text[run_start..self.pos]);
                    self.pos += 1;
                    self.parse_escape(&mut out)?;
                    run_start = self.pos;
                }
                0x00..=0x1f => return Err(self.error("control character in string")),
                _ => self.pos += 1,
            }
        }
    }

    fn parse_escape(&mut self, out: &mut String) -> Result<(), JsonSyntaxError> {
        let Some(byte) = self.peek() else {
            return Err(self.error("unterminated escape sequence"));
        };
        self.pos += 1;
        match byte {
            b'"' => out.push('"'),
            b'\\' => out.push('\\'),
            b'/' => out.push('/'),
            b'b' => out.push('\u{0008}'),
            b'f' => out.push('\u{000C}'),
            b'n' => out.push('\n'),
            b'r' => out.push('\r'),
            b't' => out.push('\t'),
            b'u' => {
                let high = self.parse_hex4()?;
                let code = if (0xD800..0xDC00).contains(&high)
                    && self.text[self.pos..].starts_with("\\u")
                {
                    let saved = self.pos;
                    self.pos += 2;
                    let low = self.parse_hex4()?;
                    if (0xDC00..0xE000).contains(&low) {
                        0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
                    } else {
                        self.pos = saved;
                        high
                    }
                } else {
                    high
                };
                out.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
            }
            _ => {
                self.pos -= 1;
                return Err(self.unexpected("invalid escape"));
            }
        }
        Ok(())
    }

    fn parse_hex4(&mut self) -> Result<u32, JsonSyntaxError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .peek()
                .and_then(|b| (b as char).to_digit(16))
                .ok_or_else(|| self.unexpected("invalid unicode escape"))?;
            code = (code << 4) | digit;
            self.pos += 1;
        }
        Ok(code)
    }

    fn parse_number(&mut self) -> Result<(), JsonSyntaxError> {
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        match self.peek() {
            Some(b'0') => self.pos += 1,
            Some(b'1'..=b'9') => self.skip_digits(),
            _ => return Err(self.unexpected("invalid number")),
        }
        if self.peek() == Some(b'.') {
            self.pos += 1;
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.unexpected("invalid fraction"));
            }
            self.skip_digits();
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.unexpected("invalid exponent"));
            }
            self.skip_digits();
        }
        Ok(())
    }

    fn skip_digits(&mut self) {
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
    }
}
