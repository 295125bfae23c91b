//! Literal encoding for query text.

use crate::config::SparqlConfig;
use crate::error::{CompileError, CompileResult};
use crate::ir::Literal;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

/// Characters escaped as `\\uXXXX` inside containment regexes
const REGEX_RESERVED: &[char] = &[
    '"', '^', '.', '\\', '?', '*', '+', '{', '}', '(', ')', '|', '$', '[', ']',
];

/// Renders literals the way the target grammar expects them
#[derive(Debug, Clone, Copy)]
pub struct LiteralEncoder<'a> {
    config: &'a SparqlConfig,
}

impl<'a> LiteralEncoder<'a> {
    pub fn new(config: &'a SparqlConfig) -> Self {
        Self { config }
    }

    /// Lexical form without quoting
    pub fn lexical(&self, literal: &Literal) -> String {
        match literal {
            Literal::String(s) => s.clone(),
            Literal::Integer(n) => n.to_string(),
            Literal::Float(n) => n.to_string(),
            Literal::Boolean(b) => b.to_string(),
            Literal::Date(date) => format_date(date),
            Literal::Entity(entity) => self.config.entity_urn(&entity.identity),
        }
    }

    /// Double-quoted string literal, e.g. `"Oslo"`
    pub fn quoted(&self, literal: &Literal) -> String {
        quote(&self.lexical(literal))
    }

    /// Angle-bracket resource reference; only entity references have one
    pub fn resource(&self, literal: &Literal) -> CompileResult<String> {
        match literal {
            Literal::Entity(entity) => {
                Ok(format!("<{}>", self.config.entity_urn(&entity.identity)))
            }
            other => Err(CompileError::unsupported(format!(
                "{other:?} is not an entity reference"
            ))),
        }
    }

    /// JSON form of the literal with regex-reserved characters escaped, for
    /// matching inside a stored JSON array
    pub fn json_fragment(&self, literal: &Literal) -> CompileResult<String> {
        let value = match literal {
            Literal::String(s) => Value::String(s.clone()),
            Literal::Integer(n) => Value::from(*n),
            Literal::Float(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .ok_or_else(|| CompileError::unsupported(format!("{n} has no JSON form")))?,
            Literal::Boolean(b) => Value::Bool(*b),
            Literal::Date(date) => Value::String(format_date(date)),
            Literal::Entity(entity) => Value::String(entity.identity.clone()),
        };
        let json = serde_json::to_string(&value)
            .map_err(|e| CompileError::unsupported(format!("cannot serialize {literal:?}: {e}")))?;
        Ok(escape_regex_reserved(&json))
    }
}

/// ISO-8601 in UTC with millisecond precision, e.g. `2024-03-01T12:00:00.000Z`
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Quote and escape text as a SPARQL double-quoted string
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn escape_regex_reserved(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if REGEX_RESERVED.contains(&c) {
            out.push_str(&format!("\\\\u{:04X}", c as u32));
        } else {
            out.push(c);
        }
    }
    out
}
