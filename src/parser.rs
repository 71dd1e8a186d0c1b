// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query string tokenizer.
//!
//! Splits a raw query string into keyword values, range pairs, free text and
//! their negated (`-field:value`) counterparts. The compiler only depends on
//! the [`Tokenizer`] trait; [`QueryParser`] is the default implementation.
//!
//! # Syntax
//!
//! ```text
//! tag:pain                  - keyword value
//! tag:pain,gain             - several values for one keyword
//! title:"Feature request"   - quoted keyword value (kept whole)
//! date:now_sub_2w-now       - range (split at the first '-')
//! -tag:negative             - excluded keyword value
//! "exact phrase"            - free text (quotes stripped)
//! anything else             - free text
//! ```
//!
//! A query without any `:` is returned untouched as [`ParseOutcome::Text`].

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Raw token values for one field, as handed to the filter compilers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValues {
    /// Keyword values in query order
    List(Vec<String>),
    /// Range endpoints
    Range(RangeValue),
}

impl FieldValues {
    /// Apply `f` to every keyword value. Ranges pass through unchanged.
    pub fn map_list(self, f: impl Fn(String) -> String) -> Self {
        match self {
            FieldValues::List(values) => FieldValues::List(values.into_iter().map(f).collect()),
            range => range,
        }
    }

    /// Apply `f` to both range endpoints. Lists pass through unchanged.
    pub fn map_range(self, f: impl Fn(String) -> String) -> Self {
        match self {
            FieldValues::Range(RangeValue { from, to }) => FieldValues::Range(RangeValue {
                from: f(from),
                to: f(to),
            }),
            list => list,
        }
    }
}

/// `{from, to}` pair of a range token. A missing endpoint is empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RangeValue {
    pub from: String,
    pub to: String,
}

impl RangeValue {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Tokens of one polarity (included or excluded).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TokenGroup {
    /// Keyword field -> values
    #[serde(flatten)]
    pub keywords: IndexMap<String, Vec<String>>,
    /// Range field -> endpoints
    #[serde(flatten)]
    pub ranges: IndexMap<String, RangeValue>,
    /// Free text, at most one joined entry
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub text: Vec<String>,
}

impl TokenGroup {
    /// Values captured for `field`, whichever group it was tokenized into.
    pub fn values(&self, field: &str) -> Option<FieldValues> {
        if let Some(values) = self.keywords.get(field) {
            return Some(FieldValues::List(values.clone()));
        }
        self.ranges.get(field).cloned().map(FieldValues::Range)
    }

    /// Field names present in this group, keywords first.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.keywords.keys().chain(self.ranges.keys()).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && self.ranges.is_empty() && self.text.is_empty()
    }
}

/// Structured tokenizer output.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ParsedQuery {
    #[serde(flatten)]
    pub include: TokenGroup,
    #[serde(skip_serializing_if = "TokenGroup::is_empty")]
    pub exclude: TokenGroup,
}

impl ParsedQuery {
    /// First free-text entry, if any.
    pub fn free_text(&self) -> Option<&str> {
        self.include.text.first().map(String::as_str)
    }
}

/// Result of tokenizing a query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// No structured tokens present; the whole query is free text
    Text(String),
    Structured(ParsedQuery),
}

/// Splits a query string into field tokens and free text.
pub trait Tokenizer: Send + Sync {
    /// `keywords` are the list-valued fields, `ranges` the `{from, to}` fields.
    fn tokenize(&self, query: &str, keywords: &[String], ranges: &[String]) -> ParseOutcome;
}

/// Default [`Tokenizer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryParser;

static TERM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\S+:"(?:[^"\\]|\\.)*"|-?"(?:[^"\\]|\\.)*"|\S+"#).expect("valid term regex")
});

impl QueryParser {
    pub fn new() -> Self {
        Self
    }

    /// Strip one pair of surrounding double quotes and unescape `\"`.
    /// Returns whether the value was quoted.
    fn unquote(value: &str) -> (String, bool) {
        if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
            (value[1..value.len() - 1].replace("\\\"", "\""), true)
        } else {
            (value.to_string(), false)
        }
    }
}

impl Tokenizer for QueryParser {
    fn tokenize(&self, query: &str, keywords: &[String], ranges: &[String]) -> ParseOutcome {
        if !query.contains(':') || (keywords.is_empty() && ranges.is_empty()) {
            return ParseOutcome::Text(query.to_string());
        }

        let mut parsed = ParsedQuery::default();
        let mut include_text = Vec::new();
        let mut exclude_text = Vec::new();

        for m in TERM_RE.find_iter(query) {
            let raw = m.as_str();
            let (negated, term) = match raw.strip_prefix('-') {
                Some(rest) if !rest.is_empty() => (true, rest),
                _ => (false, raw),
            };
            let (group, text) = if negated {
                (&mut parsed.exclude, &mut exclude_text)
            } else {
                (&mut parsed.include, &mut include_text)
            };

            if let Some((key, value)) = term.split_once(':') {
                if keywords.iter().any(|k| k == key) {
                    let (value, quoted) = Self::unquote(value);
                    let values = group.keywords.entry(key.to_string()).or_default();
                    if quoted {
                        values.push(value);
                    } else {
                        values.extend(value.split(',').filter(|v| !v.is_empty()).map(str::to_string));
                    }
                    continue;
                }
                if ranges.iter().any(|r| r == key) {
                    let (value, _) = Self::unquote(value);
                    let range = match value.split_once('-') {
                        Some((from, to)) => RangeValue::new(from, to),
                        None => RangeValue::new(value, ""),
                    };
                    group.ranges.insert(key.to_string(), range);
                    continue;
                }
            }

            let (value, _) = Self::unquote(term);
            if !value.is_empty() {
                text.push(value);
            }
        }

        if !include_text.is_empty() {
            parsed.include.text.push(include_text.join(" "));
        }
        if !exclude_text.is_empty() {
            parsed.exclude.text.push(exclude_text.join(" "));
        }

        ParseOutcome::Structured(parsed)
    }
}
