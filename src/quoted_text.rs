// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Quoted free-text extraction.
//!
//! The tokenizer strips quotes, yet a quoted phrase means "match this
//! exactly", which overrides vector search. This module recovers the quoted
//! phrases from the raw query string. Quoted field values such as
//! `title:"Feature request"` are skipped.

use regex::Regex;
use std::sync::LazyLock;

// Group 1 marks a `word:` prefix; such matches are field values.
static QUOTED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z0-9_]:)?"((?:[^"\\]|\\.)*)""#).expect("valid quoted text regex")
});

/// Quoted free-text phrases in query order, with `\"` unescaped.
/// Empty phrases are dropped.
pub fn quoted_texts(query: &str) -> Vec<String> {
    QUOTED_RE
        .captures_iter(query)
        .filter(|caps| caps.get(1).is_none())
        .filter_map(|caps| caps.get(2))
        .map(|m| m.as_str().replace("\\\"", "\""))
        .filter(|text| !text.is_empty())
        .collect()
}
