// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Clause AST for the engine's query DSL.
//!
//! # Example
//!
//! ```rust
//! use search_query_dsl::dsl::{BoolFilter, Clause};
//!
//! let filter = BoolFilter::new()
//!     .must(Clause::term("tags", "pain"))
//!     .must(Clause::any_of(vec![
//!         Clause::match_phrase("title", "text"),
//!         Clause::match_phrase("description", "text"),
//!     ]))
//!     .must_not(Clause::term("tags", "negative"));
//!
//! let query = Clause::Bool(filter);
//! assert_eq!(query.to_json()["bool"]["must_not"][0]["term"]["tags"], "negative");
//! ```

use serde::{Serialize, Serializer};

use super::translator::OpenSearchTranslator;

/// One node of the query DSL.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Exact term: `{term: {field: value}}`
    Term { field: String, value: String },
    /// Inclusive range: `{range: {field: {gte, lte}}}`
    Range { field: String, gte: String, lte: String },
    /// Analyzed match: `{match: {field: value}}`
    Match { field: String, value: String },
    /// Phrase match for free text: `{match_phrase: {field: text}}`
    MatchPhrase { field: String, text: String },
    /// Disjunction: `{bool: {should: [...], minimum_should_match: 1}}`
    AnyOf(Vec<Clause>),
    /// Conjunction with negation: `{bool: {must: [...], must_not: [...]}}`
    Bool(BoolFilter),
    /// Vector search with nested pre-filter
    Knn(KnnQuery),
    /// Vector + keyword sub-queries: `{hybrid: {queries: [knn, bool]}}`
    Hybrid(HybridQuery),
}

impl Clause {
    pub fn term(field: impl Into<String>, value: impl Into<String>) -> Self {
        Clause::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn range(field: impl Into<String>, gte: impl Into<String>, lte: impl Into<String>) -> Self {
        Clause::Range {
            field: field.into(),
            gte: gte.into(),
            lte: lte.into(),
        }
    }

    pub fn match_text(field: impl Into<String>, value: impl Into<String>) -> Self {
        Clause::Match {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn match_phrase(field: impl Into<String>, text: impl Into<String>) -> Self {
        Clause::MatchPhrase {
            field: field.into(),
            text: text.into(),
        }
    }

    /// At least one of `clauses` must match.
    pub fn any_of(clauses: Vec<Clause>) -> Self {
        Clause::AnyOf(clauses)
    }

    /// Render as the engine's JSON DSL.
    pub fn to_json(&self) -> serde_json::Value {
        OpenSearchTranslator::translate(self)
    }

    pub fn as_bool(&self) -> Option<&BoolFilter> {
        match self {
            Clause::Bool(filter) => Some(filter),
            _ => None,
        }
    }

    pub fn as_knn(&self) -> Option<&KnnQuery> {
        match self {
            Clause::Knn(knn) => Some(knn),
            _ => None,
        }
    }

    pub fn as_hybrid(&self) -> Option<&HybridQuery> {
        match self {
            Clause::Hybrid(hybrid) => Some(hybrid),
            _ => None,
        }
    }
}

impl Serialize for Clause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Boolean filter document. Position in `must` is conjunctive; clauses in
/// `must_not` are negated by placement alone.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoolFilter {
    pub must: Vec<Clause>,
    pub must_not: Vec<Clause>,
}

impl BoolFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn must(mut self, clause: Clause) -> Self {
        self.must.push(clause);
        self
    }

    pub fn must_not(mut self, clause: Clause) -> Self {
        self.must_not.push(clause);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.must_not.is_empty()
    }
}

/// knn clause on one embedding field.
///
/// Exactly one of `k`, `max_distance`, `min_score` is expected to be set;
/// unset options are omitted from the rendered JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct KnnQuery {
    /// Embedding field name
    pub field: String,
    /// Query embedding
    pub vector: Vec<f64>,
    /// Top-K neighbours
    pub k: Option<usize>,
    /// Radial search: maximum distance
    pub max_distance: Option<f64>,
    /// Radial search: minimum score
    pub min_score: Option<f64>,
    /// Pre-filter applied before the similarity search
    pub filter: BoolFilter,
}

/// Hybrid search: a vector query and a keyword query run side by side.
/// The vector query always comes first.
#[derive(Debug, Clone, PartialEq)]
pub struct HybridQuery {
    pub vector: KnnQuery,
    pub keyword: BoolFilter,
}
