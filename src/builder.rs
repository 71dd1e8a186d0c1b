// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query Builder
//!
//! Compiles a raw query string into one engine query document.
//!
//! # Flow
//!
//! ```text
//! build(query)
//!       │
//!       ├─→ Tokenizer (keyword / range / free text / excluded)
//!       ├─→ quoted_texts (exact-phrase detection)
//!       │
//!       ├─→ must     = required filters + included field filters
//!       ├─→ must_not = excluded field filters
//!       │
//!       └─→ SearchMode::select
//!                ├─→ Keyword: {bool: {must + phrase clause, must_not}}
//!                ├─→ Vector:  {knn: {field: {vector, filter: {bool}}}}
//!                └─→ Hybrid:  {hybrid: {queries: [knn, bool + phrase clause]}}
//! ```
//!
//! Resolver calls happen first, in field declaration order; the embedder is
//! called at most once, and only when there is unquoted free text.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::{EntityConfig, VectorMode, VectorSearchConfig};
use crate::date_term::Clock;
use crate::dsl::{BoolFilter, Clause, HybridQuery, KnnQuery};
use crate::error::{BuildError, ConfigError};
use crate::filters::Filters;
use crate::hooks::Embedder;
use crate::metrics::{self, BuildTimer};
use crate::parser::{ParseOutcome, ParsedQuery, QueryParser, TokenGroup, Tokenizer};
use crate::quoted_text::quoted_texts;

/// How the final document is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchMode {
    /// Boolean filters, plus phrase matching when there is free text
    Keyword,
    /// knn search with the filters nested as pre-filter
    Vector,
    /// knn and keyword sub-queries side by side
    Hybrid,
}

/// Everything the mode decision depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeInputs {
    pub has_free_text: bool,
    pub quoted: bool,
    pub vector_configured: bool,
    pub hybrid_requested: bool,
}

impl SearchMode {
    /// Decision table over `(has_free_text, quoted, vector_configured, hybrid_requested)`.
    pub fn select(inputs: ModeInputs) -> Self {
        let ModeInputs {
            has_free_text,
            quoted,
            vector_configured,
            hybrid_requested,
        } = inputs;

        match (has_free_text, quoted, vector_configured, hybrid_requested) {
            (true, false, true, true) => SearchMode::Hybrid,
            (true, false, true, false) => SearchMode::Vector,
            // no free text, quoted phrase, or no vector search
            _ => SearchMode::Keyword,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Keyword => "keyword",
            SearchMode::Vector => "vector",
            SearchMode::Hybrid => "hybrid",
        }
    }
}

/// Output of [`QueryBuilder::build`].
#[derive(Debug, Clone)]
pub struct BuildResponse {
    /// Document to send to the engine
    pub query: Clause,
    /// Tokenizer output, absent when the query was bare free text
    pub parsed_query: Option<ParsedQuery>,
    /// Assembly mode that produced `query`
    pub mode: SearchMode,
}

/// Free text to search for, and whether the user quoted it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct FreeText {
    text: String,
    quoted: bool,
}

impl FreeText {
    fn extract(query: &str, outcome: &ParseOutcome) -> Self {
        let quoted = quoted_texts(query);
        if !quoted.is_empty() {
            return Self {
                text: quoted.join(" "),
                quoted: true,
            };
        }

        let text = match outcome {
            ParseOutcome::Text(text) => text.clone(),
            ParseOutcome::Structured(parsed) => parsed.free_text().unwrap_or_default().to_string(),
        };
        Self {
            text,
            quoted: false,
        }
    }

    fn is_present(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Compiles query strings for one [`EntityConfig`].
///
/// Holds no per-call state; one instance can serve concurrent builds.
///
/// # Example
///
/// ```rust
/// use search_query_dsl::{EntityConfig, FieldConfig, QueryBuilder};
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = EntityConfig::new(["title", "description"])
///     .field("tag", FieldConfig::term("tags").and());
/// let builder = QueryBuilder::new(config)?;
///
/// let response = builder.build("tag:pain -tag:negative").await?;
/// assert_eq!(
///     response.query.to_json(),
///     json!({
///         "bool": {
///             "must": [{ "term": { "tags": "pain" } }],
///             "must_not": [{ "term": { "tags": "negative" } }]
///         }
///     })
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct QueryBuilder {
    config: EntityConfig,
    keyword_fields: Vec<String>,
    range_fields: Vec<String>,
    tokenizer: Arc<dyn Tokenizer>,
    filters: Filters,
}

impl QueryBuilder {
    /// Validate `config` and create a builder using the default tokenizer
    /// and the wall clock.
    pub fn new(config: EntityConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            keyword_fields: config.keyword_fields(),
            range_fields: config.range_fields(),
            config,
            tokenizer: Arc::new(QueryParser::new()),
            filters: Filters::default(),
        })
    }

    /// Replace the tokenizer.
    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    /// Replace the clock used for `now`-based date terms.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.filters = Filters::new(clock);
        self
    }

    pub fn config(&self) -> &EntityConfig {
        &self.config
    }

    /// Compile `query` into an engine document.
    ///
    /// Malformed tokens only drop their filter. Errors come exclusively from
    /// failing resolver or embedder hooks and are returned unchanged.
    #[tracing::instrument(skip(self), fields(mode = tracing::field::Empty))]
    pub async fn build(&self, query: &str) -> Result<BuildResponse, BuildError> {
        let _timer = BuildTimer::new();

        let outcome = self
            .tokenizer
            .tokenize(query, &self.keyword_fields, &self.range_fields);

        let mut filter = BoolFilter {
            must: self.required_filters(),
            must_not: Vec::new(),
        };
        if let ParseOutcome::Structured(parsed) = &outcome {
            filter.must.extend(self.create_filters(&parsed.include).await?);
            filter.must_not.extend(self.create_filters(&parsed.exclude).await?);
        }

        let free_text = FreeText::extract(query, &outcome);
        let vector = self.vector_search();
        let mode = SearchMode::select(ModeInputs {
            has_free_text: free_text.is_present(),
            quoted: free_text.quoted,
            vector_configured: vector.is_some(),
            hybrid_requested: vector.is_some_and(|(config, _)| config.mode == VectorMode::Hybrid),
        });
        tracing::Span::current().record("mode", mode.as_str());

        let traditional = free_text
            .is_present()
            .then(|| self.traditional_clause(&free_text.text));

        debug!(
            mode = mode.as_str(),
            must = filter.must.len(),
            must_not = filter.must_not.len(),
            quoted = free_text.quoted,
            "Assembling query"
        );

        let document = match (mode, vector, traditional) {
            (SearchMode::Vector, Some((config, embedder)), _) => {
                let knn = Self::knn(config, embedder, &free_text.text, filter).await?;
                Clause::Knn(knn)
            }
            (SearchMode::Hybrid, Some((config, embedder)), Some(traditional)) => {
                let mut keyword = filter.clone();
                keyword.must.push(traditional);
                let knn = Self::knn(config, embedder, &free_text.text, filter).await?;
                Clause::Hybrid(HybridQuery {
                    vector: knn,
                    keyword,
                })
            }
            (_, _, traditional) => {
                filter.must.extend(traditional);
                Clause::Bool(filter)
            }
        };

        metrics::record_build(mode.as_str());

        Ok(BuildResponse {
            query: document,
            parsed_query: match outcome {
                ParseOutcome::Structured(parsed) => Some(parsed),
                ParseOutcome::Text(_) => None,
            },
            mode,
        })
    }

    fn required_filters(&self) -> Vec<Clause> {
        self.config
            .required_filters
            .iter()
            .map(|(field, value)| Clause::term(field, value))
            .collect()
    }

    /// Compile every configured field present in `group`, in declaration order.
    async fn create_filters(&self, group: &TokenGroup) -> Result<Vec<Clause>, BuildError> {
        for key in group.fields().filter(|key| !self.config.fields.contains_key(*key)) {
            debug!(field = %key, "Ignoring token for unconfigured field");
            metrics::record_dropped_filter("unknown_field");
        }

        let mut clauses = Vec::new();
        for (key, field) in &self.config.fields {
            if let Some(values) = group.values(key) {
                clauses.extend(self.filters.create(key, field, values).await?);
            }
        }
        Ok(clauses)
    }

    /// Phrase match on every traditional search field, any of which may match.
    fn traditional_clause(&self, text: &str) -> Clause {
        Clause::any_of(
            self.config
                .traditional_search
                .fields
                .iter()
                .map(|field| Clause::match_phrase(field, text))
                .collect(),
        )
    }

    fn vector_search(&self) -> Option<(&VectorSearchConfig, &Arc<dyn Embedder>)> {
        let config = self.config.vector_search.as_ref()?;
        let embedder = config.embedder.as_ref()?;
        Some((config, embedder))
    }

    async fn knn(
        config: &VectorSearchConfig,
        embedder: &Arc<dyn Embedder>,
        text: &str,
        filter: BoolFilter,
    ) -> Result<KnnQuery, BuildError> {
        let vector = match embedder.embed(text).await {
            Ok(vector) => {
                metrics::record_hook_call("embedder", true);
                vector
            }
            Err(e) => {
                metrics::record_hook_call("embedder", false);
                warn!(field = %config.embedding_field, error = %e, "Embedding generation failed");
                return Err(BuildError::Embedding(e));
            }
        };

        Ok(KnnQuery {
            field: config.embedding_field.clone(),
            vector,
            k: config.k,
            max_distance: config.max_distance,
            min_score: config.min_score,
            filter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(
        has_free_text: bool,
        quoted: bool,
        vector_configured: bool,
        hybrid_requested: bool,
    ) -> ModeInputs {
        ModeInputs {
            has_free_text,
            quoted,
            vector_configured,
            hybrid_requested,
        }
    }

    #[test]
    fn test_mode_decision_table() {
        let table = [
            // (free text, quoted, vector, hybrid) -> mode
            ((false, false, false, false), SearchMode::Keyword),
            ((false, false, false, true), SearchMode::Keyword),
            ((false, false, true, false), SearchMode::Keyword),
            ((false, false, true, true), SearchMode::Keyword),
            ((false, true, false, false), SearchMode::Keyword),
            ((false, true, false, true), SearchMode::Keyword),
            ((false, true, true, false), SearchMode::Keyword),
            ((false, true, true, true), SearchMode::Keyword),
            ((true, false, false, false), SearchMode::Keyword),
            ((true, false, false, true), SearchMode::Keyword),
            ((true, false, true, false), SearchMode::Vector),
            ((true, false, true, true), SearchMode::Hybrid),
            ((true, true, false, false), SearchMode::Keyword),
            ((true, true, false, true), SearchMode::Keyword),
            ((true, true, true, false), SearchMode::Keyword),
            ((true, true, true, true), SearchMode::Keyword),
        ];

        for ((free, quoted, vector, hybrid), expected) in table {
            assert_eq!(
                SearchMode::select(inputs(free, quoted, vector, hybrid)),
                expected,
                "inputs ({free}, {quoted}, {vector}, {hybrid})"
            );
        }
    }

    #[test]
    fn test_free_text_prefers_quoted_phrases() {
        let query = r#""exact phrase" loose words tag:x"#;
        let outcome = QueryParser::new().tokenize(query, &["tag".to_string()], &[]);
        let free = FreeText::extract(query, &outcome);
        assert_eq!(
            free,
            FreeText {
                text: "exact phrase".into(),
                quoted: true
            }
        );
    }

    #[test]
    fn test_free_text_from_bare_string() {
        let outcome = ParseOutcome::Text("hello world".into());
        let free = FreeText::extract("hello world", &outcome);
        assert_eq!(free.text, "hello world");
        assert!(!free.quoted);
        assert!(free.is_present());
    }

    #[test]
    fn test_whitespace_only_free_text_is_absent() {
        let free = FreeText::extract("   ", &ParseOutcome::Text("   ".into()));
        assert!(!free.is_present());
    }

    #[test]
    fn test_builder_exposes_validated_config() {
        let config = EntityConfig::new(["title"])
            .field("tag", crate::config::FieldConfig::term("tags"))
            .field("date", crate::config::FieldConfig::range("createdAt"));
        let builder = QueryBuilder::new(config).unwrap();

        assert_eq!(builder.config().traditional_search.fields, vec!["title"]);
        assert_eq!(builder.keyword_fields, vec!["tag"]);
        assert_eq!(builder.range_fields, vec!["date"]);
    }

    #[test]
    fn test_mode_labels() {
        assert_eq!(SearchMode::Keyword.as_str(), "keyword");
        assert_eq!(SearchMode::Vector.as_str(), "vector");
        assert_eq!(SearchMode::Hybrid.as_str(), "hybrid");
    }
}
