// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Entity configuration for the query builder.
//!
//! # Example
//!
//! ```
//! use search_query_dsl::{EntityConfig, FieldConfig, LogicalConnect};
//!
//! // Fluent construction
//! let config = EntityConfig::new(["title", "description"])
//!     .field("tag", FieldConfig::term("tags").and())
//!     .field("date", FieldConfig::range("createdAt"))
//!     .field("title", FieldConfig::text("title"))
//!     .required_filter("tenant", "acme");
//!
//! // Same thing from JSON (hooks are attached afterwards)
//! let loaded = EntityConfig::from_json(r#"{
//!     "fields": {
//!         "tag": { "type": "term", "index_field": "tags", "logical_connect": "AND" },
//!         "date": { "type": "range", "index_field": "createdAt" },
//!         "title": { "type": "text", "index_field": "title" }
//!     },
//!     "traditional_search": { "fields": ["title", "description"] },
//!     "required_filters": { "tenant": "acme" }
//! }"#).unwrap();
//!
//! assert_eq!(loaded.fields["tag"].logical_connect, LogicalConnect::And);
//! assert_eq!(loaded.fields.len(), config.fields.len());
//! ```

use indexmap::IndexMap;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::hooks::{Embedder, ValueDecoder, ValueResolver};

/// Field keys the tokenizer uses for its own output.
pub const RESERVED_FIELD_KEYS: &[&str] = &["text", "exclude"];

/// Which filter compiler handles a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Exact term match, list-valued
    Term,
    /// Date range, `{from, to}` valued
    Range,
    /// Analyzed match, list-valued
    Text,
}

/// How several values of one field combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalConnect {
    /// Every value must match
    And,
    /// Any value may match
    #[default]
    Or,
}

/// Per-field compilation settings.
#[derive(Clone, Deserialize)]
pub struct FieldConfig {
    /// Filter compiler for this field
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Destination field in the engine's document schema
    pub index_field: String,

    /// Value combination (default: OR)
    #[serde(default)]
    pub logical_connect: LogicalConnect,

    /// Expands shorthand values (term fields)
    #[serde(skip)]
    pub resolver: Option<Arc<dyn ValueResolver>>,

    /// Transforms raw values before compilation
    #[serde(skip)]
    pub decoder: Option<ValueDecoder>,
}

impl FieldConfig {
    fn new(field_type: FieldType, index_field: impl Into<String>) -> Self {
        Self {
            field_type,
            index_field: index_field.into(),
            logical_connect: LogicalConnect::default(),
            resolver: None,
            decoder: None,
        }
    }

    pub fn term(index_field: impl Into<String>) -> Self {
        Self::new(FieldType::Term, index_field)
    }

    pub fn range(index_field: impl Into<String>) -> Self {
        Self::new(FieldType::Range, index_field)
    }

    pub fn text(index_field: impl Into<String>) -> Self {
        Self::new(FieldType::Text, index_field)
    }

    /// Require every value
    pub fn and(mut self) -> Self {
        self.logical_connect = LogicalConnect::And;
        self
    }

    /// Accept any value
    pub fn or(mut self) -> Self {
        self.logical_connect = LogicalConnect::Or;
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn ValueResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn with_decoder(mut self, decoder: ValueDecoder) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// Range fields are tokenized as `{from, to}`, everything else as value lists.
    pub fn is_range(&self) -> bool {
        self.field_type == FieldType::Range
    }
}

impl fmt::Debug for FieldConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldConfig")
            .field("field_type", &self.field_type)
            .field("index_field", &self.index_field)
            .field("logical_connect", &self.logical_connect)
            .field("resolver", &self.resolver.is_some())
            .field("decoder", &self.decoder.is_some())
            .finish()
    }
}

/// Fields searched with phrase matching for free text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TraditionalSearch {
    #[serde(default)]
    pub fields: Vec<String>,
}

/// Whether vector search replaces or complements keyword search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorMode {
    /// knn query replaces the keyword query
    #[default]
    Vector,
    /// knn and keyword queries run side by side
    Hybrid,
}

/// knn search settings.
#[derive(Clone, Deserialize)]
pub struct VectorSearchConfig {
    /// Embedding field in the index
    pub embedding_field: String,

    /// Top-K neighbours
    #[serde(default)]
    pub k: Option<usize>,

    /// Radial search: include all points within this distance
    #[serde(default)]
    pub max_distance: Option<f64>,

    /// Score threshold: include all points scoring at least this
    #[serde(default)]
    pub min_score: Option<f64>,

    #[serde(default)]
    pub mode: VectorMode,

    /// Produces the query embedding
    #[serde(skip)]
    pub embedder: Option<Arc<dyn Embedder>>,
}

impl VectorSearchConfig {
    pub fn new(embedding_field: impl Into<String>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedding_field: embedding_field.into(),
            k: None,
            max_distance: None,
            min_score: None,
            mode: VectorMode::default(),
            embedder: Some(embedder),
        }
    }

    pub fn k(mut self, k: usize) -> Self {
        self.k = Some(k);
        self
    }

    pub fn max_distance(mut self, max_distance: f64) -> Self {
        self.max_distance = Some(max_distance);
        self
    }

    pub fn min_score(mut self, min_score: f64) -> Self {
        self.min_score = Some(min_score);
        self
    }

    pub fn hybrid(mut self) -> Self {
        self.mode = VectorMode::Hybrid;
        self
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.embedder.is_none() {
            return Err(ConfigError::MissingEmbedder(self.embedding_field.clone()));
        }
        let limits = [
            self.k.is_some(),
            self.max_distance.is_some(),
            self.min_score.is_some(),
        ];
        if limits.iter().filter(|set| **set).count() > 1 {
            return Err(ConfigError::ConflictingVectorLimits);
        }
        Ok(())
    }
}

impl fmt::Debug for VectorSearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorSearchConfig")
            .field("embedding_field", &self.embedding_field)
            .field("k", &self.k)
            .field("max_distance", &self.max_distance)
            .field("min_score", &self.min_score)
            .field("mode", &self.mode)
            .field("embedder", &self.embedder.is_some())
            .finish()
    }
}

/// Everything one [`QueryBuilder`](crate::QueryBuilder) needs.
///
/// Field order is significant: filters are emitted, and resolvers called,
/// in the order fields are declared here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntityConfig {
    /// Query keyword -> field settings
    #[serde(default)]
    pub fields: IndexMap<String, FieldConfig>,

    /// Free-text phrase search
    #[serde(default)]
    pub traditional_search: TraditionalSearch,

    /// Optional knn / hybrid search
    #[serde(default)]
    pub vector_search: Option<VectorSearchConfig>,

    /// Index field -> value, injected into every query (e.g. tenant scoping)
    #[serde(default)]
    pub required_filters: IndexMap<String, String>,
}

impl EntityConfig {
    /// Config with the given free-text phrase fields and nothing else.
    pub fn new<I, S>(traditional_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            traditional_search: TraditionalSearch {
                fields: traditional_fields.into_iter().map(Into::into).collect(),
            },
            ..Default::default()
        }
    }

    /// Load from JSON. Hooks must be attached afterwards.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn field(mut self, key: impl Into<String>, config: FieldConfig) -> Self {
        self.fields.insert(key.into(), config);
        self
    }

    pub fn vector_search(mut self, vector: VectorSearchConfig) -> Self {
        self.vector_search = Some(vector);
        self
    }

    pub fn required_filter(mut self, index_field: impl Into<String>, value: impl Into<String>) -> Self {
        self.required_filters.insert(index_field.into(), value.into());
        self
    }

    /// Attach a resolver to an already declared field. Unknown keys are ignored.
    pub fn with_resolver(mut self, key: &str, resolver: Arc<dyn ValueResolver>) -> Self {
        if let Some(field) = self.fields.get_mut(key) {
            field.resolver = Some(resolver);
        }
        self
    }

    /// Attach a decoder to an already declared field. Unknown keys are ignored.
    pub fn with_decoder(mut self, key: &str, decoder: ValueDecoder) -> Self {
        if let Some(field) = self.fields.get_mut(key) {
            field.decoder = Some(decoder);
        }
        self
    }

    /// Attach the embedder to a loaded vector search section.
    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        if let Some(vector) = self.vector_search.as_mut() {
            vector.embedder = Some(embedder);
        }
        self
    }

    /// Keys tokenized as value lists, in declaration order.
    pub fn keyword_fields(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|(_, field)| !field.is_range())
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Keys tokenized as `{from, to}`, in declaration order.
    pub fn range_fields(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|(_, field)| field.is_range())
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for key in self.fields.keys() {
            if RESERVED_FIELD_KEYS.contains(&key.as_str()) {
                return Err(ConfigError::ReservedFieldKey(key.clone()));
            }
            if key.is_empty()
                || key.starts_with('-')
                || key.contains(':')
                || key.contains(char::is_whitespace)
            {
                return Err(ConfigError::InvalidFieldKey(key.clone()));
            }
        }
        if let Some(vector) = &self.vector_search {
            vector.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{decoder_fn, embedder_fn};

    fn embedder() -> Arc<dyn Embedder> {
        embedder_fn(|_text: String| async move { Ok(vec![0.0]) })
    }

    #[test]
    fn test_defaults() {
        let field = FieldConfig::term("tags");
        assert_eq!(field.logical_connect, LogicalConnect::Or);
        assert!(field.resolver.is_none());
        assert!(field.decoder.is_none());

        let vector = VectorSearchConfig::new("embedding", embedder());
        assert_eq!(vector.mode, VectorMode::Vector);
        assert_eq!(vector.k, None);
    }

    #[test]
    fn test_connector_builders() {
        assert_eq!(FieldConfig::term("tags").and().logical_connect, LogicalConnect::And);
        assert_eq!(FieldConfig::term("tags").and().or().logical_connect, LogicalConnect::Or);
    }

    #[test]
    fn test_field_partitioning_keeps_order() {
        let config = EntityConfig::new(["title"])
            .field("tag", FieldConfig::term("tags"))
            .field("date", FieldConfig::range("createdAt"))
            .field("title", FieldConfig::text("title"))
            .field("updated", FieldConfig::range("updatedAt"));

        assert_eq!(config.keyword_fields(), vec!["tag", "title"]);
        assert_eq!(config.range_fields(), vec!["date", "updated"]);
    }

    #[test]
    fn test_from_json_with_vector_search() {
        let config = EntityConfig::from_json(
            r#"{
                "fields": { "tag": { "type": "term", "index_field": "tags" } },
                "traditional_search": { "fields": ["title"] },
                "vector_search": { "embedding_field": "embedding", "k": 5, "mode": "hybrid" }
            }"#,
        )
        .unwrap();

        let vector = config.vector_search.as_ref().unwrap();
        assert_eq!(vector.k, Some(5));
        assert_eq!(vector.mode, VectorMode::Hybrid);
        assert!(vector.embedder.is_none());
        assert!(matches!(config.validate(), Err(ConfigError::MissingEmbedder(_))));

        let config = config.with_embedder(embedder());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_rejects_unknown_type() {
        let result = EntityConfig::from_json(
            r#"{ "fields": { "tag": { "type": "geo", "index_field": "tags" } } }"#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_reserved_and_invalid_keys() {
        let reserved = EntityConfig::new(["title"]).field("text", FieldConfig::text("body"));
        assert!(matches!(reserved.validate(), Err(ConfigError::ReservedFieldKey(k)) if k == "text"));

        for key in ["", "-tag", "a:b", "two words"] {
            let config = EntityConfig::new(["title"]).field(key, FieldConfig::term("tags"));
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidFieldKey(_))),
                "key {key:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_conflicting_vector_limits() {
        let config = EntityConfig::new(["title"])
            .vector_search(VectorSearchConfig::new("embedding", embedder()).k(10).min_score(0.5));
        assert!(matches!(config.validate(), Err(ConfigError::ConflictingVectorLimits)));
    }

    #[test]
    fn test_hook_attachment_by_key() {
        let config = EntityConfig::new(["title"])
            .field("tag", FieldConfig::term("tags"))
            .with_decoder("tag", decoder_fn(|values| values))
            .with_decoder("missing", decoder_fn(|values| values));

        assert!(config.fields["tag"].decoder.is_some());
        assert!(!config.fields.contains_key("missing"));
    }
}
