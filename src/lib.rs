// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! # Search Query DSL
//!
//! Compiles a human-typed search box query into an OpenSearch query document.
//!
//! ```text
//! tag:pain -tag:negative date:now_sub_2w-now "exact phrase"
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Query string                           │
//! └─────────────────────────────────────────────────────────────┘
//!                 │                               │
//!                 ▼                               ▼
//! ┌───────────────────────────────┐ ┌───────────────────────────┐
//! │ Tokenizer                     │ │ Quoted-text extractor     │
//! │  • keyword / range tokens     │ │  • "exact phrase" forces  │
//! │  • -field:value exclusions    │ │    keyword search         │
//! │  • free text                  │ │                           │
//! └───────────────────────────────┘ └───────────────────────────┘
//!                 │                               │
//!                 ▼                               │
//! ┌───────────────────────────────┐               │
//! │ Filters (per field)           │               │
//! │  • term  (+ async resolver)   │               │
//! │  • range (date terms)         │               │
//! │  • text                       │               │
//! │  • AND / OR combination       │               │
//! └───────────────────────────────┘               │
//!                 │                               │
//!                 ▼                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │ QueryBuilder                                                │
//! │  • required filters (tenant scoping)                        │
//! │  • mode: keyword / vector (knn) / hybrid                    │
//! │  • async embedder, called only for unquoted free text       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!                 Clause AST → OpenSearch JSON
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use search_query_dsl::{EntityConfig, FieldConfig, QueryBuilder, VectorSearchConfig};
//! use search_query_dsl::hooks::embedder_fn;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EntityConfig::new(["title", "description"])
//!     .field("tag", FieldConfig::term("tags").and())
//!     .field("date", FieldConfig::range("createdAt"))
//!     .field("title", FieldConfig::text("title"))
//!     .required_filter("tenant", "acme")
//!     .vector_search(
//!         VectorSearchConfig::new("embedding", embedder_fn(|_text: String| async move {
//!             // call your embedding service here
//!             Ok(vec![0.5, 0.25])
//!         }))
//!         .k(10)
//!         .hybrid(),
//!     );
//!
//! let builder = QueryBuilder::new(config)?;
//! let response = builder.build("interview notes tag:pain date:now_sub_2w-now").await?;
//!
//! let body = serde_json::to_string(&response.query)?;
//! assert!(body.starts_with(r#"{"hybrid""#));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`config`]: [`EntityConfig`] and per-field settings
//! - [`parser`]: tokenizer boundary and the default [`QueryParser`]
//! - [`filters`]: per-field-type filter compilers and their combinator
//! - [`date_term`]: absolute / epoch / relative date expressions
//! - [`quoted_text`]: exact-phrase detection
//! - [`builder`]: the [`QueryBuilder`] and mode selection
//! - [`dsl`]: output clause AST and JSON translator
//! - [`hooks`]: caller-supplied resolver / embedder / decoder
//! - [`metrics`]: `metrics` crate instrumentation

pub mod builder;
pub mod config;
pub mod date_term;
pub mod dsl;
pub mod error;
pub mod filters;
pub mod hooks;
pub mod metrics;
pub mod parser;
pub mod quoted_text;

pub use builder::{BuildResponse, ModeInputs, QueryBuilder, SearchMode};
pub use config::{
    EntityConfig, FieldConfig, FieldType, LogicalConnect, TraditionalSearch, VectorMode,
    VectorSearchConfig,
};
pub use date_term::{parse_date_term, parse_date_term_at, Clock, FixedClock, SystemClock};
pub use dsl::{BoolFilter, Clause, HybridQuery, KnnQuery, OpenSearchTranslator};
pub use error::{BuildError, ConfigError};
pub use filters::Filters;
pub use hooks::{BoxError, Embedder, ValueDecoder, ValueResolver};
pub use parser::{FieldValues, ParseOutcome, ParsedQuery, QueryParser, RangeValue, TokenGroup, Tokenizer};
pub use quoted_text::quoted_texts;
