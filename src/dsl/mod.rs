// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query DSL
//!
//! Typed representation of the documents handed to the search engine.
//!
//! # Architecture
//!
//! ```text
//! Clause (AST)
//!     ↓
//!     └─→ OpenSearchTranslator → serde_json::Value
//! ```
//!
//! `Clause` also implements `Serialize` through the translator, so a built
//! query can be passed straight to any JSON HTTP client.

mod clause;
mod translator;

pub use clause::{BoolFilter, Clause, HybridQuery, KnnQuery};
pub use translator::OpenSearchTranslator;
