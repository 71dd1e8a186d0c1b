// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use thiserror::Error;

use crate::hooks::BoxError;

/// Invalid [`EntityConfig`](crate::EntityConfig), reported when the builder is created.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Field key '{0}' collides with a reserved tokenizer key")]
    ReservedFieldKey(String),
    #[error("Field key '{0}' cannot be typed in a query (empty, leading '-', ':' or whitespace)")]
    InvalidFieldKey(String),
    #[error("Vector search on '{0}' has no embedder attached")]
    MissingEmbedder(String),
    #[error("Vector search sets more than one of k, max_distance and min_score")]
    ConflictingVectorLimits,
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure of a caller-supplied hook while building a query.
///
/// Malformed user input never produces an error; it only drops filters.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Resolver for field '{field}' failed: {source}")]
    Resolve {
        field: String,
        #[source]
        source: BoxError,
    },
    #[error("Embedding generation failed: {0}")]
    Embedding(#[source] BoxError),
}
