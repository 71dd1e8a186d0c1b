// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Caller-supplied capabilities.
//!
//! The compiler never talks to a network itself. Anything that may need I/O
//! (expanding a group name into its members, turning free text into an
//! embedding) is injected by the caller through these traits and invoked at
//! fixed points during [`QueryBuilder::build`](crate::QueryBuilder::build).
//!
//! # Example
//!
//! ```rust
//! use search_query_dsl::hooks::{embedder_fn, resolver_fn};
//!
//! let groups = resolver_fn(|values: Vec<String>| async move {
//!     Ok(match values.first().map(String::as_str) {
//!         Some("competitors") => vec!["coke".to_string(), "pepsi".to_string()],
//!         _ => Vec::new(),
//!     })
//! });
//!
//! let embedder = embedder_fn(|_text: String| async move { Ok(vec![0.0, 1.0]) });
//! ```

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

use crate::parser::FieldValues;

/// Error type returned by caller hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Expands shorthand term values into concrete values.
///
/// The returned values replace the input entirely; they are not merged with it.
#[async_trait]
pub trait ValueResolver: Send + Sync {
    async fn resolve(&self, values: Vec<String>) -> Result<Vec<String>, BoxError>;
}

/// Turns free text into an embedding vector for knn search.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f64>, BoxError>;
}

/// Synchronous transform applied to raw token values before compilation.
pub type ValueDecoder = Arc<dyn Fn(FieldValues) -> FieldValues + Send + Sync>;

/// [`ValueResolver`] backed by an async closure.
pub struct FnResolver<F>(F);

#[async_trait]
impl<F, Fut> ValueResolver for FnResolver<F>
where
    F: Fn(Vec<String>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<String>, BoxError>> + Send + 'static,
{
    async fn resolve(&self, values: Vec<String>) -> Result<Vec<String>, BoxError> {
        (self.0)(values).await
    }
}

/// [`Embedder`] backed by an async closure. The closure receives an owned copy
/// of the text so the returned future can be `'static`.
pub struct FnEmbedder<F>(F);

#[async_trait]
impl<F, Fut> Embedder for FnEmbedder<F>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<f64>, BoxError>> + Send + 'static,
{
    async fn embed(&self, text: &str) -> Result<Vec<f64>, BoxError> {
        (self.0)(text.to_string()).await
    }
}

/// Wrap an async closure as a shareable [`ValueResolver`].
pub fn resolver_fn<F, Fut>(f: F) -> Arc<dyn ValueResolver>
where
    F: Fn(Vec<String>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<String>, BoxError>> + Send + 'static,
{
    Arc::new(FnResolver(f))
}

/// Wrap an async closure as a shareable [`Embedder`].
pub fn embedder_fn<F, Fut>(f: F) -> Arc<dyn Embedder>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<f64>, BoxError>> + Send + 'static,
{
    Arc::new(FnEmbedder(f))
}

/// Wrap a plain closure as a [`ValueDecoder`].
pub fn decoder_fn<F>(f: F) -> ValueDecoder
where
    F: Fn(FieldValues) -> FieldValues + Send + Sync + 'static,
{
    Arc::new(f)
}
