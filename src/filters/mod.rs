// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Field Filters
//!
//! Compiles one field's raw token values into DSL clauses.
//!
//! # Flow
//!
//! ```text
//! raw values
//!     │
//!     ├─→ decoder (optional, sync)
//!     │
//!     ├─→ dispatch on FieldType
//!     │       ├─→ term  (resolver, optional, async)
//!     │       ├─→ range (date terms)
//!     │       └─→ text
//!     │
//!     └─→ combine: OR with >1 clause → one bool.should wrapper
//!                  otherwise        → clauses as-is (conjunctive in `must`)
//! ```
//!
//! Malformed input never fails; it yields no clauses.

pub mod range;
pub mod term;
pub mod text;

use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::{FieldConfig, FieldType, LogicalConnect};
use crate::date_term::{Clock, SystemClock};
use crate::dsl::Clause;
use crate::error::BuildError;
use crate::metrics;
use crate::parser::FieldValues;

/// Dispatches a field to its compiler and applies the field's connector.
#[derive(Clone)]
pub struct Filters {
    clock: Arc<dyn Clock>,
}

impl Default for Filters {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl Filters {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Compile `values` for the field registered under `key`.
    ///
    /// Only a failing resolver produces an error.
    pub async fn create(
        &self,
        key: &str,
        field: &FieldConfig,
        values: FieldValues,
    ) -> Result<Vec<Clause>, BuildError> {
        let values = match &field.decoder {
            Some(decode) => decode(values),
            None => values,
        };

        let clauses = match (field.field_type, values) {
            (FieldType::Term, FieldValues::List(values)) => {
                term::create(field, values).await.map_err(|source| {
                    warn!(field = %key, error = %source, "Field resolver failed");
                    BuildError::Resolve {
                        field: key.to_string(),
                        source,
                    }
                })?
            }
            (FieldType::Text, FieldValues::List(values)) => text::create(field, values),
            (FieldType::Range, FieldValues::Range(value)) => {
                range::create(field, &value, self.clock.as_ref())
            }
            (field_type, _) => {
                debug!(field = %key, ?field_type, "Token shape does not match field type");
                metrics::record_dropped_filter("shape_mismatch");
                Vec::new()
            }
        };

        Ok(Self::combine(field.logical_connect, clauses))
    }

    /// Wrap several OR-connected clauses in a single `should` disjunction.
    pub fn combine(connect: LogicalConnect, clauses: Vec<Clause>) -> Vec<Clause> {
        if connect == LogicalConnect::Or && clauses.len() > 1 {
            vec![Clause::any_of(clauses)]
        } else {
            clauses
        }
    }
}
