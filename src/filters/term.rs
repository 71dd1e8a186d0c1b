// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Term filter: one exact `term` clause per value.

use crate::config::FieldConfig;
use crate::dsl::Clause;
use crate::hooks::BoxError;
use crate::metrics;

/// Build term clauses, expanding `values` through the field's resolver first.
///
/// A resolver replaces the input; an empty resolution yields no clauses.
pub async fn create(field: &FieldConfig, values: Vec<String>) -> Result<Vec<Clause>, BoxError> {
    let values = match &field.resolver {
        Some(resolver) => {
            let resolved = resolver.resolve(values).await;
            metrics::record_hook_call("resolver", resolved.is_ok());
            resolved?
        }
        None => values,
    };

    Ok(values
        .into_iter()
        .map(|value| Clause::term(&field.index_field, value))
        .collect())
}
