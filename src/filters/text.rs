// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Text filter: one analyzed `match` clause per value.

use crate::config::FieldConfig;
use crate::dsl::Clause;

pub fn create(field: &FieldConfig, values: Vec<String>) -> Vec<Clause> {
    values
        .into_iter()
        .map(|value| Clause::match_text(&field.index_field, value))
        .collect()
}
