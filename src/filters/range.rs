// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Range filter: a single inclusive date `range` clause.

use tracing::debug;

use crate::config::FieldConfig;
use crate::date_term::{parse_date_term_at, to_iso_string, Clock};
use crate::dsl::Clause;
use crate::metrics;
use crate::parser::RangeValue;

/// Both endpoints must resolve, otherwise the whole range is dropped.
pub fn create(field: &FieldConfig, value: &RangeValue, clock: &dyn Clock) -> Vec<Clause> {
    let from = parse_date_term_at(&value.from, clock);
    let to = parse_date_term_at(&value.to, clock);

    match (from, to) {
        (Some(from), Some(to)) => vec![Clause::range(
            &field.index_field,
            to_iso_string(&from),
            to_iso_string(&to),
        )],
        _ => {
            debug!(
                field = %field.index_field,
                from = %value.from,
                to = %value.to,
                "Dropping range filter with unparseable endpoint"
            );
            metrics::record_dropped_filter("unparseable_range");
            Vec::new()
        }
    }
}
