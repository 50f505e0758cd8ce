//! FILENAME: core/pivot-engine/src/filter.rs
//! Predicate Stack - decides which records enter aggregation.
//!
//! Three constraint families, all of which must hold:
//! 1. slicers: `config.slicers` for each key in `config.slicer_keys`
//!    (scalar equality or list membership)
//! 2. row filters: `config.row_filters` (list membership)
//! 3. the optional named filter set (include / exclude per dimension)
//!
//! Every comparison is made on canonical member keys. Empty selections and
//! empty value lists never constrain.

use pivot_model::{RecordEntity, Schema};

use crate::definition::{DimensionFilter, FilterMode, FilterSet, PivotConfig};
use crate::reader::RecordReader;

/// True when the record satisfies every slicer, row filter and filter-set constraint.
pub fn matches(
    record: &RecordEntity,
    schema: &Schema,
    config: &PivotConfig,
    filter_set: Option<&FilterSet>,
) -> bool {
    let reader = RecordReader::new(record, schema);
    matches_slicers(&reader, config)
        && matches_row_filters(&reader, config)
        && filter_set.map_or(true, |set| matches_filter_set(&reader, set))
}

fn matches_slicers(reader: &RecordReader<'_>, config: &PivotConfig) -> bool {
    config.slicer_keys.iter().all(|key| match config.slicers.get(key) {
        Some(selection) if !selection.is_unconstrained() => selection.accepts(&reader.member(key)),
        _ => true,
    })
}

fn matches_row_filters(reader: &RecordReader<'_>, config: &PivotConfig) -> bool {
    config
        .row_filters
        .iter()
        .all(|(key, allowed)| allowed.is_empty() || reader.member_in(key, allowed))
}

fn matches_filter_set(reader: &RecordReader<'_>, set: &FilterSet) -> bool {
    set.filters.iter().all(|filter| matches_dimension(reader, filter))
}

fn matches_dimension(reader: &RecordReader<'_>, filter: &DimensionFilter) -> bool {
    if filter.values.is_empty() {
        return true;
    }
    let member = reader.member_in(&filter.key, &filter.values);
    match filter.mode {
        FilterMode::Include => member,
        FilterMode::Exclude => !member,
    }
}

/// Records admitted by the predicate stack, in input order.
pub fn admitted<'a>(
    records: &'a [RecordEntity],
    schema: &Schema,
    config: &PivotConfig,
    filter_set: Option<&FilterSet>,
) -> Vec<&'a RecordEntity> {
    records
        .iter()
        .filter(|record| matches(record, schema, config, filter_set))
        .collect()
}
