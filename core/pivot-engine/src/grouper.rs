//! FILENAME: core/pivot-engine/src/grouper.rs
//! Tuple Grouper - builds the row and column tuple universes.
//!
//! Algorithm:
//! 1. Project every admitted record onto the axis keys (discovery order)
//! 2. Deduplicate structurally
//! 3. If any axis key carries a domain expansion, add the cross product of
//!    the per-key member lists: declared domain members for expanded keys,
//!    observed members for the others. Observed tuples are kept as-is, so an
//!    observed member outside the domain never spreads to other groups.
//! 4. Sort by `Tuple::compare` (stable) and index each tuple by position
//!
//! The position of a tuple in the sorted list is its authoritative row or
//! column index.

use pivot_model::{FieldKey, RecordEntity, Schema};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::reader::RecordReader;
use crate::tuple::Tuple;

/// Domain members to merge per dimension key.
pub type AxisExpansions = FxHashMap<FieldKey, Vec<String>>;

// ============================================================================
// AXIS INDEX
// ============================================================================

/// Sorted tuple universe of one axis with a reverse lookup.
#[derive(Debug, Clone, Default)]
pub struct AxisIndex {
    keys: Vec<FieldKey>,
    tuples: Vec<Tuple>,
    positions: FxHashMap<Tuple, usize>,
}

impl AxisIndex {
    /// Builds an axis from tuples in discovery order.
    pub fn build(keys: &[FieldKey], discovered: Vec<Tuple>, expansions: &AxisExpansions) -> Self {
        let mut seen: FxHashSet<Tuple> = FxHashSet::default();
        let mut tuples: Vec<Tuple> = Vec::with_capacity(discovered.len());
        for tuple in discovered {
            if seen.insert(tuple.clone()) {
                tuples.push(tuple);
            }
        }

        if keys.iter().any(|k| expansions.contains_key(k)) {
            let levels = member_levels(keys, &tuples, expansions);
            for combo in CartesianProduct::new(&levels) {
                let tuple = Tuple::new(keys.iter().cloned().zip(combo));
                if seen.insert(tuple.clone()) {
                    tuples.push(tuple);
                }
            }
        }

        tuples.sort_by(|a, b| a.compare(b));

        let positions = tuples
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();

        AxisIndex {
            keys: keys.to_vec(),
            tuples,
            positions,
        }
    }

    pub fn keys(&self) -> &[FieldKey] {
        &self.keys
    }

    pub fn tuples(&self) -> &[Tuple] {
        &self.tuples
    }

    pub fn into_tuples(self) -> Vec<Tuple> {
        self.tuples
    }

    pub fn position(&self, tuple: &Tuple) -> Option<usize> {
        self.positions.get(tuple).copied()
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }
}

/// Member list per axis level: the declared domain for expanded keys, the
/// observed members (discovery order) for the rest.
fn member_levels(keys: &[FieldKey], tuples: &[Tuple], expansions: &AxisExpansions) -> Vec<Vec<String>> {
    keys.iter()
        .enumerate()
        .map(|(depth, key)| match expansions.get(key) {
            Some(declared) => unique(declared.iter().map(String::as_str)),
            None => unique(tuples.iter().filter_map(|t| t.value_at(depth))),
        })
        .collect()
}

fn unique<'a>(members: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    members
        .filter(|member| seen.insert(*member))
        .map(String::from)
        .collect()
}

// ============================================================================
// CARTESIAN PRODUCT
// ============================================================================

/// Finite, restartable cross product over member lists (last level varies fastest).
#[derive(Debug, Clone)]
pub struct CartesianProduct<'a> {
    levels: &'a [Vec<String>],
    cursor: Option<Vec<usize>>,
}

impl<'a> CartesianProduct<'a> {
    pub fn new(levels: &'a [Vec<String>]) -> Self {
        let cursor = if levels.is_empty() || levels.iter().any(Vec::is_empty) {
            None
        } else {
            Some(vec![0; levels.len()])
        };
        CartesianProduct { levels, cursor }
    }
}

impl Iterator for CartesianProduct<'_> {
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Vec<String>> {
        let cursor = self.cursor.as_mut()?;
        let item = cursor
            .iter()
            .zip(self.levels)
            .map(|(&i, level)| level[i].clone())
            .collect();

        // Advance like an odometer; exhausting the first level ends iteration.
        let mut exhausted = true;
        for depth in (0..cursor.len()).rev() {
            cursor[depth] += 1;
            if cursor[depth] < self.levels[depth].len() {
                exhausted = false;
                break;
            }
            cursor[depth] = 0;
        }
        if exhausted {
            self.cursor = None;
        }
        Some(item)
    }
}

// ============================================================================
// GROUPING
// ============================================================================

/// Row and column tuple universes for one computation.
#[derive(Debug, Clone, Default)]
pub struct TupleGroups {
    pub rows: AxisIndex,
    pub cols: AxisIndex,
}

/// Groups admitted records into row and column tuples without domain expansion.
pub fn group(
    records: &[&RecordEntity],
    schema: &Schema,
    row_keys: &[FieldKey],
    col_keys: &[FieldKey],
) -> TupleGroups {
    group_with_domains(records, schema, row_keys, col_keys, &AxisExpansions::default())
}

/// Groups admitted records, merging declared domain members for expanded keys.
pub fn group_with_domains(
    records: &[&RecordEntity],
    schema: &Schema,
    row_keys: &[FieldKey],
    col_keys: &[FieldKey],
    expansions: &AxisExpansions,
) -> TupleGroups {
    let mut row_seen: Vec<Tuple> = Vec::new();
    let mut col_seen: Vec<Tuple> = Vec::new();

    for record in records {
        let reader = RecordReader::new(record, schema);
        row_seen.push(Tuple::project(&reader, row_keys));
        col_seen.push(Tuple::project(&reader, col_keys));
    }

    TupleGroups {
        rows: AxisIndex::build(row_keys, row_seen, expansions),
        cols: AxisIndex::build(col_keys, col_seen, expansions),
    }
}
