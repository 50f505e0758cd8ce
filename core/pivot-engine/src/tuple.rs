//! FILENAME: core/pivot-engine/src/tuple.rs
//! Tuple - one member combination on a row or column axis.
//!
//! A tuple pairs each dimension key of an axis (outer to inner) with a
//! canonical member key. Equality and hashing are structural, so grouping
//! never depends on a string encoding. `composite_key` exists for consumers
//! that need a flat string form; it escapes its delimiters:
//!
//! - pairs are written `key=value` and joined with `|`
//! - `\`, `|` and `=` inside a key or value are prefixed with `\`
//!
//! Distinct tuples therefore always have distinct composite keys.

use std::cmp::Ordering;

use pivot_model::FieldKey;
use serde::ser::{Serialize, SerializeMap, Serializer};
use smallvec::SmallVec;

use crate::key::compare_members;
use crate::reader::RecordReader;

/// Inline capacity: axes rarely carry more than four dimension keys.
type Members = SmallVec<[TupleMember; 4]>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TupleMember {
    pub key: FieldKey,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Tuple {
    members: Members,
}

impl Tuple {
    pub fn new<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Tuple {
            members: pairs
                .into_iter()
                .map(|(key, value)| TupleMember { key: key.into(), value: value.into() })
                .collect(),
        }
    }

    /// Projects a record onto `keys`. Missing values become `""`.
    pub fn project(reader: &RecordReader<'_>, keys: &[FieldKey]) -> Self {
        Tuple {
            members: keys
                .iter()
                .map(|key| TupleMember { key: key.clone(), value: reader.member(key) })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[TupleMember] {
        &self.members
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.members
            .iter()
            .find(|m| m.key == key)
            .map(|m| m.value.as_str())
    }

    /// Member value at `depth` (0 = outermost key).
    pub fn value_at(&self, depth: usize) -> Option<&str> {
        self.members.get(depth).map(|m| m.value.as_str())
    }

    /// True when both tuples agree on every level up to and including `depth`.
    pub fn shares_prefix(&self, other: &Tuple, depth: usize) -> bool {
        (0..=depth).all(|d| self.value_at(d) == other.value_at(d))
    }

    /// Per-key ordering, outer key first. The first differing key decides.
    pub fn compare(&self, other: &Tuple) -> Ordering {
        for (a, b) in self.members.iter().zip(other.members.iter()) {
            let ord = compare_members(&a.value, &b.value);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        self.len().cmp(&other.len())
    }

    pub fn composite_key(&self) -> String {
        let mut out = String::new();
        for (i, member) in self.members.iter().enumerate() {
            if i > 0 {
                out.push('|');
            }
            escape_into(&mut out, &member.key);
            out.push('=');
            escape_into(&mut out, &member.value);
        }
        out
    }
}

fn escape_into(out: &mut String, raw: &str) {
    for c in raw.chars() {
        if matches!(c, '\\' | '|' | '=') {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Serialized as an ordered JSON object `{ key: value, ... }`.
impl Serialize for Tuple {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.members.len()))?;
        for member in &self.members {
            map.serialize_entry(&member.key, &member.value)?;
        }
        map.end()
    }
}
