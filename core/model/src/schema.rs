//! FILENAME: core/model/src/schema.rs
//! PURPOSE: Field definitions and the schema that owns them.
//! CONTEXT: A schema is an ordered list of `FieldDef`s with unique keys. Roles
//! are non-exclusive: a field may be a row dimension, a slicer and a flag at
//! the same time. Axis domains and flag styles are declared here and consumed
//! by the pivot engine.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key identifying a field within a schema (and within a record's data map).
pub type FieldKey = String;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Duplicate field key: {0}")]
    DuplicateKey(String),

    #[error("Field key must not be empty")]
    EmptyKey,
}

// ============================================================================
// FIELD TYPES AND ROLES
// ============================================================================

/// Primitive type a field's values are interpreted as at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    #[default]
    String,
    Number,
    Boolean,
    Date,
}

/// Roles a field may play in a pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldRole {
    RowDim,
    ColDim,
    Slicer,
    Measure,
    Flag,
}

// ============================================================================
// AXIS DOMAIN
// ============================================================================

/// Declared set of members that must appear on an axis even when no record
/// carries them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AxisDomain {
    /// Explicit member list, in declared order.
    List { values: Vec<String> },
    /// The field's `enum_values`, in declared order.
    Enum,
    /// Every calendar day from `start` to `end` inclusive (`YYYY-MM-DD`).
    DateRange {
        #[serde(default)]
        start: Option<String>,
        #[serde(default)]
        end: Option<String>,
        #[serde(default = "default_true", rename = "includeWeekends")]
        include_weekends: bool,
    },
}

fn default_true() -> bool {
    true
}

// ============================================================================
// FLAG STYLES
// ============================================================================

/// Visual decoration applied to a cell.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleRule {
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub text_color: Option<String>,
}

impl StyleRule {
    /// A rule only takes effect when it sets at least one color.
    pub fn is_effective(&self) -> bool {
        self.background.is_some() || self.text_color.is_some()
    }
}

/// Style rules for a flag field, one per coverage state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagStyle {
    /// Higher priority flags are consulted first.
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub none: Option<StyleRule>,
    #[serde(default)]
    pub some: Option<StyleRule>,
    #[serde(default)]
    pub all: Option<StyleRule>,
}

// ============================================================================
// FIELD DEFINITION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    pub key: FieldKey,

    pub label: String,

    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    #[serde(default)]
    pub roles: Vec<FieldRole>,

    #[serde(default)]
    pub enum_values: Option<Vec<String>>,

    #[serde(default)]
    pub axis_domain: Option<AxisDomain>,

    #[serde(default)]
    pub flag_style: Option<FlagStyle>,
}

impl FieldDef {
    pub fn new(key: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        FieldDef {
            key: key.into(),
            label: label.into(),
            field_type,
            roles: Vec::new(),
            enum_values: None,
            axis_domain: None,
            flag_style: None,
        }
    }

    pub fn with_roles(mut self, roles: &[FieldRole]) -> Self {
        for role in roles {
            if !self.roles.contains(role) {
                self.roles.push(*role);
            }
        }
        self
    }

    pub fn with_enum_values<S: Into<String>>(mut self, values: impl IntoIterator<Item = S>) -> Self {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_axis_domain(mut self, domain: AxisDomain) -> Self {
        self.axis_domain = Some(domain);
        self
    }

    pub fn with_flag_style(mut self, style: FlagStyle) -> Self {
        self.flag_style = Some(style);
        self
    }

    pub fn has_role(&self, role: FieldRole) -> bool {
        self.roles.contains(&role)
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

/// Ordered field list with unique keys.
/// Serialized as a plain JSON array of field definitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldDef>", into = "Vec<FieldDef>")]
pub struct Schema {
    fields: Vec<FieldDef>,
    #[serde(skip)]
    index: FxHashMap<FieldKey, usize>,
}

impl Schema {
    pub fn new(fields: Vec<FieldDef>) -> Result<Self, SchemaError> {
        let mut index = FxHashMap::default();
        for (i, field) in fields.iter().enumerate() {
            if field.key.is_empty() {
                return Err(SchemaError::EmptyKey);
            }
            if index.insert(field.key.clone(), i).is_some() {
                return Err(SchemaError::DuplicateKey(field.key.clone()));
            }
        }
        Ok(Schema { fields, index })
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field(&self, key: &str) -> Option<&FieldDef> {
        self.index.get(key).map(|&i| &self.fields[i])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields_with_role(&self, role: FieldRole) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(move |f| f.has_role(role))
    }

    /// Keys of every flag field, in declared order.
    pub fn flag_keys(&self) -> Vec<FieldKey> {
        self.fields_with_role(FieldRole::Flag)
            .map(|f| f.key.clone())
            .collect()
    }
}

impl TryFrom<Vec<FieldDef>> for Schema {
    type Error = SchemaError;

    fn try_from(fields: Vec<FieldDef>) -> Result<Self, Self::Error> {
        Schema::new(fields)
    }
}

impl From<Schema> for Vec<FieldDef> {
    fn from(schema: Schema) -> Self {
        schema.fields
    }
}
