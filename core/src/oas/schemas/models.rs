#![deny(missing_docs)]

//! # Normalized Schema Model
//!
//! Flat, name-keyed representation of every schema in a resolved document.
//! Entries refer to each other only by name, so the map stays acyclic even when the
//! source schemas are self-referential.

use crate::error::{AppError, AppResult};
use crate::oas::schemas::integrity::validate_schema_map;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Structural category of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    /// Record with named properties.
    Object,
    /// Homogeneous list.
    Array,
    /// `oneOf` / `anyOf` alternative set.
    Union,
    /// Scalar or untyped value.
    Primitive,
}

/// Composition keyword a union entry was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompositionKind {
    /// Merged into one object.
    #[serde(rename = "allOf")]
    AllOf,
    /// Exactly one member applies.
    #[serde(rename = "oneOf")]
    OneOf,
    /// Any member may apply.
    #[serde(rename = "anyOf")]
    AnyOf,
}

/// Composition record of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Composition {
    /// Keyword used in the source.
    pub kind: CompositionKind,
    /// Member entry names, in declaration order.
    pub member_names: Vec<String>,
}

/// Validation keywords carried over from the source schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    /// `minLength`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    /// `maxLength`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    /// `pattern`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// `minimum`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    /// `maximum`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
}

impl Constraints {
    /// True when no keyword is set.
    pub fn is_empty(&self) -> bool {
        self == &Constraints::default()
    }
}

/// Type of a property slot, an array item or a map value.
///
/// Nested structures are never embedded: they appear as [`PropertyType::Schema`],
/// a lookup key into the [`SchemaMap`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PropertyType {
    /// `string`
    String,
    /// `integer`
    Integer,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// An object left inline (free-form, or past the nesting bound).
    Object,
    /// No usable type information.
    Any,
    /// List of `items`.
    Array {
        /// Item type.
        items: Box<PropertyType>,
    },
    /// String-keyed dictionary (`additionalProperties`).
    Map {
        /// Value type.
        values: Box<PropertyType>,
    },
    /// Another entry of the schema map.
    Schema {
        /// Entry name.
        name: String,
    },
}

impl PropertyType {
    /// Maps a JSON Schema `type` keyword to a primitive slot type.
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "string" => PropertyType::String,
            "integer" => PropertyType::Integer,
            "number" => PropertyType::Number,
            "boolean" => PropertyType::Boolean,
            "object" => PropertyType::Object,
            _ => PropertyType::Any,
        }
    }

    /// Every entry name this type refers to.
    pub fn referenced_names(&self) -> Vec<&str> {
        match self {
            PropertyType::Schema { name } => vec![name.as_str()],
            PropertyType::Array { items } => items.referenced_names(),
            PropertyType::Map { values } => values.referenced_names(),
            _ => Vec::new(),
        }
    }
}

/// A single property of an object entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySchema {
    /// Slot type.
    #[serde(flatten)]
    pub ty: PropertyType,
    /// `format`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// `enum`
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    /// `default`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Listed in the owner's `required` set.
    pub required: bool,
    /// `nullable`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    /// `readOnly`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    /// `writeOnly`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_only: Option<bool>,
    /// `deprecated`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    /// Validation keywords.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
    /// `description`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One entry of the [`SchemaMap`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedSchema {
    /// Unique key.
    pub name: String,
    /// Structural category.
    pub kind: SchemaKind,
    /// Scalar type of primitive entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<PropertyType>,
    /// `format` of primitive entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// `enum` of primitive entries.
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    /// `default` of primitive entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// `nullable`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    /// Properties of object entries, in declaration order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, PropertySchema>,
    /// Required property names of object entries.
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub required: IndexSet<String>,
    /// Item type of array entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<PropertyType>,
    /// Member names of union entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composition: Option<Composition>,
    /// Validation keywords.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
    /// `description`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `example`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

impl NormalizedSchema {
    /// Creates an empty entry of the given kind.
    pub fn new(name: impl Into<String>, kind: SchemaKind) -> Self {
        Self {
            name: name.into(),
            kind,
            data_type: None,
            format: None,
            enum_values: None,
            default: None,
            nullable: None,
            properties: IndexMap::new(),
            required: IndexSet::new(),
            items: None,
            composition: None,
            constraints: None,
            description: None,
            example: None,
        }
    }

    /// Every entry name this entry refers to, in a stable order.
    pub fn referenced_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for prop in self.properties.values() {
            names.extend(prop.ty.referenced_names());
        }
        if let Some(items) = &self.items {
            names.extend(items.referenced_names());
        }
        if let Some(data_type) = &self.data_type {
            names.extend(data_type.referenced_names());
        }
        if let Some(composition) = &self.composition {
            names.extend(composition.member_names.iter().map(String::as_str));
        }
        names
    }
}

/// Insertion-ordered map from unique name to entry.
///
/// Built once by the normalizer; the only way to obtain one from serialized data is
/// [`SchemaMap::from_json`], which re-checks every invariant.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SchemaMap {
    entries: IndexMap<String, NormalizedSchema>,
}

impl SchemaMap {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub(crate) fn insert(&mut self, schema: NormalizedSchema) -> Option<NormalizedSchema> {
        self.entries.insert(schema.name.clone(), schema)
    }

    pub(crate) fn entries(&self) -> &IndexMap<String, NormalizedSchema> {
        &self.entries
    }

    /// Looks up an entry by name.
    pub fn get(&self, name: &str) -> Option<&NormalizedSchema> {
        self.entries.get(name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NormalizedSchema)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Serializes to a JSON object keyed by name, preserving insertion order.
    pub fn to_json(&self) -> AppResult<Value> {
        serde_json::to_value(self)
            .map_err(|e| AppError::General(format!("Schema map serialization failed: {}", e)))
    }

    /// Rebuilds a map from its serialized form and re-validates it.
    pub fn from_json(value: Value) -> AppResult<Self> {
        let entries: IndexMap<String, NormalizedSchema> = serde_json::from_value(value)
            .map_err(|e| AppError::Parse(format!("Invalid schema map: {}", e)))?;
        let map = SchemaMap { entries };
        validate_schema_map(&map)?;
        Ok(map)
    }
}

impl<'a> IntoIterator for &'a SchemaMap {
    type Item = (&'a String, &'a NormalizedSchema);
    type IntoIter = indexmap::map::Iter<'a, String, NormalizedSchema>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_property_type_serialization_shape() {
        let ty = PropertyType::Array {
            items: Box::new(PropertyType::Schema {
                name: "Pet".into(),
            }),
        };
        assert_eq!(
            serde_json::to_value(&ty).unwrap(),
            json!({"type": "array", "items": {"type": "schema", "name": "Pet"}})
        );
    }

    #[test]
    fn test_property_schema_flattens_type() {
        let prop = PropertySchema {
            ty: PropertyType::String,
            format: Some("email".into()),
            enum_values: None,
            default: None,
            required: true,
            nullable: None,
            read_only: None,
            write_only: None,
            deprecated: None,
            constraints: Some(Constraints {
                max_length: Some(64),
                ..Constraints::default()
            }),
            description: None,
        };
        let value = serde_json::to_value(&prop).unwrap();
        assert_eq!(
            value,
            json!({"type": "string", "format": "email", "required": true, "constraints": {"maxLength": 64}})
        );
        let back: PropertySchema = serde_json::from_value(value).unwrap();
        assert_eq!(back, prop);
    }

    #[test]
    fn test_referenced_names_cover_nested_types() {
        let mut schema = NormalizedSchema::new("Owner", SchemaKind::Object);
        schema.properties.insert(
            "pets".into(),
            PropertySchema {
                ty: PropertyType::Map {
                    values: Box::new(PropertyType::Array {
                        items: Box::new(PropertyType::Schema {
                            name: "OwnerPetsValue".into(),
                        }),
                    }),
                },
                format: None,
                enum_values: None,
                default: None,
                required: false,
                nullable: None,
                read_only: None,
                write_only: None,
                deprecated: None,
                constraints: None,
                description: None,
            },
        );
        assert_eq!(schema.referenced_names(), vec!["OwnerPetsValue"]);
    }

    #[test]
    fn test_constraints_is_empty() {
        assert!(Constraints::default().is_empty());
        let c = Constraints {
            pattern: Some("^a".into()),
            ..Constraints::default()
        };
        assert!(!c.is_empty());
    }
}
