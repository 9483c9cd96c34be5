#![deny(missing_docs)]

//! # Schema Normalizer
//!
//! Converts resolved schema nodes into flat [`NormalizedSchema`] entries.
//!
//! - `allOf` members are merged into one object entry.
//! - `oneOf` / `anyOf` members become `{Name}Option{i}` entries under a `union` parent.
//! - Nested objects (and compositions) are hoisted into their own entries and referenced
//!   by name, up to `max_depth` levels; past that they stay inline as plain objects.
//! - Residual references to declared component schemas (recursion sites the resolver
//!   had to leave in place) become by-name references. Inside `allOf` the referenced
//!   schema is merged in instead, and a recursive structure met again reuses its entry.

use crate::error::{AppResult, IntegrityError};
use crate::oas::ref_utils::{component_schema_name, reference_of};
use crate::oas::schemas::integrity::find_reference;
use crate::oas::schemas::models::{
    Composition, CompositionKind, Constraints, NormalizedSchema, PropertySchema, PropertyType,
    SchemaKind, SchemaMap,
};
use crate::oas::schemas::naming::{property_schema_name, NameAllocator};
use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Maximum number of hoisting levels below a seeded entry.
pub const MAX_NESTING_DEPTH: usize = 10;

/// Tuning knobs for the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizerOptions {
    /// Nesting depth past which structures stay inline instead of being hoisted.
    pub max_depth: usize,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_NESTING_DEPTH,
        }
    }
}

/// Builds the schema map one entry at a time.
pub(crate) struct Normalizer {
    options: NormalizerOptions,
    components: Map<String, Value>,
    names: NameAllocator,
    /// Hoisted structures that still carry a recursion site, keyed by their JSON text.
    recursive: HashMap<String, String>,
    map: SchemaMap,
}

/// Properties, required names and description accumulated across `allOf` members.
#[derive(Default)]
struct Merged {
    properties: IndexMap<String, Value>,
    required: IndexSet<String>,
    description: Option<String>,
}

impl Merged {
    fn absorb(&mut self, node: &Value) {
        if let Some(props) = node.get("properties").and_then(Value::as_object) {
            for (name, schema) in props {
                self.properties.insert(name.clone(), schema.clone());
            }
        }
        self.required.extend(required_names(node));
        if let Some(description) = string_field(node, "description") {
            self.description = Some(description);
        }
    }
}

impl Normalizer {
    /// Creates a normalizer over the resolved `components/schemas` of a document.
    ///
    /// Every declared name is reserved up front.
    pub(crate) fn new(options: NormalizerOptions, components: &Map<String, Value>) -> AppResult<Self> {
        let mut names = NameAllocator::new();
        for name in components.keys() {
            if name.is_empty() {
                return Err(IntegrityError::EmptyName.into());
            }
            if !names.reserve(name) {
                return Err(IntegrityError::DuplicateName { name: name.clone() }.into());
            }
        }
        Ok(Self {
            options,
            components: components.clone(),
            names,
            recursive: HashMap::new(),
            map: SchemaMap::new(),
        })
    }

    /// Picks a free name derived from `base`.
    pub(crate) fn allocate(&mut self, base: &str) -> String {
        self.names.allocate(base)
    }

    /// Consumes the normalizer, returning the finished map.
    pub(crate) fn finish(self) -> SchemaMap {
        self.map
    }

    /// Normalizes `node` into an entry called `name` (already allocated or reserved),
    /// hoisting nested structures as needed.
    pub(crate) fn normalize(&mut self, node: &Value, name: String, depth: usize) -> AppResult<()> {
        if name.is_empty() {
            return Err(IntegrityError::EmptyName.into());
        }
        if self.map.contains(&name) {
            return Err(IntegrityError::DuplicateName { name }.into());
        }

        // Placeholder keeps parents ahead of the entries hoisted out of them.
        self.map
            .insert(NormalizedSchema::new(name.clone(), SchemaKind::Primitive));

        let schema = if let Some(reference) = reference_of(node) {
            self.alias(&name, reference)?
        } else if let Some((kind, members)) = composition(node) {
            match kind {
                CompositionKind::AllOf => self.merge_all_of(node, members, &name, depth)?,
                CompositionKind::OneOf | CompositionKind::AnyOf => {
                    self.union(node, kind, members, &name, depth)?
                }
            }
        } else if is_object_schema(node) {
            let properties = node
                .get("properties")
                .and_then(Value::as_object)
                .map(|props| props.iter().map(|(k, v)| (k.clone(), v)).collect())
                .unwrap_or_default();
            let mut schema =
                self.build_object(node, &name, properties, required_names(node), depth)?;
            annotate(&mut schema, node);
            schema
        } else if is_array_schema(node) {
            self.array(node, &name, depth)?
        } else {
            primitive(node, &name)
        };

        self.map.insert(schema);
        Ok(())
    }

    fn alias(&self, name: &str, reference: &str) -> AppResult<NormalizedSchema> {
        let mut schema = NormalizedSchema::new(name, SchemaKind::Primitive);
        schema.data_type = Some(self.named_reference(name, reference)?);
        Ok(schema)
    }

    fn merge_all_of(
        &mut self,
        node: &Value,
        members: &[Value],
        name: &str,
        depth: usize,
    ) -> AppResult<NormalizedSchema> {
        let mut merged = Merged::default();
        self.collect_all_of(members, name, &mut HashSet::new(), &mut merged)?;
        merged.absorb(node);

        let Merged {
            properties,
            required,
            description,
        } = merged;
        let properties = properties.iter().map(|(k, v)| (k.clone(), v)).collect();
        let mut schema = self.build_object(node, name, properties, required, depth)?;
        annotate(&mut schema, node);
        schema.description = description;
        Ok(schema)
    }

    /// Absorbs `allOf` members in order. A member that is a residual reference to a
    /// declared schema contributes that schema's resolved node, at most once per merge.
    fn collect_all_of(
        &self,
        members: &[Value],
        owner: &str,
        seen: &mut HashSet<String>,
        merged: &mut Merged,
    ) -> AppResult<()> {
        for member in members {
            if let Some(reference) = reference_of(member) {
                let Some((base, target)) = component_schema_name(reference)
                    .and_then(|base| self.components.get(&base).map(|target| (base, target)))
                else {
                    return Err(IntegrityError::ResidualReference {
                        name: owner.to_string(),
                        reference: reference.to_string(),
                    }
                    .into());
                };
                if seen.insert(base.clone()) {
                    debug!(schema = owner, base = %base, "merging recursive allOf member");
                    self.collect_all_of(std::slice::from_ref(target), owner, seen, merged)?;
                }
                continue;
            }
            if let Some(nested) = member.get("allOf").and_then(Value::as_array) {
                self.collect_all_of(nested, owner, seen, merged)?;
            }
            merged.absorb(member);
        }
        Ok(())
    }

    fn union(
        &mut self,
        node: &Value,
        kind: CompositionKind,
        members: &[Value],
        name: &str,
        depth: usize,
    ) -> AppResult<NormalizedSchema> {
        let mut member_names = Vec::with_capacity(members.len());
        for (i, member) in members.iter().enumerate() {
            let option = self.allocate(&format!("{}Option{}", name, i + 1));
            self.normalize(member, option.clone(), depth + 1)?;
            member_names.push(option);
        }

        let mut schema = NormalizedSchema::new(name, SchemaKind::Union);
        schema.composition = Some(Composition { kind, member_names });
        annotate(&mut schema, node);
        Ok(schema)
    }

    fn build_object(
        &mut self,
        node: &Value,
        name: &str,
        properties: Vec<(String, &Value)>,
        required: IndexSet<String>,
        depth: usize,
    ) -> AppResult<NormalizedSchema> {
        let mut schema = NormalizedSchema::new(name, SchemaKind::Object);
        for (prop_name, prop_node) in properties {
            let is_required = required.contains(&prop_name);
            let base = property_schema_name(name, &prop_name);
            let property = self.property(prop_node, &base, is_required, depth)?;
            schema.properties.insert(prop_name, property);
        }
        if schema.properties.is_empty() {
            if let Some(values) = additional_properties_schema(node) {
                let values = self.slot_type(values, &format!("{}Value", name), depth)?;
                schema.data_type = Some(PropertyType::Map {
                    values: Box::new(values),
                });
            }
        }
        schema.required = required;
        Ok(schema)
    }

    fn array(&mut self, node: &Value, name: &str, depth: usize) -> AppResult<NormalizedSchema> {
        let items = match node.get("items") {
            Some(items) => self.slot_type(items, &format!("{}Item", name), depth)?,
            None => PropertyType::Any,
        };
        let mut schema = NormalizedSchema::new(name, SchemaKind::Array);
        schema.items = Some(items);
        annotate(&mut schema, node);
        Ok(schema)
    }

    fn property(
        &mut self,
        node: &Value,
        base: &str,
        required: bool,
        depth: usize,
    ) -> AppResult<PropertySchema> {
        Ok(PropertySchema {
            ty: self.slot_type(node, base, depth)?,
            format: string_field(node, "format"),
            enum_values: node.get("enum").and_then(Value::as_array).cloned(),
            default: node.get("default").cloned(),
            required,
            nullable: nullable(node),
            read_only: bool_field(node, "readOnly"),
            write_only: bool_field(node, "writeOnly"),
            deprecated: bool_field(node, "deprecated"),
            constraints: constraints(node),
            description: string_field(node, "description"),
        })
    }

    /// Type of a property, item or map-value slot. Structures get hoisted under `base`.
    fn slot_type(&mut self, node: &Value, base: &str, depth: usize) -> AppResult<PropertyType> {
        if let Some(reference) = reference_of(node) {
            return self.named_reference(base, reference);
        }

        if needs_entry(node) {
            if depth < self.options.max_depth {
                let key = find_reference(node).map(|_| node.to_string());
                if let Some(name) = key.as_ref().and_then(|k| self.recursive.get(k)) {
                    return Ok(PropertyType::Schema { name: name.clone() });
                }
                let name = self.allocate(base);
                if let Some(key) = key {
                    self.recursive.insert(key, name.clone());
                }
                debug!(schema = %name, depth = depth + 1, "hoisting nested schema");
                self.normalize(node, name.clone(), depth + 1)?;
                return Ok(PropertyType::Schema { name });
            }
            debug!(schema = %base, depth, "nesting bound reached, keeping inline");
            return Ok(if is_object_schema(node) {
                PropertyType::Object
            } else {
                PropertyType::Any
            });
        }

        if is_array_schema(node) {
            let items = match node.get("items") {
                Some(items) => self.slot_type(items, &format!("{}Item", base), depth)?,
                None => PropertyType::Any,
            };
            return Ok(PropertyType::Array {
                items: Box::new(items),
            });
        }

        if is_object_schema(node) {
            return Ok(match additional_properties_schema(node) {
                Some(values) => PropertyType::Map {
                    values: Box::new(self.slot_type(values, &format!("{}Value", base), depth)?),
                },
                None => PropertyType::Object,
            });
        }

        Ok(primitive_type(node))
    }

    /// Turns a residual reference into a by-name reference, if it names a declared schema.
    fn named_reference(&self, owner: &str, reference: &str) -> AppResult<PropertyType> {
        match component_schema_name(reference) {
            Some(name) if self.components.contains_key(&name) => {
                Ok(PropertyType::Schema { name })
            }
            _ => Err(IntegrityError::ResidualReference {
                name: owner.to_string(),
                reference: reference.to_string(),
            }
            .into()),
        }
    }
}

fn primitive(node: &Value, name: &str) -> NormalizedSchema {
    let mut schema = NormalizedSchema::new(name, SchemaKind::Primitive);
    schema.data_type = Some(primitive_type(node));
    schema.format = string_field(node, "format");
    schema.enum_values = node.get("enum").and_then(Value::as_array).cloned();
    schema.default = node.get("default").cloned();
    schema.constraints = constraints(node);
    annotate(&mut schema, node);
    schema
}

fn annotate(schema: &mut NormalizedSchema, node: &Value) {
    schema.description = string_field(node, "description");
    schema.example = node.get("example").cloned();
    schema.nullable = nullable(node);
}

fn primitive_type(node: &Value) -> PropertyType {
    schema_type(node)
        .or_else(|| infer_keyword(node))
        .map(PropertyType::from_keyword)
        .unwrap_or(PropertyType::Any)
}

/// The composition keyword of a node, `allOf` taking precedence over `oneOf` and `anyOf`.
pub(crate) fn composition(node: &Value) -> Option<(CompositionKind, &[Value])> {
    [
        ("allOf", CompositionKind::AllOf),
        ("oneOf", CompositionKind::OneOf),
        ("anyOf", CompositionKind::AnyOf),
    ]
    .into_iter()
    .find_map(|(key, kind)| {
        node.get(key)
            .and_then(Value::as_array)
            .filter(|members| !members.is_empty())
            .map(|members| (kind, members.as_slice()))
    })
}

/// The `type` keyword, taking the first non-null entry of a type array.
pub(crate) fn schema_type(node: &Value) -> Option<&str> {
    match node.get("type")? {
        Value::String(s) => Some(s.as_str()),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null"),
        _ => None,
    }
}

pub(crate) fn is_object_schema(node: &Value) -> bool {
    schema_type(node) == Some("object") || node.get("properties").is_some_and(Value::is_object)
}

pub(crate) fn is_array_schema(node: &Value) -> bool {
    schema_type(node) == Some("array") || node.get("items").is_some()
}

/// True if the node must become its own entry when it appears in a slot.
pub(crate) fn needs_entry(node: &Value) -> bool {
    let has_properties = node
        .get("properties")
        .and_then(Value::as_object)
        .is_some_and(|props| !props.is_empty());
    has_properties || composition(node).is_some()
}

fn additional_properties_schema(node: &Value) -> Option<&Value> {
    node.get("additionalProperties").filter(|v| v.is_object())
}

fn required_names(node: &Value) -> IndexSet<String> {
    node.get("required")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn nullable(node: &Value) -> Option<bool> {
    if let Some(flag) = bool_field(node, "nullable") {
        return Some(flag);
    }
    let null_in_type = node
        .get("type")
        .and_then(Value::as_array)
        .is_some_and(|types| types.iter().any(|t| t.as_str() == Some("null")));
    null_in_type.then_some(true)
}

fn constraints(node: &Value) -> Option<Constraints> {
    let number = |key: &str| match node.get(key) {
        Some(Value::Number(n)) => Some(n.clone()),
        _ => None,
    };
    let found = Constraints {
        min_length: node.get("minLength").and_then(Value::as_u64),
        max_length: node.get("maxLength").and_then(Value::as_u64),
        pattern: string_field(node, "pattern"),
        minimum: number("minimum"),
        maximum: number("maximum"),
    };
    (!found.is_empty()).then_some(found)
}

fn string_field(node: &Value, key: &str) -> Option<String> {
    node.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn bool_field(node: &Value, key: &str) -> Option<bool> {
    node.get(key).and_then(Value::as_bool)
}

/// Guesses a type keyword from `enum` / `default` / `example` values when `type` is absent.
fn infer_keyword(node: &Value) -> Option<&'static str> {
    let sample = node
        .get("enum")
        .and_then(Value::as_array)
        .and_then(|values| values.iter().find(|v| !v.is_null()))
        .or_else(|| node.get("default"))
        .or_else(|| node.get("example"))?;
    match sample {
        Value::String(_) => Some("string"),
        Value::Bool(_) => Some("boolean"),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some("integer"),
        Value::Number(_) => Some("number"),
        Value::Object(_) => Some("object"),
        Value::Array(_) | Value::Null => None,
    }
}
