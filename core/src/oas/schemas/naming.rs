#![deny(missing_docs)]

//! # Naming Utilities
//!
//! Helpers for deriving schema map keys: PascalCase conversion, synthesized names for
//! anonymous operation bodies, and collision suffixing (`Foo`, `Foo2`, `Foo3`, ...).

use heck::ToPascalCase;
use std::collections::HashSet;

/// Converts an arbitrary identifier (snake_case, kebab-case, camelCase, ...) to PascalCase.
///
/// Characters that cannot appear in an identifier act as word separators.
pub fn to_pascal_case(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned.to_pascal_case()
}

/// Suffix identifying the body slot of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodySlot<'a> {
    /// The request body.
    Request,
    /// A response, keyed by status code (`200`, `4XX`, `default`).
    Response(&'a str),
}

/// Synthesizes `{HttpMethod}{PascalCasePathSegments}{StatusCodeOrRequest}Schema`.
///
/// e.g. `POST /users/{id}/pets` request -> `PostUsersIdPetsRequestSchema`,
/// `GET /` `200` -> `GetRoot200Schema`.
pub fn inline_schema_name(method: &str, path: &str, slot: BodySlot<'_>) -> String {
    let method_part = to_pascal_case(&method.to_lowercase());
    let mut path_part: String = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| to_pascal_case(segment.trim_matches(|c| c == '{' || c == '}')))
        .collect();
    if path_part.is_empty() {
        path_part.push_str("Root");
    }
    let slot_part = match slot {
        BodySlot::Request => "Request".to_string(),
        BodySlot::Response(code) => {
            let code = to_pascal_case(code);
            if code.is_empty() {
                "Response".to_string()
            } else {
                code
            }
        }
    };
    format!("{}{}{}Schema", method_part, path_part, slot_part)
}

/// Name of a hoisted property structure: `{parent}{PascalCase(property)}`.
pub fn property_schema_name(parent: &str, property: &str) -> String {
    let property = to_pascal_case(property);
    if property.is_empty() {
        format!("{}Property", parent)
    } else {
        format!("{}{}", parent, property)
    }
}

/// Hands out unique names.
///
/// The first request for a base gets the base itself, later ones get `{base}2`,
/// `{base}3`, ... The sequence only depends on request order, so identical input
/// always yields identical names.
#[derive(Debug, Default)]
pub struct NameAllocator {
    taken: HashSet<String>,
}

impl NameAllocator {
    /// Creates an allocator with nothing taken.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `name` as taken without going through suffixing.
    ///
    /// Returns false if it was already taken.
    pub fn reserve(&mut self, name: &str) -> bool {
        self.taken.insert(name.to_string())
    }

    /// True if `name` has been handed out or reserved.
    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Returns `base`, or the first free `{base}{n}` for n >= 2, and marks it taken.
    pub fn allocate(&mut self, base: &str) -> String {
        let base = if base.is_empty() { "Schema" } else { base };
        if self.taken.insert(base.to_string()) {
            return base.to_string();
        }
        let mut n = 2usize;
        loop {
            let candidate = format!("{}{}", base, n);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}
