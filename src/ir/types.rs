//! The recursive type model shared by API definitions and the IR.
//!
//! A `DynamicType` is a language-agnostic description of a data shape:
//! - primitives (string, integer, float, boolean, timestamp, any, void)
//! - references to user-defined entities
//! - arrays with exactly one element type
//! - parameterized (generic) references such as `Observable<Pet>`

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;

use crate::error::TypeError;

/// Kind tag of a `DynamicType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TypeKind {
    #[default]
    #[serde(alias = "void")]
    Void,
    #[serde(alias = "string")]
    String,
    #[serde(alias = "integer")]
    Integer,
    #[serde(alias = "float")]
    Float,
    #[serde(alias = "boolean")]
    Boolean,
    #[serde(alias = "timestamp")]
    Timestamp,
    #[serde(alias = "any")]
    Any,
    #[serde(alias = "user")]
    User,
    #[serde(alias = "array")]
    Array,
    #[serde(alias = "generic")]
    Generic,
}

impl TypeKind {
    /// Wire name, as written in `typeID`.
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Void => "VOID",
            TypeKind::String => "STRING",
            TypeKind::Integer => "INTEGER",
            TypeKind::Float => "FLOAT",
            TypeKind::Boolean => "BOOLEAN",
            TypeKind::Timestamp => "TIMESTAMP",
            TypeKind::Any => "ANY",
            TypeKind::User => "USER",
            TypeKind::Array => "ARRAY",
            TypeKind::Generic => "GENERIC",
        }
    }

    /// Primitive kinds ignore `reference` and `inner`.
    pub fn is_primitive(&self) -> bool {
        !matches!(self, TypeKind::User | TypeKind::Array | TypeKind::Generic)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-declared type, possibly nested.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct DynamicType {
    #[serde(rename = "typeID", default)]
    pub kind: TypeKind,
    /// Entity name for `USER`, generic name for `GENERIC`, unused otherwise
    #[serde(default)]
    pub reference: String,
    /// Element type for `ARRAY`, type arguments for `GENERIC`
    #[serde(default, alias = "nested")]
    pub inner: Vec<DynamicType>,
}

impl DynamicType {
    /// The absent type, e.g. an endpoint without a response body.
    pub fn void() -> Self {
        Self::default()
    }

    /// A bare type of the given kind. Only meaningful for primitive kinds.
    pub fn primitive(kind: TypeKind) -> Self {
        Self {
            kind,
            reference: String::new(),
            inner: Vec::new(),
        }
    }

    /// Reference to a user-defined entity.
    pub fn user(name: impl Into<String>) -> Self {
        Self {
            kind: TypeKind::User,
            reference: name.into(),
            inner: Vec::new(),
        }
    }

    /// Array of `element`.
    pub fn array(element: DynamicType) -> Self {
        Self {
            kind: TypeKind::Array,
            reference: String::new(),
            inner: vec![element],
        }
    }

    /// `name<args...>`. An empty `args` is a bare generic name.
    pub fn generic(name: impl Into<String>, args: Vec<DynamicType>) -> Self {
        Self {
            kind: TypeKind::Generic,
            reference: name.into(),
            inner: args,
        }
    }

    pub fn is_void(&self) -> bool {
        self.kind == TypeKind::Void
    }

    /// Element type of an array.
    pub fn array_element(&self) -> Result<&DynamicType, TypeError> {
        if self.kind != TypeKind::Array {
            return Err(TypeError::NotAnArray(self.kind));
        }
        match self.inner.as_slice() {
            [element] => Ok(element),
            [] => Err(TypeError::ArrayWithoutElement),
            many => Err(TypeError::ArrayArity(many.len())),
        }
    }

    /// Name of a generic type, e.g. `Observable` for `Observable<Pet>`.
    pub fn generic_name(&self) -> Result<&str, TypeError> {
        if self.kind != TypeKind::Generic {
            return Err(TypeError::NotAGeneric(self.kind));
        }
        if self.reference.is_empty() {
            return Err(TypeError::GenericWithoutName);
        }
        Ok(&self.reference)
    }

    /// Check the structural invariants of this type and everything nested in it.
    pub fn validate(&self) -> Result<(), TypeError> {
        match self.kind {
            TypeKind::User if self.reference.is_empty() => {
                return Err(TypeError::UserWithoutReference);
            }
            TypeKind::Array => {
                self.array_element()?;
            }
            TypeKind::Generic => {
                self.generic_name()?;
            }
            _ => {}
        }

        if self.kind.is_primitive() {
            return Ok(());
        }

        self.inner.iter().try_for_each(DynamicType::validate)
    }

    /// Every non-empty type name reachable from this type, without duplicates.
    pub fn type_references(&self) -> BTreeSet<String> {
        let mut references = BTreeSet::new();
        self.collect_references_into(&mut references);
        references
    }

    /// Accumulate the references of this type into an existing set.
    pub fn collect_references_into(&self, references: &mut BTreeSet<String>) {
        if !self.reference.is_empty() && !self.kind.is_primitive() {
            references.insert(self.reference.clone());
        }
        for inner in &self.inner {
            inner.collect_references_into(references);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn container() -> DynamicType {
        DynamicType::generic(
            "Container",
            vec![
                DynamicType::primitive(TypeKind::Integer),
                DynamicType::user("Magic"),
                DynamicType::array(DynamicType::user("World")),
            ],
        )
    }

    #[test]
    fn test_type_references_collects_nested_names() {
        let refs = container().type_references();
        let expected: BTreeSet<String> = ["Container", "Magic", "World"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(refs, expected);
    }

    #[test]
    fn test_type_references_deduplicates_and_skips_empty() {
        let ty = DynamicType::generic(
            "Pair",
            vec![
                DynamicType::user("Pet"),
                DynamicType::array(DynamicType::array(DynamicType::user("Pet"))),
            ],
        );
        let refs = ty.type_references();
        assert_eq!(refs.len(), 2);
        assert!(refs.contains("Pair"));
        assert!(refs.contains("Pet"));
        assert!(!refs.contains(""));
    }

    #[test]
    fn test_type_references_of_primitive_is_empty() {
        assert!(DynamicType::primitive(TypeKind::String)
            .type_references()
            .is_empty());
        assert!(DynamicType::void().type_references().is_empty());
    }

    #[test]
    fn test_primitive_ignores_stray_reference() {
        let ty = DynamicType {
            kind: TypeKind::String,
            reference: "Ignored".into(),
            inner: vec![],
        };
        assert!(ty.type_references().is_empty());
        assert!(ty.validate().is_ok());
    }

    #[test]
    fn test_array_element() {
        let ty = DynamicType::array(DynamicType::primitive(TypeKind::Integer));
        assert_eq!(
            ty.array_element().unwrap(),
            &DynamicType::primitive(TypeKind::Integer)
        );
    }

    #[test]
    fn test_array_element_rejects_non_array() {
        let ty = DynamicType::primitive(TypeKind::Integer);
        assert_eq!(
            ty.array_element(),
            Err(TypeError::NotAnArray(TypeKind::Integer))
        );
    }

    #[test]
    fn test_array_element_rejects_missing_element() {
        let ty = DynamicType::primitive(TypeKind::Array);
        assert_eq!(ty.array_element(), Err(TypeError::ArrayWithoutElement));
    }

    #[test]
    fn test_validate_finds_nested_malformed_types() {
        let ty = DynamicType::generic(
            "Page",
            vec![DynamicType::array(DynamicType::generic("", vec![]))],
        );
        assert_eq!(ty.validate(), Err(TypeError::GenericWithoutName));

        let ty = DynamicType::array(DynamicType::user(""));
        assert_eq!(ty.validate(), Err(TypeError::UserWithoutReference));

        let mut ty = DynamicType::array(DynamicType::user("A"));
        ty.inner.push(DynamicType::user("B"));
        assert_eq!(ty.validate(), Err(TypeError::ArrayArity(2)));
    }

    #[test]
    fn test_validate_accepts_well_formed_types() {
        assert!(container().validate().is_ok());
        assert!(DynamicType::generic("Empty", vec![]).validate().is_ok());
    }

    #[test]
    fn test_deserialize_from_json() {
        let json = r#"{
            "typeID": "GENERIC",
            "reference": "Page",
            "nested": [{ "typeID": "array", "inner": [{ "typeID": "USER", "reference": "Pet" }] }]
        }"#;
        let ty: DynamicType = serde_json::from_str(json).unwrap();
        assert_eq!(
            ty,
            DynamicType::generic("Page", vec![DynamicType::array(DynamicType::user("Pet"))])
        );
    }

    #[test]
    fn test_deserialize_defaults_to_void() {
        let ty: DynamicType = serde_json::from_str("{}").unwrap();
        assert!(ty.is_void());
    }
}
