//! A concrete [`TypeSystem`] described in JSON.
//!
//! ```json
//! {
//!   "types": {
//!     "string":  { "kind": "primitive" },
//!     "int":     { "kind": "primitive", "converts_to": ["long"] },
//!     "Address": { "kind": "struct", "fields": [{ "name": "City", "type": "string" }] },
//!     "Color":   { "kind": "enum", "members": ["Red", "Green"] }
//!   },
//!   "adapters": [{ "name": "ToText", "from": "int", "to": "string" }]
//! }
//! ```
//!
//! Struct fields default to `settable`; `init` fields can be initialized but
//! not reassigned, `read_only` fields can only be read. Members of supertypes
//! are inherited, listed after the type's own, one hierarchy level at a time.
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::WorldError;
use crate::ir::{AdapterFunction, EnumMember, FieldSchema};
use crate::path_de;
use crate::types::{MemberAccess, TypeSystem};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Handle into a [`World`]: the declared type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(pub String);

impl From<&str> for TypeName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldAccess {
    ReadOnly,
    Init,
    #[default]
    Settable,
}

impl FieldAccess {
    fn satisfies(self, wanted: MemberAccess) -> bool {
        match wanted {
            MemberAccess::Readable => true,
            MemberAccess::Initializable => matches!(self, Self::Init | Self::Settable),
            MemberAccess::Settable => matches!(self, Self::Settable),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeName,
    #[serde(default)]
    pub access: FieldAccess,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeName,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDecl {
    Primitive {
        #[serde(default)]
        converts_to: Vec<TypeName>,
    },
    Struct {
        #[serde(default)]
        fields: Vec<FieldDecl>,
        #[serde(default)]
        supertypes: Vec<TypeName>,
        #[serde(default)]
        constructors: Vec<Vec<ParamDecl>>,
        #[serde(default)]
        converts_to: Vec<TypeName>,
    },
    Enum {
        members: Vec<String>,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdapterDecl {
    pub name: String,
    pub from: TypeName,
    pub to: TypeName,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct World {
    #[serde(default)]
    types: IndexMap<TypeName, TypeDecl>,
    #[serde(default)]
    adapters: Vec<AdapterDecl>,
}

// ————————————————————————————————————————————————————————————————————————————
// LOADING
// ————————————————————————————————————————————————————————————————————————————

impl World {
    pub fn parse(src: &str) -> Result<Self, WorldError> {
        let world: Self = path_de::from_str_with_path(src)?;
        world.validate()?;
        Ok(world)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, WorldError> {
        let world: Self = path_de::from_value_with_path(value)?;
        world.validate()?;
        Ok(world)
    }

    pub fn load(path: &Path) -> Result<Self, WorldError> {
        let src = std::fs::read_to_string(path).map_err(|source| WorldError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&src)
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Every type name mentioned anywhere must be declared.
    fn validate(&self) -> Result<(), WorldError> {
        let check = |owner: &str, referenced: &TypeName| -> Result<(), WorldError> {
            if self.types.contains_key(referenced) {
                Ok(())
            } else {
                Err(WorldError::UnknownTypeReference {
                    owner: owner.to_string(),
                    referenced: referenced.0.clone(),
                })
            }
        };

        for (name, decl) in &self.types {
            match decl {
                TypeDecl::Primitive { converts_to } => {
                    for t in converts_to {
                        check(&name.0, t)?;
                    }
                }
                TypeDecl::Struct { fields, supertypes, constructors, converts_to } => {
                    for f in fields {
                        check(&name.0, &f.ty)?;
                    }
                    for t in supertypes.iter().chain(converts_to) {
                        check(&name.0, t)?;
                    }
                    for p in constructors.iter().flatten() {
                        check(&name.0, &p.ty)?;
                    }
                }
                TypeDecl::Enum { .. } => {}
            }
        }
        for adapter in &self.adapters {
            check(&adapter.name, &adapter.from)?;
            check(&adapter.name, &adapter.to)?;
        }
        Ok(())
    }

    fn decl(&self, ty: &TypeName) -> Result<&TypeDecl, WorldError> {
        self.types.get(ty).ok_or_else(|| WorldError::UnknownType(ty.0.clone()))
    }

    /// `ty` followed by its supertypes, breadth first, each listed once.
    fn hierarchy(&self, ty: &TypeName) -> Result<Vec<&TypeName>, WorldError> {
        let (root, _) = self
            .types
            .get_key_value(ty)
            .ok_or_else(|| WorldError::UnknownType(ty.0.clone()))?;
        let mut seen: HashSet<&TypeName> = HashSet::from([root]);
        let mut out = vec![root];
        let mut level = vec![root];
        while !level.is_empty() {
            let mut next = Vec::new();
            for t in level {
                if let TypeDecl::Struct { supertypes, .. } = self.decl(t)? {
                    for s in supertypes {
                        if seen.insert(s) {
                            out.push(s);
                            next.push(s);
                        }
                    }
                }
            }
            level = next;
        }
        Ok(out)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TYPE SYSTEM
// ————————————————————————————————————————————————————————————————————————————

impl TypeSystem for World {
    type Type = TypeName;
    type Error = WorldError;

    fn is_enum(&self, ty: &TypeName) -> Result<bool, WorldError> {
        Ok(matches!(self.decl(ty)?, TypeDecl::Enum { .. }))
    }

    fn enum_members(&self, ty: &TypeName) -> Result<Vec<EnumMember<TypeName>>, WorldError> {
        match self.decl(ty)? {
            TypeDecl::Enum { members } => Ok(members
                .iter()
                .map(|name| EnumMember { name: name.clone(), owner: ty.clone() })
                .collect()),
            _ => Err(WorldError::NotAnEnum(ty.0.clone())),
        }
    }

    fn members(
        &self,
        ty: &TypeName,
        access: MemberAccess,
    ) -> Result<Vec<FieldSchema<TypeName>>, WorldError> {
        let mut out = Vec::new();
        for t in self.hierarchy(ty)? {
            if let TypeDecl::Struct { fields, .. } = self.decl(t)? {
                out.extend(
                    fields
                        .iter()
                        .filter(|f| f.access.satisfies(access))
                        .map(|f| FieldSchema::new(f.name.clone(), f.ty.clone())),
                );
            }
        }
        Ok(out)
    }

    fn constructor_parameters(
        &self,
        ty: &TypeName,
    ) -> Result<Option<Vec<FieldSchema<TypeName>>>, WorldError> {
        match self.decl(ty)? {
            TypeDecl::Struct { constructors, .. } => Ok(constructors
                .iter()
                .find(|params| !params.is_empty())
                .map(|params| {
                    params.iter().map(|p| FieldSchema::new(p.name.clone(), p.ty.clone())).collect()
                })),
            _ => Ok(None),
        }
    }

    fn is_subtype_of(&self, ty: &TypeName, other: &TypeName) -> Result<bool, WorldError> {
        self.decl(other)?;
        Ok(self.hierarchy(ty)?.into_iter().any(|t| t == other))
    }

    fn is_implicitly_convertible_to(
        &self,
        ty: &TypeName,
        other: &TypeName,
    ) -> Result<bool, WorldError> {
        self.decl(other)?;
        Ok(match self.decl(ty)? {
            TypeDecl::Primitive { converts_to } | TypeDecl::Struct { converts_to, .. } => {
                converts_to.contains(other)
            }
            TypeDecl::Enum { .. } => false,
        })
    }

    fn adapter_functions(
        &self,
        from: &TypeName,
        to: &TypeName,
    ) -> Result<Vec<AdapterFunction<TypeName>>, WorldError> {
        self.decl(to)?;
        let mut out = Vec::new();
        for adapter in &self.adapters {
            if self.is_subtype_of(from, &adapter.from)? {
                out.push(AdapterFunction { name: adapter.name.clone(), return_type: adapter.to.clone() });
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn t(name: &str) -> TypeName {
        TypeName::from(name)
    }

    fn names(fields: &[FieldSchema<TypeName>]) -> Vec<&str> {
        fields.iter().map(|f| f.name.as_str()).collect()
    }

    fn zoo() -> World {
        World::from_value(json!({
            "types": {
                "string": { "kind": "primitive" },
                "Entity": {
                    "kind": "struct",
                    "fields": [{ "name": "Id", "type": "string", "access": "init" }]
                },
                "Named": {
                    "kind": "struct",
                    "fields": [{ "name": "Name", "type": "string" }],
                    "supertypes": ["Entity"]
                },
                "Pet": {
                    "kind": "struct",
                    "fields": [
                        { "name": "Nickname", "type": "string" },
                        { "name": "Species", "type": "string", "access": "read_only" }
                    ],
                    "supertypes": ["Named", "Entity"],
                    "constructors": [[], [{ "name": "nickname", "type": "string" }]]
                },
                "Loop": { "kind": "struct", "supertypes": ["Loop"] },
                "Kind": { "kind": "enum", "members": ["Cat", "Dog"] }
            }
        }))
        .unwrap()
    }

    #[test]
    fn members_respect_access_and_inheritance_order() {
        let w = zoo();
        let readable = w.members(&t("Pet"), MemberAccess::Readable).unwrap();
        assert_eq!(names(&readable), vec!["Nickname", "Species", "Name", "Id"]);

        let init = w.members(&t("Pet"), MemberAccess::Initializable).unwrap();
        assert_eq!(names(&init), vec!["Nickname", "Name", "Id"]);

        let settable = w.members(&t("Pet"), MemberAccess::Settable).unwrap();
        assert_eq!(names(&settable), vec!["Nickname", "Name"]);
    }

    #[test]
    fn subtyping_is_reflexive_and_transitive() {
        let w = zoo();
        assert!(w.is_subtype_of(&t("Pet"), &t("Pet")).unwrap());
        assert!(w.is_subtype_of(&t("Pet"), &t("Entity")).unwrap());
        assert!(!w.is_subtype_of(&t("Entity"), &t("Pet")).unwrap());
    }

    #[test]
    fn cyclic_hierarchy_terminates() {
        let w = zoo();
        assert!(w.members(&t("Loop"), MemberAccess::Readable).unwrap().is_empty());
        assert!(!w.is_subtype_of(&t("Loop"), &t("Pet")).unwrap());
    }

    #[test]
    fn first_non_default_constructor_is_used() {
        let w = zoo();
        let params = w.constructor_parameters(&t("Pet")).unwrap().unwrap();
        assert_eq!(names(&params), vec!["nickname"]);
        assert!(w.constructor_parameters(&t("Named")).unwrap().is_none());
    }

    #[test]
    fn enum_queries() {
        let w = zoo();
        assert!(w.is_enum(&t("Kind")).unwrap());
        assert!(!w.is_enum(&t("Pet")).unwrap());
        let members = w.enum_members(&t("Kind")).unwrap();
        assert_eq!(members.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(), vec!["Cat", "Dog"]);
        assert!(matches!(w.enum_members(&t("Pet")), Err(WorldError::NotAnEnum(_))));
    }

    #[test]
    fn undeclared_reference_rejected_at_load() {
        let err = World::from_value(json!({
            "types": { "A": { "kind": "struct", "fields": [{ "name": "b", "type": "B" }] } }
        }))
        .unwrap_err();
        assert!(matches!(err, WorldError::UnknownTypeReference { ref referenced, .. } if referenced == "B"));
    }

    #[test]
    fn parse_error_reports_json_path() {
        let err = World::parse(r#"{"types": {"A": {"kind": "struct", "fields": [{"name": 3}]}}}"#)
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("types.A"), "{msg}");
    }

    #[test]
    fn querying_unknown_type_faults() {
        let w = zoo();
        assert!(matches!(w.is_enum(&t("Ghost")), Err(WorldError::UnknownType(ref n)) if n == "Ghost"));
    }
}
