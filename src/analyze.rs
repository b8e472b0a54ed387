//! Mapper signatures: the cheap "is this worth offering" check, kept apart
//! from the expensive resolution that only runs when asked for.
use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::ResolveConfig;
use crate::error::AnalyzeError;
use crate::ir::{EnumMapping, FieldSchema, Mapping};
use crate::resolve::{map_enum_types, map_properties_for};
use crate::types::{TargetSource, TypeSystem};

/// An empty mapper method as the host sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapperSignature<T> {
    pub name: String,
    pub parameters: Vec<FieldSchema<T>>,
    /// `None` for a method returning nothing.
    pub returns: Option<T>,
    #[serde(default)]
    pub has_body: bool,
    /// Whether the first parameter is the receiver (`this T source`).
    #[serde(default = "default_true")]
    pub is_extension: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MapperKind {
    /// `switch` from one enum onto another.
    Enum,
    /// Object initializer over the result's initializable members.
    Object,
    /// Call of the result's first non-default constructor.
    Constructor,
}

impl MapperKind {
    fn target_source(self) -> Option<TargetSource> {
        match self {
            Self::Enum => None,
            Self::Object => Some(TargetSource::ObjectInitializer),
            Self::Constructor => Some(TargetSource::Constructor),
        }
    }
}

impl fmt::Display for MapperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Enum => "enum",
            Self::Object => "object",
            Self::Constructor => "constructor",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "mapping", rename_all = "snake_case")]
pub enum Resolution<T: Hash + Eq> {
    Enum(EnumMapping<T>),
    Object(Mapping<T>),
    Constructor(Mapping<T>),
}

impl<T: Hash + Eq> Resolution<T> {
    pub fn kind(&self) -> MapperKind {
        match self {
            Self::Enum(_) => MapperKind::Enum,
            Self::Object(_) => MapperKind::Object,
            Self::Constructor(_) => MapperKind::Constructor,
        }
    }
}

/// Shape checks shared by every kind: empty, extension-style, has a source,
/// returns something.
fn is_mapper_shaped<T>(sig: &MapperSignature<T>) -> Option<(&T, &T)> {
    if sig.has_body || !sig.is_extension {
        return None;
    }
    let source = &sig.parameters.first()?.ty;
    let returns = sig.returns.as_ref()?;
    Some((source, returns))
}

/// Every kind of mapper that could be generated for `sig`, in the order
/// Enum, Object, Constructor. Only asks the type system cheap questions.
pub fn applicable_kinds<S: TypeSystem>(
    ts: &S,
    sig: &MapperSignature<S::Type>,
) -> Result<Vec<MapperKind>, S::Error> {
    let Some((source, returns)) = is_mapper_shaped(sig) else {
        return Ok(Vec::new());
    };

    let source_enum = ts.is_enum(source)?;
    let returns_enum = ts.is_enum(returns)?;

    let mut kinds = Vec::new();
    if source_enum && returns_enum {
        kinds.push(MapperKind::Enum);
    }
    if !source_enum && !returns_enum {
        kinds.push(MapperKind::Object);
        if ts.constructor_parameters(returns)?.is_some() {
            kinds.push(MapperKind::Constructor);
        }
    }
    Ok(kinds)
}

/// Run the resolver for one mapper. This is the expensive path.
#[instrument(skip(ts, sig, config), fields(mapper = %sig.name))]
pub fn resolve_mapper<S: TypeSystem>(
    ts: &S,
    sig: &MapperSignature<S::Type>,
    kind: MapperKind,
    config: &ResolveConfig,
) -> Result<Resolution<S::Type>, AnalyzeError<S::Error>> {
    let not_applicable = || AnalyzeError::NotApplicable { mapper: sig.name.clone(), kind };

    if !applicable_kinds(ts, sig).map_err(AnalyzeError::TypeSystem)?.contains(&kind) {
        return Err(not_applicable());
    }
    let (source, returns) = is_mapper_shaped(sig).ok_or_else(not_applicable)?;

    let resolution = match kind.target_source() {
        None => Resolution::Enum(map_enum_types(ts, source, returns).map_err(AnalyzeError::TypeSystem)?),
        Some(target_source) => {
            let mapping = map_properties_for(ts, returns, target_source, &sig.parameters, config)
                .map_err(AnalyzeError::TypeSystem)?
                .ok_or_else(not_applicable)?;
            match target_source {
                TargetSource::ObjectInitializer => Resolution::Object(mapping),
                TargetSource::Constructor => Resolution::Constructor(mapping),
            }
        }
    };

    info!(kind = %kind, "mapper resolved");
    Ok(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{TypeName, World};
    use serde_json::json;

    fn world() -> World {
        World::from_value(json!({
            "types": {
                "string": { "kind": "primitive" },
                "Color": { "kind": "enum", "members": ["Red", "Green", "Blue"] },
                "Paint": { "kind": "enum", "members": ["Red", "Green", "Blue"] },
                "Order": {
                    "kind": "struct",
                    "fields": [{ "name": "Title", "type": "string" }]
                },
                "OrderDto": {
                    "kind": "struct",
                    "fields": [{ "name": "Title", "type": "string" }]
                },
                "OrderRecord": {
                    "kind": "struct",
                    "fields": [{ "name": "Title", "type": "string", "access": "read_only" }],
                    "constructors": [[{ "name": "title", "type": "string" }]]
                }
            }
        }))
        .unwrap()
    }

    fn sig(params: &[(&str, &str)], returns: Option<&str>) -> MapperSignature<TypeName> {
        MapperSignature {
            name: "Map".to_string(),
            parameters: params.iter().map(|(n, t)| FieldSchema::new(*n, TypeName::from(*t))).collect(),
            returns: returns.map(TypeName::from),
            has_body: false,
            is_extension: true,
        }
    }

    #[test]
    fn kinds_follow_source_and_result_shapes() {
        let w = world();
        assert_eq!(applicable_kinds(&w, &sig(&[("c", "Color")], Some("Paint"))).unwrap(), vec![MapperKind::Enum]);
        assert_eq!(applicable_kinds(&w, &sig(&[("o", "Order")], Some("OrderDto"))).unwrap(), vec![MapperKind::Object]);
        assert_eq!(
            applicable_kinds(&w, &sig(&[("o", "Order")], Some("OrderRecord"))).unwrap(),
            vec![MapperKind::Object, MapperKind::Constructor]
        );
        // enum on one side only
        assert!(applicable_kinds(&w, &sig(&[("c", "Color")], Some("OrderDto"))).unwrap().is_empty());
    }

    #[test]
    fn non_mapper_shapes_are_rejected_cheaply() {
        let w = world();
        assert!(applicable_kinds(&w, &sig(&[], Some("OrderDto"))).unwrap().is_empty());
        assert!(applicable_kinds(&w, &sig(&[("o", "Order")], None)).unwrap().is_empty());

        let mut with_body = sig(&[("o", "Order")], Some("OrderDto"));
        with_body.has_body = true;
        assert!(applicable_kinds(&w, &with_body).unwrap().is_empty());

        let mut not_extension = sig(&[("o", "Order")], Some("OrderDto"));
        not_extension.is_extension = false;
        assert!(applicable_kinds(&w, &not_extension).unwrap().is_empty());
    }

    #[test]
    fn resolve_dispatches_on_kind() {
        let w = world();
        let config = ResolveConfig::default();

        let Resolution::Enum(m) = resolve_mapper(&w, &sig(&[("c", "Color")], Some("Paint")), MapperKind::Enum, &config).unwrap()
        else {
            panic!("expected enum resolution");
        };
        assert_eq!(m.mapped.len(), 3);

        let r = resolve_mapper(&w, &sig(&[("o", "Order")], Some("OrderRecord")), MapperKind::Constructor, &config).unwrap();
        let Resolution::Constructor(m) = &r else { panic!("expected constructor resolution") };
        assert_eq!(m.get_by_name("title").map(|e| e.render()).as_deref(), Some("o.Title"));
        assert_eq!(r.kind(), MapperKind::Constructor);
    }

    #[test]
    fn requesting_inapplicable_kind_fails() {
        let w = world();
        let err = resolve_mapper(
            &w,
            &sig(&[("o", "Order")], Some("OrderDto")),
            MapperKind::Constructor,
            &ResolveConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AnalyzeError::NotApplicable { kind: MapperKind::Constructor, .. }));
    }

    #[test]
    fn type_fault_surfaces_unchanged() {
        let w = world();
        let err = resolve_mapper(&w, &sig(&[("g", "Ghost")], Some("OrderDto")), MapperKind::Object, &ResolveConfig::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "unknown type: Ghost");
    }

    #[test]
    fn signature_deserializes_with_defaults() {
        let s: MapperSignature<TypeName> = serde_json::from_value(json!({
            "name": "ToDto",
            "parameters": [{ "name": "order", "type": "Order" }],
            "returns": "OrderDto"
        }))
        .unwrap();
        assert!(s.is_extension);
        assert!(!s.has_body);
        assert_eq!(s.parameters[0].ty, TypeName::from("Order"));
    }
}
