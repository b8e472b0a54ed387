//! Infer the body of an empty mapper: which source value, or which member
//! reachable from one, fills each field of the result, and which enum case
//! each source case becomes.
pub mod analyze;
pub mod compat;
pub mod config;
pub mod error;
pub mod ir;
pub mod path_de;
pub mod report;
pub mod resolve;
pub mod similarity;
pub mod types;
pub mod world;

pub use analyze::{applicable_kinds, resolve_mapper, MapperKind, MapperSignature, Resolution};
pub use config::ResolveConfig;
pub use ir::{AdapterFunction, Candidate, EnumMapping, EnumMember, FieldSchema, Mapping, ResolvedExpression};
pub use types::{MemberAccess, TargetSource, TypeSystem};
pub use world::{TypeName, World};
