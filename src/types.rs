//! Boundary to the host type system.
//!
//! The resolver never owns types. It asks questions through [`TypeSystem`],
//! which is passed explicitly into every call, and treats the handles it gets
//! back as opaque.
use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::ir::{AdapterFunction, EnumMember, FieldSchema};

/// Which members of a type count as reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MemberAccess {
    /// Every member that can be read.
    Readable,
    /// Members with an accessible setter or initializer.
    #[default]
    Initializable,
    /// Members that can be reassigned after construction.
    Settable,
}

/// Where the fields of a constructed target come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSource {
    /// `new T { A = .., B = .. }`: the result type's initializable members.
    ObjectInitializer,
    /// `new T(a, b)`: parameters of the first non-default constructor.
    Constructor,
}

/// Read-only queries the resolver needs. Implementations must not mutate
/// anything observable through these calls.
///
/// Every query may fail: a malformed or unresolved type is reported through
/// `Self::Error` and the resolver hands that error back to its caller as is.
pub trait TypeSystem {
    type Type: Clone + Eq + Hash + Debug;
    type Error: std::error::Error + Send + Sync + 'static;

    fn is_enum(&self, ty: &Self::Type) -> Result<bool, Self::Error>;

    /// Enum cases in declaration order.
    fn enum_members(&self, ty: &Self::Type) -> Result<Vec<EnumMember<Self::Type>>, Self::Error>;

    /// Members of `ty` satisfying `access`, in a stable order.
    fn members(
        &self,
        ty: &Self::Type,
        access: MemberAccess,
    ) -> Result<Vec<FieldSchema<Self::Type>>, Self::Error>;

    /// Parameters of the first constructor that takes any, or `None`.
    fn constructor_parameters(
        &self,
        ty: &Self::Type,
    ) -> Result<Option<Vec<FieldSchema<Self::Type>>>, Self::Error>;

    fn is_subtype_of(&self, ty: &Self::Type, other: &Self::Type) -> Result<bool, Self::Error>;

    fn is_implicitly_convertible_to(
        &self,
        ty: &Self::Type,
        other: &Self::Type,
    ) -> Result<bool, Self::Error>;

    /// Unary functions accepting a `from` value, in a stable host order.
    /// May return a superset; callers check the return type against `to`.
    fn adapter_functions(
        &self,
        from: &Self::Type,
        to: &Self::Type,
    ) -> Result<Vec<AdapterFunction<Self::Type>>, Self::Error>;

    /// Resolve the target fields for a constructed `ty`. `None` when the source
    /// has nothing to offer (no non-default constructor).
    fn target_fields(
        &self,
        ty: &Self::Type,
        source: TargetSource,
    ) -> Result<Option<Vec<FieldSchema<Self::Type>>>, Self::Error> {
        match source {
            TargetSource::ObjectInitializer => {
                self.members(ty, MemberAccess::Initializable).map(Some)
            }
            TargetSource::Constructor => self.constructor_parameters(ty),
        }
    }
}
