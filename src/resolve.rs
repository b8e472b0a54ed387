//! Structural mapping resolver.
//!
//! Two schemas that were never designed to line up, and only names and types
//! to go on. Source parameters are expanded into nested candidates, every
//! target field is scanned against them, and the best name/type match wins.
//!
//! Design goals:
//! - Greedy and order-dependent: first exact match wins, no global assignment.
//! - Unresolved is a normal outcome; the caller fills those in by hand.
//! - Pure over its inputs; the type system is passed in, never stored.
//! - Depth is the only bound on expansion, so cyclic types are harmless.
pub mod enums;
pub mod expand;
pub mod props;

pub use enums::{map_enum, map_enum_types};
pub use expand::{expand, seed};
pub use props::{map_properties, map_properties_for};
