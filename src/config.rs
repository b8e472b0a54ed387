use serde::{Deserialize, Serialize};

use crate::types::MemberAccess;

/// Default number of member hops explored below each parameter.
pub const DEFAULT_DEPTH: usize = 3;

/// Knobs of one resolution. Every field has a default, so a request file can
/// carry a partial `"config"` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolveConfig {
    /// Maximum member hops from a parameter; paths get at most `depth + 1` segments.
    pub depth: usize,
    /// Which nested source members are reachable during expansion.
    pub member_access: MemberAccess,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self { depth: DEFAULT_DEPTH, member_access: MemberAccess::Initializable }
    }
}

impl ResolveConfig {
    pub fn with_depth(self, depth: usize) -> Self {
        Self { depth, ..self }
    }
}
