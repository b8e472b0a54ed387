use tracing::trace;

use crate::ir::{Candidate, FieldSchema};
use crate::types::{MemberAccess, TypeSystem};

/// Depth-0 candidates, one per source value, in the given order.
pub fn seed<T: Clone>(sources: &[FieldSchema<T>]) -> Vec<Candidate<T>> {
    sources.iter().map(Candidate::root).collect()
}

/// All candidates from depth 0 through `depth`, level by level.
///
/// Level `i` is built only from level `i - 1`, never from the cumulative set,
/// so a path has at most `depth + 1` segments however the types recurse.
pub fn expand<S: TypeSystem>(
    ts: &S,
    roots: Vec<Candidate<S::Type>>,
    depth: usize,
    access: MemberAccess,
) -> Result<Vec<Candidate<S::Type>>, S::Error> {
    let mut all = roots.clone();
    let mut frontier = roots;

    for level in 1..=depth {
        let mut next = Vec::new();
        for parent in &frontier {
            for member in ts.members(&parent.ty, access)? {
                next.push(parent.child(&member));
            }
        }
        trace!(level, count = next.len(), "expanded candidate level");
        if next.is_empty() {
            break;
        }
        all.extend_from_slice(&next);
        frontier = next;
    }

    Ok(all)
}
