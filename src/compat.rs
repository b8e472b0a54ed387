//! Type compatibility: can a candidate value go straight into a target slot,
//! and if not, is there an adapter function that bridges the two.
use tracing::debug;

use crate::ir::AdapterFunction;
use crate::types::TypeSystem;

pub fn is_assignable<S: TypeSystem>(
    ts: &S,
    candidate: &S::Type,
    target: &S::Type,
) -> Result<bool, S::Error> {
    Ok(ts.is_subtype_of(candidate, target)? || ts.is_implicitly_convertible_to(candidate, target)?)
}

/// Adapter turning `candidate` into something assignable to `target`.
///
/// This is the expensive query; only call it for pairs whose names are already
/// close. When several adapters qualify the shortest name wins, then the
/// lexically smallest, then host order.
pub fn find_adapter<S: TypeSystem>(
    ts: &S,
    candidate: &S::Type,
    target: &S::Type,
) -> Result<Option<AdapterFunction<S::Type>>, S::Error> {
    let mut accepted = Vec::new();
    for adapter in ts.adapter_functions(candidate, target)? {
        if is_assignable(ts, &adapter.return_type, target)? {
            accepted.push(adapter);
        }
    }

    if accepted.len() > 1 {
        debug!(
            candidates = ?accepted.iter().map(|a| a.name.as_str()).collect::<Vec<_>>(),
            "several adapters qualify; picking shortest name"
        );
    }

    Ok(accepted
        .into_iter()
        .enumerate()
        .min_by(|(ia, a), (ib, b)| {
            a.name
                .chars()
                .count()
                .cmp(&b.name.chars().count())
                .then_with(|| a.name.cmp(&b.name))
                .then(ia.cmp(ib))
        })
        .map(|(_, adapter)| adapter))
}
