use std::collections::HashMap;
use std::hash::Hash;

use tracing::{debug, instrument};

use crate::ir::{EnumMapping, EnumMember};
use crate::similarity;
use crate::types::TypeSystem;

/// Map each source case onto a target case by name alone.
///
/// Exact (case-insensitive) names map directly. Otherwise the target with the
/// smallest [`similarity::distance`] is taken if it clears the closeness
/// threshold; ties go to the earlier target. Target cases nobody maps to are
/// simply absent.
pub fn map_enum<T: Clone + Hash + Eq>(
    source: &[EnumMember<T>],
    target: &[EnumMember<T>],
) -> EnumMapping<T> {
    // duplicate names: the later declaration wins
    let by_name: HashMap<String, &EnumMember<T>> =
        target.iter().map(|m| (m.name.to_lowercase(), m)).collect();

    let mut out = EnumMapping::default();
    for member in source {
        if let Some(&exact) = by_name.get(&member.name.to_lowercase()) {
            out.mapped.insert(member.clone(), exact.clone());
            continue;
        }
        match closest(member, target) {
            Some(found) => {
                debug!(from = %member.name, to = %found.name, "enum member matched by similarity");
                out.mapped.insert(member.clone(), found.clone());
            }
            None => {
                debug!(from = %member.name, "enum member left unmapped");
                out.unmapped.push(member.clone());
            }
        }
    }
    out
}

fn closest<'a, T>(member: &EnumMember<T>, target: &'a [EnumMember<T>]) -> Option<&'a EnumMember<T>> {
    let mut best: Option<(&EnumMember<T>, usize)> = None;
    for candidate in target {
        let d = similarity::distance(&member.name, &candidate.name);
        if best.is_none_or(|(_, current)| d < current) {
            best = Some((candidate, d));
        }
    }
    let (found, d) = best?;
    (d <= similarity::closeness_threshold(&member.name, &found.name)).then_some(found)
}

/// [`map_enum`] over the members of two enum types.
#[instrument(skip(ts))]
pub fn map_enum_types<S: TypeSystem>(
    ts: &S,
    source: &S::Type,
    target: &S::Type,
) -> Result<EnumMapping<S::Type>, S::Error> {
    let source_members = ts.enum_members(source)?;
    let target_members = ts.enum_members(target)?;
    Ok(map_enum(&source_members, &target_members))
}
