//! Greedy field matcher.
//!
//! For each target field, in declaration order, candidates are scanned in
//! generation order (depth 0 first). The first candidate whose name matches
//! exactly and whose type fits (directly or through an adapter) wins outright.
//! Failing that, the type-compatible candidate with the closest name wins,
//! earliest on ties. Failing that, the field stays unresolved.
use tracing::{debug, instrument, trace};

use super::expand::{expand, seed};
use crate::compat;
use crate::config::ResolveConfig;
use crate::ir::{AdapterFunction, Candidate, FieldSchema, Mapping, ResolvedExpression};
use crate::similarity;
use crate::types::{TargetSource, TypeSystem};

/// How one candidate relates to one target field.
#[derive(Debug, Clone)]
struct Comparison<T> {
    names_match: bool,
    best_distance: usize,
    names_similar: bool,
    assignable: bool,
    adapter: Option<AdapterFunction<T>>,
}

impl<T> Comparison<T> {
    fn type_fits(&self) -> bool {
        self.assignable || self.adapter.is_some()
    }
}

fn compare<S: TypeSystem>(
    ts: &S,
    candidate: &Candidate<S::Type>,
    target: &FieldSchema<S::Type>,
) -> Result<Comparison<S::Type>, S::Error> {
    let target_lower = target.name.to_lowercase();

    let names_match = candidate.name_variants.iter().any(|v| *v == target_lower);

    let distances: Vec<(&str, usize)> = candidate
        .name_variants
        .iter()
        .map(|v| (v.as_str(), similarity::distance(v, &target_lower)))
        .collect();
    let best_distance = distances.iter().map(|(_, d)| *d).min().unwrap_or(usize::MAX);
    // any variant reaching the best distance may vouch for closeness
    let names_similar = distances.iter().any(|(variant, d)| {
        *d == best_distance && *d <= similarity::closeness_threshold(variant, &target_lower)
    });

    let assignable = compat::is_assignable(ts, &candidate.ty, &target.ty)?;
    let adapter = if !assignable && names_similar {
        compat::find_adapter(ts, &candidate.ty, &target.ty)?
    } else {
        None
    };

    Ok(Comparison { names_match, best_distance, names_similar, assignable, adapter })
}

fn resolved<T>(candidate: &Candidate<T>, adapter: Option<AdapterFunction<T>>) -> ResolvedExpression<T> {
    ResolvedExpression { path: candidate.expression_path.clone(), used_adapter: adapter }
}

/// Resolve every target field against `sources` and their nested members.
///
/// The returned mapping has exactly one entry per target field; fields with no
/// acceptable candidate map to `None`.
#[instrument(skip_all, fields(targets = targets.len(), sources = sources.len(), depth = config.depth))]
pub fn map_properties<S: TypeSystem>(
    ts: &S,
    targets: &[FieldSchema<S::Type>],
    sources: &[FieldSchema<S::Type>],
    config: &ResolveConfig,
) -> Result<Mapping<S::Type>, S::Error> {
    let candidates = expand(ts, seed(sources), config.depth, config.member_access)?;
    debug!(candidates = candidates.len(), "candidate set expanded");

    let mut mapping = Mapping::unresolved(targets);

    for target in targets {
        let mut similar: Vec<(&Candidate<S::Type>, Comparison<S::Type>)> = Vec::new();
        let mut exact = None;

        for candidate in &candidates {
            let cmp = compare(ts, candidate, target)?;
            trace!(
                target = %target.name,
                candidate = %candidate.expression_path,
                names_match = cmp.names_match,
                distance = cmp.best_distance,
                assignable = cmp.assignable,
                adapter = cmp.adapter.is_some(),
                "compared"
            );
            if !cmp.type_fits() {
                continue;
            }
            if cmp.names_match {
                exact = Some(resolved(candidate, cmp.adapter));
                break;
            }
            if cmp.names_similar {
                similar.push((candidate, cmp));
            }
        }

        let choice = exact.or_else(|| {
            // min_by_key keeps the first of equal keys
            similar
                .into_iter()
                .min_by_key(|(_, cmp)| cmp.best_distance)
                .map(|(candidate, cmp)| resolved(candidate, cmp.adapter))
        });

        match choice {
            Some(expr) => {
                debug!(target = %target.name, expression = %expr.render(), "field resolved");
                mapping.resolve(target, expr);
            }
            None => debug!(target = %target.name, "field left unresolved"),
        }
    }

    Ok(mapping)
}

/// [`map_properties`] with targets taken from `target_ty` through `source`.
/// `None` when the target source has nothing to offer for that type.
pub fn map_properties_for<S: TypeSystem>(
    ts: &S,
    target_ty: &S::Type,
    source: TargetSource,
    sources: &[FieldSchema<S::Type>],
    config: &ResolveConfig,
) -> Result<Option<Mapping<S::Type>>, S::Error> {
    match ts.target_fields(target_ty, source)? {
        Some(targets) => map_properties(ts, &targets, sources, config).map(Some),
        None => Ok(None),
    }
}
