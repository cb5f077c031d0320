use super::{RuleKind, Violation};
use crate::classify::ImportEdge;
use crate::error::UnknownLayer;
use crate::registry::Policy;

pub const NAME: &str = "layer-order";
pub const ID: &str = "FSD001";

pub const HELP: &str =
    "Move the shared code down to a lower layer, or compose both sides from a higher layer";

/// A module may import from its own layer or any lower-ranked layer.
/// Same-layer imports always pass here; slices are the encapsulation rule's concern.
///
/// # Errors
///
/// Returns [`UnknownLayer`] if either end names an undeclared layer.
pub fn check(edge: &ImportEdge, policy: &Policy) -> Result<Option<Violation>, UnknownLayer> {
    let Some(to_layer) = edge.to_layer() else {
        return Ok(None);
    };

    let from_rank = policy.rank_of(&edge.from_layer)?;
    let to_rank = policy.rank_of(to_layer)?;

    if to_rank <= from_rank {
        return Ok(None);
    }

    Ok(Some(Violation {
        rule: RuleKind::Ordering,
        from_layer: edge.from_layer.clone(),
        to_layer: to_layer.to_string(),
        to_slice: edge.to_slice().map(String::from),
        specifier: edge.specifier.clone(),
    }))
}

#[must_use]
pub fn message(v: &Violation) -> String {
    format!(
        "{} layer cannot import from {} (`{}`)",
        v.from_layer, v.to_layer, v.specifier
    )
}
