pub mod layer_order;
pub mod public_api;

use crate::classify::ImportEdge;
use crate::error::UnknownLayer;
use crate::registry::Policy;
use serde::{Deserialize, Serialize};

/// All rules: (name, id, description)
pub const ALL_RULES: &[(&str, &str, &str)] = &[
    (
        layer_order::NAME,
        layer_order::ID,
        "A module may import only from its own layer or a lower-ranked one",
    ),
    (
        public_api::NAME,
        public_api::ID,
        "Imports crossing a slice or layer boundary must address a public entry",
    ),
];

/// Which rule a violation breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Ordering,
    Encapsulation,
}

impl RuleKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Ordering => layer_order::NAME,
            Self::Encapsulation => public_api::NAME,
        }
    }

    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Ordering => layer_order::ID,
            Self::Encapsulation => public_api::ID,
        }
    }

    /// Looks a rule up by name (`layer-order`) or id (`FSD001`).
    #[must_use]
    pub fn lookup(key: &str) -> Option<Self> {
        [Self::Ordering, Self::Encapsulation]
            .into_iter()
            .find(|k| k.name() == key || k.id().eq_ignore_ascii_case(key))
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A broken boundary. At most one per edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub rule: RuleKind,
    pub from_layer: String,
    pub to_layer: String,
    pub to_slice: Option<String>,
    pub specifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Violated(Violation),
}

impl Verdict {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    #[must_use]
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            Self::Violated(v) => Some(v),
            Self::Allowed => None,
        }
    }

    #[must_use]
    pub fn into_violation(self) -> Option<Violation> {
        match self {
            Self::Violated(v) => Some(v),
            Self::Allowed => None,
        }
    }
}

/// Enabled rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSet {
    pub ordering: bool,
    pub encapsulation: bool,
}

impl RuleSet {
    #[must_use]
    pub fn all() -> Self {
        Self {
            ordering: true,
            encapsulation: true,
        }
    }

    #[must_use]
    pub fn is_enabled(self, kind: RuleKind) -> bool {
        match kind {
            RuleKind::Ordering => self.ordering,
            RuleKind::Encapsulation => self.encapsulation,
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::all()
    }
}

/// Evaluates an edge against every rule.
///
/// # Errors
///
/// Returns [`UnknownLayer`] if the edge names a layer the policy lacks.
pub fn evaluate(edge: &ImportEdge, policy: &Policy) -> Result<Verdict, UnknownLayer> {
    evaluate_with(edge, policy, RuleSet::all())
}

/// Evaluates an edge against the enabled rules.
///
/// Ordering is checked first and short-circuits, so an edge that points up
/// the hierarchy is never also reported for encapsulation.
///
/// # Errors
///
/// Returns [`UnknownLayer`] if the edge names a layer the policy lacks.
pub fn evaluate_with(
    edge: &ImportEdge,
    policy: &Policy,
    rules: RuleSet,
) -> Result<Verdict, UnknownLayer> {
    if edge.is_external() {
        return Ok(Verdict::Allowed);
    }

    if rules.ordering {
        if let Some(v) = layer_order::check(edge, policy)? {
            return Ok(Verdict::Violated(v));
        }
    }

    if rules.encapsulation {
        if let Some(v) = public_api::check(edge) {
            return Ok(Verdict::Violated(v));
        }
    }

    Ok(Verdict::Allowed)
}
