//! Fatal errors raised before or during analysis.
//!
//! Layer violations are not errors: they are the product of a run and live
//! in [`crate::rules::Violation`]. Everything here aborts the run instead.
//!
//! # Error Codes
//!
//! | Error | Code prefix |
//! |-------|-------------|
//! | [`PolicyError`] | `POLICY_` |
//! | [`UnknownLayer`] / [`FactError`] | `FACT_` |

use thiserror::Error;

/// A malformed or self-contradictory layer policy.
///
/// Raised by [`crate::Policy::new`]; a policy is never repaired silently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// No layers were declared.
    #[error("policy declares no layers")]
    Empty,

    /// A layer declaration has an empty name.
    #[error("layer at position {position} has an empty name")]
    EmptyName { position: usize },

    /// Two layers share a name.
    #[error("duplicate layer name `{name}`")]
    DuplicateName { name: String },

    /// Two layers share a rank.
    #[error("layers `{first}` and `{second}` share rank {rank}")]
    DuplicateRank {
        rank: u32,
        first: String,
        second: String,
    },

    /// Ranks leave a gap.
    #[error("layer ranks must be contiguous from 0, rank {missing} is missing")]
    NonContiguousRank { missing: u32 },

    /// A layer declares no public entry root, so nothing can address it.
    #[error("layer `{layer}` declares no public entry roots")]
    NoRoots { layer: String },

    /// A root is empty or ends with a path separator.
    #[error("layer `{layer}` has an invalid public entry root `{root}`")]
    InvalidRoot { layer: String, root: String },

    /// The same root is declared twice.
    #[error("public entry root `{root}` is declared by both `{first}` and `{second}`")]
    SharedRoot {
        root: String,
        first: String,
        second: String,
    },

    /// A slice list was given for a layer that is not sliced.
    #[error("layer `{layer}` is not sliced but declares slice `{slice}`")]
    SliceOnUnslicedLayer { layer: String, slice: String },

    /// A slice name is listed twice for the same layer.
    #[error("layer `{layer}` declares slice `{slice}` more than once")]
    DuplicateSlice { layer: String, slice: String },
}

impl PolicyError {
    /// Returns a stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Empty => "POLICY_EMPTY",
            Self::EmptyName { .. } => "POLICY_EMPTY_NAME",
            Self::DuplicateName { .. } => "POLICY_DUPLICATE_NAME",
            Self::DuplicateRank { .. } => "POLICY_DUPLICATE_RANK",
            Self::NonContiguousRank { .. } => "POLICY_NON_CONTIGUOUS_RANK",
            Self::NoRoots { .. } => "POLICY_NO_ROOTS",
            Self::InvalidRoot { .. } => "POLICY_INVALID_ROOT",
            Self::SharedRoot { .. } => "POLICY_SHARED_ROOT",
            Self::SliceOnUnslicedLayer { .. } => "POLICY_SLICE_ON_UNSLICED_LAYER",
            Self::DuplicateSlice { .. } => "POLICY_DUPLICATE_SLICE",
        }
    }
}

/// A layer name that the policy does not declare.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown layer `{0}`")]
pub struct UnknownLayer(pub String);

/// An import fact that contradicts the policy.
///
/// These point at a defect in whatever produced the facts, so the core
/// reports them rather than guessing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FactError {
    #[error(transparent)]
    UnknownLayer(#[from] UnknownLayer),

    /// A slice was given for a layer that has none.
    #[error("layer `{layer}` is not sliced, but the importer claims slice `{slice}`")]
    UnexpectedSlice { layer: String, slice: String },

    /// The layer lists its slices and this one is not among them.
    #[error("layer `{layer}` has no declared slice `{slice}`")]
    UnknownSlice { layer: String, slice: String },
}

impl FactError {
    /// Returns a stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownLayer(_) => "FACT_UNKNOWN_LAYER",
            Self::UnexpectedSlice { .. } => "FACT_UNEXPECTED_SLICE",
            Self::UnknownSlice { .. } => "FACT_UNKNOWN_SLICE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_upper_snake_case(code: &str) -> bool {
        code.chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
    }

    #[test]
    fn policy_codes_follow_convention() {
        let errors = [
            PolicyError::Empty,
            PolicyError::DuplicateRank {
                rank: 0,
                first: "shared".into(),
                second: "entities".into(),
            },
            PolicyError::SliceOnUnslicedLayer {
                layer: "shared".into(),
                slice: "ui".into(),
            },
        ];
        for err in &errors {
            assert!(err.code().starts_with("POLICY_"));
            assert!(is_upper_snake_case(err.code()), "{}", err.code());
        }
    }

    #[test]
    fn unknown_layer_converts_into_fact_error() {
        let err: FactError = UnknownLayer("pages".into()).into();
        assert_eq!(err.code(), "FACT_UNKNOWN_LAYER");
        assert_eq!(err.to_string(), "unknown layer `pages`");
    }

    #[test]
    fn duplicate_rank_message_names_both_layers() {
        let err = PolicyError::DuplicateRank {
            rank: 0,
            first: "shared".into(),
            second: "entities".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("shared"));
        assert!(msg.contains("entities"));
        assert!(msg.contains('0'));
    }
}
