//! Import classification: what a specifier points at, seen from its importer.

use crate::error::{FactError, UnknownLayer};
use crate::registry::Policy;
use serde::{Deserialize, Serialize};

/// What an import specifier addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
    /// Matches no layer root: a package or a relative sibling file.
    External,
    Layer {
        layer: String,
        slice: Option<String>,
        /// Exactly a declared root, or `root/slice` on a sliced layer.
        public_entry: bool,
    },
}

/// One classified import, the unit the rules evaluate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportEdge {
    pub from_layer: String,
    pub from_slice: Option<String>,
    pub specifier: String,
    pub target: Target,
}

impl ImportEdge {
    #[must_use]
    pub fn is_external(&self) -> bool {
        matches!(self.target, Target::External)
    }

    #[must_use]
    pub fn to_layer(&self) -> Option<&str> {
        match &self.target {
            Target::Layer { layer, .. } => Some(layer),
            Target::External => None,
        }
    }

    #[must_use]
    pub fn to_slice(&self) -> Option<&str> {
        match &self.target {
            Target::Layer { slice, .. } => slice.as_deref(),
            Target::External => None,
        }
    }

    /// External targets count as public: nothing about them is encapsulated.
    #[must_use]
    pub fn is_public_entry(&self) -> bool {
        match &self.target {
            Target::Layer { public_entry, .. } => *public_entry,
            Target::External => true,
        }
    }

    /// Same layer and same slice on both ends (including "no slice" on both).
    #[must_use]
    pub fn is_intra_slice(&self) -> bool {
        self.to_layer() == Some(self.from_layer.as_str())
            && self.to_slice() == self.from_slice.as_deref()
    }
}

/// Classifies `specifier` as imported from `from_layer`/`from_slice`.
///
/// # Errors
///
/// - [`FactError::UnknownLayer`] if `from_layer` is not declared.
/// - [`FactError::UnexpectedSlice`] if a slice is given for an unsliced layer.
/// - [`FactError::UnknownSlice`] if the layer lists its slices and `from_slice` is not one.
pub fn classify(
    policy: &Policy,
    from_layer: &str,
    from_slice: Option<&str>,
    specifier: &str,
) -> Result<ImportEdge, FactError> {
    let origin = policy
        .layer(from_layer)
        .ok_or_else(|| UnknownLayer(from_layer.to_string()))?;

    if let Some(slice) = from_slice {
        if !origin.sliced {
            return Err(FactError::UnexpectedSlice {
                layer: from_layer.to_string(),
                slice: slice.to_string(),
            });
        }
        if let Some(declared) = policy.declared_slices(from_layer) {
            if !declared.contains(slice) {
                return Err(FactError::UnknownSlice {
                    layer: from_layer.to_string(),
                    slice: slice.to_string(),
                });
            }
        }
    }

    Ok(ImportEdge {
        from_layer: from_layer.to_string(),
        from_slice: from_slice.map(String::from),
        specifier: specifier.to_string(),
        target: resolve_target(policy, specifier),
    })
}

fn resolve_target(policy: &Policy, specifier: &str) -> Target {
    let Some((layer, root)) = policy.match_root(specifier) else {
        return Target::External;
    };

    let mut segments = specifier[root.len()..]
        .split('/')
        .filter(|s| !s.is_empty());

    if !layer.sliced {
        return Target::Layer {
            layer: layer.name.clone(),
            slice: None,
            public_entry: segments.next().is_none(),
        };
    }

    // @entities            -> layer-level entry
    // @entities/user       -> slice entry
    // @entities/user/model -> internal
    let slice = segments.next().map(String::from);
    let public_entry = segments.next().is_none();
    Target::Layer {
        layer: layer.name.clone(),
        slice,
        public_entry,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{fsd_preset, LayerDecl};

    fn policy() -> Policy {
        Policy::new(fsd_preset()).expect("preset is valid")
    }

    fn target(specifier: &str) -> Target {
        classify(&policy(), "features", Some("checkout"), specifier)
            .expect("known layer")
            .target
    }

    fn layer_target(layer: &str, slice: Option<&str>, public_entry: bool) -> Target {
        Target::Layer {
            layer: layer.to_string(),
            slice: slice.map(String::from),
            public_entry,
        }
    }

    #[test]
    fn slice_entry_is_public() {
        assert_eq!(
            target("@entities/user"),
            layer_target("entities", Some("user"), true)
        );
    }

    #[test]
    fn path_below_slice_is_internal() {
        assert_eq!(
            target("@entities/user/internal/model"),
            layer_target("entities", Some("user"), false)
        );
    }

    #[test]
    fn bare_root_of_sliced_layer_is_public() {
        assert_eq!(target("@entities"), layer_target("entities", None, true));
    }

    #[test]
    fn unsliced_roots() {
        assert_eq!(target("@shared"), layer_target("shared", None, true));
        assert_eq!(target("@shared/server"), layer_target("shared", None, true));
        assert_eq!(
            target("@shared/ui/button"),
            layer_target("shared", None, false)
        );
        assert_eq!(
            target("@shared/server/db"),
            layer_target("shared", None, false)
        );
    }

    #[test]
    fn slash_alias_resolves_to_same_layer() {
        assert_eq!(
            target("@/entities/user/model"),
            layer_target("entities", Some("user"), false)
        );
        assert_eq!(target("@/shared"), layer_target("shared", None, true));
    }

    #[test]
    fn trailing_slash_is_ignored() {
        assert_eq!(
            target("@entities/user/"),
            layer_target("entities", Some("user"), true)
        );
    }

    #[test]
    fn packages_and_relative_paths_are_external() {
        assert_eq!(target("react"), Target::External);
        assert_eq!(target("lucide-react"), Target::External);
        assert_eq!(target("./model/store"), Target::External);
        assert_eq!(target("../ui/form"), Target::External);
        assert_eq!(target("@tanstack/react-query"), Target::External);
    }

    #[test]
    fn edge_accessors() {
        let edge = classify(&policy(), "features", Some("checkout"), "@entities/user/api")
            .expect("known layer");
        assert_eq!(edge.to_layer(), Some("entities"));
        assert_eq!(edge.to_slice(), Some("user"));
        assert!(!edge.is_public_entry());
        assert!(!edge.is_intra_slice());
        assert!(!edge.is_external());
    }

    #[test]
    fn intra_slice_detection() {
        let edge = classify(&policy(), "features", Some("checkout"), "@features/checkout/ui")
            .expect("known layer");
        assert!(edge.is_intra_slice());
    }

    #[test]
    fn unknown_from_layer_fails() {
        let err = classify(&policy(), "pages", None, "@shared").expect_err("unknown layer");
        assert_eq!(err, FactError::UnknownLayer(UnknownLayer("pages".into())));
    }

    #[test]
    fn slice_on_unsliced_importer_fails() {
        let err = classify(&policy(), "shared", Some("ui"), "@shared").expect_err("no slices");
        assert_eq!(err.code(), "FACT_UNEXPECTED_SLICE");
    }

    #[test]
    fn undeclared_slice_fails_when_slices_are_listed() {
        let policy = Policy::new(vec![
            LayerDecl::new("shared", false, ["@shared"]),
            LayerDecl::new("entities", true, ["@entities"]).with_slices(["user"]),
        ])
        .expect("valid policy");

        assert!(classify(&policy, "entities", Some("user"), "@shared").is_ok());
        let err =
            classify(&policy, "entities", Some("usr"), "@shared").expect_err("undeclared slice");
        assert_eq!(err.code(), "FACT_UNKNOWN_SLICE");
    }
}
