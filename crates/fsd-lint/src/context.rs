use crate::facts::ImportFact;
use crate::registry::Policy;
use std::path::{Component, Path};

/// The importing side of a fact, once its layer is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCtx {
    pub layer: String,
    pub slice: Option<String>,
}

impl SourceCtx {
    /// Uses the layer pinned on the fact, or resolves it from the source path.
    /// `None` means the file lives outside every layer and is not checked.
    #[must_use]
    pub fn for_fact(fact: &ImportFact, policy: &Policy, source_dir: &Path) -> Option<Self> {
        match &fact.from_layer {
            Some(layer) => Some(Self {
                layer: layer.clone(),
                slice: fact.from_slice.clone(),
            }),
            None => resolve_from_path(policy, source_dir, &fact.source_file),
        }
    }
}

/// `src/<layer>/<slice>/...` → layer and slice.
///
/// The slice is only taken from a directory: `src/entities/index.ts` is a
/// layer-level file with no slice. Unsliced layers never get one.
#[must_use]
pub fn resolve_from_path(policy: &Policy, source_dir: &Path, path: &Path) -> Option<SourceCtx> {
    let parts = normal_components(path);
    let prefix = normal_components(source_dir);

    // Ancestors may share the source dir's name (`~/src/shop/src/...`), so
    // take the first occurrence that is followed by a declared layer.
    let (layer, rest) = (0..=parts.len().saturating_sub(prefix.len()))
        .filter(|&i| parts[i..].starts_with(&prefix))
        .find_map(|i| {
            let rest = &parts[i + prefix.len()..];
            policy.layer(rest.first()?).map(|layer| (layer, rest))
        })?;
    let slice = if layer.sliced && rest.len() > 2 {
        Some(rest[1].to_string())
    } else {
        None
    };

    Some(SourceCtx {
        layer: layer.name.clone(),
        slice,
    })
}

fn normal_components(path: &Path) -> Vec<&str> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect()
}
