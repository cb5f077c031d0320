//! Layer registry: the ordered layers of a policy and their public roots.
//!
//! A lower rank is depended on, a higher rank depends. The ordering is
//! fixed once a [`Policy`] is built.

use crate::error::{PolicyError, UnknownLayer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// One architectural layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    pub rank: u32,
    pub sliced: bool,
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A layer as declared in configuration, before validation.
///
/// `rank` defaults to the declaration's position in the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerDecl {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,

    #[serde(default)]
    pub sliced: bool,

    pub public_entry_roots: Vec<String>,

    /// Closed set of slice names. Empty means any slice name is accepted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slices: Vec<String>,
}

impl LayerDecl {
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, sliced: bool, roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            rank: None,
            sliced,
            public_entry_roots: roots.into_iter().map(Into::into).collect(),
            slices: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_rank(mut self, rank: u32) -> Self {
        self.rank = Some(rank);
        self
    }

    #[must_use]
    pub fn with_slices<I, S>(mut self, slices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.slices = slices.into_iter().map(Into::into).collect();
        self
    }
}

/// A validated, read-only layer policy.
///
/// Layers are stored in ascending rank, so a layer's rank is also its index.
#[derive(Debug, Clone)]
pub struct Policy {
    layers: Vec<Layer>,
    roots: Vec<Vec<String>>,
    slices: Vec<BTreeSet<String>>,
    by_name: HashMap<String, usize>,
    /// `(root, layer index)`, longest root first.
    root_index: Vec<(String, usize)>,
}

impl Policy {
    /// Validates declarations and builds the policy.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] for duplicate names or ranks, rank gaps,
    /// missing or clashing roots, and slice lists on unsliced layers.
    pub fn new(decls: Vec<LayerDecl>) -> Result<Self, PolicyError> {
        if decls.is_empty() {
            return Err(PolicyError::Empty);
        }

        let mut names: HashMap<String, usize> = HashMap::new();
        let mut ranks: HashMap<u32, String> = HashMap::new();
        let mut root_owner: HashMap<String, String> = HashMap::new();
        let mut entries = Vec::with_capacity(decls.len());

        for (position, decl) in decls.into_iter().enumerate() {
            let name = decl.name.trim().to_string();
            if name.is_empty() {
                return Err(PolicyError::EmptyName { position });
            }
            if names.insert(name.clone(), position).is_some() {
                return Err(PolicyError::DuplicateName { name });
            }

            let rank = decl
                .rank
                .unwrap_or_else(|| u32::try_from(position).unwrap_or(u32::MAX));
            if let Some(first) = ranks.insert(rank, name.clone()) {
                return Err(PolicyError::DuplicateRank {
                    rank,
                    first,
                    second: name,
                });
            }

            if decl.public_entry_roots.is_empty() {
                return Err(PolicyError::NoRoots { layer: name });
            }
            for root in &decl.public_entry_roots {
                if root.is_empty() || root.ends_with('/') {
                    return Err(PolicyError::InvalidRoot {
                        layer: name,
                        root: root.clone(),
                    });
                }
                if let Some(first) = root_owner.insert(root.clone(), name.clone()) {
                    return Err(PolicyError::SharedRoot {
                        root: root.clone(),
                        first,
                        second: name,
                    });
                }
            }

            let mut slices = BTreeSet::new();
            for slice in decl.slices {
                if !decl.sliced {
                    return Err(PolicyError::SliceOnUnslicedLayer { layer: name, slice });
                }
                if !slices.insert(slice.clone()) {
                    return Err(PolicyError::DuplicateSlice { layer: name, slice });
                }
            }

            entries.push((
                Layer {
                    name,
                    rank,
                    sliced: decl.sliced,
                },
                decl.public_entry_roots,
                slices,
            ));
        }

        entries.sort_by_key(|(layer, _, _)| layer.rank);
        for (expected, (layer, _, _)) in (0u32..).zip(&entries) {
            if layer.rank != expected {
                return Err(PolicyError::NonContiguousRank { missing: expected });
            }
        }

        let mut layers = Vec::with_capacity(entries.len());
        let mut roots = Vec::with_capacity(entries.len());
        let mut slices = Vec::with_capacity(entries.len());
        let mut by_name = HashMap::with_capacity(entries.len());
        let mut root_index = Vec::new();

        for (index, (layer, layer_roots, layer_slices)) in entries.into_iter().enumerate() {
            by_name.insert(layer.name.clone(), index);
            root_index.extend(layer_roots.iter().map(|r| (r.clone(), index)));
            layers.push(layer);
            roots.push(layer_roots);
            slices.push(layer_slices);
        }
        root_index.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        Ok(Self {
            layers,
            roots,
            slices,
            by_name,
            root_index,
        })
    }

    /// Rank of the named layer.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownLayer`] if the policy does not declare `name`.
    pub fn rank_of(&self, name: &str) -> Result<u32, UnknownLayer> {
        self.layer(name)
            .map(|l| l.rank)
            .ok_or_else(|| UnknownLayer(name.to_string()))
    }

    /// Whether the named layer is divided into slices. Undeclared layers are not.
    #[must_use]
    pub fn is_sliced(&self, name: &str) -> bool {
        self.layer(name).is_some_and(|l| l.sliced)
    }

    /// All layers, ascending rank.
    #[must_use]
    pub fn ordered_layers(&self) -> &[Layer] {
        &self.layers
    }

    #[must_use]
    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.by_name.get(name).map(|&i| &self.layers[i])
    }

    /// Declared public entry roots of the named layer, in declaration order.
    #[must_use]
    pub fn public_roots(&self, name: &str) -> &[String] {
        self.by_name
            .get(name)
            .map_or(&[], |&i| self.roots[i].as_slice())
    }

    /// Declared slice names, or `None` when the layer accepts any slice.
    #[must_use]
    pub fn declared_slices(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.by_name
            .get(name)
            .map(|&i| &self.slices[i])
            .filter(|s| !s.is_empty())
    }

    /// Longest declared root that `specifier` addresses, with its layer.
    ///
    /// A root matches when the specifier equals it or continues it with `/`.
    #[must_use]
    pub fn match_root(&self, specifier: &str) -> Option<(&Layer, &str)> {
        self.root_index.iter().find_map(|(root, index)| {
            let rest = specifier.strip_prefix(root.as_str())?;
            (rest.is_empty() || rest.starts_with('/'))
                .then(|| (&self.layers[*index], root.as_str()))
        })
    }
}

/// The Feature-Sliced Design preset used by the Next.js starter.
///
/// `shared < entities < features < widgets < views < app`. Every layer is
/// reachable through both the `@name` and `@/name` aliases, and `shared`
/// additionally exposes a server-only entry.
#[must_use]
pub fn fsd_preset() -> Vec<LayerDecl> {
    vec![
        LayerDecl::new("shared", false, ["@shared", "@shared/server", "@/shared"]),
        LayerDecl::new("entities", true, ["@entities", "@/entities"]),
        LayerDecl::new("features", true, ["@features", "@/features"]),
        LayerDecl::new("widgets", true, ["@widgets", "@/widgets"]),
        LayerDecl::new("views", true, ["@views", "@/views"]),
        LayerDecl::new("app", false, ["@app", "@/app"]),
    ]
}
