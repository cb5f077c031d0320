//! Layer and slice boundary checks for Feature-Sliced Design codebases.
//!
//! Consumes import facts (file X imports specifier Y) produced by an
//! external parser, plus a declared layer policy, and reports every import
//! that breaks a boundary:
//!
//! | Rule | ID | Description |
//! |------|----|-------------|
//! | `layer-order` | FSD001 | A module may import only from its own layer or a lower-ranked one |
//! | `public-api` | FSD002 | Crossing a slice or layer boundary must go through a public entry |
//!
//! # Pipeline
//!
//! ```text
//! ImportFact ──► context (importer layer/slice)
//!            ──► classify (target layer/slice, public entry?)
//!            ──► rules::evaluate (ordering, then encapsulation)
//!            ──► Aggregator ──► LintReport
//! ```
//!
//! # Usage
//!
//! ```bash
//! fsd-lint check imports.json --config fsd-lint.toml
//! ```
//!
//! ```
//! use fsd_lint::{classify, evaluate, registry::fsd_preset, Policy};
//!
//! let policy = Policy::new(fsd_preset()).expect("preset is valid");
//! let edge = classify(&policy, "features", Some("checkout"), "@entities/user/model")
//!     .expect("features is a declared layer");
//! let verdict = evaluate(&edge, &policy).expect("layers are declared");
//! assert!(!verdict.is_allowed());
//! ```

#![forbid(unsafe_code)]

pub mod aggregate;
pub mod analyzer;
pub mod classify;
pub mod config;
pub mod context;
pub mod error;
pub mod facts;
pub mod registry;
pub mod rules;
pub mod types;

pub use aggregate::Aggregator;
pub use analyzer::{Analyzer, AnalyzerError};
pub use classify::{classify, ImportEdge, Target};
pub use config::Config;
pub use error::{FactError, PolicyError, UnknownLayer};
pub use facts::ImportFact;
pub use registry::{Layer, LayerDecl, Policy};
pub use rules::{evaluate, RuleKind, Verdict, Violation};
pub use types::{Finding, LintReport, Severity};
