use crate::aggregate::Aggregator;
use crate::classify::classify;
use crate::config::{Config, ConfigError};
use crate::context::SourceCtx;
use crate::error::{FactError, PolicyError};
use crate::facts::{FactsError, ImportFact};
use crate::registry::Policy;
use crate::rules::{self, layer_order, public_api, RuleKind, RuleSet, Violation};
use crate::types::{Finding, LintReport, Location, Severity, Suggestion};

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Invalid policy: {0}")]
    Policy(#[from] PolicyError),

    #[error("Invalid import fact in {path}: {source}")]
    Fact {
        path: PathBuf,
        #[source]
        source: FactError,
    },

    #[error(transparent)]
    Facts(#[from] FactsError),

    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unknown rule `{0}`")]
    UnknownRule(String),
}

impl AnalyzerError {
    fn fact(path: &Path, source: impl Into<FactError>) -> Self {
        Self::Fact {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }

    /// Stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Policy(e) => e.code(),
            Self::Fact { source, .. } => source.code(),
            Self::Facts(FactsError::Io { .. }) => "FACTS_IO",
            Self::Facts(FactsError::Parse { .. }) => "FACTS_PARSE",
            Self::Glob(_) => "CONFIG_INVALID_GLOB",
            Self::Config(ConfigError::Io { .. }) => "CONFIG_IO",
            Self::Config(ConfigError::Parse { .. }) => "CONFIG_INVALID",
            Self::UnknownRule(_) => "CONFIG_UNKNOWN_RULE",
        }
    }
}

#[derive(Debug)]
enum FactOutcome {
    Skipped,
    Passed,
    Failed(Finding),
}

#[derive(Debug, Default)]
struct Batch {
    findings: Vec<Finding>,
    checked: usize,
    skipped: usize,
}

/// Runs the rules over a set of import facts.
///
/// The policy is validated when the analyzer is built, so no fact is ever
/// evaluated under an invalid policy.
pub struct Analyzer {
    policy: Policy,
    source_dir: PathBuf,
    exclude: Vec<glob::Pattern>,
    rules: RuleSet,
    ordering_severity: Severity,
    encapsulation_severity: Severity,
    jobs: usize,
}

impl Analyzer {
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Glob`] if an exclude pattern is malformed.
    pub fn new(policy: Policy, config: &Config) -> Result<Self, AnalyzerError> {
        let exclude = config
            .analyzer
            .exclude
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            policy,
            source_dir: config.analyzer.source_dir.clone(),
            exclude,
            rules: config.rule_set(),
            ordering_severity: config
                .rule_severity(RuleKind::Ordering.name())
                .unwrap_or(Severity::Error),
            encapsulation_severity: config
                .rule_severity(RuleKind::Encapsulation.name())
                .unwrap_or(Severity::Error),
            jobs: config.analyzer.jobs,
        })
    }

    /// Builds the policy from `config` and the analyzer around it.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Policy`] for an invalid layer declaration.
    pub fn from_config(config: &Config) -> Result<Self, AnalyzerError> {
        Self::new(config.policy()?, config)
    }

    /// Restricts the run to one rule, by name or id.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::UnknownRule`] if `filter` names no rule.
    pub fn with_rule_filter(mut self, filter: Option<&str>) -> Result<Self, AnalyzerError> {
        let Some(filter) = filter else {
            return Ok(self);
        };
        let kind =
            RuleKind::lookup(filter).ok_or_else(|| AnalyzerError::UnknownRule(filter.into()))?;
        self.rules = RuleSet {
            ordering: kind == RuleKind::Ordering && self.rules.ordering,
            encapsulation: kind == RuleKind::Encapsulation && self.rules.encapsulation,
        };
        Ok(self)
    }

    /// Worker threads; 0 means one per available CPU.
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    #[must_use]
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Classifies and evaluates every fact.
    ///
    /// Findings come out in fact order whatever the worker count.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Fact`] for the first fact (in input order)
    /// that names an unknown layer or an impossible slice. No partial report
    /// is produced.
    pub fn analyze(&self, facts: &[ImportFact]) -> Result<LintReport, AnalyzerError> {
        let workers = self.worker_count(facts.len());
        info!(facts = facts.len(), workers, "Starting analysis");

        let aggregator = Aggregator::new();
        let mut report = LintReport::new();

        if workers <= 1 {
            let batch = self.check_batch(facts)?;
            report.facts_checked = batch.checked;
            report.facts_skipped = batch.skipped;
            aggregator.record_all(batch.findings);
        } else {
            let chunk_size = facts.len().div_ceil(workers);
            let batches: Vec<Result<Batch, AnalyzerError>> = std::thread::scope(|scope| {
                let handles: Vec<_> = facts
                    .chunks(chunk_size)
                    .map(|chunk| scope.spawn(move || self.check_batch(chunk)))
                    .collect();
                handles
                    .into_iter()
                    .map(|h| h.join().unwrap_or_else(|p| std::panic::resume_unwind(p)))
                    .collect()
            });

            // Merge in chunk order so the output matches a sequential run.
            for batch in batches {
                let batch = batch?;
                report.facts_checked += batch.checked;
                report.facts_skipped += batch.skipped;
                aggregator.record_all(batch.findings);
            }
        }

        report.findings = aggregator.into_results();

        info!(
            "Analysis complete: {} finding(s) in {} import(s), {} skipped",
            report.findings.len(),
            report.facts_checked,
            report.facts_skipped
        );

        Ok(report)
    }

    fn check_batch(&self, facts: &[ImportFact]) -> Result<Batch, AnalyzerError> {
        let mut batch = Batch::default();
        for fact in facts {
            match self.check_fact(fact)? {
                FactOutcome::Skipped => batch.skipped += 1,
                FactOutcome::Passed => batch.checked += 1,
                FactOutcome::Failed(finding) => {
                    batch.checked += 1;
                    batch.findings.push(finding);
                }
            }
        }
        Ok(batch)
    }

    fn check_fact(&self, fact: &ImportFact) -> Result<FactOutcome, AnalyzerError> {
        if self.should_exclude(&fact.source_file) {
            debug!(file = %fact.source_file.display(), "Excluded");
            return Ok(FactOutcome::Skipped);
        }

        let Some(source) = SourceCtx::for_fact(fact, &self.policy, &self.source_dir) else {
            debug!(file = %fact.source_file.display(), "Outside every layer, skipped");
            return Ok(FactOutcome::Skipped);
        };

        let edge = classify(
            &self.policy,
            &source.layer,
            source.slice.as_deref(),
            &fact.specifier,
        )
        .map_err(|e| AnalyzerError::fact(&fact.source_file, e))?;

        let verdict = rules::evaluate_with(&edge, &self.policy, self.rules)
            .map_err(|e| AnalyzerError::fact(&fact.source_file, e))?;

        Ok(match verdict.into_violation() {
            None => FactOutcome::Passed,
            Some(v) => FactOutcome::Failed(self.finding(fact, v)),
        })
    }

    fn finding(&self, fact: &ImportFact, violation: Violation) -> Finding {
        let location = Location::new(fact.source_file.clone(), fact.line, fact.column);
        let (severity, message, help) = match violation.rule {
            RuleKind::Ordering => (
                self.ordering_severity,
                layer_order::message(&violation),
                layer_order::HELP,
            ),
            RuleKind::Encapsulation => (
                self.encapsulation_severity,
                public_api::message(&violation, &self.policy),
                public_api::HELP,
            ),
        };
        Finding::new(violation, severity, location, message).with_suggestion(Suggestion::new(help))
    }

    fn worker_count(&self, facts: usize) -> usize {
        let jobs = if self.jobs == 0 {
            std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
        } else {
            self.jobs
        };
        jobs.min(facts).max(1)
    }

    fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.exclude.iter().any(|p| p.matches(&path_str))
    }
}
