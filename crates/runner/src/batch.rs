//! Batch execution and report aggregation.

use crate::discovery::{classify, Candidate, Classification};
use crate::worker::CancelToken;
use skillgate_common::{Error, Result};
use skillgate_engine::validate;
use skillgate_schema::{PendingBundle, RuleSet, SkillBundle, ValidationReport, ValidationResult};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Batch execution settings.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Stop after the first validated bundle with errors. Sequential runs only.
    pub fail_fast: bool,
    /// Bundles validated concurrently; 1 runs sequentially.
    pub jobs: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            fail_fast: false,
            jobs: 1,
        }
    }
}

/// What one candidate turned into.
#[derive(Debug, Clone)]
pub enum Outcome {
    Validated(ValidationResult),
    Pending(PendingBundle),
    Unknown(String),
}

/// Classify one candidate and, if it has a descriptor, validate it.
pub fn inspect(candidate: &Candidate, rules: &RuleSet) -> Result<Outcome> {
    match classify(&candidate.path) {
        Classification::Validated => {
            let bundle = SkillBundle::read(&candidate.path)?;
            Ok(Outcome::Validated(validate(&bundle, rules)))
        }
        Classification::Pending => {
            let phase = rules.phase_of(&candidate.identifier);
            debug!("Pending: {} (phase {:?})", candidate.identifier, phase);
            Ok(Outcome::Pending(PendingBundle::new(
                candidate.identifier.as_str(),
                phase,
            )))
        }
        Classification::Unknown => {
            warn!(
                "No descriptor or draft for {} at {}",
                candidate.identifier,
                candidate.path.display()
            );
            Ok(Outcome::Unknown(candidate.identifier.clone()))
        }
    }
}

/// Build the report from outcomes in any order.
pub fn aggregate(outcomes: Vec<Outcome>, rules: &RuleSet) -> ValidationReport {
    let mut results = Vec::new();
    let mut pending = Vec::new();
    let mut unknown = Vec::new();

    for outcome in outcomes {
        match outcome {
            Outcome::Validated(result) => results.push(result),
            Outcome::Pending(bundle) => pending.push(bundle),
            Outcome::Unknown(identifier) => unknown.push(identifier),
        }
    }

    let phase_skills = rules.all_phase_skills();
    let existing = results
        .iter()
        .filter(|r| !phase_skills.contains(r.identifier()))
        .count();

    ValidationReport::new(results, pending)
        .with_unknown(unknown)
        .with_existing(existing)
}

/// Validate candidates one by one in canonical order.
pub fn run_batch(
    candidates: &[Candidate],
    rules: &RuleSet,
    options: &BatchOptions,
) -> Result<ValidationReport> {
    let report = run_observed(candidates, rules, options, &CancelToken::new(), |_, _, _| {})?;
    Ok(report.unwrap_or_default())
}

/// Sequential run with a progress callback and coarse cancellation.
///
/// `on_progress` receives `(index, total, identifier)` before each bundle.
/// The token is checked between bundles; a cancelled run returns `None` and
/// its partial results are dropped.
pub fn run_observed<F>(
    candidates: &[Candidate],
    rules: &RuleSet,
    options: &BatchOptions,
    cancel: &CancelToken,
    mut on_progress: F,
) -> Result<Option<ValidationReport>>
where
    F: FnMut(usize, usize, &str),
{
    let total = candidates.len();
    let mut outcomes = Vec::with_capacity(total);

    for (index, candidate) in candidates.iter().enumerate() {
        if cancel.is_cancelled() {
            info!("Validation cancelled after {} of {} bundles", index, total);
            return Ok(None);
        }
        on_progress(index, total, &candidate.identifier);

        let outcome = inspect(candidate, rules)?;
        let stop = options.fail_fast
            && matches!(&outcome, Outcome::Validated(result) if !result.passed());
        outcomes.push(outcome);

        if stop {
            info!(
                "Stopping after first failure: {} (fail-fast)",
                candidate.identifier
            );
            break;
        }
    }

    Ok(Some(aggregate(outcomes, rules)))
}

/// Validate on a bounded pool of blocking tasks.
///
/// Completion order is irrelevant: the report re-sorts by identifier.
pub async fn run_parallel(
    candidates: Vec<Candidate>,
    rules: Arc<RuleSet>,
    jobs: usize,
) -> Result<ValidationReport> {
    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
    let mut handles = Vec::with_capacity(candidates.len());

    info!(
        "Validating {} bundles with {} workers",
        candidates.len(),
        jobs.max(1)
    );

    for candidate in candidates {
        let sem = Arc::clone(&semaphore);
        let rules = Arc::clone(&rules);
        handles.push(tokio::spawn(async move {
            let _permit = sem
                .acquire_owned()
                .await
                .map_err(|e| Error::Other(format!("worker pool closed: {}", e)))?;
            tokio::task::spawn_blocking(move || inspect(&candidate, &rules))
                .await
                .map_err(|e| Error::Other(format!("validation task failed: {}", e)))?
        }));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        let outcome = handle
            .await
            .map_err(|e| Error::Other(format!("validation task failed: {}", e)))??;
        outcomes.push(outcome);
    }

    Ok(aggregate(outcomes, &rules))
}

/// Run sequentially or on the pool, depending on `options.jobs`.
pub async fn execute(
    candidates: Vec<Candidate>,
    rules: Arc<RuleSet>,
    options: &BatchOptions,
) -> Result<ValidationReport> {
    if options.jobs > 1 {
        if options.fail_fast {
            warn!("--fail-fast is ignored when validating in parallel");
        }
        run_parallel(candidates, rules, options.jobs).await
    } else {
        run_batch(&candidates, &rules, options)
    }
}
