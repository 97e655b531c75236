//! Load, validate, decide, commit
//!
//! Each phase is a separate step with its own observation scope. The store
//! is touched only by the commit phase, and only when the decision allows it.

use serde::Serialize;
use tracing::{info, warn};

use super::errors::PipelineResult;
use super::request::{AcceptPolicy, LinkRequest, LoadRequest};
use crate::commit::{commit, CommitResult};
use crate::config::Config;
use crate::consistency::{check_consistency, ConsistencyReport};
use crate::observability::{Event, ObservationScope};
use crate::schema::{Schema, SchemaRegistry};
use crate::source::{RowSet, SourceOptions};
use crate::store::Store;
use crate::validation::{SchemaValidator, ValidationReport};

use super::request::EntitySource;

/// Result of a load run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The batch is in the store
    Committed {
        report: ValidationReport,
        commit: CommitResult,
    },
    /// Commit was attempted and rolled back
    Failed {
        report: ValidationReport,
        commit: CommitResult,
    },
    /// Findings blocked the commit; the store was not touched
    Rejected { report: ValidationReport },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Committed { .. })
    }

    pub fn report(&self) -> &ValidationReport {
        match self {
            RunOutcome::Committed { report, .. }
            | RunOutcome::Failed { report, .. }
            | RunOutcome::Rejected { report } => report,
        }
    }

    pub fn commit_result(&self) -> Option<&CommitResult> {
        match self {
            RunOutcome::Committed { commit, .. } | RunOutcome::Failed { commit, .. } => Some(commit),
            RunOutcome::Rejected { .. } => None,
        }
    }
}

/// Opens the store configured by the environment.
pub fn open_store() -> PipelineResult<Store> {
    let config = Config::from_env()?;
    info!(driver = %config.driver, database = %config.database, "configuration loaded");
    Ok(Store::open(&config)?)
}

/// Looks up the source's entity and reads the source with its column map.
pub fn prepare<'r>(
    registry: &'r SchemaRegistry,
    source: &EntitySource,
    options: &SourceOptions,
) -> PipelineResult<(&'r Schema, RowSet)> {
    let schema = registry.lookup(&source.entity)?;

    let scope = ObservationScope::new(Event::SourceLoad, &source.entity);
    let rows = source.read(options)?;
    scope.complete();

    Ok((schema, rows))
}

/// Reads and validates one source without touching any store.
pub fn validate_source(
    registry: &SchemaRegistry,
    source: &EntitySource,
    options: &SourceOptions,
) -> PipelineResult<ValidationReport> {
    let (_, rows) = prepare(registry, source, options)?;

    let scope = ObservationScope::new(Event::Validate, &source.entity);
    let report = SchemaValidator::new(registry).validate_entity(&source.entity, &rows)?;
    scope.complete();

    Ok(report)
}

/// Whether a report may proceed to commit under `policy`.
pub fn decide(report: &ValidationReport, policy: AcceptPolicy) -> bool {
    let scope = ObservationScope::new(Event::Decide, &report.entity);
    let accepted = match policy {
        AcceptPolicy::RequireClean => report.is_clean(),
        AcceptPolicy::AcceptFindings => true,
    };

    if !report.is_clean() {
        if accepted {
            warn!(entity = %report.entity, issues = report.issue_count(), "committing despite findings");
        } else {
            warn!(entity = %report.entity, issues = report.issue_count(), "batch rejected");
        }
    }
    scope.complete();
    accepted
}

/// Runs load, validate, decide and commit for one request.
pub fn run(
    store: &mut Store,
    registry: &SchemaRegistry,
    request: &LoadRequest,
) -> PipelineResult<RunOutcome> {
    let (schema, rows) = prepare(registry, &request.source, &request.options)?;

    let scope = ObservationScope::new(Event::Validate, &schema.entity);
    let report = SchemaValidator::new(registry).validate_entity(&schema.entity, &rows)?;
    scope.complete();

    if !decide(&report, request.policy) {
        return Ok(RunOutcome::Rejected { report });
    }

    let scope = ObservationScope::new(Event::Commit, &schema.entity);
    let result = commit(store, schema, &rows);
    scope.complete();

    Ok(if result.success {
        RunOutcome::Committed {
            report,
            commit: result,
        }
    } else {
        RunOutcome::Failed {
            report,
            commit: result,
        }
    })
}

/// Reads both sources and checks the child's link column against the
/// parent's key.
pub fn check_links(registry: &SchemaRegistry, request: &LinkRequest) -> PipelineResult<ConsistencyReport> {
    let (parent_schema, parent_rows) = prepare(registry, &request.parent, &request.options)?;
    let (child_schema, child_rows) = prepare(registry, &request.child, &request.options)?;

    let scope = ObservationScope::new(Event::ConsistencyCheck, &child_schema.entity);
    let report = check_consistency(
        parent_schema,
        &parent_rows,
        child_schema,
        &child_rows,
        &request.link_field,
        request.policy,
    )?;
    scope.complete();

    Ok(report)
}
