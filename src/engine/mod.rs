//! SyncEngine - stateful facade consumed by the presentation layer

use crate::config::{Config, Direction, SyncOptions};
use crate::diff::{scan_trees, ComparisonConfig, Plan};
use crate::executor::{execute_plan, ExecutionCallback, ExecutionReport};
use crate::types::{CancelToken, FileRecord, SyncError};
use std::path::{Path, PathBuf};

/// Owns the configured roots, the scan parameters and the one authoritative
/// plan. Presentation reads the plan through [`SyncEngine::plan`] and mutates
/// forbid/ambiguity state only through this API, which keeps the cascade
/// invariant intact.
///
/// Scanning and execution are mutually exclusive, caller-driven phases; the
/// engine runs no background work.
#[derive(Debug, Default)]
pub struct SyncEngine {
    source: PathBuf,
    destination: PathBuf,
    direction: Direction,
    options: SyncOptions,
    comparison: ComparisonConfig,
    plan: Option<Plan>,
}

impl SyncEngine {
    pub fn new(source: PathBuf, destination: PathBuf) -> Self {
        Self {
            source,
            destination,
            ..Self::default()
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            source: config.source.clone(),
            destination: config.destination.clone(),
            direction: config.direction,
            options: config.options,
            comparison: config.comparison,
            plan: None,
        }
    }

    /// Point the engine at a new source root. Invalidates any existing plan.
    pub fn set_source(&mut self, source: PathBuf) {
        self.source = source;
        self.plan = None;
    }

    /// Point the engine at a new destination root. Invalidates any existing
    /// plan.
    pub fn set_destination(&mut self, destination: PathBuf) {
        self.destination = destination;
        self.plan = None;
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn set_options(&mut self, options: SyncOptions) {
        self.options = options;
    }

    pub fn set_comparison(&mut self, comparison: ComparisonConfig) {
        self.comparison = comparison;
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Does this record live under the source root?
    pub fn in_source_tree(&self, record: &FileRecord) -> bool {
        record.path.starts_with(&self.source)
    }

    /// Does this record live under the destination root?
    pub fn in_destination_tree(&self, record: &FileRecord) -> bool {
        record.path.starts_with(&self.destination)
    }

    /// Path of a record relative to whichever root it lives under.
    pub fn display_path(&self, record: &FileRecord) -> PathBuf {
        record
            .relative_path(&self.source, true)
            .or_else(|| record.relative_path(&self.destination, true))
            .unwrap_or_else(|| record.path.clone())
    }

    /// Build a fresh plan. Any previous plan is discarded first; on error no
    /// plan exists afterwards.
    pub fn scan(&mut self, on_enter: &mut dyn FnMut(&Path)) -> Result<(), SyncError> {
        self.scan_with_cancel(on_enter, &CancelToken::new())
    }

    /// Like [`SyncEngine::scan`], abortable through `cancel`; a cancelled
    /// scan leaves no partial plan behind.
    pub fn scan_with_cancel(
        &mut self,
        on_enter: &mut dyn FnMut(&Path),
        cancel: &CancelToken,
    ) -> Result<(), SyncError> {
        self.plan = None;

        let ops = scan_trees(
            &self.source,
            &self.destination,
            self.direction,
            &self.options,
            &self.comparison,
            on_enter,
            cancel,
        )?;

        self.plan = Some(Plan::from_discovery(ops));
        Ok(())
    }

    /// Read-only view of the current plan, if a scan has produced one.
    pub fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    /// Toggle the forbidden flag of one operation, cascading per the plan's
    /// rules.
    pub fn set_forbidden(&mut self, index: usize, forbidden: bool) -> Result<(), SyncError> {
        self.plan
            .as_mut()
            .ok_or(SyncError::NoPlan)?
            .set_forbidden(index, forbidden)
    }

    /// Clear the ambiguity of a Replace so it may execute.
    pub fn resolve(&mut self, index: usize) -> Result<(), SyncError> {
        self.plan.as_mut().ok_or(SyncError::NoPlan)?.resolve(index)
    }

    /// Execute the plan in order, skipping forbidden operations. The plan is
    /// consumed: afterwards a new scan is required, whatever the outcome.
    pub fn execute(
        &mut self,
        on_event: Option<&ExecutionCallback>,
    ) -> Result<ExecutionReport, SyncError> {
        self.execute_with_cancel(on_event, &CancelToken::new())
    }

    pub fn execute_with_cancel(
        &mut self,
        on_event: Option<&ExecutionCallback>,
        cancel: &CancelToken,
    ) -> Result<ExecutionReport, SyncError> {
        let plan = self.plan.take().ok_or(SyncError::NoPlan)?;
        execute_plan(&plan, on_event, cancel)
    }
}
