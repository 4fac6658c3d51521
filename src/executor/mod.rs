//! Executor - runs a plan's operations in order

pub mod copy;

use crate::diff::Plan;
use crate::types::{CancelToken, OpKind, Operation, SyncError};
use std::fs;
use std::path::PathBuf;

pub use copy::copy_file_atomic;

/// Outcome of one full execution pass.
#[derive(Debug, Default)]
pub struct ExecutionReport {
    /// Number of operations in the plan
    pub total: usize,

    /// Operations whose effect ran successfully
    pub executed: usize,

    /// Operations skipped because they were forbidden
    pub skipped: usize,

    /// Aggregate bytes written by Copy and Replace effects
    pub bytes_copied: u64,

    /// Every failed operation, in plan order. Execution does not stop on
    /// failure; the full pass always completes.
    pub failures: Vec<OperationFailure>,
}

impl ExecutionReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// One failed operation within a pass.
#[derive(Debug)]
pub struct OperationFailure {
    /// Position in the plan
    pub index: usize,

    /// Operation label ("copy", "replace", ...)
    pub name: &'static str,

    /// Primary path involved
    pub path: PathBuf,

    pub error: SyncError,
}

/// Events emitted while executing a plan.
#[derive(Debug)]
pub enum ExecutionEvent<'a> {
    /// Fired immediately before an operation's effect
    OpStart {
        index: usize,
        total: usize,
        op: &'a Operation,
    },
    OpSuccess {
        index: usize,
        total: usize,
        op: &'a Operation,
        bytes_copied: u64,
    },
    OpError {
        index: usize,
        total: usize,
        op: &'a Operation,
        error: &'a SyncError,
    },
    /// Forbidden operation passed over without effect
    OpSkipped {
        index: usize,
        total: usize,
        op: &'a Operation,
    },
    Complete,
}

/// Optional callback used to receive execution events.
pub type ExecutionCallback = dyn Fn(&ExecutionEvent<'_>) + Send + Sync;

/// Execute every non-forbidden operation in plan order.
///
/// Failures are recorded and execution continues; the report lists them all
/// after the full pass. Cancellation is honored between operations.
pub fn execute_plan(
    plan: &Plan,
    on_event: Option<&ExecutionCallback>,
    cancel: &CancelToken,
) -> Result<ExecutionReport, SyncError> {
    let mut report = ExecutionReport {
        total: plan.len(),
        ..Default::default()
    };

    for (index, op) in plan.operations().iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(SyncError::Cancelled);
        }

        if op.forbidden() {
            report.skipped += 1;
            emit(
                on_event,
                ExecutionEvent::OpSkipped {
                    index,
                    total: report.total,
                    op,
                },
            );
            continue;
        }

        emit(
            on_event,
            ExecutionEvent::OpStart {
                index,
                total: report.total,
                op,
            },
        );

        match execute_operation(op) {
            Ok(bytes) => {
                report.executed += 1;
                report.bytes_copied += bytes;
                emit(
                    on_event,
                    ExecutionEvent::OpSuccess {
                        index,
                        total: report.total,
                        op,
                        bytes_copied: bytes,
                    },
                );
            }
            Err(error) => {
                emit(
                    on_event,
                    ExecutionEvent::OpError {
                        index,
                        total: report.total,
                        op,
                        error: &error,
                    },
                );
                report.failures.push(OperationFailure {
                    index,
                    name: op.name(),
                    path: op.record().path.clone(),
                    error,
                });
            }
        }
    }

    emit(on_event, ExecutionEvent::Complete);
    Ok(report)
}

/// Apply one operation's effect.
fn execute_operation(op: &Operation) -> Result<u64, SyncError> {
    match op.kind() {
        OpKind::Copy { file, dest_dir } => {
            copy_file_atomic(&file.path, &dest_dir.join(file.file_name()))
        }
        OpKind::Replace {
            winner,
            loser,
            ambiguous,
        } => {
            if *ambiguous {
                // Blocked, not broken: nothing is touched until a caller
                // resolves the ambiguity
                return Err(SyncError::AmbiguousReplace {
                    path: loser.path.clone(),
                });
            }
            copy_file_atomic(&winner.path, &loser.path)
        }
        OpKind::Remove { target } => {
            if target.is_dir {
                // Non-recursive by contract: the plan removed all planned
                // descendants earlier in the sequence
                fs::remove_dir(&target.path)?;
            } else {
                fs::remove_file(&target.path)?;
            }
            Ok(0)
        }
        OpKind::CreateDir { target, .. } => {
            fs::create_dir(target)?;
            Ok(0)
        }
        OpKind::Anchor { .. } => Ok(0),
    }
}

fn emit(on_event: Option<&ExecutionCallback>, event: ExecutionEvent<'_>) {
    if let Some(callback) = on_event {
        callback(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileRecord;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn record_for(path: &Path) -> FileRecord {
        let metadata = fs::metadata(path).expect("metadata");
        FileRecord::from_metadata(path.to_path_buf(), &metadata)
    }

    #[test]
    fn test_execute_copy_and_create() {
        let src = TempDir::new().expect("src");
        let dest = TempDir::new().expect("dest");
        fs::create_dir(src.path().join("docs")).expect("mkdir");
        fs::write(src.path().join("docs/a.txt"), b"hello").expect("write");

        let plan = Plan::from_discovery(vec![
            Operation::create_dir(
                record_for(&src.path().join("docs")),
                dest.path().join("docs"),
            ),
            Operation::copy(
                record_for(&src.path().join("docs/a.txt")),
                dest.path().join("docs"),
            ),
        ]);

        let report = execute_plan(&plan, None, &CancelToken::new()).expect("execute");

        assert!(report.is_clean());
        assert_eq!(report.executed, 2);
        assert_eq!(report.bytes_copied, 5);
        assert_eq!(
            fs::read(dest.path().join("docs/a.txt")).expect("read"),
            b"hello"
        );
    }

    #[test]
    fn test_execute_replace_overwrites_loser_path() {
        let src = TempDir::new().expect("src");
        let dest = TempDir::new().expect("dest");
        fs::write(src.path().join("a.txt"), b"winner-content").expect("write src");
        fs::write(dest.path().join("a.txt"), b"old").expect("write dest");

        let plan = Plan::from_discovery(vec![Operation::replace(
            record_for(&src.path().join("a.txt")),
            record_for(&dest.path().join("a.txt")),
            false,
        )]);

        let report = execute_plan(&plan, None, &CancelToken::new()).expect("execute");

        assert!(report.is_clean());
        assert_eq!(
            fs::read(dest.path().join("a.txt")).expect("read"),
            b"winner-content"
        );
    }

    #[test]
    fn test_execute_ambiguous_replace_fails_cleanly() {
        let src = TempDir::new().expect("src");
        let dest = TempDir::new().expect("dest");
        fs::write(src.path().join("a.txt"), b"winner-content").expect("write src");
        fs::write(dest.path().join("a.txt"), b"untouched").expect("write dest");

        let plan = Plan::from_discovery(vec![Operation::replace(
            record_for(&src.path().join("a.txt")),
            record_for(&dest.path().join("a.txt")),
            true,
        )]);

        let report = execute_plan(&plan, None, &CancelToken::new()).expect("execute");

        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.failures[0].error,
            SyncError::AmbiguousReplace { .. }
        ));
        assert_eq!(
            fs::read(dest.path().join("a.txt")).expect("read"),
            b"untouched",
            "no file is touched while the replace is ambiguous"
        );
    }

    #[test]
    fn test_execute_removes_children_then_directory() {
        let dest = TempDir::new().expect("dest");
        fs::create_dir(dest.path().join("old")).expect("mkdir");
        fs::write(dest.path().join("old/a.txt"), b"x").expect("write");

        let plan = Plan::from_discovery(vec![
            Operation::remove(record_for(&dest.path().join("old/a.txt"))),
            Operation::remove(record_for(&dest.path().join("old"))),
        ]);

        let report = execute_plan(&plan, None, &CancelToken::new()).expect("execute");

        assert!(report.is_clean(), "failures: {:?}", report.failures);
        assert!(!dest.path().join("old").exists());
    }

    #[test]
    fn test_execute_skips_forbidden_operations() {
        let src = TempDir::new().expect("src");
        let dest = TempDir::new().expect("dest");
        fs::write(src.path().join("a.txt"), b"data").expect("write");

        let mut plan = Plan::from_discovery(vec![Operation::copy(
            record_for(&src.path().join("a.txt")),
            dest.path().to_path_buf(),
        )]);
        plan.set_forbidden(0, true).expect("forbid");

        let report = execute_plan(&plan, None, &CancelToken::new()).expect("execute");

        assert_eq!(report.skipped, 1);
        assert_eq!(report.executed, 0);
        assert!(!dest.path().join("a.txt").exists());
    }

    #[test]
    fn test_execute_continues_after_failure_and_reports_it() {
        let src = TempDir::new().expect("src");
        let dest = TempDir::new().expect("dest");
        fs::write(src.path().join("good.txt"), b"good").expect("write");
        let mut missing = record_for(&src.path().join("good.txt"));
        missing.path = src.path().join("missing.txt");

        let plan = Plan::from_discovery(vec![
            Operation::copy(missing, dest.path().to_path_buf()),
            Operation::copy(
                record_for(&src.path().join("good.txt")),
                dest.path().to_path_buf(),
            ),
        ]);

        let report = execute_plan(&plan, None, &CancelToken::new()).expect("execute");

        assert_eq!(report.executed, 1);
        assert_eq!(report.failures.len(), 1);
        assert!(dest.path().join("good.txt").exists());
    }

    #[test]
    fn test_execute_emits_events_in_order() {
        let src = TempDir::new().expect("src");
        let dest = TempDir::new().expect("dest");
        fs::write(src.path().join("a.txt"), b"data").expect("write");

        let plan = Plan::from_discovery(vec![Operation::copy(
            record_for(&src.path().join("a.txt")),
            dest.path().to_path_buf(),
        )]);

        let events: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let events_ref = Arc::clone(&events);
        let callback = move |event: &ExecutionEvent<'_>| {
            let label = match event {
                ExecutionEvent::OpStart { .. } => "start",
                ExecutionEvent::OpSuccess { .. } => "success",
                ExecutionEvent::OpError { .. } => "error",
                ExecutionEvent::OpSkipped { .. } => "skipped",
                ExecutionEvent::Complete => "complete",
            };
            events_ref.lock().expect("lock").push(label.to_string());
        };

        execute_plan(&plan, Some(&callback), &CancelToken::new()).expect("execute");

        let snapshot = events.lock().expect("lock").clone();
        assert_eq!(snapshot, vec!["start", "success", "complete"]);
    }
}
