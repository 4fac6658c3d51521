//! Main sync command

use crate::diff::{Plan, PlanStats};
use crate::engine::SyncEngine;
use crate::types::{OpKind, Operation, SyncError};
use crate::ui::ProgressReporter;
use crate::Config;
use crate::executor::{ExecutionEvent, OperationFailure};
use console::style;
use indicatif::HumanBytes;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Run one scan-review-execute pass.
pub fn run(config: Config) -> Result<(), SyncError> {
    let reporter = Arc::new(Mutex::new(ProgressReporter::new()));
    let mut engine = SyncEngine::from_config(&config);

    if let Ok(mut progress) = reporter.lock() {
        progress.start_scan();
    }
    {
        let reporter = Arc::clone(&reporter);
        let mut on_enter = move |folder: &Path| {
            if let Ok(mut progress) = reporter.lock() {
                progress.entering_folder(folder);
            }
        };
        engine.scan(&mut on_enter)?;
    }

    let plan = engine.plan().ok_or(SyncError::NoPlan)?;
    if let Ok(progress) = reporter.lock() {
        progress.finish_scan(plan.len());
    }

    println!("{}", format_plan_summary(plan.stats()));

    if config.dry_run {
        println!("{}", format_plan_lines(plan, &config));
        println!("Dry-run mode: no changes were made.");
        return Ok(());
    }

    if plan.stats().effective_count() == 0 {
        println!("Nothing to sync.");
        return Ok(());
    }

    if plan.stats().ambiguous_count > 0 {
        println!(
            "{} {} replacement(s) have no clear winner and will be left untouched.",
            style("note:").yellow().bold(),
            plan.stats().ambiguous_count
        );
    }

    let total = plan.len() as u64;
    if let Ok(mut progress) = reporter.lock() {
        progress.start_execute(total);
    }

    let progress_cb = {
        let reporter = Arc::clone(&reporter);
        move |event: &ExecutionEvent<'_>| match event {
            ExecutionEvent::OpStart { op, .. } => {
                if let Ok(progress) = reporter.lock() {
                    progress.set_current_operation(op.name(), &op.record().path);
                }
            }
            ExecutionEvent::OpSuccess { bytes_copied, .. } => {
                if let Ok(mut progress) = reporter.lock() {
                    progress.complete_operation(*bytes_copied);
                }
            }
            ExecutionEvent::OpError { op, error, .. } => {
                if let Ok(progress) = reporter.lock() {
                    progress.operation_error(op.name(), &op.record().path, &error.to_string());
                }
            }
            ExecutionEvent::OpSkipped { .. } => {
                if let Ok(progress) = reporter.lock() {
                    progress.skip_operation();
                }
            }
            ExecutionEvent::Complete => {}
        }
    };

    let report = engine.execute(Some(&progress_cb))?;
    if let Ok(progress) = reporter.lock() {
        progress.finish_execute(
            report.executed,
            report.skipped,
            report.failures.len(),
            report.bytes_copied,
        );
    }

    if !report.is_clean() {
        println!("{}", format_failure_summary(&report.failures));
    }
    Ok(())
}

fn format_plan_summary(stats: &PlanStats) -> String {
    format!(
        "{}\n  Copy: {}  Replace: {} ({} ambiguous)  Remove: {}  Create: {}  Unchanged: {}\n  Total bytes to copy: {}",
        style("Plan:").bold(),
        stats.copy_count,
        stats.replace_count,
        stats.ambiguous_count,
        stats.remove_count,
        stats.create_count,
        stats.anchor_count,
        HumanBytes(stats.total_bytes)
    )
}

/// One line per planned operation, unchanged pairs folded into a trailing
/// count.
fn format_plan_lines(plan: &Plan, config: &Config) -> String {
    if plan.is_empty() {
        return "Planned operations:\n  (none)".to_string();
    }

    let mut lines = Vec::with_capacity(plan.len() + 1);
    lines.push("Planned operations:".to_string());
    let mut unchanged = 0usize;
    for op in plan.operations() {
        match describe_operation(op, config) {
            Some(line) => lines.push(format!("  {}", line)),
            None => unchanged += 1,
        }
    }

    if unchanged > 0 {
        lines.push(format!("  ({unchanged} unchanged entries omitted)"));
    }

    lines.join("\n")
}

fn describe_operation(op: &Operation, config: &Config) -> Option<String> {
    match op.kind() {
        OpKind::Copy { file, dest_dir } => Some(format!(
            "COPY     {} -> {}",
            rel(&file.path, config).display(),
            rel(dest_dir, config).display()
        )),
        OpKind::Replace {
            winner,
            loser,
            ambiguous,
        } => {
            let marker = if *ambiguous { "  [no clear winner]" } else { "" };
            Some(format!(
                "REPLACE  {} <- {}{}",
                rel(&loser.path, config).display(),
                rel(&winner.path, config).display(),
                marker
            ))
        }
        OpKind::Remove { target } => Some(format!(
            "REMOVE   {}",
            rel(&target.path, config).display()
        )),
        OpKind::CreateDir { target, .. } => {
            Some(format!("CREATE   {}", rel(target, config).display()))
        }
        OpKind::Anchor { .. } => None,
    }
}

/// Show paths relative to whichever root they live under; side is implied by
/// the operation, full paths would only add noise.
fn rel(path: &Path, config: &Config) -> PathBuf {
    path.strip_prefix(&config.source)
        .or_else(|_| path.strip_prefix(&config.destination))
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}

fn format_failure_summary(failures: &[OperationFailure]) -> String {
    let mut groups: BTreeMap<&'static str, Vec<&OperationFailure>> = BTreeMap::new();
    for failure in failures {
        groups.entry(error_kind_label(&failure.error)).or_default().push(failure);
    }

    let mut lines = Vec::new();
    lines.push("Failure summary:".to_string());
    for (kind, items) in groups {
        lines.push(format!("  {} ({}):", kind, items.len()));
        for failure in items.iter().take(3) {
            lines.push(format!(
                "    - {} {}",
                failure.name,
                failure.path.display()
            ));
            if let Some(hint) = error_hint(&failure.error) {
                lines.push(format!("      Try: {}", hint));
            }
        }
        if items.len() > 3 {
            lines.push(format!("    - ... {} more", items.len() - 3));
        }
    }
    lines.join("\n")
}

fn error_kind_label(error: &SyncError) -> &'static str {
    match error {
        SyncError::Io(io) => match io.kind() {
            ErrorKind::NotFound => "Path not found",
            ErrorKind::PermissionDenied => "Permission denied",
            ErrorKind::AlreadyExists => "Path already exists",
            _ => "I/O error",
        },
        SyncError::AmbiguousReplace { .. } => "No clear winner",
        _ => "Sync error",
    }
}

fn error_hint(error: &SyncError) -> Option<&'static str> {
    match error {
        SyncError::Io(io) => match io.kind() {
            ErrorKind::NotFound => {
                Some("Verify the path still exists, then scan again.")
            }
            ErrorKind::PermissionDenied => {
                Some("Check file permissions or run with a user that has access.")
            }
            ErrorKind::AlreadyExists => {
                Some("Remove or rename the conflicting path, then scan again.")
            }
            _ => Some("Scan again and retry; check disk health if it persists."),
        },
        SyncError::AmbiguousReplace { .. } => {
            Some("Make one side newer (touch it) or copy it by hand, then scan again.")
        }
        _ => None,
    }
}
