//! Progress reporting

use indicatif::{HumanBytes, ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Instant;

/// Progress reporter for the scan and execution phases
pub struct ProgressReporter {
    scan_bar: ProgressBar,
    execute_bar: ProgressBar,
    execute_started_at: Option<Instant>,
    folders_entered: u64,
    copied_bytes: u64,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let scan_bar = ProgressBar::new_spinner();
        scan_bar.enable_steady_tick(std::time::Duration::from_millis(120));
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            scan_bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
        }

        let execute_bar = ProgressBar::new(0);
        if let Ok(style) =
            ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} operations | {msg}")
        {
            execute_bar.set_style(style.progress_chars("=>-"));
        }

        Self {
            scan_bar,
            execute_bar,
            execute_started_at: None,
            folders_entered: 0,
            copied_bytes: 0,
        }
    }

    /// Mark start of the scan phase.
    pub fn start_scan(&mut self) {
        self.folders_entered = 0;
        self.scan_bar.set_message("Scanning...".to_string());
    }

    /// Record one folder pair entered by the walk.
    pub fn entering_folder(&mut self, folder: &Path) {
        self.folders_entered += 1;
        self.scan_bar.set_message(format!(
            "Scanning... {} folders | {}",
            self.folders_entered,
            folder.display()
        ));
    }

    /// Mark completion of the scan phase.
    pub fn finish_scan(&self, operations: usize) {
        self.scan_bar.finish_with_message(format!(
            "Scanned {} folders: {} operations planned",
            self.folders_entered, operations
        ));
    }

    /// Initialize execution phase progress.
    pub fn start_execute(&mut self, total_operations: u64) {
        self.execute_started_at = Some(Instant::now());
        self.copied_bytes = 0;
        self.execute_bar.set_length(total_operations);
        self.execute_bar.set_position(0);
        self.execute_bar.set_message("Starting...".to_string());
    }

    /// Update current operation indicator.
    pub fn set_current_operation(&self, name: &str, path: &Path) {
        self.execute_bar
            .set_message(format!("{} {}", name, path.display()));
    }

    /// Mark one operation complete and refresh the throughput display.
    pub fn complete_operation(&mut self, bytes: u64) {
        self.copied_bytes = self.copied_bytes.saturating_add(bytes);
        self.execute_bar.inc(1);

        let throughput = self.current_throughput_bps();
        self.execute_bar.set_message(format!(
            "{} copied | {}/s",
            HumanBytes(self.copied_bytes),
            HumanBytes(throughput)
        ));
    }

    /// Advance past an operation that ran no effect.
    pub fn skip_operation(&self) {
        self.execute_bar.inc(1);
    }

    /// Surface an operation error without stopping the bar.
    pub fn operation_error(&self, name: &str, path: &Path, err: &str) {
        self.execute_bar
            .println(format!("ERROR {} {}: {}", name, path.display(), err));
        self.execute_bar.inc(1);
    }

    /// Finalize the execution phase.
    pub fn finish_execute(&self, executed: usize, skipped: usize, failed: usize, bytes: u64) {
        let throughput = self.current_throughput_bps();
        self.execute_bar.finish_with_message(format!(
            "Done: {} executed, {} skipped, {} failed | {} | {}/s",
            executed,
            skipped,
            failed,
            HumanBytes(bytes),
            HumanBytes(throughput)
        ));
    }

    fn current_throughput_bps(&self) -> u64 {
        match self.execute_started_at {
            Some(started) => {
                let secs = started.elapsed().as_secs_f64();
                if secs > 0.0 {
                    (self.copied_bytes as f64 / secs) as u64
                } else {
                    0
                }
            }
            None => 0,
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}
