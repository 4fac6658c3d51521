//! Lock-step two-tree walk producing an operation plan

use super::compare::{compare_records, ComparisonConfig, Preference};
use crate::config::{Direction, SyncOptions};
use crate::types::{CancelToken, EntryKey, FileRecord, Operation, SyncError};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Progress hook invoked once per folder the scan enters.
pub type EnterFolderCallback<'a> = &'a mut dyn FnMut(&Path);

/// Deterministic directory listing keyed by tree-matching equivalence.
type Listing = BTreeMap<EntryKey, FileRecord>;

/// Compare two folder trees and return the operations, in discovery order,
/// that would bring them into the configured relationship.
///
/// Configuration is passed in explicitly so scans are reproducible and
/// testable in isolation; nothing here reads ambient state. Fails before
/// walking anything when either root is missing or both roots are the same
/// folder. A cancelled scan surfaces no partial result.
pub fn scan_trees(
    source: &Path,
    destination: &Path,
    direction: Direction,
    options: &SyncOptions,
    comparison: &ComparisonConfig,
    on_enter: EnterFolderCallback,
    cancel: &CancelToken,
) -> Result<Vec<Operation>, SyncError> {
    if !source.is_dir() {
        return Err(SyncError::SourceNotFound(source.to_path_buf()));
    }
    if !destination.is_dir() {
        return Err(SyncError::DestinationNotFound(destination.to_path_buf()));
    }
    if source == destination {
        return Err(SyncError::SameFolder(source.to_path_buf()));
    }

    // The walk always goes left to right; direction only decides which
    // physical folder plays "left".
    let (left, right) = match direction {
        Direction::DestinationToSource => (destination, source),
        _ => (source, destination),
    };

    let walker = Walker {
        direction,
        options,
        comparison,
        cancel,
    };

    let mut ops = Vec::new();
    walker.walk(left, right, on_enter, &mut ops)?;
    Ok(ops)
}

struct Walker<'a> {
    direction: Direction,
    options: &'a SyncOptions,
    comparison: &'a ComparisonConfig,
    cancel: &'a CancelToken,
}

impl Walker<'_> {
    fn walk(
        &self,
        left_dir: &Path,
        right_dir: &Path,
        on_enter: EnterFolderCallback,
        ops: &mut Vec<Operation>,
    ) -> Result<(), SyncError> {
        self.check_cancelled()?;
        on_enter(left_dir);

        let left = self.list_folder(left_dir)?;
        let mut right = self.list_folder(right_dir)?;

        for (key, record) in left {
            match right.remove(&key) {
                None => self.plan_copy(record, right_dir, ops)?,
                Some(counterpart) => {
                    if record.is_dir {
                        // Anchor the pair, then descend
                        let (left_sub, right_sub) =
                            (record.path.clone(), counterpart.path.clone());
                        ops.push(Operation::anchor(record, counterpart));
                        self.walk(&left_sub, &right_sub, on_enter, ops)?;
                    } else {
                        self.plan_replace(record, counterpart, ops);
                    }
                }
            }
        }

        // Entries present only on the right
        for (_key, record) in right {
            if self.direction == Direction::Both {
                self.plan_copy(record, left_dir, ops)?;
            } else {
                self.plan_remove(record, ops)?;
            }
        }

        Ok(())
    }

    /// List one folder, applying the visibility filter at listing level:
    /// filtered-out entries are invisible to every later step, so no anchor
    /// or recursion ever happens for them.
    fn list_folder(&self, dir: &Path) -> Result<Listing, SyncError> {
        let mut listing = Listing::new();

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            let record = FileRecord::from_metadata(entry.path(), &metadata);

            if self.meets_requirements(&record) {
                listing.insert(record.key(), record);
            }
        }

        Ok(listing)
    }

    fn meets_requirements(&self, record: &FileRecord) -> bool {
        if record.hidden && !self.options.sync_hidden_files {
            return false;
        }
        if record.is_dir && !self.options.recursive {
            return false;
        }
        true
    }

    /// Plan bringing an entry that exists on one side only over to `dest_dir`.
    ///
    /// Directories become a CreateDir followed by plans for their contents
    /// against the nonexistent counterpart; files become a Copy when missing
    /// files are allowed to be copied.
    fn plan_copy(
        &self,
        record: FileRecord,
        dest_dir: &Path,
        ops: &mut Vec<Operation>,
    ) -> Result<(), SyncError> {
        self.check_cancelled()?;

        if record.is_dir {
            // Physically empty, not just empty after filtering
            if folder_is_empty(&record.path)? && !self.options.create_empty_dirs {
                return Ok(());
            }

            let target: PathBuf = dest_dir.join(record.file_name());
            let children = self.list_folder(&record.path)?;
            ops.push(Operation::create_dir(record, target.clone()));

            for (_key, child) in children {
                self.plan_copy(child, &target, ops)?;
            }
        } else if self.options.copy_missing_files {
            ops.push(Operation::copy(record, dest_dir.to_path_buf()));
        }

        Ok(())
    }

    /// Plan the outcome for a same-named file pair via the comparator.
    fn plan_replace(&self, left: FileRecord, right: FileRecord, ops: &mut Vec<Operation>) {
        let op = match compare_records(&left, &right, self.comparison) {
            Preference::Preferable => Operation::replace(left, right, false),
            Preference::NonPreferable => {
                if self.direction == Direction::Both {
                    // Copy the winning right version the other way
                    Operation::replace(right, left, false)
                } else {
                    Operation::replace(left, right, true)
                }
            }
            Preference::Undefined => Operation::replace(left, right, true),
            Preference::Equal => Operation::anchor(left, right),
        };
        ops.push(op);
    }

    /// Plan removal of a right-only entry: descendants first, then (when
    /// deletes are enabled) the entry itself.
    fn plan_remove(&self, record: FileRecord, ops: &mut Vec<Operation>) -> Result<(), SyncError> {
        self.check_cancelled()?;

        if record.is_dir {
            for (_key, child) in self.list_folder(&record.path)? {
                self.plan_remove(child, ops)?;
            }
        }

        if self.options.delete_files {
            ops.push(Operation::remove(record));
        }

        Ok(())
    }

    fn check_cancelled(&self) -> Result<(), SyncError> {
        if self.cancel.is_cancelled() {
            Err(SyncError::Cancelled)
        } else {
            Ok(())
        }
    }
}

fn folder_is_empty(dir: &Path) -> Result<bool, SyncError> {
    Ok(fs::read_dir(dir)?.next().is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn scan(
        source: &Path,
        destination: &Path,
        direction: Direction,
        options: &SyncOptions,
    ) -> Result<Vec<Operation>, SyncError> {
        scan_trees(
            source,
            destination,
            direction,
            options,
            &ComparisonConfig::default(),
            &mut |_folder| {},
            &CancelToken::new(),
        )
    }

    fn write_file(dir: &Path, name: &str, content: &[u8]) {
        let mut file = File::create(dir.join(name)).expect("create file");
        file.write_all(content).expect("write file");
    }

    #[test]
    fn test_missing_source_root() {
        let dest = TempDir::new().expect("dest dir");
        let err = scan(
            Path::new("/nonexistent-source"),
            dest.path(),
            Direction::SourceToDestination,
            &SyncOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(err, SyncError::SourceNotFound(_)));
    }

    #[test]
    fn test_missing_destination_root() {
        let src = TempDir::new().expect("src dir");
        let err = scan(
            src.path(),
            Path::new("/nonexistent-dest"),
            Direction::SourceToDestination,
            &SyncOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(err, SyncError::DestinationNotFound(_)));
    }

    #[test]
    fn test_same_folder_rejected() {
        let dir = TempDir::new().expect("dir");
        let err = scan(
            dir.path(),
            dir.path(),
            Direction::SourceToDestination,
            &SyncOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(err, SyncError::SameFolder(_)));
    }

    #[test]
    fn test_cancelled_scan_surfaces_no_partial_plan() {
        let src = TempDir::new().expect("src dir");
        let dest = TempDir::new().expect("dest dir");
        write_file(src.path(), "a.txt", b"payload");

        let token = CancelToken::new();
        token.cancel();

        let result = scan_trees(
            src.path(),
            dest.path(),
            Direction::SourceToDestination,
            &SyncOptions::default(),
            &ComparisonConfig::default(),
            &mut |_folder| {},
            &token,
        );

        assert!(matches!(result, Err(SyncError::Cancelled)));
    }

    #[test]
    fn test_enter_folder_callback_visits_subfolders() {
        let src = TempDir::new().expect("src dir");
        let dest = TempDir::new().expect("dest dir");
        fs::create_dir(src.path().join("sub")).expect("mkdir src sub");
        fs::create_dir(dest.path().join("sub")).expect("mkdir dest sub");

        let mut visited = Vec::new();
        scan_trees(
            src.path(),
            dest.path(),
            Direction::SourceToDestination,
            &SyncOptions::default(),
            &ComparisonConfig::default(),
            &mut |folder| visited.push(folder.to_path_buf()),
            &CancelToken::new(),
        )
        .expect("scan");

        assert_eq!(visited.len(), 2);
        assert_eq!(visited[0], src.path());
        assert_eq!(visited[1], src.path().join("sub"));
    }
}
