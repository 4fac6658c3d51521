//! Atomic whole-file copy

use crate::types::SyncError;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

/// Copy `src` to `dest` using the write-then-rename strategy.
///
/// The content is streamed into a temporary `.part` file, synced to disk,
/// given the source's permissions and modification time, then renamed into
/// place. A crash mid-copy leaves the destination untouched. Returns the
/// number of bytes copied.
pub fn copy_file_atomic(src: &Path, dest: &Path) -> Result<u64, SyncError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    let part_path = dest.with_extension("part");

    let mut src_file = File::open(src)?;
    let mut part_file = File::create(&part_path)?;

    let mut buffer = vec![0u8; 128 * 1024];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = src_file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        part_file.write_all(&buffer[0..bytes_read])?;
        total_bytes += bytes_read as u64;
    }

    part_file.sync_all()?;

    // The handle must be closed before rename on Windows
    drop(part_file);

    // Carry permissions and mtime over so a copied file compares equal to
    // its original on the next scan
    let src_metadata = fs::metadata(src)?;
    fs::set_permissions(&part_path, src_metadata.permissions())?;

    let mtime = src_metadata.modified()?;
    filetime::set_file_mtime(&part_path, filetime::FileTime::from_system_time(mtime))?;

    fs::rename(&part_path, dest)?;

    Ok(total_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_preserves_content_and_mtime() {
        let dir = TempDir::new().expect("tempdir");
        let src = dir.path().join("src.txt");
        let dest = dir.path().join("out/dest.txt");
        fs::write(&src, b"payload").expect("write src");

        let bytes = copy_file_atomic(&src, &dest).expect("copy");

        assert_eq!(bytes, 7);
        assert_eq!(fs::read(&dest).expect("read dest"), b"payload");
        let src_mtime = fs::metadata(&src).expect("src meta").modified().expect("mtime");
        let dest_mtime = fs::metadata(&dest)
            .expect("dest meta")
            .modified()
            .expect("mtime");
        assert_eq!(src_mtime, dest_mtime);
    }

    #[test]
    fn test_copy_missing_source_fails_without_touching_dest() {
        let dir = TempDir::new().expect("tempdir");
        let dest = dir.path().join("dest.txt");

        let result = copy_file_atomic(&dir.path().join("missing.txt"), &dest);

        assert!(result.is_err());
        assert!(!dest.exists());
    }

    #[test]
    fn test_copy_overwrites_existing_destination() {
        let dir = TempDir::new().expect("tempdir");
        let src = dir.path().join("src.txt");
        let dest = dir.path().join("dest.txt");
        fs::write(&src, b"new").expect("write src");
        fs::write(&dest, b"old-content").expect("write dest");

        copy_file_atomic(&src, &dest).expect("copy");

        assert_eq!(fs::read(&dest).expect("read dest"), b"new");
    }
}
