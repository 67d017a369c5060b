//! Usage Probes - Measuring bytes consumed under a storage root
//!
//! The one piece of real I/O in the admission path. Everything above it
//! works on plain numbers, so tests inject deterministic fakes.

use std::io;
use std::path::{Path, PathBuf};
use sysinfo::Disks;
use walkdir::WalkDir;

/// Backend-specific view of a storage root's consumption.
pub trait UsageProbe: Send + Sync {
    /// Total bytes occupied under the storage root right now.
    fn usage(&self) -> io::Result<u64>;

    /// Usable capacity (free + used) of the store backing the root.
    /// Only queried for policies that need it.
    fn usable_capacity(&self) -> io::Result<u64>;
}

/// Probe for a local filesystem root.
pub struct FileSystemProbe {
    root: PathBuf,
}

impl FileSystemProbe {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl UsageProbe for FileSystemProbe {
    /// Recursively sums regular-file sizes under the root.
    ///
    /// Symlinks are neither followed nor counted: a link cannot drag the
    /// walk outside the root, and a link to a file inside the root does
    /// not double-count it.
    fn usage(&self) -> io::Result<u64> {
        let mut total = 0u64;

        for entry in WalkDir::new(&self.root).follow_links(false) {
            let entry = entry?;
            if entry.file_type().is_file() {
                total += entry.metadata()?.len();
            }
        }

        Ok(total)
    }

    /// Total space of the disk holding the root, resolved by the longest
    /// mount-point prefix of the canonicalized root.
    fn usable_capacity(&self) -> io::Result<u64> {
        let root = self.root.canonicalize()?;
        let disks = Disks::new_with_refreshed_list();

        let disk = disks
            .list()
            .iter()
            .filter(|disk| root.starts_with(disk.mount_point()))
            .max_by_key(|disk| disk.mount_point().as_os_str().len())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no mounted disk found for {}", root.display()),
                )
            })?;

        Ok(disk.total_space())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_usage_sums_files_recursively() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.jar"), vec![0u8; 10]).unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("b.pom"), vec![0u8; 20]).unwrap();

        let probe = FileSystemProbe::new(dir.path());
        assert_eq!(probe.usage().unwrap(), 30);
    }

    #[test]
    fn test_usage_of_empty_root() {
        let dir = TempDir::new().unwrap();
        let probe = FileSystemProbe::new(dir.path());
        assert_eq!(probe.usage().unwrap(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_not_counted() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("root");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("real.bin"), vec![0u8; 64]).unwrap();

        // Link to a large file outside the root must not inflate usage.
        let outside = dir.path().join("outside.bin");
        fs::write(&outside, vec![0u8; 4096]).unwrap();
        std::os::unix::fs::symlink(&outside, root.join("escape.bin")).unwrap();

        // Link inside the root must not double-count its target.
        std::os::unix::fs::symlink(root.join("real.bin"), root.join("alias.bin")).unwrap();

        let probe = FileSystemProbe::new(&root);
        assert_eq!(probe.usage().unwrap(), 64);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let probe = FileSystemProbe::new(dir.path().join("does-not-exist"));
        assert!(probe.usage().is_err());
        assert!(probe.usable_capacity().is_err());
    }

    #[test]
    fn test_usable_capacity_reports_disk_or_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        let probe = FileSystemProbe::new(dir.path());

        // Containers without mount visibility report NotFound instead.
        match probe.usable_capacity() {
            Ok(capacity) => assert!(capacity > 0),
            Err(err) => assert_eq!(err.kind(), io::ErrorKind::NotFound),
        }
    }
}
