//! Per-scan context: configuration, boundary snapshot, worker lanes,
//! the entry point, and the visited-path set.
//!
//! One context lives exactly as long as one scan. The visited set is
//! the only mutable state and is guarded by its own mutex; everything
//! else is written once at construction and read-only afterwards.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use crate::boundary::BoundaryOracle;
use crate::probe;
use crate::scheduler::Scheduler;
use crate::ScanOptions;

/// The first path the skip policy ever evaluated, with its device id.
#[derive(Debug)]
struct EntryPoint {
    path: PathBuf,
    device: u64,
}

/// Process-wide state for one scan.
pub struct ScanContext {
    options: ScanOptions,
    fs_type: String,
    oracle: BoundaryOracle,
    scheduler: Scheduler,
    entry: OnceLock<EntryPoint>,
    visited: Mutex<HashSet<PathBuf>>,
}

impl ScanContext {
    /// Snapshot the boundary state and spin up the worker lanes for a
    /// scan rooted at `entry`.
    pub fn new(entry: &Path, options: ScanOptions) -> Self {
        let fs_type = probe::fs_type(entry);
        let scheduler = Scheduler::new(options.effective_threads());
        Self::with_oracle(options, fs_type, BoundaryOracle::snapshot(), scheduler)
    }

    pub(crate) fn with_oracle(
        options: ScanOptions,
        fs_type: String,
        oracle: BoundaryOracle,
        scheduler: Scheduler,
    ) -> Self {
        Self {
            options,
            fs_type,
            oracle,
            scheduler,
            entry: OnceLock::new(),
            visited: Mutex::new(HashSet::new()),
        }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Filesystem type tag of the entry path; empty when unknown.
    pub fn fs_type(&self) -> &str {
        &self.fs_type
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Decide whether descent into `path` crosses a boundary.
    ///
    /// The first path evaluated becomes the scan's entry point: the
    /// entry itself is always descended, secondary mounts inside the
    /// entry subtree are not, and a scan that starts on such a volume
    /// works normally.
    pub fn should_skip(&self, path: &Path) -> bool {
        if self.oracle.covered_by_firmlink(path) {
            log::debug!("skipping {}: covered by firmlink", path.display());
            return true;
        }

        let entry = self.entry.get_or_init(|| EntryPoint {
            path: path.to_path_buf(),
            device: probe::device_of(path),
        });

        if self.oracle.is_mount(path) {
            let below_entry = path != entry.path.as_path() && path.starts_with(&entry.path);
            if below_entry {
                log::debug!("skipping {}: mount below entry", path.display());
            }
            return below_entry;
        }

        if self.oracle.is_sub_of_any_mount(path) {
            if probe::device_of(path) == entry.device {
                return false;
            }
            if path.starts_with(&entry.path)
                && path != entry.path.as_path()
                && self.oracle.is_mount(&entry.path)
            {
                return false;
            }
            log::debug!("skipping {}: inside foreign mount", path.display());
            return true;
        }

        false
    }

    /// Record `path` in the visited set; false means it was already
    /// there and the caller must drop the duplicate subtree.
    pub fn mark_visited(&self, path: &Path) -> bool {
        let mut visited = match self.visited.lock() {
            Ok(guard) => guard,
            // a lane that panicked mid-insert left a usable set behind
            Err(poisoned) => poisoned.into_inner(),
        };
        visited.insert(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn context(mounts: &[&str]) -> ScanContext {
        let oracle = BoundaryOracle::from_parts(
            mounts.iter().map(PathBuf::from).collect(),
            vec![(PathBuf::from("/Users"), PathBuf::from("Users"))],
            vec![PathBuf::from("/data")],
        );
        ScanContext::with_oracle(
            ScanOptions::default(),
            String::new(),
            oracle,
            Scheduler::new(1),
        )
    }

    #[test]
    fn test_firmlink_shadow_is_skipped_before_anything_else() {
        let ctx = context(&[]);
        assert!(ctx.should_skip(Path::new("/data/Users/alice")));
    }

    #[test]
    fn test_entry_path_is_never_skipped() {
        let ctx = context(&["/mnt/disk"]);
        // first evaluation records /mnt/disk as the entry point
        assert!(!ctx.should_skip(Path::new("/mnt/disk")));
        // and it stays descendable afterwards
        assert!(!ctx.should_skip(Path::new("/mnt/disk")));
    }

    #[test]
    fn test_mount_below_entry_is_skipped() {
        let ctx = context(&["/scan/usb"]);
        assert!(!ctx.should_skip(Path::new("/scan")));
        assert!(ctx.should_skip(Path::new("/scan/usb")));
    }

    #[test]
    fn test_mount_outside_entry_is_not_skipped() {
        let ctx = context(&["/elsewhere"]);
        assert!(!ctx.should_skip(Path::new("/scan")));
        assert!(!ctx.should_skip(Path::new("/elsewhere")));
    }

    #[test]
    fn test_same_device_below_mount_is_descended() {
        let tmp = TempDir::new().unwrap();
        let mount = tmp.path().to_string_lossy().into_owned();
        let inside = tmp.path().join("inside");
        std::fs::create_dir(&inside).unwrap();

        let ctx = context(&[&mount]);
        // entry is a parent of the mount; the path below the mount sits
        // on the same device as the entry, so it is not a crossing
        assert!(!ctx.should_skip(tmp.path().parent().unwrap()));
        assert!(!ctx.should_skip(&inside));
    }

    #[test]
    fn test_mark_visited_reports_duplicates() {
        let ctx = context(&[]);
        assert!(ctx.mark_visited(Path::new("/a/b")));
        assert!(!ctx.mark_visited(Path::new("/a/b")));
        assert!(ctx.mark_visited(Path::new("/a/c")));
    }
}
