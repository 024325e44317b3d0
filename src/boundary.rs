//! Filesystem-boundary oracle: mount points, firmlinks, and hard-link
//! aliases of top-level directories.
//!
//! On split-volume systems the installed hierarchy and the data volume
//! are stitched together by firmlinks, so a plain device-id rule is not
//! enough: the data-volume shadow of `/Users` must be skipped even
//! though it lives on the same device. The oracle snapshots the mount
//! table once per scan and answers the three boundary predicates from
//! immutable state.

use std::path::{Path, PathBuf};

use crate::probe;

/// Default roots under which the data-volume hierarchy is mounted.
pub const DEFAULT_DATA_ROOTS: &[&str] = &["/System/Volumes/Data"];

/// Standard split-volume firmlink table: installed absolute path mapped
/// to its relative location beneath a data root.
pub const DEFAULT_FIRMLINKS: &[(&str, &str)] = &[
    ("/AppleInternal", "AppleInternal"),
    ("/Applications", "Applications"),
    ("/Library", "Library"),
    ("/System/Library/Caches", "System/Library/Caches"),
    ("/System/Library/Assets", "System/Library/Assets"),
    ("/System/Library/PreinstalledAssets", "System/Library/PreinstalledAssets"),
    ("/System/Library/AssetsV2", "System/Library/AssetsV2"),
    (
        "/System/Library/PreinstalledAssetsV2",
        "System/Library/PreinstalledAssetsV2",
    ),
    (
        "/System/Library/CoreServices/CoreTypes.bundle/Contents/Library",
        "System/Library/CoreServices/CoreTypes.bundle/Contents/Library",
    ),
    ("/System/Library/Speech", "System/Library/Speech"),
    ("/Users", "Users"),
    ("/Volumes", "Volumes"),
    ("/cores", "cores"),
    ("/opt", "opt"),
    ("/private", "private"),
    ("/usr/local", "usr/local"),
    ("/usr/libexec/cups", "usr/libexec/cups"),
    ("/usr/share/snmp", "usr/share/snmp"),
];

/// Immutable per-scan snapshot of the boundary state.
#[derive(Debug, Clone)]
pub struct BoundaryOracle {
    /// Mount roots other than `/`.
    mounts: Vec<PathBuf>,
    /// Installed path -> relative path beneath a data root.
    firmlinks: Vec<(PathBuf, PathBuf)>,
    data_roots: Vec<PathBuf>,
}

impl BoundaryOracle {
    /// Snapshot the kernel mount table and pair it with the default
    /// firmlink layout.
    pub fn snapshot() -> Self {
        let disks = sysinfo::Disks::new_with_refreshed_list();
        let mut mounts: Vec<PathBuf> = disks
            .list()
            .iter()
            .map(|disk| disk.mount_point().to_path_buf())
            .filter(|mount| mount != Path::new("/"))
            .collect();
        mounts.sort();
        mounts.dedup();

        log::debug!("boundary snapshot: {} secondary mounts", mounts.len());

        Self::from_parts(
            mounts,
            DEFAULT_FIRMLINKS
                .iter()
                .map(|(installed, relative)| (PathBuf::from(installed), PathBuf::from(relative)))
                .collect(),
            DEFAULT_DATA_ROOTS.iter().map(PathBuf::from).collect(),
        )
    }

    /// Build an oracle from explicit tables. Production scans go through
    /// [`BoundaryOracle::snapshot`]; this is the injection point for tests.
    pub fn from_parts(
        mounts: Vec<PathBuf>,
        firmlinks: Vec<(PathBuf, PathBuf)>,
        data_roots: Vec<PathBuf>,
    ) -> Self {
        Self {
            mounts,
            firmlinks,
            data_roots,
        }
    }

    /// True iff `path` is itself the root of a recorded mount.
    pub fn is_mount(&self, path: &Path) -> bool {
        self.mounts.iter().any(|mount| mount.as_path() == path)
    }

    /// True iff `path` lies strictly below some recorded mount root.
    pub fn is_sub_of_any_mount(&self, path: &Path) -> bool {
        self.mounts
            .iter()
            .any(|mount| mount.as_path() != path && path.starts_with(mount))
    }

    /// True iff `path` is the data-volume shadow of a firmlinked
    /// directory: it lies under a data root, and the remainder equals or
    /// descends into one of the firmlink targets.
    pub fn covered_by_firmlink(&self, path: &Path) -> bool {
        for data_root in &self.data_roots {
            let relative = match path.strip_prefix(data_root) {
                Ok(relative) => relative,
                Err(_) => continue,
            };
            if self
                .firmlinks
                .iter()
                .any(|(_, target)| relative.starts_with(target))
            {
                return true;
            }
        }
        false
    }
}

/// Detects the firmlink mirror of a top-level directory: true iff
/// `/<basename>` is a different path whose inode matches `path`.
///
/// The probed path itself may be a direct child of `/`; that is never an
/// alias.
pub fn aliases_root_child(path: &Path) -> bool {
    let name = match path.file_name() {
        Some(name) => name,
        None => return false,
    };
    let candidate = Path::new("/").join(name);
    if candidate.as_path() == path {
        return false;
    }
    probe::same_inode(path, &candidate)
}
