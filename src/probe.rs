//! Low-level path probes: lstat/stat wrappers, allocated-size queries,
//! inode identity and readability checks.
//!
//! Every probe swallows its errors and degrades to a neutral answer
//! (zero size, `false`, empty string). The walker relies on that: a
//! single unreadable or vanished entry must never abort a scan.

use std::fs;
use std::path::Path;

/// Size and kind of a path as seen through lstat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathInfo {
    /// Size in bytes; honors allocated-size mode for files and directories.
    pub bytes: u64,
    /// Whether the inode is a directory.
    pub is_dir: bool,
}

/// Returns true iff the inode at `path` is a symbolic link.
///
/// Uses lstat; any failure reads as "not a symlink".
pub fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|md| md.file_type().is_symlink())
        .unwrap_or(false)
}

/// Probe size and kind without following symlinks.
///
/// A symbolic link reports the length of its target string and is never
/// a directory. Regular files and directories report either the
/// allocated on-disk size or the logical size, depending on
/// `use_allocated`. Any failure yields `{0, false}`.
pub fn info(path: &Path, use_allocated: bool) -> PathInfo {
    let md = match fs::symlink_metadata(path) {
        Ok(md) => md,
        Err(_) => return PathInfo { bytes: 0, is_dir: false },
    };

    if md.file_type().is_symlink() {
        // lstat's size field for a link is the length of the target string
        return PathInfo {
            bytes: md.len(),
            is_dir: false,
        };
    }

    let bytes = if use_allocated {
        allocated_from(&md)
    } else {
        md.len()
    };

    PathInfo {
        bytes,
        is_dir: md.is_dir(),
    }
}

/// Bytes actually reserved on the storage medium for `path`.
///
/// Returns 0 on any failure.
pub fn allocated_size(path: &Path) -> u64 {
    fs::symlink_metadata(path)
        .map(|md| allocated_from(&md))
        .unwrap_or(0)
}

/// The reported size field of a stat (link-following) call, used for a
/// directory's own contribution. Returns 0 on failure.
pub fn self_size(path: &Path) -> u64 {
    fs::metadata(path).map(|md| md.len()).unwrap_or(0)
}

/// True iff both paths exist and their inode numbers match.
#[cfg(unix)]
pub fn same_inode(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    match (fs::symlink_metadata(a), fs::symlink_metadata(b)) {
        (Ok(ma), Ok(mb)) => ma.ino() == mb.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
pub fn same_inode(_a: &Path, _b: &Path) -> bool {
    false
}

/// Device id of the filesystem holding `path`; 0 on failure.
#[cfg(unix)]
pub fn device_of(path: &Path) -> u64 {
    use std::os::unix::fs::MetadataExt;
    fs::symlink_metadata(path).map(|md| md.dev()).unwrap_or(0)
}

#[cfg(not(unix))]
pub fn device_of(_path: &Path) -> u64 {
    0
}

/// Filesystem type name of the mount containing `path`; empty on failure.
///
/// Resolved against the mount with the longest matching prefix, so a
/// path under a nested mount reports the inner filesystem.
pub fn fs_type(path: &Path) -> String {
    let disks = sysinfo::Disks::new_with_refreshed_list();
    let mut best: Option<(usize, String)> = None;

    for disk in disks.list() {
        let mount = disk.mount_point();
        if path.starts_with(mount) {
            let depth = mount.components().count();
            if best.as_ref().map_or(true, |(d, _)| depth > *d) {
                best = Some((depth, disk.file_system().to_string_lossy().into_owned()));
            }
        }
    }

    best.map(|(_, fs)| fs).unwrap_or_default()
}

/// Checks read permission for the calling identity without opening the
/// path (access(2), which is side-effect free).
#[cfg(unix)]
pub fn is_readable(path: &Path) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let cpath = match CString::new(path.as_os_str().as_bytes()) {
        Ok(cpath) => cpath,
        Err(_) => return false,
    };
    unsafe { libc::access(cpath.as_ptr(), libc::R_OK) == 0 }
}

#[cfg(not(unix))]
pub fn is_readable(path: &Path) -> bool {
    fs::metadata(path).is_ok()
}

#[cfg(unix)]
fn allocated_from(md: &fs::Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    // blocks() counts 512-byte units regardless of the fs block size
    md.blocks() * 512
}

#[cfg(not(unix))]
fn allocated_from(md: &fs::Metadata) -> u64 {
    md.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_info_logical_size_of_regular_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("data.bin");
        fs::write(&file, vec![0u8; 1000]).unwrap();

        let info = info(&file, false);
        assert_eq!(info.bytes, 1000);
        assert!(!info.is_dir);
    }

    #[test]
    fn test_info_allocated_size_matches_block_count() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("data.bin");
        fs::write(&file, vec![0u8; 1000]).unwrap();

        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            let expected = fs::symlink_metadata(&file).unwrap().blocks() * 512;
            assert_eq!(info(&file, true).bytes, expected);
            assert_eq!(allocated_size(&file), expected);
        }
    }

    #[test]
    fn test_info_recognizes_directories() {
        let tmp = TempDir::new().unwrap();
        let info = info(tmp.path(), false);
        assert!(info.is_dir);
    }

    #[test]
    fn test_info_missing_path_is_zero() {
        let info = info(Path::new("/no/such/path/anywhere"), true);
        assert_eq!(info, PathInfo { bytes: 0, is_dir: false });
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_reports_target_string_length() {
        let tmp = TempDir::new().unwrap();
        let link = tmp.path().join("link");
        std::os::unix::fs::symlink("/etc/passwd", &link).unwrap();

        assert!(is_symlink(&link));
        let info = info(&link, true);
        assert_eq!(info.bytes, "/etc/passwd".len() as u64);
        assert!(!info.is_dir);
    }

    #[test]
    fn test_is_symlink_false_for_file_and_missing() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("plain");
        fs::write(&file, "x").unwrap();

        assert!(!is_symlink(&file));
        assert!(!is_symlink(&tmp.path().join("missing")));
    }

    #[cfg(unix)]
    #[test]
    fn test_same_inode_via_hard_link() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        let c = tmp.path().join("c");
        fs::write(&a, "payload").unwrap();
        fs::hard_link(&a, &b).unwrap();
        fs::write(&c, "other").unwrap();

        assert!(same_inode(&a, &b));
        assert!(!same_inode(&a, &c));
        assert!(!same_inode(&a, &tmp.path().join("missing")));
    }

    #[test]
    fn test_self_size_of_file_is_logical_length() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("f");
        fs::write(&file, "0123456789").unwrap();

        assert_eq!(self_size(&file), 10);
        assert_eq!(self_size(&tmp.path().join("missing")), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_device_of_is_stable_within_a_directory() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("f");
        fs::write(&file, "x").unwrap();

        assert_eq!(device_of(tmp.path()), device_of(&file));
        assert_ne!(device_of(tmp.path()), 0);
        assert_eq!(device_of(Path::new("/no/such/path")), 0);
    }

    #[test]
    fn test_is_readable_accessible_directory() {
        let tmp = TempDir::new().unwrap();
        assert!(is_readable(tmp.path()));
        assert!(!is_readable(&tmp.path().join("missing")));
    }

    #[cfg(unix)]
    #[test]
    fn test_is_readable_respects_mode_bits() {
        use std::os::unix::fs::PermissionsExt;

        // root bypasses permission bits
        if unsafe { libc::geteuid() } == 0 {
            return;
        }

        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("secret");
        fs::write(&file, "x").unwrap();
        fs::set_permissions(&file, fs::Permissions::from_mode(0o000)).unwrap();

        assert!(!is_readable(&file));

        fs::set_permissions(&file, fs::Permissions::from_mode(0o644)).unwrap();
        assert!(is_readable(&file));
    }
}
