//! C ABI for host applications: one scan call plus opaque-handle
//! accessors over the result tree.
//!
//! Every handle returned by this module is owned by the caller. Node
//! handles obtained through [`duscan_result_root_node`] or
//! [`duscan_node_child`] are independent of the result handle and must
//! each be released with [`duscan_node_free`]; path strings go back
//! through [`duscan_path_free`]. Null pointers are tolerated everywhere
//! and read as neutral values.

use std::ffi::{c_char, CStr, CString};
use std::path::Path;
use std::ptr;

use crate::node::{ScanResult, SizeNode};
use crate::ScanOptions;

/// Scan `path` and return an owned result handle.
///
/// Release with [`duscan_result_free`]. Returns null only for a null or
/// NUL-embedded path; a missing path yields a valid result whose root is
/// a zero-size leaf.
///
/// # Safety
/// `path` must be null or point to a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn duscan_scan(
    path: *const c_char,
    root_only: bool,
    include_directory_self_size: bool,
    use_allocated_size: bool,
) -> *mut ScanResult {
    if path.is_null() {
        return ptr::null_mut();
    }
    let bytes = CStr::from_ptr(path).to_bytes();

    #[cfg(unix)]
    let path = {
        use std::os::unix::ffi::OsStrExt;
        Path::new(std::ffi::OsStr::from_bytes(bytes))
    };
    #[cfg(not(unix))]
    let path = match std::str::from_utf8(bytes) {
        Ok(s) => Path::new(s),
        Err(_) => return ptr::null_mut(),
    };

    let options = ScanOptions {
        root_only,
        include_directory_self_size,
        use_allocated_size,
        ..ScanOptions::default()
    };
    Box::into_raw(Box::new(crate::scan(path, options)))
}

/// Freshly-owned handle to the result's root node; release with
/// [`duscan_node_free`].
///
/// # Safety
/// `result` must be null or a handle from [`duscan_scan`].
#[no_mangle]
pub unsafe extern "C" fn duscan_result_root_node(result: *const ScanResult) -> *mut SizeNode {
    match result.as_ref() {
        Some(result) => Box::into_raw(Box::new(result.root.clone())),
        None => ptr::null_mut(),
    }
}

/// Elapsed wall-clock milliseconds of the scan; 0 for a null handle.
///
/// # Safety
/// `result` must be null or a handle from [`duscan_scan`].
#[no_mangle]
pub unsafe extern "C" fn duscan_result_elapsed_ms(result: *const ScanResult) -> u64 {
    result.as_ref().map(|result| result.elapsed_ms).unwrap_or(0)
}

/// Release a result handle.
///
/// # Safety
/// `result` must be null or an unreleased handle from [`duscan_scan`].
#[no_mangle]
pub unsafe extern "C" fn duscan_result_free(result: *mut ScanResult) {
    if !result.is_null() {
        drop(Box::from_raw(result));
    }
}

/// The node's path as a newly allocated C string; release with
/// [`duscan_path_free`]. Null for a null handle or a path with an
/// embedded NUL.
///
/// # Safety
/// `node` must be null or an unreleased node handle.
#[no_mangle]
pub unsafe extern "C" fn duscan_node_path(node: *const SizeNode) -> *mut c_char {
    let node = match node.as_ref() {
        Some(node) => node,
        None => return ptr::null_mut(),
    };

    #[cfg(unix)]
    let bytes = {
        use std::os::unix::ffi::OsStrExt;
        node.path.as_os_str().as_bytes().to_vec()
    };
    #[cfg(not(unix))]
    let bytes = node.path.to_string_lossy().into_owned().into_bytes();

    match CString::new(bytes) {
        Ok(path) => path.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Release a path string returned by [`duscan_node_path`].
///
/// # Safety
/// `path` must be null or an unreleased string from
/// [`duscan_node_path`].
#[no_mangle]
pub unsafe extern "C" fn duscan_path_free(path: *mut c_char) {
    if !path.is_null() {
        drop(CString::from_raw(path));
    }
}

/// Aggregated size in bytes; 0 for a null handle.
///
/// # Safety
/// `node` must be null or an unreleased node handle.
#[no_mangle]
pub unsafe extern "C" fn duscan_node_size(node: *const SizeNode) -> u64 {
    node.as_ref().map(|node| node.size).unwrap_or(0)
}

/// Whether the node is a directory; false for a null handle.
///
/// # Safety
/// `node` must be null or an unreleased node handle.
#[no_mangle]
pub unsafe extern "C" fn duscan_node_is_directory(node: *const SizeNode) -> bool {
    node.as_ref().map(|node| node.is_dir).unwrap_or(false)
}

/// Number of children; 0 for a null handle.
///
/// # Safety
/// `node` must be null or an unreleased node handle.
#[no_mangle]
pub unsafe extern "C" fn duscan_node_children_count(node: *const SizeNode) -> usize {
    node.as_ref().map(|node| node.children.len()).unwrap_or(0)
}

/// Freshly-owned handle to the child at `index`, or null when out of
/// range. Release with [`duscan_node_free`].
///
/// # Safety
/// `node` must be null or an unreleased node handle.
#[no_mangle]
pub unsafe extern "C" fn duscan_node_child(node: *const SizeNode, index: usize) -> *mut SizeNode {
    match node.as_ref().and_then(|node| node.children.get(index)) {
        Some(child) => Box::into_raw(Box::new(child.clone())),
        None => ptr::null_mut(),
    }
}

/// Release a node handle.
///
/// # Safety
/// `node` must be null or an unreleased node handle.
#[no_mangle]
pub unsafe extern "C" fn duscan_node_free(node: *mut SizeNode) {
    if !node.is_null() {
        drop(Box::from_raw(node));
    }
}
