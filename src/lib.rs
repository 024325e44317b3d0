//! duscan - parallel on-disk size scanner
//!
//! This library computes the space a file, directory, or whole subtree
//! occupies on disk and returns a hierarchical size breakdown together
//! with the wall-clock cost of the traversal. The walker fans out to a
//! bounded worker pool at shallow depths, honors filesystem boundaries
//! (secondary mounts, firmlinked directories, hard-link aliases), and
//! tolerates per-entry failures without ever failing the scan.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

pub mod boundary;
pub mod context;
pub mod ffi;
pub mod format;
pub mod node;
pub mod output;
pub mod probe;
pub mod scheduler;
pub mod walker;

use context::ScanContext;
pub use node::{ScanResult, SizeNode};

/// Configuration options for a scan
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Whether to fan work out to a thread pool at all
    pub use_parallel: bool,
    /// Worker lane override; zero means hardware parallelism
    pub max_threads: usize,
    /// Largest depth at which subdirectories may be scheduled on
    /// another lane
    pub depth_cap: usize,
    /// How many directory entries to accumulate before draining
    pub batch_size: usize,
    /// Aggregate as usual but return the root without children
    pub root_only: bool,
    /// Add each directory's own reported size to its total
    pub include_directory_self_size: bool,
    /// Count allocated on-disk bytes instead of logical sizes
    pub use_allocated_size: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            use_parallel: true,
            max_threads: 0,
            depth_cap: 8,
            batch_size: 64,
            root_only: false,
            include_directory_self_size: false,
            use_allocated_size: true,
        }
    }
}

impl ScanOptions {
    /// Number of worker lanes this configuration resolves to, with a
    /// floor of one.
    pub fn effective_threads(&self) -> usize {
        if !self.use_parallel {
            return 1;
        }
        if self.max_threads > 0 {
            return self.max_threads;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

/// Scan `path` and return its size tree plus elapsed milliseconds.
///
/// Never fails: a nonexistent or unreadable root comes back as a
/// zero-size node, and every per-entry error during traversal degrades
/// to a zero-size leaf in place.
///
/// # Arguments
/// * `path` - Root to scan; file, directory, or symlink
/// * `options` - Scan configuration
pub fn scan(path: &Path, options: ScanOptions) -> ScanResult {
    let started = Instant::now();

    let ctx = Arc::new(ScanContext::new(path, options));
    log::info!(
        "scanning {} (fs type {:?}, {} lanes)",
        path.display(),
        ctx.fs_type(),
        ctx.scheduler().lanes()
    );

    let root = scan_root(&ctx, path);
    let result = ScanResult {
        root,
        elapsed_ms: started.elapsed().as_millis() as u64,
    };

    log::info!(
        "scan of {} finished: {} bytes in {} ms",
        path.display(),
        result.root.size,
        result.elapsed_ms
    );
    result
}

/// Dispatch on the root's kind: symlinks and files become single
/// leaves, directories enter the walker at depth zero.
fn scan_root(ctx: &Arc<ScanContext>, path: &Path) -> SizeNode {
    // classify before canonicalizing so a symlink root keeps its own size
    if probe::is_symlink(path) {
        return walker::file_leaf(ctx, path);
    }

    let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let info = probe::info(&path, ctx.options().use_allocated_size);
    if info.is_dir {
        return walker::walk_directory(ctx, &path, 0)
            .unwrap_or_else(|| SizeNode::directory(path.clone()));
    }

    // regular files, special files, and missing paths all reduce to a
    // leaf; a failed probe leaves it at zero bytes
    walker::file_leaf(ctx, &path)
}
