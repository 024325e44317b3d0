//! The recursive walker: probe entries, fan subdirectories out to the
//! scheduler below the depth cap, and aggregate sizes bottom-up.
//!
//! Every failure is confined to the entry or subtree that hit it. A
//! directory that cannot be read stays in the tree as an empty node; a
//! lane that dies surfaces as a zero-size leaf at the join point.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use crate::boundary;
use crate::context::ScanContext;
use crate::node::SizeNode;
use crate::probe;

/// Build a leaf for a file or symlink. Symlinks carry the length of
/// their target string; a failed probe yields a zero-size leaf that
/// keeps the path visible.
pub fn file_leaf(ctx: &ScanContext, path: &Path) -> SizeNode {
    let info = probe::info(path, ctx.options().use_allocated_size);
    SizeNode::file(path.to_path_buf(), info.bytes)
}

/// Walk one directory and return its finalized node.
///
/// Returns `None` only when the subtree must vanish entirely: the path
/// aliases a top-level directory through a hard link, or it was already
/// visited during this scan. Boundary skips and unreadable directories
/// return an empty node instead, so the tree keeps their shape.
pub fn walk_directory(ctx: &Arc<ScanContext>, path: &Path, depth: usize) -> Option<SizeNode> {
    let mut node = SizeNode::directory(path.to_path_buf());

    if !probe::is_readable(path) {
        log::debug!("unreadable directory kept empty: {}", path.display());
        return Some(node);
    }
    if probe::is_symlink(path) {
        // a symlink at a directory spot is a leaf, not a container
        return Some(file_leaf(ctx, path));
    }
    if fs::symlink_metadata(path).is_err() {
        return Some(node);
    }
    if ctx.should_skip(path) {
        return Some(node);
    }
    if boundary::aliases_root_child(path) {
        log::debug!("suppressing root-child alias: {}", path.display());
        return None;
    }
    if !ctx.mark_visited(path) {
        log::debug!("dropping already-visited path: {}", path.display());
        return None;
    }

    if ctx.options().include_directory_self_size {
        node.size = probe::self_size(path);
    }

    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(err) => {
            log::debug!("cannot iterate {}: {}", path.display(), err);
            return Some(node);
        }
    };

    let batch_size = ctx.options().batch_size.max(1);
    let mut batch: Vec<PathBuf> = Vec::with_capacity(batch_size);
    let mut spawned: Vec<(PathBuf, Receiver<Option<SizeNode>>)> = Vec::new();

    for entry in entries {
        match entry {
            Ok(entry) => batch.push(entry.path()),
            Err(err) => {
                // keep what the iterator produced so far
                log::debug!("iteration aborted in {}: {}", path.display(), err);
                break;
            }
        }
        if batch.len() >= batch_size {
            drain_batch(ctx, depth, &mut batch, &mut node, &mut spawned);
        }
    }
    drain_batch(ctx, depth, &mut batch, &mut node, &mut spawned);

    for (child_path, rx) in spawned {
        match rx.recv() {
            Ok(Some(child)) => node.attach(child),
            Ok(None) => {}
            // the lane died before delivering; keep the path visible
            Err(_) => node.attach(SizeNode::file(child_path, 0)),
        }
    }

    node.finalize();
    if depth == 0 && ctx.options().root_only {
        node.children.clear();
    }
    Some(node)
}

/// Probe and classify one batch of directory entries, attaching leaves
/// directly and routing subdirectories through the fan-out rule.
fn drain_batch(
    ctx: &Arc<ScanContext>,
    depth: usize,
    batch: &mut Vec<PathBuf>,
    node: &mut SizeNode,
    spawned: &mut Vec<(PathBuf, Receiver<Option<SizeNode>>)>,
) {
    for child in batch.drain(..) {
        if probe::is_symlink(&child) {
            node.attach(file_leaf(ctx, &child));
            continue;
        }

        let info = probe::info(&child, ctx.options().use_allocated_size);
        if info.is_dir {
            if depth < ctx.options().depth_cap {
                let task_ctx = Arc::clone(ctx);
                let task_path = child.clone();
                if let Some(rx) = ctx
                    .scheduler()
                    .try_spawn(move || walk_directory(&task_ctx, &task_path, depth + 1))
                {
                    spawned.push((child, rx));
                    continue;
                }
            }
            if let Some(sub) = walk_directory(ctx, &child, depth + 1) {
                node.attach(sub);
            }
        } else if !probe::is_readable(&child) {
            node.attach(SizeNode::file(child, 0));
        } else {
            node.attach(SizeNode::file(child, info.bytes));
        }
    }
}
