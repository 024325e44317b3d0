//! Rendering of scan results for the command line

use std::io::{self, Write};

use crate::format::{human_elapsed, human_size};
use crate::node::{ScanResult, SizeNode};

/// Configuration for result display
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether to use colors in output
    pub use_colors: bool,
    /// Deepest tree level to print (None = whole tree)
    pub max_depth: Option<usize>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            use_colors: atty::is(atty::Stream::Stdout),
            max_depth: None,
        }
    }
}

/// ANSI color codes
struct Colors {
    dir: &'static str,
    size: &'static str,
    dim: &'static str,
    reset: &'static str,
}

impl Colors {
    fn enabled() -> Self {
        Self {
            dir: "\x1b[1;34m",
            size: "\x1b[38;5;34m",
            dim: "\x1b[2m",
            reset: "\x1b[0m",
        }
    }

    fn disabled() -> Self {
        Self {
            dir: "",
            size: "",
            dim: "",
            reset: "",
        }
    }
}

/// Print the size tree with indentation, largest entries first.
pub fn print_tree(result: &ScanResult, config: &OutputConfig) {
    let colors = if config.use_colors {
        Colors::enabled()
    } else {
        Colors::disabled()
    };

    print_node(&result.root, 0, config, &colors);
    println!(
        "\n{}elapsed: {}{}",
        colors.dim,
        human_elapsed(result.elapsed_ms),
        colors.reset
    );
}

fn print_node(node: &SizeNode, level: usize, config: &OutputConfig, colors: &Colors) {
    let name = if level == 0 {
        node.path.display().to_string()
    } else {
        node.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| node.path.display().to_string())
    };
    let label = if node.is_dir {
        format!("{}{}{}", colors.dir, name, colors.reset)
    } else {
        name
    };

    println!(
        "{:indent$}{}{:>9}{}  {}",
        "",
        colors.size,
        human_size(node.size),
        colors.reset,
        label,
        indent = level * 2
    );

    if config.max_depth.map_or(true, |max| level < max) {
        for child in &node.children {
            print_node(child, level + 1, config, colors);
        }
    }
}

/// Print the result as pretty JSON on stdout.
pub fn print_json(result: &ScanResult) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, result)?;
    handle.write_all(b"\n")?;
    Ok(())
}
