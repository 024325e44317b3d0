//! duscan - parallel on-disk size scanner
//!
//! Command-line front-end over the scanning core.

use anyhow::Result;
use clap::Parser;
use duscan::{output, scan, ScanOptions};
use std::fs;
use std::path::PathBuf;
use std::process;

/// Compute the on-disk size of a file or directory tree
#[derive(Parser, Debug)]
#[command(name = "duscan")]
#[command(version)]
#[command(about = "Compute on-disk sizes with a parallel walker", long_about = None)]
struct Args {
    /// Path to scan (default: current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Print only the elapsed milliseconds
    #[arg(long = "time-only")]
    time_only: bool,

    /// Scan with a single worker lane
    #[arg(long = "sequential")]
    sequential: bool,

    /// Number of worker lanes (default: hardware parallelism)
    #[arg(short = 'j', long = "threads")]
    threads: Option<usize>,

    /// Aggregate as usual but print the root without children
    #[arg(long = "root-only")]
    root_only: bool,

    /// Count logical file sizes instead of allocated blocks
    #[arg(long = "logical-size")]
    logical_size: bool,

    /// Add each directory's own entry size to its total
    #[arg(long = "include-self-size")]
    include_self_size: bool,

    /// Deepest tree level to display (default: whole tree)
    #[arg(short = 'd', long = "depth")]
    depth: Option<usize>,

    /// Output format: human (default), json
    #[arg(short = 'f', long = "format", default_value = "human")]
    format: OutputFormat,

    /// Disable colored output
    #[arg(long = "no-color")]
    no_color: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Enable debug logging
    #[arg(long = "debug")]
    debug: bool,
}

#[derive(Debug, Clone, clap::ValueEnum)]
enum OutputFormat {
    Human,
    Json,
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code = match err.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = err.print();
            process::exit(code);
        }
    };

    let exit_code = match run(args) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };

    process::exit(exit_code);
}

fn run(args: Args) -> Result<()> {
    init_logging(&args);

    log::debug!("starting duscan with args: {:?}", args);

    // the core never fails, so validate the path here for the exit code
    if fs::symlink_metadata(&args.path).is_err() {
        anyhow::bail!("cannot access path: {}", args.path.display());
    }

    let options = ScanOptions {
        use_parallel: !args.sequential,
        max_threads: args.threads.unwrap_or(0),
        root_only: args.root_only,
        include_directory_self_size: args.include_self_size,
        use_allocated_size: !args.logical_size,
        ..ScanOptions::default()
    };

    let result = scan(&args.path, options);

    if args.time_only {
        println!("{}", result.elapsed_ms);
        return Ok(());
    }

    match args.format {
        OutputFormat::Human => {
            let config = output::OutputConfig {
                use_colors: !args.no_color && atty::is(atty::Stream::Stdout),
                max_depth: args.depth,
            };
            output::print_tree(&result, &config);
        }
        OutputFormat::Json => {
            output::print_json(&result)?;
        }
    }

    Ok(())
}

fn init_logging(args: &Args) {
    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .format_module_path(false)
        .init();
}
