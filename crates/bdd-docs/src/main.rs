//! Command line front end for bdd-docs.
//!
//! Builds the documentation tree for a feature directory and writes it as
//! JSON to stdout for a rendering layer. Logs go to stderr.

use std::io::{self, Write};
use std::path::PathBuf;

use bdd_docs::config::{DocsConfig, LogLevel};
use bdd_docs::error::ConfigError;
use bdd_docs::logging::init_logging;
use bdd_docs::processor::{DocumentationSite, process};
use clap::Parser;
use eyre::{Context, Result};
use tracing::info;

/// Build a tag-indexed documentation tree from a directory of feature files.
#[derive(Parser, Debug)]
#[command(name = "bdd-docs", version, about)]
struct Args {
    /// Directory containing `.feature` files.
    features: PathBuf,

    /// Output root mirrored by the tree's write paths.
    #[arg(long, short, default_value = "docs")]
    output: PathBuf,

    /// Rust file or directory holding step definitions (repeatable).
    #[arg(long = "steps", value_name = "PATH")]
    steps: Vec<PathBuf>,

    /// Append `Implemented` / `Not Implemented` tags to steps and scenarios.
    #[arg(long)]
    add_implemented_tags: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<LogLevel>,

    /// Emit compact rather than pretty-printed JSON.
    #[arg(long)]
    compact: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = build_config(&args).wrap_err("invalid configuration")?;
    init_logging(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        features = %args.features.display(),
        "starting bdd-docs"
    );

    let site = process(&args.features, &args.output, &config).wrap_err_with(|| {
        format!(
            "failed to build documentation for {}",
            args.features.display()
        )
    })?;
    write_site(&mut io::stdout().lock(), &site, args.compact)
}

fn build_config(args: &Args) -> Result<DocsConfig, ConfigError> {
    let implemented_tags = args.add_implemented_tags.then_some(true);
    Ok(DocsConfig::from_env()?.apply_overrides(
        args.log_level,
        implemented_tags,
        args.steps.clone(),
    ))
}

fn write_site(writer: &mut impl Write, site: &DocumentationSite, compact: bool) -> Result<()> {
    let json = site.to_json(!compact)?;
    writeln!(writer, "{json}").wrap_err("failed to write output")
}
