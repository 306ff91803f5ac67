//! JVFS packer
//!
//! Packs a directory tree into a JVFS read-only compressed package

use anyhow::Context;
use clap::Parser;
use jvfs_rs::{ArchiveLayout, CompressionLevel, EntryNaming, PackOptions};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "jvfs")]
#[command(about = "Pack a directory into a JVFS read-only compressed package")]
#[command(after_help = "Directory recursion is always enabled.\n\n\
Examples:\n  \
jvfs out.pkg filesystem 0 best\n  \
jvfs out.pkg filesystem 0 default\n  \
jvfs out.pkg filesystem 1 best      (compressed header)\n  \
jvfs out.pkg filesystem 1 default   (compressed header)")]
struct Args {
    /// Package file to create
    output: PathBuf,

    /// Directory to pack
    root: PathBuf,

    /// Compress the header (1) or keep it plain at the start (0) [default: 0]
    compress_headers: Option<String>,

    /// Compression level (best, default) [default: default]
    level: Option<String>,

    /// Load options from a TOML file; positional arguments take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write to a temporary file and rename it into place on success
    #[arg(long)]
    atomic: bool,

    /// Entry naming (relative, root-prefixed)
    #[arg(long, value_parser = parse_naming)]
    naming: Option<EntryNaming>,

    /// Write run statistics as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

/// Any flag starting with '1' selects the compressed header
fn parse_layout_flag(s: &str) -> ArchiveLayout {
    if s.starts_with('1') {
        ArchiveLayout::V1
    } else {
        ArchiveLayout::V0
    }
}

/// Only "best" selects maximum compression
fn parse_level(s: &str) -> CompressionLevel {
    s.parse().unwrap_or(CompressionLevel::Default)
}

fn parse_naming(s: &str) -> Result<EntryNaming, String> {
    match s.to_lowercase().as_str() {
        "relative" => Ok(EntryNaming::Relative),
        "root-prefixed" | "root_prefixed" | "prefixed" => Ok(EntryNaming::RootPrefixed),
        _ => Err(format!(
            "Invalid naming '{}'. Valid options: relative, root-prefixed",
            s
        )),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Usage problems print help and exit cleanly
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            err.print()?;
            return Ok(());
        }
    };

    let mut options = match &args.config {
        Some(path) => PackOptions::from_toml_file(path)
            .with_context(|| format!("Failed to load config {:?}", path))?,
        None => PackOptions::default(),
    };
    if let Some(flag) = &args.compress_headers {
        options.layout = parse_layout_flag(flag);
    }
    if let Some(level) = &args.level {
        options.level = parse_level(level);
    }
    if let Some(naming) = args.naming {
        options.naming = naming;
    }
    if args.atomic {
        options.atomic = true;
    }

    let report = jvfs_rs::pack(&args.root, &args.output, &options)
        .with_context(|| format!("Package construction failed for {:?}", args.output))?;

    info!(
        "Packed {} entries: {} -> {} bytes",
        report.entry_count, report.original_size, report.archive_size
    );

    if let Some(path) = &args.report {
        std::fs::write(path, report.to_json()?)
            .with_context(|| format!("Failed to write report {:?}", path))?;
        info!("Report written to {:?}", path);
    }

    Ok(())
}
