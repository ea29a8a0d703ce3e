mod cli;
mod diff;

use anyhow::Result;
use cli::Cli;
use fsr_core::{DuplicateOptions, ReplacementMap, Substituter};
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    setup_logging(&cli)?;

    info!("Starting fsr");

    handle_duplicate(&cli)?;

    info!("fsr completed successfully");
    Ok(())
}

fn handle_duplicate(cli: &Cli) -> Result<()> {
    let destination = cli
        .destination
        .clone()
        .unwrap_or_else(|| fsr_core::default_destination(&cli.source));

    info!("Reference folder: {:?}", cli.source);
    info!("Replacement pairs file: {:?}", cli.pairs_file);
    info!("Destination: {:?}", destination);
    info!("Code mode: {}", cli.code_mode);
    info!("Interactive mode: {}", cli.interactive);

    let pairs_file = fsr_core::load_pairs_file(&cli.pairs_file)?;
    if !pairs_file.skipped.is_empty() {
        warn!(
            "{} line(s) of the replacement pairs file were skipped",
            pairs_file.skipped.len()
        );
    }
    if pairs_file.pairs.is_empty() {
        warn!("No replacement pairs found - the reference folder will be copied as is");
    }

    let map = ReplacementMap::build(pairs_file.pairs, cli.code_mode);
    if cli.code_mode {
        info!("Code mode is activated, replacement map enriched to {} pairs", map.len());
    }

    let substituter = Substituter::new(&map, cli.order.into());
    let options = DuplicateOptions {
        rewrite_names: !cli.skip_names,
        rewrite_contents: !cli.skip_contents,
        dry_run: cli.dry_run,
    };

    if !cli.dry_run && destination.exists() {
        warn!("Destination already exists, files with the same name will be overwritten: {:?}", destination);
    }

    let result = if cli.interactive {
        let content_callback = |file_path: &Path, old_content: &str, new_content: &str, description: &str| {
            diff::show_diff_and_confirm(file_path, old_content, new_content, description)
        };

        let name_callback = |source_path: &Path, new_path: &Path, kind: &str| {
            diff::show_rename_and_confirm(source_path, new_path, kind)
        };

        fsr_core::duplicate_tree_interactive(
            &cli.source,
            &destination,
            &substituter,
            &options,
            content_callback,
            name_callback,
        )?
    } else {
        fsr_core::duplicate_tree(&cli.source, &destination, &substituter, &options)?
    };

    if cli.dry_run {
        println!("\nDry run complete, nothing was written.");
    } else {
        println!("\nFolder structure duplicated successfully!");
        println!("Find your generated project at: {}", destination.display());
    }
    println!("  Directories created: {}", result.directories_created);
    println!("  Files written: {}", result.files_written);
    println!("  Names changed: {}", result.names_changed);
    println!("  Content changes: {}", result.content_changes);
    if result.entries_skipped > 0 {
        println!("  Entries skipped: {}", result.entries_skipped);
    }

    Ok(())
}

fn setup_logging(cli: &Cli) -> Result<()> {
    let filter = if cli.quiet {
        EnvFilter::new("error")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact()
        )
        .with(filter)
        .init();

    Ok(())
}
