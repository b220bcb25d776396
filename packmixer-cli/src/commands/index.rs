//! Index commands: `scan` and `rescan`.
//!
//! Both run the build on a background task with a spinner; Ctrl+C cancels
//! the build and leaves the cache untouched.

use std::time::Instant;

use packmixer::{BuildMode, IndexLoad, IndexSource};
use tokio_util::sync::CancellationToken;

use super::common::{open_mixer, print_warnings, spinner, PathOverrides};
use crate::error::CliError;

/// Load the index, scanning only if no cache exists.
pub fn run_scan(overrides: &PathOverrides) -> Result<(), CliError> {
    run_build(overrides, BuildMode::LoadOrBuild)
}

/// Discard the cache and rescan every pack.
pub fn run_rescan(overrides: &PathOverrides) -> Result<(), CliError> {
    run_build(overrides, BuildMode::Rebuild)
}

fn run_build(overrides: &PathOverrides, mode: BuildMode) -> Result<(), CliError> {
    let mixer = open_mixer(overrides)?;
    let config = mixer.config();

    println!("Mix directory:    {}", config.mix_dir.display());
    println!("Output directory: {}", config.output_dir.display());
    println!();

    let cancellation = CancellationToken::new();
    let handler_token = cancellation.clone();
    ctrlc::set_handler(move || {
        handler_token.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Config(format!("Failed to start runtime: {}", e)))?;

    let message = match mode {
        BuildMode::LoadOrBuild => "Loading texture index...",
        BuildMode::Rebuild => "Rescanning resource packs...",
    };
    let pb = spinner(message);
    let start = Instant::now();

    let result = runtime.block_on(async { mixer.spawn_build(mode, cancellation).wait().await });
    pb.finish_and_clear();

    let load = result?;
    print_summary(&load, start.elapsed().as_millis());
    Ok(())
}

fn print_summary(load: &IndexLoad, elapsed_ms: u128) {
    let index = &load.index;
    let source = match load.source {
        IndexSource::Cache => "cache",
        IndexSource::Scan => "scan",
    };

    println!("Texture index ready ({} in {} ms)", source, elapsed_ms);
    println!("  Packs:      {}", index.pack_count());
    for name in index.pack_names() {
        println!("    - {}", name);
    }
    println!("  Textures:   {}", index.path_count());
    println!("  Candidates: {}", index.candidate_count());
    println!("  Conflicts:  {}", index.conflict_count());

    print_warnings(&load.warnings);
}
