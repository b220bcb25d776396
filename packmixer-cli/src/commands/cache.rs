//! Index cache management CLI commands.

use chrono::{DateTime, Local};
use clap::Subcommand;

use super::common::{format_size, open_mixer, PathOverrides};
use crate::error::CliError;

/// Cache action subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Show index cache status
    Status,
    /// Delete the index cache; the next scan rebuilds it
    Clear,
}

/// Run a cache subcommand.
pub fn run(overrides: &PathOverrides, action: CacheAction) -> Result<(), CliError> {
    match action {
        CacheAction::Status => run_status(overrides),
        CacheAction::Clear => run_clear(overrides),
    }
}

fn run_status(overrides: &PathOverrides) -> Result<(), CliError> {
    let mixer = open_mixer(overrides)?;
    let cache = mixer.cache();
    println!("Texture index cache: {}", cache.path().display());

    if !cache.exists() {
        println!("  Status: Not found");
        println!();
        println!("Run 'packmixer scan' to build the cache.");
        return Ok(());
    }

    let file_size = std::fs::metadata(cache.path())
        .map(|m| m.len())
        .unwrap_or(0);

    match cache.read() {
        Ok(cached) => {
            let created = format_timestamp(cached.created_at_secs);
            println!("  Status: Valid");
            println!("  Version: {}", cached.version);
            println!("  Created: {} ({})", created, cached.age_human());
            println!("  Packs: {}", cached.index.pack_count());
            for name in cached.index.pack_names() {
                println!("    - {}", name);
            }
            println!("  Textures: {}", cached.index.path_count());
            println!("  Conflicts: {}", cached.index.conflict_count());
            println!("  File size: {}", format_size(file_size));
        }
        Err(e) => {
            println!("  Status: Invalid");
            println!("  Error: {}", e);
            println!();
            println!("Run 'packmixer rescan' to rebuild the cache.");
        }
    }

    Ok(())
}

fn run_clear(overrides: &PathOverrides) -> Result<(), CliError> {
    let mixer = open_mixer(overrides)?;
    let path = mixer.cache().path().to_path_buf();

    if mixer.cache().invalidate()? {
        println!("Deleted texture index cache: {}", path.display());
    } else {
        println!("No texture index cache found at: {}", path.display());
    }
    Ok(())
}

/// Render a Unix timestamp in local time.
fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|s| DateTime::from_timestamp(s, 0))
        .map(|utc| {
            utc.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| "unknown".to_string())
}
