//! Packmixer CLI - pick one texture variant per path across resource packs.

mod commands;
mod error;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use packmixer::config::ConfigFile;
use packmixer::logging::{init_logging, LoggingConfig, LoggingGuard};

use commands::cache::CacheAction;
use commands::common::PathOverrides;
use commands::config::ConfigCommands;
use commands::list::ListArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "packmixer")]
#[command(version = packmixer::VERSION)]
#[command(about = "Mix textures from several resource packs into one", long_about = None)]
struct Cli {
    /// Directory containing one folder per resource pack
    #[arg(long, global = true)]
    mix_dir: Option<PathBuf>,

    /// Directory the mixed textures are written to
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the texture index, scanning packs if no cache exists
    Scan,

    /// Discard the index cache and rescan every pack
    Rescan,

    /// List textures with their candidate packs and current selection
    List {
        /// Only show textures with nothing in the output directory
        #[arg(long)]
        unselected: bool,

        /// Only show textures whose path contains this text
        #[arg(long)]
        search: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Select the variant of a texture from one pack
    Select {
        /// Texture path (or a unique fragment of it)
        rel_path: String,

        /// Pack to take the texture from; prompts if omitted
        pack: Option<String>,
    },

    /// Remove the selected variant of a texture
    Clear {
        /// Texture path (or a unique fragment of it)
        rel_path: String,
    },

    /// Manage the texture index cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let _guard = match setup_logging(cli.verbose) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    };

    let overrides = PathOverrides {
        mix_dir: cli.mix_dir,
        output_dir: cli.output_dir,
    };

    let result = match cli.command {
        Commands::Scan => commands::index::run_scan(&overrides),
        Commands::Rescan => commands::index::run_rescan(&overrides),
        Commands::List {
            unselected,
            search,
            json,
        } => commands::list::run(
            &overrides,
            ListArgs {
                unselected,
                search,
                json,
            },
        ),
        Commands::Select { rel_path, pack } => {
            commands::select::run_select(&overrides, &rel_path, pack)
        }
        Commands::Clear { rel_path } => commands::select::run_clear(&overrides, &rel_path),
        Commands::Cache { action } => commands::cache::run(&overrides, action),
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

/// Install logging from the config file, with `--verbose` forcing debug.
fn setup_logging(verbose: bool) -> Result<LoggingGuard, CliError> {
    // A broken config file is reported by the command itself
    let config = ConfigFile::load().unwrap_or_default();

    let level = if verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };

    let mut logging = LoggingConfig::new(level).with_ansi(console::colors_enabled_stderr());
    if let Some(dir) = config.paths.log_dir {
        logging = logging.with_log_dir(dir);
    }

    Ok(init_logging(&logging)?)
}
