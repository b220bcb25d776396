//! `config` commands.
//!
//! Settings live in `~/.packmixer/config.ini`. Path settings are checked
//! against the disk whenever they are shown or changed, so a mistyped
//! `paths.mix_dir` is reported here rather than by a scan that finds no packs.

use std::path::Path;

use clap::Subcommand;
use console::style;
use packmixer::config::{config_file_path, ConfigFile, ConfigKey};
use packmixer::logging::LOG_FILE_NAME;
use packmixer::pack::PackDiscovery;

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one setting, e.g. `paths.mix_dir`
    Get { key: String },

    /// Change one setting; an empty value clears `paths.log_dir`
    Set { key: String, value: String },

    /// Print every setting and what its paths resolve to
    List,

    /// Print the config file location
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => {
            let key = parse_key(&key)?;
            let config = ConfigFile::load()?;
            println!("{}", display_value(key, &config));
            Ok(())
        }
        ConfigCommands::Set { key, value } => run_set(&key, &value),
        ConfigCommands::List => run_list(),
        ConfigCommands::Path => {
            println!("{}", config_file_path().display());
            Ok(())
        }
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse::<ConfigKey>().map_err(|_| {
        let known: Vec<String> = ConfigKey::all().iter().map(ConfigKey::name).collect();
        CliError::Config(format!("unknown key '{}' (known: {})", key, known.join(", ")))
    })
}

fn run_set(key: &str, value: &str) -> Result<(), CliError> {
    let key = parse_key(key)?;
    let mut config = ConfigFile::load()?;
    key.set(&mut config, value)?;
    config.save()?;

    println!("{} = {}", key.name(), display_value(key, &config));
    if let Some(note) = path_note(key, &config) {
        print_note(&note);
    }
    Ok(())
}

fn run_list() -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    println!("{}", style(config_file_path().display()).bold());

    let width = ConfigKey::all()
        .iter()
        .map(|k| k.name().len())
        .max()
        .unwrap_or(0);

    for &key in ConfigKey::all() {
        println!("  {:<width$}  {}", key.name(), display_value(key, &config));
        if let Some(note) = path_note(key, &config) {
            print!("  {:<width$}  ", "");
            print_note(&note);
        }
    }
    Ok(())
}

fn display_value(key: ConfigKey, config: &ConfigFile) -> String {
    let value = key.get(config);
    if value.is_empty() {
        "(not set)".to_string()
    } else {
        value
    }
}

/// Remark on a path setting, derived from the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Note {
    Info(String),
    Warning(String),
}

fn print_note(note: &Note) {
    match note {
        Note::Info(text) => println!("{}", style(text).dim()),
        Note::Warning(text) => println!("{}", style(format!("warning: {}", text)).yellow()),
    }
}

/// Check what a path setting points at.
fn path_note(key: ConfigKey, config: &ConfigFile) -> Option<Note> {
    let paths = &config.paths;
    match key {
        ConfigKey::MixDir => Some(mix_dir_note(&paths.mix_dir)),
        ConfigKey::OutputDir => {
            if paths.output_dir.starts_with(&paths.mix_dir) {
                return Some(Note::Warning(
                    "output directory is inside the mix directory and would be indexed as a pack"
                        .to_string(),
                ));
            }
            if paths.output_dir.exists() && !paths.output_dir.is_dir() {
                return Some(Note::Warning("not a directory".to_string()));
            }
            if !paths.output_dir.exists() {
                return Some(Note::Info("created on first selection".to_string()));
            }
            None
        }
        ConfigKey::CacheFile => {
            let cache = config.cache_path();
            let state = if cache.is_file() { "present" } else { "not built yet" };
            Some(Note::Info(format!("{} ({})", cache.display(), state)))
        }
        ConfigKey::LogDir => paths
            .log_dir
            .as_ref()
            .map(|dir| Note::Info(format!("logs to {}", dir.join(LOG_FILE_NAME).display()))),
        ConfigKey::ScanParallel | ConfigKey::LoggingLevel => None,
    }
}

fn mix_dir_note(mix_dir: &Path) -> Note {
    if !mix_dir.exists() {
        return Note::Warning("directory does not exist, scans will find no packs".to_string());
    }
    if !mix_dir.is_dir() {
        return Note::Warning("not a directory".to_string());
    }
    match PackDiscovery::new(mix_dir).find_packs() {
        Ok(packs) if packs.is_empty() => Note::Warning("no packs found".to_string()),
        Ok(packs) => Note::Info(format!("{} packs", packs.len())),
        Err(e) => Note::Warning(e.to_string()),
    }
}
