//! Common types and utilities shared across CLI commands.

use std::path::PathBuf;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use packmixer::config::ConfigFile;
use packmixer::{IndexWarning, Mixer, MixerConfig};
use tracing::debug;

use crate::error::CliError;

/// Directory overrides given on the command line.
#[derive(Debug, Clone, Default)]
pub struct PathOverrides {
    pub mix_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

/// Resolve mixer settings: CLI flags take precedence over the config file.
pub fn resolve_mixer_config(
    overrides: &PathOverrides,
    config: &ConfigFile,
) -> MixerConfig {
    let mut mixer_config = MixerConfig::from_config_file(config);

    if let Some(ref mix_dir) = overrides.mix_dir {
        mixer_config.mix_dir = mix_dir.clone();
        mixer_config.cache_path = mix_dir.join(&config.paths.cache_file);
    }
    if let Some(ref output_dir) = overrides.output_dir {
        mixer_config.output_dir = output_dir.clone();
    }

    mixer_config
}

/// Load the config file and open a mixer session.
pub fn open_mixer(overrides: &PathOverrides) -> Result<Mixer, CliError> {
    let config = ConfigFile::load()?;
    let mixer_config = resolve_mixer_config(overrides, &config);
    debug!(
        mix_dir = %mixer_config.mix_dir.display(),
        output_dir = %mixer_config.output_dir.display(),
        "Resolved mixer directories"
    );
    Ok(Mixer::open(mixer_config)?)
}

/// Spinner for indeterminate work.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {wide_msg}") {
        pb.set_style(style.tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Print non-fatal warnings collected while loading the index.
pub fn print_warnings(warnings: &[IndexWarning]) {
    if warnings.is_empty() {
        return;
    }

    println!();
    println!("{} {}", style("Warnings:").yellow().bold(), warnings.len());
    for warning in warnings {
        println!("  - {}", warning);
    }
}

/// Format a byte count for display.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_take_precedence() {
        let mut config = ConfigFile::default();
        config.paths.mix_dir = PathBuf::from("/cfg/mix");
        config.paths.output_dir = PathBuf::from("/cfg/out");
        config.paths.cache_file = "idx.bin".to_string();

        let overrides = PathOverrides {
            mix_dir: Some(PathBuf::from("/cli/mix")),
            output_dir: None,
        };
        let resolved = resolve_mixer_config(&overrides, &config);

        assert_eq!(resolved.mix_dir, PathBuf::from("/cli/mix"));
        assert_eq!(resolved.cache_path, PathBuf::from("/cli/mix/idx.bin"));
        assert_eq!(resolved.output_dir, PathBuf::from("/cfg/out"));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(12), "12 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
