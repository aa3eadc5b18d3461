//! Loading game configuration from TOML files.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use flappy_core::GameConfig;

/// Reads the configuration at `path`, or the defaults when no path is given.
///
/// Fields missing from the file keep their default values. The result is
/// validated before it is returned.
pub(crate) fn load_config(path: Option<&Path>, seed: Option<u64>) -> Result<GameConfig> {
    let mut config = match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            parse_config(&contents)
                .with_context(|| format!("failed to parse config file {}", path.display()))?
        }
        None => GameConfig::default(),
    };

    if let Some(seed) = seed {
        config.seed = seed;
    }
    config.validate().context("invalid game configuration")?;
    Ok(config)
}

fn parse_config(contents: &str) -> Result<GameConfig> {
    Ok(toml::from_str(contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flappy_core::{ConfigError, SpawnRange};

    #[test]
    fn missing_path_yields_defaults_with_seed_override() {
        let config = load_config(None, Some(7)).expect("defaults are valid");
        assert_eq!(
            config,
            GameConfig {
                seed: 7,
                ..GameConfig::default()
            }
        );
    }

    #[test]
    fn file_values_override_defaults() {
        let path =
            std::env::temp_dir().join(format!("flappy-config-{}.toml", std::process::id()));
        fs::write(
            &path,
            "pipes_to_render = 4\nhorizontal_range = { min = 300, max = 350 }\n",
        )
        .expect("write config");

        let config = load_config(Some(&path), None).expect("config loads");
        let _ = fs::remove_file(&path);

        assert_eq!(config.pipes_to_render, 4);
        assert_eq!(config.horizontal_range, SpawnRange::new(300, 350));
        assert_eq!(config.screen_height, 600.0);
    }

    #[test]
    fn invalid_values_are_rejected_after_parsing() {
        let error = parse_config("speed_up_every = 0\n")
            .expect("syntax is valid")
            .validate()
            .expect_err("zero cadence is rejected");
        assert_eq!(error, ConfigError::NonPositiveCadence);
    }

    #[test]
    fn missing_file_reports_its_path() {
        let error = load_config(Some(Path::new("/definitely/not/here.toml")), None)
            .expect_err("missing file is an error");
        assert!(format!("{error}").contains("/definitely/not/here.toml"));
    }
}
