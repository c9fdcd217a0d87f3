use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Tool configuration, loaded from `nextver.toml` and `NEXTVER_`-prefixed
/// environment variables. Command-line flags take precedence over both.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Revision the working tree is compared against
    pub base: String,

    /// Source-file extension retained from version-control listings
    pub extension: String,
}

impl Default for Config {
    fn default() -> Self {
        Self { base: "HEAD".to_string(), extension: "go".to_string() }
    }
}

pub fn load_config() -> Result<Config> {
    let mut builder = config::Config::builder();

    // First config file found wins
    let config_paths = ["nextver.toml", ".nextver.toml"];
    for path in &config_paths {
        if Path::new(path).exists() {
            builder = builder.add_source(config::File::with_name(path));
            break;
        }
    }

    builder = builder.add_source(config::Environment::with_prefix("NEXTVER"));

    let cfg = builder.build().context("Failed to load configuration")?;
    let parsed: Config = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}
