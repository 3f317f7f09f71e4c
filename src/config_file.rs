use crate::cli::Args;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Settings that can be stored in a JSON config file
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    pub waifu2x_bin: Option<String>,
    pub noise_level: Option<i32>,
    pub force: Option<bool>,
    pub waifu2x: Option<bool>,
    pub verbose: Option<bool>,
    pub json_progress: Option<bool>,
}

impl Args {
    /// Load configuration from a JSON file and merge with command-line arguments
    /// Command-line arguments take precedence over config file values
    pub fn load_and_merge_config(&mut self) -> Result<()> {
        if let Some(config_path) = self.config_file.clone() {
            let contents = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

            let config: ConfigFile = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

            self.merge_from_config(config);

            if self.verbose && !self.json_progress {
                eprintln!("Loaded configuration from: {:?}", config_path);
            }
        }
        Ok(())
    }

    fn merge_from_config(&mut self, config: ConfigFile) {
        if self.waifu2x_bin.is_none() {
            self.waifu2x_bin = config.waifu2x_bin.map(PathBuf::from);
        }

        if self.noise_level.is_none() {
            self.noise_level = config.noise_level;
        }

        // Boolean flags - only apply if currently false (default)
        if !self.force {
            self.force = config.force.unwrap_or(false);
        }

        if !self.waifu2x {
            self.waifu2x = config.waifu2x.unwrap_or(false);
        }

        if !self.verbose {
            self.verbose = config.verbose.unwrap_or(false);
        }

        if !self.json_progress {
            self.json_progress = config.json_progress.unwrap_or(false);
        }
    }
}
