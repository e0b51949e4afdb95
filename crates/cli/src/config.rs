//! CLI configuration utilities

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_API_URL: &str = "https://api.orvio.app";

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Base URL of the platform API
    pub api_base_url: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
        }
    }
}

/// Load the CLI configuration
///
/// `ORVIO_API_URL` overrides the configured base URL; absent a config file,
/// defaults apply.
pub fn load_config(data_dir: &Path) -> Result<CliConfig> {
    let mut config = {
        let path = data_dir.join("config.json");
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            CliConfig::default()
        }
    };

    if let Ok(url) = std::env::var("ORVIO_API_URL") {
        config.api_base_url = url;
    }

    Ok(config)
}

/// Save CLI configuration to JSON file
pub fn save_config<P: AsRef<Path>>(config: &CliConfig, path: P) -> Result<()> {
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Generate a default configuration file
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let config = CliConfig::default();
    save_config(&config, path)
}
