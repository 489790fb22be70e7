use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::utils::validate_and_normalize_url;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Inbound HTTP listener
    pub server: ServerConfig,

    /// Video platform being scraped
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the listener binds to
    pub address: String,

    /// Port the listener binds to
    pub port: u16,

    /// Path of the transcript route
    pub route: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Scheme and host of the platform, without trailing path
    pub base_url: String,

    /// Browser user agent; the platform serves different markup to other clients
    pub user_agent: String,

    pub accept_language: String,

    /// Accept header for the watch page
    pub accept: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 3000,
            route: "/api/transcript".to_string(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.youtube.com".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from an explicit file, the usual locations, or defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::existing_config_path(),
        };

        let config = match path {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path)
            .context("Failed to read config file")?;

        let config: Config = serde_yaml::from_str(&content)
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// First config file that exists: `./config.yaml`, then the user config directory
    fn existing_config_path() -> Option<PathBuf> {
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        Self::user_config_path().filter(|path| path.exists())
    }

    /// Where `config` writes when no explicit path is given
    pub fn default_path(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        Self::user_config_path().context("Could not determine config directory")
    }

    fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("youtube-transcript-service").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        validate_and_normalize_url(&self.upstream.base_url)
            .context("upstream.base_url is invalid")?;

        if !self.server.route.starts_with('/') {
            anyhow::bail!("server.route must start with '/'");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Listen Address: {}:{}", self.server.address, self.server.port);
        println!("  Route: POST {}", self.server.route);
        println!("  Upstream: {}", self.upstream.base_url);
        println!("  User Agent: {}", self.upstream.user_agent);
        println!("  Accept-Language: {}", self.upstream.accept_language);
    }
}
