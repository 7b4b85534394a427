//! User configuration management
//!
//! Configuration is stored in TOML format at `~/.packsmith/config.toml`.
//! Every field has a default, so a missing or partial file is fine.
//!
//! # Examples
//!
//! ```no_run
//! use packsmith::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = Config::load()?;
//!
//! println!("Registry URL: {}", config.registry.url);
//! println!("Workers: {}", config.resolver.max_workers);
//!
//! config.resolver.auto_add_dependencies = false;
//! config.save()?;
//! # Ok(())
//! # }
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// User configuration file (`~/.packsmith/config.toml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Registry settings
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Mod resolution settings
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Project file settings
    #[serde(default)]
    pub project: ProjectConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Registry type: "http" or "file"
    #[serde(default = "default_registry_type")]
    pub registry_type: String,

    /// Registry URL (for HTTP registry)
    #[serde(default = "default_registry_url")]
    pub url: String,

    /// Mirror directory (for file registry)
    #[serde(default = "default_registry_path")]
    pub path: String,

    /// Per-request timeout
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_registry_type() -> String {
    "http".to_string()
}

fn default_registry_url() -> String {
    "https://api.modrinth.com".to_string()
}

fn default_registry_path() -> String {
    "~/.packsmith/registry".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("packsmith/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            registry_type: default_registry_type(),
            url: default_registry_url(),
            path: default_registry_path(),
            timeout_seconds: default_timeout_seconds(),
            user_agent: default_user_agent(),
        }
    }
}

impl RegistryConfig {
    /// Mirror directory with `~` expanded
    pub fn mirror_path(&self) -> Result<PathBuf> {
        let expanded = shellexpand::full(&self.path).map_err(|e| {
            Error::Validation(format!("Invalid registry path '{}': {}", self.path, e))
        })?;
        Ok(PathBuf::from(expanded.as_ref()))
    }
}

/// Mod resolution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Upper bound on concurrent registry requests per batch (default: 16)
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Queue required dependencies without asking
    #[serde(default = "default_auto_add_dependencies")]
    pub auto_add_dependencies: bool,
}

fn default_max_workers() -> usize {
    16
}

fn default_auto_add_dependencies() -> bool {
    true
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            auto_add_dependencies: default_auto_add_dependencies(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// File used when no project file is given
    #[serde(default = "default_project_filename")]
    pub default_filename: String,
}

fn default_project_filename() -> String {
    crate::project::DEFAULT_PROJECT_FILE.to_string()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            default_filename: default_project_filename(),
        }
    }
}

impl Config {
    /// Get the default config file path
    ///
    /// Uses PACKSMITH_CONFIG_DIR if set, otherwise ~/.packsmith/config.toml
    pub fn default_path() -> Result<PathBuf> {
        // Check for custom config directory (useful for testing)
        if let Ok(config_dir) = std::env::var("PACKSMITH_CONFIG_DIR") {
            return Ok(PathBuf::from(config_dir).join("config.toml"));
        }

        let home = dirs::home_dir()
            .ok_or_else(|| Error::Other("Could not find home directory".to_string()))?;

        Ok(home.join(".packsmith").join("config.toml"))
    }

    /// Load config from file, or fall back to defaults if it doesn't exist
    ///
    /// Environment variable overrides:
    /// - `PACKSMITH_REGISTRY_URL`: Overrides `registry.url`
    /// - `PACKSMITH_CONFIG_DIR`: Overrides the config directory location
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;

        let mut config = if !path.exists() {
            Self::default()
        } else {
            let content = fs::read_to_string(&path)?;
            toml::from_str(&content)?
        };

        if let Ok(url) = std::env::var("PACKSMITH_REGISTRY_URL") {
            if !url.is_empty() {
                config.registry.url = url;
            }
        }

        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Set a value by dotted key, e.g. `resolver.max_workers`
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parse_bool = |v: &str| -> Result<bool> {
            match v {
                "true" | "yes" | "on" | "1" => Ok(true),
                "false" | "no" | "off" | "0" => Ok(false),
                _ => Err(Error::Validation(format!(
                    "'{}' is not a boolean (use true or false)",
                    v
                ))),
            }
        };
        let parse_number = |v: &str| -> Result<u64> {
            v.parse()
                .map_err(|_| Error::Validation(format!("'{}' is not a number", v)))
        };

        match key {
            "registry.registry_type" => match value {
                "http" | "file" => self.registry.registry_type = value.to_string(),
                _ => {
                    return Err(Error::Validation(format!(
                        "Unknown registry type '{}' (expected http or file)",
                        value
                    )))
                }
            },
            "registry.url" => self.registry.url = value.to_string(),
            "registry.path" => self.registry.path = value.to_string(),
            "registry.timeout_seconds" => self.registry.timeout_seconds = parse_number(value)?,
            "registry.user_agent" => self.registry.user_agent = value.to_string(),
            "resolver.max_workers" => {
                let workers = parse_number(value)? as usize;
                if workers == 0 {
                    return Err(Error::Validation(
                        "resolver.max_workers must be at least 1".to_string(),
                    ));
                }
                self.resolver.max_workers = workers;
            }
            "resolver.auto_add_dependencies" => {
                self.resolver.auto_add_dependencies = parse_bool(value)?
            }
            "project.default_filename" => {
                if value.trim().is_empty() {
                    return Err(Error::Validation(
                        "project.default_filename cannot be empty".to_string(),
                    ));
                }
                self.project.default_filename = value.to_string();
            }
            _ => {
                return Err(Error::Validation(format!(
                    "Unknown configuration key '{}'",
                    key
                )))
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.registry.registry_type, "http");
        assert_eq!(config.registry.url, "https://api.modrinth.com");
        assert_eq!(config.resolver.max_workers, 16);
        assert!(config.resolver.auto_add_dependencies);
        assert_eq!(config.project.default_filename, "modpack.json");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"[registry]
registry_type = "file"
path = "/srv/mirror"
"#,
        )
        .unwrap();

        assert_eq!(config.registry.registry_type, "file");
        assert_eq!(config.registry.timeout_seconds, 30);
        assert_eq!(config.resolver.max_workers, 16);
        assert_eq!(
            config.registry.mirror_path().unwrap(),
            PathBuf::from("/srv/mirror")
        );
    }

    #[test]
    fn test_set_values() {
        let mut config = Config::default();

        config.set("resolver.max_workers", "4").unwrap();
        config.set("resolver.auto_add_dependencies", "off").unwrap();
        config.set("registry.registry_type", "file").unwrap();

        assert_eq!(config.resolver.max_workers, 4);
        assert!(!config.resolver.auto_add_dependencies);
        assert_eq!(config.registry.registry_type, "file");
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = Config::default();

        assert!(config.set("resolver.max_workers", "0").is_err());
        assert!(config.set("resolver.max_workers", "many").is_err());
        assert!(config.set("registry.registry_type", "ftp").is_err());
        assert!(config.set("nope.key", "1").is_err());
        assert_eq!(config.resolver.max_workers, 16);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let mut config = Config::default();
        config.registry.timeout_seconds = 5;

        let content = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&content).unwrap();
        assert_eq!(parsed.registry.timeout_seconds, 5);
    }
}
