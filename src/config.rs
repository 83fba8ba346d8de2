use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::document::Target;
use crate::domain::Granularity;
use crate::error::{BumpError, Result};

/// Represents the complete configuration for version-bump.
///
/// Describes the tracked application, the files and keys holding its
/// version, list items to prune, and how the change-request body is built.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,

    #[serde(default)]
    pub targets: Vec<Target>,

    #[serde(default)]
    pub prune: Vec<PruneRule>,

    #[serde(default)]
    pub body: BodyConfig,

    #[serde(default)]
    pub behavior: BehaviorConfig,
}

fn default_app_name() -> String {
    "app".to_string()
}

fn default_max_releases() -> usize {
    10
}

fn default_size_limit() -> usize {
    65536
}

fn default_title() -> String {
    "Bump {app} from {old} to {new}".to_string()
}

/// The tracked upstream application and how its releases are selected
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Overrides the version read from the first target
    #[serde(default)]
    pub current_version: Option<String>,

    #[serde(default = "default_max_releases")]
    pub max_releases: usize,

    #[serde(default)]
    pub allow_prerelease: bool,

    /// Sort the release list instead of trusting its newest-first order
    #[serde(default)]
    pub sort_releases: bool,

    #[serde(default)]
    pub lag: Option<LagConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            name: default_app_name(),
            current_version: None,
            max_releases: default_max_releases(),
            allow_prerelease: false,
            sort_releases: false,
            lag: None,
        }
    }
}

/// Stay `count` version groups behind the newest one
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct LagConfig {
    pub count: usize,

    #[serde(default)]
    pub granularity: Granularity,
}

/// A list item to delete when present
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PruneRule {
    pub file: PathBuf,
    pub field: String,
    pub value: String,
}

/// Change-request body settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BodyConfig {
    /// Maximum body length in characters
    #[serde(default = "default_size_limit")]
    pub size_limit: usize,

    /// Title template with `{app}`, `{old}` and `{new}` placeholders
    #[serde(default = "default_title")]
    pub title: String,
}

impl BodyConfig {
    pub fn render_title(&self, app: &str, old: &str, new: &str) -> String {
        self.title
            .replace("{app}", app)
            .replace("{old}", old)
            .replace("{new}", new)
    }
}

impl Default for BodyConfig {
    fn default() -> Self {
        BodyConfig {
            size_limit: default_size_limit(),
            title: default_title(),
        }
    }
}

/// Runtime behavior that does not change what gets planned
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct BehaviorConfig {
    #[serde(default)]
    pub dry_run: bool,
}

impl Config {
    /// Reject configurations that cannot produce a meaningful run
    pub fn validate(&self) -> Result<()> {
        if self.app.max_releases == 0 {
            return Err(BumpError::config("app.max_releases must be at least 1"));
        }
        if self.body.size_limit == 0 {
            return Err(BumpError::config("body.size_limit must be at least 1"));
        }
        if self.targets.is_empty() && self.app.current_version.is_none() {
            return Err(BumpError::config(
                "no [[targets]] configured and no app.current_version set",
            ));
        }
        if let Some(target) = self.targets.iter().find(|t| t.path.trim().is_empty()) {
            return Err(BumpError::config(format!(
                "target in '{}' has an empty path",
                target.file.display()
            )));
        }
        Ok(())
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `versionbump.toml` in current directory
/// 3. `.versionbump.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If an explicit file is missing, or a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        let path = Path::new(path);
        if !path.exists() {
            return Err(BumpError::FileNotFound(path.to_path_buf()));
        }
        fs::read_to_string(path)?
    } else if Path::new("./versionbump.toml").exists() {
        fs::read_to_string("./versionbump.toml")?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(".versionbump.toml");
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config = toml::from_str(&config_str)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{BlockScope, ValueMode};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.app.name, "app");
        assert_eq!(config.app.max_releases, 10);
        assert!(!config.app.allow_prerelease);
        assert_eq!(config.body.size_limit, 65536);
        assert!(config.targets.is_empty());
        assert!(!config.behavior.dry_run);
    }

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
[app]
name = "busybox"
current_version = "1.35"
max_releases = 5
allow_prerelease = true
lag = { count = 1, granularity = "patch" }

[[targets]]
file = "deploy/values.yaml"
path = "image.tag"

[[targets]]
file = "apps.yaml"
path = "image"
mode = "composite"
scope = { field = "name", value = "web" }

[[prune]]
file = "apps.yaml"
field = "repo"
value = "old/app"

[body]
size_limit = 1000
"#,
        )
        .unwrap();

        assert_eq!(config.app.name, "busybox");
        assert_eq!(config.app.current_version.as_deref(), Some("1.35"));
        assert_eq!(config.app.max_releases, 5);
        assert_eq!(
            config.app.lag,
            Some(LagConfig {
                count: 1,
                granularity: Granularity::Patch
            })
        );
        assert_eq!(config.targets.len(), 2);
        assert_eq!(config.targets[0].mode, ValueMode::Plain);
        assert_eq!(config.targets[1].mode, ValueMode::Composite);
        assert_eq!(config.targets[1].scope, Some(BlockScope::new("name", "web")));
        assert_eq!(config.prune[0].value, "old/app");
        assert_eq!(config.body.size_limit, 1000);
        assert_eq!(config.body.title, "Bump {app} from {old} to {new}");
    }

    #[test]
    fn test_lag_granularity_defaults_to_minor() {
        let config: Config = toml::from_str("[app]\nlag = { count = 2 }\n").unwrap();
        assert_eq!(config.app.lag.unwrap().granularity, Granularity::Minor);
    }

    #[test]
    fn test_invalid_mode_rejected() {
        let result: std::result::Result<Config, _> =
            toml::from_str("[[targets]]\nfile = \"a\"\npath = \"b\"\nmode = \"regex\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_render_title() {
        let body = BodyConfig::default();
        assert_eq!(body.render_title("busybox", "1.35", "1.36"), "Bump busybox from 1.35 to 1.36");
    }

    #[test]
    fn test_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_err());

        config.targets.push(Target::new("values.yaml", "image.tag"));
        assert!(config.validate().is_ok());

        config.app.max_releases = 0;
        assert!(matches!(config.validate(), Err(BumpError::Config(_))));
    }
}
