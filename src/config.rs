//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/mindmap/mindmap.toml`
//! 3. Local config: `<dir>/.mindmap.toml`
//! 4. Environment variables: `MINDMAP_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::surgery::PROXIMITY_THRESHOLD;
use crate::application::ApplicationError;
use crate::domain::mindmap::{DEFAULT_ROOT_CONTENT, DEFAULT_TITLE};
use crate::util::path::expand_env_vars;

pub const DEFAULT_SPAWN_CONTENT: &str = "New Node";

const ENV_PREFIX: &str = "MINDMAP";
const CONFIG_FILE: &str = "mindmap.toml";
const LOCAL_CONFIG_FILE: &str = ".mindmap.toml";

/// Raw settings for intermediate parsing; `None` means "not specified".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub data_dir: Option<PathBuf>,
    pub default_title: Option<String>,
    pub root_content: Option<String>,
    pub spawn_content: Option<String>,
    pub proximity_threshold: Option<f64>,
}

/// Unified configuration for mindmap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Storage root; maps live in `data_dir/maps` (default: ~/.mindmap)
    pub data_dir: PathBuf,
    /// Title given to new maps when none is supplied
    pub default_title: String,
    /// Content of the root node of a new map
    pub root_content: String,
    /// Content of nodes spawned from a handle
    pub spawn_content: String,
    /// Auto-connect reach while dragging, in canvas units
    pub proximity_threshold: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            default_title: DEFAULT_TITLE.to_string(),
            root_content: DEFAULT_ROOT_CONTENT.to_string(),
            spawn_content: DEFAULT_SPAWN_CONTENT.to_string(),
            proximity_threshold: PROXIMITY_THRESHOLD,
        }
    }
}

/// Get the default data directory (~/.mindmap).
fn default_data_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".mindmap"))
        .unwrap_or_else(|| PathBuf::from("~/.mindmap"))
}

/// Get the XDG config directory for mindmap.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "mindmap").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// Get the path to the local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(LOCAL_CONFIG_FILE)
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Directory holding one JSON file per map.
    pub fn maps_dir(&self) -> PathBuf {
        self.data_dir.join("maps")
    }

    /// Replace `data_dir`, expanding it like a configured value.
    pub fn override_data_dir(&mut self, dir: &Path) {
        self.data_dir = dir.to_path_buf();
        self.expand_paths();
    }

    /// Expand `~`, `$VAR` and `${VAR}` in `data_dir`.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.data_dir.to_string_lossy().as_ref());
        self.data_dir = PathBuf::from(expanded);
    }

    /// Overlay wins wherever it specifies a value.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            data_dir: overlay
                .data_dir
                .clone()
                .unwrap_or_else(|| self.data_dir.clone()),
            default_title: overlay
                .default_title
                .clone()
                .unwrap_or_else(|| self.default_title.clone()),
            root_content: overlay
                .root_content
                .clone()
                .unwrap_or_else(|| self.root_content.clone()),
            spawn_content: overlay
                .spawn_content
                .clone()
                .unwrap_or_else(|| self.spawn_content.clone()),
            proximity_threshold: overlay
                .proximity_threshold
                .unwrap_or(self.proximity_threshold),
        }
    }

    /// Reject values no operation can work with.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if !self.proximity_threshold.is_finite() || self.proximity_threshold <= 0.0 {
            return Err(ApplicationError::Config {
                message: format!(
                    "proximity_threshold must be a positive number, got {}",
                    self.proximity_threshold
                ),
            });
        }
        for (name, value) in [
            ("default_title", &self.default_title),
            ("root_content", &self.root_content),
            ("spawn_content", &self.spawn_content),
        ] {
            if value.trim().is_empty() {
                return Err(ApplicationError::Config {
                    message: format!("{name} must not be empty"),
                });
            }
        }
        Ok(())
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory searched for `.mindmap.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        current.validate()?;
        Ok(current)
    }

    /// Apply MINDMAP_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .list_separator(","),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("data_dir") {
            settings.data_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("default_title") {
            settings.default_title = val;
        }
        if let Ok(val) = config.get_string("root_content") {
            settings.root_content = val;
        }
        if let Ok(val) = config.get_string("spawn_content") {
            settings.spawn_content = val;
        }
        match config.get::<f64>("proximity_threshold") {
            Ok(val) => settings.proximity_threshold = val,
            Err(ConfigError::NotFound(_)) => {}
            Err(e) => return Err(config_err(e)),
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# mindmap configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/mindmap/mindmap.toml
#   Local:  ./.mindmap.toml
#   Env:    MINDMAP_* environment variables (e.g. MINDMAP_DATA_DIR)

# Storage root; maps are stored as data_dir/maps/<id>.json
# data_dir = "~/.mindmap"

# Title of new maps
# default_title = "Untitled Mind Map"

# Content of the root node of a new map
# root_content = "Central Topic"

# Content of nodes spawned from a handle
# spawn_content = "New Node"

# Auto-connect reach while dragging a node
# proximity_threshold = 400.0
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_then_valid_and_under_home() {
        let settings = Settings::default();
        assert!(settings.data_dir.to_string_lossy().contains(".mindmap"));
        assert_eq!(settings.proximity_threshold, 400.0);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn given_tilde_in_data_dir_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            data_dir: PathBuf::from("~/.mindmap"),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let dir = settings.data_dir.to_string_lossy();
        assert!(dir.starts_with(&home), "data_dir should start with home: {}", dir);
        assert!(!dir.contains('~'));
    }

    #[test]
    fn given_tilde_override_when_overriding_data_dir_then_expands_to_home() {
        let mut settings = Settings::default();

        settings.override_data_dir(Path::new("~/maps"));

        let home = std::env::var("HOME").expect("HOME should be set");
        assert_eq!(settings.data_dir, Path::new(&home).join("maps"));
    }

    #[test]
    fn given_partial_overlay_when_merging_then_only_given_fields_change() {
        let base = Settings::default();
        let overlay = RawSettings {
            default_title: Some("Notes".into()),
            proximity_threshold: Some(250.0),
            ..Default::default()
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.default_title, "Notes");
        assert_eq!(merged.proximity_threshold, 250.0);
        assert_eq!(merged.root_content, base.root_content);
        assert_eq!(merged.data_dir, base.data_dir);
    }

    #[test]
    fn given_non_positive_threshold_when_validating_then_config_error() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let settings = Settings {
                proximity_threshold: bad,
                ..Settings::default()
            };
            assert!(matches!(
                settings.validate(),
                Err(ApplicationError::Config { .. })
            ));
        }
    }

    #[test]
    fn given_template_when_parsed_then_yields_empty_overlay() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("template parses");
        assert!(raw.data_dir.is_none());
        assert!(raw.proximity_threshold.is_none());
    }

    #[test]
    fn given_settings_when_rendered_to_toml_then_round_trips() {
        let settings = Settings::default();
        let toml = settings.to_toml().expect("serialize");
        let back: Settings = toml::from_str(&toml).expect("parse");
        assert_eq!(back, settings);
    }
}
