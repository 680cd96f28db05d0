//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/kbgraph/kbgraph.toml`
//! 3. Local config: `<project_dir>/.kbgraph.toml`
//! 4. Environment variables: `KBGRAPH_*` prefix

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::services::LoaderOptions;
use crate::application::ApplicationError;
use crate::domain::BuildOptions;

pub const APP_NAME: &str = "kbgraph";
pub const LOCAL_CONFIG_FILE: &str = ".kbgraph.toml";

/// Raw settings for intermediate parsing (`None` → not specified, inherit from base).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub source: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub root_name: Option<String>,
    pub root_id: Option<String>,
    pub root_title: Option<String>,
    pub artifact_extension: Option<String>,
    pub markdown_extensions: Option<Vec<String>>,
}

/// Unified configuration for kbgraph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Markdown directory or YAML structure file
    pub source: PathBuf,
    /// Directory receiving generated pages
    pub output_dir: PathBuf,
    /// Stem of the top-level file that becomes the root node
    pub root_name: String,
    /// Id of the root node
    pub root_id: String,
    /// Root title when the source provides none
    pub root_title: String,
    /// Extension of generated documents
    pub artifact_extension: String,
    /// File extensions read as markdown
    pub markdown_extensions: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let loader = LoaderOptions::default();
        let build = BuildOptions::default();
        Self {
            source: PathBuf::from("."),
            output_dir: PathBuf::from("site"),
            root_name: loader.root_name,
            root_id: build.root_id,
            root_title: build.root_title,
            artifact_extension: build.artifact_extension,
            markdown_extensions: loader.markdown_extensions,
        }
    }
}

/// Expand `~`, `$VAR` and `${VAR}`; unknown variables leave the input untouched.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Get the XDG config directory for kbgraph.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join(format!("{}.toml", APP_NAME)))
}

/// Get the path to the local config file of a project directory.
pub fn project_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(LOCAL_CONFIG_FILE)
}

/// Merge arrays with union semantics and negation support.
///
/// ```ignore
/// merge_array(&["md"], &["txt"])         // → ["md", "txt"]
/// merge_array(&["md", "markdown"], &["!markdown"]) // → ["md"]
/// ```
pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
    let mut result: HashSet<String> = base.iter().cloned().collect();

    for pattern in overlay {
        if let Some(negated) = pattern.strip_prefix('!') {
            result.remove(negated);
        } else {
            result.insert(pattern.clone());
        }
    }

    // Sorted for deterministic output
    let mut vec: Vec<String> = result.into_iter().collect();
    vec.sort();
    vec
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
    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            root_name: self.root_name.clone(),
            markdown_extensions: self.markdown_extensions.clone(),
        }
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            root_id: self.root_id.clone(),
            root_title: self.root_title.clone(),
            artifact_extension: self.artifact_extension.clone(),
        }
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        self.source = PathBuf::from(expand_env_vars(&self.source.to_string_lossy()));
        self.output_dir = PathBuf::from(expand_env_vars(&self.output_dir.to_string_lossy()));
    }

    /// Overlay scalars; arrays union with `!` negation.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            markdown_extensions: overlay
                .markdown_extensions
                .as_ref()
                .map(|o| merge_array(&self.markdown_extensions, o))
                .unwrap_or_else(|| self.markdown_extensions.clone()),
            ..self.overlay_scalars(overlay)
        }
    }

    /// Overlay scalars; arrays replace the defaults entirely.
    fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            markdown_extensions: global
                .markdown_extensions
                .clone()
                .unwrap_or_else(|| self.markdown_extensions.clone()),
            ..self.overlay_scalars(global)
        }
    }

    fn overlay_scalars(&self, overlay: &RawSettings) -> Self {
        Self {
            source: overlay.source.clone().unwrap_or_else(|| self.source.clone()),
            output_dir: overlay
                .output_dir
                .clone()
                .unwrap_or_else(|| self.output_dir.clone()),
            root_name: overlay
                .root_name
                .clone()
                .unwrap_or_else(|| self.root_name.clone()),
            root_id: overlay.root_id.clone().unwrap_or_else(|| self.root_id.clone()),
            root_title: overlay
                .root_title
                .clone()
                .unwrap_or_else(|| self.root_title.clone()),
            artifact_extension: overlay
                .artifact_extension
                .clone()
                .unwrap_or_else(|| self.artifact_extension.clone()),
            markdown_extensions: self.markdown_extensions.clone(),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Array Merge Semantics
    /// - Defaults → Global: REPLACE
    /// - Global → Local: UNION with negation support
    /// - Any → Env vars: REPLACE
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_with_global(global_config_path().as_deref(), project_dir)
    }

    /// Like [`Settings::load`] with an explicit global config file.
    pub fn load_with_global(
        global_path: Option<&Path>,
        project_dir: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_path {
            if global_path.exists() {
                let raw = load_raw_settings(global_path)?;
                current = current.apply_global(&raw);
            }
        }

        if let Some(dir) = project_dir {
            let local_path = project_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply KBGRAPH_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("KBGRAPH")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("markdown_extensions"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("source") {
            settings.source = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("output_dir") {
            settings.output_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("root_name") {
            settings.root_name = val;
        }
        if let Ok(val) = config.get_string("root_id") {
            settings.root_id = val;
        }
        if let Ok(val) = config.get_string("root_title") {
            settings.root_title = val;
        }
        if let Ok(val) = config.get_string("artifact_extension") {
            settings.artifact_extension = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("markdown_extensions") {
            settings.markdown_extensions = val;
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
        r#"# kbgraph configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/kbgraph/kbgraph.toml
#   Local:  <project_dir>/.kbgraph.toml
#   Env:    KBGRAPH_* environment variables
#
# Local config UNIONS markdown_extensions with global; "!ext" removes one.

# Markdown directory or YAML structure file
# source = "notes"

# Where generated pages go
# output_dir = "site"

# Top-level file stem that becomes the root page
# root_name = "main"

# root_id = "index"
# root_title = "Home"
# artifact_extension = "html"
# markdown_extensions = ["md", "markdown"]
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
    fn given_defaults_when_deriving_options_then_match_builder_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.build_options(), BuildOptions::default());
        assert_eq!(settings.loader_options(), LoaderOptions::default());
    }

    #[test]
    fn given_tilde_in_paths_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            source: PathBuf::from("~/notes"),
            output_dir: PathBuf::from("$HOME/site"),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        assert!(settings.source.to_string_lossy().starts_with(&home));
        assert!(settings.output_dir.to_string_lossy().starts_with(&home));
    }

    #[test]
    fn test_merge_array_union_and_negation() {
        let base = vec!["md".to_string(), "markdown".to_string()];
        let overlay = vec!["!markdown".to_string(), "txt".to_string(), "md".to_string()];
        let result = merge_array(&base, &overlay);
        assert_eq!(result, vec!["md".to_string(), "txt".to_string()]);
    }

    #[test]
    fn test_merge_array_negation_nonexistent() {
        let base = vec!["md".to_string()];
        let result = merge_array(&base, &["!x".to_string()]);
        assert_eq!(result, vec!["md".to_string()]);
    }

    #[test]
    fn test_apply_global_replaces_arrays() {
        let global = RawSettings {
            root_title: Some("Knowledge".into()),
            markdown_extensions: Some(vec!["txt".into()]),
            ..RawSettings::default()
        };
        let result = Settings::default().apply_global(&global);
        assert_eq!(result.root_title, "Knowledge");
        assert_eq!(result.markdown_extensions, vec!["txt".to_string()]);
        assert_eq!(result.root_id, "index");
    }

    #[test]
    fn test_merge_with_unions_arrays() {
        let local = RawSettings {
            markdown_extensions: Some(vec!["txt".into()]),
            ..RawSettings::default()
        };
        let result = Settings::default().merge_with(&local);
        assert_eq!(
            result.markdown_extensions,
            vec!["markdown".to_string(), "md".to_string(), "txt".to_string()]
        );
    }
}
