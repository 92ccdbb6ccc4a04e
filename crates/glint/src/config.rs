//! `glint.toml` project configuration, in the style of the wider codebase's
//! own `Largo.toml` manifest parser.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Diagnostic behavior a compilation can be configured with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlintConfig {
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    /// Search path consulted for `module` directives. Linking external
    /// modules is out of scope for this core; the path is still accepted
    /// and threaded through so the ambient crate's configuration surface
    /// matches what a real build would eventually need.
    #[serde(default)]
    pub module_path: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    #[serde(default = "default_verbose")]
    pub verbose: bool,
    /// Promote `Warning`-level diagnostics to `Error` for the purpose of
    /// deciding whether the pipeline yields a `Script` (I8 still only
    /// checks true `Error`-level records; this widens what counts as one).
    #[serde(default)]
    pub warnings_as_errors: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        DiagnosticsConfig { verbose: default_verbose(), warnings_as_errors: false }
    }
}

fn default_verbose() -> bool {
    false
}

impl Default for GlintConfig {
    fn default() -> Self {
        GlintConfig { diagnostics: DiagnosticsConfig::default(), module_path: Vec::new() }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: String, #[source] source: std::io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse { path: String, #[source] source: toml::de::Error },
}

impl GlintConfig {
    /// Loads `glint.toml` from `path`, or returns the default configuration
    /// unmodified if no file exists there.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(GlintConfig::default());
        }
        let text = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
        toml::from_str(&text)
            .map_err(|source| ConfigError::Parse { path: path.display().to_string(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = GlintConfig::load("/nonexistent/glint.toml").unwrap();
        assert!(!config.diagnostics.verbose);
        assert!(!config.diagnostics.warnings_as_errors);
    }

    #[test]
    fn loads_an_explicit_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glint.toml");
        fs::write(&path, "[diagnostics]\nverbose = true\nwarnings_as_errors = true\n").unwrap();
        let config = GlintConfig::load(&path).unwrap();
        assert!(config.diagnostics.verbose);
        assert!(config.diagnostics.warnings_as_errors);
    }
}
