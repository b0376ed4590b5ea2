//! Configuration and parameter file loading.
//!
//! Reads `gesso.config.json` from the current working directory unless a
//! path is given explicitly.

use std::path::Path;

use gesso_atelier::default_parser_options;
use gesso_relief::{Params, ParserOptions, WhitespaceStrategy, DEFAULT_DIRECTIVE_PREFIX};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Name of the configuration file looked up by [`load_config`]
pub const CONFIG_FILE: &str = "gesso.config.json";

/// Top-level gesso configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GessoConfig {
    /// JSON Schema reference (for editor autocompletion).
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Prefix of directive attributes, `go-` in `go-if`.
    pub directive_prefix: String,

    /// `trim` drops blank text and trims the rest, `preserve` keeps text verbatim.
    pub whitespace: WhitespaceStrategy,
}

impl Default for GessoConfig {
    fn default() -> Self {
        Self {
            schema: None,
            directive_prefix: DEFAULT_DIRECTIVE_PREFIX.to_string(),
            whitespace: WhitespaceStrategy::Trim,
        }
    }
}

impl GessoConfig {
    /// Parser options with the default directive processors installed
    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            directive_prefix: self.directive_prefix.as_str().into(),
            whitespace: self.whitespace,
            ..default_parser_options()
        }
    }
}

/// Load `gesso.config.json` from the given directory (or CWD if None).
///
/// A missing file yields the defaults.
pub fn load_config(dir: Option<&Path>) -> Result<GessoConfig, Error> {
    let base = match dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()?,
    };
    let config_path = base.join(CONFIG_FILE);

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "no config file, using defaults");
        return Ok(GessoConfig::default());
    }
    read_config(&config_path)
}

/// Read a configuration file that must exist.
pub fn read_config(path: &Path) -> Result<GessoConfig, Error> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| Error::Config {
        path: path.to_path_buf(),
        source,
    })
}

/// Read render parameters from a JSON file holding one object.
pub fn read_params(path: &Path) -> Result<Params, Error> {
    let content = std::fs::read_to_string(path)?;
    let invalid = |reason: String| Error::Params {
        path: path.to_path_buf(),
        reason,
    };
    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|err| invalid(err.to_string()))?;
    Params::try_from(value).map_err(|err| invalid(err.to_string()))
}
