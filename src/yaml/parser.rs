//! YAML parsing with error handling

use serde::de::DeserializeOwned;
use std::path::Path;

use crate::yaml::diagnostics::{YamlError, YamlSyntaxError};

/// Parse YAML content into a typed value with nice error messages
pub fn parse_yaml<T: DeserializeOwned>(content: &str, filename: &str) -> Result<T, YamlError> {
    serde_yml::from_str(content).map_err(|e| {
        YamlError::Syntax(YamlSyntaxError::from_serde_error(&e, content, filename))
    })
}

/// Parse YAML from a file path
pub fn parse_yaml_file<T: DeserializeOwned>(path: &Path) -> Result<T, YamlError> {
    let content = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();
    parse_yaml(&content, &filename)
}
