//! Document validation against the embedded schemas
//!
//! On top of the JSON schema, repair documents are checked for a quote total
//! that doesn't match its parts and labor.

use miette::{Diagnostic, NamedSource};
use thiserror::Error;

use crate::core::EntityPrefix;
use crate::entities::quote::Quote;
use crate::schema::registry::SchemaRegistry;
use crate::yaml::YamlSyntaxError;

/// A document that failed validation
#[derive(Debug, Error, Diagnostic)]
pub enum ValidationError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(YamlSyntaxError),

    #[error("{filename} has {} schema violation(s)", .violations.len())]
    #[diagnostic(code(taller::schema::invalid))]
    Schema {
        filename: String,
        #[source_code]
        src: NamedSource<String>,
        #[related]
        violations: Vec<Violation>,
    },

    #[error("No schema for {0} documents")]
    #[diagnostic(code(taller::schema::missing))]
    MissingSchema(EntityPrefix),

    #[error("Embedded schema for {prefix} is invalid: {message}")]
    #[diagnostic(code(taller::schema::broken))]
    BrokenSchema {
        prefix: EntityPrefix,
        message: String,
    },
}

impl ValidationError {
    pub fn violation_count(&self) -> usize {
        match self {
            ValidationError::Schema { violations, .. } => violations.len(),
            _ => 1,
        }
    }
}

/// One rule broken by a document
#[derive(Debug, Error, Diagnostic)]
#[error("{path}: {message}")]
#[diagnostic(severity(Error))]
pub struct Violation {
    /// JSON pointer into the document ("" for the root)
    pub path: String,
    pub message: String,
}

pub struct Validator<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> Validator<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Validate YAML `content`, collecting every violation
    pub fn iter_errors(
        &self,
        content: &str,
        filename: &str,
        prefix: EntityPrefix,
    ) -> Result<(), ValidationError> {
        let schema = self
            .registry
            .get(prefix)
            .ok_or(ValidationError::MissingSchema(prefix))?;
        let compiled = jsonschema::validator_for(schema).map_err(|e| ValidationError::BrokenSchema {
            prefix,
            message: e.to_string(),
        })?;

        let instance: serde_json::Value = serde_yml::from_str(content).map_err(|e| {
            ValidationError::Syntax(YamlSyntaxError::from_serde_error(&e, content, filename))
        })?;

        let mut violations: Vec<Violation> = compiled
            .iter_errors(&instance)
            .map(|e| Violation {
                path: e.instance_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if prefix == EntityPrefix::Rep {
            violations.extend(check_quote_total(&instance));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Schema {
                filename: filename.to_string(),
                src: NamedSource::new(filename, content.to_string()),
                violations,
            })
        }
    }
}

fn check_quote_total(instance: &serde_json::Value) -> Option<Violation> {
    let quote: Quote = serde_json::from_value(instance.get("quote")?.clone()).ok()?;
    if quote.is_consistent() {
        return None;
    }
    Some(Violation {
        path: "/quote/total".to_string(),
        message: format!(
            "total {:.2} does not equal parts + labor ({:.2})",
            quote.total,
            quote.computed_total()
        ),
    })
}
