//! YAML errors rendered as miette diagnostics

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum YamlError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] YamlSyntaxError),

    #[error("IO error: {0}")]
    #[diagnostic(code(taller::yaml::io))]
    Io(#[from] std::io::Error),
}

/// A YAML parse failure pointing at the offending location
#[derive(Debug, Error, Diagnostic)]
#[error("Invalid YAML in {filename}: {message}")]
#[diagnostic(
    code(taller::yaml::syntax),
    help("Check indentation and quoting near the highlighted position")
)]
pub struct YamlSyntaxError {
    pub filename: String,
    pub message: String,

    #[source_code]
    pub src: NamedSource<String>,

    #[label("here")]
    pub span: Option<SourceSpan>,
}

impl YamlSyntaxError {
    pub fn from_serde_error(err: &serde_yml::Error, content: &str, filename: &str) -> Self {
        let span = err.location().map(|loc| {
            let offset = loc.index().min(content.len());
            SourceSpan::from((offset, 1usize.min(content.len() - offset)))
        });
        Self {
            filename: filename.to_string(),
            message: err.to_string(),
            src: NamedSource::new(filename, content.to_string()),
            span,
        }
    }

    /// 1-based line of the error, if known
    pub fn line(&self) -> Option<usize> {
        let offset = self.span?.offset();
        let src = self.src.inner();
        let before = src.get(..offset).unwrap_or(src.as_str());
        Some(before.matches('\n').count() + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_has_location() {
        let content = "customer: Ana\nstatus: [Confirmado\n";
        let err = serde_yml::from_str::<serde_yml::Value>(content).unwrap_err();
        let diag = YamlSyntaxError::from_serde_error(&err, content, "REP-1.taller.yaml");

        assert!(diag.span.is_some());
        assert!(diag.line().unwrap() >= 2);
        assert!(diag.to_string().contains("REP-1.taller.yaml"));
    }
}
