//! YAML documents: parsing with source-annotated diagnostics

pub mod diagnostics;
pub mod parser;

pub use diagnostics::{YamlError, YamlSyntaxError};
pub use parser::{parse_yaml, parse_yaml_file};
