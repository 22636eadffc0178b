use crate::utils::get_byte_offset;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Failure to build a schema. Queries never fail; only loading does.
#[derive(Error, Debug, Diagnostic)]
pub enum SchemaError {
    #[error("Failed to read schema document '{path}'")]
    #[diagnostic(
        code(schema::io),
        help("Check that the schema file exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed schema document")]
    #[diagnostic(
        code(schema::malformed),
        help("The document must be an object with `structs`, `function_sets`, `runtimes` and `structCompositions` tables.")
    )]
    Malformed {
        #[source_code]
        src: NamedSource<String>,
        #[label("{reason}")]
        span: SourceSpan,
        reason: String,
    },

    #[error("Unsupported schema format for '{path}'")]
    #[diagnostic(
        code(schema::unsupported_format),
        help("Schema documents must use a .json, .yaml or .yml extension.")
    )]
    UnsupportedFormat { path: String },
}

impl SchemaError {
    pub(crate) fn from_json(err: &serde_json::Error, name: &str, source: &str) -> Self {
        let offset = get_byte_offset(source, err.line(), err.column());
        SchemaError::Malformed {
            src: NamedSource::new(name, source.to_string()),
            span: (offset, 0).into(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn from_yaml(err: &serde_yaml::Error, name: &str, source: &str) -> Self {
        let offset = err.location().map_or(0, |location| location.index());
        SchemaError::Malformed {
            src: NamedSource::new(name, source.to_string()),
            span: (offset, 0).into(),
            reason: err.to_string(),
        }
    }
}
