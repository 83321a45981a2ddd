use std::path::Path;
use thiserror::Error;

/// Errors while generating a vertex layout for a Rust vertex struct.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CreateLayoutError {
    /// A field has no word in common with any remaining shader attribute.
    /// Binding this field to a guessed attribute would corrupt the vertex layout.
    #[error("failed to match fields of `{vertex}`: {source}")]
    NoMatch {
        vertex: String,
        source: NoMatchError,
    },

    /// The field's type has no known vertex format.
    /// Register custom types with [FieldTypes::insert](crate::FieldTypes::insert).
    #[error("unsupported type `{ty}` for field `{field}` in `{vertex}`")]
    UnsupportedFieldType {
        vertex: String,
        field: String,
        ty: String,
    },

    /// The Rust source does not describe a struct with named fields.
    #[error("invalid vertex struct: {reason}")]
    InvalidVertexStruct { reason: String },

    /// A struct or field name can't be used in generated Rust code.
    #[error("`{name}` is not a valid Rust identifier or path")]
    InvalidIdentifier { name: String },
}

impl CreateLayoutError {
    /// Writes a diagnostic error to stderr.
    pub fn emit_to_stderr(&self) {
        eprintln!("{}", self.emit_to_string())
    }

    /// Writes a diagnostic error to stderr, including a shader path.
    pub fn emit_to_stderr_with_path(&self, path: impl AsRef<Path>) {
        eprintln!("{}", self.emit_to_string_with_path(path))
    }

    /// Creates a diagnostic string from the error.
    pub fn emit_to_string(&self) -> String {
        self.to_string()
    }

    /// Creates a diagnostic string from the error, including a shader path.
    pub fn emit_to_string_with_path(&self, path: impl AsRef<Path>) -> String {
        format!("{}: {}", path.as_ref().to_string_lossy(), self)
    }
}

/// No shader attribute could be matched to a vertex field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "no shader attribute matches vertex field `{field}` (remaining attributes: {})",
    candidate_list(.candidates)
)]
pub struct NoMatchError {
    /// The name of the vertex field.
    pub field: String,
    /// The names of the attributes that were still available for matching.
    pub candidates: Vec<String>,
}

fn candidate_list(candidates: &[String]) -> String {
    if candidates.is_empty() {
        "none".to_string()
    } else {
        candidates.join(", ")
    }
}
