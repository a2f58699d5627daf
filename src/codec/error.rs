use thiserror::Error;

/// Errors raised by the schema-driven codec engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Wire bytes do not match the expected structure (truncated, bad varint, overrun)
    #[error("malformed input at byte {offset}: {reason}")]
    MalformedInput { offset: usize, reason: String },

    /// A runtime value disagrees with the kind declared by the schema
    #[error("schema mismatch on {schema}.{field}: expected {expected}, found {found}")]
    SchemaMismatch {
        schema: String,
        field: String,
        expected: String,
        found: String,
    },

    /// An integer does not fit the range of its target representation
    #[error("integer overflow on {field}: {value} does not fit")]
    IntegerOverflow { field: String, value: String },

    /// A schema declaration violates protobuf rules
    #[error("invalid schema {schema}: {reason}")]
    InvalidSchema { schema: String, reason: String },
}

pub type Result<T> = std::result::Result<T, CodecError>;

impl CodecError {
    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        CodecError::MalformedInput {
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn mismatch(
        schema: &str,
        field: &str,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        CodecError::SchemaMismatch {
            schema: schema.to_string(),
            field: field.to_string(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub(crate) fn overflow(field: &str, value: impl ToString) -> Self {
        CodecError::IntegerOverflow {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}
