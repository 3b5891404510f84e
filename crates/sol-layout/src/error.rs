use thiserror::Error;

/// Binary layout and compact-length codec errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("truncated input: field `{field}` needs {needed} bytes, {remaining} remaining")]
    Truncated {
        field: String,
        needed: usize,
        remaining: usize,
    },

    #[error("oversized input: {leftover} bytes left after the last field")]
    Oversized { leftover: usize },

    #[error("value {value} out of range for field `{field}` ({bits}-bit unsigned)")]
    OutOfRange {
        field: String,
        value: i128,
        bits: u32,
    },

    #[error("missing value for field `{0}`")]
    MissingField(String),

    #[error("field `{field}` expects {expected}")]
    KindMismatch {
        field: String,
        expected: &'static str,
    },

    #[error("field `{field}` expects a {expected}-byte blob, got {actual} bytes")]
    BlobLength {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("compact length overflows u16")]
    LengthOverflow,

    #[error("compact length is not minimally encoded")]
    NonCanonicalLength,
}
