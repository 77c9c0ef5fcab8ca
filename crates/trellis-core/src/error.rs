//! Error types for Trellis.

use std::fmt;

/// The main error type for model operations.
///
/// Every variant is a local, recoverable condition: operations return these
/// to the caller instead of panicking, and a consumer hitting one of them
/// (say, [`InvalidIterator`](Self::InvalidIterator) mid-walk) should discard
/// the offending handle and re-fetch a fresh one from the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// The iterator's stamp does not match the store's current generation,
    /// or its row handle no longer names a live row.
    InvalidIterator,
    /// A path index, row position, or column index is beyond bounds.
    OutOfRange,
    /// A path names a position that does not exist in the model.
    NotFound,
    /// A row-drag payload could not be decoded.
    BadFormat,
    /// A value's type does not match the column schema.
    TypeMismatch {
        /// The column that rejected the value.
        column: usize,
        /// The type the column schema requires.
        expected: &'static str,
        /// The type of the value that was offered.
        found: &'static str,
    },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidIterator => {
                write!(f, "Iterator is stale or does not belong to this model")
            }
            Self::OutOfRange => write!(f, "Index is out of range"),
            Self::NotFound => write!(f, "No row exists at the given path"),
            Self::BadFormat => write!(f, "Malformed row drag payload"),
            Self::TypeMismatch {
                column,
                expected,
                found,
            } => {
                write!(
                    f,
                    "Column {column} holds {expected} values, got {found}"
                )
            }
        }
    }
}

impl std::error::Error for ModelError {}

/// A specialized Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            ModelError::InvalidIterator.to_string(),
            "Iterator is stale or does not belong to this model"
        );
        assert_eq!(
            ModelError::TypeMismatch {
                column: 2,
                expected: "Int",
                found: "String",
            }
            .to_string(),
            "Column 2 holds Int values, got String"
        );
    }

    #[test]
    fn test_error_is_std_error() {
        fn takes_error(_: &dyn std::error::Error) {}
        takes_error(&ModelError::NotFound);
    }
}
