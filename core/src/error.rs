//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace, plus the
//! `IntegrityError` raised when the schema normalizer breaks its own output contract.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// The input could not be parsed as a YAML/JSON document.
    #[from(ignore)]
    #[display("Parse Error: {_0}")]
    Parse(String),

    /// Reference resolution reported errors and the caller chose to treat them as fatal.
    #[from(ignore)]
    #[display("Resolution Error: {_0}")]
    Resolution(String),

    /// The normalized schema map violates one of its invariants.
    #[display("Integrity Error: {_0}")]
    Integrity(IntegrityError),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Io(err) => Some(err),
            AppError::Integrity(err) => Some(err),
            AppError::Parse(_) | AppError::Resolution(_) | AppError::General(_) => None,
        }
    }
}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

/// A breach of the schema map invariants.
///
/// These indicate a defect in the normalizer or in its input contract, never a
/// user-facing specification problem.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum IntegrityError {
    /// An entry was produced without a name.
    #[display("schema entry has an empty name")]
    EmptyName,

    /// Two entries share a name.
    #[display("duplicate schema name '{name}'")]
    DuplicateName {
        /// The clashing name.
        name: String,
    },

    /// The map key differs from the entry's own name.
    #[display("schema map key '{key}' does not match entry name '{name}'")]
    KeyMismatch {
        /// Key under which the entry is stored.
        key: String,
        /// Name recorded on the entry.
        name: String,
    },

    /// An entry still carries an unresolved `$ref`.
    #[display("schema '{name}' contains unresolved reference '{reference}'")]
    ResidualReference {
        /// Entry (or entry being built) holding the reference.
        name: String,
        /// The raw reference string.
        reference: String,
    },

    /// A by-name reference targets an entry that does not exist.
    #[display("schema '{owner}' refers to missing entry '{target}'")]
    DanglingName {
        /// Entry holding the reference.
        owner: String,
        /// Name that could not be found.
        target: String,
    },
}

impl std::error::Error for IntegrityError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_io_conversion() {
        let io_err = Error::new(ErrorKind::Other, "test");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
    }

    #[test]
    fn test_string_conversion() {
        // String must land in General, not Parse or Resolution
        let msg = String::from("something wrong");
        let app_err: AppError = msg.into();
        match app_err {
            AppError::General(s) => assert_eq!(s, "something wrong"),
            _ => panic!("String should convert to AppError::General"),
        }
    }

    #[test]
    fn test_integrity_conversion_and_display() {
        let err: AppError = IntegrityError::DuplicateName {
            name: "Foo".into(),
        }
        .into();
        assert_eq!(
            format!("{}", err),
            "Integrity Error: duplicate schema name 'Foo'"
        );
    }

    #[test]
    fn test_source_exposes_wrapped_errors() {
        use std::error::Error as _;
        let io: AppError = Error::new(ErrorKind::NotFound, "gone").into();
        assert_eq!(io.source().map(|e| e.to_string()).as_deref(), Some("gone"));

        let integrity: AppError = IntegrityError::EmptyName.into();
        assert_eq!(
            integrity.source().map(|e| e.to_string()).as_deref(),
            Some("schema entry has an empty name")
        );
        assert!(AppError::General("x".into()).source().is_none());
    }

    #[test]
    fn test_resolution_manual_creation() {
        let app_err = AppError::Resolution("2 unresolved references".into());
        assert_eq!(
            format!("{}", app_err),
            "Resolution Error: 2 unresolved references"
        );
    }
}
