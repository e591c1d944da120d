//! Error types for edits and the edit log.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::history::EditId;

/// Direction of a history step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Undo,
    Redo,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undo => f.write_str("undo"),
            Self::Redo => f.write_str("redo"),
        }
    }
}

/// Error type for edit and history operations.
///
/// Every variant is a contract violation rather than a transient failure:
/// callers are expected to consult `can_undo` / `can_redo` before stepping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// The edit is dead or already undone.
    #[error("cannot undo")]
    CannotUndo,
    /// The edit is dead or already applied.
    #[error("cannot redo")]
    CannotRedo,
    /// The log holds no significant edit in the requested direction.
    #[error("no operation available to {0}")]
    NoOperationAvailable(Direction),
    /// A malformed argument, e.g. mismatched batch lengths.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The edited object no longer matches what the edit captured.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// The id does not name an edit stored in the log.
    #[error("unknown edit: {0}")]
    UnknownEdit(EditId),
}

/// Result type for edit operations.
pub type EditResult<T = ()> = Result<T, EditError>;

/// Errors raised while loading a [`HistoryConfig`](crate::HistoryConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_error_display() {
        assert_eq!(EditError::CannotUndo.to_string(), "cannot undo");
        assert_eq!(EditError::CannotRedo.to_string(), "cannot redo");
        assert_eq!(
            EditError::NoOperationAvailable(Direction::Redo).to_string(),
            "no operation available to redo"
        );
        assert_eq!(
            EditError::InvalidArgument("3 sources, 2 values".into()).to_string(),
            "invalid argument: 3 sources, 2 values"
        );
        assert_eq!(
            EditError::UnknownEdit(EditId::new(7)).to_string(),
            "unknown edit: #7"
        );
    }

    #[test]
    fn config_error_keeps_source() {
        use std::error::Error as _;

        let err = ConfigError::Io {
            path: PathBuf::from("history.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().starts_with("failed to read history.toml"));
        assert!(err.source().is_some());
    }
}
