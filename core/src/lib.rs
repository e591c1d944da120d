//! # Rewind Core
//!
//! Reversible editing for interactive editors: record each change to a
//! document as an [`Edit`], keep edits in an [`EditLog`], and move back and
//! forth through them.
//!
//! The engine is decoupled from any particular document model. Domain objects
//! implement [`Editable`] and are shared through [`Handle`]s; the provided
//! edit kinds in [`edits`] cover property changes, point lists, batches and
//! merge boundaries, and applications can add their own by implementing
//! [`Edit`].
//!
//! - [`Edit`] — a reversible change (Command pattern) with merge hooks
//! - [`EditLog`] — bounded, navigable history with a cursor
//! - [`LogListener`] — change notifications for menus and history views
//! - [`HistoryConfig`] — TOML configuration of the log
//!
//! # Merging
//!
//! When an edit is added, the last done edit may absorb it (for example the
//! many small moves of one drag become a single undo step). Add a
//! [`BoundaryEdit`](edits::BoundaryEdit) with [`EditLog::add_boundary`] to
//! end a drag so the next one starts a new step. Boundaries are not
//! significant: undo and redo step over them.
//!
//! # Threads
//!
//! `EditLog` is `Send + Sync` and every method takes `&self`. Share it as
//! `Arc<EditLog>` and edit objects through their handles; undo and redo lock
//! the affected objects while they run.

pub mod config;
mod edit;
pub mod edits;
mod error;
mod handle;
mod history;
pub mod listener;

pub use config::{DEFAULT_LIMIT, HistoryConfig, load_config};
pub use edit::{AsAny, Edit, EditState};
pub use error::{ConfigError, Direction, EditError, EditResult};
pub use handle::{Editable, Handle, SourceId};
pub use history::{EditId, EditLog, HistoryEntry};
pub use listener::{LogEvent, LogEventKind, LogListener};

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn log_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EditLog>();
    }
}
