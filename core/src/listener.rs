//! History change notifications.
//!
//! An [`EditLog`](crate::EditLog) notifies every registered [`LogListener`]
//! after each mutation, once its internal lock has been released. Listeners
//! may query the log from inside the callback (to refresh menu enablement or
//! redraw a history list) but must not mutate it: a mutation would notify
//! again from within the notification.

use std::fmt;

use crate::history::EditId;

/// What changed in the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogEventKind {
    /// A new entry was appended.
    Added(EditId),
    /// The new edit was absorbed into this existing entry.
    Merged(EditId),
    /// The new edit replaced the previous last entry.
    Replaced(EditId),
    /// One or more edits were undone.
    Undone,
    /// One or more edits were redone.
    Redone,
    /// Edits were killed and removed (trim, discard, clear).
    Discarded(usize),
    /// The capacity limit changed.
    LimitChanged,
}

/// A history change, with the log's shape right after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogEvent {
    pub kind: LogEventKind,
    pub cursor: usize,
    pub len: usize,
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LogEventKind::Added(id) => write!(f, "added {id}")?,
            LogEventKind::Merged(id) => write!(f, "merged into {id}")?,
            LogEventKind::Replaced(id) => write!(f, "replaced by {id}")?,
            LogEventKind::Undone => f.write_str("undone")?,
            LogEventKind::Redone => f.write_str("redone")?,
            LogEventKind::Discarded(count) => write!(f, "discarded {count}")?,
            LogEventKind::LimitChanged => f.write_str("limit changed")?,
        }
        write!(f, " (cursor {}/{})", self.cursor, self.len)
    }
}

/// Passive observer of an edit log.
///
/// Implemented for closures taking `&LogEvent`.
pub trait LogListener: Send + Sync {
    fn history_changed(&self, event: &LogEvent);
}

impl<F> LogListener for F
where
    F: Fn(&LogEvent) + Send + Sync,
{
    fn history_changed(&self, event: &LogEvent) {
        self(event)
    }
}
