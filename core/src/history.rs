//! The edit log: an ordered, bounded, navigable history of edits.
//!
//! [`EditLog`] keeps every recorded edit in one vector and a cursor (the
//! next-add index) that splits it into done edits `[0, cursor)` and undone
//! edits `[cursor, len)`. Appending after an undo discards the undone branch.
//! Unlike a pair of undo/redo stacks this allows jumping to any entry with
//! [`EditLog::undo_or_redo_to`] and trimming around the cursor rather than
//! only from the oldest end.
//!
//! All operations take `&self` and serialize on one internal lock, so a log
//! can be shared as `Arc<EditLog>` between the thread that records edits and
//! the one that navigates history. Listeners are notified after the lock is
//! released; see [`crate::listener`].

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::{DEFAULT_LIMIT, HistoryConfig};
use crate::edit::Edit;
use crate::error::{Direction, EditError, EditResult};
use crate::handle::SourceId;
use crate::listener::{LogEvent, LogEventKind, LogListener};

/// Identity of an entry in one [`EditLog`].
///
/// Ids are assigned in insertion order and never reused by the same log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EditId(u64);

impl EditId {
    #[cfg(test)]
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for EditId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Snapshot of one history entry, for history browsers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: EditId,
    pub index: usize,
    pub description: String,
    pub icon: Option<String>,
    pub done: bool,
    pub significant: bool,
}

struct Entry {
    id: EditId,
    edit: Box<dyn Edit>,
}

struct LogState {
    entries: Vec<Entry>,
    cursor: usize,
    limit: Option<usize>,
    next_id: u64,
}

impl LogState {
    fn event(&self, kind: LogEventKind) -> LogEvent {
        LogEvent {
            kind,
            cursor: self.cursor,
            len: self.entries.len(),
        }
    }

    fn push(&mut self, edit: Box<dyn Edit>) -> EditId {
        let id = EditId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, edit });
        id
    }

    fn index_of(&self, id: EditId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    /// Kills and removes `range`, furthest edit first, and keeps the cursor
    /// pointing at the same boundary (or the start of the range if the
    /// range straddled it).
    fn remove_range(&mut self, range: Range<usize>) -> usize {
        if range.is_empty() {
            return 0;
        }
        let (from, to) = (range.start, range.end);
        let count = to - from;
        for mut entry in self.entries.drain(range).rev() {
            entry.edit.die();
        }
        if self.cursor >= to {
            self.cursor -= count;
        } else if self.cursor > from {
            self.cursor = from;
        }
        count
    }

    /// Keeps exactly `limit` edits centred on `cursor - 1`.
    ///
    /// With an even limit the centred window is one edit too wide; the
    /// extra slot goes to done edits, so the furthest undone edit is
    /// dropped first.
    fn trim_for_limit(&mut self) -> usize {
        let Some(limit) = self.limit else {
            return 0;
        };
        let len = self.entries.len();
        if len <= limit {
            return 0;
        }
        if limit == 0 {
            return self.remove_range(0..len);
        }

        let half = (limit / 2) as isize;
        let anchor = self.cursor as isize - 1;
        let mut keep_from = anchor - half;
        let mut keep_to = anchor + half;
        if keep_to - keep_from + 1 > limit as isize {
            keep_to -= 1;
        }
        if keep_from < 0 {
            keep_to -= keep_from;
            keep_from = 0;
        }
        if keep_to >= len as isize {
            let delta = len as isize - keep_to - 1;
            keep_to += delta;
            keep_from += delta;
        }

        let (keep_from, keep_to) = (keep_from as usize, keep_to as usize);
        let removed = self.remove_range(keep_to + 1..len) + self.remove_range(0..keep_from);
        log::debug!("trimmed {removed} edits to limit {limit}, keeping {keep_from}..={keep_to}");
        removed
    }

    fn append(&mut self, edit: Box<dyn Edit>) -> (EditId, LogEventKind) {
        let Some(last) = self.cursor.checked_sub(1) else {
            let id = self.push(edit);
            return (id, LogEventKind::Added(id));
        };
        let last_id = self.entries[last].id;
        let edit = match self.entries[last].edit.merge(edit) {
            None => {
                log::debug!("merged {:?} into {last_id}", self.entries[last].edit.description());
                return (last_id, LogEventKind::Merged(last_id));
            }
            Some(edit) => edit,
        };
        if edit.replaces(self.entries[last].edit.as_ref()) {
            self.remove_range(last..last + 1);
            let id = self.push(edit);
            log::debug!("{id} replaced {last_id}");
            return (id, LogEventKind::Replaced(id));
        }
        let id = self.push(edit);
        (id, LogEventKind::Added(id))
    }

    fn significant_before(&self, position: usize) -> Option<usize> {
        (0..position)
            .rev()
            .find(|&i| self.entries[i].edit.is_significant())
    }

    fn significant_after(&self, position: usize) -> Option<usize> {
        (position..self.entries.len()).find(|&i| self.entries[i].edit.is_significant())
    }

    /// Undoes edits until the cursor reaches `position`.
    fn undo_to(&mut self, position: usize) -> EditResult {
        while self.cursor > position {
            let entry = &mut self.entries[self.cursor - 1];
            if let Err(err) = entry.edit.undo() {
                log::warn!("undo of {} ({}) failed: {err}", entry.id, entry.edit.description());
                return Err(err);
            }
            log::trace!("undid {} ({})", entry.id, entry.edit.description());
            self.cursor -= 1;
        }
        Ok(())
    }

    /// Redoes edits until the cursor reaches `position`.
    fn redo_to(&mut self, position: usize) -> EditResult {
        while self.cursor < position {
            let entry = &mut self.entries[self.cursor];
            if let Err(err) = entry.edit.redo() {
                log::warn!("redo of {} ({}) failed: {err}", entry.id, entry.edit.description());
                return Err(err);
            }
            log::trace!("redid {} ({})", entry.id, entry.edit.description());
            self.cursor += 1;
        }
        Ok(())
    }

    fn move_cursor(&mut self, position: usize) -> EditResult {
        if position > self.entries.len() {
            return Err(EditError::InvalidArgument(format!(
                "cursor position {position} beyond {} edits",
                self.entries.len()
            )));
        }
        if position < self.cursor {
            self.undo_to(position)
        } else {
            self.redo_to(position)
        }
    }

    fn undo(&mut self) -> EditResult {
        let target = self
            .significant_before(self.cursor)
            .ok_or(EditError::NoOperationAvailable(Direction::Undo))?;
        self.undo_to(target)
    }

    fn redo(&mut self) -> EditResult {
        let target = self
            .significant_after(self.cursor)
            .ok_or(EditError::NoOperationAvailable(Direction::Redo))?;
        let end = self
            .significant_after(target + 1)
            .unwrap_or(self.entries.len());
        self.redo_to(end)
    }

    fn to_be_undone(&self) -> Option<&dyn Edit> {
        self.significant_before(self.cursor)
            .map(|i| self.entries[i].edit.as_ref())
    }

    fn to_be_redone(&self) -> Option<&dyn Edit> {
        self.significant_after(self.cursor)
            .map(|i| self.entries[i].edit.as_ref())
    }
}

/// Ordered, bounded history of reversible edits for one editing scope.
///
/// # Example
///
/// ```ignore
/// let log = EditLog::new(Some(50));
/// let shape = Handle::new(Shape::default());
///
/// // Change the shape, then record the change.
/// log.add_edit(Box::new(ValueEdit::perform(&shape, POSITION, (4.0, 2.0))));
///
/// log.undo()?;
/// log.redo()?;
/// ```
pub struct EditLog {
    state: Mutex<LogState>,
    listeners: Mutex<Vec<Arc<dyn LogListener>>>,
}

impl EditLog {
    /// Creates an empty log retaining at most `limit` edits (`None` for no bound).
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            state: Mutex::new(LogState {
                entries: Vec::new(),
                cursor: 0,
                limit,
                next_id: 1,
            }),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Creates an empty log with the limit from `config`.
    pub fn from_config(config: &HistoryConfig) -> Self {
        Self::new(config.limit())
    }

    /// Records an edit whose effect has already been applied.
    ///
    /// Undone edits are discarded first. The edit is then merged into the
    /// last done edit if that edit accepts it, replaces it if the new edit
    /// says so, or is appended. Returns the id of the entry that now holds
    /// the change.
    pub fn add_edit(&self, edit: Box<dyn Edit>) -> EditId {
        let (id, events) = {
            let mut state = self.state.lock();
            let len = state.entries.len();
            let cursor = state.cursor;
            let dropped = state.remove_range(cursor..len);
            if dropped > 0 {
                log::debug!("discarded {dropped} undone edits");
            }

            let (id, kind) = state.append(edit);
            state.cursor = state.entries.len();
            let trimmed = state.trim_for_limit();

            let mut events = vec![state.event(kind)];
            if trimmed > 0 {
                events.push(state.event(LogEventKind::Discarded(trimmed)));
            }
            (id, events)
        };
        self.notify(&events);
        id
    }

    /// Appends a [`BoundaryEdit`](crate::edits::BoundaryEdit) so the next
    /// edit starts a new merge group.
    pub fn add_boundary(&self) -> EditId {
        self.add_edit(Box::new(crate::edits::BoundaryEdit::new()))
    }

    /// Undoes back to and including the nearest significant done edit.
    ///
    /// Insignificant edits on the way are undone too. Fails with
    /// [`EditError::NoOperationAvailable`] if there is none; if an edit
    /// fails, the cursor stays after the edits already undone.
    pub fn undo(&self) -> EditResult {
        self.navigate(LogState::undo)
    }

    /// Redoes the nearest significant undone edit and the insignificant
    /// edits right after it, mirroring [`undo`](Self::undo).
    pub fn redo(&self) -> EditResult {
        self.navigate(LogState::redo)
    }

    /// Undoes when every edit is done, redoes otherwise.
    pub fn undo_or_redo(&self) -> EditResult {
        self.navigate(|state| {
            if state.cursor == state.entries.len() {
                state.undo()
            } else {
                state.redo()
            }
        })
    }

    /// Undoes or redoes until the edit `id` is the last done edit.
    pub fn undo_or_redo_to(&self, id: EditId) -> EditResult {
        self.navigate(|state| {
            let index = state.index_of(id).ok_or(EditError::UnknownEdit(id))?;
            state.move_cursor(index + 1)
        })
    }

    /// Undoes or redoes until the cursor is at `position` (`0..=len`).
    ///
    /// Position `0` undoes everything, `len` redoes everything.
    pub fn move_cursor_to(&self, position: usize) -> EditResult {
        self.navigate(|state| state.move_cursor(position))
    }

    /// Kills every edit from the start of the log up to and including the
    /// last edit that touches `source`. Returns the number removed.
    pub fn discard_edits(&self, source: SourceId) -> usize {
        self.discard(|state| {
            state
                .entries
                .iter()
                .rposition(|entry| entry.edit.references(source))
                .map_or(0..0, |last| 0..last + 1)
        })
    }

    /// Kills every edit.
    pub fn discard_all(&self) -> usize {
        self.discard(|state| 0..state.entries.len())
    }

    /// Kills every undone edit.
    pub fn discard_future_edits(&self) -> usize {
        self.discard(|state| state.cursor..state.entries.len())
    }

    /// Changes the capacity bound and trims to it.
    pub fn set_limit(&self, limit: Option<usize>) {
        let events = {
            let mut state = self.state.lock();
            state.limit = limit;
            let trimmed = state.trim_for_limit();
            let mut events = vec![state.event(LogEventKind::LimitChanged)];
            if trimmed > 0 {
                events.push(state.event(LogEventKind::Discarded(trimmed)));
            }
            events
        };
        self.notify(&events);
    }

    /// Returns the capacity bound, `None` when unlimited.
    pub fn limit(&self) -> Option<usize> {
        self.state.lock().limit
    }

    /// Returns the number of stored edits, done and undone.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Returns `true` if the log holds no edits.
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// The next-add index: number of done edits.
    pub fn cursor(&self) -> usize {
        self.state.lock().cursor
    }

    /// Returns `true` if [`undo`](Self::undo) has a significant edit to undo.
    pub fn can_undo(&self) -> bool {
        self.state
            .lock()
            .to_be_undone()
            .is_some_and(|edit| edit.can_undo())
    }

    /// Returns `true` if [`redo`](Self::redo) has a significant edit to redo.
    pub fn can_redo(&self) -> bool {
        self.state
            .lock()
            .to_be_redone()
            .is_some_and(|edit| edit.can_redo())
    }

    /// Menu label for the undo action, e.g. `"Undo Move point"`.
    pub fn undo_label(&self) -> String {
        match self.state.lock().to_be_undone() {
            Some(edit) if edit.can_undo() => format!("Undo {}", edit.description()),
            _ => "Undo".to_string(),
        }
    }

    /// Menu label for the redo action.
    pub fn redo_label(&self) -> String {
        match self.state.lock().to_be_redone() {
            Some(edit) if edit.can_redo() => format!("Redo {}", edit.description()),
            _ => "Redo".to_string(),
        }
    }

    /// Returns the current index of the edit `id`, if still stored.
    pub fn index_of(&self, id: EditId) -> Option<usize> {
        self.state.lock().index_of(id)
    }

    /// Runs `f` on the stored edit `id`, if present.
    ///
    /// The log stays locked while `f` runs; `f` must not call back into it.
    pub fn inspect<R>(&self, id: EditId, f: impl FnOnce(&dyn Edit) -> R) -> Option<R> {
        let state = self.state.lock();
        let index = state.index_of(id)?;
        Some(f(state.entries[index].edit.as_ref()))
    }

    /// Snapshot of every entry, oldest first.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        let state = self.state.lock();
        state
            .entries
            .iter()
            .enumerate()
            .map(|(index, entry)| HistoryEntry {
                id: entry.id,
                index,
                description: entry.edit.description().to_string(),
                icon: entry.edit.icon().map(str::to_string),
                done: index < state.cursor,
                significant: entry.edit.is_significant(),
            })
            .collect()
    }

    /// Registers a listener notified after every history change.
    pub fn add_listener(&self, listener: Arc<dyn LogListener>) {
        self.listeners.lock().push(listener);
    }

    /// Unregisters a listener by identity. Returns `false` if it was not registered.
    pub fn remove_listener(&self, listener: &Arc<dyn LogListener>) -> bool {
        let target = Arc::as_ptr(listener) as *const ();
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|l| Arc::as_ptr(l) as *const () != target);
        listeners.len() != before
    }

    fn navigate(&self, step: impl FnOnce(&mut LogState) -> EditResult) -> EditResult {
        let (result, event) = {
            let mut state = self.state.lock();
            let before = state.cursor;
            let result = step(&mut *state);
            let event = match state.cursor.cmp(&before) {
                std::cmp::Ordering::Less => Some(state.event(LogEventKind::Undone)),
                std::cmp::Ordering::Greater => Some(state.event(LogEventKind::Redone)),
                std::cmp::Ordering::Equal => None,
            };
            (result, event)
        };
        if let Some(event) = event {
            self.notify(&[event]);
        }
        result
    }

    fn discard(&self, select: impl FnOnce(&LogState) -> Range<usize>) -> usize {
        let (removed, event) = {
            let mut state = self.state.lock();
            let range = select(&*state);
            let removed = state.remove_range(range);
            if removed > 0 {
                log::debug!("discarded {removed} edits");
            }
            (removed, state.event(LogEventKind::Discarded(removed)))
        };
        if removed > 0 {
            self.notify(&[event]);
        }
        removed
    }

    fn notify(&self, events: &[LogEvent]) {
        let listeners: Vec<_> = self.listeners.lock().clone();
        for event in events {
            for listener in &listeners {
                listener.history_changed(event);
            }
        }
    }
}

impl Default for EditLog {
    fn default() -> Self {
        Self::new(Some(DEFAULT_LIMIT))
    }
}

impl fmt::Debug for EditLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("EditLog")
            .field("len", &state.entries.len())
            .field("cursor", &state.cursor)
            .field("limit", &state.limit)
            .field("listeners", &self.listeners.lock().len())
            .finish()
    }
}
