//! The reversible edit contract.
//!
//! - [`Edit`] — a single reversible operation stored in an
//!   [`EditLog`](crate::EditLog)
//! - [`EditState`] — the `done` / `alive` / `mergeable` flags every edit carries
//! - [`AsAny`] — downcasting support used by merge implementations
//!
//! Edits are self-contained: each implementation stores the handle(s) of the
//! object it changes and whatever before/after values it needs to reverse
//! itself. The log never inspects that data; it only drives the fixed set of
//! operations below.

use std::any::Any;
use std::fmt;

use crate::error::{EditError, EditResult};
use crate::handle::SourceId;

/// Helper trait for downcasting trait objects to concrete types.
///
/// Automatically implemented for all `'static` types. Call it through the
/// trait object (`(*other).as_any()` or `other.as_ref().as_any()`), not on a
/// `Box`, otherwise the box itself is what gets downcast.
pub trait AsAny: 'static {
    /// Returns a reference to `self` as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl<T: 'static> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Lifecycle flags shared by every edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditState {
    /// The forward effect is currently applied.
    pub done: bool,
    /// Cleared by [`Edit::die`]; a dead edit can never be undone or redone.
    pub alive: bool,
    /// Later edits of the same kind on the same target may be absorbed.
    pub mergeable: bool,
}

impl EditState {
    /// State of a freshly captured edit: applied and alive.
    pub fn new(mergeable: bool) -> Self {
        Self {
            done: true,
            alive: true,
            mergeable,
        }
    }
}

/// A reversible change to one or more domain objects.
///
/// Implementors provide [`revert`](Self::revert) and
/// [`reapply`](Self::reapply), which perform the actual mutation. The
/// provided [`undo`](Self::undo) / [`redo`](Self::redo) check the lifecycle
/// preconditions first and flip the `done` flag afterwards, so a failing
/// `revert` leaves the edit in its previous state. Implementations must
/// validate before mutating so that failure never leaves a half-applied
/// change behind.
///
/// # Merging
///
/// Edits representing incremental changes (each step of a drag) override
/// [`merge`](Self::merge) so consecutive edits coalesce into one history
/// entry. Use [`AsAny::as_any`] on the candidate to downcast it:
///
/// ```ignore
/// fn merge(&mut self, other: Box<dyn Edit>) -> Option<Box<dyn Edit>> {
///     if let Some(other) = (*other).as_any().downcast_ref::<Self>()
///         && self.state.mergeable
///         && other.state.mergeable
///     {
///         self.current = other.current;
///         return None; // consumed
///     }
///     Some(other)
/// }
/// ```
///
/// # Object Safety
///
/// The trait is dyn-compatible so that edits of any kind and any target type
/// share one log as `Box<dyn Edit>`.
pub trait Edit: fmt::Debug + AsAny + Send {
    fn state(&self) -> &EditState;

    fn state_mut(&mut self) -> &mut EditState;

    /// Restores the captured "before" state on the target.
    fn revert(&mut self) -> EditResult;

    /// Restores the captured "after" state on the target.
    fn reapply(&mut self) -> EditResult;

    /// A short, human-readable name for menus and history lists.
    ///
    /// Examples: `"Move shape"`, `"Insert point"`, `"Change opacity"`.
    fn description(&self) -> &str;

    /// Optional icon name for history browsers.
    fn icon(&self) -> Option<&str> {
        None
    }

    /// Reverses the edit.
    ///
    /// Fails with [`EditError::CannotUndo`] if the edit is dead or not done.
    fn undo(&mut self) -> EditResult {
        if !self.can_undo() {
            return Err(EditError::CannotUndo);
        }
        self.revert()?;
        self.state_mut().done = false;
        Ok(())
    }

    /// Re-applies the edit.
    ///
    /// Fails with [`EditError::CannotRedo`] if the edit is dead or already done.
    fn redo(&mut self) -> EditResult {
        if !self.can_redo() {
            return Err(EditError::CannotRedo);
        }
        self.reapply()?;
        self.state_mut().done = true;
        Ok(())
    }

    fn can_undo(&self) -> bool {
        let state = self.state();
        state.alive && state.done
    }

    fn can_redo(&self) -> bool {
        let state = self.state();
        state.alive && !state.done
    }

    /// Tries to absorb `other` into `self`, taking ownership.
    ///
    /// On success `self` takes over `other`'s "after" state and `None` is
    /// returned; the candidate is dropped without ever being stored.
    /// Otherwise `other` is handed back. Returns `Some(other)` by default.
    fn merge(&mut self, other: Box<dyn Edit>) -> Option<Box<dyn Edit>> {
        Some(other)
    }

    /// Whether this edit supersedes `older`, the edit at the end of the log.
    ///
    /// When `true` the log kills `older` and stores `self` in its place.
    fn replaces(&self, _older: &dyn Edit) -> bool {
        false
    }

    /// Whether the edit counts as a step for single-press undo/redo.
    fn is_significant(&self) -> bool {
        true
    }

    /// Whether the edit touches the object identified by `source`.
    fn references(&self, _source: SourceId) -> bool {
        false
    }

    /// Drops handles and captured snapshots. Called once by [`die`](Self::die).
    fn release(&mut self) {}

    /// Kills the edit. Idempotent.
    fn die(&mut self) {
        if self.state().alive {
            self.state_mut().alive = false;
            self.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Toggle {
        state: EditState,
        flips: i32,
        released: bool,
    }

    impl Toggle {
        fn new() -> Self {
            Self {
                state: EditState::new(false),
                flips: 0,
                released: false,
            }
        }
    }

    impl Edit for Toggle {
        fn state(&self) -> &EditState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut EditState {
            &mut self.state
        }

        fn revert(&mut self) -> EditResult {
            self.flips -= 1;
            Ok(())
        }

        fn reapply(&mut self) -> EditResult {
            self.flips += 1;
            Ok(())
        }

        fn description(&self) -> &str {
            "Toggle"
        }

        fn release(&mut self) {
            self.released = true;
        }
    }

    #[derive(Debug)]
    struct Stubborn {
        state: EditState,
    }

    impl Edit for Stubborn {
        fn state(&self) -> &EditState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut EditState {
            &mut self.state
        }

        fn revert(&mut self) -> EditResult {
            Err(EditError::InvalidState("locked".into()))
        }

        fn reapply(&mut self) -> EditResult {
            Ok(())
        }

        fn description(&self) -> &str {
            "Stubborn"
        }
    }

    #[test]
    fn fresh_edit_is_done_and_alive() {
        let edit = Toggle::new();
        assert!(edit.can_undo());
        assert!(!edit.can_redo());
        assert!(edit.is_significant());
        assert_eq!(edit.icon(), None);
    }

    #[test]
    fn undo_then_redo_flips_done() {
        let mut edit = Toggle::new();
        edit.undo().unwrap();
        assert!(!edit.state().done);
        assert!(edit.can_redo());
        edit.redo().unwrap();
        assert!(edit.state().done);
        assert_eq!(edit.flips, 0);
    }

    #[test]
    fn double_undo_is_rejected() {
        let mut edit = Toggle::new();
        edit.undo().unwrap();
        assert_eq!(edit.undo(), Err(EditError::CannotUndo));
        assert_eq!(edit.flips, -1);
    }

    #[test]
    fn redo_of_done_edit_is_rejected() {
        let mut edit = Toggle::new();
        assert_eq!(edit.redo(), Err(EditError::CannotRedo));
    }

    #[test]
    fn dead_edit_rejects_both_directions() {
        let mut edit = Toggle::new();
        edit.die();
        assert!(!edit.can_undo());
        assert!(!edit.can_redo());
        assert_eq!(edit.undo(), Err(EditError::CannotUndo));

        let mut undone = Toggle::new();
        undone.undo().unwrap();
        undone.die();
        assert_eq!(undone.redo(), Err(EditError::CannotRedo));
    }

    #[test]
    fn die_is_idempotent_and_releases() {
        let mut edit = Toggle::new();
        edit.die();
        assert!(edit.released);
        edit.released = false;
        edit.die();
        assert!(!edit.released);
    }

    #[test]
    fn failed_revert_keeps_done() {
        let mut edit = Stubborn {
            state: EditState::new(false),
        };
        assert!(edit.undo().is_err());
        assert!(edit.state().done);
    }

    #[test]
    fn default_merge_hands_candidate_back() {
        let mut edit = Toggle::new();
        let back = edit.merge(Box::new(Toggle::new()));
        assert!(back.is_some());
        assert!(!edit.replaces(&Toggle::new()));
    }

    #[test]
    fn as_any_downcasts_through_trait_object() {
        let boxed: Box<dyn Edit> = Box::new(Toggle::new());
        assert!((*boxed).as_any().is::<Toggle>());
        assert!(!(*boxed).as_any().is::<Stubborn>());
    }
}
