use crate::edit::{Edit, EditState};
use crate::error::EditResult;

/// Stateless marker that ends a merge group.
///
/// A boundary is insignificant, so step-wise undo/redo walks over it, but it
/// sits between the edits before and after it and therefore stops them from
/// merging. Consecutive boundaries collapse into one.
#[derive(Debug)]
pub struct BoundaryEdit {
    state: EditState,
}

impl BoundaryEdit {
    pub fn new() -> Self {
        Self {
            state: EditState::new(false),
        }
    }
}

impl Default for BoundaryEdit {
    fn default() -> Self {
        Self::new()
    }
}

impl Edit for BoundaryEdit {
    fn state(&self) -> &EditState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EditState {
        &mut self.state
    }

    fn revert(&mut self) -> EditResult {
        Ok(())
    }

    fn reapply(&mut self) -> EditResult {
        Ok(())
    }

    fn description(&self) -> &str {
        "Boundary"
    }

    fn merge(&mut self, other: Box<dyn Edit>) -> Option<Box<dyn Edit>> {
        if (*other).as_any().is::<Self>() {
            return None;
        }
        Some(other)
    }

    fn replaces(&self, older: &dyn Edit) -> bool {
        older.as_any().is::<Self>()
    }

    fn is_significant(&self) -> bool {
        false
    }
}
