use std::fmt;

use super::{Property, Snapshot, require};
use crate::edit::{Edit, EditState};
use crate::error::EditResult;
use crate::handle::{Editable, Handle, SourceId};

/// Reversible change of one property of one object.
///
/// Undo assigns the captured previous value, redo the current one.
/// Consecutive edits of the same property on the same object merge: the
/// stored edit keeps its previous value and takes the newcomer's current
/// value, which turns a continuous drag into a single history entry.
pub struct ValueEdit<T: Editable, V> {
    state: EditState,
    source_id: SourceId,
    source: Option<Handle<T>>,
    property: Property<T, V>,
    values: Option<Snapshot<V>>,
    description: String,
}

impl<T, V> ValueEdit<T, V>
where
    T: Editable,
    V: Clone + fmt::Debug + Send + 'static,
{
    /// Records a change that has already been made to `source`.
    pub fn new(source: Handle<T>, property: Property<T, V>, previous: V, current: V) -> Self {
        Self {
            state: EditState::new(true),
            source_id: source.id(),
            source: Some(source),
            property,
            values: Some(Snapshot { previous, current }),
            description: format!("Change {}", property.name()),
        }
    }

    /// Assigns `value` to the property and returns the edit recording it.
    pub fn perform(source: &Handle<T>, property: Property<T, V>, value: V) -> Self {
        let previous = {
            let mut target = source.lock();
            let previous = property.get(&target);
            property.set(&mut target, value.clone());
            previous
        };
        Self::new(source.clone(), property, previous, value)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Disables merging for this edit.
    pub fn unmergeable(mut self) -> Self {
        self.state.mergeable = false;
        self
    }

    pub fn property_name(&self) -> &'static str {
        self.property.name()
    }

    /// Value restored by undo. `None` once the edit is dead.
    pub fn previous(&self) -> Option<&V> {
        self.values.as_ref().map(|v| &v.previous)
    }

    /// Value restored by redo. `None` once the edit is dead.
    pub fn current(&self) -> Option<&V> {
        self.values.as_ref().map(|v| &v.current)
    }

    fn assign(&self, value: V) -> EditResult {
        let source = require(&self.source)?;
        self.property.set(&mut source.lock(), value);
        Ok(())
    }

    fn accepts(&self, other: &Self) -> bool {
        self.state.mergeable
            && other.state.mergeable
            && self.state.alive
            && self.source_id == other.source_id
            && self.property.name() == other.property.name()
    }
}

impl<T, V> Edit for ValueEdit<T, V>
where
    T: Editable,
    V: Clone + fmt::Debug + Send + 'static,
{
    fn state(&self) -> &EditState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EditState {
        &mut self.state
    }

    fn revert(&mut self) -> EditResult {
        let previous = require(&self.values)?.previous.clone();
        self.assign(previous)
    }

    fn reapply(&mut self) -> EditResult {
        let current = require(&self.values)?.current.clone();
        self.assign(current)
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn merge(&mut self, other: Box<dyn Edit>) -> Option<Box<dyn Edit>> {
        let current = match (*other).as_any().downcast_ref::<Self>() {
            Some(candidate) if self.accepts(candidate) => candidate.current().cloned(),
            _ => None,
        };
        let (Some(current), Some(values)) = (current, self.values.as_mut()) else {
            return Some(other);
        };
        values.current = current;
        None
    }

    fn references(&self, source: SourceId) -> bool {
        self.source_id == source
    }

    fn release(&mut self) {
        self.source = None;
        self.values = None;
    }
}

impl<T, V> fmt::Debug for ValueEdit<T, V>
where
    T: Editable,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueEdit")
            .field("source", &self.source_id)
            .field("property", &self.property.name())
            .field("values", &self.values)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EditError;

    #[derive(Debug)]
    struct Slider {
        position: i32,
        label: String,
    }

    impl Editable for Slider {}

    fn position() -> Property<Slider, i32> {
        Property::new("position", |s| s.position, |s, v| s.position = v)
    }

    fn label() -> Property<Slider, String> {
        Property::new("label", |s| s.label.clone(), |s, v| s.label = v)
    }

    fn slider(position: i32) -> Handle<Slider> {
        Handle::new(Slider {
            position,
            label: String::new(),
        })
    }

    #[test]
    fn perform_assigns_and_captures_previous() {
        let s = slider(4);
        let edit = ValueEdit::perform(&s, position(), 10);
        assert_eq!(s.lock().position, 10);
        assert_eq!(edit.previous(), Some(&4));
        assert_eq!(edit.current(), Some(&10));
        assert_eq!(edit.description(), "Change position");
    }

    #[test]
    fn undo_redo_round_trip() {
        let s = slider(0);
        let mut edit = ValueEdit::perform(&s, position(), 7);
        edit.undo().unwrap();
        assert_eq!(s.lock().position, 0);
        edit.redo().unwrap();
        assert_eq!(s.lock().position, 7);
        edit.undo().unwrap();
        assert_eq!(s.lock().position, 0);
    }

    #[test]
    fn merges_same_source_and_property() {
        let s = slider(0);
        let mut first = ValueEdit::perform(&s, position(), 1);
        let second = ValueEdit::perform(&s, position(), 2);
        assert!(first.merge(Box::new(second)).is_none());
        assert_eq!(first.previous(), Some(&0));
        assert_eq!(first.current(), Some(&2));

        first.undo().unwrap();
        assert_eq!(s.lock().position, 0);
    }

    #[test]
    fn does_not_merge_other_source() {
        let a = slider(0);
        let b = slider(0);
        let mut first = ValueEdit::perform(&a, position(), 1);
        let back = first.merge(Box::new(ValueEdit::perform(&b, position(), 2)));
        assert!(back.is_some());
        assert_eq!(first.current(), Some(&1));
    }

    #[test]
    fn does_not_merge_other_property() {
        let s = slider(0);
        let mut first = ValueEdit::perform(&s, position(), 1);
        let back = first.merge(Box::new(ValueEdit::perform(&s, label(), "x".to_string())));
        assert!(back.is_some());
    }

    #[test]
    fn unmergeable_edits_stay_apart() {
        let s = slider(0);
        let mut first = ValueEdit::perform(&s, position(), 1).unmergeable();
        assert!(first.merge(Box::new(ValueEdit::perform(&s, position(), 2))).is_some());

        let mut second = ValueEdit::perform(&s, position(), 3);
        let candidate = ValueEdit::perform(&s, position(), 4).unmergeable();
        assert!(second.merge(Box::new(candidate)).is_some());
    }

    #[test]
    fn die_releases_handle_and_values() {
        let s = slider(0);
        let mut edit = ValueEdit::perform(&s, position(), 5);
        assert_eq!(s.holders(), 2);
        edit.die();
        assert_eq!(s.holders(), 1);
        assert_eq!(edit.previous(), None);
        assert_eq!(edit.undo(), Err(EditError::CannotUndo));
        assert!(edit.references(s.id()));
    }

    #[test]
    fn custom_description() {
        let s = slider(0);
        let edit = ValueEdit::perform(&s, position(), 5).with_description("Drag slider");
        assert_eq!(edit.description(), "Drag slider");
        assert_eq!(edit.property_name(), "position");
    }
}
