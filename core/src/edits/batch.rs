use std::fmt;

use super::{Property, require};
use crate::edit::{Edit, EditState};
use crate::error::{EditError, EditResult};
use crate::handle::{Editable, Handle, SourceId};

/// New values of a [`BatchEdit`]: one per source, or one shared by all.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchValues<V> {
    PerSource(Vec<V>),
    Shared(V),
}

impl<V> BatchValues<V> {
    fn get(&self, index: usize) -> &V {
        match self {
            Self::PerSource(values) => &values[index],
            Self::Shared(value) => value,
        }
    }

    fn check_len(&self, expected: usize) -> EditResult {
        match self {
            Self::PerSource(values) if values.len() != expected => {
                Err(EditError::InvalidArgument(format!(
                    "{expected} sources but {} current values",
                    values.len()
                )))
            }
            _ => Ok(()),
        }
    }
}

struct BatchSnapshot<V> {
    previous: Vec<V>,
    current: BatchValues<V>,
}

/// The same property changed on several objects as one step.
///
/// Undo and redo lock every source (in [`SourceId`] order), call
/// [`Editable::begin_update`] on all of them, assign all values, then call
/// [`Editable::end_update`], so observers of the objects see the batch as a
/// single change.
pub struct BatchEdit<T: Editable, V> {
    state: EditState,
    source_ids: Vec<SourceId>,
    sources: Vec<Handle<T>>,
    lock_order: Vec<usize>,
    property: Property<T, V>,
    snapshot: Option<BatchSnapshot<V>>,
    description: String,
}

impl<T, V> BatchEdit<T, V>
where
    T: Editable,
    V: Clone + fmt::Debug + Send + 'static,
{
    /// Records a batch change that has already been made.
    ///
    /// Fails with [`EditError::InvalidArgument`] if `sources` is empty,
    /// contains the same object twice, or the value lists do not match its
    /// length.
    pub fn new(
        sources: Vec<Handle<T>>,
        property: Property<T, V>,
        previous: Vec<V>,
        current: BatchValues<V>,
    ) -> EditResult<Self> {
        if sources.is_empty() {
            return Err(EditError::InvalidArgument("batch without sources".into()));
        }
        if previous.len() != sources.len() {
            return Err(EditError::InvalidArgument(format!(
                "{} sources but {} previous values",
                sources.len(),
                previous.len()
            )));
        }
        current.check_len(sources.len())?;

        let source_ids: Vec<SourceId> = sources.iter().map(Handle::id).collect();
        let mut lock_order: Vec<usize> = (0..sources.len()).collect();
        lock_order.sort_by_key(|&i| source_ids[i]);
        if lock_order
            .windows(2)
            .any(|pair| source_ids[pair[0]] == source_ids[pair[1]])
        {
            return Err(EditError::InvalidArgument(
                "batch lists the same source twice".into(),
            ));
        }

        Ok(Self {
            state: EditState::new(true),
            description: format!("Change {} of {} objects", property.name(), sources.len()),
            source_ids,
            sources,
            lock_order,
            property,
            snapshot: Some(BatchSnapshot { previous, current }),
        })
    }

    /// Assigns `current` to every source and returns the edit recording it.
    pub fn perform(
        sources: Vec<Handle<T>>,
        property: Property<T, V>,
        current: BatchValues<V>,
    ) -> EditResult<Self> {
        current.check_len(sources.len())?;
        let previous = sources
            .iter()
            .map(|source| property.get(&source.lock()))
            .collect();
        let mut edit = Self::new(sources, property, previous, current)?;
        edit.reapply()?;
        Ok(edit)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn unmergeable(mut self) -> Self {
        self.state.mergeable = false;
        self
    }

    pub fn len(&self) -> usize {
        self.source_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source_ids.is_empty()
    }

    pub fn previous(&self) -> Option<&[V]> {
        self.snapshot.as_ref().map(|s| s.previous.as_slice())
    }

    pub fn current(&self) -> Option<&BatchValues<V>> {
        self.snapshot.as_ref().map(|s| &s.current)
    }

    fn assign(&self, pick: impl Fn(&BatchSnapshot<V>, usize) -> V) -> EditResult {
        let snapshot = require(&self.snapshot)?;
        if self.sources.len() != self.source_ids.len() {
            return Err(super::released());
        }
        let mut targets: Vec<_> = self
            .lock_order
            .iter()
            .map(|&i| (i, self.sources[i].lock()))
            .collect();
        for (_, target) in &mut targets {
            target.begin_update();
        }
        for (i, target) in &mut targets {
            self.property.set(&mut **target, pick(snapshot, *i));
        }
        for (_, target) in &mut targets {
            target.end_update();
        }
        Ok(())
    }
}

impl<T, V> Edit for BatchEdit<T, V>
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
        self.assign(|snapshot, i| snapshot.previous[i].clone())
    }

    fn reapply(&mut self) -> EditResult {
        self.assign(|snapshot, i| snapshot.current.get(i).clone())
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn merge(&mut self, other: Box<dyn Edit>) -> Option<Box<dyn Edit>> {
        let current = match (*other).as_any().downcast_ref::<Self>() {
            Some(candidate)
                if self.state.mergeable
                    && candidate.state.mergeable
                    && self.state.alive
                    && self.source_ids == candidate.source_ids
                    && self.property.name() == candidate.property.name() =>
            {
                candidate.current().cloned()
            }
            _ => None,
        };
        let (Some(current), Some(snapshot)) = (current, self.snapshot.as_mut()) else {
            return Some(other);
        };
        snapshot.current = current;
        None
    }

    fn references(&self, source: SourceId) -> bool {
        self.source_ids.contains(&source)
    }

    fn release(&mut self) {
        self.sources.clear();
        self.snapshot = None;
    }
}

impl<T, V> fmt::Debug for BatchEdit<T, V>
where
    T: Editable,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (previous, current) = match &self.snapshot {
            Some(s) => (Some(&s.previous), Some(&s.current)),
            None => (None, None),
        };
        f.debug_struct("BatchEdit")
            .field("sources", &self.source_ids)
            .field("property", &self.property.name())
            .field("previous", &previous)
            .field("current", &current)
            .field("state", &self.state)
            .finish()
    }
}
