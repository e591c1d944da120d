use std::fmt;

use super::{Snapshot, require};
use crate::edit::{Edit, EditState};
use crate::error::{EditError, EditResult};
use crate::handle::{Editable, Handle, SourceId};

/// An editable object that owns an ordered list of points.
pub trait PointList: Editable {
    type Point: Clone + fmt::Debug + Send + 'static;

    fn points(&self) -> &[Self::Point];

    fn points_mut(&mut self) -> &mut Vec<Self::Point>;
}

/// Which structural change a [`PointListEdit`] recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointChange {
    Insert,
    Remove,
}

fn out_of_range(index: usize, len: usize) -> EditError {
    EditError::InvalidState(format!("point index {index} out of range for {len} points"))
}

fn remove_at<P>(points: &mut Vec<P>, index: usize) -> EditResult<P> {
    if index >= points.len() {
        return Err(out_of_range(index, points.len()));
    }
    Ok(points.remove(index))
}

fn insert_clamped<P>(points: &mut Vec<P>, index: usize, point: P) {
    let index = index.min(points.len());
    points.insert(index, point);
}

/// Insertion or removal of one point.
///
/// Never merges: every structural change is its own step. Re-insertion
/// clamps the index to the current list length so that history still
/// replays after the list shrank behind the edit's back.
pub struct PointListEdit<T: PointList> {
    state: EditState,
    change: PointChange,
    source_id: SourceId,
    source: Option<Handle<T>>,
    index: usize,
    point: Option<T::Point>,
}

impl<T: PointList> PointListEdit<T> {
    fn recorded(source: Handle<T>, change: PointChange, index: usize, point: T::Point) -> Self {
        Self {
            state: EditState::new(false),
            change,
            source_id: source.id(),
            source: Some(source),
            index,
            point: Some(point),
        }
    }

    /// Records a point that has already been inserted at `index`.
    pub fn inserted(source: Handle<T>, index: usize, point: T::Point) -> Self {
        Self::recorded(source, PointChange::Insert, index, point)
    }

    /// Records a point that has already been removed from `index`.
    pub fn removed(source: Handle<T>, index: usize, point: T::Point) -> Self {
        Self::recorded(source, PointChange::Remove, index, point)
    }

    /// Inserts `point` at `index` (clamped to the list length) and records it.
    pub fn insert(source: &Handle<T>, index: usize, point: T::Point) -> Self {
        let index = {
            let mut target = source.lock();
            let points = target.points_mut();
            let index = index.min(points.len());
            points.insert(index, point.clone());
            index
        };
        Self::inserted(source.clone(), index, point)
    }

    /// Removes the point at `index` and records it.
    pub fn remove(source: &Handle<T>, index: usize) -> EditResult<Self> {
        let point = remove_at(source.lock().points_mut(), index)?;
        Ok(Self::removed(source.clone(), index, point))
    }

    pub fn change(&self) -> PointChange {
        self.change
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn point(&self) -> Option<&T::Point> {
        self.point.as_ref()
    }

    fn put_back(&self) -> EditResult {
        let point = require(&self.point)?.clone();
        let source = require(&self.source)?;
        insert_clamped(source.lock().points_mut(), self.index, point);
        Ok(())
    }

    fn take_out(&self) -> EditResult {
        let source = require(&self.source)?;
        remove_at(source.lock().points_mut(), self.index)?;
        Ok(())
    }
}

impl<T: PointList> Edit for PointListEdit<T> {
    fn state(&self) -> &EditState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EditState {
        &mut self.state
    }

    fn revert(&mut self) -> EditResult {
        match self.change {
            PointChange::Insert => self.take_out(),
            PointChange::Remove => self.put_back(),
        }
    }

    fn reapply(&mut self) -> EditResult {
        match self.change {
            PointChange::Insert => self.put_back(),
            PointChange::Remove => self.take_out(),
        }
    }

    fn description(&self) -> &str {
        match self.change {
            PointChange::Insert => "Insert point",
            PointChange::Remove => "Remove point",
        }
    }

    fn references(&self, source: SourceId) -> bool {
        self.source_id == source
    }

    fn release(&mut self) {
        self.source = None;
        self.point = None;
    }
}

impl<T: PointList> fmt::Debug for PointListEdit<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointListEdit")
            .field("change", &self.change)
            .field("source", &self.source_id)
            .field("index", &self.index)
            .field("point", &self.point)
            .field("state", &self.state)
            .finish()
    }
}

/// Position change of the point at one index.
///
/// Merges with later moves of the same point on the same object.
pub struct PointMoveEdit<T: PointList> {
    state: EditState,
    source_id: SourceId,
    source: Option<Handle<T>>,
    index: usize,
    positions: Option<Snapshot<T::Point>>,
}

impl<T: PointList> PointMoveEdit<T> {
    /// Records a move that has already been made.
    pub fn new(source: Handle<T>, index: usize, previous: T::Point, current: T::Point) -> Self {
        Self {
            state: EditState::new(true),
            source_id: source.id(),
            source: Some(source),
            index,
            positions: Some(Snapshot { previous, current }),
        }
    }

    /// Moves the point at `index` to `position` and records it.
    pub fn perform(source: &Handle<T>, index: usize, position: T::Point) -> EditResult<Self> {
        let previous = {
            let mut target = source.lock();
            let points = target.points_mut();
            let len = points.len();
            let slot = points.get_mut(index).ok_or_else(|| out_of_range(index, len))?;
            std::mem::replace(slot, position.clone())
        };
        Ok(Self::new(source.clone(), index, previous, position))
    }

    pub fn unmergeable(mut self) -> Self {
        self.state.mergeable = false;
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn previous(&self) -> Option<&T::Point> {
        self.positions.as_ref().map(|p| &p.previous)
    }

    pub fn current(&self) -> Option<&T::Point> {
        self.positions.as_ref().map(|p| &p.current)
    }

    fn place(&self, position: T::Point) -> EditResult {
        let source = require(&self.source)?;
        let mut target = source.lock();
        let points = target.points_mut();
        let len = points.len();
        let slot = points
            .get_mut(self.index)
            .ok_or_else(|| out_of_range(self.index, len))?;
        *slot = position;
        Ok(())
    }
}

impl<T: PointList> Edit for PointMoveEdit<T> {
    fn state(&self) -> &EditState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EditState {
        &mut self.state
    }

    fn revert(&mut self) -> EditResult {
        let previous = require(&self.positions)?.previous.clone();
        self.place(previous)
    }

    fn reapply(&mut self) -> EditResult {
        let current = require(&self.positions)?.current.clone();
        self.place(current)
    }

    fn description(&self) -> &str {
        "Move point"
    }

    fn merge(&mut self, other: Box<dyn Edit>) -> Option<Box<dyn Edit>> {
        let current = match (*other).as_any().downcast_ref::<Self>() {
            Some(candidate)
                if self.state.mergeable
                    && candidate.state.mergeable
                    && self.state.alive
                    && self.source_id == candidate.source_id
                    && self.index == candidate.index =>
            {
                candidate.current().cloned()
            }
            _ => None,
        };
        let (Some(current), Some(positions)) = (current, self.positions.as_mut()) else {
            return Some(other);
        };
        positions.current = current;
        None
    }

    fn references(&self, source: SourceId) -> bool {
        self.source_id == source
    }

    fn release(&mut self) {
        self.source = None;
        self.positions = None;
    }
}

impl<T: PointList> fmt::Debug for PointMoveEdit<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointMoveEdit")
            .field("source", &self.source_id)
            .field("index", &self.index)
            .field("positions", &self.positions)
            .field("state", &self.state)
            .finish()
    }
}
