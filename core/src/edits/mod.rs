//! Concrete edit variants.
//!
//! - [`ValueEdit`] — one property of one object, previous/current value
//! - [`PointListEdit`] — insertion or removal of one element of a point list
//! - [`PointMoveEdit`] — position change of one element of a point list
//! - [`BatchEdit`] — the same property changed on many objects at once
//! - [`BoundaryEdit`] — insignificant marker that stops merging
//!
//! Properties are addressed through [`Property`], a named getter/setter
//! pair, so the variants stay generic over the edited type.

mod batch;
mod boundary;
mod point_list;
mod value;

use std::fmt;

pub use batch::{BatchEdit, BatchValues};
pub use boundary::BoundaryEdit;
pub use point_list::{PointChange, PointList, PointListEdit, PointMoveEdit};
pub use value::ValueEdit;

use crate::error::{EditError, EditResult};

/// A named, typed accessor for one property of `T`.
///
/// Two edits address the same property when the names are equal.
///
/// ```ignore
/// const OPACITY: Property<Shape, f32> =
///     Property::new("opacity", |s| s.opacity, |s, v| s.opacity = v);
/// ```
pub struct Property<T, V> {
    name: &'static str,
    get: fn(&T) -> V,
    set: fn(&mut T, V),
}

impl<T, V> Property<T, V> {
    /// Binds a display name to a getter and setter pair.
    pub const fn new(name: &'static str, get: fn(&T) -> V, set: fn(&mut T, V)) -> Self {
        Self { name, get, set }
    }

    /// Name used in edit descriptions, e.g. `"Change opacity"`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Reads the property from `target`.
    pub fn get(&self, target: &T) -> V {
        (self.get)(target)
    }

    /// Writes `value` into `target`.
    pub fn set(&self, target: &mut T, value: V) {
        (self.set)(target, value)
    }
}

impl<T, V> Clone for Property<T, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, V> Copy for Property<T, V> {}

impl<T, V> fmt::Debug for Property<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Property").field(&self.name).finish()
    }
}

/// Before/after pair captured by single-target edits.
///
/// Held in an `Option` so that a dead edit can drop it.
#[derive(Debug, Clone, PartialEq)]
struct Snapshot<V> {
    previous: V,
    current: V,
}

fn released() -> EditError {
    EditError::InvalidState("edit has been released".into())
}

fn require<'a, S>(slot: &'a Option<S>) -> EditResult<&'a S> {
    slot.as_ref().ok_or_else(released)
}
