//! Shared references to edited domain objects.
//!
//! An edit never owns the object it changes. It holds a [`Handle`], a cheap
//! clone of a shared `Arc<Mutex<T>>` tagged with a process-unique
//! [`SourceId`]. The id is what the log compares when it discards the
//! history of a destroyed object, and what merge checks use to decide that
//! two edits target the same object.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, MutexGuard};

/// Marker trait for types that serve as editing targets.
///
/// Implement this on any domain object edits operate on: a shape, a region,
/// a display setting. The two hooks bracket changes made by
/// [`BatchEdit`](crate::edits::BatchEdit) so that an object can hold back
/// change notifications until the whole batch has been applied.
///
/// ```ignore
/// struct Region { /* ... */ }
/// impl Editable for Region {}
/// ```
pub trait Editable: Send + 'static {
    /// Called before a batched edit starts changing this object.
    fn begin_update(&mut self) {}

    /// Called after a batched edit finished changing this object.
    fn end_update(&mut self) {}
}

/// Process-unique identity of an edited object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(u64);

impl SourceId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value, for display only.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source#{}", self.get())
    }
}

/// Shared, identity-carrying reference to an editable object.
///
/// Clones share both the object and the [`SourceId`].
pub struct Handle<T: Editable> {
    id: SourceId,
    inner: Arc<Mutex<T>>,
}

impl<T: Editable> Handle<T> {
    /// Wraps `value` in a new handle with a fresh id.
    pub fn new(value: T) -> Self {
        Self {
            id: SourceId::next(),
            inner: Arc::new(Mutex::new(value)),
        }
    }

    pub fn id(&self) -> SourceId {
        self.id
    }

    /// Locks the object for reading or mutation.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock()
    }

    /// Returns `true` if both handles refer to the same object.
    pub fn same_source(&self, other: &Self) -> bool {
        self.id == other.id
    }

    /// Number of live handles to the object, including this one.
    ///
    /// Dead edits release their handles, so this drops back once history
    /// referencing the object has been discarded.
    pub fn holders(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl<T: Editable> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Editable> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handle").field(&self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        value: i32,
    }

    impl Editable for Counter {}

    #[test]
    fn clones_share_object_and_id() {
        let a = Handle::new(Counter { value: 1 });
        let b = a.clone();
        b.lock().value = 5;
        assert_eq!(a.lock().value, 5);
        assert!(a.same_source(&b));
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn distinct_handles_have_distinct_ids() {
        let a = Handle::new(Counter { value: 0 });
        let b = Handle::new(Counter { value: 0 });
        assert_ne!(a.id(), b.id());
        assert!(!a.same_source(&b));
    }

    #[test]
    fn holders_tracks_clones() {
        let a = Handle::new(Counter { value: 0 });
        assert_eq!(a.holders(), 1);
        let b = a.clone();
        assert_eq!(a.holders(), 2);
        drop(b);
        assert_eq!(a.holders(), 1);
    }

    #[test]
    fn display_uses_raw_id() {
        let a = Handle::new(Counter { value: 0 });
        assert_eq!(a.id().to_string(), format!("source#{}", a.id().get()));
    }

    #[test]
    fn debug_shows_id_only() {
        let a = Handle::new(Counter { value: 0 });
        let debug = format!("{a:?}");
        assert!(debug.starts_with("Handle(SourceId("));
    }
}
