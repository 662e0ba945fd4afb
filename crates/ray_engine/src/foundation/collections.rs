//! Handle types backing the object arena
//!
//! Every managed object lives in a single [`SlotMap`] keyed by [`ObjectHandle`].
//! Keys are generational, so a handle to a destroyed object never resolves to
//! whatever object later reuses its slot. Typed handles wrap the raw key so the
//! device API can state which kind of object each argument must be.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Untyped key of a managed object in the arena
    pub struct ObjectHandle;

    /// Key of a swap chain owned by the device
    pub struct FrameBufferHandle;
}

/// Handle-based map using slot map for stable references
pub type HandleMap<T> = SlotMap<ObjectHandle, T>;

/// Typed handle for type-safe object references
///
/// The marker type only documents intent; the device still checks the kind of
/// the object the key resolves to.
pub struct TypedHandle<T: ?Sized> {
    key: ObjectHandle,
    _phantom: PhantomData<fn(&T)>,
}

impl<T: ?Sized> TypedHandle<T> {
    /// Create a new typed handle from a key
    pub(crate) fn new(key: ObjectHandle) -> Self {
        Self {
            key,
            _phantom: PhantomData,
        }
    }

    /// Get the underlying key
    pub fn key(&self) -> ObjectHandle {
        self.key
    }
}

// Manual impls: derives would put bounds on the marker type.
impl<T: ?Sized> Clone for TypedHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for TypedHandle<T> {}

impl<T: ?Sized> PartialEq for TypedHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T: ?Sized> Eq for TypedHandle<T> {}

impl<T: ?Sized> Hash for TypedHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<T: ?Sized> fmt::Debug for TypedHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypedHandle<{}>({:?})", std::any::type_name::<T>(), self.key)
    }
}

impl<T: ?Sized> From<TypedHandle<T>> for ObjectHandle {
    fn from(handle: TypedHandle<T>) -> Self {
        handle.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;

    #[test]
    fn test_typed_handle_round_trips_key() {
        let mut map: HandleMap<u32> = HandleMap::with_key();
        let key = map.insert(7);
        let typed = TypedHandle::<Marker>::new(key);
        let copy = typed;
        assert_eq!(typed, copy);
        assert_eq!(ObjectHandle::from(copy), key);
    }

    #[test]
    fn test_stale_key_does_not_resolve() {
        let mut map: HandleMap<u32> = HandleMap::with_key();
        let first = map.insert(1);
        map.remove(first);
        let second = map.insert(2);
        assert_ne!(first, second);
        assert!(map.get(first).is_none());
        assert_eq!(map.get(second), Some(&2));
    }
}
