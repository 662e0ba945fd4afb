//! Object arena
//!
//! Single owner of every managed object. Each slot carries the object and its
//! reference count; removing the last reference removes the slot.

use super::{CommitContext, DataBuffer, ManagedObject, ObjectCore, ObjectError, ObjectKind, ObjectResult};
use crate::foundation::collections::{HandleMap, ObjectHandle};
use crate::geometry::Geometry;
use crate::render::{Camera, Renderer};
use crate::scene::{Model, Volume};

/// A managed object of any kind
pub enum Object {
    /// Geometry container
    Model(Model),
    /// Geometry of any variant
    Geometry(Geometry),
    /// Data buffer
    Data(DataBuffer),
    /// Volume
    Volume(Volume),
    /// Renderer instance
    Renderer(Box<dyn Renderer>),
    /// Camera instance
    Camera(Box<dyn Camera>),
}

macro_rules! dispatch {
    ($object:expr, $inner:ident => $body:expr) => {
        match $object {
            Object::Model($inner) => $body,
            Object::Geometry($inner) => $body,
            Object::Data($inner) => $body,
            Object::Volume($inner) => $body,
            Object::Renderer($inner) => $body,
            Object::Camera($inner) => $body,
        }
    };
}

impl Object {
    /// Kind of the wrapped object
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Model(_) => ObjectKind::Model,
            Self::Geometry(_) => ObjectKind::Geometry,
            Self::Data(_) => ObjectKind::Data,
            Self::Volume(_) => ObjectKind::Volume,
            Self::Renderer(_) => ObjectKind::Renderer,
            Self::Camera(_) => ObjectKind::Camera,
        }
    }

    /// Shared object state
    pub fn core(&self) -> &ObjectCore {
        dispatch!(self, inner => inner.core())
    }

    /// Mutable shared object state
    pub fn core_mut(&mut self) -> &mut ObjectCore {
        dispatch!(self, inner => inner.core_mut())
    }

    /// Type name the object was created under
    pub fn type_name(&self) -> &'static str {
        dispatch!(self, inner => inner.type_name())
    }

    /// Run the object's own validation
    pub fn commit(&mut self) -> ObjectResult<()> {
        dispatch!(self, inner => inner.commit())
    }

    /// Run the object's post-commit hook
    pub fn post_commit(&self, ctx: &mut CommitContext<'_>) -> ObjectResult<()> {
        dispatch!(self, inner => inner.post_commit(ctx))
    }
}

/// Outcome of dropping a reference
pub enum Released {
    /// Object still referenced, with the remaining count
    Alive(usize),
    /// Last reference dropped; the object was removed from the arena
    Destroyed(Object),
}

struct Slot {
    ref_count: usize,
    object: Object,
}

/// Arena of managed objects keyed by [`ObjectHandle`]
#[derive(Default)]
pub struct ObjectArena {
    slots: HandleMap<Slot>,
}

impl ObjectArena {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object holding one reference
    pub fn insert(&mut self, object: Object) -> ObjectHandle {
        self.slots.insert(Slot { ref_count: 1, object })
    }

    /// Whether the handle resolves to a live object
    pub fn contains(&self, handle: ObjectHandle) -> bool {
        self.slots.contains_key(handle)
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the arena is empty
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Reference count of a live object
    pub fn ref_count(&self, handle: ObjectHandle) -> Option<usize> {
        self.slots.get(handle).map(|slot| slot.ref_count)
    }

    /// Add a reference, returning the new count
    pub fn retain(&mut self, handle: ObjectHandle) -> Option<usize> {
        let slot = self.slots.get_mut(handle)?;
        slot.ref_count += 1;
        Some(slot.ref_count)
    }

    /// Drop a reference, removing the object when it was the last one
    pub fn release(&mut self, handle: ObjectHandle) -> Option<Released> {
        let slot = self.slots.get_mut(handle)?;
        slot.ref_count -= 1;
        if slot.ref_count > 0 {
            return Some(Released::Alive(slot.ref_count));
        }
        self.slots.remove(handle).map(|slot| Released::Destroyed(slot.object))
    }

    /// Look up an object
    pub fn get(&self, handle: ObjectHandle) -> Option<&Object> {
        self.slots.get(handle).map(|slot| &slot.object)
    }

    /// Look up an object for writing
    pub fn get_mut(&mut self, handle: ObjectHandle) -> Option<&mut Object> {
        self.slots.get_mut(handle).map(|slot| &mut slot.object)
    }

    /// Look up a model
    pub fn model(&self, handle: ObjectHandle) -> Option<&Model> {
        match self.get(handle)? {
            Object::Model(model) => Some(model),
            _ => None,
        }
    }

    /// Look up a model for writing
    pub fn model_mut(&mut self, handle: ObjectHandle) -> Option<&mut Model> {
        match self.get_mut(handle)? {
            Object::Model(model) => Some(model),
            _ => None,
        }
    }

    /// Look up a geometry
    pub fn geometry(&self, handle: ObjectHandle) -> Option<&Geometry> {
        match self.get(handle)? {
            Object::Geometry(geometry) => Some(geometry),
            _ => None,
        }
    }

    /// Look up a geometry for writing
    pub fn geometry_mut(&mut self, handle: ObjectHandle) -> Option<&mut Geometry> {
        match self.get_mut(handle)? {
            Object::Geometry(geometry) => Some(geometry),
            _ => None,
        }
    }

    /// Look up a data buffer
    pub fn data(&self, handle: ObjectHandle) -> Option<&DataBuffer> {
        match self.get(handle)? {
            Object::Data(data) => Some(data),
            _ => None,
        }
    }

    /// Look up a volume
    pub fn volume(&self, handle: ObjectHandle) -> Option<&Volume> {
        match self.get(handle)? {
            Object::Volume(volume) => Some(volume),
            _ => None,
        }
    }

    /// Look up a renderer
    pub fn renderer(&self, handle: ObjectHandle) -> Option<&dyn Renderer> {
        match self.get(handle)? {
            Object::Renderer(renderer) => Some(&**renderer),
            _ => None,
        }
    }

    /// Look up a camera
    pub fn camera(&self, handle: ObjectHandle) -> Option<&dyn Camera> {
        match self.get(handle)? {
            Object::Camera(camera) => Some(&**camera),
            _ => None,
        }
    }

    /// Resolve a required data parameter of `owner`
    pub fn require_data(&self, owner: &ObjectCore, name: &str) -> ObjectResult<&DataBuffer> {
        let handle = owner.get_data(name, true)?.ok_or_else(|| owner.missing(name))?;
        self.data(handle).ok_or_else(|| self.reference_error(owner, name, handle, ObjectKind::Data))
    }

    /// Resolve an optional data parameter of `owner`
    pub fn optional_data(&self, owner: &ObjectCore, name: &str) -> ObjectResult<Option<&DataBuffer>> {
        match owner.get_data(name, false)? {
            None => Ok(None),
            Some(handle) => self
                .data(handle)
                .map(Some)
                .ok_or_else(|| self.reference_error(owner, name, handle, ObjectKind::Data)),
        }
    }

    /// Resolve a required object parameter of `owner` that must be of `expected` kind
    pub fn require_object(
        &self,
        owner: &ObjectCore,
        name: &str,
        expected: ObjectKind,
    ) -> ObjectResult<(ObjectHandle, &Object)> {
        let handle = owner.get_object(name, true)?.ok_or_else(|| owner.missing(name))?;
        match self.get(handle) {
            Some(object) if object.kind() == expected => Ok((handle, object)),
            _ => Err(self.reference_error(owner, name, handle, expected)),
        }
    }

    fn reference_error(&self, owner: &ObjectCore, name: &str, handle: ObjectHandle, expected: ObjectKind) -> ObjectError {
        match self.get(handle) {
            None => ObjectError::StaleReference {
                object: owner.type_name(),
                name: name.to_string(),
            },
            Some(found) => ObjectError::WrongObjectKind {
                object: owner.type_name(),
                name: name.to_string(),
                expected,
                found: found.kind(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{DataFlags, DataType, ParamValue};

    fn data() -> Object {
        Object::Data(DataBuffer::new(1, DataType::Float, None, DataFlags::empty()).unwrap())
    }

    #[test]
    fn test_reference_counting() {
        let mut arena = ObjectArena::new();
        let handle = arena.insert(data());
        assert_eq!(arena.ref_count(handle), Some(1));

        for expected in 2..=4 {
            assert_eq!(arena.retain(handle), Some(expected));
        }
        for _ in 0..3 {
            assert!(matches!(arena.release(handle), Some(Released::Alive(_))));
        }
        assert_eq!(arena.ref_count(handle), Some(1));

        assert!(matches!(arena.release(handle), Some(Released::Destroyed(Object::Data(_)))));
        assert!(!arena.contains(handle));
        assert!(arena.release(handle).is_none());
        assert!(arena.is_empty());
    }

    #[test]
    fn test_typed_lookup_checks_kind() {
        let mut arena = ObjectArena::new();
        let handle = arena.insert(Object::Model(Model::new()));
        assert!(arena.model(handle).is_some());
        assert!(arena.geometry(handle).is_none());
        assert!(arena.data(handle).is_none());
    }

    #[test]
    fn test_require_data_reports_stale_reference() {
        let mut arena = ObjectArena::new();
        let buffer = arena.insert(data());
        let mut owner = ObjectCore::new("slices");
        owner.set("planes", ParamValue::Data(buffer));
        assert!(arena.require_data(&owner, "planes").is_ok());

        arena.release(buffer);
        assert!(matches!(
            arena.require_data(&owner, "planes"),
            Err(ObjectError::StaleReference { object: "slices", .. })
        ));
    }

    #[test]
    fn test_require_object_reports_wrong_kind() {
        let mut arena = ObjectArena::new();
        let model = arena.insert(Object::Model(Model::new()));
        let mut owner = ObjectCore::new("slices");
        owner.set("volume", ParamValue::Object(model));

        assert!(matches!(
            arena.require_object(&owner, "volume", ObjectKind::Volume),
            Err(ObjectError::WrongObjectKind { expected: ObjectKind::Volume, found: ObjectKind::Model, .. })
        ));
    }

    #[test]
    fn test_optional_data_absent() {
        let arena = ObjectArena::new();
        let owner = ObjectCore::new("triangles");
        assert!(arena.optional_data(&owner, "vertex.normal").unwrap().is_none());
    }
}
