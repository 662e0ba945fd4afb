//! Volumes
//!
//! Only the managed-object shell lives here. Volumes exist so that other
//! objects, slicing geometries in particular, have something to reference.

use crate::device::Registry;
use crate::object::{ManagedObject, ObjectCore};

/// Volume managed object
#[derive(Debug, Clone)]
pub struct Volume {
    core: ObjectCore,
}

impl Volume {
    /// Create a volume of the given registered type
    pub fn new(type_name: &'static str) -> Self {
        Self {
            core: ObjectCore::new(type_name),
        }
    }
}

impl ManagedObject for Volume {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        &mut self.core
    }
}

/// Register the volume types that ship with the engine
pub fn register_builtin_volumes(registry: &mut Registry<Volume>) {
    registry.register("structured", || Volume::new("structured"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_structured_volume() {
        let mut registry = Registry::new("volume");
        register_builtin_volumes(&mut registry);
        let volume = registry.create("structured").unwrap();
        assert_eq!(volume.type_name(), "structured");
        assert!(!volume.core().is_committed());
    }
}
