//! Model
//!
//! A model holds an ordered list of geometry keys. The list is a lookup
//! relation only: attaching a geometry takes no reference on it, and a
//! geometry destroyed while attached is reported when the model next commits.

use crate::foundation::collections::ObjectHandle;
use crate::object::{CommitContext, ManagedObject, ObjectCore, ObjectError, ObjectResult};

/// Geometry container
#[derive(Debug, Clone)]
pub struct Model {
    core: ObjectCore,
    geometries: Vec<ObjectHandle>,
}

impl Model {
    /// Registered type name
    pub const TYPE_NAME: &'static str = "model";

    /// Create an empty model
    pub fn new() -> Self {
        Self {
            core: ObjectCore::new(Self::TYPE_NAME),
            geometries: Vec::new(),
        }
    }

    /// Append a geometry
    ///
    /// Attaching changes what the next commit finalizes, so the model returns
    /// to the uncommitted state.
    pub fn attach(&mut self, geometry: ObjectHandle) {
        self.geometries.push(geometry);
        self.core.mark_uncommitted();
    }

    /// Attached geometries in attachment order
    pub fn geometries(&self) -> &[ObjectHandle] {
        &self.geometries
    }

    /// Drop a geometry from the list, returning whether it was attached
    pub fn detach_geometry(&mut self, geometry: ObjectHandle) -> bool {
        let before = self.geometries.len();
        self.geometries.retain(|&attached| attached != geometry);
        let removed = self.geometries.len() != before;
        if removed {
            self.core.mark_uncommitted();
        }
        removed
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl ManagedObject for Model {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        &mut self.core
    }

    /// Finalize every attached geometry in attachment order, then let the
    /// kernel build its per-model state
    fn post_commit(&self, ctx: &mut CommitContext<'_>) -> ObjectResult<()> {
        let model = ctx.handle();
        let objects = ctx.objects();

        for (index, &handle) in self.geometries.iter().enumerate() {
            let geometry = objects.geometry(handle).ok_or_else(|| ObjectError::StaleReference {
                object: Self::TYPE_NAME,
                name: format!("geometry[{}]", index),
            })?;
            geometry.finalize(handle, model, ctx)?;
        }

        ctx.kernel().commit_model(model, &self.geometries)?;
        log::debug!("model {:?} finalized {} geometries", model, self.geometries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Geometry, TriangleMesh};
    use crate::kernel::recording::{KernelCall, RecordingKernel};
    use crate::object::{Object, ObjectArena};

    #[test]
    fn test_attach_keeps_order_and_uncommits() {
        let mut objects = ObjectArena::new();
        let handles: Vec<_> = (0..3)
            .map(|_| objects.insert(Object::Geometry(Geometry::new(Box::new(TriangleMesh)))))
            .collect();

        let mut model = Model::new();
        model.commit().unwrap();
        for &handle in &handles {
            model.attach(handle);
        }
        assert!(!model.core().is_committed());
        assert_eq!(model.geometries(), handles.as_slice());

        assert!(model.detach_geometry(handles[1]));
        assert!(!model.detach_geometry(handles[1]));
        assert_eq!(model.geometries(), &[handles[0], handles[2]]);
    }

    #[test]
    fn test_empty_model_commits_to_kernel() {
        let mut objects = ObjectArena::new();
        let handle = objects.insert(Object::Model(Model::new()));
        let model = Model::new();

        let (mut kernel, calls) = RecordingKernel::new();
        let mut ctx = CommitContext::new(handle, &objects, &mut kernel);
        model.post_commit(&mut ctx).unwrap();
        assert!(ctx.finalized().is_empty());

        assert_eq!(
            calls.lock().unwrap().as_slice(),
            &[KernelCall::CommitModel {
                model: handle,
                geometries: Vec::new()
            }]
        );
    }

    #[test]
    fn test_destroyed_geometry_is_stale() {
        let mut objects = ObjectArena::new();
        let handle = objects.insert(Object::Model(Model::new()));
        let geometry = objects.insert(Object::Geometry(Geometry::new(Box::new(TriangleMesh))));
        objects.release(geometry);

        let mut model = Model::new();
        model.attach(geometry);

        let (mut kernel, calls) = RecordingKernel::new();
        let mut ctx = CommitContext::new(handle, &objects, &mut kernel);
        assert!(matches!(
            model.post_commit(&mut ctx),
            Err(ObjectError::StaleReference { object: "model", .. })
        ));
        assert!(calls.lock().unwrap().is_empty());
    }
}
