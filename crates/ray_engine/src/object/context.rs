//! Commit context
//!
//! Passed to [`ManagedObject::post_commit`](super::ManagedObject::post_commit).
//! It gives read access to the whole arena and write access to the compute
//! kernel. Writes back into the arena are recorded here and applied by the
//! device once the hook returns.

use super::ObjectArena;
use crate::foundation::collections::ObjectHandle;
use crate::kernel::ComputeKernel;

/// State available to a post-commit hook
pub struct CommitContext<'a> {
    handle: ObjectHandle,
    objects: &'a ObjectArena,
    kernel: &'a mut dyn ComputeKernel,
    finalized: Vec<ObjectHandle>,
}

impl<'a> CommitContext<'a> {
    /// Create a context for committing `handle`
    pub fn new(handle: ObjectHandle, objects: &'a ObjectArena, kernel: &'a mut dyn ComputeKernel) -> Self {
        Self {
            handle,
            objects,
            kernel,
            finalized: Vec::new(),
        }
    }

    /// Handle of the object being committed
    pub fn handle(&self) -> ObjectHandle {
        self.handle
    }

    /// The object arena
    pub fn objects(&self) -> &'a ObjectArena {
        self.objects
    }

    /// The compute kernel
    pub fn kernel(&mut self) -> &mut dyn ComputeKernel {
        &mut *self.kernel
    }

    /// Record that a geometry finished finalization
    pub fn record_finalized(&mut self, geometry: ObjectHandle) {
        self.finalized.push(geometry);
    }

    /// Geometries finalized during this commit, in order
    pub fn finalized(&self) -> &[ObjectHandle] {
        &self.finalized
    }

    /// Consume the context, returning the finalized geometries
    pub fn into_finalized(self) -> Vec<ObjectHandle> {
        self.finalized
    }
}
