//! # Geometry
//!
//! A [`Geometry`] is a managed object whose behaviour comes from a
//! [`GeometryVariant`]. Variants differ only in which parameters they resolve
//! and what they hand to the compute kernel.
//!
//! ## State machine
//!
//! ```text
//! Unattached ──attach(model)──> Attached ──model commit──> Finalized
//!                                   ^                          │
//!                                   └────── set(name, ..) ─────┘
//! ```
//!
//! Finalization runs only from the owning model's commit, once per commit, in
//! attachment order. During the pass the arena is borrowed immutably; the
//! finalized flag is written back by the device afterwards.

pub mod slices;
pub mod triangle_mesh;

pub use slices::Slices;
pub use triangle_mesh::TriangleMesh;

use crate::device::Registry;
use crate::foundation::collections::ObjectHandle;
use crate::object::{CommitContext, ManagedObject, ObjectCore, ObjectError, ObjectResult};
use std::fmt;

/// Where a geometry is in its attach/finalize lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryState {
    /// Not attached to any model
    Unattached,
    /// Attached, waiting for the model's next commit
    Attached,
    /// Resolved and handed to the compute kernel
    Finalized,
}

/// Behaviour of one geometry type
pub trait GeometryVariant: Send + fmt::Debug {
    /// Registered type name
    fn type_name(&self) -> &'static str;

    /// Parameters that must be present before commit
    fn required_params(&self) -> &'static [&'static str];

    /// Resolve parameters and hand the result to the compute kernel
    ///
    /// # Arguments
    ///
    /// * `core` - Parameters of the geometry being finalized
    /// * `model` - Model the geometry is attached to
    /// * `geometry` - Arena key of the geometry itself
    /// * `ctx` - Arena view and kernel access
    fn finalize(
        &self,
        core: &ObjectCore,
        model: ObjectHandle,
        geometry: ObjectHandle,
        ctx: &mut CommitContext<'_>,
    ) -> ObjectResult<()>;
}

/// Geometry managed object
#[derive(Debug)]
pub struct Geometry {
    core: ObjectCore,
    variant: Box<dyn GeometryVariant>,
    model: Option<ObjectHandle>,
    finalized: bool,
}

impl Geometry {
    /// Create an unattached geometry of the given variant
    pub fn new(variant: Box<dyn GeometryVariant>) -> Self {
        Self {
            core: ObjectCore::new(variant.type_name()),
            variant,
            model: None,
            finalized: false,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> GeometryState {
        match (self.model, self.finalized) {
            (None, _) => GeometryState::Unattached,
            (Some(_), false) => GeometryState::Attached,
            (Some(_), true) => GeometryState::Finalized,
        }
    }

    /// Model this geometry is attached to
    pub fn model(&self) -> Option<ObjectHandle> {
        self.model
    }

    /// Attach to `model`
    ///
    /// A geometry belongs to at most one model; a second attach fails with
    /// [`ObjectError::AlreadyAttached`].
    pub fn attach_to(&mut self, model: ObjectHandle) -> ObjectResult<()> {
        if let Some(current) = self.model {
            return Err(ObjectError::AlreadyAttached {
                object: self.core.type_name(),
                model: current,
            });
        }
        self.model = Some(model);
        self.finalized = false;
        Ok(())
    }

    /// Detach from the owning model, if any
    pub fn detach(&mut self) {
        self.model = None;
        self.finalized = false;
    }

    /// Run the variant's finalize step on behalf of `model`
    pub fn finalize(&self, geometry: ObjectHandle, model: ObjectHandle, ctx: &mut CommitContext<'_>) -> ObjectResult<()> {
        log::debug!("finalizing {} {:?} for model {:?}", self.core.type_name(), geometry, model);
        self.variant.finalize(&self.core, model, geometry, ctx)?;
        ctx.record_finalized(geometry);
        Ok(())
    }

    /// Record a successful finalize pass
    pub fn mark_finalized(&mut self) {
        if self.model.is_some() {
            self.finalized = true;
        }
    }

    /// Require the next model commit to finalize again
    pub fn mark_unfinalized(&mut self) {
        self.finalized = false;
    }
}

impl ManagedObject for Geometry {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        &mut self.core
    }

    fn commit(&mut self) -> ObjectResult<()> {
        self.core.require(self.variant.required_params())?;
        self.core.mark_committed();
        Ok(())
    }
}

/// Register the geometry variants that ship with the engine
pub fn register_builtin_geometries(registry: &mut Registry<Geometry>) {
    registry.register(TriangleMesh::TYPE_NAME, || Geometry::new(Box::new(TriangleMesh)));
    registry.register(Slices::TYPE_NAME, || Geometry::new(Box::new(Slices)));
}
