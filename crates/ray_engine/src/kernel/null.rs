//! Kernel that binds inputs but traces nothing
//!
//! Used when no numeric backend is linked in. It tracks which geometries
//! belong to which model so misuse still surfaces, and fills every traced
//! frame with the background color.

use super::{ComputeKernel, FrameRequest, KernelError, SlicesData, TriangleMeshData};
use crate::foundation::collections::ObjectHandle;
use crate::foundation::math::Vec4;
use crate::framebuffer::FrameBuffer;
use std::collections::{HashMap, HashSet};

/// No-op compute kernel
#[derive(Debug, Default)]
pub struct NullKernel {
    bindings: HashMap<ObjectHandle, ObjectHandle>,
    models: HashSet<ObjectHandle>,
}

impl NullKernel {
    /// Create a kernel; there is no work to spread over `threads`
    pub fn new(threads: usize) -> Self {
        log::debug!("null kernel created ({} worker threads requested, none used)", threads);
        Self::default()
    }
}

impl ComputeKernel for NullKernel {
    fn name(&self) -> &str {
        "null"
    }

    fn set_triangle_mesh(
        &mut self,
        model: ObjectHandle,
        geometry: ObjectHandle,
        mesh: TriangleMeshData<'_>,
    ) -> Result<(), KernelError> {
        log::trace!("null kernel: {} triangles for {:?}", mesh.indices.len(), geometry);
        self.bindings.insert(geometry, model);
        Ok(())
    }

    fn set_slices(
        &mut self,
        model: ObjectHandle,
        geometry: ObjectHandle,
        slices: SlicesData<'_>,
    ) -> Result<(), KernelError> {
        log::trace!("null kernel: {} planes for {:?}", slices.num_planes, geometry);
        self.bindings.insert(geometry, model);
        Ok(())
    }

    fn commit_model(&mut self, model: ObjectHandle, geometries: &[ObjectHandle]) -> Result<(), KernelError> {
        if let Some(unbound) = geometries.iter().find(|&geometry| self.bindings.get(geometry) != Some(&model)) {
            return Err(KernelError::Rejected(format!("geometry {:?} is not bound to model {:?}", unbound, model)));
        }
        self.models.insert(model);
        Ok(())
    }

    fn trace_frame(&mut self, request: &FrameRequest, frame: &mut FrameBuffer) -> Result<(), KernelError> {
        if !self.models.contains(&request.model) {
            return Err(KernelError::UnknownModel(request.model));
        }
        let background = request.background;
        frame.clear(Vec4::new(background.x, background.y, background.z, 1.0));
        Ok(())
    }

    fn release(&mut self, object: ObjectHandle) {
        self.bindings.remove(&object);
        self.bindings.retain(|_, model| *model != object);
        self.models.remove(&object);
    }
}
