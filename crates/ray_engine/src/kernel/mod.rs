//! # Compute Kernel Interface
//!
//! The numeric layer (ray traversal, shading, plane/volume intersection) is
//! an external collaborator. The object layer only resolves parameters and
//! hands the results over through [`ComputeKernel`]; it never computes
//! anything geometric itself.
//!
//! Geometries are keyed by their arena handle, so handing the same geometry
//! over again replaces the previous binding instead of adding a second one.

pub mod null;

#[cfg(test)]
pub(crate) mod recording;

pub use null::NullKernel;

use crate::foundation::collections::ObjectHandle;
use crate::foundation::math::{Vec3, Vec4};
use crate::framebuffer::FrameBuffer;
use crate::render::CameraView;
use thiserror::Error;

/// Errors reported by a compute kernel
#[derive(Debug, Error)]
pub enum KernelError {
    /// The kernel refused the inputs
    #[error("kernel rejected input: {0}")]
    Rejected(String),

    /// A frame referenced a model the kernel never saw committed
    #[error("unknown model {0:?}")]
    UnknownModel(ObjectHandle),
}

/// Resolved triangle mesh inputs
#[derive(Debug, Clone, Copy)]
pub struct TriangleMeshData<'a> {
    /// Vertex positions
    pub vertices: &'a [Vec3],
    /// Triangle vertex indices, all in range
    pub indices: &'a [[u32; 3]],
    /// Optional per-vertex normals, one per vertex
    pub normals: Option<&'a [Vec3]>,
    /// Optional per-vertex colors, one per vertex
    pub colors: Option<&'a [Vec4]>,
}

/// Resolved slicing-plane inputs
#[derive(Debug, Clone, Copy)]
pub struct SlicesData<'a> {
    /// Number of planes
    pub num_planes: usize,
    /// Plane equations `(a, b, c, d)`
    pub planes: &'a [Vec4],
    /// Volume the planes cut through
    pub volume: ObjectHandle,
}

/// Everything the kernel needs to trace one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRequest {
    /// Committed model to trace against
    pub model: ObjectHandle,
    /// Camera state at render time
    pub camera: CameraView,
    /// Background color for rays that miss
    pub background: Vec3,
    /// Index of the frame being produced
    pub frame_index: u64,
}

/// Opaque call target for all numeric work
pub trait ComputeKernel: Send {
    /// Human-readable kernel name
    fn name(&self) -> &str;

    /// Bind a triangle mesh to `model`
    fn set_triangle_mesh(
        &mut self,
        model: ObjectHandle,
        geometry: ObjectHandle,
        mesh: TriangleMeshData<'_>,
    ) -> Result<(), KernelError>;

    /// Bind a set of slicing planes through a volume to `model`
    fn set_slices(
        &mut self,
        model: ObjectHandle,
        geometry: ObjectHandle,
        slices: SlicesData<'_>,
    ) -> Result<(), KernelError>;

    /// Build whatever per-model structures the kernel needs after finalization
    fn commit_model(&mut self, model: ObjectHandle, geometries: &[ObjectHandle]) -> Result<(), KernelError>;

    /// Trace a frame into `frame`
    fn trace_frame(&mut self, request: &FrameRequest, frame: &mut FrameBuffer) -> Result<(), KernelError>;

    /// Forget everything bound to a destroyed object
    fn release(&mut self, object: ObjectHandle);
}
