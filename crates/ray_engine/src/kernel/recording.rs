//! Test double that records every kernel call in order

use super::{ComputeKernel, FrameRequest, KernelError, SlicesData, TriangleMeshData};
use crate::foundation::collections::ObjectHandle;
use crate::foundation::math::Vec4;
use crate::framebuffer::FrameBuffer;
use std::sync::{Arc, Mutex};

/// One recorded call
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum KernelCall {
    TriangleMesh {
        model: ObjectHandle,
        geometry: ObjectHandle,
        triangles: usize,
    },
    Slices {
        model: ObjectHandle,
        geometry: ObjectHandle,
        planes: Vec<Vec4>,
        volume: ObjectHandle,
    },
    CommitModel {
        model: ObjectHandle,
        geometries: Vec<ObjectHandle>,
    },
    TraceFrame {
        model: ObjectHandle,
        frame_index: u64,
    },
    Release(ObjectHandle),
}

/// Shared view of the calls a [`RecordingKernel`] received
pub(crate) type CallLog = Arc<Mutex<Vec<KernelCall>>>;

/// Kernel that logs calls and paints traced frames with a fixed color
#[derive(Debug, Default)]
pub(crate) struct RecordingKernel {
    calls: CallLog,
}

impl RecordingKernel {
    pub(crate) fn new() -> (Self, CallLog) {
        let kernel = Self::default();
        let calls = Arc::clone(&kernel.calls);
        (kernel, calls)
    }

    fn push(&self, call: KernelCall) {
        self.calls.lock().unwrap().push(call);
    }
}

/// Geometries handed over, in call order
pub(crate) fn finalized_order(calls: &CallLog) -> Vec<ObjectHandle> {
    calls
        .lock()
        .unwrap()
        .iter()
        .filter_map(|call| match call {
            KernelCall::TriangleMesh { geometry, .. } | KernelCall::Slices { geometry, .. } => Some(*geometry),
            _ => None,
        })
        .collect()
}

impl ComputeKernel for RecordingKernel {
    fn name(&self) -> &str {
        "recording"
    }

    fn set_triangle_mesh(
        &mut self,
        model: ObjectHandle,
        geometry: ObjectHandle,
        mesh: TriangleMeshData<'_>,
    ) -> Result<(), KernelError> {
        self.push(KernelCall::TriangleMesh {
            model,
            geometry,
            triangles: mesh.indices.len(),
        });
        Ok(())
    }

    fn set_slices(
        &mut self,
        model: ObjectHandle,
        geometry: ObjectHandle,
        slices: SlicesData<'_>,
    ) -> Result<(), KernelError> {
        self.push(KernelCall::Slices {
            model,
            geometry,
            planes: slices.planes.to_vec(),
            volume: slices.volume,
        });
        Ok(())
    }

    fn commit_model(&mut self, model: ObjectHandle, geometries: &[ObjectHandle]) -> Result<(), KernelError> {
        self.push(KernelCall::CommitModel {
            model,
            geometries: geometries.to_vec(),
        });
        Ok(())
    }

    fn trace_frame(&mut self, request: &FrameRequest, frame: &mut FrameBuffer) -> Result<(), KernelError> {
        self.push(KernelCall::TraceFrame {
            model: request.model,
            frame_index: request.frame_index,
        });
        frame.clear(Vec4::new(0.0, 1.0, 0.0, 1.0));
        Ok(())
    }

    fn release(&mut self, object: ObjectHandle) {
        self.push(KernelCall::Release(object));
    }
}
