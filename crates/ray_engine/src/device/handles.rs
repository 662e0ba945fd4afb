//! Typed handles returned by the device
//!
//! All object handles share one arena key space; the type parameter states
//! what the device expects the key to resolve to.

use crate::foundation::collections::{FrameBufferHandle, TypedHandle};
use crate::geometry::Geometry;
use crate::object::DataBuffer;
use crate::render::{Camera, Renderer};
use crate::scene::{Model, Volume};

/// Handle to a model
pub type ModelHandle = TypedHandle<Model>;
/// Handle to a geometry of any variant
pub type GeometryHandle = TypedHandle<Geometry>;
/// Handle to a data buffer
pub type DataHandle = TypedHandle<DataBuffer>;
/// Handle to a volume
pub type VolumeHandle = TypedHandle<Volume>;
/// Handle to a renderer
pub type RendererHandle = TypedHandle<dyn Renderer>;
/// Handle to a camera
pub type CameraHandle = TypedHandle<dyn Camera>;

/// Proof that a frame was rendered and is waiting to be presented
///
/// Returned by [`Device::render_frame`](super::Device::render_frame). The
/// back buffer stays out of reach of [`map`](crate::framebuffer::SwapChain::map)
/// until the token is handed to [`Device::present`](super::Device::present).
#[must_use = "a rendered frame is not visible until it is presented"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameToken {
    frame_buffer: FrameBufferHandle,
    frame: u64,
}

impl FrameToken {
    pub(crate) fn new(frame_buffer: FrameBufferHandle, frame: u64) -> Self {
        Self { frame_buffer, frame }
    }

    /// Frame buffer the frame was rendered into
    pub fn frame_buffer(&self) -> FrameBufferHandle {
        self.frame_buffer
    }

    /// Index of the rendered frame
    pub fn frame(&self) -> u64 {
        self.frame
    }
}
