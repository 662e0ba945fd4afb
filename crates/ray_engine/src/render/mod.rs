//! # Renderers and Cameras
//!
//! Renderer and camera instances are created by type name from registries.
//! Their algorithms belong to the compute kernel; the types here only
//! resolve parameters and forward work.

pub mod camera;
pub mod renderer;

pub use camera::{register_builtin_cameras, Camera, CameraView, PerspectiveCamera};
pub use renderer::{
    register_builtin_renderers, RayCastRenderer, RenderContext, RenderError, Renderer, TestFrameRenderer,
};
