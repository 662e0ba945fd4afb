//! # Ray Engine
//!
//! Object and device layer of a ray-tracing renderer.
//!
//! ## Features
//!
//! - **Managed Objects**: Reference-counted scene objects with named parameters
//!   and a two-phase commit
//! - **Opaque Handles**: Generational handles checked on every device call
//! - **Swap Chains**: Fixed-depth frame buffer rings with an explicit present step
//! - **Geometry Finalization**: Variants resolve their inputs, including
//!   references to other objects, when their model commits
//! - **Pluggable Kernel**: All numeric work goes through [`kernel::ComputeKernel`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ray_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut device = Device::from_env()?;
//!     let fb = device.create_frame_buffer(Vec2u::new(64, 64), FrameBufferMode::RgbaI8, 2);
//!
//!     let model = device.create_model();
//!     let mesh = device.create_triangle_mesh();
//!     // set "vertex" and "index" data on the mesh ...
//!     device.attach_geometry(model, mesh);
//!     device.commit(model)?;
//!
//!     let camera = device.create_camera("perspective");
//!     device.commit(camera)?;
//!
//!     let renderer = device.create_renderer("ray_cast");
//!     device.set_object(renderer, "model", model);
//!     device.set_object(renderer, "camera", camera);
//!     device.commit(renderer)?;
//!
//!     let token = device.render_frame(fb, renderer)?;
//!     device.present(token)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod device;
pub mod foundation;
pub mod framebuffer;
pub mod geometry;
pub mod kernel;
pub mod object;
pub mod render;
pub mod scene;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, DeviceConfig},
        device::{
            CameraHandle, DataHandle, Device, DeviceError, DeviceResult, FrameToken, GeometryHandle, ModelHandle,
            RendererHandle, VolumeHandle,
        },
        foundation::{
            collections::{FrameBufferHandle, ObjectHandle},
            math::{Vec2u, Vec3, Vec4},
        },
        framebuffer::FrameBufferMode,
        kernel::ComputeKernel,
        object::{DataFlags, DataType, ManagedObject, ObjectError},
    };
}
