//! # Device
//!
//! The single entry point of the engine. The device owns every managed object,
//! every swap chain and the compute kernel, and translates the handles it hands
//! out back into typed objects on each call.
//!
//! ## Failure tiers
//!
//! - A stale handle, a handle of the wrong kind, an unsupported frame buffer
//!   mode or data flag, or an unknown type name is a contract violation and
//!   terminates (see [`contract`]).
//! - Scene-authoring mistakes (missing parameters, bad data) and swap chain
//!   state errors are returned as [`DeviceError`].
//!
//! ## Frame protocol
//!
//! ```text
//! render_frame(fb, renderer) ──> FrameToken ──> present(token) ──> map_frame_buffer(fb)
//! ```
//!
//! Rendering writes the back buffer; presenting rotates the ring so the new
//! frame becomes the front buffer. [`Device::render_and_present`] does both.
//!
//! ## Usage
//!
//! ```
//! use ray_engine::prelude::*;
//!
//! let mut device = Device::new(DeviceConfig::new()).unwrap();
//! let fb = device.create_frame_buffer(Vec2u::new(8, 8), FrameBufferMode::RgbaI8, 2);
//! let renderer = device.create_renderer("test_frame");
//!
//! let token = device.render_frame(fb, renderer).unwrap();
//! device.present(token).unwrap();
//!
//! let pixels = device.map_frame_buffer(fb).unwrap();
//! assert_eq!(pixels.len(), 8 * 8 * 4);
//! let mapped = pixels.as_ptr();
//! device.unmap_frame_buffer(mapped, fb).unwrap();
//! ```
//!
//! [`contract`]: crate::foundation::contract

pub mod handles;
pub mod registry;


pub use handles::{
    CameraHandle, DataHandle, FrameToken, GeometryHandle, ModelHandle, RendererHandle, VolumeHandle,
};
pub use registry::{Factory, Registry};

use crate::config::{ConfigError, DeviceConfig};
use crate::foundation::collections::{FrameBufferHandle, ObjectHandle, SlotMap, TypedHandle};
use crate::foundation::contract::{violation, Expect};
use crate::foundation::logging;
use crate::foundation::math::{Vec2u, Vec3, Vec4};
use crate::framebuffer::{factory_for, FrameBufferMode, SwapChain, SwapChainError};
use crate::geometry::{register_builtin_geometries, Geometry, TriangleMesh};
use crate::kernel::{ComputeKernel, NullKernel};
use crate::object::{
    CommitContext, DataBuffer, DataFlags, DataType, ManagedObject, Object, ObjectArena, ObjectError, ParamValue,
    Released,
};
use crate::render::{register_builtin_cameras, register_builtin_renderers, Camera, RenderContext, RenderError, Renderer};
use crate::scene::{register_builtin_volumes, Model, Volume};
use thiserror::Error;

/// Recoverable device errors
#[derive(Debug, Error)]
pub enum DeviceError {
    /// Object validation or finalization failed
    #[error("object error: {0}")]
    Object(#[from] ObjectError),

    /// Rendering a frame failed
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// The swap chain is not in a state that allows the operation
    #[error("swap chain error: {0}")]
    SwapChain(#[from] SwapChainError),

    /// The device configuration is invalid
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for device operations
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Rendering device
pub struct Device {
    config: DeviceConfig,
    verbosity: u32,
    objects: ObjectArena,
    swap_chains: SlotMap<FrameBufferHandle, SwapChain>,
    kernel: Box<dyn ComputeKernel>,
    geometries: Registry<Geometry>,
    volumes: Registry<Volume>,
    renderers: Registry<Box<dyn Renderer>>,
    cameras: Registry<Box<dyn Camera>>,
}

impl Device {
    /// Create a device backed by the [`NullKernel`]
    pub fn new(config: DeviceConfig) -> DeviceResult<Self> {
        let kernel = NullKernel::new(config.kernel_threads);
        Self::with_kernel(config, Box::new(kernel))
    }

    /// Create a device with the default configuration and the log level
    /// taken from the environment
    pub fn from_env() -> DeviceResult<Self> {
        Self::new(DeviceConfig::from_env())
    }

    /// Create a device that hands numeric work to `kernel`
    ///
    /// # Arguments
    ///
    /// * `config` - Validated before anything else happens
    /// * `kernel` - Compute kernel receiving finalized geometry and frame requests
    pub fn with_kernel(config: DeviceConfig, kernel: Box<dyn ComputeKernel>) -> DeviceResult<Self> {
        config.validate()?;
        let verbosity = logging::install_verbosity(config.resolved_log_level());

        let mut geometries = Registry::new("geometry");
        register_builtin_geometries(&mut geometries);
        let mut volumes = Registry::new("volume");
        register_builtin_volumes(&mut volumes);
        let mut renderers = Registry::new("renderer");
        register_builtin_renderers(&mut renderers);
        let mut cameras = Registry::new("camera");
        register_builtin_cameras(&mut cameras);

        log::info!("Device created (kernel: {}, verbosity: {})", kernel.name(), verbosity);

        Ok(Self {
            config,
            verbosity,
            objects: ObjectArena::new(),
            swap_chains: SlotMap::with_key(),
            kernel,
            geometries,
            volumes,
            renderers,
            cameras,
        })
    }

    /// Configuration the device was created with
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Process-wide verbosity level in force
    pub fn verbosity(&self) -> u32 {
        self.verbosity
    }

    /// Name of the compute kernel
    pub fn kernel_name(&self) -> &str {
        self.kernel.name()
    }

    /// Read access to every managed object
    pub fn objects(&self) -> &ObjectArena {
        &self.objects
    }

    // ------------------------------------------------------------------
    // Frame buffers
    // ------------------------------------------------------------------

    /// Create a frame buffer backed by a swap chain
    ///
    /// # Arguments
    ///
    /// * `size` - Resolution of every buffer in the chain
    /// * `mode` - Pixel mode; only [`FrameBufferMode::RgbaI8`] is supported
    /// * `depth` - Number of buffers in the ring, at least 1
    pub fn create_frame_buffer(&mut self, size: Vec2u, mode: FrameBufferMode, depth: usize) -> FrameBufferHandle {
        let factory =
            factory_for(mode).unwrap_or_else(|| violation(format_args!("unsupported frame buffer mode {:?}", mode)));
        let chain = SwapChain::new(depth, size, factory).or_violation("create_frame_buffer");
        let handle = self.swap_chains.insert(chain);
        log::info!("Created {}x{} {:?} frame buffer, depth {}", size.x, size.y, mode, depth);
        handle
    }

    /// Swap chain behind a frame buffer handle
    pub fn swap_chain(&self, frame_buffer: FrameBufferHandle) -> &SwapChain {
        self.swap_chains
            .get(frame_buffer)
            .unwrap_or_else(|| violation(format_args!("invalid frame buffer handle {:?}", frame_buffer)))
    }

    fn swap_chain_mut(&mut self, frame_buffer: FrameBufferHandle) -> &mut SwapChain {
        self.swap_chains
            .get_mut(frame_buffer)
            .unwrap_or_else(|| violation(format_args!("invalid frame buffer handle {:?}", frame_buffer)))
    }

    /// Map the front buffer for reading
    ///
    /// The returned storage belongs to the front buffer and stays valid until
    /// [`unmap_frame_buffer`](Self::unmap_frame_buffer).
    pub fn map_frame_buffer(&mut self, frame_buffer: FrameBufferHandle) -> DeviceResult<&[u8]> {
        Ok(self.swap_chain_mut(frame_buffer).map()?)
    }

    /// Release a mapping; `mapped` must be the pointer the last map returned
    pub fn unmap_frame_buffer(&mut self, mapped: *const u8, frame_buffer: FrameBufferHandle) -> DeviceResult<()> {
        Ok(self.swap_chain_mut(frame_buffer).unmap(mapped)?)
    }

    /// Fill every buffer of the chain with `color`
    pub fn clear_frame_buffer(&mut self, frame_buffer: FrameBufferHandle, color: Vec4) -> DeviceResult<()> {
        Ok(self.swap_chain_mut(frame_buffer).clear(color)?)
    }

    /// Destroy a frame buffer and all buffers of its swap chain
    pub fn release_frame_buffer(&mut self, frame_buffer: FrameBufferHandle) {
        self.swap_chains
            .remove(frame_buffer)
            .unwrap_or_else(|| violation(format_args!("invalid frame buffer handle {:?}", frame_buffer)));
        log::info!("Released frame buffer {:?}", frame_buffer);
    }

    // ------------------------------------------------------------------
    // Object creation
    // ------------------------------------------------------------------

    fn insert(&mut self, object: Object) -> ObjectHandle {
        let (kind, type_name) = (object.kind(), object.type_name());
        let handle = self.objects.insert(object);
        log::info!("Created {} '{}' {:?}", kind, type_name, handle);
        handle
    }

    /// Create an empty model
    pub fn create_model(&mut self) -> ModelHandle {
        TypedHandle::new(self.insert(Object::Model(Model::new())))
    }

    /// Create a triangle mesh geometry
    pub fn create_triangle_mesh(&mut self) -> GeometryHandle {
        self.create_geometry(TriangleMesh::TYPE_NAME)
    }

    /// Create a geometry of a registered variant
    pub fn create_geometry(&mut self, type_name: &str) -> GeometryHandle {
        let geometry = self
            .geometries
            .create(type_name)
            .unwrap_or_else(|| unknown_type(&self.geometries, type_name));
        TypedHandle::new(self.insert(Object::Geometry(geometry)))
    }

    /// Create a data buffer
    ///
    /// # Arguments
    ///
    /// * `num_items` - Element count
    /// * `format` - Element type
    /// * `init` - Initial contents, exactly `num_items` elements; zero-filled when `None`
    /// * `flags` - Must be empty; no flag is supported yet
    pub fn create_data(
        &mut self,
        num_items: usize,
        format: DataType,
        init: Option<&[u8]>,
        flags: DataFlags,
    ) -> DataHandle {
        let data = DataBuffer::new(num_items, format, init, flags).or_violation("create_data");
        TypedHandle::new(self.insert(Object::Data(data)))
    }

    /// Create a volume of a registered type
    pub fn create_volume(&mut self, type_name: &str) -> VolumeHandle {
        let volume = self
            .volumes
            .create(type_name)
            .unwrap_or_else(|| unknown_type(&self.volumes, type_name));
        TypedHandle::new(self.insert(Object::Volume(volume)))
    }

    /// Create a renderer of a registered type
    pub fn create_renderer(&mut self, type_name: &str) -> RendererHandle {
        let renderer = self
            .renderers
            .create(type_name)
            .unwrap_or_else(|| unknown_type(&self.renderers, type_name));
        TypedHandle::new(self.insert(Object::Renderer(renderer)))
    }

    /// Create a camera of a registered type
    pub fn create_camera(&mut self, type_name: &str) -> CameraHandle {
        let camera = self
            .cameras
            .create(type_name)
            .unwrap_or_else(|| unknown_type(&self.cameras, type_name));
        TypedHandle::new(self.insert(Object::Camera(camera)))
    }

    /// Register a geometry variant under `name`
    pub fn register_geometry(&mut self, name: &str, factory: Factory<Geometry>) {
        self.geometries.register(name, factory);
    }

    /// Register a volume type under `name`
    pub fn register_volume(&mut self, name: &str, factory: Factory<Volume>) {
        self.volumes.register(name, factory);
    }

    /// Register a renderer type under `name`
    pub fn register_renderer(&mut self, name: &str, factory: Factory<Box<dyn Renderer>>) {
        self.renderers.register(name, factory);
    }

    /// Register a camera type under `name`
    pub fn register_camera(&mut self, name: &str, factory: Factory<Box<dyn Camera>>) {
        self.cameras.register(name, factory);
    }

    // ------------------------------------------------------------------
    // Lifetime
    // ------------------------------------------------------------------

    /// Whether `handle` refers to a live object
    pub fn contains(&self, handle: impl Into<ObjectHandle>) -> bool {
        self.objects.contains(handle.into())
    }

    /// Number of live objects
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Reference count of a live object
    pub fn ref_count(&self, handle: impl Into<ObjectHandle>) -> usize {
        let handle = handle.into();
        self.objects
            .ref_count(handle)
            .unwrap_or_else(|| violation(format_args!("ref_count: invalid handle {:?}", handle)))
    }

    /// Add a reference, returning the new count
    pub fn retain(&mut self, handle: impl Into<ObjectHandle>) -> usize {
        let handle = handle.into();
        self.objects
            .retain(handle)
            .unwrap_or_else(|| violation(format_args!("retain: invalid handle {:?}", handle)))
    }

    /// Drop a reference; the last one destroys the object
    ///
    /// Destroying a model detaches its geometries. Destroying a geometry
    /// removes it from its model, which then has to be committed again.
    pub fn release(&mut self, handle: impl Into<ObjectHandle>) {
        let handle = handle.into();
        let released = self
            .objects
            .release(handle)
            .unwrap_or_else(|| violation(format_args!("release: invalid handle {:?}", handle)));

        match released {
            Released::Alive(count) => log::debug!("Released {:?}, {} references left", handle, count),
            Released::Destroyed(object) => self.destroyed(handle, object),
        }
    }

    fn destroyed(&mut self, handle: ObjectHandle, object: Object) {
        self.kernel.release(handle);
        match &object {
            Object::Model(model) => {
                for &geometry in model.geometries() {
                    if let Some(geometry) = self.objects.geometry_mut(geometry) {
                        if geometry.model() == Some(handle) {
                            geometry.detach();
                        }
                    }
                }
            }
            Object::Geometry(geometry) => {
                if let Some(model) = geometry.model().and_then(|model| self.objects.model_mut(model)) {
                    model.detach_geometry(handle);
                }
            }
            _ => {}
        }
        log::info!("Destroyed {} '{}' {:?}", object.kind(), object.type_name(), handle);
    }

    // ------------------------------------------------------------------
    // Parameters and commit
    // ------------------------------------------------------------------

    fn object_mut(&mut self, handle: ObjectHandle, operation: &str) -> &mut Object {
        self.objects
            .get_mut(handle)
            .unwrap_or_else(|| violation(format_args!("{}: invalid handle {:?}", operation, handle)))
    }

    fn set_param(&mut self, handle: ObjectHandle, name: &str, value: ParamValue) {
        log::debug!("{:?}.{} = {:?}", handle, name, value);
        let object = self.object_mut(handle, "set");
        object.core_mut().set(name, value);
        let owner = match object {
            Object::Geometry(geometry) => {
                geometry.mark_unfinalized();
                geometry.model()
            }
            _ => None,
        };
        // The kernel still holds the old geometry until the model commits again.
        if let Some(model) = owner.and_then(|model| self.objects.model_mut(model)) {
            model.core_mut().mark_uncommitted();
        }
    }

    /// Set a float parameter
    pub fn set_float(&mut self, handle: impl Into<ObjectHandle>, name: &str, value: f32) {
        self.set_param(handle.into(), name, ParamValue::Float(value));
    }

    /// Set an integer parameter
    pub fn set_int(&mut self, handle: impl Into<ObjectHandle>, name: &str, value: i32) {
        self.set_param(handle.into(), name, ParamValue::Int(value));
    }

    /// Set a 3-vector parameter
    pub fn set_vec3f(&mut self, handle: impl Into<ObjectHandle>, name: &str, value: Vec3) {
        self.set_param(handle.into(), name, ParamValue::Vec3(value));
    }

    /// Set a string parameter
    pub fn set_string(&mut self, handle: impl Into<ObjectHandle>, name: &str, value: &str) {
        self.set_param(handle.into(), name, ParamValue::String(value.to_string()));
    }

    /// Set an object-reference parameter
    ///
    /// The reference takes no ownership. Data buffers are stored as data
    /// references, everything else as object references.
    pub fn set_object(&mut self, handle: impl Into<ObjectHandle>, name: &str, value: impl Into<ObjectHandle>) {
        let value = value.into();
        let param = match self.objects.get(value) {
            Some(Object::Data(_)) => ParamValue::Data(value),
            Some(_) => ParamValue::Object(value),
            None => violation(format_args!("set_object '{}': invalid value handle {:?}", name, value)),
        };
        self.set_param(handle.into(), name, param);
    }

    /// Commit an object
    ///
    /// Runs the object's own validation, then its post-commit hook. For a
    /// model the hook finalizes every attached geometry in attachment order.
    /// On failure the object stays uncommitted and the error is returned.
    pub fn commit(&mut self, handle: impl Into<ObjectHandle>) -> DeviceResult<()> {
        let handle = handle.into();
        if let Err(err) = self.object_mut(handle, "commit").commit() {
            log::warn!("Commit of {:?} failed: {}", handle, err);
            return Err(err.into());
        }

        let object = self
            .objects
            .get(handle)
            .unwrap_or_else(|| violation(format_args!("commit: invalid handle {:?}", handle)));
        let mut ctx = CommitContext::new(handle, &self.objects, &mut *self.kernel);
        let result = object.post_commit(&mut ctx);
        let finalized = ctx.into_finalized();

        for geometry in finalized {
            if let Some(geometry) = self.objects.geometry_mut(geometry) {
                geometry.mark_finalized();
            }
        }

        if let Err(err) = result {
            log::warn!("Post-commit of {:?} failed: {}", handle, err);
            self.object_mut(handle, "commit").core_mut().mark_uncommitted();
            return Err(err.into());
        }
        log::debug!("Committed {:?}", handle);
        Ok(())
    }

    /// Append `geometry` to `model`
    ///
    /// Takes no reference on the geometry. A geometry can belong to one model
    /// only; attaching it again is a contract violation.
    pub fn attach_geometry(&mut self, model: ModelHandle, geometry: GeometryHandle) {
        let (model, geometry) = (model.key(), geometry.key());
        if self.objects.model(model).is_none() {
            violation(format_args!("attach_geometry: invalid model handle {:?}", model));
        }
        self.objects
            .geometry_mut(geometry)
            .unwrap_or_else(|| violation(format_args!("attach_geometry: invalid geometry handle {:?}", geometry)))
            .attach_to(model)
            .or_violation("attach_geometry");
        if let Some(model) = self.objects.model_mut(model) {
            model.attach(geometry);
        }
        log::debug!("Attached {:?} to {:?}", geometry, model);
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Render one frame into the back buffer of `frame_buffer`
    ///
    /// The frame is not visible until the returned token is passed to
    /// [`present`](Self::present). A failed render leaves the ring untouched.
    pub fn render_frame(&mut self, frame_buffer: FrameBufferHandle, renderer: RendererHandle) -> DeviceResult<FrameToken> {
        let renderer = self
            .objects
            .renderer(renderer.key())
            .unwrap_or_else(|| violation(format_args!("render_frame: invalid renderer handle {:?}", renderer)));
        let chain = self
            .swap_chains
            .get_mut(frame_buffer)
            .unwrap_or_else(|| violation(format_args!("invalid frame buffer handle {:?}", frame_buffer)));

        let frame = chain.begin_frame()?;
        let mut ctx = RenderContext::new(&self.objects, &mut *self.kernel, frame);
        match renderer.render_frame(chain.back_buffer_mut(), &mut ctx) {
            Ok(()) => Ok(FrameToken::new(frame_buffer, frame)),
            Err(err) => {
                log::warn!("Frame {} failed: {}", frame, err);
                chain.abort_frame(frame);
                Err(err.into())
            }
        }
    }

    /// Make a rendered frame the front buffer
    pub fn present(&mut self, token: FrameToken) -> DeviceResult<()> {
        self.swap_chain_mut(token.frame_buffer()).present(token.frame())?;
        log::trace!("Presented frame {} on {:?}", token.frame(), token.frame_buffer());
        Ok(())
    }

    /// Render and immediately present one frame
    ///
    /// If the frame cannot be presented (for example because the front
    /// buffer is mapped) it is dropped and the ring stays where it was.
    pub fn render_and_present(&mut self, frame_buffer: FrameBufferHandle, renderer: RendererHandle) -> DeviceResult<()> {
        let token = self.render_frame(frame_buffer, renderer)?;
        if let Err(err) = self.present(token) {
            log::warn!("Frame {} dropped: {}", token.frame(), err);
            self.swap_chain_mut(frame_buffer).abort_frame(token.frame());
            return Err(err);
        }
        Ok(())
    }
}

fn unknown_type<T>(registry: &Registry<T>, type_name: &str) -> ! {
    violation(format_args!(
        "unknown {} type '{}' (registered: {})",
        registry.kind(),
        type_name,
        registry.names().join(", ")
    ))
}
