//! Renderers
//!
//! A renderer turns the scene it is parameterized with into pixels in a
//! frame buffer. Two ship with the engine:
//!
//! - `"ray_cast"` resolves its `model` and `camera` parameters and asks the
//!   compute kernel to trace the frame
//! - `"test_frame"` writes a gradient that changes with the frame index and
//!   needs no scene at all

use crate::device::Registry;
use crate::foundation::math::Vec3;
use crate::framebuffer::FrameBuffer;
use crate::kernel::{ComputeKernel, FrameRequest, KernelError};
use crate::object::{ManagedObject, Object, ObjectArena, ObjectCore, ObjectError, ObjectKind, ObjectResult};
use thiserror::Error;

/// Rendering errors
#[derive(Debug, Error)]
pub enum RenderError {
    /// A scene object the renderer depends on is unusable
    #[error("scene error: {0}")]
    Object(#[from] ObjectError),

    /// The compute kernel failed to trace the frame
    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    /// An object was used before its parameters were committed
    #[error("{0} has uncommitted changes")]
    NotCommitted(&'static str),
}

/// State available to a renderer for one frame
pub struct RenderContext<'a> {
    objects: &'a ObjectArena,
    kernel: &'a mut dyn ComputeKernel,
    frame_index: u64,
}

impl<'a> RenderContext<'a> {
    /// Create a context for rendering frame `frame_index`
    pub fn new(objects: &'a ObjectArena, kernel: &'a mut dyn ComputeKernel, frame_index: u64) -> Self {
        Self {
            objects,
            kernel,
            frame_index,
        }
    }

    /// The object arena
    pub fn objects(&self) -> &'a ObjectArena {
        self.objects
    }

    /// The compute kernel
    pub fn kernel(&mut self) -> &mut dyn ComputeKernel {
        &mut *self.kernel
    }

    /// Index of the frame being rendered
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

/// Renderer instance created through the device
pub trait Renderer: ManagedObject {
    /// Render one frame into `frame`
    fn render_frame(&self, frame: &mut FrameBuffer, ctx: &mut RenderContext<'_>) -> Result<(), RenderError>;
}

/// Renderer that delegates tracing to the compute kernel
///
/// Parameters: `model` and `camera` (required object references),
/// `bgColor` (vec3f, default black).
#[derive(Debug, Clone)]
pub struct RayCastRenderer {
    core: ObjectCore,
}

impl RayCastRenderer {
    /// Registered type name
    pub const TYPE_NAME: &'static str = "ray_cast";

    /// Create an uncommitted renderer
    pub fn new() -> Self {
        Self {
            core: ObjectCore::new(Self::TYPE_NAME),
        }
    }
}

impl Default for RayCastRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ManagedObject for RayCastRenderer {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        &mut self.core
    }

    fn commit(&mut self) -> ObjectResult<()> {
        self.core.get_object("model", true)?;
        self.core.get_object("camera", true)?;
        self.core.get_vec3("bgColor", Vec3::zeros())?;
        self.core.mark_committed();
        Ok(())
    }
}

impl Renderer for RayCastRenderer {
    fn render_frame(&self, frame: &mut FrameBuffer, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        if !self.core.is_committed() {
            return Err(RenderError::NotCommitted(Self::TYPE_NAME));
        }

        let objects = ctx.objects();
        let (model, model_object) = objects.require_object(&self.core, "model", ObjectKind::Model)?;
        if !model_object.core().is_committed() {
            return Err(RenderError::NotCommitted("model"));
        }
        let camera = match objects.require_object(&self.core, "camera", ObjectKind::Camera)? {
            (_, Object::Camera(camera)) if camera.core().is_committed() => camera.view(),
            _ => return Err(RenderError::NotCommitted("camera")),
        };

        let request = FrameRequest {
            model,
            camera,
            background: self.core.get_vec3("bgColor", Vec3::zeros())?,
            frame_index: ctx.frame_index(),
        };
        ctx.kernel().trace_frame(&request, frame)?;
        Ok(())
    }
}

/// Renderer that paints a frame-dependent gradient without any scene
#[derive(Debug, Clone)]
pub struct TestFrameRenderer {
    core: ObjectCore,
}

impl TestFrameRenderer {
    /// Registered type name
    pub const TYPE_NAME: &'static str = "test_frame";

    /// Create an uncommitted renderer
    pub fn new() -> Self {
        Self {
            core: ObjectCore::new(Self::TYPE_NAME),
        }
    }
}

impl Default for TestFrameRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ManagedObject for TestFrameRenderer {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        &mut self.core
    }
}

impl Renderer for TestFrameRenderer {
    fn render_frame(&self, frame: &mut FrameBuffer, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        let shade = (ctx.frame_index() % 256) as u8;
        for y in 0..frame.height() {
            for x in 0..frame.width() {
                let texel = [(x % 256) as u8, (y % 256) as u8, shade, 255];
                if let Some(pixel) = frame.pixel_mut(x, y) {
                    let len = pixel.len().min(texel.len());
                    pixel[..len].copy_from_slice(&texel[..len]);
                }
            }
        }
        Ok(())
    }
}

/// Register the renderers that ship with the engine
pub fn register_builtin_renderers(registry: &mut Registry<Box<dyn Renderer>>) {
    registry.register(RayCastRenderer::TYPE_NAME, || Box::new(RayCastRenderer::new()));
    registry.register(TestFrameRenderer::TYPE_NAME, || Box::new(TestFrameRenderer::new()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec2u;
    use crate::kernel::NullKernel;
    use crate::object::ParamValue;

    #[test]
    fn test_ray_cast_commit_requires_model_and_camera() {
        let mut renderer = RayCastRenderer::new();
        let err = renderer.commit().unwrap_err();
        assert!(matches!(err, ObjectError::MissingParameter { object: "ray_cast", ref name } if name == "model"));
    }

    #[test]
    fn test_ray_cast_refuses_uncommitted() {
        let renderer = RayCastRenderer::new();
        let objects = ObjectArena::new();
        let mut kernel = NullKernel::new(0);
        let mut ctx = RenderContext::new(&objects, &mut kernel, 0);
        let mut frame = FrameBuffer::new_rgba_i8(Vec2u::new(1, 1));
        assert!(matches!(
            renderer.render_frame(&mut frame, &mut ctx),
            Err(RenderError::NotCommitted("ray_cast"))
        ));
    }

    #[test]
    fn test_ray_cast_reports_destroyed_model() {
        let mut objects = ObjectArena::new();
        let model = objects.insert(Object::Model(crate::scene::Model::new()));
        let camera = objects.insert(Object::Camera(Box::new(crate::render::PerspectiveCamera::new())));
        objects.release(model);

        let mut renderer = RayCastRenderer::new();
        renderer.core_mut().set("model", ParamValue::Object(model));
        renderer.core_mut().set("camera", ParamValue::Object(camera));
        renderer.commit().unwrap();

        let mut kernel = NullKernel::new(0);
        let mut ctx = RenderContext::new(&objects, &mut kernel, 0);
        let mut frame = FrameBuffer::new_rgba_i8(Vec2u::new(1, 1));
        assert!(matches!(
            renderer.render_frame(&mut frame, &mut ctx),
            Err(RenderError::Object(ObjectError::StaleReference { .. }))
        ));
    }

    #[test]
    fn test_test_frame_pattern() {
        let renderer = TestFrameRenderer::new();
        let objects = ObjectArena::new();
        let mut kernel = NullKernel::new(0);
        let mut ctx = RenderContext::new(&objects, &mut kernel, 7);
        let mut frame = FrameBuffer::new_rgba_i8(Vec2u::new(3, 2));
        renderer.render_frame(&mut frame, &mut ctx).unwrap();

        // pixel (2, 1)
        assert_eq!(&frame.pixels()[20..24], &[2, 1, 7, 255]);
    }
}
