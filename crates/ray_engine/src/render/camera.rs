//! Cameras
//!
//! A camera resolves its parameters into a [`CameraView`] at commit time.
//! Ray generation from that view is the kernel's business.

use crate::device::Registry;
use crate::foundation::math::{utils, Vec3};
use crate::object::{ManagedObject, ObjectCore, ObjectResult};

/// Camera state handed to the kernel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    /// Eye position in world space
    pub position: Vec3,
    /// Normalized viewing direction
    pub direction: Vec3,
    /// Normalized up vector
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fovy: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
}

impl Default for CameraView {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            direction: Vec3::new(0.0, 0.0, 1.0),
            up: Vec3::new(0.0, 1.0, 0.0),
            fovy: utils::deg_to_rad(60.0),
            aspect: 1.0,
        }
    }
}

/// Camera instance created through the device
pub trait Camera: ManagedObject {
    /// View resolved by the last commit
    fn view(&self) -> CameraView;
}

/// Pinhole perspective camera
///
/// Parameters: `pos`, `dir`, `up` (vec3f), `fovy` (degrees), `aspect`.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    core: ObjectCore,
    view: CameraView,
}

impl PerspectiveCamera {
    /// Registered type name
    pub const TYPE_NAME: &'static str = "perspective";

    /// Create a camera with the default view
    pub fn new() -> Self {
        Self {
            core: ObjectCore::new(Self::TYPE_NAME),
            view: CameraView::default(),
        }
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl ManagedObject for PerspectiveCamera {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        &mut self.core
    }

    fn commit(&mut self) -> ObjectResult<()> {
        let defaults = CameraView::default();
        let position = self.core.get_vec3("pos", defaults.position)?;
        let direction = self.core.get_vec3("dir", defaults.direction)?;
        let up = self.core.get_vec3("up", defaults.up)?;
        let fovy = self.core.get_f32("fovy", 60.0)?;
        let aspect = self.core.get_f32("aspect", defaults.aspect)?;

        if !(fovy > 0.0 && fovy < 180.0) {
            return Err(self.core.invalid_data("fovy", format!("{fovy} is outside (0, 180) degrees")));
        }
        if aspect <= 0.0 {
            return Err(self.core.invalid_data("aspect", format!("{aspect} is not positive")));
        }

        self.view = CameraView {
            position,
            direction: utils::normalize_or(direction, defaults.direction),
            up: utils::normalize_or(up, defaults.up),
            fovy: utils::deg_to_rad(fovy),
            aspect,
        };
        self.core.mark_committed();
        Ok(())
    }
}

impl Camera for PerspectiveCamera {
    fn view(&self) -> CameraView {
        self.view
    }
}

/// Register the cameras that ship with the engine
pub fn register_builtin_cameras(registry: &mut Registry<Box<dyn Camera>>) {
    registry.register(PerspectiveCamera::TYPE_NAME, || Box::new(PerspectiveCamera::new()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{ObjectError, ParamValue};
    use approx::assert_relative_eq;

    #[test]
    fn test_commit_resolves_view() {
        let mut camera = PerspectiveCamera::new();
        camera.core_mut().set("pos", ParamValue::Vec3(Vec3::new(0.0, 0.0, -5.0)));
        camera.core_mut().set("dir", ParamValue::Vec3(Vec3::new(0.0, 0.0, 10.0)));
        camera.core_mut().set("fovy", ParamValue::Float(90.0));
        camera.core_mut().set("aspect", ParamValue::Float(2.0));
        camera.commit().unwrap();

        let view = camera.view();
        assert_eq!(view.position, Vec3::new(0.0, 0.0, -5.0));
        assert_relative_eq!(view.direction.z, 1.0, epsilon = 1e-6);
        assert_relative_eq!(view.fovy, std::f32::consts::FRAC_PI_2, epsilon = 1e-6);
        assert_relative_eq!(view.aspect, 2.0);
        assert!(camera.core().is_committed());
    }

    #[test]
    fn test_commit_rejects_bad_fovy() {
        let mut camera = PerspectiveCamera::new();
        camera.core_mut().set("fovy", ParamValue::Float(0.0));
        assert!(matches!(camera.commit(), Err(ObjectError::InvalidData { .. })));
        assert!(!camera.core().is_committed());
    }

    #[test]
    fn test_defaults_without_params() {
        let mut camera = PerspectiveCamera::new();
        camera.commit().unwrap();
        assert_eq!(camera.view(), CameraView::default());
    }
}
