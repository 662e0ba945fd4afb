//! Slicing-plane geometry
//!
//! Cuts a volume with a set of planes. Both inputs are resolved at finalize
//! time: `planes` is a Float4 data buffer of plane equations `(a, b, c, d)`
//! and `volume` is an object reference to a volume. Either one missing fails
//! the finalize before the compute kernel sees anything.

use super::GeometryVariant;
use crate::foundation::collections::ObjectHandle;
use crate::kernel::SlicesData;
use crate::object::{CommitContext, ObjectCore, ObjectKind, ObjectResult};

/// Set of planes slicing through a volume
#[derive(Debug, Clone, Copy, Default)]
pub struct Slices;

impl Slices {
    /// Registered type name
    pub const TYPE_NAME: &'static str = "slices";
}

impl GeometryVariant for Slices {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn required_params(&self) -> &'static [&'static str] {
        &["planes", "volume"]
    }

    fn finalize(
        &self,
        core: &ObjectCore,
        model: ObjectHandle,
        geometry: ObjectHandle,
        ctx: &mut CommitContext<'_>,
    ) -> ObjectResult<()> {
        let objects = ctx.objects();
        let planes = objects.require_data(core, "planes")?.to_vec4s(core, "planes")?;
        let (volume, _) = objects.require_object(core, "volume", ObjectKind::Volume)?;

        log::debug!("slices {:?}: {} planes through volume {:?}", geometry, planes.len(), volume);

        ctx.kernel().set_slices(
            model,
            geometry,
            SlicesData {
                num_planes: planes.len(),
                planes: &planes,
                volume,
            },
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec4;
    use crate::kernel::recording::{KernelCall, RecordingKernel};
    use crate::object::{DataBuffer, DataFlags, DataType, Object, ObjectArena, ObjectError, ParamValue};
    use crate::scene::{Model, Volume};

    fn planes(objects: &mut ObjectArena) -> ObjectHandle {
        let planes: [[f32; 4]; 2] = [[1.0, 0.0, 0.0, 0.0], [0.0, 0.0, 1.0, -0.5]];
        let buffer = DataBuffer::new(
            2,
            DataType::Float4,
            Some(bytemuck::cast_slice::<[f32; 4], u8>(&planes)),
            DataFlags::empty(),
        )
        .unwrap();
        objects.insert(Object::Data(buffer))
    }

    #[test]
    fn test_finalize_hands_planes_and_volume() {
        let mut objects = ObjectArena::new();
        let model = objects.insert(Object::Model(Model::new()));
        let volume = objects.insert(Object::Volume(Volume::new("structured")));
        let plane_data = planes(&mut objects);

        let mut core = ObjectCore::new(Slices::TYPE_NAME);
        core.set("planes", ParamValue::Data(plane_data));
        core.set("volume", ParamValue::Object(volume));

        let (mut kernel, calls) = RecordingKernel::new();
        let mut ctx = CommitContext::new(model, &objects, &mut kernel);
        Slices.finalize(&core, model, plane_data, &mut ctx).unwrap();

        let calls = calls.lock().unwrap();
        match calls.as_slice() {
            [KernelCall::Slices {
                model: m,
                planes: recorded,
                volume: v,
                ..
            }] => {
                assert_eq!(*m, model);
                assert_eq!(*v, volume);
                assert_eq!(recorded, &vec![Vec4::new(1.0, 0.0, 0.0, 0.0), Vec4::new(0.0, 0.0, 1.0, -0.5)]);
            }
            other => panic!("unexpected kernel calls: {:?}", other),
        }
    }

    #[test]
    fn test_missing_planes_skips_kernel() {
        let mut objects = ObjectArena::new();
        let model = objects.insert(Object::Model(Model::new()));
        let volume = objects.insert(Object::Volume(Volume::new("structured")));

        let mut core = ObjectCore::new(Slices::TYPE_NAME);
        core.set("volume", ParamValue::Object(volume));

        let (mut kernel, calls) = RecordingKernel::new();
        let mut ctx = CommitContext::new(model, &objects, &mut kernel);
        let err = Slices.finalize(&core, model, model, &mut ctx).unwrap_err();

        assert!(matches!(err, ObjectError::MissingParameter { object: "slices", ref name } if name == "planes"));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_missing_volume_skips_kernel() {
        let mut objects = ObjectArena::new();
        let model = objects.insert(Object::Model(Model::new()));
        let plane_data = planes(&mut objects);

        let mut core = ObjectCore::new(Slices::TYPE_NAME);
        core.set("planes", ParamValue::Data(plane_data));

        let (mut kernel, calls) = RecordingKernel::new();
        let mut ctx = CommitContext::new(model, &objects, &mut kernel);
        let err = Slices.finalize(&core, model, model, &mut ctx).unwrap_err();

        assert!(matches!(err, ObjectError::MissingParameter { ref name, .. } if name == "volume"));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_volume_must_be_a_volume() {
        let mut objects = ObjectArena::new();
        let model = objects.insert(Object::Model(Model::new()));
        let plane_data = planes(&mut objects);

        let mut core = ObjectCore::new(Slices::TYPE_NAME);
        core.set("planes", ParamValue::Data(plane_data));
        core.set("volume", ParamValue::Object(model));

        let (mut kernel, _calls) = RecordingKernel::new();
        let mut ctx = CommitContext::new(model, &objects, &mut kernel);
        assert!(matches!(
            Slices.finalize(&core, model, model, &mut ctx),
            Err(ObjectError::WrongObjectKind { found: ObjectKind::Model, .. })
        ));
    }
}
