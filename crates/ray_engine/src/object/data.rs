//! Data buffers
//!
//! An immutable typed array wrapped as a managed object. Geometries reference
//! data buffers through [`ParamValue::Data`](super::ParamValue::Data)
//! parameters; the buffer itself knows nothing about its referrers.

use super::{ManagedObject, ObjectCore, ObjectError, ObjectResult};
use crate::foundation::math::{Vec3, Vec4};
use bitflags::bitflags;

/// Element type of a data buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// `u8`
    UChar,
    /// `[u8; 4]`
    UChar4,
    /// `i32`
    Int,
    /// `[i32; 2]`
    Int2,
    /// `[i32; 3]`
    Int3,
    /// `[i32; 4]`
    Int4,
    /// `f32`
    Float,
    /// `[f32; 2]`
    Float2,
    /// `[f32; 3]`
    Float3,
    /// `[f32; 4]`
    Float4,
}

impl DataType {
    /// Size of one element in bytes
    pub fn size_in_bytes(self) -> usize {
        match self {
            Self::UChar => 1,
            Self::UChar4 | Self::Int | Self::Float => 4,
            Self::Int2 | Self::Float2 => 8,
            Self::Int3 | Self::Float3 => 12,
            Self::Int4 | Self::Float4 => 16,
        }
    }
}

bitflags! {
    /// Creation flags for data buffers
    ///
    /// No flag is implemented yet; any nonzero value is rejected.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DataFlags: u32 {
        /// Borrow the caller's storage instead of copying it
        const SHARED_BUFFER = 1 << 0;
    }
}

/// Immutable typed array
#[derive(Debug, Clone)]
pub struct DataBuffer {
    core: ObjectCore,
    num_items: usize,
    format: DataType,
    bytes: Vec<u8>,
}

impl DataBuffer {
    /// Create a data buffer holding `num_items` elements of `format`
    ///
    /// `init` is copied and must be exactly `num_items * format.size_in_bytes()`
    /// bytes long; without it the buffer is zero-filled.
    pub fn new(
        num_items: usize,
        format: DataType,
        init: Option<&[u8]>,
        flags: DataFlags,
    ) -> ObjectResult<Self> {
        if !flags.is_empty() {
            return Err(ObjectError::UnsupportedFlags { flags: flags.bits() });
        }

        let core = ObjectCore::new("data");
        let byte_len = num_items.checked_mul(format.size_in_bytes()).ok_or_else(|| {
            core.invalid_data("init", format!("{} items of {:?} overflow the address space", num_items, format))
        })?;
        let bytes = match init {
            Some(init) if init.len() != byte_len => {
                return Err(core.invalid_data(
                    "init",
                    format!("{} items of {:?} need {} bytes, got {}", num_items, format, byte_len, init.len()),
                ));
            }
            Some(init) => init.to_vec(),
            None => vec![0; byte_len],
        };

        Ok(Self {
            core,
            num_items,
            format,
            bytes,
        })
    }

    /// Number of elements
    pub fn num_items(&self) -> usize {
        self.num_items
    }

    /// Element type
    pub fn format(&self) -> DataType {
        self.format
    }

    /// Raw storage
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Copy the elements out as `T`
    ///
    /// The storage carries no alignment guarantee, so elements are read
    /// unaligned. `T` must match the element size.
    pub fn read_items<T: bytemuck::Pod>(&self) -> Vec<T> {
        debug_assert_eq!(std::mem::size_of::<T>(), self.format.size_in_bytes());
        self.bytes
            .chunks_exact(std::mem::size_of::<T>())
            .map(bytemuck::pod_read_unaligned)
            .collect()
    }

    /// Check the element type on behalf of the parameter `name` of `owner`
    pub fn expect_format(&self, owner: &ObjectCore, name: &str, expected: DataType) -> ObjectResult<()> {
        if self.format == expected {
            Ok(())
        } else {
            Err(owner.invalid_data(name, format!("expected {:?} elements, got {:?}", expected, self.format)))
        }
    }

    /// Elements of a `Float3` buffer
    pub fn to_vec3s(&self, owner: &ObjectCore, name: &str) -> ObjectResult<Vec<Vec3>> {
        self.expect_format(owner, name, DataType::Float3)?;
        Ok(self.read_items::<[f32; 3]>().into_iter().map(Vec3::from).collect())
    }

    /// Elements of a `Float4` buffer
    pub fn to_vec4s(&self, owner: &ObjectCore, name: &str) -> ObjectResult<Vec<Vec4>> {
        self.expect_format(owner, name, DataType::Float4)?;
        Ok(self.read_items::<[f32; 4]>().into_iter().map(Vec4::from).collect())
    }

    /// Elements of an `Int3` buffer
    pub fn to_int3s(&self, owner: &ObjectCore, name: &str) -> ObjectResult<Vec<[i32; 3]>> {
        self.expect_format(owner, name, DataType::Int3)?;
        Ok(self.read_items::<[i32; 3]>())
    }
}

impl ManagedObject for DataBuffer {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        &mut self.core
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_filled_without_init() {
        let data = DataBuffer::new(3, DataType::Float4, None, DataFlags::empty()).unwrap();
        assert_eq!(data.num_items(), 3);
        assert_eq!(data.bytes().len(), 48);
        assert!(data.bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_reads_typed_items() {
        let planes: [[f32; 4]; 2] = [[1.0, 0.0, 0.0, -0.5], [0.0, 1.0, 0.0, 0.25]];
        let data = DataBuffer::new(2, DataType::Float4, Some(bytemuck::cast_slice::<[f32; 4], u8>(&planes)), DataFlags::empty())
            .unwrap();
        let owner = ObjectCore::new("slices");
        let read = data.to_vec4s(&owner, "planes").unwrap();
        assert_eq!(read, vec![Vec4::new(1.0, 0.0, 0.0, -0.5), Vec4::new(0.0, 1.0, 0.0, 0.25)]);
    }

    #[test]
    fn test_wrong_format_is_invalid_data() {
        let data = DataBuffer::new(1, DataType::Float3, None, DataFlags::empty()).unwrap();
        let owner = ObjectCore::new("slices");
        assert!(matches!(
            data.to_vec4s(&owner, "planes"),
            Err(ObjectError::InvalidData { object: "slices", .. })
        ));
    }

    #[test]
    fn test_rejects_flags() {
        let result = DataBuffer::new(1, DataType::Int, None, DataFlags::SHARED_BUFFER);
        assert!(matches!(result, Err(ObjectError::UnsupportedFlags { flags: 1 })));
    }

    #[test]
    fn test_rejects_short_init() {
        let result = DataBuffer::new(2, DataType::Int3, Some(&[0u8; 12][..]), DataFlags::empty());
        assert!(matches!(result, Err(ObjectError::InvalidData { .. })));
    }

    #[test]
    fn test_rejects_overflowing_item_count() {
        let result = DataBuffer::new(usize::MAX, DataType::Float4, None, DataFlags::empty());
        assert!(matches!(result, Err(ObjectError::InvalidData { object: "data", .. })));
    }
}
