//! Frame buffer storage

use crate::foundation::math::{Vec2u, Vec4};
use serde::{Deserialize, Serialize};

/// Pixel format of a frame buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameBufferMode {
    /// 8-bit RGBA, one byte per channel
    RgbaI8,
    /// 8-bit RGB, one byte per channel
    RgbI8,
    /// 32-bit float RGBA
    RgbaF32,
}

impl FrameBufferMode {
    /// Bytes used by one pixel
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::RgbaI8 => 4,
            Self::RgbI8 => 3,
            Self::RgbaF32 => 16,
        }
    }
}

/// Constructor for the buffers of one swap chain
pub type FrameBufferFactory = fn(Vec2u) -> FrameBuffer;

/// Factory for `mode`, or `None` when the mode has no local implementation
pub fn factory_for(mode: FrameBufferMode) -> Option<FrameBufferFactory> {
    match mode {
        FrameBufferMode::RgbaI8 => Some(FrameBuffer::new_rgba_i8),
        FrameBufferMode::RgbI8 | FrameBufferMode::RgbaF32 => None,
    }
}

/// A single renderable pixel target
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    size: Vec2u,
    mode: FrameBufferMode,
    pixels: Vec<u8>,
}

impl FrameBuffer {
    fn new(size: Vec2u, mode: FrameBufferMode) -> Self {
        let len = size.x as usize * size.y as usize * mode.bytes_per_pixel();
        Self {
            size,
            mode,
            pixels: vec![0; len],
        }
    }

    /// Create an 8-bit RGBA frame buffer
    pub fn new_rgba_i8(size: Vec2u) -> Self {
        Self::new(size, FrameBufferMode::RgbaI8)
    }

    /// Resolution in pixels
    pub fn size(&self) -> Vec2u {
        self.size
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.size.x
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.size.y
    }

    /// Pixel format
    pub fn mode(&self) -> FrameBufferMode {
        self.mode
    }

    /// Raw pixel storage, row-major
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Fill every pixel with `color` (RGBA, 0..=1)
    pub fn clear(&mut self, color: Vec4) {
        let encoded = encode(self.mode, color);
        for pixel in self.pixels.chunks_exact_mut(encoded.len()) {
            pixel.copy_from_slice(&encoded);
        }
    }

    /// Mutable bytes of the pixel at `(x, y)`
    pub fn pixel_mut(&mut self, x: u32, y: u32) -> Option<&mut [u8]> {
        if x >= self.size.x || y >= self.size.y {
            return None;
        }
        let stride = self.mode.bytes_per_pixel();
        let offset = (y as usize * self.size.x as usize + x as usize) * stride;
        self.pixels.get_mut(offset..offset + stride)
    }
}

fn encode(mode: FrameBufferMode, color: Vec4) -> Vec<u8> {
    let to_byte = |channel: f32| (channel.clamp(0.0, 1.0) * 255.0).round() as u8;
    match mode {
        FrameBufferMode::RgbaI8 => color.iter().map(|&c| to_byte(c)).collect(),
        FrameBufferMode::RgbI8 => color.iter().take(3).map(|&c| to_byte(c)).collect(),
        FrameBufferMode::RgbaF32 => bytemuck::cast_slice::<f32, u8>(&[color.x, color.y, color.z, color.w]).to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_sized_by_mode() {
        let fb = FrameBuffer::new_rgba_i8(Vec2u::new(64, 32));
        assert_eq!(fb.pixels().len(), 64 * 32 * 4);
        assert_eq!(fb.mode(), FrameBufferMode::RgbaI8);
        assert_eq!((fb.width(), fb.height()), (64, 32));
    }

    #[test]
    fn test_only_rgba_i8_has_a_factory() {
        assert!(factory_for(FrameBufferMode::RgbaI8).is_some());
        assert!(factory_for(FrameBufferMode::RgbI8).is_none());
        assert!(factory_for(FrameBufferMode::RgbaF32).is_none());
    }

    #[test]
    fn test_clear_encodes_rgba8() {
        let mut fb = FrameBuffer::new_rgba_i8(Vec2u::new(2, 1));
        fb.clear(Vec4::new(1.0, 0.5, 0.0, 2.0));
        assert_eq!(fb.pixels(), &[255, 128, 0, 255, 255, 128, 0, 255]);
    }

    #[test]
    fn test_pixel_mut_bounds() {
        let mut fb = FrameBuffer::new_rgba_i8(Vec2u::new(2, 2));
        fb.pixel_mut(1, 1).unwrap().copy_from_slice(&[1, 2, 3, 4]);
        assert_eq!(&fb.pixels()[12..], &[1, 2, 3, 4]);
        assert!(fb.pixel_mut(2, 0).is_none());
    }
}
