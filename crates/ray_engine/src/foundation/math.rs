//! Math utilities and types
//!
//! Provides the small set of vector types the object layer passes around.
//! Actual geometric computation lives behind the compute kernel.

pub use nalgebra::{Vector2, Vector3, Vector4};

/// 2D unsigned vector, used for frame buffer resolutions
pub type Vec2u = Vector2<u32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type, used for plane equations `(a, b, c, d)`
pub type Vec4 = Vector4<f32>;

/// Math utility functions
pub mod utils {
    use super::Vec3;

    /// Normalize `v`, falling back to `fallback` for degenerate input
    pub fn normalize_or(v: Vec3, fallback: Vec3) -> Vec3 {
        v.try_normalize(f32::EPSILON).unwrap_or(fallback)
    }

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees.to_radians()
    }
}
