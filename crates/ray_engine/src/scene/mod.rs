//! Scene containers
//!
//! [`Model`] aggregates geometries and drives their finalization. [`Volume`]
//! is the target of slicing geometries; its sampling lives in the compute
//! kernel.

pub mod model;
pub mod volume;

pub use model::Model;
pub use volume::{register_builtin_volumes, Volume};
