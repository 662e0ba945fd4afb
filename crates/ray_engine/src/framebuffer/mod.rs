//! # Frame Buffers and Swap Chains
//!
//! A [`SwapChain`] owns a fixed ring of [`FrameBuffer`]s. The back buffer is
//! rendered into, the front buffer is the one callers may map for reading,
//! and presenting a finished frame rotates the ring by one.
//!
//! ```text
//! depth 2:   [ back | front ]  --present-->  [ front | back ]
//! ```

pub mod frame_buffer;
pub mod swap_chain;

pub use frame_buffer::{factory_for, FrameBuffer, FrameBufferFactory, FrameBufferMode};
pub use swap_chain::{SwapChain, SwapChainError, SwapChainResult};
