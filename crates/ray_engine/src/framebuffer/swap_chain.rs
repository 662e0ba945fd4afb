//! Swap chain
//!
//! Handles back/front buffer rotation and the bookkeeping that keeps callers
//! from reading a buffer while it is being rendered.

use super::{FrameBuffer, FrameBufferFactory};
use crate::foundation::math::{Vec2u, Vec4};
use thiserror::Error;

/// Swap chain errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SwapChainError {
    /// Depth must be at least one
    #[error("swap chain depth must be at least 1")]
    InvalidDepth,

    /// Single-buffered chain: the only buffer is busy with a frame in flight
    #[error("frame {0} is still in flight on a single-buffered swap chain")]
    BufferBusy(u64),

    /// Single-buffered chain: the only buffer is mapped
    #[error("the only buffer of a single-buffered swap chain is mapped")]
    BufferMapped,

    /// The front buffer is mapped, so the ring cannot rotate or be cleared
    #[error("the front buffer is mapped")]
    Mapped,

    /// Map called twice without unmap
    #[error("front buffer is already mapped")]
    AlreadyMapped,

    /// Unmap called without map
    #[error("no buffer is mapped")]
    NotMapped,

    /// Unmap called with a pointer that is not the mapped buffer
    #[error("pointer does not belong to the mapped buffer")]
    PointerMismatch,

    /// A new frame was started before the previous one was presented
    #[error("frame {0} has not been presented yet")]
    FramePending(u64),

    /// Present called with a frame that is not the one in flight
    #[error("frame {got} is not in flight (pending: {pending:?})")]
    StaleFrame {
        /// Frame passed in
        got: u64,
        /// Frame actually in flight
        pending: Option<u64>,
    },
}

/// Result type for swap chain operations
pub type SwapChainResult<T> = Result<T, SwapChainError>;

/// Fixed-depth ring of frame buffers
#[derive(Debug)]
pub struct SwapChain {
    buffers: Vec<FrameBuffer>,
    back: usize,
    front: usize,
    mapped: Option<usize>,
    pending: Option<u64>,
    frame_index: u64,
}

impl SwapChain {
    /// Create a swap chain, allocating every buffer up front
    ///
    /// # Arguments
    /// * `depth` - Number of buffers in the ring (at least 1)
    /// * `size` - Resolution of every buffer
    /// * `factory` - Constructor for the buffers' pixel mode
    pub fn new(depth: usize, size: Vec2u, factory: FrameBufferFactory) -> SwapChainResult<Self> {
        if depth == 0 {
            return Err(SwapChainError::InvalidDepth);
        }

        let buffers = (0..depth).map(|_| factory(size)).collect();
        Ok(Self {
            buffers,
            back: 0,
            // The front buffer is the one that completed most recently.
            front: depth - 1,
            mapped: None,
            pending: None,
            frame_index: 0,
        })
    }

    /// Number of buffers in the ring
    pub fn depth(&self) -> usize {
        self.buffers.len()
    }

    /// Index of the buffer being rendered into
    pub fn back_index(&self) -> usize {
        self.back
    }

    /// Index of the buffer eligible for mapping
    pub fn front_index(&self) -> usize {
        self.front
    }

    /// Buffer currently eligible for writing
    pub fn back_buffer(&self) -> &FrameBuffer {
        &self.buffers[self.back]
    }

    /// Buffer currently eligible for writing
    pub fn back_buffer_mut(&mut self) -> &mut FrameBuffer {
        &mut self.buffers[self.back]
    }

    /// Buffer currently eligible for reading
    pub fn front_buffer(&self) -> &FrameBuffer {
        &self.buffers[self.front]
    }

    /// All buffers in ring order
    pub fn buffers(&self) -> &[FrameBuffer] {
        &self.buffers
    }

    /// Number of frames presented so far
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Frame currently in flight, if any
    pub fn pending_frame(&self) -> Option<u64> {
        self.pending
    }

    /// Whether a buffer is mapped
    pub fn is_mapped(&self) -> bool {
        self.mapped.is_some()
    }

    /// Map the front buffer for reading
    ///
    /// The returned storage stays valid and unchanged until [`unmap`](Self::unmap).
    pub fn map(&mut self) -> SwapChainResult<&[u8]> {
        if self.mapped.is_some() {
            return Err(SwapChainError::AlreadyMapped);
        }
        if let (1, Some(frame)) = (self.depth(), self.pending) {
            return Err(SwapChainError::BufferBusy(frame));
        }
        self.mapped = Some(self.front);
        Ok(self.buffers[self.front].pixels())
    }

    /// Release a mapping obtained from [`map`](Self::map)
    ///
    /// `mapped` must be the start of the slice `map` returned.
    pub fn unmap(&mut self, mapped: *const u8) -> SwapChainResult<()> {
        let index = self.mapped.ok_or(SwapChainError::NotMapped)?;
        if !std::ptr::eq(self.buffers[index].pixels().as_ptr(), mapped) {
            return Err(SwapChainError::PointerMismatch);
        }
        self.mapped = None;
        Ok(())
    }

    /// Start rendering a frame into the back buffer
    ///
    /// Returns the index of the new frame; it must be handed to
    /// [`present`](Self::present) or [`abort_frame`](Self::abort_frame).
    pub fn begin_frame(&mut self) -> SwapChainResult<u64> {
        if let Some(frame) = self.pending {
            return Err(SwapChainError::FramePending(frame));
        }
        if self.depth() == 1 && self.mapped.is_some() {
            return Err(SwapChainError::BufferMapped);
        }
        self.pending = Some(self.frame_index);
        Ok(self.frame_index)
    }

    /// Drop a frame that failed to render without rotating the ring
    pub fn abort_frame(&mut self, frame: u64) {
        if self.pending == Some(frame) {
            self.pending = None;
        }
    }

    /// Finish the frame in flight and rotate the ring
    pub fn present(&mut self, frame: u64) -> SwapChainResult<()> {
        if self.pending != Some(frame) {
            return Err(SwapChainError::StaleFrame {
                got: frame,
                pending: self.pending,
            });
        }
        self.advance()?;
        self.pending = None;
        self.frame_index += 1;
        Ok(())
    }

    /// Fill every buffer in the ring with `color`
    pub fn clear(&mut self, color: Vec4) -> SwapChainResult<()> {
        if self.mapped.is_some() {
            return Err(SwapChainError::Mapped);
        }
        if let Some(frame) = self.pending {
            return Err(SwapChainError::FramePending(frame));
        }
        for buffer in &mut self.buffers {
            buffer.clear(color);
        }
        Ok(())
    }

    /// Rotate back and front by one position
    ///
    /// With depth 1 both indices stay on the single buffer.
    pub fn advance(&mut self) -> SwapChainResult<()> {
        if self.mapped.is_some() {
            return Err(SwapChainError::Mapped);
        }
        let depth = self.depth();
        self.back = (self.back + 1) % depth;
        self.front = (self.front + 1) % depth;
        Ok(())
    }
}
