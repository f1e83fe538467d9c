//! The frame-local state guarded by the per-frame spinlock.
//!
//! The full Frame Descriptor (page identity, I/O state, the hash-table
//! entry) lives in the buffer manager, which owns pin/unpin and page
//! I/O. What the replacement strategy core owns directly is the pair
//! of counters it reads and mutates while deciding victims: `refcount`
//! and `usage_count`. A `std::sync::Mutex` stands in for the frame
//! spinlock — brief critical sections, no blocking syscalls while held,
//! the same contract a real spinlock gives.

/// Per-frame state protected by the frame's spinlock.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameState {
    /// Active pins. A frame with `refcount > 0` cannot be evicted.
    pub refcount: u32,
    /// CLOCK's soft touch counter.
    pub usage_count: u8,
}
