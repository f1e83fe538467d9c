//! The buffer pool replacement strategy core.
//!
//! This crate owns the fixed-size pool of page frames' eviction
//! bookkeeping — the part of a storage engine's buffer manager that
//! decides *which* frame to reclaim when a page fault needs a fresh one.
//! It does not perform I/O, own the page hash table, or drive pin/unpin
//! directly; those belong to the buffer manager, which is an external
//! collaborator from this crate's point of view.
//!
//! Four policies share one [`control::StrategyControl`]: CLOCK, LRU, MRU,
//! and 2Q (the process-wide default). A secondary
//! [`ring::AccessStrategy`] sits in front of it for bulk scans that
//! shouldn't be allowed to evict the whole pool.

mod control;
mod error;
mod frame;
mod policy;
mod ring;

pub use control::{BgwriterLatch, StrategyControl, StrategyStats, Victim};
pub use error::StrategyError;
pub use frame::FrameState;
pub use policy::{policy_name, ReplacementPolicy};
pub use ring::{free_strategy, AccessStrategy, BufferAccessStrategyType};

impl StrategyControl {
    /// `make_strategy(btype)`: `None` for `Normal`, otherwise a ring sized
    /// from a fixed per-strategy byte budget and clamped to this pool's
    /// `N/8`.
    pub fn make_strategy(&self, btype: BufferAccessStrategyType) -> Option<AccessStrategy> {
        AccessStrategy::new(btype, self.num_buffers())
    }
}
