//! The Access Strategy Ring: a bounded, per-caller rotating set of frames
//! that confines bulk scans (sequential scans, VACUUM, bulk writes) to a
//! small working set instead of letting them evict the whole pool.

use common::api::{FrameId, PAGE_SIZE};

use crate::control::{StrategyControl, Victim};
use crate::error::StrategyError;

const KIB: usize = 1024;
const MIB: usize = 1024 * 1024;

/// The kind of bulk operation a ring confines. `Normal` never allocates a
/// ring at all — callers on the default path skip straight to the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferAccessStrategyType {
    Normal,
    BulkRead,
    BulkWrite,
    Vacuum,
}

impl TryFrom<i64> for BufferAccessStrategyType {
    type Error = StrategyError;

    /// Decodes the wire/config discriminant a buffer manager would read
    /// off a scan descriptor before calling `make_strategy`.
    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(BufferAccessStrategyType::Normal),
            1 => Ok(BufferAccessStrategyType::BulkRead),
            2 => Ok(BufferAccessStrategyType::BulkWrite),
            3 => Ok(BufferAccessStrategyType::Vacuum),
            other => Err(StrategyError::UnrecognizedAccessStrategy(other)),
        }
    }
}

/// A caller-owned bounded ring of frame numbers.
///
/// Lives in the caller's memory for the duration of one scan, is
/// populated lazily as victims are drawn through it, and is released by
/// simply dropping it (see [`free_strategy`]).
pub struct AccessStrategy {
    buffers: Vec<Option<FrameId>>,
    current: usize,
    current_was_in_ring: bool,
    btype: BufferAccessStrategyType,
}

impl AccessStrategy {
    /// `make_strategy(btype)`: ring size is a fixed byte budget divided by
    /// page size, clamped to `N/8` so a ring can never dominate a small pool.
    pub(crate) fn new(btype: BufferAccessStrategyType, n_buffers: usize) -> Option<Self> {
        let bytes = match btype {
            BufferAccessStrategyType::Normal => return None,
            BufferAccessStrategyType::BulkRead | BufferAccessStrategyType::Vacuum => 256 * KIB,
            BufferAccessStrategyType::BulkWrite => 16 * MIB,
        };

        let mut ring_size = bytes / PAGE_SIZE;
        let cap = n_buffers / 8;
        if ring_size > cap {
            ring_size = cap;
        }
        let ring_size = ring_size.max(1);

        Some(AccessStrategy {
            buffers: vec![None; ring_size],
            current: 0,
            current_was_in_ring: false,
            btype,
        })
    }

    pub fn btype(&self) -> BufferAccessStrategyType {
        self.btype
    }

    pub fn ring_size(&self) -> usize {
        self.buffers.len()
    }

    /// Ring fast path consulted first by [`StrategyControl::get_victim`].
    /// Advances the cursor; a slot holding a frame is accepted iff it is
    /// unpinned and its usage count is at most 1 (1 is expected — our own
    /// prior touch through this same ring).
    pub(crate) fn get<'a>(&mut self, control: &'a StrategyControl) -> Option<Victim<'a>> {
        self.current = (self.current + 1) % self.buffers.len();
        match self.buffers[self.current] {
            None => {
                self.current_was_in_ring = false;
                None
            }
            Some(frame_id) => {
                let guard = control.lock_frame(frame_id);
                if guard.refcount == 0 && guard.usage_count <= 1 {
                    self.current_was_in_ring = true;
                    Some(Victim::from_ring(frame_id, guard))
                } else {
                    drop(guard);
                    self.current_was_in_ring = false;
                    None
                }
            }
        }
    }

    /// Stores the frame the caller obtained from the main path at the
    /// current slot, so future scans through this ring can reuse it.
    pub(crate) fn put(&mut self, frame_id: FrameId) {
        let current = self.current;
        self.buffers[current] = Some(frame_id);
    }

    /// `reject_buffer(strategy, frame)`: only meaningful for `BulkRead`.
    /// Lets the caller hand back a dirty ring victim without stalling on
    /// its WAL flush — clears the slot and signals the manager to draw
    /// another victim. Non-`BulkRead` callers are expected to flush and
    /// reuse the frame themselves.
    pub fn reject_buffer(&mut self, frame_id: FrameId) -> bool {
        if self.btype != BufferAccessStrategyType::BulkRead {
            return false;
        }
        if self.current_was_in_ring && self.buffers[self.current] == Some(frame_id) {
            self.buffers[self.current] = None;
            true
        } else {
            false
        }
    }
}

/// `free_strategy(strategy)`: rings have no external resources beyond
/// their own allocation, so releasing one is just dropping it. Kept as a
/// named function for parity with the documented external interface.
pub fn free_strategy(strategy: AccessStrategy) {
    drop(strategy);
}
