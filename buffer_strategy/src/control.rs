//! Strategy Control: the process-wide shared state and the Policy Engine
//! that selects victims over it.
//!
//! Two `Mutex`es stand in for Postgres-style spinlocks here: one
//! guarding the pool-wide bookkeeping (free list, clock hand, the Am/A1
//! queues, counters, the bgwriter latch — "the pool lock"), and one per
//! frame guarding just `refcount`/`usage_count` ("the frame spinlock").
//! All queue-link mutations happen under the pool lock; this is
//! enforced by construction, since the link table lives inside
//! `ControlInner`, not on the frames themselves.

use std::sync::{Mutex, MutexGuard};

use common::api::FrameId;

use crate::error::StrategyError;
use crate::frame::FrameState;
use crate::policy::ReplacementPolicy;

/// A caller-supplied handle the core signals exactly once, with the pool
/// lock released, when a victim request observes a pending wakeup.
pub trait BgwriterLatch: Send {
    fn set(&self);
}

/// Which of the three mutually-exclusive queues a frame currently sits in.
/// Tracking this per frame gives O(1) membership tests (invariant P1)
/// in place of the source's O(N) queue walk; the walk was a mechanism for
/// answering "is this frame already queued", not an observable behavior,
/// so replacing it changes nothing a caller can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Queue {
    None,
    Free,
    A1,
    Am,
}

#[derive(Debug, Clone, Copy)]
struct LinkState {
    free_next: Option<FrameId>,
    prev: Option<FrameId>,
    next: Option<FrameId>,
    queue: Queue,
}

impl LinkState {
    fn unlisted() -> Self {
        LinkState { free_next: None, prev: None, next: None, queue: Queue::None }
    }
}

struct ControlInner {
    links: Vec<LinkState>,
    first_free: Option<FrameId>,
    last_free: Option<FrameId>,
    next_victim: FrameId,
    complete_passes: u64,
    num_allocs: u64,
    bgwriter_latch: Option<Box<dyn BgwriterLatch>>,
    am_head: Option<FrameId>,
    am_tail: Option<FrameId>,
    a1_head: Option<FrameId>,
    a1_tail: Option<FrameId>,
    policy: ReplacementPolicy,
}

/// A read-only snapshot of the counters, for diagnostics that shouldn't
/// reset `num_allocs` the way `sync_start` does.
#[derive(Debug, Clone, Copy)]
pub struct StrategyStats {
    pub next_victim: FrameId,
    pub complete_passes: u64,
    pub num_allocs: u64,
    pub policy: ReplacementPolicy,
}

/// The process-wide shared state and Policy Engine.
///
/// Owns the `N` frame spinlocks directly; the Frame Descriptor's other
/// fields (page identity, dirty bit, I/O state) belong to the buffer
/// manager, which is out of scope here.
pub struct StrategyControl {
    control: Mutex<ControlInner>,
    frames: Vec<Mutex<FrameState>>,
    n: usize,
}

/// A frame returned by [`StrategyControl::get_victim`], spinlock held.
///
/// `pool_lock_held` tells the caller whether the pool lock is also still
/// held — true on every non-ring path, false on the ring fast path. The
/// Rust translation of "caller must eventually unlock both" is just
/// "drop this guard when done": the frame spinlock (and the pool lock, if
/// present) release on `Victim`'s `Drop`.
pub struct Victim<'a> {
    frame_id: FrameId,
    frame_guard: MutexGuard<'a, FrameState>,
    pool_guard: Option<MutexGuard<'a, ControlInner>>,
}

impl<'a> Victim<'a> {
    pub(crate) fn from_ring(frame_id: FrameId, frame_guard: MutexGuard<'a, FrameState>) -> Self {
        Victim { frame_id, frame_guard, pool_guard: None }
    }

    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    pub fn pool_lock_held(&self) -> bool {
        self.pool_guard.is_some()
    }

    pub fn refcount(&self) -> u32 {
        self.frame_guard.refcount
    }

    pub fn set_refcount(&mut self, value: u32) {
        self.frame_guard.refcount = value;
    }

    pub fn set_usage_count(&mut self, value: u8) {
        self.frame_guard.usage_count = value;
    }
}

impl StrategyControl {
    /// `init(n_buffers)`: all frames start pre-linked into the free list,
    /// as the frame allocator is assumed to have done before this runs.
    pub fn new(n_buffers: usize, policy: ReplacementPolicy) -> Self {
        let mut links = Vec::with_capacity(n_buffers);
        for i in 0..n_buffers {
            links.push(LinkState {
                free_next: if i + 1 < n_buffers { Some(i + 1) } else { None },
                prev: None,
                next: None,
                queue: Queue::Free,
            });
        }

        let control = ControlInner {
            links,
            first_free: if n_buffers > 0 { Some(0) } else { None },
            last_free: if n_buffers > 0 { Some(n_buffers - 1) } else { None },
            next_victim: 0,
            complete_passes: 0,
            num_allocs: 0,
            bgwriter_latch: None,
            am_head: None,
            am_tail: None,
            a1_head: None,
            a1_tail: None,
            policy,
        };

        let frames = (0..n_buffers).map(|_| Mutex::new(FrameState::default())).collect();

        StrategyControl { control: Mutex::new(control), frames, n: n_buffers }
    }

    pub fn num_buffers(&self) -> usize {
        self.n
    }

    pub fn policy(&self) -> ReplacementPolicy {
        self.control.lock().unwrap().policy
    }

    pub(crate) fn lock_frame(&self, idx: FrameId) -> MutexGuard<'_, FrameState> {
        self.frames[idx].lock().unwrap()
    }

    /// `shmem_size()`: aligned size of Strategy Control plus the external
    /// page hash table's own estimate, summed the way the source sums
    /// `StrategyShmemSize()` and `BufTableShmemSize()`.
    pub fn shmem_size(n_buffers: usize, hash_table_estimate: usize) -> usize {
        let control_size = std::mem::size_of::<ControlInner>()
            + n_buffers * std::mem::size_of::<LinkState>();
        let frame_size = n_buffers * std::mem::size_of::<FrameState>();
        align_up(control_size + frame_size, 64) + hash_table_estimate
    }

    /// `free_buffer(frame)`: prepend to the free list unless already
    /// listed there (idempotent — P6). Membership is tracked precisely by
    /// `Queue` rather than by the source's single `freeNext` sentinel, so
    /// a frame currently queued in A1/Am (which invariant P1 says can't
    /// also be in the free list) is correctly left alone too.
    pub fn free_buffer(&self, frame_id: FrameId) {
        let mut guard = self.control.lock().unwrap();
        if guard.links[frame_id].queue != Queue::None {
            return;
        }
        let old_head = guard.first_free;
        guard.links[frame_id].free_next = old_head;
        guard.first_free = Some(frame_id);
        if old_head.is_none() {
            guard.last_free = Some(frame_id);
        }
        guard.links[frame_id].queue = Queue::Free;
    }

    /// `notify_bgwriter(latch)`: store (or, with `None`, cancel) the
    /// pending wakeup. Signaled and cleared by the next `get_victim`.
    pub fn notify_bgwriter(&self, latch: Option<Box<dyn BgwriterLatch>>) {
        self.control.lock().unwrap().bgwriter_latch = latch;
    }

    /// `sync_start()`: returns `(start_idx, complete_passes, num_allocs)`
    /// and resets `num_allocs` to 0.
    pub fn sync_start(&self) -> (FrameId, u64, u64) {
        let mut guard = self.control.lock().unwrap();
        let snapshot = (guard.next_victim, guard.complete_passes, guard.num_allocs);
        guard.num_allocs = 0;
        snapshot
    }

    /// A non-resetting peek at the same counters, for diagnostics that
    /// shouldn't disturb the bgwriter's view of `num_allocs`.
    pub fn stats(&self) -> StrategyStats {
        let guard = self.control.lock().unwrap();
        StrategyStats {
            next_victim: guard.next_victim,
            complete_passes: guard.complete_passes,
            num_allocs: guard.num_allocs,
            policy: guard.policy,
        }
    }

    /// `on_unpinned(frame_idx)`: best-effort queue update on last-unpin.
    /// Uses `try_lock` on the pool lock; under contention this is a
    /// silent no-op, per the source's documented tradeoff (stale LRU
    /// ordering is acceptable, unbounded pin/unpin latency is not).
    pub fn on_unpinned(&self, frame_id: FrameId) {
        let mut guard = match self.control.try_lock() {
            Ok(guard) => guard,
            Err(_) => return,
        };

        if guard.policy == ReplacementPolicy::TwoQ {
            match guard.links[frame_id].queue {
                Queue::Am => {
                    unlink_from_am(&mut guard, frame_id);
                    append_am_tail(&mut guard, frame_id);
                }
                Queue::A1 => {
                    unlink_from_a1(&mut guard, frame_id);
                    append_am_tail(&mut guard, frame_id);
                }
                _ => append_a1_tail(&mut guard, frame_id),
            }
        } else {
            if guard.links[frame_id].queue == Queue::Am {
                unlink_from_am(&mut guard, frame_id);
            }
            append_am_tail(&mut guard, frame_id);
        }
    }

    /// `get_victim(strategy)`: ring fast path first, then the pool lock,
    /// bgwriter signaling, the free-list drain, and finally the
    /// configured policy's selection walk.
    pub fn get_victim<'a>(
        &'a self,
        mut strategy: Option<&mut crate::ring::AccessStrategy>,
    ) -> Result<Victim<'a>, StrategyError> {
        if let Some(ring) = strategy.as_mut() {
            if let Some(victim) = ring.get(self) {
                return Ok(victim);
            }
        }

        let mut guard = self.control.lock().unwrap();
        guard.num_allocs += 1;

        if let Some(latch) = guard.bgwriter_latch.take() {
            drop(guard);
            latch.set();
            guard = self.control.lock().unwrap();
        }

        if let Some((frame_id, frame_guard)) = self.drain_free_list(&mut guard) {
            if let Some(ring) = strategy.as_mut() {
                ring.put(frame_id);
            }
            return Ok(Victim { frame_id, frame_guard, pool_guard: Some(guard) });
        }

        let (frame_id, frame_guard) = match guard.policy {
            ReplacementPolicy::Clock => self.clock_victim(&mut guard)?,
            ReplacementPolicy::Lru => self.lru_victim(&mut guard)?,
            ReplacementPolicy::Mru => self.mru_victim(&mut guard)?,
            ReplacementPolicy::TwoQ => self.two_q_victim(&mut guard)?,
        };

        if let Some(ring) = strategy.as_mut() {
            ring.put(frame_id);
        }

        Ok(Victim { frame_id, frame_guard, pool_guard: Some(guard) })
    }

    fn drain_free_list<'a>(
        &'a self,
        guard: &mut ControlInner,
    ) -> Option<(FrameId, MutexGuard<'a, FrameState>)> {
        while let Some(idx) = guard.first_free {
            let next = guard.links[idx].free_next;
            guard.links[idx].free_next = None;
            guard.links[idx].queue = Queue::None;
            guard.first_free = next;
            if next.is_none() {
                guard.last_free = None;
            }

            let frame_guard = self.frames[idx].lock().unwrap();
            if frame_guard.refcount == 0 && frame_guard.usage_count == 0 {
                return Some((idx, frame_guard));
            }
        }
        None
    }

    /// Second-chance clock sweep. `trycounter` bounds the search to `N`
    /// frames since the last time a usage count was decremented,
    /// guaranteeing progress (P3) whenever an evictable frame exists.
    fn clock_victim<'a>(
        &'a self,
        guard: &mut ControlInner,
    ) -> Result<(FrameId, MutexGuard<'a, FrameState>), StrategyError> {
        if self.n == 0 {
            return Err(StrategyError::NoUnpinnedBuffers);
        }

        let mut trycounter = self.n;
        loop {
            let idx = guard.next_victim;
            guard.next_victim = (guard.next_victim + 1) % self.n;
            if guard.next_victim == 0 {
                guard.complete_passes += 1;
            }

            let mut frame_guard = self.frames[idx].lock().unwrap();
            if frame_guard.refcount == 0 {
                if frame_guard.usage_count > 0 {
                    frame_guard.usage_count -= 1;
                    trycounter = self.n;
                    continue;
                }
                return Ok((idx, frame_guard));
            }
            drop(frame_guard);

            trycounter -= 1;
            if trycounter == 0 {
                return Err(StrategyError::NoUnpinnedBuffers);
            }
        }
    }

    /// Walks the Am queue head-to-tail: least-recently-unpinned first.
    fn lru_victim<'a>(
        &'a self,
        guard: &mut ControlInner,
    ) -> Result<(FrameId, MutexGuard<'a, FrameState>), StrategyError> {
        let mut cursor = guard.am_head;
        while let Some(idx) = cursor {
            let frame_guard = self.frames[idx].lock().unwrap();
            if frame_guard.refcount == 0 {
                return Ok((idx, frame_guard));
            }
            drop(frame_guard);
            cursor = guard.links[idx].next;
        }
        Err(StrategyError::NoUnpinnedBuffers)
    }

    /// Walks the Am queue tail-to-head: most-recently-unpinned first.
    fn mru_victim<'a>(
        &'a self,
        guard: &mut ControlInner,
    ) -> Result<(FrameId, MutexGuard<'a, FrameState>), StrategyError> {
        let mut cursor = guard.am_tail;
        while let Some(idx) = cursor {
            let frame_guard = self.frames[idx].lock().unwrap();
            if frame_guard.refcount == 0 {
                return Ok((idx, frame_guard));
            }
            drop(frame_guard);
            cursor = guard.links[idx].prev;
        }
        Err(StrategyError::NoUnpinnedBuffers)
    }

    /// 2Q victim selection. If A1 is the chosen source queue and it
    /// turns out to be empty, this fails outright rather than falling
    /// back to Am — that asymmetry is preserved deliberately, not an
    /// oversight in this port.
    fn two_q_victim<'a>(
        &'a self,
        guard: &mut ControlInner,
    ) -> Result<(FrameId, MutexGuard<'a, FrameState>), StrategyError> {
        let thres = self.n / 2;
        let size_a1 = count_queue(guard, guard.a1_head);
        let am_empty = guard.am_head.is_none();
        let use_a1 = size_a1 >= thres || am_empty;

        let mut cursor = if use_a1 { guard.a1_head } else { guard.am_head };
        while let Some(idx) = cursor {
            let frame_guard = self.frames[idx].lock().unwrap();
            if frame_guard.refcount == 0 {
                if use_a1 {
                    unlink_from_a1(guard, idx);
                } else {
                    unlink_from_am(guard, idx);
                }
                return Ok((idx, frame_guard));
            }
            drop(frame_guard);
            cursor = guard.links[idx].next;
        }
        Err(StrategyError::NoUnpinnedBuffers)
    }
}

fn count_queue(guard: &ControlInner, mut head: Option<FrameId>) -> usize {
    let mut count = 0;
    while let Some(idx) = head {
        count += 1;
        head = guard.links[idx].next;
    }
    count
}

fn unlink_from_am(guard: &mut ControlInner, idx: FrameId) {
    let (prev, next) = (guard.links[idx].prev, guard.links[idx].next);
    match prev {
        Some(p) => guard.links[p].next = next,
        None => guard.am_head = next,
    }
    match next {
        Some(n) => guard.links[n].prev = prev,
        None => guard.am_tail = prev,
    }
    guard.links[idx] = LinkState::unlisted();
}

fn unlink_from_a1(guard: &mut ControlInner, idx: FrameId) {
    let (prev, next) = (guard.links[idx].prev, guard.links[idx].next);
    match prev {
        Some(p) => guard.links[p].next = next,
        None => guard.a1_head = next,
    }
    match next {
        Some(n) => guard.links[n].prev = prev,
        None => guard.a1_tail = prev,
    }
    guard.links[idx] = LinkState::unlisted();
}

fn append_am_tail(guard: &mut ControlInner, idx: FrameId) {
    guard.links[idx].prev = guard.am_tail;
    guard.links[idx].next = None;
    match guard.am_tail {
        Some(tail) => guard.links[tail].next = Some(idx),
        None => guard.am_head = Some(idx),
    }
    guard.am_tail = Some(idx);
    guard.links[idx].queue = Queue::Am;
}

fn append_a1_tail(guard: &mut ControlInner, idx: FrameId) {
    guard.links[idx].prev = guard.a1_tail;
    guard.links[idx].next = None;
    match guard.a1_tail {
        Some(tail) => guard.links[tail].next = Some(idx),
        None => guard.a1_head = Some(idx),
    }
    guard.a1_tail = Some(idx);
    guard.links[idx].queue = Queue::A1;
}

fn align_up(x: usize, align: usize) -> usize {
    (x + align - 1) / align * align
}
