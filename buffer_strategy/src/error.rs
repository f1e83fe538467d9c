//! Error surface for the replacement strategy core.
//!
//! Mirrors the `BpmError` / `QueryError` convention used elsewhere in this
//! workspace: a plain enum, a hand-written `Display` with stable wording,
//! and `std::error::Error` so callers can use `?` through `anyhow`-free
//! call chains.

use std::fmt;

/// Errors raised by the replacement strategy core.
#[derive(Debug)]
pub enum StrategyError {
    /// Pool exhaustion: every frame visited by the chosen policy was pinned.
    NoUnpinnedBuffers,
    /// An unknown policy discriminant was supplied to a configuration path.
    InvalidPolicy(i64),
    /// An unknown access-strategy discriminant was decoded on the way to
    /// `make_strategy` — see `BufferAccessStrategyType`'s `TryFrom<i64>`.
    UnrecognizedAccessStrategy(i64),
    /// Reserved for the internal invariant-violation case the source guards
    /// against with a final `elog(ERROR, ...)` after the policy dispatch.
    /// None of the four policy branches in this crate fall through without
    /// returning, so this variant is never constructed at runtime; it is
    /// kept for parity with the documented error surface.
    Unreachable,
}

impl fmt::Display for StrategyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyError::NoUnpinnedBuffers => write!(f, "no unpinned buffers available"),
            StrategyError::InvalidPolicy(n) => {
                write!(f, "invalid buffer pool replacement policy {}", n)
            }
            StrategyError::UnrecognizedAccessStrategy(n) => {
                write!(f, "unrecognized buffer access strategy: {}", n)
            }
            StrategyError::Unreachable => {
                write!(f, "reached end of get_victim() without selecting a buffer")
            }
        }
    }
}

impl std::error::Error for StrategyError {}
