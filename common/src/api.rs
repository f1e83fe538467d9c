
//! Primitives shared by every buffer-pool implementation in this workspace.

/// A unique identifier for a page in the database.
pub type PageId = usize;

/// The size of a single page in bytes.
pub const PAGE_SIZE: usize = 4096;

/// A 0-based index into the frame array owned by a buffer pool.
pub type FrameId = usize;
