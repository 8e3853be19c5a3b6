//! # holefill-core
//!
//! Interactive simulator core for contiguous-memory hole-filling allocation.
//!
//! The allocator manages a fixed address range `[0, total_size)` as two
//! coupled, address-ordered partitions: allocated blocks (keyed by a
//! caller-supplied id) and free holes. It supports first-fit and best-fit
//! placement, hole coalescing on deallocation, and full compaction.
//!
//! All state lives behind an explicit [`Allocator`] value; there are no
//! process-wide statics. Callers observe state only through read-only
//! snapshots. No `unsafe` code is permitted at the crate level.

#![deny(unsafe_code)]

pub mod allocator;
pub mod error;
pub mod interval;
pub mod list;
pub mod shared;
pub mod space;

pub use allocator::{Allocator, FitStrategy, LifecycleLevel, LifecycleRecord};
pub use error::AllocError;
pub use interval::{BlockSnapshot, HoleSnapshot, Interval, LayoutSnapshot};
pub use shared::SharedAllocator;
pub use space::AddressSpace;
