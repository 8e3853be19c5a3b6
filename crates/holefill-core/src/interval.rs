//! Address intervals and read-only layout snapshots.

use serde::{Deserialize, Serialize};

/// A half-open interval `[start, end)` of the simulated address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    /// First address covered by the interval.
    pub start: usize,
    /// One past the last address covered by the interval.
    pub end: usize,
}

impl Interval {
    /// Creates an interval covering `[start, end)`.
    ///
    /// Callers must supply `start < end`; empty intervals never appear in
    /// either partition.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start < end, "interval [{start}, {end}) is empty");
        Self { start, end }
    }

    /// Number of addresses covered.
    #[must_use]
    pub fn size(&self) -> usize {
        self.end - self.start
    }

    /// Whether `self` ends exactly where `other` begins.
    #[must_use]
    pub fn abuts(&self, other: &Self) -> bool {
        self.end == other.start
    }
}

/// An allocated block as seen by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSnapshot {
    /// Caller-supplied block id, unique among live blocks.
    pub id: u32,
    pub start: usize,
    pub end: usize,
}

impl BlockSnapshot {
    #[must_use]
    pub fn size(&self) -> usize {
        self.end - self.start
    }
}

/// A free hole as seen by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoleSnapshot {
    pub start: usize,
    pub end: usize,
}

impl HoleSnapshot {
    #[must_use]
    pub fn size(&self) -> usize {
        self.end - self.start
    }
}

/// Full read-only view of the allocator state after an operation.
///
/// Blocks and holes are listed in ascending address order, which is also
/// the allocator's traversal order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    /// Size of the managed address space.
    pub total_size: usize,
    /// Sum of all block sizes.
    pub allocated_bytes: usize,
    pub blocks: Vec<BlockSnapshot>,
    pub holes: Vec<HoleSnapshot>,
}

impl LayoutSnapshot {
    /// Bytes not covered by any block.
    #[must_use]
    pub fn free_bytes(&self) -> usize {
        self.total_size - self.allocated_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_size_is_end_minus_start() {
        let iv = Interval::new(10, 25);
        assert_eq!(iv.size(), 15);
    }

    #[test]
    fn abuts_detects_shared_boundary_only() {
        let a = Interval::new(0, 10);
        let b = Interval::new(10, 20);
        let c = Interval::new(11, 20);
        assert!(a.abuts(&b));
        assert!(!a.abuts(&c));
        assert!(!b.abuts(&a), "adjacency is directional");
    }

    #[test]
    fn layout_snapshot_round_trips_through_json() {
        let layout = LayoutSnapshot {
            total_size: 100,
            allocated_bytes: 30,
            blocks: vec![BlockSnapshot {
                id: 0,
                start: 0,
                end: 30,
            }],
            holes: vec![HoleSnapshot { start: 30, end: 100 }],
        };
        let json = serde_json::to_string(&layout).expect("serialize");
        let back: LayoutSnapshot = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, layout);
        assert_eq!(back.free_bytes(), 70);
    }
}
