//! Core allocator state.
//!
//! [`Allocator`] owns one [`AddressSpace`] and the two coupled partition
//! lists (allocated blocks, free holes) and keeps them tiling the address
//! range exactly. Placement strategy is fixed at configuration time. Every
//! operation validates all preconditions before touching either list, so a
//! returned error means nothing changed.

use serde::{Deserialize, Serialize};

use crate::error::AllocError;
use crate::interval::{BlockSnapshot, HoleSnapshot, Interval, LayoutSnapshot};
use crate::list::{PartitionList, Spanned};
use crate::space::AddressSpace;

/// Hole-fitting strategy, fixed when the allocator is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitStrategy {
    /// Lowest-address hole large enough for the request.
    FirstFit,
    /// Smallest hole large enough; ties keep the earliest candidate.
    BestFit,
}

impl FitStrategy {
    /// Maps the interactive layer's numeric strategy code (0/1).
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::FirstFit),
            1 => Some(Self::BestFit),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::FirstFit => "first_fit",
            Self::BestFit => "best_fit",
        }
    }
}

/// An allocated block: a spanned interval plus its caller-supplied id.
#[derive(Debug, Clone, Copy)]
struct Block {
    id: u32,
    span: Interval,
}

impl Spanned for Block {
    fn span(&self) -> Interval {
        self.span
    }

    fn span_mut(&mut self) -> &mut Interval {
        &mut self.span
    }
}

/// A free hole: a spanned interval with no identity.
#[derive(Debug, Clone, Copy)]
struct Hole {
    span: Interval,
}

impl Spanned for Hole {
    fn span(&self) -> Interval {
        self.span
    }

    fn span_mut(&mut self) -> &mut Interval {
        &mut self.span
    }
}

/// Allocator lifecycle log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Structured allocator lifecycle record.
///
/// Kept in memory and drained by the caller; the core never performs I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleRecord {
    /// Monotonic decision/event id.
    pub decision_id: u64,
    /// Correlation id for this record.
    pub trace_id: String,
    /// Severity level.
    pub level: LifecycleLevel,
    /// Operation (`configure`, `allocate`, `deallocate`, `compact`).
    pub op: &'static str,
    /// Event kind (`carve`, `coalesce`, `relocate`, ...).
    pub event: &'static str,
    /// Block id involved in the event.
    pub id: Option<u32>,
    /// Size value involved in the event.
    pub size: Option<usize>,
    /// Machine-readable outcome label.
    pub outcome: &'static str,
    /// Free-form details for debugging.
    pub details: String,
    /// Snapshot: currently allocated bytes.
    pub allocated_bytes: usize,
    /// Snapshot: live block count.
    pub block_count: usize,
    /// Snapshot: live hole count.
    pub hole_count: usize,
}

/// Hole-filling allocator over a fixed address range.
#[derive(Debug, Clone)]
pub struct Allocator {
    /// Total size and allocated-byte accounting.
    space: AddressSpace,
    /// Placement strategy, fixed at configuration time.
    strategy: FitStrategy,
    /// Allocated blocks in ascending address order.
    blocks: PartitionList<Block>,
    /// Free holes in ascending address order.
    holes: PartitionList<Hole>,
    /// Monotonic lifecycle decision id.
    next_decision_id: u64,
    /// Structured lifecycle records.
    lifecycle_logs: Vec<LifecycleRecord>,
}

impl Allocator {
    /// Creates an allocator managing `[0, total_size)` with the given
    /// strategy and a single hole spanning the whole space.
    pub fn new(total_size: usize, strategy: FitStrategy) -> Result<Self, AllocError> {
        let mut allocator = Self {
            space: AddressSpace::new(0),
            strategy,
            blocks: PartitionList::new(),
            holes: PartitionList::new(),
            next_decision_id: 1,
            lifecycle_logs: Vec::new(),
        };
        allocator.configure(total_size, strategy)?;
        Ok(allocator)
    }

    /// Resets to an empty layout over `[0, total_size)`.
    ///
    /// Discards all blocks and holes; `allocated_bytes` returns to 0. The
    /// lifecycle log is kept (it spans configurations).
    pub fn configure(&mut self, total_size: usize, strategy: FitStrategy) -> Result<(), AllocError> {
        if total_size == 0 {
            self.record_lifecycle(
                LifecycleLevel::Warn,
                "configure",
                "reject",
                None,
                Some(total_size),
                "denied",
                "total_size_must_be_positive",
            );
            return Err(AllocError::InvalidConfiguration);
        }

        self.space = AddressSpace::new(total_size);
        self.strategy = strategy;
        self.blocks.clear();
        self.holes.clear();
        self.holes.insert(Hole {
            span: Interval::new(0, total_size),
        });
        self.record_lifecycle(
            LifecycleLevel::Info,
            "configure",
            "reset",
            None,
            Some(total_size),
            "success",
            format!("strategy={}", strategy.label()),
        );
        self.check_integrity();
        Ok(())
    }

    /// Allocates a block of `size` bytes under `id`.
    ///
    /// Carves from the start of the hole chosen by the configured strategy;
    /// the hole shrinks by advancing its start, or disappears when consumed
    /// exactly. Holes only shrink here, so no coalescing is needed.
    pub fn allocate(&mut self, id: u32, size: usize) -> Result<BlockSnapshot, AllocError> {
        if size == 0 {
            self.record_failure("allocate", Some(id), Some(size), "size_must_be_positive");
            return Err(AllocError::InvalidSize);
        }
        if self.has_block(id) {
            self.record_failure("allocate", Some(id), Some(size), "duplicate_block_id");
            return Err(AllocError::DuplicateId(id));
        }
        if self.space.would_exceed(size) {
            self.record_failure("allocate", Some(id), Some(size), "capacity_exceeded");
            return Err(AllocError::InsufficientTotalMemory {
                requested: size,
                allocated: self.space.allocated_bytes(),
                total_size: self.space.total_size(),
            });
        }
        let Some(hole_idx) = self.select_hole(size) else {
            self.record_failure("allocate", Some(id), Some(size), "no_fitting_hole");
            return Err(AllocError::NoFittingHole { requested: size });
        };

        let hole_span = self.holes[hole_idx].span;
        let block_span = Interval::new(hole_span.start, hole_span.start + size);
        self.blocks.insert(Block {
            id,
            span: block_span,
        });
        if block_span.end == hole_span.end {
            self.holes.remove(hole_idx);
        } else {
            self.holes[hole_idx].span.start = block_span.end;
        }
        self.space.charge(size);

        self.record_lifecycle(
            LifecycleLevel::Trace,
            "allocate",
            "carve",
            Some(id),
            Some(size),
            "success",
            format!(
                "strategy={} hole=[{},{})",
                self.strategy.label(),
                hole_span.start,
                hole_span.end
            ),
        );
        self.check_integrity();
        Ok(BlockSnapshot {
            id,
            start: block_span.start,
            end: block_span.end,
        })
    }

    /// Frees the block with `id`, turning its exact range into a hole and
    /// coalescing it with any address-adjacent neighbors.
    pub fn deallocate(&mut self, id: u32) -> Result<(), AllocError> {
        let Some(block_idx) = self.blocks.find(|block| block.id == id) else {
            self.record_failure("deallocate", Some(id), None, "unknown_block_id");
            return Err(AllocError::UnknownId(id));
        };

        let block = self.blocks.remove(block_idx);
        let size = block.span.size();
        self.space.release(size);
        self.holes.insert(Hole { span: block.span });
        let merged = self.coalesce_holes();

        self.record_lifecycle(
            LifecycleLevel::Trace,
            "deallocate",
            "coalesce",
            Some(id),
            Some(size),
            "success",
            format!("freed=[{},{}) merged={merged}", block.span.start, block.span.end),
        );
        self.check_integrity();
        Ok(())
    }

    /// Relocates every block to be contiguous from address 0, preserving
    /// the existing address order and each block's size, then collapses all
    /// free space into at most one trailing hole.
    ///
    /// Never allocates or frees memory; `allocated_bytes` is unchanged.
    /// Compacting twice in a row yields the same layout as compacting once.
    pub fn compact(&mut self) {
        let mut cursor = 0;
        let mut walk = self.blocks.head();
        while let Some(idx) = walk {
            let size = self.blocks[idx].span.size();
            self.blocks[idx].span = Interval::new(cursor, cursor + size);
            cursor += size;
            walk = self.blocks.next_of(idx);
        }

        self.holes.clear();
        if cursor < self.space.total_size() {
            self.holes.insert(Hole {
                span: Interval::new(cursor, self.space.total_size()),
            });
        }

        self.record_lifecycle(
            LifecycleLevel::Info,
            "compact",
            "relocate",
            None,
            Some(self.space.allocated_bytes()),
            "success",
            format!("blocks={} tail_hole_start={cursor}", self.blocks.len()),
        );
        self.check_integrity();
    }

    fn select_hole(&self, size: usize) -> Option<usize> {
        match self.strategy {
            FitStrategy::FirstFit => self.holes.find(|hole| hole.span.size() >= size),
            FitStrategy::BestFit => {
                let mut best: Option<(usize, usize)> = None;
                for (idx, hole) in self.holes.iter() {
                    let hole_size = hole.span.size();
                    if hole_size < size {
                        continue;
                    }
                    // Strict < keeps the first minimal candidate on ties.
                    if best.is_none_or(|(_, best_size)| hole_size < best_size) {
                        best = Some((idx, hole_size));
                    }
                }
                best.map(|(idx, _)| idx)
            }
        }
    }

    /// Merges every address-adjacent hole pair, head to tail.
    ///
    /// The pass starts from the head, so a freshly inserted hole merges with
    /// its predecessor as well as its successor. Returns the number of
    /// merges performed.
    fn coalesce_holes(&mut self) -> usize {
        let mut merged = 0;
        let mut cursor = self.holes.head();
        while let Some(idx) = cursor {
            let adjacent = self
                .holes
                .next_of(idx)
                .is_some_and(|next| self.holes[idx].span.abuts(&self.holes[next].span));
            if adjacent {
                self.holes.merge_with_next(idx);
                merged += 1;
            } else {
                cursor = self.holes.next_of(idx);
            }
        }
        merged
    }

    /// Whether a live block carries `id`.
    #[must_use]
    pub fn has_block(&self, id: u32) -> bool {
        self.blocks.find(|block| block.id == id).is_some()
    }

    #[must_use]
    pub fn strategy(&self) -> FitStrategy {
        self.strategy
    }

    #[must_use]
    pub fn total_size(&self) -> usize {
        self.space.total_size()
    }

    #[must_use]
    pub fn allocated_bytes(&self) -> usize {
        self.space.allocated_bytes()
    }

    #[must_use]
    pub fn free_bytes(&self) -> usize {
        self.space.free_bytes()
    }

    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn hole_count(&self) -> usize {
        self.holes.len()
    }

    /// Size of the largest hole, if any hole exists.
    #[must_use]
    pub fn largest_hole(&self) -> Option<usize> {
        self.holes.iter().map(|(_, hole)| hole.span.size()).max()
    }

    /// Blocks in ascending address order.
    #[must_use]
    pub fn block_snapshots(&self) -> Vec<BlockSnapshot> {
        self.blocks
            .iter()
            .map(|(_, block)| BlockSnapshot {
                id: block.id,
                start: block.span.start,
                end: block.span.end,
            })
            .collect()
    }

    /// Holes in ascending address order.
    #[must_use]
    pub fn hole_snapshots(&self) -> Vec<HoleSnapshot> {
        self.holes
            .iter()
            .map(|(_, hole)| HoleSnapshot {
                start: hole.span.start,
                end: hole.span.end,
            })
            .collect()
    }

    /// Full read-only view of the current layout.
    #[must_use]
    pub fn layout(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            total_size: self.space.total_size(),
            allocated_bytes: self.space.allocated_bytes(),
            blocks: self.block_snapshots(),
            holes: self.hole_snapshots(),
        }
    }

    /// Returns a view of the lifecycle log records.
    #[must_use]
    pub fn lifecycle_logs(&self) -> &[LifecycleRecord] {
        &self.lifecycle_logs
    }

    /// Drains the lifecycle log records.
    pub fn drain_lifecycle_logs(&mut self) -> Vec<LifecycleRecord> {
        std::mem::take(&mut self.lifecycle_logs)
    }

    fn next_log_decision_id(&mut self) -> u64 {
        let id = self.next_decision_id;
        self.next_decision_id = self.next_decision_id.wrapping_add(1);
        id
    }

    fn record_failure(&mut self, op: &'static str, id: Option<u32>, size: Option<usize>, why: &'static str) {
        self.record_lifecycle(LifecycleLevel::Warn, op, "reject", id, size, "denied", why);
    }

    fn record_lifecycle(
        &mut self,
        level: LifecycleLevel,
        op: &'static str,
        event: &'static str,
        id: Option<u32>,
        size: Option<usize>,
        outcome: &'static str,
        details: impl Into<String>,
    ) {
        let decision_id = self.next_log_decision_id();
        let trace_id = format!("core::allocator::{op}::{decision_id:016x}");
        self.lifecycle_logs.push(LifecycleRecord {
            decision_id,
            trace_id,
            level,
            op,
            event,
            id,
            size,
            outcome,
            details: details.into(),
            allocated_bytes: self.space.allocated_bytes(),
            block_count: self.blocks.len(),
            hole_count: self.holes.len(),
        });
    }

    /// Debug-build walk of both partitions: blocks and holes must tile
    /// `[0, total_size)` exactly, no two holes may abut, and the cached
    /// byte count must match the block sum.
    #[cfg(debug_assertions)]
    fn check_integrity(&self) {
        let mut block_iter = self.blocks.iter().peekable();
        let mut hole_iter = self.holes.iter().peekable();
        let mut cursor = 0;
        let mut block_bytes = 0;
        let mut prev_hole_end = None;

        while cursor < self.space.total_size() {
            if let Some((_, block)) = block_iter.peek()
                && block.span.start == cursor
            {
                block_bytes += block.span.size();
                cursor = block.span.end;
                block_iter.next();
                continue;
            }
            if let Some((_, hole)) = hole_iter.peek()
                && hole.span.start == cursor
            {
                assert_ne!(
                    prev_hole_end,
                    Some(hole.span.start),
                    "adjacent holes left uncoalesced at {cursor}"
                );
                prev_hole_end = Some(hole.span.end);
                cursor = hole.span.end;
                hole_iter.next();
                continue;
            }
            panic!("partition gap or overlap at address {cursor}");
        }

        assert!(
            block_iter.next().is_none() && hole_iter.next().is_none(),
            "interval extends past end of space"
        );
        assert_eq!(
            block_bytes,
            self.space.allocated_bytes(),
            "allocated_bytes out of sync with block sum"
        );
    }

    #[cfg(not(debug_assertions))]
    fn check_integrity(&self) {}
}
