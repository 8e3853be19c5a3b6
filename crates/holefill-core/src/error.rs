//! Allocator error taxonomy.

use thiserror::Error;

/// Errors returned by allocator operations.
///
/// Every variant is recoverable and reported to the caller; a failed
/// operation leaves the allocator completely unchanged. The interactive
/// layer is expected to re-prompt on these, never the core itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
    /// Total size of the address space must be positive.
    #[error("total memory size must be greater than 0")]
    InvalidConfiguration,
    /// Requested block size must be positive.
    #[error("block size must be greater than 0")]
    InvalidSize,
    /// The request would push allocated bytes past the total size.
    #[error(
        "not enough memory for {requested} more bytes ({allocated} of {total_size} already in use)"
    )]
    InsufficientTotalMemory {
        requested: usize,
        allocated: usize,
        total_size: usize,
    },
    /// A live block already carries this id.
    #[error("block id {0} is already allocated")]
    DuplicateId(u32),
    /// No single hole is large enough for the request.
    #[error("no hole large enough for a block of {requested} bytes")]
    NoFittingHole { requested: usize },
    /// No live block carries this id.
    #[error("no allocated block has id {0}")]
    UnknownId(u32),
}

impl AllocError {
    /// Stable machine-readable label for reports and logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration => "invalid_configuration",
            Self::InvalidSize => "invalid_size",
            Self::InsufficientTotalMemory { .. } => "insufficient_total_memory",
            Self::DuplicateId(_) => "duplicate_id",
            Self::NoFittingHole { .. } => "no_fitting_hole",
            Self::UnknownId(_) => "unknown_id",
        }
    }
}
