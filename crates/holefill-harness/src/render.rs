//! Table rendering of layout snapshots.
//!
//! Pure string building from read-only snapshots; the allocator never calls
//! into this module.

use std::fmt::Write as _;

use holefill_core::LayoutSnapshot;

/// The allocated-block table (`ID / Start / End`, address order).
#[must_use]
pub fn render_blocks(layout: &LayoutSnapshot) -> String {
    let mut out = String::from("ID\tStart\tEnd\n-------------------\n");
    for block in &layout.blocks {
        let _ = writeln!(out, "{}\t{}\t{}", block.id, block.start, block.end);
    }
    out
}

/// The free-hole table (`Start / End`, address order).
#[must_use]
pub fn render_holes(layout: &LayoutSnapshot) -> String {
    let mut out = String::from("Start\tEnd\n-------------------\n");
    for hole in &layout.holes {
        let _ = writeln!(out, "{}\t{}", hole.start, hole.end);
    }
    out
}

/// Both tables plus a one-line usage summary.
#[must_use]
pub fn render_layout(layout: &LayoutSnapshot) -> String {
    format!(
        "\nBlocks\n{}\nHoles\n{}\n{} of {} bytes allocated ({} free)\n",
        render_blocks(layout),
        render_holes(layout),
        layout.allocated_bytes,
        layout.total_size,
        layout.free_bytes(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use holefill_core::{Allocator, FitStrategy};

    fn sample_layout() -> LayoutSnapshot {
        let mut allocator = Allocator::new(100, FitStrategy::FirstFit).unwrap();
        allocator.allocate(0, 30).unwrap();
        allocator.allocate(1, 20).unwrap();
        allocator.deallocate(0).unwrap();
        allocator.layout()
    }

    #[test]
    fn block_table_lists_rows_in_address_order() {
        let table = render_blocks(&sample_layout());
        assert!(table.starts_with("ID\tStart\tEnd\n"));
        assert!(table.contains("1\t30\t50"));
    }

    #[test]
    fn hole_table_lists_both_holes() {
        let table = render_holes(&sample_layout());
        assert!(table.contains("0\t30"));
        assert!(table.contains("50\t100"));
    }

    #[test]
    fn layout_summary_counts_bytes() {
        let rendered = render_layout(&sample_layout());
        assert!(rendered.contains("20 of 100 bytes allocated (80 free)"));
    }
}
