//! Scripted interactive sessions against the menu loop.

use std::io::Cursor;

use holefill_core::{Allocator, FitStrategy};
use holefill_harness::repl::run_session;

fn run_script(script: &str, initial: Option<Allocator>) -> String {
    let mut input = Cursor::new(script.as_bytes().to_vec());
    let mut output = Vec::new();
    run_session(&mut input, &mut output, initial).expect("session io");
    String::from_utf8(output).expect("utf8 output")
}

#[test]
fn configure_allocate_and_quit() {
    let output = run_script("1\n100\n0\n2\n0\n30\n6\n", None);
    assert!(output.contains("Enter size of physical memory: "));
    assert!(output.contains("Allocated block 0 at [0, 30)."));
    assert!(output.contains("0\t0\t30"), "block table row missing:\n{output}");
    assert!(output.contains("30\t100"), "hole table row missing:\n{output}");
}

#[test]
fn invalid_inputs_are_reprompted() {
    // Size 0 and strategy 7 must each be asked again.
    let output = run_script("1\n0\n100\n7\n1\n6\n", None);
    assert!(output.contains("ERROR: Memory size must be greater than 0!"));
    assert!(output.contains("ERROR: Algorithm choice must be either 0 or 1!"));
    assert!(output.contains("0 of 100 bytes allocated"));
}

#[test]
fn duplicate_id_is_rejected_before_size_prompt() {
    let output = run_script("2\n0\n30\n2\n0\n1\n20\n6\n", configured(100));
    assert!(output.contains("ERROR: ID must not be duplicate!"));
    assert!(output.contains("Allocated block 1 at [30, 50)."));
}

#[test]
fn oversized_request_reprompts_for_size() {
    let output = run_script("2\n0\n150\n40\n6\n", configured(100));
    assert!(output.contains("ERROR: Not enough memory in system to support a block of size 150!"));
    assert!(output.contains("Allocated block 0 at [0, 40)."));
}

#[test]
fn fragmented_request_names_the_hole_limit() {
    // Two 10-byte blocks, free the first: free total is 90 but the largest
    // hole is 80, so a request of 85 must be re-asked.
    let output = run_script(
        "2\n0\n10\n2\n1\n10\n3\n0\n2\n2\n85\n80\n6\n",
        configured(100),
    );
    assert!(output.contains("ERROR: No holes large enough to fit a block of size 85!"));
    assert!(output.contains("Allocated block 2 at [20, 100)."));
}

#[test]
fn deallocate_unknown_id_is_reprompted() {
    let output = run_script("2\n0\n30\n3\n9\n0\n6\n", configured(100));
    assert!(output.contains("ERROR: ID not valid!"));
    assert!(output.contains("0 of 100 bytes allocated (100 free)"));
}

#[test]
fn operations_before_configure_are_refused() {
    let output = run_script("2\n6\n", None);
    assert!(output.contains("ERROR: Enter parameters first!"));
}

#[test]
fn compact_via_menu_collapses_holes() {
    // Allocate 10/10, free the first, compact: block 1 slides to the front.
    let output = run_script("2\n0\n10\n2\n1\n10\n3\n0\n4\n6\n", configured(100));
    assert!(output.contains("1\t0\t10"), "block 1 should move to [0, 10):\n{output}");
    assert!(output.contains("10\t100"), "one trailing hole expected:\n{output}");
}

#[test]
fn log_dump_reports_operations_then_empties() {
    let output = run_script("2\n0\n10\n5\n5\n6\n", configured(100));
    assert!(output.contains("allocate/carve outcome=success"));
    assert!(output.contains("No operations recorded since the last dump."));
}

#[test]
fn end_of_input_terminates_cleanly() {
    let output = run_script("1\n100\n", None);
    assert!(output.contains("Enter hole-fitting algorithm"));
}

fn configured(total_size: usize) -> Option<Allocator> {
    Some(Allocator::new(total_size, FitStrategy::FirstFit).expect("valid size"))
}
