//! Interactive menu loop.
//!
//! The one place that talks to a terminal. Every numeric input is re-asked
//! until it satisfies the core's preconditions, so by the time an operation
//! runs it is expected to succeed; core errors are still printed rather
//! than trusted away. The loop is generic over its streams so sessions can
//! be scripted in tests.

use std::io::{self, BufRead, Write};

use holefill_core::{Allocator, FitStrategy, SharedAllocator};

use crate::render;

const MENU: &str = "\nMemory allocation\n-----------------\n1) Enter parameters\n2) Allocate memory for block\n3) Deallocate memory for block\n4) Compact memory\n5) Show operation log\n6) Quit program\n";

/// Drives a full interactive session until quit or end of input.
///
/// `initial` seeds a preconfigured allocator (from CLI flags); otherwise
/// menu item 1 must run first.
pub fn run_session<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    initial: Option<Allocator>,
) -> io::Result<()> {
    let mut session = initial.map(SharedAllocator::new);

    loop {
        write!(output, "{MENU}\nEnter selection: ")?;
        output.flush()?;
        let Some(selection) = read_line(input)? else {
            return Ok(());
        };

        match selection.as_str() {
            "1" => {
                if let Some(allocator) = configure_flow(input, output)? {
                    write!(output, "{}", render::render_layout(&allocator.layout()))?;
                    session = Some(SharedAllocator::new(allocator));
                }
            }
            "2" | "3" | "4" | "5" => match session.as_ref() {
                None => writeln!(output, "ERROR: Enter parameters first!")?,
                Some(shared) => match selection.as_str() {
                    "2" => allocate_flow(shared, input, output)?,
                    "3" => deallocate_flow(shared, input, output)?,
                    "4" => {
                        shared.with(|allocator| allocator.compact());
                        write!(output, "{}", render::render_layout(&shared.layout()))?;
                    }
                    _ => log_flow(shared, output)?,
                },
            },
            "6" => return Ok(()),
            _ => writeln!(output, "ERROR: Input not recognized, must be from options above.")?,
        }
    }
}

fn configure_flow<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> io::Result<Option<Allocator>> {
    let Some(size) = prompt_until(input, output, "Enter size of physical memory: ", |value| {
        if value > 0 {
            Ok(())
        } else {
            Err(String::from("ERROR: Memory size must be greater than 0!"))
        }
    })?
    else {
        return Ok(None);
    };

    let Some(code) = prompt_until(
        input,
        output,
        "Enter hole-fitting algorithm (0=first fit, 1=best fit): ",
        |value| {
            if FitStrategy::from_code(u8::try_from(value).unwrap_or(u8::MAX)).is_some() {
                Ok(())
            } else {
                Err(String::from(
                    "ERROR: Algorithm choice must be either 0 or 1!",
                ))
            }
        },
    )?
    else {
        return Ok(None);
    };

    let strategy = if code == 0 {
        FitStrategy::FirstFit
    } else {
        FitStrategy::BestFit
    };
    match Allocator::new(size as usize, strategy) {
        Ok(allocator) => Ok(Some(allocator)),
        Err(err) => {
            writeln!(output, "ERROR: {err}")?;
            Ok(None)
        }
    }
}

fn allocate_flow<R: BufRead, W: Write>(
    shared: &SharedAllocator,
    input: &mut R,
    output: &mut W,
) -> io::Result<()> {
    let Some(id) = prompt_until(input, output, "Enter block id: ", |value| {
        if value < 0 || value > i64::from(u32::MAX) {
            return Err(String::from("ERROR: ID must be non-negative!"));
        }
        if shared.with(|allocator| allocator.has_block(value as u32)) {
            return Err(String::from("ERROR: ID must not be duplicate!"));
        }
        Ok(())
    })?
    else {
        return Ok(());
    };

    let Some(size) = prompt_until(input, output, "Enter block size: ", |value| {
        if value <= 0 {
            return Err(String::from(
                "ERROR: The size of the block must be greater than 0!",
            ));
        }
        let size = value as usize;
        shared.with(|allocator| {
            if size > allocator.free_bytes() {
                Err(format!(
                    "ERROR: Not enough memory in system to support a block of size {size}!"
                ))
            } else if allocator.largest_hole().is_none_or(|largest| largest < size) {
                Err(format!(
                    "ERROR: No holes large enough to fit a block of size {size}!"
                ))
            } else {
                Ok(())
            }
        })
    })?
    else {
        return Ok(());
    };

    match shared.with(|allocator| allocator.allocate(id as u32, size as usize)) {
        Ok(block) => writeln!(
            output,
            "Allocated block {} at [{}, {}).",
            block.id, block.start, block.end
        )?,
        Err(err) => writeln!(output, "ERROR: {err}")?,
    }
    write!(output, "{}", render::render_layout(&shared.layout()))?;
    Ok(())
}

fn deallocate_flow<R: BufRead, W: Write>(
    shared: &SharedAllocator,
    input: &mut R,
    output: &mut W,
) -> io::Result<()> {
    let Some(id) = prompt_until(input, output, "Enter block id: ", |value| {
        if value < 0 || value > i64::from(u32::MAX) {
            return Err(String::from("ERROR: ID must be non-negative!"));
        }
        if shared.with(|allocator| allocator.has_block(value as u32)) {
            Ok(())
        } else {
            Err(String::from("ERROR: ID not valid!"))
        }
    })?
    else {
        return Ok(());
    };

    match shared.with(|allocator| allocator.deallocate(id as u32)) {
        Ok(()) => {}
        Err(err) => writeln!(output, "ERROR: {err}")?,
    }
    write!(output, "{}", render::render_layout(&shared.layout()))?;
    Ok(())
}

fn log_flow<W: Write>(shared: &SharedAllocator, output: &mut W) -> io::Result<()> {
    let records = shared.with(|allocator| allocator.drain_lifecycle_logs());
    if records.is_empty() {
        writeln!(output, "No operations recorded since the last dump.")?;
        return Ok(());
    }
    for record in records {
        writeln!(
            output,
            "#{} {}/{} outcome={} {}",
            record.decision_id, record.op, record.event, record.outcome, record.details
        )?;
    }
    Ok(())
}

fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Prompts repeatedly until the entered number passes `validate`.
///
/// Returns `None` only when the input stream ends.
fn prompt_until<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    mut validate: impl FnMut(i64) -> Result<(), String>,
) -> io::Result<Option<i64>> {
    loop {
        write!(output, "{prompt}")?;
        output.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        let Ok(value) = line.parse::<i64>() else {
            writeln!(output, "ERROR: Enter a number.")?;
            continue;
        };
        match validate(value) {
            Ok(()) => return Ok(Some(value)),
            Err(message) => writeln!(output, "{message}")?,
        }
    }
}
