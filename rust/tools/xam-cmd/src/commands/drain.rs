//! Drain command implementation

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use xam_common::XResult;
use xam_kernel::{
    KernelState,
    overlapped::{OVERLAPPED_SIZE, read_overlapped},
};
use xam_testkit::{decode_indices, numbered_enumerator};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Report the item count through an output slot
    Sync,
    /// Report the outcome through an overlapped block
    Async,
}

#[derive(Args, Debug, Clone)]
pub struct DrainArgs {
    /// Size of one item in bytes (at least 4: each item starts with its index)
    #[arg(long, default_value_t = 16)]
    pub item_size: u32,

    /// Number of items in the enumerator
    #[arg(long, default_value_t = 10)]
    pub items: u32,

    /// Items the enumerator advertises per call
    #[arg(long, default_value_t = 4)]
    pub items_per_enumerate: u32,

    /// Buffer length claimed by the caller (defaults to item_size * items_per_enumerate)
    #[arg(long)]
    pub buffer_length: Option<u32>,

    /// Bytes actually allocated for the buffer (defaults to the claimed length)
    #[arg(long)]
    pub alloc: Option<u32>,

    #[arg(long, value_enum, default_value_t = Mode::Sync)]
    pub mode: Mode,
}

/// Outcome of one XamEnumerate call as the caller observes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallReport {
    pub returned: XResult,
    /// The direct result in sync mode, the overlapped result in async mode.
    pub completion: XResult,
    pub extended_error: u32,
    pub indices: Vec<u32>,
}

pub fn run(state: &KernelState, args: &DrainArgs) -> Result<()> {
    for (call, report) in drain_calls(state, args)?.iter().enumerate() {
        let items = match (report.indices.first(), report.indices.last()) {
            (Some(first), Some(last)) => format!("{} [{first}..={last}]", report.indices.len()),
            _ => "0".to_string(),
        };
        println!(
            "call {call}: returned {:?}, completion {:?}, extended {:#010X}, items {items}",
            report.returned, report.completion, report.extended_error
        );
    }
    Ok(())
}

/// Registers a numbered enumerator and calls XamEnumerate until it stops
/// returning items.
pub fn drain_calls(state: &KernelState, args: &DrainArgs) -> Result<Vec<CallReport>> {
    let enumerator = numbered_enumerator(args.item_size, args.items_per_enumerate, args.items)?;
    let handle = state
        .register_enumerator(Arc::new(enumerator))
        .context("Enumerator handle space exhausted")?;

    let buffer_length = match args.buffer_length {
        Some(length) => length,
        None => args
            .item_size
            .checked_mul(args.items_per_enumerate)
            .context("Default buffer length overflows")?,
    };
    let alloc = args.alloc.unwrap_or(buffer_length);
    let heap = state.heap();
    let buffer = heap.alloc(alloc.max(1))?;
    let slot_size = match args.mode {
        Mode::Sync => 4,
        Mode::Async => OVERLAPPED_SIZE as u32,
    };
    let slot = heap.alloc(slot_size)?;

    let memory = state.memory();
    let mut reports = Vec::new();
    loop {
        let (items_returned_ptr, overlapped_ptr) = match args.mode {
            Mode::Sync => (slot, 0),
            Mode::Async => (0, slot),
        };
        let returned = state.xam_enumerate(
            handle.raw(),
            0,
            buffer,
            buffer_length,
            items_returned_ptr,
            overlapped_ptr,
        );
        let (completion, extended_error, count) = match args.mode {
            Mode::Sync => (returned, 0, memory.load_u32(slot)?),
            Mode::Async => {
                let record = read_overlapped(memory, slot)?;
                (record.result, record.extended_error, record.length)
            }
        };
        let written = memory.read_bytes(buffer, (count as usize) * args.item_size as usize)?;
        let indices = decode_indices(&written, args.item_size, count);
        reports.push(CallReport {
            returned,
            completion,
            extended_error,
            indices,
        });
        if !completion.is_success() || count == 0 {
            break;
        }
    }

    state.release_handle(handle);
    heap.free(slot)?;
    heap.free(buffer)?;
    Ok(reports)
}
