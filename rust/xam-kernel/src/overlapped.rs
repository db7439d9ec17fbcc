//! Guest layout of `XAM_OVERLAPPED`.
//!
//! | offset | field                |
//! |--------|----------------------|
//! | `0x00` | result               |
//! | `0x04` | length               |
//! | `0x08` | context              |
//! | `0x0C` | event                |
//! | `0x10` | completion routine   |
//! | `0x14` | completion context   |
//! | `0x18` | extended error       |
//!
//! All fields are big-endian `u32`. Only `result`, `length` and
//! `extended_error` are written on completion; signalling `event` and queueing
//! the completion routine belong to whoever waits on the block.

use xam_common::{Result, XResult, error::Error};
use xam_enumerator::OverlappedRecord;
use xam_memory::{GuestAddress, GuestMemory};

pub const OVERLAPPED_SIZE: usize = 0x1C;

const RESULT_OFFSET: u32 = 0x00;
const LENGTH_OFFSET: u32 = 0x04;
const EVENT_OFFSET: u32 = 0x0C;
const EXTENDED_ERROR_OFFSET: u32 = 0x18;

/// Reads the completion fields of the overlapped block at `address`.
pub fn read_overlapped(memory: &GuestMemory, address: GuestAddress) -> Result<OverlappedRecord> {
    check_block(memory, address)?;
    Ok(OverlappedRecord {
        result: XResult(memory.load_u32(address + RESULT_OFFSET)?),
        extended_error: memory.load_u32(address + EXTENDED_ERROR_OFFSET)?,
        length: memory.load_u32(address + LENGTH_OFFSET)?,
    })
}

/// Writes a completed record into the overlapped block at `address`.
pub fn write_overlapped(
    memory: &GuestMemory,
    address: GuestAddress,
    record: &OverlappedRecord,
) -> Result<()> {
    check_block(memory, address)?;
    memory.store_u32(address + RESULT_OFFSET, record.result.code())?;
    memory.store_u32(address + LENGTH_OFFSET, record.length)?;
    memory.store_u32(address + EXTENDED_ERROR_OFFSET, record.extended_error)?;
    let event = memory.load_u32(address + EVENT_OFFSET)?;
    if event != 0 {
        log::debug!("overlapped {address:#010X} completed; event {event:#010X} left to the waiter");
    }
    Ok(())
}

/// The whole block must be mapped, which also keeps the field offsets from
/// overflowing.
fn check_block(memory: &GuestMemory, address: GuestAddress) -> Result<()> {
    if memory.contains(address, OVERLAPPED_SIZE) {
        Ok(())
    } else {
        Err(Error::access_violation(address, OVERLAPPED_SIZE))
    }
}
