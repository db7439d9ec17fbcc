//! Draining an enumerator into a caller buffer.
//!
//! A drain resolves the enumeration handle, works out how many bytes of the
//! caller buffer are usable, copies as many whole items as fit, and reports the
//! outcome through the caller's chosen [`CompletionMode`].

use xam_common::XResult;
use xam_object::{Handle, ObjectDirectory};

use crate::{CompletionMode, Enumerator, OverlappedRecord};

/// Outcome of the copy phase of a drain, before it is reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainOutcome {
    pub result: XResult,
    pub items_written: u32,
}

/// One enumeration call.
///
/// `buffer` is the host view of the guest buffer, starting at the guest
/// pointer and extending as far as guest memory is addressable. `buffer_length`
/// is the length the guest claims and is not trusted: writes are bounded by
/// both the (corrected) claimed length and `buffer.len()`.
#[derive(Debug)]
pub struct DrainRequest<'a> {
    pub handle: Handle,
    pub buffer: &'a mut [u8],
    pub buffer_length: u32,
    pub mode: CompletionMode<'a>,
}

impl DrainRequest<'_> {
    /// Runs the request against `directory` and returns what the export call
    /// itself returns.
    pub fn execute<D>(self, directory: &D) -> XResult
    where
        D: ObjectDirectory<dyn Enumerator> + ?Sized,
    {
        let Some(enumerator) = directory.resolve(self.handle) else {
            log::debug!("enumerate: handle {} not found", self.handle);
            return self.mode.invalid_handle();
        };
        let outcome = drain(enumerator.as_ref(), self.buffer, self.buffer_length);
        self.mode.dispatch(outcome.result, outcome.items_written)
    }
}

/// Guest-facing form of a drain: the completion channel is selected by which
/// of the two optional outputs is present.
///
/// Supplying both or neither returns `INVALID_PARAMETER` before the handle is
/// even resolved, so the enumerator and buffer are left untouched.
pub fn enumerate<D>(
    directory: &D,
    handle: Handle,
    buffer: &mut [u8],
    buffer_length: u32,
    items_returned: Option<&mut u32>,
    overlapped: Option<&mut OverlappedRecord>,
) -> XResult
where
    D: ObjectDirectory<dyn Enumerator> + ?Sized,
{
    let mode = match CompletionMode::from_outputs(items_returned, overlapped) {
        Ok(mode) => mode,
        Err(result) => {
            log::warn!("enumerate: exactly one of items_returned/overlapped must be supplied");
            return result;
        }
    };
    DrainRequest {
        handle,
        buffer,
        buffer_length,
        mode,
    }
    .execute(directory)
}

/// Computes how many bytes of the caller buffer may be used.
///
/// Normally that is just `buffer_length`. Some titles, however, pass the
/// enumerator's items-per-enumerate count where the byte length belongs. When
/// `buffer_length` equals `items_per_enumerate` exactly, the claimed length is
/// ignored and the caller is assumed to have room for every item of the
/// enumerator (`item_count * item_size`). No other mismatch is corrected.
pub fn effective_buffer_length(enumerator: &dyn Enumerator, buffer_length: u32) -> u64 {
    if buffer_length != enumerator.items_per_enumerate() {
        return buffer_length as u64;
    }
    let actual = enumerator.item_count() as u64 * enumerator.item_size() as u64;
    // Known callers: Final Fight: Double Impact (saves), Resonance of Fate, Angry Birds.
    log::warn!(
        "broken enumerate usage: buffer length={buffer_length:#X} vs actual length={actual:#X} \
         (item size={:#X}, items per enumerate={})",
        enumerator.item_size(),
        enumerator.items_per_enumerate()
    );
    actual
}

/// Copies as many whole items from `enumerator` into `buffer` as the
/// corrected buffer length allows.
///
/// - `INSUFFICIENT_BUFFER` if not even one item fits;
/// - `NO_MORE_FILES` if the enumerator was already exhausted;
/// - `SUCCESS` otherwise, possibly with fewer items than fit, when the
///   enumerator runs dry part-way (another caller drained it concurrently).
pub fn drain(enumerator: &dyn Enumerator, buffer: &mut [u8], buffer_length: u32) -> DrainOutcome {
    let item_size = enumerator.item_size() as u64;
    let actual_buffer_length = effective_buffer_length(enumerator, buffer_length);

    if actual_buffer_length < item_size {
        return DrainOutcome {
            result: XResult::INSUFFICIENT_BUFFER,
            items_written: 0,
        };
    }
    if enumerator.is_exhausted() {
        return DrainOutcome {
            result: XResult::NO_MORE_FILES,
            items_written: 0,
        };
    }

    let max_items = actual_buffer_length / item_size;
    let mut items_written = 0u32;
    for slot in buffer
        .chunks_exact_mut(item_size as usize)
        .take(usize::try_from(max_items).unwrap_or(usize::MAX))
    {
        if !enumerator.write_item(slot) {
            log::debug!("enumerate: enumerator exhausted after {items_written} of {max_items} items");
            break;
        }
        items_written += 1;
    }

    if (items_written as u64) < max_items && !enumerator.is_exhausted() {
        log::debug!(
            "enumerate: buffer ends after {} bytes, wrote {items_written} of {max_items} items",
            buffer.len()
        );
    }

    DrainOutcome {
        result: XResult::SUCCESS,
        items_written,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use xam_object::ObjectTable;

    use super::*;
    use crate::StaticEnumerator;

    fn numbered(item_size: u32, items_per_enumerate: u32, count: u8) -> StaticEnumerator {
        let mut builder = StaticEnumerator::builder(item_size, items_per_enumerate).unwrap();
        for i in 0..count {
            builder.append_raw(&vec![i + 1; item_size as usize]).unwrap();
        }
        builder.build()
    }

    #[test]
    fn test_effective_length_passthrough() {
        let e = numbered(16, 4, 10);
        assert_eq!(effective_buffer_length(&e, 0), 0);
        assert_eq!(effective_buffer_length(&e, 5), 5);
        assert_eq!(effective_buffer_length(&e, 64), 64);
    }

    #[test]
    fn test_effective_length_quirk() {
        let e = numbered(16, 4, 10);
        assert_eq!(effective_buffer_length(&e, 4), 160);
    }

    #[test]
    fn test_effective_length_quirk_does_not_overflow() {
        struct Huge;

        impl Enumerator for Huge {
            fn item_size(&self) -> u32 {
                0x1000
            }
            fn items_per_enumerate(&self) -> u32 {
                8
            }
            fn item_count(&self) -> u32 {
                u32::MAX
            }
            fn current_item(&self) -> u32 {
                0
            }
            fn write_item(&self, _destination: &mut [u8]) -> bool {
                false
            }
        }

        assert_eq!(effective_buffer_length(&Huge, 8), u32::MAX as u64 * 0x1000);
    }

    #[test]
    fn test_drain_all() {
        let e = numbered(4, 1, 3);
        let mut buffer = [0u8; 16];
        let outcome = drain(&e, &mut buffer, 16);
        assert_eq!(outcome.result, XResult::SUCCESS);
        assert_eq!(outcome.items_written, 3);
        assert_eq!(buffer, [1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 0, 0, 0, 0]);
        assert!(e.is_exhausted());
    }

    #[test]
    fn test_drain_insufficient_buffer() {
        let e = numbered(8, 1, 3);
        let mut buffer = [0u8; 8];
        let outcome = drain(&e, &mut buffer, 7);
        assert_eq!(outcome.result, XResult::INSUFFICIENT_BUFFER);
        assert_eq!(outcome.items_written, 0);
        assert_eq!(e.current_item(), 0);
    }

    #[test]
    fn test_drain_exhausted() {
        let e = numbered(4, 1, 1);
        let mut buffer = [0u8; 8];
        assert_eq!(drain(&e, &mut buffer, 8).items_written, 1);

        let mut buffer = [0xCCu8; 8];
        let outcome = drain(&e, &mut buffer, 8);
        assert_eq!(outcome.result, XResult::NO_MORE_FILES);
        assert_eq!(outcome.items_written, 0);
        assert_eq!(buffer, [0xCC; 8]);
    }

    #[test]
    fn test_drain_truncates_partial_slot() {
        let e = numbered(4, 1, 5);
        let mut buffer = [0u8; 12];
        let outcome = drain(&e, &mut buffer, 11);
        assert_eq!(outcome.items_written, 2);
        assert_eq!(&buffer[8..], [0, 0, 0, 0]);
        assert_eq!(e.current_item(), 2);
    }

    #[test]
    fn test_drain_bounded_by_host_buffer() {
        // The claimed length says 4 items, the addressable span only holds 2.
        let e = numbered(4, 1, 5);
        let mut buffer = [0u8; 9];
        let outcome = drain(&e, &mut buffer, 16);
        assert_eq!(outcome.result, XResult::SUCCESS);
        assert_eq!(outcome.items_written, 2);
        assert_eq!(buffer[8], 0);
        assert_eq!(e.current_item(), 2);
    }

    #[test]
    fn test_enumerate_sync_and_async() {
        let table = ObjectTable::<dyn Enumerator>::new();
        let handle = table.register(Arc::new(numbered(4, 1, 2))).unwrap();

        let mut buffer = [0u8; 4];
        let mut count = 0;
        let result = enumerate(&table, handle, &mut buffer, 4, Some(&mut count), None);
        assert_eq!(result, XResult::SUCCESS);
        assert_eq!(count, 1);
        assert_eq!(buffer, [1; 4]);

        let mut record = OverlappedRecord::default();
        let result = enumerate(&table, handle, &mut buffer, 4, None, Some(&mut record));
        assert_eq!(result, XResult::IO_PENDING);
        assert_eq!(record.result, XResult::SUCCESS);
        assert_eq!(record.length, 1);
        assert_eq!(buffer, [2; 4]);

        let result = enumerate(&table, handle, &mut buffer, 4, None, Some(&mut record));
        assert_eq!(result, XResult::IO_PENDING);
        assert_eq!(record.result, XResult::FUNCTION_FAILED);
        assert_eq!(record.extended_error, XResult::NO_MORE_FILES.to_hresult());
        assert_eq!(record.length, 0);
    }

    #[test]
    fn test_enumerate_unknown_handle() {
        let table = ObjectTable::<dyn Enumerator>::new();
        let mut buffer = [0u8; 4];
        let mut count = 5;
        let result = enumerate(
            &table,
            Handle::from_raw(0xF800_0000),
            &mut buffer,
            4,
            Some(&mut count),
            None,
        );
        assert_eq!(result, XResult::INVALID_HANDLE);

        let mut record = OverlappedRecord::default();
        let result = enumerate(&table, Handle::INVALID, &mut buffer, 4, None, Some(&mut record));
        assert_eq!(result, XResult::IO_PENDING);
        assert_eq!(record.result, XResult::INVALID_HANDLE);
        assert_eq!(record.length, 0);
    }
}
