use xam_common::XResult;
use xam_enumerator::{CompletionMode, DrainRequest, OverlappedRecord};
use xam_memory::GuestAddress;
use xam_object::Handle;

use crate::{
    overlapped::{OVERLAPPED_SIZE, write_overlapped},
    state::KernelState,
};

impl KernelState {
    /// `XamEnumerate`: drains the enumerator behind `handle` into the guest
    /// buffer at `buffer_ptr`.
    ///
    /// Exactly one of `items_returned_ptr` (synchronous: the item count is
    /// stored there and the result returned directly) and `overlapped_ptr`
    /// (asynchronous: `IO_PENDING` is returned and the outcome is written into
    /// the `XAM_OVERLAPPED` block) must be non-zero and mapped; otherwise the
    /// call fails with `INVALID_PARAMETER` and changes nothing.
    ///
    /// The buffer may extend up to the end of guest memory; items are never
    /// written past it, whatever length the guest claims. A buffer pointer that
    /// is not mapped at all behaves like a buffer with no room.
    pub fn xam_enumerate(
        &self,
        handle: u32,
        flags: u32,
        buffer_ptr: GuestAddress,
        buffer_length: u32,
        items_returned_ptr: GuestAddress,
        overlapped_ptr: GuestAddress,
    ) -> XResult {
        log::debug!(
            "XamEnumerate({handle:#010X}, {flags:#X}, {buffer_ptr:#010X}, {buffer_length:#X}, \
             {items_returned_ptr:#010X}, {overlapped_ptr:#010X})"
        );
        if flags != 0 {
            log::warn!("XamEnumerate: unexpected flags {flags:#X}");
        }

        let sync = items_returned_ptr != 0;
        let overlapped = overlapped_ptr != 0;
        if (sync && !self.memory().contains(items_returned_ptr, 4))
            || (overlapped && !self.memory().contains(overlapped_ptr, OVERLAPPED_SIZE))
        {
            log::warn!("XamEnumerate: completion output is not mapped");
            return XResult::INVALID_PARAMETER;
        }

        let mut items_returned = 0u32;
        let mut record = OverlappedRecord::default();
        let mode = match CompletionMode::from_outputs(
            sync.then_some(&mut items_returned),
            overlapped.then_some(&mut record),
        ) {
            Ok(mode) => mode,
            Err(result) => {
                log::warn!("XamEnumerate: exactly one completion output must be supplied");
                return result;
            }
        };
        let was_sync = !mode.is_async();

        let handle = Handle::from_raw(handle);
        let request = |buffer: &mut [u8]| {
            DrainRequest {
                handle,
                buffer,
                buffer_length,
                mode,
            }
            .execute(self.enumerators())
        };
        let result = if self.memory().contains(buffer_ptr, 0) {
            self.memory().with_tail_mut(buffer_ptr, request)
        } else {
            log::warn!("XamEnumerate: buffer {buffer_ptr:#010X} is not mapped");
            let empty: &mut [u8] = &mut [];
            Ok(request(empty))
        };
        let result = match result {
            Ok(result) => result,
            Err(err) => {
                log::error!("XamEnumerate: {err}");
                return XResult::INVALID_PARAMETER;
            }
        };

        let stored = if was_sync {
            // The slot is only reported through when a drain actually ran.
            if result == XResult::INVALID_HANDLE {
                Ok(())
            } else {
                self.memory().store_u32(items_returned_ptr, items_returned)
            }
        } else {
            write_overlapped(self.memory(), overlapped_ptr, &record)
        };
        if let Err(err) = stored {
            log::error!("XamEnumerate: failed to store completion: {err}");
        }
        result
    }
}
