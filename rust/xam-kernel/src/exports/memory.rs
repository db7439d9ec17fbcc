use xam_common::XResult;
use xam_memory::GuestAddress;

use crate::state::KernelState;

impl KernelState {
    /// `XamAlloc`: allocates `size` zeroed bytes from the system heap and stores
    /// the address at `out_ptr`.
    ///
    /// On heap exhaustion 0 is stored and `NOT_ENOUGH_MEMORY` returned.
    pub fn xam_alloc(&self, flags: u32, size: u32, out_ptr: GuestAddress) -> XResult {
        if flags != 0 {
            log::warn!("XamAlloc: unexpected flags {flags:#X}");
        }
        if !self.memory().contains(out_ptr, 4) {
            return XResult::INVALID_PARAMETER;
        }
        let (result, address) = match self.heap().alloc(size) {
            Ok(address) => (XResult::SUCCESS, address),
            Err(err) => {
                log::warn!("XamAlloc: {err}");
                (XResult::NOT_ENOUGH_MEMORY, 0)
            }
        };
        if let Err(err) = self.memory().store_u32(out_ptr, address) {
            log::error!("XamAlloc: {err}");
        }
        result
    }

    /// `XamFree`: returns a block obtained from [`xam_alloc`](Self::xam_alloc).
    ///
    /// Always reports success; freeing null or an unknown block is only logged.
    pub fn xam_free(&self, ptr: GuestAddress) -> XResult {
        if let Err(err) = self.heap().free(ptr) {
            log::warn!("XamFree({ptr:#010X}): {err}");
        }
        XResult::SUCCESS
    }
}
