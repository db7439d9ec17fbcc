use std::{collections::BTreeMap, sync::Arc};

use parking_lot::Mutex;
use xam_common::{Result, error::Error, verify_arg};

use crate::{GuestAddress, GuestMemory};

/// Allocation granularity (and alignment) of the system heap.
pub const HEAP_ALIGNMENT: u32 = 8;

/// A first-fit allocator over a fixed range of guest memory.
///
/// Blocks are `HEAP_ALIGNMENT`-aligned and zero-filled on allocation. Freed
/// blocks are merged with adjacent free space.
pub struct SystemHeap {
    memory: Arc<GuestMemory>,
    base: GuestAddress,
    size: u32,
    state: Mutex<HeapState>,
}

#[derive(Default)]
struct HeapState {
    /// Free blocks: start address -> length.
    free: BTreeMap<GuestAddress, u32>,
    /// Live allocations: start address -> length.
    allocated: BTreeMap<GuestAddress, u32>,
}

impl SystemHeap {
    /// Creates a heap managing `[base, base + size)` of `memory`.
    pub fn new(memory: Arc<GuestMemory>, base: GuestAddress, size: u32) -> Result<SystemHeap> {
        verify_arg!(base, base % HEAP_ALIGNMENT == 0);
        verify_arg!(size, size >= HEAP_ALIGNMENT);
        if !memory.contains(base, size as usize) {
            return Err(Error::invalid_arg(
                "size",
                format!("heap [{base:#X}, +{size:#X}) is outside guest memory"),
            ));
        }
        let size = size - size % HEAP_ALIGNMENT;
        let mut state = HeapState::default();
        state.free.insert(base, size);
        Ok(SystemHeap {
            memory,
            base,
            size,
            state: Mutex::new(state),
        })
    }

    pub fn base(&self) -> GuestAddress {
        self.base
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Total bytes currently available for allocation.
    pub fn available(&self) -> u32 {
        self.state.lock().free.values().sum()
    }

    /// Allocates `size` bytes (rounded up to the heap alignment, at least one
    /// granule) and zero-fills them.
    pub fn alloc(&self, size: u32) -> Result<GuestAddress> {
        let rounded = size
            .max(1)
            .checked_next_multiple_of(HEAP_ALIGNMENT)
            .ok_or_else(|| Error::out_of_memory(size))?;

        let address = {
            let mut state = self.state.lock();
            let (&start, &len) = state
                .free
                .iter()
                .find(|&(_, &len)| len >= rounded)
                .ok_or_else(|| Error::out_of_memory(size))?;
            state.free.remove(&start);
            if len > rounded {
                state.free.insert(start + rounded, len - rounded);
            }
            state.allocated.insert(start, rounded);
            start
        };

        self.memory.zero_fill(address, rounded as usize)?;
        log::trace!("system heap alloc {size:#X} -> {address:#010X}");
        Ok(address)
    }

    /// Returns a block obtained from [`alloc`](Self::alloc) to the heap.
    pub fn free(&self, address: GuestAddress) -> Result<()> {
        let mut state = self.state.lock();
        let mut len = state.allocated.remove(&address).ok_or_else(|| {
            Error::invalid_arg("address", format!("{address:#010X} is not a heap block"))
        })?;
        let mut start = address;

        if let Some(next_len) = state.free.remove(&(start + len)) {
            len += next_len;
        }
        let prev = state
            .free
            .range(..start)
            .next_back()
            .map(|(&prev_start, &prev_len)| (prev_start, prev_len));
        if let Some((prev_start, prev_len)) = prev {
            if prev_start + prev_len == start {
                state.free.remove(&prev_start);
                start = prev_start;
                len += prev_len;
            }
        }
        state.free.insert(start, len);
        log::trace!("system heap free {address:#010X}");
        Ok(())
    }
}

impl std::fmt::Debug for SystemHeap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemHeap")
            .field("base", &format_args!("{:#010X}", self.base))
            .field("size", &format_args!("{:#X}", self.size))
            .finish_non_exhaustive()
    }
}
