use std::sync::atomic::{AtomicU32, Ordering};

/// A forward-only cursor over a fixed collection of fixed-size items.
///
/// Enumerators are owned by an object directory and shared with every export
/// call that resolves their handle, so all methods take `&self`; the cursor
/// position is interior state.
///
/// # Invariants
///
/// - `item_size() > 0`.
/// - `item_count()` never changes after construction.
/// - `current_item()` never decreases and never exceeds `item_count()`.
pub trait Enumerator: Send + Sync {
    /// Bytes occupied by one serialized item.
    fn item_size(&self) -> u32;

    /// The batch size advertised to the guest when the enumerator was created.
    ///
    /// This is only a hint and is unrelated to the byte size of any buffer.
    fn items_per_enumerate(&self) -> u32;

    /// Total number of items the enumerator will ever produce.
    fn item_count(&self) -> u32;

    /// Index of the next item to be written.
    fn current_item(&self) -> u32;

    /// Serializes the current item into `destination` and advances the cursor.
    ///
    /// `destination` is exactly `item_size()` bytes long. Returns `false`
    /// without touching `destination` if the enumerator is already exhausted.
    fn write_item(&self, destination: &mut [u8]) -> bool;

    fn is_exhausted(&self) -> bool {
        self.current_item() >= self.item_count()
    }
}

/// An atomic cursor over `0..count`.
///
/// [`claim`](ItemCursor::claim) is a test-and-increment: concurrent callers
/// each receive a distinct index, indices are handed out in order, and no
/// index is skipped.
#[derive(Debug)]
pub struct ItemCursor {
    position: AtomicU32,
    count: u32,
}

impl ItemCursor {
    pub fn new(count: u32) -> ItemCursor {
        ItemCursor {
            position: AtomicU32::new(0),
            count,
        }
    }

    pub fn position(&self) -> u32 {
        self.position.load(Ordering::Acquire)
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Takes the next index, or returns `None` once all `count` indices have
    /// been claimed.
    pub fn claim(&self) -> Option<u32> {
        let mut current = self.position.load(Ordering::Relaxed);
        while current < self.count {
            match self.position.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Some(current),
                Err(actual) => current = actual,
            }
        }
        None
    }
}
