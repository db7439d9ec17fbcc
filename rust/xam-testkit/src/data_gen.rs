//! Synthetic enumeration data.

use std::sync::Arc;

use byteorder::{BigEndian, ByteOrder};
use parking_lot::Mutex;
use xam_enumerator::{Enumerator, StaticEnumerator};

/// Builds an enumerator of `count` items of `item_size` bytes each.
///
/// Item `i` starts with `i` as a big-endian `u32`; the remaining bytes are
/// filled with `i as u8 ^ 0x5A`, so truncated or misplaced copies are visible.
/// `item_size` must be at least 4.
pub fn numbered_enumerator(
    item_size: u32,
    items_per_enumerate: u32,
    count: u32,
) -> anyhow::Result<StaticEnumerator> {
    anyhow::ensure!(item_size >= 4, "item size {item_size} cannot hold an index");
    let mut builder = StaticEnumerator::builder(item_size, items_per_enumerate)?;
    let mut item = vec![0u8; item_size as usize];
    for i in 0..count {
        BigEndian::write_u32(&mut item[..4], i);
        item[4..].fill(i as u8 ^ 0x5A);
        builder.append_raw(&item)?;
    }
    Ok(builder.build())
}

/// Decodes the indices of the first `count` numbered items in `buffer`,
/// checking each item's filler bytes along the way.
pub fn decode_indices(buffer: &[u8], item_size: u32, count: u32) -> Vec<u32> {
    buffer
        .chunks_exact(item_size as usize)
        .take(count as usize)
        .map(|item| {
            let index = BigEndian::read_u32(&item[..4]);
            assert!(
                item[4..].iter().all(|&b| b == index as u8 ^ 0x5A),
                "item {index} is corrupt"
            );
            index
        })
        .collect()
}

/// Picks `k` with `0 < k < count`. `count` must be at least 2.
pub fn random_split(count: u32) -> u32 {
    assert!(count >= 2);
    fastrand::u32(1..count)
}

/// Wraps an enumerator and, on its `steal_at`-th write, lets a simulated
/// competing caller drain everything that is left first.
///
/// This reproduces the situation where an enumerator runs dry in the middle
/// of a drain because another caller is using the same handle.
pub struct StealingEnumerator {
    inner: Arc<dyn Enumerator>,
    steal_at: u32,
    writes: Mutex<u32>,
    stolen: Mutex<Vec<u8>>,
}

impl StealingEnumerator {
    pub fn new(inner: Arc<dyn Enumerator>, steal_at: u32) -> StealingEnumerator {
        StealingEnumerator {
            inner,
            steal_at,
            writes: Mutex::new(0),
            stolen: Mutex::new(Vec::new()),
        }
    }

    /// Items taken by the competing caller, concatenated.
    pub fn stolen(&self) -> Vec<u8> {
        self.stolen.lock().clone()
    }
}

impl Enumerator for StealingEnumerator {
    fn item_size(&self) -> u32 {
        self.inner.item_size()
    }

    fn items_per_enumerate(&self) -> u32 {
        self.inner.items_per_enumerate()
    }

    fn item_count(&self) -> u32 {
        self.inner.item_count()
    }

    fn current_item(&self) -> u32 {
        self.inner.current_item()
    }

    fn write_item(&self, destination: &mut [u8]) -> bool {
        let mut writes = self.writes.lock();
        if *writes == self.steal_at {
            let mut stolen = self.stolen.lock();
            let mut slot = vec![0u8; self.inner.item_size() as usize];
            while self.inner.write_item(&mut slot) {
                stolen.extend_from_slice(&slot);
            }
        }
        *writes += 1;
        self.inner.write_item(destination)
    }
}
