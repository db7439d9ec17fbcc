use xam_common::{Result, error::Error, verify_arg};

use crate::{Enumerator, ItemCursor};

/// A fixed-size record that can be serialized into an enumeration slot.
pub trait EnumItem {
    /// Serialized size in bytes.
    const SIZE: u32;

    /// Writes the guest representation of `self`. `dst` is exactly `SIZE`
    /// bytes long.
    fn write_to(&self, dst: &mut [u8]);
}

/// An enumerator over a snapshot of pre-serialized items.
///
/// The snapshot is taken when the enumerator is built; the only mutable state
/// afterwards is the cursor.
pub struct StaticEnumerator {
    item_size: u32,
    items_per_enumerate: u32,
    items: Vec<u8>,
    cursor: ItemCursor,
}

impl StaticEnumerator {
    /// Starts building an enumerator of `item_size`-byte records.
    pub fn builder(item_size: u32, items_per_enumerate: u32) -> Result<StaticEnumeratorBuilder> {
        verify_arg!(item_size, item_size > 0);
        Ok(StaticEnumeratorBuilder {
            item_size,
            items_per_enumerate,
            items: Vec::new(),
        })
    }

    /// Builds an enumerator over typed items.
    pub fn from_items<T: EnumItem>(items_per_enumerate: u32, items: &[T]) -> Result<StaticEnumerator> {
        let mut builder = Self::builder(T::SIZE, items_per_enumerate)?;
        for item in items {
            builder.append(item)?;
        }
        Ok(builder.build())
    }

    /// Serialized bytes of the item at `index`.
    pub fn item(&self, index: u32) -> Option<&[u8]> {
        let size = self.item_size as usize;
        let start = (index as usize).checked_mul(size)?;
        self.items.get(start..start + size)
    }
}

impl Enumerator for StaticEnumerator {
    fn item_size(&self) -> u32 {
        self.item_size
    }

    fn items_per_enumerate(&self) -> u32 {
        self.items_per_enumerate
    }

    fn item_count(&self) -> u32 {
        self.cursor.count()
    }

    fn current_item(&self) -> u32 {
        self.cursor.position()
    }

    fn write_item(&self, destination: &mut [u8]) -> bool {
        let Some(index) = self.cursor.claim() else {
            return false;
        };
        match self.item(index) {
            Some(src) => {
                destination.copy_from_slice(src);
                log::trace!("wrote enumeration item {index}");
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for StaticEnumerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticEnumerator")
            .field("item_size", &self.item_size)
            .field("items_per_enumerate", &self.items_per_enumerate)
            .field("item_count", &self.cursor.count())
            .field("current_item", &self.cursor.position())
            .finish()
    }
}

pub struct StaticEnumeratorBuilder {
    item_size: u32,
    items_per_enumerate: u32,
    items: Vec<u8>,
}

impl StaticEnumeratorBuilder {
    /// Appends one already-serialized item. `bytes` must be exactly
    /// `item_size` long.
    pub fn append_raw(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        if bytes.len() != self.item_size as usize {
            return Err(Error::invalid_arg(
                "bytes",
                format!(
                    "item is {} bytes, enumerator item size is {}",
                    bytes.len(),
                    self.item_size
                ),
            ));
        }
        verify_arg!(items, self.len() < u32::MAX);
        self.items.extend_from_slice(bytes);
        Ok(self)
    }

    /// Serializes and appends a typed item.
    pub fn append<T: EnumItem>(&mut self, item: &T) -> Result<&mut Self> {
        verify_arg!(item, T::SIZE == self.item_size);
        verify_arg!(items, self.len() < u32::MAX);
        let start = self.items.len();
        self.items.resize(start + T::SIZE as usize, 0);
        item.write_to(&mut self.items[start..]);
        Ok(self)
    }

    /// Number of items appended so far.
    pub fn len(&self) -> u32 {
        (self.items.len() / self.item_size as usize) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn build(self) -> StaticEnumerator {
        let count = self.len();
        StaticEnumerator {
            item_size: self.item_size,
            items_per_enumerate: self.items_per_enumerate,
            items: self.items,
            cursor: ItemCursor::new(count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair(u16, u16);

    impl EnumItem for Pair {
        const SIZE: u32 = 4;

        fn write_to(&self, dst: &mut [u8]) {
            dst[..2].copy_from_slice(&self.0.to_be_bytes());
            dst[2..].copy_from_slice(&self.1.to_be_bytes());
        }
    }

    #[test]
    fn test_zero_item_size_rejected() {
        assert!(StaticEnumerator::builder(0, 1).is_err());
    }

    #[test]
    fn test_append_raw_size_mismatch() {
        let mut builder = StaticEnumerator::builder(4, 1).unwrap();
        assert!(builder.append_raw(b"abc").is_err());
        assert!(builder.append_raw(b"abcd").is_ok());
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_typed_items() {
        let e = StaticEnumerator::from_items(2, &[Pair(1, 2), Pair(0x0304, 5)]).unwrap();
        assert_eq!(e.item_size(), 4);
        assert_eq!(e.items_per_enumerate(), 2);
        assert_eq!(e.item_count(), 2);
        assert_eq!(e.item(1).unwrap(), [3, 4, 0, 5]);
        assert!(e.item(2).is_none());
    }

    #[test]
    fn test_typed_size_mismatch() {
        let mut builder = StaticEnumerator::builder(8, 1).unwrap();
        assert!(builder.append(&Pair(1, 1)).is_err());
        assert!(builder.is_empty());
    }

    #[test]
    fn test_write_item_advances() {
        let mut builder = StaticEnumerator::builder(2, 1).unwrap();
        builder.append_raw(b"ab").unwrap().append_raw(b"cd").unwrap();
        let e = builder.build();

        let mut slot = [0u8; 2];
        assert!(e.write_item(&mut slot));
        assert_eq!(&slot, b"ab");
        assert_eq!(e.current_item(), 1);
        assert!(e.write_item(&mut slot));
        assert_eq!(&slot, b"cd");
        assert!(e.is_exhausted());

        let mut untouched = [0xEEu8; 2];
        assert!(!e.write_item(&mut untouched));
        assert_eq!(untouched, [0xEE, 0xEE]);
        assert_eq!(e.current_item(), 2);
    }
}
