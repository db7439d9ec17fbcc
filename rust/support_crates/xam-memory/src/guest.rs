use std::ops::Range;

use byteorder::{BigEndian, ByteOrder};
use parking_lot::RwLock;
use xam_common::{Result, error::Error, verify_arg};

use crate::GuestAddress;

/// A contiguous guest address space `[base, base + size)`, backed by host memory.
///
/// Every access is translated and bounds-checked: a request that does not fall
/// entirely inside the mapped range fails with `AccessViolation` and touches
/// nothing. Multi-byte values are stored big-endian, as the guest expects.
///
/// # Thread Safety
///
/// Access goes through a reader-writer lock. Closures passed to the `with_*`
/// accessors run while the lock is held and must not re-enter the same
/// `GuestMemory`.
pub struct GuestMemory {
    base: GuestAddress,
    data: RwLock<Vec<u8>>,
}

impl GuestMemory {
    /// Maps `size` zeroed bytes at guest address `base`.
    ///
    /// `base` must be non-zero (address 0 is the guest null pointer) and the
    /// mapping must not wrap the 32-bit address space.
    pub fn new(base: GuestAddress, size: u32) -> Result<GuestMemory> {
        verify_arg!(base, base != 0);
        verify_arg!(size, size != 0);
        verify_arg!(size, (base as u64) + (size as u64) <= (u32::MAX as u64) + 1);
        Ok(GuestMemory {
            base,
            data: RwLock::new(vec![0u8; size as usize]),
        })
    }

    /// First mapped guest address.
    pub fn base(&self) -> GuestAddress {
        self.base
    }

    /// Number of mapped bytes.
    pub fn size(&self) -> u32 {
        self.data.read().len() as u32
    }

    /// One past the last mapped guest address, as a 64-bit value so that a
    /// mapping ending at the top of the address space is representable.
    pub fn end(&self) -> u64 {
        self.base as u64 + self.size() as u64
    }

    /// Returns `true` if `[address, address + len)` is fully mapped.
    pub fn contains(&self, address: GuestAddress, len: usize) -> bool {
        self.translate(address, len).is_ok()
    }

    /// Translates a guest range into an index range of the backing store.
    fn translate(&self, address: GuestAddress, len: usize) -> Result<Range<usize>> {
        let end = address as u64 + len as u64;
        if address < self.base || end > self.end() {
            return Err(Error::access_violation(address, len));
        }
        let start = (address - self.base) as usize;
        Ok(start..start + len)
    }

    /// Runs `f` over the host view of `[address, address + len)`.
    pub fn with_slice<R>(
        &self,
        address: GuestAddress,
        len: usize,
        f: impl FnOnce(&[u8]) -> R,
    ) -> Result<R> {
        let range = self.translate(address, len)?;
        let data = self.data.read();
        Ok(f(&data[range]))
    }

    /// Runs `f` over the mutable host view of `[address, address + len)`.
    pub fn with_slice_mut<R>(
        &self,
        address: GuestAddress,
        len: usize,
        f: impl FnOnce(&mut [u8]) -> R,
    ) -> Result<R> {
        let range = self.translate(address, len)?;
        let mut data = self.data.write();
        Ok(f(&mut data[range]))
    }

    /// Runs `f` over the mutable host view starting at `address` and extending
    /// to the end of the mapping.
    ///
    /// Used where the guest hands over a buffer whose claimed length cannot be
    /// trusted: the callee gets everything that is addressable and has to
    /// bound itself.
    pub fn with_tail_mut<R>(
        &self,
        address: GuestAddress,
        f: impl FnOnce(&mut [u8]) -> R,
    ) -> Result<R> {
        let len = self.end().saturating_sub(address as u64) as usize;
        self.with_slice_mut(address, len, f)
    }

    pub fn zero_fill(&self, address: GuestAddress, len: usize) -> Result<()> {
        self.with_slice_mut(address, len, |dst| dst.fill(0))
    }

    /// Copies `src` into guest memory at `address`.
    pub fn copy_in(&self, address: GuestAddress, src: &[u8]) -> Result<()> {
        self.with_slice_mut(address, src.len(), |dst| dst.copy_from_slice(src))
    }

    /// Copies guest memory at `address` into `dst`.
    pub fn copy_out(&self, address: GuestAddress, dst: &mut [u8]) -> Result<()> {
        self.with_slice(address, dst.len(), |src| dst.copy_from_slice(src))
    }

    pub fn read_bytes(&self, address: GuestAddress, len: usize) -> Result<Vec<u8>> {
        self.with_slice(address, len, |src| src.to_vec())
    }

    /// Reads a NUL-terminated single-byte string of at most `max_len` bytes.
    ///
    /// The string may end at the end of the mapping without a terminator.
    /// Bytes are interpreted as UTF-8, with invalid sequences replaced.
    pub fn read_c_string(&self, address: GuestAddress, max_len: usize) -> Result<String> {
        let len = (self.end().saturating_sub(address as u64) as usize).min(max_len);
        self.with_slice(address, len, |src| {
            let end = src.iter().position(|&b| b == 0).unwrap_or(src.len());
            String::from_utf8_lossy(&src[..end]).into_owned()
        })
    }

    pub fn load_u32(&self, address: GuestAddress) -> Result<u32> {
        self.with_slice(address, 4, BigEndian::read_u32)
    }

    pub fn store_u32(&self, address: GuestAddress, value: u32) -> Result<()> {
        self.with_slice_mut(address, 4, |dst| BigEndian::write_u32(dst, value))
    }
}

impl std::fmt::Debug for GuestMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuestMemory")
            .field("base", &format_args!("{:#010X}", self.base))
            .field("size", &format_args!("{:#X}", self.size()))
            .finish()
    }
}
