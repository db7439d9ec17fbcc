//! Content-item records (`XCONTENT_DATA`), the most common payload drained
//! through enumeration handles (save games, DLC packages).

use byteorder::{BigEndian, ByteOrder};

use crate::EnumItem;

/// Length of the display name field, in UTF-16 code units.
pub const DISPLAY_NAME_LEN: usize = 128;

/// Length of the file name field, in bytes.
pub const FILE_NAME_LEN: usize = 42;

/// A content item as laid out in guest memory:
///
/// | offset  | size | field          |
/// |---------|------|----------------|
/// | `0x000` | 4    | device id      |
/// | `0x004` | 4    | content type   |
/// | `0x008` | 256  | display name (UTF-16BE, NUL-padded) |
/// | `0x108` | 42   | file name (ASCII, NUL-padded) |
/// | `0x132` | 2    | padding        |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentData {
    pub device_id: u32,
    pub content_type: u32,
    pub display_name: String,
    pub file_name: String,
}

impl ContentData {
    pub const SAVED_GAME: u32 = 0x0000_0001;
    pub const MARKETPLACE: u32 = 0x0000_0002;
    pub const PUBLISHER: u32 = 0x0000_0003;
}

impl EnumItem for ContentData {
    const SIZE: u32 = 0x134;

    fn write_to(&self, dst: &mut [u8]) {
        dst.fill(0);
        BigEndian::write_u32(&mut dst[0x000..0x004], self.device_id);
        BigEndian::write_u32(&mut dst[0x004..0x008], self.content_type);

        // Names are truncated to leave room for the terminator.
        let name = &mut dst[0x008..0x108];
        for (slot, unit) in name
            .chunks_exact_mut(2)
            .zip(self.display_name.encode_utf16().take(DISPLAY_NAME_LEN - 1))
        {
            BigEndian::write_u16(slot, unit);
        }

        let file_name = self.file_name.as_bytes();
        let len = file_name.len().min(FILE_NAME_LEN - 1);
        dst[0x108..0x108 + len].copy_from_slice(&file_name[..len]);
    }
}
