use std::fmt;

/// An opaque, guest-visible object handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Handle(u32);

impl Handle {
    /// The value guests pass for "no handle".
    pub const INVALID: Handle = Handle(0);

    pub const fn from_raw(raw: u32) -> Handle {
        Handle(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for Handle {
    fn from(raw: u32) -> Handle {
        Handle(raw)
    }
}

impl From<Handle> for u32 {
    fn from(handle: Handle) -> u32 {
        handle.0
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({:#010X})", self.0)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010X}", self.0)
    }
}
