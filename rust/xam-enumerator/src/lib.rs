//! Handle-based enumeration.
//!
//! - [`Enumerator`]: the cursor contract every enumerable collection implements.
//! - [`StaticEnumerator`]: an enumerator over a snapshot of fixed-size records.
//! - [`drain`]: copying items into a caller buffer, including the legacy
//!   buffer-length correction.
//! - [`CompletionMode`]: reporting the outcome either directly or through an
//!   overlapped completion record.

pub mod completion;
pub mod content;
pub mod drain;
pub mod enumerator;
pub mod static_enumerator;

pub use completion::{CompletionMode, OverlappedRecord};
pub use content::ContentData;
pub use drain::{DrainOutcome, DrainRequest, drain, effective_buffer_length, enumerate};
pub use enumerator::{Enumerator, ItemCursor};
pub use static_enumerator::{EnumItem, StaticEnumerator, StaticEnumeratorBuilder};
