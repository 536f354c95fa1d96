//! Record Module
//!
//! Binary codec for the single on-disk unit of the log.
//!
//! ## Responsibilities
//! - Typed keys and values (`Int`, `Float`, `Text`)
//! - Deterministic little-endian layout
//! - CRC32 checksum over header and payload
//!
//! ## Record Format
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────┬──────────┬──────────┬─────────┬─────────┐
//! │ CRC (4)  │Epoch (4) │KeyLen (4)│ValLen (4)│KeyTy (2) │ValTy (2) │   Key   │  Value  │
//! └──────────┴──────────┴──────────┴──────────┴──────────┴──────────┴─────────┴─────────┘
//!            └──────────────────── covered by CRC ────────────────────────────────────────┘
//! ```
//!
//! All integers are little-endian. Int and Float payloads are always 8 bytes,
//! Text payloads are raw UTF-8 with no terminator.

mod codec;
mod header;
mod value;

pub use codec::{decode, decode_key, encode};
pub use header::RecordHeader;
pub use value::{TypedValue, ValueType};

// =============================================================================
// Layout Constants
// =============================================================================

/// Size of the checksum prefix
pub const CRC_SIZE: usize = 4;

/// Size of the header that follows the checksum:
/// Epoch (4) + KeyLen (4) + ValLen (4) + KeyType (2) + ValType (2) = 16 bytes
pub const HEADER_SIZE: usize = 16;

/// Bytes before the key payload starts
pub const RECORD_PREFIX_SIZE: usize = CRC_SIZE + HEADER_SIZE;

/// A decoded record
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Seconds since the Unix epoch at write time
    pub epoch: u32,
    pub key: TypedValue,
    pub value: TypedValue,
}
