//! Record header
//!
//! The fixed 20-byte prefix (checksum + header) of every record.

use bytes::{Buf, BufMut};

use crate::error::{LogKvError, Result};

use super::{ValueType, RECORD_PREFIX_SIZE};

/// Fixed-size fields at the front of a record.
///
/// Type tags are kept raw here so a header with an unknown tag can still be
/// sized and skipped; `key_type()`/`value_type()` validate them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub checksum: u32,
    pub epoch: u32,
    pub key_len: u32,
    pub value_len: u32,
    pub key_tag: u16,
    pub value_tag: u16,
}

impl RecordHeader {
    /// Parse the first 20 bytes of `bytes`
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < RECORD_PREFIX_SIZE {
            return Err(LogKvError::Truncated {
                needed: RECORD_PREFIX_SIZE,
                available: bytes.len(),
            });
        }

        let mut buf = &bytes[..RECORD_PREFIX_SIZE];
        Ok(Self {
            checksum: buf.get_u32_le(),
            epoch: buf.get_u32_le(),
            key_len: buf.get_u32_le(),
            value_len: buf.get_u32_le(),
            key_tag: buf.get_u16_le(),
            value_tag: buf.get_u16_le(),
        })
    }

    /// Write the 16 header bytes that follow the checksum
    pub(crate) fn put_fields(&self, buf: &mut impl BufMut) {
        buf.put_u32_le(self.epoch);
        buf.put_u32_le(self.key_len);
        buf.put_u32_le(self.value_len);
        buf.put_u16_le(self.key_tag);
        buf.put_u16_le(self.value_tag);
    }

    /// Total bytes this record occupies in the log
    pub fn total_len(&self) -> u64 {
        RECORD_PREFIX_SIZE as u64 + self.key_len as u64 + self.value_len as u64
    }

    pub fn key_type(&self) -> Result<ValueType> {
        ValueType::try_from(self.key_tag)
    }

    pub fn value_type(&self) -> Result<ValueType> {
        ValueType::try_from(self.value_tag)
    }

    /// Check the tags and the payload widths they imply
    ///
    /// Int and Float payloads are always 8 bytes, so any other declared
    /// length means the header itself is damaged.
    pub fn validate(&self) -> Result<(ValueType, ValueType)> {
        let key_type = self.key_type()?;
        let value_type = self.value_type()?;
        check_width("key", key_type, self.key_len)?;
        check_width("value", value_type, self.value_len)?;
        Ok((key_type, value_type))
    }
}

fn check_width(field: &str, value_type: ValueType, declared: u32) -> Result<()> {
    match value_type.fixed_width() {
        Some(width) if declared as usize != width => Err(LogKvError::Malformed(format!(
            "{} declared as {:?} with length {}, expected {}",
            field, value_type, declared, width
        ))),
        _ => Ok(()),
    }
}
