//! Record codec
//!
//! Encoding and decoding of a single checksummed record.

use bytes::{BufMut, BytesMut};

use crate::error::{LogKvError, Result};

use super::{Record, RecordHeader, TypedValue, CRC_SIZE, RECORD_PREFIX_SIZE};

// =============================================================================
// Encoding
// =============================================================================

/// Encode a record to bytes
///
/// The whole record must fit in `u32::MAX` bytes, since index entries store
/// record lengths as `u32`.
///
/// Format: crc (4) + epoch (4) + key_len (4) + value_len (4)
///         + key_type (2) + value_type (2) + key + value
pub fn encode(epoch: u32, key: &TypedValue, value: &TypedValue) -> Result<Vec<u8>> {
    let header = RecordHeader {
        checksum: 0,
        epoch,
        key_len: payload_len(key)?,
        value_len: payload_len(value)?,
        key_tag: key.value_type() as u16,
        value_tag: value.value_type() as u16,
    };

    let total_len = header.total_len();
    if total_len > u32::MAX as u64 {
        return Err(LogKvError::RecordTooLarge(total_len as usize));
    }

    let mut buf = BytesMut::with_capacity(total_len as usize);
    buf.put_u32_le(0); // checksum, filled in below
    header.put_fields(&mut buf);
    key.write_payload(&mut buf);
    value.write_payload(&mut buf);

    let checksum = crc32fast::hash(&buf[CRC_SIZE..]);
    buf[..CRC_SIZE].copy_from_slice(&checksum.to_le_bytes());

    Ok(buf.to_vec())
}

fn payload_len(value: &TypedValue) -> Result<u32> {
    let len = value.encoded_len();
    u32::try_from(len).map_err(|_| LogKvError::RecordTooLarge(len))
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode a record from bytes
///
/// Bytes past the record's declared length are ignored.
pub fn decode(bytes: &[u8]) -> Result<Record> {
    let (header, body) = verify(bytes)?;

    let key_type = header.key_type()?;
    let value_type = header.value_type()?;
    let (key_bytes, value_bytes) = body.split_at(header.key_len as usize);

    Ok(Record {
        epoch: header.epoch,
        key: TypedValue::from_payload(key_type, key_bytes)?,
        value: TypedValue::from_payload(value_type, value_bytes)?,
    })
}

/// Decode only the key, after full checksum and tag validation.
///
/// Used by replay, which never needs the value.
pub fn decode_key(bytes: &[u8]) -> Result<(RecordHeader, TypedValue)> {
    let (header, body) = verify(bytes)?;

    let key_type = header.key_type()?;
    header.value_type()?;
    let key = TypedValue::from_payload(key_type, &body[..header.key_len as usize])?;

    Ok((header, key))
}

/// Check lengths and checksum; returns the header and the payload bytes
fn verify(bytes: &[u8]) -> Result<(RecordHeader, &[u8])> {
    let header = RecordHeader::parse(bytes)?;

    let total_len = header.total_len();
    if (bytes.len() as u64) < total_len {
        return Err(LogKvError::Truncated {
            needed: total_len as usize,
            available: bytes.len(),
        });
    }
    let total_len = total_len as usize;

    let actual = crc32fast::hash(&bytes[CRC_SIZE..total_len]);
    if actual != header.checksum {
        return Err(LogKvError::ChecksumMismatch {
            expected: header.checksum,
            actual,
        });
    }

    Ok((header, &bytes[RECORD_PREFIX_SIZE..total_len]))
}
