//! Packed byte layout of the registry account.
//!
//! ```text
//! [0 .. CONFIG_ARRAY_START)           fixed header (capacity at ITEMS_AVAILABLE_OFFSET)
//! [CONFIG_ARRAY_START .. +4)          stored line count, u32 LE
//! [RECORDS_START + RECORD_SIZE * i)   record i:
//!     +0   u32 LE name length, then MAX_NAME_LENGTH bytes
//!     +36  u32 LE uri length,  then MAX_URI_LENGTH bytes
//! ```
//!
//! All functions here are pure so the layout can be tested without a network.

use mint_registry_types::{MAX_NAME_LENGTH, MAX_URI_LENGTH};

use crate::error::DecodeError;

/// Header bytes before the capacity field: discriminator, authority, wallet,
/// optional token mint, collection id (u32 length + 6 bytes), price.
pub const ITEMS_AVAILABLE_OFFSET: usize = 8 + 32 + 32 + 33 + (4 + 6) + 8;

/// Size of the fixed header; the line count follows it.
pub const CONFIG_ARRAY_START: usize = 713;

pub const LINE_COUNT_LEN: usize = 4;

pub const RECORDS_START: usize = CONFIG_ARRAY_START + LINE_COUNT_LEN;

const LEN_PREFIX: usize = 4;

pub const NAME_OFFSET: usize = 0;
pub const URI_OFFSET: usize = NAME_OFFSET + LEN_PREFIX + MAX_NAME_LENGTH;

/// Width of one record: both length-prefixed fields at full width.
pub const RECORD_SIZE: usize = URI_OFFSET + LEN_PREFIX + MAX_URI_LENGTH;

/// Values read from the fixed header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryHeader {
    /// Declared capacity (`items_available` at initialization).
    pub capacity: u64,
    /// Number of lines the registry reports as stored.
    pub line_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecord {
    pub name: String,
    pub uri: String,
}

pub fn record_offset(index: u32) -> usize {
    RECORDS_START + RECORD_SIZE * index as usize
}

/// Account size needed for `capacity` records plus the mint bitmask, or
/// `None` when that size does not fit in `usize`.
pub fn registry_account_size(capacity: u64) -> Option<usize> {
    let capacity = usize::try_from(capacity).ok()?;
    let records = RECORD_SIZE.checked_mul(capacity)?;
    let bitmask = (capacity / 8 + 1).checked_mul(2)?;
    RECORDS_START
        .checked_add(records)?
        .checked_add(8)?
        .checked_add(bitmask)
}

fn read_u32(buf: &[u8], offset: usize) -> Result<u32, DecodeError> {
    let bytes = buf
        .get(offset..offset + 4)
        .ok_or(DecodeError::Truncated {
            needed: offset + 4,
            actual: buf.len(),
        })?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn read_u64(buf: &[u8], offset: usize) -> Result<u64, DecodeError> {
    let bytes = buf
        .get(offset..offset + 8)
        .ok_or(DecodeError::Truncated {
            needed: offset + 8,
            actual: buf.len(),
        })?;
    let mut raw = [0u8; 8];
    raw.copy_from_slice(bytes);
    Ok(u64::from_le_bytes(raw))
}

pub fn decode_header(buf: &[u8]) -> Result<RegistryHeader, DecodeError> {
    Ok(RegistryHeader {
        capacity: read_u64(buf, ITEMS_AVAILABLE_OFFSET)?,
        line_count: read_u32(buf, CONFIG_ARRAY_START)?,
    })
}

fn decode_field(
    record: &[u8],
    offset: usize,
    max: usize,
    index: u32,
    field: &'static str,
) -> Result<String, DecodeError> {
    let length = read_u32(record, offset)? as usize;
    if length > max {
        return Err(DecodeError::FieldTooLong {
            index,
            field,
            length,
            max,
        });
    }
    let start = offset + LEN_PREFIX;
    let raw = &record[start..start + length];
    let text = std::str::from_utf8(raw).map_err(|_| DecodeError::InvalidUtf8 { index, field })?;
    Ok(text.trim_end_matches('\0').to_string())
}

/// Decode the name and URI stored for `index`.
pub fn decode_record(buf: &[u8], index: u32) -> Result<DecodedRecord, DecodeError> {
    let offset = record_offset(index);
    let record = buf
        .get(offset..offset + RECORD_SIZE)
        .ok_or(DecodeError::Truncated {
            needed: offset + RECORD_SIZE,
            actual: buf.len(),
        })?;
    Ok(DecodedRecord {
        name: decode_field(record, NAME_OFFSET, MAX_NAME_LENGTH, index, "name")?,
        uri: decode_field(record, URI_OFFSET, MAX_URI_LENGTH, index, "uri")?,
    })
}

pub fn write_header(buf: &mut [u8], header: RegistryHeader) -> Result<(), DecodeError> {
    if buf.len() < RECORDS_START {
        return Err(DecodeError::Truncated {
            needed: RECORDS_START,
            actual: buf.len(),
        });
    }
    buf[ITEMS_AVAILABLE_OFFSET..ITEMS_AVAILABLE_OFFSET + 8]
        .copy_from_slice(&header.capacity.to_le_bytes());
    buf[CONFIG_ARRAY_START..RECORDS_START].copy_from_slice(&header.line_count.to_le_bytes());
    Ok(())
}

fn write_field(
    record: &mut [u8],
    offset: usize,
    max: usize,
    value: &str,
    index: u32,
    field: &'static str,
) -> Result<(), DecodeError> {
    let bytes = value.as_bytes();
    if bytes.len() > max {
        return Err(DecodeError::FieldTooLong {
            index,
            field,
            length: bytes.len(),
            max,
        });
    }
    record[offset..offset + LEN_PREFIX].copy_from_slice(&(bytes.len() as u32).to_le_bytes());
    let start = offset + LEN_PREFIX;
    record[start..start + bytes.len()].copy_from_slice(bytes);
    record[start + bytes.len()..start + max].fill(0);
    Ok(())
}

/// Write one record in place, the way the registry program stores it.
pub fn write_record(buf: &mut [u8], index: u32, name: &str, uri: &str) -> Result<(), DecodeError> {
    let offset = record_offset(index);
    let actual = buf.len();
    let record = buf
        .get_mut(offset..offset + RECORD_SIZE)
        .ok_or(DecodeError::Truncated {
            needed: offset + RECORD_SIZE,
            actual,
        })?;
    write_field(record, NAME_OFFSET, MAX_NAME_LENGTH, name, index, "name")?;
    write_field(record, URI_OFFSET, MAX_URI_LENGTH, uri, index, "uri")
}
