//! Base-128 varint decoding.

use crate::error::*;
use snafu::ensure;

/// The longest encoding a 64-bit varint may have.
pub const MAX_VARINT_LEN: usize = 10;

/// Decode a varint from the start of `data`.
///
/// Returns the value and the number of bytes it occupied. Fails with
/// [`DecodeError::TruncatedVarint`] if the input ends before the final byte of the varint, or if
/// the encoding does not fit into 64 bits.
///
/// ```
/// use protoguess::decode_varint;
///
/// assert_eq!(decode_varint(b"\x96\x01").unwrap(), (150, 2));
/// assert!(decode_varint(b"\x96").is_err());
/// ```
pub fn decode_varint(data: &[u8]) -> Result<(u64, usize)>
{
    let mut cursor = data;
    let value = read_varint(&mut cursor)?;
    Ok((value, data.len() - cursor.len()))
}

/// Read a varint and advance the cursor past it.
///
/// The cursor is left untouched on failure.
pub(crate) fn read_varint(data: &mut &[u8]) -> Result<u64>
{
    let mut result = 0u64;
    let mut idx = 0;
    loop {
        ensure!(
            idx < data.len() && idx < MAX_VARINT_LEN,
            TruncatedVarint { found: idx }
        );

        let b = data[idx];

        // The tenth byte holds only the top bit of a u64.
        ensure!(
            idx < MAX_VARINT_LEN - 1 || b <= 1,
            TruncatedVarint { found: idx + 1 }
        );

        result |= u64::from(b & 0x7f) << (idx * 7);

        idx += 1;
        if b & 0x80 == 0 {
            break;
        }
    }

    *data = &data[idx..];
    Ok(result)
}
