//! Schema-less protocol buffer decoding.
//!
//! Without a schema the wire format only tells how large each value is, not what it means. Scalar
//! values are all decoded as unsigned integers. Length-delimited values are classified by
//! content: anything that decodes as a well-formed message is assumed to be one, otherwise valid
//! UTF-8 becomes text and everything else stays as raw bytes.

use crate::error::*;
use crate::varint::read_varint;
use bytes::Bytes;
use indexmap::IndexMap;
use snafu::ensure;
use std::convert::TryFrom;

/// Nesting depth allowed by default before length-delimited payloads stop being decoded as
/// messages.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Wire type of a field, the lowest three bits of the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType
{
    /// Varint (wire type = 0).
    Varint,

    /// 64-bit little-endian value (wire type = 1).
    Fixed64,

    /// Varint length followed by that many bytes (wire type = 2).
    LengthDelimited,

    /// 32-bit little-endian value (wire type = 5).
    Fixed32,
}

impl WireType
{
    /// Resolve the wire type bits of a tag.
    ///
    /// The group wire types 3 and 4 are not supported and resolve to `None` just like the
    /// unassigned values.
    pub fn from_bits(bits: u8) -> Option<Self>
    {
        match bits {
            0 => Some(WireType::Varint),
            1 => Some(WireType::Fixed64),
            2 => Some(WireType::LengthDelimited),
            5 => Some(WireType::Fixed32),
            _ => None,
        }
    }

    /// The wire type bits used in a tag.
    pub fn bits(self) -> u8
    {
        match self {
            WireType::Varint => 0,
            WireType::Fixed64 => 1,
            WireType::LengthDelimited => 2,
            WireType::Fixed32 => 5,
        }
    }
}

/// Field tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag
{
    /// Field number.
    pub number: u64,

    /// Wire type of the value following the tag.
    pub wire_type: WireType,
}

/// Decoded field value.
#[derive(Debug, PartialEq, Clone)]
pub enum Field
{
    /// Varint, fixed 32-bit or fixed 64-bit value.
    Numeric(u64),

    /// Length-delimited value that is valid UTF-8 but not a message.
    Text(String),

    /// Length-delimited value that is neither a message nor UTF-8.
    Bytes(Bytes),

    /// Length-delimited value that decodes as a message.
    Nested(Message),
}

/// Decoded message.
///
/// Maps field numbers to every value seen for that number, in the order the values appeared in
/// the payload. Field numbers iterate in the order of their first appearance.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Message
{
    fields: IndexMap<u64, Vec<Field>>,
}

impl Message
{
    /// Create an empty message.
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Append a value for a field number.
    pub fn push(&mut self, number: u64, field: Field)
    {
        self.fields.entry(number).or_insert_with(Vec::new).push(field);
    }

    /// Values of a field in encounter order.
    pub fn get(&self, number: u64) -> Option<&[Field]>
    {
        self.fields.get(&number).map(Vec::as_slice)
    }

    /// The first value of a field.
    pub fn first(&self, number: u64) -> Option<&Field>
    {
        self.get(number).and_then(|fields| fields.first())
    }

    /// Iterate over field numbers and their values.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &[Field])>
    {
        self.fields.iter().map(|(n, f)| (*n, f.as_slice()))
    }

    /// Distinct field numbers, in order of first appearance.
    pub fn numbers(&self) -> impl Iterator<Item = u64> + '_
    {
        self.fields.keys().copied()
    }

    /// Number of distinct field numbers.
    pub fn len(&self) -> usize
    {
        self.fields.len()
    }

    /// True if the message has no fields.
    pub fn is_empty(&self) -> bool
    {
        self.fields.is_empty()
    }
}

/// Decoder configuration.
///
/// ```
/// use protoguess::{Decoder, Field};
///
/// let decoder = Decoder::new().max_depth(8);
/// let msg = decoder.decode(b"\x08\x96\x01\x12\x05Perch").unwrap();
/// assert_eq!(msg.first(1), Some(&Field::Numeric(150)));
/// assert_eq!(msg.first(2), Some(&Field::Text("Perch".to_string())));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoder
{
    max_depth: usize,
}

impl Default for Decoder
{
    fn default() -> Self
    {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Decoder
{
    /// Create a decoder with the default options.
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Set how many levels of nested messages are decoded.
    ///
    /// Length-delimited payloads below the limit are classified as text or bytes.
    pub fn max_depth(mut self, max_depth: usize) -> Self
    {
        self.max_depth = max_depth;
        self
    }

    /// The configured recursion limit.
    pub fn recursion_limit(&self) -> usize
    {
        self.max_depth
    }

    /// Decode a complete message.
    ///
    /// The whole of `data` must consist of well-formed fields.
    pub fn decode(&self, data: &[u8]) -> Result<Message>
    {
        let msg = self.decode_at(data, 0)?;
        log::debug!(
            "Decoded {} bytes into {} distinct fields",
            data.len(),
            msg.len()
        );
        Ok(msg)
    }

    fn decode_at(&self, mut data: &[u8], depth: usize) -> Result<Message>
    {
        ensure!(
            depth <= self.max_depth,
            RecursionLimit {
                limit: self.max_depth
            }
        );

        let mut msg = Message::new();
        while !data.is_empty() {
            let tag = read_tag(&mut data)?;
            let field = self.read_field(&mut data, tag.wire_type, depth)?;
            msg.push(tag.number, field);
        }

        Ok(msg)
    }

    fn read_field(&self, data: &mut &[u8], wire_type: WireType, depth: usize) -> Result<Field>
    {
        let field = match wire_type {
            WireType::Varint => Field::Numeric(read_varint(data)?),
            WireType::Fixed32 => Field::Numeric(u32::from_le_bytes(read_4_bytes(data)?).into()),
            WireType::Fixed64 => Field::Numeric(u64::from_le_bytes(read_8_bytes(data)?)),
            WireType::LengthDelimited => {
                let content = read_length_delimited(data)?;
                self.classify(content, depth)
            }
        };

        Ok(field)
    }

    /// Guess what a length-delimited payload is.
    ///
    /// Never fails: a payload that doesn't decode as a message falls back to text or bytes.
    fn classify(&self, content: &[u8], depth: usize) -> Field
    {
        let err = match self.decode_at(content, depth + 1) {
            Ok(msg) => return Field::Nested(msg),
            Err(e) => e,
        };
        log::trace!(
            "{} byte payload at depth {} is not a message: {}",
            content.len(),
            depth + 1,
            err
        );

        match std::str::from_utf8(content) {
            Ok(s) => Field::Text(s.to_string()),
            Err(_) => Field::Bytes(Bytes::copy_from_slice(content)),
        }
    }
}

/// Decode a message with the default options.
///
/// See [`Decoder::decode`].
pub fn decode(data: &[u8]) -> Result<Message>
{
    Decoder::default().decode(data)
}

/// Decode a tag from the start of `data`.
///
/// Returns the tag and the number of bytes it occupied.
///
/// ```
/// use protoguess::{decode_tag, Tag, WireType};
///
/// let (tag, len) = decode_tag(b"\x0a").unwrap();
/// assert_eq!(tag, Tag { number: 1, wire_type: WireType::LengthDelimited });
/// assert_eq!(len, 1);
/// ```
pub fn decode_tag(data: &[u8]) -> Result<(Tag, usize)>
{
    let mut cursor = data;
    let tag = read_tag(&mut cursor)?;
    Ok((tag, data.len() - cursor.len()))
}

fn read_tag(data: &mut &[u8]) -> Result<Tag>
{
    let original = *data;
    let tag = read_varint(data)?;

    let bits = (tag & 0x07) as u8;
    let wire_type = match WireType::from_bits(bits) {
        Some(wt) => wt,
        None => {
            *data = original;
            return InvalidWireType { value: bits }.fail();
        }
    };

    Ok(Tag {
        number: tag >> 3,
        wire_type,
    })
}

fn read_length_delimited<'a>(data: &mut &'a [u8]) -> Result<&'a [u8]>
{
    let original = *data;
    let length = read_varint(data)?;

    // A length beyond usize can't fit in the remaining data either.
    let length = match usize::try_from(length) {
        Ok(len) if len <= data.len() => len,
        _ => {
            let found = data.len();
            *data = original;
            return Truncated {
                wanted: usize::try_from(length).unwrap_or(usize::MAX),
                found,
            }
            .fail();
        }
    };

    let rest: &'a [u8] = *data;
    let (content, remainder) = rest.split_at(length);
    *data = remainder;
    Ok(content)
}

fn read_8_bytes(data: &mut &[u8]) -> Result<[u8; 8]>
{
    ensure!(
        data.len() >= 8,
        Truncated {
            wanted: 8usize,
            found: data.len()
        }
    );

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&data[..8]);
    *data = &data[8..];
    Ok(bytes)
}

fn read_4_bytes(data: &mut &[u8]) -> Result<[u8; 4]>
{
    ensure!(
        data.len() >= 4,
        Truncated {
            wanted: 4usize,
            found: data.len()
        }
    );

    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&data[..4]);
    *data = &data[4..];
    Ok(bytes)
}
