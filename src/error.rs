//! Decoding errors.

use snafu::Snafu;

/// Result type used throughout the crate.
pub type Result<T, E = DecodeError> = std::result::Result<T, E>;

/// Protoguess error type.
///
/// Any of these aborts the decode call that raised it. The only place they are absorbed is the
/// classification of length-delimited payloads, where a failed nested decode means the payload
/// is treated as text or bytes instead.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum DecodeError
{
    /// The input ended inside a varint, or the varint does not fit in 64 bits.
    #[snafu(display("Truncated varint, only {} bytes available", found))]
    TruncatedVarint
    {
        /// Bytes inspected before giving up.
        found: usize,
    },

    /// A fixed-width or length-delimited field runs past the end of the input.
    #[snafu(display(
        "Not enough bytes for field, wanted {} but only found {}",
        wanted,
        found
    ))]
    Truncated
    {
        /// Bytes required by the field.
        wanted: usize,
        /// Bytes remaining in the input.
        found: usize,
    },

    /// The tag carries a wire type other than 0, 1, 2 or 5.
    #[snafu(display("Invalid wire type: {}", value))]
    InvalidWireType
    {
        /// The offending wire type bits.
        value: u8,
    },

    /// The input is too short to hold a gRPC frame header.
    #[snafu(display("Missing gRPC frame header, only {} bytes available", found))]
    MissingFrameHeader
    {
        /// Bytes available.
        found: usize,
    },

    /// The gRPC frame header announces more payload than is available.
    #[snafu(display(
        "Incomplete gRPC frame, wanted {} bytes but only found {}",
        wanted,
        found
    ))]
    IncompleteFrame
    {
        /// Payload length announced by the header.
        wanted: usize,
        /// Payload bytes available after the header.
        found: usize,
    },

    /// Nested messages go deeper than the configured limit.
    #[snafu(display("Nesting exceeds the recursion limit of {}", limit))]
    RecursionLimit
    {
        /// The configured limit.
        limit: usize,
    },
}
