//!
//! Protoguess decodes arbitrary protocol buffer messages without a schema. Field numbers and
//! wire types are read from the payload, scalar values are decoded as unsigned integers and
//! length-delimited values are classified by content as nested messages, text or raw bytes.
//! The result renders as JSON-like text keyed by field number.
//!
//! gRPC payloads carry a five byte frame header, which [`decode_grpc`] strips before decoding.
//!
//! ```
//! use protoguess::{decode, decode_grpc, render_sorted, Field};
//!
//! let msg = decode(b"\x08\x96\x01\x12\x04\x08\x05\x10\x1a\x1a\x05Perch").unwrap();
//! assert_eq!(msg.first(1), Some(&Field::Numeric(150)));
//! assert_eq!(msg.first(3), Some(&Field::Text(String::from("Perch"))));
//! assert_eq!(render_sorted(&msg), r#"{"1":150,"2":{"1":5,"2":26},"3":"Perch"}"#);
//!
//! let (framed, consumed) = decode_grpc(b"\x00\x00\x00\x00\x02\x38\x01").unwrap();
//! assert_eq!(consumed, 7);
//! assert_eq!(render_sorted(&framed), r#"{"7":1}"#);
//! ```
//!
//! The classification is a guess. Text or binary data that happens to form a valid sequence of
//! fields is decoded as a nested message.
#![warn(missing_docs)]

pub mod decode;
pub mod error;
pub mod frame;
pub mod render;
pub mod varint;

pub use decode::{decode, decode_tag, Decoder, Field, Message, Tag, WireType, DEFAULT_MAX_DEPTH};
pub use error::{DecodeError, Result};
pub use frame::{decode_grpc, Frame};
pub use render::{render, render_sorted};
pub use varint::decode_varint;
