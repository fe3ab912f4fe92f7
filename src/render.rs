//! JSON-like rendering of decoded messages.
//!
//! Messages render as objects keyed by quoted field numbers. A field seen once renders as its
//! value, a repeated field as a list of values in encounter order. Text is wrapped in quotes
//! without any escaping and bytes are written as bare lowercase hex, so the output is not
//! guaranteed to be valid JSON.
//!
//! Key order follows the order in which field numbers first appeared in the payload. That order
//! is not part of the output contract; use [`render_sorted`] when the output must be stable.

use crate::decode::{Field, Message};
use std::fmt::{self, Display, Write};

/// Render a message.
///
/// ```
/// use protoguess::{decode, render};
///
/// let msg = decode(b"\x38\x01\x38\x02").unwrap();
/// assert_eq!(render(&msg), r#"{"7":[1,2]}"#);
/// ```
pub fn render(msg: &Message) -> String
{
    msg.to_string()
}

/// Render a message with the keys in ascending field number order on every level.
pub fn render_sorted(msg: &Message) -> String
{
    Sorted(msg).to_string()
}

struct Sorted<'a>(&'a Message);

impl Display for Sorted<'_>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write_message(f, self.0, true)
    }
}

fn write_message<W: Write>(out: &mut W, msg: &Message, sorted: bool) -> fmt::Result
{
    let mut entries: Vec<(u64, &[Field])> = msg.iter().collect();
    if sorted {
        entries.sort_by_key(|(number, _)| *number);
    }

    out.write_char('{')?;
    for (i, (number, fields)) in entries.into_iter().enumerate() {
        if i > 0 {
            out.write_char(',')?;
        }
        write!(out, "\"{}\":", number)?;

        match fields {
            [single] => write_field(out, single, sorted)?,
            repeated => {
                out.write_char('[')?;
                for (j, field) in repeated.iter().enumerate() {
                    if j > 0 {
                        out.write_char(',')?;
                    }
                    write_field(out, field, sorted)?;
                }
                out.write_char(']')?;
            }
        }
    }
    out.write_char('}')
}

fn write_field<W: Write>(out: &mut W, field: &Field, sorted: bool) -> fmt::Result
{
    match field {
        Field::Numeric(n) => write!(out, "{}", n),
        Field::Text(s) => write!(out, "\"{}\"", s),
        Field::Bytes(b) => out.write_str(&hex::encode(b)),
        Field::Nested(msg) => write_message(out, msg, sorted),
    }
}

impl Display for Message
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write_message(f, self, false)
    }
}

impl Display for Field
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write_field(f, self, false)
    }
}
