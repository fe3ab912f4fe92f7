use proptest::prelude::*;

fn encode_varint(mut value: u64) -> Vec<u8>
{
    let mut out = vec![];
    while value >= 0x80 {
        out.push((value as u8) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
    out
}

fn wire_type() -> impl Strategy<Value = protoguess::WireType>
{
    use protoguess::WireType;

    prop_oneof![
        Just(WireType::Varint),
        Just(WireType::Fixed64),
        Just(WireType::LengthDelimited),
        Just(WireType::Fixed32),
    ]
}

proptest! {
    #[test]
    fn varint_round_trip(value in any::<u64>(), trailing in proptest::collection::vec(any::<u8>(), 0..4))
    {
        let mut encoded = encode_varint(value);
        let len = encoded.len();
        encoded.extend(trailing);

        prop_assert_eq!(protoguess::decode_varint(&encoded), Ok((value, len)));
    }

    #[test]
    fn varint_prefix_is_truncated(value in 128u64..)
    {
        let encoded = encode_varint(value);
        for cut in 0..encoded.len() {
            let is_truncated = matches!(
                protoguess::decode_varint(&encoded[..cut]),
                Err(protoguess::DecodeError::TruncatedVarint { .. })
            );
            prop_assert!(is_truncated);
        }
    }

    #[test]
    fn tag_decomposition(number in 0u64..(1 << 61), wire_type in wire_type())
    {
        use protoguess::{decode_tag, Tag};

        let encoded = encode_varint(number << 3 | u64::from(wire_type.bits()));
        prop_assert_eq!(
            decode_tag(&encoded),
            Ok((Tag { number, wire_type }, encoded.len()))
        );
    }

    #[test]
    fn group_tags_are_invalid(number in 0u64..(1 << 61), bits in 3u8..5)
    {
        use protoguess::{decode_tag, DecodeError};

        let encoded = encode_varint(number << 3 | u64::from(bits));
        prop_assert_eq!(
            decode_tag(&encoded),
            Err(DecodeError::InvalidWireType { value: bits })
        );
    }
}
