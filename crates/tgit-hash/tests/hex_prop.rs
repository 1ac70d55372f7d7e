use proptest::prelude::*;
use tgit_hash::hex::{decode_into, encode, is_hex_digits};
use tgit_hash::ObjectId;

proptest! {
    #[test]
    fn encode_decode_roundtrip(bytes in proptest::collection::vec(any::<u8>(), 0..128)) {
        let hex = encode(&bytes);
        let mut decoded = vec![0u8; bytes.len()];
        decode_into(&hex, &mut decoded).unwrap();
        prop_assert_eq!(&decoded, &bytes);
    }

    #[test]
    fn encoding_is_lowercase(bytes in proptest::collection::vec(any::<u8>(), 1..64)) {
        let hex = encode(&bytes);
        prop_assert!(hex.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn encoding_doubles_length(bytes in proptest::collection::vec(any::<u8>(), 0..128)) {
        prop_assert_eq!(encode(&bytes).len(), bytes.len() * 2);
    }

    #[test]
    fn encoded_bytes_are_hex_digits(bytes in proptest::collection::vec(any::<u8>(), 1..64)) {
        prop_assert!(is_hex_digits(&encode(&bytes)));
    }

    #[test]
    fn oid_hex_roundtrip(bytes in proptest::collection::vec(any::<u8>(), 20..=20)) {
        let oid = ObjectId::from_bytes(&bytes).unwrap();
        let parsed: ObjectId = oid.to_hex().parse().unwrap();
        prop_assert_eq!(parsed, oid);
    }
}
