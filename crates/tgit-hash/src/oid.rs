use std::fmt;
use std::str::FromStr;

use crate::hex;
use crate::HashError;

/// Length of a SHA-1 digest in bytes.
pub const DIGEST_LEN: usize = 20;

/// A git object identifier: the SHA-1 of an object's canonical envelope.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; DIGEST_LEN]);

impl ObjectId {
    /// The null id (all zeros), used for unborn refs.
    pub const NULL: Self = Self([0u8; DIGEST_LEN]);

    /// Wrap a raw 20-byte digest.
    pub const fn new(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Create from a byte slice, which must be exactly 20 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HashError> {
        let arr: [u8; DIGEST_LEN] =
            bytes
                .try_into()
                .map_err(|_| HashError::InvalidDigestLength {
                    expected: DIGEST_LEN,
                    actual: bytes.len(),
                })?;
        Ok(Self(arr))
    }

    /// Parse a 40-character hex string (either case).
    pub fn from_hex(s: &str) -> Result<Self, HashError> {
        let mut bytes = [0u8; DIGEST_LEN];
        hex::decode_into(s, &mut bytes)?;
        Ok(Self(bytes))
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase 40-character hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Whether this is the all-zeros null id.
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; DIGEST_LEN]
    }

    /// The loose-object path component: `"xx/yyyy…"` where `xx` is the
    /// first two hex characters.
    pub fn loose_path(&self) -> String {
        let hex = self.to_hex();
        format!("{}/{}", &hex[..2], &hex[2..])
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", &self.to_hex()[..8])
    }
}

impl FromStr for ObjectId {
    type Err = HashError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const EMPTY_BLOB: &str = "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391";

    #[test]
    fn hex_roundtrip() {
        let oid = ObjectId::from_hex(EMPTY_BLOB).unwrap();
        assert_eq!(oid.to_hex(), EMPTY_BLOB);
        let parsed: ObjectId = EMPTY_BLOB.parse().unwrap();
        assert_eq!(parsed, oid);
    }

    #[test]
    fn from_bytes_roundtrip() {
        let oid = ObjectId::from_hex(EMPTY_BLOB).unwrap();
        let again = ObjectId::from_bytes(oid.as_bytes()).unwrap();
        assert_eq!(again, oid);
    }

    #[test]
    fn from_bytes_wrong_length() {
        let err = ObjectId::from_bytes(&[0u8; 19]).unwrap_err();
        assert!(matches!(
            err,
            HashError::InvalidDigestLength {
                expected: 20,
                actual: 19
            }
        ));
    }

    #[test]
    fn from_hex_wrong_length() {
        assert!(ObjectId::from_hex("abcd").is_err());
    }

    #[test]
    fn from_hex_invalid_character() {
        let err =
            ObjectId::from_hex("zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz").unwrap_err();
        assert!(matches!(err, HashError::InvalidHex { .. }));
    }

    #[test]
    fn uppercase_decodes_equal() {
        let upper = EMPTY_BLOB.to_ascii_uppercase();
        assert_eq!(
            ObjectId::from_hex(&upper).unwrap(),
            ObjectId::from_hex(EMPTY_BLOB).unwrap()
        );
    }

    #[test]
    fn usable_as_map_key() {
        let oid = ObjectId::from_hex(EMPTY_BLOB).unwrap();
        let mut map = HashMap::new();
        map.insert(oid, 1);
        assert_eq!(map.get(&oid), Some(&1));
    }

    #[test]
    fn null_oid() {
        assert!(ObjectId::NULL.is_null());
        assert!(!ObjectId::from_hex(EMPTY_BLOB).unwrap().is_null());
    }

    #[test]
    fn ordering_is_bytewise() {
        let a = ObjectId::from_hex("0000000000000000000000000000000000000001").unwrap();
        let b = ObjectId::from_hex("0000000000000000000000000000000000000002").unwrap();
        assert!(a < b);
    }

    #[test]
    fn loose_path_splits_after_two() {
        let oid = ObjectId::from_hex(EMPTY_BLOB).unwrap();
        assert_eq!(oid.loose_path(), format!("e6/{}", &EMPTY_BLOB[2..]));
    }

    #[test]
    fn debug_is_short() {
        let oid = ObjectId::from_hex(EMPTY_BLOB).unwrap();
        assert_eq!(format!("{:?}", oid), "ObjectId(e69de29b)");
    }
}
