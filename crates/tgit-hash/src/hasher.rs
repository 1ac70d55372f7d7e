use sha1::{Digest, Sha1};

use crate::ObjectId;

/// Streaming SHA-1 computation producing an [`ObjectId`].
///
/// Also implements [`std::io::Write`] so it can sit behind writer
/// adapters.
pub struct Hasher {
    inner: Sha1,
}

impl Hasher {
    pub fn new() -> Self {
        Self { inner: Sha1::new() }
    }

    /// Feed data into the hasher.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Finish and return the digest.
    pub fn finalize(self) -> ObjectId {
        let digest = self.inner.finalize();
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest);
        ObjectId::new(bytes)
    }

    /// Hash a byte slice in one call.
    pub fn digest(data: &[u8]) -> ObjectId {
        let mut h = Self::new();
        h.update(data);
        h.finalize()
    }

    /// Hash a git object: the envelope `"<type> <len>\0"` followed by
    /// the payload. The result is the object's name.
    pub fn hash_object(obj_type: &str, payload: &[u8]) -> ObjectId {
        let mut h = Self::new();
        h.update(format!("{} {}\0", obj_type, payload.len()).as_bytes());
        h.update(payload);
        h.finalize()
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::io::Write for Hasher {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_blob_has_well_known_name() {
        let oid = Hasher::hash_object("blob", b"");
        assert_eq!(oid.to_hex(), "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391");
    }

    #[test]
    fn empty_tree_has_well_known_name() {
        let oid = Hasher::hash_object("tree", b"");
        assert_eq!(oid.to_hex(), "4b825dc642cb6eb9a060e54bf8d69288fbee4904");
    }

    #[test]
    fn streaming_matches_one_shot() {
        let mut h = Hasher::new();
        h.update(b"hello ");
        h.update(b"world");
        assert_eq!(h.finalize(), Hasher::digest(b"hello world"));
    }

    #[test]
    fn write_adapter_feeds_hasher() {
        use std::io::Write;
        let mut h = Hasher::new();
        h.write_all(b"abc").unwrap();
        assert_eq!(h.finalize(), Hasher::digest(b"abc"));
    }
}
