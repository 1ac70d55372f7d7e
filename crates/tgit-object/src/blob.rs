/// A git blob: an opaque byte sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    pub fn from_payload(payload: &[u8]) -> Self {
        Self {
            data: payload.to_vec(),
        }
    }
}
