/// A git tag object.
///
/// Tags are accepted during pack ingest but this client never inspects
/// them, so the payload is carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub data: Vec<u8>,
}

impl Tag {
    pub fn from_payload(payload: &[u8]) -> Self {
        Self {
            data: payload.to_vec(),
        }
    }
}
