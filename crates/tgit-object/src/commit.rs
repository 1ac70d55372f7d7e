use bstr::{BStr, BString, ByteSlice};
use tgit_hash::ObjectId;
use tgit_utils::date::Signature;

use crate::ObjectError;

/// A git commit object.
///
/// The recognized headers are exactly `tree`, `parent`, `author` and
/// `committer`; a commit carrying any other header does not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Root tree of the committed snapshot.
    pub tree: ObjectId,
    /// Parent commits, in the order they appear (empty for a root commit).
    pub parents: Vec<ObjectId>,
    pub author: Signature,
    pub committer: Signature,
    /// Commit message with the single trailing newline stripped.
    pub message: BString,
}

impl Commit {
    /// Parse a commit payload (no envelope header).
    pub fn parse(payload: &[u8]) -> Result<Self, ObjectError> {
        let mut tree: Option<ObjectId> = None;
        let mut parents = Vec::new();
        let mut author: Option<Signature> = None;
        let mut committer: Option<Signature> = None;

        let mut pos = 0;
        while pos < payload.len() {
            // A blank line ends the header section.
            if payload[pos] == b'\n' {
                pos += 1;
                break;
            }

            let line_end = payload[pos..]
                .find_byte(b'\n')
                .map(|p| p + pos)
                .unwrap_or(payload.len());
            let line = &payload[pos..line_end];

            let sp = line.find_byte(b' ').ok_or_else(|| {
                ObjectError::InvalidHeader(format!(
                    "commit header without value: {:?}",
                    line.as_bstr()
                ))
            })?;
            let (key, value) = (&line[..sp], &line[sp + 1..]);

            match key {
                b"tree" => tree = Some(parse_oid_value(value)?),
                b"parent" => parents.push(parse_oid_value(value)?),
                b"author" => author = Some(parse_signature(value)?),
                b"committer" => committer = Some(parse_signature(value)?),
                other => {
                    return Err(ObjectError::UnknownCommitHeader(BString::from(other)));
                }
            }

            pos = line_end + 1;
        }

        let tree = tree.ok_or(ObjectError::MissingCommitField { field: "tree" })?;
        let author = author.ok_or(ObjectError::MissingCommitField { field: "author" })?;
        let committer =
            committer.ok_or(ObjectError::MissingCommitField { field: "committer" })?;

        // One trailing newline belongs to the serialization, not the message.
        let mut message = &payload[pos.min(payload.len())..];
        if message.last() == Some(&b'\n') {
            message = &message[..message.len() - 1];
        }

        Ok(Self {
            tree,
            parents,
            author,
            committer,
            message: BString::from(message),
        })
    }

    /// Serialize the commit payload (no envelope header).
    pub fn serialize_payload(&self) -> Vec<u8> {
        let mut out = Vec::new();

        out.extend_from_slice(b"tree ");
        out.extend_from_slice(self.tree.to_hex().as_bytes());
        out.push(b'\n');

        for parent in &self.parents {
            out.extend_from_slice(b"parent ");
            out.extend_from_slice(parent.to_hex().as_bytes());
            out.push(b'\n');
        }

        out.extend_from_slice(b"author ");
        out.extend_from_slice(&self.author.to_bytes());
        out.push(b'\n');

        out.extend_from_slice(b"committer ");
        out.extend_from_slice(&self.committer.to_bytes());
        out.push(b'\n');

        out.push(b'\n');
        // An empty message ends right after the separator; anything else
        // carries its single trailing newline.
        if !self.message.is_empty() {
            out.extend_from_slice(&self.message);
            out.push(b'\n');
        }

        out
    }

    /// First parent, if any.
    pub fn first_parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// First line of the message.
    pub fn summary(&self) -> &BStr {
        let msg: &[u8] = self.message.as_ref();
        match msg.find_byte(b'\n') {
            Some(pos) => BStr::new(&msg[..pos]),
            None => BStr::new(msg),
        }
    }
}

fn parse_oid_value(value: &[u8]) -> Result<ObjectId, ObjectError> {
    let hex = std::str::from_utf8(value)
        .map_err(|_| ObjectError::InvalidHeader("non-UTF-8 object id".into()))?;
    Ok(ObjectId::from_hex(hex)?)
}

fn parse_signature(value: &[u8]) -> Result<Signature, ObjectError> {
    Signature::parse(BStr::new(value))
        .map_err(|e| ObjectError::InvalidSignature(e.to_string()))
}
