use std::fs;
use std::io::Read;

use flate2::read::ZlibDecoder;
use tgit_hash::ObjectId;
use tgit_object::{header, Object, ObjectType};

use crate::{LooseError, LooseObjectStore, MissingPiece};

impl LooseObjectStore {
    /// Whether an object with this id is present.
    pub fn contains(&self, oid: &ObjectId) -> bool {
        self.object_path(oid).is_file()
    }

    /// Read and parse an object.
    pub fn read(&self, oid: &ObjectId) -> Result<Object, LooseError> {
        let envelope = self.read_envelope(oid)?;
        Ok(Object::parse(&envelope)?)
    }

    /// Read an object's raw payload along with its type, without
    /// type-specific parsing.
    pub fn read_raw(&self, oid: &ObjectId) -> Result<(ObjectType, Vec<u8>), LooseError> {
        let envelope = self.read_envelope(oid)?;
        let (obj_type, size, header_len) = header::parse_header(&envelope)?;
        let payload = &envelope[header_len..];
        if payload.len() != size {
            return Err(LooseError::Corrupt {
                oid: *oid,
                reason: format!(
                    "envelope declares {size} payload bytes, file holds {}",
                    payload.len()
                ),
            });
        }
        Ok((obj_type, payload.to_vec()))
    }

    /// Read just the type and payload size, decompressing only the
    /// envelope header.
    pub fn read_header(&self, oid: &ObjectId) -> Result<(ObjectType, usize), LooseError> {
        let compressed = self.read_compressed(oid)?;

        // The header is "<type> <size>\0"; 64 bytes is far more room
        // than any valid header needs.
        let mut decoder = ZlibDecoder::new(&compressed[..]);
        let mut buf = [0u8; 64];
        let mut filled = 0;
        loop {
            if filled == buf.len() {
                return Err(LooseError::Corrupt {
                    oid: *oid,
                    reason: "envelope header exceeds 64 bytes".into(),
                });
            }
            let n = decoder
                .read(&mut buf[filled..])
                .map_err(|e| LooseError::Decompress {
                    oid: *oid,
                    source: e,
                })?;
            if n == 0 {
                return Err(LooseError::Corrupt {
                    oid: *oid,
                    reason: "EOF before envelope NUL terminator".into(),
                });
            }
            filled += n;
            if buf[..filled].contains(&0) {
                break;
            }
        }

        let (obj_type, size, _) = header::parse_header(&buf[..filled])?;
        Ok((obj_type, size))
    }

    /// Read the compressed file, mapping a missing path to the spec'd
    /// NotFound diagnostic (fan-out directory vs object file).
    fn read_compressed(&self, oid: &ObjectId) -> Result<Vec<u8>, LooseError> {
        let path = self.object_path(oid);
        match fs::read(&path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let piece = if path.parent().is_some_and(|dir| dir.is_dir()) {
                    MissingPiece::ObjectFile
                } else {
                    MissingPiece::FanoutDirectory
                };
                Err(LooseError::NotFound { oid: *oid, piece })
            }
            Err(e) => Err(LooseError::Io(e)),
        }
    }

    fn read_envelope(&self, oid: &ObjectId) -> Result<Vec<u8>, LooseError> {
        let compressed = self.read_compressed(oid)?;
        let mut decoder = ZlibDecoder::new(&compressed[..]);
        let mut envelope = Vec::new();
        decoder
            .read_to_end(&mut envelope)
            .map_err(|e| LooseError::Decompress {
                oid: *oid,
                source: e,
            })?;
        Ok(envelope)
    }
}
