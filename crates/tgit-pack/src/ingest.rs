use tgit_hash::{Hasher, ObjectId};
use tgit_loose::LooseObjectStore;

use crate::entry::{parse_entry_header, EntryKind};
use crate::resolve::{resolve_queue, DeltaBase, DeltaRecord, Staging};
use crate::{delta, zlib, PackError, PACK_HEADER_SIZE, PACK_SIGNATURE, PACK_VERSION};

/// Result of ingesting one pack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    /// Object count from the pack header.
    pub object_count: u32,
    /// How many of those arrived as deltas.
    pub deltas_resolved: usize,
    /// The id of every object the pack produced.
    pub oids: Vec<ObjectId>,
}

/// Decode a pack and write every object it carries into the store.
///
/// Undeltified objects are written as they stream past; delta records
/// are queued and resolved afterwards. On an unresolvable pack the
/// objects already written stay in the store (they are content-addressed
/// and valid on their own).
pub fn ingest_pack(
    data: &[u8],
    store: &LooseObjectStore,
) -> Result<IngestOutcome, PackError> {
    if data.len() < PACK_HEADER_SIZE + 20 {
        return Err(PackError::InvalidHeader(format!(
            "pack too small: {} bytes",
            data.len()
        )));
    }
    if &data[..4] != PACK_SIGNATURE {
        return Err(PackError::InvalidHeader("bad PACK signature".into()));
    }
    let version = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
    if version != PACK_VERSION {
        // Accepted without enforcement; only worth a note.
        log::debug!("pack declares version {version}");
    }
    let object_count = u32::from_be_bytes([data[8], data[9], data[10], data[11]]);

    let content_end = data.len() - 20;
    verify_trailer(data, content_end)?;

    let mut staging = Staging::default();
    let mut queue: Vec<DeltaRecord> = Vec::new();
    let mut cursor = PACK_HEADER_SIZE;

    for _ in 0..object_count {
        if cursor >= content_end {
            return Err(PackError::CorruptEntry {
                offset: cursor as u64,
                reason: "pack ends before declared object count".into(),
            });
        }
        let entry_offset = cursor as u64;
        let header = parse_entry_header(&data[cursor..content_end], entry_offset)?;

        let (payload, consumed) =
            zlib::decompress_from(&data[..content_end], cursor + header.header_len).map_err(
                |e| PackError::CorruptEntry {
                    offset: entry_offset,
                    reason: format!("zlib stream: {e}"),
                },
            )?;
        if payload.len() as u64 != header.size {
            return Err(PackError::CorruptEntry {
                offset: entry_offset,
                reason: format!(
                    "entry declares {} bytes, stream inflated to {}",
                    header.size,
                    payload.len()
                ),
            });
        }

        match header.kind {
            EntryKind::Commit | EntryKind::Tree | EntryKind::Blob | EntryKind::Tag => {
                let obj_type = header.kind.object_type().expect("undeltified kind");
                let oid = store.write_raw(obj_type, &payload)?;
                staging.insert(oid, obj_type, payload, entry_offset);
            }
            EntryKind::OfsDelta { base_offset } => {
                queue.push(DeltaRecord {
                    offset: entry_offset,
                    base: DeltaBase::Offset(base_offset),
                    program: delta::parse_program(&payload, entry_offset)?,
                });
            }
            EntryKind::RefDelta { base_oid } => {
                queue.push(DeltaRecord {
                    offset: entry_offset,
                    base: DeltaBase::Oid(base_oid),
                    program: delta::parse_program(&payload, entry_offset)?,
                });
            }
        }

        cursor += header.header_len + consumed;
    }

    if cursor != content_end {
        return Err(PackError::CorruptEntry {
            offset: cursor as u64,
            reason: format!(
                "{} unparsed byte(s) between last object and trailer",
                content_end - cursor
            ),
        });
    }

    log::debug!(
        "pack holds {} object(s), {} delta record(s)",
        object_count,
        queue.len()
    );

    let deltas_resolved = resolve_queue(queue, &mut staging, store)?;
    Ok(IngestOutcome {
        object_count,
        deltas_resolved,
        oids: staging.into_oids(),
    })
}

/// The trailer is the SHA-1 of everything before it.
fn verify_trailer(data: &[u8], content_end: usize) -> Result<(), PackError> {
    let expected = ObjectId::from_bytes(&data[content_end..])?;
    let actual = Hasher::digest(&data[..content_end]);
    if expected != actual {
        return Err(PackError::ChecksumMismatch { expected, actual });
    }
    Ok(())
}
