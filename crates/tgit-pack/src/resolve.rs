//! Fixed-point delta resolution.
//!
//! Deltas may arrive in any order relative to their bases, and a base
//! may itself be a delta. Each pass walks the queue in arrival order and
//! resolves every record whose base has materialized; a pass that
//! resolves nothing while records remain means the pack is broken.

use std::collections::HashMap;

use tgit_hash::ObjectId;
use tgit_loose::LooseObjectStore;
use tgit_object::ObjectType;

use crate::delta::{apply_program, DeltaProgram};
use crate::PackError;

/// How a delta names its base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeltaBase {
    Oid(ObjectId),
    /// Absolute offset of the base entry in this pack.
    Offset(u64),
}

/// A queued, not-yet-resolved delta.
#[derive(Debug)]
pub(crate) struct DeltaRecord {
    /// The entry's own offset in the pack.
    pub offset: u64,
    pub base: DeltaBase,
    pub program: DeltaProgram,
}

/// Every materialized object of the current ingest, keyed by id and by
/// pack offset (ofs-delta bases are named by offset).
#[derive(Default)]
pub(crate) struct Staging {
    objects: HashMap<ObjectId, (ObjectType, Vec<u8>)>,
    oid_at_offset: HashMap<u64, ObjectId>,
}

impl Staging {
    pub fn insert(&mut self, oid: ObjectId, obj_type: ObjectType, payload: Vec<u8>, offset: u64) {
        self.objects.insert(oid, (obj_type, payload));
        self.oid_at_offset.insert(offset, oid);
    }

    /// All staged object ids, sorted.
    pub fn into_oids(self) -> Vec<ObjectId> {
        let mut oids: Vec<ObjectId> = self.objects.into_keys().collect();
        oids.sort();
        oids
    }

    fn get_base(&self, base: &DeltaBase) -> Option<(ObjectType, &[u8])> {
        let oid = match base {
            DeltaBase::Oid(oid) => *oid,
            DeltaBase::Offset(offset) => *self.oid_at_offset.get(offset)?,
        };
        self.objects
            .get(&oid)
            .map(|(ty, payload)| (*ty, payload.as_slice()))
    }
}

/// Drain the queue to empty, writing each resolved object through the
/// store. Returns the number of deltas resolved.
pub(crate) fn resolve_queue(
    mut queue: Vec<DeltaRecord>,
    staging: &mut Staging,
    store: &LooseObjectStore,
) -> Result<usize, PackError> {
    let mut resolved = 0usize;

    while !queue.is_empty() {
        let before = queue.len();
        let mut carried = Vec::new();

        for record in queue {
            let applied = match staging.get_base(&record.base) {
                Some((base_type, base_payload)) => {
                    let payload = apply_program(&record.program, base_payload, record.offset)?;
                    Some((base_type, payload))
                }
                None => None,
            };
            match applied {
                Some((obj_type, payload)) => {
                    let oid = store.write_raw(obj_type, &payload)?;
                    staging.insert(oid, obj_type, payload, record.offset);
                    resolved += 1;
                }
                None => carried.push(record),
            }
        }

        if carried.len() == before {
            log::warn!(
                "delta resolution stalled with {} record(s) outstanding",
                carried.len()
            );
            return Err(PackError::UnresolvableDelta {
                remaining: carried.len(),
            });
        }
        queue = carried;
    }

    Ok(resolved)
}
