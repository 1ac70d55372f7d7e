//! Index file serialization (version 2) and tree building.

use tgit_hash::{Hasher, ObjectId};
use tgit_loose::LooseObjectStore;
use tgit_object::{FileMode, ObjectType, Tree, TreeEntry};
use tgit_utils::lockfile::LockFile;

use crate::entry::IndexEntry;
use crate::read::{ondisk_entry_len, INDEX_SIGNATURE, INDEX_VERSION};
use crate::{Index, IndexError};

pub(crate) fn write_index(index: &Index, path: &std::path::Path) -> Result<(), IndexError> {
    let data = serialize_index(index);
    let mut lock = LockFile::acquire(path)?;
    lock.write_all(&data)?;
    lock.commit()?;
    Ok(())
}

fn serialize_index(index: &Index) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(INDEX_SIGNATURE);
    buf.extend_from_slice(&INDEX_VERSION.to_be_bytes());
    buf.extend_from_slice(&(index.len() as u32).to_be_bytes());

    for entry in index.iter() {
        write_entry(&mut buf, entry);
    }

    let checksum = Hasher::digest(&buf);
    buf.extend_from_slice(checksum.as_bytes());
    buf
}

fn write_entry(buf: &mut Vec<u8>, entry: &IndexEntry) {
    let start = buf.len();

    buf.extend_from_slice(&entry.stat.ctime_secs.to_be_bytes());
    buf.extend_from_slice(&entry.stat.ctime_nsecs.to_be_bytes());
    buf.extend_from_slice(&entry.stat.mtime_secs.to_be_bytes());
    buf.extend_from_slice(&entry.stat.mtime_nsecs.to_be_bytes());
    buf.extend_from_slice(&entry.stat.dev.to_be_bytes());
    buf.extend_from_slice(&entry.stat.ino.to_be_bytes());
    buf.extend_from_slice(&entry.mode.raw().to_be_bytes());
    buf.extend_from_slice(&entry.stat.uid.to_be_bytes());
    buf.extend_from_slice(&entry.stat.gid.to_be_bytes());
    buf.extend_from_slice(&entry.stat.size.to_be_bytes());
    buf.extend_from_slice(entry.oid.as_bytes());

    // Flags: path length in the low 12 bits, stage always 0.
    let flags = entry.path.len().min(0xfff) as u16;
    buf.extend_from_slice(&flags.to_be_bytes());

    buf.extend_from_slice(&entry.path);

    let target_len = ondisk_entry_len(entry.path.len());
    buf.resize(start + target_len, 0);
}

/// Build the tree hierarchy the index describes and return the root id.
pub(crate) fn write_tree_from_index(
    index: &Index,
    store: &LooseObjectStore,
) -> Result<ObjectId, IndexError> {
    build_subtree(index.entries(), 0, store)
}

/// Build one directory level from entries sharing `prefix_len` path
/// bytes. Entries are sorted by path, so each subdirectory forms one
/// contiguous run.
fn build_subtree(
    entries: &[IndexEntry],
    prefix_len: usize,
    store: &LooseObjectStore,
) -> Result<ObjectId, IndexError> {
    let mut tree = Tree::new();
    let mut i = 0;

    while i < entries.len() {
        let rest = &entries[i].path[prefix_len..];
        match rest.iter().position(|&b| b == b'/') {
            Some(slash) => {
                let dir_name = &rest[..slash];
                let run_prefix_len = prefix_len + slash + 1;
                let run_end = entries[i..]
                    .iter()
                    .position(|e| {
                        let p = &e.path[prefix_len..];
                        !(p.starts_with(dir_name) && p.get(slash) == Some(&b'/'))
                    })
                    .map(|n| i + n)
                    .unwrap_or(entries.len());

                let sub_oid = build_subtree(&entries[i..run_end], run_prefix_len, store)?;
                tree.entries.push(TreeEntry {
                    mode: FileMode::Tree,
                    name: dir_name.into(),
                    oid: sub_oid,
                });
                i = run_end;
            }
            None => {
                tree.entries.push(TreeEntry {
                    mode: entries[i].mode,
                    name: rest.into(),
                    oid: entries[i].oid,
                });
                i += 1;
            }
        }
    }

    Ok(store.write_raw(ObjectType::Tree, &tree.serialize_payload())?)
}
