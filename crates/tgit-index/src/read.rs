//! Index file parsing (version 2).

use bstr::BString;
use tgit_hash::{Hasher, ObjectId};
use tgit_object::FileMode;

use crate::entry::{IndexEntry, StatData};
use crate::{Index, IndexError};

pub(crate) const INDEX_SIGNATURE: &[u8; 4] = b"DIRC";
pub(crate) const INDEX_VERSION: u32 = 2;

/// Fixed bytes before the path: 40 bytes of stat+mode, 20 of OID, 2 of
/// flags.
const ENTRY_FIXED_LEN: usize = 62;

/// On-disk entry size: path is NUL-terminated and padded with NULs so
/// the next entry starts on an 8-byte boundary.
pub(crate) fn ondisk_entry_len(path_len: usize) -> usize {
    (ENTRY_FIXED_LEN + path_len + 8) & !7
}

pub(crate) fn parse_index(data: &[u8]) -> Result<Index, IndexError> {
    if data.len() < 12 + 20 {
        return Err(IndexError::InvalidHeader(format!(
            "index file too short: {} bytes",
            data.len()
        )));
    }

    verify_checksum(data)?;

    if &data[..4] != INDEX_SIGNATURE {
        return Err(IndexError::InvalidHeader("bad DIRC signature".into()));
    }
    let version = read_u32(&data[4..]);
    if version != INDEX_VERSION {
        return Err(IndexError::UnsupportedVersion(version));
    }
    let entry_count = read_u32(&data[8..]) as usize;

    let content_end = data.len() - 20;
    let mut index = Index::new();
    let mut cursor = 12;

    for _ in 0..entry_count {
        let (entry, next) = parse_entry(data, cursor, content_end)?;
        index.push_parsed(entry);
        cursor = next;
    }

    // Anything between the last entry and the checksum would be
    // extension blocks; this client writes none and skips any it finds.

    Ok(index)
}

fn parse_entry(
    data: &[u8],
    start: usize,
    content_end: usize,
) -> Result<(IndexEntry, usize), IndexError> {
    if start + ENTRY_FIXED_LEN > content_end {
        return Err(IndexError::InvalidEntry {
            offset: start,
            reason: "entry extends past index content".into(),
        });
    }

    let stat = StatData {
        ctime_secs: read_u32(&data[start..]),
        ctime_nsecs: read_u32(&data[start + 4..]),
        mtime_secs: read_u32(&data[start + 8..]),
        mtime_nsecs: read_u32(&data[start + 12..]),
        dev: read_u32(&data[start + 16..]),
        ino: read_u32(&data[start + 20..]),
        uid: read_u32(&data[start + 28..]),
        gid: read_u32(&data[start + 32..]),
        size: read_u32(&data[start + 36..]),
    };
    let mode = FileMode::from_raw(read_u32(&data[start + 24..]));

    let oid = ObjectId::from_bytes(&data[start + 40..start + 60]).map_err(|_| {
        IndexError::InvalidEntry {
            offset: start,
            reason: "invalid object id".into(),
        }
    })?;

    // Flags: the low 12 bits cache the path length; stage bits are
    // ignored (this client stages nothing beyond stage 0).
    let _flags = read_u16(&data[start + 60..]);

    let path_start = start + ENTRY_FIXED_LEN;
    let nul = data[path_start..content_end]
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| IndexError::InvalidEntry {
            offset: start,
            reason: "unterminated path".into(),
        })?;
    let path = BString::from(&data[path_start..path_start + nul]);

    let next = start + ondisk_entry_len(path.len());
    if next > content_end {
        return Err(IndexError::InvalidEntry {
            offset: start,
            reason: "entry padding extends past index content".into(),
        });
    }

    Ok((
        IndexEntry {
            path,
            oid,
            mode,
            stat,
        },
        next,
    ))
}

/// The trailing 20 bytes are the SHA-1 of everything before them.
fn verify_checksum(data: &[u8]) -> Result<(), IndexError> {
    let content = &data[..data.len() - 20];
    let stored = &data[data.len() - 20..];
    if Hasher::digest(content).as_bytes() != stored {
        return Err(IndexError::ChecksumMismatch);
    }
    Ok(())
}

fn read_u32(data: &[u8]) -> u32 {
    u32::from_be_bytes([data[0], data[1], data[2], data[3]])
}

fn read_u16(data: &[u8]) -> u16 {
    u16::from_be_bytes([data[0], data[1]])
}
