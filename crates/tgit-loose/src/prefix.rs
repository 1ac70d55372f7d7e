//! Object-id prefix expansion against the fan-out layout.

use tgit_hash::{hex, ObjectId};

use crate::{LooseError, LooseObjectStore};

/// Shortest prefix accepted, matching C git's MINIMUM_ABBREV.
const MINIMUM_ABBREV: usize = 4;

impl LooseObjectStore {
    /// Expand a hex prefix to the unique object id it names.
    ///
    /// Scans `.git/objects/<xx>/` for file names sharing the prefix.
    /// Two or more matches fail as ambiguous; zero matches fail as not
    /// found.
    pub fn resolve_prefix(&self, prefix: &str) -> Result<ObjectId, LooseError> {
        if prefix.len() < MINIMUM_ABBREV
            || prefix.len() > 40
            || !hex::is_hex_digits(prefix)
        {
            return Err(LooseError::InvalidPrefix(prefix.to_string()));
        }

        if prefix.len() == 40 {
            let oid = ObjectId::from_hex(prefix)?;
            if self.contains(&oid) {
                return Ok(oid);
            }
            return Err(LooseError::PrefixNotFound(prefix.to_string()));
        }

        let lower = prefix.to_ascii_lowercase();
        let (fanout, rest) = lower.split_at(2);
        let dir = self.objects_dir().join(fanout);
        if !dir.is_dir() {
            return Err(LooseError::PrefixNotFound(prefix.to_string()));
        }

        let mut matches: Vec<ObjectId> = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if name.len() != 38 || !name.starts_with(rest) {
                continue;
            }
            match ObjectId::from_hex(&format!("{fanout}{name}")) {
                Ok(oid) => matches.push(oid),
                Err(_) => {
                    log::warn!("ignoring stray file in object directory: {fanout}/{name}");
                }
            }
        }

        matches.sort();
        matches.dedup();

        match matches.len() {
            0 => Err(LooseError::PrefixNotFound(prefix.to_string())),
            1 => Ok(matches[0]),
            count => Err(LooseError::AmbiguousPrefix {
                prefix: prefix.to_string(),
                count,
            }),
        }
    }
}
