use std::fs;
use std::io::Write;
use std::path::Path;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use tgit_hash::{Hasher, ObjectId};
use tgit_object::{header, Object, ObjectType};

use crate::{LooseError, LooseObjectStore};

impl LooseObjectStore {
    /// Write an object; returns its id.
    pub fn write(&self, obj: &Object) -> Result<ObjectId, LooseError> {
        let payload = obj.serialize_payload();
        self.write_raw(obj.object_type(), &payload)
    }

    /// Write a raw payload with a known type; returns its id.
    ///
    /// Idempotent: if the object already exists the write is skipped.
    /// New objects land via a temp file and an atomic rename, so a
    /// concurrent identical write cannot corrupt the file.
    pub fn write_raw(
        &self,
        obj_type: ObjectType,
        payload: &[u8],
    ) -> Result<ObjectId, LooseError> {
        let hdr = header::write_header(obj_type, payload.len());

        let oid = {
            let mut hasher = Hasher::new();
            hasher.update(&hdr);
            hasher.update(payload);
            hasher.finalize()
        };

        if self.contains(&oid) {
            return Ok(oid);
        }

        let final_path = self.object_path(&oid);
        if let Some(fanout) = final_path.parent() {
            fs::create_dir_all(fanout)?;
        }

        let tmp_path = self.objects_dir().join(format!(
            "tmp_obj_{}_{}",
            std::process::id(),
            oid.to_hex()
        ));
        let file = fs::File::create(&tmp_path)?;
        let mut encoder = ZlibEncoder::new(file, Compression::default());
        let written = (|| {
            encoder.write_all(&hdr)?;
            encoder.write_all(payload)?;
            encoder.finish().map(|_| ())
        })();
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(LooseError::Io(e));
        }

        finalize(&tmp_path, &final_path)?;
        Ok(oid)
    }
}

/// Move the temp file into place. Losing the rename race to an identical
/// writer is fine: the object is content-addressed.
fn finalize(tmp: &Path, final_path: &Path) -> Result<(), LooseError> {
    match fs::rename(tmp, final_path) {
        Ok(()) => Ok(()),
        Err(_) if final_path.exists() => {
            let _ = fs::remove_file(tmp);
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(tmp);
            Err(LooseError::Io(e))
        }
    }
}
