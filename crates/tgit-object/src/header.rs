//! The canonical object envelope header: `"<type> <size>\0"`.

use crate::{ObjectError, ObjectType};

/// Parse an envelope header from the front of `data`.
///
/// Returns `(type, payload_size, header_length)` where `header_length`
/// includes the NUL terminator.
pub fn parse_header(data: &[u8]) -> Result<(ObjectType, usize, usize), ObjectError> {
    let nul = data
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| ObjectError::InvalidHeader("missing NUL terminator".into()))?;

    let header = &data[..nul];
    let sp = header
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| ObjectError::InvalidHeader("missing space".into()))?;

    let obj_type = ObjectType::from_bytes(&header[..sp])?;

    let size_str = std::str::from_utf8(&header[sp + 1..])
        .map_err(|_| ObjectError::InvalidHeader("non-ASCII size".into()))?;
    let payload_size: usize = size_str
        .parse()
        .map_err(|_| ObjectError::InvalidHeader(format!("invalid size: {size_str:?}")))?;

    Ok((obj_type, payload_size, nul + 1))
}

/// Write an envelope header for the given type and payload size.
pub fn write_header(obj_type: ObjectType, payload_size: usize) -> Vec<u8> {
    format!("{} {}\0", obj_type, payload_size).into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_blob_header() {
        let data = b"blob 11\0hello world";
        let (ty, size, len) = parse_header(data).unwrap();
        assert_eq!(ty, ObjectType::Blob);
        assert_eq!(size, 11);
        assert_eq!(len, 8);
        assert_eq!(&data[len..], b"hello world");
    }

    #[test]
    fn write_parse_roundtrip() {
        let hdr = write_header(ObjectType::Commit, 256);
        let (ty, size, len) = parse_header(&hdr).unwrap();
        assert_eq!(ty, ObjectType::Commit);
        assert_eq!(size, 256);
        assert_eq!(len, hdr.len());
    }

    #[test]
    fn rejects_missing_nul() {
        assert!(parse_header(b"blob 11").is_err());
    }

    #[test]
    fn rejects_missing_space() {
        assert!(parse_header(b"blob11\0").is_err());
    }

    #[test]
    fn rejects_unknown_type() {
        assert!(parse_header(b"blorb 11\0").is_err());
    }

    #[test]
    fn rejects_non_decimal_size() {
        assert!(parse_header(b"blob eleven\0").is_err());
        assert!(parse_header(b"blob -1\0").is_err());
    }
}
