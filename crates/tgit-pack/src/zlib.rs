//! Zlib codec over byte cursors.
//!
//! Pack entries are framed only by the zlib stream's own end-of-stream
//! marker, so decompression must report exactly how many compressed
//! bytes it consumed for the caller to advance its cursor.

use std::io::{self, Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

/// Inflate one zlib stream starting at `buf[offset]`.
///
/// Returns the inflated bytes and the exact number of compressed input
/// bytes consumed.
pub fn decompress_from(buf: &[u8], offset: usize) -> io::Result<(Vec<u8>, usize)> {
    let mut decoder = ZlibDecoder::new(&buf[offset..]);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok((out, decoder.total_in() as usize))
}

/// Deflate a buffer into a complete zlib stream at the default level.
pub fn compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("writing to a Vec cannot fail");
    encoder.finish().expect("writing to a Vec cannot fail")
}
