//! Pkt-line framing.
//!
//! Each frame is a 4-hex-digit length (counting the four length bytes
//! themselves) followed by the payload; `0000` is a flush marker that
//! ends the current group. Inside an upload-pack response, framing stops
//! the moment a payload begins with `PACK`: from there the rest of the
//! stream is raw pack data.

use std::io::{Read, Write};

use crate::ProtocolError;

/// Largest payload a single frame can carry (0xfff0 - 4).
pub const MAX_FRAME_DATA_LEN: usize = 65516;

/// One decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PktLine {
    /// A data frame.
    Data(Vec<u8>),
    /// The `0000` flush marker.
    Flush,
}

/// Reads frames from a byte stream.
pub struct PktLineReader<R> {
    reader: R,
}

impl<R: Read> PktLineReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Read one frame.
    pub fn read_pkt(&mut self) -> Result<PktLine, ProtocolError> {
        let mut len_buf = [0u8; 4];
        self.reader.read_exact(&mut len_buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                ProtocolError::Protocol("unexpected EOF reading frame length".into())
            } else {
                ProtocolError::Io(e)
            }
        })?;

        let len_str = std::str::from_utf8(&len_buf)
            .map_err(|_| ProtocolError::InvalidPktLine(format!("length bytes {len_buf:?}")))?;
        let len = usize::from_str_radix(len_str, 16)
            .map_err(|_| ProtocolError::InvalidPktLine(format!("length {len_str:?}")))?;

        match len {
            0 => Ok(PktLine::Flush),
            1..=3 => Err(ProtocolError::InvalidPktLine(format!(
                "length {len} is below the 4-byte minimum"
            ))),
            _ => {
                let mut data = vec![0u8; len - 4];
                self.reader.read_exact(&mut data)?;
                Ok(PktLine::Data(data))
            }
        }
    }

    /// Read data frames until the next flush.
    pub fn read_until_flush(&mut self) -> Result<Vec<Vec<u8>>, ProtocolError> {
        let mut frames = Vec::new();
        while let PktLine::Data(data) = self.read_pkt()? {
            frames.push(data);
        }
        Ok(frames)
    }

    /// Read the frame that starts the pack stream.
    ///
    /// The frame's payload must begin with `PACK`; everything after it
    /// in the underlying stream belongs to the pack and is returned
    /// verbatim (the server stops framing once pack data begins).
    pub fn read_pack_body(&mut self) -> Result<Vec<u8>, ProtocolError> {
        let mut body = match self.read_pkt()? {
            PktLine::Data(data) if data.starts_with(b"PACK") => data,
            PktLine::Data(data) => {
                return Err(ProtocolError::Protocol(format!(
                    "expected pack data, got frame starting {:?}",
                    &data[..data.len().min(8)]
                )));
            }
            PktLine::Flush => {
                return Err(ProtocolError::Protocol(
                    "expected pack data, got flush".into(),
                ));
            }
        };
        self.reader.read_to_end(&mut body)?;
        Ok(body)
    }
}

/// Writes frames to a byte stream.
pub struct PktLineWriter<W> {
    writer: W,
}

impl<W: Write> PktLineWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write one data frame.
    pub fn write_line(&mut self, data: &[u8]) -> Result<(), ProtocolError> {
        if data.len() > MAX_FRAME_DATA_LEN {
            return Err(ProtocolError::InvalidPktLine(format!(
                "payload of {} bytes exceeds the frame maximum",
                data.len()
            )));
        }
        write!(self.writer, "{:04x}", data.len() + 4)?;
        self.writer.write_all(data)?;
        Ok(())
    }

    /// Write a text frame, appending the trailing LF if absent.
    pub fn write_text(&mut self, text: &str) -> Result<(), ProtocolError> {
        if text.ends_with('\n') {
            self.write_line(text.as_bytes())
        } else {
            let mut data = Vec::with_capacity(text.len() + 1);
            data.extend_from_slice(text.as_bytes());
            data.push(b'\n');
            self.write_line(&data)
        }
    }

    /// Write the flush marker.
    pub fn write_flush(&mut self) -> Result<(), ProtocolError> {
        self.writer.write_all(b"0000")?;
        Ok(())
    }
}

/// Drop one trailing LF, the framer-level trim for text payloads.
pub fn trim_newline(data: &[u8]) -> &[u8] {
    match data.split_last() {
        Some((b'\n', rest)) => rest,
        _ => data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn write_read_data_frame() {
        let mut buf = Vec::new();
        PktLineWriter::new(&mut buf).write_line(b"hello").unwrap();
        assert_eq!(&buf, b"0009hello");

        let pkt = PktLineReader::new(Cursor::new(buf)).read_pkt().unwrap();
        assert_eq!(pkt, PktLine::Data(b"hello".to_vec()));
    }

    #[test]
    fn length_prefix_counts_itself() {
        let mut buf = Vec::new();
        PktLineWriter::new(&mut buf).write_line(b"abc").unwrap();
        assert_eq!(&buf[..4], b"0007");
    }

    #[test]
    fn text_frame_gains_newline() {
        let mut buf = Vec::new();
        PktLineWriter::new(&mut buf).write_text("want abc").unwrap();
        assert_eq!(&buf, b"000dwant abc\n");
    }

    #[test]
    fn flush_roundtrip() {
        let mut buf = Vec::new();
        PktLineWriter::new(&mut buf).write_flush().unwrap();
        assert_eq!(&buf, b"0000");
        let pkt = PktLineReader::new(Cursor::new(buf)).read_pkt().unwrap();
        assert_eq!(pkt, PktLine::Flush);
    }

    #[test]
    fn read_until_flush_collects_group() {
        let input = b"000ahello\n000bworld!\n00000008tail".to_vec();
        let mut reader = PktLineReader::new(Cursor::new(input));
        let frames = reader.read_until_flush().unwrap();
        assert_eq!(frames, vec![b"hello\n".to_vec(), b"world!\n".to_vec()]);
        assert_eq!(reader.read_pkt().unwrap(), PktLine::Data(b"tail".to_vec()));
    }

    #[test]
    fn short_lengths_are_invalid() {
        for bad in ["0001", "0002", "0003"] {
            let mut reader = PktLineReader::new(Cursor::new(bad.as_bytes().to_vec()));
            assert!(matches!(
                reader.read_pkt(),
                Err(ProtocolError::InvalidPktLine(_))
            ));
        }
    }

    #[test]
    fn non_hex_length_is_invalid() {
        let mut reader = PktLineReader::new(Cursor::new(b"zzzz".to_vec()));
        assert!(matches!(
            reader.read_pkt(),
            Err(ProtocolError::InvalidPktLine(_))
        ));
    }

    #[test]
    fn truncated_stream_is_a_protocol_error() {
        let mut reader = PktLineReader::new(Cursor::new(b"00".to_vec()));
        assert!(matches!(
            reader.read_pkt(),
            Err(ProtocolError::Protocol(_))
        ));
    }

    #[test]
    fn oversized_payload_rejected_by_writer() {
        let mut buf = Vec::new();
        let data = vec![0u8; MAX_FRAME_DATA_LEN + 1];
        assert!(PktLineWriter::new(&mut buf).write_line(&data).is_err());
    }

    #[test]
    fn empty_data_frame() {
        let mut reader = PktLineReader::new(Cursor::new(b"0004".to_vec()));
        assert_eq!(reader.read_pkt().unwrap(), PktLine::Data(Vec::new()));
    }

    #[test]
    fn pack_frame_swallows_the_remainder() {
        // One framed payload beginning with PACK, followed by unframed
        // bytes: everything after the frame header is pack data.
        let mut input = Vec::new();
        PktLineWriter::new(&mut input).write_line(b"PACKxyz").unwrap();
        input.extend_from_slice(b"unframed trailing bytes");

        let mut reader = PktLineReader::new(Cursor::new(input));
        let body = reader.read_pack_body().unwrap();
        assert_eq!(body, b"PACKxyzunframed trailing bytes");
    }

    #[test]
    fn non_pack_frame_rejected_as_pack_body() {
        let mut input = Vec::new();
        PktLineWriter::new(&mut input).write_line(b"NAK\n").unwrap();
        let mut reader = PktLineReader::new(Cursor::new(input));
        assert!(matches!(
            reader.read_pack_body(),
            Err(ProtocolError::Protocol(_))
        ));
    }

    #[test]
    fn trim_newline_drops_one() {
        assert_eq!(trim_newline(b"NAK\n"), b"NAK");
        assert_eq!(trim_newline(b"NAK"), b"NAK");
        assert_eq!(trim_newline(b"\n\n"), b"\n");
        assert_eq!(trim_newline(b""), b"");
    }
}
