//! Delta programs: the copy/insert instruction streams that rebuild one
//! object's bytes from a base object.

use crate::PackError;

/// One delta instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeltaOp {
    /// Copy `size` bytes from `offset` in the base payload.
    Copy { offset: u32, size: u32 },
    /// Append literal bytes.
    Insert(Vec<u8>),
}

/// A fully decoded delta payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaProgram {
    /// Expected length of the base payload.
    pub base_size: u64,
    /// Expected length of the reconstructed payload.
    pub result_size: u64,
    pub ops: Vec<DeltaOp>,
}

/// Read a size varint: 7 data bits per byte, little-endian, bit 7 is the
/// continuation flag, shift starts at 0.
pub fn read_varint(data: &[u8]) -> Option<(u64, usize)> {
    let mut value = 0u64;
    let mut shift = 0u32;
    for (i, &byte) in data.iter().enumerate() {
        value |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Some((value, i + 1));
        }
        shift += 7;
    }
    None
}

/// Encode a size varint (inverse of [`read_varint`]).
pub fn write_varint(mut value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(10);
    loop {
        let bits = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(bits);
            return out;
        }
        out.push(bits | 0x80);
    }
}

/// Decode a delta payload into its program.
///
/// `offset` is the owning entry's pack offset, carried for diagnostics.
pub fn parse_program(delta: &[u8], offset: u64) -> Result<DeltaProgram, PackError> {
    let bad = |reason: &str| PackError::InvalidDelta {
        offset,
        reason: reason.into(),
    };

    let mut pos = 0;
    let (base_size, n) = read_varint(&delta[pos..]).ok_or_else(|| bad("truncated base size"))?;
    pos += n;
    let (result_size, n) =
        read_varint(&delta[pos..]).ok_or_else(|| bad("truncated result size"))?;
    pos += n;

    let mut ops = Vec::new();
    while pos < delta.len() {
        let cmd = delta[pos];
        pos += 1;

        if cmd & 0x80 != 0 {
            // Copy: bits 0..3 select offset fragment bytes, bits 4..6
            // select size fragment bytes.
            let mut offset_val: u32 = 0;
            for (bit, shift) in [(0x01u8, 0), (0x02, 8), (0x04, 16), (0x08, 24)] {
                if cmd & bit != 0 {
                    let b = *delta.get(pos).ok_or_else(|| bad("truncated copy offset"))?;
                    pos += 1;
                    offset_val |= u32::from(b) << shift;
                }
            }
            let mut size_val: u32 = 0;
            for (bit, shift) in [(0x10u8, 0), (0x20, 8), (0x40, 16)] {
                if cmd & bit != 0 {
                    let b = *delta.get(pos).ok_or_else(|| bad("truncated copy size"))?;
                    pos += 1;
                    size_val |= u32::from(b) << shift;
                }
            }
            // An encoded size of zero means 0x10000.
            if size_val == 0 {
                size_val = 0x10000;
            }
            ops.push(DeltaOp::Copy {
                offset: offset_val,
                size: size_val,
            });
        } else if cmd != 0 {
            let n = cmd as usize;
            let end = pos + n;
            if end > delta.len() {
                return Err(bad("truncated insert data"));
            }
            ops.push(DeltaOp::Insert(delta[pos..end].to_vec()));
            pos = end;
        } else {
            return Err(bad("instruction byte 0 is reserved"));
        }
    }

    Ok(DeltaProgram {
        base_size,
        result_size,
        ops,
    })
}

/// Apply a program to its base payload, producing the target payload.
///
/// Validates the declared base size, bounds-checks every copy, and
/// requires the output length to match `result_size`.
pub fn apply_program(
    program: &DeltaProgram,
    base: &[u8],
    offset: u64,
) -> Result<Vec<u8>, PackError> {
    if program.base_size != base.len() as u64 {
        return Err(PackError::InvalidDelta {
            offset,
            reason: format!(
                "base size mismatch: program says {}, base is {}",
                program.base_size,
                base.len()
            ),
        });
    }

    let mut out = Vec::with_capacity(program.result_size as usize);
    for op in &program.ops {
        match op {
            DeltaOp::Copy { offset: from, size } => {
                let start = *from as usize;
                let end = start + *size as usize;
                if end > base.len() {
                    return Err(PackError::InvalidDelta {
                        offset,
                        reason: format!(
                            "copy out of bounds: offset={from}, size={size}, base_len={}",
                            base.len()
                        ),
                    });
                }
                out.extend_from_slice(&base[start..end]);
            }
            DeltaOp::Insert(bytes) => out.extend_from_slice(bytes),
        }
    }

    if out.len() as u64 != program.result_size {
        return Err(PackError::InvalidDelta {
            offset,
            reason: format!(
                "result size mismatch: program says {}, got {}",
                program.result_size,
                out.len()
            ),
        });
    }

    Ok(out)
}

/// Encode a copy instruction (test and fixture helper).
pub fn encode_copy(offset: u32, size: u32) -> Vec<u8> {
    let mut cmd = 0x80u8;
    let mut tail = Vec::new();
    for (i, bit) in [(0u32, 0x01u8), (8, 0x02), (16, 0x04), (24, 0x08)] {
        let byte = (offset >> i) as u8;
        if byte != 0 {
            cmd |= bit;
            tail.push(byte);
        }
    }
    for (i, bit) in [(0u32, 0x10u8), (8, 0x20), (16, 0x40)] {
        let byte = (size >> i) as u8;
        if byte != 0 {
            cmd |= bit;
            tail.push(byte);
        }
    }
    let mut out = vec![cmd];
    out.extend_from_slice(&tail);
    out
}

/// Encode an insert instruction (test and fixture helper).
///
/// # Panics
///
/// Panics if `data` is empty or longer than 127 bytes.
pub fn encode_insert(data: &[u8]) -> Vec<u8> {
    assert!(
        !data.is_empty() && data.len() <= 0x7f,
        "insert literal must be 1..=127 bytes"
    );
    let mut out = vec![data.len() as u8];
    out.extend_from_slice(data);
    out
}

/// Build a complete delta payload from sizes and instruction bytes
/// (test and fixture helper).
pub fn encode_program(base_size: u64, result_size: u64, instructions: &[u8]) -> Vec<u8> {
    let mut out = write_varint(base_size);
    out.extend_from_slice(&write_varint(result_size));
    out.extend_from_slice(instructions);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varint_roundtrip() {
        for value in [0u64, 1, 127, 128, 300, 0xffff, 1 << 21, u64::from(u32::MAX)] {
            let bytes = write_varint(value);
            let (decoded, used) = read_varint(&bytes).unwrap();
            assert_eq!(decoded, value);
            assert_eq!(used, bytes.len());
        }
    }

    #[test]
    fn varint_truncation_detected() {
        assert!(read_varint(&[0x80]).is_none());
        assert!(read_varint(&[]).is_none());
    }

    #[test]
    fn parse_copy_and_insert() {
        let mut instructions = encode_copy(2, 3);
        instructions.extend_from_slice(&encode_insert(b"xyz"));
        let delta = encode_program(10, 6, &instructions);

        let program = parse_program(&delta, 0).unwrap();
        assert_eq!(program.base_size, 10);
        assert_eq!(program.result_size, 6);
        assert_eq!(
            program.ops,
            vec![
                DeltaOp::Copy { offset: 2, size: 3 },
                DeltaOp::Insert(b"xyz".to_vec()),
            ]
        );
    }

    #[test]
    fn zero_encoded_copy_size_means_64k() {
        // Command 0x80: copy with no offset and no size fragments.
        let delta = encode_program(0x20000, 0x10000, &[0x80]);
        let program = parse_program(&delta, 0).unwrap();
        assert_eq!(
            program.ops,
            vec![DeltaOp::Copy {
                offset: 0,
                size: 0x10000
            }]
        );
    }

    #[test]
    fn zero_instruction_byte_rejected() {
        let delta = encode_program(5, 5, &[0x00]);
        assert!(matches!(
            parse_program(&delta, 0),
            Err(PackError::InvalidDelta { .. })
        ));
    }

    #[test]
    fn apply_copy_only() {
        let base = b"Hello, World!";
        let mut instructions = encode_copy(0, 5);
        instructions.extend_from_slice(&encode_copy(7, 5));
        let delta = encode_program(base.len() as u64, 10, &instructions);

        let program = parse_program(&delta, 0).unwrap();
        assert_eq!(apply_program(&program, base, 0).unwrap(), b"HelloWorld");
    }

    #[test]
    fn apply_mixed() {
        let base = b"ABCDEFGHIJ";
        let mut instructions = encode_copy(0, 3);
        instructions.extend_from_slice(&encode_insert(b"xyz"));
        instructions.extend_from_slice(&encode_copy(7, 3));
        let delta = encode_program(base.len() as u64, 9, &instructions);

        let program = parse_program(&delta, 0).unwrap();
        assert_eq!(apply_program(&program, base, 0).unwrap(), b"ABCxyzHIJ");
    }

    #[test]
    fn apply_zero_size_copy_takes_64k() {
        let base: Vec<u8> = (0..70_000u32).map(|i| (i % 251) as u8).collect();
        let delta = encode_program(base.len() as u64, 0x10000, &[0x80]);
        let program = parse_program(&delta, 0).unwrap();
        let out = apply_program(&program, &base, 0).unwrap();
        assert_eq!(out.len(), 0x10000);
        assert_eq!(out, &base[..0x10000]);
    }

    #[test]
    fn copy_out_of_bounds_rejected() {
        let base = b"short";
        let delta = encode_program(base.len() as u64, 100, &encode_copy(0, 100));
        let program = parse_program(&delta, 0).unwrap();
        assert!(matches!(
            apply_program(&program, base, 0),
            Err(PackError::InvalidDelta { .. })
        ));
    }

    #[test]
    fn base_size_mismatch_rejected() {
        let base = b"Hello";
        let delta = encode_program(99, 5, &encode_copy(0, 5));
        let program = parse_program(&delta, 0).unwrap();
        assert!(matches!(
            apply_program(&program, base, 0),
            Err(PackError::InvalidDelta { .. })
        ));
    }

    #[test]
    fn result_size_mismatch_rejected() {
        let base = b"Hello";
        let delta = encode_program(base.len() as u64, 10, &encode_copy(0, 5));
        let program = parse_program(&delta, 0).unwrap();
        assert!(matches!(
            apply_program(&program, base, 0),
            Err(PackError::InvalidDelta { .. })
        ));
    }

    #[test]
    fn empty_program_produces_empty_result() {
        let delta = encode_program(8, 0, &[]);
        let program = parse_program(&delta, 0).unwrap();
        assert_eq!(apply_program(&program, b"anything", 0).unwrap(), b"");
    }
}
