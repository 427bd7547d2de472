//! The embedded original-filename record.
//!
//! The record is a compact-index length followed by `|length|` code units
//! including a terminating NUL. A positive length means one byte per unit;
//! a negative length means little-endian 16-bit units. Writers pick the
//! narrow form whenever every character fits in seven bits.

use std::io::{Read, Write};
use uzpak_core::{wire, Result, UzError};

/// Upper bound on stored name length in code units, terminator included.
/// Anything larger is treated as a corrupt record rather than an allocation
/// request.
const MAX_NAME_UNITS: usize = 0x1000;

/// Write the filename record for `name`.
///
/// Names containing NUL cannot be represented (the wire format is
/// NUL-terminated) and are rejected.
pub fn write_filename<W: Write>(writer: &mut W, name: &str) -> Result<()> {
    if name.contains('\0') {
        return Err(UzError::invalid_filename("name contains a NUL character"));
    }

    if name.chars().all(|c| c as u32 <= 0x7F) {
        // name.len() equals the character count here: all chars are ASCII.
        wire::write_compact_index(writer, (name.len() + 1) as i32)?;
        writer.write_all(name.as_bytes())?;
        writer.write_all(&[0])?;
    } else {
        let units: Vec<u16> = name.encode_utf16().collect();
        wire::write_compact_index(writer, -((units.len() + 1) as i32))?;
        for unit in units {
            writer.write_all(&unit.to_le_bytes())?;
        }
        writer.write_all(&[0, 0])?;
    }
    Ok(())
}

/// Read a filename record. The sign of the stored length selects the
/// decoding; the terminator must be present and must be the only NUL.
pub fn read_filename<R: Read>(reader: &mut R) -> Result<String> {
    let length = wire::read_compact_index(reader)?;
    if length == 0 {
        return Err(UzError::invalid_filename("stored length is zero"));
    }
    let units = length.unsigned_abs() as usize;
    if units > MAX_NAME_UNITS {
        return Err(UzError::invalid_filename(format!(
            "stored length {units} exceeds the {MAX_NAME_UNITS} unit limit"
        )));
    }

    if length > 0 {
        let mut bytes = vec![0u8; units];
        wire::read_exact(reader, &mut bytes)?;
        if bytes.pop() != Some(0) {
            return Err(UzError::invalid_filename("missing NUL terminator"));
        }
        if bytes.contains(&0) {
            return Err(UzError::invalid_filename(
                "name shorter than its stored length",
            ));
        }
        // Single-byte units decode as Latin-1.
        Ok(bytes.iter().map(|&b| char::from(b)).collect())
    } else {
        let mut wide = Vec::with_capacity(units);
        for _ in 0..units {
            wide.push(wire::read_u16_le(reader)?);
        }
        if wide.pop() != Some(0) {
            return Err(UzError::invalid_filename("missing NUL terminator"));
        }
        if wide.contains(&0) {
            return Err(UzError::invalid_filename(
                "name shorter than its stored length",
            ));
        }
        String::from_utf16(&wide)
            .map_err(|_| UzError::invalid_filename("name is not valid UTF-16"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn written(name: &str) -> Vec<u8> {
        let mut out = Vec::new();
        write_filename(&mut out, name).unwrap();
        out
    }

    fn read_back(bytes: &[u8]) -> Result<String> {
        read_filename(&mut Cursor::new(bytes))
    }

    #[test]
    fn test_ascii_goes_narrow() {
        let wire = written("Core.u");
        assert_eq!(wire, b"\x07Core.u\x00");
        assert_eq!(read_back(&wire).unwrap(), "Core.u");
    }

    #[test]
    fn test_non_ascii_goes_wide() {
        let wire = written("Höhle.u");
        // Length is negative: seven chars plus the terminator.
        assert_eq!(wire[0], 0x88);
        assert_eq!(wire.len(), 1 + 8 * 2);
        assert_eq!(read_back(&wire).unwrap(), "Höhle.u");
    }

    #[test]
    fn test_wide_units_are_little_endian() {
        let wire = written("\u{0416}"); // CYRILLIC CAPITAL ZHE, U+0416
        assert_eq!(wire, vec![0x82, 0x16, 0x04, 0x00, 0x00]);
    }

    #[test]
    fn test_empty_name_roundtrips() {
        let wire = written("");
        assert_eq!(wire, vec![0x01, 0x00]);
        assert_eq!(read_back(&wire).unwrap(), "");
    }

    #[test]
    fn test_nul_in_name_rejected() {
        let mut out = Vec::new();
        assert!(matches!(
            write_filename(&mut out, "bad\0name"),
            Err(UzError::InvalidFilename { .. })
        ));
    }

    #[test]
    fn test_zero_length_rejected() {
        assert!(matches!(
            read_back(&[0x00]),
            Err(UzError::InvalidFilename { .. })
        ));
    }

    #[test]
    fn test_missing_terminator_rejected() {
        // Length 3, but the last byte is not NUL.
        assert!(matches!(
            read_back(b"\x03abc"),
            Err(UzError::InvalidFilename { .. })
        ));
    }

    #[test]
    fn test_embedded_nul_rejected() {
        // Length 4 with a NUL in the middle: stored length disagrees with
        // the string.
        assert!(matches!(
            read_back(b"\x04a\x00b\x00"),
            Err(UzError::InvalidFilename { .. })
        ));
    }

    #[test]
    fn test_truncated_record() {
        assert!(matches!(
            read_back(b"\x05ab"),
            Err(UzError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_latin1_narrow_bytes_decode() {
        // A foreign writer may store high bytes on the narrow path; they
        // decode as Latin-1.
        assert_eq!(read_back(b"\x03a\xE9\x00").unwrap(), "aé");
    }
}
