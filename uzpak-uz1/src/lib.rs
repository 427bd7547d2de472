//! uz1 package compression/decompression.
//!
//! This crate provides a pure Rust implementation of the uz1 container used
//! by Unreal Engine 1 era games to distribute package files. A container
//! holds a single original file, wrapped with a magic signature, the
//! embedded original filename, and a payload transformed by a fixed cascade
//! of classical codecs:
//!
//! 1. Run-Length Encoding (threshold-5 runs)
//! 2. Burrows-Wheeler Transform (256 KiB blocks, suffix sorted)
//! 3. Move-to-Front Transform
//! 4. Run-Length Encoding again (variant 5678 only)
//! 5. Huffman coding, with the decoding tree embedded in the bit stream
//!
//! Decompression runs the chain in reverse. The wire format is fixed by
//! compatibility with the legacy implementations; see the individual stage
//! modules for the exact bit- and byte-level layouts.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Burrows-Wheeler block transform.
pub mod bwt;
mod decode;
mod encode;
mod filename;
mod huffman;
mod mtf;
mod progress;
mod rle;

pub use decode::{decompress, decompress_with_progress};
pub use encode::{compress, compress_with_progress};
pub use progress::{Progress, Stage};
pub use uzpak_core::{Result, UzError};

/// Signature of the four-stage pipeline (RLE, BWT, MTF, Huffman).
pub const SIGNATURE_UT99: u32 = 1234;

/// Signature of the five-stage pipeline, which adds a second RLE between
/// MTF and Huffman.
pub const SIGNATURE_EXTENDED: u32 = 5678;

/// Pipeline arrangement, identified by the container signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Signature `1234`: RLE, BWT, MTF, Huffman.
    Ut99,
    /// Signature `5678`: RLE, BWT, MTF, RLE, Huffman.
    Extended,
}

impl Variant {
    /// The 32-bit magic written at the start of the container.
    pub fn signature(self) -> u32 {
        match self {
            Variant::Ut99 => SIGNATURE_UT99,
            Variant::Extended => SIGNATURE_EXTENDED,
        }
    }

    /// Number of codec stages in this pipeline.
    pub fn stage_count(self) -> u32 {
        match self {
            Variant::Ut99 => 4,
            Variant::Extended => 5,
        }
    }
}

impl TryFrom<u32> for Variant {
    type Error = UzError;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            SIGNATURE_UT99 => Ok(Variant::Ut99),
            SIGNATURE_EXTENDED => Ok(Variant::Extended),
            found => Err(UzError::InvalidSignature { found }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_variant_signatures() {
        assert_eq!(Variant::Ut99.signature(), 1234);
        assert_eq!(Variant::Extended.signature(), 5678);
        assert_eq!(Variant::try_from(1234).unwrap(), Variant::Ut99);
        assert_eq!(Variant::try_from(5678).unwrap(), Variant::Extended);
        assert!(matches!(
            Variant::try_from(4321),
            Err(UzError::InvalidSignature { found: 4321 })
        ));
    }

    #[test]
    fn test_roundtrip_hello() {
        let original = b"hello, uz1 world";
        let mut packed = Vec::new();
        compress(Cursor::new(original), &mut packed, "hello.u", Variant::Ut99).unwrap();

        let mut unpacked = Vec::new();
        let name = decompress(Cursor::new(&packed), &mut unpacked).unwrap();
        assert_eq!(unpacked, original);
        assert_eq!(name, "hello.u");
    }

    #[test]
    fn test_roundtrip_empty() {
        let mut packed = Vec::new();
        compress(Cursor::new(b""), &mut packed, "a.u", Variant::Ut99).unwrap();

        let mut unpacked = Vec::new();
        let name = decompress(Cursor::new(&packed), &mut unpacked).unwrap();
        assert!(unpacked.is_empty());
        assert_eq!(name, "a.u");
    }

    #[test]
    fn test_header_layout() {
        let mut packed = Vec::new();
        compress(Cursor::new(b"x"), &mut packed, "a", Variant::Ut99).unwrap();
        // Signature 1234 little-endian, then the filename record "a\0" with
        // its compact-index length 2.
        assert_eq!(&packed[0..4], &1234u32.to_le_bytes());
        assert_eq!(&packed[4..7], &[0x02, b'a', 0x00]);
    }
}
