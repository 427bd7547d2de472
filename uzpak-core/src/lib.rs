//! # uzpak core
//!
//! Shared building blocks for the uzpak codec crates:
//!
//! - [`bitstream`]: LSB-first bit-level I/O used by the Huffman stage
//! - [`wire`]: little-endian integers and the compact-index varint
//! - [`error`]: the common error type
//!
//! The uz1 container and its pipeline stages live in `uzpak-uz1`; this crate
//! only knows about bytes, bits, and the integer encodings they carry.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bitstream;
pub mod error;
pub mod wire;

// Re-exports for convenience
pub use bitstream::{BitReader, BitWriter};
pub use error::{Result, UzError};
