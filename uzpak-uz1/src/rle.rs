//! Threshold-5 run-length coding for the uz1 pipeline.
//!
//! A run shorter than five bytes is emitted as plain literals. A run of
//! five or more is emitted as exactly five literals followed by one length
//! byte holding the full run length, so runs are capped at 255 bytes and
//! longer runs split into several segments. There is no framing; the stage
//! maps a byte stream to a byte stream.

use uzpak_core::{Result, UzError};

/// Number of literal copies that announce a coded run.
pub const RUN_LEAD: usize = 5;

/// Largest run length a single length byte can hold.
const MAX_RUN: u8 = 255;

/// Run-length encode `data`.
pub fn encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut prev = 0u8;
    let mut count = 0u8;

    for &byte in data {
        if byte != prev || count == MAX_RUN {
            emit_run(&mut out, prev, count);
            prev = byte;
            count = 0;
        }
        count += 1;
    }
    emit_run(&mut out, prev, count);
    out
}

/// Flush one run: up to [`RUN_LEAD`] literals, plus the length byte for runs
/// that reached the lead.
fn emit_run(out: &mut Vec<u8>, byte: u8, count: u8) {
    for _ in 0..(count as usize).min(RUN_LEAD) {
        out.push(byte);
    }
    if count as usize >= RUN_LEAD {
        out.push(count);
    }
}

/// Decode run-length coded `data`.
///
/// Fails on a missing length byte or a length byte below [`RUN_LEAD`].
pub fn decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len());
    let mut prev = 0u8;
    let mut repeat = 0usize;

    let mut bytes = data.iter();
    while let Some(&byte) = bytes.next() {
        out.push(byte);
        if byte == prev {
            repeat += 1;
        } else {
            prev = byte;
            repeat = 1;
        }

        if repeat == RUN_LEAD {
            let &length = bytes
                .next()
                .ok_or_else(|| UzError::corrupt("rle", "run length byte missing"))?;
            if (length as usize) < RUN_LEAD {
                return Err(UzError::corrupt(
                    "rle",
                    format!("run length {length} below minimum {RUN_LEAD}"),
                ));
            }
            for _ in RUN_LEAD..length as usize {
                out.push(byte);
            }
            repeat = 0;
        }
    }
    Ok(out)
}
