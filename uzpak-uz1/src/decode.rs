//! uz1 decompression driver.

use std::io::{Read, Write};

use log::debug;
use uzpak_core::{wire, Result, UzError};

use crate::progress::{check, Progress, Stage};
use crate::{bwt, filename, huffman, mtf, rle, Variant};

/// Decompress a uz1 container from `input` onto `output`, returning the
/// embedded original filename.
pub fn decompress<R: Read, W: Write>(input: R, output: W) -> Result<String> {
    decompress_with_progress(input, output, |_| true)
}

/// Like [`decompress`], reporting progress between stages and blocks.
///
/// The observer returning `false` cancels the operation; the partially
/// written output is left for the caller to discard.
pub fn decompress_with_progress<R: Read, W: Write>(
    mut input: R,
    mut output: W,
    mut observer: impl FnMut(Progress) -> bool,
) -> Result<String> {
    let signature = wire::read_u32_le(&mut input)?;
    let variant = Variant::try_from(signature)?;
    let name = filename::read_filename(&mut input)?;
    debug!("signature {signature}, embedded name {name:?}");

    let total_steps = variant.stage_count();
    let mut step = 0u32;
    let stage = |stage: Stage, step: u32, done: u64, total: u64| Progress {
        stage,
        step,
        total_steps,
        bytes_done: done,
        bytes_total: total,
    };

    step += 1;
    check(&mut observer, stage(Stage::Huffman, step, 0, 0))?;
    let mut data = huffman::decode(&mut input)?;
    debug!("huffman: {} bytes", data.len());

    if variant == Variant::Extended {
        step += 1;
        check(
            &mut observer,
            stage(Stage::RunLength, step, 0, data.len() as u64),
        )?;
        data = rle::decode(&data)?;
    }

    step += 1;
    check(
        &mut observer,
        stage(Stage::MoveToFront, step, 0, data.len() as u64),
    )?;
    data = mtf::decode(&data);

    // Undo the block sort, consuming the per-block framing as we go.
    step += 1;
    let framed_len = data.len() as u64;
    let mut restored = Vec::with_capacity(data.len());
    let mut cursor = &data[..];
    while !cursor.is_empty() {
        check(
            &mut observer,
            stage(
                Stage::BlockSort,
                step,
                framed_len - cursor.len() as u64,
                framed_len,
            ),
        )?;

        let length = wire::read_u32_le(&mut cursor)? as usize;
        let first = wire::read_u32_le(&mut cursor)?;
        let last = wire::read_u32_le(&mut cursor)?;
        if length > bwt::MAX_BLOCK_SIZE {
            return Err(UzError::corrupt(
                "bwt",
                format!("block length {length} exceeds {} bytes", bwt::MAX_BLOCK_SIZE),
            ));
        }
        let slots = length + 1;
        let payload = cursor.get(..slots).ok_or_else(|| {
            UzError::corrupt("bwt", "block payload truncated")
        })?;
        restored.extend_from_slice(&bwt::decode_block(first, last, payload)?);
        cursor = &cursor[slots..];
    }
    debug!("block sort undone: {} -> {} bytes", framed_len, restored.len());
    data = restored;

    step += 1;
    check(
        &mut observer,
        stage(Stage::RunLength, step, 0, data.len() as u64),
    )?;
    let data = rle::decode(&data)?;

    output.write_all(&data)?;
    output.flush()?;
    Ok(name)
}
