//! uz1 compression driver.

use std::io::{Read, Write};

use log::debug;
use uzpak_core::{wire, Result};

use crate::progress::{check, Progress, Stage};
use crate::{bwt, filename, huffman, mtf, rle, Variant};

/// Compress `input` into a uz1 container on `output`.
///
/// `name` is the original filename embedded in the header; its encoding is
/// chosen automatically (narrow for ASCII, wide otherwise). `variant`
/// selects the four-stage (`1234`) or five-stage (`5678`) pipeline.
pub fn compress<R: Read, W: Write>(
    input: R,
    output: W,
    name: &str,
    variant: Variant,
) -> Result<()> {
    compress_with_progress(input, output, name, variant, |_| true)
}

/// Like [`compress`], reporting progress between stages and blocks.
///
/// The observer returning `false` cancels the operation; the partially
/// written output is left for the caller to discard.
pub fn compress_with_progress<R: Read, W: Write>(
    mut input: R,
    mut output: W,
    name: &str,
    variant: Variant,
    mut observer: impl FnMut(Progress) -> bool,
) -> Result<()> {
    wire::write_u32_le(&mut output, variant.signature())?;
    filename::write_filename(&mut output, name)?;

    let total_steps = variant.stage_count();
    let mut step = 0u32;
    let stage = |stage: Stage, step: u32, done: u64, total: u64| Progress {
        stage,
        step,
        total_steps,
        bytes_done: done,
        bytes_total: total,
    };

    let mut data = Vec::new();
    input.read_to_end(&mut data)?;
    let raw_len = data.len() as u64;

    step += 1;
    check(&mut observer, stage(Stage::RunLength, step, 0, raw_len))?;
    data = rle::encode(&data);
    debug!("run-length: {raw_len} -> {} bytes", data.len());

    // Block sort, block by block, with a progress check between blocks.
    step += 1;
    let rle_len = data.len() as u64;
    let mut sorted = Vec::with_capacity(data.len() + 16);
    let mut done = 0u64;
    for block in data.chunks(bwt::MAX_BLOCK_SIZE) {
        check(&mut observer, stage(Stage::BlockSort, step, done, rle_len))?;
        bwt::encode_block(block, &mut sorted);
        done += block.len() as u64;
    }
    debug!(
        "block sort: {} blocks, {} -> {} bytes",
        data.len().div_ceil(bwt::MAX_BLOCK_SIZE),
        data.len(),
        sorted.len()
    );
    data = sorted;

    step += 1;
    check(
        &mut observer,
        stage(Stage::MoveToFront, step, 0, data.len() as u64),
    )?;
    data = mtf::encode(&data);

    if variant == Variant::Extended {
        step += 1;
        check(
            &mut observer,
            stage(Stage::RunLength, step, 0, data.len() as u64),
        )?;
        data = rle::encode(&data);
        debug!("second run-length: {} bytes", data.len());
    }

    step += 1;
    check(
        &mut observer,
        stage(Stage::Huffman, step, 0, data.len() as u64),
    )?;
    huffman::encode(&data, &mut output)?;
    output.flush()?;
    Ok(())
}
