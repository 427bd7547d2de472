//! Burrows-Wheeler block transform for the uz1 pipeline.
//!
//! Input is processed in independent blocks of at most [`MAX_BLOCK_SIZE`]
//! bytes. Each block goes to the wire as
//! `length:u32 | first:u32 | last:u32 | payload[length + 1]`, all integers
//! little-endian. The payload is one byte longer than the block because the
//! transform introduces a sentinel slot that duplicates the block's first
//! byte; `first` and `last` locate the rows needed to start and terminate
//! the inverse transform.
//!
//! The sort order is the suffix order of the block under a clamped
//! comparator: suffixes compare byte by byte while both stay in range, and
//! when one runs out of data the suffix with the greater start index sorts
//! later. That is exactly the suffix order of the block extended by one
//! virtual sentinel symbol greater than every byte, which is how
//! [`suffix_sort`] models it. The index array therefore always keeps its
//! final slot equal to the block length.

use uzpak_core::{Result, UzError};

/// Largest number of input bytes handled as one block (256 KiB).
pub const MAX_BLOCK_SIZE: usize = 0x40000;

/// Rank of the virtual end-of-block symbol, above every byte value.
const SENTINEL_RANK: u32 = 256;

/// Transform one block and append its wire form to `out`.
pub fn encode_block(block: &[u8], out: &mut Vec<u8>) {
    debug_assert!(!block.is_empty(), "empty blocks are never emitted");
    debug_assert!(block.len() <= MAX_BLOCK_SIZE);

    let order = suffix_sort(block);

    let mut first = 0u32;
    let mut last = 0u32;
    for (row, &index) in order.iter().enumerate() {
        if index == 1 {
            first = row as u32;
        } else if index == 0 {
            last = row as u32;
        }
    }

    out.extend_from_slice(&(block.len() as u32).to_le_bytes());
    out.extend_from_slice(&first.to_le_bytes());
    out.extend_from_slice(&last.to_le_bytes());
    for &index in &order {
        out.push(if index == 0 {
            // Sentinel slot: carries a duplicate of the first byte.
            block[0]
        } else {
            block[index as usize - 1]
        });
    }
}

/// Invert one block given its header fields and its `length + 1` payload
/// bytes.
///
/// The inverse is a 257-way counting sort: bucket 256 stands for the
/// sentinel slot at row `last`. Following the successor chain from `first`
/// for `length` steps reproduces the block; the sentinel row is skipped
/// because only `length` bytes are emitted.
pub fn decode_block(first: u32, last: u32, payload: &[u8]) -> Result<Vec<u8>> {
    let slots = payload.len();
    debug_assert!(slots > 0);
    let length = slots - 1;

    if first as usize >= slots || last as usize >= slots {
        return Err(UzError::corrupt(
            "bwt",
            format!("rotation indices {first}/{last} out of range for a {length} byte block"),
        ));
    }
    if first == last && length > 0 {
        return Err(UzError::corrupt(
            "bwt",
            format!("rotation indices coincide at {first}"),
        ));
    }

    let mut count = [0u32; 257];
    for (row, &byte) in payload.iter().enumerate() {
        count[bucket(row, last, byte)] += 1;
    }

    let mut running = [0u32; 257];
    let mut sum = 0u32;
    for symbol in 0..257 {
        running[symbol] = sum;
        sum += count[symbol];
        count[symbol] = 0;
    }

    let mut next = vec![0u32; slots];
    for (row, &byte) in payload.iter().enumerate() {
        let symbol = bucket(row, last, byte);
        next[(running[symbol] + count[symbol]) as usize] = row as u32;
        count[symbol] += 1;
    }

    let mut out = Vec::with_capacity(length);
    let mut row = first as usize;
    for _ in 0..length {
        out.push(payload[row]);
        row = next[row] as usize;
    }
    Ok(out)
}

#[inline]
fn bucket(row: usize, last: u32, byte: u8) -> usize {
    if row as u32 == last {
        256
    } else {
        byte as usize
    }
}

/// Order the suffixes of `block` extended by a virtual greatest sentinel,
/// returning the index array of `block.len() + 1` entries.
///
/// Prefix doubling (Manber-Myers): each round sorts by the rank pair
/// `(rank[i], rank[i + step])` and re-ranks, doubling `step` until every
/// rank is unique. The sentinel makes all suffixes distinct, so the loop
/// terminates after at most log2(n) + 1 rounds, O(n log^2 n) overall. The
/// comparator context lives entirely in this call.
fn suffix_sort(block: &[u8]) -> Vec<u32> {
    let slots = block.len() + 1;

    let mut rank: Vec<u32> = block
        .iter()
        .map(|&byte| u32::from(byte))
        .chain(Some(SENTINEL_RANK))
        .collect();
    let mut order: Vec<u32> = (0..slots as u32).collect();
    let mut fresh = vec![0u32; slots];

    let mut step = 1usize;
    loop {
        order.sort_unstable_by_key(|&suffix| pair_key(&rank, suffix, step));

        fresh[order[0] as usize] = 0;
        for row in 1..slots {
            let bump =
                pair_key(&rank, order[row], step) != pair_key(&rank, order[row - 1], step);
            fresh[order[row] as usize] = fresh[order[row - 1] as usize] + bump as u32;
        }
        std::mem::swap(&mut rank, &mut fresh);

        if rank[order[slots - 1] as usize] as usize == slots - 1 {
            break;
        }
        step *= 2;
    }
    order
}

/// Sort key for one doubling round: the suffix's rank followed by the rank
/// `step` positions later, shifted so that running out of data sorts first.
#[inline]
fn pair_key(rank: &[u32], suffix: u32, step: usize) -> (u32, u32) {
    let suffix = suffix as usize;
    let tail = match rank.get(suffix + step) {
        Some(&r) => r + 1,
        None => 0,
    };
    (rank[suffix], tail)
}
