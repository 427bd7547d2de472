//! Progress reporting and cooperative cancellation.
//!
//! Drivers call the observer at stage boundaries and between block-sort
//! blocks, never inside a stage. Returning `false` from the observer aborts
//! the operation with [`UzError::Cancelled`] before any further reads or
//! writes; whatever was already written to the sink is the caller's to
//! discard.

use uzpak_core::{Result, UzError};

/// Pipeline stages surfaced through [`Progress`] updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Threshold-5 run-length coding (runs once, twice for variant 5678).
    RunLength,
    /// Burrows-Wheeler block sort.
    BlockSort,
    /// Move-to-front transform.
    MoveToFront,
    /// Huffman entropy coding.
    Huffman,
}

impl Stage {
    /// Human-readable stage name.
    pub fn name(self) -> &'static str {
        match self {
            Stage::RunLength => "run-length",
            Stage::BlockSort => "block sort",
            Stage::MoveToFront => "move-to-front",
            Stage::Huffman => "huffman",
        }
    }
}

/// A progress snapshot handed to the observer.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    /// The stage about to run (or continue with its next block).
    pub stage: Stage,
    /// 1-based position of the stage in the pipeline.
    pub step: u32,
    /// Number of stages in the pipeline: four, or five for variant 5678.
    pub total_steps: u32,
    /// Bytes of this stage's input already processed.
    pub bytes_done: u64,
    /// Size of this stage's input, when known up front (0 otherwise).
    pub bytes_total: u64,
}

/// Run the observer for one update; a `false` return cancels.
pub(crate) fn check(
    observer: &mut impl FnMut(Progress) -> bool,
    update: Progress,
) -> Result<()> {
    if observer(update) {
        Ok(())
    } else {
        Err(UzError::Cancelled)
    }
}
