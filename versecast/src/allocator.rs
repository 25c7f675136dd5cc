//! Duration allocation.
//!
//! The synthesis provider returns one measured duration for a whole chunk;
//! per-verse subtitles need one duration per unit. This distributes the
//! measured duration across the chunk's units in proportion to character
//! length, preserving the exact sum. Pure: it has no knowledge of how the
//! duration was obtained.

use crate::chunker::{Chunk, ChunkUnit};

/// Distribute `measured_seconds` across the units of `chunk`.
///
/// `units` is the same full sequence the chunk was planned from; the
/// chunk's inclusive index range selects its slice. The returned durations
/// sum to exactly `measured_seconds`. A zero-character chunk splits the
/// duration equally across its units.
pub fn allocate(chunk: &Chunk, measured_seconds: f64, units: &[ChunkUnit]) -> Vec<f64> {
    let slice = &units[chunk.start_unit..=chunk.end_unit];
    if slice.is_empty() {
        return Vec::new();
    }

    if chunk.total_chars == 0 {
        let share = measured_seconds / slice.len() as f64;
        return vec![share; slice.len()];
    }

    let mut durations = Vec::with_capacity(slice.len());
    let mut allocated = 0.0;
    for (i, unit) in slice.iter().enumerate() {
        if i + 1 == slice.len() {
            // The last unit takes the exact remainder, keeping the sum closed.
            durations.push(measured_seconds - allocated);
        } else {
            let share = measured_seconds * (unit.char_len as f64 / chunk.total_chars as f64);
            durations.push(share);
            allocated += share;
        }
    }

    durations
}
