//! Per-verse cue offsets for the subtitle stage.

use crate::corpus::Verse;
use serde::Serialize;

/// A verse with its start/end offsets inside the episode audio.
#[derive(Debug, Clone, Serialize)]
pub struct VerseCue {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
}

/// Build per-verse cues by a running sum over the duration array.
///
/// `durations` must have one entry per verse, in the same order.
pub fn cues_from_durations(verses: &[&Verse], durations: &[f64]) -> Vec<VerseCue> {
    debug_assert_eq!(verses.len(), durations.len());

    let mut cues = Vec::with_capacity(verses.len());
    let mut offset = 0.0;
    for (verse, &duration) in verses.iter().zip(durations) {
        let end = offset + duration;
        cues.push(VerseCue {
            book: verse.book.clone(),
            chapter: verse.chapter,
            verse: verse.verse,
            text: verse.text.clone(),
            start_seconds: offset,
            end_seconds: end,
        });
        offset = end;
    }
    cues
}
