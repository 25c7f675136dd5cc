//! Chunk planning for TTS requests.
//!
//! Packs an ordered unit sequence (verses) into maximal runs that fit a
//! provider's per-request character ceiling. Units are indivisible: one
//! that alone exceeds the ceiling still becomes its own oversized chunk.

/// Separator joining unit texts inside one request.
const UNIT_SEPARATOR: &str = " ";
const SEPARATOR_CHARS: usize = 1;

/// One indivisible piece of text for chunking purposes.
#[derive(Debug, Clone)]
pub struct ChunkUnit {
    pub text: String,
    pub char_len: usize,
}

impl ChunkUnit {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let char_len = text.chars().count();
        Self { text, char_len }
    }
}

/// A maximal run of units sent to the synthesis provider in one call.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Index of the first unit (inclusive)
    pub start_unit: usize,
    /// Index of the last unit (inclusive)
    pub end_unit: usize,
    /// Unit texts joined with a single separator
    pub text: String,
    /// Sum of unit character counts, separators excluded, so proportional
    /// duration allocation conserves sums
    pub total_chars: usize,
}

impl Chunk {
    pub fn unit_count(&self) -> usize {
        self.end_unit - self.start_unit + 1
    }
}

/// Greedily pack units into chunks of at most `max_chars` request characters.
///
/// Every unit lands in exactly one chunk and is never split or truncated.
pub fn plan_chunks(units: &[ChunkUnit], max_chars: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut current_start: Option<usize> = None;
    let mut text = String::new();
    let mut text_chars = 0usize;
    let mut unit_chars = 0usize;

    for (i, unit) in units.iter().enumerate() {
        match current_start {
            // A fresh chunk accepts its first unit unconditionally.
            None => {
                current_start = Some(i);
                text.push_str(&unit.text);
                text_chars = unit.char_len;
                unit_chars = unit.char_len;
            }
            Some(start) => {
                if text_chars + SEPARATOR_CHARS + unit.char_len <= max_chars {
                    text.push_str(UNIT_SEPARATOR);
                    text.push_str(&unit.text);
                    text_chars += SEPARATOR_CHARS + unit.char_len;
                    unit_chars += unit.char_len;
                } else {
                    chunks.push(Chunk {
                        start_unit: start,
                        end_unit: i - 1,
                        text: std::mem::take(&mut text),
                        total_chars: unit_chars,
                    });
                    current_start = Some(i);
                    text.push_str(&unit.text);
                    text_chars = unit.char_len;
                    unit_chars = unit.char_len;
                }
            }
        }
    }

    if let Some(start) = current_start {
        chunks.push(Chunk {
            start_unit: start,
            end_unit: units.len() - 1,
            text,
            total_chars: unit_chars,
        });
    }

    chunks
}
