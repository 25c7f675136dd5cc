//! Whole-episode synthesis pass.
//!
//! Flattens an episode's verses, plans chunks against the provider's
//! character ceiling, synthesizes each chunk in order, measures its
//! duration (probe, with a byte-rate estimate as fallback) and allocates
//! it back to the verses. Chunks are processed sequentially: allocation
//! depends on each chunk's exact text-to-verse mapping and providers
//! rate-limit per minute.

use crate::allocator::allocate;
use crate::chunker::{Chunk, ChunkUnit, plan_chunks};
use crate::segmenter::Episode;
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use std::time::Duration;
use tts_client::{DurationProbe, Pacer, TtsProvider, estimate_duration_seconds};

/// Tuning for one episode's synthesis pass.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Overrides the provider's per-request ceiling when set
    pub max_chars_per_chunk: Option<usize>,
    /// How long to wait for the duration probe before estimating
    pub probe_timeout: Duration,
    /// Byte rate assumed by the fallback estimate (128 kbps MP3)
    pub assumed_bytes_per_second: u64,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_chars_per_chunk: None,
            probe_timeout: Duration::from_secs(10),
            assumed_bytes_per_second: 16_000,
        }
    }
}

/// Result of one episode's synthesis pass.
#[derive(Debug)]
pub struct EpisodeAudio {
    /// Encoded audio per chunk, in chunk order
    pub chunk_audio: Vec<Vec<u8>>,
    /// The chunk plan the audio was synthesized from
    pub chunks: Vec<Chunk>,
    /// Measured (or estimated) duration per chunk
    pub chunk_durations: Vec<f64>,
    /// One duration per verse, covering the whole episode
    pub verse_durations: Vec<f64>,
    /// Sum of all chunk durations
    pub total_seconds: f64,
}

/// Synthesize one episode and back-allocate durations to its verses.
///
/// A failed synthesis call aborts the whole episode: no partial output is
/// returned. A failed or timed-out probe degrades to the byte-rate
/// estimate and the pass continues.
pub async fn synthesize_episode(
    episode: &Episode,
    provider: &dyn TtsProvider,
    probe: &dyn DurationProbe,
    pacer: &dyn Pacer,
    options: &PipelineOptions,
    progress: Option<&ProgressBar>,
) -> Result<EpisodeAudio> {
    let units: Vec<ChunkUnit> = episode
        .verses()
        .map(|v| ChunkUnit::new(v.text.clone()))
        .collect();

    let max_chars = options
        .max_chars_per_chunk
        .unwrap_or_else(|| provider.max_chars_per_request());
    let chunks = plan_chunks(&units, max_chars);

    if let Some(bar) = progress {
        bar.set_length(chunks.len() as u64);
    }

    let mut chunk_audio = Vec::with_capacity(chunks.len());
    let mut chunk_durations = Vec::with_capacity(chunks.len());
    let mut verse_durations = Vec::with_capacity(units.len());
    let mut total_seconds = 0.0;

    for (i, chunk) in chunks.iter().enumerate() {
        if i > 0 {
            pacer.pause().await;
        }

        let audio = provider.synthesize(&chunk.text).await.with_context(|| {
            format!(
                "synthesis failed on chunk {}/{} of episode {}",
                i + 1,
                chunks.len(),
                episode.id
            )
        })?;

        let duration = measure_duration(probe, &audio, options).await;

        // The running totals advance only once the chunk's duration is
        // confirmed; a failure above must leave no trace of this chunk.
        verse_durations.extend(allocate(chunk, duration, &units));
        total_seconds += duration;
        chunk_durations.push(duration);
        chunk_audio.push(audio);

        if let Some(bar) = progress {
            bar.inc(1);
        }
    }

    Ok(EpisodeAudio {
        chunk_audio,
        chunks,
        chunk_durations,
        verse_durations,
        total_seconds,
    })
}

/// Probe the chunk's duration, estimating from byte length when the probe
/// fails, times out, or reports a non-finite value.
async fn measure_duration(
    probe: &dyn DurationProbe,
    audio: &[u8],
    options: &PipelineOptions,
) -> f64 {
    match tokio::time::timeout(options.probe_timeout, probe.probe(audio)).await {
        Ok(Ok(seconds)) if seconds.is_finite() && seconds >= 0.0 => seconds,
        _ => estimate_duration_seconds(audio.len(), options.assumed_bytes_per_second),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Book, Chapter, Corpus, Verse};
    use crate::segmenter::{SegmentationConfig, segment};
    use async_trait::async_trait;
    use tts_client::{FixedRateProbe, MockTtsProvider, NoPacer, TtsError};

    /// A corpus of one short book, three chapters with two verses each.
    fn test_episode() -> Episode {
        let chapters = (1..=3)
            .map(|c| {
                let verses = vec![
                    Verse::new("요나", c, 1, "가".repeat(40)),
                    Verse::new("요나", c, 2, "나".repeat(20)),
                ];
                Chapter::new("요나", c, verses)
            })
            .collect();
        let corpus = Corpus::from_books(vec![Book::new("요나", chapters)]);
        let episodes = segment(&corpus, &SegmentationConfig::default());
        assert_eq!(episodes.len(), 1);
        episodes.into_iter().next().unwrap()
    }

    fn options() -> PipelineOptions {
        PipelineOptions {
            max_chars_per_chunk: Some(100),
            ..PipelineOptions::default()
        }
    }

    struct FailingProbe;

    #[async_trait]
    impl tts_client::DurationProbe for FailingProbe {
        async fn probe(&self, _audio: &[u8]) -> tts_client::Result<f64> {
            Err(TtsError::ProbeFailed("no ffprobe".into()))
        }
    }

    #[tokio::test]
    async fn test_episode_pass_conserves_duration() {
        let episode = test_episode();
        // 1 byte per char, probed at 10 bytes/sec: chunk duration equals
        // chunk chars / 10.
        let provider = MockTtsProvider::always_succeeds().with_bytes_per_char(1);
        let probe = FixedRateProbe::new(10.0);

        let result = synthesize_episode(&episode, &provider, &probe, &NoPacer, &options(), None)
            .await
            .unwrap();

        assert_eq!(result.verse_durations.len(), episode.verse_count());
        assert_eq!(result.chunk_audio.len(), result.chunks.len());

        let verse_sum: f64 = result.verse_durations.iter().sum();
        assert!((verse_sum - result.total_seconds).abs() < 1e-6);
        let chunk_sum: f64 = result.chunk_durations.iter().sum();
        assert!((chunk_sum - result.total_seconds).abs() < 1e-6);

        // 40-char verses get twice the time of 20-char ones within a chunk.
        for chunk in &result.chunks {
            let first = result.verse_durations[chunk.start_unit];
            assert!(first > 0.0);
        }
    }

    #[tokio::test]
    async fn test_chunks_cover_all_verses_in_order() {
        let episode = test_episode();
        let provider = MockTtsProvider::always_succeeds().with_bytes_per_char(1);
        let probe = FixedRateProbe::new(10.0);

        let result = synthesize_episode(&episode, &provider, &probe, &NoPacer, &options(), None)
            .await
            .unwrap();

        // The synthesized texts, joined, contain every verse exactly once.
        let texts = provider.synthesized_texts();
        assert_eq!(texts.len(), result.chunks.len());
        let expected: Vec<String> = result.chunks.iter().map(|c| c.text.clone()).collect();
        assert_eq!(texts, expected);

        let mut next = 0;
        for chunk in &result.chunks {
            assert_eq!(chunk.start_unit, next);
            next = chunk.end_unit + 1;
        }
        assert_eq!(next, episode.verse_count());
    }

    #[tokio::test]
    async fn test_synthesis_failure_aborts_episode() {
        let episode = test_episode();
        let provider = MockTtsProvider::always_fails(TtsError::SynthesisFailed {
            provider: "mock".into(),
            message: "quota".into(),
        });
        let probe = FixedRateProbe::new(10.0);

        let result =
            synthesize_episode(&episode, &provider, &probe, &NoPacer, &options(), None).await;
        assert!(result.is_err());
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("synthesis failed on chunk 1"));
    }

    #[tokio::test]
    async fn test_probe_failure_falls_back_to_estimate() {
        let episode = test_episode();
        let provider = MockTtsProvider::always_succeeds().with_bytes_per_char(100);
        let opts = PipelineOptions {
            assumed_bytes_per_second: 1000,
            ..options()
        };

        let result =
            synthesize_episode(&episode, &provider, &FailingProbe, &NoPacer, &opts, None)
                .await
                .unwrap();

        // Every chunk duration is bytes / 1000.
        for (chunk, &duration) in result.chunks.iter().zip(&result.chunk_durations) {
            let bytes = chunk.text.chars().count() * 100;
            let expected = bytes as f64 / 1000.0;
            assert!((duration - expected).abs() < 1e-9);
        }
        let verse_sum: f64 = result.verse_durations.iter().sum();
        assert!((verse_sum - result.total_seconds).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_chunk_ceiling_override_applies() {
        let episode = test_episode();
        let provider = MockTtsProvider::always_succeeds().with_bytes_per_char(1);
        let probe = FixedRateProbe::new(10.0);
        // 61 request chars per chapter; a 70-char ceiling forces one chunk per chapter.
        let opts = PipelineOptions {
            max_chars_per_chunk: Some(70),
            ..PipelineOptions::default()
        };

        let result = synthesize_episode(&episode, &provider, &probe, &NoPacer, &opts, None)
            .await
            .unwrap();
        assert_eq!(result.chunks.len(), 3);
        for chunk in &result.chunks {
            assert!(chunk.text.chars().count() <= 70);
        }
    }
}
