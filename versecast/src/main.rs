//! versecast - segment a verse corpus into narration episodes and
//! synthesize time-aligned audio for the scripture-reading video pipeline

mod allocator;
mod chunker;
mod config;
mod corpus;
mod pipeline;
mod segmenter;
mod timing;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::VersecastConfig;
use corpus::Corpus;
use indicatif::{ProgressBar, ProgressStyle};
use pipeline::PipelineOptions;
use segmenter::{Episode, segment};
use std::path::PathBuf;
use std::time::Duration;
use tts_client::{DurationProbe, FfprobeDurationProbe, FixedIntervalPacer, FixedRateProbe};

#[derive(Parser, Debug)]
#[command(name = "versecast")]
#[command(about = "Segment a verse corpus into narration episodes and synthesize time-aligned audio", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the corpus JSON file (overrides config)
    #[arg(short, long)]
    corpus: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the planned episodes for the corpus
    Plan,
    /// Synthesize one episode: chunk audio files plus per-verse cues
    Synth {
        /// Episode sequence number (1-based, as shown by `plan`)
        #[arg(long)]
        episode: u32,

        /// Output directory (default: ./episode-<n>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// TTS provider to use (http, command, mock), overrides config
        #[arg(long)]
        provider: Option<String>,

        /// Voice identifier, overrides config
        #[arg(long)]
        voice: Option<String>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set the default corpus path
    SetCorpus {
        /// Path to the corpus JSON file
        path: PathBuf,
    },
    /// Set the narration rate
    SetRate {
        /// Characters per minute
        chars_per_minute: usize,
    },
    /// Set the TTS provider
    SetProvider {
        /// Provider name (http, command, mock)
        name: String,
    },
    /// Set the voice identifier passed to the provider
    SetVoice {
        /// Voice name, e.g. ko-KR-SunHiNeural
        voice: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = VersecastConfig::load().context("Failed to load configuration")?;

    match &args.command {
        Commands::Plan => cmd_plan(&args, &config),
        Commands::Synth {
            episode,
            output,
            provider,
            voice,
        } => {
            cmd_synth(
                &args,
                &config,
                *episode,
                output.clone(),
                provider.clone(),
                voice.clone(),
            )
            .await
        }
        Commands::Config { action } => handle_config_command(action),
    }
}

/// Load the corpus named on the command line or in the config file.
fn load_corpus(args: &Args, config: &VersecastConfig) -> Result<Corpus> {
    let path = args
        .corpus
        .clone()
        .or_else(|| config.corpus.clone())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "corpus path required: pass --corpus or run 'versecast config set-corpus'"
            )
        })?;
    Corpus::load(&path)
}

/// Plan and cache the episode list for the corpus.
fn plan_episodes(corpus: &Corpus, config: &VersecastConfig) -> Result<Vec<Episode>> {
    let seg_config = config.segmentation();
    seg_config.validate()?;
    Ok(segment(corpus, &seg_config))
}

fn cmd_plan(args: &Args, config: &VersecastConfig) -> Result<()> {
    let corpus = load_corpus(args, config)?;
    let episodes = plan_episodes(&corpus, config)?;

    for episode in &episodes {
        println!(
            "{:>3}  {:<24} {:>7} chars  ~{:>5.1} min  ({} verses)",
            episode.sequence_number,
            episode.display_title(),
            episode.total_chars(),
            episode.estimated_minutes(config.chars_per_minute),
            episode.verse_count(),
        );
    }

    let total_chapters: usize = episodes.iter().map(|e| e.chapters.len()).sum();
    eprintln!(
        "\n{} episodes, {} chapters, {} chars total",
        episodes.len(),
        total_chapters,
        corpus.total_chars()
    );
    Ok(())
}

async fn cmd_synth(
    args: &Args,
    config: &VersecastConfig,
    episode_number: u32,
    output: Option<PathBuf>,
    provider_override: Option<String>,
    voice_override: Option<String>,
) -> Result<()> {
    let corpus = load_corpus(args, config)?;
    let episodes = plan_episodes(&corpus, config)?;

    let episode = episodes
        .iter()
        .find(|e| e.sequence_number == episode_number)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "episode not found: {} (the corpus has {} episodes)",
                episode_number,
                episodes.len()
            )
        })?;

    let mut tts_settings = config.tts.clone();
    if let Some(provider) = provider_override {
        tts_settings.provider = provider;
    }
    if let Some(voice) = voice_override {
        tts_settings.voice = Some(voice);
    }

    let provider =
        tts_client::get_provider(&tts_settings).context("Failed to create TTS provider")?;
    provider
        .is_available()
        .with_context(|| format!("TTS provider '{}' is not usable", provider.name()))?;

    // The probe is optional: without ffprobe, durations come from the
    // byte-rate estimate.
    let probe: Box<dyn DurationProbe> = match FfprobeDurationProbe::new(None) {
        Ok(probe) => Box::new(probe),
        Err(_) => {
            eprintln!("ffprobe not found; durations will be estimated from byte length");
            Box::new(FixedRateProbe::new(config.assumed_bytes_per_second as f64))
        }
    };

    let pacer = FixedIntervalPacer::from_secs(config.inter_chunk_delay_secs);
    let options = PipelineOptions {
        max_chars_per_chunk: config.max_chars_per_chunk,
        probe_timeout: Duration::from_secs(config.probe_timeout_secs),
        assumed_bytes_per_second: config.assumed_bytes_per_second,
    };

    if args.debug {
        eprintln!("Provider: {}", provider.name());
        eprintln!("Chunk ceiling: {:?}", options.max_chars_per_chunk);
        eprintln!("Inter-chunk delay: {}s", config.inter_chunk_delay_secs);
    }

    eprintln!(
        "Episode {}: {} ({} chars, ~{:.1} min)",
        episode.sequence_number,
        episode.display_title(),
        episode.total_chars(),
        episode.estimated_minutes(config.chars_per_minute)
    );

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} chunks {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let result = pipeline::synthesize_episode(
        episode,
        provider.as_ref(),
        probe.as_ref(),
        &pacer,
        &options,
        Some(&bar),
    )
    .await?;
    bar.finish_and_clear();

    let output_dir = output.unwrap_or_else(|| PathBuf::from(format!("episode-{episode_number}")));
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;

    for (i, audio) in result.chunk_audio.iter().enumerate() {
        let path = output_dir.join(format!("chunk-{:03}.mp3", i));
        std::fs::write(&path, audio)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    let verses: Vec<&corpus::Verse> = episode.verses().collect();
    let cues = timing::cues_from_durations(&verses, &result.verse_durations);
    let cues_path = output_dir.join("cues.json");
    let cues_json = serde_json::to_string_pretty(&cues)?;
    std::fs::write(&cues_path, cues_json)
        .with_context(|| format!("failed to write {}", cues_path.display()))?;

    eprintln!(
        "Wrote {} chunks and {} verse cues ({:.1}s audio) to {}",
        result.chunk_audio.len(),
        cues.len(),
        result.total_seconds,
        output_dir.display()
    );
    Ok(())
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = VersecastConfig::load()?;
            println!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::SetCorpus { path } => {
            let mut config = VersecastConfig::load()?;
            config.corpus = Some(path.clone());
            config.save()?;
            println!("Corpus path set to {}", path.display());
        }
        ConfigAction::SetRate { chars_per_minute } => {
            let mut config = VersecastConfig::load()?;
            config.chars_per_minute = *chars_per_minute;
            config.segmentation().validate()?;
            config.save()?;
            println!("Narration rate set to {} chars/min", chars_per_minute);
        }
        ConfigAction::SetProvider { name } => {
            tts_client::ProviderKind::from_str(name)?;
            let mut config = VersecastConfig::load()?;
            config.tts.provider = name.clone();
            config.save()?;
            println!("TTS provider set to {}", name);
        }
        ConfigAction::SetVoice { voice } => {
            let mut config = VersecastConfig::load()?;
            config.tts.voice = Some(voice.clone());
            config.save()?;
            println!("Voice set to {}", voice);
        }
    }
    Ok(())
}
