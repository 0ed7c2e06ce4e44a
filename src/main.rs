use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quiz_voice::{
    create_router, AnswerController, AppState, AudioEncoder, Config, FileCapture, RawAudioInput,
    RecognitionClient, WavFile,
};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "quiz-voice")]
#[command(version, about = "Voice answers for the quiz: encode, inspect, recognize")]
struct Cli {
    /// Config file (extension optional)
    #[arg(short, long, default_value = "config/quiz-voice")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode a recording as 16 kHz mono 16-bit WAV
    Encode {
        input: PathBuf,

        /// Output file (defaults to the input name with a .wav extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show format and loudness of a WAV file
    Inspect { input: PathBuf },

    /// Encode a recording and send it for recognition
    Recognize {
        input: PathBuf,

        /// Recognition endpoint, overriding the config file
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Run the speech gateway HTTP API
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Encode { input, output } => encode(&input, output),
        Command::Inspect { input } => inspect(&cli.config, &input),
        Command::Recognize { input, endpoint } => recognize(&cli.config, input, endpoint).await,
        Command::Serve => serve(&cli.config).await,
    }
}

fn encode(input: &Path, output: Option<PathBuf>) -> Result<()> {
    let bytes = std::fs::read(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let raw = RawAudioInput::new(bytes, quiz_voice::audio::media_type_for_path(input));

    let container = AudioEncoder::encode(&raw)
        .with_context(|| format!("Failed to decode {}", input.display()))?;

    let output = output.unwrap_or_else(|| input.with_extension("wav"));
    if output == input {
        anyhow::bail!("Refusing to overwrite input {}", input.display());
    }

    std::fs::write(&output, container.as_bytes())
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!(
        "Wrote {} ({} samples, {:.2}s, {} bytes)",
        output.display(),
        container.num_samples(),
        container.duration_secs(),
        container.byte_len()
    );

    Ok(())
}

fn inspect(config_path: &str, input: &Path) -> Result<()> {
    let wav = WavFile::open(input)?;
    let limits = Config::limits(config_path)?;
    let analysis = wav.analyze(limits.analysis_window_secs);

    info!("Path: {}", wav.path);
    info!(
        "Format: {}Hz, {} channels, {}-bit{}",
        wav.sample_rate,
        wav.channels,
        wav.bits_per_sample,
        if wav.is_canonical() { " (canonical)" } else { "" }
    );
    info!("Duration: {:.2}s", wav.duration_seconds);
    info!(
        "Peak: {}, energy: {:.1}, RMS: {:.1}{}",
        analysis.peak_amplitude,
        analysis.mean_energy,
        analysis.rms,
        if analysis.is_silence(limits.silence_rms) { " (silence)" } else { "" }
    );

    match limits.validate(&analysis) {
        Ok(()) => info!("Recording would be accepted"),
        Err(e) => info!("Recording would be rejected: {}", e),
    }

    Ok(())
}

async fn recognize(config_path: &str, input: PathBuf, endpoint: Option<String>) -> Result<()> {
    let (recognition_config, limits) = Config::for_recognition(config_path, endpoint)?;

    let client = RecognitionClient::new(&recognition_config)?;
    let mut controller = AnswerController::new(FileCapture::new(input), client, limits);

    controller.start_recording().await?;
    let recognition = controller.finish_and_submit().await?;

    println!("{}", recognition.text);
    info!("Confidence: {:.2}", recognition.confidence);

    Ok(())
}

async fn serve(config_path: &str) -> Result<()> {
    let cfg = Config::load(config_path)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    let recognizer = Arc::new(RecognitionClient::new(&cfg.recognition)?);
    let state = AppState::new(
        recognizer,
        cfg.audio.limits,
        &cfg.rate_limit,
        cfg.service.http.max_upload_bytes,
    );

    let addr: SocketAddr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port)
        .parse()
        .context("Invalid bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Speech gateway listening on {}", addr);

    axum::serve(
        listener,
        create_router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("HTTP server failed")?;

    Ok(())
}
