use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use voxserve::config::Config;
use voxserve::engine::{ProcessSynthesizer, Recognizer, Synthesizer, WhisperRecognizer};
use voxserve::models::{provision, ModelLifecycle};
use voxserve::server::{serve, ServerState};

/// Long-form text-to-speech and transcription HTTP service.
#[derive(Debug, Parser)]
#[command(name = "voxserve", version, about)]
struct Args {
    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Model cache directory (overrides MODELS_DIR)
    #[arg(long)]
    models_dir: Option<PathBuf>,

    /// Whisper model name (overrides WHISPER_MODEL)
    #[arg(long)]
    whisper_model: Option<String>,

    /// Synthesis engine command (overrides SYNTHESIS_COMMAND)
    #[arg(long)]
    synthesis_command: Option<PathBuf>,

    /// Load both models at startup instead of on first request
    #[arg(long)]
    preload: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = Config::from_env()?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(dir) = args.models_dir {
        config.models_dir = dir;
    }
    if let Some(model) = args.whisper_model {
        config.whisper_model = model;
    }
    if let Some(command) = args.synthesis_command {
        config.synthesis_command = command;
    }
    config.validate()?;

    log::info!(
        "starting voxserve: port={} models_dir={} whisper={} device={}",
        config.port,
        config.models_dir.display(),
        config.whisper_model,
        voxserve::sys::detect_device()
    );

    // Provision Whisper weights up front. A failure here is logged, not
    // fatal: the first transcription request retries the load and reports
    // 503 until it succeeds, while synthesis keeps working.
    if let Err(e) = provision::ensure_whisper_model(&config).await {
        log::error!("whisper provisioning failed: {}", e);
    }

    let lifecycle = Arc::new(build_lifecycle(&config));

    if args.preload {
        preload_models(Arc::clone(&lifecycle)).await;
    }

    let state = Arc::new(ServerState::new(config, lifecycle));
    serve(state).await?;
    Ok(())
}

fn build_lifecycle(config: &Config) -> ModelLifecycle {
    let synthesis_command = config.synthesis_command.clone();
    let whisper_path = config.whisper_model_path();

    ModelLifecycle::new(
        move || {
            let engine = ProcessSynthesizer::new(synthesis_command.clone())?;
            Ok(Arc::new(engine) as Arc<dyn Synthesizer>)
        },
        move || {
            let engine = WhisperRecognizer::new(whisper_path.clone())?;
            Ok(Arc::new(engine) as Arc<dyn Recognizer>)
        },
    )
}

/// Eagerly load both models, logging failures without aborting: a broken
/// model still leaves the other endpoints usable.
async fn preload_models(lifecycle: Arc<ModelLifecycle>) {
    let result = tokio::task::spawn_blocking(move || {
        if let Err(e) = lifecycle.acquire_synthesizer() {
            log::error!("synthesis preload failed: {}", e);
        }
        if let Err(e) = lifecycle.acquire_recognizer() {
            log::error!("recognition preload failed: {}", e);
        }
    })
    .await;
    if let Err(e) = result {
        log::error!("preload worker failed: {}", e);
    }
}
