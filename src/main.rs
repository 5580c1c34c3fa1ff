use std::error::Error;
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use radigenius::chat;
use radigenius::cli::{Cli, Command};
use radigenius::config::{LoggingConfig, Settings};
use radigenius::model::mistral::{MistralLoader, MistralTokenizer, MistralVisionModel};
use radigenius::model::{initialize_model, ComputeDevice, ModelError};
use radigenius::predict::Predictor;

/// Main entry point for the RadiGenius application
///
/// Loads settings, starts file logging, resolves the compute device and then
/// runs one of:
/// - Interactive: the image menu loop (default)
/// - Describe: a single prediction for one image file
/// - Config: prints the selected preset without loading the model
///
/// # Errors
/// Returns an error if settings are invalid, the model fails to load, or an
/// image cannot be read during the interactive loop
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let mut settings = Settings::new()?;
    cli.apply(&mut settings);

    // Keep the guard alive so buffered log lines are flushed on exit
    let _guard = init_logging(&settings.logging)?;

    info!("RadiGenius starting up...");
    info!("Settings loaded");

    let device = ComputeDevice::resolve(settings.device.preference);

    match cli.command() {
        Command::Config => {
            chat::display_config_table(settings.mode().config(), &settings.generation, device);
        }
        Command::Interactive => {
            let predictor = load_predictor(&settings, device).await?;
            chat::chat_loop(&settings, &predictor).await?;
        }
        Command::Describe { image, prompt, json } => {
            let predictor = load_predictor(&settings, device).await?;
            chat::describe_image(&settings, &predictor, &image, prompt.as_deref(), json).await?;
        }
    }

    Ok(())
}

/// Writes logs to a daily rolling file so the terminal stays free for the
/// interactive dialogue.
fn init_logging(logging: &LoggingConfig) -> Result<WorkerGuard, Box<dyn Error + Send + Sync>> {
    std::fs::create_dir_all(&logging.directory)?;

    let file_appender = tracing_appender::rolling::RollingFileAppender::new(
        tracing_appender::rolling::Rotation::DAILY,
        &logging.directory,
        "radigenius",
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_new(&logging.level)?;

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        // Disable ANSI colors for cleaner log files
        .with_ansi(false)
        .with_line_number(true)
        .with_file(true)
        .with_thread_ids(true)
        .with_target(false)
        .with_env_filter(filter)
        .init();

    let full_log_path = std::fs::canonicalize(&logging.directory)?;
    info!("Log directory: {}", full_log_path.display());

    Ok(guard)
}

/// Loads the model once and wraps it in the prediction context.
async fn load_predictor(
    settings: &Settings,
    device: ComputeDevice,
) -> Result<Predictor<MistralVisionModel, MistralTokenizer>, ModelError> {
    let pb = chat::spinner("Loading model weights...");
    let loaded = initialize_model(&MistralLoader, Some(&settings.model.mode), device).await;
    pb.finish_and_clear();

    let (model, tokenizer) = loaded?;
    info!("Model {} ready on {}", model.name(), model.device());

    Ok(Predictor::new(model, tokenizer, device).with_params(settings.generation))
}
