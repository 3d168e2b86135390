//! genlab CLI - walk through OpenAI-style completion, chat, moderation and
//! Whisper endpoints from the command line.

#![allow(clippy::print_stdout)] // CLI program intentionally uses stdout

mod commands;
mod config;
mod error;
mod walkthrough;

use clap::{Args, Parser, Subcommand};
use genlab::audio::TranscriptionResponseFormat;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::error::Result;
use crate::walkthrough::Example;

/// genlab - typed walkthrough of a hosted LLM API
#[derive(Parser)]
#[command(name = "genlab")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "GENLAB_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Continue a prompt with the text completion endpoint
    Complete(CompleteArgs),

    /// Chat with a model (one-shot with --message, interactive otherwise)
    Chat(ChatArgs),

    /// Classify text with the moderation endpoint
    Moderate(ModerateArgs),

    /// Transcribe an audio file
    Transcribe(TranscribeArgs),

    /// Translate an audio file into English
    Translate(TranslateArgs),

    /// Pipe each reply into the next prompt
    Chain(ChainArgs),

    /// Run every documented example in order
    Walkthrough(WalkthroughArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Sampling flags shared by text-generating commands.
#[derive(Args, Clone, Copy, Default)]
struct SamplingArgs {
    /// Maximum tokens to generate
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Sampling temperature (0.0 to 2.0)
    #[arg(short, long)]
    temperature: Option<f32>,
}

/// Arguments for the complete command
#[derive(Args)]
struct CompleteArgs {
    /// Prompt to continue
    prompt: String,

    /// Model to use (overrides config)
    #[arg(short, long)]
    model: Option<String>,

    #[command(flatten)]
    sampling: SamplingArgs,
}

/// Arguments for the chat command
#[derive(Args)]
struct ChatArgs {
    /// Send one message and exit
    #[arg(short, long)]
    message: Option<String>,

    /// System prompt placed before the conversation
    #[arg(short, long)]
    system: Option<String>,

    /// Model to use (overrides config)
    #[arg(short = 'M', long)]
    model: Option<String>,

    /// Print the reply as it is generated
    #[arg(long)]
    stream: bool,

    #[command(flatten)]
    sampling: SamplingArgs,
}

/// Arguments for the moderate command
#[derive(Args)]
struct ModerateArgs {
    /// Text to classify (several values are sent as one batch)
    #[arg(required = true)]
    input: Vec<String>,

    /// Model to use (overrides config)
    #[arg(short, long)]
    model: Option<String>,

    /// Print the raw response as JSON
    #[arg(long)]
    json: bool,
}

/// Arguments for the transcribe command
#[derive(Args)]
struct TranscribeArgs {
    /// Audio file (flac, mp3, mp4, mpeg, mpga, m4a, ogg, wav, webm)
    file: PathBuf,

    /// Model to use (overrides config)
    #[arg(short, long)]
    model: Option<String>,

    /// Prompt hint for spelling and style
    #[arg(short, long)]
    prompt: Option<String>,

    /// Spoken language (ISO 639-1)
    #[arg(short, long)]
    language: Option<String>,

    /// Response format: json, text, srt, vtt or verbose_json
    #[arg(short, long, value_parser = parse_response_format)]
    format: Option<TranscriptionResponseFormat>,
}

/// Arguments for the translate command
#[derive(Args)]
struct TranslateArgs {
    /// Audio file (flac, mp3, mp4, mpeg, mpga, m4a, ogg, wav, webm)
    file: PathBuf,

    /// Model to use (overrides config)
    #[arg(short, long)]
    model: Option<String>,

    /// English prompt hint for style
    #[arg(short, long)]
    prompt: Option<String>,

    /// Response format: json, text, srt, vtt or verbose_json
    #[arg(short, long, value_parser = parse_response_format)]
    format: Option<TranscriptionResponseFormat>,
}

/// Arguments for the chain command
#[derive(Args)]
struct ChainArgs {
    /// Input for the first step
    input: Option<String>,

    /// Step template; `{input}` is replaced by the previous reply
    #[arg(long = "step", required = true)]
    steps: Vec<String>,

    /// System prompt for every step
    #[arg(short, long)]
    system: Option<String>,

    /// Model to use (overrides config)
    #[arg(short, long)]
    model: Option<String>,

    /// Transcribe this audio file and use the transcript as input
    #[arg(long, conflicts_with = "input")]
    audio: Option<PathBuf>,

    #[command(flatten)]
    sampling: SamplingArgs,
}

/// Arguments for the walkthrough command
#[derive(Args)]
struct WalkthroughArgs {
    /// Audio file for the transcription, translation and chaining examples
    #[arg(short, long)]
    audio: Option<PathBuf>,

    /// Run a single example
    #[arg(long, value_enum)]
    only: Option<Example>,
}

/// Arguments for the config command
#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the resolved configuration (API key masked)
    Show,
    /// Show configuration file path
    Path,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Validate configuration
    Validate,
}

fn parse_response_format(s: &str) -> std::result::Result<TranscriptionResponseFormat, String> {
    TranscriptionResponseFormat::parse(s)
        .ok_or_else(|| format!("unknown format '{s}', expected json, text, srt, vtt or verbose_json"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("failed to create tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging with the given verbosity level.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "genlab={level},genlab_cli={level},{}",
            if verbosity >= 2 { "debug" } else { "warn" }
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let config_file = cli.config.unwrap_or_else(config::config_path);

    let context = || commands::Context::load(&config_file);

    match cli.command {
        Commands::Config(args) => commands::cmd_config(args, &config_file).await,
        Commands::Complete(args) => commands::cmd_complete(&context().await?, args).await,
        Commands::Chat(args) => commands::chat::cmd_chat(&context().await?, args).await,
        Commands::Moderate(args) => commands::cmd_moderate(&context().await?, args).await,
        Commands::Transcribe(args) => commands::cmd_transcribe(&context().await?, args).await,
        Commands::Translate(args) => commands::cmd_translate(&context().await?, args).await,
        Commands::Chain(args) => commands::cmd_chain(&context().await?, args).await,
        Commands::Walkthrough(args) => commands::cmd_walkthrough(&context().await?, args).await,
    }
}
