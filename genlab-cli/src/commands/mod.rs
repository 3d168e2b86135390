//! Subcommand implementations.

pub mod chat;

use std::path::Path;

use genlab::prelude::*;

use crate::config::{self, ConfigError, GenlabConfig, IssueLevel, SamplingSection};
use crate::error::{CliError, Result};
use crate::walkthrough::{self, Outcome};
use crate::{
    ChainArgs, CompleteArgs, ConfigArgs, ConfigCommands, ModerateArgs, SamplingArgs,
    TranscribeArgs, TranslateArgs, WalkthroughArgs,
};

/// Resolved configuration shared by request-making commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// File and environment settings merged.
    pub config: GenlabConfig,
}

impl Context {
    /// Load the config file at `path` and apply environment variables.
    pub async fn load(path: &Path) -> Result<Self> {
        Ok(Self {
            config: config::resolve(path).await?,
        })
    }

    /// Build the API client.
    pub fn client(&self) -> Result<OpenAI> {
        let config = self.config.to_openai_config().ok_or_else(|| {
            ConfigError::MissingField("openai.api_key (or OPENAI_API_KEY)".to_owned())
        })?;
        let problems: Vec<String> = self
            .config
            .validate()
            .into_iter()
            .filter(|issue| issue.level == IssueLevel::Error)
            .map(|issue| format!("{}: {}", issue.path, issue.message))
            .collect();
        if !problems.is_empty() {
            return Err(ConfigError::InvalidValue(problems.join("; ")).into());
        }
        Ok(OpenAI::new(config)?)
    }

    /// Sampling options with command-line flags taking precedence.
    #[must_use]
    pub fn sampling(&self, flags: SamplingArgs) -> SamplingSection {
        SamplingSection {
            max_tokens: flags.max_tokens.or(self.config.sampling.max_tokens),
            temperature: flags.temperature.or(self.config.sampling.temperature),
        }
    }
}

/// Run a text completion and print the first choice.
pub async fn cmd_complete(ctx: &Context, args: CompleteArgs) -> Result<()> {
    let client = ctx.client()?;
    let sampling = ctx.sampling(args.sampling);

    let mut request = CompletionRequest::new(args.model.unwrap_or_default(), args.prompt);
    request.max_tokens = sampling.max_tokens;
    request.temperature = sampling.temperature;

    let response = client.complete(&request).await?;
    println!("{}", response.text().unwrap_or_default());
    if response.stop_reason().is_some_and(|r| r.is_truncated()) {
        tracing::warn!("completion stopped at the token limit");
    }
    if let Some(usage) = response.usage {
        tracing::debug!(%usage, "completion usage");
    }
    Ok(())
}

/// Moderate one or more inputs.
pub async fn cmd_moderate(ctx: &Context, args: ModerateArgs) -> Result<()> {
    let client = ctx.client()?;
    let request = ModerationRequest::batch(args.input).model(args.model.unwrap_or_default());
    let response = client.moderate(&request).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    for (input, result) in request.input.iter().zip(&response.results) {
        println!("{input}");
        println!("  {}", walkthrough::describe_moderation(result));
    }
    Ok(())
}

/// Transcribe an audio file.
pub async fn cmd_transcribe(ctx: &Context, args: TranscribeArgs) -> Result<()> {
    let client = ctx.client()?;
    let (audio, format) = genlab::audio::read_audio_file(&args.file).await?;

    let mut request =
        TranscriptionRequest::new(args.model.unwrap_or_default(), audio).format(format);
    request.language = args.language;
    request.prompt = args.prompt;
    request.response_format = args.format;

    let response = client.transcribe(&request).await?;
    print_transcription(&response);
    Ok(())
}

/// Translate an audio file into English.
pub async fn cmd_translate(ctx: &Context, args: TranslateArgs) -> Result<()> {
    let client = ctx.client()?;
    let (audio, format) = genlab::audio::read_audio_file(&args.file).await?;

    let mut request = TranslationRequest::new(args.model.unwrap_or_default(), audio).format(format);
    request.prompt = args.prompt;
    request.response_format = args.format;

    let response = client.translate(&request).await?;
    print_transcription(&response);
    Ok(())
}

/// Run a chain of templates.
pub async fn cmd_chain(ctx: &Context, args: ChainArgs) -> Result<()> {
    let client = ctx.client()?;
    let chain = build_chain(ctx, &args);

    let input = match (&args.audio, args.input) {
        (Some(path), _) => {
            let transcript = client.transcribe_file("", path, None).await?;
            tracing::info!(chars = transcript.text.len(), "transcribed chain input");
            transcript.text
        }
        (None, Some(input)) => input,
        (None, None) => return Err(CliError::usage("chain needs an input or --audio <file>")),
    };

    let output = chain.run(&client, &input).await?;
    for (index, step) in output.steps.iter().enumerate() {
        tracing::debug!(step = index + 1, prompt = %step.prompt, "chain step prompt");
    }
    println!("{}", output.output());
    tracing::info!(usage = %output.usage(), steps = output.steps.len(), "chain finished");
    Ok(())
}

fn build_chain(ctx: &Context, args: &ChainArgs) -> Chain {
    let sampling = ctx.sampling(args.sampling);
    args.steps.iter().fold(Chain::new(), |chain, template| {
        let mut step = ChainStep::new(template.clone()).model(args.model.clone().unwrap_or_default());
        step.system.clone_from(&args.system);
        step.temperature = sampling.temperature;
        step.max_tokens = sampling.max_tokens;
        chain.step(step)
    })
}

/// Run the documented examples.
pub async fn cmd_walkthrough(ctx: &Context, args: WalkthroughArgs) -> Result<()> {
    let client = ctx.client()?;
    let reports = walkthrough::run(&client, args.audio.as_deref(), args.only).await;

    for report in &reports {
        println!("== {} ==", report.example);
        match &report.outcome {
            Outcome::Completed(text) => println!("{}", text.trim()),
            Outcome::Skipped(reason) => println!("skipped: {reason}"),
            Outcome::Failed(message) => println!("failed: {message}"),
        }
        println!();
    }

    let failed = reports.iter().filter(|r| r.is_failure()).count();
    if failed > 0 {
        return Err(CliError::Walkthrough {
            failed,
            total: reports.len(),
        });
    }
    Ok(())
}

/// Configuration management.
pub async fn cmd_config(args: ConfigArgs, config_file: &Path) -> Result<()> {
    match args.command {
        ConfigCommands::Path => {
            println!("{}", config_file.display());
        }
        ConfigCommands::Show => {
            let config = config::resolve(config_file).await?;
            println!("# {}", config_file.display());
            println!(
                "{}",
                toml::to_string_pretty(&config.redacted()).map_err(ConfigError::from)?
            );
        }
        ConfigCommands::Init { force } => {
            config::init_config_at(config_file, force).await?;
            println!("Configuration created: {}", config_file.display());
            println!();
            println!("Next steps:");
            println!("  1. export OPENAI_API_KEY=<key>  (or set openai.api_key)");
            println!("  2. genlab walkthrough");
        }
        ConfigCommands::Validate => {
            let config = config::resolve(config_file).await?;
            let issues = config.validate();
            for issue in &issues {
                println!("{issue}");
            }
            if !config.is_valid() {
                return Err(ConfigError::InvalidValue(format!(
                    "{} invalid setting(s)",
                    issues.iter().filter(|i| i.level == IssueLevel::Error).count()
                ))
                .into());
            }
            println!("Configuration is valid");
        }
    }

    Ok(())
}

fn print_transcription(response: &TranscriptionResponse) {
    println!("{}", response.text.trim_end());
    if let Some(language) = &response.language {
        tracing::info!(%language, duration = ?response.duration, "detected language");
    }
}
