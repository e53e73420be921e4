pub mod clipboard;
pub mod config;
pub mod llm;
pub mod models;
pub mod secrets;
pub mod session;
pub mod terminal;

use std::{
    io::{IsTerminal, Read},
    process::ExitCode,
    time::Instant,
};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use codegen_core::{default_language, GenerationOutcome, SUPPORTED_LANGUAGES};
use config::{AppConfig, ProviderKind};
use models::{BootstrapState, GenerationReport};
use session::generation_session::GenerationSession;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "codegen-assistant", version, about)]
pub struct Cli {
    /// Completion provider (defaults to CODEGEN_PROVIDER, then gemini).
    #[arg(long, global = true, value_enum)]
    provider: Option<ProviderKind>,

    /// Model identifier sent to the provider.
    #[arg(long, global = true)]
    model: Option<String>,

    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Interactive prompt loop (default).
    Interactive,
    /// Generate one snippet and print it.
    Generate {
        #[arg(short, long, default_value = "python")]
        language: String,
        /// Print the full outcome as JSON.
        #[arg(long)]
        json: bool,
        /// Also copy the code to the clipboard.
        #[arg(long)]
        copy: bool,
        #[arg(required = true, trailing_var_arg = true)]
        prompt: Vec<String>,
    },
    /// List supported languages.
    Languages {
        #[arg(long)]
        json: bool,
    },
    /// Store an API key in the OS keychain. The key is read from stdin.
    SaveKey {
        /// Remove the stored key instead.
        #[arg(long)]
        clear: bool,
    },
}

struct AppState {
    config: AppConfig,
    session: GenerationSession,
}

impl AppState {
    fn bootstrap(cli: &Cli) -> Result<Self> {
        let mut config = AppConfig::from_env();
        if let Some(provider) = cli.provider {
            config = config.with_provider(provider);
        }
        if let Some(model) = cli.model.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            config.model = model.to_string();
        }

        let config = secrets::SecretService::new(secrets::KEYCHAIN_SERVICE).resolve_credential(config);

        let http_client = llm::build_http_client(&config)?;
        let generator = llm::build_code_generator(http_client, &config);
        info!(
            provider = config.provider.as_key(),
            model = %config.model,
            credential = config.has_credential(),
            "configuration loaded"
        );

        Ok(Self {
            config,
            session: GenerationSession::new(generator),
        })
    }

    async fn get_bootstrap_state(&self) -> BootstrapState {
        BootstrapState::new(&self.config, self.session.snapshot().await)
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("error: failed to start async runtime: {error}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(dispatch(cli)) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> Result<ExitCode> {
    match &cli.command {
        Some(Commands::Languages { json }) => list_languages(*json),
        Some(Commands::SaveKey { clear }) => save_api_key(&cli, *clear),
        Some(Commands::Generate {
            language,
            json,
            copy,
            prompt,
        }) => {
            let state = AppState::bootstrap(&cli)?;
            generate_once(&state, &prompt.join(" "), language, *json, *copy).await
        }
        Some(Commands::Interactive) | None => {
            let state = AppState::bootstrap(&cli)?;
            let bootstrap = state.get_bootstrap_state().await;
            terminal::run(state.session.clone(), bootstrap).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn generate_once(
    state: &AppState,
    prompt: &str,
    language: &str,
    json: bool,
    copy: bool,
) -> Result<ExitCode> {
    state.session.set_language(language).await?;
    state.session.set_prompt(prompt).await;

    let started_at = Utc::now();
    let started = Instant::now();
    state.session.submit().await.finished().await?;

    let snapshot = state.session.snapshot().await;
    let outcome = snapshot
        .outcome()
        .cloned()
        .context("generation finished without an outcome")?;

    if copy {
        if let GenerationOutcome::Success { code } = &outcome {
            if let Err(error) = clipboard::copy_text(code).await {
                eprintln!("warning: failed to copy code: {error}");
            }
        }
    }

    let exit = if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    };

    if json {
        let report = GenerationReport {
            prompt: prompt.trim().to_string(),
            language: snapshot.current_language.clone(),
            provider: state.config.provider,
            model: state.config.model.clone(),
            outcome,
            started_at,
            latency_ms: started.elapsed().as_millis() as i64,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(exit);
    }

    match outcome {
        GenerationOutcome::Success { code } => println!("{code}"),
        GenerationOutcome::Failure { message, .. } => eprintln!("error: {message}"),
    }
    Ok(exit)
}

fn list_languages(json: bool) -> Result<ExitCode> {
    if json {
        println!("{}", serde_json::to_string_pretty(SUPPORTED_LANGUAGES)?);
    } else {
        print!("{}", terminal::render::languages(default_language().id));
    }
    Ok(ExitCode::SUCCESS)
}

fn save_api_key(cli: &Cli, clear: bool) -> Result<ExitCode> {
    let provider = cli.provider.unwrap_or_else(|| AppConfig::from_env().provider);
    let secrets = secrets::SecretService::new(secrets::KEYCHAIN_SERVICE);

    if clear {
        let removed = secrets.delete_api_key(provider)?;
        println!(
            "{}",
            if removed {
                "API key removed."
            } else {
                "No stored API key."
            }
        );
        return Ok(ExitCode::SUCCESS);
    }

    if std::io::stdin().is_terminal() {
        eprintln!("Paste the {} API key and press Ctrl-D:", provider.as_key());
    }
    let mut api_key = String::new();
    std::io::stdin()
        .read_to_string(&mut api_key)
        .context("failed to read api key from stdin")?;

    secrets.save_api_key(provider, &api_key)?;
    println!("API key saved for {}.", provider.as_key());
    Ok(ExitCode::SUCCESS)
}

fn init_tracing(verbose: u8) {
    let env_filter = match verbose {
        0 => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,codegen_assistant_lib=info")),
        1 => EnvFilter::new("info,codegen_assistant_lib=debug"),
        _ => EnvFilter::new("debug,codegen_assistant_lib=trace"),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_generate_with_prompt_words() {
        let cli = Cli::try_parse_from([
            "codegen-assistant",
            "--provider",
            "openai",
            "generate",
            "-l",
            "rust",
            "--json",
            "reverse",
            "a",
            "string",
        ])
        .unwrap();

        assert_eq!(cli.provider, Some(ProviderKind::Openai));
        match cli.command {
            Some(Commands::Generate {
                language,
                json,
                copy,
                prompt,
            }) => {
                assert_eq!(language, "rust");
                assert!(json);
                assert!(!copy);
                assert_eq!(prompt.join(" "), "reverse a string");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn cli_defaults_to_interactive() {
        let cli = Cli::try_parse_from(["codegen-assistant", "-vv"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn generate_requires_a_prompt() {
        assert!(Cli::try_parse_from(["codegen-assistant", "generate"]).is_err());
    }
}
