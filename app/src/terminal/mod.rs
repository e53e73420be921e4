//! Line-oriented front-end standing in for the browser form.

use anyhow::{Context, Result};
use codegen_core::{GenerationOutcome, Phase};
use tokio::{
    io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader},
    sync::broadcast::error::RecvError,
};
use tracing::{info, warn};

use crate::{
    clipboard,
    models::{BootstrapState, SessionEvent},
    session::generation_session::GenerationSession,
};

pub mod render;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Submit(String),
    Language(String),
    Languages,
    Copy,
    Dismiss,
    Status,
    Help,
    Quit,
    Unknown(String),
    Empty,
}

pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Empty;
    }

    let Some(rest) = trimmed.strip_prefix(':') else {
        return Command::Submit(line.to_string());
    };

    let mut parts = rest.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let argument = parts.next().map(str::trim).unwrap_or_default();

    match name {
        "lang" | "language" if !argument.is_empty() => Command::Language(argument.to_string()),
        "langs" | "languages" | "lang" | "language" => Command::Languages,
        "copy" => Command::Copy,
        "dismiss" | "close" => Command::Dismiss,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        _ => Command::Unknown(trimmed.to_string()),
    }
}

pub async fn run(session: GenerationSession, bootstrap: BootstrapState) -> Result<()> {
    let mut out = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut events = session.subscribe();
    let mut last_phase = bootstrap.state.phase.clone();

    write(&mut out, &render::header(&bootstrap)).await?;
    write(&mut out, "> ").await?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read from stdin")? else {
                    break;
                };
                if !handle_line(&session, &mut out, &line).await? {
                    break;
                }
                write(&mut out, "> ").await?;
            }
            event = events.recv() => {
                match event {
                    Ok(SessionEvent::StateChanged(state)) => {
                        if state.phase == last_phase {
                            continue;
                        }
                        last_phase = state.phase.clone();
                        if let Some(text) = render::phase(&state) {
                            write(&mut out, &format!("\n{text}> ")).await?;
                        }
                    }
                    Ok(SessionEvent::RuntimeError(error)) => {
                        if let Some(text) = render::error_detail(&error, &last_phase) {
                            write(&mut out, &format!("\n{text}> ")).await?;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "front-end fell behind session events");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    write(&mut out, &format!("\n{}", render::footer())).await
}

/// Returns false when the user asked to quit.
async fn handle_line<W>(session: &GenerationSession, out: &mut W, line: &str) -> Result<bool>
where
    W: AsyncWrite + Unpin,
{
    match parse_command(line) {
        Command::Empty => {}
        Command::Submit(prompt) => {
            if session.snapshot().await.is_pending() {
                write(out, "A generation is already in progress. Please wait.\n").await?;
            } else {
                session.set_prompt(prompt).await;
                session.submit().await;
            }
        }
        Command::Language(id) => {
            if session.snapshot().await.is_pending() {
                write(out, "Cannot change language while generating.\n").await?;
            } else {
                match session.set_language(&id).await {
                    Ok(()) => {
                        let state = session.snapshot().await;
                        let label = render::language_label(&state.current_language);
                        write(out, &format!("Language: {label}\n")).await?;
                    }
                    Err(error) => write(out, &format!("{error}. Try :langs.\n")).await?,
                }
            }
        }
        Command::Languages => {
            let state = session.snapshot().await;
            write(out, &render::languages(&state.current_language)).await?;
        }
        Command::Copy => copy_current_code(session, out).await?,
        Command::Dismiss => {
            if !session.dismiss().await {
                write(out, "Nothing to dismiss.\n").await?;
            }
        }
        Command::Status => {
            let state = session.snapshot().await;
            let text = render::phase(&state).unwrap_or_else(|| "Idle.\n".to_string());
            write(out, &text).await?;
        }
        Command::Help => write(out, &render::help()).await?,
        Command::Quit => return Ok(false),
        Command::Unknown(command) => {
            write(out, &format!("Unknown command: {command}. Try :help.\n")).await?
        }
    }
    Ok(true)
}

async fn copy_current_code<W>(session: &GenerationSession, out: &mut W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let state = session.snapshot().await;
    let code = match &state.phase {
        Phase::Resolved {
            outcome: GenerationOutcome::Success { code },
        } => code.clone(),
        _ => return write(out, "No generated code to copy.\n").await,
    };

    match clipboard::copy_text(&code).await {
        Ok(backend) => {
            info!(program = backend.program, "copied generated code");
            write(out, "Copied!\n").await
        }
        Err(error) => {
            warn!("failed to copy code: {error}");
            write(out, &render::copy_fallback(&code, &error.to_string())).await
        }
    }
}

async fn write<W>(out: &mut W, text: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    out.write_all(text.as_bytes())
        .await
        .context("failed to write to stdout")?;
    out.flush().await.context("failed to flush stdout")
}
