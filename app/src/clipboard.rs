use std::process::Stdio;

use thiserror::Error;
use tokio::{io::AsyncWriteExt, process::Command};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipboardBackend {
    pub program: &'static str,
    pub args: &'static [&'static str],
}

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("no clipboard helper is available (tried: {0})")]
    Unavailable(String),
    #[error("{program} exited with {status}")]
    Failed {
        program: &'static str,
        status: std::process::ExitStatus,
    },
    #[error("failed to write to {program}: {source}")]
    Io {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(target_os = "macos")]
const PLATFORM_BACKENDS: &[ClipboardBackend] = &[ClipboardBackend {
    program: "pbcopy",
    args: &[],
}];

#[cfg(target_os = "windows")]
const PLATFORM_BACKENDS: &[ClipboardBackend] = &[ClipboardBackend {
    program: "clip",
    args: &[],
}];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const PLATFORM_BACKENDS: &[ClipboardBackend] = &[
    ClipboardBackend {
        program: "wl-copy",
        args: &[],
    },
    ClipboardBackend {
        program: "xclip",
        args: &["-selection", "clipboard"],
    },
    ClipboardBackend {
        program: "xsel",
        args: &["--clipboard", "--input"],
    },
];

pub fn platform_backends() -> &'static [ClipboardBackend] {
    PLATFORM_BACKENDS
}

/// Copies `text` with the first helper that accepts it.
pub async fn copy_text(text: &str) -> Result<ClipboardBackend, ClipboardError> {
    copy_with(platform_backends(), text).await
}

pub async fn copy_with(
    backends: &[ClipboardBackend],
    text: &str,
) -> Result<ClipboardBackend, ClipboardError> {
    let mut last_error = None;

    for backend in backends {
        match write_to(backend, text).await {
            Ok(()) => return Ok(*backend),
            Err(error) => {
                debug!(program = backend.program, "clipboard helper failed: {error}");
                last_error = Some(error);
            }
        }
    }

    match last_error {
        Some(ClipboardError::Failed { program, status }) => {
            Err(ClipboardError::Failed { program, status })
        }
        _ => Err(ClipboardError::Unavailable(
            backends
                .iter()
                .map(|backend| backend.program)
                .collect::<Vec<_>>()
                .join(", "),
        )),
    }
}

async fn write_to(backend: &ClipboardBackend, text: &str) -> Result<(), ClipboardError> {
    let io_error = |source| ClipboardError::Io {
        program: backend.program,
        source,
    };

    let mut child = Command::new(backend.program)
        .args(backend.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(io_error)?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes()).await.map_err(io_error)?;
        stdin.shutdown().await.map_err(io_error)?;
    }

    let status = child.wait().await.map_err(io_error)?;
    if status.success() {
        Ok(())
    } else {
        Err(ClipboardError::Failed {
            program: backend.program,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_platform_has_a_backend() {
        assert!(!platform_backends().is_empty());
    }

    #[tokio::test]
    async fn missing_helpers_report_unavailable() {
        let backends = [ClipboardBackend {
            program: "codegen-assistant-no-such-clipboard-helper",
            args: &[],
        }];
        match copy_with(&backends, "print(1)").await {
            Err(ClipboardError::Unavailable(tried)) => {
                assert_eq!(tried, "codegen-assistant-no-such-clipboard-helper")
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_backend_list_is_unavailable() {
        assert!(matches!(
            copy_with(&[], "x").await,
            Err(ClipboardError::Unavailable(_))
        ));
    }
}
