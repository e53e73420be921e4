use codegen_core::{find_language, GenerationOutcome, InteractionState, Phase, SUPPORTED_LANGUAGES};

use crate::models::{BootstrapState, RuntimeErrorEvent};

const RULE: &str = "----------------------------------------------------------------";

pub fn header(bootstrap: &BootstrapState) -> String {
    let mut out = String::new();
    out.push_str(RULE);
    out.push_str("\n  AI Code Generator\n");
    out.push_str(RULE);
    out.push_str(
        "\nDescribe the code you need, select a language, and let the assistant craft it for you.\n\
Generated code is a starting point: always review and test it.\n\n",
    );
    out.push_str(&format!(
        "Provider: {} ({})\n",
        bootstrap.provider.as_key(),
        bootstrap.model
    ));
    if !bootstrap.credential_configured {
        out.push_str(
            "Warning: no API key configured. Set GEMINI_API_KEY or run `codegen-assistant save-key`.\n",
        );
    }
    out.push_str(&format!(
        "Language: {}\n",
        language_label(&bootstrap.state.current_language)
    ));
    out.push_str("Type a request and press enter. `:help` lists commands.\n");
    out
}

pub fn footer() -> String {
    format!("{RULE}\nPowered by a generative AI completion service. Bye.\n")
}

pub fn help() -> String {
    [
        "Commands:",
        "  <text>         generate code for <text> in the selected language",
        "  :lang <id>     select a language",
        "  :langs         list supported languages",
        "  :copy          copy the generated code to the clipboard",
        "  :dismiss       close the error message",
        "  :status        show the current state",
        "  :help          show this help",
        "  :quit          exit",
    ]
    .join("\n")
        + "\n"
}

pub fn languages(selected: &str) -> String {
    SUPPORTED_LANGUAGES
        .iter()
        .map(|option| {
            let marker = if option.id == selected { '*' } else { ' ' };
            format!("{marker} {:<12} {}\n", option.id, option.label)
        })
        .collect()
}

pub fn language_label(id: &str) -> &str {
    find_language(id).map(|option| option.label).unwrap_or(id)
}

/// Text for the result area, or `None` when there is nothing to show.
pub fn phase(state: &InteractionState) -> Option<String> {
    match &state.phase {
        Phase::Idle => None,
        Phase::Pending { .. } => Some("Generating...\n".to_string()),
        Phase::Resolved { outcome } => Some(outcome_block(outcome, &state.current_language)),
    }
}

pub fn outcome_block(outcome: &GenerationOutcome, language: &str) -> String {
    match outcome {
        GenerationOutcome::Success { code } => format!(
            "--- Generated Code ({language}) {}\n{code}\n{RULE}\n(:copy to copy)\n",
            "-".repeat(RULE.len().saturating_sub(language.len() + 22))
        ),
        GenerationOutcome::Failure { message, .. } => {
            format!("[error] {message}  (:dismiss to close)\n")
        }
    }
}

/// Provider detail under an error banner whose message hides it, such as the canned quota text.
pub fn error_detail(error: &RuntimeErrorEvent, shown: &Phase) -> Option<String> {
    match shown {
        Phase::Resolved {
            outcome: GenerationOutcome::Failure { message, .. },
        } if !message.contains(&error.message) => {
            Some(format!("  detail [{}]: {}\n", error.code, error.message))
        }
        _ => None,
    }
}

/// Shown when no clipboard helper worked, so the text can still be selected by hand.
pub fn copy_fallback(code: &str, reason: &str) -> String {
    format!(
        "Failed to copy code ({reason}). Please copy it manually:\n\
-----BEGIN CODE-----\n{code}\n-----END CODE-----\n"
    )
}

#[cfg(test)]
mod tests {
    use codegen_core::{classify_message, ErrorCategory, SubmissionId};

    use super::*;

    fn state(phase: Phase) -> InteractionState {
        InteractionState {
            phase,
            ..InteractionState::default()
        }
    }

    #[test]
    fn idle_renders_nothing() {
        assert!(phase(&state(Phase::Idle)).is_none());
    }

    #[test]
    fn pending_renders_spinner_text() {
        let rendered = phase(&state(Phase::Pending {
            submission: SubmissionId::new(),
        }));
        assert_eq!(rendered.as_deref(), Some("Generating...\n"));
    }

    #[test]
    fn success_shows_code_under_language_heading() {
        let rendered = phase(&state(Phase::Resolved {
            outcome: GenerationOutcome::Success {
                code: "print(1)".to_string(),
            },
        }))
        .unwrap();
        assert!(rendered.starts_with("--- Generated Code (python)"));
        assert!(rendered.contains("\nprint(1)\n"));
    }

    #[test]
    fn failure_shows_dismissible_banner() {
        let rendered = phase(&state(Phase::Resolved {
            outcome: GenerationOutcome::Failure {
                category: ErrorCategory::Generic,
                message: "Failed to generate code: boom".to_string(),
            },
        }))
        .unwrap();
        assert_eq!(
            rendered,
            "[error] Failed to generate code: boom  (:dismiss to close)\n"
        );
    }

    #[test]
    fn language_list_marks_selection() {
        let listing = languages("rust");
        assert!(listing.contains("* rust"));
        assert!(listing.contains("  python"));
    }

    #[test]
    fn fallback_keeps_code_verbatim() {
        let rendered = copy_fallback("a\n  b", "no helper");
        assert!(rendered.contains("-----BEGIN CODE-----\na\n  b\n-----END CODE-----"));
    }

    fn failure_phase(raw: &str) -> Phase {
        Phase::Resolved {
            outcome: classify_message(raw).into(),
        }
    }

    #[test]
    fn detail_is_shown_when_banner_hides_the_raw_error() {
        let raw = "Request exceeded quota limit";
        let error = RuntimeErrorEvent::generation_failed(
            ErrorCategory::QuotaExceeded,
            raw.to_string(),
        );
        assert_eq!(
            error_detail(&error, &failure_phase(raw)).as_deref(),
            Some("  detail [QUOTA_EXCEEDED]: Request exceeded quota limit\n")
        );
    }

    #[test]
    fn detail_is_skipped_when_banner_already_says_it() {
        let error = RuntimeErrorEvent::generation_failed(ErrorCategory::Generic, "boom".to_string());
        assert!(error_detail(&error, &failure_phase("boom")).is_none());
        assert!(error_detail(&error, &Phase::Idle).is_none());
    }
}
