use crate::classify::GenerationError;

const FENCE: &str = "```";

/// Turns raw completion text into the code shown to the user.
///
/// Only a fence wrapping the whole response is removed; fences embedded in
/// prose are left alone. Nested whole-string fences are peeled until none
/// remain, so the result is stable under repeated application.
pub fn normalize_response(raw: &str) -> Result<String, GenerationError> {
    let mut code = raw.trim();
    if code.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    while let Some(inner) = strip_whole_fence(code) {
        code = inner;
    }

    Ok(code.to_string())
}

/// Returns the trimmed interior of a fence spanning all of `text`, if any.
///
/// Mirrors the pattern: fence, optional word-character tag, optional
/// whitespace, body, optional whitespace, fence. An empty body counts as no match.
fn strip_whole_fence(text: &str) -> Option<&str> {
    if text.len() < FENCE.len() * 2 || !text.starts_with(FENCE) || !text.ends_with(FENCE) {
        return None;
    }

    let inner = &text[FENCE.len()..text.len() - FENCE.len()];
    let body = inner
        .trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '_')
        .trim();

    if body.is_empty() {
        None
    } else {
        Some(body)
    }
}
