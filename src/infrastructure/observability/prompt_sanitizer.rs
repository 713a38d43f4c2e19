const MAX_VISIBLE_CHARS: usize = 100;

const SECRET_MARKERS: [&str; 6] = [
    "Bearer ",
    "key=",
    "x-goog-api-key: ",
    "password=",
    "secret=",
    "token=",
];

/// Masks anything that looks like a credential, then shortens the prompt for
/// logging. Redaction runs on the full text so a cut never exposes a value.
pub fn sanitize_prompt(prompt: &str) -> String {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return String::from("[EMPTY]");
    }

    let redacted = SECRET_MARKERS
        .iter()
        .fold(trimmed.to_string(), |text, marker| redact_after(&text, marker));

    let total_chars = redacted.chars().count();
    if total_chars > MAX_VISIBLE_CHARS {
        let head: String = redacted.chars().take(MAX_VISIBLE_CHARS).collect();
        format!("{head}... ({total_chars} chars total)")
    } else {
        redacted
    }
}

// Replaces every value following `marker` up to the next delimiter.
fn redact_after(text: &str, marker: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(idx) = rest.find(marker) {
        let value_start = idx + marker.len();
        result.push_str(&rest[..value_start]);
        result.push_str("[REDACTED]");

        let value_len = rest[value_start..]
            .find(|c: char| c.is_whitespace() || matches!(c, '&' | '"' | '\''))
            .unwrap_or(rest.len() - value_start);
        rest = &rest[value_start + value_len..];
    }

    result.push_str(rest);
    result
}
