use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

// "cover-\nage" -> "coverage"
static BROKEN_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w)-[ \t]*\r?\n[ \t]*(\w)").expect("valid regex"));

static BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*(?:\n[ \t]*)+").expect("valid regex"));

/// Cleans text pulled out of a PDF page: compatibility-normalizes ligatures,
/// rejoins words split across lines, drops control characters, collapses
/// runs of spaces and keeps at most one blank line between paragraphs.
pub fn normalize_page_text(raw: &str) -> String {
    let normalized: String = raw
        .nfkc()
        .filter_map(|ch| match ch {
            '\r' => None,
            '\n' => Some('\n'),
            c if c.is_control() => Some(' '),
            c => Some(c),
        })
        .collect();

    let joined = BROKEN_WORD.replace_all(&normalized, "$1$2");
    let paragraphs = BLANK_RUN.replace_all(&joined, "\n\n");

    paragraphs
        .split("\n\n")
        .map(|paragraph| {
            paragraph
                .lines()
                .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .filter(|paragraph| !paragraph.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
