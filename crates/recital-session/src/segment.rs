//! Sentence segmentation heuristic.
//!
//! Splits raw text at `.`, `!` or `?` when the mark is followed by whitespace
//! or the end of the text. A period is not treated as a boundary when the
//! word right before it is a single uppercase letter ("U.S.", "J. Smith") or
//! an uppercase letter followed by one lowercase letter ("Mr.", "Dr.", "St.").
//!
//! This is intentionally narrow. Longer abbreviations ("Mrs.", "etc.") still
//! split, and a sentence ending in a one or two letter capitalised word
//! ("It was Al.") merges with the next one. Review the input text when the
//! split looks wrong rather than widening the rule here.

use recital_core::error::{RecitalError, Result};

/// Split `text` into trimmed, non-empty sentences in document order.
///
/// Fails with [`RecitalError::EmptyInput`] when no sentence survives.
pub fn segment(text: &str) -> Result<Vec<String>> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if !is_terminal_mark(ch) {
            continue;
        }

        let at_boundary = match chars.peek() {
            None => true,
            Some(&(_, next)) => next.is_whitespace(),
        };
        if !at_boundary {
            continue;
        }

        if ch == '.' && is_guarded_abbreviation(&text[start..idx]) {
            continue;
        }

        let end = idx + ch.len_utf8();
        push_trimmed(&mut sentences, &text[start..end]);
        start = end;
    }
    push_trimmed(&mut sentences, &text[start..]);

    if sentences.is_empty() {
        return Err(RecitalError::EmptyInput);
    }
    Ok(sentences)
}

fn is_terminal_mark(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?')
}

/// True when the word ending right before a period matches `[A-Z][a-z]?`.
fn is_guarded_abbreviation(before_period: &str) -> bool {
    let word: Vec<char> = before_period
        .chars()
        .rev()
        .take_while(|c| c.is_alphabetic())
        .collect();

    // `word` is reversed: last letter first.
    match word.as_slice() {
        [only] => only.is_uppercase(),
        [second, first] => first.is_uppercase() && second.is_lowercase(),
        _ => false,
    }
}

fn push_trimmed(sentences: &mut Vec<String>, run: &str) {
    let trimmed = run.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

// =============================================================================
// Tests
// =============================================================================
