//! Greedy word wrapping against a pixel width.

/// Insert line breaks into `text` so that every line fits `max_width`.
///
/// Single pass over word boundaries: each space and the final character
/// close a candidate line `text[line_start..=boundary]`. When the candidate
/// is wider than `max_width`, the previous space on the line becomes `'\n'`
/// and the next line starts right after it. A word that is wider than
/// `max_width` on its own is left to overflow; lines are never broken
/// before their first word. Existing `'\n'` characters are kept as hard
/// breaks.
///
/// Spaces are replaced, not supplemented, so wrapping already wrapped text
/// is not meaningful. Wrap the original string instead.
pub fn wrap<F>(text: &str, max_width: u32, mut measure: F) -> String
where
    F: FnMut(&str) -> u32,
{
    let mut breaks: Vec<usize> = Vec::new();
    let mut line_start = 0usize;
    let mut last_space: Option<usize> = None;
    let mut seen_word = false;

    for (idx, ch) in text.char_indices() {
        if ch == '\n' {
            line_start = idx + 1;
            last_space = None;
            seen_word = false;
            continue;
        }

        let end = idx + ch.len_utf8();
        if ch != ' ' {
            seen_word = true;
            if end != text.len() {
                continue;
            }
        }

        if measure(&text[line_start..end]) > max_width {
            if let Some(space) = last_space {
                breaks.push(space);
                line_start = space + 1;
                seen_word = text[line_start..idx].chars().any(|c| c != ' ');
                last_space = None;
            }
        }

        if ch == ' ' && seen_word {
            last_space = Some(idx);
        }
    }

    let mut out = String::with_capacity(text.len());
    let mut pending = breaks.into_iter().peekable();
    for (idx, ch) in text.char_indices() {
        if pending.peek() == Some(&idx) {
            out.push('\n');
            pending.next();
        } else {
            out.push(ch);
        }
    }
    out
}
