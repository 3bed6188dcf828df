/// Split a reply into chunks of at most `max_units` UTF-16 code units, the
/// unit Telegram measures message length in.
///
/// A chunk ends after the last newline in the second half of its window when
/// there is one, otherwise at the window edge on a character boundary.
/// Whitespace-only chunks are dropped.
pub fn split_message(text: &str, max_units: usize) -> Vec<String> {
    let max_units = max_units.max(1);
    let mut out = Vec::new();
    let mut rest = text;

    while let Some(hard) = window_end(rest, max_units) {
        let window = &rest[..hard];
        let cut = match window.rfind('\n') {
            Some(i) if i > 0 && i >= hard / 2 => i + 1,
            _ => hard,
        };
        push_chunk(&mut out, &rest[..cut]);
        rest = &rest[cut..];
    }
    push_chunk(&mut out, rest);
    out
}

/// Byte offset where a window of `max_units` UTF-16 units ends, or `None`
/// when all of `s` fits. A window always holds at least one character.
fn window_end(s: &str, max_units: usize) -> Option<usize> {
    let mut units = 0;
    for (i, c) in s.char_indices() {
        units += c.len_utf16();
        if units > max_units {
            return Some(if i == 0 { c.len_utf8() } else { i });
        }
    }
    None
}

fn push_chunk(out: &mut Vec<String>, chunk: &str) {
    if !chunk.trim().is_empty() {
        out.push(chunk.to_string());
    }
}

/// Shorten `s` for log lines.
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    format!("{}...", s.chars().take(max_chars).collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(split_message("hello", 10), vec!["hello"]);
        assert_eq!(split_message("0123456789", 10), vec!["0123456789"]);
        assert!(split_message("", 10).is_empty());
    }

    #[test]
    fn hard_splits_on_char_boundaries() {
        let chunks = split_message("ééééé", 2);
        assert_eq!(chunks, vec!["éé", "éé", "é"]);
    }

    #[test]
    fn prefers_late_newlines() {
        let text = "line one\nline two is longer";
        let chunks = split_message(text, 12);
        assert_eq!(chunks[0], "line one\n");
        assert!(chunks.iter().all(|c| c.chars().count() <= 12));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn ignores_newlines_too_early_in_window() {
        let chunks = split_message("a\nbcdefghij", 6);
        assert_eq!(chunks, vec!["a\nbcde", "fghij"]);
    }

    #[test]
    fn blank_runs_never_form_their_own_chunk() {
        assert_eq!(split_message("aaaaaaaaa\n\n", 10), vec!["aaaaaaaaa\n"]);

        let text = format!("aaaaaaaaa\n{}bbb", "\n".repeat(12));
        let chunks = split_message(&text, 10);
        assert_eq!(chunks, vec!["aaaaaaaaa\n", "\n\nbbb"]);
        assert!(chunks.iter().all(|c| !c.trim().is_empty()));
        assert!(split_message(" \n\t ", 10).is_empty());
    }

    #[test]
    fn limit_counts_utf16_units() {
        let chunks = split_message("😀😀😀", 4);
        assert_eq!(chunks, vec!["😀😀", "😀"]);
        assert!(chunks.iter().all(|c| c.encode_utf16().count() <= 4));

        // A single wide character still makes progress.
        assert_eq!(split_message("😀a", 1), vec!["😀", "a"]);
    }

    #[test]
    fn truncates_long_log_text() {
        assert_eq!(truncate_with_ellipsis("abcdef", 3), "abc...");
        assert_eq!(truncate_with_ellipsis("abc", 3), "abc");
    }
}
