//! Helpers that keep player-supplied text on one log line.

/// Longest preview written to the log, in characters.
const MAX_PREVIEW: usize = 120;

/// Escape newlines, tabs, backslashes and other control characters, then cap the
/// length with an ellipsis. Chinese names and item names pass through untouched.
pub fn escape_log(s: &str) -> String {
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW * 4) + 3);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        if ch == '\\' || ch.is_control() {
            out.extend(ch.escape_default());
        } else {
            out.push(ch);
        }
    }
    out
}

/// `name(id)` with both parts escaped, for log lines about a player.
pub fn actor(id: &str, name: &str) -> String {
    format!("{}({})", escape_log(name), escape_log(id))
}
