//! Lexical helpers for anchor scanning of Rego source
//!
//! Only what is needed to step over strings and comments while tracking
//! delimiter depth; this is not a Rego tokenizer.

/// Index of the byte closing the string that opens at `open`
///
/// Handles `"` strings with backslash escapes and backtick raw strings.
/// `None` when the string is never closed.
fn string_end(bytes: &[u8], open: usize) -> Option<usize> {
    let quote = bytes[open];
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if quote == b'"' => i += 2,
            b'\n' if quote == b'"' => return None,
            b if b == quote => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Index of the newline ending the comment at `start`, or the text length
fn comment_end(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |p| start + p)
}

fn closing_for(open: u8) -> u8 {
    match open {
        b'{' => b'}',
        b'[' => b']',
        _ => b')',
    }
}

/// Exclusive end of the delimited value opening at `open`
///
/// `text[open]` must be `{`, `[` or `(`. Returns `None` when delimiters
/// never balance or close with the wrong kind.
pub fn balanced_end(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut stack = Vec::new();
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'`' => i = string_end(bytes, i)?,
            b'#' => i = comment_end(bytes, i),
            b @ (b'{' | b'[' | b'(') => stack.push(closing_for(b)),
            b @ (b'}' | b']' | b')') => {
                if stack.pop() != Some(b) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Split `body` at top-level occurrences of `sep`, dropping comments
///
/// `body` is assumed balanced; nested delimiters and strings are kept
/// intact inside their segment.
pub fn split_top_level(body: &str, sep: u8) -> Vec<String> {
    let bytes = body.as_bytes();
    let mut segments = Vec::new();
    let mut current = Vec::new();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'`' => {
                let end = string_end(bytes, i).unwrap_or(bytes.len() - 1);
                current.extend_from_slice(&bytes[i..=end]);
                i = end;
            }
            b'#' => {
                i = comment_end(bytes, i);
                continue;
            }
            b @ (b'{' | b'[' | b'(') => {
                depth += 1;
                current.push(b);
            }
            b @ (b'}' | b']' | b')') => {
                depth = depth.saturating_sub(1);
                current.push(b);
            }
            b if b == sep && depth == 0 => segments.push(std::mem::take(&mut current)),
            b => current.push(b),
        }
        i += 1;
    }
    segments.push(current);
    segments
        .into_iter()
        .map(|s| String::from_utf8_lossy(&s).into_owned())
        .collect()
}

/// Split one `key: value` entry at its first top-level colon
pub fn split_entry(entry: &str) -> Option<(&str, &str)> {
    let bytes = entry.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'`' => i = string_end(bytes, i)?,
            b'{' | b'[' | b'(' => depth += 1,
            b'}' | b']' | b')' => depth = depth.saturating_sub(1),
            b':' if depth == 0 => return Some((entry[..i].trim(), entry[i + 1..].trim())),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Whether `s` is a bare Rego identifier usable as an unquoted key
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
