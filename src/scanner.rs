//! Locates delimiter-bounded tags in the template buffer.

use crate::ast::Span;

/// Outcome of scanning for the next tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Locate {
    /// No opening delimiter remains; the rest of the buffer is static
    /// text.
    End,
    /// A tag, delimiters included.
    Found(Span),
    /// A closing delimiter is missing, or sits at or before the opening
    /// one. `offset` is the witness position.
    Mismatched { offset: usize },
}

/// Substring search specialized by pattern length: single bytes scan
/// directly, lengths 2-3 compare a first/last-byte key before the full
/// window, longer patterns fall back to a window compare. Purely a fast
/// path; the contract is plain leftmost substring search.
pub(crate) fn find(haystack: &[u8], pattern: &[u8]) -> Option<usize> {
    if pattern.is_empty() || pattern.len() > haystack.len() {
        return None;
    }
    match pattern.len() {
        1 => haystack.iter().position(|&byte| byte == pattern[0]),
        2 | 3 => {
            let key = u16::from(pattern[0]) << 8 | u16::from(pattern[pattern.len() - 1]);
            let mut end = pattern.len();
            while end <= haystack.len() {
                let window = &haystack[end - pattern.len()..end];
                let probe = u16::from(window[0]) << 8 | u16::from(window[window.len() - 1]);
                if probe == key && window == pattern {
                    return Some(end - pattern.len());
                }
                end += 1;
            }
            None
        }
        _ => haystack
            .windows(pattern.len())
            .position(|window| window == pattern),
    }
}

/// Finds the next tag at or after `from` under the active delimiters.
///
/// The close delimiter is searched from `from` as well, so a stray close
/// ahead of the open is caught as a mismatch. A closing run immediately
/// followed by another close occurrence is matched greedily by one extra
/// byte, which is what lets `}}}` close a `{{{` tag.
pub(crate) fn locate_tag(buffer: &[u8], from: usize, open: &[u8], close: &[u8]) -> Locate {
    let open_pos = match find(&buffer[from..], open) {
        Some(at) => from + at,
        None => return Locate::End,
    };

    let mut close_pos = match find(&buffer[from..], close) {
        Some(at) => from + at,
        None => return Locate::Mismatched { offset: open_pos },
    };

    // Identical open/close delimiters collide on the opening run; retry
    // past it.
    if close_pos == open_pos {
        close_pos = match find(&buffer[open_pos + open.len()..], close) {
            Some(at) => open_pos + open.len() + at,
            None => return Locate::Mismatched { offset: open_pos },
        };
    }

    if close_pos < open_pos + open.len() {
        return Locate::Mismatched { offset: close_pos };
    }

    let mut end = close_pos + close.len();
    if buffer[close_pos + 1..].starts_with(close) {
        end += 1;
    }

    Locate::Found(Span::new(open_pos, end))
}
