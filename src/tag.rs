//! Classifies the contents of a located tag.

use crate::ast::Span;

/// Leading modifier characters recognized inside a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Modifier {
    /// `#`: opens a section.
    Section,
    /// `/`: closes a section.
    Close,
    /// `^`: opens an inverted section.
    Inverted,
    /// `!`: comment, dropped at compile time.
    Comment,
    /// `=`: changes the active delimiters.
    SetDelimiter,
    /// `>`: includes another template.
    Partial,
    /// `&`: variable, entity-decoded on output.
    Unescape,
    /// `{`: variable, emitted verbatim.
    Raw,
}

/// A classified tag: optional modifier plus the trimmed name span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ParsedTag {
    pub modifier: Option<Modifier>,
    pub name: Span,
}

/// Faults local to a single tag's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TagFault {
    /// `{` or `=` modifier without its matching trailing byte.
    UnbalancedModifier,
    /// Nothing left after trimming.
    EmptyName,
}

fn is_tag_space(byte: u8) -> bool {
    byte == b' ' || byte == b'\t'
}

/// Parses the bytes strictly between the delimiters of one tag.
pub(crate) fn parse_tag(buffer: &[u8], inner: Span) -> Result<ParsedTag, TagFault> {
    let mut start = inner.start;
    let mut end = inner.end;

    let modifier = if start < end {
        match buffer[start] {
            b'#' => Some(Modifier::Section),
            b'/' => Some(Modifier::Close),
            b'^' => Some(Modifier::Inverted),
            b'!' => Some(Modifier::Comment),
            b'=' => Some(Modifier::SetDelimiter),
            b'>' => Some(Modifier::Partial),
            b'&' => Some(Modifier::Unescape),
            b'{' => Some(Modifier::Raw),
            _ => None,
        }
    } else {
        None
    };
    if modifier.is_some() {
        start += 1;
    }

    // The raw and set-delimiter forms carry their own trailing byte.
    if modifier == Some(Modifier::Raw) {
        if start == end || buffer[end - 1] != b'}' {
            return Err(TagFault::UnbalancedModifier);
        }
        end -= 1;
    }
    if modifier == Some(Modifier::SetDelimiter) {
        if start == end || buffer[end - 1] != b'=' {
            return Err(TagFault::UnbalancedModifier);
        }
        end -= 1;
    }

    while start < end && is_tag_space(buffer[start]) {
        start += 1;
    }
    while end > start && is_tag_space(buffer[end - 1]) {
        end -= 1;
    }

    if start == end {
        return Err(TagFault::EmptyName);
    }

    Ok(ParsedTag {
        modifier,
        name: Span::new(start, end),
    })
}

/// The two delimiter runs of a `{{=open close=}}` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DelimiterPair {
    pub open: Span,
    pub close: Span,
}

/// Splits a set-delimiter directive's name into its two runs. Both must
/// be non-empty, separated by spaces or tabs only, with no `=` or newline
/// inside either.
pub(crate) fn parse_set_delimiter(buffer: &[u8], name: Span) -> Option<DelimiterPair> {
    let bytes = &buffer[name.start..name.end];

    let mut open_len = 0;
    while open_len < bytes.len() && !is_tag_space(bytes[open_len]) {
        if bytes[open_len] == b'=' || bytes[open_len] == b'\n' {
            return None;
        }
        open_len += 1;
    }
    if open_len == 0 || open_len == bytes.len() {
        return None;
    }

    let mut close_start = bytes.len();
    while close_start > open_len && !is_tag_space(bytes[close_start - 1]) {
        if bytes[close_start - 1] == b'=' || bytes[close_start - 1] == b'\n' {
            return None;
        }
        close_start -= 1;
    }

    if bytes[open_len..close_start].iter().any(|&byte| !is_tag_space(byte)) {
        return None;
    }

    Some(DelimiterPair {
        open: Span::new(name.start, name.start + open_len),
        close: Span::new(name.start + close_start, name.end),
    })
}
