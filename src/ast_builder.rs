//! Builds a template's node tree.
//!
//! A single forward pass over the buffer: locate the next tag, classify
//! it, dispatch on its modifier. Section nesting is tracked on an explicit
//! stack of open sections rather than through call-stack recursion, so
//! deeply nested input cannot overflow the native stack. The active
//! delimiters are mutable state of the pass; `{{=...=}}` swaps them for
//! everything that follows.

use std::mem;

use crate::ast::{Fetch, Node, PrintMode, Span};
use crate::diagnostics::{CompileErrorKind, SourceArc, WeftError};
use crate::scanner::{self, Locate};
use crate::tag::{self, Modifier, TagFault};

/// A successful build: the root node sequence plus the delimiters active
/// at end of input.
pub(crate) struct Built {
    pub root: Vec<Node>,
    pub open: Vec<u8>,
    pub close: Vec<u8>,
}

/// An open `{{#...}}`/`{{^...}}` awaiting its closing tag.
struct OpenSection {
    key: Span,
    inverted: bool,
    /// Start of the section's raw inner text, just past the opening tag.
    raw_start: usize,
    /// Offset reported if the section never closes.
    fault_at: usize,
    /// Sibling nodes of the enclosing level, parked until this section
    /// closes.
    enclosing: Vec<Node>,
}

pub(crate) fn build(
    source: &str,
    source_code: &SourceArc,
    open: &str,
    close: &str,
    partials_supported: bool,
) -> Result<Built, WeftError> {
    let buffer = source.as_bytes();
    let mut open = open.as_bytes().to_vec();
    let mut close = close.as_bytes().to_vec();

    let mut stack: Vec<OpenSection> = Vec::new();
    let mut current: Vec<Node> = Vec::new();
    let mut cursor = 0;

    loop {
        let span = match scanner::locate_tag(buffer, cursor, &open, &close) {
            Locate::End => {
                if cursor < buffer.len() {
                    current.push(Node::Static(Span::new(cursor, buffer.len())));
                }
                break;
            }
            Locate::Mismatched { offset } => {
                return Err(WeftError::compile(
                    CompileErrorKind::MismatchedDelimiter,
                    source_code,
                    source,
                    offset,
                ));
            }
            Locate::Found(span) => span,
        };

        if span.start > cursor {
            current.push(Node::Static(Span::new(cursor, span.start)));
        }

        let inner = Span::new(span.start + open.len(), span.end - close.len());
        let tag = tag::parse_tag(buffer, inner).map_err(|fault| {
            let kind = match fault {
                TagFault::UnbalancedModifier => CompileErrorKind::MismatchedDelimiter,
                TagFault::EmptyName => CompileErrorKind::BadTagName,
            };
            WeftError::compile(kind, source_code, source, span.start)
        })?;

        cursor = span.end;
        // Dispatch faults point just past the opening delimiter.
        let fault_at = span.start + open.len();

        match tag.modifier {
            Some(Modifier::Section) | Some(Modifier::Inverted) => {
                let key = fetch_name(tag.name, buffer, source_code, source, fault_at)?;
                stack.push(OpenSection {
                    key: key.name,
                    inverted: tag.modifier == Some(Modifier::Inverted),
                    raw_start: cursor,
                    fault_at,
                    enclosing: mem::take(&mut current),
                });
            }
            Some(Modifier::Close) => {
                let section = match stack.pop() {
                    Some(section) if section.key.slice(source) == tag.name.slice(source) => section,
                    _ => {
                        return Err(WeftError::compile(
                            CompileErrorKind::MismatchedSection,
                            source_code,
                            source,
                            fault_at,
                        ));
                    }
                };
                let content = mem::replace(&mut current, section.enclosing);
                current.push(Node::Section {
                    key: Fetch { name: section.key },
                    content,
                    raw: Span::new(section.raw_start, span.start),
                    inverted: section.inverted,
                });
            }
            Some(Modifier::Comment) => {}
            Some(Modifier::SetDelimiter) => {
                let pair = tag::parse_set_delimiter(buffer, tag.name).ok_or_else(|| {
                    WeftError::compile(
                        CompileErrorKind::BadDelimiter,
                        source_code,
                        source,
                        fault_at,
                    )
                })?;
                open = buffer[pair.open.start..pair.open.end].to_vec();
                close = buffer[pair.close.start..pair.close.end].to_vec();
            }
            Some(Modifier::Partial) => {
                if !partials_supported {
                    return Err(WeftError::compile(
                        CompileErrorKind::NotImplemented,
                        source_code,
                        source,
                        fault_at,
                    ));
                }
                let name = fetch_name(tag.name, buffer, source_code, source, fault_at)?;
                current.push(Node::Partial { name: name.name });
            }
            Some(Modifier::Raw) => {
                let fetch = fetch_name(tag.name, buffer, source_code, source, fault_at)?;
                current.push(Node::Tag { fetch, mode: PrintMode::Raw });
            }
            Some(Modifier::Unescape) => {
                let fetch = fetch_name(tag.name, buffer, source_code, source, fault_at)?;
                current.push(Node::Tag { fetch, mode: PrintMode::Unescape });
            }
            None => {
                let fetch = fetch_name(tag.name, buffer, source_code, source, fault_at)?;
                current.push(Node::Tag { fetch, mode: PrintMode::Escape });
            }
        }
    }

    // A section still open at end of input never finds its close.
    if let Some(section) = stack.pop() {
        return Err(WeftError::compile(
            CompileErrorKind::MismatchedSection,
            source_code,
            source,
            section.fault_at,
        ));
    }

    Ok(Built {
        root: current,
        open,
        close,
    })
}

/// Validates a fetchable name: ASCII alphanumerics and underscores only.
fn fetch_name(
    name: Span,
    buffer: &[u8],
    source_code: &SourceArc,
    source: &str,
    fault_at: usize,
) -> Result<Fetch, WeftError> {
    let valid = buffer[name.start..name.end]
        .iter()
        .all(|&byte| byte.is_ascii_alphanumeric() || byte == b'_');
    if !valid {
        return Err(WeftError::compile(
            CompileErrorKind::BadTagName,
            source_code,
            source,
            fault_at,
        ));
    }
    Ok(Fetch { name })
}
