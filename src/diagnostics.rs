//! Unified diagnostics for template compilation and rendering.
//!
//! Compile failures capture the byte offset of the offending tag at the
//! point of detection, together with a shared handle to the template
//! source, and resolve it into a 1-based line/column location up front.
//! Render failures identify the node that failed instead. Errors are
//! per-call values; compiled templates hold no mutable error state and
//! stay shareable across concurrent renders.

use std::fmt;
use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use thiserror::Error;

use crate::value::VarKind;

/// Shared handle to a named template source.
pub type SourceArc = Arc<NamedSource<String>>;

/// Failure modes of template compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileErrorKind {
    /// A closing delimiter is missing or misplaced, or a `{`/`=` modifier
    /// lost its trailing byte.
    MismatchedDelimiter,
    /// A tag name is empty or contains bytes outside `[A-Za-z0-9_]`.
    BadTagName,
    /// A section close does not pair with the innermost open section, or
    /// a section never closes.
    MismatchedSection,
    /// A malformed custom-delimiter declaration.
    BadDelimiter,
    /// The template uses partials but the host does not resolve them.
    NotImplemented,
}

impl CompileErrorKind {
    pub(crate) fn message(self) -> &'static str {
        match self {
            CompileErrorKind::MismatchedDelimiter => "mismatched delimiters in tag",
            CompileErrorKind::BadTagName => "invalid name for tag",
            CompileErrorKind::MismatchedSection => "mismatched section closing",
            CompileErrorKind::BadDelimiter => "invalid declaration for custom delimiters",
            CompileErrorKind::NotImplemented => "partials are not supported by this host",
        }
    }

    const fn code_suffix(self) -> &'static str {
        match self {
            CompileErrorKind::MismatchedDelimiter => "mismatched_delimiter",
            CompileErrorKind::BadTagName => "bad_tag_name",
            CompileErrorKind::MismatchedSection => "mismatched_section",
            CompileErrorKind::BadDelimiter => "bad_delimiter",
            CompileErrorKind::NotImplemented => "not_implemented",
        }
    }
}

/// Failure modes of rendering. The owning error names the node involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderErrorKind {
    /// The nesting ceiling was reached.
    TooDeep,
    /// A variable resolved to a kind the node cannot use.
    WrongVariableType { found: VarKind },
    /// A rendering scope is not a context.
    InvalidContext { found: VarKind },
    /// Strict mode: a name resolved nowhere on the context stack.
    NotFound,
    /// A partial name did not resolve to a template.
    BadPartial,
}

impl RenderErrorKind {
    const fn code_suffix(&self) -> &'static str {
        match self {
            RenderErrorKind::TooDeep => "too_deep",
            RenderErrorKind::WrongVariableType { .. } => "wrong_variable_type",
            RenderErrorKind::InvalidContext { .. } => "invalid_context",
            RenderErrorKind::NotFound => "not_found",
            RenderErrorKind::BadPartial => "bad_partial",
        }
    }
}

/// A resolved, 1-based position in template source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
    /// The full text of the offending line, newline excluded.
    pub line_text: String,
}

impl SourceLocation {
    pub(crate) fn resolve(source: &str, offset: usize) -> Self {
        let bytes = source.as_bytes();
        let offset = offset.min(bytes.len());
        let mut line = 1;
        let mut line_start = 0;
        for (at, &byte) in bytes.iter().enumerate().take(offset) {
            if byte == b'\n' {
                line += 1;
                line_start = at + 1;
            }
        }
        let line_end = bytes[offset..]
            .iter()
            .position(|&byte| byte == b'\n')
            .map_or(bytes.len(), |at| offset + at);
        SourceLocation {
            line,
            column: offset - line_start + 1,
            line_text: source[line_start..line_end].to_string(),
        }
    }
}

/// The error type for every engine operation.
#[derive(Debug, Error)]
pub enum WeftError {
    /// Compilation failed; the template is discarded.
    #[error("{} (line {}, column {})", .kind.message(), .location.line, .location.column)]
    Compile {
        kind: CompileErrorKind,
        /// Byte offset of the offending tag, captured at detection.
        offset: usize,
        location: SourceLocation,
        source_code: SourceArc,
    },
    /// A render pass failed; output produced so far is undefined.
    #[error("{}", render_message(.kind, .node))]
    Render {
        kind: RenderErrorKind,
        /// Description of the node that failed.
        node: String,
    },
}

fn render_message(kind: &RenderErrorKind, node: &str) -> String {
    match kind {
        RenderErrorKind::TooDeep => {
            format!("recursion limit reached while rendering {node}")
        }
        RenderErrorKind::WrongVariableType { found } => {
            format!("unexpected {found} variable for {node}")
        }
        RenderErrorKind::InvalidContext { found } => {
            format!("cannot use a {found} variable as the rendering context for {node}")
        }
        RenderErrorKind::NotFound => format!("no value found for {node}"),
        RenderErrorKind::BadPartial => format!("cannot resolve {node}"),
    }
}

impl WeftError {
    pub(crate) fn compile(
        kind: CompileErrorKind,
        source_code: &SourceArc,
        source: &str,
        offset: usize,
    ) -> Self {
        WeftError::Compile {
            kind,
            offset,
            location: SourceLocation::resolve(source, offset),
            source_code: Arc::clone(source_code),
        }
    }

    pub(crate) fn render(kind: RenderErrorKind, node: String) -> Self {
        WeftError::Render { kind, node }
    }

    /// The resolved source position, for compile errors.
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            WeftError::Compile { location, .. } => Some(location),
            WeftError::Render { .. } => None,
        }
    }

    /// The failing node's description, for render errors.
    pub fn node(&self) -> Option<&str> {
        match self {
            WeftError::Render { node, .. } => Some(node),
            WeftError::Compile { .. } => None,
        }
    }
}

impl Diagnostic for WeftError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self {
            WeftError::Compile { kind, .. } => format!("weft::compile::{}", kind.code_suffix()),
            WeftError::Render { kind, .. } => format!("weft::render::{}", kind.code_suffix()),
        };
        Some(Box::new(code))
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        match self {
            WeftError::Compile { source_code, .. } => Some(source_code.as_ref() as &dyn SourceCode),
            WeftError::Render { .. } => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            WeftError::Compile { kind, offset, .. } => {
                let label = LabeledSpan::new(Some(kind.message().to_string()), *offset, 1);
                Some(Box::new(std::iter::once(label)))
            }
            WeftError::Render { .. } => None,
        }
    }
}

/// Wraps template source for diagnostics.
pub(crate) fn named_source(name: &str, content: &str) -> SourceArc {
    Arc::new(NamedSource::new(name, content.to_string()))
}

/// Prints an error with full miette diagnostics, source snippet included.
pub fn print_error(error: WeftError) {
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}
