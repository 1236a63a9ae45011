use std::borrow::Cow;

// Every node records where it came from; spans index into the byte buffer
// owned by the Template that produced the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Resolves the span against the buffer it indexes.
    pub fn slice<'s>(&self, source: &'s str) -> &'s str {
        &source[self.start..self.end]
    }
}

/// How a tag writes its resolved text into the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintMode {
    /// `{{name}}`: HTML-escape the text.
    Escape,
    /// `{{{name}}}`: emit the text verbatim.
    Raw,
    /// `{{&name}}`: decode HTML entities in the text.
    Unescape,
}

/// A variable lookup, resolved against the context stack at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fetch {
    pub name: Span,
}

/// One node of a compiled template.
///
/// Children are owned by their parent; a template's root is a plain node
/// sequence. Spans index into the source buffer held by the owning
/// [`Template`](crate::Template).
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal text, emitted unchanged.
    Static(Span),
    /// A variable tag such as `{{name}}`.
    Tag { fetch: Fetch, mode: PrintMode },
    /// A `{{#key}}`/`{{^key}}` block. `raw` spans the unexpanded source
    /// between the opening and closing tags, exactly as written.
    Section {
        key: Fetch,
        content: Vec<Node>,
        raw: Span,
        inverted: bool,
    },
    /// A `{{>name}}` inclusion of another template.
    Partial { name: Span },
}

const DESCRIBE_NAME_MAX: usize = 32;

impl Node {
    /// A short identity for error reports, e.g. `variable 'name'` or
    /// `inverted section 'items'`.
    pub fn describe(&self, source: &str) -> String {
        match self {
            Node::Static(_) => "static text".to_string(),
            Node::Tag { fetch, .. } => format!("variable '{}'", clip(fetch.name.slice(source))),
            Node::Section { key, inverted: false, .. } => {
                format!("section '{}'", clip(key.name.slice(source)))
            }
            Node::Section { key, inverted: true, .. } => {
                format!("inverted section '{}'", clip(key.name.slice(source)))
            }
            Node::Partial { name } => format!("partial '{}'", clip(name.slice(source))),
        }
    }
}

fn clip(name: &str) -> Cow<'_, str> {
    if name.len() > DESCRIBE_NAME_MAX {
        // Tag names are validated ASCII, so a byte cut is safe.
        Cow::Owned(format!("{}..", &name[..DESCRIBE_NAME_MAX]))
    } else {
        Cow::Borrowed(name)
    }
}
