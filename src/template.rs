//! Compiled templates.

use std::fmt::Write;

use crate::ast::Node;
use crate::ast_builder;
use crate::diagnostics::{named_source, SourceArc, WeftError};
use crate::render::{self, RenderSettings};
use crate::value::{Host, Variable};

/// A compiled template: the owned source buffer, the node tree indexing
/// into it, and the delimiters in effect when parsing finished.
///
/// Immutable once compiled. A single instance can serve any number of
/// renders, concurrent ones included; errors are per-call values.
pub struct Template {
    source: String,
    source_code: SourceArc,
    root: Vec<Node>,
    open: String,
    close: String,
}

impl Template {
    pub const DEFAULT_OPEN: &'static str = "{{";
    pub const DEFAULT_CLOSE: &'static str = "}}";

    /// Compiles `source` into a template for rendering through `host`.
    ///
    /// The host is consulted only for capabilities (partial support); the
    /// compiled template holds no reference to it and may be rendered
    /// through a different host later.
    pub fn compile<H: Host>(source: impl Into<String>, host: &H) -> Result<Template, WeftError> {
        Template::compile_named("template", source, host)
    }

    /// Like [`Template::compile`], with a name shown in diagnostics.
    pub fn compile_named<H: Host>(
        name: &str,
        source: impl Into<String>,
        host: &H,
    ) -> Result<Template, WeftError> {
        let source = source.into();
        let source_code = named_source(name, &source);
        let built = ast_builder::build(
            &source,
            &source_code,
            Template::DEFAULT_OPEN,
            Template::DEFAULT_CLOSE,
            host.supports_partials(),
        )?;
        Ok(Template {
            source,
            source_code,
            root: built.root,
            open: String::from_utf8_lossy(&built.open).into_owned(),
            close: String::from_utf8_lossy(&built.close).into_owned(),
        })
    }

    /// Renders against `context` with default settings. `context` must be
    /// a [`Variable::Context`].
    pub fn render<H: Host>(&self, host: &H, context: &Variable<H>) -> Result<String, WeftError> {
        render::render_template(self, host, context, &RenderSettings::default())
    }

    /// Renders with explicit settings.
    pub fn render_with<H: Host>(
        &self,
        host: &H,
        context: &Variable<H>,
        settings: &RenderSettings,
    ) -> Result<String, WeftError> {
        render::render_template(self, host, context, settings)
    }

    /// The raw text this template was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The name given at compile time, as shown in diagnostics.
    pub fn name(&self) -> &str {
        self.source_code.name()
    }

    /// The delimiters active once parsing finished.
    pub fn delimiters(&self) -> (&str, &str) {
        (&self.open, &self.close)
    }

    pub(crate) fn root(&self) -> &[Node] {
        &self.root
    }

    /// Indented dump of the compiled tree, for debugging.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        pretty_nodes(&self.root, &self.source, 0, &mut out);
        out
    }
}

fn pretty_nodes(nodes: &[Node], source: &str, depth: usize, out: &mut String) {
    for node in nodes {
        for _ in 0..depth {
            out.push_str("  ");
        }
        match node {
            Node::Static(span) => {
                let _ = writeln!(out, "static {:?}", span.slice(source));
            }
            Node::Tag { fetch, mode } => {
                let _ = writeln!(out, "tag {:?} '{}'", mode, fetch.name.slice(source));
            }
            Node::Section {
                key,
                content,
                inverted,
                ..
            } => {
                let _ = writeln!(
                    out,
                    "{} '{}'",
                    if *inverted { "inverted section" } else { "section" },
                    key.name.slice(source)
                );
                pretty_nodes(content, source, depth + 1, out);
            }
            Node::Partial { name } => {
                let _ = writeln!(out, "partial '{}'", name.slice(source));
            }
        }
    }
}
