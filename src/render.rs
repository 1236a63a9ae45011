//! Tree-walking renderer.
//!
//! Walks a compiled tree against a per-render context stack. Names
//! resolve innermost scope first; every variable a host callback produces
//! is disposed before the node that requested it returns, and the stack
//! unwinds to its entry depth on every exit path.

use crate::ast::{Fetch, Node, PrintMode, Span};
use crate::diagnostics::{RenderErrorKind, WeftError};
use crate::escape;
use crate::template::Template;
use crate::value::{Host, VarKind, Variable};

/// Default ceiling on section and partial nesting during a render.
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Knobs for a single render pass.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Nesting ceiling across sections and partials.
    pub max_depth: usize,
    /// Fail when a name resolves nowhere, instead of skipping it.
    pub strict: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            max_depth: DEFAULT_MAX_DEPTH,
            strict: false,
        }
    }
}

/// One level of the context stack.
enum Scope<'r, H: Host> {
    /// The caller's root context; never disposed.
    Root(&'r Variable<H>),
    /// A variable fetched during this render; disposed on pop.
    Fetched(Variable<H>),
}

impl<H: Host> Scope<'_, H> {
    fn variable(&self) -> &Variable<H> {
        match self {
            Scope::Root(variable) => variable,
            Scope::Fetched(variable) => variable,
        }
    }
}

pub(crate) fn render_template<H: Host>(
    template: &Template,
    host: &H,
    context: &Variable<H>,
    settings: &RenderSettings,
) -> Result<String, WeftError> {
    if context.kind() != VarKind::Context {
        return Err(WeftError::render(
            RenderErrorKind::InvalidContext {
                found: context.kind(),
            },
            "template root".to_string(),
        ));
    }

    let mut walker = Walker {
        host,
        settings,
        scopes: vec![Scope::Root(context)],
    };
    let mut out = String::new();
    let result = walker.render_nodes(template, template.root(), &mut out, 0);

    // The stack must unwind to exactly the root scope, errors included.
    debug_assert_eq!(walker.scopes.len(), 1, "context stack depth leaked");

    result.map(|()| out)
}

struct Walker<'r, H: Host> {
    host: &'r H,
    settings: &'r RenderSettings,
    scopes: Vec<Scope<'r, H>>,
}

impl<H: Host> Walker<'_, H> {
    fn render_nodes(
        &mut self,
        template: &Template,
        nodes: &[Node],
        out: &mut String,
        depth: usize,
    ) -> Result<(), WeftError> {
        for node in nodes {
            match node {
                Node::Static(span) => out.push_str(span.slice(template.source())),
                Node::Tag { fetch, mode } => {
                    self.render_tag(template, node, fetch, *mode, out)?;
                }
                Node::Section {
                    key,
                    content,
                    raw,
                    inverted,
                } => {
                    self.render_section(
                        template, node, key, content, *raw, *inverted, out, depth,
                    )?;
                }
                Node::Partial { name } => {
                    self.render_partial(template, node, *name, out, depth)?;
                }
            }
        }
        Ok(())
    }

    /// Resolves a name against the context stack, innermost scope first.
    /// `Ok(None)` means no scope knew the name and lax mode lets it pass;
    /// nothing was produced, so nothing is disposed.
    fn resolve(
        &self,
        template: &Template,
        node: &Node,
        fetch: &Fetch,
    ) -> Result<Option<Variable<H>>, WeftError> {
        let key = fetch.name.slice(template.source());
        for scope in self.scopes.iter().rev() {
            if let Variable::Context(context) = scope.variable() {
                if let Some(found) = self.host.context_find(context, key) {
                    return Ok(Some(found));
                }
            }
        }
        if self.settings.strict {
            return Err(WeftError::render(
                RenderErrorKind::NotFound,
                node.describe(template.source()),
            ));
        }
        Ok(None)
    }

    fn render_tag(
        &mut self,
        template: &Template,
        node: &Node,
        fetch: &Fetch,
        mode: PrintMode,
        out: &mut String,
    ) -> Result<(), WeftError> {
        let Some(value) = self.resolve(template, node, fetch)? else {
            return Ok(());
        };
        let result = match &value {
            Variable::Absent => Ok(()),
            Variable::Text(text) => {
                let text = text.as_ref();
                match mode {
                    PrintMode::Escape => escape::escape_html(out, text),
                    PrintMode::Raw => out.push_str(text),
                    PrintMode::Unescape => escape::unescape_html(out, text),
                }
                Ok(())
            }
            other => Err(WeftError::render(
                RenderErrorKind::WrongVariableType { found: other.kind() },
                node.describe(template.source()),
            )),
        };
        self.host.dispose(value);
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn render_section(
        &mut self,
        template: &Template,
        node: &Node,
        key: &Fetch,
        content: &[Node],
        raw: Span,
        inverted: bool,
        out: &mut String,
        depth: usize,
    ) -> Result<(), WeftError> {
        let value = self.resolve(template, node, key)?;

        if inverted {
            let absent = matches!(
                &value,
                None | Some(Variable::Absent) | Some(Variable::List(_, 0))
            );
            let result = if absent {
                self.enter(template, node, content, out, depth)
            } else {
                Ok(())
            };
            if let Some(value) = value {
                self.host.dispose(value);
            }
            return result;
        }

        let Some(value) = value else {
            return Ok(());
        };

        match value {
            Variable::Absent => {
                self.host.dispose(Variable::Absent);
                Ok(())
            }
            Variable::Context(context) => {
                self.scopes.push(Scope::Fetched(Variable::Context(context)));
                let result = self.enter(template, node, content, out, depth);
                self.pop_scope();
                result
            }
            Variable::List(list, size) => {
                let mut result = Ok(());
                for index in 0..size {
                    let element = self.host.list_get(&list, index);
                    if element.kind() != VarKind::Context {
                        let found = element.kind();
                        self.host.dispose(element);
                        result = Err(WeftError::render(
                            RenderErrorKind::InvalidContext { found },
                            node.describe(template.source()),
                        ));
                        break;
                    }
                    self.scopes.push(Scope::Fetched(element));
                    result = self.enter(template, node, content, out, depth);
                    self.pop_scope();
                    if result.is_err() {
                        break;
                    }
                }
                self.host.dispose(Variable::List(list, size));
                result
            }
            Variable::Callable(callable) => {
                let produced = self.host.invoke(&callable, raw.slice(template.source()));
                let result = match &produced {
                    Variable::Text(text) => {
                        // Callable output is emitted verbatim, never
                        // re-expanded.
                        out.push_str(text.as_ref());
                        Ok(())
                    }
                    other => Err(WeftError::render(
                        RenderErrorKind::WrongVariableType { found: other.kind() },
                        node.describe(template.source()),
                    )),
                };
                self.host.dispose(produced);
                self.host.dispose(Variable::Callable(callable));
                result
            }
            Variable::Text(text) => {
                self.host.dispose(Variable::Text(text));
                Err(WeftError::render(
                    RenderErrorKind::WrongVariableType {
                        found: VarKind::Text,
                    },
                    node.describe(template.source()),
                ))
            }
        }
    }

    fn render_partial(
        &mut self,
        template: &Template,
        node: &Node,
        name: Span,
        out: &mut String,
        depth: usize,
    ) -> Result<(), WeftError> {
        let Some(resolved) = self.host.resolve_partial(name.slice(template.source())) else {
            return Err(WeftError::render(
                RenderErrorKind::BadPartial,
                node.describe(template.source()),
            ));
        };
        if depth + 1 >= self.settings.max_depth {
            return Err(WeftError::render(
                RenderErrorKind::TooDeep,
                node.describe(template.source()),
            ));
        }
        // The partial renders against the caller's full context stack.
        self.render_nodes(&resolved, resolved.root(), out, depth + 1)
    }

    /// Renders section content one nesting level down.
    fn enter(
        &mut self,
        template: &Template,
        node: &Node,
        nodes: &[Node],
        out: &mut String,
        depth: usize,
    ) -> Result<(), WeftError> {
        if depth + 1 >= self.settings.max_depth {
            return Err(WeftError::render(
                RenderErrorKind::TooDeep,
                node.describe(template.source()),
            ));
        }
        self.render_nodes(template, nodes, out, depth + 1)
    }

    fn pop_scope(&mut self) {
        // Pops pair with pushes of fetched scopes; the root is structurally
        // unreachable here.
        if let Some(Scope::Fetched(variable)) = self.scopes.pop() {
            self.host.dispose(variable);
        }
    }
}
