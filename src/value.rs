use std::fmt;
use std::sync::Arc;

use crate::template::Template;

/// The kinds a [`Variable`] can take, used for dispatch and error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Absent,
    Text,
    List,
    Callable,
    Context,
}

impl VarKind {
    /// Returns the kind's name as used in error messages.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use weft::VarKind;
    /// assert_eq!(VarKind::Callable.name(), "callable");
    /// ```
    pub fn name(self) -> &'static str {
        match self {
            VarKind::Absent => "absent",
            VarKind::Text => "text",
            VarKind::List => "list",
            VarKind::Callable => "callable",
            VarKind::Context => "context",
        }
    }
}

impl fmt::Display for VarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A host-supplied value, as seen by the renderer.
///
/// The engine never owns host data. Every variable produced by a [`Host`]
/// callback is borrowed for the duration of the node render that requested
/// it and handed back through [`Host::dispose`] exactly once, on success
/// and error paths alike.
pub enum Variable<H: Host> {
    /// No value. Tags emit nothing; sections skip their content.
    Absent,
    /// Scalar text.
    Text(H::Text),
    /// An indexable sequence with a known length.
    List(H::Value, usize),
    /// A function that receives a section's raw source text.
    Callable(H::Value),
    /// A nested lookup scope.
    Context(H::Value),
}

impl<H: Host> Variable<H> {
    pub fn kind(&self) -> VarKind {
        match self {
            Variable::Absent => VarKind::Absent,
            Variable::Text(_) => VarKind::Text,
            Variable::List(..) => VarKind::List,
            Variable::Callable(_) => VarKind::Callable,
            Variable::Context(_) => VarKind::Context,
        }
    }
}

/// The capability table the engine compiles and renders through.
///
/// A host bridges its own data model into [`Variable`]s: `Value` is an
/// opaque handle the engine passes back into the host's callbacks, and
/// `Text` is the payload of [`Variable::Text`]. The bundled
/// [`JsonHost`](crate::json::JsonHost) is one such bridge.
pub trait Host: Sized {
    /// Opaque handle to host data.
    type Value;
    /// Text payload type.
    type Text: AsRef<str>;

    /// Looks `key` up in a single context scope. `None` means this scope
    /// has no entry; the renderer then consults the next scope down the
    /// stack.
    fn context_find(&self, context: &Self::Value, key: &str) -> Option<Variable<Self>>;

    /// Fetches one element of a list. `index` is below the size reported
    /// alongside the list variable.
    fn list_get(&self, list: &Self::Value, index: usize) -> Variable<Self>;

    /// Invokes a callable with the raw, unexpanded source text of the
    /// section it keys. Must produce a [`Variable::Text`].
    fn invoke(&self, callable: &Self::Value, raw_text: &str) -> Variable<Self>;

    /// Returns a variable previously produced by [`Host::context_find`],
    /// [`Host::list_get`], or [`Host::invoke`]. Called exactly once per
    /// produced variable, whether or not the render succeeds.
    fn dispose(&self, variable: Variable<Self>) {
        let _ = variable;
    }

    /// Whether templates compiled against this host may contain
    /// `{{>name}}` tags. Compiling a partial tag fails when this is
    /// `false`.
    fn supports_partials(&self) -> bool {
        false
    }

    /// Resolves a partial name to a compiled template. `None` fails the
    /// render at the partial node. The engine drops its handle when the
    /// inclusion finishes, so per-render partials simply hand out fresh
    /// clones.
    fn resolve_partial(&self, name: &str) -> Option<Arc<Template>> {
        let _ = name;
        None
    }
}
