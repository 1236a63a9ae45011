//! A Mustache-family template engine.
//!
//! Compiles a template string into a node tree, then renders that tree
//! any number of times against host-supplied data. Hosts bridge their
//! data model through the [`Host`] capability trait; a ready-made JSON
//! host ships in [`json`].
//!
//! ```
//! use serde_json::json;
//! use weft::{json::JsonHost, Template};
//!
//! let host = JsonHost::new();
//! let template = Template::compile("Hello {{name}}!", &host)?;
//! let context = JsonHost::variable(json!({ "name": "World" }));
//! assert_eq!(template.render(&host, &context)?, "Hello World!");
//! # Ok::<(), weft::WeftError>(())
//! ```

pub use crate::diagnostics::{
    print_error, CompileErrorKind, RenderErrorKind, SourceLocation, WeftError,
};
pub use crate::render::{RenderSettings, DEFAULT_MAX_DEPTH};
pub use crate::template::Template;
pub use crate::value::{Host, VarKind, Variable};

pub mod ast;
mod ast_builder;
pub mod diagnostics;
pub mod escape;
pub mod json;
pub mod render;
mod scanner;
mod tag;
pub mod template;
pub mod value;
