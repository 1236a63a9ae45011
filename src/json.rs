//! A ready-made host over `serde_json` values.
//!
//! Maps JSON data onto the engine's variable model: objects become
//! contexts, arrays become lists, strings and numbers become text. `null`
//! and missing keys resolve as not-found; `false` is an explicit absent
//! value, and `true` behaves as an empty context so truthy sections
//! render once with lookups falling through to the enclosing scopes.
//! Callables and partials are registered on the host by name; registered
//! callables shadow data keys.

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use serde_json::Value;

use crate::template::Template;
use crate::value::{Host, Variable};

/// Shared handle to a registered callable.
pub type JsonLambda = Rc<dyn Fn(&str) -> String>;

/// Host data reachable during a render: a JSON value or a callable.
#[derive(Clone)]
pub enum JsonData {
    Json(Value),
    Lambda(JsonLambda),
}

/// [`Host`] implementation over [`serde_json::Value`] trees.
#[derive(Default)]
pub struct JsonHost {
    lambdas: HashMap<String, JsonLambda>,
    partials: HashMap<String, Arc<Template>>,
}

impl JsonHost {
    pub fn new() -> JsonHost {
        JsonHost::default()
    }

    /// Registers a callable, visible under `name` from every scope.
    pub fn add_lambda(
        &mut self,
        name: impl Into<String>,
        lambda: impl Fn(&str) -> String + 'static,
    ) {
        self.lambdas.insert(name.into(), Rc::new(lambda));
    }

    /// Registers a compiled template as a partial.
    pub fn add_partial(&mut self, name: impl Into<String>, template: Template) {
        self.partials.insert(name.into(), Arc::new(template));
    }

    /// Wraps a JSON value as a render context or variable.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_json::json;
    /// use weft::json::JsonHost;
    /// use weft::VarKind;
    ///
    /// assert_eq!(JsonHost::variable(json!({})).kind(), VarKind::Context);
    /// assert_eq!(JsonHost::variable(json!("hi")).kind(), VarKind::Text);
    /// assert_eq!(JsonHost::variable(json!(null)).kind(), VarKind::Absent);
    /// ```
    pub fn variable(value: Value) -> Variable<JsonHost> {
        convert(value)
    }
}

fn convert(value: Value) -> Variable<JsonHost> {
    match value {
        Value::Null | Value::Bool(false) => Variable::Absent,
        // A bare `true` renders sections once without adding lookups.
        Value::Bool(true) => Variable::Context(JsonData::Json(Value::Bool(true))),
        Value::Number(number) => Variable::Text(number.to_string()),
        Value::String(text) => Variable::Text(text),
        Value::Array(items) => {
            let size = items.len();
            Variable::List(JsonData::Json(Value::Array(items)), size)
        }
        Value::Object(map) => Variable::Context(JsonData::Json(Value::Object(map))),
    }
}

impl Host for JsonHost {
    type Value = JsonData;
    type Text = String;

    fn context_find(&self, context: &JsonData, key: &str) -> Option<Variable<JsonHost>> {
        if let Some(lambda) = self.lambdas.get(key) {
            return Some(Variable::Callable(JsonData::Lambda(Rc::clone(lambda))));
        }
        let JsonData::Json(Value::Object(map)) = context else {
            return None;
        };
        match map.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => Some(convert(value.clone())),
        }
    }

    fn list_get(&self, list: &JsonData, index: usize) -> Variable<JsonHost> {
        match list {
            JsonData::Json(Value::Array(items)) => match items.get(index) {
                Some(value) => convert(value.clone()),
                None => Variable::Absent,
            },
            _ => Variable::Absent,
        }
    }

    fn invoke(&self, callable: &JsonData, raw_text: &str) -> Variable<JsonHost> {
        match callable {
            JsonData::Lambda(lambda) => Variable::Text(lambda(raw_text)),
            JsonData::Json(_) => Variable::Absent,
        }
    }

    fn supports_partials(&self) -> bool {
        true
    }

    fn resolve_partial(&self, name: &str) -> Option<Arc<Template>> {
        self.partials.get(name).cloned()
    }
}
