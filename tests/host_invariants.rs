// tests/host_invariants.rs
//
// Disposal and context-stack accounting, driven through a host that
// counts every variable it produces and every one it gets back.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use weft::value::{Host, Variable};
use weft::{RenderErrorKind, RenderSettings, Template, WeftError};

#[derive(Clone)]
enum Data {
    Text(String),
    List(Rc<Vec<Data>>),
    Map(Rc<HashMap<String, Data>>),
    Lambda(Rc<dyn Fn(&str) -> String>),
    /// A callable that yields a non-text result when invoked.
    BrokenLambda,
    False,
}

#[derive(Default)]
struct CountingHost {
    produced: Cell<usize>,
    disposed: Cell<usize>,
}

impl CountingHost {
    fn produce(&self, data: &Data) -> Variable<CountingHost> {
        self.produced.set(self.produced.get() + 1);
        match data {
            Data::Text(text) => Variable::Text(text.clone()),
            Data::List(items) => Variable::List(Data::List(Rc::clone(items)), items.len()),
            Data::Map(map) => Variable::Context(Data::Map(Rc::clone(map))),
            Data::Lambda(lambda) => Variable::Callable(Data::Lambda(Rc::clone(lambda))),
            Data::BrokenLambda => Variable::Callable(Data::BrokenLambda),
            Data::False => Variable::Absent,
        }
    }

    fn balanced(&self) -> bool {
        self.produced.get() == self.disposed.get()
    }
}

impl Host for CountingHost {
    type Value = Data;
    type Text = String;

    fn context_find(&self, context: &Data, key: &str) -> Option<Variable<CountingHost>> {
        let Data::Map(map) = context else { return None };
        map.get(key).map(|data| self.produce(data))
    }

    fn list_get(&self, list: &Data, index: usize) -> Variable<CountingHost> {
        match list {
            Data::List(items) => self.produce(&items[index]),
            _ => {
                self.produced.set(self.produced.get() + 1);
                Variable::Absent
            }
        }
    }

    fn invoke(&self, callable: &Data, raw_text: &str) -> Variable<CountingHost> {
        self.produced.set(self.produced.get() + 1);
        match callable {
            Data::Lambda(lambda) => Variable::Text(lambda(raw_text)),
            _ => Variable::Absent,
        }
    }

    fn dispose(&self, variable: Variable<CountingHost>) {
        self.disposed.set(self.disposed.get() + 1);
        drop(variable);
    }
}

fn map(entries: &[(&str, Data)]) -> Data {
    Data::Map(Rc::new(
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect(),
    ))
}

fn text(value: &str) -> Data {
    Data::Text(value.to_string())
}

#[test]
fn every_fetch_is_disposed_on_success() {
    let host = CountingHost::default();
    let data = map(&[
        ("name", text("amy")),
        (
            "items",
            Data::List(Rc::new(vec![
                map(&[("n", text("1"))]),
                map(&[("n", text("2"))]),
            ])),
        ),
    ]);
    let template = Template::compile("{{name}}: {{#items}}{{n}};{{/items}}", &host).unwrap();
    let out = template.render(&host, &Variable::Context(data)).unwrap();

    assert_eq!(out, "amy: 1;2;");
    // name + items + two elements + n twice.
    assert_eq!(host.produced.get(), 6);
    assert!(host.balanced());
}

#[test]
fn every_fetch_is_disposed_when_a_render_fails() {
    let host = CountingHost::default();
    let data = map(&[(
        "items",
        Data::List(Rc::new(vec![
            map(&[("v", text("ok"))]),
            map(&[("v", map(&[]))]),
        ])),
    )]);
    let template = Template::compile("{{#items}}{{v}}{{/items}}", &host).unwrap();
    let error = template
        .render(&host, &Variable::Context(data))
        .expect_err("second element should fail");

    assert!(matches!(
        error,
        WeftError::Render {
            kind: RenderErrorKind::WrongVariableType { .. },
            ..
        }
    ));
    // items + both elements + both v fetches.
    assert_eq!(host.produced.get(), 5);
    assert!(host.balanced());
}

#[test]
fn absent_results_are_disposed() {
    let host = CountingHost::default();
    let data = map(&[("gone", Data::False)]);
    let template = Template::compile("a{{gone}}b", &host).unwrap();
    let out = template.render(&host, &Variable::Context(data)).unwrap();

    assert_eq!(out, "ab");
    assert_eq!(host.produced.get(), 1);
    assert!(host.balanced());
}

#[test]
fn lambda_keys_and_results_are_both_disposed() {
    let host = CountingHost::default();
    let data = map(&[(
        "shout",
        Data::Lambda(Rc::new(|raw: &str| raw.to_uppercase())),
    )]);
    let template = Template::compile("{{#shout}}hi{{/shout}}", &host).unwrap();
    let out = template.render(&host, &Variable::Context(data)).unwrap();

    assert_eq!(out, "HI");
    // The callable and its result.
    assert_eq!(host.produced.get(), 2);
    assert!(host.balanced());
}

#[test]
fn failing_lambdas_still_dispose_everything() {
    let host = CountingHost::default();
    let data = map(&[("bad", Data::BrokenLambda)]);
    let template = Template::compile("{{#bad}}x{{/bad}}", &host).unwrap();
    let error = template
        .render(&host, &Variable::Context(data))
        .expect_err("non-text lambda result should fail");

    assert!(matches!(
        error,
        WeftError::Render {
            kind: RenderErrorKind::WrongVariableType { .. },
            ..
        }
    ));
    assert_eq!(host.produced.get(), 2);
    assert!(host.balanced());
}

#[test]
fn strict_misses_produce_and_dispose_nothing() {
    let host = CountingHost::default();
    let template = Template::compile("{{missing}}", &host).unwrap();
    let settings = RenderSettings {
        strict: true,
        ..Default::default()
    };
    let error = template
        .render_with(&host, &Variable::Context(map(&[])), &settings)
        .expect_err("strict miss should fail");

    assert!(matches!(
        error,
        WeftError::Render {
            kind: RenderErrorKind::NotFound,
            ..
        }
    ));
    assert_eq!(host.produced.get(), 0);
    assert!(host.balanced());
}

#[test]
fn accounts_stay_balanced_across_mixed_renders() {
    let host = CountingHost::default();
    let good = map(&[
        ("title", text("t")),
        ("rows", Data::List(Rc::new(vec![map(&[("c", text("1"))])]))),
    ]);
    let bad = map(&[("rows", text("not a list"))]);
    let template = Template::compile("{{title}}{{#rows}}{{c}}{{/rows}}", &host).unwrap();

    assert!(template.render(&host, &Variable::Context(good.clone())).is_ok());
    assert!(host.balanced());

    assert!(template.render(&host, &Variable::Context(bad)).is_err());
    assert!(host.balanced());

    // A failed render leaves the template and host reusable.
    assert_eq!(
        template.render(&host, &Variable::Context(good)).unwrap(),
        "t1"
    );
    assert!(host.balanced());
}

#[test]
fn inverted_sections_dispose_their_probe() {
    let host = CountingHost::default();
    let data = map(&[("items", Data::List(Rc::new(vec![])))]);
    let template = Template::compile("{{^items}}none{{/items}}", &host).unwrap();
    let out = template.render(&host, &Variable::Context(data)).unwrap();

    assert_eq!(out, "none");
    // The empty-list probe itself.
    assert_eq!(host.produced.get(), 1);
    assert!(host.balanced());
}
