// tests/compile_tests.rs

use weft::json::JsonHost;
use weft::value::{Host, Variable};
use weft::{CompileErrorKind, Template, WeftError};

/// Host with no partial support, for capability checks.
struct BareHost;

impl Host for BareHost {
    type Value = ();
    type Text = String;

    fn context_find(&self, _: &(), _: &str) -> Option<Variable<BareHost>> {
        None
    }
    fn list_get(&self, _: &(), _: usize) -> Variable<BareHost> {
        Variable::Absent
    }
    fn invoke(&self, _: &(), _: &str) -> Variable<BareHost> {
        Variable::Absent
    }
}

fn compile(source: &str) -> Result<Template, WeftError> {
    Template::compile(source, &JsonHost::new())
}

fn compile_err(source: &str) -> WeftError {
    compile(source).expect_err("compile should fail")
}

fn kind(error: &WeftError) -> CompileErrorKind {
    match error {
        WeftError::Compile { kind, .. } => *kind,
        other => panic!("expected a compile error, got {other}"),
    }
}

fn offset(error: &WeftError) -> usize {
    match error {
        WeftError::Compile { offset, .. } => *offset,
        other => panic!("expected a compile error, got {other}"),
    }
}

#[test]
fn plain_text_compiles_to_a_single_static_node() {
    let template = compile("just text, no tags").unwrap();
    assert_eq!(template.pretty(), "static \"just text, no tags\"\n");
}

#[test]
fn tags_split_the_surrounding_text() {
    let template = compile("a {{b}} c").unwrap();
    assert_eq!(
        template.pretty(),
        "static \"a \"\ntag Escape 'b'\nstatic \" c\"\n"
    );
}

#[test]
fn triple_and_ampersand_tags_choose_their_print_mode() {
    let template = compile("{{{r}}}{{&u}}{{e}}").unwrap();
    assert_eq!(
        template.pretty(),
        "tag Raw 'r'\ntag Unescape 'u'\ntag Escape 'e'\n"
    );
}

#[test]
fn sections_nest() {
    let template = compile("{{#a}}x{{#b}}y{{/b}}{{/a}}").unwrap();
    assert_eq!(
        template.pretty(),
        "section 'a'\n  static \"x\"\n  section 'b'\n    static \"y\"\n"
    );
}

#[test]
fn comment_tags_vanish() {
    let template = compile("a{{! ignore me }}b").unwrap();
    assert_eq!(template.pretty(), "static \"a\"\nstatic \"b\"\n");
}

#[test]
fn mismatched_section_close_is_rejected() {
    let error = compile_err("{{#a}}x{{/b}}");
    assert_eq!(kind(&error), CompileErrorKind::MismatchedSection);
    let at = error.location().unwrap();
    assert_eq!((at.line, at.column), (1, 10));
    assert_eq!(at.line_text, "{{#a}}x{{/b}}");
}

#[test]
fn closing_an_unopened_section_is_rejected() {
    let error = compile_err("x{{/a}}");
    assert_eq!(kind(&error), CompileErrorKind::MismatchedSection);
}

#[test]
fn unclosed_section_at_end_of_input_is_rejected() {
    let error = compile_err("{{#a}}body");
    assert_eq!(kind(&error), CompileErrorKind::MismatchedSection);
    assert_eq!(offset(&error), 2);
}

#[test]
fn unclosed_inner_section_is_the_one_reported() {
    let error = compile_err("{{#a}}{{#b}}{{/b}}{{#c}}");
    assert_eq!(kind(&error), CompileErrorKind::MismatchedSection);
    assert_eq!(offset(&error), 20);
}

#[test]
fn stray_close_delimiter_before_a_tag_is_rejected() {
    let error = compile_err("a }} b {{x}}");
    assert_eq!(kind(&error), CompileErrorKind::MismatchedDelimiter);
    assert_eq!(offset(&error), 2);
}

#[test]
fn lone_close_delimiter_with_no_tag_is_static_text() {
    let template = compile("a }} b").unwrap();
    assert_eq!(template.pretty(), "static \"a }} b\"\n");
}

#[test]
fn missing_close_delimiter_is_rejected() {
    let error = compile_err("ab{{name");
    assert_eq!(kind(&error), CompileErrorKind::MismatchedDelimiter);
    assert_eq!(offset(&error), 2);
}

#[test]
fn empty_tag_names_are_rejected() {
    assert_eq!(kind(&compile_err("{{}}")), CompileErrorKind::BadTagName);
    assert_eq!(kind(&compile_err("{{  }}")), CompileErrorKind::BadTagName);
    assert_eq!(kind(&compile_err("{{!}}")), CompileErrorKind::BadTagName);
}

#[test]
fn names_reject_punctuation() {
    assert_eq!(kind(&compile_err("{{foo.bar}}")), CompileErrorKind::BadTagName);
    assert_eq!(kind(&compile_err("{{a-b}}")), CompileErrorKind::BadTagName);
    assert_eq!(kind(&compile_err("{{#a b}}x{{/a b}}")), CompileErrorKind::BadTagName);
}

#[test]
fn names_allow_alphanumerics_and_underscores() {
    assert!(compile("{{_private}} {{name2}} {{A_b_9}}").is_ok());
}

#[test]
fn raw_tag_missing_its_brace_is_rejected() {
    let error = compile_err("{{{x}}");
    assert_eq!(kind(&error), CompileErrorKind::MismatchedDelimiter);
}

#[test]
fn set_delimiter_swaps_and_can_swap_back() {
    let template = compile("{{=<% %>=}}<%a%><%={{ }}=%>{{b}}").unwrap();
    assert_eq!(template.delimiters(), ("{{", "}}"));
    assert_eq!(template.pretty(), "tag Escape 'a'\ntag Escape 'b'\n");

    let template = compile("{{=<% %>=}}<%name%>").unwrap();
    assert_eq!(template.delimiters(), ("<%", "%>"));
}

#[test]
fn set_delimiter_without_its_terminator_is_rejected() {
    let error = compile_err("{{=<% %>}}");
    assert_eq!(kind(&error), CompileErrorKind::MismatchedDelimiter);
}

#[test]
fn malformed_delimiter_declarations_are_rejected() {
    assert_eq!(kind(&compile_err("{{=<%=}}")), CompileErrorKind::BadDelimiter);
    assert_eq!(kind(&compile_err("{{=a = b=}}")), CompileErrorKind::BadDelimiter);
    assert_eq!(kind(&compile_err("{{=a b c=}}")), CompileErrorKind::BadDelimiter);
}

#[test]
fn partials_require_host_support() {
    let error = Template::compile("{{>side}}", &BareHost).expect_err("partials unsupported");
    assert_eq!(kind(&error), CompileErrorKind::NotImplemented);

    let template = Template::compile("{{>side}}", &JsonHost::new()).unwrap();
    assert_eq!(template.pretty(), "partial 'side'\n");
}

#[test]
fn error_locations_span_multiple_lines() {
    let error = compile_err("line one\nline two {{/x}}\n");
    let at = error.location().unwrap();
    assert_eq!((at.line, at.column), (2, 12));
    assert_eq!(at.line_text, "line two {{/x}}");
}

#[test]
fn templates_report_their_diagnostic_name() {
    let template =
        Template::compile_named("header", "hi", &JsonHost::new()).unwrap();
    assert_eq!(template.name(), "header");
    assert_eq!(template.source(), "hi");
}
