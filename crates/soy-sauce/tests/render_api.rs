/*
 * render_api.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * End-to-end tests of the renderer and continuation API.
 */

mod common;

use common::{init_tracing, render_string, run_to_completion, strict};
use pretty_assertions::assert_eq;
use serde_json::json;
use soy_data::{
    AdvisingWriter, ContentKind, Deferred, LimitedBuffer, OutputBuffer, RenderResult, SoyRecord,
    SoyValue,
};
use soy_sauce::{
    CallData, CompiledTemplates, FnFunction, RenderErrorKind, RenderOptions, SoySauce,
    TemplateMetadata, TemplateProgram, ValueRef,
};

fn sauce() -> SoySauce {
    let templates = CompiledTemplates::builder()
        .template(
            "ns.html",
            strict(ContentKind::Html),
            TemplateProgram::builder("ns.html")
                .text("<p>")
                .print_param("name")
                .text("</p>")
                .build(),
        )
        .template(
            "ns.js",
            strict(ContentKind::Js),
            TemplateProgram::builder("ns.js").text("var x = 1;").build(),
        )
        .template(
            "ns.loose",
            TemplateMetadata::new(),
            TemplateProgram::builder("ns.loose").text("loose").build(),
        )
        .template(
            "ns.page",
            strict(ContentKind::Html)
                .with_injected_param("user")
                .with_callee("ns.html"),
            TemplateProgram::builder("ns.page")
                .text("<div class=\"")
                .css("button")
                .text("\" id=\"")
                .xid("main")
                .text("\">")
                .print_ij("user")
                .text(": ")
                .call("ns.html", CallData::All)
                .text(" ")
                .call_function("sum", vec![ValueRef::param("a"), ValueRef::literal(2i64)])
                .text("</div>")
                .build(),
        )
        .build()
        .unwrap();

    SoySauce::builder(templates)
        .function(FnFunction::new("sum", |args: &[SoyValue]| {
            Ok(SoyValue::Integer(
                args.iter().filter_map(SoyValue::as_integer).sum(),
            ))
        }))
        .build()
}

#[test]
fn test_render_to_string() {
    init_tracing();
    let renderer = sauce()
        .render_template("ns.html")
        .unwrap()
        .set_data_json(&json!({"name": "Ada"}))
        .unwrap();
    assert_eq!(render_string(renderer), "<p>Ada</p>");
}

#[test]
fn test_unknown_template() {
    let err = sauce().render_template("ns.nope").unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"Unknown template: ns.nope");
}

#[test]
fn test_full_page_with_ij_renaming_and_functions() {
    let options = RenderOptions::from_json_str(
        r#"{
            "cssRenamingMap": {"button": "b1"},
            "xidRenamingMap": {"main": "m7"}
        }"#,
    )
    .unwrap();
    let renderer = sauce()
        .render_template("ns.page")
        .unwrap()
        .with_options(options)
        .set_data_json(&json!({"name": "Ada", "a": 40}))
        .unwrap()
        .set_ij_json(&json!({"user": "root"}))
        .unwrap();

    assert_eq!(
        render_string(renderer),
        "<div class=\"b1\" id=\"m7\">root: <p>Ada</p> 42</div>"
    );
}

#[test]
fn test_data_json_must_be_an_object() {
    let err = sauce()
        .render_template("ns.html")
        .unwrap()
        .set_data_json(&json!([1, 2]))
        .unwrap_err();
    assert!(matches!(err.kind(), RenderErrorKind::Data(_)));
}

#[test]
fn test_transitive_ij_params() {
    let params = sauce().transitive_ij_params("ns.page").unwrap();
    assert_eq!(params.into_iter().collect::<Vec<_>>(), vec!["user".to_string()]);
}

// Content kinds

#[test]
fn test_strict_template_defaults_to_html() {
    // ns.js declares JS and nothing was set explicitly, so HTML is expected.
    let err = sauce()
        .render_template("ns.js")
        .unwrap()
        .render_to_string()
        .unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @r#"Expected template 'ns.js' to be kind="HTML" but was kind="JS""#
    );

    let renderer = sauce()
        .render_template("ns.js")
        .unwrap()
        .set_expected_content_kind(ContentKind::Js);
    assert_eq!(render_string(renderer), "var x = 1;");
}

#[test]
fn test_text_accepts_any_template() {
    for name in ["ns.js", "ns.loose"] {
        let renderer = sauce()
            .render_template(name)
            .unwrap()
            .set_expected_content_kind(ContentKind::Text);
        assert!(!render_string(renderer).is_empty());
    }
}

#[test]
fn test_non_strict_template_with_expected_kind_fails() {
    // Without an explicit kind a non-strict template renders.
    assert_eq!(render_string(sauce().render_template("ns.loose").unwrap()), "loose");

    let err = sauce()
        .render_template("ns.loose")
        .unwrap()
        .set_expected_content_kind(ContentKind::Html)
        .render_to_string()
        .unwrap_err();
    assert!(matches!(err.kind(), RenderErrorKind::NonStrictTemplate { .. }));
}

#[test]
fn test_expected_kind_from_options() {
    let options = RenderOptions::from_json_str(r#"{"expectedContentKind": "JS"}"#).unwrap();
    let renderer = sauce()
        .render_template("ns.js")
        .unwrap()
        .with_options(options);
    assert_eq!(render_string(renderer), "var x = 1;");
}

#[test]
fn test_render_strict_tags_content() {
    let continuation = sauce()
        .render_template("ns.html")
        .unwrap()
        .set_data(SoyRecord::new().with("name", "Ada"))
        .render_strict()
        .unwrap();
    let content = continuation.get().unwrap();
    assert_eq!(content.kind(), ContentKind::Html);
    assert_eq!(content.content(), "<p>Ada</p>");

    let err = sauce()
        .render_template("ns.loose")
        .unwrap()
        .render_strict()
        .unwrap_err();
    assert!(matches!(err.kind(), RenderErrorKind::StrictRequired { .. }));
}

#[test]
fn test_render_strict_with_text_uses_text_kind() {
    let content = sauce()
        .render_template("ns.js")
        .unwrap()
        .set_expected_content_kind(ContentKind::Text)
        .render_strict()
        .unwrap()
        .get()
        .unwrap();
    assert_eq!(content.kind(), ContentKind::Text);
}

// Continuations

#[test]
fn test_detach_and_resume() {
    let name = Deferred::named("name");
    let mut continuation = sauce()
        .render_template("ns.html")
        .unwrap()
        .set_data(SoyRecord::new().with("name", name.clone()))
        .render_to_string()
        .unwrap();

    assert!(continuation.result().is_detached());
    let err = continuation.get().unwrap_err();
    assert!(matches!(err.kind(), RenderErrorKind::NotDone { .. }));

    name.set("Ada");
    let done = continuation.continue_render().unwrap();
    assert_eq!(done.result(), &RenderResult::Done);
    assert_eq!(done.get().unwrap(), "<p>Ada</p>");
}

#[test]
fn test_continue_twice_fails() {
    let name = Deferred::named("name");
    let mut continuation = sauce()
        .render_template("ns.html")
        .unwrap()
        .set_data(SoyRecord::new().with("name", name.clone()))
        .render(OutputBuffer::new())
        .unwrap();

    // Still pending: the next step detaches again.
    let mut second = continuation.continue_render().unwrap();
    assert!(second.result().is_detached());

    let err = continuation.continue_render().unwrap_err();
    assert!(matches!(err.kind(), RenderErrorKind::AlreadyResumed));
    assert!(continuation.sink().is_none());

    name.set("Ada");
    let done = second.continue_render().unwrap();
    assert_eq!(done.into_sink().unwrap().as_str(), "<p>Ada</p>");
}

#[test]
fn test_continue_after_done_fails() {
    let mut continuation = sauce()
        .render_template("ns.loose")
        .unwrap()
        .render(OutputBuffer::new())
        .unwrap();
    assert_eq!(continuation.result(), &RenderResult::Done);

    let err = continuation.continue_render().unwrap_err();
    assert!(matches!(err.kind(), RenderErrorKind::AlreadyDone));
    // The sink is still available after a rejected resume.
    assert_eq!(continuation.sink().unwrap().as_str(), "loose");
}

#[test]
fn test_failed_deferred_value_is_an_error() {
    let name = Deferred::named("name");
    let mut continuation = sauce()
        .render_template("ns.html")
        .unwrap()
        .set_data(SoyRecord::new().with("name", name.clone()))
        .render_to_string()
        .unwrap();
    name.fail("backend unavailable");

    let err = continuation.continue_render().unwrap_err();
    assert!(matches!(err.kind(), RenderErrorKind::Data(_)));
    assert_eq!(err.frames()[0].template, "ns.html");
}

#[test]
fn test_limited_render_matches_uninterrupted_output() {
    let data = json!({"name": "Ada", "a": 1});
    let ij = json!({"user": "root"});
    let expected = render_string(
        sauce()
            .render_template("ns.page")
            .unwrap()
            .set_data_json(&data)
            .unwrap()
            .set_ij_json(&ij)
            .unwrap(),
    );

    let continuation = sauce()
        .render_template("ns.page")
        .unwrap()
        .set_data_json(&data)
        .unwrap()
        .set_ij_json(&ij)
        .unwrap()
        .render(LimitedBuffer::new(4))
        .unwrap();
    assert_eq!(continuation.result(), &RenderResult::Limited);

    let mut output = String::new();
    let (_, steps) = run_to_completion(continuation, |sink| output.push_str(&sink.drain()));
    assert!(steps > 1);
    assert_eq!(output, expected);
}

#[test]
fn test_render_to_string_never_limits() {
    let renderer = sauce()
        .render_template("ns.page")
        .unwrap()
        .set_data_json(&json!({"name": "Ada", "a": 1}))
        .unwrap();
    let continuation = renderer.render_to_string().unwrap();
    assert_eq!(continuation.result(), &RenderResult::Done);
}

#[test]
fn test_render_to_writer() {
    let continuation = sauce()
        .render_template("ns.html")
        .unwrap()
        .set_data_json(&json!({"name": "Ada"}))
        .unwrap()
        .render(AdvisingWriter::new(Vec::new(), 1024))
        .unwrap();
    assert_eq!(continuation.result(), &RenderResult::Done);

    let writer = continuation.into_sink().unwrap();
    let bytes = writer.into_inner().unwrap();
    assert_eq!(String::from_utf8(bytes).unwrap(), "<p>Ada</p>");
}

#[test]
fn test_prepared_renderer_starts_independent_renders() {
    let name = Deferred::named("name");
    let prepared = sauce()
        .render_template("ns.html")
        .unwrap()
        .set_data(SoyRecord::new().with("name", name.clone()))
        .prepare()
        .unwrap();

    let mut first = prepared.render_to_string().unwrap();
    assert!(first.result().is_detached());
    name.set("Ada");

    let second = prepared.render_to_string().unwrap();
    assert_eq!(second.get().unwrap(), "<p>Ada</p>");
    assert_eq!(first.continue_render().unwrap().get().unwrap(), "<p>Ada</p>");
}
