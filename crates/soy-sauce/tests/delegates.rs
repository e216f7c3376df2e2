/*
 * delegates.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Delegate template selection through full renders.
 */

mod common;

use common::{init_tracing, render_string, strict};
use pretty_assertions::assert_eq;
use serde_json::json;
use soy_data::ContentKind;
use soy_sauce::{
    CallData, CompiledTemplates, CompiledTemplatesBuilder, DelCall, DelTemplateMetadata,
    RenderErrorKind, RenderOptions, SoySauce, TemplateProgram, ValueRef,
};

fn delegate(
    builder: CompiledTemplatesBuilder,
    name: &str,
    package: &str,
    variant: &str,
    output: &str,
) -> CompiledTemplatesBuilder {
    builder.template(
        name,
        strict(ContentKind::Html)
            .with_deltemplate(DelTemplateMetadata::new("ns.foo", package, variant)),
        TemplateProgram::builder(name).text(output).build(),
    )
}

fn caller(builder: CompiledTemplatesBuilder, allow_empty_default: bool) -> CompiledTemplatesBuilder {
    builder.template(
        "ns.caller",
        strict(ContentKind::Html).with_del_callee("ns.foo"),
        TemplateProgram::builder("ns.caller")
            .text("<")
            .at(3, 1)
            .del_call(
                DelCall::new("ns.foo")
                    .variant(ValueRef::param("variant"))
                    .allow_empty_default(allow_empty_default)
                    .data(CallData::All),
            )
            .text(">")
            .build(),
    )
}

/// D0 is the default `ns.foo`, P1 implements it in package P1, and P2 only
/// implements variant `v1`.
fn sauce() -> SoySauce {
    let builder = CompiledTemplates::builder();
    let builder = delegate(builder, "ns.foo_d0", "", "", "D0");
    let builder = delegate(builder, "ns.foo_p1", "P1", "", "P1");
    let builder = delegate(builder, "ns.foo_p2_v1", "P2", "v1", "P2/v1");
    SoySauce::new(caller(builder, false).build().unwrap())
}

fn render(sauce: &SoySauce, active: &[&str], variant: Option<&str>) -> String {
    let renderer = sauce
        .render_template("ns.caller")
        .unwrap()
        .set_active_delegate_package_names(active.iter().copied())
        .set_data_json(&json!({ "variant": variant }))
        .unwrap();
    render_string(renderer)
}

#[test]
fn test_default_when_nothing_active() {
    init_tracing();
    assert_eq!(render(&sauce(), &[], None), "<D0>");
}

#[test]
fn test_active_package_overrides_default() {
    assert_eq!(render(&sauce(), &["P1"], None), "<P1>");
}

#[test]
fn test_active_package_variant() {
    assert_eq!(render(&sauce(), &["P2"], Some("v1")), "<P2/v1>");
}

#[test]
fn test_inactive_package_is_ignored() {
    assert_eq!(render(&sauce(), &["P1"], Some("v1")), "<P1>");
    assert_eq!(render(&sauce(), &["Unrelated"], Some("v1")), "<D0>");
}

#[test]
fn test_unknown_variant_uses_empty_variant_default() {
    assert_eq!(render(&sauce(), &["P2"], Some("v2")), "<D0>");
}

#[test]
fn test_no_match_without_allow_empty_default_fails() {
    let builder = CompiledTemplates::builder();
    let builder = delegate(builder, "ns.foo_p2_v1", "P2", "v1", "P2/v1");
    let sauce = SoySauce::new(caller(builder, false).build().unwrap());

    let err = sauce
        .render_template("ns.caller")
        .unwrap()
        .set_active_delegate_package_names(["P2"])
        .set_data_json(&json!({ "variant": "v2" }))
        .unwrap()
        .render_to_string()
        .unwrap_err();

    assert!(matches!(err.kind(), RenderErrorKind::NoActiveDelegate { .. }));
    insta::assert_snapshot!(
        err.kind().to_string(),
        @"Found no active impl for delegate call to 'ns.foo' (variant 'v2') and allowemptydefault was not set"
    );
    assert_eq!(err.frames().len(), 1);
    assert_eq!(err.frames()[0].template, "ns.caller");
    assert_eq!(err.frames()[0].position.map(|p| p.line), Some(3));
}

#[test]
fn test_no_match_with_allow_empty_default_renders_nothing() {
    let builder = CompiledTemplates::builder();
    let builder = delegate(builder, "ns.foo_p2_v1", "P2", "v1", "P2/v1");
    let sauce = SoySauce::new(caller(builder, true).build().unwrap());

    assert_eq!(render(&sauce, &["P2"], Some("v2")), "<>");
    assert_eq!(render(&sauce, &[], None), "<>");
    assert_eq!(render(&sauce, &["P2"], Some("v1")), "<P2/v1>");
}

#[test]
fn test_two_active_packages_for_one_delegate_conflict() {
    let builder = CompiledTemplates::builder();
    let builder = delegate(builder, "ns.foo_p1", "P1", "", "P1");
    let builder = delegate(builder, "ns.foo_p3", "P3", "", "P3");
    let sauce = SoySauce::new(caller(builder, false).build().unwrap());

    let err = sauce
        .render_template("ns.caller")
        .unwrap()
        .set_active_delegate_package_names(["P1", "P3"])
        .prepare()
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        RenderErrorKind::ConflictingDelegates { name, .. } if name == "ns.foo"
    ));

    // Each package alone is fine.
    assert_eq!(render(&sauce, &["P3"], None), "<P3>");
}

#[test]
fn test_duplicate_delegate_rejected_at_build() {
    let builder = CompiledTemplates::builder();
    let builder = delegate(builder, "ns.foo_a", "SecretFeature", "", "A");
    let builder = delegate(builder, "ns.foo_b", "SecretFeature", "", "B");
    let err = builder.build().unwrap_err();
    assert!(matches!(err.kind(), RenderErrorKind::DuplicateDelegate { .. }));
}

#[test]
fn test_options_with_empty_package_list_clear_active_packages() {
    let options = RenderOptions::from_json_str(r#"{"activeDelegatePackages": []}"#).unwrap();
    let renderer = sauce()
        .render_template("ns.caller")
        .unwrap()
        .set_active_delegate_package_names(["P1"])
        .with_options(options);
    assert_eq!(render_string(renderer), "<D0>");

    // Options without the field keep the packages already set.
    let renderer = sauce()
        .render_template("ns.caller")
        .unwrap()
        .set_active_delegate_package_names(["P1"])
        .with_options(RenderOptions::default());
    assert_eq!(render_string(renderer), "<P1>");
}

#[test]
fn test_prepared_renderer_reuses_active_packages() {
    let prepared = sauce()
        .render_template("ns.caller")
        .unwrap()
        .set_active_delegate_package_names(["P1"])
        .prepare()
        .unwrap();

    for _ in 0..2 {
        let continuation = prepared.render_to_string().unwrap();
        assert_eq!(continuation.get().unwrap(), "<P1>");
    }
    assert!(prepared.context().active_delegate_packages().contains("P1"));
}
