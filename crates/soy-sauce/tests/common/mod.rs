/*
 * common/mod.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Helpers shared by the soy-sauce integration tests.
 */

#![allow(dead_code)]

use soy_data::{AdvisingAppendable, ContentKind, RenderResult};
use soy_sauce::{Renderer, TemplateMetadata, WriteContinuation};

/// Route `tracing` output to the test harness; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn strict(kind: ContentKind) -> TemplateMetadata {
    TemplateMetadata::new().with_content_kind(kind)
}

/// Render to a string, requiring the render to finish in one step.
pub fn render_string(renderer: Renderer) -> String {
    let continuation = renderer.render_to_string().unwrap();
    assert_eq!(continuation.result(), &RenderResult::Done);
    continuation.get().unwrap()
}

/// Resume `continuation` until it is done, returning how many steps it took.
pub fn run_to_completion<W: AdvisingAppendable>(
    mut continuation: WriteContinuation<W>,
    mut on_step: impl FnMut(&mut W),
) -> (WriteContinuation<W>, usize) {
    let mut steps = 1;
    loop {
        on_step(continuation.sink_mut().unwrap());
        let result = continuation.result().clone();
        match result {
            RenderResult::Done => return (continuation, steps),
            RenderResult::Limited => {
                continuation = continuation.continue_render().unwrap();
                steps += 1;
            }
            RenderResult::Detach(pending) => panic!("unexpected detach on {pending}"),
        }
    }
}
