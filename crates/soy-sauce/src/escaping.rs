/*
 * escaping.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Applying print directives to the whole output of a callee.

use crate::context::RenderContext;
use crate::directives::PrintDirective;
use crate::error::SauceResult;
use crate::template::CompiledTemplate;
use soy_data::{
    AdvisingAppendable, ContentKind, OutputBuffer, RenderResult, SanitizedContent, SoyValue,
};
use std::sync::Arc;

/// Wrap `delegate` so its complete output is passed through `directives`.
///
/// Directives only work on whole values, so the callee renders into a
/// private buffer. Nothing reaches the caller's sink until the callee is
/// `Done`; then the transformed value is written in one append. Pauses of
/// the callee are passed through unchanged, and the buffer survives them.
///
/// With a `kind`, the buffered text is handed to the directives as
/// sanitized content of that kind, otherwise as a plain string.
pub fn apply_escapers(
    delegate: Box<dyn CompiledTemplate>,
    directives: Vec<Arc<dyn PrintDirective>>,
    kind: Option<ContentKind>,
) -> Box<dyn CompiledTemplate> {
    Box::new(EscapingTemplate {
        delegate,
        directives,
        kind,
        buffer: OutputBuffer::new(),
    })
}

struct EscapingTemplate {
    delegate: Box<dyn CompiledTemplate>,
    directives: Vec<Arc<dyn PrintDirective>>,
    kind: Option<ContentKind>,
    buffer: OutputBuffer,
}

impl CompiledTemplate for EscapingTemplate {
    fn render(
        &mut self,
        out: &mut dyn AdvisingAppendable,
        context: &RenderContext,
    ) -> SauceResult<RenderResult> {
        let result = self.delegate.render(&mut self.buffer, context)?;
        if !result.is_done() {
            return Ok(result);
        }

        let text = self.buffer.take();
        let mut value = match self.kind {
            Some(kind) => SoyValue::Sanitized(SanitizedContent::ordain_as_safe(text, kind)),
            None => SoyValue::String(text),
        };
        for directive in &self.directives {
            value = directive.apply(value, &[])?;
        }

        let escaped = value.coerce_to_string();
        tracing::debug!(
            directives = self.directives.len(),
            bytes = escaped.len(),
            "Flushing escaped callee output"
        );
        out.append(&escaped)?;
        Ok(RenderResult::Done)
    }
}
