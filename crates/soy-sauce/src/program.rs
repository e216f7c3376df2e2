/*
 * program.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Templates expressed as a flat list of output instructions.
//!
//! A [`TemplateProgram`] is a [`TemplateFactory`]: each render gets its own
//! instance with a program counter and at most one callee in flight. The
//! instance suspends in three places:
//!
//! - before an instruction whose input value is still pending (`Detach`,
//!   nothing written for that instruction)
//! - after an instruction, when the sink reports its soft limit and more
//!   instructions remain (`Limited`)
//! - whenever the callee in flight suspends (its result is passed up)
//!
//! Resuming re-runs the instruction at the program counter, or resumes the
//! callee in flight, so output is never duplicated or skipped.

use crate::context::RenderContext;
use crate::error::{RenderErrorKind, SauceResult, SourcePosition};
use crate::escaping::apply_escapers;
use crate::template::{CompiledTemplate, TemplateFactory};
use soy_data::{
    AdvisingAppendable, RenderResult, SoyRecord, SoyValue, SoyValueProvider, get_field_provider,
};
use soy_msgs::{PlaceholderValue, Placeholders, SoyMsg, render_msg};
use std::sync::Arc;

/// Where an instruction reads a value from.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueRef {
    /// A constant, always resolved.
    Literal(SoyValueProvider),
    /// A template parameter; absent parameters read as null.
    Param(String),
    /// An injected data value; absent keys read as null.
    Ij(String),
}

impl ValueRef {
    pub fn literal(value: impl Into<SoyValue>) -> Self {
        ValueRef::Literal(SoyValueProvider::Resolved(value.into()))
    }

    pub fn param(name: impl Into<String>) -> Self {
        ValueRef::Param(name.into())
    }

    pub fn ij(name: impl Into<String>) -> Self {
        ValueRef::Ij(name.into())
    }

    fn lookup<'a>(&'a self, params: &'a SoyRecord, ij: &'a SoyRecord) -> &'a SoyValueProvider {
        match self {
            ValueRef::Literal(provider) => provider,
            ValueRef::Param(name) => get_field_provider(params, name),
            ValueRef::Ij(name) => get_field_provider(ij, name),
        }
    }
}

/// The parameters passed to a callee.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CallData {
    /// No parameters.
    #[default]
    Empty,
    /// The caller's own parameters, shared as is.
    All,
    /// Named values, passed lazily: pending values stay pending in the callee.
    Params(Vec<(String, ValueRef)>),
}

impl CallData {
    fn build(&self, params: &Arc<SoyRecord>, ij: &SoyRecord) -> Arc<SoyRecord> {
        match self {
            CallData::Empty => Arc::new(SoyRecord::new()),
            CallData::All => Arc::clone(params),
            CallData::Params(values) => Arc::new(
                values
                    .iter()
                    .map(|(name, value)| (name.clone(), value.lookup(params, ij).clone()))
                    .collect(),
            ),
        }
    }
}

/// A delegate call.
#[derive(Debug, Clone, PartialEq)]
pub struct DelCall {
    pub callee: String,
    /// Evaluated when the call starts; null means no variant.
    pub variant: ValueRef,
    pub allow_empty_default: bool,
    pub data: CallData,
    /// Directives applied to the callee's complete output.
    pub escapers: Vec<String>,
}

impl DelCall {
    pub fn new(callee: impl Into<String>) -> Self {
        Self {
            callee: callee.into(),
            variant: ValueRef::literal(""),
            allow_empty_default: false,
            data: CallData::Empty,
            escapers: Vec::new(),
        }
    }

    pub fn variant(mut self, variant: ValueRef) -> Self {
        self.variant = variant;
        self
    }

    pub fn allow_empty_default(mut self, allow: bool) -> Self {
        self.allow_empty_default = allow;
        self
    }

    pub fn data(mut self, data: CallData) -> Self {
        self.data = data;
        self
    }

    pub fn escaper(mut self, directive: impl Into<String>) -> Self {
        self.escapers.push(directive.into());
        self
    }
}

/// One output step.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Text(String),
    Print {
        value: ValueRef,
        directives: Vec<String>,
    },
    /// Print the result of a plugin function.
    CallFunction {
        function: String,
        args: Vec<ValueRef>,
        directives: Vec<String>,
    },
    Css(String),
    Xid(String),
    Call {
        callee: String,
        data: CallData,
    },
    DelCall(DelCall),
    /// Render message `id`, or `fallback` when no bundle has it.
    Msg {
        id: u64,
        fallback: Option<SoyMsg>,
        placeholders: Vec<(String, ValueRef)>,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct Step {
    instruction: Instruction,
    position: Option<SourcePosition>,
}

/// A named, immutable instruction list.
#[derive(Debug, Clone)]
pub struct TemplateProgram {
    name: Arc<str>,
    steps: Arc<[Step]>,
}

impl TemplateProgram {
    pub fn builder(name: impl Into<String>) -> ProgramBuilder {
        ProgramBuilder {
            name: name.into(),
            steps: Vec::new(),
            position: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl TemplateFactory for TemplateProgram {
    fn create(&self, params: Arc<SoyRecord>, ij: Arc<SoyRecord>) -> Box<dyn CompiledTemplate> {
        Box::new(ProgramInstance {
            name: Arc::clone(&self.name),
            steps: Arc::clone(&self.steps),
            params,
            ij,
            pc: 0,
            callee: None,
        })
    }
}

/// Builds a [`TemplateProgram`].
#[derive(Debug)]
pub struct ProgramBuilder {
    name: String,
    steps: Vec<Step>,
    position: Option<SourcePosition>,
}

impl ProgramBuilder {
    /// Attribute the following instructions to a source position.
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.position = Some(SourcePosition::new(line, column));
        self
    }

    pub fn instruction(mut self, instruction: Instruction) -> Self {
        self.steps.push(Step {
            instruction,
            position: self.position,
        });
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.instruction(Instruction::Text(text.into()))
    }

    pub fn print(self, value: ValueRef) -> Self {
        self.print_with(value, &[])
    }

    pub fn print_with(self, value: ValueRef, directives: &[&str]) -> Self {
        self.instruction(Instruction::Print {
            value,
            directives: directives.iter().map(|d| d.to_string()).collect(),
        })
    }

    pub fn print_param(self, name: impl Into<String>) -> Self {
        self.print(ValueRef::param(name))
    }

    pub fn print_ij(self, name: impl Into<String>) -> Self {
        self.print(ValueRef::ij(name))
    }

    pub fn call_function(self, function: impl Into<String>, args: Vec<ValueRef>) -> Self {
        self.instruction(Instruction::CallFunction {
            function: function.into(),
            args,
            directives: Vec::new(),
        })
    }

    pub fn css(self, selector: impl Into<String>) -> Self {
        self.instruction(Instruction::Css(selector.into()))
    }

    pub fn xid(self, xid: impl Into<String>) -> Self {
        self.instruction(Instruction::Xid(xid.into()))
    }

    pub fn call(self, callee: impl Into<String>, data: CallData) -> Self {
        self.instruction(Instruction::Call {
            callee: callee.into(),
            data,
        })
    }

    pub fn del_call(self, call: DelCall) -> Self {
        self.instruction(Instruction::DelCall(call))
    }

    pub fn msg(self, id: u64, placeholders: Vec<(&str, ValueRef)>) -> Self {
        self.msg_inner(id, None, placeholders)
    }

    /// A message that renders `fallback` when no bundle translates it.
    pub fn msg_with_fallback(
        self,
        id: u64,
        fallback: SoyMsg,
        placeholders: Vec<(&str, ValueRef)>,
    ) -> Self {
        self.msg_inner(id, Some(fallback), placeholders)
    }

    fn msg_inner(
        self,
        id: u64,
        fallback: Option<SoyMsg>,
        placeholders: Vec<(&str, ValueRef)>,
    ) -> Self {
        self.instruction(Instruction::Msg {
            id,
            fallback,
            placeholders: placeholders
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        })
    }

    pub fn build(self) -> TemplateProgram {
        TemplateProgram {
            name: self.name.into(),
            steps: self.steps.into(),
        }
    }
}

struct ProgramInstance {
    name: Arc<str>,
    steps: Arc<[Step]>,
    params: Arc<SoyRecord>,
    ij: Arc<SoyRecord>,
    pc: usize,
    callee: Option<Box<dyn CompiledTemplate>>,
}

impl CompiledTemplate for ProgramInstance {
    fn render(
        &mut self,
        out: &mut dyn AdvisingAppendable,
        context: &RenderContext,
    ) -> SauceResult<RenderResult> {
        let steps = Arc::clone(&self.steps);
        while let Some(step) = steps.get(self.pc) {
            let suspended = self
                .execute(&step.instruction, out, context)
                .map_err(|err| err.with_frame(&*self.name, step.position))?;
            if let Some(result) = suspended {
                tracing::trace!(template = %self.name, pc = self.pc, %result, "Render suspended");
                return Ok(result);
            }

            self.pc += 1;
            if self.pc < steps.len() && out.soft_limit_reached() {
                tracing::trace!(template = %self.name, pc = self.pc, "Output limit reached");
                return Ok(RenderResult::Limited);
            }
        }
        Ok(RenderResult::Done)
    }
}

impl ProgramInstance {
    /// Run one instruction. `Some` means suspend without advancing.
    fn execute(
        &mut self,
        instruction: &Instruction,
        out: &mut dyn AdvisingAppendable,
        context: &RenderContext,
    ) -> SauceResult<Option<RenderResult>> {
        match instruction {
            Instruction::Text(text) => out.append(text)?,

            Instruction::Print { value, directives } => {
                let provider = value.lookup(&self.params, &self.ij);
                if directives.is_empty() {
                    let result = provider.render_and_resolve(out, true)?;
                    if !result.is_done() {
                        return Ok(Some(result));
                    }
                } else {
                    if let Some(pending) = pending(provider) {
                        return Ok(Some(pending));
                    }
                    let value = apply_directives(context, directives, provider.resolve()?.clone())?;
                    out.append(&value.coerce_to_string())?;
                }
            }

            Instruction::CallFunction {
                function,
                args,
                directives,
            } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    let provider = arg.lookup(&self.params, &self.ij);
                    if let Some(pending) = pending(provider) {
                        return Ok(Some(pending));
                    }
                    values.push(provider.resolve()?.clone());
                }
                let value = context.function(function)?.call(&values)?;
                let value = apply_directives(context, directives, value)?;
                out.append(&value.coerce_to_string())?;
            }

            Instruction::Css(selector) => out.append(&context.rename_css(selector))?,

            Instruction::Xid(xid) => out.append(&context.rename_xid(xid))?,

            Instruction::Call { callee, data } => {
                if self.callee.is_none() {
                    let params = data.build(&self.params, &self.ij);
                    self.callee =
                        Some(context.create_template(callee, params, Arc::clone(&self.ij))?);
                }
                return self.render_callee(out, context);
            }

            Instruction::DelCall(call) => {
                if self.callee.is_none() {
                    let variant = call.variant.lookup(&self.params, &self.ij);
                    if let Some(pending) = pending(variant) {
                        return Ok(Some(pending));
                    }
                    let variant = match variant.resolve()? {
                        SoyValue::Null => String::new(),
                        other => other.coerce_to_string(),
                    };
                    let params = call.data.build(&self.params, &self.ij);
                    let resolved = context.select_del_template(
                        &call.callee,
                        &variant,
                        call.allow_empty_default,
                        params,
                        Arc::clone(&self.ij),
                    )?;
                    let template = if call.escapers.is_empty() {
                        resolved.template
                    } else {
                        apply_escapers(
                            resolved.template,
                            context.print_directives(&call.escapers)?,
                            resolved.content_kind,
                        )
                    };
                    self.callee = Some(template);
                }
                return self.render_callee(out, context);
            }

            Instruction::Msg {
                id,
                fallback,
                placeholders,
            } => {
                let mut values = Placeholders::new();
                for (name, value) in placeholders {
                    let provider = value.lookup(&self.params, &self.ij);
                    if let Some(pending) = pending(provider) {
                        return Ok(Some(pending));
                    }
                    values.insert(name.clone(), placeholder_value(provider.resolve()?));
                }
                let msg = context
                    .soy_msg(*id)
                    .or(fallback.as_ref())
                    .ok_or(RenderErrorKind::MissingMessage { id: *id })?;
                render_msg(msg, &values, out)?;
            }
        }
        Ok(None)
    }

    fn render_callee(
        &mut self,
        out: &mut dyn AdvisingAppendable,
        context: &RenderContext,
    ) -> SauceResult<Option<RenderResult>> {
        let Some(callee) = self.callee.as_mut() else {
            return Ok(None);
        };
        let result = callee.render(out, context)?;
        if result.is_done() {
            self.callee = None;
            Ok(None)
        } else {
            Ok(Some(result))
        }
    }
}

/// The detach result for a provider that is not ready yet.
fn pending(provider: &SoyValueProvider) -> Option<RenderResult> {
    let status = provider.status();
    (!status.is_done()).then_some(status)
}

fn apply_directives(
    context: &RenderContext,
    directives: &[String],
    mut value: SoyValue,
) -> SauceResult<SoyValue> {
    for name in directives {
        value = context.print_directive(name)?.apply(value, &[])?;
    }
    Ok(value)
}

fn placeholder_value(value: &SoyValue) -> PlaceholderValue {
    match value {
        SoyValue::Integer(n) => PlaceholderValue::Number(*n),
        other => PlaceholderValue::Text(other.coerce_to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CompiledTemplates;
    use soy_data::{Deferred, LimitedBuffer, OutputBuffer};

    fn context(templates: CompiledTemplates) -> RenderContext {
        RenderContext::builder(Arc::new(templates)).build().unwrap()
    }

    fn record(pairs: Vec<(&str, SoyValueProvider)>) -> Arc<SoyRecord> {
        Arc::new(pairs.into_iter().collect())
    }

    #[test]
    fn test_straight_line_render() {
        let program = TemplateProgram::builder("ns.hello")
            .text("Hello, ")
            .print_param("name")
            .text("! ")
            .print_param("missing")
            .build();
        let context = context(CompiledTemplates::builder().build().unwrap());
        let mut template = program.create(
            record(vec![("name", "World".into())]),
            Arc::new(SoyRecord::new()),
        );
        let mut out = OutputBuffer::new();
        assert_eq!(template.render(&mut out, &context).unwrap(), RenderResult::Done);
        assert_eq!(out.as_str(), "Hello, World! null");
    }

    #[test]
    fn test_detaches_before_writing_pending_value() {
        let deferred = Deferred::named("slow");
        let program = TemplateProgram::builder("ns.t")
            .text("a")
            .print_param("slow")
            .text("c")
            .build();
        let context = context(CompiledTemplates::builder().build().unwrap());
        let mut template = program.create(
            record(vec![("slow", deferred.clone().into())]),
            Arc::new(SoyRecord::new()),
        );
        let mut out = OutputBuffer::new();

        let result = template.render(&mut out, &context).unwrap();
        assert!(result.is_detached());
        assert_eq!(result.pending(), Some(&deferred.handle()));
        assert_eq!(out.as_str(), "a");

        // Still pending: detaches again without writing.
        assert!(template.render(&mut out, &context).unwrap().is_detached());
        assert_eq!(out.as_str(), "a");

        deferred.set("b");
        assert_eq!(template.render(&mut out, &context).unwrap(), RenderResult::Done);
        assert_eq!(out.as_str(), "abc");
    }

    #[test]
    fn test_limited_only_when_more_remains() {
        let program = TemplateProgram::builder("ns.t")
            .text("aaaa")
            .text("bbbb")
            .build();
        let context = context(CompiledTemplates::builder().build().unwrap());
        let mut template = program.create(Arc::new(SoyRecord::new()), Arc::new(SoyRecord::new()));
        let mut out = LimitedBuffer::new(2);

        assert_eq!(template.render(&mut out, &context).unwrap(), RenderResult::Limited);
        assert_eq!(out.drain(), "aaaa");
        // The last write reaches the limit again, but the render is complete.
        assert_eq!(template.render(&mut out, &context).unwrap(), RenderResult::Done);
        assert_eq!(out.drain(), "bbbb");
    }

    #[test]
    fn test_call_passes_params_lazily() {
        let deferred = Deferred::named("late");
        let templates = CompiledTemplates::builder()
            .template(
                "ns.callee",
                Default::default(),
                TemplateProgram::builder("ns.callee")
                    .text("[")
                    .print_param("x")
                    .text("]")
                    .build(),
            )
            .build()
            .unwrap();
        let context = context(templates);
        let program = TemplateProgram::builder("ns.caller")
            .text("<")
            .call(
                "ns.callee",
                CallData::Params(vec![("x".to_string(), ValueRef::param("late"))]),
            )
            .text(">")
            .build();
        let mut template = program.create(
            record(vec![("late", deferred.clone().into())]),
            Arc::new(SoyRecord::new()),
        );
        let mut out = OutputBuffer::new();

        assert!(template.render(&mut out, &context).unwrap().is_detached());
        assert_eq!(out.as_str(), "<[");
        deferred.set(42i64);
        assert_eq!(template.render(&mut out, &context).unwrap(), RenderResult::Done);
        assert_eq!(out.as_str(), "<[42]>");
    }

    #[test]
    fn test_errors_carry_template_frames() {
        let templates = CompiledTemplates::builder()
            .template(
                "ns.inner",
                Default::default(),
                TemplateProgram::builder("ns.inner")
                    .at(3, 5)
                    .print_with(ValueRef::literal("x"), &["|nope"])
                    .build(),
            )
            .build()
            .unwrap();
        let context = context(templates);
        let program = TemplateProgram::builder("ns.outer")
            .text("ok")
            .at(7, 1)
            .call("ns.inner", CallData::All)
            .build();
        let mut template = program.create(Arc::new(SoyRecord::new()), Arc::new(SoyRecord::new()));
        let err = template
            .render(&mut OutputBuffer::new(), &context)
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Unknown print directive: |nope\n  at ns.inner:3:5\n  at ns.outer:7:1"
        );
    }
}
