/*
 * render.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Message rendering.
//!
//! A message either starts with a `plural`/`select` part, in which case that
//! part alone determines the output, or it is a flat list of raw text and
//! placeholders. The whole message is assembled before anything reaches the
//! sink, so a missing value never leaves half a message behind.

use crate::bundle::SoyMsg;
use crate::error::{MsgError, MsgResult};
use crate::part::{PluralCaseSpec, SoyMsgPart, lookup_plural_case, lookup_select_case};
use soy_data::AdvisingAppendable;
use std::collections::HashMap;
use std::hash::BuildHasher;

/// Locale used for plural rules when a message carries none.
const DEFAULT_LOCALE: &str = "en";

/// A resolved value for a placeholder, plural or select variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderValue {
    Text(String),
    Number(i64),
}

impl From<&str> for PlaceholderValue {
    fn from(s: &str) -> Self {
        PlaceholderValue::Text(s.to_string())
    }
}

impl From<String> for PlaceholderValue {
    fn from(s: String) -> Self {
        PlaceholderValue::Text(s)
    }
}

impl From<i64> for PlaceholderValue {
    fn from(n: i64) -> Self {
        PlaceholderValue::Number(n)
    }
}

impl From<i32> for PlaceholderValue {
    fn from(n: i32) -> Self {
        PlaceholderValue::Number(i64::from(n))
    }
}

/// Values keyed by placeholder / variable name.
pub type Placeholders = HashMap<String, PlaceholderValue>;

/// Render `msg` with `placeholders` and append the text to `out`.
pub fn render_msg<S: BuildHasher>(
    msg: &SoyMsg,
    placeholders: &HashMap<String, PlaceholderValue, S>,
    out: &mut dyn AdvisingAppendable,
) -> MsgResult<()> {
    let Some(first) = msg.parts().first() else {
        return Ok(());
    };
    let locale = msg.locale().unwrap_or(DEFAULT_LOCALE);
    let mut buf = String::new();

    match first {
        SoyMsgPart::Plural {
            var_name,
            offset,
            cases,
        } => render_plural(var_name, *offset, cases, placeholders, locale, &mut buf)?,
        SoyMsgPart::Select { var_name, cases } => {
            render_select(var_name, cases, placeholders, locale, &mut buf)?
        }
        _ => {
            for part in msg.parts() {
                match part {
                    SoyMsgPart::RawText(text) => buf.push_str(text),
                    SoyMsgPart::Placeholder(name) => write_placeholder(name, placeholders, &mut buf)?,
                    other => {
                        return Err(MsgError::UnexpectedPart {
                            part: other.kind_name(),
                            context: "a message without plural or select",
                        });
                    }
                }
            }
        }
    }

    tracing::trace!(msg_id = msg.id(), bytes = buf.len(), "Rendered message");
    out.append(&buf)?;
    Ok(())
}

fn render_select<S: BuildHasher>(
    var_name: &str,
    cases: &[(Option<String>, Vec<SoyMsgPart>)],
    placeholders: &HashMap<String, PlaceholderValue, S>,
    locale: &str,
    buf: &mut String,
) -> MsgResult<()> {
    let value = select_value(var_name, placeholders)?;
    let parts = lookup_select_case(cases, value).ok_or_else(|| MsgError::NoSelectCase {
        name: var_name.to_string(),
        value: value.to_string(),
    })?;

    for part in parts {
        match part {
            SoyMsgPart::Select { var_name, cases } => {
                render_select(var_name, cases, placeholders, locale, buf)?
            }
            SoyMsgPart::Plural {
                var_name,
                offset,
                cases,
            } => render_plural(var_name, *offset, cases, placeholders, locale, buf)?,
            SoyMsgPart::Placeholder(name) => write_placeholder(name, placeholders, buf)?,
            SoyMsgPart::RawText(text) => buf.push_str(text),
            SoyMsgPart::PluralRemainder => {
                return Err(MsgError::UnexpectedPart {
                    part: "plural remainder",
                    context: "a select case",
                });
            }
        }
    }
    Ok(())
}

fn render_plural<S: BuildHasher>(
    var_name: &str,
    offset: i64,
    cases: &[(PluralCaseSpec, Vec<SoyMsgPart>)],
    placeholders: &HashMap<String, PlaceholderValue, S>,
    locale: &str,
    buf: &mut String,
) -> MsgResult<()> {
    let value = plural_value(var_name, placeholders)?;
    let remainder = value
        .checked_sub(offset)
        .ok_or_else(|| MsgError::PluralOutOfRange {
            name: var_name.to_string(),
            value,
            offset,
        })?;
    let parts = lookup_plural_case(cases, value, remainder, locale).ok_or_else(|| {
        MsgError::NoPluralCase {
            name: var_name.to_string(),
            value,
        }
    })?;

    for part in parts {
        match part {
            SoyMsgPart::Placeholder(name) => write_placeholder(name, placeholders, buf)?,
            SoyMsgPart::RawText(text) => buf.push_str(text),
            SoyMsgPart::PluralRemainder => buf.push_str(&remainder.to_string()),
            nested => {
                return Err(MsgError::UnexpectedPart {
                    part: nested.kind_name(),
                    context: "a plural case",
                });
            }
        }
    }
    Ok(())
}

fn select_value<'a, S: BuildHasher>(
    var_name: &str,
    placeholders: &'a HashMap<String, PlaceholderValue, S>,
) -> MsgResult<&'a str> {
    match placeholders.get(var_name) {
        Some(PlaceholderValue::Text(value)) => Ok(value),
        Some(PlaceholderValue::Number(_)) => Err(MsgError::WrongValueType {
            name: var_name.to_string(),
            expected: "a string",
        }),
        None => Err(MsgError::MissingSelect {
            name: var_name.to_string(),
        }),
    }
}

fn plural_value<S: BuildHasher>(
    var_name: &str,
    placeholders: &HashMap<String, PlaceholderValue, S>,
) -> MsgResult<i64> {
    match placeholders.get(var_name) {
        Some(PlaceholderValue::Number(value)) => Ok(*value),
        Some(PlaceholderValue::Text(_)) => Err(MsgError::WrongValueType {
            name: var_name.to_string(),
            expected: "an integer",
        }),
        None => Err(MsgError::MissingPlural {
            name: var_name.to_string(),
        }),
    }
}

fn write_placeholder<S: BuildHasher>(
    name: &str,
    placeholders: &HashMap<String, PlaceholderValue, S>,
    buf: &mut String,
) -> MsgResult<()> {
    match placeholders.get(name) {
        Some(PlaceholderValue::Text(text)) => buf.push_str(text),
        Some(PlaceholderValue::Number(n)) => buf.push_str(&n.to_string()),
        None => {
            return Err(MsgError::MissingPlaceholder {
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plural::PluralCategory;
    use pretty_assertions::assert_eq;
    use soy_data::OutputBuffer;

    fn render(msg: &SoyMsg, placeholders: &[(&str, PlaceholderValue)]) -> MsgResult<String> {
        let placeholders: Placeholders = placeholders
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        let mut out = OutputBuffer::new();
        render_msg(msg, &placeholders, &mut out)?;
        Ok(out.into_string())
    }

    fn items_msg(locale: &str) -> SoyMsg {
        SoyMsg::new(
            1,
            Some(locale),
            vec![SoyMsgPart::plural(
                "NUM",
                0,
                vec![
                    (
                        PluralCaseSpec::Category(PluralCategory::One),
                        vec![SoyMsgPart::placeholder("NUM_STR"), SoyMsgPart::raw(" item")],
                    ),
                    (
                        PluralCaseSpec::Category(PluralCategory::Other),
                        vec![SoyMsgPart::PluralRemainder, SoyMsgPart::raw(" items")],
                    ),
                ],
            )],
        )
    }

    #[test]
    fn test_empty_message_renders_nothing() {
        let msg = SoyMsg::new(1, None, vec![]);
        assert_eq!(render(&msg, &[]).unwrap(), "");
    }

    #[test]
    fn test_placeholder_message() {
        let msg = SoyMsg::new(
            1,
            None,
            vec![SoyMsgPart::raw("Hello, "), SoyMsgPart::placeholder("name")],
        );
        assert_eq!(
            render(&msg, &[("name", "World".into())]).unwrap(),
            "Hello, World"
        );
    }

    #[test]
    fn test_missing_placeholder_writes_nothing() {
        let msg = SoyMsg::new(
            1,
            None,
            vec![SoyMsgPart::raw("Hello, "), SoyMsgPart::placeholder("name")],
        );
        let mut out = OutputBuffer::new();
        let err = render_msg(&msg, &Placeholders::new(), &mut out).unwrap_err();
        assert_eq!(err.to_string(), "No value provided for placeholder: 'name'");
        assert!(out.is_empty());
    }

    #[test]
    fn test_plural_one_and_other() {
        let msg = items_msg("en");
        assert_eq!(
            render(&msg, &[("NUM", 1i64.into()), ("NUM_STR", "1".into())]).unwrap(),
            "1 item"
        );
        assert_eq!(
            render(&msg, &[("NUM", 5i64.into()), ("NUM_STR", "5".into())]).unwrap(),
            "5 items"
        );
    }

    #[test]
    fn test_plural_uses_message_locale() {
        // In French, 0 is "one".
        let msg = items_msg("fr");
        assert_eq!(
            render(&msg, &[("NUM", 0i64.into()), ("NUM_STR", "0".into())]).unwrap(),
            "0 item"
        );
    }

    #[test]
    fn test_plural_remainder_subtracts_offset() {
        let msg = SoyMsg::new(
            1,
            Some("en"),
            vec![SoyMsgPart::plural(
                "n",
                1,
                vec![
                    (
                        PluralCaseSpec::Explicit(1),
                        vec![SoyMsgPart::placeholder("who"), SoyMsgPart::raw(" went")],
                    ),
                    (
                        PluralCaseSpec::Category(PluralCategory::One),
                        vec![
                            SoyMsgPart::placeholder("who"),
                            SoyMsgPart::raw(" and one other went"),
                        ],
                    ),
                    (
                        PluralCaseSpec::Category(PluralCategory::Other),
                        vec![
                            SoyMsgPart::placeholder("who"),
                            SoyMsgPart::raw(" and "),
                            SoyMsgPart::PluralRemainder,
                            SoyMsgPart::raw(" others went"),
                        ],
                    ),
                ],
            )],
        );
        let who = ("who", PlaceholderValue::from("Ann"));
        assert_eq!(render(&msg, &[("n", 1i64.into()), who.clone()]).unwrap(), "Ann went");
        assert_eq!(
            render(&msg, &[("n", 2i64.into()), who.clone()]).unwrap(),
            "Ann and one other went"
        );
        assert_eq!(
            render(&msg, &[("n", 4i64.into()), who]).unwrap(),
            "Ann and 3 others went"
        );
    }

    #[test]
    fn test_plural_offset_overflow_is_an_error() {
        let msg = SoyMsg::new(
            1,
            Some("en"),
            vec![SoyMsgPart::plural(
                "n",
                1,
                vec![(
                    PluralCaseSpec::Category(PluralCategory::Other),
                    vec![SoyMsgPart::PluralRemainder],
                )],
            )],
        );
        let mut out = OutputBuffer::new();
        let placeholders: Placeholders = [("n".to_string(), PlaceholderValue::Number(i64::MIN))]
            .into_iter()
            .collect();
        let err = render_msg(&msg, &placeholders, &mut out).unwrap_err();
        assert!(matches!(
            err,
            MsgError::PluralOutOfRange { value: i64::MIN, offset: 1, .. }
        ));
        assert!(out.is_empty());

        // Subtracting the offset from the largest value is fine.
        assert_eq!(render(&msg, &[("n", i64::MAX.into())]).unwrap(), (i64::MAX - 1).to_string());
    }

    #[test]
    fn test_nested_select_then_plural() {
        let msg = SoyMsg::new(
            1,
            Some("en"),
            vec![SoyMsgPart::select(
                "gender",
                vec![
                    (
                        Some("female".to_string()),
                        vec![
                            SoyMsgPart::raw("She has "),
                            SoyMsgPart::plural(
                                "n",
                                0,
                                vec![
                                    (
                                        PluralCaseSpec::Category(PluralCategory::One),
                                        vec![SoyMsgPart::raw("one cat")],
                                    ),
                                    (
                                        PluralCaseSpec::Category(PluralCategory::Other),
                                        vec![SoyMsgPart::PluralRemainder, SoyMsgPart::raw(" cats")],
                                    ),
                                ],
                            ),
                        ],
                    ),
                    (None, vec![SoyMsgPart::raw("They have cats")]),
                ],
            )],
        );
        assert_eq!(
            render(&msg, &[("gender", "female".into()), ("n", 3i64.into())]).unwrap(),
            "She has 3 cats"
        );
        assert_eq!(
            render(&msg, &[("gender", "other".into())]).unwrap(),
            "They have cats"
        );
    }

    #[test]
    fn test_missing_and_mistyped_variables() {
        let msg = items_msg("en");
        let err = render(&msg, &[]).unwrap_err();
        assert_eq!(err.to_string(), "No value provided for plural: 'NUM'");

        let err = render(&msg, &[("NUM", "three".into())]).unwrap_err();
        assert!(matches!(err, MsgError::WrongValueType { .. }));

        let select = SoyMsg::new(1, None, vec![SoyMsgPart::select("g", vec![])]);
        let err = render(&select, &[]).unwrap_err();
        assert_eq!(err.to_string(), "No value provided for select: 'g'");
        let err = render(&select, &[("g", "x".into())]).unwrap_err();
        assert!(matches!(err, MsgError::NoSelectCase { .. }));
    }

    #[test]
    fn test_remainder_outside_plural_is_rejected() {
        let msg = SoyMsg::new(1, None, vec![SoyMsgPart::raw("a"), SoyMsgPart::PluralRemainder]);
        let err = render(&msg, &[]).unwrap_err();
        assert!(matches!(
            err,
            MsgError::UnexpectedPart {
                part: "plural remainder",
                ..
            }
        ));
    }
}
