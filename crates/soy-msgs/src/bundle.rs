/*
 * bundle.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Translated messages and bundles of them.

use crate::part::SoyMsgPart;
use std::collections::BTreeMap;

/// A single translated message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoyMsg {
    id: u64,
    locale: Option<String>,
    is_plural_or_select: bool,
    parts: Vec<SoyMsgPart>,
}

impl SoyMsg {
    pub fn new(id: u64, locale: Option<&str>, parts: Vec<SoyMsgPart>) -> Self {
        let is_plural_or_select = parts.iter().any(SoyMsgPart::is_plural_or_select);
        Self {
            id,
            locale: locale.map(str::to_string),
            is_plural_or_select,
            parts,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    /// Whether the message contains a `plural` or `select` part.
    pub fn is_plural_or_select(&self) -> bool {
        self.is_plural_or_select
    }

    pub fn parts(&self) -> &[SoyMsgPart] {
        &self.parts
    }

    /// The same message tagged with a different locale.
    pub fn with_locale(mut self, locale: &str) -> Self {
        self.locale = Some(locale.to_string());
        self
    }
}

/// All translated messages for one locale, keyed by message id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoyMsgBundle {
    locale: Option<String>,
    msgs: BTreeMap<u64, SoyMsg>,
}

impl SoyMsgBundle {
    /// A bundle with no messages and no locale.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a bundle; a later message with a duplicate id replaces the earlier one.
    ///
    /// Messages without a locale of their own take the bundle's locale.
    pub fn new(locale: Option<&str>, msgs: impl IntoIterator<Item = SoyMsg>) -> Self {
        let msgs = msgs
            .into_iter()
            .map(|msg| match (msg.locale(), locale) {
                (None, Some(locale)) => msg.with_locale(locale),
                _ => msg,
            })
            .map(|msg| (msg.id(), msg))
            .collect();
        Self {
            locale: locale.map(str::to_string),
            msgs,
        }
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn msg(&self, id: u64) -> Option<&SoyMsg> {
        self.msgs.get(&id)
    }

    pub fn len(&self) -> usize {
        self.msgs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.msgs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SoyMsg> {
        self.msgs.values()
    }

    /// Re-tag the bundle and every message in it with `locale`.
    ///
    /// Messages extracted from template sources carry no locale, but plural
    /// rules need one.
    pub fn with_locale(self, locale: &str) -> Self {
        Self {
            locale: Some(locale.to_string()),
            msgs: self
                .msgs
                .into_iter()
                .map(|(id, msg)| (id, msg.with_locale(locale)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::part::PluralCaseSpec;

    #[test]
    fn test_detects_plural_or_select() {
        let plain = SoyMsg::new(1, None, vec![SoyMsgPart::raw("hi")]);
        assert!(!plain.is_plural_or_select());

        let plural = SoyMsg::new(
            2,
            None,
            vec![SoyMsgPart::plural(
                "n",
                0,
                vec![("other".parse::<PluralCaseSpec>().unwrap(), vec![])],
            )],
        );
        assert!(plural.is_plural_or_select());
    }

    #[test]
    fn test_new_tags_messages_with_bundle_locale() {
        let bundle = SoyMsgBundle::new(
            Some("fr"),
            [SoyMsg::new(1, None, vec![]), SoyMsg::new(2, Some("fr-CA"), vec![])],
        );
        assert_eq!(bundle.msg(1).unwrap().locale(), Some("fr"));
        assert_eq!(bundle.msg(2).unwrap().locale(), Some("fr-CA"));

        let untagged = SoyMsgBundle::new(None, [SoyMsg::new(1, None, vec![])]);
        assert_eq!(untagged.msg(1).unwrap().locale(), None);
    }

    #[test]
    fn test_with_locale_retags_messages() {
        let bundle = SoyMsgBundle::new(None, [SoyMsg::new(7, None, vec![])]).with_locale("en");
        assert_eq!(bundle.locale(), Some("en"));
        assert_eq!(bundle.msg(7).unwrap().locale(), Some("en"));
        assert!(bundle.msg(8).is_none());
    }
}
