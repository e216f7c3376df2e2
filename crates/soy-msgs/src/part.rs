/*
 * part.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Message parts.

use crate::error::{MsgError, MsgResult};
use crate::plural::PluralCategory;
use std::fmt;
use std::str::FromStr;

/// Label of one case of a plural part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralCaseSpec {
    /// `=N`: matches the raw (un-offset) value exactly.
    Explicit(u32),
    /// A locale plural category, matched against `value - offset`.
    Category(PluralCategory),
}

impl PluralCaseSpec {
    pub fn is_other(self) -> bool {
        self == PluralCaseSpec::Category(PluralCategory::Other)
    }
}

impl FromStr for PluralCaseSpec {
    type Err = MsgError;

    /// Parse `=3`, `one`, `OTHER`, ...
    fn from_str(s: &str) -> MsgResult<Self> {
        let invalid = || MsgError::InvalidPluralCase {
            spec: s.to_string(),
        };
        match s.strip_prefix('=') {
            Some(number) => number
                .parse::<u32>()
                .map(PluralCaseSpec::Explicit)
                .map_err(|_| invalid()),
            None => PluralCategory::parse(s)
                .map(PluralCaseSpec::Category)
                .ok_or_else(invalid),
        }
    }
}

impl fmt::Display for PluralCaseSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluralCaseSpec::Explicit(n) => write!(f, "={n}"),
            PluralCaseSpec::Category(category) => f.write_str(category.as_str()),
        }
    }
}

/// One element of a translated message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoyMsgPart {
    /// Text written verbatim.
    RawText(String),

    /// A named value supplied at render time.
    Placeholder(String),

    /// Chooses a case by the plural category of a numeric variable.
    Plural {
        var_name: String,
        offset: i64,
        cases: Vec<(PluralCaseSpec, Vec<SoyMsgPart>)>,
    },

    /// Chooses a case by exact string match; `None` is the default case.
    Select {
        var_name: String,
        cases: Vec<(Option<String>, Vec<SoyMsgPart>)>,
    },

    /// Inside a plural case: the plural value minus the offset.
    PluralRemainder,
}

impl SoyMsgPart {
    pub fn raw(text: impl Into<String>) -> Self {
        SoyMsgPart::RawText(text.into())
    }

    pub fn placeholder(name: impl Into<String>) -> Self {
        SoyMsgPart::Placeholder(name.into())
    }

    pub fn plural(
        var_name: impl Into<String>,
        offset: i64,
        cases: Vec<(PluralCaseSpec, Vec<SoyMsgPart>)>,
    ) -> Self {
        SoyMsgPart::Plural {
            var_name: var_name.into(),
            offset,
            cases,
        }
    }

    pub fn select(
        var_name: impl Into<String>,
        cases: Vec<(Option<String>, Vec<SoyMsgPart>)>,
    ) -> Self {
        SoyMsgPart::Select {
            var_name: var_name.into(),
            cases,
        }
    }

    /// Whether this is a `plural` or `select` part.
    pub fn is_plural_or_select(&self) -> bool {
        matches!(self, SoyMsgPart::Plural { .. } | SoyMsgPart::Select { .. })
    }

    /// Short name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            SoyMsgPart::RawText(_) => "raw text",
            SoyMsgPart::Placeholder(_) => "placeholder",
            SoyMsgPart::Plural { .. } => "plural",
            SoyMsgPart::Select { .. } => "select",
            SoyMsgPart::PluralRemainder => "plural remainder",
        }
    }
}

/// Pick the parts of a plural case.
///
/// Explicit `=N` cases are checked first against the raw value. Otherwise
/// the category of `remainder` (the value minus the plural offset) in
/// `locale` is looked up, and finally the `other` case.
pub(crate) fn lookup_plural_case<'a>(
    cases: &'a [(PluralCaseSpec, Vec<SoyMsgPart>)],
    value: i64,
    remainder: i64,
    locale: &str,
) -> Option<&'a [SoyMsgPart]> {
    let explicit = cases.iter().find(|(spec, _)| match spec {
        PluralCaseSpec::Explicit(n) => i64::from(*n) == value,
        PluralCaseSpec::Category(_) => false,
    });
    if let Some((_, parts)) = explicit {
        return Some(parts);
    }

    let category = crate::plural::plural_category(locale, remainder);
    cases
        .iter()
        .find(|(spec, _)| *spec == PluralCaseSpec::Category(category))
        .or_else(|| cases.iter().find(|(spec, _)| spec.is_other()))
        .map(|(_, parts)| parts.as_slice())
}

/// Pick the parts of a select case: exact match first, then the default.
pub(crate) fn lookup_select_case<'a>(
    cases: &'a [(Option<String>, Vec<SoyMsgPart>)],
    value: &str,
) -> Option<&'a [SoyMsgPart]> {
    cases
        .iter()
        .find(|(label, _)| label.as_deref() == Some(value))
        .or_else(|| cases.iter().find(|(label, _)| label.is_none()))
        .map(|(_, parts)| parts.as_slice())
}
