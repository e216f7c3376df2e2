/*
 * plural.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Plural categories for integer values.
//!
//! The rules follow CLDR's cardinal rules restricted to integers, grouped
//! into the families that cover the locales we ship translations for.
//! Locales we do not know fall back to the English rule.

use std::fmt;

/// A CLDR plural category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralCategory {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

impl PluralCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            PluralCategory::Zero => "zero",
            PluralCategory::One => "one",
            PluralCategory::Two => "two",
            PluralCategory::Few => "few",
            PluralCategory::Many => "many",
            PluralCategory::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<PluralCategory> {
        match s.to_ascii_lowercase().as_str() {
            "zero" => Some(PluralCategory::Zero),
            "one" => Some(PluralCategory::One),
            "two" => Some(PluralCategory::Two),
            "few" => Some(PluralCategory::Few),
            "many" => Some(PluralCategory::Many),
            "other" => Some(PluralCategory::Other),
            _ => None,
        }
    }
}

impl fmt::Display for PluralCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleFamily {
    /// one: 1
    English,
    /// one: 0, 1
    French,
    /// other only
    NoPlural,
    /// one: x1 (not x11), few: x2-x4 (not x12-x14), many: rest
    EastSlavic,
    /// one: x1 (not x11), few: x2-x4 (not x12-x14), other: rest
    SouthSlavic,
    /// one: 1, few: x2-x4 (not x12-x14), many: rest
    Polish,
    /// one: 1, few: 2-4
    Czech,
    /// one: 1, two: 2
    Hebrew,
    /// zero, one, two, few: x03-x10, many: x11-x99
    Arabic,
}

fn rule_family(locale: &str) -> RuleFamily {
    let language = locale
        .split(['-', '_'])
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    match language.as_str() {
        "fr" | "pt" | "hi" | "bn" | "fa" | "am" | "zu" => RuleFamily::French,
        "ja" | "zh" | "ko" | "th" | "vi" | "id" | "ms" | "lo" | "my" => RuleFamily::NoPlural,
        "ru" | "uk" | "be" => RuleFamily::EastSlavic,
        "sr" | "hr" | "bs" | "sh" => RuleFamily::SouthSlavic,
        "pl" => RuleFamily::Polish,
        "cs" | "sk" => RuleFamily::Czech,
        "he" | "iw" => RuleFamily::Hebrew,
        "ar" => RuleFamily::Arabic,
        _ => RuleFamily::English,
    }
}

/// Classify an integer for the given locale.
pub fn plural_category(locale: &str, value: i64) -> PluralCategory {
    let n = value.unsigned_abs();
    let mod10 = n % 10;
    let mod100 = n % 100;
    let slavic_few = (2..=4).contains(&mod10) && !(12..=14).contains(&mod100);

    match rule_family(locale) {
        RuleFamily::English => match n {
            1 => PluralCategory::One,
            _ => PluralCategory::Other,
        },
        RuleFamily::French => match n {
            0 | 1 => PluralCategory::One,
            _ => PluralCategory::Other,
        },
        RuleFamily::NoPlural => PluralCategory::Other,
        RuleFamily::EastSlavic => {
            if mod10 == 1 && mod100 != 11 {
                PluralCategory::One
            } else if slavic_few {
                PluralCategory::Few
            } else {
                PluralCategory::Many
            }
        }
        RuleFamily::SouthSlavic => {
            if mod10 == 1 && mod100 != 11 {
                PluralCategory::One
            } else if slavic_few {
                PluralCategory::Few
            } else {
                PluralCategory::Other
            }
        }
        RuleFamily::Polish => {
            if n == 1 {
                PluralCategory::One
            } else if slavic_few {
                PluralCategory::Few
            } else {
                PluralCategory::Many
            }
        }
        RuleFamily::Czech => match n {
            1 => PluralCategory::One,
            2..=4 => PluralCategory::Few,
            _ => PluralCategory::Other,
        },
        RuleFamily::Hebrew => match n {
            1 => PluralCategory::One,
            2 => PluralCategory::Two,
            _ => PluralCategory::Other,
        },
        RuleFamily::Arabic => match (n, mod100) {
            (0, _) => PluralCategory::Zero,
            (1, _) => PluralCategory::One,
            (2, _) => PluralCategory::Two,
            (_, 3..=10) => PluralCategory::Few,
            (_, 11..=99) => PluralCategory::Many,
            _ => PluralCategory::Other,
        },
    }
}
