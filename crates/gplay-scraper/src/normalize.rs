//! Free-text normalizers for values scraped out of Play Store markup.
//!
//! Every function here is pure. Lenient parsers (`clean_integer`,
//! `parse_localized_score`) default instead of failing; strict ones
//! (`split_install_range`, `parse_localized_star_rating`) return
//! [`ScraperError::Parse`] because a miss there means the page layout moved.

use std::sync::LazyLock;

use gplay_core::{InstallRange, ANDROID_VERSION_VARY};
use regex::Regex;

use crate::error::ScraperError;

static ANDROID_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9.]+)[^0-9.].+").expect("valid android version regex"));
static LEADING_FLOAT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([+-]?(?:\d+(?:\.\d*)?|\.\d+))").expect("valid leading float regex")
});
static DEFAULT_RATING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-5])").expect("valid rating regex"));
// '5つ星のうち3つ星で評価しました': the out-of count comes first.
static JAPANESE_RATING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-5].*?([0-5])").expect("valid japanese rating regex"));
static USER_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"id=([0-9]*)").expect("valid user id regex"));

/// Install range delimiters, tried in order. The bare hyphen must come after
/// the spaced one so `"1,000 - 5,000"` is not split on the wrong character.
const INSTALL_DELIMITERS: [&str; 5] = [" - ", " et ", "–", "-", "～"];

const FULL_REVIEW_MARKER: &str = "Full Review";

/// Review locale as far as rating phrases are concerned.
///
/// Only Japanese phrases put a number in front of the awarded stars; every
/// other locale seen so far leads with the awarded count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    Japanese,
    #[default]
    Default,
}

impl Locale {
    /// Maps an `hl` language code to its rating locale. Unlisted languages
    /// use the default pattern.
    #[must_use]
    pub fn from_lang(lang: &str) -> Self {
        match lang {
            "ja" => Self::Japanese,
            _ => Self::Default,
        }
    }

    fn rating_pattern(self) -> &'static Regex {
        match self {
            Self::Japanese => &JAPANESE_RATING_RE,
            Self::Default => &DEFAULT_RATING_RE,
        }
    }
}

/// Parses a count by keeping only its ASCII digits, so any thousands
/// separator (`,` `.` `'` narrow spaces) disappears.
///
/// Returns `None` when no digit survives or the value overflows `u64`.
#[must_use]
pub fn clean_integer_checked(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<u64>().ok()
}

/// Like [`clean_integer_checked`] but folds the no-digit case into `0`.
///
/// Counts on the page are display-only, so an empty cell reads as zero.
#[must_use]
pub fn clean_integer(text: &str) -> u64 {
    clean_integer_checked(text).unwrap_or(0)
}

/// Splits an install range into its lower and upper text.
///
/// # Errors
///
/// Returns [`ScraperError::Parse`] for the `installs` field when no delimiter
/// yields exactly two parts.
pub fn split_install_range(text: &str) -> Result<(&str, &str), ScraperError> {
    for delimiter in INSTALL_DELIMITERS {
        let mut parts = text.split(delimiter);
        if let (Some(min), Some(max), None) = (parts.next(), parts.next(), parts.next()) {
            return Ok((min, max));
        }
    }
    Err(ScraperError::parse(
        "installs",
        format!("unable to split min/max installs from '{text}'"),
    ))
}

/// Splits and cleans an install range such as `"10,000 - 50,000"`.
///
/// # Errors
///
/// Propagates [`split_install_range`] failures.
pub fn parse_install_range(text: &str) -> Result<InstallRange, ScraperError> {
    let (min, max) = split_install_range(text)?;
    Ok(InstallRange {
        min: clean_integer(min),
        max: clean_integer(max),
    })
}

/// Pulls the leading dotted version out of text like `"4.1 and up"`.
///
/// Anything that does not start with a version (`"Varies with device"`)
/// becomes [`ANDROID_VERSION_VARY`].
#[must_use]
pub fn normalize_android_version(text: &str) -> String {
    ANDROID_VERSION_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map_or_else(
            || ANDROID_VERSION_VARY.to_owned(),
            |m| m.as_str().to_owned(),
        )
}

/// API level for an Android release, `None` for anything not in the table
/// (including [`ANDROID_VERSION_VARY`]).
#[must_use]
pub fn resolve_sdk_level(version: &str) -> Option<u32> {
    let level = match version {
        "7.0" => 24,
        "6.0" => 23,
        "5.1" => 22,
        "5.0" => 21,
        "4.4" => 19,
        "4.3" => 18,
        "4.2" => 17,
        "4.1" => 16,
        "4.0.3" => 15,
        "4.0" => 14,
        "3.2" => 13,
        "3.1" => 12,
        "3.0" => 11,
        "2.3.3" => 10,
        "2.3" => 9,
        "2.2" => 8,
        "2.1" => 7,
        "2.0.1" => 6,
        "2.0" => 5,
        "1.6" => 4,
        "1.5" => 3,
        "1.1" => 2,
        "1.0" => 1,
        _ => return None,
    };
    Some(level)
}

/// Parses an average score that may use a comma decimal separator
/// (`"4,3"`). Trailing text after the number is ignored; anything
/// unparseable is `0.0`.
#[must_use]
pub fn parse_localized_score(text: &str) -> f64 {
    let normalized = text.replacen(',', ".", 1);
    LEADING_FLOAT_RE
        .captures(&normalized)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|score| score.is_finite())
        .unwrap_or(0.0)
}

/// Reads the awarded stars out of a localized `aria-label` phrase.
///
/// # Errors
///
/// Returns [`ScraperError::Parse`] for the `score` field when the phrase has
/// no star digit.
pub fn parse_localized_star_rating(text: &str, locale: Locale) -> Result<u8, ScraperError> {
    locale
        .rating_pattern()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u8>().ok())
        .ok_or_else(|| {
            ScraperError::parse(
                "score",
                format!("no star rating in '{text}' (locale {locale:?})"),
            )
        })
}

/// Strips the title the page repeats at the start of a review body, then the
/// first "Full Review" link label.
///
/// `title_chars` counts characters, not bytes.
#[must_use]
pub fn filter_review_text(text: &str, title_chars: usize) -> String {
    let rest = text
        .char_indices()
        .nth(title_chars)
        .map_or("", |(offset, _)| &text[offset..]);
    rest.replacen(FULL_REVIEW_MARKER, "", 1).trim().to_owned()
}

/// Numeric profile id from an author link such as
/// `/store/people/details?id=1234567890`.
#[must_use]
pub fn extract_user_id(href: &str) -> Option<String> {
    USER_ID_RE
        .captures(href)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
