//! Date normalization and article-date resolution
//!
//! Publication dates are assumed to appear early in body text; dates deep
//! in an article are more likely historical references, so the free-text
//! scan only looks at the first ~500 characters before falling back to
//! URL segments and loose ISO-shaped substrings.

use crate::dates::arabic::{
    fold_digits, month_alternation, month_number, normalize_arabic, weekday_alternation,
};
use crate::dates::hijri::{hijri_month_number, hijri_to_gregorian, HIJRI_MONTHS};
use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Errors produced by date normalization
///
/// Callers treat any of these as "too old" (fail safe toward not ingesting
/// unverifiable dates).
#[derive(Debug, Error)]
pub enum DateError {
    #[error("unparseable date '{0}'")]
    Unparseable(String),

    #[error("no date found")]
    NotFound,
}

/// Format hint supplied by the adapter that produced the raw string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateHint {
    /// Gregorian date written with Arabic month names (either table)
    ArabicText,

    /// Hijri calendar date (`day/month-name/year`)
    Hijri,

    /// `YYYY-MM-DD`-shaped string
    IsoLike,

    /// Unix epoch seconds
    EpochSeconds,

    /// RFC 3339 timestamp
    Rfc3339,

    /// Unknown; every parser is tried
    #[default]
    Unspecified,
}

/// `D MonthName YYYY`, optionally prefixed by a weekday
static TEXTUAL: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?:يوم\s+)?(?:(?:{weekdays})\s+)?(\d{{1,2}})\s+({months})\s+(\d{{4}})",
        weekdays = weekday_alternation(),
        months = month_alternation(),
    );
    Regex::new(&pattern).expect("textual date pattern")
});

/// Hijri `day/month-name/year`
static HIJRI_TEXTUAL: Lazy<Regex> = Lazy::new(|| {
    let mut names: Vec<&str> = HIJRI_MONTHS.iter().map(|(name, _)| *name).collect();
    names.sort_by_key(|name| std::cmp::Reverse(name.len()));
    let pattern = format!(
        r"(\d{{1,2}})\s*/\s*({months})\s*/\s*(\d{{3,4}})",
        months = names.join("|"),
    );
    Regex::new(&pattern).expect("hijri date pattern")
});

/// Whole-string ISO date
static ISO_ANCHORED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").expect("iso date pattern"));

/// ISO-shaped fragment anywhere in text or a URL path
static ISO_LOOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})[-/](\d{1,2})[-/](\d{1,2})").expect("loose iso pattern"));

/// Whole-string `D-M-YYYY` or `D/M/YYYY`
static NUMERIC_DMY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})[-/](\d{1,2})[-/](\d{4})$").expect("numeric dmy pattern"));

/// Normalizes a locale-specific date string to a calendar date
///
/// Arabic-Indic digits are folded and the text lightly normalized before
/// parsing. With `DateHint::Unspecified` every parser is tried in order of
/// decreasing specificity.
pub fn normalize(raw: &str, hint: DateHint) -> Result<NaiveDate, DateError> {
    let text = normalize_arabic(&fold_digits(raw));
    if text.is_empty() {
        return Err(DateError::Unparseable(raw.to_string()));
    }

    let parsed = match hint {
        DateHint::ArabicText => parse_textual(&text),
        DateHint::Hijri => parse_hijri_textual(&text),
        DateHint::IsoLike => parse_iso(&text),
        DateHint::EpochSeconds => parse_epoch(&text),
        DateHint::Rfc3339 => parse_rfc3339(&text),
        DateHint::Unspecified => parse_iso(&text)
            .or_else(|| parse_rfc3339(&text))
            .or_else(|| parse_textual(&text))
            .or_else(|| parse_hijri_textual(&text))
            .or_else(|| parse_numeric_dmy(&text))
            .or_else(|| parse_epoch(&text)),
    };

    parsed.ok_or_else(|| DateError::Unparseable(raw.to_string()))
}

/// Scans free text for the first recognizable date
///
/// Tries Arabic textual dates first, then ISO-shaped fragments.
pub fn scan_text(text: &str) -> Option<NaiveDate> {
    let folded = fold_digits(text);

    if let Some(captures) = TEXTUAL.captures(&folded) {
        let month = month_number(&captures[2])?;
        return ymd(&captures[1], month, &captures[3]);
    }

    if let Some(captures) = ISO_LOOSE.captures(&folded) {
        let month: u32 = captures[2].parse().ok()?;
        return ymd(&captures[3], month, &captures[1]);
    }

    None
}

/// Extracts a date from a URL path segment
///
/// Four-digit years in the 1300s-1400s are Hijri-looking and converted;
/// years 1990-2099 are taken as Gregorian.
pub fn date_from_url(url: &str) -> Option<NaiveDate> {
    let captures = ISO_LOOSE.captures(url)?;
    let year: i32 = captures[1].parse().ok()?;
    let month: u32 = captures[2].parse().ok()?;
    let day: u32 = captures[3].parse().ok()?;

    if (1300..1500).contains(&year) {
        hijri_to_gregorian(year, month, day)
    } else if (1990..=2099).contains(&year) {
        NaiveDate::from_ymd_opt(year, month, day)
    } else {
        None
    }
}

/// Resolves an article's publication date through the fallback chain
///
/// 1. The explicit raw date field supplied by the adapter
/// 2. A regex scan of the first ~500 characters of body text
/// 3. A date-shaped URL path segment
/// 4. A loose `YYYY-MM-DD` substring anywhere in the body
pub fn resolve_article_date(
    raw: Option<&str>,
    body: &str,
    url: &str,
    hint: DateHint,
) -> Result<NaiveDate, DateError> {
    if let Some(raw) = raw {
        if let Ok(date) = normalize(raw, hint) {
            return Ok(date);
        }
    }

    let head: String = body.chars().take(500).collect();
    if let Some(date) = scan_text(&head) {
        return Ok(date);
    }

    if let Some(date) = date_from_url(url) {
        return Ok(date);
    }

    let folded = fold_digits(body);
    if let Some(captures) = ISO_LOOSE.captures(&folded) {
        if let Some(date) = ymd_ordered(&captures[1], &captures[2], &captures[3]) {
            return Ok(date);
        }
    }

    Err(DateError::NotFound)
}

fn parse_textual(text: &str) -> Option<NaiveDate> {
    let captures = TEXTUAL.captures(text)?;
    let month = month_number(&captures[2])?;
    ymd(&captures[1], month, &captures[3])
}

fn parse_hijri_textual(text: &str) -> Option<NaiveDate> {
    let captures = HIJRI_TEXTUAL.captures(text)?;
    let day: u32 = captures[1].parse().ok()?;
    let month = hijri_month_number(&captures[2])?;
    let year: i32 = captures[3].parse().ok()?;
    hijri_to_gregorian(year, month, day)
}

fn parse_iso(text: &str) -> Option<NaiveDate> {
    let captures = ISO_ANCHORED.captures(text)?;
    ymd_ordered(&captures[1], &captures[2], &captures[3])
}

fn parse_rfc3339(text: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.date_naive())
}

fn parse_epoch(text: &str) -> Option<NaiveDate> {
    if !(9..=11).contains(&text.len()) || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let seconds: i64 = text.parse().ok()?;
    DateTime::from_timestamp(seconds, 0).map(|dt| dt.date_naive())
}

fn parse_numeric_dmy(text: &str) -> Option<NaiveDate> {
    let captures = NUMERIC_DMY.captures(text)?;
    let month: u32 = captures[2].parse().ok()?;
    ymd(&captures[1], month, &captures[3])
}

fn ymd(day: &str, month: u32, year: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month, day.parse().ok()?)
}

fn ymd_ordered(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_normalize_arabic_textual() {
        assert_eq!(
            normalize("15 يناير 2024", DateHint::ArabicText).unwrap(),
            date(2024, 1, 15)
        );
    }

    #[test]
    fn test_normalize_arabic_indic_digits() {
        assert_eq!(
            normalize("١٥ يناير ٢٠٢٤", DateHint::ArabicText).unwrap(),
            date(2024, 1, 15)
        );
    }

    #[test]
    fn test_normalize_levantine_month() {
        assert_eq!(
            normalize("3 كانون الثاني 2025", DateHint::ArabicText).unwrap(),
            date(2025, 1, 3)
        );
        assert_eq!(
            normalize("21 تشرين الأول 2024", DateHint::ArabicText).unwrap(),
            date(2024, 10, 21)
        );
    }

    #[test]
    fn test_normalize_with_weekday_prefix() {
        assert_eq!(
            normalize("الخميس 8 أغسطس 2024", DateHint::ArabicText).unwrap(),
            date(2024, 8, 8)
        );
        assert_eq!(
            normalize("يوم الجمعة 9 أغسطس 2024", DateHint::ArabicText).unwrap(),
            date(2024, 8, 9)
        );
    }

    #[test]
    fn test_normalize_ambiguous_hint_tries_both_tables() {
        assert_eq!(
            normalize("15 يناير 2024", DateHint::Unspecified).unwrap(),
            date(2024, 1, 15)
        );
        assert_eq!(
            normalize("15 كانون الثاني 2024", DateHint::Unspecified).unwrap(),
            date(2024, 1, 15)
        );
    }

    #[test]
    fn test_normalize_hijri() {
        let result = normalize("15/رمضان/1445", DateHint::Hijri).unwrap();
        // Mid-Ramadan 1445 is late March 2024
        assert_eq!(result.format("%Y-%m").to_string(), "2024-03");
    }

    #[test]
    fn test_normalize_iso() {
        assert_eq!(
            normalize("2024-08-03", DateHint::IsoLike).unwrap(),
            date(2024, 8, 3)
        );
    }

    #[test]
    fn test_normalize_rfc3339() {
        assert_eq!(
            normalize("2024-01-15T10:30:00Z", DateHint::Rfc3339).unwrap(),
            date(2024, 1, 15)
        );
    }

    #[test]
    fn test_normalize_epoch_seconds() {
        // 2024-01-15 00:00:00 UTC
        assert_eq!(
            normalize("1705276800", DateHint::EpochSeconds).unwrap(),
            date(2024, 1, 15)
        );
    }

    #[test]
    fn test_normalize_numeric_dmy() {
        assert_eq!(
            normalize("03/08/2024", DateHint::Unspecified).unwrap(),
            date(2024, 8, 3)
        );
    }

    #[test]
    fn test_normalize_malformed_is_error() {
        assert!(normalize("not a date", DateHint::ArabicText).is_err());
        assert!(normalize("", DateHint::Unspecified).is_err());
        assert!(normalize("15 notamonth 2024", DateHint::ArabicText).is_err());
    }

    #[test]
    fn test_scan_text_finds_early_date() {
        let body = "صدر بيان بتاريخ 3 أغسطس 2024 عن الوزارة حول الأحداث";
        assert_eq!(scan_text(body), Some(date(2024, 8, 3)));
    }

    #[test]
    fn test_scan_text_iso_fallback() {
        assert_eq!(
            scan_text("published 2024-05-20 by the ministry"),
            Some(date(2024, 5, 20))
        );
    }

    #[test]
    fn test_scan_text_no_date() {
        assert_eq!(scan_text("no dates here at all"), None);
    }

    #[test]
    fn test_date_from_url_gregorian() {
        assert_eq!(
            date_from_url("https://example.com/news/2024/05/20/article"),
            Some(date(2024, 5, 20))
        );
        assert_eq!(
            date_from_url("https://example.com/post-2024-05-20.html"),
            Some(date(2024, 5, 20))
        );
    }

    #[test]
    fn test_date_from_url_hijri_segment() {
        // 1446/01/01 is a Hijri-looking year, converted to mid-2024
        let result = date_from_url("https://example.com/1446/01/01/statement").unwrap();
        assert_eq!(result.format("%Y").to_string(), "2024");
    }

    #[test]
    fn test_date_from_url_rejects_other_numbers() {
        assert_eq!(date_from_url("https://example.com/1234/56/78"), None);
        assert_eq!(date_from_url("https://example.com/article"), None);
    }

    #[test]
    fn test_resolve_prefers_explicit_field() {
        let result = resolve_article_date(
            Some("15 يناير 2024"),
            "body mentions 2020-01-01 too",
            "https://example.com/a",
            DateHint::ArabicText,
        )
        .unwrap();
        assert_eq!(result, date(2024, 1, 15));
    }

    #[test]
    fn test_resolve_falls_back_to_body_scan() {
        let result = resolve_article_date(
            None,
            "نشر في 3 أغسطس 2024 ويتناول البيان",
            "https://example.com/a",
            DateHint::Unspecified,
        )
        .unwrap();
        assert_eq!(result, date(2024, 8, 3));
    }

    #[test]
    fn test_resolve_falls_back_to_url() {
        let result = resolve_article_date(
            None,
            "no dates in the body",
            "https://example.com/2024/05/20/a",
            DateHint::Unspecified,
        )
        .unwrap();
        assert_eq!(result, date(2024, 5, 20));
    }

    #[test]
    fn test_resolve_deep_body_iso_is_last_resort() {
        let deep_body = format!("{}عقد في 2024-05-20 اجتماع", "كلمة ".repeat(200));
        let result = resolve_article_date(
            None,
            &deep_body,
            "https://example.com/a",
            DateHint::Unspecified,
        )
        .unwrap();
        assert_eq!(result, date(2024, 5, 20));
    }

    #[test]
    fn test_resolve_nothing_found() {
        let result = resolve_article_date(
            None,
            "no dates anywhere",
            "https://example.com/a",
            DateHint::Unspecified,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_unparseable_raw_falls_through() {
        let result = resolve_article_date(
            Some("garbage"),
            "نشر في 3 أغسطس 2024",
            "https://example.com/a",
            DateHint::ArabicText,
        )
        .unwrap();
        assert_eq!(result, date(2024, 8, 3));
    }
}
