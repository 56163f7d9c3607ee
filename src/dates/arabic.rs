//! Arabic month tables and text folding
//!
//! Two distinct Gregorian month-name traditions appear across the sources:
//! the transliterated "solar" names (used in the Gulf and Egypt) and the
//! Levantine names (used in Jordan, Syria, Lebanon, Iraq). Both map to the
//! same month numbers and both must be tried when a date's origin is
//! ambiguous.

/// Transliterated Gregorian month names
pub(crate) const SOLAR_MONTHS: [(&str, u32); 12] = [
    ("يناير", 1),
    ("فبراير", 2),
    ("مارس", 3),
    ("أبريل", 4),
    ("مايو", 5),
    ("يونيو", 6),
    ("يوليو", 7),
    ("أغسطس", 8),
    ("سبتمبر", 9),
    ("أكتوبر", 10),
    ("نوفمبر", 11),
    ("ديسمبر", 12),
];

/// Levantine Gregorian month names
pub(crate) const LEVANTINE_MONTHS: [(&str, u32); 12] = [
    ("كانون الثاني", 1),
    ("شباط", 2),
    ("آذار", 3),
    ("نيسان", 4),
    ("أيار", 5),
    ("حزيران", 6),
    ("تموز", 7),
    ("آب", 8),
    ("أيلول", 9),
    ("تشرين الأول", 10),
    ("تشرين الثاني", 11),
    ("كانون الأول", 12),
];

/// Weekday names that may prefix a textual date
pub(crate) const WEEKDAYS: [&str; 8] = [
    "السبت",
    "الأحد",
    "الاثنين",
    "الإثنين",
    "الثلاثاء",
    "الأربعاء",
    "الخميس",
    "الجمعة",
];

/// Replaces Arabic-Indic digits (U+0660..U+0669) with ASCII digits
pub fn fold_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '٠'..='٩' => char::from_u32('0' as u32 + (c as u32 - '٠' as u32)).unwrap_or(c),
            _ => c,
        })
        .collect()
}

/// Looks up a Gregorian month number by Arabic name, trying the solar
/// table first and the Levantine table second
pub fn month_number(name: &str) -> Option<u32> {
    let name = name.trim();
    SOLAR_MONTHS
        .iter()
        .chain(LEVANTINE_MONTHS.iter())
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, number)| *number)
}

/// Light Arabic text normalization: strips the tatweel stretching mark and
/// collapses runs of whitespace
pub fn normalize_arabic(text: &str) -> String {
    let stripped: String = text.chars().filter(|c| *c != 'ـ').collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Builds a regex alternation of every known month name, longest first so
/// multi-word Levantine names match before their prefixes
pub(crate) fn month_alternation() -> String {
    let mut names: Vec<&str> = SOLAR_MONTHS
        .iter()
        .chain(LEVANTINE_MONTHS.iter())
        .map(|(name, _)| *name)
        .collect();
    names.sort_by_key(|name| std::cmp::Reverse(name.len()));
    names.join("|")
}

/// Builds a regex alternation of weekday names
pub(crate) fn weekday_alternation() -> String {
    WEEKDAYS.join("|")
}
