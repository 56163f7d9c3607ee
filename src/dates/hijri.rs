//! Hijri (Islamic) calendar conversion
//!
//! Conversion uses the tabular arithmetic calendar with the civil epoch
//! (1 Muharram 1 AH = 16 July 622 CE, JDN 1948440). The tabular calendar
//! can differ from the observational Umm al-Qura calendar by a day, which
//! is acceptable against a cutoff horizon measured in months.

use chrono::NaiveDate;

/// Hijri month names with common orthographic variants
pub(crate) const HIJRI_MONTHS: [(&str, u32); 16] = [
    ("محرم", 1),
    ("صفر", 2),
    ("ربيع الأول", 3),
    ("ربيع الثاني", 4),
    ("جمادى الأولى", 5),
    ("جمادى الأولىٰ", 5),
    ("جمادى الآخرة", 6),
    ("جمادى الثانية", 6),
    ("رجب", 7),
    ("شعبان", 8),
    ("رمضان", 9),
    ("شوال", 10),
    ("ذو القعدة", 11),
    ("ذو القعدہ", 11),
    ("ذو الحجة", 12),
    ("ذو الحجہ", 12),
];

/// Julian day number of 1 Muharram 1 AH (civil epoch)
const HIJRI_EPOCH_JDN: i64 = 1_948_440;

/// Offset between Julian day numbers and chrono's days-from-CE
const JDN_TO_DAYS_FROM_CE: i64 = 1_721_425;

/// Looks up a Hijri month number by Arabic name
pub fn hijri_month_number(name: &str) -> Option<u32> {
    let name = name.trim();
    HIJRI_MONTHS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, number)| *number)
}

/// Converts a tabular Hijri date to a Gregorian date
///
/// Returns None for out-of-range components (month outside 1..=12, day
/// outside 1..=30, or a year that converts outside chrono's range).
pub fn hijri_to_gregorian(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    if !(1..=12).contains(&month) || !(1..=30).contains(&day) || year < 1 {
        return None;
    }

    let year = year as i64;
    let month = month as i64;
    let day = day as i64;

    let jdn = (11 * year + 3) / 30 + 354 * year + 30 * month - (month - 1) / 2 + day
        + HIJRI_EPOCH_JDN
        - 385;

    let days_from_ce = jdn - JDN_TO_DAYS_FROM_CE;
    NaiveDate::from_num_days_from_ce_opt(i32::try_from(days_from_ce).ok()?)
}
