//! Date normalization module
//!
//! The crawled sources publish dates in many shapes: Gregorian dates with
//! Arabic month names (two distinct naming traditions), Hijri calendar
//! dates, Arabic-Indic digits, epoch seconds, RFC 3339 timestamps, and
//! ISO-like fragments buried in body text or URLs. This module normalizes
//! all of them to a canonical [`chrono::NaiveDate`] and classifies dates
//! against the rolling cutoff window.

mod arabic;
mod hijri;
mod normalize;

pub use arabic::{fold_digits, month_number, normalize_arabic};
pub use hijri::{hijri_month_number, hijri_to_gregorian};
pub use normalize::{
    date_from_url, normalize, resolve_article_date, scan_text, DateError, DateHint,
};

use chrono::{Datelike, Duration, NaiveDate, Utc};

/// The rolling time horizon shared by all sources during one run
///
/// Computed once at process start; dates strictly before the cutoff are
/// terminal signals. The boundary date itself is not before the cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutoffWindow {
    cutoff: NaiveDate,
    today: NaiveDate,
}

impl CutoffWindow {
    /// Builds the window from the current date and a retention horizon
    pub fn starting_today(retention_days: i64) -> Self {
        Self::at(Utc::now().date_naive(), retention_days)
    }

    /// Builds the window from an explicit reference date (for tests)
    pub fn at(today: NaiveDate, retention_days: i64) -> Self {
        Self {
            cutoff: today - Duration::days(retention_days),
            today,
        }
    }

    pub fn cutoff(&self) -> NaiveDate {
        self.cutoff
    }

    /// True iff the date is strictly before the cutoff
    pub fn is_before_cutoff(&self, date: NaiveDate) -> bool {
        date < self.cutoff
    }

    /// Plausibility guard against mis-extraction: years before 2000 and
    /// dates more than a few days in the future signal a bad parse, not a
    /// real old or future article.
    pub fn is_plausible(&self, date: NaiveDate) -> bool {
        date.year() >= 2000 && date <= self.today + Duration::days(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_cutoff_strictly_before() {
        let window = CutoffWindow::at(ymd(2025, 6, 1), 140);
        let cutoff = window.cutoff();

        assert!(window.is_before_cutoff(cutoff - Duration::days(1)));
        assert!(!window.is_before_cutoff(cutoff + Duration::days(1)));
    }

    #[test]
    fn test_cutoff_boundary_is_not_before() {
        let window = CutoffWindow::at(ymd(2025, 6, 1), 140);
        // D == W is not before the cutoff
        assert!(!window.is_before_cutoff(window.cutoff()));
    }

    #[test]
    fn test_retention_horizon() {
        let window = CutoffWindow::at(ymd(2025, 6, 1), 140);
        assert_eq!(window.cutoff(), ymd(2025, 1, 12));
    }

    #[test]
    fn test_plausibility_rejects_ancient_years() {
        let window = CutoffWindow::at(ymd(2025, 6, 1), 140);
        assert!(!window.is_plausible(ymd(1999, 12, 31)));
        assert!(window.is_plausible(ymd(2000, 1, 1)));
    }

    #[test]
    fn test_plausibility_rejects_far_future() {
        let window = CutoffWindow::at(ymd(2025, 6, 1), 140);
        assert!(window.is_plausible(ymd(2025, 6, 4)));
        assert!(!window.is_plausible(ymd(2025, 6, 5)));
    }
}
