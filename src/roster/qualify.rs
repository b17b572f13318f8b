//! Date qualification rule for access removal.
//!
//! A worker qualifies when they have no recent payment AND were hired long
//! enough ago to be out of the on-boarding grace period. A row without a
//! usable hire date never qualifies.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Two-digit years above this pivot are 19xx, the rest 20xx.
const TWO_DIGIT_YEAR_PIVOT: i32 = 68;

/// Two-condition date policy evaluated against a fixed cutoff instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualificationRule {
    cutoff: NaiveDateTime,
}

impl QualificationRule {
    /// Cutoff = local now minus `lookback_days`.
    pub fn from_lookback(lookback_days: u32) -> Self {
        Self::at(Local::now().naive_local() - Duration::days(i64::from(lookback_days)))
    }

    pub fn at(cutoff: NaiveDateTime) -> Self {
        Self { cutoff }
    }

    pub fn cutoff(&self) -> NaiveDateTime {
        self.cutoff
    }

    /// A date counts as "before the cutoff" when its midnight precedes it.
    fn is_before_cutoff(&self, date: NaiveDate) -> bool {
        date.and_time(NaiveTime::MIN) < self.cutoff
    }

    /// `(last_paid absent OR before cutoff) AND (hire present AND before cutoff)`
    pub fn qualifies(&self, last_paid: Option<NaiveDate>, hire: Option<NaiveDate>) -> bool {
        let unpaid = last_paid.map_or(true, |d| self.is_before_cutoff(d));
        let tenured = hire.is_some_and(|d| self.is_before_cutoff(d));
        unpaid && tenured
    }
}

/// Parse a date cell as the sheet displays it (`M/D/YYYY`, `M/D/YY`, or ISO).
///
/// Only the first whitespace-separated token is read, so "3/4/2024 9:00"
/// parses as March 4th. A two-digit year is 2000-2068 or 1969-1999; any
/// other year width is rejected. Blank or malformed text is `None`.
pub fn parse_sheet_date(text: &str) -> Option<NaiveDate> {
    let token = text.split_whitespace().next()?;
    if token.contains('/') {
        return parse_month_day_year(token);
    }
    // %Y alone accepts short years, so pin the ISO shape to YYYY-MM-DD.
    if token.len() == 10 {
        return NaiveDate::parse_from_str(token, "%Y-%m-%d").ok();
    }
    None
}

fn parse_month_day_year(token: &str) -> Option<NaiveDate> {
    let mut parts = token.split('/');
    let (month, day, year) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let numeric = |s: &str, max_len: usize| {
        !s.is_empty() && s.len() <= max_len && s.bytes().all(|b| b.is_ascii_digit())
    };
    if !numeric(month, 2) || !numeric(day, 2) || !numeric(year, 4) {
        return None;
    }

    let year: i32 = match year.len() {
        4 => year.parse().ok()?,
        2 => {
            let short: i32 = year.parse().ok()?;
            if short > TWO_DIGIT_YEAR_PIVOT {
                1900 + short
            } else {
                2000 + short
            }
        }
        _ => return None,
    };

    NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rule_at_2024_01_01() -> QualificationRule {
        QualificationRule::at(date(2024, 1, 1).and_hms_opt(0, 0, 0).unwrap())
    }

    #[test]
    fn test_unpaid_and_tenured_qualifies() {
        let rule = rule_at_2024_01_01();
        assert!(rule.qualifies(None, Some(date(2023, 1, 1))));
    }

    #[test]
    fn test_recent_payment_does_not_qualify() {
        let rule = rule_at_2024_01_01();
        assert!(!rule.qualifies(Some(date(2024, 6, 1)), Some(date(2023, 1, 1))));
    }

    #[test]
    fn test_recent_hire_does_not_qualify() {
        let rule = rule_at_2024_01_01();
        assert!(!rule.qualifies(None, Some(date(2024, 6, 1))));
    }

    #[test]
    fn test_stale_payment_qualifies() {
        let rule = rule_at_2024_01_01();
        assert!(rule.qualifies(Some(date(2023, 10, 15)), Some(date(2022, 5, 2))));
    }

    #[test]
    fn test_missing_hire_never_qualifies() {
        let rule = rule_at_2024_01_01();
        for last_paid in [None, Some(date(2020, 1, 1)), Some(date(2025, 1, 1))] {
            assert!(!rule.qualifies(last_paid, None));
        }
    }

    #[test]
    fn test_cutoff_day_boundary() {
        // Cutoff mid-afternoon: that day's midnight is already before it.
        let cutoff = date(2024, 1, 1).and_hms_opt(15, 30, 0).unwrap();
        let rule = QualificationRule::at(cutoff);
        assert!(rule.qualifies(None, Some(date(2024, 1, 1))));
        assert!(!rule.qualifies(None, Some(date(2024, 1, 2))));

        // Exactly midnight: the cutoff day itself is not "before".
        let rule = rule_at_2024_01_01();
        assert!(!rule.qualifies(None, Some(date(2024, 1, 1))));
        assert!(rule.qualifies(None, Some(date(2023, 12, 31))));
    }

    #[test]
    fn test_from_lookback_cutoff_is_in_the_past() {
        let rule = QualificationRule::from_lookback(60);
        let now = Local::now().naive_local();
        let diff = now - rule.cutoff();
        assert!(diff >= Duration::days(60));
        assert!(diff < Duration::days(61));
    }

    #[test]
    fn test_parse_sheet_date_formats() {
        assert_eq!(parse_sheet_date("3/4/2024"), Some(date(2024, 3, 4)));
        assert_eq!(parse_sheet_date("03/04/2024"), Some(date(2024, 3, 4)));
        assert_eq!(parse_sheet_date(" 12/31/2023 "), Some(date(2023, 12, 31)));
        assert_eq!(parse_sheet_date("2023-01-01"), Some(date(2023, 1, 1)));
        assert_eq!(parse_sheet_date("3/4/2024 9:00 AM"), Some(date(2024, 3, 4)));
    }

    #[test]
    fn test_parse_two_digit_year() {
        assert_eq!(parse_sheet_date("6/1/24"), Some(date(2024, 6, 1)));
        assert_eq!(parse_sheet_date("12/31/68"), Some(date(2068, 12, 31)));
        assert_eq!(parse_sheet_date("1/1/69"), Some(date(1969, 1, 1)));
        assert_eq!(parse_sheet_date("07/04/99"), Some(date(1999, 7, 4)));
    }

    #[test]
    fn test_recent_two_digit_payment_is_not_revoked() {
        let rule = rule_at_2024_01_01();
        let paid = parse_sheet_date("6/1/24");
        let hire = parse_sheet_date("1/1/23");
        assert!(!rule.qualifies(paid, hire));
    }

    #[test]
    fn test_parse_rejects_odd_year_widths() {
        assert_eq!(parse_sheet_date("6/1/4"), None);
        assert_eq!(parse_sheet_date("6/1/024"), None);
        assert_eq!(parse_sheet_date("6/1/20245"), None);
        assert_eq!(parse_sheet_date("24-06-01"), None);
        assert_eq!(parse_sheet_date("6/1/2024/7"), None);
        assert_eq!(parse_sheet_date("6//2024"), None);
    }

    #[test]
    fn test_parse_sheet_date_invalid() {
        assert_eq!(parse_sheet_date(""), None);
        assert_eq!(parse_sheet_date("   "), None);
        assert_eq!(parse_sheet_date("N/A"), None);
        assert_eq!(parse_sheet_date("2/30/2024"), None);
        assert_eq!(parse_sheet_date("next week"), None);
    }

    #[test]
    fn test_invalid_payment_text_counts_as_unpaid() {
        let rule = rule_at_2024_01_01();
        let paid = parse_sheet_date("pending");
        let hire = parse_sheet_date("1/1/2023");
        assert!(rule.qualifies(paid, hire));
    }
}
