//! Date formats and week-window math.
//!
//! All record dates are entered and stored as `DD/MM/YYYY` strings (exams may
//! carry an optional ` HH:MM` suffix).  Parsing is lenient at the edges of the
//! system — a record with an unparseable date simply falls out of bounded
//! filter windows instead of producing an error.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};

pub const DATE_FMT: &str = "%d/%m/%Y";
pub const DATE_TIME_FMT: &str = "%d/%m/%Y %H:%M";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FMT).to_string()
}

/// Parse a date in the strict `DD/MM/YYYY` entry format.
pub fn parse_strict_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FMT).ok()
}

/// Parse an exam date: `DD/MM/YYYY HH:MM` first, then bare `DD/MM/YYYY`.
pub fn parse_exam_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, DATE_TIME_FMT) {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(value, DATE_FMT).ok()
}

/// Monday of the week containing `date`.
pub fn week_start_of(date: NaiveDate) -> NaiveDate {
    let back = date.weekday().num_days_from_monday() as u64;
    date - Days::new(back)
}

/// Width of the active filter window, in whole weeks or unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekSpan {
    All,
    Weeks(u8),
}

impl WeekSpan {
    /// Decode the persisted raw value: `-1` = all, `1..=4` pass through,
    /// anything else falls back to a single week.
    pub fn from_raw(value: i64) -> Self {
        match value {
            -1 => WeekSpan::All,
            1..=4 => WeekSpan::Weeks(value as u8),
            _ => WeekSpan::Weeks(1),
        }
    }

    pub fn as_raw(self) -> i64 {
        match self {
            WeekSpan::All => -1,
            WeekSpan::Weeks(n) => n as i64,
        }
    }

    /// Settings cycle: 1 → 2 → 3 → 4 → All → 1.
    pub fn cycle(self) -> Self {
        match self {
            WeekSpan::Weeks(1) => WeekSpan::Weeks(2),
            WeekSpan::Weeks(2) => WeekSpan::Weeks(3),
            WeekSpan::Weeks(3) => WeekSpan::Weeks(4),
            WeekSpan::Weeks(4) => WeekSpan::All,
            _ => WeekSpan::Weeks(1),
        }
    }
}

/// The active time window: a start day plus a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterWindow {
    pub start: NaiveDate,
    pub span: WeekSpan,
}

impl FilterWindow {
    /// Half-open `[start, end)` bounds, or `None` when the window is
    /// unbounded and everything is visible.
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        match self.span {
            WeekSpan::All => None,
            WeekSpan::Weeks(n) => {
                let end = self.start + Days::new(n as u64 * 7);
                Some((self.start, end))
            }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match self.bounds() {
            None => true,
            Some((start, end)) => date >= start && date < end,
        }
    }
}

/// Human label for the tab bar, e.g. `Week 32 - 03/08/2026 - 09/08/2026`.
pub fn week_label(start: NaiveDate, span: WeekSpan) -> String {
    match span {
        WeekSpan::All => "All Weeks".to_string(),
        WeekSpan::Weeks(1) => {
            let end = start + Days::new(6);
            format!(
                "Week {} - {} - {}",
                start.iso_week().week(),
                format_date(start),
                format_date(end)
            )
        }
        WeekSpan::Weeks(n) => {
            let end = start + Days::new(n as u64 * 7 - 1);
            format!(
                "Weeks {}-{} - {} - {}",
                start.iso_week().week(),
                end.iso_week().week(),
                format_date(start),
                format_date(end)
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn strict_date_round_trip() {
        let parsed = parse_strict_date("17/03/2026").unwrap();
        assert_eq!(parsed, d(2026, 3, 17));
        assert_eq!(format_date(parsed), "17/03/2026");
    }

    #[test]
    fn strict_date_rejects_loose_input() {
        assert!(parse_strict_date("").is_none());
        assert!(parse_strict_date("2026-03-17").is_none());
        assert!(parse_strict_date("32/01/2026").is_none());
    }

    #[test]
    fn exam_date_accepts_time_suffix() {
        assert_eq!(parse_exam_date("17/03/2026 14:30"), Some(d(2026, 3, 17)));
        assert_eq!(parse_exam_date(" 17/03/2026 "), Some(d(2026, 3, 17)));
        assert!(parse_exam_date("someday").is_none());
    }

    #[test]
    fn week_start_lands_on_monday() {
        // 2026-08-06 is a Thursday; 2026-08-03 a Monday.
        assert_eq!(week_start_of(d(2026, 8, 6)), d(2026, 8, 3));
        assert_eq!(week_start_of(d(2026, 8, 3)), d(2026, 8, 3));
        // Sunday belongs to the week that started the previous Monday.
        assert_eq!(week_start_of(d(2026, 8, 9)), d(2026, 8, 3));
    }

    #[test]
    fn window_bounds_are_half_open() {
        let w = FilterWindow {
            start: d(2026, 8, 3),
            span: WeekSpan::Weeks(1),
        };
        assert!(w.contains(d(2026, 8, 3)));
        assert!(w.contains(d(2026, 8, 9)));
        assert!(!w.contains(d(2026, 8, 10)));
        assert!(!w.contains(d(2026, 8, 2)));
    }

    #[test]
    fn all_span_contains_everything() {
        let w = FilterWindow {
            start: d(2026, 8, 3),
            span: WeekSpan::All,
        };
        assert!(w.contains(d(1999, 1, 1)));
        assert!(w.contains(d(2099, 12, 31)));
    }

    #[test]
    fn span_cycle_wraps_through_all() {
        let mut span = WeekSpan::Weeks(1);
        let expected = [
            WeekSpan::Weeks(2),
            WeekSpan::Weeks(3),
            WeekSpan::Weeks(4),
            WeekSpan::All,
            WeekSpan::Weeks(1),
        ];
        for want in expected {
            span = span.cycle();
            assert_eq!(span, want);
        }
    }

    #[test]
    fn span_raw_round_trip() {
        for raw in [-1i64, 1, 2, 3, 4] {
            assert_eq!(WeekSpan::from_raw(raw).as_raw(), raw);
        }
        // Out-of-range values degrade to one week.
        assert_eq!(WeekSpan::from_raw(0), WeekSpan::Weeks(1));
        assert_eq!(WeekSpan::from_raw(9), WeekSpan::Weeks(1));
    }

    #[test]
    fn week_label_formats() {
        assert_eq!(week_label(d(2026, 8, 3), WeekSpan::All), "All Weeks");
        let single = week_label(d(2026, 8, 3), WeekSpan::Weeks(1));
        assert!(single.starts_with("Week 32"));
        assert!(single.contains("03/08/2026"));
        assert!(single.contains("09/08/2026"));
        let multi = week_label(d(2026, 8, 3), WeekSpan::Weeks(2));
        assert!(multi.starts_with("Weeks 32-33"));
    }
}
