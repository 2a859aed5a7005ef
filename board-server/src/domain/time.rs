//! Time-of-day handling for board display.
//!
//! Upstream feeds carry times in whatever shape the producing system had
//! handy: ISO datetimes, `HH:MM[:SS]`, the French board form `HHhMM`, or a
//! bare 3-4 digit number. This module normalizes all of them to a single
//! minute-of-day value. Parsing is deliberately lenient: anything
//! unrecognizable is `None` ("no time available"), never an error, because
//! a board must render with a placeholder rather than fail.

use std::fmt;

use chrono::{NaiveDate, NaiveTime, Timelike};

/// Minutes in a day.
pub const MINUTES_PER_DAY: u16 = 1440;

/// A validated minute-of-day (0..=1439).
///
/// Ordering is the natural within-day ordering. Overnight trips that cross
/// midnight are handled by the timeline layer, which lifts successive
/// times into an absolute monotonic minute sequence.
///
/// # Examples
///
/// ```
/// use board_server::domain::TimeOfDay;
///
/// // All four wire shapes land on the same minute.
/// let t = TimeOfDay::parse("08:30").unwrap();
/// assert_eq!(TimeOfDay::parse("8h30"), Some(t));
/// assert_eq!(TimeOfDay::parse("0830"), Some(t));
/// assert_eq!(TimeOfDay::parse("2025-03-10T08:30:00"), Some(t));
///
/// // Display uses the board form; `as_hhmm` the wire form.
/// assert_eq!(t.to_string(), "08h30");
/// assert_eq!(t.as_hhmm(), "08:30");
///
/// // Garbage is "no time available", never an error.
/// assert_eq!(TimeOfDay::parse("bientôt"), None);
/// assert_eq!(TimeOfDay::parse("25:00"), None);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Create from a minute-of-day value. `None` if out of range.
    pub fn new(minute: u16) -> Option<Self> {
        (minute < MINUTES_PER_DAY).then_some(Self(minute))
    }

    /// Create from hour and minute components. `None` if out of range.
    pub fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self(hour * 60 + minute))
    }

    /// Create from a chrono time, dropping seconds.
    pub fn from_naive_time(t: NaiveTime) -> Self {
        Self((t.hour() * 60 + t.minute()) as u16)
    }

    /// Parse a time-like string of unknown shape.
    ///
    /// Rules are tried in order, first match wins:
    ///
    /// 1. ISO datetime (`YYYY-MM-DDTHH:MM...`, `T` or space separator);
    /// 2. clock form `H[:h]MM`, optional `:SS` ignored;
    /// 3. bare 3-4 digit numeric (`"0830"`, `"830"`).
    ///
    /// Anything else, including out-of-range components, is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        parse_iso(s)
            .or_else(|| parse_clock(s))
            .or_else(|| parse_bare_digits(s))
    }

    /// Minute of day (0..=1439).
    pub fn minute_of_day(&self) -> u16 {
        self.0
    }

    /// Hour component (0..=23).
    pub fn hour(&self) -> u16 {
        self.0 / 60
    }

    /// Minute component (0..=59).
    pub fn minute(&self) -> u16 {
        self.0 % 60
    }

    /// Wire form, `"08:30"`.
    pub fn as_hhmm(&self) -> String {
        format!("{:02}:{:02}", self.hour(), self.minute())
    }

    /// Minutes from `self` to `other`, negative when `other` is earlier.
    pub fn signed_minutes_until(&self, other: Self) -> i64 {
        other.0 as i64 - self.0 as i64
    }
}

impl fmt::Display for TimeOfDay {
    /// Board display form, `"08h30"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}h{:02}", self.hour(), self.minute())
    }
}

impl fmt::Debug for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeOfDay({:02}:{:02})", self.hour(), self.minute())
    }
}

/// ISO datetime: a valid `YYYY-MM-DD` date, a `T` (or space) separator,
/// then a clock time. Trailing seconds/offsets are ignored.
fn parse_iso(s: &str) -> Option<TimeOfDay> {
    let (date_part, time_part) = s.split_once(['T', ' '])?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;

    // "14:30:00+02:00" — only the leading HH:MM matters here.
    let head = if time_part.len() > 5 {
        time_part.get(..5)?
    } else {
        time_part
    };
    parse_clock(head)
}

/// Clock form: 1-2 hour digits, a `:` or `h` separator, 2 minute digits,
/// optionally `:SS`.
fn parse_clock(s: &str) -> Option<TimeOfDay> {
    let sep = s.find([':', 'h', 'H'])?;
    if sep == 0 || sep > 2 {
        return None;
    }

    let hour_part = &s[..sep];
    if !hour_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hour: u16 = hour_part.parse().ok()?;

    let rest = &s[sep + 1..];
    if rest.len() < 2 || !rest.as_bytes()[..2].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let minute: u16 = rest[..2].parse().ok()?;

    let tail = &rest[2..];
    if !tail.is_empty() {
        let seconds_ok = tail.len() == 3
            && tail.starts_with(':')
            && tail.as_bytes()[1..].iter().all(u8::is_ascii_digit);
        if !seconds_ok {
            return None;
        }
    }

    TimeOfDay::from_hm(hour, minute)
}

/// Bare numeric form: 3-4 digits, the last two being minutes.
fn parse_bare_digits(s: &str) -> Option<TimeOfDay> {
    if !(3..=4).contains(&s.len()) || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let split = s.len() - 2;
    let hour: u16 = s[..split].parse().ok()?;
    let minute: u16 = s[split..].parse().ok()?;
    TimeOfDay::from_hm(hour, minute)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hhmm() {
        let t = TimeOfDay::parse("08:30").unwrap();
        assert_eq!(t.hour(), 8);
        assert_eq!(t.minute(), 30);
        assert_eq!(t.minute_of_day(), 510);
    }

    #[test]
    fn parse_single_digit_hour() {
        assert_eq!(TimeOfDay::parse("8:05"), TimeOfDay::from_hm(8, 5));
        assert_eq!(TimeOfDay::parse("9h30"), TimeOfDay::from_hm(9, 30));
    }

    #[test]
    fn parse_french_board_form() {
        assert_eq!(TimeOfDay::parse("08h30"), TimeOfDay::from_hm(8, 30));
        assert_eq!(TimeOfDay::parse("17H45"), TimeOfDay::from_hm(17, 45));
    }

    #[test]
    fn parse_with_seconds() {
        assert_eq!(TimeOfDay::parse("08:30:59"), TimeOfDay::from_hm(8, 30));
        assert_eq!(TimeOfDay::parse("08:30:xx"), None);
    }

    #[test]
    fn parse_bare_numeric() {
        assert_eq!(TimeOfDay::parse("0830"), TimeOfDay::from_hm(8, 30));
        assert_eq!(TimeOfDay::parse("830"), TimeOfDay::from_hm(8, 30));
        assert_eq!(TimeOfDay::parse("2359"), TimeOfDay::from_hm(23, 59));
    }

    #[test]
    fn parse_iso_datetime() {
        assert_eq!(
            TimeOfDay::parse("2025-03-10T08:30:00"),
            TimeOfDay::from_hm(8, 30)
        );
        assert_eq!(
            TimeOfDay::parse("2025-03-10T08:30:00+02:00"),
            TimeOfDay::from_hm(8, 30)
        );
        assert_eq!(
            TimeOfDay::parse("2025-03-10 08:30"),
            TimeOfDay::from_hm(8, 30)
        );
    }

    #[test]
    fn parse_rejects_out_of_range() {
        assert_eq!(TimeOfDay::parse("24:00"), None);
        assert_eq!(TimeOfDay::parse("12:60"), None);
        assert_eq!(TimeOfDay::parse("2400"), None);
        assert_eq!(TimeOfDay::parse("1299"), None);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(TimeOfDay::parse(""), None);
        assert_eq!(TimeOfDay::parse("   "), None);
        assert_eq!(TimeOfDay::parse("bientôt"), None);
        assert_eq!(TimeOfDay::parse("12"), None);
        assert_eq!(TimeOfDay::parse("12345"), None);
        assert_eq!(TimeOfDay::parse("ab:cd"), None);
        assert_eq!(TimeOfDay::parse("--:--"), None);
    }

    #[test]
    fn parse_trims_whitespace() {
        assert_eq!(TimeOfDay::parse("  08:30  "), TimeOfDay::from_hm(8, 30));
    }

    #[test]
    fn display_forms() {
        let t = TimeOfDay::from_hm(8, 5).unwrap();
        assert_eq!(t.to_string(), "08h05");
        assert_eq!(t.as_hhmm(), "08:05");
    }

    #[test]
    fn ordering() {
        let a = TimeOfDay::from_hm(8, 30).unwrap();
        let b = TimeOfDay::from_hm(9, 0).unwrap();
        assert!(a < b);
    }

    #[test]
    fn signed_minutes_until() {
        let a = TimeOfDay::from_hm(8, 0).unwrap();
        let b = TimeOfDay::from_hm(8, 12).unwrap();
        assert_eq!(a.signed_minutes_until(b), 12);
        assert_eq!(b.signed_minutes_until(a), -12);
    }

    #[test]
    fn new_bounds() {
        assert!(TimeOfDay::new(0).is_some());
        assert!(TimeOfDay::new(1439).is_some());
        assert!(TimeOfDay::new(1440).is_none());
    }
}
