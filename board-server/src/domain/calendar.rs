//! Running-day calendars and their many wire encodings.
//!
//! The admin tooling has encoded "jours de circulation" four different
//! ways over the years: an integer bitmask (LSB = Monday), a 7-character
//! binary string (Monday..Sunday), a delimited list of day numbers, and a
//! delimited list of day-name abbreviations (French or English). All four
//! co-exist in the feed. Each encoding is normalized to the canonical
//! domain 1=Monday..7=Sunday; a field is run through every adapter and the
//! successful parses are unioned. Malformed values parse to nothing and
//! fall through to the resolver's permissive default — never an error.

use chrono::{Datelike, NaiveDate, Weekday};

/// A set of weekdays, canonical domain 1=Monday..7=Sunday.
///
/// Stored as a 7-bit mask, bit 0 = Monday.
///
/// # Examples
///
/// ```
/// use board_server::domain::{WeekdaySet, parse_weekday_spec};
/// use chrono::Weekday;
///
/// // Delimited day numbers, 1=Monday.
/// let set: WeekdaySet = parse_weekday_spec("1;3;5").unwrap();
/// assert!(set.contains(Weekday::Mon));
/// assert!(set.contains(Weekday::Wed));
/// assert!(!set.contains(Weekday::Tue));
///
/// // 7-character binary string, Monday..Sunday.
/// assert_eq!(parse_weekday_spec("1010100"), Some(set));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Build from a raw 7-bit mask, bit 0 = Monday.
    pub fn from_bits(bits: u8) -> Self {
        Self(bits & 0x7f)
    }

    /// Insert a day by canonical number (1=Monday..7=Sunday).
    /// Out-of-range numbers are ignored.
    pub fn insert_day_number(&mut self, day: u8) {
        if (1..=7).contains(&day) {
            self.0 |= 1 << (day - 1);
        }
    }

    /// Does the set contain this weekday?
    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << (day.number_from_monday() - 1)) != 0
    }

    /// Is the set empty?
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Union of two sets.
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl std::fmt::Debug for WeekdaySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WeekdaySet({:07b})", self.0)
    }
}

/// The recurring-calendar definition of a schedule.
///
/// A union of encodings, all honored together: the day-of-week mask, a
/// separate legacy day list, explicit custom running dates (which bypass
/// weekday checks), a validity window, and explicit non-running dates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Calendar {
    /// Day-of-week specification, any of the four encodings.
    pub day_mask: Option<String>,
    /// Legacy day list, same encodings, evaluated independently and
    /// OR-merged with `day_mask` (inherited behavior, see DESIGN.md).
    pub day_list: Option<String>,
    /// Explicit running dates; weekday checks are bypassed for these.
    pub custom_dates: Vec<NaiveDate>,
    /// Start of the validity window (inclusive), if bounded.
    pub valid_from: Option<NaiveDate>,
    /// End of the validity window (inclusive), if bounded.
    pub valid_to: Option<NaiveDate>,
    /// Explicit non-running dates; these win over any weekday match.
    pub exceptions: Vec<NaiveDate>,
    /// A single explicit service date carried by some records.
    pub extra_date: Option<NaiveDate>,
}

impl Calendar {
    /// A calendar with no day specification at all (runs daily, per the
    /// permissive default).
    pub fn daily() -> Self {
        Self::default()
    }

    /// Does `date` fall inside the validity window?
    pub fn within_validity(&self, date: NaiveDate) -> bool {
        if let Some(from) = self.valid_from {
            if date < from {
                return false;
            }
        }
        if let Some(to) = self.valid_to {
            if date > to {
                return false;
            }
        }
        true
    }

    /// Does `date` match one of the explicit running dates?
    pub fn matches_exact_date(&self, date: NaiveDate) -> bool {
        self.extra_date == Some(date) || self.custom_dates.contains(&date)
    }

    /// The union of every day specification present, or `None` when no
    /// field yielded one (the resolver then assumes daily service).
    pub fn weekday_spec(&self) -> Option<WeekdaySet> {
        let mask = self.day_mask.as_deref().and_then(parse_weekday_spec);
        let list = self.day_list.as_deref().and_then(parse_weekday_spec);

        match (mask, list) {
            (None, None) => None,
            // Either source saying "runs" is "runs".
            (m, l) => Some(
                m.unwrap_or(WeekdaySet::EMPTY)
                    .union(l.unwrap_or(WeekdaySet::EMPTY)),
            ),
        }
    }

    /// Does the weekday of `date` satisfy the day specification?
    /// `None` when no specification is present at all.
    pub fn weekday_matches(&self, date: NaiveDate) -> Option<bool> {
        self.weekday_spec().map(|set| set.contains(date.weekday()))
    }
}

/// Parse a day-of-week specification of unknown encoding.
///
/// Every adapter is tried and the successful parses are unioned, so a
/// value that is valid under two readings keeps both (the upstream data
/// never disambiguates, and "either says yes" is the inherited rule).
/// Returns `None` when no adapter recognizes the value.
pub fn parse_weekday_spec(s: &str) -> Option<WeekdaySet> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let parses = [
        parse_bitmask_int(s),
        parse_binary_string(s),
        parse_day_numbers(s),
        parse_day_names(s),
    ];

    let mut any = false;
    let mut set = WeekdaySet::EMPTY;
    for p in parses.into_iter().flatten() {
        any = true;
        set = set.union(p);
    }
    any.then_some(set)
}

/// Integer bitmask, LSB = Monday. Must fit in 7 bits and carry no leading
/// zeros; a zero-padded value is the binary-string encoding, not an
/// integer.
fn parse_bitmask_int(s: &str) -> Option<WeekdaySet> {
    if s.len() > 1 && s.starts_with('0') {
        return None;
    }
    let value: u32 = s.parse().ok()?;
    if value > 0x7f {
        return None;
    }
    Some(WeekdaySet::from_bits(value as u8))
}

/// 7-character binary string, Monday..Sunday ("1010100" = Mon/Wed/Fri).
fn parse_binary_string(s: &str) -> Option<WeekdaySet> {
    if s.len() != 7 || !s.bytes().all(|b| b == b'0' || b == b'1') {
        return None;
    }
    let mut set = WeekdaySet::EMPTY;
    for (i, b) in s.bytes().enumerate() {
        if b == b'1' {
            set.insert_day_number(i as u8 + 1);
        }
    }
    Some(set)
}

/// Delimited list of day numbers. Both 0-based (0=Monday..6=Sunday) and
/// 1-based (1=Monday..7=Sunday) conventions occur upstream: a 0 in the
/// list means 0-based, a 7 means 1-based, otherwise 1-based is assumed.
fn parse_day_numbers(s: &str) -> Option<WeekdaySet> {
    let tokens: Vec<u8> = s
        .split([';', ',', ' '])
        .filter(|t| !t.is_empty())
        .map(|t| {
            // Zero-padded tokens belong to the binary-string encoding.
            if t.len() > 1 && t.starts_with('0') {
                return None;
            }
            t.parse::<u8>().ok().filter(|&n| n <= 7)
        })
        .collect::<Option<Vec<_>>>()?;

    if tokens.is_empty() {
        return None;
    }

    let zero_based = tokens.contains(&0);
    let mut set = WeekdaySet::EMPTY;
    for n in tokens {
        let day = if zero_based { n + 1 } else { n };
        set.insert_day_number(day);
    }
    Some(set)
}

/// Delimited list of day-name abbreviations, French or English,
/// case- and accent-insensitive prefix match.
fn parse_day_names(s: &str) -> Option<WeekdaySet> {
    const NAMES: [(&str, u8); 14] = [
        ("lun", 1),
        ("mar", 2),
        ("mer", 3),
        ("jeu", 4),
        ("ven", 5),
        ("sam", 6),
        ("dim", 7),
        ("mon", 1),
        ("tue", 2),
        ("wed", 3),
        ("thu", 4),
        ("fri", 5),
        ("sat", 6),
        ("sun", 7),
    ];

    let mut set = WeekdaySet::EMPTY;
    let mut any = false;
    for token in s.split([';', ',', ' ']).filter(|t| !t.is_empty()) {
        let token = token.to_lowercase();
        let day = NAMES
            .iter()
            .find(|(name, _)| token.starts_with(name))
            .map(|&(_, d)| d)?;
        set.insert_day_number(day);
        any = true;
    }
    any.then_some(set)
}
