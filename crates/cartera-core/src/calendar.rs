//! Civil-calendar arithmetic.
//!
//! Everything here works on [`NaiveDate`]s. The only place a timezone enters
//! is [`CivilClock`], which turns an instant into the local wall-clock
//! representation the rest of the system reasons about.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The fixed civil timezone every user of the bot lives in.
pub const DEFAULT_ZONE: Tz = chrono_tz::America::Mexico_City;

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 3000;

// ─── Month ───────────────────────────────────────────────────────────────────

/// A calendar month, rendered and parsed as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
  year:  i32,
  month: u32,
}

impl YearMonth {
  pub fn new(year: i32, month: u32) -> Option<Self> {
    ((MIN_YEAR..=MAX_YEAR).contains(&year) && (1..=12).contains(&month))
      .then_some(Self { year, month })
  }

  /// The month a date falls in.
  pub fn of(date: NaiveDate) -> Self {
    Self { year: date.year(), month: date.month() }
  }

  pub fn year(self) -> i32 { self.year }

  pub fn month(self) -> u32 { self.month }

  pub fn days(self) -> u32 { days_in_month(self.year, self.month) }

  /// The month after this one, rolling December into January.
  pub fn succ(self) -> Self {
    if self.month == 12 {
      Self { year: self.year + 1, month: 1 }
    } else {
      Self { year: self.year, month: self.month + 1 }
    }
  }

  /// `day` in this month, clamped to the month's length.
  pub fn clamped_day(self, day: u32) -> NaiveDate {
    let day = day.clamp(1, self.days());
    NaiveDate::from_ymd_opt(self.year, self.month, day)
      .unwrap_or(NaiveDate::MIN)
  }
}

impl fmt::Display for YearMonth {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:04}-{:02}", self.year, self.month)
  }
}

impl FromStr for YearMonth {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let invalid = || Error::InvalidMonth(s.to_owned());
    let (y, m) = s.split_once('-').ok_or_else(invalid)?;
    if y.len() != 4 || m.len() != 2 || !all_digits(y) || !all_digits(m) {
      return Err(invalid());
    }
    let year  = y.parse().map_err(|_| invalid())?;
    let month = m.parse().map_err(|_| invalid())?;
    Self::new(year, month).ok_or_else(invalid)
  }
}

impl TryFrom<String> for YearMonth {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { s.parse() }
}

impl From<YearMonth> for String {
  fn from(m: YearMonth) -> Self { m.to_string() }
}

// ─── Dates ───────────────────────────────────────────────────────────────────

/// Parse a strict `YYYY-MM-DD` calendar date within the supported year range.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
  let invalid = || Error::InvalidDate(s.to_owned());
  let bytes = s.as_bytes();
  if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
    return Err(invalid());
  }
  let month: YearMonth = s[..7].parse().map_err(|_| invalid())?;
  let day = &s[8..];
  if !all_digits(day) {
    return Err(invalid());
  }
  let day: u32 = day.parse().map_err(|_| invalid())?;
  NaiveDate::from_ymd_opt(month.year(), month.month(), day).ok_or_else(invalid)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
  match month {
    1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
    4 | 6 | 9 | 11 => 30,
    2 if NaiveDate::from_ymd_opt(year, 2, 29).is_some() => 29,
    2 => 28,
    _ => 0,
  }
}

/// The next occurrence of `due_day` on or after `purchase`.
///
/// The due day is clamped to the length of the month it lands in, so a due
/// day of 31 falls on the 28th (or 29th) in February.
pub fn next_due_date(purchase: NaiveDate, due_day: u32) -> NaiveDate {
  let month     = YearMonth::of(purchase);
  let candidate = month.clamped_day(due_day);
  if candidate >= purchase {
    candidate
  } else {
    month.succ().clamped_day(due_day)
  }
}

fn all_digits(s: &str) -> bool {
  !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

// ─── Civil clock ─────────────────────────────────────────────────────────────

/// Translates instants into local wall-clock time.
pub trait CivilClock: Send + Sync {
  fn localize(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset>;
}

impl CivilClock for Tz {
  fn localize(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
    instant.with_timezone(self).fixed_offset()
  }
}

impl CivilClock for Utc {
  fn localize(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
    instant.fixed_offset()
  }
}

/// Parse an RFC 3339 instant such as `2026-02-05T16:00:00Z`.
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s.trim())
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|_| Error::InvalidTimestamp(s.to_owned()))
}

/// Render `now_iso` in local time as `YYYY-MM-DDTHH:MM:SS+HH:MM`.
///
/// Returns `None` when `now_iso` is not a valid instant.
pub fn localize_iso(clock: &dyn CivilClock, now_iso: &str) -> Option<String> {
  let instant = parse_instant(now_iso).ok()?;
  Some(clock.localize(instant).format("%Y-%m-%dT%H:%M:%S%:z").to_string())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(s: &str) -> NaiveDate { parse_date(s).unwrap() }

  // ── Due dates ─────────────────────────────────────────────────────────────

  #[test]
  fn due_day_later_in_same_month() {
    assert_eq!(next_due_date(date("2026-02-05"), 15), date("2026-02-15"));
  }

  #[test]
  fn due_day_already_passed_moves_to_next_month() {
    assert_eq!(next_due_date(date("2026-02-20"), 15), date("2026-03-15"));
  }

  #[test]
  fn due_day_clamped_to_short_month() {
    assert_eq!(next_due_date(date("2026-02-20"), 31), date("2026-02-28"));
  }

  #[test]
  fn due_day_rolls_over_year_end() {
    assert_eq!(next_due_date(date("2026-12-31"), 1), date("2027-01-01"));
  }

  #[test]
  fn due_day_on_purchase_date_counts() {
    assert_eq!(next_due_date(date("2026-03-15"), 15), date("2026-03-15"));
  }

  #[test]
  fn clamping_in_following_month() {
    assert_eq!(next_due_date(date("2026-01-31"), 30), date("2026-02-28"));
    assert_eq!(next_due_date(date("2028-01-31"), 30), date("2028-02-29"));
  }

  // ── Parsing ───────────────────────────────────────────────────────────────

  #[test]
  fn month_round_trips_through_display() {
    let m: YearMonth = "2026-02".parse().unwrap();
    assert_eq!(m.to_string(), "2026-02");
    assert_eq!(m.days(), 28);
  }

  #[test]
  fn invalid_months_are_rejected() {
    for s in ["2026-13", "2026-00", "26-02", "2026-2", "1899-12", "abcd-ef"] {
      assert!(s.parse::<YearMonth>().is_err(), "{s} should be invalid");
    }
  }

  #[test]
  fn invalid_dates_are_rejected() {
    for s in ["2026-02-30", "2026-2-01", "2026/02/01", "2026-02-01T00:00"] {
      assert!(parse_date(s).is_err(), "{s} should be invalid");
    }
    assert!(parse_date("2028-02-29").is_ok());
  }

  // ── Clock ─────────────────────────────────────────────────────────────────

  #[test]
  fn localizes_to_mexico_city() {
    let local = localize_iso(&DEFAULT_ZONE, "2026-02-05T03:30:00Z").unwrap();
    assert_eq!(local, "2026-02-04T21:30:00-06:00");
  }

  #[test]
  fn unusable_reference_is_none() {
    assert_eq!(localize_iso(&DEFAULT_ZONE, "yesterday"), None);
  }
}
