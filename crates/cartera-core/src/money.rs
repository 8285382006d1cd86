//! Money in integer MXN cents.
//!
//! Amounts never touch floating point. Free-text amounts such as `"1,234.50"`
//! or `"1.5k"` are parsed straight into cents.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

/// A monetary amount in minor units (1/100 MXN).
pub type Cents = i64;

/// Optional sign, digits with `,` separators, optional fraction, optional `k`
/// that is not the start of a longer word.
static AMOUNT_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?i)-?[0-9][0-9,]*(?:\.[0-9]+)?(?:\s*k\b)?")
    .expect("amount pattern compiles")
});

// ─── Parsing ─────────────────────────────────────────────────────────────────

/// Byte range of the first amount-looking token in `text`, whether or not it
/// parses to a valid amount.
pub fn locate_amount(text: &str) -> Option<Range<usize>> {
  AMOUNT_RE.find(text).map(|m| m.range())
}

/// Parse the first amount in `text` into cents.
///
/// The fraction is truncated (never rounded) or zero-padded to two digits,
/// then a trailing `k` multiplies the cents by 1000: `"1.5k"` is 150 cents
/// times 1000, i.e. 150000 cents. Negative amounts, a missing integer part
/// and values that overflow return `None`.
pub fn parse_amount(text: &str) -> Option<Cents> {
  let range = locate_amount(text)?;
  amount_from_token(&text[range])
}

fn amount_from_token(token: &str) -> Option<Cents> {
  let raw = token.trim().to_ascii_lowercase();
  if raw.starts_with('-') {
    return None;
  }

  let (numeric, thousands) = match raw.strip_suffix('k') {
    Some(rest) => (rest.trim_end(), true),
    None       => (raw.as_str(), false),
  };
  let numeric = numeric.replace(',', "");
  let (int_raw, frac_raw) = numeric.split_once('.').unwrap_or((numeric.as_str(), ""));

  if int_raw.is_empty() {
    return None;
  }
  let whole: i64 = int_raw.parse().ok()?;

  let frac: String = frac_raw.chars().take(2).collect();
  let frac: i64 = format!("{frac:0<2}").parse().ok()?;

  let cents = whole.checked_mul(100)?.checked_add(frac)?;
  if thousands { cents.checked_mul(1000) } else { Some(cents) }
}

// ─── Formatting ──────────────────────────────────────────────────────────────

/// Render cents as `$1234.56 MXN`.
pub fn format_cents(cents: Cents) -> String {
  let sign = if cents < 0 { "-" } else { "" };
  let abs  = cents.unsigned_abs();
  format!("{sign}${}.{:02} MXN", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn thousands_separator_and_truncated_fraction() {
    assert_eq!(parse_amount("1,234.567"), Some(123_456));
  }

  #[test]
  fn k_suffix_scales_after_cents_conversion() {
    assert_eq!(parse_amount("1.5k"), Some(150_000));
    assert_eq!(parse_amount("2K"), Some(200_000));
    assert_eq!(parse_amount("presupuesto 6 k"), Some(600_000));
  }

  #[test]
  fn negative_amount_is_rejected() {
    assert_eq!(parse_amount("-5"), None);
    assert_eq!(parse_amount("gasto -120 tacos"), None);
  }

  #[test]
  fn no_digits_is_no_match() {
    assert_eq!(parse_amount("abc"), None);
    assert_eq!(parse_amount(""), None);
  }

  #[test]
  fn short_fraction_is_zero_padded() {
    assert_eq!(parse_amount("87.5"), Some(8_750));
    assert_eq!(parse_amount("87"), Some(8_700));
  }

  #[test]
  fn first_amount_in_sentence_wins() {
    assert_eq!(parse_amount("gasto 87 openai 12"), Some(8_700));
  }

  #[test]
  fn k_at_start_of_word_is_not_a_multiplier() {
    assert_eq!(parse_amount("87 kfc"), Some(8_700));
  }

  #[test]
  fn overflow_is_no_match() {
    assert_eq!(parse_amount("99999999999999999999"), None);
  }

  #[test]
  fn locate_amount_reports_token_span() {
    let text = "gasto 1,200 super";
    let span = locate_amount(text).unwrap();
    assert_eq!(&text[span], "1,200");
  }

  #[test]
  fn formats_with_two_decimals() {
    assert_eq!(format_cents(123_456), "$1234.56 MXN");
    assert_eq!(format_cents(5), "$0.05 MXN");
    assert_eq!(format_cents(-1_050), "-$10.50 MXN");
  }
}
