//! Token extraction from short chat messages.
//!
//! Nothing here understands language. Each helper looks for one shape of
//! token (a command keyword, an ISO date, a quoted string) and reports where
//! it found it.

use once_cell::sync::Lazy;
use regex::Regex;

static MONTH_RE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"\b[0-9]{4}-[0-9]{2}\b").expect("month pattern compiles"));

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"\b[0-9]{4}-[0-9]{2}-[0-9]{2}\b").expect("date pattern compiles")
});

/// A date or a bare month, whichever is longer at a given position.
static DATE_OR_MONTH_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"\b[0-9]{4}-[0-9]{2}(?:-[0-9]{2})?\b").expect("date token pattern compiles")
});

static QUOTED_RE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r#""([^"]+)""#).expect("quoted pattern compiles"));

static CAT_PREFIX_RE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"(?i)cat:\s*([\w\s-]+)").expect("cat: pattern compiles"));

// ─── Command keyword ─────────────────────────────────────────────────────────

/// Split a message into its command keyword and the remaining text.
///
/// The keyword is the first whitespace-delimited token with leading `/`
/// characters removed, cut at the first `@` (Telegram's `/cmd@BotName`
/// form), and lowercased. Empty input yields two empty strings.
pub fn normalize_command(text: &str) -> (String, String) {
  let trimmed = text.trim();
  let (head, rest) = match trimmed.split_once(char::is_whitespace) {
    Some((head, rest)) => (head, rest.trim()),
    None               => (trimmed, ""),
  };
  let keyword = head.trim_start_matches('/');
  let keyword = keyword.split('@').next().unwrap_or_default();
  (keyword.to_lowercase(), rest.to_owned())
}

// ─── Dates ───────────────────────────────────────────────────────────────────

/// The first explicit `YYYY-MM` token in `text`.
pub fn explicit_month(text: &str) -> Option<&str> {
  MONTH_RE.find(text).map(|m| m.as_str())
}

/// The first explicit `YYYY-MM-DD` token in `text`.
pub fn explicit_date(text: &str) -> Option<&str> {
  DATE_RE.find(text).map(|m| m.as_str())
}

/// The month a message refers to: an explicit token, else the year-month of
/// the localized reference timestamp.
pub fn extract_month(text: &str, reference: Option<&str>) -> Option<String> {
  explicit_month(text)
    .map(str::to_owned)
    .or_else(|| reference.and_then(|r| r.get(..7)).map(str::to_owned))
}

/// The date a message refers to: an explicit token, else the calendar date of
/// the localized reference timestamp.
pub fn extract_date(text: &str, reference: Option<&str>) -> Option<String> {
  explicit_date(text)
    .map(str::to_owned)
    .or_else(|| reference.and_then(|r| r.get(..10)).map(str::to_owned))
}

/// Remove every explicit date and month token from `text`.
pub fn strip_date_tokens(text: &str) -> String {
  DATE_OR_MONTH_RE.replace_all(text, " ").into_owned()
}

// ─── Categories ──────────────────────────────────────────────────────────────

/// The contents of the first `"..."` pair, trimmed.
pub fn quoted(text: &str) -> Option<&str> {
  QUOTED_RE
    .captures(text)
    .and_then(|c| c.get(1))
    .map(|m| m.as_str().trim())
    .filter(|s| !s.is_empty())
}

/// The text after a `cat:` marker, trimmed.
pub fn cat_prefix(text: &str) -> Option<&str> {
  CAT_PREFIX_RE
    .captures(text)
    .and_then(|c| c.get(1))
    .map(|m| m.as_str().trim())
    .filter(|s| !s.is_empty())
}

/// Trim, collapse whitespace, and capitalise each word: `"  comida  RAPIDA"`
/// becomes `"Comida Rapida"`.
pub fn title_case(input: &str) -> String {
  input
    .split_whitespace()
    .map(|word| {
      let lower = word.to_lowercase();
      let mut chars = lower.chars();
      match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None        => String::new(),
      }
    })
    .collect::<Vec<_>>()
    .join(" ")
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn squash_whitespace(input: &str) -> String {
  input.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
  use super::*;

  const REF: &str = "2026-02-05T10:00:00-06:00";

  #[test]
  fn command_strips_slash_and_mention() {
    assert_eq!(normalize_command("/start"), ("start".into(), String::new()));
    assert_eq!(
      normalize_command("//Saldo@CarteraBot 5000"),
      ("saldo".into(), "5000".into())
    );
  }

  #[test]
  fn command_of_empty_input_is_empty() {
    assert_eq!(normalize_command("   "), (String::new(), String::new()));
  }

  #[test]
  fn remainder_keeps_inner_spacing() {
    let (cmd, rest) = normalize_command("debt  Visa   priority=alta");
    assert_eq!(cmd, "debt");
    assert_eq!(rest, "Visa   priority=alta");
  }

  #[test]
  fn explicit_month_wins_over_reference() {
    assert_eq!(extract_month("budget 6000 2026-03", Some(REF)), Some("2026-03".into()));
    assert_eq!(extract_month("budget 6000", Some(REF)), Some("2026-02".into()));
  }

  #[test]
  fn month_is_taken_from_an_explicit_date() {
    assert_eq!(extract_month("summary 2025-11-02", None), Some("2025-11".into()));
  }

  #[test]
  fn date_falls_back_to_reference() {
    assert_eq!(extract_date("gasto 87 openai", Some(REF)), Some("2026-02-05".into()));
    assert_eq!(extract_date("gasto 87 2026-01-30", Some(REF)), Some("2026-01-30".into()));
  }

  #[test]
  fn undetermined_without_token_or_reference() {
    assert_eq!(extract_date("gasto 87", None), None);
    assert_eq!(extract_month("resumen", Some("2026")), None);
  }

  #[test]
  fn strips_dates_and_months() {
    assert_eq!(squash_whitespace(&strip_date_tokens("2026-02-03 87 tacos 2026-04")), "87 tacos");
  }

  #[test]
  fn quoted_and_cat_prefix() {
    assert_eq!(quoted(r#"simulate 300 "comida rapida""#), Some("comida rapida"));
    assert_eq!(quoted(r#"x "  " y"#), None);
    assert_eq!(cat_prefix("simulate 300 cat: ropa"), Some("ropa"));
  }

  #[test]
  fn title_cases_and_trims() {
    assert_eq!(title_case("  openai  "), "Openai");
    assert_eq!(title_case("comida   RAPIDA"), "Comida Rapida");
    assert_eq!(title_case(""), "");
  }
}
