//! Chat message classification.
//!
//! A message is matched against [`RULES`] in order; the first rule whose
//! phrase opens the message decides the [`Command`]. Matching is by whole
//! words, case-insensitive, after [`normalize_command`] has removed the
//! leading `/` and any `@BotName` suffix from the first word.

use std::collections::HashMap;

use cartera_core::text::normalize_command;
use tracing::debug;

/// What a message asks for. Variants that need more input carry the text
/// that follows the command phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
  Empty,
  Help,
  ListDebts,
  ShowBalance,
  SetBalance(String),
  SetBudget(String),
  SetDebt(String),
  Simulate(String),
  Summary(String),
  Undo,
  Correct(String),
  /// No phrase matched; the whole message is read as a transaction.
  Transaction(String),
}

struct Rule {
  phrases: &'static [&'static str],
  build:   fn(String) -> Command,
}

/// Longer phrases come before their prefixes within a rule.
static RULES: &[Rule] = &[
  Rule { phrases: &["help", "ayuda", "start"], build: |_| Command::Help },
  Rule { phrases: &["deudas"], build: |_| Command::ListDebts },
  Rule { phrases: &["set balance", "balance", "saldo"], build: balance },
  Rule { phrases: &["set budget", "budget", "presupuesto"], build: Command::SetBudget },
  Rule { phrases: &["set debt", "debt"], build: Command::SetDebt },
  Rule { phrases: &["simulate", "can i buy", "puedo comprar"], build: Command::Simulate },
  Rule { phrases: &["summary", "resumen"], build: Command::Summary },
  Rule { phrases: &["deshacer", "undo", "borrar"], build: |_| Command::Undo },
  Rule { phrases: &["corregir", "fix"], build: Command::Correct },
];

fn balance(rest: String) -> Command {
  if rest.is_empty() { Command::ShowBalance } else { Command::SetBalance(rest) }
}

/// Classify a chat message.
pub fn parse(text: &str) -> Command {
  let text = text.trim();
  if text.is_empty() {
    return Command::Empty;
  }

  let (keyword, rest) = normalize_command(text);
  for rule in RULES {
    for phrase in rule.phrases {
      if let Some(remainder) = strip_phrase(&keyword, &rest, phrase) {
        debug!(%phrase, "command matched");
        return (rule.build)(remainder);
      }
    }
  }

  debug!("no command phrase, reading as transaction");
  Command::Transaction(text.to_owned())
}

/// If `phrase` opens the message, the text after it.
fn strip_phrase(keyword: &str, rest: &str, phrase: &str) -> Option<String> {
  let mut words = phrase.split(' ');
  if words.next()? != keyword {
    return None;
  }

  let mut rest = rest;
  for word in words {
    let (head, tail) = split_word(rest);
    if !head.eq_ignore_ascii_case(word) {
      return None;
    }
    rest = tail;
  }
  Some(rest.to_owned())
}

fn split_word(text: &str) -> (&str, &str) {
  match text.split_once(char::is_whitespace) {
    Some((head, tail)) => (head, tail.trim_start()),
    None               => (text, ""),
  }
}

// ─── Debt fields ─────────────────────────────────────────────────────────────

/// The arguments of a `debt` command: `key=value` tokens and a free-text
/// name made of every other token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebtArgs {
  pub name:   String,
  pub fields: HashMap<String, String>,
}

impl DebtArgs {
  /// Split on whitespace. A token with `=` after its first character is a
  /// field (key lowercased, later keys win); the rest join into the name.
  pub fn parse(rest: &str) -> Self {
    let mut name   = Vec::new();
    let mut fields = HashMap::new();
    for token in rest.split_whitespace() {
      match token.find('=') {
        Some(at) if at > 0 => {
          fields.insert(token[..at].to_lowercase(), token[at + 1..].to_owned());
        }
        _ => name.push(token),
      }
    }
    Self { name: name.join(" "), fields }
  }

  /// A field's raw value, if it was given and is not empty.
  pub fn field(&self, key: &str) -> Option<&str> {
    self.fields.get(key).map(String::as_str).filter(|v| !v.is_empty())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn help_synonyms() {
    assert_eq!(parse("/start"), Command::Help);
    assert_eq!(parse("help"), Command::Help);
    assert_eq!(parse("/ayuda@CarteraBot"), Command::Help);
  }

  #[test]
  fn multi_word_phrases() {
    assert_eq!(parse("set balance 5,000"), Command::SetBalance("5,000".into()));
    assert_eq!(parse("Can I buy 1200 \"audifonos\""), Command::Simulate("1200 \"audifonos\"".into()));
    assert_eq!(parse("puedo comprar 300 cat: cine"), Command::Simulate("300 cat: cine".into()));
  }

  #[test]
  fn bare_balance_shows_current() {
    assert_eq!(parse("saldo"), Command::ShowBalance);
    assert_eq!(parse("saldo 12000"), Command::SetBalance("12000".into()));
  }

  #[test]
  fn partial_phrase_falls_through() {
    assert_eq!(parse("can we go"), Command::Transaction("can we go".into()));
    assert_eq!(parse("set 100"), Command::Transaction("set 100".into()));
  }

  #[test]
  fn unmatched_text_is_a_transaction() {
    assert_eq!(parse("gasto 87 openai"), Command::Transaction("gasto 87 openai".into()));
    assert_eq!(parse("   "), Command::Empty);
  }

  #[test]
  fn debt_tokens_split_into_name_and_fields() {
    let args = DebtArgs::parse("Tarjeta Visa balance=12,000 MIN=500 due=15 =oops priority=alta");
    assert_eq!(args.name, "Tarjeta Visa =oops");
    assert_eq!(args.field("balance"), Some("12,000"));
    assert_eq!(args.field("min"), Some("500"));
    assert_eq!(args.field("priority"), Some("alta"));
    assert_eq!(args.field("dna"), None);
  }
}
