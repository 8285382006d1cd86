//! The subset of the Telegram `Update` object the webhook reads.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Update {
  pub message:        Option<Message>,
  pub edited_message: Option<Message>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Message {
  pub text: Option<String>,
  pub chat: Option<Chat>,
  pub from: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
  pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
  pub id: i64,
}

impl Update {
  /// The new message if it has text, else the edited one if it has text.
  pub fn text_message(&self) -> Option<&Message> {
    [&self.message, &self.edited_message]
      .into_iter()
      .flatten()
      .find(|m| m.text().is_some())
  }
}

impl Message {
  pub fn text(&self) -> Option<&str> { self.text.as_deref().filter(|t| !t.is_empty()) }

  /// Chat id, treating `0` as absent.
  pub fn chat_id(&self) -> Option<i64> { self.chat.as_ref().map(|c| c.id).filter(|id| *id != 0) }

  /// Sender id as a string, or `"unknown"`.
  pub fn sender(&self) -> String {
    match self.from.as_ref().map(|u| u.id).filter(|id| *id != 0) {
      Some(id) => id.to_string(),
      None     => "unknown".to_owned(),
    }
  }
}
