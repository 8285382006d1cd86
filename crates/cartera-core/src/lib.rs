//! Core types and trait definitions for Cartera, a personal-finance chat bot.
//!
//! The crate has no HTTP or database dependencies. It owns the domain model
//! and the text-parsing primitives the command router is built from, along
//! with calendar arithmetic and the pure affordability decision.

pub mod calendar;
pub mod debt;
pub mod error;
pub mod ledger;
pub mod money;
pub mod simulate;
pub mod store;
pub mod text;

pub use error::{Error, Result};
pub use money::Cents;
