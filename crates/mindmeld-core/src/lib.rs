//! Core domain + application logic for the MindMeld bot.
//!
//! This crate is intentionally framework-agnostic. Telegram lives behind
//! ports (traits) implemented in the adapter crate: the core decides *what*
//! happens (entitlement, delivery, the daily-question flow, reminders) and
//! the adapter decides how it looks on the wire.

pub mod callback;
pub mod catalog;
pub mod config;
pub mod daily;
pub mod distributor;
pub mod domain;
pub mod entitlement;
pub mod errors;
pub mod eventlog;
pub mod logging;
pub mod messaging;
pub mod ports;
pub mod reminder;
pub mod session;

pub use errors::{Error, Result};
