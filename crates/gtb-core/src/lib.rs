//! Core domain + application logic for the goal bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and the todo-list
//! service live behind ports (traits) implemented in adapter crates or in
//! [`store::memory`].

pub mod config;
pub mod dispatcher;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod messaging;
pub mod poller;
pub mod registry;
pub mod replies;
pub mod session;
pub mod store;
pub mod wizard;

#[cfg(test)]
mod test_support;

pub use errors::{Error, Result};
