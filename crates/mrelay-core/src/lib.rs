//! Core domain + application logic for the mention relay.
//!
//! This crate is transport-agnostic. Telegram and the completion provider live
//! behind ports (traits) implemented in adapter crates; the poll-and-respond
//! loop in [`relay`] only talks to those ports.

pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod mention;
pub mod messaging;
pub mod model;
pub mod relay;

pub use errors::{Error, Result};
