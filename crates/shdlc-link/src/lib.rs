//! SHDLC request/response engine.
//!
//! This is the layer device facades build on. A [`Connection`] owns one
//! serial channel, sequences one request at a time, applies per-command
//! response-time budgets, retries transient transport failures and
//! surfaces structured errors. Concrete commands are plain data: they
//! implement the [`Command`] descriptor contract and the engine does
//! the rest.

pub mod command;
pub mod connection;
pub mod error;

pub use command::Command;
pub use connection::{Connection, LinkConfig};
pub use error::{LinkError, Result};
