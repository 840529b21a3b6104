//! SQLite backend for the CPF record sink.
//!
//! One connection, one long-lived transaction: rows accumulate until the
//! driver calls [`RecordSink::checkpoint`](cpf_core::RecordSink::checkpoint),
//! which commits and opens the next transaction.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
