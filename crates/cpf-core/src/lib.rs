//! Core types for the CPF ingest pipeline.
//!
//! This crate holds the normalized record graph produced by the mapper and
//! the [`sink::RecordSink`] abstraction the batch driver persists it through.
//! It is deliberately free of XML and database dependencies; all other
//! crates depend on it.

pub mod cache;
pub mod record;
pub mod sink;

pub use cache::CodeLabelCache;
pub use record::CpfRecord;
pub use sink::RecordSink;
