//! The `RecordSink` trait — where mapped records go.
//!
//! The batch driver is generic over this trait; `cpf-store-sqlite` and
//! `cpf-sqlfile` implement it. The driver calls `insert_record` for every
//! document in input order, then makes a second pass calling
//! `resolve_relations` once all records of the batch are inserted.

use crate::record::CpfRecord;

/// Abstraction over a persistence sink for mapped CPF records.
///
/// Sinks are driven by a single thread; serializability within a batch comes
/// from program order alone.
pub trait RecordSink {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist one record graph: the record itself plus all owned sub-records,
  /// with find-or-create semantics for every deduplicated lookup table.
  fn insert_record(&mut self, record: &CpfRecord) -> Result<(), Self::Error>;

  /// Second-pass relation resolution for one record. Returns the number of
  /// edges actually written; an edge whose endpoints are not both known is
  /// dropped, not deferred.
  fn resolve_relations(&mut self, record: &CpfRecord)
  -> Result<usize, Self::Error>;

  /// Durability boundary. Called every N records and once at the end of the
  /// batch.
  fn checkpoint(&mut self) -> Result<(), Self::Error>;
}
