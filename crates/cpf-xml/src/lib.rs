//! EAC-CPF XML to [`CpfRecord`] mapping.
//!
//! One call, [`map_record`], takes a whole document and produces the typed
//! record plus any warnings for content the mapping has no rule for. The
//! walk is a single pass in document order; nothing is sorted or
//! deduplicated here, that is the sinks' concern.

mod dom;
mod map;
pub mod error;
pub mod term;
pub mod warn;

use cpf_core::{CodeLabelCache, CpfRecord};
use serde::{Deserialize, Serialize};

pub use self::{
  error::{Error, Result},
  map::{NS_SNAC, NS_XLINK},
  term::{TermRef, term_of},
  warn::Warning,
};

/// What to do with content the mapping has no rule for.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
  /// Report a warning and keep walking.
  #[default]
  Lenient,
  /// Fail the document on the first unrecognized element or attribute.
  Strict,
}

/// The result of mapping one document.
#[derive(Debug)]
pub struct MappedRecord {
  pub record:   CpfRecord,
  /// Schema deviations observed along the way, in document order. Always
  /// empty under [`Strictness::Strict`].
  pub warnings: Vec<Warning>,
}

/// Parse an EAC-CPF document and map it to a record.
///
/// Language and script code declarations encountered in the document are
/// recorded into `cache` as a side effect, so labels accumulate across a
/// batch.
pub fn map_record(
  input: &str,
  cache: &mut CodeLabelCache,
  strictness: Strictness,
) -> Result<MappedRecord> {
  let root = dom::parse_document(input)?;
  map::map_document(&root, cache, strictness)
}
