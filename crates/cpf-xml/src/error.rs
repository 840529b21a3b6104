//! Error types for the cpf-xml mapper.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("xml parse error: {0}")]
  Xml(#[from] quick_xml::Error),

  #[error("malformed attribute: {0}")]
  Attr(#[from] quick_xml::events::attributes::AttrError),

  #[error("document has no root element")]
  EmptyDocument,

  #[error("mismatched element nesting")]
  UnbalancedDocument,

  #[error("record has no recordId")]
  MissingRecordId,

  /// Only raised under [`crate::Strictness::Strict`]; the lenient policy
  /// turns the same condition into a warning.
  #[error("unrecognized content at {path}: {message}")]
  UnknownContent { path: String, message: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
