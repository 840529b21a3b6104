//! The mapper's warning channel.
//!
//! Every element or attribute the mapper has no rule for produces exactly
//! one warning carrying the chain of enclosing tag names, so an operator can
//! locate the offending content. Warnings never abort the walk under the
//! lenient policy.

use std::fmt;

/// One schema deviation observed during a mapping pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
  /// Chain of enclosing tag names, outermost first (empty at the document
  /// root level).
  pub path:    Vec<String>,
  pub message: String,
}

impl fmt::Display for Warning {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.path.is_empty() {
      write!(f, "{}", self.message)
    } else {
      write!(f, "{}: {}", self.path.join("/"), self.message)
    }
  }
}

impl Warning {
  pub fn new(path: &[&str], message: impl Into<String>) -> Self {
    Self {
      path:    path.iter().map(|s| (*s).to_owned()).collect(),
      message: message.into(),
    }
  }
}
