//! Per-batch cache of language/script codes and their display labels.

use std::collections::HashMap;

/// Code→label pairs collected from `languageDeclaration` elements as they
/// are encountered.
///
/// Scoped to one batch run and passed into every mapper call; there is no
/// process-wide state.
#[derive(Debug, Clone, Default)]
pub struct CodeLabelCache {
  languages: HashMap<String, String>,
  scripts:   HashMap<String, String>,
}

impl CodeLabelCache {
  pub fn record_language(&mut self, code: &str, label: &str) {
    self.languages.insert(code.to_owned(), label.to_owned());
  }

  pub fn record_script(&mut self, code: &str, label: &str) {
    self.scripts.insert(code.to_owned(), label.to_owned());
  }

  pub fn language_label(&self, code: &str) -> Option<&str> {
    self.languages.get(code).map(String::as_str)
  }

  pub fn script_label(&self, code: &str) -> Option<&str> {
    self.scripts.get(code).map(String::as_str)
  }
}
