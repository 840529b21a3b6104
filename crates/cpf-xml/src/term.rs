//! Vocabulary-term references.
//!
//! EAC-CPF attribute values like
//! `http://socialarchive.iath.virginia.edu/control/term#AssociatedSubject`
//! name a term inside a vocabulary URI. Splitting on the fragment marker is
//! done in one place, with an explicit type, instead of ad-hoc string
//! slicing at every call site.

/// A `vocabulary#term` reference, borrowed from the attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermRef<'a> {
  /// Everything before the last `#`, when present.
  pub vocabulary: Option<&'a str>,
  /// The term itself: the text after the last `#`, or the whole value when
  /// there is no fragment marker.
  pub term:       &'a str,
}

impl<'a> TermRef<'a> {
  pub fn parse(value: &'a str) -> Self {
    match value.rsplit_once('#') {
      Some((vocabulary, term)) => Self {
        vocabulary: Some(vocabulary),
        term,
      },
      None => Self {
        vocabulary: None,
        term: value,
      },
    }
  }
}

/// Shorthand for the common case: just the term.
pub fn term_of(value: &str) -> &str { TermRef::parse(value).term }
