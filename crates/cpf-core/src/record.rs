//! Record types — the normalized graph one EAC-CPF document maps to.
//!
//! A [`CpfRecord`] is one archival entity (a person, corporate body, or
//! family) plus all of its repeated sub-records, in document order. The
//! mapper builds the graph; a [`crate::sink::RecordSink`] flattens it into
//! relational rows.

use serde::{Deserialize, Serialize};

// ─── Sub-records ─────────────────────────────────────────────────────────────

/// Which name-form element a contributor entry was attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NameFormKind {
  AlternativeForm,
  AuthorizedForm,
}

impl NameFormKind {
  /// The string stored in the `name_contributor.name_type` column; matches
  /// the source element tag.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::AlternativeForm => "alternativeForm",
      Self::AuthorizedForm => "authorizedForm",
    }
  }
}

/// An institution that contributed a form of a name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contributor {
  pub short_name: Option<String>,
  pub form:       NameFormKind,
}

/// One `nameEntry` for the record.
///
/// Convention: the first name in document order is the record's preferred
/// name, regardless of `preference_score`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NameEntry {
  pub original:         Option<String>,
  pub preference_score: Option<f64>,
  pub contributors:     Vec<Contributor>,
}

/// One endpoint of an exist-date, or a single exist-date.
///
/// `original` is the display text as written in the document; an endpoint
/// with no display text is never recorded at all. `standard` is the
/// machine-normalized value, which may be absent (text-only dates).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateValue {
  pub standard:  Option<String>,
  pub original:  String,
  pub qualifier: Option<String>,
}

/// An exist-date: a single point in time or a range with optional endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExistDate {
  Single(DateValue),
  Range {
    from: Option<DateValue>,
    to:   Option<DateValue>,
  },
}

/// An external citation. Deduplicated by `href` across the whole corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
  pub source_type: Option<String>,
  pub href:        Option<String>,
}

/// One maintenance-history entry. Appended in document order; the stored
/// order *is* the history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaintenanceEvent {
  pub event_type:  Option<String>,
  pub event_time:  Option<String>,
  pub agent_type:  Option<String>,
  pub agent:       Option<String>,
  pub description: Option<String>,
}

/// An alternate identifier for the record. Never deduplicated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtherId {
  pub link_type: Option<String>,
  pub other_id:  Option<String>,
}

/// An external resource reference (`resourceRelation`). Deduplicated by
/// `href`; the role/link_type pair lives on the record↔document link.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentRef {
  pub name:          Option<String>,
  pub href:          Option<String>,
  pub document_type: Option<String>,
  pub document_role: Option<String>,
  pub link_type:     Option<String>,
  /// Serialized `objectXMLWrap` sub-tree, when present.
  pub xml_source:    Option<String>,
  /// Serialized `descriptiveNote` sub-tree, when present.
  pub notes:         Option<String>,
}

/// A directed edge to another CPF record (`cpfRelation`), identified by the
/// target's ark. The edge is resolved to row ids only during the second
/// document pass; an unresolved endpoint drops the edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationRef {
  pub relation_type: Option<String>,
  pub other_type:    Option<String>,
  pub target_ark:    Option<String>,
  pub entry:         String,
}

// ─── CpfRecord ───────────────────────────────────────────────────────────────

/// One archival entity and everything scanned out of its document.
///
/// All repeated fields preserve document order. `ark_id` is the only
/// cross-document join key and is never empty for a mapped record (the
/// mapper rejects documents without a `recordId`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CpfRecord {
  pub ark_id:              String,
  pub entity_type:         Option<String>,
  pub maintenance_status:  Option<String>,
  pub maintenance_agency:  Option<String>,
  pub language_code:       Option<String>,
  pub script_code:         Option<String>,
  pub convention_citation: Option<String>,
  pub gender:              Option<String>,
  pub language_used:       Option<String>,
  pub script_used:         Option<String>,
  /// All `biogHist` fragments merged into a single serialized fragment.
  pub biog_hist:           Option<String>,

  pub names:              Vec<NameEntry>,
  pub dates:              Vec<ExistDate>,
  pub sources:            Vec<SourceRef>,
  pub maintenance_events: Vec<MaintenanceEvent>,
  pub other_ids:          Vec<OtherId>,
  pub occupations:        Vec<String>,
  pub subjects:           Vec<String>,
  pub nationalities:      Vec<String>,
  pub documents:          Vec<DocumentRef>,
  pub relations:          Vec<RelationRef>,
}

impl CpfRecord {
  /// The preferred name: the first `nameEntry` in document order.
  pub fn preferred_name(&self) -> Option<&NameEntry> { self.names.first() }
}
