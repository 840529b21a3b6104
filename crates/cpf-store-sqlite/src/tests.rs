//! Integration tests for `SqliteStore` against an in-memory database.

use cpf_core::{
  RecordSink,
  record::{
    Contributor, CpfRecord, DateValue, DocumentRef, ExistDate,
    MaintenanceEvent, NameEntry, NameFormKind, RelationRef, SourceRef,
  },
};

use crate::SqliteStore;

fn store() -> SqliteStore {
  SqliteStore::open_in_memory().expect("in-memory store")
}

fn record(ark: &str) -> CpfRecord {
  CpfRecord {
    ark_id: ark.to_owned(),
    ..CpfRecord::default()
  }
}

fn count(s: &SqliteStore, sql: &str) -> i64 {
  s.conn.query_row(sql, [], |row| row.get(0)).unwrap()
}

// ─── Records ─────────────────────────────────────────────────────────────────

#[test]
fn insert_and_lookup_by_ark() {
  let mut s = store();

  let mut rec = record("ark:/99166/w6one");
  rec.entity_type = Some("person".to_owned());
  rec.gender = Some("female".to_owned());
  s.insert_record(&rec).unwrap();

  let id = s.lookup_ark("ark:/99166/w6one").unwrap().unwrap();
  let entity: String = s
    .conn
    .query_row(
      "SELECT entity_type FROM cpf WHERE id = ?1",
      [id],
      |row| row.get(0),
    )
    .unwrap();
  assert_eq!(entity, "person");

  assert!(s.lookup_ark("ark:/99166/absent").unwrap().is_none());
}

#[test]
fn reimport_adds_a_row_and_lookup_returns_the_latest() {
  let mut s = store();
  s.insert_record(&record("ark:/99166/w6dup")).unwrap();
  s.insert_record(&record("ark:/99166/w6dup")).unwrap();

  assert_eq!(count(&s, "SELECT COUNT(*) FROM cpf"), 2);
  let latest = s.lookup_ark("ark:/99166/w6dup").unwrap().unwrap();
  let max_id = count(&s, "SELECT MAX(id) FROM cpf");
  assert_eq!(latest, max_id);
}

// ─── Names ───────────────────────────────────────────────────────────────────

#[test]
fn first_name_becomes_the_display_name() {
  let mut s = store();

  let mut rec = record("ark:/99166/w6name");
  rec.names = vec![
    NameEntry {
      original:         Some("Liddell, Alice".to_owned()),
      preference_score: Some(99.0),
      contributors:     vec![Contributor {
        short_name: Some("VIAF".to_owned()),
        form:       NameFormKind::AuthorizedForm,
      }],
    },
    NameEntry {
      original:         Some("Alice Liddell".to_owned()),
      preference_score: Some(100.0),
      contributors:     vec![],
    },
  ];
  s.insert_record(&rec).unwrap();

  let (name_id, original): (i64, String) = s
    .conn
    .query_row(
      "SELECT n.id, n.original FROM cpf c JOIN name n ON n.id = c.name_id",
      [],
      |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .unwrap();
  assert_eq!(original, "Liddell, Alice");

  let form: String = s
    .conn
    .query_row(
      "SELECT name_type FROM name_contributor WHERE name_id = ?1",
      [name_id],
      |row| row.get(0),
    )
    .unwrap();
  assert_eq!(form, "authorizedForm");
}

// ─── Lookup-table dedup ──────────────────────────────────────────────────────

#[test]
fn lookup_tables_deduplicate_across_records() {
  let mut s = store();

  for ark in ["ark:/99166/w6a", "ark:/99166/w6b"] {
    let mut rec = record(ark);
    rec.subjects = vec!["Photography".to_owned()];
    rec.occupations = vec!["Photographer".to_owned()];
    rec.nationalities = vec!["British".to_owned()];
    rec.sources = vec![SourceRef {
      source_type: Some("simple".to_owned()),
      href:        Some("http://example.org/s1".to_owned()),
    }];
    rec.names = vec![NameEntry {
      original:         Some(ark.to_owned()),
      preference_score: None,
      contributors:     vec![Contributor {
        short_name: Some("LC".to_owned()),
        form:       NameFormKind::AlternativeForm,
      }],
    }];
    s.insert_record(&rec).unwrap();
  }

  // one lookup row each, two join rows each
  assert_eq!(count(&s, "SELECT COUNT(*) FROM subject"), 1);
  assert_eq!(count(&s, "SELECT COUNT(*) FROM cpf_subject"), 2);
  assert_eq!(count(&s, "SELECT COUNT(*) FROM occupation"), 1);
  assert_eq!(count(&s, "SELECT COUNT(*) FROM cpf_occupation"), 2);
  assert_eq!(count(&s, "SELECT COUNT(*) FROM nationality"), 1);
  assert_eq!(count(&s, "SELECT COUNT(*) FROM source"), 1);
  assert_eq!(count(&s, "SELECT COUNT(*) FROM cpf_sources"), 2);
  assert_eq!(count(&s, "SELECT COUNT(*) FROM contributor"), 1);
  assert_eq!(count(&s, "SELECT COUNT(*) FROM name_contributor"), 2);
}

#[test]
fn sources_and_documents_deduplicate_by_href_alone() {
  let mut s = store();

  for (ark, kind) in
    [("ark:/99166/w6a", "simple"), ("ark:/99166/w6b", "extended")]
  {
    let mut rec = record(ark);
    rec.sources = vec![SourceRef {
      source_type: Some(kind.to_owned()),
      href:        Some("http://example.org/s1".to_owned()),
    }];
    rec.documents = vec![DocumentRef {
      name: Some(ark.to_owned()),
      href: Some("http://example.org/doc1".to_owned()),
      ..DocumentRef::default()
    }];
    s.insert_record(&rec).unwrap();
  }

  // differing source_type / name must not split the href key
  assert_eq!(count(&s, "SELECT COUNT(*) FROM source"), 1);
  assert_eq!(count(&s, "SELECT COUNT(*) FROM cpf_sources"), 2);
  assert_eq!(count(&s, "SELECT COUNT(*) FROM document"), 1);
  assert_eq!(count(&s, "SELECT COUNT(*) FROM cpf_document"), 2);
}

#[test]
fn shared_document_keeps_per_link_role_and_type() {
  let mut s = store();

  for (ark, role) in [
    ("ark:/99166/w6a", "referencedIn"),
    ("ark:/99166/w6b", "creatorOf"),
  ] {
    let mut rec = record(ark);
    rec.documents = vec![DocumentRef {
      name:          Some("Papers".to_owned()),
      href:          Some("http://example.org/doc1".to_owned()),
      document_role: Some(role.to_owned()),
      link_type:     Some("simple".to_owned()),
      ..DocumentRef::default()
    }];
    s.insert_record(&rec).unwrap();
  }

  assert_eq!(count(&s, "SELECT COUNT(*) FROM document"), 1);

  let mut stmt = s
    .conn
    .prepare("SELECT document_role, link_type FROM cpf_document ORDER BY id")
    .unwrap();
  let links: Vec<(String, String)> = stmt
    .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
    .unwrap()
    .collect::<rusqlite::Result<_>>()
    .unwrap();
  assert_eq!(
    links,
    [
      ("referencedIn".to_owned(), "simple".to_owned()),
      ("creatorOf".to_owned(), "simple".to_owned()),
    ]
  );
}

// ─── Dates ───────────────────────────────────────────────────────────────────

#[test]
fn date_rows_carry_endpoint_columns() {
  let mut s = store();

  let mut rec = record("ark:/99166/w6dates");
  rec.dates = vec![
    ExistDate::Range {
      from: None,
      to:   Some(DateValue {
        standard:  Some("1934-11-16".to_owned()),
        original:  "1934".to_owned(),
        qualifier: Some("Death".to_owned()),
      }),
    },
    ExistDate::Single(DateValue {
      standard:  Some("1900-01-01".to_owned()),
      original:  "1900".to_owned(),
      qualifier: None,
    }),
  ];
  s.insert_record(&rec).unwrap();

  let (from_orig, to_orig, to_type, is_range): (
    Option<String>,
    Option<String>,
    Option<String>,
    bool,
  ) = s
    .conn
    .query_row(
      "SELECT from_original, to_original, to_type, is_range
       FROM dates WHERE is_range = 1",
      [],
      |row| {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
      },
    )
    .unwrap();
  assert_eq!(from_orig, None);
  assert_eq!(to_orig.as_deref(), Some("1934"));
  assert_eq!(to_type.as_deref(), Some("Death"));
  assert!(is_range);

  let single: String = s
    .conn
    .query_row(
      "SELECT from_original FROM dates WHERE is_range = 0",
      [],
      |row| row.get(0),
    )
    .unwrap();
  assert_eq!(single, "1900");
}

// ─── History ─────────────────────────────────────────────────────────────────

#[test]
fn maintenance_events_keep_insert_order() {
  let mut s = store();

  let mut rec = record("ark:/99166/w6hist");
  rec.maintenance_events = vec![
    MaintenanceEvent {
      event_type: Some("created".to_owned()),
      ..MaintenanceEvent::default()
    },
    MaintenanceEvent {
      event_type: Some("revised".to_owned()),
      ..MaintenanceEvent::default()
    },
  ];
  rec.biog_hist = Some("<biogHist><p>x</p></biogHist>".to_owned());
  s.insert_record(&rec).unwrap();

  let mut stmt = s
    .conn
    .prepare("SELECT event_type FROM cpf_history ORDER BY id")
    .unwrap();
  let types: Vec<String> = stmt
    .query_map([], |row| row.get(0))
    .unwrap()
    .collect::<rusqlite::Result<_>>()
    .unwrap();
  assert_eq!(types, ["created", "revised"]);

  let biog: String = s
    .conn
    .query_row("SELECT biog_hist FROM cpf", [], |row| row.get(0))
    .unwrap();
  assert!(biog.contains("<p>x</p>"));
}

// ─── Relations ───────────────────────────────────────────────────────────────

#[test]
fn relations_need_both_endpoints() {
  let mut s = store();

  let mut alice = record("ark:/99166/w6alice");
  alice.relations = vec![
    RelationRef {
      relation_type: Some("associatedWith".to_owned()),
      other_type:    Some("Person".to_owned()),
      target_ark:    Some("ark:/99166/w6lewis".to_owned()),
      entry:         "Carroll, Lewis".to_owned(),
    },
    RelationRef {
      relation_type: Some("associatedWith".to_owned()),
      other_type:    Some("Person".to_owned()),
      target_ark:    Some("ark:/99166/w6missing".to_owned()),
      entry:         "Nobody".to_owned(),
    },
  ];
  let lewis = record("ark:/99166/w6lewis");

  s.insert_record(&alice).unwrap();
  s.insert_record(&lewis).unwrap();

  // second pass: only the edge whose target exists lands
  assert_eq!(s.resolve_relations(&alice).unwrap(), 1);
  assert_eq!(s.resolve_relations(&lewis).unwrap(), 0);
  assert_eq!(count(&s, "SELECT COUNT(*) FROM cpf_relations"), 1);

  let entry: String = s
    .conn
    .query_row(
      "SELECT relation_entry FROM cpf_relations",
      [],
      |row| row.get(0),
    )
    .unwrap();
  assert_eq!(entry, "Carroll, Lewis");
}

// ─── Checkpointing ───────────────────────────────────────────────────────────

#[test]
fn writes_continue_after_a_checkpoint() {
  let mut s = store();
  s.insert_record(&record("ark:/99166/w6one")).unwrap();
  s.checkpoint().unwrap();
  s.insert_record(&record("ark:/99166/w6two")).unwrap();
  s.checkpoint().unwrap();

  assert_eq!(count(&s, "SELECT COUNT(*) FROM cpf"), 2);
}
