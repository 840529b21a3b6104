//! [`SqliteStore`] — the SQLite implementation of [`RecordSink`].

use std::path::Path;

use rusqlite::{Connection, OptionalExtension as _, params};

use cpf_core::{
  RecordSink,
  record::{CpfRecord, DateValue, DocumentRef, ExistDate, SourceRef},
};

use crate::{Error, Result, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A CPF relational store backed by a single SQLite file.
///
/// All writes land inside an explicit transaction; nothing is durable until
/// [`RecordSink::checkpoint`] commits it.
pub struct SqliteStore {
  pub(crate) conn: Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path`, run schema initialisation, and
  /// begin the first transaction.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::init(Connection::open(path)?)
  }

  /// Open an in-memory store — useful for testing.
  pub fn open_in_memory() -> Result<Self> {
    Self::init(Connection::open_in_memory()?)
  }

  fn init(conn: Connection) -> Result<Self> {
    conn.execute_batch(SCHEMA)?;
    conn.execute_batch("BEGIN")?;
    Ok(Self { conn })
  }

  /// Row id of the most recently inserted record carrying `ark`, if any.
  pub fn lookup_ark(&self, ark: &str) -> Result<Option<i64>> {
    Ok(
      self
        .conn
        .query_row(
          "SELECT id FROM cpf WHERE ark_id = ?1 ORDER BY id DESC LIMIT 1",
          params![ark],
          |row| row.get(0),
        )
        .optional()?,
    )
  }

  // ── Lookup-table find-or-create ───────────────────────────────────────────

  /// Find-or-create for single-column lookup tables (occupation, subject,
  /// nationality). `table` and `column` only ever come from string literals
  /// in this crate.
  fn term_id(&self, table: &str, column: &str, value: &str) -> Result<i64> {
    let existing: Option<i64> = self
      .conn
      .query_row(
        &format!("SELECT id FROM {table} WHERE {column} = ?1 LIMIT 1"),
        params![value],
        |row| row.get(0),
      )
      .optional()?;
    if let Some(id) = existing {
      return Ok(id);
    }

    self.conn.execute(
      &format!("INSERT INTO {table} ({column}) VALUES (?1)"),
      params![value],
    )?;
    Ok(self.conn.last_insert_rowid())
  }

  // Sources and documents deduplicate on href alone; `IS` instead of `=`
  // so an absent href still forms the key.

  fn source_id(&self, source: &SourceRef) -> Result<i64> {
    let existing: Option<i64> = self
      .conn
      .query_row(
        "SELECT id FROM source WHERE href IS ?1 LIMIT 1",
        params![source.href],
        |row| row.get(0),
      )
      .optional()?;
    if let Some(id) = existing {
      return Ok(id);
    }

    self.conn.execute(
      "INSERT INTO source (source_type, href) VALUES (?1, ?2)",
      params![source.source_type, source.href],
    )?;
    Ok(self.conn.last_insert_rowid())
  }

  fn document_id(&self, doc: &DocumentRef) -> Result<i64> {
    let existing: Option<i64> = self
      .conn
      .query_row(
        "SELECT id FROM document WHERE href IS ?1 LIMIT 1",
        params![doc.href],
        |row| row.get(0),
      )
      .optional()?;
    if let Some(id) = existing {
      return Ok(id);
    }

    self.conn.execute(
      "INSERT INTO document (name, href, document_type, xml_source, notes)
       VALUES (?1, ?2, ?3, ?4, ?5)",
      params![doc.name, doc.href, doc.document_type, doc.xml_source, doc.notes],
    )?;
    Ok(self.conn.last_insert_rowid())
  }

  fn contributor_id(&self, short_name: Option<&str>) -> Result<i64> {
    let existing: Option<i64> = self
      .conn
      .query_row(
        "SELECT id FROM contributor WHERE short_name IS ?1 LIMIT 1",
        params![short_name],
        |row| row.get(0),
      )
      .optional()?;
    if let Some(id) = existing {
      return Ok(id);
    }

    self.conn.execute(
      "INSERT INTO contributor (short_name) VALUES (?1)",
      params![short_name],
    )?;
    Ok(self.conn.last_insert_rowid())
  }

  fn insert_date(&self, cpf_id: i64, date: &ExistDate) -> Result<()> {
    let (from, to, is_range): (Option<&DateValue>, _, _) = match date {
      ExistDate::Single(value) => (Some(value), None, false),
      ExistDate::Range { from, to } => (from.as_ref(), to.as_ref(), true),
    };

    self.conn.execute(
      "INSERT INTO dates
         (cpf_id, from_date, from_original, from_type,
          to_date, to_original, to_type, is_range)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
      params![
        cpf_id,
        from.and_then(|v| v.standard.as_deref()),
        from.map(|v| v.original.as_str()),
        from.and_then(|v| v.qualifier.as_deref()),
        to.and_then(|v| v.standard.as_deref()),
        to.map(|v| v.original.as_str()),
        to.and_then(|v| v.qualifier.as_deref()),
        is_range,
      ],
    )?;
    Ok(())
  }
}

// ─── RecordSink impl ─────────────────────────────────────────────────────────

impl RecordSink for SqliteStore {
  type Error = Error;

  fn insert_record(&mut self, record: &CpfRecord) -> Result<()> {
    self.conn.execute(
      "INSERT INTO cpf
         (ark_id, entity_type, language_code, script_code,
          language_used, script_used, gender,
          maintenance_status, maintenance_agency, convention_citation)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
      params![
        record.ark_id,
        record.entity_type,
        record.language_code,
        record.script_code,
        record.language_used,
        record.script_used,
        record.gender,
        record.maintenance_status,
        record.maintenance_agency,
        record.convention_citation,
      ],
    )?;
    let cpf_id = self.conn.last_insert_rowid();

    for date in &record.dates {
      self.insert_date(cpf_id, date)?;
    }

    for source in &record.sources {
      let source_id = self.source_id(source)?;
      self.conn.execute(
        "INSERT INTO cpf_sources (cpf_id, source_id) VALUES (?1, ?2)",
        params![cpf_id, source_id],
      )?;
    }

    for occupation in &record.occupations {
      let occupation_id = self.term_id("occupation", "occupation", occupation)?;
      self.conn.execute(
        "INSERT INTO cpf_occupation (cpf_id, occupation_id) VALUES (?1, ?2)",
        params![cpf_id, occupation_id],
      )?;
    }

    for subject in &record.subjects {
      let subject_id = self.term_id("subject", "subject", subject)?;
      self.conn.execute(
        "INSERT INTO cpf_subject (cpf_id, subject_id) VALUES (?1, ?2)",
        params![cpf_id, subject_id],
      )?;
    }

    for nationality in &record.nationalities {
      let nationality_id =
        self.term_id("nationality", "nationality", nationality)?;
      self.conn.execute(
        "INSERT INTO cpf_nationality (cpf_id, nationality_id) VALUES (?1, ?2)",
        params![cpf_id, nationality_id],
      )?;
    }

    for event in &record.maintenance_events {
      self.conn.execute(
        "INSERT INTO cpf_history
           (cpf_id, event_type, event_time, agent_type, agent, description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
          cpf_id,
          event.event_type,
          event.event_time,
          event.agent_type,
          event.agent,
          event.description,
        ],
      )?;
    }

    for other in &record.other_ids {
      self.conn.execute(
        "INSERT INTO cpf_otherids (cpf_id, link_type, other_id)
         VALUES (?1, ?2, ?3)",
        params![cpf_id, other.link_type, other.other_id],
      )?;
    }

    for doc in &record.documents {
      let document_id = self.document_id(doc)?;
      self.conn.execute(
        "INSERT INTO cpf_document (cpf_id, document_id, document_role, link_type)
         VALUES (?1, ?2, ?3, ?4)",
        params![cpf_id, document_id, doc.document_role, doc.link_type],
      )?;
    }

    for (index, name) in record.names.iter().enumerate() {
      self.conn.execute(
        "INSERT INTO name (cpf_id, original, preference_score)
         VALUES (?1, ?2, ?3)",
        params![cpf_id, name.original, name.preference_score],
      )?;
      let name_id = self.conn.last_insert_rowid();

      // the first name in document order becomes the record's display name
      if index == 0 {
        self.conn.execute(
          "UPDATE cpf SET name_id = ?1 WHERE id = ?2",
          params![name_id, cpf_id],
        )?;
      }

      for contributor in &name.contributors {
        let contributor_id =
          self.contributor_id(contributor.short_name.as_deref())?;
        self.conn.execute(
          "INSERT INTO name_contributor (name_id, contributor_id, name_type)
           VALUES (?1, ?2, ?3)",
          params![name_id, contributor_id, contributor.form.as_str()],
        )?;
      }
    }

    if let Some(biog_hist) = &record.biog_hist {
      self.conn.execute(
        "UPDATE cpf SET biog_hist = ?1 WHERE id = ?2",
        params![biog_hist, cpf_id],
      )?;
    }

    Ok(())
  }

  fn resolve_relations(&mut self, record: &CpfRecord) -> Result<usize> {
    let Some(cpf_id) = self.lookup_ark(&record.ark_id)? else {
      return Ok(0);
    };

    let mut inserted = 0;
    for relation in &record.relations {
      // both endpoints must already exist as rows; dangling edges are
      // dropped
      let target_id = match relation.target_ark.as_deref() {
        Some(ark) => self.lookup_ark(ark)?,
        None => None,
      };
      let Some(target_id) = target_id else { continue };

      self.conn.execute(
        "INSERT INTO cpf_relations
           (cpf_id1, cpf_id2, relation_type, relation_entry)
         VALUES (?1, ?2, ?3, ?4)",
        params![cpf_id, target_id, relation.relation_type, relation.entry],
      )?;
      inserted += 1;
    }
    Ok(inserted)
  }

  fn checkpoint(&mut self) -> Result<()> {
    self.conn.execute_batch("COMMIT; BEGIN;")?;
    Ok(())
  }
}
