//! Flat-file SQL sink: records become `INSERT` statement files for later
//! bulk loading.
//!
//! One file per lookup table, written in arrival order. Nothing is
//! deduplicated here; that is left to the loading step (or to the SQLite
//! sink, which resolves natural keys at insert time).

use std::{
  fs::File,
  io::{BufWriter, Write},
  path::Path,
};

use thiserror::Error;

use cpf_core::{RecordSink, record::CpfRecord};

#[derive(Debug, Error)]
pub enum SinkError {
  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = SinkError> = std::result::Result<T, E>;

// ─── Literals ────────────────────────────────────────────────────────────────

/// Quote a value as a SQL string literal, `NULL` for absent values.
fn sql_literal(value: Option<&str>) -> String {
  match value {
    Some(v) => format!("'{}'", v.replace('\'', "''")),
    None => "NULL".to_owned(),
  }
}

/// Embedded XML keeps its markup but loses line breaks, so each statement
/// stays on one line.
fn flatten(value: &str) -> String {
  value.replace(['\n', '\r'], "")
}

// ─── Sink ────────────────────────────────────────────────────────────────────

/// Writes lookup-table `INSERT` statements to six `.sql` files under one
/// directory.
pub struct SqlFileSink {
  source:      BufWriter<File>,
  occupation:  BufWriter<File>,
  subject:     BufWriter<File>,
  nationality: BufWriter<File>,
  document:    BufWriter<File>,
  contributor: BufWriter<File>,
}

impl SqlFileSink {
  /// Create (truncating) the output files under `dir`.
  pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
    let dir = dir.as_ref();
    let open = |name: &str| -> Result<BufWriter<File>> {
      Ok(BufWriter::new(File::create(dir.join(name))?))
    };
    Ok(Self {
      source:      open("source.sql")?,
      occupation:  open("occupation.sql")?,
      subject:     open("subject.sql")?,
      nationality: open("nationality.sql")?,
      document:    open("document.sql")?,
      contributor: open("contributor.sql")?,
    })
  }
}

impl RecordSink for SqlFileSink {
  type Error = SinkError;

  fn insert_record(&mut self, record: &CpfRecord) -> Result<()> {
    for source in &record.sources {
      writeln!(
        self.source,
        "INSERT INTO source (source_type, href) values ({}, {});",
        sql_literal(source.source_type.as_deref()),
        sql_literal(source.href.as_deref()),
      )?;
    }

    for occupation in &record.occupations {
      writeln!(
        self.occupation,
        "INSERT INTO occupation (occupation) values ({});",
        sql_literal(Some(occupation)),
      )?;
    }

    for subject in &record.subjects {
      writeln!(
        self.subject,
        "INSERT INTO subject (subject) values ({});",
        sql_literal(Some(subject)),
      )?;
    }

    for nationality in &record.nationalities {
      writeln!(
        self.nationality,
        "INSERT INTO nationality (nationality) values ({});",
        sql_literal(Some(nationality)),
      )?;
    }

    for doc in &record.documents {
      let xml_source = doc.xml_source.as_deref().map(flatten);
      let notes = doc.notes.as_deref().map(flatten);
      writeln!(
        self.document,
        "INSERT INTO document (name, href, document_type, document_role, \
         link_type, xml_source, notes) values ({}, {}, {}, {}, {}, {}, {});",
        sql_literal(doc.name.as_deref()),
        sql_literal(doc.href.as_deref()),
        sql_literal(doc.document_type.as_deref()),
        sql_literal(doc.document_role.as_deref()),
        sql_literal(doc.link_type.as_deref()),
        sql_literal(xml_source.as_deref()),
        sql_literal(notes.as_deref()),
      )?;
    }

    for name in &record.names {
      for contributor in &name.contributors {
        writeln!(
          self.contributor,
          "INSERT INTO contributor (short_name) values ({});",
          sql_literal(contributor.short_name.as_deref()),
        )?;
      }
    }

    Ok(())
  }

  /// Relation edges need row ids, which only exist after loading; the
  /// flat-file sink has none to offer.
  fn resolve_relations(&mut self, _record: &CpfRecord) -> Result<usize> {
    Ok(0)
  }

  fn checkpoint(&mut self) -> Result<()> {
    self.source.flush()?;
    self.occupation.flush()?;
    self.subject.flush()?;
    self.nationality.flush()?;
    self.document.flush()?;
    self.contributor.flush()?;
    Ok(())
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
