//! `cpf-import` — batch importer for EAC-CPF XML documents.
//!
//! Reads `cpf-import.toml` (or the path given with `--config`), maps each
//! input document to a record, and feeds the records to the configured
//! sink. Input paths come from the command line, or from stdin (one path
//! per line) when none are given:
//!
//! ```
//! find corpus/ -name '*.xml' | cpf-import --sink sqlite --database cpf.db
//! cpf-import --sink files --output-dir out/ corpus/*.xml
//! ```
//!
//! Diagnostics go to stderr via `tracing`; the final batch summary is the
//! only thing printed to stdout.

use std::{
  fs,
  io::{self, BufRead as _, Write as _},
  path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use cpf_core::{CodeLabelCache, CpfRecord, RecordSink};
use cpf_sqlfile::SqlFileSink;
use cpf_store_sqlite::SqliteStore;
use cpf_xml::Strictness;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "EAC-CPF to relational-database importer")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "cpf-import.toml")]
  config: PathBuf,

  /// Where mapped records go.
  #[arg(long, value_enum)]
  sink: Option<SinkKind>,

  /// SQLite database path (sqlite sink).
  #[arg(long)]
  database: Option<PathBuf>,

  /// Directory for the generated .sql files (files sink).
  #[arg(long)]
  output_dir: Option<PathBuf>,

  /// Fail a document on the first unrecognized element instead of warning.
  #[arg(long)]
  strict: bool,

  /// Commit after every N records.
  #[arg(long)]
  checkpoint: Option<usize>,

  /// Input documents; read from stdin when empty.
  files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
enum SinkKind {
  /// Insert into a SQLite database, relations resolved.
  Sqlite,
  /// Write lookup-table INSERT statements to flat .sql files.
  Files,
  /// Dump each record as one JSON line on stdout.
  Json,
}

// ─── Config file ─────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file; CLI flags override it.
#[derive(Debug, Deserialize)]
struct ImportConfig {
  #[serde(default = "default_sink")]
  sink:                SinkKind,
  #[serde(default = "default_database")]
  database:            PathBuf,
  #[serde(default = "default_output_dir")]
  output_dir:          PathBuf,
  #[serde(default)]
  strictness:          Strictness,
  #[serde(default = "default_checkpoint_interval")]
  checkpoint_interval: usize,
}

fn default_sink() -> SinkKind { SinkKind::Sqlite }
fn default_database() -> PathBuf { PathBuf::from("cpf.db") }
fn default_output_dir() -> PathBuf { PathBuf::from(".") }
fn default_checkpoint_interval() -> usize { 1000 }

// ─── Entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config.clone()).required(false))
    .add_source(config::Environment::with_prefix("CPF"))
    .build()
    .context("failed to read config file")?;

  let mut cfg: ImportConfig = settings
    .try_deserialize()
    .context("failed to deserialise ImportConfig")?;

  // CLI flags override the config file.
  if let Some(sink) = cli.sink {
    cfg.sink = sink;
  }
  if let Some(database) = cli.database {
    cfg.database = database;
  }
  if let Some(output_dir) = cli.output_dir {
    cfg.output_dir = output_dir;
  }
  if cli.strict {
    cfg.strictness = Strictness::Strict;
  }
  if let Some(interval) = cli.checkpoint {
    cfg.checkpoint_interval = interval;
  }

  let paths = if cli.files.is_empty() {
    paths_from_stdin()?
  } else {
    cli.files
  };

  let summary = match cfg.sink {
    SinkKind::Sqlite => {
      let store = SqliteStore::open(&cfg.database).with_context(|| {
        format!("failed to open database at {:?}", cfg.database)
      })?;
      run_batch(&paths, store, &cfg)?
    }
    SinkKind::Files => {
      fs::create_dir_all(&cfg.output_dir).with_context(|| {
        format!("failed to create output directory {:?}", cfg.output_dir)
      })?;
      let sink = SqlFileSink::create(&cfg.output_dir)
        .context("failed to create output files")?;
      run_batch(&paths, sink, &cfg)?
    }
    SinkKind::Json => run_batch(&paths, JsonSink::stdout(), &cfg)?,
  };

  println!(
    "imported {} of {} documents ({} failed), {} relation edges",
    summary.imported,
    paths.len(),
    summary.failed,
    summary.relations,
  );
  Ok(())
}

fn paths_from_stdin() -> anyhow::Result<Vec<PathBuf>> {
  let mut paths = Vec::new();
  for line in io::stdin().lock().lines() {
    let line = line.context("failed to read path from stdin")?;
    let trimmed = line.trim();
    if !trimmed.is_empty() {
      paths.push(PathBuf::from(trimmed));
    }
  }
  Ok(paths)
}

// ─── Batch driver ────────────────────────────────────────────────────────────

struct BatchSummary {
  imported:  usize,
  failed:    usize,
  relations: usize,
}

/// Two passes over the corpus: insert every record, then resolve relation
/// edges once every possible target row exists.
///
/// A document that fails to read or map is logged and skipped; a sink error
/// aborts the batch (the storage itself is in doubt at that point).
fn run_batch<S: RecordSink>(
  paths: &[PathBuf],
  mut sink: S,
  cfg: &ImportConfig,
) -> anyhow::Result<BatchSummary> {
  let mut cache = CodeLabelCache::default();
  let mut records: Vec<CpfRecord> = Vec::new();
  let mut failed = 0;
  let interval = cfg.checkpoint_interval.max(1);

  for path in paths {
    tracing::info!(file = %path.display(), "parsing");
    match map_file(path, &mut cache, cfg.strictness) {
      Ok(record) => {
        sink
          .insert_record(&record)
          .with_context(|| format!("sink rejected {}", path.display()))?;
        records.push(record);

        if records.len() % interval == 0 {
          sink.checkpoint().context("checkpoint failed")?;
          tracing::info!(records = records.len(), "checkpoint");
        }
      }
      Err(error) => {
        tracing::error!(file = %path.display(), "skipping: {error}");
        failed += 1;
      }
    }
  }
  sink.checkpoint().context("checkpoint failed")?;

  let mut relations = 0;
  for record in &records {
    relations += sink
      .resolve_relations(record)
      .with_context(|| format!("resolving relations of {}", record.ark_id))?;
  }
  sink.checkpoint().context("checkpoint failed")?;

  tracing::info!(
    imported = records.len(),
    failed,
    relations,
    "batch complete"
  );
  Ok(BatchSummary {
    imported: records.len(),
    failed,
    relations,
  })
}

fn map_file(
  path: &Path,
  cache: &mut CodeLabelCache,
  strictness: Strictness,
) -> anyhow::Result<CpfRecord> {
  let input = fs::read_to_string(path)
    .with_context(|| format!("failed to read {}", path.display()))?;
  let mapped = cpf_xml::map_record(&input, cache, strictness)
    .with_context(|| format!("failed to map {}", path.display()))?;

  for warning in &mapped.warnings {
    tracing::warn!(file = %path.display(), "{warning}");
  }
  Ok(mapped.record)
}

// ─── JSON sink ───────────────────────────────────────────────────────────────

/// Debug/inspection sink: one JSON object per record, one per line.
struct JsonSink {
  out: io::Stdout,
}

impl JsonSink {
  fn stdout() -> Self {
    Self { out: io::stdout() }
  }
}

#[derive(Debug, thiserror::Error)]
enum JsonSinkError {
  #[error("i/o error: {0}")]
  Io(#[from] io::Error),
  #[error("serialization error: {0}")]
  Serialize(#[from] serde_json::Error),
}

impl RecordSink for JsonSink {
  type Error = JsonSinkError;

  fn insert_record(&mut self, record: &CpfRecord) -> Result<(), JsonSinkError> {
    let line =
      serde_json::to_string(record).map_err(JsonSinkError::Serialize)?;
    writeln!(self.out, "{line}").map_err(JsonSinkError::Io)?;
    Ok(())
  }

  fn resolve_relations(&mut self, _record: &CpfRecord) -> Result<usize, JsonSinkError> {
    Ok(0)
  }

  fn checkpoint(&mut self) -> Result<(), JsonSinkError> {
    self.out.flush().map_err(JsonSinkError::Io)?;
    Ok(())
  }
}
