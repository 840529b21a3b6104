//! SQL schema for the CPF relational database.
//!
//! Executed once at connection startup. Lookup tables (source, occupation,
//! subject, nationality, document, contributor) are shared across records
//! and deduplicated at insert time; `cpf.ark_id` carries an index but no
//! UNIQUE constraint, so re-importing a document adds a fresh row instead of
//! failing mid-batch.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS cpf (
    id                  INTEGER PRIMARY KEY,
    ark_id              TEXT NOT NULL,
    entity_type         TEXT,
    name_id             INTEGER,        -- preferred name; set after names land
    biog_hist           TEXT,           -- merged biogHist XML fragment
    language_code       TEXT,
    script_code         TEXT,
    language_used       TEXT,
    script_used         TEXT,
    gender              TEXT,
    maintenance_status  TEXT,
    maintenance_agency  TEXT,
    convention_citation TEXT
);

CREATE TABLE IF NOT EXISTS name (
    id               INTEGER PRIMARY KEY,
    cpf_id           INTEGER NOT NULL REFERENCES cpf(id),
    original         TEXT,
    preference_score REAL
);

CREATE TABLE IF NOT EXISTS contributor (
    id         INTEGER PRIMARY KEY,
    short_name TEXT
);

CREATE TABLE IF NOT EXISTS name_contributor (
    id             INTEGER PRIMARY KEY,
    name_id        INTEGER NOT NULL REFERENCES name(id),
    contributor_id INTEGER NOT NULL REFERENCES contributor(id),
    name_type      TEXT NOT NULL   -- 'alternativeForm' | 'authorizedForm'
);

CREATE TABLE IF NOT EXISTS dates (
    id            INTEGER PRIMARY KEY,
    cpf_id        INTEGER NOT NULL REFERENCES cpf(id),
    from_date     TEXT,            -- normalized (standardDate)
    from_original TEXT,            -- display text as written
    from_type     TEXT,            -- e.g. 'Birth'
    to_date       TEXT,
    to_original   TEXT,
    to_type       TEXT,
    is_range      INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS source (
    id          INTEGER PRIMARY KEY,
    source_type TEXT,
    href        TEXT
);

CREATE TABLE IF NOT EXISTS cpf_sources (
    id        INTEGER PRIMARY KEY,
    cpf_id    INTEGER NOT NULL REFERENCES cpf(id),
    source_id INTEGER NOT NULL REFERENCES source(id)
);

CREATE TABLE IF NOT EXISTS occupation (
    id         INTEGER PRIMARY KEY,
    occupation TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS cpf_occupation (
    id            INTEGER PRIMARY KEY,
    cpf_id        INTEGER NOT NULL REFERENCES cpf(id),
    occupation_id INTEGER NOT NULL REFERENCES occupation(id)
);

CREATE TABLE IF NOT EXISTS subject (
    id      INTEGER PRIMARY KEY,
    subject TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS cpf_subject (
    id         INTEGER PRIMARY KEY,
    cpf_id     INTEGER NOT NULL REFERENCES cpf(id),
    subject_id INTEGER NOT NULL REFERENCES subject(id)
);

CREATE TABLE IF NOT EXISTS nationality (
    id          INTEGER PRIMARY KEY,
    nationality TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS cpf_nationality (
    id             INTEGER PRIMARY KEY,
    cpf_id         INTEGER NOT NULL REFERENCES cpf(id),
    nationality_id INTEGER NOT NULL REFERENCES nationality(id)
);

CREATE TABLE IF NOT EXISTS document (
    id            INTEGER PRIMARY KEY,
    name          TEXT,
    href          TEXT,
    document_type TEXT,
    xml_source    TEXT,
    notes         TEXT
);

-- role and link_type vary per referencing record, so they live on the
-- link row, not on the shared document row
CREATE TABLE IF NOT EXISTS cpf_document (
    id            INTEGER PRIMARY KEY,
    cpf_id        INTEGER NOT NULL REFERENCES cpf(id),
    document_id   INTEGER NOT NULL REFERENCES document(id),
    document_role TEXT,
    link_type     TEXT
);

CREATE TABLE IF NOT EXISTS cpf_history (
    id          INTEGER PRIMARY KEY,
    cpf_id      INTEGER NOT NULL REFERENCES cpf(id),
    event_type  TEXT,
    event_time  TEXT,
    agent_type  TEXT,
    agent       TEXT,
    description TEXT
);

CREATE TABLE IF NOT EXISTS cpf_otherids (
    id        INTEGER PRIMARY KEY,
    cpf_id    INTEGER NOT NULL REFERENCES cpf(id),
    link_type TEXT,
    other_id  TEXT
);

CREATE TABLE IF NOT EXISTS cpf_relations (
    id             INTEGER PRIMARY KEY,
    cpf_id1        INTEGER NOT NULL REFERENCES cpf(id),
    cpf_id2        INTEGER NOT NULL REFERENCES cpf(id),
    relation_type  TEXT,
    relation_entry TEXT
);

CREATE INDEX IF NOT EXISTS cpf_ark_idx          ON cpf(ark_id);
CREATE INDEX IF NOT EXISTS name_cpf_idx         ON name(cpf_id);
CREATE INDEX IF NOT EXISTS dates_cpf_idx        ON dates(cpf_id);
CREATE INDEX IF NOT EXISTS source_href_idx      ON source(href);
CREATE INDEX IF NOT EXISTS occupation_term_idx  ON occupation(occupation);
CREATE INDEX IF NOT EXISTS subject_term_idx     ON subject(subject);
CREATE INDEX IF NOT EXISTS nationality_term_idx ON nationality(nationality);
CREATE INDEX IF NOT EXISTS document_href_idx    ON document(href);
CREATE INDEX IF NOT EXISTS relations_cpf1_idx   ON cpf_relations(cpf_id1);

PRAGMA user_version = 1;
";
