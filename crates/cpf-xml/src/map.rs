//! The mapping pass: one walk over an EAC-CPF document tree, producing a
//! [`CpfRecord`] plus the warnings gathered along the way.
//!
//! Dispatch is by local tag name, section by section, in document order.
//! Anything without a rule is reported through the warning channel and
//! skipped; under the strict policy the same condition fails the document.

use cpf_core::{
  CodeLabelCache,
  record::{
    Contributor, CpfRecord, DateValue, DocumentRef, ExistDate,
    MaintenanceEvent, NameEntry, NameFormKind, OtherId, RelationRef,
    SourceRef,
  },
};

use crate::{
  MappedRecord, Strictness,
  dom::Element,
  error::{Error, Result},
  term::term_of,
  warn::Warning,
};

// ─── Namespaces ──────────────────────────────────────────────────────────────

pub const NS_XLINK: &str = "http://www.w3.org/1999/xlink";
pub const NS_SNAC: &str = "http://socialarchive.iath.virginia.edu/";

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn owned_text(el: &Element) -> Option<String> {
  el.text_opt().map(str::to_owned)
}

fn owned_attr(el: &Element, local: &str) -> Option<String> {
  el.attr(local).map(str::to_owned)
}

fn attr_term(el: &Element, local: &str) -> Option<String> {
  el.attr(local).map(|v| term_of(v).to_owned())
}

fn xlink_term(el: &Element, local: &str) -> Option<String> {
  el.attr_ns(NS_XLINK, local).map(|v| term_of(v).to_owned())
}

/// Endpoint extraction: `None` when the element has no display text — such
/// an endpoint is dropped entirely, normalized value or not.
fn date_value(el: &Element) -> Option<DateValue> {
  let original = owned_text(el)?;
  Some(DateValue {
    standard: owned_attr(el, "standardDate"),
    original,
    qualifier: attr_term(el, "localType"),
  })
}

// ─── Mapper ──────────────────────────────────────────────────────────────────

struct Mapper<'a> {
  cache:      &'a mut CodeLabelCache,
  strictness: Strictness,
  warnings:   Vec<Warning>,
}

impl Mapper<'_> {
  fn warn(&mut self, path: &[&str], message: String) -> Result<()> {
    match self.strictness {
      Strictness::Strict => Err(Error::UnknownContent {
        path: path.join("/"),
        message,
      }),
      Strictness::Lenient => {
        self.warnings.push(Warning::new(path, message));
        Ok(())
      }
    }
  }

  fn unknown_tag(&mut self, path: &[&str], tag: &str) -> Result<()> {
    self.warn(path, format!("unknown tag \"{tag}\""))
  }

  /// The schema allows at most one child element here; anything after the
  /// first is reported but the first child's value is still used.
  fn check_single_child(&mut self, path: &[&str], el: &Element) -> Result<()> {
    if let Some(extra) = el.children.get(1) {
      self.warn(path, format!("unexpected extra child \"{}\"", extra.local()))?;
    }
    Ok(())
  }

  // ── control ──────────────────────────────────────────────────────────────

  fn map_control(&mut self, node: &Element, rec: &mut CpfRecord) -> Result<()> {
    for control in &node.children {
      match control.local() {
        "recordId" => {
          rec.ark_id = owned_text(control).unwrap_or_default();
        }
        "otherRecordId" => rec.other_ids.push(OtherId {
          link_type: attr_term(control, "localType"),
          other_id:  owned_text(control),
        }),
        "maintenanceStatus" => rec.maintenance_status = owned_text(control),
        "maintenanceAgency" => {
          rec.maintenance_agency =
            control.first_child().and_then(owned_text);
        }
        "languageDeclaration" => self.map_language_declaration(control, rec),
        "conventionDeclaration" => {
          rec.convention_citation =
            control.first_child().and_then(owned_text);
        }
        "maintenanceHistory" => self.map_maintenance_history(control, rec)?,
        "sources" => {
          for source in &control.children {
            rec.sources.push(SourceRef {
              source_type: source
                .attr_ns(NS_XLINK, "type")
                .map(str::to_owned),
              href:        source
                .attr_ns(NS_XLINK, "href")
                .map(str::to_owned),
            });
          }
        }
        other => self.unknown_tag(&["control"], other)?,
      }
    }
    Ok(())
  }

  /// First child is the language declaration, second the script declaration.
  /// Both codes also feed the batch-wide code→label cache.
  fn map_language_declaration(&mut self, node: &Element, rec: &mut CpfRecord) {
    if let Some(language) = node.children.first() {
      rec.language_code = owned_attr(language, "languageCode");
      if let (Some(code), Some(label)) =
        (language.attr("languageCode"), language.text_opt())
      {
        self.cache.record_language(code, label);
      }
    }
    if let Some(script) = node.children.get(1) {
      rec.script_code = owned_attr(script, "scriptCode");
      if let (Some(code), Some(label)) =
        (script.attr("scriptCode"), script.text_opt())
      {
        self.cache.record_script(code, label);
      }
    }
  }

  fn map_maintenance_history(
    &mut self,
    node: &Element,
    rec: &mut CpfRecord,
  ) -> Result<()> {
    for event_el in &node.children {
      if event_el.local() != "maintenanceEvent" {
        self.unknown_tag(
          &["control", "maintenanceHistory"],
          event_el.local(),
        )?;
        continue;
      }

      let mut event = MaintenanceEvent::default();
      for part in &event_el.children {
        match part.local() {
          "eventType" => event.event_type = owned_text(part),
          "eventDateTime" => event.event_time = owned_text(part),
          "agentType" => event.agent_type = owned_text(part),
          "agent" => event.agent = owned_text(part),
          "eventDescription" => event.description = owned_text(part),
          other => self.unknown_tag(
            &["control", "maintenanceHistory", "maintenanceEvent"],
            other,
          )?,
        }
      }
      // append order is the history; never sorted
      rec.maintenance_events.push(event);
    }
    Ok(())
  }

  // ── cpfDescription ───────────────────────────────────────────────────────

  fn map_cpf_description<'el>(
    &mut self,
    node: &'el Element,
    rec: &mut CpfRecord,
    biog_hists: &mut Vec<&'el Element>,
  ) -> Result<()> {
    for desc in &node.children {
      match desc.local() {
        "identity" => self.map_identity(desc, rec)?,
        "description" => self.map_description(desc, rec, biog_hists)?,
        "relations" => self.map_relations(desc, rec)?,
        other => self.unknown_tag(&["cpfDescription"], other)?,
      }
    }
    Ok(())
  }

  fn map_identity(&mut self, node: &Element, rec: &mut CpfRecord) -> Result<()> {
    for ident in &node.children {
      match ident.local() {
        "entityType" => rec.entity_type = owned_text(ident),
        "nameEntry" => {
          let mut name = NameEntry {
            preference_score: ident
              .attr_ns(NS_SNAC, "preferenceScore")
              .and_then(|v| v.parse().ok()),
            ..NameEntry::default()
          };
          for part in &ident.children {
            match part.local() {
              "part" => name.original = owned_text(part),
              "alternativeForm" => name.contributors.push(Contributor {
                short_name: owned_text(part),
                form:       NameFormKind::AlternativeForm,
              }),
              "authorizedForm" => name.contributors.push(Contributor {
                short_name: owned_text(part),
                form:       NameFormKind::AuthorizedForm,
              }),
              other => self.unknown_tag(
                &["cpfDescription", "identity", "nameEntry"],
                other,
              )?,
            }
          }
          rec.names.push(name);
        }
        other => self.unknown_tag(&["cpfDescription", "identity"], other)?,
      }
    }
    Ok(())
  }

  fn map_description<'el>(
    &mut self,
    node: &'el Element,
    rec: &mut CpfRecord,
    biog_hists: &mut Vec<&'el Element>,
  ) -> Result<()> {
    const PATH: &[&str] = &["cpfDescription", "description"];

    for desc in &node.children {
      match desc.local() {
        "existDates" => self.map_exist_dates(desc, rec)?,
        // placeEntry import is a documented gap; skipped on purpose, no
        // warning.
        "place" => {}
        "localDescription" => self.map_local_description(desc, rec)?,
        "languageUsed" => {
          for lang in &desc.children {
            match lang.local() {
              "language" => {
                rec.language_used = owned_attr(lang, "languageCode");
              }
              "script" => rec.script_used = owned_attr(lang, "scriptCode"),
              other => self.unknown_tag(
                &["cpfDescription", "description", "languageUsed"],
                other,
              )?,
            }
          }
        }
        "occupation" => {
          if let Some(term) = desc.first_child().and_then(owned_text) {
            rec.occupations.push(term);
          }
          self.check_single_child(
            &["cpfDescription", "description", "occupation"],
            desc,
          )?;
        }
        "biogHist" => biog_hists.push(desc),
        other => self.unknown_tag(PATH, other)?,
      }
    }
    Ok(())
  }

  fn map_exist_dates(&mut self, node: &Element, rec: &mut CpfRecord) -> Result<()> {
    const PATH: &[&str] = &["cpfDescription", "description", "existDates"];

    for edate in &node.children {
      match edate.local() {
        "dateRange" => {
          let mut from = None;
          let mut to = None;

          // endpoints may appear singly or in either order
          for endpoint in &edate.children {
            match endpoint.local() {
              "fromDate" => from = date_value(endpoint),
              "toDate" => to = date_value(endpoint),
              other => self.unknown_tag(
                &["cpfDescription", "description", "existDates", "dateRange"],
                other,
              )?,
            }
          }

          // a range whose endpoints both lack display text records nothing
          if from.is_some() || to.is_some() {
            rec.dates.push(ExistDate::Range { from, to });
          }
        }
        "date" => {
          if let Some(value) = date_value(edate) {
            rec.dates.push(ExistDate::Single(value));
          }
        }
        other => self.unknown_tag(PATH, other)?,
      }
    }
    Ok(())
  }

  /// The `localType` attribute selects the target field; the single `term`
  /// child carries the value.
  fn map_local_description(
    &mut self,
    node: &Element,
    rec: &mut CpfRecord,
  ) -> Result<()> {
    const PATH: &[&str] = &["cpfDescription", "description", "localDescription"];

    let value = node.first_child().and_then(owned_text);
    match node.attr("localType").map(term_of) {
      Some("AssociatedSubject") => {
        if let Some(v) = value {
          rec.subjects.push(v);
        }
        self.check_single_child(PATH, node)?;
      }
      Some("nationalityOfEntity") => {
        if let Some(v) = value {
          rec.nationalities.push(v);
        }
        self.check_single_child(PATH, node)?;
      }
      Some("gender") => {
        rec.gender = value;
        self.check_single_child(PATH, node)?;
      }
      Some(other) => {
        self.warn(PATH, format!("unknown localType \"{other}\""))?;
      }
      None => self.warn(PATH, "missing localType attribute".to_owned())?,
    }
    Ok(())
  }

  fn map_relations(&mut self, node: &Element, rec: &mut CpfRecord) -> Result<()> {
    for rel in &node.children {
      match rel.local() {
        "cpfRelation" => {
          self.check_single_child(
            &["cpfDescription", "relations", "cpfRelation"],
            rel,
          )?;
          rec.relations.push(RelationRef {
            relation_type: xlink_term(rel, "arcrole"),
            other_type:    xlink_term(rel, "role"),
            target_ark:    rel.attr_ns(NS_XLINK, "href").map(str::to_owned),
            entry:         rel
              .first_child()
              .and_then(owned_text)
              .unwrap_or_default(),
          });
        }
        "resourceRelation" => {
          let mut doc = DocumentRef {
            document_role: xlink_term(rel, "arcrole"),
            document_type: xlink_term(rel, "role"),
            href: rel.attr_ns(NS_XLINK, "href").map(str::to_owned),
            link_type: rel.attr_ns(NS_XLINK, "type").map(str::to_owned),
            ..DocumentRef::default()
          };
          for item in &rel.children {
            match item.local() {
              "relationEntry" => doc.name = owned_text(item),
              "objectXMLWrap" => doc.xml_source = Some(item.serialize()),
              "descriptiveNote" => doc.notes = Some(item.serialize()),
              other => self.unknown_tag(
                &["cpfDescription", "relations", "resourceRelation"],
                other,
              )?,
            }
          }
          rec.documents.push(doc);
        }
        other => self.unknown_tag(&["cpfDescription", "relations"], other)?,
      }
    }
    Ok(())
  }
}

// ─── biogHist merge ──────────────────────────────────────────────────────────

/// Merge repeated `biogHist` fragments into one: each subsequent fragment's
/// children are appended onto the first, in document order, and the
/// duplicate roots are dropped. Returns the serialized merged fragment.
fn merge_biog_hists(fragments: &[&Element]) -> Option<String> {
  let mut iter = fragments.iter();
  let mut merged = (*iter.next()?).clone();
  for fragment in iter {
    merged.children.extend(fragment.children.iter().cloned());
  }
  Some(merged.serialize())
}

// ─── Entry point ─────────────────────────────────────────────────────────────

pub(crate) fn map_document(
  root: &Element,
  cache: &mut CodeLabelCache,
  strictness: Strictness,
) -> Result<MappedRecord> {
  let mut mapper = Mapper {
    cache,
    strictness,
    warnings: Vec::new(),
  };

  let mut record = CpfRecord::default();
  let mut biog_hists: Vec<&Element> = Vec::new();

  for node in &root.children {
    match node.local() {
      "control" => mapper.map_control(node, &mut record)?,
      "cpfDescription" => {
        mapper.map_cpf_description(node, &mut record, &mut biog_hists)?;
      }
      other => mapper.unknown_tag(&[], other)?,
    }
  }

  record.biog_hist = merge_biog_hists(&biog_hists);

  if record.ark_id.is_empty() {
    return Err(Error::MissingRecordId);
  }

  Ok(MappedRecord {
    record,
    warnings: mapper.warnings,
  })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
