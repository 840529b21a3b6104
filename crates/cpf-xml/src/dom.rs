//! A small namespace-aware document tree over `quick-xml`.
//!
//! The mapper needs three things an event stream does not give directly:
//! child ordering with random access, attribute lookup by resolved
//! namespace, and re-serialization of sub-trees (`biogHist`,
//! `objectXMLWrap`). So we build the whole document into [`Element`]s first
//! and let the mapper walk it.

use std::io::Cursor;

use quick_xml::{
  NsReader, Writer,
  events::{BytesEnd, BytesStart, BytesText, Event},
  name::ResolveResult,
};

use crate::error::{Error, Result};

// ─── Attributes ──────────────────────────────────────────────────────────────

/// One attribute with its resolved namespace and the raw key as written
/// (kept so sub-trees serialize back with their original prefixes).
#[derive(Debug, Clone)]
pub struct Attr {
  pub namespace: Option<String>,
  pub local:     String,
  pub raw:       String,
  pub value:     String,
}

// ─── Element ─────────────────────────────────────────────────────────────────

/// One element of the parsed document.
#[derive(Debug, Clone)]
pub struct Element {
  pub namespace: Option<String>,
  pub local:     String,
  raw:           String,
  pub attrs:     Vec<Attr>,
  pub children:  Vec<Element>,
  /// Concatenated non-whitespace character data directly inside this
  /// element.
  pub text:      String,
}

impl Element {
  /// Local (namespace-stripped) element name.
  pub fn local(&self) -> &str { &self.local }

  /// Value of an un-namespaced attribute.
  pub fn attr(&self, local: &str) -> Option<&str> {
    self
      .attrs
      .iter()
      .find(|a| a.namespace.is_none() && a.local == local)
      .map(|a| a.value.as_str())
  }

  /// Value of a namespaced attribute (e.g. an XLink href).
  pub fn attr_ns(&self, namespace: &str, local: &str) -> Option<&str> {
    self
      .attrs
      .iter()
      .find(|a| a.namespace.as_deref() == Some(namespace) && a.local == local)
      .map(|a| a.value.as_str())
  }

  /// Direct text, or `None` when empty/whitespace-only.
  pub fn text_opt(&self) -> Option<&str> {
    if self.text.trim().is_empty() {
      None
    } else {
      Some(self.text.as_str())
    }
  }

  pub fn first_child(&self) -> Option<&Element> { self.children.first() }

  /// Re-serialize this sub-tree, prefixes preserved as written.
  pub fn serialize(&self) -> String {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    self.write_into(&mut writer);
    String::from_utf8(writer.into_inner().into_inner()).unwrap_or_default()
  }

  fn write_into(&self, w: &mut Writer<Cursor<Vec<u8>>>) {
    let mut start = BytesStart::new(self.raw.as_str());
    for a in &self.attrs {
      start.push_attribute((a.raw.as_str(), a.value.as_str()));
    }

    if self.children.is_empty() && self.text.is_empty() {
      w.write_event(Event::Empty(start)).unwrap();
      return;
    }

    w.write_event(Event::Start(start)).unwrap();
    if !self.text.is_empty() {
      w.write_event(Event::Text(BytesText::new(&self.text))).unwrap();
    }
    for child in &self.children {
      child.write_into(w);
    }
    w.write_event(Event::End(BytesEnd::new(self.raw.as_str()))).unwrap();
  }
}

// ─── Parsing ─────────────────────────────────────────────────────────────────

fn resolved_ns(result: ResolveResult<'_>) -> Option<String> {
  match result {
    ResolveResult::Bound(ns) => {
      Some(String::from_utf8_lossy(ns.into_inner()).into_owned())
    }
    // Unbound (no default namespace) and undeclared prefixes both map to
    // "no namespace"; dispatch is by local name either way.
    ResolveResult::Unbound | ResolveResult::Unknown(_) => None,
  }
}

fn element_from(
  reader: &NsReader<&[u8]>,
  ns: Option<String>,
  start: &BytesStart<'_>,
) -> Result<Element> {
  let raw = String::from_utf8_lossy(start.name().as_ref()).into_owned();
  let local =
    String::from_utf8_lossy(start.local_name().into_inner()).into_owned();

  let mut attrs = Vec::new();
  for attr in start.attributes() {
    let attr = attr?;
    let key = attr.key;
    let raw_key = String::from_utf8_lossy(key.as_ref()).into_owned();
    let value = attr.unescape_value()?.into_owned();

    // Namespace declarations are kept verbatim so sub-trees serialize back
    // with their bindings, but they resolve to nothing.
    let is_xmlns =
      key.as_ref() == b"xmlns" || key.as_ref().starts_with(b"xmlns:");
    let (namespace, local_key) = if is_xmlns {
      (None, raw_key.clone())
    } else {
      let (res, local_name) = reader.resolve_attribute(key);
      (
        resolved_ns(res),
        String::from_utf8_lossy(local_name.into_inner()).into_owned(),
      )
    };

    attrs.push(Attr {
      namespace,
      local: local_key,
      raw: raw_key,
      value,
    });
  }

  Ok(Element {
    namespace: ns,
    local,
    raw,
    attrs,
    children: Vec::new(),
    text: String::new(),
  })
}

fn attach(
  stack: &mut [Element],
  root: &mut Option<Element>,
  element: Element,
) -> Result<()> {
  match stack.last_mut() {
    Some(parent) => parent.children.push(element),
    None if root.is_none() => *root = Some(element),
    // content after the root element has closed
    None => return Err(Error::UnbalancedDocument),
  }
  Ok(())
}

/// Parse a whole document and return its root element.
pub fn parse_document(input: &str) -> Result<Element> {
  let mut reader = NsReader::from_str(input);

  let mut stack: Vec<Element> = Vec::new();
  let mut root: Option<Element> = None;

  loop {
    match reader.read_resolved_event()? {
      (ns, Event::Start(ref e)) => {
        let ns = resolved_ns(ns);
        stack.push(element_from(&reader, ns, e)?);
      }
      (ns, Event::Empty(ref e)) => {
        let ns = resolved_ns(ns);
        let element = element_from(&reader, ns, e)?;
        attach(&mut stack, &mut root, element)?;
      }
      (_, Event::End(_)) => {
        let element = stack.pop().ok_or(Error::UnbalancedDocument)?;
        attach(&mut stack, &mut root, element)?;
      }
      (_, Event::Text(ref t)) => {
        let s = t.unescape()?;
        if !s.trim().is_empty()
          && let Some(top) = stack.last_mut()
        {
          top.text.push_str(&s);
        }
      }
      (_, Event::CData(ref t)) => {
        let s = String::from_utf8_lossy(t);
        if !s.trim().is_empty()
          && let Some(top) = stack.last_mut()
        {
          top.text.push_str(&s);
        }
      }
      (_, Event::Eof) => break,
      // declarations, comments, processing instructions
      _ => {}
    }
  }

  if !stack.is_empty() {
    return Err(Error::UnbalancedDocument);
  }
  root.ok_or(Error::EmptyDocument)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
