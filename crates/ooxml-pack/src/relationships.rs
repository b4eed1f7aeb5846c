//! Relationship records and the collection that owns them, plus the
//! target-resolution algorithm used to turn a relative relationship target
//! into a canonical part path.

use crate::error::Result;
use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;
use std::collections::HashMap;
use std::io::Cursor;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetMode {
    Internal,
    External,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub target_mode: TargetMode,
}

/// Ordered, by-id indexed set of relationships from one source (the package
/// root or a single part). Insertion order is preserved because traversal
/// order must match it for deterministic output.
#[derive(Clone, Debug, Default)]
pub struct Relationships {
    order: Vec<String>,
    by_id: HashMap<String, Relationship>,
    next_id: u32,
}

impl Relationships {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            by_id: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.by_id.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.order.iter().filter_map(move |id| self.by_id.get(id))
    }

    pub fn by_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.iter().find(|r| r.rel_type == rel_type)
    }

    pub fn all_by_type<'a>(&'a self, rel_type: &'a str) -> impl Iterator<Item = &'a Relationship> {
        self.iter().filter(move |r| r.rel_type == rel_type)
    }

    pub fn add(&mut self, rel_type: &str, target: &str, mode: TargetMode) -> String {
        let id = format!("rId{}", self.next_id);
        self.next_id += 1;
        self.order.push(id.clone());
        self.by_id.insert(
            id.clone(),
            Relationship {
                id: id.clone(),
                rel_type: rel_type.to_string(),
                target: target.to_string(),
                target_mode: mode,
            },
        );
        id
    }

    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        let mut rels = Self::new();
        let mut buf = Vec::new();
        let mut max_seen = 0u32;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) if e.name().local_name().as_ref() == b"Relationship" => {
                    let id = get_attr(&e, "Id").unwrap_or_default();
                    let rel_type = get_attr(&e, "Type").unwrap_or_default();
                    let target = get_attr(&e, "Target").unwrap_or_default();
                    let mode = match get_attr(&e, "TargetMode").as_deref() {
                        Some("External") => TargetMode::External,
                        _ => TargetMode::Internal,
                    };
                    if let Some(n) = extract_id_number(&id) {
                        max_seen = max_seen.max(n);
                    }
                    rels.order.push(id.clone());
                    rels.by_id.insert(
                        id.clone(),
                        Relationship {
                            id,
                            rel_type,
                            target,
                            target_mode: mode,
                        },
                    );
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        rels.next_id = max_seen + 1;
        Ok(rels)
    }

    pub fn to_xml(&self) -> Result<String> {
        let mut buf = Cursor::new(Vec::new());
        let mut writer = Writer::new(&mut buf);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

        let mut root = BytesStart::new("Relationships");
        root.push_attribute((
            "xmlns",
            "http://schemas.openxmlformats.org/package/2006/relationships",
        ));
        writer.write_event(Event::Start(root))?;

        for rel in self.iter() {
            let mut e = BytesStart::new("Relationship");
            e.push_attribute(("Id", rel.id.as_str()));
            e.push_attribute(("Type", rel.rel_type.as_str()));
            e.push_attribute(("Target", rel.target.as_str()));
            if rel.target_mode == TargetMode::External {
                e.push_attribute(("TargetMode", "External"));
            }
            writer.write_event(Event::Empty(e))?;
        }

        writer.write_event(Event::End(quick_xml::events::BytesEnd::new("Relationships")))?;
        Ok(String::from_utf8(buf.into_inner()).expect("writer output is valid UTF-8"))
    }
}

fn get_attr(e: &BytesStart, name: &str) -> Option<String> {
    e.attributes().filter_map(|a| a.ok()).find_map(|a| {
        if a.key.local_name().as_ref() == name.as_bytes() {
            Some(String::from_utf8_lossy(&a.value).into_owned())
        } else {
            None
        }
    })
}

fn extract_id_number(id: &str) -> Option<u32> {
    id.strip_prefix("rId").and_then(|n| n.parse().ok())
}

/// Resolves an internal relationship's target against the directory of the
/// part (or package root) that declared it, producing a canonicalized
/// slash-rooted path: `./` segments are dropped, `../` segments pop a
/// directory, and the result is always leading-slash normalized.
///
/// `source_dir` is the directory portion of the declaring part's path (for
/// the package root, an empty string).
pub fn resolve_target(source_dir: &str, target: &str) -> String {
    if target.starts_with('/') {
        return normalize(target);
    }
    let base = if source_dir.is_empty() {
        String::new()
    } else {
        format!("{source_dir}/")
    };
    normalize(&format!("{base}{target}"))
}

fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for seg in path.split('/') {
        match seg {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}
