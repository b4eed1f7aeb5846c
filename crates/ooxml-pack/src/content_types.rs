//! `[Content_Types].xml`: the default-extension and per-part-override media
//! type dictionary for an OPC package.

use crate::error::Result;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::collections::HashMap;

pub const RELATIONSHIPS_TYPE: &str =
    "application/vnd.openxmlformats-package.relationships+xml";
pub const XML_TYPE: &str = "application/xml";

/// Two sub-dictionaries: *defaults* (lowercased extension -> media type) and
/// *overrides* (part path -> media type). Overrides win; otherwise the
/// extension default applies; a miss is the caller's job to flag.
#[derive(Clone, Debug, Default)]
pub struct ContentTypes {
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl ContentTypes {
    /// The standard OPC defaults present in virtually every real-world
    /// archive, so a package missing an explicit `Default` entry for `.xml`
    /// or common image extensions still resolves a content type.
    pub fn with_standard_defaults() -> Self {
        let mut ct = Self::default();
        ct.add_default("rels", RELATIONSHIPS_TYPE);
        ct.add_default("xml", XML_TYPE);
        ct.add_default("png", "image/png");
        ct.add_default("jpeg", "image/jpeg");
        ct.add_default("jpg", "image/jpeg");
        ct.add_default("gif", "image/gif");
        ct.add_default("bmp", "image/bmp");
        ct.add_default("emf", "image/x-emf");
        ct.add_default("wmf", "image/x-wmf");
        ct
    }

    pub fn add_default(&mut self, extension: &str, content_type: &str) {
        self.defaults
            .insert(extension.to_ascii_lowercase(), content_type.to_string());
    }

    pub fn add_override(&mut self, part_path: &str, content_type: &str) {
        self.overrides
            .insert(part_path.to_string(), content_type.to_string());
    }

    /// Resolves the content type of a part. Overrides take precedence; the
    /// lookup on extension is case-insensitive, the lookup on path is exact.
    pub fn get(&self, part_path: &str) -> Option<&str> {
        if let Some(ct) = self.overrides.get(part_path) {
            return Some(ct.as_str());
        }
        let ext = part_path.rsplit('.').next()?.to_ascii_lowercase();
        self.defaults.get(&ext).map(|s| s.as_str())
    }

    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        let mut ct = Self::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) => {
                    let local = e.name();
                    match local.local_name().as_ref() {
                        b"Default" => {
                            if let (Some(ext), Some(content_type)) =
                                (get_attr(&e, "Extension"), get_attr(&e, "ContentType"))
                            {
                                ct.add_default(&ext, &content_type);
                            }
                        }
                        b"Override" => {
                            if let (Some(part_name), Some(content_type)) =
                                (get_attr(&e, "PartName"), get_attr(&e, "ContentType"))
                            {
                                ct.add_override(&part_name, &content_type);
                            }
                        }
                        _ => {}
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(ct)
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
