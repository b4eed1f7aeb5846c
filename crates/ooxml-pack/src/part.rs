//! A single named item inside the archive, with lazy XML materialization.

use crate::error::Result;
use crate::relationships::Relationships;
use crate::xmltree::{parse_document, XmlElement};
use std::cell::OnceCell;

/// A part's canonical path is leading-slash normalized, e.g. `/ppt/presentation.xml`.
#[derive(Clone, Debug)]
pub struct Part {
    path: String,
    content_type: String,
    data: Vec<u8>,
    tree: OnceCell<Option<XmlElement>>,
    relationships: Relationships,
}

impl Part {
    pub fn new(path: String, content_type: String, data: Vec<u8>) -> Self {
        Self {
            path,
            content_type,
            data,
            tree: OnceCell::new(),
            relationships: Relationships::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn set_relationships(&mut self, rels: Relationships) {
        self.relationships = rels;
    }

    pub fn relationships(&self) -> &Relationships {
        &self.relationships
    }

    /// Directory containing this part, with no leading or trailing slash
    /// (the root part's directory is the empty string).
    pub fn directory(&self) -> &str {
        match self.path.trim_start_matches('/').rsplit_once('/') {
            Some((dir, _)) => dir,
            None => "",
        }
    }

    /// The `{dir}/_rels/{name}.rels` path this part's relationships would be
    /// stored under.
    pub fn relationships_path(&self) -> String {
        let trimmed = self.path.trim_start_matches('/');
        match trimmed.rsplit_once('/') {
            Some((dir, name)) => format!("{dir}/_rels/{name}.rels"),
            None => format!("_rels/{trimmed}.rels"),
        }
    }

    /// Parses and caches the XML tree on first access. A parse failure is
    /// represented as `None` so the caller can emit `schema.malformed-xml`
    /// and skip further schema traversal of this part without treating the
    /// failure as an implementation fault.
    pub fn xml_root(&self) -> Option<&XmlElement> {
        self.tree
            .get_or_init(|| parse_document(&self.data).ok())
            .as_ref()
    }

    /// Re-parses independent of the cache; used only by tests that need to
    /// assert on parse failures deterministically.
    pub fn try_parse(&self) -> Result<XmlElement> {
        parse_document(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_of_nested_part() {
        let part = Part::new("/ppt/slides/slide1.xml".into(), "application/xml".into(), vec![]);
        assert_eq!(part.directory(), "ppt/slides");
        assert_eq!(part.relationships_path(), "ppt/slides/_rels/slide1.xml.rels");
    }

    #[test]
    fn directory_of_root_part() {
        let part = Part::new("/ppt/presentation.xml".into(), "application/xml".into(), vec![]);
        assert_eq!(part.directory(), "ppt");
    }

    #[test]
    fn xml_root_caches_parse_result() {
        let part = Part::new("/x.xml".into(), "application/xml".into(), b"<a/>".to_vec());
        assert!(part.xml_root().is_some());
        assert!(part.xml_root().is_some());
    }

    #[test]
    fn malformed_xml_yields_none_not_panic() {
        let part = Part::new("/x.xml".into(), "application/xml".into(), b"<a><b></a>".to_vec());
        assert!(part.xml_root().is_none());
    }
}
