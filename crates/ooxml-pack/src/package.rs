//! The package: one opened document archive, its content-type table, root
//! relationships, and part directory.

use crate::archive::Archive;
use crate::content_types::ContentTypes;
use crate::error::Result;
use crate::finding::{Category, Severity, ValidationFinding};
use crate::namespaces::main_document_role;
use crate::part::Part;
use crate::relationships::{resolve_target, Relationships, TargetMode};
use std::collections::HashMap;
use std::path::Path;

/// One opened OOXML document. Immutable after construction except for the
/// lazily-cached XML tree each `Part` holds internally.
#[derive(Debug)]
pub struct Package {
    parts: HashMap<String, Part>,
    root_relationships: Relationships,
    content_types: ContentTypes,
    extension: String,
    /// Findings produced while establishing the package itself (§4.1):
    /// missing/unparseable mandatory entries, unknown content types.
    pub open_findings: Vec<ValidationFinding>,
}

const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";
const ROOT_RELS_PATH: &str = "_rels/.rels";

impl Package {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_string();
        let archive = Archive::open(path)?;
        Ok(Self::from_archive(archive, extension))
    }

    pub fn from_bytes(bytes: &[u8], extension: &str) -> Result<Self> {
        let archive = Archive::from_bytes(bytes)?;
        Ok(Self::from_archive(archive, extension.to_string()))
    }

    fn from_archive(archive: Archive, extension: String) -> Self {
        let mut findings = Vec::new();

        let content_types = match archive.get(CONTENT_TYPES_PATH) {
            Some(bytes) => match std::str::from_utf8(bytes).ok().and_then(|s| ContentTypes::parse(s).ok()) {
                Some(ct) => ct,
                None => {
                    findings.push(ValidationFinding::new(
                        Category::Package,
                        Severity::Error,
                        "[Content_Types].xml exists but could not be parsed",
                        "/[Content_Types].xml",
                    ));
                    ContentTypes::with_standard_defaults()
                }
            },
            None => {
                findings.push(ValidationFinding::new(
                    Category::Package,
                    Severity::Error,
                    "package.missing-required-part: [Content_Types].xml",
                    "/[Content_Types].xml",
                ));
                ContentTypes::with_standard_defaults()
            }
        };

        let root_relationships = match archive.get(ROOT_RELS_PATH) {
            Some(bytes) => match std::str::from_utf8(bytes).ok().and_then(|s| Relationships::parse(s).ok()) {
                Some(rels) => rels,
                None => {
                    findings.push(ValidationFinding::new(
                        Category::Package,
                        Severity::Error,
                        "_rels/.rels exists but could not be parsed",
                        "/_rels/.rels",
                    ));
                    Relationships::new()
                }
            },
            None => {
                findings.push(ValidationFinding::new(
                    Category::Package,
                    Severity::Error,
                    "package.missing-required-part: _rels/.rels",
                    "/_rels/.rels",
                ));
                Relationships::new()
            }
        };

        if let Some(expected_role) = main_document_role(&extension) {
            let has_role = root_relationships.by_type(expected_role).is_some();
            if !has_role {
                findings.push(ValidationFinding::new(
                    Category::Package,
                    Severity::Error,
                    format!(
                        "package.missing-required-part: no relationship of type {expected_role} naming the main document (presentation)"
                    ),
                    "/_rels/.rels",
                ));
            }
        }

        let mut parts = HashMap::new();
        for name in archive.entry_names() {
            if name == CONTENT_TYPES_PATH {
                continue;
            }
            if is_rels_file(name) {
                continue;
            }
            let path = format!("/{name}");
            let content_type = content_types.get(&path).map(str::to_string);
            if content_type.is_none() {
                findings.push(ValidationFinding::new(
                    Category::Package,
                    Severity::Warning,
                    format!("package.unknown-content-type: no default or override for {path}"),
                    path.clone(),
                ));
            }
            let data = archive.get(name).unwrap_or(&[]).to_vec();
            let part = Part::new(
                path.clone(),
                content_type.unwrap_or_else(|| "application/octet-stream".to_string()),
                data,
            );
            parts.insert(path, part);
        }

        // Attach per-part relationship collections.
        let part_paths: Vec<String> = parts.keys().cloned().collect();
        for path in part_paths {
            let rels_path = parts.get(&path).unwrap().relationships_path();
            if let Some(bytes) = archive.get(&rels_path) {
                if let Ok(text) = std::str::from_utf8(bytes) {
                    if let Ok(rels) = Relationships::parse(text) {
                        parts.get_mut(&path).unwrap().set_relationships(rels);
                    }
                }
            }
        }

        let main_document_exists = main_document_role(&extension)
            .and_then(|role| root_relationships.by_type(role))
            .map(|rel| {
                let target = resolve_target("", &rel.target);
                parts.contains_key(&target)
            })
            .unwrap_or(true);

        if !main_document_exists {
            findings.push(ValidationFinding::new(
                Category::Package,
                Severity::Error,
                "package.missing-required-part: main document part (presentation) not found in archive",
                "/",
            ));
        }

        Self {
            parts,
            root_relationships,
            content_types,
            extension,
            open_findings: findings,
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn content_types(&self) -> &ContentTypes {
        &self.content_types
    }

    pub fn root_relationships(&self) -> &Relationships {
        &self.root_relationships
    }

    pub fn part(&self, path: &str) -> Option<&Part> {
        self.parts.get(path)
    }

    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.values()
    }

    /// Part paths in a deterministic, stable order so traversal across
    /// parts is reproducible across runs.
    pub fn part_paths_sorted(&self) -> Vec<&str> {
        let mut v: Vec<&str> = self.parts.keys().map(|s| s.as_str()).collect();
        v.sort_unstable();
        v
    }

    pub fn main_document_part(&self) -> Option<&Part> {
        let role = main_document_role(&self.extension)?;
        let rel = self.root_relationships.by_type(role)?;
        let target = resolve_target("", &rel.target);
        self.parts.get(&target)
    }

    /// Resolves a part-local relationship to a canonical part path. Returns
    /// `None` for external targets (the caller should not attempt to resolve
    /// those against the package).
    pub fn resolve_relationship_target(&self, source_part_dir: &str, rel: &crate::relationships::Relationship) -> Option<String> {
        if rel.target_mode == TargetMode::External {
            return None;
        }
        Some(resolve_target(source_part_dir, &rel.target))
    }
}

fn is_rels_file(name: &str) -> bool {
    name.ends_with(".rels") && name.contains("_rels/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn build_minimal_pptx() -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let cursor = Cursor::new(&mut buf);
            let mut zip = ZipWriter::new(cursor);
            let options = SimpleFileOptions::default();

            zip.start_file("[Content_Types].xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.ms-powerpoint.presentation.main+xml"/>
</Types>"#).unwrap();

            zip.start_file("_rels/.rels", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
</Relationships>"#).unwrap();

            zip.start_file("ppt/presentation.xml", options).unwrap();
            zip.write_all(b"<p:presentation xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\"/>").unwrap();

            zip.finish().unwrap();
        }
        buf
    }

    #[test]
    fn minimal_valid_package_has_no_open_findings() {
        let bytes = build_minimal_pptx();
        let pkg = Package::from_bytes(&bytes, "pptx").unwrap();
        assert!(pkg.open_findings.is_empty(), "{:?}", pkg.open_findings);
        assert!(pkg.main_document_part().is_some());
    }

    #[test]
    fn missing_main_document_produces_one_finding() {
        let mut buf = Vec::new();
        {
            let cursor = Cursor::new(&mut buf);
            let mut zip = ZipWriter::new(cursor);
            let options = SimpleFileOptions::default();
            zip.start_file("[Content_Types].xml", options).unwrap();
            zip.write_all(br#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#).unwrap();
            zip.start_file("_rels/.rels", options).unwrap();
            zip.write_all(br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
</Relationships>"#).unwrap();
            zip.finish().unwrap();
        }
        let pkg = Package::from_bytes(&buf, "pptx").unwrap();
        assert_eq!(pkg.open_findings.len(), 1);
        assert_eq!(pkg.open_findings[0].category, Category::Package);
    }

    #[test]
    fn missing_rels_produces_one_finding() {
        let mut buf = Vec::new();
        {
            let cursor = Cursor::new(&mut buf);
            let mut zip = ZipWriter::new(cursor);
            let options = SimpleFileOptions::default();
            zip.start_file("[Content_Types].xml", options).unwrap();
            zip.write_all(br#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#).unwrap();
            zip.finish().unwrap();
        }
        let pkg = Package::from_bytes(&buf, "pptx").unwrap();
        assert!(pkg.open_findings.iter().any(|f| f.description.contains("_rels/.rels")));
    }
}
