//! Top-level orchestrator (§4.8): sequences package, schema, semantic, and
//! relationship-integrity phases, folding in format-specific registrations
//! through the shared catalog built by [`crate::formats`].

use crate::config::ValidationConfig;
use crate::context::ValidationContext;
use crate::formats::{self, FormatCatalog};
use crate::schema::SchemaValidator;
use crate::semantic::SemanticValidator;
use ooxml_pack::relationships::resolve_target;
use ooxml_pack::{Category, Package, Severity, TargetMode, ValidationFinding};
use std::path::Path;

/// Owns the build-once format catalog and the run configuration. Construct
/// one validator and reuse it across any number of independent validations
/// (§5): nothing here is mutated once built.
pub struct OoxmlValidator {
    config: ValidationConfig,
    format: FormatCatalog,
}

impl OoxmlValidator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config, format: formats::build() }
    }

    pub fn with_default_config() -> Self {
        Self::new(ValidationConfig::default())
    }

    /// Opens and validates a document at `path`. A package-level open
    /// failure (not a container, I/O error) produces a single finding and
    /// skips every later phase, per §7.
    pub fn validate<P: AsRef<Path>>(&self, path: P) -> Vec<ValidationFinding> {
        let path = path.as_ref();
        match Package::open(path) {
            Ok(pkg) => self.run(&pkg),
            Err(err) => vec![ValidationFinding::new(
                Category::Package,
                Severity::Error,
                format!("package.not-a-container: {err}"),
                path.display().to_string(),
            )],
        }
    }

    pub fn validate_bytes(&self, bytes: &[u8], extension: &str) -> Vec<ValidationFinding> {
        match Package::from_bytes(bytes, extension) {
            Ok(pkg) => self.run(&pkg),
            Err(err) => vec![ValidationFinding::new(
                Category::Package,
                Severity::Error,
                format!("package.not-a-container: {err}"),
                "",
            )],
        }
    }

    pub fn is_valid<P: AsRef<Path>>(&self, path: P) -> bool {
        !self.validate(path).iter().any(ValidationFinding::is_error)
    }

    fn run(&self, pkg: &Package) -> Vec<ValidationFinding> {
        let mut findings = pkg.open_findings.clone();
        let mut capped = findings.len() >= self.config.max_errors;

        if !capped {
            'parts: for part_uri in pkg.part_paths_sorted() {
                if findings.len() >= self.config.max_errors {
                    capped = true;
                    break 'parts;
                }
                let part = pkg.part(part_uri).expect("path came from part_paths_sorted");
                if !looks_like_xml(part.content_type(), part.path()) {
                    continue;
                }

                let Some(root) = part.xml_root() else {
                    findings.push(ValidationFinding::new(
                        Category::Schema,
                        Severity::Error,
                        "schema.malformed-xml: part could not be parsed",
                        part_uri,
                    ));
                    continue;
                };

                if self.config.schema_validation {
                    let remaining = self.config.max_errors.saturating_sub(findings.len());
                    let mut ctx = ValidationContext::new(pkg, part_uri, self.config.format_version, remaining);
                    SchemaValidator::new(&self.format.schema).validate_part(root, &mut ctx);
                    if append_capped(&mut findings, ctx.accumulator.into_vec(), self.config.max_errors) {
                        capped = true;
                        break 'parts;
                    }
                }

                if self.config.semantic_validation {
                    let remaining = self.config.max_errors.saturating_sub(findings.len());
                    if remaining == 0 {
                        capped = true;
                        break 'parts;
                    }
                    let mut ctx = ValidationContext::new(pkg, part_uri, self.config.format_version, remaining);
                    SemanticValidator::new(&self.format.semantic).validate_part(root, &mut ctx);
                    if append_capped(&mut findings, ctx.accumulator.into_vec(), self.config.max_errors) {
                        capped = true;
                        break 'parts;
                    }
                }
            }
        }

        // Relationship integrity across every collection in the package
        // (§4.3); a precondition-not-met situation (already capped) skips it.
        if !capped {
            check_relationship_integrity(pkg, &mut findings, self.config.max_errors);
        }

        findings
    }
}

fn looks_like_xml(content_type: &str, path: &str) -> bool {
    content_type.contains("xml") || path.ends_with(".xml")
}

/// Appends one phase's findings to the running total, collapsing that
/// phase's own truncation notice (emitted because its sub-accumulator was
/// sized to the *remaining* budget) into a single notice for the whole run.
fn append_capped(total: &mut Vec<ValidationFinding>, mut part_findings: Vec<ValidationFinding>, max_errors: usize) -> bool {
    let hit_local_cap = part_findings
        .last()
        .is_some_and(|f| f.category == Category::Package && f.severity == Severity::Info);
    if hit_local_cap {
        part_findings.pop();
    }
    total.extend(part_findings);

    if total.len() >= max_errors {
        total.truncate(max_errors);
        total.push(ValidationFinding::new(
            Category::Package,
            Severity::Info,
            "finding output truncated at configured max_errors cap",
            "",
        ));
        true
    } else {
        false
    }
}

fn check_relationship_integrity(pkg: &Package, findings: &mut Vec<ValidationFinding>, max_errors: usize) {
    check_collection(pkg, "", pkg.root_relationships(), "/_rels/.rels", findings, max_errors);
    if findings.len() >= max_errors {
        return;
    }
    for part_uri in pkg.part_paths_sorted() {
        if findings.len() >= max_errors {
            return;
        }
        let part = pkg.part(part_uri).expect("path came from part_paths_sorted");
        check_collection(pkg, part.directory(), part.relationships(), part_uri, findings, max_errors);
    }
}

fn check_collection(
    pkg: &Package,
    source_dir: &str,
    rels: &ooxml_pack::Relationships,
    source_label: &str,
    findings: &mut Vec<ValidationFinding>,
    max_errors: usize,
) {
    for rel in rels.iter() {
        if findings.len() >= max_errors {
            return;
        }
        if rel.target_mode == TargetMode::External {
            continue;
        }
        if target_escapes_root(source_dir, &rel.target) {
            findings.push(ValidationFinding::new(
                Category::Relationship,
                Severity::Error,
                format!("relationship.escape: relationship '{}' target '{}' escapes the package root", rel.id, rel.target),
                source_label,
            ));
            continue;
        }
        let resolved = resolve_target(source_dir, &rel.target);
        if pkg.part(&resolved).is_none() {
            findings.push(
                ValidationFinding::new(
                    Category::Relationship,
                    Severity::Error,
                    format!("relationship.dangling: relationship '{}' target '{}' does not resolve to a known part", rel.id, rel.target),
                    source_label,
                )
                .with_related_node(resolved),
            );
        }
    }
}

/// A relative target escapes the package root if it pops more `../`
/// segments than the source directory has components to give up.
fn target_escapes_root(source_dir: &str, target: &str) -> bool {
    if target.starts_with('/') {
        return false;
    }
    let mut depth = source_dir.split('/').filter(|s| !s.is_empty()).count() as i64;
    for seg in target.split('/') {
        match seg {
            "" | "." => continue,
            ".." => {
                depth -= 1;
                if depth < 0 {
                    return true;
                }
            }
            _ => depth += 1,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn build_pptx(slide_count: u32, dangling_layout: bool) -> Vec<u8> {
        let mut buf = Vec::new();
        let cursor = Cursor::new(&mut buf);
        let mut zip = ZipWriter::new(cursor);
        let options = SimpleFileOptions::default();

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(br#"<?xml version="1.0"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
</Types>"#).unwrap();

        zip.start_file("_rels/.rels", options).unwrap();
        zip.write_all(br#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
</Relationships>"#).unwrap();

        let mut sld_entries = String::new();
        for i in 1..=slide_count {
            sld_entries.push_str(&format!(r#"<p:sldId id="{}" r:id="rIdSlide{i}"/>"#, 255 + i));
        }
        zip.start_file("ppt/presentation.xml", options).unwrap();
        zip.write_all(format!(
            r#"<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <p:sldMasterIdLst><p:sldMasterId id="1" r:id="rIdMaster"/></p:sldMasterIdLst>
  <p:sldIdLst>{sld_entries}</p:sldIdLst>
</p:presentation>"#
        ).as_bytes()).unwrap();

        zip.start_file("ppt/_rels/presentation.xml.rels", options).unwrap();
        let layout_target = if dangling_layout { "slideLayouts/slideLayout99.xml" } else { "slideMasters/slideMaster1.xml" };
        let mut slide_rels = String::new();
        for i in 1..=slide_count {
            slide_rels.push_str(&format!(
                r#"<Relationship Id="rIdSlide{i}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{i}.xml"/>"#
            ));
        }
        zip.write_all(format!(
            r#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rIdMaster" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="{layout_target}"/>
  {slide_rels}
</Relationships>"#
        ).as_bytes()).unwrap();

        if !dangling_layout {
            zip.start_file("ppt/slideMasters/slideMaster1.xml", options).unwrap();
            zip.write_all(b"<p:sldMaster xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\"/>").unwrap();
        }

        for i in 1..=slide_count {
            zip.start_file(format!("ppt/slides/slide{i}.xml"), options).unwrap();
            zip.write_all(b"<p:sld xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\"><p:cSld><p:spTree/></p:cSld></p:sld>").unwrap();
        }

        zip.finish().unwrap();
        drop(zip);
        buf
    }

    #[test]
    fn dangling_slide_master_relationship_is_flagged() {
        let bytes = build_pptx(1, true);
        let validator = OoxmlValidator::with_default_config();
        let findings = validator.validate_bytes(&bytes, "pptx");
        assert!(
            findings.iter().any(|f| f.description.contains("relationship-missing") || f.description.contains("relationship.dangling")),
            "{findings:#?}"
        );
    }

    #[test]
    fn well_formed_minimal_presentation_has_no_errors() {
        let bytes = build_pptx(1, false);
        let validator = OoxmlValidator::with_default_config();
        let findings = validator.validate_bytes(&bytes, "pptx");
        assert!(!findings.iter().any(ValidationFinding::is_error), "{findings:#?}");
    }

    #[test]
    fn not_a_container_produces_single_finding() {
        let validator = OoxmlValidator::with_default_config();
        let findings = validator.validate_bytes(b"not a zip", "pptx");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].description.contains("package.not-a-container"));
    }
}
