//! End-to-end scenarios driving `OoxmlValidator` through its public API
//! against constructed in-memory `.pptx` archives.

use ooxml_validate::OoxmlValidator;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

struct Pptx {
    zip: ZipWriter<Cursor<Vec<u8>>>,
}

impl Pptx {
    fn new() -> Self {
        Self { zip: ZipWriter::new(Cursor::new(Vec::new())) }
    }

    fn file(&mut self, name: &str, contents: &str) -> &mut Self {
        self.zip.start_file(name, SimpleFileOptions::default()).unwrap();
        self.zip.write_all(contents.as_bytes()).unwrap();
        self
    }

    fn finish(self) -> Vec<u8> {
        self.zip.finish().unwrap().into_inner()
    }
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
</Relationships>"#;

fn presentation_xml(sld_entries: &str) -> String {
    format!(
        r#"<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <p:sldMasterIdLst><p:sldMasterId id="1" r:id="rIdMaster"/></p:sldMasterIdLst>
  <p:sldIdLst>{sld_entries}</p:sldIdLst>
</p:presentation>"#
    )
}

fn presentation_rels(layout_target: &str, slide_rels: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rIdMaster" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="{layout_target}"/>
  {slide_rels}
</Relationships>"#
    )
}

fn slide_xml(shapes: &str) -> String {
    format!(
        r#"<p:sld xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld><p:spTree>{shapes}</p:spTree></p:cSld>
</p:sld>"#
    )
}

#[test]
fn minimal_valid_presentation_has_no_errors() {
    let mut pkg = Pptx::new();
    pkg.file("[Content_Types].xml", CONTENT_TYPES);
    pkg.file("_rels/.rels", ROOT_RELS);
    pkg.file("ppt/presentation.xml", &presentation_xml(r#"<p:sldId id="256" r:id="rIdSlide1"/>"#));
    pkg.file(
        "ppt/_rels/presentation.xml.rels",
        &presentation_rels(
            "slideMasters/slideMaster1.xml",
            r#"<Relationship Id="rIdSlide1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>"#,
        ),
    );
    pkg.file(
        "ppt/slideMasters/slideMaster1.xml",
        r#"<p:sldMaster xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"/>"#,
    );
    pkg.file("ppt/slides/slide1.xml", &slide_xml(""));

    let validator = OoxmlValidator::with_default_config();
    let findings = validator.validate_bytes(&pkg.finish(), "pptx");
    assert!(!findings.iter().any(ooxml_pack::ValidationFinding::is_error), "{findings:#?}");
}

#[test]
fn missing_main_document_relationship_is_flagged() {
    let mut pkg = Pptx::new();
    pkg.file("[Content_Types].xml", CONTENT_TYPES);
    pkg.file(
        "_rels/.rels",
        r#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"/>"#,
    );

    let validator = OoxmlValidator::with_default_config();
    let findings = validator.validate_bytes(&pkg.finish(), "pptx");
    assert!(findings.iter().any(|f| f.description.contains("package.missing-required-part")));
}

#[test]
fn dangling_slide_layout_relationship_is_flagged() {
    let mut pkg = Pptx::new();
    pkg.file("[Content_Types].xml", CONTENT_TYPES);
    pkg.file("_rels/.rels", ROOT_RELS);
    pkg.file("ppt/presentation.xml", &presentation_xml(r#"<p:sldId id="256" r:id="rIdSlide1"/>"#));
    pkg.file(
        "ppt/_rels/presentation.xml.rels",
        &presentation_rels(
            "slideLayouts/slideLayout99.xml",
            r#"<Relationship Id="rIdSlide1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>"#,
        ),
    );
    pkg.file("ppt/slides/slide1.xml", &slide_xml(""));

    let validator = OoxmlValidator::with_default_config();
    let findings = validator.validate_bytes(&pkg.finish(), "pptx");
    assert!(findings.iter().any(|f| f.description.contains("relationship.dangling")), "{findings:#?}");
}

#[test]
fn out_of_range_shape_offset_is_flagged() {
    let mut pkg = Pptx::new();
    pkg.file("[Content_Types].xml", CONTENT_TYPES);
    pkg.file("_rels/.rels", ROOT_RELS);
    pkg.file("ppt/presentation.xml", &presentation_xml(r#"<p:sldId id="256" r:id="rIdSlide1"/>"#));
    pkg.file(
        "ppt/_rels/presentation.xml.rels",
        &presentation_rels(
            "slideMasters/slideMaster1.xml",
            r#"<Relationship Id="rIdSlide1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>"#,
        ),
    );
    pkg.file(
        "ppt/slideMasters/slideMaster1.xml",
        r#"<p:sldMaster xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"/>"#,
    );
    let shape = r#"<p:sp xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" id="1">
      <p:nvSpPr/>
      <p:spPr><a:xfrm><a:off x="9999999999" y="0"/><a:ext cx="100" cy="100"/></a:xfrm></p:spPr>
    </p:sp>"#;
    pkg.file("ppt/slides/slide1.xml", &slide_xml(shape));

    let validator = OoxmlValidator::with_default_config();
    let findings = validator.validate_bytes(&pkg.finish(), "pptx");
    assert!(findings.iter().any(|f| f.description.contains("schema.value-out-of-range")), "{findings:#?}");
}

#[test]
fn duplicate_shape_id_within_one_slide_is_flagged() {
    let mut pkg = Pptx::new();
    pkg.file("[Content_Types].xml", CONTENT_TYPES);
    pkg.file("_rels/.rels", ROOT_RELS);
    pkg.file("ppt/presentation.xml", &presentation_xml(r#"<p:sldId id="256" r:id="rIdSlide1"/>"#));
    pkg.file(
        "ppt/_rels/presentation.xml.rels",
        &presentation_rels(
            "slideMasters/slideMaster1.xml",
            r#"<Relationship Id="rIdSlide1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>"#,
        ),
    );
    pkg.file(
        "ppt/slideMasters/slideMaster1.xml",
        r#"<p:sldMaster xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"/>"#,
    );
    let shapes = r#"
      <p:sp id="1"><p:nvSpPr/><p:spPr/></p:sp>
      <p:sp id="1"><p:nvSpPr/><p:spPr/></p:sp>
    "#;
    pkg.file("ppt/slides/slide1.xml", &slide_xml(shapes));

    let validator = OoxmlValidator::with_default_config();
    let findings = validator.validate_bytes(&pkg.finish(), "pptx");
    assert!(
        findings.iter().any(|f| f.description.contains("semantic.unique-violation") && f.rule_id.as_deref() == Some("Sem_ShapeIdUnique")),
        "{findings:#?}"
    );
}

#[test]
fn not_a_zip_file_aborts_with_single_finding() {
    let validator = OoxmlValidator::with_default_config();
    let findings = validator.validate_bytes(b"this is plain text, not a pptx", "pptx");
    assert_eq!(findings.len(), 1);
    assert!(findings[0].description.contains("package.not-a-container"));
}

#[test]
fn embedded_schematron_inventory_has_exactly_one_unrecognized_rule() {
    let catalog = ooxml_validate::formats::build();
    assert_eq!(catalog.bridge_stats.unknown, 1);
    assert!(catalog.bridge_stats.coverage() >= 0.85);
}
