//! Schema validator: pre-order traversal driver implementing §4.5.

use super::catalog::SchemaCatalog;
use super::particle::{check_children, ParticleViolation};
use super::xsdtype::TypeViolation;
use crate::context::ValidationContext;
use ooxml_pack::{Category, Severity, ValidationFinding, XmlElement};
use std::collections::HashSet;

/// The bare local name a descriptor targets, stripped of any namespace
/// prefix — used when checking for attributes not recognized on a closed
/// element.
fn descriptor_local(descriptor_name: &str) -> &str {
    descriptor_name.rsplit(':').next().unwrap_or(descriptor_name)
}

pub struct SchemaValidator<'cat> {
    catalog: &'cat SchemaCatalog,
}

impl<'cat> SchemaValidator<'cat> {
    pub fn new(catalog: &'cat SchemaCatalog) -> Self {
        Self { catalog }
    }

    /// Validates one part's tree against the catalog. Stops early if the
    /// context's finding cap is reached.
    pub fn validate_part(&self, root: &XmlElement, ctx: &mut ValidationContext) {
        if self.catalog.lookup(&root.name).is_none() {
            // The catalog only models a subset of the format (the presentation
            // and slide subtrees); a part whose root isn't in it — a slide
            // master, layout, or theme — is opaque to this validator, not an
            // error.
            return;
        }
        let mut reported_unknown_children: HashSet<String> = HashSet::new();
        self.visit(root, ctx, &mut reported_unknown_children);
    }

    fn visit(&self, element: &XmlElement, ctx: &mut ValidationContext, reported_unknown: &mut HashSet<String>) {
        if ctx.is_full() {
            return;
        }
        let display_name = element.name.display_with_prefix();
        ctx.enter_element(&display_name);

        if let Some(constraint) = self.catalog.lookup(&element.name) {
            self.validate_attributes(element, constraint, ctx);
            self.validate_children(element, constraint, ctx, reported_unknown);

            for child in &element.children {
                if ctx.is_full() {
                    break;
                }
                self.visit(child, ctx, reported_unknown);
            }
        } else {
            // Unknown element: reported once per unknown name per parent,
            // the parent context being the element we are currently inside.
            let key = format!("{}>{}", ctx.current_path(), display_name);
            if reported_unknown.insert(key) {
                ctx.report(ValidationFinding::new(
                    Category::Schema,
                    Severity::Error,
                    format!("schema.unexpected-element: '{display_name}' is not a recognized child here"),
                    ctx.part_uri.clone(),
                ).with_node(display_name.clone()));
            }
            // No constraint entry means no further descent: an unknown
            // element's subtree is opaque to the schema validator.
        }

        ctx.exit_element();
    }

    fn validate_attributes(&self, element: &XmlElement, constraint: &super::catalog::ElementConstraint, ctx: &mut ValidationContext) {
        for descriptor in &constraint.attributes {
            if !descriptor.applies_to(ctx.format_version) {
                continue;
            }
            match element.attr_prefixed(&descriptor.name) {
                Some(value) => {
                    if let Err(violation) = descriptor.xsd_type.validate(value) {
                        if ctx.report(type_violation_finding(&descriptor.name, value, &violation, &ctx.part_uri)) {
                            // still room; continue
                        } else {
                            return;
                        }
                    }
                }
                None if descriptor.required => {
                    if !ctx.report(ValidationFinding::new(
                        Category::Schema,
                        Severity::Error,
                        format!("schema.missing-required-attribute: '{}' is required", descriptor.name),
                        ctx.part_uri.clone(),
                    ).with_node(descriptor.name.clone())) {
                        return;
                    }
                }
                None => {}
            }
        }

        if constraint.closed {
            let known: HashSet<&str> = constraint.attributes.iter().map(|d| descriptor_local(&d.name)).collect();
            for attr in &element.attributes {
                if !known.contains(attr.name.local.as_str()) {
                    if !ctx.report(ValidationFinding::new(
                        Category::Schema,
                        Severity::Error,
                        format!("schema.unexpected-attribute: '{}' is not recognized on this element", attr.name.local),
                        ctx.part_uri.clone(),
                    ).with_node(attr.name.local.clone())) {
                        return;
                    }
                }
            }
        }
    }

    fn validate_children(
        &self,
        element: &XmlElement,
        constraint: &super::catalog::ElementConstraint,
        ctx: &mut ValidationContext,
        _reported_unknown: &mut HashSet<String>,
    ) {
        let Some(particle) = &constraint.children else { return };
        let child_names: Vec<_> = element.children.iter().map(|c| c.name.clone()).collect();
        let violations = check_children(particle, &child_names, self.catalog.groups());

        for violation in violations {
            let finding = particle_violation_finding(&violation, &ctx.part_uri);
            if !ctx.report(finding) {
                return;
            }
        }
    }
}

fn particle_violation_finding(violation: &ParticleViolation, part_uri: &str) -> ValidationFinding {
    match violation {
        ParticleViolation::MinOccursViolation { expected_names } => ValidationFinding::new(
            Category::Schema,
            Severity::Error,
            format!("schema.min-occurs-violation: expected one of {expected_names:?}"),
            part_uri,
        ),
        ParticleViolation::WrongElementOrder { expected_names, found } => ValidationFinding::new(
            Category::Schema,
            Severity::Error,
            format!("schema.wrong-element-order: found '{found}', expected one of {expected_names:?}"),
            part_uri,
        ),
        ParticleViolation::MissingChoice { expected_names } => ValidationFinding::new(
            Category::Schema,
            Severity::Error,
            format!("schema.missing-choice: expected one of {expected_names:?}"),
            part_uri,
        ),
        ParticleViolation::MaxOccursViolation { name } => ValidationFinding::new(
            Category::Schema,
            Severity::Error,
            format!("schema.max-occurs-violation: '{name}' appears more times than allowed"),
            part_uri,
        ),
        ParticleViolation::UnexpectedElement { name } => ValidationFinding::new(
            Category::Schema,
            Severity::Error,
            format!("schema.unexpected-element: '{name}' is not permitted here"),
            part_uri,
        ),
    }
}

fn type_violation_finding(attr_name: &str, value: &str, violation: &TypeViolation, part_uri: &str) -> ValidationFinding {
    let description = match violation {
        TypeViolation::ValueOutOfRange { bound_description } => {
            format!("schema.value-out-of-range: '{attr_name}'='{value}' must be {bound_description}")
        }
        TypeViolation::InvalidBoolean => {
            format!("schema.invalid-boolean: '{attr_name}'='{value}' is not true/false/1/0")
        }
        TypeViolation::PatternMismatch => {
            format!("schema.value-out-of-range: '{attr_name}'='{value}' does not match the required pattern")
        }
        TypeViolation::InvalidListItem { position } => {
            format!("schema.value-out-of-range: '{attr_name}'='{value}' has an invalid item at position {position}")
        }
        TypeViolation::NoUnionAlternativeMatched => {
            format!("schema.value-out-of-range: '{attr_name}'='{value}' matches no alternative type")
        }
    };
    ValidationFinding::new(Category::Schema, Severity::Error, description, part_uri).with_node(attr_name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::catalog::build_pptx_catalog;
    use ooxml_pack::{FormatVersion, Package};
    use ooxml_pack::xmltree::parse_document;

    fn dummy_package() -> Package {
        Package::from_bytes(b"PK\x05\x06\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0", "pptx").unwrap()
    }

    #[test]
    fn out_of_range_offset_emits_one_finding() {
        let catalog = build_pptx_catalog();
        let validator = SchemaValidator::new(&catalog);
        let xml = br#"<p:sp xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"
                xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">
          <p:nvSpPr/>
          <p:spPr><a:xfrm><a:off x="9999999999" y="0"/><a:ext cx="100" cy="100"/></a:xfrm></p:spPr>
        </p:sp>"#;
        let root = parse_document(xml).unwrap();
        let pkg = dummy_package();
        let mut ctx = ValidationContext::new(&pkg, "/ppt/slides/slide1.xml", FormatVersion::Office2019, 1000);
        validator.validate_part(&root, &mut ctx);
        let findings = ctx.accumulator.into_vec();
        assert!(findings.iter().any(|f| f.description.contains("schema.value-out-of-range")));
    }

    #[test]
    fn missing_required_attribute_is_reported() {
        let catalog = build_pptx_catalog();
        let validator = SchemaValidator::new(&catalog);
        let xml = br#"<a:off xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" x="0"/>"#;
        let root = parse_document(xml).unwrap();
        let pkg = dummy_package();
        let mut ctx = ValidationContext::new(&pkg, "/ppt/slides/slide1.xml", FormatVersion::Office2019, 1000);
        validator.validate_part(&root, &mut ctx);
        let findings = ctx.accumulator.into_vec();
        assert!(findings.iter().any(|f| f.description.contains("missing-required-attribute")));
    }
}
