//! Element constraint table: the schema's per-tag attribute and content
//! model description, keyed by qualified name.
//!
//! Build-once, read-many (§9): constructed by [`build_pptx_catalog`] during
//! validator setup and handed around by immutable reference. No
//! module-level registry populated at import time.

use super::particle::{GroupTable, MaxOccurs, Particle};
use super::xsdtype::XsdType;
use ooxml_pack::{FormatVersion, QName};
use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct AttributeDescriptor {
    pub name: String,
    pub xsd_type: XsdType,
    pub required: bool,
    /// Versions in which this attribute is recognized; empty means "all".
    pub allowed_versions: Vec<FormatVersion>,
}

impl AttributeDescriptor {
    pub fn required(name: &str, xsd_type: XsdType) -> Self {
        Self { name: name.to_string(), xsd_type, required: true, allowed_versions: vec![] }
    }

    pub fn optional(name: &str, xsd_type: XsdType) -> Self {
        Self { name: name.to_string(), xsd_type, required: false, allowed_versions: vec![] }
    }

    pub fn applies_to(&self, version: FormatVersion) -> bool {
        self.allowed_versions.is_empty() || self.allowed_versions.contains(&version)
    }
}

/// Schema description of one element: its attributes and the particle
/// describing its permitted children. `closed` means unknown attributes are
/// reported; `allows_any_child` suppresses `schema.unexpected-element` for
/// this element's children (an implicit wildcard).
#[derive(Clone, Debug)]
pub struct ElementConstraint {
    pub name: QName,
    pub attributes: Vec<AttributeDescriptor>,
    pub children: Option<Particle>,
    pub closed: bool,
    pub allows_any_child: bool,
}

pub struct SchemaCatalog {
    elements: HashMap<QName, ElementConstraint>,
    groups: GroupTable,
}

impl SchemaCatalog {
    pub fn new(elements: Vec<ElementConstraint>, groups: GroupTable) -> Self {
        let elements = elements.into_iter().map(|e| (e.name.clone(), e)).collect();
        Self { elements, groups }
    }

    pub fn lookup(&self, name: &QName) -> Option<&ElementConstraint> {
        self.elements.get(name)
    }

    pub fn groups(&self) -> &GroupTable {
        &self.groups
    }
}

const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

fn p(local: &str) -> QName {
    QName::new(NS_P, local)
}
fn a(local: &str) -> QName {
    QName::new(NS_A, local)
}

fn element_ref(name: QName, min: u32, max: MaxOccurs) -> Particle {
    Particle::ElementRef { name, min, max }
}

/// A compact but real schema table for the subset of PPTX markup exercised
/// by the §8 scenarios: presentation root, slide master/layout references,
/// a slide's shape tree, and a shape's transform geometry.
pub fn build_pptx_catalog() -> SchemaCatalog {
    let mut elements = Vec::new();

    // p:presentation — (sldMasterIdLst, sldIdLst?, ...)
    elements.push(ElementConstraint {
        name: p("presentation"),
        attributes: vec![],
        children: Some(Particle::Sequence {
            children: vec![
                element_ref(p("sldMasterIdLst"), 1, MaxOccurs::Bounded(1)),
                element_ref(p("sldIdLst"), 0, MaxOccurs::Bounded(1)),
            ],
            min: 1,
            max: MaxOccurs::Bounded(1),
        }),
        closed: false,
        allows_any_child: true,
    });

    elements.push(ElementConstraint {
        name: p("sldMasterIdLst"),
        attributes: vec![],
        children: Some(Particle::Sequence {
            children: vec![element_ref(p("sldMasterId"), 1, MaxOccurs::Unbounded)],
            min: 1,
            max: MaxOccurs::Bounded(1),
        }),
        closed: true,
        allows_any_child: false,
    });

    elements.push(ElementConstraint {
        name: p("sldMasterId"),
        attributes: vec![
            AttributeDescriptor::optional("id", XsdType::Integer { min: Some(0), max: None }),
            AttributeDescriptor::required("r:id", XsdType::string(Some(1), None)),
        ],
        children: None,
        closed: true,
        allows_any_child: false,
    });

    elements.push(ElementConstraint {
        name: p("sldIdLst"),
        attributes: vec![],
        children: Some(Particle::Sequence {
            children: vec![element_ref(p("sldId"), 0, MaxOccurs::Unbounded)],
            min: 0,
            max: MaxOccurs::Bounded(1),
        }),
        closed: true,
        allows_any_child: false,
    });

    elements.push(ElementConstraint {
        name: p("sldId"),
        attributes: vec![
            AttributeDescriptor::required("id", XsdType::Integer { min: Some(256), max: None }),
            AttributeDescriptor::required("r:id", XsdType::string(Some(1), None)),
        ],
        children: None,
        closed: true,
        allows_any_child: false,
    });

    // p:sld — (cSld, ...)
    elements.push(ElementConstraint {
        name: p("sld"),
        attributes: vec![],
        children: Some(Particle::Sequence {
            children: vec![element_ref(p("cSld"), 1, MaxOccurs::Bounded(1))],
            min: 1,
            max: MaxOccurs::Bounded(1),
        }),
        closed: false,
        allows_any_child: true,
    });

    elements.push(ElementConstraint {
        name: p("cSld"),
        attributes: vec![],
        children: Some(Particle::Sequence {
            children: vec![element_ref(p("spTree"), 1, MaxOccurs::Bounded(1))],
            min: 1,
            max: MaxOccurs::Bounded(1),
        }),
        closed: false,
        allows_any_child: false,
    });

    elements.push(ElementConstraint {
        name: p("spTree"),
        attributes: vec![],
        // Shapes, group shapes and pictures may repeat freely; modeled with
        // an Any wildcard rather than enumerating every drawing variant.
        children: Some(Particle::Sequence {
            children: vec![Particle::Any { namespace: Some(NS_P.to_string()), min: 0, max: MaxOccurs::Unbounded }],
            min: 1,
            max: MaxOccurs::Bounded(1),
        }),
        closed: false,
        allows_any_child: true,
    });

    elements.push(ElementConstraint {
        name: p("sp"),
        attributes: vec![],
        children: Some(Particle::Sequence {
            children: vec![
                element_ref(p("nvSpPr"), 1, MaxOccurs::Bounded(1)),
                element_ref(p("spPr"), 1, MaxOccurs::Bounded(1)),
            ],
            min: 1,
            max: MaxOccurs::Bounded(1),
        }),
        closed: false,
        allows_any_child: true,
    });

    elements.push(ElementConstraint {
        name: p("nvSpPr"),
        attributes: vec![],
        children: None,
        closed: false,
        allows_any_child: true,
    });

    elements.push(ElementConstraint {
        name: p("spPr"),
        attributes: vec![],
        children: Some(Particle::Sequence {
            children: vec![element_ref(a("xfrm"), 0, MaxOccurs::Bounded(1))],
            min: 0,
            max: MaxOccurs::Bounded(1),
        }),
        closed: false,
        allows_any_child: true,
    });

    elements.push(ElementConstraint {
        name: a("xfrm"),
        attributes: vec![],
        children: Some(Particle::Sequence {
            children: vec![
                element_ref(a("off"), 0, MaxOccurs::Bounded(1)),
                element_ref(a("ext"), 0, MaxOccurs::Bounded(1)),
            ],
            min: 0,
            max: MaxOccurs::Bounded(1),
        }),
        closed: false,
        allows_any_child: false,
    });

    // ST_Coordinate32: a signed 32-bit EMU offset, per the drawingml schema.
    const EMU_BOUND: i64 = 2147483647;
    elements.push(ElementConstraint {
        name: a("off"),
        attributes: vec![
            AttributeDescriptor::required("x", XsdType::Integer { min: Some(-EMU_BOUND), max: Some(EMU_BOUND) }),
            AttributeDescriptor::required("y", XsdType::Integer { min: Some(-EMU_BOUND), max: Some(EMU_BOUND) }),
        ],
        children: None,
        closed: true,
        allows_any_child: false,
    });

    elements.push(ElementConstraint {
        name: a("ext"),
        attributes: vec![
            AttributeDescriptor::required("cx", XsdType::Integer { min: Some(0), max: Some(EMU_BOUND) }),
            AttributeDescriptor::required("cy", XsdType::Integer { min: Some(0), max: Some(EMU_BOUND) }),
        ],
        children: None,
        closed: true,
        allows_any_child: false,
    });

    SchemaCatalog::new(elements, GroupTable::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_looks_up_by_qualified_name() {
        let catalog = build_pptx_catalog();
        assert!(catalog.lookup(&p("sld")).is_some());
        assert!(catalog.lookup(&QName::unqualified("nonexistent")).is_none());
    }

    #[test]
    fn off_rejects_value_past_emu_bound() {
        let catalog = build_pptx_catalog();
        let off = catalog.lookup(&a("off")).unwrap();
        let x = off.attributes.iter().find(|at| at.name == "x").unwrap();
        assert!(x.xsd_type.validate("9999999999").is_err());
        assert!(x.xsd_type.validate("1000").is_ok());
    }
}
