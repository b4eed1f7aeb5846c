//! Constraint catalog: element tag -> ordered constraint list. A pure
//! mapping (§9) — constraints refer to element names as strings, never back
//! to an element constraint record, so no cycle is possible.

use super::constraint::{CompareOp, Scope, SemanticConstraint};
use ooxml_pack::QName;
use std::collections::HashMap;

#[derive(Default)]
pub struct ConstraintCatalog {
    by_element: HashMap<QName, Vec<SemanticConstraint>>,
}

impl ConstraintCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constraint for an element tag. Insertion order is the
    /// firing order within that tag.
    pub fn register(&mut self, element: QName, constraint: SemanticConstraint) {
        self.by_element.entry(element).or_default().push(constraint);
    }

    pub fn for_element(&self, name: &QName) -> &[SemanticConstraint] {
        self.by_element.get(name).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Folds another catalog's registrations into this one, appending after
    /// any constraints already registered for a given element so hand-written
    /// registrations still fire before Schematron-bridged ones.
    pub fn merge(&mut self, other: ConstraintCatalog) {
        for (name, constraints) in other.by_element {
            self.by_element.entry(name).or_default().extend(constraints);
        }
    }
}

const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

fn p(local: &str) -> QName {
    QName::new(NS_P, local)
}

/// Hand-written semantic registrations matching the constraints the §8
/// scenarios exercise directly, plus a representative sample of each
/// variant so the Schematron bridge has concrete targets to compile into.
pub fn build_pptx_semantic_catalog() -> ConstraintCatalog {
    let mut catalog = ConstraintCatalog::new();

    // Scenario 5: duplicate shape id within one slide's shape tree.
    catalog.register(
        p("sp"),
        SemanticConstraint::Unique {
            rule_id: "Sem_ShapeIdUnique".to_string(),
            attribute: "id".to_string(),
            scope: Scope(Some(p("spTree"))),
        },
    );

    // Slide dimensions must stay within the EMU range PowerPoint accepts.
    catalog.register(
        p("sldSz"),
        SemanticConstraint::Range {
            rule_id: "Sem_SlideSizeRange".to_string(),
            attribute: "cx".to_string(),
            min: Some(914400.0),
            max: Some(51206358000.0),
            forbid_non_finite: true,
        },
    );
    catalog.register(
        p("sldSz"),
        SemanticConstraint::Range {
            rule_id: "Sem_SlideSizeRangeY".to_string(),
            attribute: "cy".to_string(),
            min: Some(914400.0),
            max: Some(51206358000.0),
            forbid_non_finite: true,
        },
    );

    // Scenario 3: slide-layout relationship must exist and resolve, and its
    // relationship type must match.
    catalog.register(
        p("sldLayoutId"),
        SemanticConstraint::RelationshipExist {
            rule_id: "Sem_SlideLayoutRelExists".to_string(),
            attribute: "r:id".to_string(),
        },
    );
    catalog.register(
        p("sldLayoutId"),
        SemanticConstraint::RelationshipType {
            rule_id: "Sem_SlideLayoutRelType".to_string(),
            attribute: "r:id".to_string(),
            expected_type:
                "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout"
                    .to_string(),
        },
    );

    catalog.register(
        p("sldMasterId"),
        SemanticConstraint::RelationshipExist {
            rule_id: "Sem_SlideMasterRelExists".to_string(),
            attribute: "r:id".to_string(),
        },
    );
    catalog.register(
        p("sldMasterId"),
        SemanticConstraint::RelationshipType {
            rule_id: "Sem_SlideMasterRelType".to_string(),
            attribute: "r:id".to_string(),
            expected_type:
                "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster"
                    .to_string(),
        },
    );

    // Slide-list / part-count cross-check: the presentation's sldIdLst must
    // list exactly as many entries as there are slide parts related from
    // the presentation part of the matching relationship type.
    catalog.register(
        p("sldIdLst"),
        SemanticConstraint::CrossPartCount {
            rule_id: "Sem_SlideCountMatchesRelationships".to_string(),
            role_relationship_type:
                "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide"
                    .to_string(),
            target_element: p("sldIdLst"),
            attribute: "__child_count".to_string(),
            op: CompareOp::Eq,
        },
    );

    catalog
}
