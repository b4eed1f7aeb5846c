//! Tagged semantic constraint variants (§4.6).
//!
//! Kept as a closed enum rather than a trait object collection (§9): the
//! catalog stores values, not `Box<dyn Constraint>`, so evaluation is a
//! match rather than dynamic dispatch.

use ooxml_pack::QName;
use regex::Regex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
}

impl CompareOp {
    pub fn apply_numeric(&self, a: f64, b: f64) -> bool {
        match self {
            CompareOp::Lt => a < b,
            CompareOp::Le => a <= b,
            CompareOp::Eq => a == b,
            CompareOp::Ge => a >= b,
            CompareOp::Gt => a > b,
        }
    }

    pub fn apply_string(&self, a: &str, b: &str) -> bool {
        match self {
            CompareOp::Lt => a < b,
            CompareOp::Le => a <= b,
            CompareOp::Eq => a == b,
            CompareOp::Ge => a >= b,
            CompareOp::Gt => a > b,
        }
    }
}

/// Scope an attribute-uniqueness or reference check is bounded to: the
/// nearest ancestor element carrying this qualified name, or the whole part
/// when `None`.
#[derive(Clone, Debug)]
pub struct Scope(pub Option<QName>);

#[derive(Clone, Debug)]
pub enum SemanticConstraint {
    Range {
        rule_id: String,
        attribute: String,
        min: Option<f64>,
        max: Option<f64>,
        forbid_non_finite: bool,
    },
    Length {
        rule_id: String,
        attribute: String,
        min: Option<usize>,
        max: Option<usize>,
    },
    Pattern {
        rule_id: String,
        attribute: String,
        regex: Regex,
    },
    Enum {
        rule_id: String,
        attribute: String,
        values: Vec<String>,
        case_sensitive: bool,
    },
    NotEqual {
        rule_id: String,
        attribute: String,
        value: String,
        case_sensitive: bool,
    },
    Unique {
        rule_id: String,
        attribute: String,
        scope: Scope,
    },
    ReferenceExist {
        rule_id: String,
        attribute: String,
        referenced_attribute: String,
        scope: Scope,
    },
    IndexReference {
        rule_id: String,
        attribute: String,
        target_element: QName,
        scope: Scope,
    },
    RelationshipExist {
        rule_id: String,
        attribute: String,
    },
    RelationshipType {
        rule_id: String,
        attribute: String,
        expected_type: String,
    },
    MutualExclusive {
        rule_id: String,
        attributes: Vec<String>,
    },
    RequiredCondition {
        rule_id: String,
        trigger_attribute: String,
        trigger_value: String,
        required_attribute: String,
    },
    Presence {
        rule_id: String,
        attributes: Vec<String>,
    },
    AttributeCompare {
        rule_id: String,
        left: String,
        op: CompareOp,
        right: String,
        numeric: bool,
    },
    Or {
        rule_id: String,
        branches: Vec<SemanticConstraint>,
    },
    And {
        rule_id: String,
        branches: Vec<SemanticConstraint>,
    },
    Conditional {
        rule_id: String,
        trigger_attribute: String,
        body: Box<SemanticConstraint>,
    },
    CrossPartCount {
        rule_id: String,
        role_relationship_type: String,
        target_element: QName,
        attribute: String,
        op: CompareOp,
    },
}

impl SemanticConstraint {
    pub fn rule_id(&self) -> &str {
        match self {
            SemanticConstraint::Range { rule_id, .. }
            | SemanticConstraint::Length { rule_id, .. }
            | SemanticConstraint::Pattern { rule_id, .. }
            | SemanticConstraint::Enum { rule_id, .. }
            | SemanticConstraint::NotEqual { rule_id, .. }
            | SemanticConstraint::Unique { rule_id, .. }
            | SemanticConstraint::ReferenceExist { rule_id, .. }
            | SemanticConstraint::IndexReference { rule_id, .. }
            | SemanticConstraint::RelationshipExist { rule_id, .. }
            | SemanticConstraint::RelationshipType { rule_id, .. }
            | SemanticConstraint::MutualExclusive { rule_id, .. }
            | SemanticConstraint::RequiredCondition { rule_id, .. }
            | SemanticConstraint::Presence { rule_id, .. }
            | SemanticConstraint::AttributeCompare { rule_id, .. }
            | SemanticConstraint::Or { rule_id, .. }
            | SemanticConstraint::And { rule_id, .. }
            | SemanticConstraint::Conditional { rule_id, .. }
            | SemanticConstraint::CrossPartCount { rule_id, .. } => rule_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_op_numeric_and_string_agree_on_equality() {
        assert!(CompareOp::Eq.apply_numeric(1.0, 1.0));
        assert!(CompareOp::Eq.apply_string("a", "a"));
    }

    #[test]
    fn rule_id_accessor_covers_every_variant() {
        let c = SemanticConstraint::Presence { rule_id: "R1".into(), attributes: vec!["id".into()] };
        assert_eq!(c.rule_id(), "R1");
    }
}
