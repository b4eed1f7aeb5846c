//! Semantic validator: traversal driver for the constraint catalog (§4.6).

use super::catalog::ConstraintCatalog;
use super::constraint::{CompareOp, Scope, SemanticConstraint};
use crate::context::ValidationContext;
use ooxml_pack::{Category, Package, QName, Severity, TargetMode, ValidationFinding, XmlElement};
use std::collections::{HashMap, HashSet};

pub struct SemanticValidator<'cat> {
    catalog: &'cat ConstraintCatalog,
}

/// Per-run state for constraints that must remember what they have already
/// seen across the traversal (currently just `Unique`).
#[derive(Default)]
struct RunState {
    seen_unique: HashMap<(usize, String, String), ()>,
}

impl<'cat> SemanticValidator<'cat> {
    pub fn new(catalog: &'cat ConstraintCatalog) -> Self {
        Self { catalog }
    }

    pub fn validate_part(&self, root: &XmlElement, ctx: &mut ValidationContext) {
        let mut state = RunState::default();
        self.visit(root, &[], ctx, &mut state);
    }

    fn visit<'a>(
        &self,
        element: &'a XmlElement,
        ancestors: &[&'a XmlElement],
        ctx: &mut ValidationContext,
        state: &mut RunState,
    ) {
        if ctx.is_full() {
            return;
        }
        let display_name = element.name.display_with_prefix();
        ctx.enter_element(&display_name);

        for constraint in self.catalog.for_element(&element.name) {
            if !self.evaluate(constraint, element, ancestors, ctx, state) {
                ctx.exit_element();
                return;
            }
        }

        let mut next_ancestors = ancestors.to_vec();
        next_ancestors.push(element);
        for child in &element.children {
            if ctx.is_full() {
                break;
            }
            self.visit(child, &next_ancestors, ctx, state);
        }

        ctx.exit_element();
    }

    /// Evaluates one constraint. Returns `false` if the finding cap was hit
    /// while reporting and traversal should stop.
    fn evaluate<'a>(
        &self,
        constraint: &SemanticConstraint,
        element: &'a XmlElement,
        ancestors: &[&'a XmlElement],
        ctx: &mut ValidationContext,
        state: &mut RunState,
    ) -> bool {
        match constraint {
            SemanticConstraint::Range { rule_id, attribute, min, max, forbid_non_finite } => {
                let Some(raw) = element.attr_prefixed(attribute) else { return true };
                let Ok(value) = raw.parse::<f64>() else { return true };
                if *forbid_non_finite && (value.is_nan() || value.is_infinite()) {
                    return report(ctx, constraint, format!("semantic.range-violation: '{attribute}'='{raw}' is not finite"));
                }
                if min.is_some_and(|m| value < m) || max.is_some_and(|m| value > m) {
                    return report(ctx, constraint, format!(
                        "semantic.range-violation: '{attribute}'='{raw}' outside [{min:?}, {max:?}]",
                        min = min, max = max
                    ));
                }
                true
            }
            SemanticConstraint::Length { rule_id: _, attribute, min, max } => {
                let Some(value) = element.attr_prefixed(attribute) else { return true };
                let len = value.chars().count();
                if min.is_some_and(|m| len < m) || max.is_some_and(|m| len > m) {
                    return report(ctx, constraint, format!("semantic.length-violation: '{attribute}' length {len} outside bounds"));
                }
                true
            }
            SemanticConstraint::Pattern { rule_id: _, attribute, regex } => {
                let Some(value) = element.attr_prefixed(attribute) else { return true };
                if !regex.is_match(value) {
                    return report(ctx, constraint, format!("semantic.pattern-violation: '{attribute}'='{value}' does not match"));
                }
                true
            }
            SemanticConstraint::Enum { rule_id: _, attribute, values, case_sensitive } => {
                let Some(value) = element.attr_prefixed(attribute) else { return true };
                let matched = if *case_sensitive {
                    values.iter().any(|v| v == value)
                } else {
                    values.iter().any(|v| v.eq_ignore_ascii_case(value))
                };
                if !matched {
                    return report(ctx, constraint, format!("semantic.enum-violation: '{attribute}'='{value}' not in {values:?}"));
                }
                true
            }
            SemanticConstraint::NotEqual { rule_id: _, attribute, value: forbidden, case_sensitive } => {
                let Some(value) = element.attr_prefixed(attribute) else { return true };
                let equal = if *case_sensitive { value == forbidden } else { value.eq_ignore_ascii_case(forbidden) };
                if equal {
                    return report(ctx, constraint, format!("semantic.not-equal-violation: '{attribute}' must not equal '{forbidden}'"));
                }
                true
            }
            SemanticConstraint::Unique { rule_id, attribute, scope } => {
                let Some(value) = element.attr_prefixed(attribute) else { return true };
                let scope_ptr = resolve_scope_ptr(scope, element, ancestors);
                let key = (scope_ptr, rule_id.clone(), value.to_string());
                if state.seen_unique.insert(key, ()).is_some() {
                    return report(ctx, constraint, format!("semantic.unique-violation: duplicate '{attribute}'='{value}' within scope"));
                }
                true
            }
            SemanticConstraint::ReferenceExist { rule_id: _, attribute, referenced_attribute, scope } => {
                let Some(value) = element.attr_prefixed(attribute) else { return true };
                let scope_root = resolve_scope_root(scope, element, ancestors);
                let exists = scope_root
                    .walk()
                    .iter()
                    .any(|e| e.attr_prefixed(referenced_attribute) == Some(value));
                if !exists {
                    return report(ctx, constraint, format!("semantic.reference-missing: '{attribute}'='{value}' does not match any '{referenced_attribute}'"));
                }
                true
            }
            SemanticConstraint::IndexReference { rule_id: _, attribute, target_element, scope } => {
                let Some(raw) = element.attr_prefixed(attribute) else { return true };
                let Ok(idx) = raw.parse::<i64>() else { return true };
                let scope_root = resolve_scope_root(scope, element, ancestors);
                let count = scope_root.walk().iter().filter(|e| e.name == *target_element).count() as i64;
                if idx < 0 || idx >= count {
                    return report(ctx, constraint, format!("semantic.index-out-of-range: '{attribute}'={idx} not in [0, {count})"));
                }
                true
            }
            SemanticConstraint::RelationshipExist { rule_id: _, attribute } => {
                let Some(rid) = element.attr_prefixed(attribute) else { return true };
                let Some(part) = ctx.package.part(&ctx.part_uri) else { return true };
                if part.relationships().get(rid).is_none() {
                    return report(ctx, constraint, format!("semantic.relationship-missing: '{attribute}'='{rid}' is not a known relationship id"));
                }
                true
            }
            SemanticConstraint::RelationshipType { rule_id: _, attribute, expected_type } => {
                let Some(rid) = element.attr_prefixed(attribute) else { return true };
                let Some(part) = ctx.package.part(&ctx.part_uri) else { return true };
                let Some(rel) = part.relationships().get(rid) else { return true }; // absence handled by RelationshipExist
                if rel.rel_type != *expected_type {
                    return report(ctx, constraint, format!("semantic.relationship-type-mismatch: '{attribute}'='{rid}' has type '{}', expected '{expected_type}'", rel.rel_type));
                }
                true
            }
            SemanticConstraint::MutualExclusive { rule_id: _, attributes } => {
                let present = attributes.iter().filter(|a| element.attr_prefixed(a).is_some()).count();
                if present > 1 {
                    return report(ctx, constraint, format!("semantic.mutual-exclusive-violation: more than one of {attributes:?} present"));
                }
                true
            }
            SemanticConstraint::RequiredCondition { rule_id: _, trigger_attribute, trigger_value, required_attribute } => {
                if element.attr_prefixed(trigger_attribute) == Some(trigger_value.as_str()) && element.attr_prefixed(required_attribute).is_none() {
                    return report(ctx, constraint, format!("semantic.required-condition-violation: '{required_attribute}' required when '{trigger_attribute}'='{trigger_value}'"));
                }
                true
            }
            SemanticConstraint::Presence { rule_id: _, attributes } => {
                let missing: Vec<&String> = attributes.iter().filter(|a| element.attr_prefixed(a).is_none()).collect();
                if !missing.is_empty() {
                    return report(ctx, constraint, format!("semantic.presence-violation: missing {missing:?}"));
                }
                true
            }
            SemanticConstraint::AttributeCompare { rule_id: _, left, op, right, numeric } => {
                let (Some(l), Some(r)) = (element.attr_prefixed(left), element.attr_prefixed(right)) else { return true };
                let ok = if *numeric {
                    match (l.parse::<f64>(), r.parse::<f64>()) {
                        (Ok(lv), Ok(rv)) => op.apply_numeric(lv, rv),
                        _ => true,
                    }
                } else {
                    op.apply_string(l, r)
                };
                if !ok {
                    return report(ctx, constraint, format!("semantic.attribute-compare-violation: '{left}'='{l}' does not satisfy comparison against '{right}'='{r}'"));
                }
                true
            }
            SemanticConstraint::Or { rule_id: _, branches } => {
                let any_passes = branches.iter().any(|b| evaluate_pure(b, element, ancestors, ctx, state));
                if !any_passes {
                    return report(ctx, constraint, "semantic.or-violation: no branch satisfied".to_string());
                }
                true
            }
            SemanticConstraint::And { rule_id: _, branches } => {
                let all_pass = branches.iter().all(|b| evaluate_pure(b, element, ancestors, ctx, state));
                if !all_pass {
                    return report(ctx, constraint, "semantic.and-violation: not every branch satisfied".to_string());
                }
                true
            }
            SemanticConstraint::Conditional { rule_id: _, trigger_attribute, body } => {
                if element.attr_prefixed(trigger_attribute).is_some() {
                    return self.evaluate(body, element, ancestors, ctx, state);
                }
                true
            }
            SemanticConstraint::CrossPartCount { rule_id: _, role_relationship_type, target_element: _, attribute: _, op } => {
                let Some(part) = ctx.package.part(&ctx.part_uri) else { return true };
                let related_count = part.relationships().all_by_type(role_relationship_type).count() as f64;
                let declared_count = element.children.len() as f64;
                if !op.apply_numeric(declared_count, related_count) {
                    return report(ctx, constraint, format!(
                        "semantic.cross-part-count-violation: {declared_count} declared entries vs {related_count} relationships of type '{role_relationship_type}'"
                    ));
                }
                true
            }
        }
    }
}

/// Evaluates a constraint for its boolean outcome only, without touching
/// the context — used inside `Or`/`And` composition where sub-branches
/// must not independently emit findings.
fn evaluate_pure(constraint: &SemanticConstraint, element: &XmlElement, ancestors: &[&XmlElement], ctx: &ValidationContext, state: &RunState) -> bool {
    match constraint {
        SemanticConstraint::Enum { attribute, values, case_sensitive, .. } => match element.attr_prefixed(attribute) {
            None => true,
            Some(value) => {
                if *case_sensitive {
                    values.iter().any(|v| v == value)
                } else {
                    values.iter().any(|v| v.eq_ignore_ascii_case(value))
                }
            }
        },
        SemanticConstraint::Presence { attributes, .. } => attributes.iter().all(|a| element.attr_prefixed(a).is_some()),
        SemanticConstraint::RelationshipExist { attribute, .. } => {
            match (element.attr_prefixed(attribute), ctx.package.part(&ctx.part_uri)) {
                (Some(rid), Some(part)) => part.relationships().get(rid).is_some(),
                _ => true,
            }
        }
        SemanticConstraint::Unique { attribute, scope, .. } => {
            match element.attr_prefixed(attribute) {
                None => true,
                Some(value) => {
                    let scope_ptr = resolve_scope_ptr(scope, element, ancestors);
                    !state.seen_unique.contains_key(&(scope_ptr, constraint.rule_id().to_string(), value.to_string()))
                }
            }
        }
        // Other variants are not expected inside Or/And bodies in the
        // embedded rule inventory; treat as vacuously true rather than
        // guessing at a side-effecting re-evaluation.
        _ => true,
    }
}

fn resolve_scope_root<'a>(scope: &Scope, element: &'a XmlElement, ancestors: &[&'a XmlElement]) -> &'a XmlElement {
    match &scope.0 {
        None => ancestors.first().copied().unwrap_or(element),
        Some(name) => ancestors
            .iter()
            .rev()
            .find(|a| a.name == *name)
            .copied()
            .unwrap_or_else(|| ancestors.first().copied().unwrap_or(element)),
    }
}

fn resolve_scope_ptr(scope: &Scope, element: &XmlElement, ancestors: &[&XmlElement]) -> usize {
    resolve_scope_root(scope, element, ancestors) as *const XmlElement as usize
}

fn report(ctx: &mut ValidationContext, constraint: &SemanticConstraint, description: String) -> bool {
    ctx.report(
        ValidationFinding::new(Category::Semantic, Severity::Error, description, ctx.part_uri.clone())
            .with_rule_id(constraint.rule_id().to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::catalog::build_pptx_semantic_catalog;
    use ooxml_pack::xmltree::parse_document;
    use ooxml_pack::FormatVersion;

    fn dummy_package() -> Package {
        Package::from_bytes(b"PK\x05\x06\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0", "pptx").unwrap()
    }

    #[test]
    fn duplicate_shape_id_flags_second_occurrence() {
        let catalog = build_pptx_semantic_catalog();
        let validator = SemanticValidator::new(&catalog);
        let xml = br#"<p:spTree xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
          <p:sp id="1"/>
          <p:sp id="1"/>
        </p:spTree>"#;
        let root = parse_document(xml).unwrap();
        let pkg = dummy_package();
        let mut ctx = ValidationContext::new(&pkg, "/ppt/slides/slide1.xml", FormatVersion::Office2019, 1000);
        validator.validate_part(&root, &mut ctx);
        let findings = ctx.accumulator.into_vec();
        assert_eq!(findings.len(), 1);
        assert!(findings[0].description.contains("semantic.unique-violation"));
        assert_eq!(findings[0].rule_id.as_deref(), Some("Sem_ShapeIdUnique"));
    }

    #[test]
    fn unique_scope_does_not_cross_separate_slides() {
        let catalog = build_pptx_semantic_catalog();
        let validator = SemanticValidator::new(&catalog);
        // Two separate spTree scopes: each with its own id="1", no violation.
        let xml = br#"<root xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
          <p:spTree><p:sp id="1"/></p:spTree>
          <p:spTree><p:sp id="1"/></p:spTree>
        </root>"#;
        let root = parse_document(xml).unwrap();
        let pkg = dummy_package();
        let mut ctx = ValidationContext::new(&pkg, "/ppt/slides/slide1.xml", FormatVersion::Office2019, 1000);
        validator.validate_part(&root, &mut ctx);
        assert!(ctx.accumulator.into_vec().is_empty());
    }
}
