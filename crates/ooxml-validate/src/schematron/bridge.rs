//! Compiles classified compact rules into concrete `SemanticConstraint`
//! values and registers them into a `ConstraintCatalog`.
//!
//! A rule that classifies `Unknown`, or whose leaf grammar matched but whose
//! captured pieces don't line up (e.g. a range whose two sides name
//! different attributes), is skipped rather than guessed at — see §9's
//! prohibition on an XPath-engine-in-disguise.

use super::classifier::{classify, split_boolean, RuleTag};
use super::rule::CompactRule;
use crate::semantic::{CompareOp, ConstraintCatalog, Scope, SemanticConstraint};
use ooxml_pack::QName;
use regex::Regex;
use std::sync::OnceLock;

struct Extractors {
    range: Regex,
    length: Regex,
    pattern: Regex,
    unique: Regex,
    relationship_exists: Regex,
    relationship_type: Regex,
    not_equal: Regex,
    equal: Regex,
    present: Regex,
    compare: Regex,
    conditional: Regex,
    cross_part_count: Regex,
}

static EXTRACTORS: OnceLock<Extractors> = OnceLock::new();

const NUMERIC: &str = r"[+-]?\d+(?:\.\d+)?(?:[eE][+-]?\d+)?f?";

fn extractors() -> &'static Extractors {
    EXTRACTORS.get_or_init(|| Extractors {
        range: Regex::new(&format!(
            r"^@([\w:-]+) >= ({n}) and @([\w:-]+) <= ({n})$",
            n = NUMERIC
        ))
        .unwrap(),
        length: Regex::new(r"^string-length\(@([\w:-]+)\) <= (\d+)$").unwrap(),
        pattern: Regex::new(r"^matches\(@([\w:-]+), '(.*)'\)$").unwrap(),
        unique: Regex::new(r"^unique\(@([\w:-]+), ([\w:-]+)\)$").unwrap(),
        relationship_exists: Regex::new(r"^relationship-exists\(@([\w:-]+)\)$").unwrap(),
        relationship_type: Regex::new(r"^relationship-type\(@([\w:-]+)\) = '([^']+)'$").unwrap(),
        not_equal: Regex::new(&format!(r"^@([\w:-]+) != (?:'([^']*)'|({n}))$", n = NUMERIC))
            .unwrap(),
        equal: Regex::new(&format!(r"^@([\w:-]+) = (?:'([^']*)'|({n}))$", n = NUMERIC)).unwrap(),
        present: Regex::new(r"^present\(((?:@[\w:-]+(?:, )?)+)\)$").unwrap(),
        compare: Regex::new(r"^([@\w:/-]+) (<=|>=|<|>|=) ([@\w:/-]+)$").unwrap(),
        conditional: Regex::new(r"^if \(@([\w:-]+)\) then (.+) else true\(\)$").unwrap(),
        cross_part_count: Regex::new(r"^count\([\w:-]+\) = count-related-parts\('([^']+)'\)$")
            .unwrap(),
    })
}

fn parse_numeric(raw: &str) -> Option<f64> {
    raw.trim_end_matches(['f', 'F']).parse::<f64>().ok()
}

fn compare_op(symbol: &str) -> CompareOp {
    match symbol {
        "<=" => CompareOp::Le,
        ">=" => CompareOp::Ge,
        "<" => CompareOp::Lt,
        ">" => CompareOp::Gt,
        _ => CompareOp::Eq,
    }
}

/// Compiles a single `test` expression into a constraint, recursing into
/// `Or`/`And`/`Conditional` bodies. `context` supplies the namespace used to
/// qualify bare local names such as a `unique(@id, spTree)` scope.
fn compile_test(rule_id: &str, context: &QName, test: &str) -> Option<SemanticConstraint> {
    let e = extractors();
    let tag = classify(test);
    let leaf = test.trim();

    match tag {
        RuleTag::AttributeValueRange => {
            let caps = e.range.captures(leaf)?;
            let attr_lo = &caps[1];
            let attr_hi = &caps[3];
            if attr_lo != attr_hi {
                return None;
            }
            Some(SemanticConstraint::Range {
                rule_id: rule_id.to_string(),
                attribute: attr_lo.to_string(),
                min: parse_numeric(&caps[2]),
                max: parse_numeric(&caps[4]),
                forbid_non_finite: true,
            })
        }
        RuleTag::AttributeValueLength => {
            let caps = e.length.captures(leaf)?;
            Some(SemanticConstraint::Length {
                rule_id: rule_id.to_string(),
                attribute: caps[1].to_string(),
                min: None,
                max: caps[2].parse::<usize>().ok(),
            })
        }
        RuleTag::AttributeValuePattern => {
            let caps = e.pattern.captures(leaf)?;
            let regex = Regex::new(&caps[2]).ok()?;
            Some(SemanticConstraint::Pattern {
                rule_id: rule_id.to_string(),
                attribute: caps[1].to_string(),
                regex,
            })
        }
        RuleTag::UniqueAttribute => {
            let caps = e.unique.captures(leaf)?;
            Some(SemanticConstraint::Unique {
                rule_id: rule_id.to_string(),
                attribute: caps[1].to_string(),
                scope: Scope(Some(QName::new(context.uri.clone(), caps[2].to_string()))),
            })
        }
        RuleTag::ElementReference => {
            let caps = e.relationship_exists.captures(leaf)?;
            Some(SemanticConstraint::RelationshipExist {
                rule_id: rule_id.to_string(),
                attribute: caps[1].to_string(),
            })
        }
        RuleTag::RelationshipType => {
            let caps = e.relationship_type.captures(leaf)?;
            Some(SemanticConstraint::RelationshipType {
                rule_id: rule_id.to_string(),
                attribute: caps[1].to_string(),
                expected_type: caps[2].to_string(),
            })
        }
        RuleTag::AttributeNotEqual => {
            let caps = e.not_equal.captures(leaf)?;
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map(|m| m.as_str().to_string())?;
            Some(SemanticConstraint::NotEqual {
                rule_id: rule_id.to_string(),
                attribute: caps[1].to_string(),
                value,
                case_sensitive: true,
            })
        }
        RuleTag::AttributeEqual => {
            let caps = e.equal.captures(leaf)?;
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map(|m| m.as_str().to_string())?;
            // No dedicated "equals a literal" variant exists; a single-value
            // Enum check is semantically identical.
            Some(SemanticConstraint::Enum {
                rule_id: rule_id.to_string(),
                attribute: caps[1].to_string(),
                values: vec![value],
                case_sensitive: true,
            })
        }
        RuleTag::AttributesPresent => {
            let caps = e.present.captures(leaf)?;
            let attributes = caps[1]
                .split(',')
                .map(|s| s.trim().trim_start_matches('@').to_string())
                .collect();
            Some(SemanticConstraint::Presence {
                rule_id: rule_id.to_string(),
                attributes,
            })
        }
        RuleTag::AttributeCompare => {
            let caps = e.compare.captures(leaf)?;
            Some(SemanticConstraint::AttributeCompare {
                rule_id: rule_id.to_string(),
                left: caps[1].trim_start_matches('@').to_string(),
                op: compare_op(&caps[2]),
                right: caps[3].trim_start_matches('@').to_string(),
                numeric: true,
            })
        }
        RuleTag::ConditionalValue => {
            let caps = e.conditional.captures(leaf)?;
            let body = compile_test(rule_id, context, caps[2].trim())?;
            Some(SemanticConstraint::Conditional {
                rule_id: rule_id.to_string(),
                trigger_attribute: caps[1].to_string(),
                body: Box::new(body),
            })
        }
        RuleTag::CrossPartCount => {
            let caps = e.cross_part_count.captures(leaf)?;
            Some(SemanticConstraint::CrossPartCount {
                rule_id: rule_id.to_string(),
                role_relationship_type: format!(
                    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/{}",
                    &caps[1]
                ),
                target_element: context.clone(),
                attribute: "__child_count".to_string(),
                op: CompareOp::Eq,
            })
        }
        RuleTag::OrCondition => {
            let branches = split_boolean(leaf, "or")?;
            let compiled: Option<Vec<SemanticConstraint>> = branches
                .iter()
                .map(|b| compile_test(rule_id, context, b))
                .collect();
            Some(SemanticConstraint::Or {
                rule_id: rule_id.to_string(),
                branches: compiled?,
            })
        }
        RuleTag::AndCondition => {
            let branches = split_boolean(leaf, "and")?;
            let compiled: Option<Vec<SemanticConstraint>> = branches
                .iter()
                .map(|b| compile_test(rule_id, context, b))
                .collect();
            Some(SemanticConstraint::And {
                rule_id: rule_id.to_string(),
                branches: compiled?,
            })
        }
        RuleTag::Unknown => None,
    }
}

#[derive(Default, Debug, Clone, Copy)]
pub struct BridgeStats {
    pub compiled: usize,
    pub unknown: usize,
}

impl BridgeStats {
    pub fn coverage(&self) -> f64 {
        let total = self.compiled + self.unknown;
        if total == 0 {
            1.0
        } else {
            self.compiled as f64 / total as f64
        }
    }
}

/// Compiles every rule in `rules` and registers the successes into a fresh
/// catalog. Rules that don't compile are logged once each at load time.
pub fn compile_into_catalog(rules: &[CompactRule]) -> (ConstraintCatalog, BridgeStats) {
    let mut catalog = ConstraintCatalog::new();
    let mut stats = BridgeStats::default();

    for rule in rules {
        match compile_test(rule.rule_id, &rule.context, rule.test) {
            Some(constraint) => {
                catalog.register(rule.context.clone(), constraint);
                stats.compiled += 1;
            }
            None => {
                stats.unknown += 1;
                tracing::warn!(
                    rule_id = rule.rule_id,
                    test = rule.test,
                    "schematron rule did not match any recognized constraint pattern, skipping"
                );
            }
        }
    }

    (catalog, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schematron::rule::embedded_rule_inventory;

    #[test]
    fn embedded_inventory_clears_coverage_floor() {
        let (_, stats) = compile_into_catalog(&embedded_rule_inventory());
        assert!(stats.coverage() >= 0.85, "coverage {} below floor", stats.coverage());
        assert_eq!(stats.unknown, 1);
    }

    #[test]
    fn range_rule_compiles_with_shared_attribute() {
        let context = QName::new("ns", "off");
        let constraint =
            compile_test("R1", &context, "@x >= -2147483648 and @x <= 2147483647").unwrap();
        assert!(matches!(constraint, SemanticConstraint::Range { .. }));
    }

    #[test]
    fn conditional_rule_compiles_nested_presence_body() {
        let context = QName::new("ns", "xfrm");
        let constraint =
            compile_test("R2", &context, "if (@flipH) then present(@rot) else true()").unwrap();
        match constraint {
            SemanticConstraint::Conditional { trigger_attribute, body, .. } => {
                assert_eq!(trigger_attribute, "flipH");
                assert!(matches!(*body, SemanticConstraint::Presence { .. }));
            }
            other => panic!("unexpected constraint: {other:?}"),
        }
    }

    #[test]
    fn or_rule_compiles_nested_and_branch() {
        let context = QName::new("ns", "ext");
        let constraint =
            compile_test("R3", &context, "(@cx > 0) or (@cy > 0 and @cx >= 0)").unwrap();
        match constraint {
            SemanticConstraint::Or { branches, .. } => {
                assert_eq!(branches.len(), 2);
                assert!(matches!(branches[1], SemanticConstraint::And { .. }));
            }
            other => panic!("unexpected constraint: {other:?}"),
        }
    }

    #[test]
    fn unknown_rule_does_not_compile() {
        let context = QName::new("ns", "sp");
        assert!(compile_test(
            "R4",
            &context,
            "ancestor::p:sld/descendant::p:nvSpPr[position() > 1]/preceding-sibling::*"
        )
        .is_none());
    }
}
