//! Classifies a compact rule's `test` expression into one of a closed set
//! of variant tags by pattern-matching against a fixed grammar (§4.7).
//!
//! This is deliberately not an XPath engine (§9): anything outside the
//! recognized patterns below is tagged `Unknown` and skipped at load time.

use regex::Regex;
use std::sync::OnceLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleTag {
    AttributeValueRange,
    AttributeValueLength,
    AttributeValuePattern,
    UniqueAttribute,
    ElementReference,
    RelationshipType,
    AttributeNotEqual,
    AttributeEqual,
    AttributesPresent,
    AttributeCompare,
    AndCondition,
    OrCondition,
    ConditionalValue,
    CrossPartCount,
    Unknown,
}

struct Grammar {
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

static GRAMMAR: OnceLock<Grammar> = OnceLock::new();

/// Numeric literal grammar shared by several patterns: signed integers,
/// decimals, scientific notation (`-1.7E308`), and float-suffixed literals
/// (`32767f`).
const NUMERIC: &str = r"[+-]?\d+(?:\.\d+)?(?:[eE][+-]?\d+)?f?";

fn grammar() -> &'static Grammar {
    GRAMMAR.get_or_init(|| Grammar {
        range: Regex::new(&format!(
            r"^@[\w:-]+ >= {n} and @[\w:-]+ <= {n}$",
            n = NUMERIC
        ))
        .unwrap(),
        length: Regex::new(r"^string-length\(@[\w:-]+\) <= \d+$").unwrap(),
        pattern: Regex::new(r"^matches\(@[\w:-]+, '.*'\)$").unwrap(),
        unique: Regex::new(r"^unique\(@[\w:-]+, [\w:-]+\)$").unwrap(),
        relationship_exists: Regex::new(r"^relationship-exists\(@[\w:-]+\)$").unwrap(),
        relationship_type: Regex::new(r"^relationship-type\(@[\w:-]+\) = '[^']+'$").unwrap(),
        not_equal: Regex::new(&format!(r"^@[\w:-]+ != (?:'[^']*'|{n})$", n = NUMERIC)).unwrap(),
        equal: Regex::new(&format!(r"^@[\w:-]+ = (?:'[^']*'|{n})$", n = NUMERIC)).unwrap(),
        present: Regex::new(r"^present\(@[\w:-]+(?:, @[\w:-]+)*\)$").unwrap(),
        compare: Regex::new(r"^[@\w:/-]+ (?:<=|>=|<|>|=) [@\w:/-]+$").unwrap(),
        conditional: Regex::new(r"^if \(.+\) then .+ else .+$").unwrap(),
        cross_part_count: Regex::new(r"^count\([\w:-]+\) = count-related-parts\('[^']+'\)$").unwrap(),
    })
}

/// Splits a test expression on top-level `or`/`and`, respecting parenthesis
/// depth so `(a) or (b and c)` yields two branches, not three.
pub fn split_boolean(test: &str, keyword: &str) -> Option<Vec<String>> {
    let needle = format!(" {keyword} ");
    let mut depth = 0i32;
    let mut branches = Vec::new();
    let mut start = 0usize;
    let bytes = test.as_bytes();
    let mut i = 0usize;
    while i < test.len() {
        match bytes[i] {
            b'(' => depth += 1,
            b')' => depth -= 1,
            _ => {}
        }
        if depth == 0 && test[i..].starts_with(&needle) {
            branches.push(test[start..i].trim().to_string());
            i += needle.len();
            start = i;
            continue;
        }
        i += 1;
    }
    if branches.is_empty() {
        return None;
    }
    branches.push(test[start..].trim().to_string());
    Some(branches)
}

/// Strips one layer of enclosing parentheses, but only when the leading `(`
/// is actually matched by the trailing `)` — `(a) or (b)` must stay intact
/// rather than losing its first and last character.
fn strip_enclosing_parens(s: &str) -> &str {
    let s = s.trim();
    if !s.starts_with('(') || !s.ends_with(')') {
        return s;
    }
    let mut depth = 0i32;
    for (i, ch) in s.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 && i != s.len() - 1 {
                    return s;
                }
            }
            _ => {}
        }
    }
    &s[1..s.len() - 1]
}

/// Classifies a `test` expression. The two-sided range pattern (`@x >= n and
/// @x <= n`) is checked before generic `and`-splitting so it tags as a single
/// `AttributeValueRange` rather than a two-branch `AndCondition`; every other
/// leaf grammar is likewise tried before the expression is treated as a
/// compound boolean.
pub fn classify(test: &str) -> RuleTag {
    let test = test.trim();
    let g = grammar();
    let leaf = strip_enclosing_parens(test);

    if g.conditional.is_match(leaf) {
        return RuleTag::ConditionalValue;
    }
    if g.cross_part_count.is_match(leaf) {
        return RuleTag::CrossPartCount;
    }
    if g.range.is_match(leaf) {
        return RuleTag::AttributeValueRange;
    }
    if g.length.is_match(leaf) {
        return RuleTag::AttributeValueLength;
    }
    if g.pattern.is_match(leaf) {
        return RuleTag::AttributeValuePattern;
    }
    if g.unique.is_match(leaf) {
        return RuleTag::UniqueAttribute;
    }
    if g.relationship_type.is_match(leaf) {
        return RuleTag::RelationshipType;
    }
    if g.relationship_exists.is_match(leaf) {
        return RuleTag::ElementReference;
    }
    if g.not_equal.is_match(leaf) {
        return RuleTag::AttributeNotEqual;
    }
    if g.equal.is_match(leaf) {
        return RuleTag::AttributeEqual;
    }
    if g.present.is_match(leaf) {
        return RuleTag::AttributesPresent;
    }
    if g.compare.is_match(leaf) {
        return RuleTag::AttributeCompare;
    }

    if split_boolean(test, "or").is_some() {
        return RuleTag::OrCondition;
    }
    if split_boolean(test, "and").is_some() {
        return RuleTag::AndCondition;
    }

    RuleTag::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_range() {
        assert_eq!(
            classify("@x >= -2147483648 and @x <= 2147483647"),
            RuleTag::AttributeValueRange
        );
    }

    #[test]
    fn classifies_compound_and_condition() {
        // Unlike the same-attribute range shape above, a generic `and` of
        // two unrelated predicates stays a compound AndCondition.
        assert_eq!(
            classify("@cy > 0 and @cx >= 0"),
            RuleTag::AndCondition
        );
    }

    #[test]
    fn classifies_length() {
        assert_eq!(classify("string-length(@name) <= 255"), RuleTag::AttributeValueLength);
    }

    #[test]
    fn classifies_pattern() {
        assert_eq!(classify("matches(@name, '^[^<>]*$')"), RuleTag::AttributeValuePattern);
    }

    #[test]
    fn classifies_unique() {
        assert_eq!(classify("unique(@id, spTree)"), RuleTag::UniqueAttribute);
    }

    #[test]
    fn classifies_relationship_exists_and_type() {
        assert_eq!(classify("relationship-exists(@r:id)"), RuleTag::ElementReference);
        assert_eq!(
            classify("relationship-type(@r:id) = 'urn:example'"),
            RuleTag::RelationshipType
        );
    }

    #[test]
    fn classifies_cross_part_count() {
        assert_eq!(
            classify("count(sldId) = count-related-parts('slide')"),
            RuleTag::CrossPartCount
        );
    }

    #[test]
    fn classifies_nested_or_with_and_branch() {
        assert_eq!(
            classify("(@cx > 0) or (@cy > 0 and @cx >= 0)"),
            RuleTag::OrCondition
        );
    }

    #[test]
    fn classifies_conditional() {
        assert_eq!(
            classify("if (@flipH) then present(@rot) else true()"),
            RuleTag::ConditionalValue
        );
    }

    #[test]
    fn split_respects_parenthesis_depth() {
        let branches = split_boolean("(a) or (b and c)", "or").unwrap();
        assert_eq!(branches, vec!["(a)".to_string(), "(b and c)".to_string()]);
    }

    #[test]
    fn unrecognized_expression_is_unknown() {
        assert_eq!(
            classify("ancestor::p:sld/descendant::p:nvSpPr[position() > 1]/preceding-sibling::*"),
            RuleTag::Unknown
        );
    }
}
