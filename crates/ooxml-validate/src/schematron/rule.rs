//! Compact rule records consumed by the classifier/bridge, and the
//! embedded inventory built at packaging time from the vendor Schematron
//! sources.

use ooxml_pack::QName;

/// One Schematron-derived rule: a context element, a `test` expression, a
/// message template, and a stable rule id.
#[derive(Clone, Debug)]
pub struct CompactRule {
    pub rule_id: &'static str,
    pub context: QName,
    pub test: &'static str,
    pub message: &'static str,
}

const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

fn p(local: &str) -> QName {
    QName::new(NS_P, local)
}
fn a(local: &str) -> QName {
    QName::new(NS_A, local)
}

/// A representative slice of the vendor rule corpus, compact enough to
/// embed directly rather than generated by a separate build tool (which is
/// out of scope — only this loader and its output are in scope).
pub fn embedded_rule_inventory() -> Vec<CompactRule> {
    vec![
        CompactRule {
            rule_id: "Sch_OffsetXRange",
            context: a("off"),
            test: "@x >= -2147483648 and @x <= 2147483647",
            message: "off/@x must be within the 32-bit EMU coordinate range",
        },
        CompactRule {
            rule_id: "Sch_NameLength",
            context: p("sp"),
            test: "string-length(@name) <= 255",
            message: "shape name must not exceed 255 characters",
        },
        CompactRule {
            rule_id: "Sch_NamePattern",
            context: p("sp"),
            test: "matches(@name, '^[^<>]*$')",
            message: "shape name must not contain angle brackets",
        },
        CompactRule {
            rule_id: "Sch_ShapeIdUniqueInTree",
            context: p("sp"),
            test: "unique(@id, spTree)",
            message: "shape id must be unique within the shape tree",
        },
        CompactRule {
            rule_id: "Sch_SlideLayoutIdRef",
            context: p("sldLayoutId"),
            test: "relationship-exists(@r:id)",
            message: "sldLayoutId must reference an existing relationship",
        },
        CompactRule {
            rule_id: "Sch_SlideLayoutRelType",
            context: p("sldLayoutId"),
            test: "relationship-type(@r:id) = 'http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout'",
            message: "sldLayoutId relationship must be of type slideLayout",
        },
        CompactRule {
            rule_id: "Sch_FillOrLine",
            context: p("spPr"),
            test: "@fill != 'none'",
            message: "spPr fill must not be 'none' when line is also absent",
        },
        CompactRule {
            rule_id: "Sch_RotationPresence",
            context: a("xfrm"),
            test: "present(@rot, @flipH)",
            message: "xfrm must carry both rot and flipH when either is used",
        },
        CompactRule {
            rule_id: "Sch_OffLessThanExt",
            context: a("xfrm"),
            test: "off/@x <= ext/@cx",
            message: "offset x must not exceed extent cx",
        },
        CompactRule {
            rule_id: "Sch_ExtentOr",
            context: a("ext"),
            test: "(@cx > 0) or (@cy > 0 and @cx >= 0)",
            message: "ext must describe a non-degenerate extent",
        },
        CompactRule {
            rule_id: "Sch_ConditionalRotation",
            context: a("xfrm"),
            test: "if (@flipH) then present(@rot) else true()",
            message: "rot required whenever flipH is specified",
        },
        CompactRule {
            rule_id: "Sch_SlideCountCrossCheck",
            context: p("sldIdLst"),
            test: "count(sldId) = count-related-parts('slide')",
            message: "declared slide count must match related slide parts",
        },
        // Deliberately outside the closed grammar: exercises the UNKNOWN path.
        CompactRule {
            rule_id: "Sch_VendorSpecificXPathGeneralization",
            context: p("sp"),
            test: "ancestor::p:sld/descendant::p:nvSpPr[position() > 1]/preceding-sibling::*",
            message: "vendor rule with no closed-grammar equivalent",
        },
    ]
}
