//! Format-specific registration for PPTX (§4.8 phase 5): wires the hand
//! written schema and semantic catalogs together with the Schematron-bridged
//! constraints, and names the conventional main-part path for this format.

use crate::schema::{build_pptx_catalog, SchemaCatalog};
use crate::schematron::{compile_into_catalog, BridgeStats};
use crate::semantic::{build_pptx_semantic_catalog, ConstraintCatalog};
use crate::schematron::rule::embedded_rule_inventory;

/// The complete rule set for one supported document format: a schema
/// catalog and a semantic constraint catalog, built once at validator setup
/// and shared by immutable reference across validations (§9).
pub struct FormatCatalog {
    pub schema: SchemaCatalog,
    pub semantic: ConstraintCatalog,
    pub bridge_stats: BridgeStats,
}

/// Builds the PPTX format catalog: hand-written schema/semantic rules plus
/// whatever the embedded Schematron inventory bridges into concrete
/// constraints.
pub fn build() -> FormatCatalog {
    let schema = build_pptx_catalog();
    let mut semantic = build_pptx_semantic_catalog();
    let (bridged, bridge_stats) = compile_into_catalog(&embedded_rule_inventory());
    semantic.merge(bridged);

    if bridge_stats.unknown > 0 {
        tracing::debug!(
            unknown = bridge_stats.unknown,
            compiled = bridge_stats.compiled,
            coverage = bridge_stats.coverage(),
            "schematron bridge skipped some rules at load time"
        );
    }

    FormatCatalog { schema, semantic, bridge_stats }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_merges_hand_written_and_bridged_constraints() {
        let catalog = build();
        assert!(catalog.bridge_stats.coverage() >= 0.85);
        // Sem_ShapeIdUnique (hand-written) and Sch_ShapeIdUniqueInTree
        // (bridged) both target p:sp; both should be present.
        let ns_p = "http://schemas.openxmlformats.org/presentationml/2006/main";
        let sp = ooxml_pack::QName::new(ns_p, "sp");
        let constraints = catalog.semantic.for_element(&sp);
        assert!(constraints.iter().any(|c| c.rule_id() == "Sem_ShapeIdUnique"));
        assert!(constraints.iter().any(|c| c.rule_id() == "Sch_ShapeIdUniqueInTree"));
    }
}
