//! Loader and bridge translating compact Schematron-style rules into the
//! semantic constraint catalog (§4.7). The code-generation build tool that
//! produces `rule.rs`'s source material is out of scope; only this runtime
//! loader and its output are.

pub mod bridge;
pub mod classifier;
pub mod rule;

pub use bridge::{compile_into_catalog, BridgeStats};
pub use classifier::RuleTag;
pub use rule::CompactRule;
