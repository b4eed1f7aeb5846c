//! ooxml-validate - Schema and semantic validation for Office Open XML packages
//!
//! This crate walks the parts of an [`ooxml_pack::Package`] and reports
//! structural and semantic findings: particle-based content-model
//! violations (§4.5), cross-reference and attribute constraints (§4.6),
//! Schematron-bridged constraints loaded from a compact rule inventory
//! (§4.7), and relationship-graph integrity across the whole package
//! (§4.3). [`OoxmlValidator`] ties all of this together into the single
//! entry point most callers want.
//!
//! # Example
//!
//! ```no_run
//! use ooxml_validate::OoxmlValidator;
//!
//! let validator = OoxmlValidator::with_default_config();
//! let findings = validator.validate("deck.pptx");
//! for finding in &findings {
//!     println!("{}: {}", finding.part_uri, finding.description);
//! }
//! ```

pub mod config;
pub mod context;
pub mod formats;
pub mod schema;
pub mod schematron;
pub mod semantic;
pub mod validator;

pub use config::ValidationConfig;
pub use context::ValidationContext;
pub use formats::FormatCatalog;
pub use validator::OoxmlValidator;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
