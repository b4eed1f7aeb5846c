//! # ooxml-pack
//!
//! Open Packaging Conventions (OPC) package layer for Office Open XML
//! documents: the ZIP archive, the content-type dictionary, the part
//! registry, and the relationship graph between parts.
//!
//! This crate has no opinion about document *semantics* — that is
//! `ooxml-validate`'s job. It only decodes bytes into an addressable,
//! namespace-aware tree per part plus the relationship links between them.

pub mod archive;
pub mod content_types;
pub mod error;
pub mod finding;
pub mod namespaces;
pub mod package;
pub mod part;
pub mod relationships;
pub mod xmltree;

pub use error::{PackError, Result};
pub use finding::{Category, FindingAccumulator, FormatVersion, Severity, ValidationFinding};
pub use namespaces::QName;
pub use package::Package;
pub use part::Part;
pub use relationships::{Relationship, Relationships, TargetMode};
pub use xmltree::XmlElement;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
