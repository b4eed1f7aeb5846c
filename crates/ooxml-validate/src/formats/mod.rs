//! Format-specific catalog assembly (§4.8 phase 5). One module per
//! supported container extension; currently only PPTX is implemented.

pub mod presentation;

pub use presentation::{build, FormatCatalog};
