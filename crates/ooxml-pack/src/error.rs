//! Implementation faults raised while opening or reading a package.
//!
//! These are distinct from [`crate::finding::ValidationFinding`]: a
//! `PackError` means the system could not even establish enough context to
//! produce a finding (bad ZIP bytes, I/O failure). Once a package is open,
//! every problem with its content is reported as a finding instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackError {
    #[error("not a valid OPC container: {0}")]
    NotAContainer(String),

    #[error("archive entry escapes the package root: {0}")]
    DirectoryTraversal(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("part not found: {0}")]
    MissingPart(String),
}

pub type Result<T> = std::result::Result<T, PackError>;
