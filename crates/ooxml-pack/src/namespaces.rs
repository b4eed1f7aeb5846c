//! Well-known XML namespace prefixes and relationship-type URIs used across
//! the OOXML package and part-content-type formats.

/// A namespace-qualified element or attribute name.
///
/// Two `QName`s are equal iff both the local name and the namespace URI
/// match; an empty `uri` means "no namespace" (unqualified).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    pub uri: String,
    pub local: String,
}

impl QName {
    pub fn new(uri: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            local: local.into(),
        }
    }

    pub fn unqualified(local: impl Into<String>) -> Self {
        Self {
            uri: String::new(),
            local: local.into(),
        }
    }

    /// Render as `prefix:local` using the well-known prefix table, falling
    /// back to the bare local name if the namespace is not recognized.
    pub fn display_with_prefix(&self) -> String {
        match prefix_for(&self.uri) {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}:{}", self.local),
            _ => self.local.clone(),
        }
    }
}

macro_rules! ns_table {
    ($( $prefix:literal => $uri:literal ),* $(,)?) => {
        const TABLE: &[(&str, &str)] = &[$( ($prefix, $uri) ),*];

        /// Looks up the namespace URI bound to a short prefix.
        pub fn uri_for(prefix: &str) -> Option<&'static str> {
            TABLE.iter().find(|(p, _)| *p == prefix).map(|(_, u)| *u)
        }

        /// Reverse lookup: the conventional short prefix for a namespace URI.
        pub fn prefix_for(uri: &str) -> Option<&'static str> {
            TABLE.iter().find(|(_, u)| *u == uri).map(|(p, _)| *p)
        }
    };
}

ns_table! {
    "ct" => "http://schemas.openxmlformats.org/package/2006/content-types",
    "r" => "http://schemas.openxmlformats.org/officeDocument/2006/relationships",
    "pr" => "http://schemas.openxmlformats.org/package/2006/relationships",
    "p" => "http://schemas.openxmlformats.org/presentationml/2006/main",
    "a" => "http://schemas.openxmlformats.org/drawingml/2006/main",
    "w" => "http://schemas.openxmlformats.org/wordprocessingml/2006/main",
    "mc" => "http://schemas.openxmlformats.org/markup-compatibility/2006",
}

/// Well-known package-relationship type URIs naming the main document role
/// for each supported container extension.
pub mod rel_types {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
    pub const SLIDE_LAYOUT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
    pub const SLIDE_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
    pub const THEME: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
    pub const IMAGE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    pub const NOTES_SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide";
}

/// Maps a recognized container extension to the relationship-type URI its
/// `_rels/.rels` must carry for the main document part.
pub fn main_document_role(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "pptx" | "potx" | "ppsx" | "ppsm" | "pptm" => Some(rel_types::OFFICE_DOCUMENT),
        "docx" | "dotx" | "docm" => Some(rel_types::OFFICE_DOCUMENT),
        "xlsx" | "xltx" | "xlsm" => Some(rel_types::OFFICE_DOCUMENT),
        _ => None,
    }
}
