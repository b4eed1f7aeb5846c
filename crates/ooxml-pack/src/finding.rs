//! The validation finding value type: the single output unit of this system.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Package,
    Schema,
    Semantic,
    Relationship,
    MarkupCompatibility,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Package => "package",
            Category::Schema => "schema",
            Category::Semantic => "semantic",
            Category::Relationship => "relationship",
            Category::MarkupCompatibility => "markup-compatibility",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(s)
    }
}

/// Target application generation a document is validated against. Gates
/// version-restricted element/attribute tables in the schema catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormatVersion {
    Office2007,
    Office2010,
    Office2013,
    Office2016,
    Office2019,
    Office2021,
    Microsoft365,
}

impl Default for FormatVersion {
    fn default() -> Self {
        FormatVersion::Office2019
    }
}

/// A single, immutable validation result.
///
/// `element_path` segments look like `/ns:name[idx]/...`, 1-based where
/// siblings of the same tag repeat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFinding {
    pub category: Category,
    pub severity: Severity,
    pub description: String,
    pub part_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_node_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
}

impl ValidationFinding {
    pub fn new(
        category: Category,
        severity: Severity,
        description: impl Into<String>,
        part_uri: impl Into<String>,
    ) -> Self {
        Self {
            category,
            severity,
            description: description.into(),
            part_uri: part_uri.into(),
            element_path: None,
            node_name: None,
            related_node_name: None,
            rule_id: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.element_path = Some(path.into());
        self
    }

    pub fn with_node(mut self, name: impl Into<String>) -> Self {
        self.node_name = Some(name.into());
        self
    }

    pub fn with_related_node(mut self, name: impl Into<String>) -> Self {
        self.related_node_name = Some(name.into());
        self
    }

    pub fn with_rule_id(mut self, id: impl Into<String>) -> Self {
        self.rule_id = Some(id.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Append-only, single-owner collection of findings with a configurable cap.
///
/// Mirrors the "finding accumulator as mutable collection" design note: this
/// is never shared across threads without an explicit merge step, and
/// truncation produces one trailing `info` finding rather than a silent drop.
#[derive(Debug, Default)]
pub struct FindingAccumulator {
    findings: Vec<ValidationFinding>,
    max: Option<usize>,
    truncated: bool,
}

impl FindingAccumulator {
    pub fn new(max: Option<usize>) -> Self {
        Self {
            findings: Vec::new(),
            max,
            truncated: false,
        }
    }

    /// Appends a finding. Returns `false` once the cap has been reached, at
    /// which point the caller should stop traversal at the next element
    /// boundary.
    pub fn push(&mut self, finding: ValidationFinding) -> bool {
        if self.is_full() {
            if !self.truncated {
                self.truncated = true;
                self.findings.push(ValidationFinding::new(
                    Category::Package,
                    Severity::Info,
                    "finding output truncated at configured max_errors cap",
                    "",
                ));
            }
            return false;
        }
        self.findings.push(finding);
        !self.is_full()
    }

    pub fn is_full(&self) -> bool {
        matches!(self.max, Some(max) if self.findings.len() >= max)
    }

    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(ValidationFinding::is_error)
    }

    pub fn into_vec(self) -> Vec<ValidationFinding> {
        self.findings
    }

    pub fn as_slice(&self) -> &[ValidationFinding] {
        &self.findings
    }
}
