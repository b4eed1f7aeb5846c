//! Validation context: the mutable cursor threaded through both the schema
//! and semantic traversals.

use ooxml_pack::{FindingAccumulator, FormatVersion, Package, ValidationFinding};
use std::collections::HashMap;

/// One entry in the element-path stack: a qualified name plus this
/// element's 1-based index among same-named siblings at this depth.
#[derive(Clone, Debug)]
struct PathEntry {
    display_name: String,
    index: usize,
}

/// Traversal cursor carrying the current part, the element-path stack, the
/// active format version, a bounded finding accumulator, and a back-pointer
/// to the owning package for cross-part constraints.
pub struct ValidationContext<'pkg> {
    pub package: &'pkg Package,
    pub part_uri: String,
    stack: Vec<PathEntry>,
    sibling_counts: Vec<HashMap<String, usize>>,
    pub format_version: FormatVersion,
    pub accumulator: FindingAccumulator,
}

impl<'pkg> ValidationContext<'pkg> {
    pub fn new(package: &'pkg Package, part_uri: impl Into<String>, format_version: FormatVersion, max_errors: usize) -> Self {
        Self {
            package,
            part_uri: part_uri.into(),
            stack: Vec::new(),
            sibling_counts: vec![HashMap::new()],
            format_version,
            accumulator: FindingAccumulator::new(Some(max_errors)),
        }
    }

    /// Pushes an element onto the path stack, computing its 1-based sibling
    /// index. Must be paired with `exit_element` on the way back out.
    pub fn enter_element(&mut self, display_name: &str) {
        let counts = self.sibling_counts.last_mut().expect("sibling_counts stack is never empty");
        let index = counts.entry(display_name.to_string()).or_insert(0);
        *index += 1;
        self.stack.push(PathEntry {
            display_name: display_name.to_string(),
            index: *index,
        });
        self.sibling_counts.push(HashMap::new());
    }

    pub fn exit_element(&mut self) {
        self.sibling_counts.pop();
        self.stack.pop();
    }

    /// Renders the current path as `/ns:name[idx]/...`.
    pub fn current_path(&self) -> String {
        let mut s = String::new();
        for entry in &self.stack {
            s.push('/');
            s.push_str(&entry.display_name);
            s.push('[');
            s.push_str(&entry.index.to_string());
            s.push(']');
        }
        s
    }

    /// Appends a finding at the current path and part. Returns `false` once
    /// the cap is reached, signaling the caller to stop at the next element
    /// boundary.
    pub fn report(&mut self, finding: ValidationFinding) -> bool {
        let finding = if finding.element_path.is_none() {
            finding.with_path(self.current_path())
        } else {
            finding
        };
        self.accumulator.push(finding)
    }

    pub fn is_full(&self) -> bool {
        self.accumulator.is_full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ooxml_pack::{Category, Severity};

    fn dummy_package() -> Package {
        Package::from_bytes(b"PK\x05\x06\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0", "pptx").unwrap()
    }

    #[test]
    fn path_grows_and_shrinks_with_sibling_indices() {
        let pkg = dummy_package();
        let mut ctx = ValidationContext::new(&pkg, "/ppt/slides/slide1.xml", FormatVersion::Office2019, 1000);
        ctx.enter_element("p:sld");
        ctx.enter_element("p:sp");
        assert_eq!(ctx.current_path(), "/p:sld[1]/p:sp[1]");
        ctx.exit_element();
        ctx.enter_element("p:sp");
        assert_eq!(ctx.current_path(), "/p:sld[1]/p:sp[2]");
        ctx.exit_element();
        ctx.exit_element();
        assert_eq!(ctx.current_path(), "");
    }

    #[test]
    fn report_fills_in_current_path_when_absent() {
        let pkg = dummy_package();
        let mut ctx = ValidationContext::new(&pkg, "/ppt/slides/slide1.xml", FormatVersion::Office2019, 1000);
        ctx.enter_element("p:sld");
        ctx.report(ValidationFinding::new(Category::Schema, Severity::Error, "oops", "/ppt/slides/slide1.xml"));
        let findings = ctx.accumulator.as_slice();
        assert_eq!(findings[0].element_path.as_deref(), Some("/p:sld[1]"));
    }
}
