//! Thin wrapper around a ZIP reader exposing every archive entry as raw
//! bytes keyed by its normalized path.

use crate::error::{PackError, Result};
use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;

#[derive(Debug, Default)]
pub struct Archive {
    entries: HashMap<String, Vec<u8>>,
}

impl Archive {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(std::io::Cursor::new(bytes))
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut zip = zip::ZipArchive::new(reader).map_err(|e| match e {
            zip::result::ZipError::InvalidArchive(msg) => {
                PackError::NotAContainer(msg.to_string())
            }
            other => PackError::Zip(other),
        })?;

        let mut entries = HashMap::new();
        for i in 0..zip.len() {
            let mut file = zip.by_index(i)?;
            let name = file.name().to_string();
            if name.ends_with('/') {
                continue; // directory entry
            }
            let normalized = normalize_entry_name(&name)?;
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            entries.insert(normalized, data);
        }

        Ok(Self { entries })
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.entries.get(path.trim_start_matches('/')).map(|v| v.as_slice())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path.trim_start_matches('/'))
    }

    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|s| s.as_str())
    }
}

/// Rejects entries whose name, once `../`-normalized, would escape the
/// archive root — a zip-slip / directory-traversal guard.
fn normalize_entry_name(name: &str) -> Result<String> {
    let mut depth: i32 = 0;
    for seg in name.split('/') {
        match seg {
            "" | "." => continue,
            ".." => {
                depth -= 1;
                if depth < 0 {
                    return Err(PackError::DirectoryTraversal(name.to_string()));
                }
            }
            _ => depth += 1,
        }
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let cursor = Cursor::new(&mut buf);
            let mut zip = ZipWriter::new(cursor);
            let options = SimpleFileOptions::default();
            for (name, data) in entries {
                zip.start_file(*name, options).unwrap();
                zip.write_all(data).unwrap();
            }
            zip.finish().unwrap();
        }
        buf
    }
    use std::io::Write;

    #[test]
    fn reads_entries_by_path() {
        let bytes = build_zip(&[("[Content_Types].xml", b"<Types/>")]);
        let archive = Archive::from_bytes(&bytes).unwrap();
        assert_eq!(archive.get("[Content_Types].xml"), Some(&b"<Types/>"[..]));
        assert!(archive.contains("/[Content_Types].xml"));
    }

    #[test]
    fn non_zip_bytes_are_not_a_container() {
        let err = Archive::from_bytes(b"not a zip").unwrap_err();
        matches!(err, PackError::NotAContainer(_) | PackError::Zip(_));
    }

    #[test]
    fn rejects_directory_traversal_entries() {
        assert!(normalize_entry_name("../../etc/passwd").is_err());
        assert!(normalize_entry_name("ppt/../ppt/presentation.xml").is_ok());
    }
}
