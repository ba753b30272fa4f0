//! Whole-document JSON reads and writes.

use std::fs;
use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::Builder as TempFileBuilder;
use tracing::debug;

use crate::error::{PlaceError, Result};

fn unavailable(path: &Path, source: std::io::Error) -> PlaceError {
    PlaceError::StorageUnavailable {
        path: path.to_path_buf(),
        source,
    }
}

fn malformed(path: &Path, source: serde_json::Error) -> PlaceError {
    PlaceError::MalformedDocument {
        path: path.to_path_buf(),
        source,
    }
}

/// Read a document, failing if the file doesn't exist.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path).map_err(|e| unavailable(path, e))?;
    debug!(path = %path.display(), bytes = contents.len(), "Read document");
    serde_json::from_str(&contents).map_err(|e| malformed(path, e))
}

/// Read a document, treating a missing or blank file as the empty document.
pub(crate) fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    match fs::read_to_string(path) {
        Ok(contents) if contents.trim().is_empty() => Ok(T::default()),
        Ok(contents) => {
            debug!(path = %path.display(), bytes = contents.len(), "Read document");
            serde_json::from_str(&contents).map_err(|e| malformed(path, e))
        }
        Err(e) if e.kind() == IoErrorKind::NotFound => {
            debug!(path = %path.display(), "Document missing, starting empty");
            Ok(T::default())
        }
        Err(e) => Err(unavailable(path, e)),
    }
}

/// Replace a document.
///
/// The content goes to a uniquely named sibling file first, which is then
/// renamed over the target. Concurrent writers never share a staging file.
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| unavailable(parent, e))?;

    let contents = serde_json::to_string_pretty(value).map_err(|e| malformed(path, e))?;

    let mut staging = TempFileBuilder::new()
        .prefix(".")
        .suffix(".json.tmp")
        .tempfile_in(parent)
        .map_err(|e| unavailable(parent, e))?;
    staging
        .write_all(contents.as_bytes())
        .map_err(|e| unavailable(staging.path(), e))?;
    staging.persist(path).map_err(|e| unavailable(path, e.error))?;

    debug!(path = %path.display(), bytes = contents.len(), "Wrote document");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_reads_as_default() {
        let dir = TempDir::new().unwrap();
        let doc: BTreeMap<String, String> =
            read_json_or_default(&dir.path().join("absent.json")).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_missing_file_is_unavailable_when_required() {
        let dir = TempDir::new().unwrap();
        let result: Result<BTreeMap<String, String>> = read_json(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(PlaceError::StorageUnavailable { .. })));
    }

    #[test]
    fn test_write_creates_directories_and_leaves_no_staging_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("doc.json");
        let doc = BTreeMap::from([("key".to_string(), vec!["a".to_string()])]);

        write_json(&path, &doc).unwrap();

        let back: BTreeMap<String, Vec<String>> = read_json(&path).unwrap();
        assert_eq!(back, doc);

        let entries: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec!["doc.json"]);
    }

    #[test]
    fn test_unserialized_writers_dont_collide() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.json");

        let writers: Vec<_> = ["left", "right"]
            .into_iter()
            .map(|side| {
                let path = path.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        let doc = BTreeMap::from([(side.to_string(), vec![i.to_string(); 64])]);
                        write_json(&path, &doc).unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let last: BTreeMap<String, Vec<String>> = read_json(&path).unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_malformed_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let result: Result<BTreeMap<String, String>> = read_json_or_default(&path);
        assert!(matches!(result, Err(PlaceError::MalformedDocument { .. })));
    }
}
