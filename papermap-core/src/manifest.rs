//! Run-level manifests
//!
//! Every artifact family ends with one manifest describing the bounds and
//! depth geometry. Clients read it first, so it is written last and swapped
//! into place with a rename.

use crate::types::{Bounds, MarkerId};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// What every manifest needs to know about the run as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Largest marker id, 0 for an empty run.
    pub latest_id: MarkerId,
    /// Padded marker bounds; all zero for an empty run.
    pub bounds: Bounds,
}

/// Wrap `value` as `callback(<json>)`.
pub fn jsonp<T: Serialize>(callback: &str, value: &T) -> serde_json::Result<String> {
    Ok(format!("{}({})", callback, serde_json::to_string(value)?))
}

/// Write `bytes` to `path`, creating parent directories as needed.
pub fn write_artifact(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)
}

/// Write to a temporary sibling and rename over `path`.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = tmp_sibling(path);
    write_artifact(&tmp, bytes)?;
    fs::rename(&tmp, path)
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_jsonp_envelope() {
        #[derive(Serialize)]
        struct Body {
            a: i32,
            b: &'static str,
        }
        let out = jsonp("cb_1", &Body { a: 3, b: "x" }).unwrap();
        assert_eq!(out, r#"cb_1({"a":3,"b":"x"})"#);
    }

    #[test]
    fn test_write_atomic_replaces_and_cleans_up() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("index.json");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
        assert!(!dir.path().join("nested").join("index.json.tmp").exists());
    }
}
