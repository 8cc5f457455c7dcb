//! Reading and writing COCO manifest files.
//!
//! Manifests are written pretty-printed with two-space indentation and in
//! the order the records were accumulated. Record order is meaningful after
//! a merge (image IDs are dense in processing order), so nothing is sorted.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use super::model::Manifest;
use crate::error::CocomergeError;

/// Reads a manifest from a JSON file.
///
/// # Errors
/// Returns [`CocomergeError::Io`] if the file cannot be opened and
/// [`CocomergeError::ManifestParse`] if it is not a valid manifest.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use cocomerge::coco::io::read_manifest;
///
/// let manifest = read_manifest(Path::new("Cars/train/_annotations.coco.json"))?;
/// println!("{} images", manifest.images.len());
/// # Ok::<(), cocomerge::CocomergeError>(())
/// ```
pub fn read_manifest(path: &Path) -> Result<Manifest, CocomergeError> {
    let file = File::open(path).map_err(CocomergeError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| CocomergeError::ManifestParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a manifest to a JSON file, replacing any existing file.
pub fn write_manifest(path: &Path, manifest: &Manifest) -> Result<(), CocomergeError> {
    let file = File::create(path).map_err(CocomergeError::Io)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, manifest).map_err(|source| {
        CocomergeError::ManifestWrite {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Parses a manifest from a JSON string.
pub fn from_manifest_str(json: &str) -> Result<Manifest, serde_json::Error> {
    serde_json::from_str(json)
}

/// Parses a manifest from raw bytes. Used by the fuzz target.
pub fn from_manifest_slice(bytes: &[u8]) -> Result<Manifest, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Serializes a manifest to a pretty-printed JSON string.
pub fn to_manifest_string(manifest: &Manifest) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(manifest)
}
