//! Dataset discovery: treat every subdirectory of a folder as a dataset.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::CocomergeError;

/// Lists the immediate subdirectories of `root`, sorted by name.
///
/// Hidden directories and `exclude` (typically the merge output, which may
/// live under the same root) are left out.
pub fn discover_datasets(root: &Path, exclude: &Path) -> Result<Vec<PathBuf>, CocomergeError> {
    if !root.is_dir() {
        return Err(CocomergeError::DatasetDiscovery {
            path: root.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }

    let excluded = exclude.canonicalize().ok();
    let mut datasets = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| CocomergeError::DatasetDiscovery {
            path: root.to_path_buf(),
            message: format!("failed while traversing directory: {source}"),
        })?;

        if !entry.file_type().is_dir() || entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        if let (Some(excluded), Ok(candidate)) = (&excluded, entry.path().canonicalize()) {
            if *excluded == candidate {
                continue;
            }
        }

        datasets.push(entry.into_path());
    }

    tracing::debug!(root = %root.display(), found = datasets.len(), "discovered datasets");
    Ok(datasets)
}

/// Appends discovered folders to `datasets`, skipping any that already name
/// the same directory (`Cars` and `./Cars` count as one).
pub fn append_discovered(datasets: &mut Vec<PathBuf>, found: Vec<PathBuf>) {
    let mut known: HashSet<PathBuf> = datasets.iter().map(|p| resolved(p)).collect();
    for path in found {
        if known.insert(resolved(&path)) {
            datasets.push(path);
        } else {
            tracing::debug!(dataset = %path.display(), "already listed, skipping");
        }
    }
}

fn resolved(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn lists_subdirectories_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["Trucks", "Buses", "Cars", ".cache", "merged"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        fs::write(dir.path().join("README.txt"), "not a dataset").unwrap();

        let found = discover_datasets(dir.path(), &dir.path().join("merged")).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["Buses", "Cars", "Trucks"]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_datasets(&dir.path().join("nope"), dir.path()).unwrap_err();
        assert!(matches!(err, CocomergeError::DatasetDiscovery { .. }));
    }

    #[test]
    fn discovered_folders_already_listed_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["Buses", "Cars"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }

        let mut datasets = vec![dir.path().join(".").join("Cars")];
        let found = discover_datasets(dir.path(), &dir.path().join("merged")).unwrap();
        append_discovered(&mut datasets, found);

        assert_eq!(datasets.len(), 2);
        assert_eq!(datasets[0], dir.path().join(".").join("Cars"));
        assert_eq!(datasets[1].file_name().unwrap(), "Buses");
    }
}
