//! Merge configuration.
//!
//! A [`MergeConfig`] can be built in code, loaded from a YAML file with
//! [`load_config`], or assembled by the CLI (file values first, flags on top).
//!
//! ```yaml
//! datasets: [Buses, Cars, Trucks]
//! output: data/vehicle_dataset
//! splits: [train, valid]
//! default_supercategory: vehicle
//! info:
//!   description: Vehicle dataset
//!   year: 2025
//! licenses:
//!   - {id: 1, name: CC BY 4.0}
//! ```

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::CocomergeError;

/// Splits merged when none are configured.
pub const DEFAULT_SPLITS: [&str; 3] = ["train", "valid", "test"];

/// Manifest file name read from each `<dataset>/<split>/` directory.
pub const DEFAULT_INPUT_MANIFEST: &str = "_annotations_cleaned.coco.json";

/// Manifest file name written to each `<output>/<split>/` directory.
pub const DEFAULT_OUTPUT_MANIFEST: &str = "_annotations.coco.json";

/// Supercategory recorded for categories that do not declare one.
pub const DEFAULT_SUPERCATEGORY: &str = "vehicle";

/// The info block written when none is configured.
///
/// The description names the Nepali vehicle collection this tool was first
/// written for; set `info` in the config to describe other datasets.
pub fn default_info() -> Map<String, Value> {
    let mut info = Map::new();
    info.insert("description".into(), json!("Nepali Vehicle Dataset"));
    info.insert("version".into(), json!("1.0"));
    info.insert("year".into(), json!(2025));
    info.insert("contributor".into(), json!("Custom Conversion"));
    info.insert("date_created".into(), json!("2025-08-19"));
    info
}

/// The license list written when none is configured.
pub fn default_licenses() -> Vec<Value> {
    vec![json!({"id": 1, "name": "Unknown", "url": "http://example.com"})]
}

/// Everything the merge needs to know.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MergeConfig {
    /// Dataset roots. Order decides category and image ID assignment.
    pub datasets: Vec<PathBuf>,

    /// Root of the merged dataset.
    pub output: PathBuf,

    /// Split directory names, processed in order.
    pub splits: Vec<String>,

    /// Info block written to every output manifest, copied as given.
    pub info: Map<String, Value>,

    /// Licenses written to every output manifest, copied as given.
    pub licenses: Vec<Value>,

    pub input_manifest: String,

    pub output_manifest: String,

    pub default_supercategory: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            datasets: Vec::new(),
            output: PathBuf::new(),
            splits: DEFAULT_SPLITS.iter().map(|s| s.to_string()).collect(),
            info: default_info(),
            licenses: default_licenses(),
            input_manifest: DEFAULT_INPUT_MANIFEST.to_string(),
            output_manifest: DEFAULT_OUTPUT_MANIFEST.to_string(),
            default_supercategory: DEFAULT_SUPERCATEGORY.to_string(),
        }
    }
}

impl MergeConfig {
    /// Creates a config with default splits, metadata and file names.
    pub fn new<P: Into<PathBuf>>(
        datasets: impl IntoIterator<Item = P>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            datasets: datasets.into_iter().map(Into::into).collect(),
            output: output.into(),
            ..Default::default()
        }
    }

    /// Replaces the split list.
    pub fn with_splits<S: Into<String>>(mut self, splits: impl IntoIterator<Item = S>) -> Self {
        self.splits = splits.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the manifest file name read from each input split.
    pub fn with_input_manifest(mut self, name: impl Into<String>) -> Self {
        self.input_manifest = name.into();
        self
    }

    /// Location of a dataset's manifest for one split.
    pub fn input_manifest_path(&self, dataset: &Path, split: &str) -> PathBuf {
        dataset.join(split).join(&self.input_manifest)
    }

    /// Output directory of one split.
    pub fn output_split_dir(&self, split: &str) -> PathBuf {
        self.output.join(split)
    }

    /// Checks the config before any file is touched.
    ///
    /// Besides the obvious emptiness checks this rejects two datasets whose
    /// folder names coincide: the folder name is the filename prefix, so a
    /// repeat would let copied images overwrite each other.
    pub fn validate(&self) -> Result<(), CocomergeError> {
        if self.datasets.is_empty() {
            return Err(invalid("at least one dataset is required"));
        }
        if self.output.as_os_str().is_empty() {
            return Err(invalid("an output directory is required"));
        }
        if self.splits.is_empty() {
            return Err(invalid("at least one split is required"));
        }

        let mut seen_splits = HashSet::new();
        for split in &self.splits {
            if split.is_empty() || split.contains(['/', '\\']) || split == "." || split == ".." {
                return Err(invalid(format!("'{split}' is not a valid split name")));
            }
            if !seen_splits.insert(split.as_str()) {
                return Err(invalid(format!("split '{split}' is listed twice")));
            }
        }

        if self.input_manifest.is_empty() || self.output_manifest.is_empty() {
            return Err(invalid("manifest file names must not be empty"));
        }

        let mut prefixes: HashMap<String, &Path> = HashMap::new();
        for dataset in &self.datasets {
            let prefix = dataset_prefix(dataset)?;
            if let Some(first) = prefixes.insert(prefix.clone(), dataset) {
                return Err(invalid(format!(
                    "datasets {} and {} share the folder name '{}'",
                    first.display(),
                    dataset.display(),
                    prefix
                )));
            }
        }

        Ok(())
    }
}

/// The filename prefix for a dataset: its folder name.
///
/// Paths such as `.` have no final component, so those are resolved against
/// the filesystem first.
pub fn dataset_prefix(dataset: &Path) -> Result<String, CocomergeError> {
    if let Some(name) = dataset.file_name() {
        return Ok(name.to_string_lossy().into_owned());
    }

    let resolved = dataset.canonicalize().map_err(|_| {
        invalid(format!(
            "cannot derive a folder name from dataset path {}",
            dataset.display()
        ))
    })?;
    resolved
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            invalid(format!(
                "cannot derive a folder name from dataset path {}",
                dataset.display()
            ))
        })
}

/// Loads a merge config from a YAML file. Missing keys take their defaults.
pub fn load_config(path: &Path) -> Result<MergeConfig, CocomergeError> {
    let text = fs::read_to_string(path)?;
    serde_yaml::from_str(&text).map_err(|source| CocomergeError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

fn invalid(message: impl Into<String>) -> CocomergeError {
    CocomergeError::InvalidConfig {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_canonical_layout() {
        let config = MergeConfig::new(["Cars"], "out");
        assert_eq!(config.splits, vec!["train", "valid", "test"]);
        assert_eq!(config.licenses.len(), 1);
        assert_eq!(config.licenses[0]["name"], "Unknown");
        assert_eq!(config.info["description"], "Nepali Vehicle Dataset");
        assert_eq!(config.default_supercategory, "vehicle");
        assert_eq!(
            config.input_manifest_path(Path::new("Cars"), "train"),
            Path::new("Cars").join("train").join(DEFAULT_INPUT_MANIFEST)
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_duplicate_folder_names() {
        let config = MergeConfig::new(["a/Cars", "b/Cars"], "out");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("share the folder name 'Cars'"));
    }

    #[test]
    fn rejects_bad_split_lists() {
        let empty = MergeConfig::new(["Cars"], "out").with_splits(Vec::<String>::new());
        assert!(empty.validate().is_err());

        let repeated = MergeConfig::new(["Cars"], "out").with_splits(["train", "train"]);
        assert!(repeated.validate().is_err());

        let nested = MergeConfig::new(["Cars"], "out").with_splits(["train/x"]);
        assert!(nested.validate().is_err());
    }

    #[test]
    fn rejects_missing_datasets_and_output() {
        assert!(MergeConfig::new(Vec::<PathBuf>::new(), "out")
            .validate()
            .is_err());
        assert!(MergeConfig::new(["Cars"], "").validate().is_err());
    }

    #[test]
    fn prefix_of_current_dir_uses_real_name() {
        let dir = tempfile::tempdir().unwrap();
        let named = dir.path().join("Vans");
        fs::create_dir(&named).unwrap();
        assert_eq!(dataset_prefix(&named.join(".")).unwrap(), "Vans");
    }

    #[test]
    fn yaml_config_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merge.yaml");
        fs::write(
            &path,
            "datasets: [Buses, Cars]\noutput: merged\nsplits: [train]\ninfo:\n  description: Fleet\n  year: 2024\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.datasets, vec![PathBuf::from("Buses"), PathBuf::from("Cars")]);
        assert_eq!(config.splits, vec!["train"]);
        assert_eq!(config.info["description"], "Fleet");
        assert_eq!(config.info["year"], 2024);
        assert!(!config.info.contains_key("contributor"));
        assert_eq!(config.output_manifest, DEFAULT_OUTPUT_MANIFEST);
        assert_eq!(config.licenses, default_licenses());
    }

    #[test]
    fn yaml_config_rejects_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merge.yaml");
        fs::write(&path, "datasets: [Cars]\noutptu: merged\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, CocomergeError::ConfigParse { .. }));
    }
}
