//! The global category table and per-manifest category lookups.

use std::collections::HashMap;

use thiserror::Error;

use crate::coco::io::read_manifest;
use crate::coco::{Category, CategoryId};
use crate::config::MergeConfig;
use crate::error::CocomergeError;

/// A category reference that could not be mapped to a global ID.
///
/// Both cases mean the two passes over the input saw different data.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CategoryResolutionError {
    #[error("dataset {dataset}, split {split}: category id {category_id} is not declared in the manifest")]
    UnknownLocalId {
        dataset: String,
        split: String,
        category_id: CategoryId,
    },

    #[error("dataset {dataset}, split {split}: category '{name}' is missing from the global category table")]
    MissingGlobalName {
        dataset: String,
        split: String,
        name: String,
    },
}

/// Collects category names in first-seen order.
///
/// The builder is the only mutable stage; [`finish`](Self::finish) freezes
/// it into a [`CategoryTable`] before any split is merged.
#[derive(Debug)]
pub struct CategoryTableBuilder {
    default_supercategory: String,
    by_name: HashMap<String, CategoryId>,
    categories: Vec<Category>,
}

impl CategoryTableBuilder {
    pub fn new(default_supercategory: impl Into<String>) -> Self {
        Self {
            default_supercategory: default_supercategory.into(),
            by_name: HashMap::new(),
            categories: Vec::new(),
        }
    }

    /// Registers a category by name and returns its global ID.
    ///
    /// A name seen before keeps its ID and its first supercategory.
    pub fn observe(&mut self, category: &Category) -> CategoryId {
        if let Some(&id) = self.by_name.get(&category.name) {
            return id;
        }

        let id = CategoryId::new(self.categories.len() as u64);
        let supercategory = category
            .supercategory
            .clone()
            .unwrap_or_else(|| self.default_supercategory.clone());
        self.categories
            .push(Category::new(id, category.name.clone()).with_supercategory(supercategory));
        self.by_name.insert(category.name.clone(), id);
        id
    }

    pub fn finish(self) -> CategoryTable {
        CategoryTable {
            by_name: self.by_name,
            categories: self.categories,
        }
    }
}

/// Frozen name → global ID mapping shared by every output split.
#[derive(Clone, Debug, Default)]
pub struct CategoryTable {
    by_name: HashMap<String, CategoryId>,
    categories: Vec<Category>,
}

impl CategoryTable {
    pub fn get(&self, name: &str) -> Option<CategoryId> {
        self.by_name.get(name).copied()
    }

    /// The global category list, ordered by ID.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Scans every dataset × split manifest and builds the global table.
///
/// Datasets are visited in config order, splits in config order within each
/// dataset. Absent manifests are skipped without a diagnostic; a manifest
/// that exists but does not parse aborts the scan.
pub fn build_category_table(config: &MergeConfig) -> Result<CategoryTable, CocomergeError> {
    let mut builder = CategoryTableBuilder::new(config.default_supercategory.clone());

    for dataset in &config.datasets {
        for split in &config.splits {
            let path = config.input_manifest_path(dataset, split);
            if !path.is_file() {
                continue;
            }
            let manifest = read_manifest(&path)?;
            for category in &manifest.categories {
                builder.observe(category);
            }
        }
    }

    Ok(builder.finish())
}

/// Local category ID → name, built once per loaded manifest.
#[derive(Debug)]
pub struct LocalCategories<'a> {
    names: HashMap<CategoryId, &'a str>,
}

impl<'a> LocalCategories<'a> {
    /// Indexes a manifest's categories. If a local ID is declared twice the
    /// first declaration wins.
    pub fn new(categories: &'a [Category]) -> Self {
        let mut names = HashMap::with_capacity(categories.len());
        for category in categories {
            names.entry(category.id).or_insert(category.name.as_str());
        }
        Self { names }
    }

    pub fn name(&self, id: CategoryId) -> Option<&'a str> {
        self.names.get(&id).copied()
    }
}

/// Maps a local category ID to its global ID.
pub fn resolve_category(
    table: &CategoryTable,
    local: &LocalCategories<'_>,
    category_id: CategoryId,
    dataset: &str,
    split: &str,
) -> Result<CategoryId, CategoryResolutionError> {
    let name = local
        .name(category_id)
        .ok_or_else(|| CategoryResolutionError::UnknownLocalId {
            dataset: dataset.to_string(),
            split: split.to_string(),
            category_id,
        })?;

    table
        .get(name)
        .ok_or_else(|| CategoryResolutionError::MissingGlobalName {
            dataset: dataset.to_string(),
            split: split.to_string(),
            name: name.to_string(),
        })
}
