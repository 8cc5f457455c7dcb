//! Merging several COCO datasets into one.
//!
//! The merge runs in two passes:
//!
//! 1. [`build_category_table`] reads every dataset × split manifest and
//!    assigns each distinct category name a global ID, starting at 0 in
//!    first-seen order. The resulting [`CategoryTable`] is immutable.
//! 2. [`merge_split`] walks the datasets once per split, copies images under
//!    `<dataset folder>_<file name>`, renumbers images and annotations from 1
//!    and rewrites category IDs through the table.
//!
//! Missing manifests and missing image files are skipped and recorded in
//! the caller's [`MergeReport`]. A category reference that cannot be
//! resolved aborts the run.
//!
//! # Example
//!
//! ```no_run
//! use cocomerge::config::MergeConfig;
//! use cocomerge::merge::{merge_datasets, MergeReport};
//!
//! let config = MergeConfig::new(["Buses", "Cars", "Trucks"], "data/vehicle_dataset");
//! let mut report = MergeReport::new();
//! let summary = merge_datasets(&config, &mut report)?;
//! println!("{} categories", summary.categories.len());
//! # Ok::<(), cocomerge::CocomergeError>(())
//! ```

mod categories;
pub mod report;

pub use categories::{
    build_category_table, resolve_category, CategoryResolutionError, CategoryTable,
    CategoryTableBuilder, LocalCategories,
};
pub use report::{MergeIssue, MergeIssueCode, MergeReport, MergeSeverity, SplitSummary};

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::coco::io::{read_manifest, write_manifest};
use crate::coco::{Annotation, AnnotationId, CategoryId, Image, ImageId, Manifest};
use crate::config::{dataset_prefix, MergeConfig};
use crate::error::CocomergeError;

/// Result of a full merge run.
#[derive(Clone, Debug)]
pub struct MergeSummary {
    pub categories: CategoryTable,
    pub splits: Vec<SplitSummary>,
}

/// Records and ID counters for one output split.
///
/// A fresh accumulator is created for every split, so numbering always
/// restarts at 1.
#[derive(Debug)]
pub struct SplitAccumulator {
    next_image_id: u64,
    next_annotation_id: u64,
    images: Vec<Image>,
    annotations: Vec<Annotation>,
}

impl Default for SplitAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl SplitAccumulator {
    pub fn new() -> Self {
        Self {
            next_image_id: 1,
            next_annotation_id: 1,
            images: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// Appends an image under its new file name and returns its new ID.
    pub fn push_image(&mut self, mut image: Image, file_name: String) -> ImageId {
        let id = ImageId::new(self.next_image_id);
        self.next_image_id += 1;
        image.id = id;
        image.file_name = file_name;
        self.images.push(image);
        id
    }

    /// Appends an annotation with remapped references and returns its new ID.
    pub fn push_annotation(
        &mut self,
        mut annotation: Annotation,
        image_id: ImageId,
        category_id: CategoryId,
    ) -> AnnotationId {
        let id = AnnotationId::new(self.next_annotation_id);
        self.next_annotation_id += 1;
        annotation.id = id;
        annotation.image_id = image_id;
        annotation.category_id = category_id;
        self.annotations.push(annotation);
        id
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn annotation_count(&self) -> usize {
        self.annotations.len()
    }

    /// Assembles the output manifest for this split.
    pub fn into_manifest(self, config: &MergeConfig, table: &CategoryTable) -> Manifest {
        Manifest {
            info: Some(Value::Object(config.info.clone())),
            licenses: config.licenses.clone(),
            images: self.images,
            annotations: self.annotations,
            categories: table.categories().to_vec(),
        }
    }
}

/// Runs the whole merge: validates the config, builds the category table,
/// then merges and writes every split.
pub fn merge_datasets(
    config: &MergeConfig,
    report: &mut MergeReport,
) -> Result<MergeSummary, CocomergeError> {
    config.validate()?;
    fs::create_dir_all(&config.output)?;

    let table = build_category_table(config)?;
    tracing::info!(
        categories = table.len(),
        datasets = config.datasets.len(),
        "built global category table"
    );
    report.categories = table.len();

    let mut splits = Vec::with_capacity(config.splits.len());
    for split in &config.splits {
        splits.push(merge_split(config, &table, split, report)?);
    }

    Ok(MergeSummary {
        categories: table,
        splits,
    })
}

/// Merges one split of every dataset and writes its manifest.
pub fn merge_split(
    config: &MergeConfig,
    table: &CategoryTable,
    split: &str,
    report: &mut MergeReport,
) -> Result<SplitSummary, CocomergeError> {
    let out_dir = config.output_split_dir(split);
    fs::create_dir_all(&out_dir)?;

    let mut acc = SplitAccumulator::new();
    for dataset in &config.datasets {
        merge_dataset_split(config, table, dataset, split, &out_dir, &mut acc, report)?;
    }

    let summary = SplitSummary {
        split: split.to_string(),
        images: acc.image_count(),
        annotations: acc.annotation_count(),
        manifest_path: out_dir.join(&config.output_manifest),
    };

    let manifest = acc.into_manifest(config, table);
    write_manifest(&summary.manifest_path, &manifest)?;

    tracing::info!(
        split,
        images = summary.images,
        annotations = summary.annotations,
        path = %summary.manifest_path.display(),
        "saved split"
    );
    report.record_split(summary.clone());
    Ok(summary)
}

/// Folds one dataset's split into the accumulator.
fn merge_dataset_split(
    config: &MergeConfig,
    table: &CategoryTable,
    dataset: &Path,
    split: &str,
    out_dir: &Path,
    acc: &mut SplitAccumulator,
    report: &mut MergeReport,
) -> Result<(), CocomergeError> {
    let label = dataset.display().to_string();
    let manifest_path = config.input_manifest_path(dataset, split);
    if !manifest_path.is_file() {
        report.add(MergeIssue::missing_manifest(&label, split, manifest_path));
        return Ok(());
    }

    let prefix = dataset_prefix(dataset)?;
    let Manifest {
        images,
        annotations,
        categories,
        ..
    } = read_manifest(&manifest_path)?;
    let local = LocalCategories::new(&categories);
    let split_dir = dataset.join(split);

    let mut image_ids: HashMap<ImageId, ImageId> = HashMap::with_capacity(images.len());
    let mut copied = 0usize;
    for image in images {
        let source = split_dir.join(&image.file_name);
        if !source.is_file() {
            report.add(MergeIssue::missing_image(&label, split, source));
            continue;
        }

        let file_name = format!("{}_{}", prefix, image.file_name);
        let destination = out_dir.join(&file_name);
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&source, &destination).map_err(|source_err| CocomergeError::ImageCopy {
            from: source.clone(),
            to: destination.clone(),
            source: source_err,
        })?;

        let old_id = image.id;
        let new_id = acc.push_image(image, file_name);
        image_ids.insert(old_id, new_id);
        copied += 1;
    }

    let mut kept = 0usize;
    let mut orphans = 0usize;
    for annotation in annotations {
        let Some(&image_id) = image_ids.get(&annotation.image_id) else {
            orphans += 1;
            continue;
        };
        let category_id =
            resolve_category(table, &local, annotation.category_id, &label, split)?;
        acc.push_annotation(annotation, image_id, category_id);
        kept += 1;
    }

    if orphans > 0 {
        report.add(MergeIssue::orphans_dropped(&label, split, orphans));
    }

    tracing::debug!(
        dataset = %label,
        split,
        images = copied,
        annotations = kept,
        "merged dataset split"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coco::Category;

    #[test]
    fn accumulator_numbers_from_one() {
        let mut acc = SplitAccumulator::new();
        let a = acc.push_image(Image::new(40u64, "a.jpg", 1, 1), "Cars_a.jpg".into());
        let b = acc.push_image(Image::new(7u64, "b.jpg", 1, 1), "Cars_b.jpg".into());
        assert_eq!((a, b), (ImageId(1), ImageId(2)));

        let ann = acc.push_annotation(Annotation::new(99u64, 7u64, 3u64), b, CategoryId(0));
        assert_eq!(ann, AnnotationId(1));
        assert_eq!(acc.image_count(), 2);
        assert_eq!(acc.annotation_count(), 1);
    }

    #[test]
    fn accumulator_preserves_pass_through_fields() {
        let mut acc = SplitAccumulator::new();
        let mut image = Image::new(5u64, "x.jpg", 640, 480);
        image.other.insert("license".into(), 1.into());
        let image_id = acc.push_image(image, "Vans_x.jpg".into());
        acc.push_annotation(
            Annotation::new(12u64, 5u64, 2u64).with_bbox(1.0, 2.0, 3.0, 4.0),
            image_id,
            CategoryId(4),
        );

        let mut builder = CategoryTableBuilder::new("vehicle");
        builder.observe(&Category::new(0u64, "van"));
        let manifest = acc.into_manifest(&MergeConfig::new(["Vans"], "out"), &builder.finish());

        assert_eq!(manifest.images[0].file_name, "Vans_x.jpg");
        assert_eq!(manifest.images[0].other["width"], 640);
        assert_eq!(manifest.images[0].other["license"], 1);
        let ann = &manifest.annotations[0];
        assert_eq!((ann.id, ann.image_id, ann.category_id), (AnnotationId(1), ImageId(1), CategoryId(4)));
        assert_eq!(ann.bbox(), Some([1.0, 2.0, 3.0, 4.0]));
        assert_eq!(manifest.categories.len(), 1);
        assert_eq!(manifest.licenses.len(), 1);
        assert!(manifest.info.is_some());
    }
}
