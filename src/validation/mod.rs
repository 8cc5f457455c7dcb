//! Manifest validation.
//!
//! Checks a (typically merged) manifest for:
//! - duplicate image, annotation and category IDs
//! - annotations referencing images or categories that are not present
//! - empty or repeated file names and category names
//! - missing image dimensions and malformed boxes

mod report;

pub use report::{IssueCode, IssueContext, Severity, ValidationIssue, ValidationReport};

use std::collections::{HashMap, HashSet};

use crate::coco::{AnnotationId, CategoryId, ImageId, Manifest};

/// Options for validation behavior.
#[derive(Clone, Debug, Default)]
pub struct ValidateOptions {
    /// Warnings fail validation as well.
    pub strict: bool,
}

impl ValidateOptions {
    /// Whether a report should count as a failure under these options.
    pub fn fails(&self, report: &ValidationReport) -> bool {
        report.error_count() > 0 || (self.strict && report.warning_count() > 0)
    }
}

/// Validates a manifest and returns every issue found.
pub fn validate_manifest(manifest: &Manifest, _opts: &ValidateOptions) -> ValidationReport {
    let mut report = ValidationReport::new();

    let image_ids: HashSet<ImageId> = manifest.images.iter().map(|i| i.id).collect();
    let category_ids: HashSet<CategoryId> = manifest.categories.iter().map(|c| c.id).collect();

    validate_images(manifest, &mut report);
    validate_categories(manifest, &mut report);
    validate_annotations(manifest, &image_ids, &category_ids, &mut report);

    report
}

fn validate_images(manifest: &Manifest, report: &mut ValidationReport) {
    let mut seen_ids: HashSet<ImageId> = HashSet::new();
    let mut seen_names: HashMap<&str, ImageId> = HashMap::new();

    for image in &manifest.images {
        let id = image.id.as_u64();

        if !seen_ids.insert(image.id) {
            report.add(ValidationIssue::error(
                IssueCode::DuplicateImageId,
                format!("Duplicate image ID {}", id),
                IssueContext::Image(id),
            ));
        }

        if image.file_name.is_empty() {
            report.add(ValidationIssue::error(
                IssueCode::EmptyFileName,
                "Empty filename",
                IssueContext::Image(id),
            ));
        } else if let Some(first) = seen_names.get(image.file_name.as_str()) {
            report.add(ValidationIssue::error(
                IssueCode::DuplicateFileName,
                format!("File name '{}' is also used by image {}", image.file_name, first),
                IssueContext::Image(id),
            ));
        } else {
            seen_names.insert(&image.file_name, image.id);
        }

        match (image.width(), image.height()) {
            (Some(w), Some(h)) if w > 0.0 && h > 0.0 => {}
            (w, h) => report.add(ValidationIssue::warning(
                IssueCode::InvalidImageDimensions,
                format!("Invalid dimensions {}x{}", dim(w), dim(h)),
                IssueContext::Image(id),
            )),
        }
    }
}

fn dim(value: Option<f64>) -> String {
    value.map_or_else(|| "?".to_string(), |v| v.to_string())
}

fn validate_categories(manifest: &Manifest, report: &mut ValidationReport) {
    let mut seen_ids: HashSet<CategoryId> = HashSet::new();
    let mut seen_names: HashMap<&str, CategoryId> = HashMap::new();

    for category in &manifest.categories {
        let id = category.id.as_u64();

        if !seen_ids.insert(category.id) {
            report.add(ValidationIssue::error(
                IssueCode::DuplicateCategoryId,
                format!("Duplicate category ID {}", id),
                IssueContext::Category(id),
            ));
        }

        if category.name.is_empty() {
            report.add(ValidationIssue::warning(
                IssueCode::EmptyCategoryName,
                "Empty category name",
                IssueContext::Category(id),
            ));
        } else if let Some(first_id) = seen_names.get(category.name.as_str()) {
            // Merged manifests never repeat a name; inputs sometimes do.
            report.add(ValidationIssue::warning(
                IssueCode::DuplicateCategoryName,
                format!(
                    "Duplicate category name '{}' (also used by category {})",
                    category.name, first_id
                ),
                IssueContext::Category(id),
            ));
        } else {
            seen_names.insert(&category.name, category.id);
        }
    }
}

fn validate_annotations(
    manifest: &Manifest,
    image_ids: &HashSet<ImageId>,
    category_ids: &HashSet<CategoryId>,
    report: &mut ValidationReport,
) {
    let mut seen_ids: HashSet<AnnotationId> = HashSet::new();

    for annotation in &manifest.annotations {
        let id = annotation.id.as_u64();

        if !seen_ids.insert(annotation.id) {
            report.add(ValidationIssue::error(
                IssueCode::DuplicateAnnotationId,
                format!("Duplicate annotation ID {}", id),
                IssueContext::Annotation(id),
            ));
        }

        if !image_ids.contains(&annotation.image_id) {
            report.add(ValidationIssue::error(
                IssueCode::MissingImageRef,
                format!("References non-existent image {}", annotation.image_id),
                IssueContext::Annotation(id),
            ));
        }

        if !category_ids.contains(&annotation.category_id) {
            report.add(ValidationIssue::error(
                IssueCode::MissingCategoryRef,
                format!(
                    "References non-existent category {}",
                    annotation.category_id
                ),
                IssueContext::Annotation(id),
            ));
        }

        match annotation.bbox() {
            Some([x, y, w, h])
                if [x, y, w, h].iter().all(|v| v.is_finite()) && w >= 0.0 && h >= 0.0 => {}
            Some(bbox) => report.add(ValidationIssue::warning(
                IssueCode::MalformedBBox,
                format!("Invalid bbox {:?}", bbox),
                IssueContext::Annotation(id),
            )),
            None => report.add(ValidationIssue::warning(
                IssueCode::MalformedBBox,
                "Missing or malformed bbox",
                IssueContext::Annotation(id),
            )),
        }
    }
}
