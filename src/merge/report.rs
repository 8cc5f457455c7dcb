//! Merge report: what was written and what was skipped.
//!
//! The report is handed to the merge routine by the caller and collects
//! every skip decision as a structured [`MergeIssue`], so tests and the CLI
//! can inspect exactly which manifests and images were left out.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Everything a merge run produced besides the files themselves.
#[derive(Clone, Debug, Default, Serialize)]
pub struct MergeReport {
    /// Size of the global category table.
    pub categories: usize,
    /// One entry per written split, in processing order.
    pub splits: Vec<SplitSummary>,
    /// Skip notices, in the order they happened.
    pub issues: Vec<MergeIssue>,
}

impl MergeReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an issue and mirrors it to the log.
    pub fn add(&mut self, issue: MergeIssue) {
        match issue.severity {
            MergeSeverity::Warning => tracing::warn!(
                code = ?issue.code,
                dataset = %issue.dataset,
                split = %issue.split,
                "{}",
                issue.message
            ),
            MergeSeverity::Info => tracing::info!(
                code = ?issue.code,
                dataset = %issue.dataset,
                split = %issue.split,
                "{}",
                issue.message
            ),
        }
        self.issues.push(issue);
    }

    pub fn record_split(&mut self, summary: SplitSummary) {
        self.splits.push(summary);
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == MergeSeverity::Warning)
            .count()
    }

    pub fn info_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == MergeSeverity::Info)
            .count()
    }

    /// Issues with the given code.
    pub fn issues_with_code(&self, code: MergeIssueCode) -> impl Iterator<Item = &MergeIssue> {
        self.issues.iter().filter(move |i| i.code == code)
    }

    pub fn total_images(&self) -> usize {
        self.splits.iter().map(|s| s.images).sum()
    }

    pub fn total_annotations(&self) -> usize {
        self.splits.iter().map(|s| s.annotations).sum()
    }
}

impl fmt::Display for MergeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Merged {} categories", self.categories)?;
        for split in &self.splits {
            writeln!(
                f,
                "  {}: {} images, {} annotations -> {}",
                split.split,
                split.images,
                split.annotations,
                split.manifest_path.display()
            )?;
        }

        let warnings = self.warning_count();
        if warnings > 0 {
            writeln!(f)?;
            writeln!(f, "Warnings ({}):", warnings)?;
            for issue in self
                .issues
                .iter()
                .filter(|i| i.severity == MergeSeverity::Warning)
            {
                writeln!(f, "  - {}", issue)?;
            }
        }

        let infos = self.info_count();
        if infos > 0 {
            writeln!(f)?;
            writeln!(f, "Notes ({}):", infos)?;
            for issue in self
                .issues
                .iter()
                .filter(|i| i.severity == MergeSeverity::Info)
            {
                writeln!(f, "  - {}", issue)?;
            }
        }

        Ok(())
    }
}

/// Counts for one written split.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SplitSummary {
    pub split: String,
    pub images: usize,
    pub annotations: usize,
    pub manifest_path: PathBuf,
}

/// A single skip notice.
#[derive(Clone, Debug, Serialize)]
pub struct MergeIssue {
    pub severity: MergeSeverity,
    pub code: MergeIssueCode,
    pub message: String,
    pub dataset: String,
    pub split: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl MergeIssue {
    /// The dataset has no manifest for this split.
    pub fn missing_manifest(dataset: impl Into<String>, split: impl Into<String>, path: PathBuf) -> Self {
        Self {
            severity: MergeSeverity::Info,
            code: MergeIssueCode::MissingManifest,
            message: format!("skipping: {} not found", path.display()),
            dataset: dataset.into(),
            split: split.into(),
            path: Some(path),
        }
    }

    /// An image listed in the manifest is not on disk.
    pub fn missing_image(dataset: impl Into<String>, split: impl Into<String>, path: PathBuf) -> Self {
        Self {
            severity: MergeSeverity::Warning,
            code: MergeIssueCode::MissingImageFile,
            message: format!(
                "missing image file {} (skipping the image and its annotations)",
                path.display()
            ),
            dataset: dataset.into(),
            split: split.into(),
            path: Some(path),
        }
    }

    /// Annotations dropped because their image was skipped.
    pub fn orphans_dropped(dataset: impl Into<String>, split: impl Into<String>, count: usize) -> Self {
        Self {
            severity: MergeSeverity::Info,
            code: MergeIssueCode::OrphanAnnotationsDropped,
            message: format!("dropped {count} annotation(s) whose image was skipped"),
            dataset: dataset.into(),
            split: split.into(),
            path: None,
        }
    }
}

impl fmt::Display for MergeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}/{}] {}", self.dataset, self.split, self.message)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeSeverity {
    /// Data listed in an input manifest did not make it into the output.
    Warning,
    /// Expected gaps, such as a dataset without a test split.
    Info,
}

/// Stable issue codes. They appear in the JSON report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeIssueCode {
    MissingManifest,
    MissingImageFile,
    OrphanAnnotationsDropped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_severity() {
        let mut report = MergeReport::new();
        report.add(MergeIssue::missing_manifest("Cars", "test", PathBuf::from("Cars/test/x.json")));
        report.add(MergeIssue::missing_image("Cars", "train", PathBuf::from("Cars/train/a.jpg")));
        report.add(MergeIssue::orphans_dropped("Cars", "train", 2));

        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.info_count(), 2);
        assert_eq!(report.issues_with_code(MergeIssueCode::MissingImageFile).count(), 1);
    }

    #[test]
    fn display_lists_splits_and_issues() {
        let mut report = MergeReport::new();
        report.categories = 2;
        report.record_split(SplitSummary {
            split: "train".into(),
            images: 3,
            annotations: 5,
            manifest_path: PathBuf::from("out/train/_annotations.coco.json"),
        });
        report.add(MergeIssue::missing_image("Vans", "train", PathBuf::from("Vans/train/b.jpg")));

        let text = report.to_string();
        assert!(text.contains("Merged 2 categories"));
        assert!(text.contains("train: 3 images, 5 annotations"));
        assert!(text.contains("Warnings (1):"));
        assert!(text.contains("[Vans/train] missing image file"));
        assert_eq!(report.total_images(), 3);
        assert_eq!(report.total_annotations(), 5);
    }

    #[test]
    fn serializes_codes_in_snake_case() {
        let mut report = MergeReport::new();
        report.add(MergeIssue::orphans_dropped("Buses", "valid", 1));

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"code\":\"orphan_annotations_dropped\""));
        assert!(json.contains("\"severity\":\"info\""));
        assert!(!json.contains("\"path\""));
    }
}
