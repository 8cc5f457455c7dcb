//! COCO manifest records.
//!
//! Only the fields the merge rewrites or reads are typed. The `info` block,
//! the license list and everything else on an image or annotation are kept
//! as raw JSON and written back out untouched, so bounding boxes, areas,
//! segmentation and exporter-specific keys survive a merge at the value
//! level whatever their types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ids::{AnnotationId, CategoryId, ImageId};

/// One COCO annotation manifest (`_annotations.coco.json`).
///
/// Missing top-level lists are treated as empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Value>,

    #[serde(default)]
    pub licenses: Vec<Value>,

    #[serde(default)]
    pub images: Vec<Image>,

    #[serde(default)]
    pub annotations: Vec<Annotation>,

    #[serde(default)]
    pub categories: Vec<Category>,
}

/// An image record. The file lives next to the manifest under `file_name`.
///
/// `width` and `height` stay in `other`: exporters write them as integers,
/// floats or `null`, and all of those are copied through as given.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: ImageId,

    pub file_name: String,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Image {
    pub fn new(id: impl Into<ImageId>, file_name: impl Into<String>, width: u32, height: u32) -> Self {
        let mut other = Map::new();
        other.insert("width".to_string(), Value::from(width));
        other.insert("height".to_string(), Value::from(height));
        Self {
            id: id.into(),
            file_name: file_name.into(),
            other,
        }
    }

    /// The `width` field, if it is a number.
    pub fn width(&self) -> Option<f64> {
        self.other.get("width")?.as_f64()
    }

    /// The `height` field, if it is a number.
    pub fn height(&self) -> Option<f64> {
        self.other.get("height")?.as_f64()
    }
}

/// A category entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supercategory: Option<String>,
}

impl Category {
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            supercategory: None,
        }
    }

    pub fn with_supercategory(mut self, supercategory: impl Into<String>) -> Self {
        self.supercategory = Some(supercategory.into());
        self
    }
}

/// An annotation record. `bbox`, `area`, `segmentation`, `iscrowd` and any
/// other keys are carried in `other`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,

    pub image_id: ImageId,

    pub category_id: CategoryId,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Annotation {
    pub fn new(
        id: impl Into<AnnotationId>,
        image_id: impl Into<ImageId>,
        category_id: impl Into<CategoryId>,
    ) -> Self {
        Self {
            id: id.into(),
            image_id: image_id.into(),
            category_id: category_id.into(),
            other: Map::new(),
        }
    }

    /// Sets the COCO `[x, y, width, height]` box and its area.
    pub fn with_bbox(mut self, x: f64, y: f64, w: f64, h: f64) -> Self {
        self.other
            .insert("bbox".to_string(), serde_json::json!([x, y, w, h]));
        self.other
            .insert("area".to_string(), serde_json::json!(w * h));
        self
    }

    /// Reads the `bbox` field back as `[x, y, width, height]`, if it is
    /// a list of four numbers.
    pub fn bbox(&self) -> Option<[f64; 4]> {
        let values = self.other.get("bbox")?.as_array()?;
        if values.len() != 4 {
            return None;
        }
        let mut out = [0.0; 4];
        for (slot, value) in out.iter_mut().zip(values) {
            *slot = value.as_f64()?;
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_image_fields_pass_through() {
        let json = r#"{"id": 3, "file_name": "a.jpg", "width": 10, "height": 20,
                       "license": 1, "date_captured": "2024-01-01"}"#;
        let image: Image = serde_json::from_str(json).unwrap();
        assert_eq!(image.id, ImageId(3));
        assert_eq!(image.width(), Some(10.0));
        assert_eq!(image.other.get("license"), Some(&Value::from(1)));

        let back = serde_json::to_value(&image).unwrap();
        assert_eq!(back["date_captured"], "2024-01-01");
        assert_eq!(back["height"], 20);
    }

    #[test]
    fn image_dimensions_keep_their_json_shape() {
        let json = r#"{"id": 1, "file_name": "a.jpg", "width": 640.0, "height": null}"#;
        let image: Image = serde_json::from_str(json).unwrap();
        assert_eq!(image.width(), Some(640.0));
        assert_eq!(image.height(), None);

        let back = serde_json::to_value(&image).unwrap();
        assert_eq!(back["width"], serde_json::json!(640.0));
        assert!(back.as_object().unwrap().contains_key("height"));
        assert!(back["height"].is_null());
    }

    #[test]
    fn annotation_bbox_is_read_from_other_fields() {
        let ann = Annotation::new(1u64, 2u64, 0u64).with_bbox(1.0, 2.0, 3.0, 4.0);
        assert_eq!(ann.bbox(), Some([1.0, 2.0, 3.0, 4.0]));
        assert_eq!(ann.other["area"], 12.0);

        let mut broken = ann.clone();
        broken.other.insert("bbox".into(), serde_json::json!([1, 2]));
        assert_eq!(broken.bbox(), None);
    }

    #[test]
    fn info_and_licenses_are_not_interpreted() {
        let json = r#"{"info": {"version": 1.0, "year": "2023"},
                       "licenses": [{"name": "CC BY 4.0"}, {"id": "x"}]}"#;
        let manifest: Manifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.info.as_ref().unwrap()["version"], 1.0);
        assert_eq!(manifest.licenses.len(), 2);
        assert_eq!(manifest.licenses[1]["id"], "x");
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let manifest: Manifest = serde_json::from_str("{}").unwrap();
        assert!(manifest.images.is_empty());
        assert!(manifest.annotations.is_empty());
        assert!(manifest.categories.is_empty());
        assert!(manifest.info.is_none());
    }
}
