#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use cocomerge::config::DEFAULT_INPUT_MANIFEST;
use serde_json::{json, Value};

/// Writes a stand-in image file. Content embeds `tag` so copies can be told apart.
pub fn write_image(path: &Path, tag: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
    bytes.extend_from_slice(tag.as_bytes());
    bytes.extend_from_slice(&[0xFF, 0xD9]);
    fs::write(path, bytes).expect("write image file");
}

/// Writes `<root>/<dataset>/<split>/` with the manifest and the listed image files.
pub fn write_split(root: &Path, dataset: &str, split: &str, manifest: &Value, images: &[&str]) -> PathBuf {
    let split_dir = root.join(dataset).join(split);
    fs::create_dir_all(&split_dir).expect("create split dir");
    for name in images {
        write_image(&split_dir.join(name), &format!("{dataset}/{split}/{name}"));
    }
    fs::write(
        split_dir.join(DEFAULT_INPUT_MANIFEST),
        serde_json::to_string_pretty(manifest).expect("serialize manifest"),
    )
    .expect("write manifest");
    root.join(dataset)
}

/// A one-image, one-annotation manifest with a single category.
pub fn single_object_manifest(category: &str, file_name: &str) -> Value {
    json!({
        "info": {"description": "source"},
        "licenses": [],
        "categories": [{"id": 0, "name": category, "supercategory": "vehicles"}],
        "images": [{"id": 0, "file_name": file_name, "width": 640, "height": 480}],
        "annotations": [{
            "id": 0, "image_id": 0, "category_id": 0,
            "bbox": [10, 20, 30, 40], "area": 1200, "segmentation": [], "iscrowd": 0
        }]
    })
}

pub fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).expect("read json")).expect("parse json")
}
