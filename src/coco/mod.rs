//! COCO manifest model and I/O.
//!
//! A manifest is the `{info, licenses, images, annotations, categories}`
//! JSON document that sits next to the images of one dataset split.
//!
//! # Example
//!
//! ```
//! use cocomerge::coco::{Annotation, Category, Image, Manifest};
//!
//! let manifest = Manifest {
//!     images: vec![Image::new(1u64, "img1.jpg", 640, 480)],
//!     categories: vec![Category::new(0u64, "car")],
//!     annotations: vec![Annotation::new(1u64, 1u64, 0u64).with_bbox(10.0, 20.0, 90.0, 60.0)],
//!     ..Default::default()
//! };
//! assert_eq!(manifest.annotations[0].bbox(), Some([10.0, 20.0, 90.0, 60.0]));
//! ```

mod ids;
pub mod io;
mod model;

pub use ids::{AnnotationId, CategoryId, ImageId};
pub use model::{Annotation, Category, Image, Manifest};
