//! Newtype IDs for the records of a COCO manifest.
//!
//! Merging rewrites all three kinds of IDs, so keeping them apart at the type
//! level stops an image ID from being looked up in the category table.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! manifest_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            #[inline]
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            #[inline]
            pub fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

manifest_id!(
    /// Identifier of an image record, unique within one manifest.
    ImageId
);

manifest_id!(
    /// Identifier of an annotation record, unique within one manifest.
    AnnotationId
);

manifest_id!(
    /// Identifier of a category. Local to its manifest until merged.
    CategoryId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_plain_integers() {
        let json = serde_json::to_string(&ImageId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: CategoryId = serde_json::from_str("3").unwrap();
        assert_eq!(back, CategoryId(3));
    }

    #[test]
    fn debug_names_the_kind() {
        assert_eq!(format!("{:?}", AnnotationId(4)), "AnnotationId(4)");
        assert_eq!(format!("{}", AnnotationId(4)), "4");
    }

    #[test]
    fn ids_order_numerically() {
        assert!(ImageId(2) < ImageId(10));
        assert!(CategoryId(0) < CategoryId(1));
    }
}
