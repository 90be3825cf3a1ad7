//! Annotation usages and resolved annotation metadata

mod metadata;
mod value;

pub use metadata::{AnnotationEntry, AnnotationMetadata, MetadataResolver, StereotypeRef};
pub use value::{AnnotationUse, AnnotationValue};
