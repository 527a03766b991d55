//! Scoped change detection against the previous release marker

pub mod diff_detector;

pub use diff_detector::{ChangeDetector, DiffDetector, ROOT_MODULE_PATH};
