//! Classifier adapter - model artifacts and inference
//!
//! The classifier is consumed as an opaque scoring function behind the
//! [`Classifier`] trait; artifacts load lazily through a [`ModelSource`].

pub mod artifact;
pub mod inference;

pub use artifact::{ModelSource, OnnxSource};
pub use inference::{score, Classifier, OnnxModel, StandardScaler};
