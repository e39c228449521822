//! Scoring core
//!
//! - `domain` - URL splitting and registrable-domain resolution
//! - `features/` - deterministic feature extraction
//! - `rules` - allow/deny override layer
//! - `model/` - classifier artifacts and inference
//! - `calibrate` - probability correction and threshold adjustment
//! - `alerts` - windowed alert evaluation
//! - `pipeline` - orchestration

pub mod alerts;
pub mod calibrate;
pub mod domain;
pub mod features;
pub mod model;
pub mod pipeline;
pub mod rules;
