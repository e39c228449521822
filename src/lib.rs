//! PhishGuard - URL risk scoring and operational alerting engine
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                      SCORING PIPELINE                     │
//! ├───────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌───────────┐   ┌───────────────────────┐ │
//! │  │  Rule    │   │  Feature  │   │  Classifier (ONNX)    │ │
//! │  │  Engine  │──▶│  Extract  │──▶│  + Calibration        │ │
//! │  └────┬─────┘   └───────────┘   └──────────┬────────────┘ │
//! │       │ forced verdict                     │              │
//! │       └──────────────┬─────────────────────┘              │
//! │                      ▼                                    │
//! │               ┌─────────────┐      ┌──────────────────┐   │
//! │               │  ScanStore  │─────▶│  Alert Evaluator │   │
//! │               └─────────────┘      └──────────────────┘   │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! The pipeline is stateless per call except for the lazily-loaded,
//! read-only classifier artifact. Rules, alert rules and settings are
//! fetched fresh from the store on every call.

pub mod config;
pub mod db;
pub mod error;
pub mod logic;
pub mod models;
pub mod store;

pub use config::Config;
pub use error::{Error, Result, StoreError};
pub use logic::pipeline::{ScanOutcome, ScanReport, ScanRequest, ScanService};
