//! Versioned classifier artifacts
//!
//! Artifacts live in a model directory as `phishing_model_v{N}.onnx` with a
//! `feature_columns_v{N}.json` schema sidecar, an optional
//! `feature_scaler_v{N}.json` and an optional `.sha256` integrity sidecar.
//! Newer versions are probed first.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use ort::session::{builder::GraphOptimizationLevel, Session};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::logic::model::inference::{Classifier, OnnxModel, StandardScaler};

/// Artifact versions, newest first.
pub const ARTIFACT_VERSIONS: &[u32] = &[2, 1];

/// Lazily-loaded provider of the shared classifier artifact.
pub trait ModelSource: Send + Sync {
    fn classifier(&self) -> Result<Arc<dyn Classifier>>;
}

#[derive(Debug, Clone)]
struct ArtifactPaths {
    version: u32,
    model: PathBuf,
    columns: PathBuf,
    scaler: Option<PathBuf>,
    checksum: Option<PathBuf>,
}

fn locate(dir: &Path) -> Result<ArtifactPaths> {
    for version in ARTIFACT_VERSIONS {
        let model = dir.join(format!("phishing_model_v{version}.onnx"));
        if !model.exists() {
            continue;
        }

        let scaler = dir.join(format!("feature_scaler_v{version}.json"));
        let checksum = dir.join(format!("phishing_model_v{version}.onnx.sha256"));

        return Ok(ArtifactPaths {
            version: *version,
            columns: dir.join(format!("feature_columns_v{version}.json")),
            scaler: scaler.exists().then_some(scaler),
            checksum: checksum.exists().then_some(checksum),
            model,
        });
    }

    Err(Error::ModelUnavailable(format!(
        "no classifier artifact under {}",
        dir.display()
    )))
}

fn verify_checksum(model: &Path, sidecar: &Path) -> Result<()> {
    let expected = fs::read_to_string(sidecar)?
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_lowercase();
    let digest = hex::encode(Sha256::digest(fs::read(model)?));

    if digest != expected {
        return Err(Error::ArtifactIntegrity(format!(
            "checksum mismatch for {}: expected {expected}, got {digest}",
            model.display()
        )));
    }
    Ok(())
}

/// Load the newest artifact set from a model directory.
pub fn load(dir: &Path) -> Result<OnnxModel> {
    let paths = locate(dir)?;

    if let Some(sidecar) = &paths.checksum {
        verify_checksum(&paths.model, sidecar)?;
    }

    let columns_raw = fs::read_to_string(&paths.columns).map_err(|e| {
        Error::ModelUnavailable(format!(
            "feature columns sidecar missing for v{}: {e}",
            paths.version
        ))
    })?;
    let columns: Vec<String> = serde_json::from_str(&columns_raw)?;

    let scaler: Option<StandardScaler> = match &paths.scaler {
        Some(path) => Some(serde_json::from_str(&fs::read_to_string(path)?)?),
        None => None,
    };

    let session = Session::builder()
        .map_err(|e| Error::ModelUnavailable(format!("session builder: {e}")))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| Error::ModelUnavailable(format!("session options: {e}")))?
        .commit_from_file(&paths.model)
        .map_err(|e| Error::ModelUnavailable(format!("model load: {e}")))?;

    tracing::info!(
        version = paths.version,
        path = %paths.model.display(),
        columns = columns.len(),
        scaled = scaler.is_some(),
        "ONNX classifier loaded"
    );

    Ok(OnnxModel::new(session, columns, scaler, paths.version))
}

/// [`ModelSource`] that loads the ONNX artifact once, on first use, and
/// shares it read-only across concurrent scoring calls.
pub struct OnnxSource {
    dir: PathBuf,
    cell: OnceCell<Arc<OnnxModel>>,
}

impl OnnxSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cell: OnceCell::new(),
        }
    }
}

impl ModelSource for OnnxSource {
    fn classifier(&self) -> Result<Arc<dyn Classifier>> {
        let model = self
            .cell
            .get_or_try_init(|| load(&self.dir).map(Arc::new))?;
        let classifier: Arc<dyn Classifier> = model.clone();
        Ok(classifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_locate_empty_dir_is_model_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        match locate(dir.path()) {
            Err(Error::ModelUnavailable(_)) => {}
            other => panic!("expected ModelUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_locate_prefers_newest_version() {
        let dir = tempfile::tempdir().unwrap();
        fs::File::create(dir.path().join("phishing_model_v1.onnx")).unwrap();
        fs::File::create(dir.path().join("phishing_model_v2.onnx")).unwrap();

        let paths = locate(dir.path()).unwrap();
        assert_eq!(paths.version, 2);
    }

    #[test]
    fn test_checksum_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("phishing_model_v1.onnx");
        fs::write(&model, b"model-bytes").unwrap();
        let sidecar = dir.path().join("phishing_model_v1.onnx.sha256");
        fs::write(&sidecar, "deadbeef\n").unwrap();

        match verify_checksum(&model, &sidecar) {
            Err(Error::ArtifactIntegrity(_)) => {}
            other => panic!("expected ArtifactIntegrity, got {other:?}"),
        }
    }

    #[test]
    fn test_checksum_match_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("phishing_model_v1.onnx");
        fs::write(&model, b"model-bytes").unwrap();

        let digest = hex::encode(Sha256::digest(b"model-bytes"));
        let sidecar = dir.path().join("phishing_model_v1.onnx.sha256");
        let mut file = fs::File::create(&sidecar).unwrap();
        writeln!(file, "{digest}  phishing_model_v1.onnx").unwrap();

        verify_checksum(&model, &sidecar).unwrap();
    }

    #[test]
    fn test_load_without_columns_sidecar_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::File::create(dir.path().join("phishing_model_v1.onnx")).unwrap();

        match load(dir.path()) {
            Err(Error::ModelUnavailable(msg)) => {
                assert!(msg.contains("feature columns"), "msg = {msg}");
            }
            other => panic!("expected ModelUnavailable, got {other:?}"),
        }
    }
}
