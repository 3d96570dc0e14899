//! Per-type deployment artifacts

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use nft_deploy_types::{DeploymentArtifact, InstanceRecord, NetworkIdentity};
use tracing::info;

use crate::ArtifactError;

/// Writes `{output_dir}/{type_name}.json`
///
/// The output directory is created when missing and never cleared. Each file
/// is written to a temporary sibling and renamed into place, so readers see
/// either the previous artifact or the complete new one.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn artifact_path(&self, type_name: &str) -> PathBuf {
        self.output_dir.join(format!("{type_name}.json"))
    }

    pub fn write(
        &self,
        type_name: &str,
        interface_metadata: serde_json::Value,
        records: &[InstanceRecord],
        network: Option<NetworkIdentity>,
    ) -> Result<PathBuf, ArtifactError> {
        let artifact =
            DeploymentArtifact::from_records(type_name, interface_metadata, records, network, Utc::now());
        self.write_artifact(&artifact)
    }

    pub fn write_artifact(&self, artifact: &DeploymentArtifact) -> Result<PathBuf, ArtifactError> {
        let json = serde_json::to_string_pretty(artifact)?;

        fs::create_dir_all(&self.output_dir).map_err(|e| io_error(&self.output_dir, e))?;

        let path = self.artifact_path(&artifact.type_name);
        let tmp = self
            .output_dir
            .join(format!(".{}.json.tmp", artifact.type_name));

        fs::write(&tmp, json.as_bytes()).map_err(|e| io_error(&tmp, e))?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(io_error(&path, e));
        }

        info!(
            path = %path.display(),
            instances = artifact.instances.len(),
            failed = artifact.failed_instances.len(),
            "Artifact written"
        );
        Ok(path)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> ArtifactError {
    ArtifactError::Io {
        path: path.display().to_string(),
        source,
    }
}
