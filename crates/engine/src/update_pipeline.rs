// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Update Pipeline (§4.9): download, verify, extract, and hand off to the
//! out-of-process updater. Downloads via [`warden_transport::HttpTransport`],
//! verifies with `sha2`, extracts with `zip`, and launches the updater via
//! a plain `std::process::Command::spawn`.

use std::io::Read;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::mpsc;

use warden_core::update::UpdateFailureReason;
use warden_core::{UpdateDescriptor, UpdateOutcome, UpdateParameters};
use warden_transport::HttpTransport;

#[derive(Debug, Error)]
pub enum UpdatePipelineError {
    #[error("update download failed: {0}")]
    DownloadFailed(String),

    #[error("update checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("update extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("failed to launch updater: {0}")]
    LaunchFailed(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<UpdatePipelineError> for warden_core::AgentError {
    fn from(err: UpdatePipelineError) -> Self {
        match err {
            UpdatePipelineError::DownloadFailed(msg) => {
                warden_core::AgentError::UpdateDownloadFailed(msg)
            }
            UpdatePipelineError::ChecksumMismatch { expected, actual } => {
                warden_core::AgentError::UpdateChecksumMismatch { expected, actual }
            }
            UpdatePipelineError::ExtractionFailed(msg) => {
                warden_core::AgentError::UpdateExtractionFailed(msg)
            }
            UpdatePipelineError::LaunchFailed(msg) => {
                warden_core::AgentError::UpdateServiceStartFailed(msg)
            }
            UpdatePipelineError::Io(e) => warden_core::AgentError::UpdateExtractionFailed(e.to_string()),
        }
    }
}

/// Everything the pipeline needs that isn't carried by the descriptor
/// itself (§4.9 step 6's updater parameters, minus the ones derived from
/// the downloaded package).
pub struct PipelineParams {
    pub current_pid: u32,
    pub current_install_dir: PathBuf,
    pub current_agent_version: String,
}

pub struct UpdatePipeline {
    http: std::sync::Arc<HttpTransport>,
}

impl UpdatePipeline {
    pub fn new(http: std::sync::Arc<HttpTransport>) -> Self {
        Self { http }
    }

    /// Runs the full sequence from §4.9. Emits every `UpdateOutcome` onto
    /// `events_tx` as it happens; the caller forwards them as
    /// `update_status` wire events. `Ok(())` means the updater was
    /// launched and the orchestrator should begin graceful shutdown;
    /// `Err` means the pipeline already reported failure and the
    /// orchestrator should remain `CONNECTED`.
    pub async fn run(
        &self,
        descriptor: &UpdateDescriptor,
        params: PipelineParams,
        events_tx: &mpsc::Sender<UpdateOutcome>,
    ) -> Result<(), UpdatePipelineError> {
        let _ = events_tx.send(UpdateOutcome::Started).await;

        let download_path =
            warden_storage::paths::download_staging_dir().join(format!("{}.zip", descriptor.version));
        if let Err(e) =
            self.http.download_update_package(&descriptor.download_url, &download_path).await
        {
            let _ = events_tx
                .send(UpdateOutcome::Failed { reason: UpdateFailureReason::DownloadFailed })
                .await;
            return Err(UpdatePipelineError::DownloadFailed(e.to_string()));
        }
        let _ = events_tx.send(UpdateOutcome::Downloaded).await;

        let actual = match sha256_file(&download_path) {
            Ok(digest) => digest,
            Err(e) => {
                let _ = events_tx
                    .send(UpdateOutcome::Failed { reason: UpdateFailureReason::ChecksumMismatch })
                    .await;
                return Err(e.into());
            }
        };
        if !actual.eq_ignore_ascii_case(&descriptor.sha256) {
            let _ = std::fs::remove_file(&download_path);
            let _ = events_tx
                .send(UpdateOutcome::Failed { reason: UpdateFailureReason::ChecksumMismatch })
                .await;
            return Err(UpdatePipelineError::ChecksumMismatch {
                expected: descriptor.sha256.clone(),
                actual,
            });
        }

        let extract_dir = warden_storage::paths::extracted_dir(&descriptor.version);
        if let Err(e) = extract_zip(&download_path, &extract_dir) {
            let _ = events_tx
                .send(UpdateOutcome::Failed { reason: UpdateFailureReason::ExtractionFailed })
                .await;
            return Err(UpdatePipelineError::ExtractionFailed(e.to_string()));
        }

        let updater_binary = select_updater_binary(&extract_dir, &params.current_install_dir);
        let update_params = UpdateParameters {
            old_pid: params.current_pid,
            new_agent_path: extract_dir,
            current_install_dir: params.current_install_dir,
            updater_log_dir: warden_storage::paths::logs_dir(),
            current_agent_version: params.current_agent_version,
        };

        if let Err(e) = launch_updater(&updater_binary, &update_params) {
            let _ = events_tx
                .send(UpdateOutcome::Failed { reason: UpdateFailureReason::ServiceStartFailed })
                .await;
            return Err(UpdatePipelineError::LaunchFailed(e.to_string()));
        }

        let _ = events_tx.send(UpdateOutcome::UpdaterLaunched).await;
        Ok(())
    }
}

fn sha256_file(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let read = file.read(&mut buf)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(hex_encode(&hasher.finalize()))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn extract_zip(archive_path: &Path, dest_dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dest_dir)?;
    let file = std::fs::File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        let Some(relative) = entry.enclosed_name() else { continue };
        let out_path = dest_dir.join(relative);
        if entry.is_dir() {
            std::fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out_file = std::fs::File::create(&out_path)?;
        std::io::copy(&mut entry, &mut out_file)?;
    }
    Ok(())
}

/// Prefers the updater binary shipped inside the new package over the one
/// already installed (§4.9 step 5).
fn select_updater_binary(extract_dir: &Path, current_install_dir: &Path) -> PathBuf {
    let shipped = extract_dir.join("warden-updater");
    if shipped.exists() {
        shipped
    } else {
        current_install_dir.join("warden-updater")
    }
}

fn launch_updater(binary: &Path, params: &UpdateParameters) -> std::io::Result<()> {
    std::process::Command::new(binary)
        .arg("--old-pid")
        .arg(params.old_pid.to_string())
        .arg("--new-agent-path")
        .arg(&params.new_agent_path)
        .arg("--current-install-dir")
        .arg(&params.current_install_dir)
        .arg("--updater-log-dir")
        .arg(&params.updater_log_dir)
        .arg("--current-agent-version")
        .arg(&params.current_agent_version)
        .spawn()?;
    Ok(())
}

#[cfg(test)]
#[path = "update_pipeline_tests.rs"]
mod tests;
