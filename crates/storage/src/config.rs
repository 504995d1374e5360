// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Static settings (§4.2) loaded from a layered TOML document with an
//! environment-variable overlay, mirroring the daemon's resolution order
//! for its own state directory.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Resolves filesystem locations shared by every component: an explicit
/// override env var beats `XDG_STATE_HOME`, which beats the POSIX default
/// under the user's home.
pub mod paths {
    use std::path::PathBuf;

    pub fn state_dir() -> PathBuf {
        if let Ok(explicit) = std::env::var("WARDEN_STATE_DIR") {
            return PathBuf::from(explicit);
        }
        if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
            return PathBuf::from(xdg).join("warden");
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/"))
            .join(".local/state/warden")
    }

    pub fn config_path() -> PathBuf {
        std::env::var("WARDEN_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/etc/warden/config.toml"))
    }

    pub fn runtime_identity_path() -> PathBuf {
        state_dir().join("runtime_config").join("identity")
    }

    pub fn logs_dir() -> PathBuf {
        state_dir().join("logs")
    }

    pub fn download_staging_dir() -> PathBuf {
        state_dir().join("updates").join("download")
    }

    pub fn extracted_dir(version: &str) -> PathBuf {
        state_dir().join("updates").join("extracted").join(version)
    }

    pub fn backup_dir(previous_version: &str) -> PathBuf {
        state_dir().join("updates").join("backup").join(previous_version)
    }

    pub fn error_reports_dir() -> PathBuf {
        state_dir().join("error_reports")
    }

    pub fn offline_queue_dir() -> PathBuf {
        state_dir().join("offline_queue")
    }

    pub fn pid_file() -> PathBuf {
        state_dir().join("wardend.pid")
    }

    pub fn control_socket() -> PathBuf {
        state_dir().join("wardend.sock")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfflineQueueSettings {
    pub max_size_bytes: u64,
    pub max_age_hours: u64,
    pub max_status_reports: usize,
    pub max_command_results: usize,
    pub max_error_reports: usize,
}

/// The `CMSAgentSettings` document (§6) driving every tunable named in §4.2.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticConfig {
    pub server_base_url: String,
    pub status_report_interval_secs: u64,
    pub auto_update_enabled: bool,
    pub auto_update_interval_secs: u64,
    pub network_retry_max_attempts: u32,
    pub network_retry_initial_delay_secs: u64,
    pub token_refresh_interval_secs: u64,
    pub http_request_timeout_secs: u64,
    pub ws_reconnect_delay_initial_secs: u64,
    pub ws_reconnect_delay_max_secs: u64,
    pub ws_reconnect_max_attempts: Option<u32>,
    pub command_default_timeout_secs: u64,
    pub command_max_parallel: usize,
    pub command_queue_max_size: usize,
    pub resource_limit_cpu_pct: f32,
    pub resource_limit_ram_mb: u64,
    pub offline_queue: OfflineQueueSettings,
}

impl StaticConfig {
    pub fn status_report_interval(&self) -> Duration {
        Duration::from_secs(self.status_report_interval_secs)
    }

    pub fn http_request_timeout(&self) -> Duration {
        Duration::from_secs(self.http_request_timeout_secs)
    }

    pub fn command_default_timeout(&self) -> Duration {
        Duration::from_secs(self.command_default_timeout_secs)
    }

    pub fn network_retry_initial_delay(&self) -> Duration {
        Duration::from_secs(self.network_retry_initial_delay_secs)
    }

    fn validate(&self) -> Result<(), StorageError> {
        if !self.server_base_url.starts_with("https://") && !self.server_base_url.starts_with("wss://")
        {
            return Err(StorageError::ConfigValidation(
                "server_base_url must use a secure scheme (https/wss)".into(),
            ));
        }
        if self.command_max_parallel == 0 {
            return Err(StorageError::ConfigValidation(
                "command_max_parallel must be >= 1".into(),
            ));
        }
        if self.command_queue_max_size == 0 {
            return Err(StorageError::ConfigValidation(
                "command_queue_max_size must be >= 1".into(),
            ));
        }
        if self.network_retry_max_attempts == 0 {
            return Err(StorageError::ConfigValidation(
                "network_retry_max_attempts must be >= 1".into(),
            ));
        }
        if !(0.0..=100.0).contains(&self.resource_limit_cpu_pct) {
            return Err(StorageError::ConfigValidation(
                "resource_limit_cpu_pct must be within 0..=100".into(),
            ));
        }
        Ok(())
    }
}

/// Loads the static settings document, applying `WARDEN_SERVER_BASE_URL`
/// and other `WARDEN_*` overlay env vars before validating.
pub fn load_static(path: &std::path::Path) -> Result<StaticConfig, StorageError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| StorageError::ConfigLoad(format!("{}: {e}", path.display())))?;
    let mut config: StaticConfig =
        toml::from_str(&raw).map_err(|e| StorageError::ConfigLoad(e.to_string()))?;

    if let Ok(url) = std::env::var("WARDEN_SERVER_BASE_URL") {
        config.server_base_url = url;
    }

    config.validate()?;
    Ok(config)
}

#[cfg(any(test, feature = "test-support"))]
impl StaticConfig {
    pub fn test_default() -> Self {
        Self {
            server_base_url: "https://control.example.test".into(),
            status_report_interval_secs: 30,
            auto_update_enabled: true,
            auto_update_interval_secs: 600,
            network_retry_max_attempts: 5,
            network_retry_initial_delay_secs: 1,
            token_refresh_interval_secs: 3600,
            http_request_timeout_secs: 10,
            ws_reconnect_delay_initial_secs: 1,
            ws_reconnect_delay_max_secs: 60,
            ws_reconnect_max_attempts: None,
            command_default_timeout_secs: 30,
            command_max_parallel: 4,
            command_queue_max_size: 100,
            resource_limit_cpu_pct: 80.0,
            resource_limit_ram_mb: 512,
            offline_queue: OfflineQueueSettings {
                max_size_bytes: 50 * 1024 * 1024,
                max_age_hours: 72,
                max_status_reports: 500,
                max_command_results: 500,
                max_error_reports: 200,
            },
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
