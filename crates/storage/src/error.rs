// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to load configuration: {0}")]
    ConfigLoad(String),

    #[error("configuration validation failed: {0}")]
    ConfigValidation(String),

    #[error("token decryption failed: {0}")]
    TokenDecryption(String),

    #[error("offline queue error: {0}")]
    OfflineQueue(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<StorageError> for warden_core::AgentError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ConfigLoad(msg) => warden_core::AgentError::ConfigLoadFailed(msg),
            StorageError::ConfigValidation(msg) => {
                warden_core::AgentError::ConfigValidationFailed(msg)
            }
            StorageError::TokenDecryption(msg) => {
                warden_core::AgentError::TokenDecryptionFailed(msg)
            }
            StorageError::OfflineQueue(msg) => warden_core::AgentError::OfflineQueueError(msg),
            StorageError::Io(e) => warden_core::AgentError::OfflineQueueError(e.to_string()),
            StorageError::Json(e) => warden_core::AgentError::OfflineQueueError(e.to_string()),
        }
    }
}
