// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `warden configure` — the interactive one-shot wizard that establishes
//! (or renews) this host's runtime identity (§6). The wizard itself is
//! the only part of the agent that talks to a human; every other
//! component runs unattended.

use std::io::Write;

use warden_core::identity::AgentId;
use warden_core::{EnrollmentToken, Location, RuntimeIdentity};
use warden_storage::{config, paths, IdentityStore, StorageError, TokenVault};
use warden_transport::HttpTransport;
use warden_wire::{IdentifyRequest, IdentifyResponse, VerifyMfaRequest, VerifyMfaResponse};

use crate::exit_error::{
    ExitError, EXIT_CONFIG_SAVE_FAILED, EXIT_GENERAL_ERROR, EXIT_INSUFFICIENT_PRIVILEGES,
    EXIT_SERVER_CONNECTION_FAILED, EXIT_USER_CANCELLED,
};

pub async fn configure() -> Result<(), ExitError> {
    let static_config = config::load_static(&paths::config_path())
        .map_err(|e| ExitError::new(EXIT_GENERAL_ERROR, format!("failed to load configuration: {e}")))?;

    let identity_store = IdentityStore::new(paths::runtime_identity_path());
    let existing = identity_store
        .load()
        .map_err(|e| ExitError::new(EXIT_GENERAL_ERROR, format!("failed to read existing identity: {e}")))?;

    if existing.is_some() && !confirm("An identity is already configured. Re-configure it?")? {
        println!("Configuration cancelled.");
        return Err(ExitError::new(EXIT_USER_CANCELLED, "configuration cancelled by user"));
    }

    let agent_id = existing.as_ref().map(|i| i.agent_id).unwrap_or_else(AgentId::new);
    let location = prompt_location()?;

    let http = HttpTransport::new(&static_config.server_base_url, agent_id, static_config.http_request_timeout())
        .map_err(|e| ExitError::new(EXIT_SERVER_CONNECTION_FAILED, format!("{e}")))?;

    let plaintext_token = identify(&http, agent_id, location.clone(), existing.is_some()).await?;

    let vault = TokenVault::new()
        .map_err(|e| ExitError::new(EXIT_GENERAL_ERROR, format!("failed to open token vault: {e}")))?;
    let encrypted = vault
        .encrypt(&plaintext_token)
        .map_err(|e| ExitError::new(EXIT_GENERAL_ERROR, format!("failed to encrypt token: {e}")))?;

    let identity = RuntimeIdentity::new(agent_id, location, encrypted);
    save_identity(&identity_store, &identity)?;

    println!("Agent configured: {agent_id}");
    Ok(())
}

async fn identify(
    http: &HttpTransport,
    agent_id: AgentId,
    location: Location,
    force_renew: bool,
) -> Result<String, ExitError> {
    let request = IdentifyRequest { agent_id, location, force_renew };
    let response = http
        .identify(&request)
        .await
        .map_err(|e| ExitError::new(EXIT_SERVER_CONNECTION_FAILED, format!("identify failed: {e}")))?;

    match response {
        IdentifyResponse::Success { token: Some(token) } => Ok(token),
        IdentifyResponse::Success { token: None } => {
            Err(ExitError::new(EXIT_GENERAL_ERROR, "server accepted identify but returned no token"))
        }
        IdentifyResponse::MfaRequired => verify_mfa(http, agent_id).await,
        IdentifyResponse::PositionError { message } => {
            Err(ExitError::new(EXIT_GENERAL_ERROR, format!("position conflict: {message}")))
        }
        IdentifyResponse::Error { message } => Err(ExitError::new(EXIT_GENERAL_ERROR, message)),
    }
}

async fn verify_mfa(http: &HttpTransport, agent_id: AgentId) -> Result<String, ExitError> {
    print!("Enter MFA code: ");
    std::io::stdout().flush().ok();
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .map_err(|e| ExitError::new(EXIT_GENERAL_ERROR, format!("failed to read MFA code: {e}")))?;
    let mfa_code = line.trim().to_string();
    if mfa_code.is_empty() {
        return Err(ExitError::new(EXIT_USER_CANCELLED, "no MFA code entered"));
    }

    let request = VerifyMfaRequest { agent_id, mfa_code };
    let response = http
        .verify_mfa(&request)
        .await
        .map_err(|e| ExitError::new(EXIT_SERVER_CONNECTION_FAILED, format!("verify_mfa failed: {e}")))?;

    match response {
        VerifyMfaResponse::Success { token } => Ok(token),
        VerifyMfaResponse::Error { message } => Err(ExitError::new(EXIT_GENERAL_ERROR, message)),
    }
}

fn save_identity(store: &IdentityStore, identity: &RuntimeIdentity) -> Result<(), ExitError> {
    store.save(identity).map_err(|e| match e {
        StorageError::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::PermissionDenied => {
            ExitError::new(EXIT_INSUFFICIENT_PRIVILEGES, format!("{e}"))
        }
        other => ExitError::new(EXIT_CONFIG_SAVE_FAILED, format!("{other}")),
    })
}

fn prompt_location() -> Result<Location, ExitError> {
    let room = prompt("Room/zone label")?;
    let x: f64 = prompt("X coordinate")?.parse().unwrap_or(0.0);
    let y: f64 = prompt("Y coordinate")?.parse().unwrap_or(0.0);
    Ok(Location::new(room, x, y))
}

fn prompt(label: &str) -> Result<String, ExitError> {
    print!("{label}: ");
    std::io::stdout().flush().ok();
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .map_err(|e| ExitError::new(EXIT_GENERAL_ERROR, format!("failed to read input: {e}")))?;
    Ok(line.trim().to_string())
}

fn confirm(question: &str) -> Result<bool, ExitError> {
    print!("{question} [y/N]: ");
    std::io::stdout().flush().ok();
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .map_err(|e| ExitError::new(EXIT_GENERAL_ERROR, format!("failed to read input: {e}")))?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes" | "Yes"))
}
