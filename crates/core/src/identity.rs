// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-host runtime identity: the triple persisted by the Config Store and
//! decrypted once at startup by the Token Vault.

use serde::{Deserialize, Serialize};

use crate::location::Location;

crate::define_id! {
    /// Opaque per-host agent identifier, created once by the configuration
    /// wizard and stable across the agent's lifetime.
    pub struct AgentId("agt-");
}

/// The authentication token at rest: never the plaintext, always the blob
/// produced by the Token Vault's `encrypt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentToken {
    /// Base64-encoded AEAD ciphertext, opaque outside the vault.
    pub ciphertext: String,
}

impl EnrollmentToken {
    pub fn new(ciphertext: impl Into<String>) -> Self {
        Self { ciphertext: ciphertext.into() }
    }
}

/// The per-host identity record persisted under `runtime_config/identity`.
///
/// Invariant: the plaintext token is never a field here or anywhere else
/// that gets serialised — only `EnrollmentToken`'s ciphertext form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeIdentity {
    pub agent_id: AgentId,
    pub location: Location,
    pub encrypted_token: EnrollmentToken,
}

impl RuntimeIdentity {
    pub fn new(agent_id: AgentId, location: Location, encrypted_token: EnrollmentToken) -> Self {
        Self { agent_id, location, encrypted_token }
    }

    crate::setters! {
        set {
            location: Location,
            encrypted_token: EnrollmentToken,
        }
    }
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
