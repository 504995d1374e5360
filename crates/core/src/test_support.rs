// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test-only builders shared across crates, gated behind `test-support`.

use serde_json::json;

use crate::command::{CommandId, CommandRequest};
use crate::identity::{AgentId, EnrollmentToken, RuntimeIdentity};
use crate::location::Location;

/// Builds a [`RuntimeIdentity`] with sane test defaults for every field.
pub struct RuntimeIdentityBuilder {
    agent_id: AgentId,
    location: Location,
    encrypted_token: EnrollmentToken,
}

impl Default for RuntimeIdentityBuilder {
    fn default() -> Self {
        Self {
            agent_id: AgentId::new(),
            location: Location::default(),
            encrypted_token: EnrollmentToken::new("test-ciphertext"),
        }
    }
}

impl RuntimeIdentityBuilder {
    crate::setters! {
        set {
            agent_id: AgentId,
            location: Location,
            encrypted_token: EnrollmentToken,
        }
    }

    pub fn build(self) -> RuntimeIdentity {
        RuntimeIdentity::new(self.agent_id, self.location, self.encrypted_token)
    }
}

impl RuntimeIdentity {
    pub fn builder() -> RuntimeIdentityBuilder {
        RuntimeIdentityBuilder::default()
    }
}

crate::builder! {
    pub struct CommandRequestBuilder => CommandRequest {
        computed { command_id: CommandId = CommandId::new() }
        into { kind: String = "console_exec" }
        computed { payload: serde_json::Value = json!({}) }
        computed { parameters: serde_json::Value = json!({}) }
    }
}
