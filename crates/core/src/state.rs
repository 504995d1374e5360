// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrator state machine values and the transition log used to test
//! the "transitions are observable in order" invariant.

use std::collections::VecDeque;
use std::time::Instant;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// The orchestrator's current state. Owned exclusively by the orchestrator;
/// every other component only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentState {
    Initializing,
    Authenticating,
    Connected,
    Disconnected,
    Reconnecting,
    Offline,
    Updating,
    ConfigurationError,
    Stopping,
}

crate::simple_display! {
    AgentState {
        Initializing => "INITIALIZING",
        Authenticating => "AUTHENTICATING",
        Connected => "CONNECTED",
        Disconnected => "DISCONNECTED",
        Reconnecting => "RECONNECTING",
        Offline => "OFFLINE",
        Updating => "UPDATING",
        ConfigurationError => "CONFIGURATION_ERROR",
        Stopping => "STOPPING",
    }
}

impl AgentState {
    /// `CONFIGURATION_ERROR` and `STOPPING` have no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::ConfigurationError | Self::Stopping)
    }
}

/// A single recorded transition, with the instant it happened.
#[derive(Debug, Clone, Copy)]
pub struct StateTransition {
    pub from: AgentState,
    pub to: AgentState,
    pub at: Instant,
}

const TRANSITION_LOG_CAPACITY: usize = 64;

/// Bounded ring buffer of recent transitions, for the `debug` CLI surface
/// and for asserting ordering in tests.
pub struct TransitionLog {
    entries: Mutex<VecDeque<StateTransition>>,
}

impl TransitionLog {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(TRANSITION_LOG_CAPACITY)),
        }
    }

    pub fn record(&self, from: AgentState, to: AgentState, at: Instant) {
        let mut entries = self.entries.lock();
        if entries.len() == TRANSITION_LOG_CAPACITY {
            entries.pop_front();
        }
        entries.push_back(StateTransition { from, to, at });
    }

    /// Snapshot of recorded transitions, oldest first.
    pub fn snapshot(&self) -> Vec<StateTransition> {
        self.entries.lock().iter().copied().collect()
    }
}

impl Default for TransitionLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
