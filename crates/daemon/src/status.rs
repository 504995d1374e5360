// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status Sampler (§4.8): an external collaborator contract. No real
//! sampler ships in-tree (out of scope per §1); [`NullStatusSampler`]
//! stands in so the status-report timer has something to call, mirroring
//! the Command Executor's `UnknownKindHandler` stand-in pattern (§4.7).

use async_trait::async_trait;

/// `cpu_pct`/`ram_pct`/`disk_pct`, each `None` when unavailable. Missing
/// values are a sentinel, never a failure — §4.8: "does not prevent the
/// transmission".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatusSample {
    pub cpu_pct: Option<f32>,
    pub ram_pct: Option<f32>,
    pub disk_pct: Option<f32>,
}

#[async_trait]
pub trait StatusSampler: Send + Sync {
    async fn initialize(&self) {}
    async fn sample(&self) -> StatusSample;
}

/// Always reports every field missing. Non-fatal by construction.
pub struct NullStatusSampler;

#[async_trait]
impl StatusSampler for NullStatusSampler {
    async fn sample(&self) -> StatusSample {
        StatusSample::default()
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
