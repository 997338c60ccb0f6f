// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Run verification over every deployment in a manifest.

use std::sync::Arc;

use futures::{stream, StreamExt};
use tokio::sync::watch;
use typed_builder::TypedBuilder;

use crate::core::{
    artifact::BuildArtifact,
    client::VerificationService,
    config::VerifyConfig,
    manifest::DeploymentRecord,
    report::{VerificationOutcome, VerificationReport},
    source::ResolveSource,
    verification::ContractVerifier,
};

/// Create a linked cancellation handle and signal.
pub fn cancellation() -> (CancelHandle, Cancellation) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle(Arc::new(tx)), Cancellation(rx))
}

/// Triggers cancellation of a run.
#[derive(Clone, Debug)]
pub struct CancelHandle(Arc<watch::Sender<bool>>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

/// Run-scoped cancellation signal.
#[derive(Clone, Debug)]
pub struct Cancellation(watch::Receiver<bool>);

impl Cancellation {
    /// A signal that never fires.
    pub fn never() -> Self {
        let (_, rx) = watch::channel(false);
        Self(rx)
    }

    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once cancelled; never resolves if the handle is gone without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.0.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Verifies a list of deployments, at most `config.concurrency` at a time.
#[derive(TypedBuilder)]
pub struct Orchestrator<S, R, B> {
    service: S,
    resolver: R,
    artifacts: B,
    #[builder(default)]
    config: VerifyConfig,
}

impl<S, R, B> Orchestrator<S, R, B>
where
    S: VerificationService,
    R: ResolveSource,
    B: BuildArtifact,
{
    pub fn config(&self) -> &VerifyConfig {
        &self.config
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Verify every record. Outcomes are reported in the order of `records`.
    pub async fn run(
        &self,
        chain_id: u64,
        records: &[DeploymentRecord],
        cancel: &Cancellation,
    ) -> VerificationReport {
        let total = records.len();
        let outcomes = stream::iter(records.iter().enumerate())
            .map(|(index, record)| self.verify_one(chain_id, index + 1, total, record, cancel))
            .buffered(self.config.workers())
            .collect::<Vec<_>>()
            .await;
        VerificationReport::new(chain_id, outcomes)
    }

    async fn verify_one(
        &self,
        chain_id: u64,
        position: usize,
        total: usize,
        record: &DeploymentRecord,
        cancel: &Cancellation,
    ) -> VerificationOutcome {
        if cancel.is_cancelled() {
            return VerificationOutcome::skipped(record);
        }
        info!(@lavender, "[{position}/{total}] {} ({})", record.contract_name, record.address);
        ContractVerifier::new(
            &self.service,
            &self.resolver,
            &self.artifacts,
            &self.config,
            chain_id,
            record,
        )
        .run(cancel)
        .await
    }
}
