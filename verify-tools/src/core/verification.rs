// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Verification of a single deployed contract.
//!
//! Each contract moves through a fixed sequence of [`Phase`]s. Every transition is one call to
//! [`ContractVerifier::step`], and nothing ever moves backwards: a contract is checked once,
//! submitted at most once, and polled until it is verified or the attempt budget runs out.

use crate::core::{
    artifact::BuildArtifact,
    client::{PollStatus, StatusCheck, Submission, VerificationRequest, VerificationService},
    config::VerifyConfig,
    manifest::DeploymentRecord,
    orchestrator::Cancellation,
    report::VerificationOutcome,
    source::{ResolveSource, SourceIdentifier},
};

/// Where a contract is in its verification pipeline.
#[derive(Debug)]
pub enum Phase {
    CheckingExisting,
    ResolvingSource,
    BuildingArtifact(SourceIdentifier),
    Submitting(VerificationRequest),
    /// Waiting on the verification job with this id.
    Polling(String),
    Done(VerificationOutcome),
}

impl Phase {
    /// Outcome recorded if the run is cancelled while in this phase.
    fn interrupted(&self, record: &DeploymentRecord) -> VerificationOutcome {
        match self {
            Self::Polling(id) => VerificationOutcome::pending(
                record,
                Some(id.clone()),
                "interrupted while waiting for verification - check manually",
            ),
            Self::Submitting(_) => VerificationOutcome::pending(
                record,
                None,
                "interrupted during submission - check manually",
            ),
            Self::Done(outcome) => outcome.clone(),
            _ => VerificationOutcome::pending(record, None, "interrupted before submission"),
        }
    }
}

/// Drives one contract through its [`Phase`]s.
pub struct ContractVerifier<'a, S, R, B> {
    service: &'a S,
    resolver: &'a R,
    artifacts: &'a B,
    config: &'a VerifyConfig,
    chain_id: u64,
    record: &'a DeploymentRecord,
}

impl<'a, S, R, B> ContractVerifier<'a, S, R, B>
where
    S: VerificationService,
    R: ResolveSource,
    B: BuildArtifact,
{
    pub fn new(
        service: &'a S,
        resolver: &'a R,
        artifacts: &'a B,
        config: &'a VerifyConfig,
        chain_id: u64,
        record: &'a DeploymentRecord,
    ) -> Self {
        Self {
            service,
            resolver,
            artifacts,
            config,
            chain_id,
            record,
        }
    }

    /// Run to completion, or until `cancel` fires.
    pub async fn run(&self, cancel: &Cancellation) -> VerificationOutcome {
        let mut phase = Phase::CheckingExisting;
        loop {
            if let Phase::Done(outcome) = phase {
                return outcome;
            }
            let interrupted = phase.interrupted(self.record);
            phase = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!(@yellow, "{}: cancelled", self.name());
                    return interrupted;
                }
                next = self.step(phase) => next,
            };
        }
    }

    /// Perform a single transition.
    pub async fn step(&self, phase: Phase) -> Phase {
        match phase {
            Phase::CheckingExisting => self.check_existing().await,
            Phase::ResolvingSource => self.resolve_source().await,
            Phase::BuildingArtifact(source) => self.build_artifact(source).await,
            Phase::Submitting(request) => self.submit(request).await,
            Phase::Polling(verification_id) => self.poll(verification_id).await,
            done @ Phase::Done(_) => done,
        }
    }

    fn name(&self) -> &str {
        &self.record.contract_name
    }

    async fn check_existing(&self) -> Phase {
        info!(@grey, "{}: checking if already verified", self.name());
        match self
            .service
            .check_verified(self.chain_id, self.record.address)
            .await
        {
            StatusCheck::Verified { detail } => {
                info!(@mint, "{}: already verified ({detail})", self.name());
                Phase::Done(VerificationOutcome::already_verified(self.record))
            }
            StatusCheck::NotVerified => Phase::ResolvingSource,
            StatusCheck::Unknown { reason } => {
                debug!(@grey, "{}: status unknown, treating as not verified: {reason}", self.name());
                Phase::ResolvingSource
            }
        }
    }

    async fn resolve_source(&self) -> Phase {
        info!(@grey, "{}: resolving source", self.name());
        match self.resolver.resolve(self.name()).await {
            Some(source) => {
                debug!(@grey, "{}: using {source}", self.name());
                Phase::BuildingArtifact(source)
            }
            None => {
                warn!(@red, "{}: source not found", self.name());
                Phase::Done(VerificationOutcome::failed(
                    self.record,
                    format!("source not found for {}", self.name()),
                ))
            }
        }
    }

    async fn build_artifact(&self, source: SourceIdentifier) -> Phase {
        info!(@grey, "{}: generating standard JSON input for {source}", self.name());
        let compilation_input = match self.artifacts.build(self.record.address, &source).await {
            Ok(input) => input,
            Err(err) => {
                warn!(@red, "{}: {err}", self.name());
                return Phase::Done(VerificationOutcome::failed(
                    self.record,
                    format!("failed to generate standard JSON input: {err}"),
                ));
            }
        };

        let request = VerificationRequest {
            address: self.record.address,
            compilation_input,
            compiler_version: self.config.compiler_version.clone(),
            source_identifier: source,
            creation_tx_hash: self.record.creation_tx_hash,
        };
        self.save_request(&request).await;

        if self.config.dry_run {
            info!(@yellow, "{}: dry run, not submitting", self.name());
            return Phase::Done(VerificationOutcome::dry_run(self.record));
        }
        Phase::Submitting(request)
    }

    /// Write the request to the save directory, if one is configured.
    async fn save_request(&self, request: &VerificationRequest) {
        let Some(dir) = &self.config.save_requests else {
            return;
        };
        let path = dir.join(format!("{}-{}.json", self.name(), self.record.address));
        let result = async {
            let json = serde_json::to_vec_pretty(request)?;
            tokio::fs::create_dir_all(dir).await?;
            tokio::fs::write(&path, json).await?;
            Ok::<_, std::io::Error>(())
        };
        match result.await {
            Ok(()) => debug!(@grey, "{}: request saved to {}", self.name(), path.display()),
            Err(err) => warn!(@yellow, "{}: failed to save request to {}: {err}", self.name(), path.display()),
        }
    }

    async fn submit(&self, request: VerificationRequest) -> Phase {
        info!(@grey, "{}: submitting verification", self.name());
        match self
            .service
            .submit(self.chain_id, self.record.address, &request)
            .await
        {
            Submission::Accepted { verification_id } => {
                info!(@grey, "{}: submitted, verification id {verification_id}", self.name());
                Phase::Polling(verification_id)
            }
            Submission::Rejected { message } => {
                warn!(@red, "{}: submission rejected: {message}", self.name());
                Phase::Done(VerificationOutcome::failed(
                    self.record,
                    format!("submission failed: {message}"),
                ))
            }
        }
    }

    /// Wait for the contract to show up as verified.
    ///
    /// The contract status endpoint is the only success signal. The job status is asked for once,
    /// after the budget is spent, to explain why the contract is still pending.
    async fn poll(&self, verification_id: String) -> Phase {
        let max = self.config.max_poll_attempts;
        for attempt in 1..=max {
            tokio::time::sleep(self.config.poll_interval).await;
            info!(@grey, "{}: waiting for verification ({attempt}/{max})", self.name());
            let status = self
                .service
                .check_verified(self.chain_id, self.record.address)
                .await;
            if status.is_verified() {
                info!(@mint, "{}: verified", self.name());
                return Phase::Done(VerificationOutcome::verified(self.record, verification_id));
            }
        }

        let job = match self
            .service
            .poll_once(self.chain_id, self.record.address, &verification_id)
            .await
        {
            PollStatus::Verified => "job reports verified".to_owned(),
            PollStatus::Pending { message: Some(message) } => format!("job status: {message}"),
            PollStatus::Pending { message: None } => "job status: pending".to_owned(),
            PollStatus::Failed { message } => format!("job reports failure: {message}"),
        };
        warn!(@yellow, "{}: still pending after {max} attempts", self.name());
        Phase::Done(VerificationOutcome::pending(
            self.record,
            Some(verification_id),
            format!("still pending after {max} attempts ({job}) - check manually"),
        ))
    }
}
