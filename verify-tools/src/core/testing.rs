// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! In-memory stand-ins for the verification service, source resolver and artifact builder.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use alloy_primitives::Address;

use crate::core::{
    artifact::{ArtifactError, BuildArtifact},
    client::{PollStatus, StatusCheck, Submission, VerificationRequest, VerificationService},
    source::{ResolveSource, SourceIdentifier},
};

/// A verification service whose contracts become verified after a set number of status checks.
pub struct FakeService {
    /// Address to the 1-based status check from which it reports verified.
    verified_on: HashMap<Address, usize>,
    unknown_status: bool,
    stall_submit: bool,
    submission: Submission,
    poll_status: PollStatus,
    checks: Mutex<HashMap<Address, usize>>,
    submits: AtomicUsize,
    polls: AtomicUsize,
}

impl Default for FakeService {
    fn default() -> Self {
        Self {
            verified_on: HashMap::new(),
            unknown_status: false,
            stall_submit: false,
            submission: Submission::Accepted {
                verification_id: "job-1".to_owned(),
            },
            poll_status: PollStatus::Pending { message: None },
            checks: Mutex::default(),
            submits: AtomicUsize::new(0),
            polls: AtomicUsize::new(0),
        }
    }
}

impl FakeService {
    pub fn verified_on_check(mut self, address: Address, check: usize) -> Self {
        self.verified_on.insert(address, check);
        self
    }

    /// Unverified contracts report an unusable status instead of "not verified".
    pub fn unknown_status(mut self) -> Self {
        self.unknown_status = true;
        self
    }

    /// Submissions are counted but never answered.
    pub fn stall_submit(mut self) -> Self {
        self.stall_submit = true;
        self
    }

    pub fn submission(mut self, submission: Submission) -> Self {
        self.submission = submission;
        self
    }

    pub fn poll_status(mut self, status: PollStatus) -> Self {
        self.poll_status = status;
        self
    }

    pub fn checks(&self, address: Address) -> usize {
        self.checks
            .lock()
            .unwrap()
            .get(&address)
            .copied()
            .unwrap_or_default()
    }

    pub fn submits(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

impl VerificationService for FakeService {
    async fn check_verified(&self, _chain_id: u64, address: Address) -> StatusCheck {
        let check = {
            let mut checks = self.checks.lock().unwrap();
            let count = checks.entry(address).or_default();
            *count += 1;
            *count
        };
        match self.verified_on.get(&address) {
            Some(&from) if check >= from => StatusCheck::Verified {
                detail: "exact_match".to_owned(),
            },
            _ if self.unknown_status => StatusCheck::Unknown {
                reason: "service unavailable".to_owned(),
            },
            _ => StatusCheck::NotVerified,
        }
    }

    async fn submit(
        &self,
        _chain_id: u64,
        _address: Address,
        _request: &VerificationRequest,
    ) -> Submission {
        self.submits.fetch_add(1, Ordering::SeqCst);
        if self.stall_submit {
            std::future::pending::<()>().await;
        }
        self.submission.clone()
    }

    async fn poll_once(
        &self,
        _chain_id: u64,
        _address: Address,
        _verification_id: &str,
    ) -> PollStatus {
        self.polls.fetch_add(1, Ordering::SeqCst);
        self.poll_status.clone()
    }
}

/// Resolves every contract to `contracts/<Name>.sol` unless marked missing.
#[derive(Default)]
pub struct FakeResolver {
    missing: HashSet<String>,
    stalled: HashSet<String>,
}

impl FakeResolver {
    pub fn missing(mut self, contract_name: &str) -> Self {
        self.missing.insert(contract_name.to_owned());
        self
    }

    /// Resolving this contract never finishes.
    pub fn stalled(mut self, contract_name: &str) -> Self {
        self.stalled.insert(contract_name.to_owned());
        self
    }
}

impl ResolveSource for FakeResolver {
    async fn resolve(&self, contract_name: &str) -> Option<SourceIdentifier> {
        if self.stalled.contains(contract_name) {
            std::future::pending::<()>().await;
        }
        (!self.missing.contains(contract_name)).then(|| {
            SourceIdentifier::new(format!("contracts/{contract_name}.sol"), contract_name)
        })
    }
}

/// Produces a minimal standard JSON input, or fails for selected contracts.
#[derive(Default)]
pub struct FakeArtifacts {
    failing: HashSet<String>,
    builds: AtomicUsize,
}

impl FakeArtifacts {
    pub fn failing(mut self, contract_name: &str) -> Self {
        self.failing.insert(contract_name.to_owned());
        self
    }

    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

impl BuildArtifact for FakeArtifacts {
    async fn build(
        &self,
        _address: Address,
        source: &SourceIdentifier,
    ) -> Result<serde_json::Value, ArtifactError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&source.contract_name) {
            return Err(ArtifactError::NotAnObject);
        }
        Ok(serde_json::json!({ "language": "Solidity", "sources": {} }))
    }
}
