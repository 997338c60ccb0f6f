// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Per-contract outcomes and the consolidated run report.

use std::{fmt, fmt::Write as _, fs, io, path::Path};

use alloy_primitives::Address;
use serde::Serialize;

use crate::{
    core::manifest::DeploymentRecord,
    utils::color::Color,
};

/// Terminal state of one contract in a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeState {
    /// Submitted by this run and confirmed verified.
    Success,
    /// Verified before this run touched it.
    AlreadyVerified,
    Failed,
    /// Submitted (or interrupted) without confirmation yet.
    Pending,
    /// Never started because the run was cancelled.
    Skipped,
}

impl OutcomeState {
    pub fn is_verified(self) -> bool {
        matches!(self, Self::Success | Self::AlreadyVerified)
    }

    fn icon(self) -> &'static str {
        match self {
            Self::Success | Self::AlreadyVerified => "✓",
            Self::Failed => "✗",
            Self::Pending => "⏳",
            Self::Skipped => "-",
        }
    }

    fn paint(self, text: &str) -> String {
        match self {
            Self::Success | Self::AlreadyVerified => text.mint(),
            Self::Failed => text.red(),
            Self::Pending | Self::Skipped => text.yellow(),
        }
    }
}

impl fmt::Display for OutcomeState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Success => "Success",
            Self::AlreadyVerified => "AlreadyVerified",
            Self::Failed => "Failed",
            Self::Pending => "Pending",
            Self::Skipped => "Skipped",
        };
        f.write_str(name)
    }
}

/// The single, final record for one deployed contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationOutcome {
    pub contract_name: String,
    pub address: Address,
    pub state: OutcomeState,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_id: Option<String>,
    /// Set when the request was generated but deliberately not submitted.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dry_run: bool,
}

impl VerificationOutcome {
    pub fn new(record: &DeploymentRecord, state: OutcomeState, detail: impl Into<String>) -> Self {
        Self {
            contract_name: record.contract_name.clone(),
            address: record.address,
            state,
            detail: detail.into(),
            verification_id: None,
            dry_run: false,
        }
    }

    pub fn already_verified(record: &DeploymentRecord) -> Self {
        Self::new(
            record,
            OutcomeState::AlreadyVerified,
            "contract is already verified",
        )
    }

    pub fn verified(record: &DeploymentRecord, verification_id: String) -> Self {
        Self::new(record, OutcomeState::Success, "verified")
            .with_verification_id(Some(verification_id))
    }

    pub fn dry_run(record: &DeploymentRecord) -> Self {
        Self {
            dry_run: true,
            ..Self::new(
                record,
                OutcomeState::Success,
                "dry run - request generated, not submitted",
            )
        }
    }

    pub fn failed(record: &DeploymentRecord, detail: impl Into<String>) -> Self {
        Self::new(record, OutcomeState::Failed, detail)
    }

    pub fn pending(
        record: &DeploymentRecord,
        verification_id: Option<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::new(record, OutcomeState::Pending, detail).with_verification_id(verification_id)
    }

    pub fn skipped(record: &DeploymentRecord) -> Self {
        Self::new(
            record,
            OutcomeState::Skipped,
            "not processed - run was cancelled",
        )
    }

    pub fn with_verification_id(mut self, verification_id: Option<String>) -> Self {
        self.verification_id = verification_id;
        self
    }
}

/// Aggregate counts over a run's outcomes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub already_verified: usize,
    pub newly_verified: usize,
    pub failed: usize,
    pub pending: usize,
    pub skipped: usize,
    pub total: usize,
}

impl Summary {
    pub fn from_outcomes(outcomes: &[VerificationOutcome]) -> Self {
        outcomes
            .iter()
            .fold(Self::default(), |mut summary, outcome| {
                match outcome.state {
                    OutcomeState::AlreadyVerified => summary.already_verified += 1,
                    OutcomeState::Success => summary.newly_verified += 1,
                    OutcomeState::Failed => summary.failed += 1,
                    OutcomeState::Pending => summary.pending += 1,
                    OutcomeState::Skipped => summary.skipped += 1,
                }
                summary.total += 1;
                summary
            })
    }

    /// A run succeeds only if every contract ended up verified.
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.pending == 0 && self.skipped == 0
    }
}

/// Outcomes of a run, in manifest order, with their summary.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub chain_id: u64,
    pub outcomes: Vec<VerificationOutcome>,
    pub summary: Summary,
}

impl VerificationReport {
    pub fn new(chain_id: u64, outcomes: Vec<VerificationOutcome>) -> Self {
        let summary = Summary::from_outcomes(&outcomes);
        Self {
            chain_id,
            outcomes,
            summary,
        }
    }

    pub fn is_success(&self) -> bool {
        self.summary.is_success()
    }

    /// Human-readable report: one line per contract, then the counts.
    pub fn render(&self, verbose: bool) -> String {
        let mut out = String::new();
        for outcome in &self.outcomes {
            let line = format!(
                "  {} {} ({}) {}",
                outcome.state.icon(),
                outcome.contract_name,
                outcome.address,
                outcome.state
            );
            let _ = writeln!(out, "{}", outcome.state.paint(&line));
            if verbose || !outcome.state.is_verified() {
                let _ = writeln!(out, "      {}", outcome.detail.grey());
            }
            if verbose {
                if let Some(id) = &outcome.verification_id {
                    let _ = writeln!(out, "      {}", format!("verification id: {id}").grey());
                }
            }
        }

        let summary = &self.summary;
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{}",
            format!("Already Verified: {}", summary.already_verified).mint()
        );
        let _ = writeln!(
            out,
            "{}",
            format!("Newly Verified: {}", summary.newly_verified).mint()
        );
        let _ = writeln!(out, "{}", format!("Failed: {}", summary.failed).red());
        let _ = writeln!(out, "{}", format!("Pending: {}", summary.pending).yellow());
        if summary.skipped > 0 {
            let _ = writeln!(out, "{}", format!("Skipped: {}", summary.skipped).yellow());
        }
        let _ = writeln!(out, "{}", format!("Total: {}", summary.total).blue());
        out
    }

    /// Write the report as JSON to a file.
    pub fn write_json(&self, path: &Path) -> io::Result<()> {
        let mut json = serde_json::to_vec_pretty(self)?;
        json.push(b'\n');
        fs::write(path, json)
    }
}
