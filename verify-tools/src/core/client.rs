// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Client for the source verification service's `/v2` API.
//!
//! Each operation is a single request with no retries; retry and polling policy lives in the
//! verification state machine. Responses are classified into explicit states rather than
//! errors: anything the client cannot make sense of while checking status counts as "not
//! verified" or "pending", so a network blip never turns into a false failure.

use alloy_primitives::{Address, TxHash};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{
    core::{config::VerifyConfig, source::SourceIdentifier},
    utils::truncate,
};

/// Fallback message for rejected submissions that do not say why.
pub const UNKNOWN_ERROR: &str = "unknown error";

const TEXT_VERIFIED_MARKERS: &[&str] = &["verified", "perfect", "partial"];
const JSON_VERIFIED_MARKERS: &[&str] = &["verified", "perfect", "partial", "success", "complete"];
const JSON_FAILED_MARKERS: &[&str] = &["fail", "error", "reject"];
const LOG_PREVIEW_CHARS: usize = 200;

/// A verification submission for one contract.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    #[serde(skip)]
    pub address: Address,
    #[serde(rename = "stdJsonInput")]
    pub compilation_input: serde_json::Value,
    pub compiler_version: String,
    #[serde(rename = "contractIdentifier")]
    pub source_identifier: SourceIdentifier,
    #[serde(rename = "creationTransactionHash")]
    pub creation_tx_hash: TxHash,
}

/// Whether the service reports an address as verified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatusCheck {
    Verified { detail: String },
    NotVerified,
    /// The service could not be asked or gave an unusable answer.
    Unknown { reason: String },
}

impl StatusCheck {
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified { .. })
    }
}

/// Result of submitting a verification request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Submission {
    Accepted { verification_id: String },
    Rejected { message: String },
}

/// Status of an in-flight verification job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollStatus {
    Verified,
    Pending { message: Option<String> },
    Failed { message: String },
}

pub trait VerificationService {
    /// Ask whether `address` is already verified.
    #[allow(async_fn_in_trait)]
    async fn check_verified(&self, chain_id: u64, address: Address) -> StatusCheck;

    /// Submit a verification request.
    #[allow(async_fn_in_trait)]
    async fn submit(
        &self,
        chain_id: u64,
        address: Address,
        request: &VerificationRequest,
    ) -> Submission;

    /// Probe the status of a submitted verification job once.
    #[allow(async_fn_in_trait)]
    async fn poll_once(&self, chain_id: u64, address: Address, verification_id: &str)
        -> PollStatus;
}

#[derive(Debug, Default, Deserialize)]
struct ContractInfo {
    #[serde(rename = "matchId")]
    match_id: Option<serde_json::Value>,
    #[serde(rename = "match")]
    match_kind: Option<serde_json::Value>,
    #[serde(rename = "verifiedAt")]
    verified_at: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct SubmissionResponse {
    #[serde(rename = "verificationId")]
    verification_id: Option<String>,
    message: Option<String>,
    error: Option<serde_json::Value>,
}

/// Classify a `GET /v2/contract/{chain}/{address}` response.
///
/// Any one of a match id, a match kind or a verification timestamp is proof of verification.
pub fn classify_contract_status(status: StatusCode, body: &str) -> StatusCheck {
    if status == StatusCode::NOT_FOUND {
        return StatusCheck::NotVerified;
    }
    if !status.is_success() {
        return StatusCheck::Unknown {
            reason: format!("service responded with {status}"),
        };
    }
    let info: ContractInfo = match serde_json::from_str(body) {
        Ok(info) => info,
        Err(err) => {
            return StatusCheck::Unknown {
                reason: format!("malformed contract status: {err}"),
            }
        }
    };
    let signals = [
        ("match id", &info.match_id),
        ("match", &info.match_kind),
        ("verified at", &info.verified_at),
    ];
    let present: Vec<String> = signals
        .iter()
        .filter_map(|(label, value)| {
            value
                .as_ref()
                .filter(|value| is_truthy(value))
                .map(|value| format!("{label}: {}", display_value(value)))
        })
        .collect();
    if present.is_empty() {
        StatusCheck::NotVerified
    } else {
        StatusCheck::Verified {
            detail: present.join(", "),
        }
    }
}

/// Classify a `POST /v2/verify/{chain}/{address}` response.
///
/// Without a verification id the submission failed, whatever the HTTP status says.
pub fn classify_submission(body: &str) -> Submission {
    let response: SubmissionResponse = serde_json::from_str(body).unwrap_or_default();
    if let Some(verification_id) = response.verification_id.filter(|id| !id.is_empty()) {
        return Submission::Accepted { verification_id };
    }
    let message = response
        .message
        .filter(|message| !message.is_empty())
        .or_else(|| response.error.as_ref().and_then(error_message))
        .unwrap_or_else(|| UNKNOWN_ERROR.to_owned());
    Submission::Rejected { message }
}

/// Classify a `GET /v2/verify/{chain}/{address}/{id}` response body.
///
/// The endpoint may answer with JSON carrying a `status` field or with free text. Free text
/// containing `verified`, `perfect` or `partial` (case-sensitive) counts as verified; anything
/// else is pending. JSON `status` values are compared case-insensitively.
pub fn classify_poll_status(body: &str) -> PollStatus {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(object)) => {
            let message = object
                .get("message")
                .and_then(serde_json::Value::as_str)
                .filter(|message| !message.is_empty())
                .map(str::to_owned)
                .or_else(|| object.get("error").and_then(error_message));
            let Some(status) = object.get("status").and_then(serde_json::Value::as_str) else {
                return PollStatus::Pending { message };
            };
            let status = status.to_lowercase();
            if JSON_FAILED_MARKERS.iter().any(|m| status.contains(m)) {
                PollStatus::Failed {
                    message: message.unwrap_or(status),
                }
            } else if JSON_VERIFIED_MARKERS.iter().any(|m| status.contains(m)) {
                PollStatus::Verified
            } else {
                PollStatus::Pending {
                    message: message.or(Some(status)),
                }
            }
        }
        _ => {
            if TEXT_VERIFIED_MARKERS.iter().any(|m| body.contains(m)) {
                PollStatus::Verified
            } else {
                let text = body.trim();
                PollStatus::Pending {
                    message: (!text.is_empty()).then(|| truncate(text, LOG_PREVIEW_CHARS).to_owned()),
                }
            }
        }
    }
}

fn error_message(error: &serde_json::Value) -> Option<String> {
    match error {
        serde_json::Value::Null => None,
        serde_json::Value::String(message) if message.is_empty() => None,
        serde_json::Value::String(message) => Some(message.clone()),
        serde_json::Value::Object(object) => object
            .get("message")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned)
            .or_else(|| Some(error.to_string())),
        other => Some(other.to_string()),
    }
}

/// A status signal only counts when it is set to something meaningful.
fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(flag) => *flag,
        serde_json::Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        serde_json::Value::String(text) => !text.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// HTTP client for the verification service.
#[derive(Clone, Debug)]
pub struct VerificationClient {
    http: reqwest::Client,
    base_url: String,
}

impl VerificationClient {
    pub fn new(config: &VerifyConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Build)?;
        Ok(Self {
            http,
            base_url: config.base_url().to_owned(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn contract_url(&self, chain_id: u64, address: Address) -> String {
        format!("{}/v2/contract/{chain_id}/{address}", self.base_url)
    }

    fn verify_url(&self, chain_id: u64, address: Address) -> String {
        format!("{}/v2/verify/{chain_id}/{address}", self.base_url)
    }

    fn job_url(&self, chain_id: u64, address: Address, verification_id: &str) -> String {
        format!(
            "{}/v2/verify/{chain_id}/{address}/{verification_id}",
            self.base_url
        )
    }

    async fn read(response: reqwest::Response) -> reqwest::Result<(StatusCode, String)> {
        let status = response.status();
        let body = response.text().await?;
        debug!(@grey, "response ({status}): {}", truncate(&body, LOG_PREVIEW_CHARS));
        Ok((status, body))
    }
}

impl VerificationService for VerificationClient {
    async fn check_verified(&self, chain_id: u64, address: Address) -> StatusCheck {
        let url = self.contract_url(chain_id, address);
        debug!(@grey, "checking verification status: GET {url}");
        let response = match self.http.get(&url).send().await {
            Ok(response) => Self::read(response).await,
            Err(err) => Err(err),
        };
        match response {
            Ok((status, body)) => classify_contract_status(status, &body),
            Err(err) => StatusCheck::Unknown {
                reason: format!("request failed: {err}"),
            },
        }
    }

    async fn submit(
        &self,
        chain_id: u64,
        address: Address,
        request: &VerificationRequest,
    ) -> Submission {
        let url = self.verify_url(chain_id, address);
        debug!(@grey, "POST {url}");
        let response = match self.http.post(&url).json(request).send().await {
            Ok(response) => Self::read(response).await,
            Err(err) => Err(err),
        };
        match response {
            Ok((_, body)) => classify_submission(&body),
            Err(err) => Submission::Rejected {
                message: format!("request failed: {err}"),
            },
        }
    }

    async fn poll_once(
        &self,
        chain_id: u64,
        address: Address,
        verification_id: &str,
    ) -> PollStatus {
        let url = self.job_url(chain_id, address, verification_id);
        debug!(@grey, "GET {url}");
        let response = match self.http.get(&url).send().await {
            Ok(response) => Self::read(response).await,
            Err(err) => Err(err),
        };
        match response {
            Ok((_, body)) => classify_poll_status(&body),
            Err(err) => {
                debug!(@grey, "error polling status: {err}");
                PollStatus::Pending {
                    message: Some(format!("request failed: {err}")),
                }
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to build http client: {0}")]
    Build(reqwest::Error),
}
