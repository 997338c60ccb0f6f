// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Generate the compiler's standard JSON input for a deployed contract.

use std::{io, path::PathBuf};

use alloy_primitives::Address;
use tokio::process::Command;

use crate::core::{config::VerifyConfig, message::ProcessOutput, source::SourceIdentifier};

pub trait BuildArtifact {
    /// Produce the standard JSON input document for a contract.
    #[allow(async_fn_in_trait)]
    async fn build(
        &self,
        address: Address,
        source: &SourceIdentifier,
    ) -> Result<serde_json::Value, ArtifactError>;
}

/// Delegates to `forge verify-contract --show-standard-json-input`.
#[derive(Clone, Debug)]
pub struct ForgeArtifactBuilder {
    forge: PathBuf,
    project_root: PathBuf,
}

impl ForgeArtifactBuilder {
    pub fn new(config: &VerifyConfig) -> Self {
        Self {
            forge: config.forge.clone(),
            project_root: config.project_root.clone(),
        }
    }
}

impl BuildArtifact for ForgeArtifactBuilder {
    async fn build(
        &self,
        address: Address,
        source: &SourceIdentifier,
    ) -> Result<serde_json::Value, ArtifactError> {
        debug!(@grey, "{} verify-contract {address} {source} --show-standard-json-input", self.forge.display());
        let output = Command::new(&self.forge)
            .current_dir(&self.project_root)
            .arg("verify-contract")
            .arg(address.to_string())
            .arg(source.to_string())
            .arg("--show-standard-json-input")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(ArtifactError::CommandExecution)?;
        if !output.status.success() {
            return Err(ArtifactError::CommandFailure(ProcessOutput::new(
                "forge", output,
            )));
        }

        let input: serde_json::Value = serde_json::from_slice(&output.stdout)?;
        if !input.is_object() {
            return Err(ArtifactError::NotAnObject);
        }
        Ok(input)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to run forge: {0}")]
    CommandExecution(io::Error),
    #[error("forge failed (exit code: {code:?}): {summary}", code = .0.exit_code, summary = .0.summary())]
    CommandFailure(ProcessOutput),
    #[error("invalid standard JSON input: {0}")]
    Json(#[from] serde_json::Error),
    #[error("standard JSON input is not an object")]
    NotAnObject,
}

#[cfg(all(test, unix))]
mod tests {
    use std::{fs, os::unix::fs::PermissionsExt, path::Path};

    use super::*;

    fn fake_forge(dir: &Path, script: &str) -> PathBuf {
        let path = dir.join("forge");
        fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn builder(dir: &Path, forge: PathBuf) -> ForgeArtifactBuilder {
        ForgeArtifactBuilder::new(&VerifyConfig {
            forge,
            project_root: dir.to_path_buf(),
            ..Default::default()
        })
    }

    fn source() -> SourceIdentifier {
        SourceIdentifier::new("contracts/Vault.sol", "Vault")
    }

    #[tokio::test]
    async fn parses_forge_output() {
        let dir = tempfile::tempdir().unwrap();
        // Echo the arguments back so we can check how forge is invoked.
        let forge = fake_forge(
            dir.path(),
            r#"printf '{"language":"Solidity","args":"%s %s %s %s"}' "$1" "$2" "$3" "$4""#,
        );
        let input = builder(dir.path(), forge)
            .build(Address::ZERO, &source())
            .await
            .unwrap();
        assert_eq!(input["language"], "Solidity");
        assert_eq!(
            input["args"],
            format!(
                "verify-contract {} contracts/Vault.sol:Vault --show-standard-json-input",
                Address::ZERO
            )
        );
    }

    #[tokio::test]
    async fn reports_forge_failures() {
        let dir = tempfile::tempdir().unwrap();
        let forge = fake_forge(
            dir.path(),
            "echo 'Compiling...' >&2\necho 'Error: contract not found' >&2\nexit 1",
        );
        let err = builder(dir.path(), forge)
            .build(Address::ZERO, &source())
            .await
            .unwrap_err();
        assert!(matches!(err, ArtifactError::CommandFailure(_)));
        assert_eq!(
            err.to_string(),
            "forge failed (exit code: Some(1)): Error: contract not found"
        );
    }

    #[tokio::test]
    async fn rejects_non_json_output() {
        let dir = tempfile::tempdir().unwrap();
        let forge = fake_forge(dir.path(), "echo 'not json'");
        let err = builder(dir.path(), forge)
            .build(Address::ZERO, &source())
            .await
            .unwrap_err();
        assert!(matches!(err, ArtifactError::Json(_)));
    }

    #[tokio::test]
    async fn missing_forge_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = builder(dir.path(), dir.path().join("no-such-forge"))
            .build(Address::ZERO, &source())
            .await
            .unwrap_err();
        assert!(matches!(err, ArtifactError::CommandExecution(_)));
    }
}
