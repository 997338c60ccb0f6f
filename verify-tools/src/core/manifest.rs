// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Foundry broadcast manifests.
//!
//! A broadcast file (`broadcast/<Script>/<chainId>/run-latest.json`) lists every transaction a
//! deployment script sent. Only contract creations that carry a contract name are deployments.

use std::{
    fs,
    path::{Component, Path, PathBuf},
};

use alloy_primitives::{Address, TxHash};
use serde::Deserialize;

/// Transaction types Foundry records for contract creations.
const CREATION_TX_TYPES: &[&str] = &["CREATE", "CREATE2"];

/// A single deployed contract, as recorded by the deployment script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentRecord {
    pub contract_name: String,
    pub address: Address,
    pub creation_tx_hash: TxHash,
}

#[derive(Debug, Deserialize)]
pub struct Broadcast {
    pub transactions: Vec<BroadcastTransaction>,
    #[serde(default)]
    pub chain: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastTransaction {
    #[serde(default)]
    pub hash: Option<String>,
    pub transaction_type: String,
    #[serde(default)]
    pub contract_name: Option<String>,
    #[serde(default)]
    pub contract_address: Option<String>,
}

impl BroadcastTransaction {
    pub fn is_creation(&self) -> bool {
        CREATION_TX_TYPES.contains(&self.transaction_type.as_str())
    }

    /// Returns the contract name of a named contract creation.
    fn deployed_contract(&self) -> Option<&str> {
        if !self.is_creation() {
            return None;
        }
        self.contract_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
    }
}

/// A broadcast manifest loaded from disk.
#[derive(Debug)]
pub struct DeploymentManifest {
    path: PathBuf,
    broadcast: Broadcast,
}

impl DeploymentManifest {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ManifestError::NotFound(path.to_path_buf()));
        }
        let contents = fs::read_to_string(path)?;
        let broadcast = serde_json::from_str(&contents).map_err(|err| ManifestError::Parse {
            path: path.to_path_buf(),
            err,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            broadcast,
        })
    }

    pub fn from_broadcast(path: impl Into<PathBuf>, broadcast: Broadcast) -> Self {
        Self {
            path: path.into(),
            broadcast,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Determine the chain the manifest was broadcast to.
    ///
    /// An explicit override wins, then the chain id directory of the broadcast path, then the
    /// `chain` field of the broadcast itself.
    pub fn chain_id(&self, chain_override: Option<u64>) -> Result<u64, ManifestError> {
        chain_override
            .or_else(|| chain_id_from_path(&self.path))
            .or(self.broadcast.chain)
            .ok_or_else(|| ManifestError::NoChainId(self.path.clone()))
    }

    /// All named contract creations, in broadcast order.
    pub fn deployments(&self) -> Result<Vec<DeploymentRecord>, ManifestError> {
        self.broadcast
            .transactions
            .iter()
            .enumerate()
            .filter_map(|(index, tx)| tx.deployed_contract().map(|name| (index, name, tx)))
            .map(|(index, name, tx)| -> Result<DeploymentRecord, ManifestError> {
                let address = tx
                    .contract_address
                    .as_deref()
                    .ok_or_else(|| ManifestError::invalid(index, name, "missing contract address"))?
                    .parse::<Address>()
                    .map_err(|err| ManifestError::invalid(index, name, err))?;
                let creation_tx_hash = tx
                    .hash
                    .as_deref()
                    .ok_or_else(|| ManifestError::invalid(index, name, "missing transaction hash"))?
                    .parse::<TxHash>()
                    .map_err(|err| ManifestError::invalid(index, name, err))?;
                Ok(DeploymentRecord {
                    contract_name: name.to_owned(),
                    address,
                    creation_tx_hash,
                })
            })
            .collect()
    }
}

/// Extract the chain id from a broadcast path such as `broadcast/Deploy.s.sol/42431/run-latest.json`.
///
/// This is the first directory component made up only of digits.
pub fn chain_id_from_path(path: &Path) -> Option<u64> {
    path.parent()?
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => name.to_str(),
            _ => None,
        })
        .find(|name| !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()))?
        .parse()
        .ok()
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("broadcast file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse broadcast file {}: {err}", .path.display())]
    Parse {
        path: PathBuf,
        err: serde_json::Error,
    },
    #[error("could not determine chain id from path {}; pass --chain-id", .0.display())]
    NoChainId(PathBuf),
    #[error("no CREATE transactions found in broadcast file")]
    NoDeployments,
    #[error("invalid transaction #{index} ({contract_name}): {reason}")]
    InvalidTransaction {
        index: usize,
        contract_name: String,
        reason: String,
    },
}

impl ManifestError {
    fn invalid(index: usize, contract_name: &str, reason: impl ToString) -> Self {
        Self::InvalidTransaction {
            index,
            contract_name: contract_name.to_owned(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BROADCAST: &str = r#"{
        "transactions": [
            {
                "hash": "0x1111111111111111111111111111111111111111111111111111111111111111",
                "transactionType": "CREATE",
                "contractName": "FraxProxyAdmin",
                "contractAddress": "0x5FbDB2315678afecb367f032d93F642f64180aa3",
                "function": null,
                "arguments": null,
                "transaction": { "input": "0x" }
            },
            {
                "hash": "0x2222222222222222222222222222222222222222222222222222222222222222",
                "transactionType": "CALL",
                "contractName": "FraxProxyAdmin",
                "contractAddress": "0x5FbDB2315678afecb367f032d93F642f64180aa3",
                "function": "transferOwnership(address)"
            },
            {
                "hash": "0x3333333333333333333333333333333333333333333333333333333333333333",
                "transactionType": "CREATE",
                "contractName": null,
                "contractAddress": "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512"
            },
            {
                "hash": "0x4444444444444444444444444444444444444444444444444444444444444444",
                "transactionType": "CREATE2",
                "contractName": "TransparentUpgradeableProxy",
                "contractAddress": "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0"
            }
        ],
        "chain": 31337
    }"#;

    fn manifest(path: &str, json: &str) -> DeploymentManifest {
        DeploymentManifest::from_broadcast(path, serde_json::from_str(json).unwrap())
    }

    #[test]
    fn keeps_only_named_creations() {
        let manifest = manifest("broadcast/Deploy.s.sol/42431/run-latest.json", BROADCAST);
        let deployments = manifest.deployments().unwrap();
        let names: Vec<_> = deployments
            .iter()
            .map(|d| d.contract_name.as_str())
            .collect();
        assert_eq!(names, ["FraxProxyAdmin", "TransparentUpgradeableProxy"]);
        assert_eq!(
            deployments[0].address,
            "0x5FbDB2315678afecb367f032d93F642f64180aa3"
                .parse::<Address>()
                .unwrap()
        );
        assert_eq!(
            deployments[1].creation_tx_hash,
            TxHash::repeat_byte(0x44),
        );
    }

    #[test]
    fn chain_id_precedence() {
        let from_path = manifest("broadcast/Deploy.s.sol/42431/run-latest.json", BROADCAST);
        assert_eq!(from_path.chain_id(None).unwrap(), 42431);
        assert_eq!(from_path.chain_id(Some(1)).unwrap(), 1);

        let from_field = manifest("run-latest.json", BROADCAST);
        assert_eq!(from_field.chain_id(None).unwrap(), 31337);

        let missing = manifest("run-latest.json", r#"{ "transactions": [] }"#);
        assert!(matches!(
            missing.chain_id(None),
            Err(ManifestError::NoChainId(_))
        ));
    }

    #[test]
    fn chain_id_requires_a_whole_directory() {
        assert_eq!(chain_id_from_path(Path::new("/tmp/b/8453/run.json")), Some(8453));
        assert_eq!(chain_id_from_path(Path::new("broadcast/v2/run.json")), None);
        assert_eq!(chain_id_from_path(Path::new("42431-run.json")), None);
        assert_eq!(chain_id_from_path(Path::new("broadcast/42431")), None);
        assert_eq!(chain_id_from_path(Path::new("broadcast/+5/run.json")), None);
        assert_eq!(
            chain_id_from_path(Path::new("broadcast/99999999999999999999/run.json")),
            None
        );
    }

    #[test]
    fn creation_without_address_is_invalid() {
        let json = r#"{ "transactions": [
            { "hash": "0x1111111111111111111111111111111111111111111111111111111111111111",
              "transactionType": "CREATE", "contractName": "Broken", "contractAddress": null }
        ] }"#;
        let err = manifest("run.json", json).deployments().unwrap_err();
        assert!(matches!(
            err,
            ManifestError::InvalidTransaction { index: 0, ref contract_name, .. } if contract_name == "Broken"
        ));
    }

    #[test]
    fn load_reports_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("run-latest.json");
        assert!(matches!(
            DeploymentManifest::load(&missing),
            Err(ManifestError::NotFound(_))
        ));

        std::fs::write(&missing, "not json").unwrap();
        assert!(matches!(
            DeploymentManifest::load(&missing),
            Err(ManifestError::Parse { .. })
        ));

        std::fs::write(&missing, BROADCAST).unwrap();
        let loaded = DeploymentManifest::load(&missing).unwrap();
        assert_eq!(loaded.deployments().unwrap().len(), 2);
    }
}
