// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Run configuration for contract verification.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

pub const DEFAULT_VERIFIER_URL: &str = "https://contracts.tempo.xyz";
pub const DEFAULT_COMPILER_VERSION: &str = "0.8.22+commit.4fc1097e";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 20;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_FORGE: &str = "forge";
pub const DEFAULT_SEARCH_DIRS: &[&str] = &["contracts", "lib"];

/// Source paths for contracts that are not found by searching the project.
///
/// These may rely on remappings (e.g. `@fraxfinance/`), so they are passed to forge as-is
/// without checking that the file exists.
pub const DEFAULT_SOURCE_OVERRIDES: &[(&str, &str)] = &[
    (
        "TransparentUpgradeableProxy",
        "node_modules/@fraxfinance/layerzero-v2-upgradeable/messagelib/contracts/upgradeable/proxy/TransparentUpgradeableProxy.sol",
    ),
    (
        "ProxyAdmin",
        "node_modules/@fraxfinance/layerzero-v2-upgradeable/messagelib/contracts/upgradeable/proxy/ProxyAdmin.sol",
    ),
    ("FraxProxyAdmin", "contracts/FraxProxyAdmin.sol"),
    ("ImplementationMock", "contracts/ImplementationMock.sol"),
    (
        "FraxOFTMintableAdapterUpgradeableTIP20",
        "contracts/tempo/oft-upgradeable/FraxOFTMintableAdapterUpgradeableTIP20.sol",
    ),
    (
        "FrxUSDPolicyAdminTempo",
        "contracts/frxUsd/FrxUSDPolicyAdminTempo.sol",
    ),
    (
        "FraxOFTWalletUpgradeable",
        "contracts/FraxOFTWalletUpgradeable.sol",
    ),
];

/// Everything a verification run needs to know, threaded explicitly into the orchestrator and
/// the verification client.
#[derive(Clone, Debug)]
pub struct VerifyConfig {
    /// Base URL of the verification service.
    pub verifier_url: String,
    /// Full solc version string submitted with each request.
    pub compiler_version: String,
    /// Delay before each status check while waiting for a submission.
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
    /// Timeout applied to every individual HTTP request.
    pub request_timeout: Duration,
    /// Maximum number of contracts verified at the same time.
    pub concurrency: usize,
    /// Generate requests without submitting them.
    pub dry_run: bool,
    pub verbose: bool,
    /// Foundry project root; forge runs here and search dirs are relative to it.
    pub project_root: PathBuf,
    /// The forge executable used to generate standard JSON input.
    pub forge: PathBuf,
    pub search_dirs: Vec<PathBuf>,
    /// Contract name to source path, consulted before searching.
    pub source_overrides: BTreeMap<String, String>,
    /// Directory to write generated verification requests into.
    pub save_requests: Option<PathBuf>,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            verifier_url: DEFAULT_VERIFIER_URL.to_owned(),
            compiler_version: DEFAULT_COMPILER_VERSION.to_owned(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            concurrency: 1,
            dry_run: false,
            verbose: false,
            project_root: PathBuf::from("."),
            forge: PathBuf::from(DEFAULT_FORGE),
            search_dirs: DEFAULT_SEARCH_DIRS.iter().map(PathBuf::from).collect(),
            source_overrides: DEFAULT_SOURCE_OVERRIDES
                .iter()
                .map(|(name, path)| (name.to_string(), path.to_string()))
                .collect(),
            save_requests: None,
        }
    }
}

impl VerifyConfig {
    /// Load defaults overlaid with a TOML config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply(ConfigFile::read(path)?);
        Ok(config)
    }

    /// Overlay values set in a config file.
    pub fn apply(&mut self, file: ConfigFile) {
        if let Some(url) = file.verifier_url {
            self.verifier_url = url;
        }
        if let Some(version) = file.compiler_version {
            self.compiler_version = version;
        }
        if let Some(secs) = file.poll_interval_secs {
            self.poll_interval = Duration::from_secs(secs);
        }
        if let Some(attempts) = file.max_poll_attempts {
            self.max_poll_attempts = attempts;
        }
        if let Some(secs) = file.request_timeout_secs {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(concurrency) = file.concurrency {
            self.concurrency = concurrency;
        }
        if let Some(root) = file.project_root {
            self.project_root = root;
        }
        if let Some(forge) = file.forge {
            self.forge = forge;
        }
        if let Some(dirs) = file.search_dirs {
            self.search_dirs = dirs;
        }
        self.source_overrides.extend(file.overrides);
    }

    /// Add `Name=path` style source overrides.
    pub fn add_source_overrides<'a>(
        &mut self,
        overrides: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), ConfigError> {
        for entry in overrides {
            let (name, path) = entry
                .split_once('=')
                .map(|(name, path)| (name.trim(), path.trim()))
                .filter(|(name, path)| !name.is_empty() && !path.is_empty())
                .ok_or_else(|| ConfigError::InvalidOverride(entry.to_owned()))?;
            self.source_overrides
                .insert(name.to_owned(), path.to_owned());
        }
        Ok(())
    }

    /// Base URL without a trailing slash, ready for joining endpoint paths.
    pub fn base_url(&self) -> &str {
        self.verifier_url.trim_end_matches('/')
    }

    /// Number of contracts to run at once; never zero.
    pub fn workers(&self) -> usize {
        self.concurrency.max(1)
    }
}

/// On-disk configuration, e.g. `verify.toml`.
///
/// ```toml
/// verifier_url = "https://contracts.tempo.xyz"
/// compiler_version = "0.8.22+commit.4fc1097e"
/// max_poll_attempts = 30
///
/// [overrides]
/// FraxOFTUpgradeable = "contracts/FraxOFTUpgradeable.sol"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub verifier_url: Option<String>,
    pub compiler_version: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub max_poll_attempts: Option<u32>,
    pub request_timeout_secs: Option<u64>,
    pub concurrency: Option<usize>,
    pub project_root: Option<PathBuf>,
    pub forge: Option<PathBuf>,
    pub search_dirs: Option<Vec<PathBuf>>,
    #[serde(default)]
    pub overrides: BTreeMap<String, String>,
}

impl ConfigFile {
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|err| ConfigError::Read {
            path: path.to_path_buf(),
            err,
        })?;
        toml::from_str(&contents).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            err,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {err}", .path.display())]
    Read {
        path: PathBuf,
        err: std::io::Error,
    },
    #[error("invalid config file {}: {err}", .path.display())]
    Parse {
        path: PathBuf,
        err: toml::de::Error,
    },
    #[error("invalid source override {0:?}, expected Name=path/to/File.sol")]
    InvalidOverride(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_tempo_verifier() {
        let config = VerifyConfig::default();
        assert_eq!(config.base_url(), "https://contracts.tempo.xyz");
        assert_eq!(config.compiler_version, "0.8.22+commit.4fc1097e");
        assert_eq!(config.poll_interval, Duration::from_secs(3));
        assert_eq!(config.max_poll_attempts, 20);
        assert_eq!(config.workers(), 1);
        assert!(!config.dry_run);
        assert_eq!(
            config.source_overrides["FraxProxyAdmin"],
            "contracts/FraxProxyAdmin.sol"
        );
    }

    #[test]
    fn file_overlays_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("verify.toml");
        fs::write(
            &path,
            r#"
verifier_url = "http://localhost:5555/"
max_poll_attempts = 5
concurrency = 0

[overrides]
FraxProxyAdmin = "src/Admin.sol"
MyToken = "src/MyToken.sol"
"#,
        )
        .unwrap();

        let config = VerifyConfig::from_file(&path).unwrap();
        assert_eq!(config.base_url(), "http://localhost:5555");
        assert_eq!(config.max_poll_attempts, 5);
        assert_eq!(config.workers(), 1);
        assert_eq!(config.compiler_version, DEFAULT_COMPILER_VERSION);
        assert_eq!(config.source_overrides["FraxProxyAdmin"], "src/Admin.sol");
        assert_eq!(config.source_overrides["MyToken"], "src/MyToken.sol");
        assert!(config.source_overrides.contains_key("ProxyAdmin"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("verify.toml");
        fs::write(&path, "verifer_url = \"typo\"\n").unwrap();
        assert!(matches!(
            VerifyConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn cli_overrides_are_parsed() {
        let mut config = VerifyConfig::default();
        config
            .add_source_overrides(["Vault = src/vault/Vault.sol"])
            .unwrap();
        assert_eq!(config.source_overrides["Vault"], "src/vault/Vault.sol");

        assert!(matches!(
            config.add_source_overrides(["Vault"]),
            Err(ConfigError::InvalidOverride(_))
        ));
        assert!(matches!(
            config.add_source_overrides(["=src/Vault.sol"]),
            Err(ConfigError::InvalidOverride(_))
        ));
    }
}
