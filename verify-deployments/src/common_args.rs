// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::{path::PathBuf, time::Duration};

use verify_tools::core::config::{ConfigError, VerifyConfig};

use crate::constants::DEFAULT_CONFIG_FILE;

#[derive(Debug, clap::Args)]
pub struct VerifierArgs {
    /// Base URL of the verification service [default: https://contracts.tempo.xyz]
    #[arg(long)]
    pub verifier_url: Option<String>,
    /// Full solc version used to compile the contracts [default: 0.8.22+commit.4fc1097e]
    #[arg(long = "compiler", value_name = "VERSION")]
    pub compiler_version: Option<String>,
    /// Chain id to verify on, instead of the one in the broadcast path
    #[arg(long)]
    pub chain_id: Option<u64>,
    /// Seconds to wait before each verification status check [default: 3]
    #[arg(long, value_name = "SECS")]
    pub poll_interval: Option<u64>,
    /// Status checks before a submitted contract is left pending [default: 20]
    #[arg(long)]
    pub max_poll_attempts: Option<u32>,
    /// Timeout for each request to the verification service, in seconds [default: 30]
    #[arg(long, value_name = "SECS")]
    pub request_timeout: Option<u64>,
}

impl VerifierArgs {
    pub fn apply(&self, config: &mut VerifyConfig) {
        if let Some(url) = &self.verifier_url {
            config.verifier_url = url.clone();
        }
        if let Some(version) = &self.compiler_version {
            config.compiler_version = version.clone();
        }
        if let Some(secs) = self.poll_interval {
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(attempts) = self.max_poll_attempts {
            config.max_poll_attempts = attempts;
        }
        if let Some(secs) = self.request_timeout {
            config.request_timeout = Duration::from_secs(secs);
        }
    }
}

#[derive(Debug, clap::Args)]
pub struct ProjectArgs {
    /// Foundry project root, where forge runs and sources are searched for
    #[arg(long)]
    pub root: Option<PathBuf>,
    /// Source path for a contract, as `Name=path/to/File.sol` (repeatable)
    #[arg(long = "source", value_name = "NAME=PATH")]
    pub sources: Vec<String>,
    /// Config file [default: verify.toml in the project root, if present]
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// forge executable used to generate standard JSON input
    #[arg(long)]
    pub forge: Option<PathBuf>,
}

impl ProjectArgs {
    /// Load the config file, then apply project flags on top.
    pub fn load_config(&self) -> Result<VerifyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => VerifyConfig::from_file(path)?,
            None => {
                let root = self.root.clone().unwrap_or_else(|| PathBuf::from("."));
                let default = root.join(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    log::debug!("using config file {}", default.display());
                    VerifyConfig::from_file(default)?
                } else {
                    VerifyConfig::default()
                }
            }
        };
        if let Some(root) = &self.root {
            config.project_root = root.clone();
        }
        if let Some(forge) = &self.forge {
            config.forge = forge.clone();
        }
        config.add_source_overrides(self.sources.iter().map(String::as_str))?;
        Ok(config)
    }
}

#[derive(Debug, clap::Args)]
pub struct RunArgs {
    /// Generate verification requests without submitting them
    #[arg(long)]
    pub dry_run: bool,
    /// Number of contracts to verify at the same time [default: 1]
    #[arg(long, short)]
    pub jobs: Option<usize>,
    /// Stop after this many seconds and report what is done
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
    /// Write the report as JSON to this file
    #[arg(long, value_parser = report_path)]
    pub report: Option<PathBuf>,
    /// Directory to save generated verification requests in
    #[arg(long, value_name = "DIR")]
    pub save_requests: Option<PathBuf>,
}

impl RunArgs {
    pub fn apply(&self, config: &mut VerifyConfig) {
        config.dry_run |= self.dry_run;
        if let Some(jobs) = self.jobs {
            config.concurrency = jobs;
        }
        if let Some(dir) = &self.save_requests {
            config.save_requests = Some(dir.clone());
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}

/// Progress and the human-readable report go to stdout, so the JSON report needs a file.
fn report_path(arg: &str) -> Result<PathBuf, String> {
    if arg == "-" {
        return Err("the JSON report cannot be written to stdout; give a file path".to_owned());
    }
    Ok(PathBuf::from(arg))
}
