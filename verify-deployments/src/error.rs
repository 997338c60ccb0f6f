// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::fmt;
use std::process::ExitCode;

use verify_tools::core::report::Summary;

pub type CliResult<T = ()> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    error: eyre::Error,
    exit_code: ExitCode,
}

impl CliError {
    /// The run completed but not every contract ended up verified.
    pub fn unverified(summary: &Summary) -> Self {
        let unverified = summary.failed + summary.pending + summary.skipped;
        Self {
            error: eyre::eyre!(
                "{unverified} of {} contracts not verified ({} failed, {} pending, {} skipped)",
                summary.total,
                summary.failed,
                summary.pending,
                summary.skipped
            ),
            exit_code: ExitCode::FAILURE,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        self.exit_code
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self {
            error: err.into(),
            exit_code: ExitCode::FAILURE,
        }
    }
}

impl From<eyre::Error> for CliError {
    fn from(error: eyre::Error) -> Self {
        Self {
            error,
            exit_code: ExitCode::FAILURE,
        }
    }
}

impl From<verify_tools::Error> for CliError {
    fn from(err: verify_tools::Error) -> Self {
        Self {
            error: err.into(),
            exit_code: ExitCode::FAILURE,
        }
    }
}

impl From<verify_tools::core::config::ConfigError> for CliError {
    fn from(err: verify_tools::core::config::ConfigError) -> Self {
        Self {
            error: err.into(),
            exit_code: ExitCode::FAILURE,
        }
    }
}
