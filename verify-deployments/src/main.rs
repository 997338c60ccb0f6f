// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! CLI for `verify-deployments`.

use std::{path::PathBuf, process::ExitCode};

use clap::{error::ErrorKind, Parser};
use eyre::Context;
use verify_tools::core::{config::VerifyConfig, orchestrator::cancellation};

use crate::{
    common_args::{ProjectArgs, RunArgs, VerifierArgs},
    error::{CliError, CliResult},
};

mod common_args;
mod constants;
mod error;
mod utils;

#[derive(Debug, Parser)]
#[command(name = "verify-deployments")]
#[command(author = "Offchain Labs, Inc.")]
#[command(about = "Verify every contract deployed by a Foundry broadcast", long_about = None)]
#[command(version)]
struct Args {
    /// Broadcast file, e.g. broadcast/Deploy.s.sol/42431/run-latest.json
    broadcast_file: PathBuf,

    #[command(flatten)]
    verifier: VerifierArgs,
    #[command(flatten)]
    project: ProjectArgs,
    #[command(flatten)]
    run: RunArgs,

    /// Whether to print debug info.
    #[arg(long, short)]
    verbose: bool,
}

impl Args {
    /// Defaults, overlaid by the config file, overlaid by flags.
    fn config(&self) -> CliResult<VerifyConfig> {
        let mut config = self.project.load_config()?;
        self.verifier.apply(&mut config);
        self.run.apply(&mut config);
        config.verbose = self.verbose;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    let log_level = if args.verbose {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    simple_logger::init_with_level(log_level).expect("setting up logger");

    // Build async runtime and block on the run
    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(Into::into)
        .and_then(|rt| rt.block_on(exec(args)));

    // Report any error and return proper exit code
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            utils::print_error(&err);
            err.exit_code()
        }
    }
}

async fn exec(args: Args) -> CliResult {
    let config = args.config()?;
    let (handle, cancel) = cancellation();
    utils::cancel_on_signal(handle, args.run.timeout());

    let report = verify_tools::ops::verify_deployments(
        &args.broadcast_file,
        args.verifier.chain_id,
        config,
        &cancel,
    )
    .await?;

    if let Some(path) = &args.run.report {
        report
            .write_json(path)
            .wrap_err_with(|| format!("failed to write report to {}", path.display()))?;
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::unverified(&report.summary))
    }
}
