// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::path::Path;

use crate::{
    core::{
        artifact::ForgeArtifactBuilder,
        client::VerificationClient,
        config::VerifyConfig,
        manifest::{DeploymentManifest, ManifestError},
        orchestrator::{Cancellation, Orchestrator},
        report::VerificationReport,
        source::SourceResolver,
    },
    utils::{color::Color, sys},
};

/// Verify every contract deployed by a broadcast manifest and print the report.
///
/// Returns an error only for problems that stop the whole run. Per-contract failures are in the
/// returned report.
pub async fn verify_deployments(
    manifest_path: impl AsRef<Path>,
    chain_override: Option<u64>,
    config: VerifyConfig,
    cancel: &Cancellation,
) -> crate::Result<VerificationReport> {
    let manifest = DeploymentManifest::load(manifest_path)?;
    let chain_id = manifest.chain_id(chain_override)?;
    let deployments = manifest.deployments()?;
    if deployments.is_empty() {
        return Err(ManifestError::NoDeployments.into());
    }

    greyln!("manifest: {}", manifest.path().display());
    greyln!("chain id: {chain_id}");
    greyln!("verifier: {}", config.base_url());
    greyln!("compiler: {}", config.compiler_version);
    if config.dry_run {
        println!("{}", "mode: dry run (requests are generated, not submitted)".yellow());
    } else {
        greyln!("mode: submit");
    }
    mintln!("Found {} contracts to verify", deployments.len());

    if !sys::command_exists(&config.forge) {
        warn!(@yellow, "{} not found, standard JSON input cannot be generated", config.forge.display());
    }

    let orchestrator = Orchestrator::builder()
        .service(VerificationClient::new(&config)?)
        .resolver(SourceResolver::new(&config))
        .artifacts(ForgeArtifactBuilder::new(&config))
        .config(config)
        .build();
    let report = orchestrator.run(chain_id, &deployments, cancel).await;

    println!();
    print!("{}", report.render(orchestrator.config().verbose));
    Ok(report)
}
