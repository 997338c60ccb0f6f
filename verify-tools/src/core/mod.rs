// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

pub mod artifact;
pub mod client;
pub mod config;
pub mod manifest;
pub mod message;
pub mod orchestrator;
pub mod report;
pub mod source;
pub mod verification;

#[cfg(test)]
pub(crate) mod testing;
