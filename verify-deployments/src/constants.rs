// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

/// Config file picked up from the project root when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "verify.toml";
