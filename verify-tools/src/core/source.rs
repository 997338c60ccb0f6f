// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Map deployed contract names to their Solidity sources.

use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
};

use glob::Pattern;
use serde::{Serialize, Serializer};

use crate::core::config::VerifyConfig;

/// Fully qualified contract identifier in forge's `path/to/File.sol:Name` form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceIdentifier {
    pub path: String,
    pub contract_name: String,
}

impl SourceIdentifier {
    pub fn new(path: impl Into<String>, contract_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contract_name: contract_name.into(),
        }
    }
}

impl fmt::Display for SourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.contract_name)
    }
}

impl Serialize for SourceIdentifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub trait ResolveSource {
    #[allow(async_fn_in_trait)]
    async fn resolve(&self, contract_name: &str) -> Option<SourceIdentifier>;
}

/// Resolves sources from an override table, then by searching the project for `<Name>.sol`.
#[derive(Debug)]
pub struct SourceResolver {
    overrides: BTreeMap<String, String>,
    project_root: PathBuf,
    search_dirs: Vec<PathBuf>,
}

impl SourceResolver {
    pub fn new(config: &VerifyConfig) -> Self {
        Self {
            overrides: config.source_overrides.clone(),
            project_root: config.project_root.clone(),
            search_dirs: config.search_dirs.clone(),
        }
    }
}

impl ResolveSource for SourceResolver {
    async fn resolve(&self, contract_name: &str) -> Option<SourceIdentifier> {
        // Overrides may use remappings, so they are not checked against the filesystem.
        if let Some(path) = self.overrides.get(contract_name) {
            return Some(SourceIdentifier::new(path.clone(), contract_name));
        }

        // Walking `lib/` can take a while; keep it off the runtime threads.
        let project_root = self.project_root.clone();
        let search_dirs = self.search_dirs.clone();
        let name = contract_name.to_owned();
        let path = match tokio::task::spawn_blocking(move || {
            search(&project_root, &search_dirs, &name)
        })
        .await
        {
            Ok(path) => path?,
            Err(err) => {
                warn!(@yellow, "{contract_name}: source search failed: {err}");
                return None;
            }
        };
        Some(SourceIdentifier::new(path, contract_name))
    }
}

/// Find `<Name>.sol` under the search dirs, as a path relative to the project root.
fn search(project_root: &Path, search_dirs: &[PathBuf], contract_name: &str) -> Option<String> {
    let file_name = format!("{}.sol", Pattern::escape(contract_name));
    search_dirs
        .iter()
        .map(|dir| project_root.join(dir))
        .filter(|dir| dir.is_dir())
        .find_map(|dir| {
            let pattern = format!(
                "{}/**/{file_name}",
                Pattern::escape(&dir.to_string_lossy())
            );
            glob::glob(&pattern).ok()?.flatten().find(|path| path.is_file())
        })
        .map(|found| {
            // Paths are handed to forge relative to the project root.
            found
                .strip_prefix(project_root)
                .unwrap_or(&found)
                .to_string_lossy()
                .replace('\\', "/")
        })
}
