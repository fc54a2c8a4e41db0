//! Compiled contract artifacts.
//!
//! Reads the JSON files a Solidity build leaves in the build directory.
//! Only `contractName` and `bytecode` are used.

use alloy::primitives::Bytes;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ArtifactError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactFile {
    contract_name: String,
    #[serde(default)]
    bytecode: String,
}

/// A deployable contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub bytecode: Bytes,
    pub path: PathBuf,
}

/// Load every deployable artifact in `dir`, ordered by file name.
///
/// Interfaces and abstract contracts (empty bytecode) are skipped.
pub fn load_artifacts(dir: &Path) -> Result<Vec<Artifact>, ArtifactError> {
    let io_err = |source| ArtifactError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(io_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err)?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut artifacts = Vec::with_capacity(paths.len());
    for path in paths {
        if let Some(artifact) = load_artifact(&path)? {
            artifacts.push(artifact);
        }
    }

    tracing::debug!(dir = %dir.display(), count = artifacts.len(), "Loaded artifacts");
    Ok(artifacts)
}

/// Load one artifact. Returns `None` when it has no creation bytecode.
pub fn load_artifact(path: &Path) -> Result<Option<Artifact>, ArtifactError> {
    let content = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: ArtifactFile = serde_json::from_str(&content).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let code = file.bytecode.trim();
    if code.is_empty() || code == "0x" {
        tracing::debug!(contract = %file.contract_name, "Skipping artifact without bytecode");
        return Ok(None);
    }
    if code.contains("__") {
        return Err(ArtifactError::InvalidBytecode {
            contract: file.contract_name,
            reason: "bytecode contains unlinked library placeholders".to_string(),
        });
    }

    let bytecode: Bytes = code.parse().map_err(|e| ArtifactError::InvalidBytecode {
        contract: file.contract_name.clone(),
        reason: format!("{}", e),
    })?;

    Ok(Some(Artifact {
        name: file.contract_name,
        bytecode,
        path: path.to_path_buf(),
    }))
}

/// Keep only the named artifacts, in the order given.
pub fn select_artifacts(artifacts: Vec<Artifact>, names: &[String]) -> Result<Vec<Artifact>, ArtifactError> {
    if names.is_empty() {
        return Ok(artifacts);
    }
    names
        .iter()
        .map(|name| {
            artifacts
                .iter()
                .find(|a| &a.name == name)
                .cloned()
                .ok_or_else(|| ArtifactError::NotFound(name.clone()))
        })
        .collect()
}
