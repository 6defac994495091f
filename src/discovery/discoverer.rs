//! Package graph discovery
//!
//! Walks the dependency installation tree from one or more search roots
//! and produces the ordered list of packages that declare a module
//! config. Roots are visited in caller-supplied order; entries within a
//! root are visited in sorted order so that discovery order (and with it
//! the generated registration order) is stable across runs. The first
//! occurrence of a package name wins; later occurrences from other roots
//! are shadowed.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::LinkingOptions;
use crate::discovery::module_config::{ModuleConfig, MODULE_CONFIG_FILE_NAME};
use crate::discovery::package::{PackageManifest, PackageRevision};
use crate::task;

pub const PACKAGE_MANIFEST_FILE_NAME: &str = "package.json";

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to read {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("malformed package manifest at {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("malformed module config at {}: {source}", path.display())]
    ModuleConfig {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl DiscoveryError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Discovers all module-config-bearing packages under the configured
/// search roots, deduplicated by package name (first root wins).
pub async fn discover_revisions(
    options: &LinkingOptions,
) -> Result<Vec<PackageRevision>, DiscoveryError> {
    let mut candidates = Vec::new();
    for root in &options.search_paths {
        if !root.is_dir() {
            debug!(root = %root.display(), "search root does not exist, skipping");
            continue;
        }
        collect_candidate_dirs(root, &mut candidates).await?;
    }

    // Candidate loading is pure I/O (two file reads per package), so it
    // fans out through the task runner; input order is preserved, which
    // keeps the dedup pass deterministic.
    let loaded = task::run_all(candidates, |dir| {
        let exclude = &options.exclude;
        async move { load_revision(&dir, exclude).await }
    })
    .await?;

    let mut seen: HashMap<String, String> = HashMap::new();
    let mut revisions = Vec::new();
    for revision in loaded.into_iter().flatten() {
        if let Some(kept_version) = seen.get(&revision.name) {
            if *kept_version != revision.version {
                warn!(
                    package = %revision.name,
                    kept = %kept_version,
                    shadowed = %revision.version,
                    "duplicate package resolved from a later search root, keeping the first occurrence"
                );
            }
            continue;
        }
        seen.insert(revision.name.clone(), revision.version.clone());
        revisions.push(revision);
    }

    debug!(count = revisions.len(), "discovered module packages");
    Ok(revisions)
}

/// Collects package directories directly under `root`, descending one
/// extra level into scope directories (`@org/name`). Entries are sorted
/// per directory.
async fn collect_candidate_dirs(
    root: &Path,
    candidates: &mut Vec<PathBuf>,
) -> Result<(), DiscoveryError> {
    for entry in sorted_subdirs(root).await? {
        let name = entry
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if name.starts_with('.') {
            continue;
        }
        if name.starts_with('@') {
            for scoped in sorted_subdirs(&entry).await? {
                candidates.push(scoped);
            }
        } else {
            candidates.push(entry);
        }
    }
    Ok(())
}

async fn sorted_subdirs(dir: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    let mut read_dir = tokio::fs::read_dir(dir)
        .await
        .map_err(|err| DiscoveryError::io(dir, err))?;

    let mut subdirs = Vec::new();
    while let Some(entry) = read_dir
        .next_entry()
        .await
        .map_err(|err| DiscoveryError::io(dir, err))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|err| DiscoveryError::io(&entry.path(), err))?;
        if file_type.is_dir() {
            subdirs.push(entry.path());
        }
    }
    subdirs.sort();
    Ok(subdirs)
}

/// Loads a candidate directory into a revision.
///
/// Missing `package.json` or missing module config means the directory
/// contributes nothing (`None`). Excluded packages bail out after the
/// cheap manifest read, before their module config is touched. A
/// manifest or config that exists but fails to parse is a configuration
/// error and aborts the run.
async fn load_revision(
    dir: &Path,
    exclude: &[String],
) -> Result<Option<PackageRevision>, DiscoveryError> {
    let manifest_path = dir.join(PACKAGE_MANIFEST_FILE_NAME);
    let config_path = dir.join(MODULE_CONFIG_FILE_NAME);
    if !manifest_path.is_file() || !config_path.is_file() {
        return Ok(None);
    }

    let manifest_raw = tokio::fs::read_to_string(&manifest_path)
        .await
        .map_err(|err| DiscoveryError::io(&manifest_path, err))?;
    let manifest: PackageManifest =
        serde_json::from_str(&manifest_raw).map_err(|source| DiscoveryError::Manifest {
            path: manifest_path.clone(),
            source,
        })?;

    if exclude.iter().any(|name| *name == manifest.name) {
        debug!(package = %manifest.name, "package excluded by configuration");
        return Ok(None);
    }

    let config_raw = tokio::fs::read_to_string(&config_path)
        .await
        .map_err(|err| DiscoveryError::io(&config_path, err))?;
    let config = ModuleConfig::parse(&config_raw).map_err(|source| DiscoveryError::ModuleConfig {
        path: config_path.clone(),
        source,
    })?;

    Ok(Some(PackageRevision {
        name: manifest.name,
        version: manifest.version.unwrap_or_else(|| "unknown".to_string()),
        path: dir.to_path_buf(),
        config: Some(config),
    }))
}
