//! Resolved package candidates

use std::path::PathBuf;

use serde::Deserialize;

use crate::discovery::module_config::ModuleConfig;

/// The subset of a package manifest (`package.json`) the engine needs.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageManifest {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// One resolved occurrence of a package considered during a single run.
///
/// Created by the discoverer and immutable afterwards; within a run a
/// package name maps to exactly one revision (first search root wins).
#[derive(Debug, Clone)]
pub struct PackageRevision {
    pub name: String,
    pub version: String,
    pub path: PathBuf,
    pub config: Option<ModuleConfig>,
}

impl PackageRevision {
    /// Project/pod name derived from the package name when the config
    /// declares none: scope marker dropped, separators flattened.
    pub fn default_project_name(&self) -> String {
        self.name.trim_start_matches('@').replace('/', "-")
    }
}
