//! Resolution pipeline
//!
//! Orchestrates one resolve run: discover package revisions, fan each one
//! out to the platform's descriptor builder through the bounded task
//! runner, and collect the contributions in discovery order. A fatal
//! error in any package aborts the whole run; a partially resolved module
//! list must never reach the code generator.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::LinkingOptions;
use crate::discovery::{discover_revisions, DiscoveryError};
use crate::fs::ScanError;
use crate::platforms::{ModuleDescriptor, Platform};
use crate::task;
use crate::task::memoize::MemoScope;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("failed to read {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

impl ResolveError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Shared state for one resolve run. Dropped when the run finishes, so
/// nothing cached here can leak into a later invocation.
#[derive(Default)]
pub struct ResolveContext {
    /// Native-class scan results keyed by source directory. Projects that
    /// share a source tree (or a package reached for both platforms in
    /// one process) scan each directory once.
    pub source_scans: MemoScope<PathBuf, Vec<String>>,
}

impl ResolveContext {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Resolves the full module descriptor list for `platform`.
///
/// The returned order is discovery order (search roots in caller order,
/// sorted entries within a root, first duplicate wins). Registration
/// order matters to the consuming runtime, so it is never re-sorted.
pub async fn resolve_modules(
    options: &LinkingOptions,
    platform: Platform,
) -> Result<Vec<ModuleDescriptor>, ResolveError> {
    let revisions = discover_revisions(options).await?;
    debug!(
        platform = %platform,
        candidates = revisions.len(),
        "resolving platform descriptors"
    );

    let resolver = platform.resolver();
    let context = ResolveContext::new();
    let resolved = task::run_all(revisions, |revision| {
        let resolver = &resolver;
        let context = &context;
        async move { resolver.resolve_package(&revision, context).await }
    })
    .await?;

    let descriptors: Vec<ModuleDescriptor> = resolved.into_iter().flatten().collect();
    info!(
        platform = %platform,
        modules = descriptors.len(),
        "module resolution finished"
    );
    Ok(descriptors)
}
