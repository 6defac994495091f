//! Apple descriptor builder
//!
//! A package contributes to the Apple build through CocoaPods podspecs.
//! Podspec locations come from the module config when declared, otherwise
//! from a shallow scan of the package root and its immediate
//! subdirectories. A package with no podspec contributes nothing, which
//! is a valid terminal state. Each pod is paired with a Swift module name:
//! the configured one when present, else a deterministic transliteration
//! of the pod name.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::discovery::PackageRevision;
use crate::fs::{DirWalker, ScanError};
use crate::platforms::{
    AppleDescriptor, ApplePod, ModuleDescriptor, Platform, PlatformResolver,
};
use crate::resolver::{ResolveContext, ResolveError};

const PODSPEC_EXTENSION: &str = "podspec";

/// Directories a podspec never lives in.
const PODSPEC_EXCLUDE_DIRS: &[&str] = &["node_modules", "build", ".git"];

pub struct AppleResolver;

#[async_trait]
impl PlatformResolver for AppleResolver {
    fn platform(&self) -> Platform {
        Platform::Apple
    }

    async fn resolve_package(
        &self,
        revision: &PackageRevision,
        _context: &ResolveContext,
    ) -> Result<Option<ModuleDescriptor>, ResolveError> {
        let Some(config) = &revision.config else {
            return Ok(None);
        };
        if !config.supports_platform(Platform::Apple) {
            return Ok(None);
        }

        let declared_dirs = config.apple_podspec_paths();
        let podspecs = if declared_dirs.is_empty() {
            discover_podspecs(&revision.path).await?
        } else {
            let mut found = Vec::new();
            for dir in &declared_dirs {
                found.extend(podspecs_in_dir(&revision.path.join(dir)).await?);
            }
            found
        };

        if podspecs.is_empty() {
            return Ok(None);
        }

        let configured_names = config.apple_swift_module_names();
        let mut pods = Vec::new();
        let mut swift_module_names = Vec::new();
        for (index, podspec) in podspecs.iter().enumerate() {
            let pod_name = podspec
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            swift_module_names.push(
                configured_names
                    .get(index)
                    .cloned()
                    .unwrap_or_else(|| swift_module_name(&pod_name)),
            );
            pods.push(ApplePod {
                pod_name,
                podspec_dir: podspec
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| revision.path.clone()),
            });
        }

        Ok(Some(ModuleDescriptor::Apple(AppleDescriptor {
            package_name: revision.name.clone(),
            pods,
            swift_module_names,
            modules: config.apple_modules(),
            app_delegate_subscribers: config.apple_app_delegate_subscribers(),
            react_delegate_handlers: config.apple_react_delegate_handlers(),
            debug_only: config.apple_debug_only(),
            core_features: config.core_features(),
            flags: config.apple_flags(),
        })))
    }
}

/// Scans the package root and its immediate subdirectories for podspec
/// files, in sorted order.
async fn discover_podspecs(package_root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let files = DirWalker::new(package_root)
        .sorted(true)
        .max_depth(1)
        .exclude(|entry| entry.is_dir && PODSPEC_EXCLUDE_DIRS.contains(&entry.file_name.as_str()))
        .collect_files()
        .await?;

    Ok(files
        .into_iter()
        .map(|entry| entry.path)
        .filter(|path| path.extension().is_some_and(|ext| ext == PODSPEC_EXTENSION))
        .collect())
}

async fn podspecs_in_dir(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let files = DirWalker::new(dir).sorted(true).max_depth(0).collect_files().await?;
    Ok(files
        .into_iter()
        .map(|entry| entry.path)
        .filter(|path| path.extension().is_some_and(|ext| ext == PODSPEC_EXTENSION))
        .collect())
}

/// Derives a Swift-importable module name from a pod name: every
/// non-alphanumeric character becomes an underscore.
fn swift_module_name(pod_name: &str) -> String {
    pod_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
