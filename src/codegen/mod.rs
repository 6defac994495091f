//! Generated registration source
//!
//! Renders the resolved module list into the platform's native language.
//! Rendering is a pure function of the descriptor list and target class
//! name: identical inputs produce byte-identical output, which is what
//! makes repeated builds reproducible. Artifact order mirrors descriptor
//! order because registration order matters to the consuming runtime.

pub mod android;
pub mod apple;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::platforms::{ModuleDescriptor, Platform};

pub const DEFAULT_ANDROID_CLASS_NAME: &str = "ModulePackageList";
pub const DEFAULT_APPLE_CLASS_NAME: &str = "ModlinkModulesProvider";

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("failed to write generated artifact {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Renders the registration source for `platform`.
pub fn generate_source(
    platform: Platform,
    descriptors: &[ModuleDescriptor],
    class_name: &str,
) -> String {
    match platform {
        Platform::Android => android::render(descriptors, class_name),
        Platform::Apple => apple::render(descriptors, class_name),
    }
}

/// Writes a fully rendered artifact to `path`, creating parent
/// directories as needed. The contents are rendered before this is
/// called, so a failed run never leaves a partial artifact behind.
pub async fn write_artifact(path: &Path, contents: &str) -> Result<(), GenerateError> {
    let write = |source| GenerateError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(write)?;
        }
    }
    tokio::fs::write(path, contents).await.map_err(write)
}
