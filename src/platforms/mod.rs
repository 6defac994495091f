//! Platform descriptor builders
//!
//! One resolver per target platform, behind a common trait so the
//! pipeline can fan packages out without caring which platform it is
//! building for. A resolver returns `None` when a package contributes
//! nothing to its platform; that is a valid terminal state, not an
//! error, and it keeps the aggregate list free of no-op entries.

pub mod android;
pub mod apple;

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::discovery::module_config::{AarProject, GradlePlugin, MavenPublication};
use crate::discovery::PackageRevision;
use crate::resolver::{ResolveContext, ResolveError};

pub use android::AndroidResolver;
pub use apple::AppleResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Apple,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Apple => "apple",
        }
    }

    pub fn resolver(&self) -> Box<dyn PlatformResolver> {
        match self {
            Platform::Android => Box::new(AndroidResolver),
            Platform::Apple => Box::new(AppleResolver),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds the platform-specific descriptor for one package revision.
#[async_trait]
pub trait PlatformResolver: Send + Sync {
    fn platform(&self) -> Platform;

    async fn resolve_package(
        &self,
        revision: &PackageRevision,
        context: &ResolveContext,
    ) -> Result<Option<ModuleDescriptor>, ResolveError>;
}

/// The resolved, platform-specific summary of what one package
/// contributes to a native build.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ModuleDescriptor {
    Android(AndroidDescriptor),
    Apple(AppleDescriptor),
}

impl ModuleDescriptor {
    pub fn package_name(&self) -> &str {
        match self {
            ModuleDescriptor::Android(descriptor) => &descriptor.package_name,
            ModuleDescriptor::Apple(descriptor) => &descriptor.package_name,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AndroidDescriptor {
    pub package_name: String,
    pub projects: Vec<AndroidProject>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<GradlePlugin>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub core_features: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AndroidProject {
    pub name: String,
    pub source_dir: PathBuf,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub modules: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<String>,
    /// Fully-qualified native package classes discovered by source
    /// scanning, sorted for output stability.
    pub packages: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aar_projects: Vec<AarProject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_use_publication_script_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication: Option<MavenPublication>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppleDescriptor {
    pub package_name: String,
    pub pods: Vec<ApplePod>,
    pub swift_module_names: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub modules: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub app_delegate_subscribers: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub react_delegate_handlers: Vec<String>,
    pub debug_only: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub core_features: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplePod {
    pub pod_name: String,
    pub podspec_dir: PathBuf,
}
