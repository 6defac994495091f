//! Package discovery: graph walk, manifests, module configs

pub mod discoverer;
pub mod module_config;
pub mod package;

pub use discoverer::{discover_revisions, DiscoveryError};
pub use module_config::{AarProject, GradlePlugin, MavenPublication, ModuleConfig};
pub use package::{PackageManifest, PackageRevision};
