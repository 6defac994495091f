//! modlink - native-module autolinking engine
//!
//! modlink discovers which installed packages contribute native
//! (platform) code to an application, resolves per-platform build
//! metadata for each, and generates the registration source consumed by
//! the platform build toolchains. It never installs, builds, or executes
//! native code itself.
//!
//! # Core Concepts
//!
//! - **Discovery**: walking the dependency installation tree from one or
//!   more search roots, collecting every package that declares a module
//!   config. The first occurrence of a package name wins.
//! - **Descriptors**: the platform-specific summary of what one package
//!   contributes to a native build (Gradle projects and plugins, pods,
//!   lifecycle hooks).
//! - **Generation**: deterministic rendering of the descriptor list into
//!   Kotlin / Swift registration source. Identical inputs always produce
//!   byte-identical output.
//!
//! # Example Usage
//!
//! ```ignore
//! use modlink::config::LinkingOptions;
//! use modlink::platforms::Platform;
//! use modlink::{codegen, resolver};
//!
//! async fn generate_android(options: &LinkingOptions) -> anyhow::Result<String> {
//!     let descriptors = resolver::resolve_modules(options, Platform::Android).await?;
//!     Ok(codegen::generate_source(
//!         Platform::Android,
//!         &descriptors,
//!         codegen::DEFAULT_ANDROID_CLASS_NAME,
//!     ))
//! }
//! ```

pub mod cli;
pub mod codegen;
pub mod config;
pub mod dependencies;
pub mod discovery;
pub mod fs;
pub mod platforms;
pub mod resolver;
pub mod task;

pub use config::{ConfigError, LinkingOptions};
pub use discovery::{DiscoveryError, ModuleConfig, PackageRevision};
pub use platforms::{ModuleDescriptor, Platform};
pub use resolver::{resolve_modules, ResolveError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
