//! Linking options
//!
//! Where to search and what to skip. Options layer in increasing
//! precedence: built-in defaults, the consuming app's `package.json`
//! (`"modlink"` key, with per-platform sub-objects overriding the top
//! level), then CLI flags. A missing manifest or a missing `"modlink"`
//! key means pure defaults; a manifest that exists but cannot be parsed
//! is a configuration error the caller must fix.

use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::platforms::Platform;

const OPTIONS_KEY: &str = "modlink";
const NODE_MODULES_DIR: &str = "node_modules";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("malformed package manifest at {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Effective options for one resolution run.
#[derive(Debug, Clone)]
pub struct LinkingOptions {
    pub project_root: PathBuf,
    /// Search roots in resolution order. The order is load-bearing:
    /// earlier roots shadow later ones on duplicate package names.
    pub search_paths: Vec<PathBuf>,
    /// Package names that never contribute.
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestOptions {
    #[serde(default)]
    search_paths: Option<Vec<String>>,
    #[serde(default)]
    exclude: Vec<String>,
    android: Option<PlatformOverrides>,
    apple: Option<PlatformOverrides>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlatformOverrides {
    search_paths: Option<Vec<String>>,
    #[serde(default)]
    exclude: Vec<String>,
}

impl LinkingOptions {
    /// Loads and merges options for `platform`.
    ///
    /// `cli_search_paths` and `cli_exclude` come from command-line flags
    /// and take precedence over (respectively union with) everything the
    /// manifest declares.
    pub async fn load(
        project_root: &Path,
        platform: Platform,
        cli_search_paths: Vec<PathBuf>,
        cli_exclude: Vec<String>,
    ) -> Result<Self, ConfigError> {
        let manifest = read_manifest_options(project_root).await?;

        let platform_overrides = manifest.as_ref().and_then(|options| match platform {
            Platform::Android => options.android.clone(),
            Platform::Apple => options.apple.clone(),
        });

        let manifest_search_paths = platform_overrides
            .as_ref()
            .and_then(|overrides| overrides.search_paths.clone())
            .or_else(|| {
                manifest
                    .as_ref()
                    .and_then(|options| options.search_paths.clone())
            });

        let search_paths = if !cli_search_paths.is_empty() {
            cli_search_paths
        } else if let Some(paths) = manifest_search_paths {
            paths.iter().map(|p| project_root.join(p)).collect()
        } else {
            default_search_paths(project_root)
        };

        let mut exclude = cli_exclude;
        if let Some(options) = &manifest {
            exclude.extend(options.exclude.iter().cloned());
        }
        if let Some(overrides) = &platform_overrides {
            exclude.extend(overrides.exclude.iter().cloned());
        }
        exclude.dedup();

        Ok(Self {
            project_root: project_root.to_path_buf(),
            search_paths,
            exclude,
        })
    }
}

async fn read_manifest_options(
    project_root: &Path,
) -> Result<Option<ManifestOptions>, ConfigError> {
    let manifest_path = project_root.join("package.json");
    let contents = match tokio::fs::read_to_string(&manifest_path).await {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %manifest_path.display(), "no project manifest, using defaults");
            return Ok(None);
        }
        Err(err) => {
            return Err(ConfigError::Io {
                path: manifest_path,
                source: err,
            })
        }
    };

    let manifest: serde_json::Value =
        serde_json::from_str(&contents).map_err(|source| ConfigError::Manifest {
            path: manifest_path.clone(),
            source,
        })?;

    match manifest.get(OPTIONS_KEY) {
        None => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|source| ConfigError::Manifest {
                path: manifest_path,
                source,
            }),
    }
}

/// Nearest `node_modules` directory walking up from the project root.
/// Falls back to `<project_root>/node_modules` when none exists yet.
fn default_search_paths(project_root: &Path) -> Vec<PathBuf> {
    let mut dir = Some(project_root);
    while let Some(current) = dir {
        let candidate = current.join(NODE_MODULES_DIR);
        if candidate.is_dir() {
            return vec![candidate];
        }
        dir = current.parent();
    }
    vec![project_root.join(NODE_MODULES_DIR)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    async fn load(
        root: &Path,
        platform: Platform,
        cli_paths: Vec<PathBuf>,
        cli_exclude: Vec<String>,
    ) -> LinkingOptions {
        LinkingOptions::load(root, platform, cli_paths, cli_exclude)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn defaults_to_nearest_node_modules() {
        let dir = TempDir::new().unwrap();
        let app = dir.path().join("apps/mobile");
        fs::create_dir_all(&app).unwrap();
        fs::create_dir_all(dir.path().join(NODE_MODULES_DIR)).unwrap();

        let options = load(&app, Platform::Android, Vec::new(), Vec::new()).await;
        assert_eq!(
            options.search_paths,
            vec![dir.path().join(NODE_MODULES_DIR)]
        );
    }

    #[tokio::test]
    async fn manifest_options_override_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{
              "name": "app",
              "modlink": {
                "searchPaths": ["vendor/modules"],
                "exclude": ["pkg-skipped"]
              }
            }"#,
        )
        .unwrap();

        let options = load(dir.path(), Platform::Android, Vec::new(), Vec::new()).await;
        assert_eq!(
            options.search_paths,
            vec![dir.path().join("vendor/modules")]
        );
        assert_eq!(options.exclude, vec!["pkg-skipped"]);
    }

    #[tokio::test]
    async fn platform_overrides_beat_top_level_options() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{
              "modlink": {
                "searchPaths": ["shared"],
                "apple": { "searchPaths": ["apple-only"], "exclude": ["pkg-android-impl"] }
              }
            }"#,
        )
        .unwrap();

        let apple = load(dir.path(), Platform::Apple, Vec::new(), Vec::new()).await;
        assert_eq!(apple.search_paths, vec![dir.path().join("apple-only")]);
        assert_eq!(apple.exclude, vec!["pkg-android-impl"]);

        let android = load(dir.path(), Platform::Android, Vec::new(), Vec::new()).await;
        assert_eq!(android.search_paths, vec![dir.path().join("shared")]);
    }

    #[tokio::test]
    async fn cli_flags_take_precedence() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{ "modlink": { "searchPaths": ["from-manifest"], "exclude": ["a"] } }"#,
        )
        .unwrap();

        let options = load(
            dir.path(),
            Platform::Android,
            vec![PathBuf::from("/cli/path")],
            vec!["b".to_string()],
        )
        .await;
        assert_eq!(options.search_paths, vec![PathBuf::from("/cli/path")]);
        // CLI excludes union with manifest excludes.
        assert_eq!(options.exclude, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn malformed_manifest_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), "{ nope").unwrap();

        let err = LinkingOptions::load(dir.path(), Platform::Android, Vec::new(), Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::Manifest { .. }));
    }
}
