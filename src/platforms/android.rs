//! Android descriptor builder
//!
//! A package contributes to the Android build through Gradle-visible
//! sub-projects and/or Gradle plugins. Projects come from the module
//! config, falling back to a single default project at
//! `<package>/android`, but the fallback only counts if that directory
//! holds a recognizable Gradle build file. Each project's sources are
//! scanned for native package classes to register; the scan accumulates
//! in traversal order and is sorted at the end so identical sources
//! always produce identical descriptor output.

use std::path::Path;

use async_trait::async_trait;
use regex::Regex;
use tracing::trace;

use crate::discovery::PackageRevision;
use crate::fs::{scan_matching, ScanError};
use crate::platforms::{
    AndroidDescriptor, AndroidProject, ModuleDescriptor, Platform, PlatformResolver,
};
use crate::resolver::{ResolveContext, ResolveError};

/// Import that marks a source file as declaring a native package class.
const PACKAGE_MARKER: &str = "dev.modlink.core.ModulePackage";

const GRADLE_BUILD_FILES: &[&str] = &["build.gradle", "build.gradle.kts"];

/// Directories that never hold registrable sources.
const SOURCE_EXCLUDE_DIRS: &[&str] = &["build", ".gradle", ".cxx", "generated"];

pub struct AndroidResolver;

#[async_trait]
impl PlatformResolver for AndroidResolver {
    fn platform(&self) -> Platform {
        Platform::Android
    }

    async fn resolve_package(
        &self,
        revision: &PackageRevision,
        context: &ResolveContext,
    ) -> Result<Option<ModuleDescriptor>, ResolveError> {
        let Some(config) = &revision.config else {
            return Ok(None);
        };
        if !config.supports_platform(Platform::Android) {
            return Ok(None);
        }

        let plugins = config.android_gradle_plugins();
        let aar_projects = config.android_aar_projects();
        let specs = config.android_projects(&revision.default_project_name(), &revision.path);

        let mut projects = Vec::new();
        for (index, spec) in specs.into_iter().enumerate() {
            if spec.is_default && !has_gradle_build_file(&spec.source_dir).await {
                trace!(
                    package = %revision.name,
                    dir = %spec.source_dir.display(),
                    "no Gradle build file, default project skipped"
                );
                continue;
            }

            let packages = context
                .source_scans
                .get_or_compute(spec.source_dir.clone(), || {
                    scan_package_classes(spec.source_dir.clone())
                })
                .await?;

            projects.push(AndroidProject {
                name: spec.name,
                source_dir: spec.source_dir,
                modules: spec.modules,
                services: spec.services,
                packages,
                // Precompiled AAR artifacts ride along with the package's
                // primary project.
                aar_projects: if index == 0 {
                    aar_projects.clone()
                } else {
                    Vec::new()
                },
                should_use_publication_script_path: spec.should_use_publication_script_path,
                publication: spec.publication,
            });
        }

        // A package with plugins but no projects still contributes:
        // plugins apply to the consuming build as a whole. Neither means
        // no Android contribution at all.
        if projects.is_empty() && plugins.is_empty() {
            return Ok(None);
        }

        Ok(Some(ModuleDescriptor::Android(AndroidDescriptor {
            package_name: revision.name.clone(),
            projects,
            plugins,
            core_features: config.core_features(),
        })))
    }
}

async fn has_gradle_build_file(source_dir: &Path) -> bool {
    for build_file in GRADLE_BUILD_FILES {
        if tokio::fs::try_exists(source_dir.join(build_file))
            .await
            .unwrap_or(false)
        {
            return true;
        }
    }
    false
}

/// Scans `source_dir` for Java/Kotlin files declaring a native package
/// class and returns their fully-qualified names, sorted and deduplicated.
async fn scan_package_classes(source_dir: std::path::PathBuf) -> Result<Vec<String>, ScanError> {
    if !source_dir.is_dir() {
        return Ok(Vec::new());
    }

    let file_pattern = Regex::new(r"\.(java|kt)$").unwrap();
    let package_decl = Regex::new(r"(?m)^\s*package\s+([A-Za-z_][A-Za-z0-9_.]*)").unwrap();
    let class_decl = Regex::new(r"\bclass\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap();

    let mut classes = scan_matching(
        &source_dir,
        &file_pattern,
        SOURCE_EXCLUDE_DIRS,
        |_, contents| {
            if !contents.contains(PACKAGE_MARKER) {
                return None;
            }
            let namespace = package_decl.captures(contents)?.get(1)?.as_str();
            let class_name = class_decl.captures(contents)?.get(1)?.as_str();
            Some(format!("{namespace}.{class_name}"))
        },
    )
    .await?;

    classes.sort();
    classes.dedup();
    Ok(classes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::ModuleConfig;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn revision_with_config(path: PathBuf, name: &str, config_json: &str) -> PackageRevision {
        PackageRevision {
            name: name.to_string(),
            version: "1.0.0".to_string(),
            path,
            config: Some(ModuleConfig::parse(config_json).unwrap()),
        }
    }

    fn write_package_class(dir: &Path, file: &str, namespace: &str, class: &str) {
        let path = dir.join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            path,
            format!(
                "package {namespace}\n\nimport {PACKAGE_MARKER}\n\nclass {class} : ModulePackage()\n"
            ),
        )
        .unwrap();
    }

    async fn resolve(revision: &PackageRevision) -> Option<ModuleDescriptor> {
        let context = ResolveContext::new();
        AndroidResolver
            .resolve_package(revision, &context)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn default_project_requires_gradle_build_file() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("android")).unwrap();
        // No build.gradle: the package has an android directory but no
        // recognizable Gradle project.
        let revision = revision_with_config(dir.path().to_path_buf(), "pkg-a", "{}");

        assert!(resolve(&revision).await.is_none());
    }

    #[tokio::test]
    async fn discovers_sorted_package_classes() {
        let dir = TempDir::new().unwrap();
        let android = dir.path().join("android");
        fs::create_dir_all(&android).unwrap();
        fs::write(android.join("build.gradle"), "apply plugin: 'module'").unwrap();
        write_package_class(&android, "src/main/java/com/b/BPackage.kt", "com.b", "BPackage");
        write_package_class(&android, "src/main/java/com/a/APackage.kt", "com.a", "APackage");

        let revision = revision_with_config(dir.path().to_path_buf(), "pkg-a", "{}");
        let descriptor = resolve(&revision).await.unwrap();

        let ModuleDescriptor::Android(android_descriptor) = descriptor else {
            panic!("expected android descriptor");
        };
        assert_eq!(android_descriptor.projects.len(), 1);
        assert_eq!(
            android_descriptor.projects[0].packages,
            vec!["com.a.APackage", "com.b.BPackage"]
        );
    }

    #[tokio::test]
    async fn files_without_marker_are_ignored() {
        let dir = TempDir::new().unwrap();
        let android = dir.path().join("android");
        fs::create_dir_all(android.join("src")).unwrap();
        fs::write(android.join("build.gradle.kts"), "plugins {}").unwrap();
        fs::write(
            android.join("src/Helper.kt"),
            "package com.a\n\nclass Helper\n",
        )
        .unwrap();

        let revision = revision_with_config(dir.path().to_path_buf(), "pkg-a", "{}");
        let descriptor = resolve(&revision).await.unwrap();

        let ModuleDescriptor::Android(android_descriptor) = descriptor else {
            panic!("expected android descriptor");
        };
        assert!(android_descriptor.projects[0].packages.is_empty());
    }

    #[tokio::test]
    async fn build_output_dirs_are_not_scanned() {
        let dir = TempDir::new().unwrap();
        let android = dir.path().join("android");
        fs::create_dir_all(&android).unwrap();
        fs::write(android.join("build.gradle"), "").unwrap();
        write_package_class(&android, "src/com/a/APackage.kt", "com.a", "APackage");
        write_package_class(&android, "build/com/gen/GenPackage.kt", "com.gen", "GenPackage");

        let revision = revision_with_config(dir.path().to_path_buf(), "pkg-a", "{}");
        let descriptor = resolve(&revision).await.unwrap();

        let ModuleDescriptor::Android(android_descriptor) = descriptor else {
            panic!("expected android descriptor");
        };
        assert_eq!(android_descriptor.projects[0].packages, vec!["com.a.APackage"]);
    }

    #[tokio::test]
    async fn plugins_only_package_still_contributes() {
        let dir = TempDir::new().unwrap();
        let revision = revision_with_config(
            dir.path().to_path_buf(),
            "pkg-plugin",
            r#"{
              "android": {
                "gradlePlugins": [
                  { "id": "com.pkg.gradle", "group": "com.pkg", "sourceDir": "gradle-plugin" }
                ]
              }
            }"#,
        );

        let descriptor = resolve(&revision).await.unwrap();
        let ModuleDescriptor::Android(android_descriptor) = descriptor else {
            panic!("expected android descriptor");
        };
        assert!(android_descriptor.projects.is_empty());
        assert_eq!(android_descriptor.plugins.len(), 1);
    }

    #[tokio::test]
    async fn platform_gate_excludes_apple_only_packages() {
        let dir = TempDir::new().unwrap();
        let revision = revision_with_config(
            dir.path().to_path_buf(),
            "pkg-apple-only",
            r#"{ "platforms": ["apple"] }"#,
        );

        assert!(resolve(&revision).await.is_none());
    }
}
