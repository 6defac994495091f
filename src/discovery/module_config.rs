//! Declared module configuration
//!
//! Packages opt into autolinking by shipping a `module.config.json` next
//! to their package manifest. The file is an optional-field structure:
//! every accessor here returns an empty or default value when the backing
//! data is absent, so callers never branch on field existence. A file
//! that is present but malformed is a configuration error the package
//! author must fix, and is reported as fatal by the discoverer.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::platforms::Platform;

pub const MODULE_CONFIG_FILE_NAME: &str = "module.config.json";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleConfig {
    /// Platforms the package declares support for. Absent means the
    /// package does not restrict itself.
    platforms: Option<Vec<String>>,
    android: Option<AndroidConfig>,
    apple: Option<AppleConfig>,
    core_features: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AndroidConfig {
    name: Option<String>,
    path: Option<String>,
    #[serde(default)]
    modules: Vec<String>,
    #[serde(default)]
    services: Vec<String>,
    #[serde(default)]
    projects: Vec<AndroidProjectConfig>,
    #[serde(default)]
    gradle_plugins: Vec<GradlePlugin>,
    #[serde(default)]
    gradle_aar_projects: Vec<AarProject>,
    publication: Option<MavenPublication>,
    should_use_publication_script_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AndroidProjectConfig {
    name: Option<String>,
    path: String,
    #[serde(default)]
    modules: Vec<String>,
    #[serde(default)]
    services: Vec<String>,
    publication: Option<MavenPublication>,
    should_use_publication_script_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppleConfig {
    podspec_path: Option<String>,
    #[serde(default)]
    swift_module_names: Vec<String>,
    #[serde(default)]
    modules: Vec<String>,
    #[serde(default)]
    app_delegate_subscribers: Vec<String>,
    #[serde(default)]
    react_delegate_handlers: Vec<String>,
    #[serde(default)]
    debug_only: bool,
    flags: Option<serde_json::Value>,
}

/// A Gradle plugin a package asks the consuming build to apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradlePlugin {
    pub id: String,
    pub group: String,
    pub source_dir: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apply_to_root_project: Option<bool>,
}

/// A precompiled AAR artifact exposed as its own Gradle sub-project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AarProject {
    pub name: String,
    pub aar_file_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MavenPublication {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A Gradle-visible project candidate derived from config (or from the
/// default-project fallback). Whether it actually contributes is decided
/// by the Android resolver, which checks for a build file on disk.
#[derive(Debug, Clone)]
pub struct AndroidProjectSpec {
    pub name: String,
    pub source_dir: PathBuf,
    pub modules: Vec<String>,
    pub services: Vec<String>,
    pub publication: Option<MavenPublication>,
    pub should_use_publication_script_path: Option<String>,
    /// True for the implicit fallback project, which only contributes if
    /// its source dir holds a recognizable Gradle build file.
    pub is_default: bool,
}

impl ModuleConfig {
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    /// Whether the package declares support for `platform`. A missing
    /// `platforms` array means unrestricted.
    pub fn supports_platform(&self, platform: Platform) -> bool {
        match &self.platforms {
            None => true,
            Some(platforms) => platforms.iter().any(|name| match platform {
                Platform::Android => name == "android",
                // "ios" is accepted as a legacy spelling of the apple platform.
                Platform::Apple => name == "apple" || name == "ios",
            }),
        }
    }

    /// Gradle project candidates. Declared projects are returned as
    /// configured; with none declared, a single default project rooted at
    /// `<package>/android` (or the configured path) is derived from
    /// `default_name`.
    pub fn android_projects(
        &self,
        default_name: &str,
        package_root: &Path,
    ) -> Vec<AndroidProjectSpec> {
        let android = self.android.as_ref();
        let declared = android.map(|a| a.projects.as_slice()).unwrap_or_default();

        if !declared.is_empty() {
            return declared
                .iter()
                .map(|project| AndroidProjectSpec {
                    name: project.name.clone().unwrap_or_else(|| {
                        project
                            .path
                            .rsplit('/')
                            .next()
                            .filter(|segment| !segment.is_empty())
                            .unwrap_or(default_name)
                            .to_string()
                    }),
                    source_dir: package_root.join(&project.path),
                    modules: project.modules.clone(),
                    services: project.services.clone(),
                    publication: project.publication.clone(),
                    should_use_publication_script_path: project
                        .should_use_publication_script_path
                        .clone(),
                    is_default: false,
                })
                .collect();
        }

        let name = android
            .and_then(|a| a.name.clone())
            .unwrap_or_else(|| default_name.to_string());
        let path = android.and_then(|a| a.path.as_deref()).unwrap_or("android");
        vec![AndroidProjectSpec {
            name,
            source_dir: package_root.join(path),
            modules: android.map(|a| a.modules.clone()).unwrap_or_default(),
            services: android.map(|a| a.services.clone()).unwrap_or_default(),
            publication: android.and_then(|a| a.publication.clone()),
            should_use_publication_script_path: android
                .and_then(|a| a.should_use_publication_script_path.clone()),
            is_default: true,
        }]
    }

    pub fn android_gradle_plugins(&self) -> Vec<GradlePlugin> {
        self.android
            .as_ref()
            .map(|a| a.gradle_plugins.clone())
            .unwrap_or_default()
    }

    pub fn android_aar_projects(&self) -> Vec<AarProject> {
        self.android
            .as_ref()
            .map(|a| a.gradle_aar_projects.clone())
            .unwrap_or_default()
    }

    /// Podspec search paths relative to the package root. Empty means
    /// "discover by scanning".
    pub fn apple_podspec_paths(&self) -> Vec<String> {
        self.apple
            .as_ref()
            .and_then(|a| a.podspec_path.clone())
            .into_iter()
            .collect()
    }

    pub fn apple_swift_module_names(&self) -> Vec<String> {
        self.apple
            .as_ref()
            .map(|a| a.swift_module_names.clone())
            .unwrap_or_default()
    }

    pub fn apple_modules(&self) -> Vec<String> {
        self.apple
            .as_ref()
            .map(|a| a.modules.clone())
            .unwrap_or_default()
    }

    pub fn apple_app_delegate_subscribers(&self) -> Vec<String> {
        self.apple
            .as_ref()
            .map(|a| a.app_delegate_subscribers.clone())
            .unwrap_or_default()
    }

    pub fn apple_react_delegate_handlers(&self) -> Vec<String> {
        self.apple
            .as_ref()
            .map(|a| a.react_delegate_handlers.clone())
            .unwrap_or_default()
    }

    pub fn apple_debug_only(&self) -> bool {
        self.apple.as_ref().map(|a| a.debug_only).unwrap_or(false)
    }

    pub fn apple_flags(&self) -> Option<serde_json::Value> {
        self.apple.as_ref().and_then(|a| a.flags.clone())
    }

    pub fn core_features(&self) -> Vec<String> {
        self.core_features.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ModuleConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn empty_config_yields_defaults_everywhere() {
        let config = parse("{}");

        assert!(config.supports_platform(Platform::Android));
        assert!(config.supports_platform(Platform::Apple));
        assert!(config.android_gradle_plugins().is_empty());
        assert!(config.apple_podspec_paths().is_empty());
        assert!(config.apple_modules().is_empty());
        assert!(config.apple_app_delegate_subscribers().is_empty());
        assert!(config.apple_react_delegate_handlers().is_empty());
        assert!(!config.apple_debug_only());
        assert!(config.core_features().is_empty());
    }

    #[test]
    fn platforms_array_gates_contributions() {
        let config = parse(r#"{ "platforms": ["android"] }"#);
        assert!(config.supports_platform(Platform::Android));
        assert!(!config.supports_platform(Platform::Apple));

        let legacy = parse(r#"{ "platforms": ["ios"] }"#);
        assert!(legacy.supports_platform(Platform::Apple));
        assert!(!legacy.supports_platform(Platform::Android));
    }

    #[test]
    fn default_android_project_is_derived_from_package_name() {
        let config = parse(r#"{ "android": { "modules": ["com.pkg.PkgModule"] } }"#);
        let projects = config.android_projects("my-package", Path::new("/repo/my-package"));

        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "my-package");
        assert_eq!(
            projects[0].source_dir,
            Path::new("/repo/my-package/android")
        );
        assert_eq!(projects[0].modules, vec!["com.pkg.PkgModule"]);
        assert!(projects[0].is_default);
    }

    #[test]
    fn declared_projects_override_the_default() {
        let config = parse(
            r#"{
              "android": {
                "projects": [
                  { "name": "pkg-core", "path": "android/core" },
                  { "path": "android/views" }
                ]
              }
            }"#,
        );
        let projects = config.android_projects("pkg", Path::new("/repo/pkg"));

        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].name, "pkg-core");
        assert_eq!(projects[0].source_dir, Path::new("/repo/pkg/android/core"));
        assert!(!projects[0].is_default);
        // Name falls back to the last path segment.
        assert_eq!(projects[1].name, "views");
    }

    #[test]
    fn apple_section_round_trips() {
        let config = parse(
            r#"{
              "apple": {
                "podspecPath": "ios",
                "modules": ["PkgModule"],
                "appDelegateSubscribers": ["PkgAppDelegate"],
                "reactDelegateHandlers": ["PkgDelegateHandler"],
                "debugOnly": true
              }
            }"#,
        );

        assert_eq!(config.apple_podspec_paths(), vec!["ios"]);
        assert_eq!(config.apple_modules(), vec!["PkgModule"]);
        assert_eq!(
            config.apple_app_delegate_subscribers(),
            vec!["PkgAppDelegate"]
        );
        assert_eq!(
            config.apple_react_delegate_handlers(),
            vec!["PkgDelegateHandler"]
        );
        assert!(config.apple_debug_only());
    }

    #[test]
    fn gradle_plugins_parse_with_optional_root_flag() {
        let config = parse(
            r#"{
              "android": {
                "gradlePlugins": [
                  { "id": "com.pkg.gradle", "group": "com.pkg", "sourceDir": "gradle-plugin", "applyToRootProject": false }
                ]
              }
            }"#,
        );
        let plugins = config.android_gradle_plugins();

        assert_eq!(plugins.len(), 1);
        assert_eq!(plugins[0].id, "com.pkg.gradle");
        assert_eq!(plugins[0].apply_to_root_project, Some(false));
    }
}
