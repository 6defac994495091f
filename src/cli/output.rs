//! Output formatting for the resolve and extra-deps commands
//!
//! Machine-readable formats serialize the descriptor list as-is; the
//! human format renders a short tree per package.

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::dependencies::ExtraDependencies;
use crate::platforms::{ModuleDescriptor, Platform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted text
    Human,
    /// JSON (machine-readable)
    Json,
    /// YAML
    Yaml,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_descriptors(
        &self,
        platform: Platform,
        descriptors: &[ModuleDescriptor],
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(descriptors)
                .context("Failed to serialize descriptors to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(descriptors)
                .context("Failed to serialize descriptors to YAML"),
            OutputFormat::Human => Ok(format_descriptors_human(platform, descriptors)),
        }
    }

    pub fn format_extra_dependencies(&self, dependencies: &ExtraDependencies) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(dependencies)
                .context("Failed to serialize extra dependencies to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(dependencies)
                .context("Failed to serialize extra dependencies to YAML"),
            OutputFormat::Human => Ok(if dependencies.is_null() {
                "No extra build dependencies declared.\n".to_string()
            } else {
                format!(
                    "Extra build dependencies:\n{}\n",
                    serde_json::to_string_pretty(dependencies)
                        .context("Failed to render extra dependencies")?
                )
            }),
        }
    }
}

fn format_descriptors_human(platform: Platform, descriptors: &[ModuleDescriptor]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Resolved {} native module{} for {}\n\n",
        descriptors.len(),
        if descriptors.len() == 1 { "" } else { "s" },
        platform
    ));

    for descriptor in descriptors {
        match descriptor {
            ModuleDescriptor::Android(android) => {
                out.push_str(&format!("{}\n", android.package_name));
                for project in &android.projects {
                    out.push_str(&format!(
                        "\u{251C}\u{2500} project {} ({})\n",
                        project.name,
                        project.source_dir.display()
                    ));
                    for package in &project.packages {
                        out.push_str(&format!("\u{2502}    \u{2500} {}\n", package));
                    }
                }
                for plugin in &android.plugins {
                    out.push_str(&format!("\u{251C}\u{2500} gradle plugin {}\n", plugin.id));
                }
                if !android.core_features.is_empty() {
                    out.push_str(&format!(
                        "\u{2514}\u{2500} core features: {}\n",
                        android.core_features.join(", ")
                    ));
                }
                out.push('\n');
            }
            ModuleDescriptor::Apple(apple) => {
                out.push_str(&format!("{}\n", apple.package_name));
                for pod in &apple.pods {
                    out.push_str(&format!(
                        "\u{251C}\u{2500} pod {} ({})\n",
                        pod.pod_name,
                        pod.podspec_dir.display()
                    ));
                }
                for module in &apple.modules {
                    out.push_str(&format!("\u{251C}\u{2500} module {}\n", module));
                }
                if apple.debug_only {
                    out.push_str("\u{2514}\u{2500} debug-only\n");
                }
                out.push('\n');
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platforms::{AppleDescriptor, ApplePod};
    use std::path::PathBuf;

    fn apple_descriptor() -> ModuleDescriptor {
        ModuleDescriptor::Apple(AppleDescriptor {
            package_name: "pkg-camera".to_string(),
            pods: vec![ApplePod {
                pod_name: "PkgCamera".to_string(),
                podspec_dir: PathBuf::from("/repo/pkg-camera/ios"),
            }],
            swift_module_names: vec!["PkgCamera".to_string()],
            modules: vec!["CameraModule".to_string()],
            app_delegate_subscribers: Vec::new(),
            react_delegate_handlers: Vec::new(),
            debug_only: false,
            core_features: Vec::new(),
            flags: None,
        })
    }

    #[test]
    fn json_output_is_valid_and_camel_cased() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let output = formatter
            .format_descriptors(Platform::Apple, &[apple_descriptor()])
            .unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["packageName"], "pkg-camera");
        assert_eq!(parsed[0]["pods"][0]["podName"], "PkgCamera");
    }

    #[test]
    fn human_output_lists_packages_and_pods() {
        let formatter = OutputFormatter::new(OutputFormat::Human);
        let output = formatter
            .format_descriptors(Platform::Apple, &[apple_descriptor()])
            .unwrap();

        assert!(output.contains("Resolved 1 native module for apple"));
        assert!(output.contains("pkg-camera"));
        assert!(output.contains("pod PkgCamera"));
    }

    #[test]
    fn null_extra_dependencies_render_as_none() {
        let formatter = OutputFormatter::new(OutputFormat::Human);
        let output = formatter
            .format_extra_dependencies(&serde_json::Value::Null)
            .unwrap();
        assert!(output.contains("No extra build dependencies"));
    }
}
