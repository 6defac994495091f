//! Kotlin registration source
//!
//! Emits the class the Android module registry bootstraps from: package
//! providers in registration order, the Gradle plugin ids the build
//! should apply, and the core features the resolved modules ask of the
//! shared runtime.

use crate::platforms::{AndroidDescriptor, ModuleDescriptor};

const GENERATED_PACKAGE: &str = "dev.modlink.generated";

pub(crate) fn render(descriptors: &[ModuleDescriptor], class_name: &str) -> String {
    let android: Vec<&AndroidDescriptor> = descriptors
        .iter()
        .filter_map(|descriptor| match descriptor {
            ModuleDescriptor::Android(android) => Some(android),
            _ => None,
        })
        .collect();

    // Projects keep descriptor order; classes within a project are
    // already sorted by the scanner.
    let package_classes: Vec<String> = android
        .iter()
        .flat_map(|descriptor| descriptor.projects.iter())
        .flat_map(|project| project.packages.iter())
        .map(|class| format!("{class}()"))
        .collect();

    let plugin_ids: Vec<String> = android
        .iter()
        .flat_map(|descriptor| descriptor.plugins.iter())
        .map(|plugin| format!("\"{}\"", plugin.id))
        .collect();

    let core_features: Vec<String> = {
        let mut seen = Vec::new();
        for feature in android
            .iter()
            .flat_map(|descriptor| descriptor.core_features.iter())
        {
            if !seen.contains(feature) {
                seen.push(feature.clone());
            }
        }
        seen.into_iter().map(|f| format!("\"{f}\"")).collect()
    };

    let mut out = String::new();
    out.push_str("// Automatically generated by modlink. Do not modify by hand.\n");
    out.push_str(&format!("package {GENERATED_PACKAGE}\n\n"));
    out.push_str("import dev.modlink.core.ModulePackage\n");
    out.push_str("import dev.modlink.core.PackageListProvider\n\n");
    out.push_str(&format!("class {class_name} : PackageListProvider {{\n"));
    push_list_fun(&mut out, "getModulePackages", "List<ModulePackage>", &package_classes);
    out.push('\n');
    push_list_fun(&mut out, "getGradlePluginIds", "List<String>", &plugin_ids);
    out.push('\n');
    push_list_fun(&mut out, "getCoreFeatures", "List<String>", &core_features);
    out.push_str("}\n");
    out
}

fn push_list_fun(out: &mut String, name: &str, return_type: &str, entries: &[String]) {
    out.push_str(&format!("  override fun {name}(): {return_type} {{\n"));
    if entries.is_empty() {
        out.push_str("    return emptyList()\n");
    } else {
        out.push_str("    return listOf(\n");
        for (index, entry) in entries.iter().enumerate() {
            let separator = if index + 1 < entries.len() { "," } else { "" };
            out.push_str(&format!("      {entry}{separator}\n"));
        }
        out.push_str("    )\n");
    }
    out.push_str("  }\n");
}
