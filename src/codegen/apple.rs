//! Swift registration source
//!
//! Emits the provider class the Apple runtime loads: module classes,
//! app-lifecycle subscribers, and view-integration handlers. Debug-only
//! packages are linked only into debug configurations, so whenever one
//! contributes to a list the generator emits both a debug branch (with
//! it) and a release branch (without it); a debug-only symbol never
//! appears outside a conditional block.

use crate::platforms::{AppleDescriptor, ModuleDescriptor};

const DEBUG_FLAG: &str = "MODLINK_CONFIGURATION_DEBUG";
const CORE_MODULE: &str = "ModlinkCore";

struct Entry {
    code: String,
    debug_only: bool,
}

pub(crate) fn render(descriptors: &[ModuleDescriptor], class_name: &str) -> String {
    let apple: Vec<&AppleDescriptor> = descriptors
        .iter()
        .filter_map(|descriptor| match descriptor {
            ModuleDescriptor::Apple(apple) => Some(apple),
            _ => None,
        })
        .collect();

    let entries = |f: &dyn Fn(&AppleDescriptor) -> Vec<String>| -> Vec<Entry> {
        apple
            .iter()
            .flat_map(|descriptor| {
                f(descriptor).into_iter().map(move |code| Entry {
                    code,
                    debug_only: descriptor.debug_only,
                })
            })
            .collect()
    };

    let module_classes = entries(&|d| {
        d.modules.iter().map(|module| format!("{module}.self")).collect()
    });
    let subscribers = entries(&|d| {
        d.app_delegate_subscribers
            .iter()
            .map(|subscriber| format!("{subscriber}.self"))
            .collect()
    });
    let handlers = entries(&|d| {
        d.react_delegate_handlers
            .iter()
            .map(|handler| {
                format!(
                    "(packageName: \"{}\", handler: {handler}.self)",
                    d.package_name
                )
            })
            .collect()
    });

    let mut out = String::new();
    out.push_str("// Automatically generated by modlink. Do not modify by hand.\n\n");
    out.push_str(&format!("import {CORE_MODULE}\n"));
    for descriptor in &apple {
        if descriptor.modules.is_empty()
            && descriptor.app_delegate_subscribers.is_empty()
            && descriptor.react_delegate_handlers.is_empty()
        {
            continue;
        }
        for module_name in &descriptor.swift_module_names {
            if descriptor.debug_only {
                out.push_str(&format!(
                    "#if {DEBUG_FLAG}\nimport {module_name}\n#endif\n"
                ));
            } else {
                out.push_str(&format!("import {module_name}\n"));
            }
        }
    }
    out.push('\n');

    out.push_str(&format!("public class {class_name}: ModulesProvider {{\n"));
    push_accessor(&mut out, "getModuleClasses", "[AnyModule.Type]", &module_classes);
    out.push('\n');
    push_accessor(
        &mut out,
        "getAppDelegateSubscribers",
        "[AppDelegateSubscriber.Type]",
        &subscribers,
    );
    out.push('\n');
    push_accessor(
        &mut out,
        "getReactDelegateHandlers",
        "[ReactDelegateHandlerTuple]",
        &handlers,
    );
    out.push_str("}\n");
    out
}

fn push_accessor(out: &mut String, name: &str, return_type: &str, entries: &[Entry]) {
    out.push_str(&format!(
        "  public override func {name}() -> {return_type} {{\n"
    ));
    if entries.iter().any(|entry| entry.debug_only) {
        out.push_str(&format!("#if {DEBUG_FLAG}\n"));
        push_return(out, entries.iter());
        out.push_str("#else\n");
        push_return(out, entries.iter().filter(|entry| !entry.debug_only));
        out.push_str("#endif\n");
    } else {
        push_return(out, entries.iter());
    }
    out.push_str("  }\n");
}

fn push_return<'a>(out: &mut String, entries: impl Iterator<Item = &'a Entry>) {
    let codes: Vec<&str> = entries.map(|entry| entry.code.as_str()).collect();
    if codes.is_empty() {
        out.push_str("    return []\n");
        return;
    }
    out.push_str("    return [\n");
    for (index, code) in codes.iter().enumerate() {
        let separator = if index + 1 < codes.len() { "," } else { "" };
        out.push_str(&format!("      {code}{separator}\n"));
    }
    out.push_str("    ]\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platforms::ApplePod;
    use std::path::PathBuf;

    fn descriptor(package_name: &str, modules: Vec<&str>, debug_only: bool) -> ModuleDescriptor {
        let pod_name = package_name.to_string();
        ModuleDescriptor::Apple(AppleDescriptor {
            package_name: package_name.to_string(),
            pods: vec![ApplePod {
                pod_name: pod_name.clone(),
                podspec_dir: PathBuf::from(format!("/repo/{package_name}")),
            }],
            swift_module_names: vec![pod_name.replace('-', "_")],
            modules: modules.into_iter().map(String::from).collect(),
            app_delegate_subscribers: Vec::new(),
            react_delegate_handlers: Vec::new(),
            debug_only,
            core_features: Vec::new(),
            flags: None,
        })
    }

    #[test]
    fn unconditional_list_when_nothing_is_debug_only() {
        let descriptors = vec![descriptor("pkg-a", vec!["AModule"], false)];
        let source = render(&descriptors, "ModlinkModulesProvider");

        assert!(source.contains("AModule.self"));
        assert!(!source.contains(DEBUG_FLAG));
    }

    #[test]
    fn debug_only_modules_emit_both_branches() {
        let descriptors = vec![
            descriptor("pkg-a", vec!["AModule"], false),
            descriptor("pkg-dev", vec!["DevModule"], true),
        ];
        let source = render(&descriptors, "ModlinkModulesProvider");

        // One conditional accessor: debug branch holds both modules, the
        // release branch only the always-on one.
        let debug_branch_start = source.find("#if MODLINK_CONFIGURATION_DEBUG\n    return [").unwrap();
        let else_pos = source.find("#else").unwrap();
        let endif_pos = source.find("#endif").unwrap();
        let debug_branch = &source[debug_branch_start..else_pos];
        let release_branch = &source[else_pos..endif_pos];

        assert!(debug_branch.contains("AModule.self"));
        assert!(debug_branch.contains("DevModule.self"));
        assert!(release_branch.contains("AModule.self"));
        assert!(!release_branch.contains("DevModule.self"));
    }

    #[test]
    fn debug_only_symbols_never_escape_conditional_blocks() {
        let descriptors = vec![descriptor("pkg-dev", vec!["DevModule"], true)];
        let source = render(&descriptors, "ModlinkModulesProvider");

        for (index, _) in source.match_indices("DevModule") {
            let before = &source[..index];
            let opened = before.matches("#if").count();
            let closed = before.matches("#endif").count();
            assert!(
                opened > closed,
                "DevModule appears outside a conditional block"
            );
        }
    }

    #[test]
    fn handlers_render_as_package_tuples() {
        let mut descriptors = vec![descriptor("pkg-a", vec![], false)];
        if let ModuleDescriptor::Apple(apple) = &mut descriptors[0] {
            apple.react_delegate_handlers.push("AHandler".to_string());
        }
        let source = render(&descriptors, "ModlinkModulesProvider");

        assert!(source.contains("(packageName: \"pkg-a\", handler: AHandler.self)"));
    }

    #[test]
    fn rendering_is_byte_stable() {
        let descriptors = vec![
            descriptor("pkg-a", vec!["AModule"], false),
            descriptor("pkg-dev", vec!["DevModule"], true),
        ];
        assert_eq!(
            render(&descriptors, "Provider"),
            render(&descriptors, "Provider")
        );
    }
}
