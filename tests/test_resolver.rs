// Copyright (C) Brian G. Milnes 2025

//! Tests for component resolution against the component tree

mod common;
use common::sample_tree;

use deroot::component::component::{Component, ResolvedComponent};
use deroot::component_tree::component_tree::ComponentTree;
use deroot::manifest::manifest::parse_component_manifest;
use std::path::Path;
use deroot::resolver::resolver::{is_valid_plugin_name, looks_like_full_path, resolve};

fn resolved(component: Component, relative: &str) -> Option<ResolvedComponent> {
    Some(ResolvedComponent::new(component, relative))
}

#[test]
fn test_plugin_file() {
    let tree = sample_tree();
    assert_eq!(resolve(&tree, "@/mod/assign/lib.php"), resolved(Component::plugin("mod", "assign"), "lib.php"));
    assert_eq!(resolve(&tree, "@/mod/forum/lib.php"), resolved(Component::plugin("mod", "forum"), "lib.php"));
}

#[test]
fn test_subplugin_declared_below_plugin() {
    let tree = sample_tree();
    assert_eq!(
        resolve(&tree, "@/mod/assign/feedback/offline/index.php"),
        resolved(Component::plugin("assignfeedback", "offline"), "index.php")
    );
}

#[test]
fn test_plugin_root_absorbs_unknown_continuations() {
    let tree = sample_tree();
    assert_eq!(
        resolve(&tree, "@/mod/assign/classes/output/renderer.php"),
        resolved(Component::plugin("mod", "assign"), "classes/output/renderer.php")
    );
}

#[test]
fn test_double_slash_in_core_library() {
    let tree = sample_tree();
    let result = resolve(&tree, "@/lib//questionlib.php");
    assert_eq!(result, resolved(Component::CoreLibrary, "questionlib.php"));
    let component = result.map(|r| r.component);
    assert_eq!(component.as_ref().map(|c| c.type_name()), Some("core"));
    assert_eq!(component.as_ref().and_then(|c| c.name()), None);
}

#[test]
fn test_subsystem_nested_in_core_library() {
    let tree = sample_tree();
    assert_eq!(
        resolve(&tree, "@/lib/filestorage/file_system.php"),
        resolved(Component::Subsystem("files".to_string()), "file_system.php")
    );
}

#[test]
fn test_dynamic_plugin_name() {
    let tree = sample_tree();
    assert_eq!(resolve(&tree, "@/report/{$plugin}"), resolved(Component::plugin("report", "{$plugin}"), ""));
}

#[test]
fn test_file_like_variable_is_undeterminable() {
    let tree = sample_tree();
    assert_eq!(resolve(&tree, "@/admin/{$file}"), None);
}

#[test]
fn test_ambiguous_subplugin_family_is_undeterminable() {
    let tree = sample_tree();
    assert_eq!(resolve(&tree, "@/mod/assign/{$shortsubtype}/{$plugin}/settings.php"), None);
}

#[test]
fn test_core_library_with_plugin_types_falls_back() {
    let manifest = parse_component_manifest(
        Path::new("lib/components.json"),
        r#"{"plugintypes": {"editor": "lib/editor", "antivirus": "lib/antivirus", "mod": "mod"}}"#,
    )
    .expect("manifest");
    let tree = ComponentTree::from_manifests(&manifest, &[]);
    assert_eq!(resolve(&tree, "@/lib/{$name}"), resolved(Component::CoreLibrary, "{$name}"));
    assert_eq!(resolve(&tree, "@/lib/{$name}.php"), resolved(Component::CoreLibrary, "{$name}.php"));
    assert_eq!(resolve(&tree, "@/lib/editor/{$name}"), resolved(Component::plugin("editor", "{$name}"), ""));
}

#[test]
fn test_root_and_unanchored() {
    let tree = sample_tree();
    assert_eq!(resolve(&tree, "@"), Some(ResolvedComponent::root()));
    assert_eq!(resolve(&tree, "@/index.php"), resolved(Component::Root, "index.php"));
    assert_eq!(resolve(&tree, "{$path}/lib.php"), None);
}

#[test]
fn test_exhausted_on_marker() {
    let tree = sample_tree();
    assert_eq!(resolve(&tree, "@/admin"), resolved(Component::Subsystem("admin".to_string()), ""));
    assert_eq!(resolve(&tree, "@/mod/assign"), resolved(Component::plugin("mod", "assign"), ""));
}

#[test]
fn test_invalid_plugin_name_falls_back() {
    let tree = sample_tree();
    // Module names allow no underscores
    assert_eq!(resolve(&tree, "@/mod/bad_name/lib.php"), resolved(Component::Root, "mod/bad_name/lib.php"));
    assert!(is_valid_plugin_name("report", "log_store"));
    assert!(!is_valid_plugin_name("report", "log__store"));
    assert!(!is_valid_plugin_name("mod", "Assign"));
}

#[test]
fn test_full_path_heuristic_is_imprecise() {
    assert!(looks_like_full_path("{$file}"));
    assert!(looks_like_full_path("{$fullpath}"));
    assert!(!looks_like_full_path("{$plugin}"));
    // Known false positive: a plugin name held in a variable named like a file
    assert!(looks_like_full_path("{$profilefield}"));
}

#[test]
fn test_resolution_is_repeatable() {
    let tree = sample_tree();
    let first = resolve(&tree, "@/mod/assign/submission/file/lib.php");
    let second = resolve(&tree, "@/mod/assign/submission/file/lib.php");
    assert_eq!(first, second);
    assert_eq!(first, resolved(Component::plugin("assignsubmission", "file"), "lib.php"));
}
