// Copyright (C) Brian G. Milnes 2025

//! Component resolver
//!
//! Trie descent over the component tree. The nearest plugin root and
//! subsystem root passed on the way down are remembered together with the
//! unconsumed remainder at that point; they stand in for backtracking.
//! Ambiguous shapes resolve to None rather than to a guess.

pub mod resolver {
    use regex::Regex;
    use std::sync::OnceLock;

    use crate::component::component::{Component, ResolvedComponent};
    use crate::component_tree::component_tree::{ComponentTree, Marker, TreeNodeId};
    use crate::symbolic::symbolic::{segments, single_placeholder, strip_root};

    fn module_name_re() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| Regex::new(r"^[a-z][a-z0-9]*$").expect("static regex"))
    }

    fn plugin_name_re() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| Regex::new(r"^[a-z](?:[a-z0-9_]*[a-z0-9])?$").expect("static regex"))
    }

    fn simple_variable_re() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| Regex::new(r"^\$([A-Za-z_][A-Za-z0-9_]*)$").expect("static regex"))
    }

    /// Plugin name rules per type; an opaque placeholder is always accepted
    pub fn is_valid_plugin_name(plugin_type: &str, segment: &str) -> bool {
        if single_placeholder(segment).is_some() {
            return true;
        }
        if plugin_type == "mod" {
            module_name_re().is_match(segment)
        } else {
            plugin_name_re().is_match(segment) && !segment.contains("__")
        }
    }

    /// A lone variable placeholder whose name suggests it holds a whole path
    /// (`{$file}`, `{$fullpath}`) rather than a bare plugin name.
    /// Known to be imprecise: `{$profilefield}` matches too.
    pub fn looks_like_full_path(segment: &str) -> bool {
        single_placeholder(segment)
            .and_then(|inner| simple_variable_re().captures(inner))
            .is_some_and(|caps| {
                let name = caps[1].to_ascii_lowercase();
                name.contains("file") || name.contains("path")
            })
    }

    /// Resolve a normalized symbolic path to its owning component.
    /// None for unanchored paths and for the ambiguous cases.
    pub fn resolve(tree: &ComponentTree, path: &str) -> Option<ResolvedComponent> {
        let rest = strip_root(path)?;
        if rest.is_empty() {
            return Some(ResolvedComponent::root());
        }
        let segs: Vec<&str> = segments(rest).into_iter().filter(|s| !s.is_empty()).collect();
        if segs.is_empty() {
            return Some(ResolvedComponent::root());
        }

        let mut node = tree.root();
        let mut last_plugin: Option<(Component, usize)> = None;
        let mut last_subsystem: Option<(Component, usize)> = None;

        for (i, segment) in segs.iter().enumerate() {
            if let Some(child) = tree.child(node, segment) {
                node = child;
                match tree.marker(node) {
                    Some(marker @ Marker::PluginRoot { .. }) => {
                        last_plugin = marker.component().map(|c| (c, i + 1))
                    }
                    Some(marker @ Marker::SubsystemRoot(_)) => {
                        last_subsystem = marker.component().map(|c| (c, i + 1))
                    }
                    _ => {}
                }
                continue;
            }
            return diverge(tree, node, &segs, i, last_plugin, last_subsystem);
        }

        match tree.marker(node) {
            Some(Marker::PluginRoot { .. }) | Some(Marker::SubsystemRoot(_)) => {
                let component = tree.marker(node).and_then(|m| m.component())?;
                Some(ResolvedComponent::new(component, ""))
            }
            _ => fallback(&segs, last_plugin, last_subsystem),
        }
    }

    /// Segment `i` has no literal edge below `node`
    fn diverge(
        tree: &ComponentTree,
        node: TreeNodeId,
        segs: &[&str],
        i: usize,
        last_plugin: Option<(Component, usize)>,
        last_subsystem: Option<(Component, usize)>,
    ) -> Option<ResolvedComponent> {
        let segment = segs[i];
        let marker = tree.marker(node);
        // Ambiguous sub-plugin family; subsystem dirs such as `lib` fall back instead
        let plugin_node = matches!(
            marker,
            Some(Marker::PluginRoot { .. }) | Some(Marker::PluginTypeRoot(_))
        );
        let dynamic = single_placeholder(segment).is_some();
        if plugin_node && dynamic && tree.plugin_type_children(node) > 1 {
            return None;
        }
        match marker {
            Some(Marker::PluginRoot { .. }) => fallback(segs, last_plugin, last_subsystem),
            Some(Marker::PluginTypeRoot(plugin_type))
                if is_valid_plugin_name(plugin_type, segment) =>
            {
                if looks_like_full_path(segment) {
                    return None;
                }
                let component = Component::plugin(plugin_type, segment);
                Some(ResolvedComponent::new(component, segs[i + 1..].join("/")))
            }
            _ => {
                if last_plugin.is_none() && looks_like_full_path(segment) {
                    return None;
                }
                fallback(segs, last_plugin, last_subsystem)
            }
        }
    }

    fn fallback(
        segs: &[&str],
        last_plugin: Option<(Component, usize)>,
        last_subsystem: Option<(Component, usize)>,
    ) -> Option<ResolvedComponent> {
        if let Some((component, entered)) = last_plugin.or(last_subsystem) {
            return Some(ResolvedComponent::new(component, segs[entered..].join("/")));
        }
        Some(ResolvedComponent::new(Component::Root, segs.join("/")))
    }
}
