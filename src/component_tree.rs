// Copyright (C) Brian G. Milnes 2025

//! Component tree
//!
//! Ownership tree keyed by directory segment. Nodes may carry one marker:
//! subsystem root, plugin type root, or plugin root (only for plugins that
//! declare sub-plugins). Built once per run, read-only afterwards.

pub mod component_tree {
    use std::collections::{BTreeMap, VecDeque};
    use std::path::{Path, PathBuf};

    use crate::component::component::Component;
    use crate::error::error::DerootResult;
    use crate::manifest::manifest::{
        load_component_manifest, load_subplugin_manifest, ComponentManifest, SubpluginManifest,
    };
    use crate::settings::settings::Settings;

    /// Directory of core code that belongs to no subsystem
    pub const CORE_LIBRARY_DIR: &str = "lib";

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Marker {
        /// None for the unqualified core library
        SubsystemRoot(Option<String>),
        PluginTypeRoot(String),
        PluginRoot { plugin_type: String, name: String },
    }

    impl Marker {
        /// Component owning this node, if the marker names one
        pub fn component(&self) -> Option<Component> {
            match self {
                Marker::SubsystemRoot(Some(name)) => Some(Component::Subsystem(name.clone())),
                Marker::SubsystemRoot(None) => Some(Component::CoreLibrary),
                Marker::PluginTypeRoot(_) => None,
                Marker::PluginRoot { plugin_type, name } => {
                    Some(Component::plugin(plugin_type, name))
                }
            }
        }
    }

    #[derive(Debug, Clone, Default)]
    struct TreeNode {
        children: BTreeMap<String, usize>,
        marker: Option<Marker>,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TreeNodeId(usize);

    #[derive(Debug, Clone)]
    pub struct ComponentTree {
        nodes: Vec<TreeNode>,
    }

    impl Default for ComponentTree {
        fn default() -> Self {
            ComponentTree {
                nodes: vec![TreeNode::default()],
            }
        }
    }

    fn split_dir(dir: &str) -> impl Iterator<Item = &str> {
        dir.split('/').filter(|s| !s.is_empty() && *s != ".")
    }

    impl ComponentTree {
        pub fn root(&self) -> TreeNodeId {
            TreeNodeId(0)
        }

        pub fn child(&self, node: TreeNodeId, segment: &str) -> Option<TreeNodeId> {
            self.nodes[node.0].children.get(segment).copied().map(TreeNodeId)
        }

        pub fn marker(&self, node: TreeNodeId) -> Option<&Marker> {
            self.nodes[node.0].marker.as_ref()
        }

        /// Literal children that are themselves plugin type roots
        pub fn plugin_type_children(&self, node: TreeNodeId) -> usize {
            self.nodes[node.0]
                .children
                .values()
                .filter(|c| matches!(self.nodes[**c].marker, Some(Marker::PluginTypeRoot(_))))
                .count()
        }

        /// Node at a root-relative directory
        pub fn lookup(&self, dir: &str) -> Option<TreeNodeId> {
            let mut node = self.root();
            for segment in split_dir(dir) {
                node = self.child(node, segment)?;
            }
            Some(node)
        }

        fn insert(&mut self, dir: &str, marker: Marker) -> TreeNodeId {
            let mut node = 0;
            for segment in split_dir(dir) {
                node = match self.nodes[node].children.get(segment) {
                    Some(child) => *child,
                    None => {
                        let child = self.nodes.len();
                        self.nodes.push(TreeNode::default());
                        self.nodes[node].children.insert(segment.to_string(), child);
                        child
                    }
                };
            }
            self.nodes[node].marker = Some(marker);
            TreeNodeId(node)
        }

        /// Every marked node with its root-relative directory, in path order
        pub fn marked_dirs(&self) -> Vec<(String, Marker)> {
            let mut out = Vec::new();
            let mut stack = vec![(0usize, String::new())];
            while let Some((node, dir)) = stack.pop() {
                if let Some(marker) = &self.nodes[node].marker {
                    out.push((dir.clone(), marker.clone()));
                }
                for (segment, child) in self.nodes[node].children.iter().rev() {
                    let child_dir = if dir.is_empty() {
                        segment.clone()
                    } else {
                        format!("{dir}/{segment}")
                    };
                    stack.push((*child, child_dir));
                }
            }
            out
        }

        pub fn plugin_type_dir(&self, plugin_type: &str) -> Option<String> {
            self.marked_dirs()
                .into_iter()
                .find(|(_, m)| matches!(m, Marker::PluginTypeRoot(t) if t == plugin_type))
                .map(|(dir, _)| dir)
        }

        /// Root-relative directory of a component
        pub fn component_dir(&self, component: &Component) -> Option<String> {
            match component {
                Component::Root => Some(String::new()),
                Component::CoreLibrary => Some(CORE_LIBRARY_DIR.to_string()),
                Component::Subsystem(name) => self
                    .marked_dirs()
                    .into_iter()
                    .find(|(_, m)| matches!(m, Marker::SubsystemRoot(Some(n)) if n == name))
                    .map(|(dir, _)| dir),
                Component::Plugin { plugin_type, name } => {
                    self.plugin_type_dir(plugin_type).map(|dir| format!("{dir}/{name}"))
                }
            }
        }

        /// Plugin type directories strictly below `dir`
        pub fn nested_plugin_type_dirs(&self, dir: &str) -> Vec<String> {
            let prefix = format!("{}/", dir.trim_end_matches('/'));
            self.marked_dirs()
                .into_iter()
                .filter(|(d, m)| matches!(m, Marker::PluginTypeRoot(_)) && d.starts_with(&prefix))
                .map(|(d, _)| d)
                .collect()
        }

        /// Build from the primary manifest and the sub-plugin manifests found,
        /// given as `(plugin type, plugin name, manifest)`.
        pub fn from_manifests(
            primary: &ComponentManifest,
            subplugins: &[(String, String, SubpluginManifest)],
        ) -> Self {
            let mut builder = ComponentTreeBuilder::new(primary);
            for (plugin_type, name, manifest) in subplugins {
                builder.graft_subplugins(plugin_type, name, manifest);
            }
            builder.finish()
        }

        /// Read the primary manifest under `root` and scan plugin directories of
        /// sub-plugin capable types for sub-plugin manifests
        pub fn load(root: &Path, settings: &Settings) -> DerootResult<Self> {
            let primary = load_component_manifest(&root.join(&settings.manifest_path))?;
            let mut builder = ComponentTreeBuilder::new(&primary);

            let mut dirs = PluginDirectories::new(root);
            for (plugin_type, dir) in &primary.plugintypes {
                if settings.supports_subplugins(plugin_type) {
                    dirs.enqueue(plugin_type, dir);
                }
            }

            while let Some((plugin_type, name, dir)) = dirs.next() {
                let manifest_path = root.join(&dir).join(&settings.subplugin_manifest_path);
                if let Some(manifest) = load_subplugin_manifest(&manifest_path)? {
                    let grafted = builder.graft_subplugins(&plugin_type, &name, &manifest);
                    for (sub_type, sub_dir) in grafted {
                        if settings.supports_subplugins(&sub_type) {
                            dirs.enqueue(&sub_type, &sub_dir);
                        }
                    }
                }
            }

            Ok(builder.finish())
        }
    }

    pub struct ComponentTreeBuilder {
        tree: ComponentTree,
        type_dirs: BTreeMap<String, String>,
    }

    impl ComponentTreeBuilder {
        pub fn new(primary: &ComponentManifest) -> Self {
            let mut tree = ComponentTree::default();
            tree.insert(CORE_LIBRARY_DIR, Marker::SubsystemRoot(None));
            for (name, dir) in &primary.subsystems {
                if let Some(dir) = dir {
                    tree.insert(dir, Marker::SubsystemRoot(Some(name.clone())));
                }
            }
            for (plugin_type, dir) in &primary.plugintypes {
                tree.insert(dir, Marker::PluginTypeRoot(plugin_type.clone()));
            }
            ComponentTreeBuilder {
                tree,
                type_dirs: primary.plugintypes.clone(),
            }
        }

        /// Insert the sub-plugin types of one plugin below its directory and
        /// mark the plugin as a plugin root. Returns the grafted
        /// `(sub type, root-relative dir)` pairs.
        pub fn graft_subplugins(
            &mut self,
            plugin_type: &str,
            name: &str,
            manifest: &SubpluginManifest,
        ) -> Vec<(String, String)> {
            let Some(type_dir) = self.type_dirs.get(plugin_type).cloned() else {
                return Vec::new();
            };
            let plugin_dir = format!("{}/{name}", type_dir.trim_end_matches('/'));
            self.tree.insert(
                &plugin_dir,
                Marker::PluginRoot {
                    plugin_type: plugin_type.to_string(),
                    name: name.to_string(),
                },
            );
            let mut grafted = Vec::new();
            for (sub_type, relative) in manifest.types() {
                let relative = relative.trim_matches('/');
                // Older manifests spell the directory from the codebase root
                let sub_dir = if relative.starts_with(&format!("{plugin_dir}/")) {
                    relative.to_string()
                } else {
                    format!("{plugin_dir}/{relative}")
                };
                self.tree.insert(&sub_dir, Marker::PluginTypeRoot(sub_type.clone()));
                self.type_dirs.insert(sub_type.clone(), sub_dir.clone());
                grafted.push((sub_type.clone(), sub_dir));
            }
            grafted
        }

        pub fn finish(self) -> ComponentTree {
            self.tree
        }
    }

    /// Worklist over plugin directories: yields `(plugin type, plugin name,
    /// root-relative dir)` for every subdirectory of each enqueued plugin type
    /// directory. Types enqueued while iterating are visited afterwards.
    pub struct PluginDirectories {
        root: PathBuf,
        pending: VecDeque<(String, String)>,
        current: Option<(String, String, std::vec::IntoIter<String>)>,
    }

    impl PluginDirectories {
        pub fn new(root: &Path) -> Self {
            PluginDirectories {
                root: root.to_path_buf(),
                pending: VecDeque::new(),
                current: None,
            }
        }

        pub fn enqueue(&mut self, plugin_type: &str, dir: &str) {
            self.pending.push_back((plugin_type.to_string(), dir.trim_matches('/').to_string()));
        }

        fn list_subdirs(&self, dir: &str) -> Vec<String> {
            let Ok(entries) = std::fs::read_dir(self.root.join(dir)) else {
                return Vec::new();
            };
            let mut names: Vec<String> = entries
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
                .filter_map(|e| e.file_name().to_str().map(|s| s.to_string()))
                .filter(|n| !n.starts_with('.'))
                .collect();
            names.sort();
            names
        }
    }

    impl Iterator for PluginDirectories {
        type Item = (String, String, String);

        fn next(&mut self) -> Option<Self::Item> {
            loop {
                if let Some((plugin_type, dir, names)) = &mut self.current {
                    if let Some(name) = names.next() {
                        let plugin_dir = format!("{dir}/{name}");
                        return Some((plugin_type.clone(), name, plugin_dir));
                    }
                }
                let (plugin_type, dir) = self.pending.pop_front()?;
                let names = self.list_subdirs(&dir);
                self.current = Some((plugin_type, dir, names.into_iter()));
            }
        }
    }
}
