// Copyright (C) Brian G. Milnes 2025

//! Component identities
//!
//! `(kind, name, relativePath)`: core root, unqualified core library, core
//! subsystem, or plugin of a given type. The first two are synthetic and
//! cannot be addressed by component id.

pub mod component {
    use serde::{Deserialize, Serialize};
    use std::fmt;

    pub const CORE: &str = "core";
    pub const ROOT_NAME: &str = "root";

    #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum Component {
        /// The bare codebase root
        Root,
        /// Core code that belongs to no subsystem (`lib/`)
        CoreLibrary,
        Subsystem(String),
        Plugin { plugin_type: String, name: String },
    }

    impl Component {
        pub fn plugin(plugin_type: &str, name: &str) -> Self {
            Component::Plugin {
                plugin_type: plugin_type.to_string(),
                name: name.to_string(),
            }
        }

        pub fn is_core(&self) -> bool {
            !matches!(self, Component::Plugin { .. })
        }

        /// Root and the unqualified core library
        pub fn is_synthetic(&self) -> bool {
            matches!(self, Component::Root | Component::CoreLibrary)
        }

        /// `core` for core entities, the plugin type otherwise
        pub fn type_name(&self) -> &str {
            match self {
                Component::Plugin { plugin_type, .. } => plugin_type,
                _ => CORE,
            }
        }

        pub fn name(&self) -> Option<&str> {
            match self {
                Component::Root => Some(ROOT_NAME),
                Component::CoreLibrary => None,
                Component::Subsystem(name) => Some(name),
                Component::Plugin { name, .. } => Some(name),
            }
        }

        /// Plugin name holds an opaque placeholder
        pub fn has_dynamic_name(&self) -> bool {
            matches!(self, Component::Plugin { name, .. } if name.contains('{'))
        }

        /// Frankenstyle id: `core`, `core_admin`, `mod_assign`
        pub fn id(&self) -> String {
            match self {
                Component::Root | Component::CoreLibrary => CORE.to_string(),
                Component::Subsystem(name) => format!("{CORE}_{name}"),
                Component::Plugin { plugin_type, name } => format!("{plugin_type}_{name}"),
            }
        }

        /// Parse a frankenstyle id. Plugin types never contain underscores.
        pub fn parse_id(id: &str) -> Option<Self> {
            if id == CORE {
                return Some(Component::CoreLibrary);
            }
            let (kind, name) = id.split_once('_')?;
            if kind.is_empty() || name.is_empty() {
                return None;
            }
            if kind == CORE {
                Some(Component::Subsystem(name.to_string()))
            } else {
                Some(Component::plugin(kind, name))
            }
        }
    }

    impl fmt::Display for Component {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Component::Root => write!(f, "{CORE}/{ROOT_NAME}"),
                _ => write!(f, "{}", self.id()),
            }
        }
    }

    /// A component plus the remaining path inside it (may hold placeholders)
    #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ResolvedComponent {
        pub component: Component,
        pub relative_path: String,
    }

    impl ResolvedComponent {
        pub fn new(component: Component, relative_path: impl Into<String>) -> Self {
            ResolvedComponent {
                component,
                relative_path: relative_path.into(),
            }
        }

        pub fn root() -> Self {
            ResolvedComponent::new(Component::Root, "")
        }
    }
}
