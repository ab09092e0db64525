// Copyright (C) Brian G. Milnes 2025

//! Run settings
//!
//! Every field has a default matching the conventional codebase layout.
//! A JSON file can override any subset; CLI flags override the file.

pub mod settings {
    use anyhow::{Context, Result};
    use serde::{Deserialize, Serialize};
    use std::path::{Path, PathBuf};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(default)]
    pub struct ParserSettings {
        /// External program producing a PHP-Parser JSON dump on stdout
        pub program: String,
        /// Arguments placed before the file path
        pub args: Vec<String>,
        /// Read `<dump_dir>/<relative path>.json` instead of running the program
        pub dump_dir: Option<PathBuf>,
    }

    impl Default for ParserSettings {
        fn default() -> Self {
            ParserSettings {
                program: "php-parse".to_string(),
                args: vec!["--json-dump".to_string()],
                dump_dir: None,
            }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(default)]
    pub struct Settings {
        pub manifest_path: String,
        pub subplugin_manifest_path: String,
        /// Plugin types whose plugins may declare sub-plugins
        pub subplugin_capable_types: Vec<String>,
        /// Root-relative files that run before the component system exists
        pub rewrite_exclusions: Vec<String>,
        /// Directory names never descended into during discovery
        pub skip_dirs: Vec<String>,
        /// Class providing the component-addressed path API
        pub component_api: String,
        pub parser: ParserSettings,
    }

    impl Default for Settings {
        fn default() -> Self {
            Settings {
                manifest_path: "lib/components.json".to_string(),
                subplugin_manifest_path: "db/subplugins.json".to_string(),
                subplugin_capable_types: ["mod", "editor", "tool", "local", "report", "block"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                rewrite_exclusions: [
                    "config.php",
                    "config-dist.php",
                    "install.php",
                    "admin/cli/install.php",
                    "admin/cli/install_database.php",
                    "lib/setup.php",
                    "lib/setuplib.php",
                    "lib/classes/component.php",
                    "lib/phpunit/bootstrap.php",
                    "lib/behat/classes/behat_config_manager.php",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
                skip_dirs: [".git", "node_modules", "vendor"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                component_api: "\\core_component".to_string(),
                parser: ParserSettings::default(),
            }
        }
    }

    impl Settings {
        /// Defaults, or defaults overlaid by a JSON settings file
        pub fn load(path: Option<&Path>) -> Result<Self> {
            match path {
                None => Ok(Settings::default()),
                Some(path) => {
                    let text = std::fs::read_to_string(path)
                        .with_context(|| format!("Failed to read settings: {}", path.display()))?;
                    serde_json::from_str(&text)
                        .with_context(|| format!("Failed to parse settings: {}", path.display()))
                }
            }
        }

        pub fn is_excluded(&self, relative_file: &str) -> bool {
            self.rewrite_exclusions.iter().any(|e| e == relative_file)
        }

        pub fn supports_subplugins(&self, plugin_type: &str) -> bool {
            self.subplugin_capable_types.iter().any(|t| t == plugin_type)
        }
    }
}
