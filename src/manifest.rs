// Copyright (C) Brian G. Milnes 2025

//! Component manifests
//!
//! The primary manifest maps plugin types and subsystems to directories
//! relative to the codebase root. A sub-plugin manifest inside a plugin maps
//! sub-plugin types to directories relative to that plugin.

pub mod manifest {
    use serde::Deserialize;
    use serde_json::Value;
    use std::collections::BTreeMap;
    use std::path::Path;

    use crate::error::error::{DerootError, DerootResult};

    const PRIMARY_SCHEMA: &str = r#"{
        "type": "object",
        "required": ["plugintypes"],
        "properties": {
            "plugintypes": {
                "type": "object",
                "additionalProperties": { "type": "string" }
            },
            "subsystems": {
                "type": "object",
                "additionalProperties": { "type": ["string", "null"] }
            }
        }
    }"#;

    const SUBPLUGIN_SCHEMA: &str = r#"{
        "type": "object",
        "properties": {
            "plugintypes": {
                "type": "object",
                "additionalProperties": { "type": "string" }
            },
            "subplugintypes": {
                "type": "object",
                "additionalProperties": { "type": "string" }
            }
        }
    }"#;

    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct ComponentManifest {
        pub plugintypes: BTreeMap<String, String>,
        #[serde(default)]
        pub subsystems: BTreeMap<String, Option<String>>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct SubpluginManifest {
        #[serde(default)]
        pub plugintypes: BTreeMap<String, String>,
        /// Newer spelling of the same mapping
        #[serde(default)]
        pub subplugintypes: BTreeMap<String, String>,
    }

    impl SubpluginManifest {
        /// Sub-plugin type to directory relative to the owning plugin
        pub fn types(&self) -> impl Iterator<Item = (&String, &String)> {
            self.plugintypes.iter().chain(self.subplugintypes.iter())
        }
    }

    fn unreadable(path: &Path, reason: impl Into<String>) -> DerootError {
        DerootError::ManifestUnreadable {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    fn validate(path: &Path, schema: &str, data: &Value) -> DerootResult<()> {
        let bad_schema = |e: String| unreadable(path, format!("bad schema: {e}"));
        let schema: Value = serde_json::from_str(schema).map_err(|e| bad_schema(e.to_string()))?;
        let validator = jsonschema::validator_for(&schema).map_err(|e| bad_schema(e.to_string()))?;
        let errors: Vec<String> = validator.iter_errors(data).map(|e| e.to_string()).collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(unreadable(path, errors.join("; ")))
        }
    }

    fn parse_with_schema<T: for<'de> Deserialize<'de>>(
        path: &Path,
        text: &str,
        schema: &str,
    ) -> DerootResult<T> {
        let data: Value =
            serde_json::from_str(text).map_err(|e| unreadable(path, format!("invalid JSON: {e}")))?;
        validate(path, schema, &data)?;
        serde_json::from_value(data).map_err(|e| unreadable(path, e.to_string()))
    }

    pub fn parse_component_manifest(path: &Path, text: &str) -> DerootResult<ComponentManifest> {
        parse_with_schema(path, text, PRIMARY_SCHEMA)
    }

    pub fn parse_subplugin_manifest(path: &Path, text: &str) -> DerootResult<SubpluginManifest> {
        parse_with_schema(path, text, SUBPLUGIN_SCHEMA)
    }

    pub fn load_component_manifest(path: &Path) -> DerootResult<ComponentManifest> {
        let text = std::fs::read_to_string(path).map_err(|e| unreadable(path, e.to_string()))?;
        parse_component_manifest(path, &text)
    }

    /// None when the plugin has no sub-plugin manifest
    pub fn load_subplugin_manifest(path: &Path) -> DerootResult<Option<SubpluginManifest>> {
        if !path.is_file() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path).map_err(|e| unreadable(path, e.to_string()))?;
        parse_subplugin_manifest(path, &text).map(Some)
    }
}
