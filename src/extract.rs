// Copyright (C) Brian G. Milnes 2025

//! Extract one component into a standalone directory
//!
//! Files are analysed at their original location, so resolution sees the
//! full codebase, and the decided edits are applied to the copies.

pub mod extract {
    use std::fs;
    use std::path::Path;
    use walkdir::WalkDir;

    use crate::analyzer::analyzer::{Analyzer, FileAnalysis};
    use crate::component::component::Component;
    use crate::component_tree::component_tree::ComponentTree;
    use crate::discovery::discovery::relative_name;
    use crate::error::error::{DerootError, DerootResult};
    use crate::fixer::fixer::rewrite_file;

    #[derive(Debug, Default)]
    pub struct ExtractOutcome {
        pub files_copied: usize,
        pub files_rewritten: usize,
        pub edits_applied: usize,
        pub analyses: Vec<FileAnalysis>,
    }

    /// Root-relative directory of a component id, checked to exist on disk
    pub fn component_source_dir(
        tree: &ComponentTree,
        root: &Path,
        component_id: &str,
    ) -> DerootResult<(Component, String)> {
        let unknown = || DerootError::UnknownComponent(component_id.to_string());
        let component = Component::parse_id(component_id).ok_or_else(unknown)?;
        let dir = tree.component_dir(&component).ok_or_else(unknown)?;
        if dir.is_empty() || !root.join(&dir).is_dir() {
            return Err(unknown());
        }
        Ok((component, dir))
    }

    /// Root-relative files of `dir`, without nested sub-plugin directories
    pub fn component_files(tree: &ComponentTree, root: &Path, dir: &str) -> Vec<String> {
        let excluded = tree.nested_plugin_type_dirs(dir);
        let mut files: Vec<String> = WalkDir::new(root.join(dir))
            .into_iter()
            .filter_entry(|e| {
                !e.file_type().is_dir()
                    || relative_name(root, e.path()).map_or(true, |rel| !excluded.contains(&rel))
            })
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| relative_name(root, e.path()))
            .collect();
        files.sort();
        files
    }

    pub fn extract_component(
        analyzer: &Analyzer<'_>,
        component_id: &str,
        output_dir: &Path,
    ) -> DerootResult<ExtractOutcome> {
        if output_dir.exists() {
            return Err(DerootError::OutputExists(output_dir.to_path_buf()));
        }
        let (_, dir) = component_source_dir(analyzer.tree, analyzer.root, component_id)?;
        let files = component_files(analyzer.tree, analyzer.root, &dir);

        let mut outcome = ExtractOutcome::default();
        let mut php_files = Vec::new();
        fs::create_dir_all(output_dir)?;
        for file in &files {
            let inner = file.strip_prefix(&dir).unwrap_or(file).trim_start_matches('/');
            let target = output_dir.join(inner);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(analyzer.root.join(file), &target)?;
            outcome.files_copied += 1;
            if file.ends_with(".php") {
                php_files.push(file.clone());
            }
        }

        for analysis in analyzer.analyze_files(&php_files)? {
            let edits = analysis.edits();
            let inner = analysis
                .file
                .strip_prefix(&dir)
                .unwrap_or(&analysis.file)
                .trim_start_matches('/');
            if rewrite_file(&output_dir.join(inner), &analysis.source, &edits, false)? {
                outcome.files_rewritten += 1;
                outcome.edits_applied += edits.len();
            }
            outcome.analyses.push(analysis);
        }
        Ok(outcome)
    }
}
