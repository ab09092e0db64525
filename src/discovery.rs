// Copyright (C) Brian G. Milnes 2025

//! PHP file discovery under a codebase root

pub mod discovery {
    use std::path::Path;
    use walkdir::{DirEntry, WalkDir};

    fn is_skipped(entry: &DirEntry, skip_dirs: &[String]) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| skip_dirs.iter().any(|s| s == name))
    }

    /// Root-relative `/`-separated path
    pub fn relative_name(root: &Path, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(root).ok()?;
        let parts: Vec<&str> = rel.components().filter_map(|c| c.as_os_str().to_str()).collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("/"))
        }
    }

    /// Every `*.php` file below `dir`, root-relative and sorted
    pub fn find_php_files_in(root: &Path, dir: &Path, skip_dirs: &[String]) -> Vec<String> {
        let mut files: Vec<String> = WalkDir::new(dir)
            .into_iter()
            .filter_entry(|e| !is_skipped(e, skip_dirs))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "php"))
            .filter_map(|e| relative_name(root, e.path()))
            .collect();
        files.sort();
        files
    }

    pub fn find_php_files(root: &Path, skip_dirs: &[String]) -> Vec<String> {
        find_php_files_in(root, root, skip_dirs)
    }
}
