// Copyright (C) Brian G. Milnes 2025

//! Rewrite applier: splices a batch of edits into one file's bytes

pub mod fixer {
    use std::io::Write;
    use std::path::Path;

    use tempfile::NamedTempFile;

    use crate::analyzer::analyzer::FileAnalysis;
    use crate::error::error::{DerootError, DerootResult};
    use crate::logging::logging::LogBuffer;

    /// Replace `start..end` of the original buffer with `replacement`
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Edit {
        pub start: usize,
        pub end: usize,
        pub replacement: String,
    }

    impl Edit {
        pub fn new(start: usize, end: usize, replacement: impl Into<String>) -> Self {
            Edit {
                start,
                end,
                replacement: replacement.into(),
            }
        }

        /// Change in buffer length once applied
        pub fn delta(&self) -> isize {
            self.replacement.len() as isize - (self.end - self.start) as isize
        }
    }

    /// Apply edits against `original`. Edits are sorted by descending start so
    /// offsets of the ones still pending stay valid. Overlap or an out of range
    /// edit is an invariant violation.
    pub fn apply_edits(original: &[u8], edits: &[Edit], path: &Path) -> DerootResult<Vec<u8>> {
        let mut sorted: Vec<&Edit> = edits.iter().collect();
        sorted.sort_by(|a, b| b.start.cmp(&a.start).then(b.end.cmp(&a.end)));

        let mut previous: Option<&Edit> = None;
        for edit in &sorted {
            if edit.start > edit.end || edit.end > original.len() {
                return Err(DerootError::InvalidRewriteTarget(format!(
                    "edit {}..{} outside {} ({} bytes)",
                    edit.start,
                    edit.end,
                    path.display(),
                    original.len()
                )));
            }
            // `previous` starts at or after this one
            if let Some(later) = previous {
                if edit.end > later.start || edit.start == later.start {
                    return Err(DerootError::OverlappingEdits {
                        path: path.to_path_buf(),
                        first_start: edit.start,
                        first_end: edit.end,
                        second_start: later.start,
                        second_end: later.end,
                    });
                }
            }
            previous = Some(*edit);
        }

        let mut buffer = original.to_vec();
        for edit in sorted {
            buffer.splice(edit.start..edit.end, edit.replacement.bytes());
        }
        Ok(buffer)
    }

    /// Replace `path` with `contents` through a sibling temp file and a rename
    pub fn write_atomic(path: &Path, contents: &[u8]) -> DerootResult<()> {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(contents)?;
        temp.flush()?;
        if let Ok(metadata) = std::fs::metadata(path) {
            std::fs::set_permissions(temp.path(), metadata.permissions())?;
        }
        temp.persist(path).map_err(|e| DerootError::Io(e.error))?;
        Ok(())
    }

    /// Apply and persist; returns whether the file changed
    pub fn rewrite_file(
        path: &Path,
        original: &[u8],
        edits: &[Edit],
        dry_run: bool,
    ) -> DerootResult<bool> {
        if edits.is_empty() {
            return Ok(false);
        }
        let updated = apply_edits(original, edits, path)?;
        if updated == original {
            return Ok(false);
        }
        if !dry_run {
            write_atomic(path, &updated)?;
        }
        Ok(true)
    }

    #[derive(Debug, Default)]
    pub struct RewriteOutcome {
        pub files_changed: usize,
        pub edits_applied: usize,
        pub log: LogBuffer,
    }

    impl RewriteOutcome {
        /// Files whose rewrite could not be written; each left one warning
        pub fn write_failures(&self) -> usize {
            self.log.warnings()
        }
    }

    /// Rewrite every analysed file under `root`. A file that cannot be
    /// written is logged and skipped; overlapping or out of range edits
    /// are still fatal.
    pub fn rewrite_analyses(
        root: &Path,
        analyses: &[FileAnalysis],
        dry_run: bool,
    ) -> DerootResult<RewriteOutcome> {
        let mut outcome = RewriteOutcome::default();
        for analysis in analyses.iter().filter(|a| !a.parse_failed) {
            let edits = analysis.edits();
            match rewrite_file(&root.join(&analysis.file), &analysis.source, &edits, dry_run) {
                Ok(false) => {}
                Ok(true) => {
                    outcome.files_changed += 1;
                    outcome.edits_applied += edits.len();
                    let (count, file) = (edits.len(), &analysis.file);
                    let message = if dry_run {
                        format!("[DRY RUN] Would rewrite {count} path(s) in {file}")
                    } else {
                        format!("Rewrote {count} path(s) in {file}")
                    };
                    outcome.log.info(message);
                }
                Err(DerootError::Io(e)) => {
                    outcome
                        .log
                        .warn(format!("Could not write {}: {e}; left unchanged", analysis.file));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(outcome)
    }
}
