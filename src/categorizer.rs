// Copyright (C) Brian G. Milnes 2025

//! Path categorizer: symbolic path to a closed category set
//!
//! Rules are tried most specific first; the opaque shapes come last.

pub mod categorizer {
    use serde::{Deserialize, Serialize};
    use std::fmt;

    use crate::symbolic::symbolic::{
        has_placeholder, is_anchored, is_unanchored, pieces, segments, single_placeholder, Piece,
    };

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum PathCategory {
        DirRoot,
        Config,
        SimpleFile,
        SimpleDir,
        SingleVar,
        FullRelativePath,
        Suspect,
        Glob,
        FullDirRelative,
        SimpleDynamicFile,
        FilenameSubstitution,
    }

    impl PathCategory {
        /// Shapes that never get an automatic replacement
        pub fn needs_manual_review(self) -> bool {
            matches!(
                self,
                PathCategory::SingleVar
                    | PathCategory::Suspect
                    | PathCategory::Glob
                    | PathCategory::FullDirRelative
            )
        }
    }

    impl fmt::Display for PathCategory {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{self:?}")
        }
    }

    fn has_extension(segment: &str) -> bool {
        match segment.rfind('.') {
            Some(dot) => {
                let ext = &segment[dot + 1..];
                dot > 0 && !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())
            }
            None => false,
        }
    }

    /// `@` somewhere other than the leading anchor, e.g. a root-derived
    /// value passed into a call inside a placeholder
    fn has_embedded_root(path: &str) -> bool {
        path.char_indices().any(|(i, c)| c == '@' && i > 0)
    }

    fn has_wildcard(path: &str) -> bool {
        pieces(path)
            .iter()
            .any(|p| matches!(p, Piece::Literal(text) if text.contains('*')))
    }

    /// Classify a normalized symbolic path; None for shapes outside every rule
    pub fn categorize(path: &str) -> Option<PathCategory> {
        if path == "@" || path == "@/" {
            return Some(PathCategory::DirRoot);
        }
        if path == "@/config.php" {
            return Some(PathCategory::Config);
        }
        if has_embedded_root(path) {
            return Some(PathCategory::Suspect);
        }
        if has_wildcard(path) {
            return Some(PathCategory::Glob);
        }
        if single_placeholder(path).is_some() {
            return Some(PathCategory::SingleVar);
        }
        // `$CFG->dirroot . $relativepath` gives `@{$relativepath}`, no separator
        if let Some(rest) = path.strip_prefix('@').map(|r| r.strip_prefix('/').unwrap_or(r)) {
            if single_placeholder(rest).is_some() {
                return Some(PathCategory::FullRelativePath);
            }
        }
        if is_unanchored(path) {
            return Some(PathCategory::FullDirRelative);
        }
        if !is_anchored(path) {
            return None;
        }

        let segs = segments(path);
        let last = segs.last().copied().unwrap_or("");
        if !has_placeholder(path) {
            return if has_extension(last) {
                Some(PathCategory::SimpleFile)
            } else {
                Some(PathCategory::SimpleDir)
            };
        }

        let dirs_dynamic = segs[..segs.len() - 1].iter().any(|s| has_placeholder(s));
        if dirs_dynamic {
            Some(PathCategory::SimpleDynamicFile)
        } else {
            Some(PathCategory::FilenameSubstitution)
        }
    }
}
