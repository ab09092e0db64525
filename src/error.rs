// Copyright (C) Brian G. Milnes 2025

//! Error kinds shared by the library
//!
//! An undeterminable component is not an error: resolvers return `None`.

pub mod error {
    use std::path::PathBuf;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum DerootError {
        /// Fatal for the whole run
        #[error("manifest {} is unreadable: {reason}", .path.display())]
        ManifestUnreadable { path: PathBuf, reason: String },

        /// Logged per file; the batch continues
        #[error("failed to parse {}: {reason}", .path.display())]
        ParseFailure { path: PathBuf, reason: String },

        /// The synthetic root and unqualified core identities cannot be addressed by id
        #[error("{0} is not a valid component-addressed rewrite target")]
        InvalidRewriteTarget(String),

        #[error(
            "overlapping edits in {}: {first_start}..{first_end} and {second_start}..{second_end}",
            .path.display()
        )]
        OverlappingEdits {
            path: PathBuf,
            first_start: usize,
            first_end: usize,
            second_start: usize,
            second_end: usize,
        },

        #[error("output directory {} already exists", .0.display())]
        OutputExists(PathBuf),

        #[error("unknown component {0}")]
        UnknownComponent(String),

        #[error(transparent)]
        Io(#[from] std::io::Error),
    }

    pub type DerootResult<T> = std::result::Result<T, DerootError>;
}
