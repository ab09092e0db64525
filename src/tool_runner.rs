// Copyright (C) Brian G. Milnes 2025

//! Shared wrapper for the deroot binaries: directory banner for compile-mode,
//! optional file logging, summary and timing.

pub mod tool_runner {
    use anyhow::Result;
    use std::path::PathBuf;
    use std::time::Instant;

    use crate::logging::logging::ToolLogger;

    pub struct ToolConfig {
        /// Directory name under logs/
        pub tool_name: String,
        /// Codebase root shown in "Entering directory"
        pub base_dir: PathBuf,
        pub enable_logging: bool,
    }

    impl ToolConfig {
        pub fn new(tool_name: &str, base_dir: PathBuf) -> Self {
            ToolConfig {
                tool_name: tool_name.to_string(),
                base_dir,
                enable_logging: true,
            }
        }

        pub fn without_logging(mut self) -> Self {
            self.enable_logging = false;
            self
        }
    }

    /// Run `tool_fn` with timing and a logger; it returns the summary line.
    ///
    /// ```no_run
    /// use deroot::tool_runner::tool_runner::{run_tool, ToolConfig};
    /// let config = ToolConfig::new("deroot-find-paths", ".".into());
    /// run_tool(config, |logger| {
    ///     logger.log("Scanning...");
    ///     Ok("Summary: 0 files".to_string())
    /// })
    /// .ok();
    /// ```
    pub fn run_tool<F>(config: ToolConfig, tool_fn: F) -> Result<()>
    where
        F: FnOnce(&mut ToolLogger) -> Result<String>,
    {
        let start = Instant::now();

        println!("Entering directory '{}'", config.base_dir.display());
        println!();

        let mut logger = if config.enable_logging {
            ToolLogger::new(&config.tool_name)
        } else {
            ToolLogger::new_disabled()
        };

        let summary = tool_fn(&mut logger)?;

        println!();
        println!("{summary}");
        println!("Completed in {}ms", start.elapsed().as_millis());

        if config.enable_logging {
            logger.finalize(&summary);
        }
        Ok(())
    }
}
