// Copyright (C) Brian G. Milnes 2025

//! Run logging
//!
//! Each run writes logs/<tool-name>/<YYYY-MM-DD>/run-<HH-MM-SS>.log and echoes
//! to stdout. Worker threads never touch the logger: they fill a `LogBuffer`
//! per file, absorbed afterwards in input order.

pub mod logging {
    use anyhow::Result;
    use chrono::{DateTime, Local};
    use std::fs;
    use std::io::Write;
    use std::path::{Path, PathBuf};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Level {
        Info,
        Warning,
    }

    /// Messages gathered while processing one file
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct LogBuffer {
        entries: Vec<(Level, String)>,
    }

    impl LogBuffer {
        pub fn new() -> Self {
            LogBuffer::default()
        }

        pub fn info(&mut self, message: impl Into<String>) {
            self.entries.push((Level::Info, message.into()));
        }

        pub fn warn(&mut self, message: impl Into<String>) {
            self.entries.push((Level::Warning, message.into()));
        }

        pub fn entries(&self) -> &[(Level, String)] {
            &self.entries
        }

        pub fn warnings(&self) -> usize {
            self.entries.iter().filter(|(l, _)| *l == Level::Warning).count()
        }
    }

    pub struct ToolLogger {
        log_file: Option<fs::File>,
        log_path: Option<PathBuf>,
        start_time: DateTime<Local>,
        warnings: usize,
    }

    impl ToolLogger {
        /// Stdout only
        pub fn new_disabled() -> Self {
            ToolLogger {
                log_file: None,
                log_path: None,
                start_time: Local::now(),
                warnings: 0,
            }
        }

        /// Falls back to stdout only when the log file cannot be created
        pub fn new(tool_name: &str) -> Self {
            let start_time = Local::now();
            let (log_file, log_path) = match Self::create_log_file(tool_name, &start_time) {
                Ok((file, path)) => (Some(file), Some(path)),
                Err(e) => {
                    eprintln!("Warning: Could not create log file: {e}");
                    eprintln!("Continuing without logging...");
                    (None, None)
                }
            };
            ToolLogger {
                log_file,
                log_path,
                start_time,
                warnings: 0,
            }
        }

        fn create_log_file(
            tool_name: &str,
            start_time: &DateTime<Local>,
        ) -> Result<(fs::File, PathBuf)> {
            let log_dir = PathBuf::from("logs")
                .join(tool_name)
                .join(start_time.format("%Y-%m-%d").to_string());
            fs::create_dir_all(&log_dir)?;
            let log_path = log_dir.join(format!("run-{}.log", start_time.format("%H-%M-%S")));
            let log_file = fs::File::create(&log_path)?;
            Ok((log_file, log_path))
        }

        pub fn log(&mut self, message: &str) {
            println!("{message}");
            self.log_silent(message);
        }

        /// Log file only
        pub fn log_silent(&mut self, message: &str) {
            if let Some(ref mut file) = self.log_file {
                let _ = writeln!(file, "{message}");
            }
        }

        pub fn warn(&mut self, message: &str) {
            self.warnings += 1;
            eprintln!("Warning: {message}");
            self.log_silent(&format!("Warning: {message}"));
        }

        /// Replay one file's buffered messages
        pub fn absorb(&mut self, buffer: &LogBuffer) {
            for (level, message) in buffer.entries() {
                match level {
                    Level::Info => self.log(message),
                    Level::Warning => self.warn(message),
                }
            }
        }

        pub fn warnings(&self) -> usize {
            self.warnings
        }

        pub fn log_path(&self) -> Option<&Path> {
            self.log_path.as_deref()
        }

        pub fn finalize(&mut self, summary: &str) {
            let end_time = Local::now();
            let duration = end_time.signed_duration_since(self.start_time);
            self.log("");
            self.log("=== Run Summary ===");
            self.log(summary);
            self.log(&format!("Warnings: {}", self.warnings));
            self.log(&format!("Started: {}", self.start_time.format("%Y-%m-%d %H:%M:%S")));
            self.log(&format!("Ended: {}", end_time.format("%Y-%m-%d %H:%M:%S")));
            self.log(&format!("Duration: {}ms", duration.num_milliseconds()));
            if let Some(path) = self.log_path().map(Path::to_path_buf) {
                self.log(&format!("Log saved to: {}", path.display()));
            }
        }
    }

    impl Drop for ToolLogger {
        fn drop(&mut self) {
            if let Some(ref mut file) = self.log_file {
                let _ = file.flush();
            }
        }
    }
}
