// Copyright (C) Brian G. Milnes 2025

//! AST providers
//!
//! PHP is never tokenized here. An external PHP-Parser produces a JSON dump,
//! either on demand (`CommandProvider`) or ahead of time (`DumpDirProvider`).

pub mod parser {
    use std::path::{Path, PathBuf};
    use std::process::Command;

    use crate::ast::ast::Ast;
    use crate::error::error::{DerootError, DerootResult};
    use crate::php_json::php_json::{extract_json_dump, lower};
    use crate::settings::settings::ParserSettings;

    pub trait AstProvider: Sync {
        /// Parse `<root>/<relative_file>`
        fn parse(&self, root: &Path, relative_file: &str) -> DerootResult<Ast>;
    }

    fn parse_failure(path: &Path, reason: impl Into<String>) -> DerootError {
        DerootError::ParseFailure {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    fn read_source(path: &Path) -> DerootResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| parse_failure(path, e.to_string()))
    }

    /// Runs `<program> <args...> <file>` and lowers its stdout
    pub struct CommandProvider {
        pub program: String,
        pub args: Vec<String>,
    }

    impl AstProvider for CommandProvider {
        fn parse(&self, root: &Path, relative_file: &str) -> DerootResult<Ast> {
            let path = root.join(relative_file);
            let source = read_source(&path)?;
            let output = Command::new(&self.program)
                .args(&self.args)
                .arg(&path)
                .output()
                .map_err(|e| parse_failure(&path, format!("failed to run {}: {e}", self.program)))?;
            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(parse_failure(&path, stderr.trim().to_string()));
            }
            let stdout = String::from_utf8_lossy(&output.stdout);
            lower(source, extract_json_dump(&stdout))
                .map_err(|e| parse_failure(&path, format!("{e:#}")))
        }
    }

    /// Reads `<dump_dir>/<relative_file>.json`
    pub struct DumpDirProvider {
        pub dump_dir: PathBuf,
    }

    impl DumpDirProvider {
        pub fn dump_path(&self, relative_file: &str) -> PathBuf {
            self.dump_dir.join(format!("{relative_file}.json"))
        }
    }

    impl AstProvider for DumpDirProvider {
        fn parse(&self, root: &Path, relative_file: &str) -> DerootResult<Ast> {
            let path = root.join(relative_file);
            let source = read_source(&path)?;
            let dump_path = self.dump_path(relative_file);
            let json = std::fs::read_to_string(&dump_path).map_err(|e| {
                parse_failure(&path, format!("no AST dump at {}: {e}", dump_path.display()))
            })?;
            lower(source, extract_json_dump(&json))
                .map_err(|e| parse_failure(&path, format!("{e:#}")))
        }
    }

    pub fn provider_for(settings: &ParserSettings) -> Box<dyn AstProvider> {
        match &settings.dump_dir {
            Some(dump_dir) => Box::new(DumpDirProvider {
                dump_dir: dump_dir.clone(),
            }),
            None => Box::new(CommandProvider {
                program: settings.program.clone(),
                args: settings.args.clone(),
            }),
        }
    }
}
