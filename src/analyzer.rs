// Copyright (C) Brian G. Milnes 2025

//! Per-file pipeline: parse, find path expressions, categorize, resolve, decide
//!
//! The component tree is shared read-only; files are sharded with rayon and
//! their results come back in input order.

pub mod analyzer {
    use rayon::prelude::*;
    use serde::Serialize;
    use std::path::Path;

    use crate::ast::ast::Ast;
    use crate::categorizer::categorizer::{categorize, PathCategory};
    use crate::component::component::ResolvedComponent;
    use crate::component_tree::component_tree::ComponentTree;
    use crate::decision::decision::{decide, Decision, DecisionInput};
    use crate::error::error::{DerootError, DerootResult};
    use crate::fixer::fixer::Edit;
    use crate::logging::logging::LogBuffer;
    use crate::parser::parser::AstProvider;
    use crate::path_finder::path_finder::{find_path_expressions, PathExpression};
    use crate::resolver::resolver::resolve;
    use crate::settings::settings::Settings;
    use crate::symbolic::symbolic::ROOT;

    #[derive(Debug, Clone, Serialize)]
    pub struct Finding {
        pub file: String,
        pub file_component: ResolvedComponent,
        pub expression: PathExpression,
        pub category: Option<PathCategory>,
        /// None when the component is undeterminable
        pub target: Option<ResolvedComponent>,
        pub decision: Decision,
    }

    impl Finding {
        pub fn needs_review(&self) -> bool {
            self.decision.worth_investigating
        }

        pub fn edit(&self) -> Option<Edit> {
            self.decision
                .replacement
                .as_ref()
                .map(|code| {
                    let span = self.expression.span;
                    Edit::new(span.start, span.end, code.clone())
                })
        }
    }

    #[derive(Debug, Clone, Default)]
    pub struct FileAnalysis {
        pub file: String,
        /// Original bytes; empty when parsing failed
        pub source: Vec<u8>,
        pub findings: Vec<Finding>,
        pub log: LogBuffer,
        pub parse_failed: bool,
    }

    impl FileAnalysis {
        pub fn edits(&self) -> Vec<Edit> {
            self.findings.iter().filter_map(|f| f.edit()).collect()
        }
    }

    pub struct Analyzer<'a> {
        pub tree: &'a ComponentTree,
        pub settings: &'a Settings,
        pub provider: &'a dyn AstProvider,
        pub root: &'a Path,
    }

    /// Component owning a root-relative file
    pub fn file_component(tree: &ComponentTree, relative_file: &str) -> ResolvedComponent {
        resolve(tree, &format!("{ROOT}/{relative_file}")).unwrap_or_else(ResolvedComponent::root)
    }

    /// Findings of one already-parsed file
    pub fn analyze_ast(
        tree: &ComponentTree,
        settings: &Settings,
        ast: &Ast,
        relative_file: &str,
    ) -> DerootResult<Vec<Finding>> {
        let source = file_component(tree, relative_file);
        find_path_expressions(ast, relative_file)
            .into_iter()
            .map(|expression| {
                let category = categorize(&expression.symbolic);
                let target = resolve(tree, &expression.symbolic);
                let decision = decide(&DecisionInput {
                    expression: &expression,
                    category,
                    target: target.as_ref(),
                    source: &source,
                    relative_file,
                    component_api: &settings.component_api,
                })?;
                Ok(Finding {
                    file: relative_file.to_string(),
                    file_component: source.clone(),
                    expression,
                    category,
                    target,
                    decision,
                })
            })
            .collect()
    }

    impl Analyzer<'_> {
        /// Parse failures are logged into the result; anything else is fatal
        pub fn analyze_file(&self, relative_file: &str) -> DerootResult<FileAnalysis> {
            let mut analysis = FileAnalysis {
                file: relative_file.to_string(),
                ..FileAnalysis::default()
            };
            let ast = match self.provider.parse(self.root, relative_file) {
                Ok(ast) => ast,
                Err(e @ DerootError::ParseFailure { .. }) => {
                    analysis.log.warn(format!("{e}; skipped"));
                    analysis.parse_failed = true;
                    return Ok(analysis);
                }
                Err(e) => return Err(e),
            };
            analysis.findings = analyze_ast(self.tree, self.settings, &ast, relative_file)?;
            analysis.source = ast.source().to_vec();
            Ok(analysis)
        }

        pub fn analyze_files(&self, files: &[String]) -> DerootResult<Vec<FileAnalysis>> {
            files.par_iter().map(|file| self.analyze_file(file)).collect()
        }
    }
}
