// Copyright (C) Brian G. Milnes 2025

//! Deroot - AST-based analysis and rewriting of codebase-root path construction
//!
//! Finds every PHP expression that builds a file path from the codebase root,
//! reduces it to a symbolic path, resolves the component it points into and
//! rewrites it to address that component directly.

pub mod ast;
pub mod ast_utils;
pub mod visitor;
pub mod php_json;
pub mod parser;
pub mod error;
pub mod settings;
pub mod logging;
pub mod tool_runner;
pub mod symbolic;
pub mod categorizer;
pub mod component;
pub mod manifest;
pub mod component_tree;
pub mod resolver;
pub mod path_finder;
pub mod decision;
pub mod fixer;
pub mod analyzer;
pub mod discovery;
pub mod report;
pub mod extract;

// Re-export commonly used items
pub use analyzer::analyzer::{analyze_ast, file_component, Analyzer, FileAnalysis, Finding};
pub use ast::ast::{Ast, NodeId, NodeKind, Span};
pub use categorizer::categorizer::{categorize, PathCategory};
pub use component::component::{Component, ResolvedComponent};
pub use component_tree::component_tree::ComponentTree;
pub use decision::decision::{decide, Action, Decision};
pub use error::error::{DerootError, DerootResult};
pub use fixer::fixer::{apply_edits, Edit};
pub use parser::parser::{provider_for, AstProvider};
pub use path_finder::path_finder::{find_path_expressions, PathExpression};
pub use resolver::resolver::resolve;
pub use settings::settings::Settings;
pub use symbolic::symbolic::normalize;
