// Copyright (C) Brian G. Milnes 2025

//! Rewrite decision table
//!
//! Maps (category, source component, target component, flags) to at most one
//! replacement for a path expression, plus the reason for the choice.

pub mod decision {
    use serde::Serialize;

    use crate::categorizer::categorizer::PathCategory;
    use crate::component::component::{Component, ResolvedComponent};
    use crate::error::error::{DerootError, DerootResult};
    use crate::path_finder::path_finder::{file_dir, PathExpression};
    use crate::symbolic::symbolic::{
        quote_php, segments, single_placeholder, strip_root, to_php_expr,
    };

    pub const CONFIG_FILE: &str = "config.php";

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
    pub enum Action {
        Keep,
        RelativeDirectory,
        ComponentId,
        DynamicComponentId,
        RootRelative,
        CorePath,
    }

    impl Action {
        /// The replacement is a function call, illegal in constant expressions
        pub fn is_call(self) -> bool {
            matches!(
                self,
                Action::ComponentId
                    | Action::DynamicComponentId
                    | Action::RootRelative
                    | Action::CorePath
            )
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
    pub struct Decision {
        pub action: Action,
        pub replacement: Option<String>,
        pub explanation: String,
        pub worth_investigating: bool,
    }

    impl Decision {
        fn keep(explanation: impl Into<String>, worth_investigating: bool) -> Self {
            Decision {
                action: Action::Keep,
                replacement: None,
                explanation: explanation.into(),
                worth_investigating,
            }
        }

        fn rewrite(action: Action, replacement: String, explanation: impl Into<String>) -> Self {
            Decision {
                action,
                replacement: Some(replacement),
                explanation: explanation.into(),
                worth_investigating: false,
            }
        }
    }

    /// Shortest `..`-padded path from `source_dir` to `target`, both given as
    /// root-relative segments. At least one `..` is emitted whenever the
    /// source directory is not the root.
    pub fn relative_path(source_dir: &[&str], target: &[&str]) -> String {
        let limit = source_dir.len().saturating_sub(1).min(target.len());
        let common = source_dir
            .iter()
            .zip(target)
            .take(limit)
            .take_while(|(a, b)| a == b)
            .count();
        let mut parts: Vec<&str> = vec![".."; source_dir.len() - common];
        parts.extend_from_slice(&target[common..]);
        parts.join("/")
    }

    /// `__DIR__ . '/<relative>'`, placeholders spliced in as expressions
    pub fn relative_directory_expr(relative: &str) -> Option<String> {
        let tail = to_php_expr(&format!("/{relative}"))?;
        Some(format!("__DIR__ . {tail}"))
    }

    fn php_fragment(fragment: &str) -> DerootResult<String> {
        to_php_expr(fragment).ok_or_else(|| {
            let reason = format!("path fragment {fragment} holds the root anchor");
            DerootError::InvalidRewriteTarget(reason)
        })
    }

    /// `<api>::get_component_path('<id>', '<relative>')`; the relative
    /// argument is omitted when empty
    pub fn component_path_call(
        api: &str,
        component: &Component,
        relative: &str,
    ) -> DerootResult<String> {
        let id = match component {
            Component::Root | Component::CoreLibrary => {
                return Err(DerootError::InvalidRewriteTarget(component.to_string()));
            }
            Component::Plugin { plugin_type, name } if component.has_dynamic_name() => {
                format!("{} . {}", quote_php(&format!("{plugin_type}_")), php_fragment(name)?)
            }
            _ => quote_php(&component.id()),
        };
        if relative.is_empty() {
            Ok(format!("{api}::get_component_path({id})"))
        } else {
            Ok(format!("{api}::get_component_path({id}, {})", php_fragment(relative)?))
        }
    }

    pub fn core_path_call(api: &str, suffix: &str) -> DerootResult<String> {
        Ok(format!("{api}::get_core_path({})", php_fragment(suffix)?))
    }

    pub fn root_relative_call(api: &str, expr: &str) -> String {
        format!("{api}::get_path_from_relative({expr})")
    }

    /// Root-relative suffix of a core target, for `get_core_path`
    fn core_suffix(target: &ResolvedComponent) -> String {
        match (&target.component, target.relative_path.is_empty()) {
            (Component::CoreLibrary, true) => "lib".to_string(),
            (Component::CoreLibrary, false) => format!("lib/{}", target.relative_path),
            _ => target.relative_path.clone(),
        }
    }

    fn dir_segments(relative_file: &str) -> Vec<&str> {
        file_dir(relative_file).split('/').filter(|s| !s.is_empty()).collect()
    }

    pub struct DecisionInput<'a> {
        pub expression: &'a PathExpression,
        pub category: Option<PathCategory>,
        pub target: Option<&'a ResolvedComponent>,
        /// Component owning the file the expression lives in
        pub source: &'a ResolvedComponent,
        pub relative_file: &'a str,
        pub component_api: &'a str,
    }

    /// Decide the replacement for one path expression
    pub fn decide(input: &DecisionInput<'_>) -> DerootResult<Decision> {
        let decision = decide_by_category(input)?;
        if input.expression.flags.in_constant_context && decision.action.is_call() {
            return Ok(Decision::keep(
                format!("constant expression cannot hold a call ({})", decision.explanation),
                true,
            ));
        }
        let flags = input.expression.flags;
        if decision.replacement.is_some() && flags.root_config_used && !flags.root_config_in_scope {
            return Ok(Decision {
                explanation: format!("{}; $CFG is not declared global here", decision.explanation),
                worth_investigating: true,
                ..decision
            });
        }
        Ok(decision)
    }

    fn decide_by_category(input: &DecisionInput<'_>) -> DerootResult<Decision> {
        let expression = input.expression;
        if let Some(category) = input.category.filter(|c| c.needs_manual_review()) {
            return Ok(Decision::keep(format!("{category} paths need manual review"), true));
        }
        if !expression.flags.root_config_used {
            return Ok(Decision::keep("does not read the codebase root", false));
        }

        match input.category {
            Some(PathCategory::DirRoot) => return Ok(Decision::keep("bare codebase root", true)),
            Some(PathCategory::Config) => {
                if input.source.component.is_core() {
                    return Ok(Decision::keep("config inclusion from core", false));
                }
                let relative = relative_path(&dir_segments(input.relative_file), &[CONFIG_FILE]);
                return Ok(match relative_directory_expr(&relative) {
                    Some(code) => Decision::rewrite(
                        Action::RelativeDirectory,
                        code,
                        "config inclusion from a plugin",
                    ),
                    None => Decision::keep("config path cannot be rendered", true),
                });
            }
            Some(PathCategory::FullRelativePath) => {
                let inner = strip_root(&expression.symbolic)
                    .and_then(single_placeholder)
                    .unwrap_or_default();
                return Ok(Decision::rewrite(
                    Action::RootRelative,
                    root_relative_call(input.component_api, inner),
                    "whole root-relative path is dynamic",
                ));
            }
            _ => {}
        }

        let Some(target) = input.target else {
            return Ok(Decision::keep("component undeterminable", true));
        };

        if target.component.has_dynamic_name() {
            return Ok(Decision::rewrite(
                Action::DynamicComponentId,
                component_path_call(input.component_api, &target.component, &target.relative_path)?,
                "dynamic plugin name",
            ));
        }

        let source = &input.source.component;
        if source == &target.component && !source.is_core() {
            let Some(rest) = strip_root(&expression.symbolic) else {
                return Ok(Decision::keep("unanchored path", true));
            };
            let target_segments: Vec<&str> =
                segments(rest).into_iter().filter(|s| !s.is_empty()).collect();
            let relative = relative_path(&dir_segments(input.relative_file), &target_segments);
            return Ok(match relative_directory_expr(&relative) {
                Some(code) => Decision::rewrite(
                    Action::RelativeDirectory,
                    code,
                    "reference within the same plugin",
                ),
                None => Decision::keep("relative path cannot be rendered", true),
            });
        }

        if source.is_core() && target.component.is_core() {
            return Ok(Decision::keep("core to core reference", false));
        }

        if target.component.is_synthetic() {
            return Ok(Decision::rewrite(
                Action::CorePath,
                core_path_call(input.component_api, &core_suffix(target))?,
                "reference into core code outside any subsystem",
            ));
        }

        Ok(Decision::rewrite(
            Action::ComponentId,
            component_path_call(input.component_api, &target.component, &target.relative_path)?,
            format!("reference into {}", target.component),
        ))
    }
}
