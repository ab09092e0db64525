// Copyright (C) Brian G. Milnes 2025

//! Path resolution engine
//!
//! Pass 1 walks top-down and marks path roots: include operands,
//! `$CFG->dirroot` / `$CFG->libdir`, `__DIR__` and `__FILE__`. From each
//! marker it climbs through concatenations, interpolated strings and
//! `dirname()` arguments to the outermost path-building expression.
//!
//! Pass 2 walks again and computes every node's contribution on leave,
//! bottom-up, into a side table indexed by node id. The outermost node ends
//! up with the whole symbolic path, which is then normalized.
//!
//! Unknown shapes degrade to an opaque or empty contribution; nothing here fails.

pub mod path_finder {
    use serde::Serialize;
    use std::collections::BTreeSet;

    use crate::ast::ast::{Ast, NodeId, NodeKind, Span};
    use crate::ast_utils::ast_utils::{
        ancestors, descendants, has_parent_where, is_inside_node_where, is_variable_named,
        nearest_ancestor_where, node_text,
    };
    use crate::symbolic::symbolic::{
        collapse_dots, drop_last_segment, is_anchored, is_literal, normalize, placeholder,
        quote_php, segments, single_placeholder, to_php_expr, ROOT,
    };
    use crate::visitor::visitor::{walk, Visitor};

    pub const ROOT_CONFIG_VAR: &str = "CFG";

    /// `$CFG` fields holding paths, with their contribution
    const ROOT_CONFIG_FIELDS: [(&str, &str); 3] =
        [("dirroot", "@"), ("libdir", "@/lib"), ("admin", "admin")];

    /// Fields that start a candidate on their own. `admin` is a bare
    /// directory name and only counts alongside another marker.
    const ROOT_CONFIG_MARKERS: [&str; 2] = ["dirroot", "libdir"];

    const DIRECTORY_SEPARATOR: &str = "DIRECTORY_SEPARATOR";

    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
    pub struct PathFlags {
        /// Operand of include / require
        pub is_include: bool,
        /// Property default, constant or parameter default: no calls allowed
        pub in_constant_context: bool,
        /// Reads `$CFG`
        pub root_config_used: bool,
        /// `$CFG` is visible: top-level code or `global $CFG` in the function
        pub root_config_in_scope: bool,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
    pub struct PathExpression {
        pub span: Span,
        pub start_line: usize,
        pub end_line: usize,
        /// Smallest enclosing expression (or statement)
        pub containing: Span,
        pub source: String,
        pub symbolic: String,
        pub flags: PathFlags,
    }

    /// Root-relative directory of a root-relative file path
    pub fn file_dir(relative_file: &str) -> &str {
        match relative_file.rfind('/') {
            Some(idx) => &relative_file[..idx],
            None => "",
        }
    }

    fn root_config_field<'a>(ast: &'a Ast, node: NodeId) -> Option<&'a str> {
        let NodeKind::PropertyFetch { name: Some(field) } = ast.kind(node) else {
            return None;
        };
        let base = ast.child_by_role(node, "var")?;
        if is_variable_named(ast, base, ROOT_CONFIG_VAR) {
            Some(field.as_str())
        } else {
            None
        }
    }

    fn is_dirname_call(kind: &NodeKind) -> bool {
        matches!(
            kind,
            NodeKind::FuncCall { name: Some(name) } if name.eq_ignore_ascii_case("dirname")
        )
    }

    struct MarkPass {
        recorded: BTreeSet<NodeId>,
    }

    impl MarkPass {
        fn is_assignment_target(ast: &Ast, node: NodeId) -> bool {
            ast.parent(node).is_some_and(|p| {
                matches!(ast.kind(p), NodeKind::Assign) && ast.node(node).role == "var"
            })
        }

        /// Outermost path-building expression above a marker, None when the
        /// marker is being assigned to
        fn climb(ast: &Ast, marker: NodeId) -> Option<NodeId> {
            let mut current = marker;
            loop {
                if Self::is_assignment_target(ast, current) {
                    return None;
                }
                let Some(parent) = ast.parent(current) else {
                    return Some(current);
                };
                match ast.kind(parent) {
                    NodeKind::Concat | NodeKind::InterpolatedString => current = parent,
                    NodeKind::Arg => match ast.parent(parent) {
                        Some(call) if is_dirname_call(ast.kind(call)) => current = call,
                        _ => return Some(current),
                    },
                    _ => return Some(current),
                }
            }
        }
    }

    impl Visitor for MarkPass {
        fn enter(&mut self, ast: &Ast, node: NodeId) {
            match ast.kind(node) {
                NodeKind::Include(_) => {
                    if let Some(operand) = ast.child_by_role(node, "expr") {
                        self.recorded.insert(operand);
                    }
                }
                NodeKind::MagicDir | NodeKind::MagicFile => {
                    if let Some(top) = Self::climb(ast, node) {
                        // A bare constant does not depend on the root
                        if top != node {
                            self.recorded.insert(top);
                        }
                    }
                }
                NodeKind::PropertyFetch { .. } => {
                    let is_marker = root_config_field(ast, node)
                        .is_some_and(|f| ROOT_CONFIG_MARKERS.contains(&f));
                    if is_marker {
                        if let Some(top) = Self::climb(ast, node) {
                            self.recorded.insert(top);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Bottom-up contribution side table
    struct ResolvePass<'f> {
        relative_file: &'f str,
        recorded: &'f BTreeSet<NodeId>,
        contributions: Vec<Option<String>>,
        depth: usize,
        results: Vec<(NodeId, String)>,
    }

    impl ResolvePass<'_> {
        fn contribution_of(&self, node: NodeId) -> &str {
            self.contributions[node.index()].as_deref().unwrap_or("")
        }

        fn concat_children(&self, ast: &Ast, node: NodeId) -> String {
            ast.children(node).iter().map(|c| self.contribution_of(*c)).collect()
        }

        /// PHP rendering of an operand inside a placeholder
        fn render_operand(&self, ast: &Ast, node: NodeId) -> String {
            let node = match ast.kind(node) {
                NodeKind::Arg => ast.child_by_role(node, "value").unwrap_or(node),
                _ => node,
            };
            let contribution = self.contribution_of(node);
            match ast.kind(node) {
                NodeKind::NumberLiteral(text) => return text.clone(),
                NodeKind::StringLiteral(text) => return quote_php(text),
                _ => {}
            }
            if contribution.is_empty() {
                return node_text(ast, node);
            }
            if is_literal(contribution) {
                return quote_php(contribution);
            }
            if let Some(inner) = single_placeholder(contribution) {
                return inner.to_string();
            }
            to_php_expr(contribution).unwrap_or_else(|| contribution.to_string())
        }

        fn render_args(&self, ast: &Ast, call: NodeId) -> String {
            ast.children_by_role(call, "args")
                .map(|arg| self.render_operand(ast, arg))
                .collect::<Vec<_>>()
                .join(", ")
        }

        fn callee_name(ast: &Ast, call: NodeId, name: &Option<String>) -> String {
            match name {
                Some(name) => name.clone(),
                None => ast
                    .child_by_role(call, "name")
                    .map(|n| node_text(ast, n))
                    .unwrap_or_default(),
            }
        }

        fn class_name(ast: &Ast, node: NodeId, class: &Option<String>) -> String {
            match class {
                Some(class) => class.clone(),
                None => ast
                    .child_by_role(node, "class")
                    .map(|n| node_text(ast, n))
                    .unwrap_or_default(),
            }
        }

        fn dirname(&self, ast: &Ast, call: NodeId) -> String {
            let args: Vec<NodeId> = ast.children_by_role(call, "args").collect();
            let Some(first) = args.first() else {
                return String::new();
            };
            let levels = args
                .get(1)
                .and_then(|a| ast.child_by_role(*a, "value"))
                .and_then(|v| match ast.kind(v) {
                    NodeKind::NumberLiteral(n) => n.parse::<usize>().ok(),
                    _ => None,
                })
                .unwrap_or(1);

            let mut value = self.contribution_of(*first).to_string();
            if is_anchored(&value) {
                value = collapse_dots(&value);
            }
            // One level per segment reaches `@/..`; the rest would only repeat
            let levels = levels.min(segments(&value).len().max(1));
            for _ in 0..levels {
                if value == ROOT {
                    value = format!("{ROOT}/..");
                    continue;
                }
                match drop_last_segment(&value) {
                    Some(parent) => value = parent,
                    None => {
                        return placeholder(&format!("dirname({})", self.render_args(ast, call)));
                    }
                }
            }
            value
        }

        fn compute(&self, ast: &Ast, node: NodeId) -> String {
            match ast.kind(node) {
                NodeKind::StringLiteral(value)
                | NodeKind::InterpolatedPart(value)
                | NodeKind::NumberLiteral(value) => value.clone(),
                NodeKind::MagicDir => {
                    let dir = file_dir(self.relative_file);
                    if dir.is_empty() {
                        ROOT.to_string()
                    } else {
                        format!("{ROOT}/{dir}")
                    }
                }
                NodeKind::MagicFile => format!("{ROOT}/{}", self.relative_file),
                NodeKind::ConstFetch(name) => match name.as_str() {
                    DIRECTORY_SEPARATOR => "/".to_string(),
                    _ => placeholder(name),
                },
                NodeKind::Variable { name: Some(name) } if name == ROOT_CONFIG_VAR => String::new(),
                NodeKind::Variable { name: Some(name) } => placeholder(&format!("${name}")),
                NodeKind::Variable { name: None } => placeholder(ast.text(node).trim()),
                NodeKind::PropertyFetch { name } => {
                    if let Some(field) = root_config_field(ast, node) {
                        let known = ROOT_CONFIG_FIELDS.iter().find(|(f, _)| *f == field);
                        if let Some((_, value)) = known {
                            return value.to_string();
                        }
                    }
                    let base = ast
                        .child_by_role(node, "var")
                        .map(|b| self.render_operand(ast, b))
                        .unwrap_or_default();
                    let field = match name {
                        Some(name) => name.clone(),
                        None => ast
                            .child_by_role(node, "name")
                            .map(|n| format!("{{{}}}", self.render_operand(ast, n)))
                            .unwrap_or_default(),
                    };
                    placeholder(&format!("{base}->{field}"))
                }
                NodeKind::StaticPropertyFetch { class, name } => {
                    let class = Self::class_name(ast, node, class);
                    let name = name.clone().unwrap_or_else(|| node_text(ast, node));
                    placeholder(&format!("{class}::${name}"))
                }
                NodeKind::ArrayDimFetch => {
                    let base = ast
                        .child_by_role(node, "var")
                        .map(|b| self.render_operand(ast, b))
                        .unwrap_or_default();
                    let dim = ast
                        .child_by_role(node, "dim")
                        .map(|d| self.render_operand(ast, d))
                        .unwrap_or_default();
                    placeholder(&format!("{base}[{dim}]"))
                }
                NodeKind::ClassConstFetch { class, name } => {
                    let class = Self::class_name(ast, node, class);
                    placeholder(&format!("{class}::{}", name.clone().unwrap_or_default()))
                }
                kind if is_dirname_call(kind) => self.dirname(ast, node),
                NodeKind::FuncCall { name } => {
                    let callee = Self::callee_name(ast, node, name);
                    placeholder(&format!("{callee}({})", self.render_args(ast, node)))
                }
                NodeKind::MethodCall { name } => {
                    let base = ast
                        .child_by_role(node, "var")
                        .map(|b| self.render_operand(ast, b))
                        .unwrap_or_default();
                    let callee = Self::callee_name(ast, node, name);
                    placeholder(&format!("{base}->{callee}({})", self.render_args(ast, node)))
                }
                NodeKind::StaticCall { class, name } => {
                    let class = Self::class_name(ast, node, class);
                    let callee = Self::callee_name(ast, node, name);
                    placeholder(&format!("{class}::{callee}({})", self.render_args(ast, node)))
                }
                NodeKind::Ternary => placeholder(&format!("({})", ast.text(node).trim())),
                NodeKind::Concat | NodeKind::InterpolatedString | NodeKind::Arg => {
                    self.concat_children(ast, node)
                }
                _ => String::new(),
            }
        }
    }

    impl Visitor for ResolvePass<'_> {
        fn enter(&mut self, _ast: &Ast, node: NodeId) {
            if self.recorded.contains(&node) {
                self.depth += 1;
            }
        }

        fn leave(&mut self, ast: &Ast, node: NodeId) {
            if self.depth == 0 {
                return;
            }
            let value = self.compute(ast, node);
            self.contributions[node.index()] = Some(value);
            if self.recorded.contains(&node) {
                self.depth -= 1;
                let raw = self.contribution_of(node).to_string();
                let dir = file_dir(self.relative_file);
                self.results.push((node, normalize(&raw, dir)));
            }
        }
    }

    fn containing_span(ast: &Ast, node: NodeId) -> Span {
        nearest_ancestor_where(ast, node, |k| k.is_expression())
            .or_else(|| nearest_ancestor_where(ast, node, |k| k.is_statement()))
            .map(|n| ast.node(n).span)
            .unwrap_or(ast.node(node).span)
    }

    fn root_config_in_scope(ast: &Ast, node: NodeId) -> bool {
        let is_function = |k: &NodeKind| matches!(k, NodeKind::FunctionLike);
        let Some(function) = nearest_ancestor_where(ast, node, is_function) else {
            return true;
        };
        descendants(ast, function).into_iter().any(|n| {
            matches!(ast.kind(n), NodeKind::Global)
                && nearest_ancestor_where(ast, n, is_function) == Some(function)
                && ast.children(n).iter().any(|v| is_variable_named(ast, *v, ROOT_CONFIG_VAR))
        })
    }

    fn flags(ast: &Ast, node: NodeId) -> PathFlags {
        let root_config_used = is_variable_named(ast, node, ROOT_CONFIG_VAR)
            || descendants(ast, node)
                .into_iter()
                .any(|n| is_variable_named(ast, n, ROOT_CONFIG_VAR));
        PathFlags {
            is_include: has_parent_where(ast, node, |k| matches!(k, NodeKind::Include(_))),
            in_constant_context: is_inside_node_where(ast, node, |k| {
                matches!(k, NodeKind::Property | NodeKind::Constant | NodeKind::Param)
            }),
            root_config_used,
            root_config_in_scope: root_config_in_scope(ast, node),
        }
    }

    /// Discover every path expression in one file, in document order.
    /// `relative_file` is the file's path relative to the codebase root.
    pub fn find_path_expressions(ast: &Ast, relative_file: &str) -> Vec<PathExpression> {
        let mut marks = MarkPass {
            recorded: BTreeSet::new(),
        };
        walk(ast, &mut marks);

        // Keep outermost records only; nested ones would produce overlapping edits
        let recorded: BTreeSet<NodeId> = marks
            .recorded
            .iter()
            .copied()
            .filter(|n| !ancestors(ast, *n).any(|a| marks.recorded.contains(&a)))
            .collect();

        let mut resolve = ResolvePass {
            relative_file,
            recorded: &recorded,
            contributions: vec![None; ast.len()],
            depth: 0,
            results: Vec::new(),
        };
        walk(ast, &mut resolve);

        resolve
            .results
            .into_iter()
            .map(|(node, symbolic)| {
                let n = ast.node(node);
                PathExpression {
                    span: n.span,
                    start_line: n.start_line,
                    end_line: n.end_line,
                    containing: containing_span(ast, node),
                    source: ast.text(node),
                    symbolic,
                    flags: flags(ast, node),
                }
            })
            .collect()
    }
}
