// Copyright (C) Brian G. Milnes 2025

//! AST traversal utilities for analyzing PHP code
//!
//! Provides common functions for walking and querying the node arena

pub mod ast_utils {
    use crate::ast::ast::{Ast, NodeId, NodeKind};
    use crate::visitor::visitor::{preorder, WalkEvent};

    /// Find all nodes matching a predicate, in document order
    pub fn find_nodes_where<F>(ast: &Ast, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&NodeKind) -> bool,
    {
        let mut results = Vec::new();

        for root in ast.roots() {
            for event in preorder(ast, *root) {
                if let WalkEvent::Enter(node) = event {
                    if predicate(ast.kind(node)) {
                        results.push(node);
                    }
                }
            }
        }

        results
    }

    /// Iterate strict ancestors, nearest first
    pub fn ancestors(ast: &Ast, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(ast.parent(node), move |n| ast.parent(*n))
    }

    /// Check if a node is inside another node matching the predicate
    pub fn is_inside_node_where<F>(ast: &Ast, node: NodeId, predicate: F) -> bool
    where
        F: Fn(&NodeKind) -> bool,
    {
        ancestors(ast, node).any(|a| predicate(ast.kind(a)))
    }

    /// Nearest ancestor matching the predicate
    pub fn nearest_ancestor_where<F>(ast: &Ast, node: NodeId, predicate: F) -> Option<NodeId>
    where
        F: Fn(&NodeKind) -> bool,
    {
        ancestors(ast, node).find(|a| predicate(ast.kind(*a)))
    }

    /// Check if a node has a parent matching the predicate
    pub fn has_parent_where<F>(ast: &Ast, node: NodeId, predicate: F) -> bool
    where
        F: Fn(&NodeKind) -> bool,
    {
        ast.parent(node).is_some_and(|p| predicate(ast.kind(p)))
    }

    /// Every node below `root`, excluding `root` itself
    pub fn descendants(ast: &Ast, root: NodeId) -> Vec<NodeId> {
        preorder(ast, root)
            .filter_map(|event| match event {
                WalkEvent::Enter(n) if n != root => Some(n),
                _ => None,
            })
            .collect()
    }

    /// `$CFG`-style variable reference by name
    pub fn is_variable_named(ast: &Ast, node: NodeId, name: &str) -> bool {
        matches!(ast.kind(node), NodeKind::Variable { name: Some(n) } if n == name)
    }

    /// Get the text content of a node, trimmed
    pub fn node_text(ast: &Ast, node: NodeId) -> String {
        ast.text(node).trim().to_string()
    }

    /// Get the line number of a byte offset (1-indexed)
    pub fn line_number(source: &[u8], offset: usize) -> usize {
        let end = offset.min(source.len());
        source[..end].iter().filter(|b| **b == b'\n').count() + 1
    }
}
