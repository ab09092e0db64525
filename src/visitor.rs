// Copyright (C) Brian G. Milnes 2025

//! Visitor pattern implementation for traversing the PHP node arena

pub mod visitor {
    use crate::ast::ast::{Ast, NodeId};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum WalkEvent {
        Enter(NodeId),
        Leave(NodeId),
    }

    /// Pre-order walk yielding an Enter and a Leave event per node.
    /// Uses an explicit stack; PHP-Parser dumps of generated files nest deep.
    pub struct Preorder<'a> {
        ast: &'a Ast,
        stack: Vec<(NodeId, usize)>,
        pending_root: Option<NodeId>,
    }

    pub fn preorder(ast: &Ast, root: NodeId) -> Preorder<'_> {
        Preorder {
            ast,
            stack: Vec::new(),
            pending_root: Some(root),
        }
    }

    impl Iterator for Preorder<'_> {
        type Item = WalkEvent;

        fn next(&mut self) -> Option<WalkEvent> {
            if let Some(root) = self.pending_root.take() {
                self.stack.push((root, 0));
                return Some(WalkEvent::Enter(root));
            }
            let ast = self.ast;
            let (node, next_child) = self.stack.last_mut()?;
            let node = *node;
            let children = ast.children(node);
            if *next_child < children.len() {
                let child = children[*next_child];
                *next_child += 1;
                self.stack.push((child, 0));
                Some(WalkEvent::Enter(child))
            } else {
                self.stack.pop();
                Some(WalkEvent::Leave(node))
            }
        }
    }

    /// Callbacks driven by `walk`
    pub trait Visitor {
        fn enter(&mut self, _ast: &Ast, _node: NodeId) {}
        fn leave(&mut self, _ast: &Ast, _node: NodeId) {}
    }

    /// Visit every root of the file in document order
    pub fn walk<V: Visitor>(ast: &Ast, visitor: &mut V) {
        for root in ast.roots() {
            for event in preorder(ast, *root) {
                match event {
                    WalkEvent::Enter(node) => visitor.enter(ast, node),
                    WalkEvent::Leave(node) => visitor.leave(ast, node),
                }
            }
        }
    }
}
