// Copyright (C) Brian G. Milnes 2025

//! Arena representation of one parsed PHP file
//!
//! Nodes live in a flat vector and refer to each other by index, so parent
//! walks are index lookups. The node kinds cover exactly the shapes that take
//! part in path construction; everything else lands in `NodeKind::Other`.

pub mod ast {
    use serde::Serialize;
    use std::ops::Range;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct NodeId(pub u32);

    impl NodeId {
        pub fn index(self) -> usize {
            self.0 as usize
        }
    }

    /// Half-open byte range into the file buffer
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
    pub struct Span {
        pub start: usize,
        pub end: usize,
    }

    impl Span {
        pub fn new(start: usize, end: usize) -> Self {
            Span { start, end }
        }

        pub fn range(&self) -> Range<usize> {
            self.start..self.end
        }

        pub fn contains(&self, other: &Span) -> bool {
            self.start <= other.start && other.end <= self.end
        }

        pub fn overlaps(&self, other: &Span) -> bool {
            self.start < other.end && other.start < self.end
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum IncludeKind {
        Include,
        IncludeOnce,
        Require,
        RequireOnce,
    }

    impl IncludeKind {
        /// PHP-Parser encodes the include flavour as 1..=4
        pub fn from_code(code: i64) -> Self {
            match code {
                1 => IncludeKind::Include,
                2 => IncludeKind::IncludeOnce,
                3 => IncludeKind::Require,
                _ => IncludeKind::RequireOnce,
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum NodeKind {
        Include(IncludeKind),
        Concat,
        /// `name` is None when the callee is itself an expression
        FuncCall { name: Option<String> },
        MethodCall { name: Option<String> },
        StaticCall { class: Option<String>, name: Option<String> },
        Arg,
        Variable { name: Option<String> },
        PropertyFetch { name: Option<String> },
        StaticPropertyFetch { class: Option<String>, name: Option<String> },
        ArrayDimFetch,
        StringLiteral(String),
        NumberLiteral(String),
        InterpolatedString,
        InterpolatedPart(String),
        MagicDir,
        MagicFile,
        ConstFetch(String),
        ClassConstFetch { class: Option<String>, name: Option<String> },
        Ternary,
        Array,
        ArrayItem,
        Return,
        Assign,
        /// Class property declaration; defaults below it are constant expressions
        Property,
        /// Class constant or global `const`
        Constant,
        Param,
        /// Function, method, closure or arrow function body
        FunctionLike,
        Global,
        ExpressionStatement,
        Name(String),
        Identifier(String),
        Other(String),
    }

    impl NodeKind {
        /// Expression nodes as opposed to statements, arguments and names
        pub fn is_expression(&self) -> bool {
            !matches!(
                self,
                NodeKind::Arg
                    | NodeKind::ArrayItem
                    | NodeKind::Return
                    | NodeKind::Property
                    | NodeKind::Constant
                    | NodeKind::Param
                    | NodeKind::FunctionLike
                    | NodeKind::Global
                    | NodeKind::ExpressionStatement
                    | NodeKind::Name(_)
                    | NodeKind::Identifier(_)
                    | NodeKind::InterpolatedPart(_)
                    | NodeKind::Other(_)
            )
        }

        /// Statement-level nodes
        pub fn is_statement(&self) -> bool {
            matches!(
                self,
                NodeKind::Return
                    | NodeKind::Property
                    | NodeKind::Constant
                    | NodeKind::FunctionLike
                    | NodeKind::Global
                    | NodeKind::ExpressionStatement
            )
        }
    }

    #[derive(Debug, Clone)]
    pub struct Node {
        pub kind: NodeKind,
        /// Sub-node field this node occupies in its parent ("left", "args", ...)
        pub role: String,
        pub span: Span,
        pub start_line: usize,
        pub end_line: usize,
        pub parent: Option<NodeId>,
        pub children: Vec<NodeId>,
    }

    /// One file: its bytes plus the node arena. Node 0 is the root when present.
    #[derive(Debug, Clone, Default)]
    pub struct Ast {
        source: Vec<u8>,
        nodes: Vec<Node>,
        roots: Vec<NodeId>,
    }

    impl Ast {
        pub fn new(source: impl Into<Vec<u8>>) -> Self {
            Ast {
                source: source.into(),
                nodes: Vec::new(),
                roots: Vec::new(),
            }
        }

        /// Append a node under `parent`, registering it as that parent's next child
        pub fn push(
            &mut self,
            parent: Option<NodeId>,
            role: &str,
            kind: NodeKind,
            span: Span,
            start_line: usize,
            end_line: usize,
        ) -> NodeId {
            let id = NodeId(self.nodes.len() as u32);
            self.nodes.push(Node {
                kind,
                role: role.to_string(),
                span,
                start_line,
                end_line,
                parent,
                children: Vec::new(),
            });
            match parent {
                Some(p) => self.nodes[p.index()].children.push(id),
                None => self.roots.push(id),
            }
            id
        }

        /// Fix up the end of a node whose extent was unknown when it was pushed
        pub fn set_end(&mut self, id: NodeId, end: usize, end_line: usize) {
            let node = &mut self.nodes[id.index()];
            node.span.end = end;
            node.end_line = end_line;
        }

        pub fn node(&self, id: NodeId) -> &Node {
            &self.nodes[id.index()]
        }

        pub fn kind(&self, id: NodeId) -> &NodeKind {
            &self.nodes[id.index()].kind
        }

        pub fn parent(&self, id: NodeId) -> Option<NodeId> {
            self.nodes[id.index()].parent
        }

        pub fn children(&self, id: NodeId) -> &[NodeId] {
            &self.nodes[id.index()].children
        }

        /// First child occupying the given sub-node field
        pub fn child_by_role(&self, id: NodeId, role: &str) -> Option<NodeId> {
            self.children(id)
                .iter()
                .copied()
                .find(|c| self.node(*c).role == role)
        }

        pub fn children_by_role<'a>(
            &'a self,
            id: NodeId,
            role: &'a str,
        ) -> impl Iterator<Item = NodeId> + 'a {
            self.children(id)
                .iter()
                .copied()
                .filter(move |c| self.node(*c).role == role)
        }

        pub fn roots(&self) -> &[NodeId] {
            &self.roots
        }

        pub fn len(&self) -> usize {
            self.nodes.len()
        }

        pub fn is_empty(&self) -> bool {
            self.nodes.is_empty()
        }

        pub fn ids(&self) -> impl Iterator<Item = NodeId> {
            (0..self.nodes.len() as u32).map(NodeId)
        }

        pub fn source(&self) -> &[u8] {
            &self.source
        }

        /// Source text of a node, lossily decoded
        pub fn text(&self, id: NodeId) -> String {
            let span = self.node(id).span;
            let end = span.end.min(self.source.len());
            let start = span.start.min(end);
            String::from_utf8_lossy(&self.source[start..end]).into_owned()
        }
    }
}
