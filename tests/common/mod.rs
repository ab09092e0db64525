// Copyright (C) Brian G. Milnes 2025

//! Common test utilities for integration tests
//!
//! `SourceBuilder` writes PHP source text and the matching arena side by
//! side, so spans always point at the text they cover.

#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::Path;

use deroot::ast::ast::{Ast, IncludeKind, NodeKind, Span};
use deroot::ast_utils::ast_utils::line_number;
use deroot::component_tree::component_tree::ComponentTree;
use deroot::manifest::manifest::{parse_component_manifest, parse_subplugin_manifest};

/// One deferred piece of source, e.g. a call argument
pub type Build = Box<dyn FnOnce(&mut SourceBuilder)>;

pub fn arg(build: impl FnOnce(&mut SourceBuilder) + 'static) -> Build {
    Box::new(build)
}

struct Pending {
    parent: Option<usize>,
    role: String,
    kind: NodeKind,
    start: usize,
    end: usize,
}

pub struct SourceBuilder {
    source: String,
    nodes: Vec<Pending>,
    stack: Vec<usize>,
}

impl Default for SourceBuilder {
    fn default() -> Self {
        SourceBuilder::new()
    }
}

impl SourceBuilder {
    pub fn new() -> Self {
        SourceBuilder {
            source: "<?php\n".to_string(),
            nodes: Vec::new(),
            stack: Vec::new(),
        }
    }

    pub fn text(&mut self, text: &str) -> &mut Self {
        self.source.push_str(text);
        self
    }

    pub fn open(&mut self, role: &str, kind: NodeKind) -> &mut Self {
        let idx = self.nodes.len();
        self.nodes.push(Pending {
            parent: self.stack.last().copied(),
            role: role.to_string(),
            kind,
            start: self.source.len(),
            end: self.source.len(),
        });
        self.stack.push(idx);
        self
    }

    pub fn close(&mut self) -> &mut Self {
        if let Some(idx) = self.stack.pop() {
            self.nodes[idx].end = self.source.len();
        }
        self
    }

    pub fn node(&mut self, role: &str, kind: NodeKind, body: impl FnOnce(&mut Self)) -> &mut Self {
        self.open(role, kind);
        body(self);
        self.close()
    }

    pub fn leaf(&mut self, role: &str, kind: NodeKind, text: &str) -> &mut Self {
        self.open(role, kind).text(text).close()
    }

    pub fn string(&mut self, role: &str, value: &str) -> &mut Self {
        self.leaf(role, NodeKind::StringLiteral(value.to_string()), &format!("'{value}'"))
    }

    pub fn number(&mut self, role: &str, value: &str) -> &mut Self {
        self.leaf(role, NodeKind::NumberLiteral(value.to_string()), value)
    }

    pub fn var(&mut self, role: &str, name: &str) -> &mut Self {
        self.leaf(
            role,
            NodeKind::Variable {
                name: Some(name.to_string()),
            },
            &format!("${name}"),
        )
    }

    /// `$CFG->field`
    pub fn cfg(&mut self, role: &str, field: &str) -> &mut Self {
        self.node(
            role,
            NodeKind::PropertyFetch {
                name: Some(field.to_string()),
            },
            |b| {
                b.var("var", "CFG")
                    .text("->")
                    .leaf("name", NodeKind::Identifier(field.to_string()), field);
            },
        )
    }

    pub fn magic_dir(&mut self, role: &str) -> &mut Self {
        self.leaf(role, NodeKind::MagicDir, "__DIR__")
    }

    pub fn concat(
        &mut self,
        role: &str,
        left: impl FnOnce(&mut Self),
        right: impl FnOnce(&mut Self),
    ) -> &mut Self {
        self.node(role, NodeKind::Concat, |b| {
            left(b);
            b.text(" . ");
            right(b);
        })
    }

    /// `$CFG->field . '<tail>'`
    pub fn cfg_concat(&mut self, role: &str, field: &str, tail: &str) -> &mut Self {
        self.concat(role, |b| {
            b.cfg("left", field);
        }, |b| {
            b.string("right", tail);
        })
    }

    /// `name(args...)`, each argument wrapped in an `Arg` node
    pub fn call(&mut self, role: &str, name: &str, args: Vec<Build>) -> &mut Self {
        self.node(
            role,
            NodeKind::FuncCall {
                name: Some(name.to_string()),
            },
            |b| {
                b.leaf("name", NodeKind::Name(name.to_string()), name).text("(");
                let count = args.len();
                for (i, build) in args.into_iter().enumerate() {
                    b.node("args", NodeKind::Arg, |b| build(b));
                    if i + 1 < count {
                        b.text(", ");
                    }
                }
                b.text(")");
            },
        )
    }

    /// `require_once(<operand>);` as a top-level statement
    pub fn require_once(&mut self, operand: impl FnOnce(&mut Self)) -> &mut Self {
        self.statement(|b| {
            b.node("expr", NodeKind::Include(IncludeKind::RequireOnce), |b| {
                b.text("require_once(");
                operand(b);
                b.text(")");
            });
        })
    }

    /// `<expr>;` as an expression statement
    pub fn statement(&mut self, expr: impl FnOnce(&mut Self)) -> &mut Self {
        self.node("stmts", NodeKind::ExpressionStatement, |b| {
            expr(b);
            b.text(";");
        });
        self.text("\n")
    }

    /// `$name = <expr>;`
    pub fn assign(&mut self, name: &str, expr: impl FnOnce(&mut Self)) -> &mut Self {
        self.statement(|b| {
            b.node("expr", NodeKind::Assign, |b| {
                b.var("var", name).text(" = ");
                expr(b);
            });
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn finish(&self) -> Ast {
        let bytes = self.source.as_bytes();
        let mut ast = Ast::new(bytes.to_vec());
        for pending in &self.nodes {
            let parent = pending.parent.map(|p| deroot::ast::ast::NodeId(p as u32));
            ast.push(
                parent,
                &pending.role,
                pending.kind.clone(),
                Span::new(pending.start, pending.end),
                line_number(bytes, pending.start),
                line_number(bytes, pending.end),
            );
        }
        ast
    }
}

pub const COMPONENTS_JSON: &str = r#"{
    "plugintypes": {
        "mod": "mod",
        "report": "report",
        "block": "blocks",
        "tool": "admin/tool",
        "qtype": "question/type"
    },
    "subsystems": {
        "admin": "admin",
        "question": "question",
        "cache": "cache",
        "files": "lib/filestorage",
        "tag": null
    }
}"#;

pub const ASSIGN_SUBPLUGINS_JSON: &str = r#"{
    "plugintypes": {
        "assignsubmission": "submission",
        "assignfeedback": "feedback"
    }
}"#;

/// Tree for a codebase with `mod_assign` declaring two sub-plugin types
pub fn sample_tree() -> ComponentTree {
    let primary = parse_component_manifest(Path::new("lib/components.json"), COMPONENTS_JSON)
        .expect("sample manifest is valid");
    let assign = parse_subplugin_manifest(Path::new("mod/assign/db/subplugins.json"), ASSIGN_SUBPLUGINS_JSON)
        .expect("sample sub-plugin manifest is valid");
    ComponentTree::from_manifests(&primary, &[("mod".to_string(), "assign".to_string(), assign)])
}

pub fn write_file(root: &Path, relative: &str, contents: &str) -> Result<()> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

/// Scratch codebase with manifests and a few plugin directories
pub fn write_codebase(root: &Path) -> Result<()> {
    write_file(root, "lib/components.json", COMPONENTS_JSON)?;
    write_file(root, "mod/assign/db/subplugins.json", ASSIGN_SUBPLUGINS_JSON)?;
    for dir in [
        "mod/assign/feedback/offline",
        "mod/assign/submission/file",
        "mod/forum",
        "report/log",
        "admin/tool/uploaduser",
    ] {
        fs::create_dir_all(root.join(dir))?;
    }
    Ok(())
}

pub const CFG_INCLUDE_SOURCE: &str = "<?php\nrequire_once($CFG->dirroot . '/lib/x.php');\n";

fn attrs(start: usize, end: usize) -> String {
    format!(r#""attributes": {{"startLine": 2, "startFilePos": {start}, "endLine": 2, "endFilePos": {end}}}"#)
}

/// PHP-Parser 4 shaped JSON dump of `CFG_INCLUDE_SOURCE`
pub fn cfg_include_dump() -> String {
    format!(
        r#"[
    {{
        "nodeType": "Stmt_Expression",
        "expr": {{
            "nodeType": "Expr_Include",
            "expr": {{
                "nodeType": "Expr_BinaryOp_Concat",
                "left": {{
                    "nodeType": "Expr_PropertyFetch",
                    "var": {{ "nodeType": "Expr_Variable", "name": "CFG", {var} }},
                    "name": {{ "nodeType": "Identifier", "name": "dirroot", {name} }},
                    {fetch}
                }},
                "right": {{
                    "nodeType": "Scalar_String",
                    "value": "/lib/x.php",
                    {string}
                }},
                {concat}
            }},
            "type": 4,
            {include}
        }},
        {statement}
    }}
]"#,
        var = attrs(19, 22),
        name = attrs(25, 31),
        fetch = attrs(19, 31),
        string = attrs(35, 46),
        concat = attrs(19, 46),
        include = attrs(6, 47),
        statement = attrs(6, 48),
    )
}
