// Copyright (C) Brian G. Milnes 2025

//! Lowering of PHP-Parser JSON dumps into the node arena
//!
//! Accepts the node type names of both PHP-Parser 4 and 5. Sub-node fields
//! are visited in document order, which is also the source order.

pub mod php_json {
    use anyhow::{anyhow, Context, Result};
    use serde_json::{Map, Value};

    use crate::ast::ast::{Ast, IncludeKind, NodeId, NodeKind, Span};
    use crate::ast_utils::ast_utils::line_number;

    const TOP_LEVEL_ROLE: &str = "stmts";

    fn str_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
        obj.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
    }

    /// Text of a `Name` / `Identifier` sub-node; None when the field is an expression
    fn name_of(value: Option<&Value>) -> Option<String> {
        name_from_map(value?.as_object()?)
    }

    fn name_from_map(obj: &Map<String, Value>) -> Option<String> {
        let node_type = obj.get("nodeType")?.as_str()?;
        let text = match obj.get("name") {
            Some(Value::String(name)) => name.clone(),
            _ => obj
                .get("parts")?
                .as_array()?
                .iter()
                .filter_map(|p| p.as_str())
                .collect::<Vec<_>>()
                .join("\\"),
        };
        match node_type {
            "Name_FullyQualified" => Some(format!("\\{text}")),
            "Name" | "Name_Relative" | "Identifier" | "VarLikeIdentifier" => Some(text),
            _ => None,
        }
    }

    fn scalar_text(value: Option<&Value>) -> String {
        match value {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }

    fn kind_of(node_type: &str, obj: &Map<String, Value>) -> NodeKind {
        match node_type {
            "Expr_Include" => NodeKind::Include(IncludeKind::from_code(
                obj.get("type").and_then(|t| t.as_i64()).unwrap_or(4),
            )),
            "Expr_BinaryOp_Concat" => NodeKind::Concat,
            "Expr_FuncCall" => NodeKind::FuncCall {
                name: name_of(obj.get("name")).map(|n| n.trim_start_matches('\\').to_string()),
            },
            "Expr_MethodCall" | "Expr_NullsafeMethodCall" => NodeKind::MethodCall {
                name: name_of(obj.get("name")),
            },
            "Expr_StaticCall" => NodeKind::StaticCall {
                class: name_of(obj.get("class")),
                name: name_of(obj.get("name")),
            },
            "Arg" => NodeKind::Arg,
            "Expr_Variable" => NodeKind::Variable {
                name: str_field(obj, "name"),
            },
            "Expr_PropertyFetch" | "Expr_NullsafePropertyFetch" => NodeKind::PropertyFetch {
                name: name_of(obj.get("name")),
            },
            "Expr_StaticPropertyFetch" => NodeKind::StaticPropertyFetch {
                class: name_of(obj.get("class")),
                name: name_of(obj.get("name")),
            },
            "Expr_ArrayDimFetch" => NodeKind::ArrayDimFetch,
            "Scalar_String" => NodeKind::StringLiteral(scalar_text(obj.get("value"))),
            "Scalar_LNumber" | "Scalar_Int" | "Scalar_DNumber" | "Scalar_Float" => {
                NodeKind::NumberLiteral(scalar_text(obj.get("value")))
            }
            "Scalar_Encapsed" | "Scalar_InterpolatedString" => NodeKind::InterpolatedString,
            "Scalar_EncapsedStringPart" | "InterpolatedStringPart" => {
                NodeKind::InterpolatedPart(scalar_text(obj.get("value")))
            }
            "Scalar_MagicConst_Dir" => NodeKind::MagicDir,
            "Scalar_MagicConst_File" => NodeKind::MagicFile,
            "Expr_ConstFetch" => NodeKind::ConstFetch(
                name_of(obj.get("name"))
                    .map(|n| n.trim_start_matches('\\').to_string())
                    .unwrap_or_default(),
            ),
            "Expr_ClassConstFetch" => NodeKind::ClassConstFetch {
                class: name_of(obj.get("class")),
                name: name_of(obj.get("name")),
            },
            "Expr_Ternary" => NodeKind::Ternary,
            "Expr_Array" => NodeKind::Array,
            "Expr_ArrayItem" | "ArrayItem" => NodeKind::ArrayItem,
            "Stmt_Return" => NodeKind::Return,
            "Expr_Assign" | "Expr_AssignRef" => NodeKind::Assign,
            "Stmt_Property" => NodeKind::Property,
            "Stmt_ClassConst" | "Stmt_Const" => NodeKind::Constant,
            "Param" => NodeKind::Param,
            "Stmt_Function" | "Stmt_ClassMethod" | "Expr_Closure" | "Expr_ArrowFunction" => {
                NodeKind::FunctionLike
            }
            "Stmt_Global" => NodeKind::Global,
            "Stmt_Expression" => NodeKind::ExpressionStatement,
            "Name" | "Name_FullyQualified" | "Name_Relative" => {
                NodeKind::Name(name_from_map(obj).unwrap_or_default())
            }
            "Identifier" | "VarLikeIdentifier" => {
                NodeKind::Identifier(str_field(obj, "name").unwrap_or_default())
            }
            other => NodeKind::Other(other.to_string()),
        }
    }

    struct Lowering {
        ast: Ast,
    }

    impl Lowering {
        fn span_of(&self, obj: &Map<String, Value>, fallback: usize) -> (Span, usize, usize) {
            let attrs = obj.get("attributes").and_then(|a| a.as_object());
            let get = |key: &str| attrs.and_then(|a| a.get(key)).and_then(|v| v.as_i64());
            let len = self.ast.source().len();
            let start = match get("startFilePos") {
                Some(pos) if pos >= 0 => (pos as usize).min(len),
                _ => fallback,
            };
            // endFilePos is inclusive
            let end = match get("endFilePos") {
                Some(pos) if pos >= 0 => ((pos as usize) + 1).min(len).max(start),
                _ => start,
            };
            let start_line = match get("startLine") {
                Some(line) if line > 0 => line as usize,
                _ => line_number(self.ast.source(), start),
            };
            let end_line = match get("endLine") {
                Some(line) if line > 0 => line as usize,
                _ => line_number(self.ast.source(), end),
            };
            (Span::new(start, end), start_line, end_line)
        }

        fn lower_value(
            &mut self,
            parent: Option<NodeId>,
            role: &str,
            value: &Value,
            fallback: usize,
        ) {
            match value {
                Value::Object(obj) if obj.contains_key("nodeType") => {
                    self.lower_node(parent, role, obj, fallback);
                }
                Value::Array(items) => {
                    for item in items {
                        self.lower_value(parent, role, item, fallback);
                    }
                }
                _ => {}
            }
        }

        fn lower_node(
            &mut self,
            parent: Option<NodeId>,
            role: &str,
            obj: &Map<String, Value>,
            fallback: usize,
        ) -> NodeId {
            let node_type = obj.get("nodeType").and_then(|t| t.as_str()).unwrap_or("");
            let kind = kind_of(node_type, obj);
            let (span, start_line, end_line) = self.span_of(obj, fallback);
            let id = self.ast.push(parent, role, kind, span, start_line, end_line);
            for (key, value) in obj {
                if key == "nodeType" || key == "attributes" {
                    continue;
                }
                self.lower_value(Some(id), key, value, span.start);
            }
            id
        }
    }

    /// Lower a JSON dump of `source` into an arena
    pub fn lower(source: impl Into<Vec<u8>>, json: &str) -> Result<Ast> {
        let value: Value = serde_json::from_str(json).context("AST dump is not valid JSON")?;
        let mut lowering = Lowering { ast: Ast::new(source) };
        match &value {
            Value::Array(_) => lowering.lower_value(None, TOP_LEVEL_ROLE, &value, 0),
            Value::Object(obj) if obj.contains_key("nodeType") => {
                lowering.lower_node(None, TOP_LEVEL_ROLE, obj, 0);
            }
            _ => return Err(anyhow!("AST dump holds no statements")),
        }
        Ok(lowering.ast)
    }

    /// Extract the JSON part of `php-parse --json-dump` output
    pub fn extract_json_dump(output: &str) -> &str {
        let body = match output.find("==> JSON dump:") {
            Some(idx) => &output[idx + "==> JSON dump:".len()..],
            None => output,
        };
        match body.find(|c| c == '[' || c == '{') {
            Some(idx) => body[idx..].trim_end(),
            None => body.trim(),
        }
    }
}
