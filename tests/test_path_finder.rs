// Copyright (C) Brian G. Milnes 2025

//! Tests for path expression discovery and symbolic reduction

mod common;
use common::{arg, SourceBuilder};

use deroot::ast::ast::NodeKind;
use deroot::categorizer::categorizer::{categorize, PathCategory};
use deroot::path_finder::path_finder::{find_path_expressions, PathExpression};

fn symbolic_paths(found: &[PathExpression]) -> Vec<&str> {
    found.iter().map(|p| p.symbolic.as_str()).collect()
}

#[test]
fn test_root_plus_literal() {
    let mut b = SourceBuilder::new();
    b.require_once(|b| {
        b.cfg_concat("expr", "dirroot", "/mod/assign/lib.php");
    });
    let ast = b.finish();

    let found = find_path_expressions(&ast, "mod/forum/view.php");
    assert_eq!(symbolic_paths(&found), vec!["@/mod/assign/lib.php"]);
    let path = &found[0];
    assert_eq!(path.source, "$CFG->dirroot . '/mod/assign/lib.php'");
    assert_eq!(&b.source()[path.span.start..path.span.end], path.source);
    assert_eq!(path.start_line, 2);
    assert!(path.flags.is_include);
    assert!(path.flags.root_config_used);
    assert!(path.flags.root_config_in_scope);
    assert!(!path.flags.in_constant_context);
    // Containing expression is the include itself
    assert!(path.containing.start < path.span.start);
    assert!(path.containing.end > path.span.end);
}

#[test]
fn test_library_dir_field() {
    let mut b = SourceBuilder::new();
    b.require_once(|b| {
        b.cfg_concat("expr", "libdir", "/questionlib.php");
    });
    let found = find_path_expressions(&b.finish(), "question/edit.php");
    assert_eq!(symbolic_paths(&found), vec!["@/lib/questionlib.php"]);
}

#[test]
fn test_this_directory_constant() {
    let mut b = SourceBuilder::new();
    b.require_once(|b| {
        b.magic_dir("expr");
    });
    let found = find_path_expressions(&b.finish(), "a/b/c.php");
    assert_eq!(symbolic_paths(&found), vec!["@/a/b"]);
    assert!(!found[0].flags.root_config_used);
}

#[test]
fn test_bare_directory_constant_is_not_recorded() {
    let mut b = SourceBuilder::new();
    b.assign("dir", |b| {
        b.magic_dir("expr");
    });
    assert!(find_path_expressions(&b.finish(), "a/b/c.php").is_empty());
}

#[test]
fn test_dot_segments_collapse() {
    let mut b = SourceBuilder::new();
    b.require_once(|b| {
        b.cfg_concat("expr", "dirroot", "/a/b/../c.php");
    });
    b.require_once(|b| {
        b.cfg_concat("expr", "dirroot", "/a/./d.php");
    });
    let found = find_path_expressions(&b.finish(), "index.php");
    assert_eq!(symbolic_paths(&found), vec!["@/a/c.php", "@/a/d.php"]);
}

#[test]
fn test_dirname_drops_segments() {
    // require_once(dirname(dirname(__DIR__)) . '/config.php') in mod/assign/view.php
    let mut b = SourceBuilder::new();
    b.require_once(|b| {
        b.concat(
            "expr",
            |b| {
                b.call(
                    "left",
                    "dirname",
                    vec![arg(|b| {
                        b.call("value", "dirname", vec![arg(|b| {
                            b.magic_dir("value");
                        })]);
                    })],
                );
            },
            |b| {
                b.string("right", "/config.php");
            },
        );
    });
    let found = find_path_expressions(&b.finish(), "mod/assign/view.php");
    assert_eq!(symbolic_paths(&found), vec!["@/config.php"]);
}

#[test]
fn test_dirname_of_root_goes_above_root() {
    let mut b = SourceBuilder::new();
    b.assign("parent", |b| {
        b.call("expr", "dirname", vec![arg(|b| {
            b.cfg("value", "dirroot");
        })]);
    });
    let found = find_path_expressions(&b.finish(), "index.php");
    assert_eq!(symbolic_paths(&found), vec!["@/.."]);
}

#[test]
fn test_dirname_with_levels() {
    let mut b = SourceBuilder::new();
    b.require_once(|b| {
        b.concat(
            "expr",
            |b| {
                b.call(
                    "left",
                    "dirname",
                    vec![
                        arg(|b| {
                            b.magic_dir("value");
                        }),
                        arg(|b| {
                            b.number("value", "2");
                        }),
                    ],
                );
            },
            |b| {
                b.string("right", "/lib.php");
            },
        );
    });
    let found = find_path_expressions(&b.finish(), "mod/assign/backup/restore.php");
    assert_eq!(symbolic_paths(&found), vec!["@/mod/lib.php"]);
}

#[test]
fn test_variables_become_placeholders() {
    let mut b = SourceBuilder::new();
    b.require_once(|b| {
        b.concat(
            "expr",
            |b| {
                b.concat(
                    "left",
                    |b| {
                        b.cfg_concat("left", "dirroot", "/mod/");
                    },
                    |b| {
                        b.var("right", "modname");
                    },
                );
            },
            |b| {
                b.string("right", "/lib.php");
            },
        );
    });
    let found = find_path_expressions(&b.finish(), "course/lib.php");
    assert_eq!(symbolic_paths(&found), vec!["@/mod/{$modname}/lib.php"]);
}

#[test]
fn test_calls_render_their_arguments() {
    let mut b = SourceBuilder::new();
    b.require_once(|b| {
        b.concat(
            "expr",
            |b| {
                b.concat("left", |b| { b.cfg("left", "dirroot"); }, |b| {
                    b.call("right", "clean_param", vec![
                        arg(|b| { b.var("value", "path"); }),
                        arg(|b| { b.string("value", "x"); }),
                    ]);
                });
            },
            |b| {
                b.string("right", "/version.php");
            },
        );
    });
    let found = find_path_expressions(&b.finish(), "index.php");
    assert_eq!(symbolic_paths(&found), vec!["@{clean_param($path, 'x')}/version.php"]);
}

#[test]
fn test_assignment_target_is_configuration() {
    // $CFG->dirroot = '/var/www';
    let mut b = SourceBuilder::new();
    b.statement(|b| {
        b.node("expr", NodeKind::Assign, |b| {
            b.cfg("var", "dirroot").text(" = ");
            b.string("expr", "/var/www");
        });
    });
    assert!(find_path_expressions(&b.finish(), "config.php").is_empty());
}

#[test]
fn test_relative_include_anchors_at_file_dir() {
    let mut b = SourceBuilder::new();
    b.require_once(|b| {
        b.string("expr", "locallib.php");
    });
    let found = find_path_expressions(&b.finish(), "mod/assign/view.php");
    assert_eq!(symbolic_paths(&found), vec!["@/mod/assign/locallib.php"]);
}

#[test]
fn test_root_config_scope_inside_function() {
    // function f() { require_once($CFG->dirroot . '/x.php'); }
    let mut b = SourceBuilder::new();
    b.node("stmts", NodeKind::FunctionLike, |b| {
        b.text("function f() {\n");
        b.require_once(|b| {
            b.cfg_concat("expr", "dirroot", "/x.php");
        });
        b.text("}");
    });
    b.text("\n");
    b.node("stmts", NodeKind::FunctionLike, |b| {
        b.text("function g() {\n");
        b.node("stmts", NodeKind::Global, |b| {
            b.text("global ");
            b.var("vars", "CFG");
            b.text(";");
        });
        b.text("\n");
        b.require_once(|b| {
            b.cfg_concat("expr", "dirroot", "/y.php");
        });
        b.text("}");
    });
    let found = find_path_expressions(&b.finish(), "lib/x.php");
    assert_eq!(symbolic_paths(&found), vec!["@/x.php", "@/y.php"]);
    assert!(!found[0].flags.root_config_in_scope);
    assert!(found[1].flags.root_config_in_scope);
}

#[test]
fn test_property_default_is_constant_context() {
    // class a { public $p = __DIR__ . '/x.php'; }
    let mut b = SourceBuilder::new();
    b.node("stmts", NodeKind::Property, |b| {
        b.text("public $p = ");
        b.concat("default", |b| { b.magic_dir("left"); }, |b| { b.string("right", "/x.php"); });
        b.text(";");
    });
    let found = find_path_expressions(&b.finish(), "lib/a.php");
    assert_eq!(symbolic_paths(&found), vec!["@/lib/x.php"]);
    assert!(found[0].flags.in_constant_context);
    assert!(!found[0].flags.is_include);
}

#[test]
fn test_file_constant() {
    // require_once(dirname(__FILE__) . '/lib.php'); $backup = __FILE__ . '.orig';
    let mut b = SourceBuilder::new();
    b.require_once(|b| {
        b.concat(
            "expr",
            |b| {
                b.call("left", "dirname", vec![arg(|b| {
                    b.leaf("value", NodeKind::MagicFile, "__FILE__");
                })]);
            },
            |b| {
                b.string("right", "/lib.php");
            },
        );
    });
    b.assign("backup", |b| {
        b.concat("expr", |b| {
            b.leaf("left", NodeKind::MagicFile, "__FILE__");
        }, |b| {
            b.string("right", ".orig");
        });
    });
    let found = find_path_expressions(&b.finish(), "mod/forum/view.php");
    assert_eq!(symbolic_paths(&found), vec!["@/mod/forum/lib.php", "@/mod/forum/view.php.orig"]);
    assert!(!found[0].flags.root_config_used);
}

#[test]
fn test_directory_separator_constant() {
    // require_once(__DIR__ . DIRECTORY_SEPARATOR . 'lib.php');
    let mut b = SourceBuilder::new();
    b.require_once(|b| {
        b.concat(
            "expr",
            |b| {
                b.concat("left", |b| { b.magic_dir("left"); }, |b| {
                    let separator = NodeKind::ConstFetch("DIRECTORY_SEPARATOR".to_string());
                    b.leaf("right", separator, "DIRECTORY_SEPARATOR");
                });
            },
            |b| {
                b.string("right", "lib.php");
            },
        );
    });
    let found = find_path_expressions(&b.finish(), "mod/forum/view.php");
    assert_eq!(symbolic_paths(&found), vec!["@/mod/forum/lib.php"]);
}

#[test]
fn test_interpolated_string() {
    // require_once("$CFG->dirroot/mod/assign/locallib.php");
    let mut b = SourceBuilder::new();
    b.require_once(|b| {
        b.node("expr", NodeKind::InterpolatedString, |b| {
            b.text("\"");
            b.cfg("parts", "dirroot");
            let tail = "/mod/assign/locallib.php";
            b.leaf("parts", NodeKind::InterpolatedPart(tail.to_string()), tail);
            b.text("\"");
        });
    });
    let found = find_path_expressions(&b.finish(), "mod/forum/view.php");
    assert_eq!(symbolic_paths(&found), vec!["@/mod/assign/locallib.php"]);
    assert_eq!(found[0].source, "\"$CFG->dirroot/mod/assign/locallib.php\"");
    assert!(found[0].flags.root_config_used);
}

#[test]
fn test_method_static_and_index_placeholders() {
    let mut b = SourceBuilder::new();
    // $CFG->dirroot . '/mod/' . $cm->get_modname() . '/lib.php'
    b.require_once(|b| {
        b.concat(
            "expr",
            |b| {
                b.concat(
                    "left",
                    |b| {
                        b.cfg_concat("left", "dirroot", "/mod/");
                    },
                    |b| {
                        let method = Some("get_modname".to_string());
                        b.node("right", NodeKind::MethodCall { name: method }, |b| {
                            b.var("var", "cm").text("->");
                            let name = NodeKind::Identifier("get_modname".to_string());
                            b.leaf("name", name, "get_modname");
                            b.text("()");
                        });
                    },
                );
            },
            |b| {
                b.string("right", "/lib.php");
            },
        );
    });
    // core_component::get_plugin_directory('mod', $name) . '/lib.php'
    b.require_once(|b| {
        b.concat(
            "expr",
            |b| {
                let kind = NodeKind::StaticCall {
                    class: Some("core_component".to_string()),
                    name: Some("get_plugin_directory".to_string()),
                };
                b.node("left", kind, |b| {
                    b.leaf("class", NodeKind::Name("core_component".to_string()), "core_component");
                    b.text("::");
                    let name = NodeKind::Identifier("get_plugin_directory".to_string());
                    b.leaf("name", name, "get_plugin_directory");
                    b.text("(");
                    b.node("args", NodeKind::Arg, |b| { b.string("value", "mod"); });
                    b.text(", ");
                    b.node("args", NodeKind::Arg, |b| { b.var("value", "name"); });
                    b.text(")");
                });
            },
            |b| {
                b.string("right", "/lib.php");
            },
        );
    });
    // $CFG->dirroot . $paths['lib']
    b.require_once(|b| {
        b.concat(
            "expr",
            |b| {
                b.cfg("left", "dirroot");
            },
            |b| {
                b.node("right", NodeKind::ArrayDimFetch, |b| {
                    b.var("var", "paths").text("[");
                    b.string("dim", "lib");
                    b.text("]");
                });
            },
        );
    });
    let found = find_path_expressions(&b.finish(), "course/lib.php");
    assert_eq!(
        symbolic_paths(&found),
        vec![
            "@/mod/{$cm->get_modname()}/lib.php",
            "{core_component::get_plugin_directory('mod', $name)}/lib.php",
            "@{$paths['lib']}",
        ]
    );
}

#[test]
fn test_include_path_library_resolves_below_pear() {
    let mut b = SourceBuilder::new();
    b.require_once(|b| {
        b.string("expr", "Horde/Yaml.php");
    });
    b.require_once(|b| {
        b.string("expr", "HTML/QuickForm.php");
    });
    let found = find_path_expressions(&b.finish(), "lib/yaml/loader.php");
    assert_eq!(
        symbolic_paths(&found),
        vec!["@/lib/pear/Horde/Yaml.php", "@/lib/pear/HTML/QuickForm.php"]
    );
}

#[test]
fn test_ternary_operand_stays_opaque() {
    // require_once($local ? $CFG->dirroot . '/local/x.php' : 'x.php');
    let mut b = SourceBuilder::new();
    b.require_once(|b| {
        b.node("expr", NodeKind::Ternary, |b| {
            b.var("cond", "local").text(" ? ");
            b.cfg_concat("if", "dirroot", "/local/x.php");
            b.text(" : ");
            b.string("else", "x.php");
        });
    });
    let found = find_path_expressions(&b.finish(), "admin/index.php");
    // One record for the whole operand; neither branch is reported on its own
    assert_eq!(
        symbolic_paths(&found),
        vec!["{($local ? $CFG->dirroot . '/local/x.php' : 'x.php')}"]
    );
    let category = categorize(&found[0].symbolic);
    assert_eq!(category, Some(PathCategory::SingleVar));
    assert!(category.is_some_and(|c| c.needs_manual_review()));
}

#[test]
fn test_dirname_level_count_is_bounded() {
    let mut b = SourceBuilder::new();
    b.assign("top", |b| {
        b.call(
            "expr",
            "dirname",
            vec![
                arg(|b| {
                    b.magic_dir("value");
                }),
                arg(|b| {
                    b.number("value", "18446744073709551615");
                }),
            ],
        );
    });
    let found = find_path_expressions(&b.finish(), "mod/assign/view.php");
    assert_eq!(symbolic_paths(&found), vec!["@/.."]);
}
