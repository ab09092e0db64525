// Copyright (C) Brian G. Milnes 2025

//! Symbolic path grammar
//!
//! A symbolic path is `@` (the codebase root) optionally followed by
//! `/segment/...`. A segment mixes literal text with opaque placeholders
//! `{expr}` where `expr` is PHP source for a value unknown statically.
//! Paths starting with `{` are unanchored and never resolve to a component.

pub mod symbolic {
    pub const ROOT: &str = "@";

    /// Include-path libraries whose relative includes resolve below `lib/pear`
    pub const INCLUDE_PATH_NAMESPACES: [&str; 2] = ["Horde", "HTML"];
    pub const INCLUDE_PATH_ROOT: &str = "@/lib/pear";

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Piece<'a> {
        Root,
        Literal(&'a str),
        /// Inner expression text, braces stripped
        Placeholder(&'a str),
    }

    /// Byte index just past the `}` matching the `{` at `open`.
    /// Quotes inside the placeholder are skipped so `{f('}')}` stays whole.
    fn placeholder_end(path: &str, open: usize) -> usize {
        let bytes = path.as_bytes();
        let mut depth = 0usize;
        let mut quote: Option<u8> = None;
        let mut i = open;
        while i < bytes.len() {
            let b = bytes[i];
            match quote {
                Some(q) => {
                    if b == b'\\' {
                        i += 1;
                    } else if b == q {
                        quote = None;
                    }
                }
                None => match b {
                    b'\'' | b'"' => quote = Some(b),
                    b'{' => depth += 1,
                    b'}' => {
                        depth -= 1;
                        if depth == 0 {
                            return i + 1;
                        }
                    }
                    _ => {}
                },
            }
            i += 1;
        }
        bytes.len()
    }

    /// Split a symbolic path into root, literal runs and placeholders
    pub fn pieces(path: &str) -> Vec<Piece<'_>> {
        let mut out = Vec::new();
        let mut i = 0;
        if path.starts_with('@') {
            out.push(Piece::Root);
            i = 1;
        }
        let mut literal_start = i;
        while i < path.len() {
            if path.as_bytes()[i] == b'{' {
                if literal_start < i {
                    out.push(Piece::Literal(&path[literal_start..i]));
                }
                let end = placeholder_end(path, i);
                let inner_end = if path[..end].ends_with('}') { end - 1 } else { end };
                out.push(Piece::Placeholder(&path[i + 1..inner_end.max(i + 1)]));
                i = end;
                literal_start = i;
            } else {
                i += 1;
            }
        }
        if literal_start < path.len() {
            out.push(Piece::Literal(&path[literal_start..]));
        }
        out
    }

    /// Split on `/` outside placeholders. `@/a/b` gives `["@", "a", "b"]`.
    pub fn segments(path: &str) -> Vec<&str> {
        let mut out = Vec::new();
        let bytes = path.as_bytes();
        let mut start = 0;
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'{' => {
                    i = placeholder_end(path, i);
                    continue;
                }
                b'/' => {
                    out.push(&path[start..i]);
                    start = i + 1;
                }
                _ => {}
            }
            i += 1;
        }
        out.push(&path[start..]);
        out
    }

    pub fn is_anchored(path: &str) -> bool {
        path.starts_with('@')
    }

    pub fn is_unanchored(path: &str) -> bool {
        path.starts_with('{')
    }

    pub fn has_placeholder(path: &str) -> bool {
        pieces(path).iter().any(|p| matches!(p, Piece::Placeholder(_)))
    }

    /// No root anchor and no placeholder anywhere
    pub fn is_literal(path: &str) -> bool {
        pieces(path).iter().all(|p| matches!(p, Piece::Literal(_))) && !path.contains('@')
    }

    pub fn placeholder(expr: &str) -> String {
        format!("{{{expr}}}")
    }

    /// Inner expression when the whole path is exactly one placeholder
    pub fn single_placeholder(path: &str) -> Option<&str> {
        match pieces(path).as_slice() {
            [Piece::Placeholder(inner)] => Some(*inner),
            _ => None,
        }
    }

    /// Root-relative remainder: `@/a/b` gives `a/b`, `@` gives ``
    pub fn strip_root(path: &str) -> Option<&str> {
        let rest = path.strip_prefix('@')?;
        Some(rest.strip_prefix('/').unwrap_or(rest))
    }

    /// Collapse `.` and `..` segments structurally.
    /// `..` never consumes the anchor or a segment holding a placeholder.
    pub fn collapse_dots(path: &str) -> String {
        let mut out: Vec<&str> = Vec::new();
        for (i, segment) in segments(path).into_iter().enumerate() {
            match segment {
                "." if i > 0 => {}
                ".." if i > 0 => {
                    while out.len() > 1 && out.last() == Some(&"") {
                        out.pop();
                    }
                    let poppable = out.last().is_some_and(|last| {
                        *last != ".." && *last != ROOT && !last.contains('{') && !last.is_empty()
                    });
                    if poppable {
                        out.pop();
                    } else {
                        out.push("..");
                    }
                }
                _ => out.push(segment),
            }
        }
        out.join("/")
    }

    /// Anchor a raw contribution and collapse it.
    /// `file_dir` is the referencing file's directory relative to the root.
    pub fn normalize(raw: &str, file_dir: &str) -> String {
        if raw.is_empty() {
            return String::new();
        }
        let anchored = if is_anchored(raw) || is_unanchored(raw) {
            raw.to_string()
        } else if let Some(ns) = INCLUDE_PATH_NAMESPACES
            .iter()
            .find(|ns| raw.strip_prefix(**ns).is_some_and(|rest| rest.starts_with('/')))
        {
            format!("{INCLUDE_PATH_ROOT}/{ns}{}", &raw[ns.len()..])
        } else if file_dir.is_empty() {
            format!("{ROOT}/{raw}")
        } else {
            format!("{ROOT}/{}/{raw}", file_dir.trim_matches('/'))
        };
        collapse_dots(&anchored)
    }

    /// Everything before the last separator, ignoring one trailing separator.
    /// None when the value holds no separator at all.
    pub fn drop_last_segment(path: &str) -> Option<String> {
        let trimmed = if path.len() > 1 { path.strip_suffix('/').unwrap_or(path) } else { path };
        let segs = segments(trimmed);
        if segs.len() < 2 {
            return None;
        }
        let kept = segs[..segs.len() - 1].join("/");
        if kept.is_empty() {
            Some("/".to_string())
        } else {
            Some(kept)
        }
    }

    /// Single-quoted PHP string literal
    pub fn quote_php(text: &str) -> String {
        format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"))
    }

    /// PHP expression concatenating the literal runs and placeholder
    /// expressions of a fragment. None when the fragment holds the root anchor.
    pub fn to_php_expr(fragment: &str) -> Option<String> {
        let parts = pieces(fragment);
        if parts.is_empty() {
            return Some(quote_php(""));
        }
        let mut rendered = Vec::with_capacity(parts.len());
        for piece in parts {
            match piece {
                Piece::Root => return None,
                Piece::Literal(text) => {
                    if text.contains('@') {
                        return None;
                    }
                    rendered.push(quote_php(text));
                }
                Piece::Placeholder(expr) => rendered.push(expr.to_string()),
            }
        }
        Some(rendered.join(" . "))
    }
}
