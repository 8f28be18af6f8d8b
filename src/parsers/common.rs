use std::fs;
use std::path::Path;
use tree_sitter::{Language, Node as TSNode, Parser, Tree};

use super::ParseError;

pub struct TreeSitterParser {
    parser: Parser,
}

impl TreeSitterParser {
    pub fn new(language: Language) -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        parser.set_language(language)?;
        Ok(Self { parser })
    }

    pub fn parse(&mut self, source: &str) -> Option<Tree> {
        self.parser.parse(source, None)
    }
}

/// Reads a file as text: UTF-8 when valid, otherwise Latin-1.
pub fn read_source(file_path: &Path) -> std::io::Result<String> {
    let bytes = fs::read(file_path)?;
    Ok(decode_source(bytes))
}

/// Decoding never fails: invalid UTF-8 falls back to Latin-1, where every
/// byte maps to the code point of the same value. A UTF-8 BOM is dropped.
pub fn decode_source(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => match text.strip_prefix('\u{feff}') {
            Some(stripped) => stripped.to_string(),
            None => text,
        },
        Err(err) => err.into_bytes().iter().map(|&byte| byte as char).collect(),
    }
}

pub fn extract_text<'a>(node: &TSNode, source: &'a [u8]) -> &'a str {
    std::str::from_utf8(&source[node.byte_range()]).unwrap_or("")
}

/// 1-based line of a node.
pub fn line_of(node: &TSNode) -> usize {
    node.start_position().row + 1
}

pub fn named_children<'t>(node: &TSNode<'t>) -> Vec<TSNode<'t>> {
    let mut cursor = node.walk();
    let children = node
        .named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect();
    children
}

pub fn find_child_by_kind<'t>(node: &TSNode<'t>, kind: &str) -> Option<TSNode<'t>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

pub fn children_by_field<'t>(node: &TSNode<'t>, field: &str) -> Vec<TSNode<'t>> {
    let mut cursor = node.walk();
    let children = node.children_by_field_name(field, &mut cursor).collect();
    children
}

/// 1-based (line, column) of the first ERROR or MISSING node.
pub fn first_error_position(node: &TSNode) -> Option<(usize, usize)> {
    if node.is_error() || node.is_missing() {
        let point = node.start_position();
        return Some((point.row + 1, point.column + 1));
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<TSNode> = node.children(&mut cursor).collect();
    children.iter().find_map(first_error_position)
}

/// Text of a `dotted_name` (or bare `identifier`) without inner whitespace.
pub fn dotted_text(node: &TSNode, source: &[u8]) -> String {
    if node.kind() == "identifier" {
        return extract_text(node, source).to_string();
    }
    let parts: Vec<&str> = named_children(node)
        .iter()
        .filter(|child| child.kind() == "identifier")
        .map(|child| extract_text(child, source))
        .collect();
    if parts.is_empty() {
        extract_text(node, source).to_string()
    } else {
        parts.join(".")
    }
}

/// Docstring of a class or function body: its first statement when that is
/// a plain string literal, cleaned like `inspect.cleandoc`.
pub fn extract_docstring(body: &TSNode, source: &[u8]) -> Option<String> {
    let first = named_children(body).into_iter().next()?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let literal = named_children(&first).into_iter().next()?;
    if literal.kind() != "string" {
        return None;
    }
    Some(clean_docstring(extract_text(&literal, source)))
}

pub fn clean_docstring(literal: &str) -> String {
    let unprefixed = literal.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    let body = ["\"\"\"", "'''", "\"", "'"]
        .iter()
        .find_map(|quote| {
            unprefixed
                .strip_prefix(quote)
                .and_then(|rest| rest.strip_suffix(quote))
        })
        .unwrap_or(unprefixed);

    let lines: Vec<&str> = body.lines().collect();
    let indent = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<String> = Vec::with_capacity(lines.len());
    for (index, line) in lines.iter().enumerate() {
        if index == 0 {
            cleaned.push(line.trim().to_string());
        } else {
            let dedented = line.get(indent..).unwrap_or_else(|| line.trim_start());
            cleaned.push(dedented.trim_end().to_string());
        }
    }

    while cleaned.first().is_some_and(|line| line.is_empty()) {
        cleaned.remove(0);
    }
    while cleaned.last().is_some_and(|line| line.is_empty()) {
        cleaned.pop();
    }
    cleaned.join("\n")
}
