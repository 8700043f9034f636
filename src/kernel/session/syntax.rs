//! 语法高亮：tree-sitter 解析 + 按行切分的高亮区间
//!
//! 没有对应语法的扩展名不会得到 `SyntaxDocument`，调用方直接跳过高亮。

use ropey::Rope;
use tree_sitter::{Language, Node, Parser, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageId {
    Rust,
    Go,
    Python,
    JavaScript,
    TypeScript,
    Tsx,
}

impl LanguageId {
    /// 按小写扩展名（不含点）选择语法
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "rs" => Some(Self::Rust),
            "go" => Some(Self::Go),
            "py" | "pyi" | "pyw" => Some(Self::Python),
            "js" | "mjs" | "cjs" | "jsx" => Some(Self::JavaScript),
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            "tsx" => Some(Self::Tsx),
            _ => None,
        }
    }

    fn ts_language(self) -> Language {
        match self {
            Self::Rust => tree_sitter_rust::language(),
            Self::Go => tree_sitter_go::language(),
            Self::Python => tree_sitter_python::language(),
            Self::JavaScript => tree_sitter_javascript::language(),
            Self::TypeScript => tree_sitter_typescript::language_typescript(),
            Self::Tsx => tree_sitter_typescript::language_tsx(),
        }
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Rust => RUST_KEYWORDS,
            Self::Go => GO_KEYWORDS,
            Self::Python => PYTHON_KEYWORDS,
            Self::JavaScript | Self::TypeScript | Self::Tsx => JS_TS_KEYWORDS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightKind {
    Comment,
    String,
    Keyword,
    Type,
    Number,
    Attribute,
    Lifetime,
    Function,
}

/// 行内字节区间 `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
    pub kind: HighlightKind,
}

pub struct SyntaxDocument {
    language: LanguageId,
    parser: Parser,
    tree: Tree,
}

impl SyntaxDocument {
    /// 无法识别的扩展名或语法加载失败时返回 `None`
    pub fn for_extension(ext: &str, rope: &Rope) -> Option<Self> {
        Self::new(LanguageId::from_extension(ext)?, rope)
    }

    pub fn new(language: LanguageId, rope: &Rope) -> Option<Self> {
        let mut parser = Parser::new();
        if let Err(e) = parser.set_language(language.ts_language()) {
            tracing::warn!(?language, error = ?e, "grammar rejected by parser");
            return None;
        }
        let tree = parse_rope(&mut parser, rope)?;
        Some(Self {
            language,
            parser,
            tree,
        })
    }

    pub fn language(&self) -> LanguageId {
        self.language
    }

    /// 整体重新解析；解析失败时保留旧树
    pub fn reparse(&mut self, rope: &Rope) {
        if let Some(tree) = parse_rope(&mut self.parser, rope) {
            self.tree = tree;
        }
    }

    pub fn highlight_all(&self, rope: &Rope) -> Vec<Vec<HighlightSpan>> {
        self.highlight_lines(rope, 0, rope.len_lines())
    }

    pub fn highlight_lines(
        &self,
        rope: &Rope,
        start_line: usize,
        end_line_exclusive: usize,
    ) -> Vec<Vec<HighlightSpan>> {
        let total_lines = rope.len_lines().max(1);
        let start_line = start_line.min(total_lines);
        let end_line_exclusive = end_line_exclusive.min(total_lines);
        if start_line >= end_line_exclusive {
            return Vec::new();
        }

        let range_start = rope.line_to_byte(start_line);
        let range_end = rope.line_to_byte(end_line_exclusive);
        let spans = collect_highlights(self.language, &self.tree, range_start, range_end);

        let mut per_line = vec![Vec::new(); end_line_exclusive - start_line];
        for span in spans {
            let span_start = span.start.max(range_start);
            let span_end = span.end.min(range_end);
            if span_start >= span_end {
                continue;
            }

            let first_line = rope.byte_to_line(span_start).max(start_line);
            let last_line = rope
                .byte_to_line(span_end.saturating_sub(1))
                .min(end_line_exclusive - 1);

            for line in first_line..=last_line {
                let line_start = rope.line_to_byte(line);
                let line_end = rope.line_to_byte((line + 1).min(total_lines));
                let s = span_start.max(line_start);
                let e = span_end.min(line_end);
                if s < e {
                    per_line[line - start_line].push(HighlightSpan {
                        start: s - line_start,
                        end: e - line_start,
                        kind: span.kind,
                    });
                }
            }
        }

        for line_spans in &mut per_line {
            line_spans.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));
            merge_adjacent_spans(line_spans);
        }
        per_line
    }
}

fn parse_rope(parser: &mut Parser, rope: &Rope) -> Option<Tree> {
    let mut cache = RopeChunkCache::new(rope);
    parser.parse_with(&mut |byte_offset, _| cache.bytes_from(byte_offset), None)
}

struct RopeChunkCache<'a> {
    rope: &'a Rope,
    chunk: &'a str,
    start: usize,
    end: usize,
}

impl<'a> RopeChunkCache<'a> {
    fn new(rope: &'a Rope) -> Self {
        Self {
            rope,
            chunk: "",
            start: 0,
            end: 0,
        }
    }

    fn bytes_from(&mut self, byte_offset: usize) -> &'a [u8] {
        if byte_offset >= self.rope.len_bytes() {
            return &[];
        }
        if byte_offset < self.start || byte_offset >= self.end {
            let (chunk, chunk_start, _, _) = self.rope.chunk_at_byte(byte_offset);
            self.chunk = chunk;
            self.start = chunk_start;
            self.end = chunk_start + chunk.len();
        }
        &self.chunk.as_bytes()[byte_offset - self.start..]
    }
}

fn merge_adjacent_spans(spans: &mut Vec<HighlightSpan>) {
    if spans.len() <= 1 {
        return;
    }
    let mut out: Vec<HighlightSpan> = Vec::with_capacity(spans.len());
    for span in spans.drain(..) {
        if let Some(prev) = out.last_mut() {
            if prev.kind == span.kind && span.start <= prev.end {
                prev.end = prev.end.max(span.end);
                continue;
            }
        }
        out.push(span);
    }
    *spans = out;
}

#[derive(Debug, Clone, Copy)]
struct AbsSpan {
    start: usize,
    end: usize,
    kind: HighlightKind,
}

fn collect_highlights(
    language: LanguageId,
    tree: &Tree,
    start_byte: usize,
    end_byte: usize,
) -> Vec<AbsSpan> {
    let mut stack = vec![tree.root_node()];
    let mut spans = Vec::new();

    while let Some(node) = stack.pop() {
        if node.end_byte() <= start_byte || node.start_byte() >= end_byte {
            continue;
        }

        if let Some(kind) = classify_node(language, node) {
            spans.push(AbsSpan {
                start: node.start_byte(),
                end: node.end_byte(),
                kind,
            });
            // 注释、字符串、属性整体着色，不再下钻
            if matches!(
                kind,
                HighlightKind::Comment | HighlightKind::String | HighlightKind::Attribute
            ) {
                continue;
            }
        }

        for i in (0..node.child_count()).rev() {
            if let Some(child) = node.child(i) {
                stack.push(child);
            }
        }
    }

    spans.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));
    spans
}

fn classify_node(language: LanguageId, node: Node<'_>) -> Option<HighlightKind> {
    let kind = node.kind();
    if kind.contains("comment") {
        return Some(HighlightKind::Comment);
    }
    if kind.contains("string") || matches!(kind, "char_literal" | "byte_literal") {
        return Some(HighlightKind::String);
    }
    if kind.contains("integer") || kind.contains("float") || kind.contains("number") {
        return Some(HighlightKind::Number);
    }
    if kind.ends_with("_literal") && (kind.contains("int") || kind.contains("imaginary")) {
        return Some(HighlightKind::Number);
    }
    if matches!(kind, "type_identifier" | "primitive_type" | "predefined_type") {
        return Some(HighlightKind::Type);
    }
    if matches!(kind, "attribute_item" | "inner_attribute_item" | "decorator") {
        return Some(HighlightKind::Attribute);
    }
    if kind == "lifetime" {
        return Some(HighlightKind::Lifetime);
    }
    if is_definition_name(node) {
        return Some(HighlightKind::Function);
    }
    if language.keywords().contains(&kind) {
        return Some(HighlightKind::Keyword);
    }
    None
}

/// 函数/方法定义处的名字
fn is_definition_name(node: Node<'_>) -> bool {
    if !matches!(
        node.kind(),
        "identifier" | "field_identifier" | "property_identifier"
    ) {
        return false;
    }
    let Some(parent) = node.parent() else {
        return false;
    };
    let is_definition = matches!(
        parent.kind(),
        "function_item"
            | "function_signature_item"
            | "function_definition"
            | "function_declaration"
            | "method_declaration"
            | "method_definition"
            | "generator_function_declaration"
    );
    is_definition
        && parent
            .child_by_field_name("name")
            .is_some_and(|name| name.id() == node.id())
}

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while",
];

const GO_KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range", "return",
    "select", "struct", "switch", "type", "var",
];

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "case", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "match", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

const JS_TS_KEYWORDS: &[&str] = &[
    "async", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "export", "extends", "false", "finally", "for", "from",
    "function", "if", "import", "in", "instanceof", "interface", "let", "new", "null", "of",
    "private", "protected", "public", "readonly", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "type", "typeof", "undefined", "var", "void", "while", "with",
    "yield",
];

#[cfg(test)]
#[path = "../../../tests/unit/kernel/session/syntax.rs"]
mod tests;
