//! Markdown pass: comrak parses the placeholder-substituted text, and the
//! resulting AST is converted into the crate's own [`Document`] tree with
//! math nodes spliced back in at their placeholder positions.
//!
//! Raw HTML in the source is deliberately kept as literal text — chat
//! messages are untrusted and this pipeline emits structure, not passthrough
//! markup.

use std::collections::{BTreeMap, HashSet};

use comrak::nodes::{AstNode, ListType, NodeValue, TableAlignment as ComrakAlignment};
use comrak::{Arena, parse_document};
use syntect::{html::ClassStyle, parsing::SyntaxSet};

use crate::document::{Block, Document, Inline, MathKind, MathNode, TableAlignment};
use crate::highlight::{highlight_code, plain_code_block};
use crate::placeholder::{TextPiece, TokenScheme};

pub(crate) struct MarkdownOutcome {
    pub document: Document,
    /// Placeholder ids actually located in the parsed tree.
    pub restored: HashSet<usize>,
    pub contains_code: bool,
}

pub(crate) fn to_document(
    text: &str,
    options: &comrak::Options<'static>,
    prepared: &BTreeMap<usize, MathNode>,
    tokens: &TokenScheme,
    syntax_set: &SyntaxSet,
    class_style: &ClassStyle,
) -> MarkdownOutcome {
    let arena = Arena::new();
    let root = parse_document(&arena, text, options);

    let mut converter = Converter {
        prepared,
        tokens,
        syntax_set,
        class_style,
        restored: HashSet::new(),
        contains_code: false,
    };
    let blocks = converter.convert_blocks(root);

    MarkdownOutcome {
        document: Document { blocks },
        restored: converter.restored,
        contains_code: converter.contains_code,
    }
}

struct Converter<'p> {
    prepared: &'p BTreeMap<usize, MathNode>,
    tokens: &'p TokenScheme,
    syntax_set: &'p SyntaxSet,
    class_style: &'p ClassStyle,
    restored: HashSet<usize>,
    contains_code: bool,
}

impl Converter<'_> {
    fn convert_blocks<'a>(&mut self, parent: &'a AstNode<'a>) -> Vec<Block> {
        let mut blocks = Vec::new();
        for node in parent.children() {
            let value = node.data.borrow().value.clone();
            match value {
                NodeValue::Paragraph => {
                    let children = self.convert_inlines(node);
                    blocks.push(collapse_paragraph(children));
                }
                NodeValue::Heading(heading) => blocks.push(Block::Heading {
                    level: heading.level,
                    children: self.convert_inlines(node),
                }),
                NodeValue::List(list) => blocks.push(Block::List {
                    ordered: list.list_type == ListType::Ordered,
                    start: list.start,
                    tight: list.tight,
                    items: node
                        .children()
                        .map(|item| self.convert_blocks(item))
                        .collect(),
                }),
                NodeValue::CodeBlock(code) => {
                    self.contains_code = true;
                    let language = code
                        .info
                        .split_whitespace()
                        .next()
                        .map(|lang| lang.to_string());
                    let lang_ref = language.as_deref();
                    let html =
                        highlight_code(lang_ref, &code.literal, self.syntax_set, self.class_style)
                            .unwrap_or_else(|_| plain_code_block(lang_ref, &code.literal));
                    blocks.push(Block::CodeBlock {
                        language,
                        literal: code.literal,
                        html,
                    });
                }
                NodeValue::BlockQuote => blocks.push(Block::BlockQuote {
                    children: self.convert_blocks(node),
                }),
                NodeValue::Table(table) => blocks.push(self.convert_table(node, &table.alignments)),
                NodeValue::ThematicBreak => blocks.push(Block::ThematicBreak),
                NodeValue::HtmlBlock(html) => {
                    let literal = html.literal.trim_end().to_string();
                    if !literal.is_empty() {
                        blocks.push(Block::Paragraph {
                            children: vec![Inline::Text { text: literal }],
                        });
                    }
                }
                // Extensions this pipeline does not enable never reach here;
                // anything unexpected degrades to its children.
                _ => blocks.extend(self.convert_blocks(node)),
            }
        }
        blocks
    }

    fn convert_table<'a>(
        &mut self,
        node: &'a AstNode<'a>,
        alignments: &[ComrakAlignment],
    ) -> Block {
        let alignments = alignments
            .iter()
            .map(|a| match a {
                ComrakAlignment::None => TableAlignment::None,
                ComrakAlignment::Left => TableAlignment::Left,
                ComrakAlignment::Center => TableAlignment::Center,
                ComrakAlignment::Right => TableAlignment::Right,
            })
            .collect();

        let mut header = Vec::new();
        let mut rows = Vec::new();
        for row in node.children() {
            let is_header = matches!(row.data.borrow().value, NodeValue::TableRow(true));
            let cells: Vec<Vec<Inline>> = row
                .children()
                .map(|cell| self.convert_inlines(cell))
                .collect();
            if is_header && header.is_empty() {
                header = cells;
            } else {
                rows.push(cells);
            }
        }

        Block::Table {
            alignments,
            header,
            rows,
        }
    }

    fn convert_inlines<'a>(&mut self, parent: &'a AstNode<'a>) -> Vec<Inline> {
        let mut inlines = Vec::new();
        for node in parent.children() {
            let value = node.data.borrow().value.clone();
            match value {
                NodeValue::Text(text) => self.push_text(&text, &mut inlines),
                NodeValue::Code(code) => inlines.push(Inline::Code {
                    literal: code.literal,
                }),
                NodeValue::Emph => inlines.push(Inline::Emph {
                    children: self.convert_inlines(node),
                }),
                NodeValue::Strong => inlines.push(Inline::Strong {
                    children: self.convert_inlines(node),
                }),
                NodeValue::Strikethrough => inlines.push(Inline::Strikethrough {
                    children: self.convert_inlines(node),
                }),
                NodeValue::Link(link) => inlines.push(Inline::Link {
                    url: link.url,
                    title: (!link.title.is_empty()).then_some(link.title),
                    children: self.convert_inlines(node),
                }),
                NodeValue::Image(link) => inlines.push(Inline::Image {
                    url: link.url,
                    title: (!link.title.is_empty()).then_some(link.title),
                    alt: collect_text(node),
                }),
                NodeValue::SoftBreak => inlines.push(Inline::SoftBreak),
                NodeValue::LineBreak => inlines.push(Inline::LineBreak),
                NodeValue::HtmlInline(raw) => inlines.push(Inline::Text { text: raw }),
                _ => inlines.extend(self.convert_inlines(node)),
            }
        }
        inlines
    }

    /// Split literal text around placeholder tokens and splice in the
    /// prepared math nodes. A token without a prepared counterpart stays
    /// visible as text; the restoration accounting upstream reports it.
    fn push_text(&mut self, text: &str, inlines: &mut Vec<Inline>) {
        for piece in self.tokens.split_text(text) {
            match piece {
                TextPiece::Literal(literal) => inlines.push(Inline::Text {
                    text: literal.to_string(),
                }),
                TextPiece::Token(id) => match self.prepared.get(&id) {
                    Some(node) => {
                        self.restored.insert(id);
                        inlines.push(Inline::Math(node.clone()));
                    }
                    None => inlines.push(Inline::Text {
                        text: self.tokens.token_for(id),
                    }),
                },
            }
        }
    }
}

/// A paragraph holding nothing but one display-math node collapses into a
/// block math node; the placeholder engine put it on its own line exactly
/// so that this holds.
fn collapse_paragraph(mut children: Vec<Inline>) -> Block {
    let lone_display = children.len() == 1
        && matches!(&children[0], Inline::Math(node) if node.kind == MathKind::Display);
    if lone_display {
        if let Some(Inline::Math(node)) = children.pop() {
            return Block::Math(node);
        }
    }
    Block::Paragraph { children }
}

fn collect_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    fn walk<'a>(node: &'a AstNode<'a>, out: &mut String) {
        match &node.data.borrow().value {
            NodeValue::Text(t) => out.push_str(t),
            NodeValue::Code(code) => out.push_str(&code.literal),
            NodeValue::SoftBreak | NodeValue::LineBreak => out.push(' '),
            _ => {}
        }
        for child in node.children() {
            walk(child, out);
        }
    }
    for child in node.children() {
        walk(child, &mut text);
    }
    text
}
