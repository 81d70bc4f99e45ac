//! The document tree produced by one render call, plus its HTML serializer.
//! Built fresh per call and never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::style::StyleMap;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableAlignment {
    None,
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Paragraph {
        children: Vec<Inline>,
    },
    Heading {
        level: u8,
        children: Vec<Inline>,
    },
    List {
        ordered: bool,
        start: usize,
        tight: bool,
        items: Vec<Vec<Block>>,
    },
    /// `html` is the pre-highlighted fragment; `literal` keeps the raw code
    /// for copy actions and tests.
    CodeBlock {
        language: Option<String>,
        literal: String,
        html: String,
    },
    BlockQuote {
        children: Vec<Block>,
    },
    Table {
        alignments: Vec<TableAlignment>,
        header: Vec<Vec<Inline>>,
        rows: Vec<Vec<Vec<Inline>>>,
    },
    Math(MathNode),
    ThematicBreak,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inline {
    Text { text: String },
    Code { literal: String },
    Emph { children: Vec<Inline> },
    Strong { children: Vec<Inline> },
    Strikethrough { children: Vec<Inline> },
    Link {
        url: String,
        title: Option<String>,
        children: Vec<Inline>,
    },
    Image {
        url: String,
        title: Option<String>,
        alt: String,
    },
    SoftBreak,
    LineBreak,
    Math(MathNode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MathKind {
    Inline,
    Display,
    Chemistry,
}

/// A rendered math or chemistry span spliced back into the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MathNode {
    /// Original span content with delimiters stripped.
    pub source: String,
    /// Final HTML fragment (KaTeX output, chemistry markup, or the error
    /// element).
    pub html: String,
    pub kind: MathKind,
    pub is_error: bool,
    pub error_message: Option<String>,
}

impl Document {
    /// Count of math nodes anywhere in the tree.
    pub fn math_node_count(&self) -> usize {
        fn count_inlines(inlines: &[Inline]) -> usize {
            inlines
                .iter()
                .map(|inline| match inline {
                    Inline::Math(_) => 1,
                    Inline::Emph { children }
                    | Inline::Strong { children }
                    | Inline::Strikethrough { children }
                    | Inline::Link { children, .. } => count_inlines(children),
                    _ => 0,
                })
                .sum()
        }
        fn count_blocks(blocks: &[Block]) -> usize {
            blocks
                .iter()
                .map(|block| match block {
                    Block::Math(_) => 1,
                    Block::Paragraph { children } | Block::Heading { children, .. } => {
                        count_inlines(children)
                    }
                    Block::BlockQuote { children } => count_blocks(children),
                    Block::List { items, .. } => items.iter().map(|i| count_blocks(i)).sum(),
                    Block::Table { header, rows, .. } => {
                        let head: usize = header.iter().map(|c| count_inlines(c)).sum();
                        let body: usize = rows
                            .iter()
                            .flat_map(|row| row.iter())
                            .map(|c| count_inlines(c))
                            .sum();
                        head + body
                    }
                    _ => 0,
                })
                .sum()
        }
        count_blocks(&self.blocks)
    }

    /// Serialise the tree to HTML with the given style table. Links open in
    /// a new browsing context; images are lazy-loaded.
    pub fn to_html(&self, styles: &StyleMap) -> String {
        let mut out = String::new();
        out.push_str(&format!("<div class=\"{}\">", styles.root));
        for block in &self.blocks {
            write_block(&mut out, block, styles);
        }
        out.push_str("</div>");
        out
    }
}

fn write_block(out: &mut String, block: &Block, styles: &StyleMap) {
    match block {
        Block::Paragraph { children } => {
            out.push_str(&format!("<p class=\"{}\">", styles.paragraph));
            write_inlines(out, children, styles);
            out.push_str("</p>");
        }
        Block::Heading { level, children } => {
            let level = (*level).clamp(1, 6);
            out.push_str(&format!("<h{level} class=\"{}\">", styles.heading));
            write_inlines(out, children, styles);
            out.push_str(&format!("</h{level}>"));
        }
        Block::List {
            ordered,
            start,
            items,
            ..
        } => {
            let tag = if *ordered { "ol" } else { "ul" };
            out.push_str(&format!("<{tag} class=\"{}\"", styles.list));
            if *ordered && *start != 1 {
                out.push_str(&format!(" start=\"{start}\""));
            }
            out.push('>');
            for item in items {
                out.push_str(&format!("<li class=\"{}\">", styles.list_item));
                for block in item {
                    write_block(out, block, styles);
                }
                out.push_str("</li>");
            }
            out.push_str(&format!("</{tag}>"));
        }
        Block::CodeBlock { html, .. } => out.push_str(html),
        Block::BlockQuote { children } => {
            out.push_str(&format!("<blockquote class=\"{}\">", styles.blockquote));
            for block in children {
                write_block(out, block, styles);
            }
            out.push_str("</blockquote>");
        }
        Block::Table {
            alignments,
            header,
            rows,
        } => write_table(out, alignments, header, rows, styles),
        Block::Math(node) => out.push_str(&node.html),
        Block::ThematicBreak => out.push_str("<hr />"),
    }
}

fn write_table(
    out: &mut String,
    alignments: &[TableAlignment],
    header: &[Vec<Inline>],
    rows: &[Vec<Vec<Inline>>],
    styles: &StyleMap,
) {
    let align_attr = |idx: usize| match alignments.get(idx) {
        Some(TableAlignment::Left) => " style=\"text-align: left\"",
        Some(TableAlignment::Center) => " style=\"text-align: center\"",
        Some(TableAlignment::Right) => " style=\"text-align: right\"",
        _ => "",
    };

    out.push_str(&format!("<table class=\"{}\"><thead><tr>", styles.table));
    for (idx, cell) in header.iter().enumerate() {
        out.push_str(&format!(
            "<th class=\"{}\"{}>",
            styles.table_cell,
            align_attr(idx)
        ));
        write_inlines(out, cell, styles);
        out.push_str("</th>");
    }
    out.push_str("</tr></thead><tbody>");
    for row in rows {
        out.push_str("<tr>");
        for (idx, cell) in row.iter().enumerate() {
            out.push_str(&format!(
                "<td class=\"{}\"{}>",
                styles.table_cell,
                align_attr(idx)
            ));
            write_inlines(out, cell, styles);
            out.push_str("</td>");
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
}

fn write_inlines(out: &mut String, inlines: &[Inline], styles: &StyleMap) {
    for inline in inlines {
        match inline {
            Inline::Text { text } => out.push_str(&ammonia::clean_text(text)),
            Inline::Code { literal } => {
                out.push_str(&format!("<code class=\"{}\">", styles.code_span));
                out.push_str(&ammonia::clean_text(literal));
                out.push_str("</code>");
            }
            Inline::Emph { children } => {
                out.push_str("<em>");
                write_inlines(out, children, styles);
                out.push_str("</em>");
            }
            Inline::Strong { children } => {
                out.push_str("<strong>");
                write_inlines(out, children, styles);
                out.push_str("</strong>");
            }
            Inline::Strikethrough { children } => {
                out.push_str("<del>");
                write_inlines(out, children, styles);
                out.push_str("</del>");
            }
            Inline::Link {
                url,
                title,
                children,
            } => {
                out.push_str(&format!(
                    "<a class=\"{}\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\"",
                    styles.link,
                    escape_attribute(url)
                ));
                if let Some(title) = title {
                    out.push_str(&format!(" title=\"{}\"", escape_attribute(title)));
                }
                out.push('>');
                write_inlines(out, children, styles);
                out.push_str("</a>");
            }
            Inline::Image { url, title, alt } => {
                out.push_str(&format!(
                    "<img class=\"{}\" src=\"{}\" alt=\"{}\" loading=\"lazy\"",
                    styles.image,
                    escape_attribute(url),
                    escape_attribute(alt)
                ));
                if let Some(title) = title {
                    out.push_str(&format!(" title=\"{}\"", escape_attribute(title)));
                }
                out.push_str(" />");
            }
            Inline::SoftBreak => out.push('\n'),
            Inline::LineBreak => out.push_str("<br />"),
            Inline::Math(node) => out.push_str(&node.html),
        }
    }
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\n' | '\r' | '\t' => escaped.push(' '),
            _ => escaped.push(ch),
        }
    }
    escaped
}
