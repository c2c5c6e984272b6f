//! Abstract Syntax Tree types for Markdown documents.
//!
//! This module contains all the node types produced by the parser.
//! The tree is designed to be:
//!
//! - **Owned**: every string is copied out of the input, so a [`Document`]
//!   outlives the buffer it was parsed from
//! - **Closed**: [`Block`] and [`Inline`] are exhaustive enums; consumers
//!   dispatch with `match`
//! - **Acyclic**: each node exclusively owns its children

#[cfg(feature = "serde")]
use serde::Serialize;

/// A parsed Markdown document.
///
/// The document is the root of the tree and holds every block in
/// source order. It is built once by the parser and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Document {
    /// Content blocks in document order.
    pub blocks: Vec<Block>,
}

impl Document {
    /// Number of top-level blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Block-level nodes.
///
/// Each variant represents a distinct block type with its own structure.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(tag = "type"))]
pub enum Block {
    /// Section heading (levels 1-6).
    Heading(Heading),
    /// A single line of text with inline formatting.
    Paragraph(Paragraph),
    /// Fenced code block with optional language.
    CodeBlock(CodeBlock),
    /// Pipe table with header, alignments and body rows.
    Table(Table),
    /// Ordered or unordered list, possibly nested.
    List(List),
    /// Block quotation, possibly nested.
    Blockquote(Blockquote),
}

/// Section heading with level and inline content.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Heading {
    /// Heading level, always within 1..=6.
    pub level: u8,
    /// Inline content.
    pub text: Vec<Inline>,
}

/// Paragraph containing inline elements.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Paragraph {
    pub text: Vec<Inline>,
}

/// Fenced code block.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CodeBlock {
    /// Language tag from the opening fence (may be empty).
    pub lang: String,
    /// Raw code, whitespace-trimmed. Escaping is left to the renderer.
    pub code: String,
}

/// Per-column alignment declared in a table's delimiter row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "lowercase"))]
pub enum Alignment {
    #[default]
    Default,
    Left,
    Center,
    Right,
}

/// Pipe table.
///
/// `headers` and `alignments` always have the same length, and every row
/// has exactly that many cells.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Table {
    pub headers: Vec<Cell>,
    pub rows: Vec<Vec<Cell>>,
    pub alignments: Vec<Alignment>,
}

impl Table {
    /// Number of columns.
    pub fn columns(&self) -> usize {
        self.headers.len()
    }
}

/// A single table cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Cell {
    pub content: Vec<Inline>,
}

/// List ordering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "lowercase"))]
pub enum ListKind {
    /// Bulleted list (`-` or `*`).
    Unordered,
    /// Numbered list (`1.`).
    Ordered,
}

/// A list block. The kind is taken from its first item's marker.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct List {
    pub kind: ListKind,
    pub items: Vec<ListItem>,
}

/// A single list item with an optional nested list.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ListItem {
    /// Indentation depth: leading whitespace / 2.
    pub depth: usize,
    pub content: Vec<Inline>,
    pub children: Option<Box<List>>,
}

/// Block quotation made of one item per quoted line.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Blockquote {
    pub items: Vec<BlockquoteItem>,
}

/// A single quoted line with an optional nested quotation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct BlockquoteItem {
    /// Number of `>` markers, at least 1.
    pub depth: usize,
    pub content: Vec<Inline>,
    pub children: Option<Box<Blockquote>>,
}

/// Inline-level nodes (within headings, paragraphs, cells, items).
///
/// Inline elements can be nested; each owns its children.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(tag = "type"))]
pub enum Inline {
    /// Plain text.
    Text { content: String },
    /// Strong text (`**bold**` or `__bold__`).
    Bold { children: Vec<Inline> },
    /// Emphasized text (`*italic*` or `_italic_`).
    Italic { children: Vec<Inline> },
    /// Strong and emphasized text (`***both***`).
    BoldItalic { children: Vec<Inline> },
    /// Hyperlink with label and URL.
    Link { text: Vec<Inline>, url: String },
    /// Inline code (`code`), never parsed for formatting.
    CodeInline { content: String },
    /// Image with alt text, source and optional title (empty if absent).
    Image {
        alt: String,
        src: String,
        title: String,
    },
}

impl Inline {
    /// Build a text node.
    pub fn text(content: impl Into<String>) -> Self {
        Inline::Text {
            content: content.into(),
        }
    }

    /// Concatenate the literal text carried by this node and its children.
    ///
    /// Images contribute their alt text; markup itself is dropped.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Inline::Text { content } | Inline::CodeInline { content } => out.push_str(content),
            Inline::Bold { children }
            | Inline::Italic { children }
            | Inline::BoldItalic { children } => {
                children.iter().for_each(|child| child.collect_text(out))
            }
            Inline::Link { text, .. } => text.iter().for_each(|child| child.collect_text(out)),
            Inline::Image { alt, .. } => out.push_str(alt),
        }
    }
}
