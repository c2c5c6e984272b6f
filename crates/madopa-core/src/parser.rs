//! Block parser.
//!
//! Classifies each non-blank line, routes it to a block parser and
//! collects the results in line order. Block parsers copy their text into
//! owned nodes and hand every text span to the inline tokenizer.

use log::{debug, trace};

use crate::ast::{
    Alignment, Block, Blockquote, BlockquoteItem, Cell, CodeBlock, Document, Heading, List,
    ListItem, ListKind, Paragraph, Table,
};
use crate::error::ParseError;
use crate::inline::parse_inlines;
use crate::lexer::{normalize, Cursor, Line};

const FENCE: &str = "```";
const MAX_HEADING_LEVEL: usize = 6;

/// Markdown block parser.
///
/// The parser holds no state between calls; each [`Parser::parse`] owns
/// its own cursor, so one parser may be shared freely.
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser;

impl Parser {
    /// Create a new parser.
    #[inline]
    pub fn new() -> Self {
        Self
    }

    /// Parse `input` into a [`Document`].
    ///
    /// Fails only when a table's header and delimiter rows disagree on
    /// the number of columns; no partial document is returned then.
    pub fn parse(&self, input: &str) -> Result<Document, ParseError> {
        let normalized = normalize(input);
        let mut cursor = Cursor::new(&normalized);

        debug!("parsing {} bytes", normalized.len());
        let blocks = self.parse_blocks(&mut cursor)?;
        debug!("parsed {} top-level blocks", blocks.len());

        Ok(Document { blocks })
    }

    fn parse_blocks(&self, cursor: &mut Cursor<'_>) -> Result<Vec<Block>, ParseError> {
        let mut blocks = Vec::with_capacity(16);

        loop {
            cursor.skip_blank_lines();

            let Some(line) = cursor.peek_line() else {
                break;
            };

            blocks.push(self.parse_block(cursor, line)?);
        }

        Ok(blocks)
    }

    /// Dispatch on the left-trimmed line. Every branch consumes at least
    /// the line it was given.
    fn parse_block<'a>(
        &self,
        cursor: &mut Cursor<'a>,
        line: Line<'a>,
    ) -> Result<Block, ParseError> {
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') {
            trace!("heading at byte {}", cursor.offset());
            return Ok(self.parse_heading(cursor, line));
        }

        if trimmed.starts_with(FENCE) {
            trace!("code block at byte {}", cursor.offset());
            return Ok(self.parse_code_block(cursor, line));
        }

        if trimmed.contains('|') {
            if let Some(delimiter) = self.table_delimiter(cursor) {
                trace!("table at byte {}", cursor.offset());
                return self.parse_table(cursor, line, delimiter);
            }
        }

        if trimmed.starts_with('>') {
            trace!("blockquote at byte {}", cursor.offset());
            return Ok(self.parse_blockquote(cursor));
        }

        if let Some(marker) = list_marker(trimmed) {
            trace!("{:?} list at byte {}", marker.kind, cursor.offset());
            return Ok(self.parse_list(cursor, marker.kind));
        }

        trace!("paragraph at byte {}", cursor.offset());
        Ok(self.parse_paragraph(cursor, line))
    }

    fn parse_heading(&self, cursor: &mut Cursor<'_>, line: Line<'_>) -> Block {
        cursor.next_line();

        let trimmed = line.trim_start();
        let marker_len = trimmed.bytes().take_while(|&b| b == b'#').count();
        let level = marker_len.min(MAX_HEADING_LEVEL) as u8;
        let text = trimmed[marker_len..].trim();

        Block::Heading(Heading {
            level,
            text: parse_inlines(text),
        })
    }

    fn parse_paragraph(&self, cursor: &mut Cursor<'_>, line: Line<'_>) -> Block {
        cursor.next_line();

        Block::Paragraph(Paragraph {
            text: parse_inlines(line.trimmed()),
        })
    }

    /// Lines up to the closing fence (or end of input) are kept verbatim.
    fn parse_code_block(&self, cursor: &mut Cursor<'_>, line: Line<'_>) -> Block {
        cursor.next_line();

        let lang = line.trimmed().strip_prefix(FENCE).unwrap_or("").trim();

        let mut code = String::new();
        while let Some(next) = cursor.next_line() {
            if next.trimmed() == FENCE {
                break;
            }
            code.push_str(next.text);
            code.push('\n');
        }

        Block::CodeBlock(CodeBlock {
            lang: lang.to_string(),
            code: code.trim().to_string(),
        })
    }

    /// Non-destructive lookahead: the line after the current one is a
    /// table delimiter row if it holds both `|` and `-`.
    fn table_delimiter<'a>(&self, cursor: &mut Cursor<'a>) -> Option<Line<'a>> {
        let checkpoint = cursor.checkpoint();
        cursor.next_line();
        let next = cursor.peek_line();
        cursor.restore(checkpoint);

        next.filter(|next| next.text.contains('|') && next.text.contains('-'))
    }

    fn parse_table<'a>(
        &self,
        cursor: &mut Cursor<'a>,
        header: Line<'a>,
        delimiter: Line<'a>,
    ) -> Result<Block, ParseError> {
        cursor.next_line();
        cursor.next_line();

        let alignments: Vec<Alignment> = split_row(delimiter.text)
            .into_iter()
            .map(parse_alignment)
            .collect();
        let headers = parse_row(header.text);

        if headers.len() != alignments.len() {
            debug!(
                "table header has {} cells but delimiter row has {}",
                headers.len(),
                alignments.len()
            );
            return Err(ParseError::TableColumnMismatch {
                header: headers.len(),
                delimiter: alignments.len(),
            });
        }

        let mut rows = Vec::new();
        while let Some(line) = cursor.peek_line() {
            if line.text.is_empty() || !line.text.contains('|') {
                break;
            }
            cursor.next_line();

            let mut row = parse_row(line.text);
            row.resize_with(headers.len(), Cell::default);
            rows.push(row);
        }

        Ok(Block::Table(Table {
            headers,
            rows,
            alignments,
        }))
    }

    /// Consume list items until a line that is not one.
    fn parse_list(&self, cursor: &mut Cursor<'_>, kind: ListKind) -> Block {
        let mut items: Vec<ListItem> = Vec::with_capacity(8);

        while let Some(line) = cursor.peek_line() {
            let Some(marker) = list_marker(line.trim_start()) else {
                break;
            };
            cursor.next_line();

            let item = ListItem {
                depth: line.indent() / 2,
                content: parse_inlines(marker.text),
                children: None,
            };

            attach(&mut items, item, |parent, child| {
                parent
                    .children
                    .get_or_insert_with(|| {
                        Box::new(List {
                            kind: marker.kind,
                            items: Vec::new(),
                        })
                    })
                    .items
                    .push(child)
            });
        }

        Block::List(List { kind, items })
    }

    /// Consume quoted lines until a line that does not start with `>`.
    fn parse_blockquote(&self, cursor: &mut Cursor<'_>) -> Block {
        let mut items: Vec<BlockquoteItem> = Vec::with_capacity(8);

        while let Some(line) = cursor.peek_line() {
            let trimmed = line.trimmed();
            if !trimmed.starts_with('>') {
                break;
            }
            cursor.next_line();

            let (depth, content) = quote_marker(trimmed);
            if content.is_empty() {
                continue;
            }

            let item = BlockquoteItem {
                depth,
                content: parse_inlines(content),
                children: None,
            };

            attach(&mut items, item, |parent, child| {
                parent
                    .children
                    .get_or_insert_with(|| Box::new(Blockquote { items: Vec::new() }))
                    .items
                    .push(child)
            });
        }

        Block::Blockquote(Blockquote { items })
    }
}

/// Parse a whole document with a default [`Parser`].
#[inline]
pub fn parse(input: &str) -> Result<Document, ParseError> {
    Parser::new().parse(input)
}

/// A recognized list-item marker and the item text that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ListMarker<'a> {
    kind: ListKind,
    text: &'a str,
}

/// Match `- `, `* ` or `<digits>.<whitespace>` at the start of an
/// already left-trimmed line.
fn list_marker(trimmed: &str) -> Option<ListMarker<'_>> {
    if let Some(rest) = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
    {
        return Some(ListMarker {
            kind: ListKind::Unordered,
            text: rest.trim(),
        });
    }

    let bytes = trimmed.as_bytes();
    let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 || bytes.get(digits) != Some(&b'.') {
        return None;
    }

    let after_dot = &trimmed[digits + 1..];
    if !after_dot.starts_with(|c: char| c.is_ascii_whitespace()) {
        return None;
    }

    Some(ListMarker {
        kind: ListKind::Ordered,
        text: after_dot.trim(),
    })
}

/// Count the `>` markers in the leading run of `>` and whitespace, and
/// return the trimmed text after that run.
fn quote_marker(trimmed: &str) -> (usize, &str) {
    let mut depth = 0;
    let mut end = trimmed.len();

    for (index, c) in trimmed.char_indices() {
        match c {
            '>' => depth += 1,
            c if c.is_whitespace() => {}
            _ => {
                end = index;
                break;
            }
        }
    }

    (depth, trimmed[end..].trim())
}

/// Split a table line on `|`, dropping the empty cells produced by a
/// leading or trailing pipe.
fn split_row(line: &str) -> Vec<&str> {
    let mut cells: Vec<&str> = line.trim().split('|').collect();

    if cells.first().is_some_and(|cell| cell.is_empty()) {
        cells.remove(0);
    }
    if cells.last().is_some_and(|cell| cell.is_empty()) {
        cells.pop();
    }

    cells
}

fn parse_row(line: &str) -> Vec<Cell> {
    split_row(line)
        .into_iter()
        .map(|cell| Cell {
            content: parse_inlines(cell.trim()),
        })
        .collect()
}

/// Leading `:` maps to right, trailing `:` to left, both to center.
fn parse_alignment(cell: &str) -> Alignment {
    let cell = cell.trim();
    match (cell.starts_with(':'), cell.ends_with(':')) {
        (true, true) => Alignment::Center,
        (true, false) => Alignment::Right,
        (false, true) => Alignment::Left,
        (false, false) => Alignment::Default,
    }
}

/// An item in a depth-keyed tree (list items, quoted lines).
trait Nested: Sized {
    fn depth(&self) -> usize;
    fn children(&self) -> Option<&[Self]>;
    fn children_mut(&mut self) -> Option<&mut Vec<Self>>;
}

impl Nested for ListItem {
    fn depth(&self) -> usize {
        self.depth
    }

    fn children(&self) -> Option<&[Self]> {
        self.children.as_deref().map(|list| list.items.as_slice())
    }

    fn children_mut(&mut self) -> Option<&mut Vec<Self>> {
        self.children.as_deref_mut().map(|list| &mut list.items)
    }
}

impl Nested for BlockquoteItem {
    fn depth(&self) -> usize {
        self.depth
    }

    fn children(&self) -> Option<&[Self]> {
        self.children.as_deref().map(|quote| quote.items.as_slice())
    }

    fn children_mut(&mut self) -> Option<&mut Vec<Self>> {
        self.children.as_deref_mut().map(|quote| &mut quote.items)
    }
}

/// Nearest-ancestor search for an item at `depth`.
///
/// Scans most-recent-first for an item one level shallower. An item that
/// is shallower but not the direct parent and already has children is
/// searched recursively, and its result is final.
fn find_parent<T: Nested>(items: &mut [T], depth: usize) -> Option<&mut T> {
    let target = depth.checked_sub(1)?;

    for index in (0..items.len()).rev() {
        let item_depth = items[index].depth();

        if item_depth == target {
            return Some(&mut items[index]);
        }

        if item_depth < depth && items[index].children().is_some() {
            return items[index]
                .children_mut()
                .and_then(|children| find_parent(children, depth));
        }
    }

    None
}

/// Attach `item` under its nearest ancestor, or append it at the top
/// level when there is none.
fn attach<T: Nested>(items: &mut Vec<T>, item: T, adopt: impl FnOnce(&mut T, T)) {
    let depth = item.depth();
    match find_parent(items, depth) {
        Some(parent) => adopt(parent, item),
        None => {
            if depth > 0 {
                trace!("no parent at depth {}, keeping item at top level", depth);
            }
            items.push(item)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_marker_recognizes_bullets_and_numbers() {
        assert_eq!(
            list_marker("- item"),
            Some(ListMarker {
                kind: ListKind::Unordered,
                text: "item"
            })
        );
        assert_eq!(
            list_marker("* item "),
            Some(ListMarker {
                kind: ListKind::Unordered,
                text: "item"
            })
        );
        assert_eq!(
            list_marker("12.\tstep"),
            Some(ListMarker {
                kind: ListKind::Ordered,
                text: "step"
            })
        );
    }

    #[test]
    fn list_marker_rejects_non_items() {
        assert_eq!(list_marker("-item"), None);
        assert_eq!(list_marker("*emphasis*"), None);
        assert_eq!(list_marker("1.5 apples"), None);
        assert_eq!(list_marker("1."), None);
        assert_eq!(list_marker(". x"), None);
        assert_eq!(list_marker(""), None);
    }

    #[test]
    fn quote_marker_counts_spaced_markers() {
        assert_eq!(quote_marker("> text"), (1, "text"));
        assert_eq!(quote_marker("> > nested"), (2, "nested"));
        assert_eq!(quote_marker(">>>deep"), (3, "deep"));
        assert_eq!(quote_marker("> a > b"), (1, "a > b"));
        assert_eq!(quote_marker(">"), (1, ""));
    }

    #[test]
    fn split_row_drops_outer_pipes_only() {
        assert_eq!(split_row("| a | b |"), vec![" a ", " b "]);
        assert_eq!(split_row("a|b"), vec!["a", "b"]);
        assert_eq!(split_row("|a||b|"), vec!["a", "", "b"]);
        assert!(split_row("|").is_empty());
    }

    #[test]
    fn alignment_mapping() {
        assert_eq!(parse_alignment("---"), Alignment::Default);
        assert_eq!(parse_alignment(" :--- "), Alignment::Right);
        assert_eq!(parse_alignment("---:"), Alignment::Left);
        assert_eq!(parse_alignment(":---:"), Alignment::Center);
        assert_eq!(parse_alignment(""), Alignment::Default);
    }

    fn item(depth: usize) -> ListItem {
        ListItem {
            depth,
            content: Vec::new(),
            children: None,
        }
    }

    fn adopt(parent: &mut ListItem, child: ListItem) {
        parent
            .children
            .get_or_insert_with(|| {
                Box::new(List {
                    kind: ListKind::Unordered,
                    items: Vec::new(),
                })
            })
            .items
            .push(child)
    }

    #[test]
    fn attach_builds_three_levels() {
        let mut items = Vec::new();
        for depth in [0, 1, 2, 1] {
            attach(&mut items, item(depth), adopt);
        }

        assert_eq!(items.len(), 1);
        let level1 = items[0].children().unwrap();
        assert_eq!(level1.len(), 2);
        assert_eq!(level1[0].children().unwrap().len(), 1);
        assert!(level1[1].children.is_none());
    }

    #[test]
    fn attach_flattens_orphans() {
        let mut items = Vec::new();
        attach(&mut items, item(0), adopt);
        attach(&mut items, item(2), adopt);

        assert_eq!(items.len(), 2);
        assert_eq!(items[1].depth, 2);
    }
}
