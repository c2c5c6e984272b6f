//! HTML rendering.
//!
//! The renderer is an order-preserving walk over a parsed [`Document`].
//! Escaping, the page wrapper and asset inclusion are all controlled by
//! [`RenderOptions`].

use std::borrow::Cow;
use std::fs;
use std::path::PathBuf;

use log::debug;
#[cfg(feature = "serde")]
use serde::Deserialize;

use crate::ast::{Alignment, Block, Blockquote, Document, Inline, List, ListKind, Table};
use crate::error::RenderError;

/// Stylesheet used when no `css_file_path` is configured.
pub const DEFAULT_STYLESHEET: &str = include_str!("../assets/default.css");

const HIGHLIGHT_STYLESHEET: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.9.0/styles/github-dark.min.css";
const HIGHLIGHT_SCRIPT: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.9.0/highlight.min.js";
const DEFAULT_TITLE: &str = "Document";

/// Options recognized by [`HtmlRenderer`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(default))]
pub struct RenderOptions {
    /// Escape text, code and attribute values.
    pub escape_html: bool,
    /// Wrap the output in a full HTML page with an inline stylesheet.
    pub include_css: bool,
    /// Stylesheet to inline instead of [`DEFAULT_STYLESHEET`].
    pub css_file_path: Option<PathBuf>,
    /// Add highlight.js to the page (needs `include_css`).
    pub include_syntax_highlight: bool,
}

impl RenderOptions {
    pub fn with_escape_html(mut self, escape: bool) -> Self {
        self.escape_html = escape;
        self
    }

    pub fn with_css(mut self, include: bool) -> Self {
        self.include_css = include;
        self
    }

    pub fn with_css_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.css_file_path = Some(path.into());
        self
    }

    pub fn with_syntax_highlight(mut self, highlight: bool) -> Self {
        self.include_syntax_highlight = highlight;
        self
    }
}

/// Something that turns a [`Document`] into output text.
pub trait Renderer {
    fn render(&mut self, doc: &Document) -> Result<String, RenderError>;
}

/// Renders a [`Document`] as HTML.
#[derive(Debug, Default)]
pub struct HtmlRenderer {
    options: RenderOptions,
    buffer: String,
}

impl Renderer for HtmlRenderer {
    fn render(&mut self, doc: &Document) -> Result<String, RenderError> {
        self.buffer.clear();

        if self.options.include_css {
            let stylesheet = self.stylesheet()?;
            self.write_page_start(doc, &stylesheet);
        }

        for block in &doc.blocks {
            self.render_block(block);
        }

        if self.options.include_css {
            self.buffer
                .push_str("</article>\n</div>\n</body>\n</html>\n");
        }

        Ok(std::mem::take(&mut self.buffer))
    }
}

impl HtmlRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            buffer: String::new(),
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    fn stylesheet(&self) -> Result<Cow<'static, str>, RenderError> {
        match &self.options.css_file_path {
            Some(path) => {
                debug!("reading stylesheet {}", path.display());
                fs::read_to_string(path)
                    .map(Cow::Owned)
                    .map_err(|source| RenderError::Asset {
                        path: path.clone(),
                        source,
                    })
            }
            None => Ok(Cow::Borrowed(DEFAULT_STYLESHEET)),
        }
    }

    fn write_page_start(&mut self, doc: &Document, stylesheet: &str) {
        let title = page_title(doc);

        self.buffer.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        self.buffer.push_str("<meta charset=\"UTF-8\">\n");
        self.buffer.push_str(
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
        );
        self.buffer.push_str("<title>");
        html_escape::encode_text_to_string(&title, &mut self.buffer);
        self.buffer.push_str("</title>\n<style>\n");
        self.buffer.push_str(stylesheet.trim_end());
        self.buffer.push_str("\n</style>\n");

        if self.options.include_syntax_highlight {
            self.buffer.push_str(&format!(
                "<link rel=\"stylesheet\" href=\"{HIGHLIGHT_STYLESHEET}\">\n\
                 <script src=\"{HIGHLIGHT_SCRIPT}\"></script>\n\
                 <script>hljs.highlightAll();</script>\n"
            ));
        }

        self.buffer.push_str("</head>\n<body>\n");
        self.buffer
            .push_str("<div class=\"container\">\n<article class=\"post\">\n");
    }

    fn render_block(&mut self, block: &Block) {
        match block {
            Block::Heading(h) => {
                self.buffer.push_str(&format!("<h{}>", h.level));
                self.render_inlines(&h.text);
                self.buffer.push_str(&format!("</h{}>\n", h.level));
            }
            Block::Paragraph(p) => {
                self.buffer.push_str("<p>");
                self.render_inlines(&p.text);
                self.buffer.push_str("</p>\n");
            }
            Block::CodeBlock(c) => {
                if c.lang.is_empty() {
                    self.buffer.push_str("<pre><code>");
                } else {
                    self.buffer.push_str("<pre><code class=\"language-");
                    self.push_attr(&c.lang);
                    self.buffer.push_str("\">");
                }
                self.push_text(&c.code);
                self.buffer.push_str("</code></pre>\n");
            }
            Block::Table(t) => self.render_table(t),
            Block::List(l) => self.render_list(l),
            Block::Blockquote(q) => {
                self.render_blockquote(q);
                self.buffer.push('\n');
            }
        }
    }

    fn render_table(&mut self, table: &Table) {
        self.buffer.push_str("<table>\n<thead>\n<tr>\n");
        for (cell, alignment) in table.headers.iter().zip(&table.alignments) {
            self.buffer.push_str("<th");
            self.buffer.push_str(align_attr(*alignment));
            self.buffer.push('>');
            self.render_inlines(&cell.content);
            self.buffer.push_str("</th>\n");
        }
        self.buffer.push_str("</tr>\n</thead>\n");

        if !table.rows.is_empty() {
            self.buffer.push_str("<tbody>\n");
            for row in &table.rows {
                self.buffer.push_str("<tr>\n");
                for (cell, alignment) in row.iter().zip(&table.alignments) {
                    self.buffer.push_str("<td");
                    self.buffer.push_str(align_attr(*alignment));
                    self.buffer.push('>');
                    self.render_inlines(&cell.content);
                    self.buffer.push_str("</td>\n");
                }
                self.buffer.push_str("</tr>\n");
            }
            self.buffer.push_str("</tbody>\n");
        }

        self.buffer.push_str("</table>\n");
    }

    fn render_list(&mut self, list: &List) {
        let tag = match list.kind {
            ListKind::Ordered => "ol",
            ListKind::Unordered => "ul",
        };

        self.buffer.push_str(&format!("<{tag}>\n"));
        for item in &list.items {
            self.buffer.push_str("<li>");
            self.render_inlines(&item.content);
            if let Some(children) = &item.children {
                self.buffer.push('\n');
                self.render_list(children);
            }
            self.buffer.push_str("</li>\n");
        }
        self.buffer.push_str(&format!("</{tag}>\n"));
    }

    /// Each quoted line ends with `<br>`; nested quotes become inner
    /// `<blockquote>` elements right after their parent line.
    fn render_blockquote(&mut self, quote: &Blockquote) {
        self.buffer.push_str("<blockquote>");
        for item in &quote.items {
            self.render_inlines(&item.content);
            self.buffer.push_str("<br>");
            if let Some(children) = &item.children {
                self.render_blockquote(children);
            }
        }
        self.buffer.push_str("</blockquote>");
    }

    fn render_inlines(&mut self, inlines: &[Inline]) {
        for inline in inlines {
            self.render_inline(inline);
        }
    }

    fn render_inline(&mut self, inline: &Inline) {
        match inline {
            Inline::Text { content } => self.push_text(content),
            Inline::Bold { children } => {
                self.buffer.push_str("<strong>");
                self.render_inlines(children);
                self.buffer.push_str("</strong>");
            }
            Inline::Italic { children } => {
                self.buffer.push_str("<em>");
                self.render_inlines(children);
                self.buffer.push_str("</em>");
            }
            Inline::BoldItalic { children } => {
                self.buffer.push_str("<strong><em>");
                self.render_inlines(children);
                self.buffer.push_str("</em></strong>");
            }
            Inline::Link { text, url } => {
                self.buffer.push_str("<a href=\"");
                self.push_attr(url);
                self.buffer.push_str("\">");
                self.render_inlines(text);
                self.buffer.push_str("</a>");
            }
            Inline::CodeInline { content } => {
                self.buffer.push_str("<code>");
                self.push_text(content);
                self.buffer.push_str("</code>");
            }
            Inline::Image { alt, src, title } => {
                self.buffer.push_str("<img src=\"");
                self.push_attr(src);
                self.buffer.push_str("\" alt=\"");
                self.push_attr(alt);
                self.buffer.push('"');
                if !title.is_empty() {
                    self.buffer.push_str(" title=\"");
                    self.push_attr(title);
                    self.buffer.push('"');
                }
                self.buffer.push('>');
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        if self.options.escape_html {
            html_escape::encode_text_to_string(text, &mut self.buffer);
        } else {
            self.buffer.push_str(text);
        }
    }

    fn push_attr(&mut self, value: &str) {
        if self.options.escape_html {
            html_escape::encode_double_quoted_attribute_to_string(value, &mut self.buffer);
        } else {
            self.buffer.push_str(value);
        }
    }
}

fn align_attr(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Default => "",
        Alignment::Left => " align=\"left\"",
        Alignment::Center => " align=\"center\"",
        Alignment::Right => " align=\"right\"",
    }
}

/// Text of the first level-1 heading, if any.
fn page_title(doc: &Document) -> String {
    doc.blocks
        .iter()
        .find_map(|block| match block {
            Block::Heading(h) if h.level == 1 => Some(
                h.text
                    .iter()
                    .map(Inline::plain_text)
                    .collect::<String>(),
            ),
            _ => None,
        })
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}
