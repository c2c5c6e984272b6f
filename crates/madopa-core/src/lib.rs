//! # Madopa Core
//!
//! A small Markdown-to-HTML converter built around a two-phase parser.
//!
//! Block segmentation walks the input one line at a time, using lookahead
//! to tell tables from paragraphs and indentation or `>` counts to build
//! nested lists and quotes. Every text span then goes through a
//! recursive-descent inline tokenizer. The resulting [`Document`] is an
//! owned tree that a [`Renderer`] turns into HTML.
//!
//! ## Quick Start
//!
//! ```rust
//! use madopa_core::{parse, Block};
//!
//! let doc = parse("# Hello\n\nThis is **bold**.").unwrap();
//!
//! assert_eq!(doc.blocks.len(), 2);
//! assert!(matches!(doc.blocks[0], Block::Heading(_)));
//! ```
//!
//! ## Rendering
//!
//! ```rust
//! use madopa_core::{convert, RenderOptions};
//!
//! let options = RenderOptions::default().with_escape_html(true);
//! let html = convert("Use `<b>` for *bold*", &options).unwrap();
//!
//! assert_eq!(html, "<p>Use <code>&lt;b&gt;</code> for <em>bold</em></p>\n");
//! ```
//!
//! ## Errors
//!
//! Unterminated markup never fails a parse; it stays literal text. The
//! only fatal error is a table whose header and delimiter rows have
//! different column counts:
//!
//! ```rust
//! use madopa_core::{parse, ParseError};
//!
//! let err = parse("|a|b|\n|---|\n").unwrap_err();
//! assert_eq!(err, ParseError::TableColumnMismatch { header: 2, delimiter: 1 });
//! ```

pub mod ast;
pub mod error;
pub mod inline;
pub mod lexer;
pub mod parser;
pub mod render;

pub use ast::{Block, Document, Inline};
pub use error::{Error, ParseError, RenderError};
pub use parser::{parse, Parser};
pub use render::{HtmlRenderer, RenderOptions, Renderer};

/// Parse `markdown` and render it as HTML with `options`.
pub fn convert(markdown: &str, options: &RenderOptions) -> Result<String, Error> {
    let doc = parse(markdown)?;
    let html = HtmlRenderer::new(options.clone()).render(&doc)?;
    Ok(html)
}
