//! Recursive-descent inline tokenizer.
//!
//! Uses SIMD-accelerated scanning to jump between delimiter candidates.
//! Greedy, left-to-right parsing with no backtracking: every opener looks
//! for the first occurrence of its closer, and an opener without a closer
//! stays in the literal text.

use memchr::{memchr, memchr2, memchr3};

use crate::ast::Inline;

/// Parse inline elements from a span of text.
#[inline]
pub fn parse_inlines(text: &str) -> Vec<Inline> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut parser = InlineParser::new(text);
    parser.parse()
}

/// Split an image destination into source and title on the first run of
/// whitespace. A title wrapped in double quotes loses its quotes.
fn split_source_title(dest: &str) -> (&str, &str) {
    let Some(gap) = dest.find(|c: char| c.is_ascii_whitespace()) else {
        return (dest, "");
    };

    let src = &dest[..gap];
    let title = dest[gap..].trim_start_matches(|c: char| c.is_ascii_whitespace());
    let title = if title.len() >= 2 && title.starts_with('"') && title.ends_with('"') {
        &title[1..title.len() - 1]
    } else {
        title
    };
    (src, title)
}

struct InlineParser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> InlineParser<'a> {
    #[inline]
    fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn parse(&mut self) -> Vec<Inline> {
        let mut inlines = Vec::with_capacity(8);
        let mut text_start = 0;

        while self.pos < self.bytes.len() {
            let next_special = self.find_next_special();

            if next_special >= self.bytes.len() {
                break;
            }

            self.pos = next_special;

            // Each attempt advances `pos`: past the closer on success, past
            // the opener on failure.
            match self.bytes[self.pos] {
                b'*' | b'_' => self.parse_emphasis(&mut inlines, &mut text_start),
                b'[' => self.parse_link(&mut inlines, &mut text_start),
                b'`' => self.parse_code(&mut inlines, &mut text_start),
                b'!' => self.parse_image(&mut inlines, &mut text_start),
                _ => self.pos += 1,
            }
        }

        // Flush remaining text
        if text_start < self.bytes.len() {
            inlines.push(self.make_text(text_start, self.bytes.len()));
        }

        inlines
    }

    #[inline(always)]
    fn find_next_special(&self) -> usize {
        let remaining = &self.bytes[self.pos..];

        let emphasis_or_link = memchr3(b'*', b'_', b'[', remaining);
        let code_or_image = memchr2(b'`', b'!', remaining);

        match (emphasis_or_link, code_or_image) {
            (Some(a), Some(b)) => self.pos + a.min(b),
            (Some(a), None) => self.pos + a,
            (None, Some(b)) => self.pos + b,
            (None, None) => self.bytes.len(),
        }
    }

    #[inline(always)]
    fn make_text(&self, start: usize, end: usize) -> Inline {
        Inline::text(&self.text[start..end])
    }

    #[inline(always)]
    fn flush_text(&self, inlines: &mut Vec<Inline>, text_start: usize) {
        if text_start < self.pos {
            inlines.push(self.make_text(text_start, self.pos));
        }
    }

    #[inline(always)]
    fn at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    /// `***x***`, then `**x**` / `__x__`, then `*x*` / `_x_`.
    fn parse_emphasis(&mut self, inlines: &mut Vec<Inline>, text_start: &mut usize) {
        let marker = self.bytes[self.pos];
        let run = if marker == b'*' && self.at(1) == Some(b'*') && self.at(2) == Some(b'*') {
            3
        } else if self.at(1) == Some(marker) {
            2
        } else {
            1
        };

        let start = self.pos;
        let content_start = start + run;
        let delimiter = &self.text[start..content_start];

        let Some(offset) = self.text[content_start..].find(delimiter) else {
            self.pos = content_start;
            return;
        };
        let close = content_start + offset;

        self.flush_text(inlines, *text_start);

        let children = parse_inlines(&self.text[content_start..close]);
        inlines.push(match run {
            3 => Inline::BoldItalic { children },
            2 => Inline::Bold { children },
            _ => Inline::Italic { children },
        });

        self.pos = close + run;
        *text_start = self.pos;
    }

    /// `[text](url)`: the `]` must be immediately followed by `(`.
    fn parse_link(&mut self, inlines: &mut Vec<Inline>, text_start: &mut usize) {
        let start = self.pos;

        let Some((close, paren)) = self.find_bracket_paren(start + 1) else {
            self.pos += 1;
            return;
        };

        self.flush_text(inlines, *text_start);

        inlines.push(Inline::Link {
            text: parse_inlines(&self.text[start + 1..close]),
            url: self.text[close + 2..paren].to_string(),
        });

        self.pos = paren + 1;
        *text_start = self.pos;
    }

    #[inline]
    fn parse_code(&mut self, inlines: &mut Vec<Inline>, text_start: &mut usize) {
        let start = self.pos;

        let Some(offset) = memchr(b'`', &self.bytes[start + 1..]) else {
            self.pos += 1;
            return;
        };
        let close = start + 1 + offset;

        self.flush_text(inlines, *text_start);

        inlines.push(Inline::CodeInline {
            content: self.text[start + 1..close].to_string(),
        });

        self.pos = close + 1;
        *text_start = self.pos;
    }

    /// `![alt](src "title")`.
    fn parse_image(&mut self, inlines: &mut Vec<Inline>, text_start: &mut usize) {
        let start = self.pos;

        let found = if self.at(1) == Some(b'[') {
            self.find_bracket_paren(start + 2)
        } else {
            None
        };
        let Some((close, paren)) = found else {
            self.pos += 1;
            return;
        };

        self.flush_text(inlines, *text_start);

        let (src, title) = split_source_title(&self.text[close + 2..paren]);
        inlines.push(Inline::Image {
            alt: self.text[start + 2..close].to_string(),
            src: src.to_string(),
            title: title.to_string(),
        });

        self.pos = paren + 1;
        *text_start = self.pos;
    }

    /// From `from`, find the first `]`; it must be followed by `(`, and a
    /// `)` must come later. Returns the positions of `]` and `)`.
    #[inline]
    fn find_bracket_paren(&self, from: usize) -> Option<(usize, usize)> {
        let close = from + memchr(b']', self.bytes.get(from..)?)?;
        if self.bytes.get(close + 1) != Some(&b'(') {
            return None;
        }
        let url_start = close + 2;
        let paren = url_start + memchr(b')', &self.bytes[url_start..])?;
        Some((close, paren))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> Inline {
        Inline::text(s)
    }

    #[test]
    fn plain_text_is_one_node() {
        assert_eq!(parse_inlines("just words"), vec![text("just words")]);
    }

    #[test]
    fn empty_span_has_no_nodes() {
        assert!(parse_inlines("").is_empty());
    }

    #[test]
    fn bold_and_italic() {
        assert_eq!(
            parse_inlines("**a** and *b*"),
            vec![
                Inline::Bold {
                    children: vec![text("a")]
                },
                text(" and "),
                Inline::Italic {
                    children: vec![text("b")]
                },
            ]
        );
    }

    #[test]
    fn underscore_markers() {
        assert_eq!(
            parse_inlines("__strong__ _em_"),
            vec![
                Inline::Bold {
                    children: vec![text("strong")]
                },
                text(" "),
                Inline::Italic {
                    children: vec![text("em")]
                },
            ]
        );
    }

    #[test]
    fn triple_marker_is_bold_italic() {
        assert_eq!(
            parse_inlines("***both***"),
            vec![Inline::BoldItalic {
                children: vec![text("both")]
            }]
        );
    }

    #[test]
    fn nested_emphasis_is_recursive() {
        assert_eq!(
            parse_inlines("**bold _inner_**"),
            vec![Inline::Bold {
                children: vec![
                    text("bold "),
                    Inline::Italic {
                        children: vec![text("inner")]
                    },
                ]
            }]
        );
    }

    #[test]
    fn unterminated_bold_stays_literal() {
        assert_eq!(parse_inlines("a **b"), vec![text("a **b")]);
    }

    #[test]
    fn unterminated_triple_skips_whole_opener() {
        // The `***` is not retried as `**` or `*`, so the later `*` pair
        // starting inside the opener is never formed.
        assert_eq!(parse_inlines("***x*"), vec![text("***x*")]);
    }

    #[test]
    fn unterminated_italic_then_valid_code() {
        assert_eq!(
            parse_inlines("_open `c`"),
            vec![text("_open "), Inline::CodeInline { content: "c".into() }]
        );
    }

    #[test]
    fn link_with_formatted_text() {
        assert_eq!(
            parse_inlines("see [the *docs*](https://example.com)!"),
            vec![
                text("see "),
                Inline::Link {
                    text: vec![
                        text("the "),
                        Inline::Italic {
                            children: vec![text("docs")]
                        },
                    ],
                    url: "https://example.com".into(),
                },
                text("!"),
            ]
        );
    }

    #[test]
    fn bracket_without_paren_is_literal() {
        assert_eq!(parse_inlines("[x] done"), vec![text("[x] done")]);
        assert_eq!(parse_inlines("[x](no close"), vec![text("[x](no close")]);
        assert_eq!(parse_inlines("trailing ["), vec![text("trailing [")]);
    }

    #[test]
    fn code_is_not_parsed_further() {
        assert_eq!(
            parse_inlines("`**raw**`"),
            vec![Inline::CodeInline {
                content: "**raw**".into()
            }]
        );
    }

    #[test]
    fn unterminated_code_is_literal() {
        assert_eq!(parse_inlines("a ` b"), vec![text("a ` b")]);
    }

    #[test]
    fn image_with_title() {
        assert_eq!(
            parse_inlines("![alt](src \"title\")"),
            vec![Inline::Image {
                alt: "alt".into(),
                src: "src".into(),
                title: "title".into(),
            }]
        );
    }

    #[test]
    fn image_without_title() {
        assert_eq!(
            parse_inlines("![logo](img/logo.png)"),
            vec![Inline::Image {
                alt: "logo".into(),
                src: "img/logo.png".into(),
                title: String::new(),
            }]
        );
    }

    #[test]
    fn image_unquoted_title_kept_verbatim() {
        assert_eq!(
            parse_inlines("![a](b   plain title)"),
            vec![Inline::Image {
                alt: "a".into(),
                src: "b".into(),
                title: "plain title".into(),
            }]
        );
    }

    #[test]
    fn bang_without_image_is_literal() {
        assert_eq!(parse_inlines("Hi! there"), vec![text("Hi! there")]);
        assert_eq!(parse_inlines("end!"), vec![text("end!")]);
    }

    #[test]
    fn broken_image_falls_back_to_link() {
        assert_eq!(
            parse_inlines("![x] [y](z)"),
            vec![
                text("![x] "),
                Inline::Link {
                    text: vec![text("y")],
                    url: "z".into(),
                },
            ]
        );
    }

    #[test]
    fn multibyte_text_around_markers() {
        assert_eq!(
            parse_inlines("héllo *wörld* ✓"),
            vec![
                text("héllo "),
                Inline::Italic {
                    children: vec![text("wörld")]
                },
                text(" ✓"),
            ]
        );
    }

    #[test]
    fn split_source_title_cases() {
        assert_eq!(split_source_title("a.png"), ("a.png", ""));
        assert_eq!(split_source_title("a.png \"t\""), ("a.png", "t"));
        assert_eq!(split_source_title("a.png \""), ("a.png", "\""));
        assert_eq!(split_source_title("a.png\t \"two words\""), ("a.png", "two words"));
    }
}
