//! madopa - convert a Markdown file to a styled HTML page
//!
//! Usage:
//!   madopa --input <FILE> [--output <FILE>] [OPTIONS]
//!
//! Without `--config`, the page wrapper, escaping and highlight.js are all
//! on; the `--no-*` flags switch them off. A `--config` file replaces
//! those defaults wholesale, and flags still apply on top of it.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser as ClapParser;
use log::{debug, info, LevelFilter};
use madopa_core::{Block, Document, HtmlRenderer, Parser, RenderOptions, Renderer};

#[derive(ClapParser, Debug)]
#[command(name = "madopa")]
#[command(version, about = "Convert Markdown files to HTML")]
struct Cli {
    /// Input Markdown file
    #[arg(short, long)]
    input: PathBuf,

    /// Output file (defaults to the input name with an .html extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML file with render options
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stylesheet to inline instead of the built-in one
    #[arg(long, conflicts_with = "no_css")]
    css: Option<PathBuf>,

    /// Emit bare HTML fragments without the page wrapper
    #[arg(long)]
    no_css: bool,

    /// Copy text and code into the output unescaped
    #[arg(long)]
    no_escape: bool,

    /// Leave out highlight.js
    #[arg(long)]
    no_highlight: bool,

    /// Write the parsed tree as JSON instead of HTML
    #[arg(long)]
    json: bool,

    /// Log progress at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

/// `RUST_LOG` wins over the `--verbose` default.
fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: &Cli) -> Result<(), String> {
    let markdown = fs::read_to_string(&cli.input)
        .map_err(|e| format!("failed to read '{}': {}", cli.input.display(), e))?;

    let doc = Parser::new()
        .parse(&markdown)
        .map_err(|e| format!("{}: {}", cli.input.display(), e))?;
    print_summary(&doc);

    let (output, contents) = if cli.json {
        let json = serde_json::to_string_pretty(&doc)
            .map_err(|e| format!("failed to serialize document: {}", e))?;
        let path = cli
            .output
            .clone()
            .unwrap_or_else(|| cli.input.with_extension("json"));
        (path, json)
    } else {
        let options = render_options(cli)?;
        debug!("render options: {:?}", options);
        let html = HtmlRenderer::new(options)
            .render(&doc)
            .map_err(|e| e.to_string())?;
        let path = cli
            .output
            .clone()
            .unwrap_or_else(|| cli.input.with_extension("html"));
        (path, html)
    };

    fs::write(&output, contents)
        .map_err(|e| format!("failed to write '{}': {}", output.display(), e))?;

    println!("Created {}", output.display());
    Ok(())
}

/// Base options from `--config` (or the CLI defaults), then flags.
fn render_options(cli: &Cli) -> Result<RenderOptions, String> {
    let mut options = match &cli.config {
        Some(path) => load_config(path)?,
        None => RenderOptions::default()
            .with_escape_html(true)
            .with_css(true)
            .with_syntax_highlight(true),
    };

    if let Some(css) = &cli.css {
        options = options.with_css(true).with_css_file(css);
    }
    if cli.no_css {
        options = options.with_css(false);
    }
    if cli.no_escape {
        options = options.with_escape_html(false);
    }
    if cli.no_highlight {
        options = options.with_syntax_highlight(false);
    }

    Ok(options)
}

fn load_config(path: &Path) -> Result<RenderOptions, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config '{}': {}", path.display(), e))?;
    let options = toml::from_str(&content)
        .map_err(|e| format!("failed to parse config '{}': {}", path.display(), e))?;
    info!("loaded render options from {}", path.display());
    Ok(options)
}

fn print_summary(doc: &Document) {
    let mut headings = 0;
    let mut paragraphs = 0;
    let mut code_blocks = 0;
    let mut lists = 0;
    let mut tables = 0;
    let mut quotes = 0;

    for block in &doc.blocks {
        match block {
            Block::Heading(_) => headings += 1,
            Block::Paragraph(_) => paragraphs += 1,
            Block::CodeBlock(_) => code_blocks += 1,
            Block::List(_) => lists += 1,
            Block::Table(_) => tables += 1,
            Block::Blockquote(_) => quotes += 1,
        }
    }

    info!(
        "{} blocks: {} headings, {} paragraphs, {} code blocks, {} lists, {} tables, {} quotes",
        doc.len(),
        headings,
        paragraphs,
        code_blocks,
        lists,
        tables,
        quotes
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("madopa").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_enable_everything() {
        let options = render_options(&cli(&["--input", "post.md"])).unwrap();
        assert!(options.escape_html);
        assert!(options.include_css);
        assert!(options.include_syntax_highlight);
        assert_eq!(options.css_file_path, None);
    }

    #[test]
    fn test_flags_switch_features_off() {
        let options = render_options(&cli(&[
            "--input",
            "post.md",
            "--no-css",
            "--no-escape",
            "--no-highlight",
        ]))
        .unwrap();
        assert_eq!(options, RenderOptions::default());
    }

    #[test]
    fn test_css_flag_sets_stylesheet() {
        let options = render_options(&cli(&["-i", "post.md", "--css", "site.css"])).unwrap();
        assert!(options.include_css);
        assert_eq!(options.css_file_path, Some(PathBuf::from("site.css")));
    }

    #[test]
    fn test_css_conflicts_with_no_css() {
        let result = Cli::try_parse_from(["madopa", "-i", "a.md", "--css", "a.css", "--no-css"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_input_is_required() {
        assert!(Cli::try_parse_from(["madopa"]).is_err());
    }

    #[test]
    fn test_config_file_replaces_defaults() {
        let path = std::env::temp_dir().join(format!("madopa-config-{}.toml", process::id()));
        fs::write(&path, "escape_html = true\ncss_file_path = \"theme.css\"\n").unwrap();

        let arg = path.to_string_lossy().into_owned();
        let options = render_options(&cli(&["-i", "a.md", "--config", &arg])).unwrap();
        fs::remove_file(&path).unwrap();

        assert!(options.escape_html);
        assert!(!options.include_css);
        assert!(!options.include_syntax_highlight);
        assert_eq!(options.css_file_path, Some(PathBuf::from("theme.css")));
    }

    #[test]
    fn test_missing_config_is_an_error() {
        let result = render_options(&cli(&["-i", "a.md", "-c", "/nonexistent/madopa.toml"]));
        assert!(result.unwrap_err().contains("failed to read config"));
    }
}
