//! Arbor CLI
//!
//! Parse an HTML document and run id, tag, class and selector lookups
//! against it from the shell.

use std::fmt;

use anyhow::Context;
use arbor_document::{Document, DocumentConfig, Source};
use arbor_dom::{DomTree, NodeId, NodeSummary, QueryCache};
use arbor_html::print_tree;
use clap::Parser;
use owo_colors::OwoColorize;
use serde::Serialize;

/// Longest text excerpt printed next to a match.
const EXCERPT_CHARS: usize = 48;

/// Arbor: query HTML documents with ids, tags, classes and CSS selectors
#[derive(Parser, Debug)]
#[command(name = "arbor")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the DOM tree of a file
    arbor ./index.html

    # Run a selector against a page
    arbor --select 'ul > li[name]' https://example.com

    # Several lookups at once, as JSON
    arbor --id tree --class list --json ./index.html

    # Parse inline HTML
    arbor --html '<ul id="x"><li>a</li></ul>' --tag li
"#)]
struct Cli {
    /// Path to an HTML file, or an http(s) URL
    #[arg(value_name = "FILE|URL")]
    path: Option<String>,

    /// Parse HTML string directly instead of file/URL
    #[arg(long, value_name = "HTML", conflicts_with_all = ["path", "url"])]
    html: Option<String>,

    /// Fetch the document from a URL
    #[arg(long, value_name = "URL", conflicts_with = "path")]
    url: Option<String>,

    /// querySelectorAll with this selector
    #[arg(short, long, value_name = "SELECTOR")]
    select: Option<String>,

    /// getElementById with this id
    #[arg(long, value_name = "ID")]
    id: Option<String>,

    /// getElementsByTagName with this tag name
    #[arg(short, long, value_name = "NAME")]
    tag: Option<String>,

    /// getElementsByClassName with this class name
    #[arg(short, long, value_name = "NAME")]
    class: Option<String>,

    /// Print the DOM tree (the default when no lookup is given)
    #[arg(long)]
    tree: bool,

    /// Print matches as JSON
    #[arg(long)]
    json: bool,

    /// Query results kept in the cache (0 disables caching)
    #[arg(long, value_name = "N", default_value_t = QueryCache::DEFAULT_CAPACITY)]
    cache_size: usize,
}

/// One lookup requested on the command line.
#[derive(Debug, Clone)]
enum Query {
    Select(String),
    Id(String),
    Tag(String),
    Class(String),
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select(selector) => write!(f, "querySelectorAll({selector:?})"),
            Self::Id(id) => write!(f, "getElementById({id:?})"),
            Self::Tag(name) => write!(f, "getElementsByTagName({name:?})"),
            Self::Class(name) => write!(f, "getElementsByClassName({name:?})"),
        }
    }
}

impl Query {
    fn run(&self, document: &Document) -> anyhow::Result<Vec<NodeId>> {
        Ok(match self {
            Self::Select(selector) => document
                .query_selector_all(selector)
                .with_context(|| format!("invalid selector {selector:?}"))?,
            Self::Id(id) => document.get_element_by_id(id).into_iter().collect(),
            Self::Tag(name) => document.get_elements_by_tag_name(name),
            Self::Class(name) => document.get_elements_by_class_name(name),
        })
    }
}

/// JSON form of one lookup and its matches.
#[derive(Serialize)]
struct QueryReport {
    query: String,
    matches: Vec<NodeSummary>,
}

impl Cli {
    fn queries(&self) -> Vec<Query> {
        let mut queries = Vec::new();
        if let Some(ref selector) = self.select {
            queries.push(Query::Select(selector.clone()));
        }
        if let Some(ref id) = self.id {
            queries.push(Query::Id(id.clone()));
        }
        if let Some(ref name) = self.tag {
            queries.push(Query::Tag(name.clone()));
        }
        if let Some(ref name) = self.class {
            queries.push(Query::Class(name.clone()));
        }
        queries
    }

    fn source(&self) -> anyhow::Result<Source> {
        if let Some(ref html) = self.html {
            Ok(Source::Raw(html.clone()))
        } else if let Some(ref url) = self.url {
            Ok(Source::Url(url.clone()))
        } else if let Some(ref path) = self.path {
            Ok(Source::from_location(path))
        } else {
            anyhow::bail!("a file path, --url or --html is required")
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let source = cli.source()?;
    let label = source.to_string();
    let config = DocumentConfig {
        cache_capacity: cli.cache_size,
    };
    let document = Document::load_with_config(source, config)
        .with_context(|| format!("failed to load {label}"))?;

    let queries = cli.queries();

    if cli.json {
        let reports = queries
            .iter()
            .map(|query| {
                let matches = query.run(&document)?;
                Ok(QueryReport {
                    query: query.to_string(),
                    matches: matches
                        .into_iter()
                        .map(|id| document.tree().summarize(id))
                        .collect(),
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    if cli.tree || queries.is_empty() {
        println!("=== DOM Tree ===");
        print_tree(document.tree(), document.root(), 0);
    }

    for query in &queries {
        let matches = query.run(&document)?;
        println!("\n=== {query}: {} ===", matches.len());
        for id in matches {
            println!("  {}", describe(document.tree(), id));
        }
    }

    Ok(())
}

/// One-line description of a node: `<tag#id.class> text...`
fn describe(tree: &DomTree, id: NodeId) -> String {
    let summary = tree.summarize(id);

    let mut label = format!("<{}", summary.tag).cyan().to_string();
    if let Some(ref element_id) = summary.id {
        label.push_str(&format!("#{element_id}").yellow().to_string());
    }
    for class in &summary.classes {
        label.push_str(&format!(".{class}").green().to_string());
    }
    label.push_str(&">".cyan().to_string());

    let text = summary.text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        return label;
    }
    let mut excerpt: String = text.chars().take(EXCERPT_CHARS).collect();
    if excerpt.len() < text.len() {
        excerpt.push_str("...");
    }
    format!("{label} {}", excerpt.dimmed())
}
