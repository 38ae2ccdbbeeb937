//! `dom-treeviz` — parse a file (or stdin) and print its document tree.
//!
//! Mirrors the teacher's own tree-visualization binary: a small `clap`
//! front end over the library, colorized when writing to a terminal,
//! degrading to plain text or JSON otherwise.

use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use clap::Parser as ClapParser;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use htmlcore::dom::{Document, NodeKind};
use htmlcore::{parse, ParserOptions};

#[derive(ClapParser, Debug)]
#[command(name = "dom-treeviz", about = "Parse HTML and print its document tree")]
struct Cli {
    /// Path to the HTML file to parse. Reads stdin when omitted.
    path: Option<String>,

    /// Record an error for closing tags with no matching open element.
    #[arg(long)]
    check_syntax: bool,

    /// Build the `id` attribute index.
    #[arg(long)]
    use_id_attribute: bool,

    /// Keep whitespace-only text nodes in the tree.
    #[arg(long)]
    preserve_whitespace: bool,

    /// Print the tree as JSON instead of an indented listing.
    #[arg(long)]
    json: bool,

    /// Disable colorized output even when writing to a terminal.
    #[arg(long)]
    no_color: bool,
}

fn read_input(path: &Option<String>) -> io::Result<String> {
    match path {
        Some(p) => fs::read_to_string(p),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn color_choice(no_color: bool) -> ColorChoice {
    if no_color || !atty::is(atty::Stream::Stdout) {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    }
}

fn print_tree(stream: &mut StandardStream, doc: &Document, node: ego_tree::NodeId, depth: usize) -> io::Result<()> {
    let data = doc.get(node);
    let indent = "  ".repeat(depth);

    match data.kind {
        NodeKind::Document => {}
        NodeKind::Element => {
            stream.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
            write!(stream, "{}<{}", indent, data.name_lower.as_deref().unwrap_or("?"))?;
            stream.reset()?;
            for attr in &data.attributes {
                write!(stream, " {}", attr.name_lower)?;
                if let Some(v) = &attr.value {
                    write!(stream, "=\"{}\"", v)?;
                }
            }
            writeln!(stream, "> [{}..{}]", data.outer_start, data.outer_start + data.outer_length)?;
        }
        NodeKind::Text => {
            stream.set_color(ColorSpec::new().set_fg(Some(Color::White)))?;
            writeln!(stream, "{}\"{}\"", indent, doc.outer_text(node).trim())?;
            stream.reset()?;
        }
        NodeKind::Comment => {
            stream.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
            writeln!(stream, "{}<!-- {} -->", indent, doc.outer_text(node).trim())?;
            stream.reset()?;
        }
    }

    let children: Vec<_> = doc.children(node).collect();
    for child in children {
        print_tree(stream, doc, child, depth + 1)?;
    }
    Ok(())
}

fn node_to_json(doc: &Document, node: ego_tree::NodeId) -> serde_json::Value {
    let data = doc.get(node);
    let children: Vec<_> = doc
        .children(node)
        .map(|c| node_to_json(doc, c))
        .collect();

    match data.kind {
        NodeKind::Document => serde_json::json!({ "kind": "document", "children": children }),
        NodeKind::Element => serde_json::json!({
            "kind": "element",
            "name": data.name_lower,
            "attributes": data.attributes.iter().map(|a| serde_json::json!({
                "name": a.name_original,
                "value": a.value,
            })).collect::<Vec<_>>(),
            "outer_start": data.outer_start,
            "outer_length": data.outer_length,
            "children": children,
        }),
        NodeKind::Text => serde_json::json!({
            "kind": "text",
            "text": doc.outer_text(node),
        }),
        NodeKind::Comment => serde_json::json!({
            "kind": "comment",
            "text": doc.outer_text(node),
        }),
    }
}

fn run() -> io::Result<ExitCode> {
    let cli = Cli::parse();
    let input = read_input(&cli.path)?;

    let options = ParserOptions {
        check_syntax: cli.check_syntax,
        use_id_attribute: cli.use_id_attribute,
        preserve_whitespace: cli.preserve_whitespace,
        ..ParserOptions::default()
    };

    let doc = match parse(Some(&input), options) {
        Ok(doc) => doc,
        Err(err) => {
            eprintln!("dom-treeviz: {}", err);
            return Ok(ExitCode::FAILURE);
        }
    };

    if cli.json {
        let value = node_to_json(&doc, doc.root());
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        let mut stream = StandardStream::stdout(color_choice(cli.no_color));
        print_tree(&mut stream, &doc, doc.root(), 0)?;
    }

    if !doc.parse_errors.is_empty() {
        eprintln!("\n{} issue(s) recorded during parsing:", doc.parse_errors.len());
        for err in &doc.parse_errors {
            eprintln!("  {}", err);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("dom-treeviz: {}", err);
            ExitCode::FAILURE
        }
    }
}
