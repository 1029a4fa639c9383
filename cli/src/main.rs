mod initrd;

use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use clap::{ArgAction, Parser};
use serde::Serialize;
use skc::{KeyCharset, NodeId, ParseOptions, Tree};

#[derive(Parser, Debug)]
#[command(name = "skc", version, about = "Structured kernel commandline inspector")]
struct Args {
    /// SKC file, or an initrd image with --initrd. Omit or use '-' to read from stdin.
    input: Option<String>,

    /// Print the value of KEY.
    #[arg(short, long, value_name = "KEY", conflicts_with = "prefix")]
    query: Option<String>,

    /// Print every key-value under PREFIX ("" for all).
    #[arg(short, long, value_name = "PREFIX")]
    prefix: Option<String>,

    /// Print the tree as nested blocks (default).
    #[arg(short, long, group = "mode")]
    tree: bool,

    /// Print one fully-qualified `key = "value";` line per leaf.
    #[arg(short, long, group = "mode")]
    list: bool,

    /// Print the raw node table.
    #[arg(short, long, group = "mode")]
    dump: bool,

    /// Print the tree as JSON.
    #[arg(long, group = "mode")]
    json: bool,

    /// Treat the input as an initrd image with an embedded document.
    #[arg(long)]
    initrd: bool,

    /// Embed the document from FILE into the initrd image, replacing any existing one.
    #[arg(long, value_name = "FILE", requires = "initrd", conflicts_with = "delete")]
    append: Option<String>,

    /// Remove the embedded document from the initrd image.
    #[arg(long, requires = "initrd")]
    delete: bool,

    /// Reject '-' in key words.
    #[arg(long)]
    legacy_keys: bool,

    /// Treat '#' as ordinary text.
    #[arg(long = "no-comments", action = ArgAction::SetFalse, default_value_t = true)]
    comments: bool,

    /// Maximum number of tree nodes.
    #[arg(long, value_name = "number")]
    max_nodes: Option<usize>,
}

impl Args {
    fn parse_options(&self) -> ParseOptions {
        let mut options = ParseOptions::new().with_comments(self.comments);
        if self.legacy_keys {
            options = options.with_key_charset(KeyCharset::Legacy);
        }
        if let Some(max_nodes) = self.max_nodes {
            options = options.with_max_nodes(max_nodes);
        }
        options
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("ERROR  {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let options = args.parse_options();

    if args.initrd {
        let path = match args.input.as_deref() {
            Some(path) if path != "-" => Path::new(path),
            _ => return Err("--initrd needs an image path".into()),
        };
        if let Some(source) = args.append.as_deref() {
            let text = fs::read_to_string(source)?;
            initrd::append(path, &text, &options)?;
            return Ok(());
        }
        if args.delete {
            if !initrd::delete(path)? {
                tracing::info!(path = %path.display(), "no skc document to delete");
            }
            return Ok(());
        }
    }

    let text = read_input(&args)?;
    let tree = skc::parse_owned(text, &options)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Some(key) = args.query.as_deref() {
        return print_query(&tree, key, &mut out);
    }
    if let Some(prefix) = args.prefix.as_deref() {
        return print_prefix(&tree, prefix, &mut out);
    }

    if args.list {
        out.write_all(skc::show_kvlist(&tree).as_bytes())?;
    } else if args.dump {
        out.write_all(skc::dump(&tree).as_bytes())?;
    } else if args.json {
        write_json(&mut out, &tree)?;
    } else {
        out.write_all(skc::show_tree(&tree).as_bytes())?;
    }
    Ok(())
}

fn read_input(args: &Args) -> Result<String, Box<dyn Error>> {
    if args.initrd {
        let path = args.input.as_deref().unwrap_or_default();
        let image = fs::read(path)?;
        return match initrd::read(&image)? {
            Some(text) => Ok(text.to_string()),
            None => Err(format!("no skc document found in {path}").into()),
        };
    }
    match args.input.as_deref() {
        None | Some("-") => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(fs::read_to_string(path)?),
    }
}

fn print_query(tree: &Tree, key: &str, out: &mut dyn Write) -> Result<(), Box<dyn Error>> {
    let Some(node) = tree.find_node(None, key).filter(|&node| tree.is_leaf(node)) else {
        return Err(format!("No value for \"{key}\" key").into());
    };
    write_entry(tree, key, node, out)
}

fn print_prefix(tree: &Tree, prefix: &str, out: &mut dyn Write) -> Result<(), Box<dyn Error>> {
    let scope = if prefix.is_empty() {
        None
    } else {
        match tree.find_node(None, prefix) {
            Some(node) => Some(node),
            None => return Err(format!("No key-value has {prefix} prefix").into()),
        }
    };
    for (leaf, _) in tree.key_values(scope) {
        let key = tree.compose_key(leaf)?;
        write_entry(tree, &key, leaf, out)?;
    }
    Ok(())
}

/// `key = "v1", "v2"`, or `key = ""` for a key without value.
fn write_entry(tree: &Tree, key: &str, leaf: NodeId, out: &mut dyn Write) -> Result<(), Box<dyn Error>> {
    let mut line = format!("{key} = ");
    match tree.child(leaf) {
        Some(first) => skc::render::write_values(tree, first, &mut line)?,
        None => line.push_str("\"\""),
    }
    line.push('\n');
    out.write_all(line.as_bytes())?;
    Ok(())
}

fn write_json(writer: &mut dyn Write, tree: &Tree) -> Result<(), Box<dyn Error>> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"  ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut *writer, formatter);
    tree.serialize(&mut serializer)?;
    writer.write_all(b"\n")?;
    Ok(())
}
