//! `dyntree` CLI: query, edit, convert and inspect JSON/INI documents.
//!
//! ## Usage
//!
//! ```sh
//! # Exact lookup, printed as JSON
//! echo '{"a":[10,20,{"b":"x"}]}' | dyntree get a/2
//!
//! # Wildcard search, one `path = value` line per matching leaf
//! dyntree pick '*/port' -i services.json
//!
//! # Same, one JSON record per line
//! dyntree pick '*/port' -i services.json --json
//!
//! # Assign through a path (value parsed as JSON, else taken as a string)
//! dyntree set server/port 9090 -i app.ini -o app.ini
//!
//! # Convert between formats
//! dyntree convert --to xml -i app.ini
//!
//! # Debug listing of the node tree
//! dyntree dump -i data.json
//! ```

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use dyntree_core::dump::{dump, dump_picks};
use dyntree_core::path::{self, Path, PathConfig, Picker};
use dyntree_core::{ini, json, xml, Kind, NodeId, Tree};
use log::debug;
use serde::Serialize;
use std::io::{self, Read, Write};

#[derive(Parser)]
#[command(
    name = "dyntree",
    version,
    about = "Query, edit and convert JSON/INI documents with path expressions"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Input file (reads from stdin if omitted)
    #[arg(short, long, global = true)]
    input: Option<String>,

    /// Input format (guessed from the input file extension if omitted)
    #[arg(short, long, value_enum, global = true)]
    format: Option<InputFormat>,

    /// Path separator
    #[arg(short, long, global = true, default_value_t = '/')]
    separator: char,

    /// Log more (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the node at an exact path as JSON
    Get {
        /// Path to resolve, e.g. `servers/0/host`
        path: String,
    },
    /// List every leaf matched by a wildcard pattern
    Pick {
        /// Pattern, e.g. `servers/*/host`
        pattern: String,
        /// Print one JSON record per match instead of `path = value`
        #[arg(long)]
        json: bool,
    },
    /// Assign a value through a path and print the updated document
    Set {
        /// Path to assign; missing fields are created
        path: String,
        /// New value, parsed as JSON or taken as a plain string
        value: String,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Convert the document to another format
    Convert {
        /// Target format
        #[arg(long, value_enum)]
        to: OutputFormat,
        /// Indent JSON output
        #[arg(long)]
        pretty: bool,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Print a debug listing of every node
    Dump,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    Json,
    Ini,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Ini,
    Xml,
}

/// One `pick --json` output line.
#[derive(Serialize)]
struct PickRecord {
    path: String,
    kind: Kind,
    value: serde_json::Value,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = PathConfig::new(cli.separator).context("Invalid --separator")?;
    let format = cli
        .format
        .unwrap_or_else(|| guess_format(cli.input.as_deref()));
    let text = read_input(cli.input.as_deref())?;

    let mut tree = Tree::new();
    let root = load(&mut tree, &text, format)?;
    debug!("loaded {} nodes as {format:?}", tree.node_count());

    match cli.command {
        Commands::Get { path: text } => {
            let target = Path::parse(&text, &config);
            let Some(node) = path::resolve(&tree, root, &target) else {
                bail!("No node at path '{}'", text);
            };
            let out = json::to_json_pretty(&tree, node).context("Failed to serialize node")?;
            println!("{}", out);
        }
        Commands::Pick { pattern, json: records } => {
            let pattern = Path::parse(&pattern, &config);
            let matches = if records {
                print_pick_records(&tree, root, &pattern)?
            } else {
                let stdout = io::stdout();
                let mut lock = stdout.lock();
                dump_picks(&tree, root, &pattern, &mut lock).context("Failed to write matches")?
            };
            if matches == 0 {
                bail!("No leaf matches '{}'", pattern);
            }
        }
        Commands::Set {
            path: text,
            value,
            output,
        } => {
            let target = Path::parse(&text, &config);
            assign(&mut tree, root, &target, &value)
                .with_context(|| format!("Failed to set '{}'", text))?;
            let out = render(&tree, root, format)?;
            write_output(output.as_deref(), &out)?;
        }
        Commands::Convert { to, pretty, output } => {
            let out = match to {
                OutputFormat::Json if pretty => {
                    with_newline(json::to_json_pretty(&tree, root).context("Failed to write JSON")?)
                }
                OutputFormat::Json => {
                    with_newline(json::to_json(&tree, root).context("Failed to write JSON")?)
                }
                OutputFormat::Ini => ini::to_ini(&tree, root),
                OutputFormat::Xml => xml::to_xml(&tree, root),
            };
            write_output(output.as_deref(), &out)?;
        }
        Commands::Dump => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            dump(&tree, root, &mut lock).context("Failed to write dump")?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

/// `.ini` files are read as INI, everything else (and stdin) as JSON.
fn guess_format(input: Option<&str>) -> InputFormat {
    match input.and_then(|p| std::path::Path::new(p).extension()) {
        Some(ext) if ext.eq_ignore_ascii_case("ini") => InputFormat::Ini,
        _ => InputFormat::Json,
    }
}

fn load(tree: &mut Tree, text: &str, format: InputFormat) -> Result<NodeId> {
    match format {
        InputFormat::Json => json::from_json(tree, text).context("Failed to parse JSON input"),
        InputFormat::Ini => ini::from_ini(tree, text).context("Failed to parse INI input"),
    }
}

/// Serialize the document back in the format it was read in.
fn render(tree: &Tree, root: NodeId, format: InputFormat) -> Result<String> {
    match format {
        InputFormat::Json => Ok(with_newline(
            json::to_json_pretty(tree, root).context("Failed to write JSON")?,
        )),
        InputFormat::Ini => Ok(ini::to_ini(tree, root)),
    }
}

/// Assign `raw` at `target`. Scalars go through the path setter; JSON
/// arrays and objects replace whatever the path held, members included.
fn assign(tree: &mut Tree, root: NodeId, target: &Path, raw: &str) -> Result<()> {
    let value = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(parsed) => json::from_value(tree, &parsed)?,
        Err(_) => tree.create_string(raw),
    };
    if !tree.is_container(value) {
        path::set_path(tree, root, target, value).inspect_err(|_| tree.free(value))?;
        return Ok(());
    }

    let result = graft(tree, root, target, value);
    tree.free(value);
    result
}

/// Point `target` at a fresh container of `value`'s kind and move
/// `value`'s members into it. `value` is left empty for the caller to free.
fn graft(tree: &mut Tree, root: NodeId, target: &Path, value: NodeId) -> Result<()> {
    let shell = tree.create_from(value);
    let node = path::set_path(tree, root, target, shell).inspect_err(|_| tree.free(shell))?;
    // A container of the same kind keeps its old members through set_path.
    match tree.kind(value) {
        Kind::Array => tree.set_array(node)?,
        _ => tree.set_object(node)?,
    };
    for child in tree.children(value).to_vec() {
        let name = tree.name(child).map(str::to_owned);
        tree.detach(child)?;
        match name {
            Some(name) => {
                let placed = tree.set_field(node, &name, Some(child))?;
                if placed != child {
                    debug!("duplicate member '{name}' dropped");
                    tree.free(child);
                }
            }
            None => {
                tree.append(node, Some(child))?;
            }
        }
    }
    Ok(())
}

fn print_pick_records(tree: &Tree, root: NodeId, pattern: &Path) -> Result<usize> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    let mut count = 0;
    for node in Picker::new(tree, root, pattern.clone()) {
        let record = PickRecord {
            path: path::path_name(tree, node, pattern.config()),
            kind: tree.kind(node),
            value: json::to_value(tree, node),
        };
        let line = serde_json::to_string(&record).context("Failed to encode match")?;
        writeln!(lock, "{}", line).context("Failed to write match")?;
        count += 1;
    }
    Ok(count)
}

fn with_newline(mut text: String) -> String {
    text.push('\n');
    text
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
