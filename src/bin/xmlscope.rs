//! Command-line front end: parse XML files, optionally tidy namespaces or
//! prune empty elements, then print the result or the elements a selector
//! finds.

use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use xmlscope::parser::{parse_bytes_with_options, ParseOptions};
use xmlscope::query::Selector;
use xmlscope::serial::marshal;
use xmlscope::{Element, RECURSION_LIMIT};

/// xmlscope -- parse XML files and query them by namespace-resolved name.
#[derive(Parser, Debug)]
#[command(name = "xmlscope", version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// XML files to process (use `-` for stdin).
    #[arg(required = true)]
    files: Vec<String>,

    // -- Parsing options ---------------------------------------------------
    /// Keep character data between elements as text nodes.
    #[arg(long)]
    char_data: bool,

    /// Keep comments.
    #[arg(long)]
    comments: bool,

    /// Keep processing instructions.
    #[arg(long)]
    proc_inst: bool,

    /// Keep directives found inside the root element.
    #[arg(long)]
    directives: bool,

    /// Maximum element nesting depth.
    #[arg(long, value_name = "N", default_value_t = RECURSION_LIMIT)]
    max_depth: usize,

    // -- Tree rewriting ----------------------------------------------------
    /// Promote the dominant namespace of the root to the default namespace.
    #[arg(long)]
    simplify_ns: bool,

    /// Remove elements with no content, children or attributes.
    #[arg(long)]
    remove_empty: bool,

    // -- Query -------------------------------------------------------------
    /// Print every element with this local name instead of the whole tree.
    #[arg(long, value_name = "NAME")]
    find: Option<String>,

    /// Only match `--find` elements in this namespace.
    #[arg(long, value_name = "URI", requires = "find")]
    space: Option<String>,

    // -- Output options ----------------------------------------------------
    /// Do not print anything on success.
    #[arg(long)]
    noout: bool,

    /// Print timing information for parsing.
    #[arg(long)]
    timing: bool,
}

const EXIT_SUCCESS: u8 = 0;
const EXIT_PARSE_ERROR: u8 = 1;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut worst_exit: u8 = EXIT_SUCCESS;

    for file in &cli.files {
        let exit = process_file(&cli, file);
        if exit > worst_exit {
            worst_exit = exit;
        }
    }

    ExitCode::from(worst_exit)
}

/// Processes a single input file and returns an exit code.
fn process_file(cli: &Cli, filename: &str) -> u8 {
    let input = match read_input(filename) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("{filename}: failed to read: {e}");
            return EXIT_PARSE_ERROR;
        }
    };

    let start_parse = Instant::now();
    let mut root = match parse_bytes_with_options(&input, &parse_options(cli)) {
        Ok(root) => root,
        Err(e) => {
            eprintln!("{filename}: {e}");
            return EXIT_PARSE_ERROR;
        }
    };
    if cli.timing {
        let elapsed = start_parse.elapsed();
        eprintln!("Parsing {filename} took {elapsed:?}");
    }

    if cli.simplify_ns {
        let outcome = root.simplify_ns();
        if cli.timing {
            eprintln!("{filename}: simplify-ns: {outcome:?}");
        }
    }
    if cli.remove_empty {
        root.remove_empty();
    }

    if !cli.noout {
        write_output(&render(cli, &root));
    }
    EXIT_SUCCESS
}

fn parse_options(cli: &Cli) -> ParseOptions {
    ParseOptions::default()
        .char_data(cli.char_data)
        .comments(cli.comments)
        .proc_inst(cli.proc_inst)
        .directives(cli.directives)
        .max_depth(cli.max_depth)
}

/// The whole tree, or one line per element matched by `--find`.
fn render(cli: &Cli, root: &Element) -> String {
    let Some(label) = &cli.find else {
        let mut out = marshal(root);
        out.push('\n');
        return out;
    };
    let mut selector = Selector::new(label.as_str());
    if let Some(space) = &cli.space {
        selector = selector.space(space.as_str());
    }
    let mut out = String::new();
    if selector.matches(root) {
        out.push_str(&marshal(root));
        out.push('\n');
    }
    for el in root.find(&selector) {
        out.push_str(&marshal(el));
        out.push('\n');
    }
    out
}

/// Reads input from a file or stdin (when filename is `-`).
fn read_input(filename: &str) -> io::Result<Vec<u8>> {
    if filename == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        fs::read(filename)
    }
}

fn write_output(content: &str) {
    print!("{content}");
    let _ = io::stdout().flush();
}
