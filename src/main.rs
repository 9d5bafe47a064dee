use boardio::board::Board;
use boardio::options::{ConversionOptions, DiagramStyle};
use boardio::viewer_url;
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing::debug;
use tracing::level_filters::LevelFilter;

/// Convert a board JSON file to a draw.io diagram.
#[derive(Debug, Parser)]
#[command(name = "boardio", version, about)]
struct Args {
    /// Board JSON file
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Conversion options JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Visual mode: erd or uml
    #[arg(long, value_parser = parse_style)]
    style: Option<DiagramStyle>,

    /// Diagram title
    #[arg(long)]
    title: Option<String>,

    /// Print a viewer.diagrams.net link instead of the markup
    #[arg(long)]
    viewer_url: bool,

    /// More logging on stderr (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

fn parse_style(s: &str) -> Result<DiagramStyle, String> {
    DiagramStyle::from_str(s).ok_or_else(|| format!("invalid style '{}', expected erd or uml", s))
}

fn main() {
    let args = Args::parse();

    let level = match (args.quiet, args.verbose) {
        (true, _) => LevelFilter::ERROR,
        (false, 0) => LevelFilter::WARN,
        (false, 1) => LevelFilter::INFO,
        (false, 2) => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    debug!(?args, "parsed arguments");

    let input = read(&args.input);
    let board = Board::from_json(&input).unwrap_or_else(|e| {
        eprintln!("{}: {}", args.input.display(), e);
        process::exit(1);
    });

    let mut options = match &args.config {
        Some(path) => ConversionOptions::from_json(&read(path)).unwrap_or_else(|e| {
            eprintln!("{}: {}", path.display(), e);
            process::exit(1);
        }),
        None => ConversionOptions::default(),
    };
    if let Some(style) = args.style {
        options.diagram_style = style;
    }
    if let Some(title) = args.title {
        options.title = title;
    }

    let xml = boardio::transform(&board, &options);
    let out = if args.viewer_url {
        viewer_url(&xml) + "\n"
    } else {
        xml
    };

    match args.output {
        Some(path) => {
            if let Err(e) = fs::write(&path, &out) {
                eprintln!("Failed to write {}: {}", path.display(), e);
                process::exit(1);
            }
        }
        None => print!("{}", out),
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Failed to read {}: {}", path.display(), e);
        process::exit(1);
    })
}
