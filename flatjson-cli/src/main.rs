//! flatjson CLI - build and query flat JSON indexes
//!
//! This binary provides command-line interfaces for:
//! - build: encode a JSON document into a .fji flat index
//! - get / has / size / keys / paths: path queries against an index
//! - inspect: header fields and line count
//! - verify: body hash check only

use clap::{Parser, Subcommand, ValueEnum};
use flatjson_io::{BuildOptions, FileHeader, FlatIndex, HashAlgorithm, IndexOptions, Key, Value};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::error::Error;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
const LOG_ENV: &str = "FLATJSON_LOG";

#[derive(Parser)]
#[command(name = "flatjson")]
#[command(about = "Flat JSON index builder and path query tool")]
#[command(version)]
struct Cli {
    /// Log debug events to stderr (overrides FLATJSON_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a JSON document into a flat index
    ///
    /// Examples:
    ///   flatjson build data.json -o data.fji
    ///   flatjson build data.json -o data.fji --hash md5 --progress
    Build {
        /// Input JSON file (root must be an object or an array)
        input: PathBuf,
        /// Output file (.fji)
        #[arg(short, long)]
        output: PathBuf,
        /// Body hash algorithm
        #[arg(long, value_enum, default_value_t = HashArg::Sha256)]
        hash: HashArg,
        /// Show progress spinner while encoding
        #[arg(long)]
        progress: bool,
    },
    /// Print the value at a path as JSON
    ///
    /// Examples:
    ///   flatjson get data.fji users/0/name
    ///   flatjson get data.fji missing --default '"n/a"'
    Get {
        #[command(flatten)]
        query: QueryArgs,
        /// JSON value printed when the path cannot be resolved
        #[arg(long)]
        default: Option<String>,
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
    /// Print whether a path exists (true / false)
    Has {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Print the number of direct children of a container
    Size {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Print the keys of a container as a JSON array
    Keys {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Print every path below a container, one per line
    Paths {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Show header fields and line count
    Inspect {
        /// Index file (.fji)
        index: PathBuf,
        /// Output format (table, json)
        #[arg(long, value_enum, default_value_t = InspectFormat::Table)]
        format: InspectFormat,
        /// Skip body hash verification
        #[arg(long)]
        ignore_hash: bool,
    },
    /// Check the body hash of an index
    Verify {
        /// Index file (.fji)
        index: PathBuf,
    },
}

#[derive(clap::Args)]
struct QueryArgs {
    /// Index file (.fji)
    index: PathBuf,
    /// Slash-separated path; `\` escapes `/` and `\`. Empty means the root.
    #[arg(default_value = "")]
    path: String,
    /// Skip body hash verification
    #[arg(long)]
    ignore_hash: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum HashArg {
    Md5,
    Sha256,
}

impl From<HashArg> for HashAlgorithm {
    fn from(arg: HashArg) -> Self {
        match arg {
            HashArg::Md5 => HashAlgorithm::Md5,
            HashArg::Sha256 => HashAlgorithm::Sha256,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum InspectFormat {
    Table,
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli.command) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::Build {
            input,
            output,
            hash,
            progress,
        } => {
            handle_build(input, output, hash.into(), progress)?;
        }
        Commands::Get {
            query,
            default,
            pretty,
        } => {
            handle_get(query, default, pretty)?;
        }
        Commands::Has { query } => {
            let index = open_index(&query.index, query.ignore_hash)?;
            println!("{}", index.has_path(&query.path));
        }
        Commands::Size { query } => {
            let index = open_index(&query.index, query.ignore_hash)?;
            println!("{}", index.get_size(&query.path)?);
        }
        Commands::Keys { query } => {
            let index = open_index(&query.index, query.ignore_hash)?;
            let keys = index.get_keys(&query.path)?;
            println!("{}", keys_to_json(&keys));
        }
        Commands::Paths { query } => {
            let index = open_index(&query.index, query.ignore_hash)?;
            let mut stdout = std::io::stdout().lock();
            for path in index.get_sub_paths(&query.path)? {
                writeln!(stdout, "{}", path)?;
            }
        }
        Commands::Inspect {
            index,
            format,
            ignore_hash,
        } => {
            handle_inspect(index, format, ignore_hash)?;
        }
        Commands::Verify { index } => {
            handle_verify(index)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_index(path: &Path, ignore_hash: bool) -> Result<FlatIndex, Box<dyn Error>> {
    let index = FlatIndex::new();
    index.open_file(path, ignore_hash)?;
    Ok(index)
}

fn handle_build(
    input: PathBuf,
    output: PathBuf,
    hash_algorithm: HashAlgorithm,
    show_progress: bool,
) -> Result<(), Box<dyn Error>> {
    let start = Instant::now();
    let index = FlatIndex::with_options(IndexOptions {
        build: BuildOptions {
            hash_algorithm,
            ..BuildOptions::default()
        },
        ..IndexOptions::default()
    });

    let mut progress_bar = show_progress.then(|| create_spinner("Encoding document"));
    let summary = index.build_from_file_to(&input, &output)?;
    let elapsed = start.elapsed();
    if let Some(pb) = progress_bar.take() {
        pb.finish_with_message(format!(
            "Encoded {} lines ({} containers) in {:.2?}",
            summary.lines, summary.containers, elapsed
        ));
    }

    let mut stderr = std::io::stderr().lock();
    writeln!(
        &mut stderr,
        "Built {} (lines: {}, containers: {}, bytes written: {}, hash: {}, elapsed: {:.2?})",
        output.display(),
        summary.lines,
        summary.containers,
        summary.bytes,
        hash_algorithm,
        elapsed
    )?;
    Ok(())
}

fn handle_get(
    query: QueryArgs,
    default: Option<String>,
    pretty: bool,
) -> Result<(), Box<dyn Error>> {
    let index = open_index(&query.index, query.ignore_hash)?;
    let value = match default {
        Some(text) => {
            let fallback = Value::from_json_str(&text)?;
            index.get_value(&query.path, fallback)
        }
        None => index.try_get_value(&query.path)?,
    };

    let json = serde_json::Value::from(value);
    let mut stdout = std::io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut stdout, &json)?;
    } else {
        serde_json::to_writer(&mut stdout, &json)?;
    }
    writeln!(stdout)?;
    Ok(())
}

fn keys_to_json(keys: &[Key]) -> serde_json::Value {
    serde_json::Value::Array(
        keys.iter()
            .map(|key| serde_json::Value::from(key.to_value()))
            .collect(),
    )
}

#[derive(Debug, Serialize)]
struct HeaderReport {
    format_version: String,
    hash_algorithm: String,
    hash: String,
    root: String,
    declared_lines: Option<usize>,
    lines: usize,
    extra: Vec<(String, String)>,
}

impl HeaderReport {
    fn new(header: FileHeader, root: String, lines: usize) -> Self {
        Self {
            format_version: header.format_version,
            hash_algorithm: header.hash_algorithm.to_string(),
            hash: header.hash,
            root,
            declared_lines: header.line_count,
            lines,
            extra: header.extra,
        }
    }
}

fn handle_inspect(
    path: PathBuf,
    format: InspectFormat,
    ignore_hash: bool,
) -> Result<(), Box<dyn Error>> {
    let index = open_index(&path, ignore_hash)?;
    let header = index.header().ok_or("no header loaded")?;
    let lines = index.line_count().unwrap_or(0);
    let root = index.root_kind().ok_or("no document loaded")?.to_string();
    let report = HeaderReport::new(header, root, lines);

    let mut stdout = std::io::stdout().lock();
    match format {
        InspectFormat::Json => {
            serde_json::to_writer_pretty(&mut stdout, &report)?;
            writeln!(stdout)?;
        }
        InspectFormat::Table => print_inspect_table(&mut stdout, &report)?,
    }
    Ok(())
}

fn print_inspect_table(
    writer: &mut dyn Write,
    report: &HeaderReport,
) -> Result<(), Box<dyn Error>> {
    writeln!(writer, "{:<16} {}", "Format version", report.format_version)?;
    writeln!(writer, "{:<16} {}", "Hash algorithm", report.hash_algorithm)?;
    writeln!(writer, "{:<16} {}", "Hash", report.hash)?;
    writeln!(writer, "{:<16} {}", "Root", report.root)?;
    let declared = report
        .declared_lines
        .map(|n| n.to_string())
        .unwrap_or_else(|| "-".to_string());
    writeln!(writer, "{:<16} {} (declared: {})", "Lines", report.lines, declared)?;
    for (key, value) in &report.extra {
        writeln!(writer, "{:<16} {}", key, value)?;
    }
    Ok(())
}

fn handle_verify(path: PathBuf) -> Result<(), Box<dyn Error>> {
    let index = open_index(&path, false)?;
    let header = index.header().ok_or("no header loaded")?;
    debug!(path = %path.display(), "hash verified");
    println!(
        "OK: {} {} hash matches ({} lines)",
        path.display(),
        header.hash_algorithm,
        index.line_count().unwrap_or(0)
    );
    Ok(())
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
