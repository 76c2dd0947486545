//! chunktree CLI - Command line interface for chunktree
//!
//! Hashes files into Merkle trees, writes and inspects the flat array form,
//! and verifies files against a previously published array.

use chunktree::{
    codec, source, verify, Blake3Digest, BuildMode, ByteRange, Digest, DigestKind, Sha256Digest,
    TreeConfig, Xxh3Digest,
};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{IsTerminal, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chunktree")]
#[command(about = "Content-addressed Merkle trees over chunked files")]
#[command(version)]
struct Cli {
    /// Digest: sha256, blake3 or xxh3
    #[arg(long)]
    digest: Option<DigestKind>,

    /// Bytes per chunk
    #[arg(short, long)]
    chunk_size: Option<usize>,

    /// Hash worker threads (bulk mode)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Tree construction: bulk or incremental
    #[arg(short, long)]
    mode: Option<BuildMode>,

    /// Output format (json or text)
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the root hash of a file
    Hash {
        /// File to hash
        file: PathBuf,
    },

    /// Write the serialized tree of a file
    Serialize {
        /// File to hash
        file: PathBuf,
        /// Where to write the tree array
        #[arg(short, long)]
        output: PathBuf,
        /// Drop the leaf layer before writing
        #[arg(long)]
        trim: bool,
    },

    /// Decode a tree array and report on it
    Inspect {
        /// Serialized tree array
        array: PathBuf,
        /// Include a depth-first dump of every node
        #[arg(long)]
        dump: bool,
    },

    /// Check a file against a serialized tree array
    Verify {
        /// File to check
        file: PathBuf,
        /// Serialized tree array to check against
        array: PathBuf,
    },

    /// Print a byte range of a file to stdout
    Range {
        /// File to read
        file: PathBuf,
        /// Range as start-end, end exclusive
        range: ByteRange,
    },

    /// Show the effective configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = effective_config(&cli)?;

    match config.digest {
        DigestKind::Sha256 => run::<Sha256Digest>(&cli, &config),
        DigestKind::Blake3 => run::<Blake3Digest>(&cli, &config),
        DigestKind::Xxh3 => run::<Xxh3Digest>(&cli, &config),
    }
}

fn effective_config(cli: &Cli) -> anyhow::Result<TreeConfig> {
    let mut config = TreeConfig::load()?;
    if let Some(digest) = cli.digest {
        config.digest = digest;
    }
    if let Some(chunk_size) = cli.chunk_size {
        config.chunk_size = chunk_size;
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    config.validate()?;
    Ok(config)
}

fn run<D: Digest>(cli: &Cli, config: &TreeConfig) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Hash { file } => {
            let tree = verify::build_file::<D>(file, config, &progress_bar(cli.format))?;
            let root = tree.root_hash().map(hex::encode);
            output(
                &cli.format,
                &serde_json::json!({
                    "file": file.display().to_string(),
                    "root": root,
                    "chunks": tree.leaf_count(),
                    "digest": D::NAME,
                    "mode": config.mode.to_string(),
                    "chunk_size": config.chunk_size
                }),
            );
        }

        Commands::Serialize { file, output: out, trim } => {
            let mut tree = verify::build_file::<D>(file, config, &progress_bar(cli.format))?;
            if *trim {
                tree.trim_leaves();
            }
            let bytes = codec::serialize(&tree);
            std::fs::write(out, &bytes)?;
            output(
                &cli.format,
                &serde_json::json!({
                    "status": "ok",
                    "path": out.display().to_string(),
                    "root": tree.root_hash().map(hex::encode),
                    "records": bytes.len() / codec::record_width::<D>(),
                    "bytes": bytes.len(),
                    "trimmed": trim
                }),
            );
        }

        Commands::Inspect { array, dump } => {
            let bytes = std::fs::read(array)?;
            let tree = codec::deserialize::<D>(&bytes)?;
            let mut report = serde_json::json!({
                "root": tree.root_hash().map(hex::encode),
                "records": bytes.len() / codec::record_width::<D>(),
                "nodes": tree.len_nodes(),
                "leaves": tree.leaf_count(),
                "digest": D::NAME
            });
            if *dump {
                report["dump"] = serde_json::Value::String(tree.to_string());
            }
            output(&cli.format, &report);
        }

        Commands::Verify { file, array } => {
            let bytes = std::fs::read(array)?;
            let result =
                verify::verify_file::<D>(file, &bytes, config, &progress_bar(cli.format))?;
            output(&cli.format, &serde_json::to_value(&result)?);
            if !result.matches {
                std::process::exit(1);
            }
        }

        Commands::Range { file, range } => {
            let data = source::read_range(file, *range)?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&data)?;
            stdout.flush()?;
        }

        Commands::Config => {
            let mut report = serde_json::to_value(config)?;
            report["record_width"] = serde_json::Value::from(2 * config.digest.width());
            output(&cli.format, &report);
        }
    }

    Ok(())
}

/// Byte progress on stderr for text output on a terminal, hidden otherwise
fn progress_bar(format: OutputFormat) -> ProgressBar {
    if format == OutputFormat::Json || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::with_template(
        "[{elapsed_precise}] {bar:40.cyan/blue} {bytes:>10}/{total_bytes:10} {bytes_per_sec} {msg}",
    ) {
        pb.set_style(style.progress_chars("##-"));
    }
    pb
}

fn output(format: &OutputFormat, value: &serde_json::Value) {
    match format {
        OutputFormat::Json => {
            println!("{}", value);
        }
        OutputFormat::Text => match serde_json::to_string_pretty(value) {
            Ok(pretty) => println!("{}", pretty),
            Err(_) => println!("{}", value),
        },
    }
}
