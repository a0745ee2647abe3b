use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokidx::codec;
use tokidx::config::{self, Config};
use tokidx::index::FileIndexer;
use tokidx::output;
use tokidx::position::TokenOffset;
use tokidx::token::{self, TokenFile, TokenFileOptions, TokenizerKind};
use tokidx::utils::{self, progress};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tokidx")]
#[command(about = "Index, search and dictionary-compress files as circular token streams")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Tokenizer: bytes, chars, words or coded
    #[arg(short, long, global = true)]
    tokenizer: Option<TokenizerKind>,

    /// Text encoding for the chars and words tokenizers
    #[arg(short, long, global = true)]
    encoding: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index for a file (written to <file>.index)
    Index {
        file: PathBuf,

        /// Characters per bucketing round
        #[arg(short, long)]
        ngram: Option<usize>,
    },
    /// Print every position where a string occurs
    Find {
        file: PathBuf,

        query: String,

        /// Only print the number of hits
        #[arg(short, long)]
        count: bool,
    },
    /// Mine frequent prefixes worth a dictionary entry
    Prefixes {
        file: PathBuf,

        /// Minimum fitness
        #[arg(long)]
        threshold: Option<i64>,

        /// Most prefixes to report
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Compress a file with a mined dictionary
    Compress {
        file: PathBuf,

        /// Minimum fitness of mined prefixes
        #[arg(long)]
        threshold: Option<i64>,

        /// Most mined prefixes in the dictionary
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
    /// Expand a compressed file back to text
    Expand {
        compressed: PathBuf,

        /// Dictionary (defaults to the one next to the compressed file)
        dictionary: Option<PathBuf>,

        /// Output file (defaults to <data>.expand for <data>.compressed)
        output: Option<PathBuf>,
    },
    /// Show token and index statistics for a file
    Stats { file: PathBuf },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(kind) = cli.tokenizer {
        config.tokenizer = kind;
    }
    if let Some(encoding) = &cli.encoding {
        config.encoding = encoding.clone();
    }
    let color = !cli.no_color;

    match cli.command {
        Commands::Index { file, ngram } => {
            if let Some(ngram) = ngram {
                config.ngram = ngram;
            }
            let indexer = build_index(&file, &config)?;
            indexer.close()?;
        }
        Commands::Find { file, query, count } => {
            let indexer = open_or_build_index(&file, &config)?;
            if count {
                println!("{}", indexer.count(&query)?);
            } else {
                let hits = indexer.find(&query)?;
                output::print_hits(indexer.token_file(), &query, &hits, color)?;
                eprintln!("{} hits", hits.len());
            }
        }
        Commands::Prefixes {
            file,
            threshold,
            count,
            json,
        } => {
            let indexer = open_or_build_index(&file, &config)?;
            let candidates = indexer.find_compression_prefixes(
                threshold.unwrap_or(config.mining_threshold),
                count.unwrap_or(config.max_dictionary_size),
            )?;
            if json {
                println!("{}", serde_json::to_string_pretty(&candidates)?);
            } else {
                output::print_candidates(&candidates, color)?;
            }
        }
        Commands::Compress {
            file,
            threshold,
            count,
        } => {
            let start = Instant::now();
            let indexer = open_or_build_index(&file, &config)?;
            let codec = indexer.build_codec(
                threshold.unwrap_or(config.mining_threshold),
                count.unwrap_or(config.max_dictionary_size),
            )?;
            let (code_path, dict_path) = codec::write_compressed(indexer.token_file(), &codec)
                .with_context(|| format!("Failed to compress {}", file.display()))?;

            let original = indexer.token_file().file_length().get();
            let compressed = std::fs::metadata(&code_path)?.len();
            let dictionary = std::fs::metadata(&dict_path)?.len();
            println!(
                "Compressed {} ({} bytes) to {} ({} bytes) + {} ({} bytes, {} entries) in {:.2}s",
                file.display(),
                original,
                code_path.display(),
                compressed,
                dict_path.display(),
                dictionary,
                codec.len(),
                start.elapsed().as_secs_f64()
            );
        }
        Commands::Expand {
            compressed,
            dictionary,
            output,
        } => {
            let dictionary = dictionary.unwrap_or_else(|| utils::dictionary_for_compressed(&compressed));
            let output = output.unwrap_or_else(|| utils::expanded_for_compressed(&compressed));
            let codec = codec::load_codec(&dictionary)
                .with_context(|| format!("Failed to read dictionary {}", dictionary.display()))?;
            let written = codec::expand(&codec, &compressed, &output, config.expand_encoding()?)?;
            println!("Expanded {} to {} ({} bytes)", compressed.display(), output.display(), written);
        }
        Commands::Stats { file } => {
            show_stats(&file, &config, color)?;
        }
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("TOKIDX_LOG").unwrap_or_else(|_| EnvFilter::new("tokidx=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_token_file(file: &Path, config: &Config) -> Result<Box<dyn TokenFile>> {
    let options: TokenFileOptions = config.token_file_options()?;
    token::open(file, config.tokenizer, &options)
        .with_context(|| format!("Failed to open {} as {} tokens", file.display(), config.tokenizer))
}

fn build_index(file: &Path, config: &Config) -> Result<FileIndexer<Box<dyn TokenFile>>> {
    let start = Instant::now();
    let token_file = open_token_file(file, config)?;
    let index_path = utils::index_path(file);
    let token_count = token_file.token_count().get();

    let mut indexer = FileIndexer::create(token_file, &index_path)
        .with_context(|| format!("Failed to create index {}", index_path.display()))?
        .with_refine_threshold(config.refine_threshold)
        .with_max_depth(config.sort_depth);

    let bar = progress::slot_bar(token_count, "sorting");
    indexer.build_index_with_progress(config.ngram, &bar)?;
    bar.finish_and_clear();

    println!(
        "Indexed {} ({} tokens, {}) in {:.2}s",
        file.display(),
        token_count,
        config.tokenizer,
        start.elapsed().as_secs_f64()
    );
    Ok(indexer)
}

fn open_or_build_index(file: &Path, config: &Config) -> Result<FileIndexer<Box<dyn TokenFile>>> {
    let index_path = utils::index_path(file);
    if !index_path.exists() {
        return build_index(file, config);
    }
    let token_file = open_token_file(file, config)?;
    let indexer = FileIndexer::open(token_file, &index_path).with_context(|| {
        format!(
            "Index {} does not fit {} as {} tokens; rebuild it with `tokidx index`",
            index_path.display(),
            file.display(),
            config.tokenizer
        )
    })?;
    Ok(indexer.with_max_depth(config.sort_depth))
}

fn show_stats(file: &Path, config: &Config, color: bool) -> Result<()> {
    if !file.exists() {
        bail!("No such file: {}", file.display());
    }
    let token_file = open_token_file(file, config)?;
    let index_path = utils::index_path(file);
    let indexed = index_path.exists()
        && std::fs::metadata(&index_path)?.len() == token_file.token_count().get() * 8;
    let distinct: BTreeSet<String> = token_file
        .tokens(TokenOffset::ZERO)
        .take(token_file.token_count().as_usize())
        .collect();

    let encoding = match config.tokenizer {
        TokenizerKind::Coded => "dictionary".to_string(),
        _ => token_file.encoding().to_string(),
    };
    output::print_fields(
        &[
            ("file", file.display().to_string()),
            ("tokenizer", config.tokenizer.to_string()),
            ("encoding", encoding),
            ("bytes", token_file.file_length().to_string()),
            ("chars", token_file.char_count().to_string()),
            ("tokens", token_file.token_count().to_string()),
            ("distinct tokens", distinct.len().to_string()),
            (
                "index",
                if indexed {
                    index_path.display().to_string()
                } else {
                    "not built".to_string()
                },
            ),
            (
                "config",
                config::get_config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "none".to_string()),
            ),
        ],
        color,
    )?;
    Ok(())
}
