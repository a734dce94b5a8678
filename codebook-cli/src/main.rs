//! codebook - survey codebook scale toolkit
//!
//! Hand-run pipeline stages:
//! `parse` labels file → `analyze` scales → `guide` / `recode` / `phrases`
//! exports, plus `concepts` CSVs for annotated variables.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use codebook_classify::lexicon::{DEFAULT_NA_PATTERNS, DEFAULT_NEGATIVE_WORDS, DEFAULT_POSITIVE_WORDS};
use codebook_classify::{Lexicon, ScaleClassifier};
use codebook_cli::pipeline;
use codebook_cli::{RecodeGenerator, WaveInput};
use codebook_common::config::{
    default_config_path, write_toml_config, ConfigResolver, LexiconConfig, TomlConfig,
    CONFIG_ENV_VAR,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "codebook")]
#[command(about = "Survey codebook parsing, scale classification and reverse-coding exports")]
#[command(version, long_version = env!("LONG_VERSION"))]
struct Cli {
    /// Config file (TOML)
    #[arg(long, global = true, env = CONFIG_ENV_VAR, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `codebook_classify=trace`
    #[arg(long, global = true, env = "CODEBOOK_LOG", value_name = "FILTER")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a labels file into atomic variables JSON
    Parse {
        /// Labels file (`Variable:` / `Question:` / `Value Labels:` blocks)
        input: PathBuf,
        /// Output JSON (default: `<name>_atomic.json` next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Keep battery items as exported instead of prefixing the shared stem
        #[arg(long)]
        no_stems: bool,
    },

    /// Classify every variable's response scale
    Analyze {
        /// Variables JSON from `parse`
        input: PathBuf,
        /// Output JSON (default: `<name>_analyzed.json` next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write reversal guide CSVs
    Guide {
        /// Analyzed waves as `NAME=FILE` or `FILE`
        #[arg(required = true)]
        waves: Vec<WaveInput>,
        /// Combined guide path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate the reverse-coding R script
    Recode {
        /// Analyzed waves as `NAME=FILE` or `FILE`
        #[arg(required = true)]
        waves: Vec<WaveInput>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Find validation phrases and check adjacent questions
    Phrases {
        /// Variable JSON files as `NAME=FILE` or `FILE`
        #[arg(required = true)]
        waves: Vec<WaveInput>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export annotated variables to basic and detailed CSVs
    Concepts {
        input: PathBuf,
        basic: PathBuf,
        detailed: PathBuf,
    },

    /// Write a config file populated with the default lexicons
    InitConfig {
        /// Target path (default: user config directory)
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigResolver::new(cli.config.clone())
        .load()
        .context("Failed to load configuration")?;

    // Priority: --log-level / CODEBOOK_LOG > RUST_LOG > [logging] level
    let filter = match cli.log_level.as_deref() {
        Some(level) => EnvFilter::try_new(level).context("Invalid --log-level filter")?,
        None => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.logging.level))
            .context("Invalid [logging] level")?,
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        "Starting codebook v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let lexicon = Lexicon::from_config(&config.lexicon);
    if !config.lexicon.is_default() {
        info!(extend = config.lexicon.extend, "Using lexicon overrides from config");
    }
    let classifier = ScaleClassifier::new(&lexicon).context("Invalid [lexicon] configuration")?;

    match cli.command {
        Command::Parse {
            input,
            output,
            no_stems,
        } => {
            let path = pipeline::run_parse(&input, output, !no_stems)?;
            println!("Saved atomic variables to {}", path.display());
        }

        Command::Analyze { input, output } => {
            let (path, result) = pipeline::run_analyze(&classifier, &input, output)?;
            print!("{}", pipeline::format_summary(&result));
            println!("Saved to {}", path.display());
        }

        Command::Guide { waves, output } => {
            let rows = pipeline::run_guide(&waves, output, &config.export)?;
            println!("{} variables need reversal across {} wave(s)", rows.len(), waves.len());
        }

        Command::Recode { waves, output } => {
            let generator = RecodeGenerator::new(classifier.matcher().clone());
            let path = pipeline::run_recode(&generator, &waves, output)?;
            println!("R script saved to {}", path.display());
        }

        Command::Phrases { waves, output } => {
            let reports = pipeline::run_phrases(&waves, output)?;
            for report in &reports {
                println!(
                    "{}: {} questions, {} unique, {} acceptable ({:.1}%), {} problematic, {} adjacent issues",
                    report.wave,
                    report.total_questions,
                    report.unique_phrases,
                    report.acceptable_phrases,
                    report.coverage(),
                    report.problematic,
                    report.adjacent_issues.len()
                );
            }
        }

        Command::Concepts {
            input,
            basic,
            detailed,
        } => {
            let count = pipeline::run_concepts(&input, &basic, &detailed)?;
            println!("{} variables written to {} and {}", count, basic.display(), detailed.display());
        }

        Command::InitConfig { path, force } => {
            let Some(path) = path.or_else(default_config_path) else {
                bail!("Could not determine config directory; pass a path");
            };
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            write_toml_config(&default_template(), &path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Config written to {}", path.display());
        }
    }

    Ok(())
}

/// Defaults with every lexicon list spelled out for editing; negators stay
/// unset so negation handling remains off until added
fn default_template() -> TomlConfig {
    let owned = |words: &[&str]| Some(words.iter().map(|w| w.to_string()).collect());
    TomlConfig {
        lexicon: LexiconConfig {
            extend: false,
            na_patterns: owned(DEFAULT_NA_PATTERNS),
            positive_words: owned(DEFAULT_POSITIVE_WORDS),
            negative_words: owned(DEFAULT_NEGATIVE_WORDS),
            negators: None,
        },
        ..TomlConfig::default()
    }
}
