use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use watchword::config::Config;
use watchword::dictionary::{self, TermDictionary};
use watchword::normalize::TextNormalizer;
use watchword::output::terminal;
use watchword::table::{cell_text, Table};
use watchword::topics::analyzer::{self, TopicAnalyzer};
use watchword::topics::lda::{ModelOptions, Prior};

/// Watchword: suspicious-content screening for financial communications.
///
/// Screens message tables against a dictionary of suspicious terms and
/// surfaces the latent topics in what people are actually writing about.
#[derive(Parser)]
#[command(name = "watchword", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Screen a CSV of communications against the term dictionary
    Screen {
        /// CSV file with one communication per row
        #[arg(long)]
        input: String,

        /// Column holding the text (default: WATCHWORD_COLUMN or "text")
        #[arg(long)]
        column: Option<String>,

        /// Terms file, one per line (overrides WATCHWORD_TERMS)
        #[arg(long)]
        terms: Option<String>,

        /// List the dictionary terms that fired for each flagged row
        #[arg(long)]
        matches: bool,

        /// Write the screened table (flag column included) to this CSV
        #[arg(long)]
        output: Option<String>,

        /// With --output, write only the flagged rows
        #[arg(long)]
        flagged_only: bool,
    },

    /// Show which dictionary terms a single text matches
    Match {
        /// The text to check
        text: String,

        /// List every matching term instead of just the first
        #[arg(long)]
        all: bool,

        /// Terms file, one per line (overrides WATCHWORD_TERMS)
        #[arg(long)]
        terms: Option<String>,
    },

    /// Show the normalized form of a single text
    Clean {
        /// The text to normalize
        text: String,
    },

    /// Train a topic model over a CSV of communications
    Topics {
        /// CSV file with one communication per row
        #[arg(long)]
        input: String,

        /// Column holding the text (default: WATCHWORD_COLUMN or "text")
        #[arg(long)]
        column: Option<String>,

        /// Number of topics to extract
        #[arg(long, default_value = "5")]
        num_topics: usize,

        /// Gibbs sampling passes over the corpus
        #[arg(long, default_value = "5")]
        passes: usize,

        /// Document-topic prior: "auto" or a positive number
        #[arg(long, default_value = "auto")]
        alpha: Prior,

        /// Topic-word prior: "auto" or a positive number
        #[arg(long, default_value = "auto")]
        eta: Prior,

        /// Seed for reproducible training
        #[arg(long)]
        seed: Option<u64>,

        /// Flag documents whose dominant topic equals this id
        #[arg(long)]
        suspicious_topic: Option<f64>,

        /// Write the topic details table to this CSV
        #[arg(long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("watchword=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Screen {
            input,
            column,
            terms,
            matches,
            output,
            flagged_only,
        } => {
            let config = Config::load()?;
            let dictionary = load_dictionary(&config, terms.as_deref())?;
            let column = column.unwrap_or_else(|| config.text_column.clone());

            let table = Table::from_csv_path(Path::new(&input))?;
            println!("Screening {} rows from {input}...", table.len());

            let screened = dictionary.flag_rows(&table, &column)?;

            let matched_terms = if matches {
                Some(collect_row_matches(&dictionary, &screened, &column)?)
            } else {
                None
            };
            terminal::display_screened(&screened, &column, matched_terms.as_ref());

            if let Some(path) = output {
                let to_save = if flagged_only {
                    dictionary::select_flagged(&screened)?
                } else {
                    screened
                };
                to_save.to_csv_path(Path::new(&path))?;
                println!(
                    "{}",
                    format!("Screened table saved to: {path} ({} rows)", to_save.len()).bold()
                );
            }
        }

        Commands::Match { text, all, terms } => {
            let config = Config::load()?;
            let dictionary = load_dictionary(&config, terms.as_deref())?;

            if all {
                let matched = dictionary.find_matches(&text)?;
                terminal::display_matched_terms(matched.as_deref());
            } else {
                let matched = dictionary.find_match(&text)?.map(|term| vec![term]);
                terminal::display_matched_terms(matched.as_deref());
            }
        }

        Commands::Clean { text } => {
            let normalizer = TextNormalizer::new();
            println!("{}", normalizer.clean(&text));
        }

        Commands::Topics {
            input,
            column,
            num_topics,
            passes,
            alpha,
            eta,
            seed,
            suspicious_topic,
            output,
        } => {
            let config = Config::load()?;
            let column = column.unwrap_or_else(|| config.text_column.clone());

            let table = Table::from_csv_path(Path::new(&input))?;
            if !table.has_column(&column) {
                anyhow::bail!(
                    "table has no '{}' column (columns: {})",
                    column,
                    table.columns().join(", ")
                );
            }

            println!("Normalizing {} documents from {input}...", table.len());
            let normalizer = TextNormalizer::new();
            let documents: Vec<Vec<String>> = table
                .rows()
                .iter()
                .map(|row| normalizer.tokenize(cell_text(row, &column)))
                .collect();

            let options = ModelOptions {
                num_topics,
                passes,
                alpha,
                eta,
                seed,
            };
            let mut topic_analyzer = TopicAnalyzer::new();
            topic_analyzer
                .prepare_data(&documents)
                .build_model(&options)?;

            terminal::display_topic_summary(&topic_analyzer.topic_terms(6)?);

            let details = topic_analyzer.topic_details()?;
            terminal::display_topic_details(&details);
            terminal::display_topic_distribution(&topic_analyzer.topic_distribution()?);

            let details = match suspicious_topic {
                Some(topic_id) => {
                    let flagged = analyzer::flag_topic(&details, topic_id)?;
                    let hits = flagged
                        .rows()
                        .iter()
                        .filter(|row| dictionary::flag_is_set(row, analyzer::TOPIC_FLAG_COLUMN))
                        .count();
                    println!(
                        "  {} {} documents on suspicious topic {topic_id:.0}",
                        "!!".red().bold(),
                        hits
                    );
                    flagged
                }
                None => details,
            };

            if let Some(path) = output {
                details.to_csv_path(Path::new(&path))?;
                println!("\n{}", format!("Topic details saved to: {path}").bold());
            }
        }
    }

    Ok(())
}

/// Load the term dictionary from the CLI flag or the configured path.
fn load_dictionary(config: &Config, terms_flag: Option<&str>) -> Result<TermDictionary> {
    let path = config.require_terms(terms_flag)?;
    TermDictionary::from_file(Path::new(path))
}

/// Dictionary terms that fired for each flagged row, keyed by row index.
fn collect_row_matches(
    dictionary: &TermDictionary,
    screened: &Table,
    column: &str,
) -> Result<BTreeMap<usize, Vec<String>>> {
    let mut matched = BTreeMap::new();
    for (index, row) in screened.rows().iter().enumerate() {
        if !dictionary::flag_is_set(row, dictionary::FLAG_COLUMN) {
            continue;
        }
        if let Some(terms) = dictionary.find_matches(cell_text(row, column))? {
            matched.insert(index, terms);
        }
    }
    Ok(matched)
}
