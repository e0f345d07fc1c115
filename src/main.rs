use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use quotescope::attributes::table::AttributeTable;
use quotescope::config::Config;
use quotescope::enrich::plan::{ColumnPlan, DEFAULT_QID_COLUMNS, DEFAULT_RAW_COLUMNS};
use quotescope::output::terminal;
use quotescope::pipeline::enrich::EnrichSettings;
use quotescope::pipeline::filter::FilterPolicy;
use quotescope::wikidata::client::WikidataClient;
use quotescope::wikidata::labels::map_ids_to_labels;
use quotescope::wikidata::qid::min_qid;

/// Quotescope: speaker filtering and Wikidata enrichment for Quotebank.
///
/// Drops quotations with no attributed speaker, then adds speaker
/// attributes (nationality, party, gender, ...) to the ones that remain.
#[derive(Parser)]
#[command(name = "quotescope", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drop quotations without a resolved speaker, one file per year
    Filter {
        /// First year to process (default: 2015)
        #[arg(long, default_value = "2015")]
        from: u16,

        /// Last year to process, inclusive (default: 2020)
        #[arg(long, default_value = "2020")]
        to: u16,

        /// Also drop quotations whose candidate QID list is empty
        #[arg(long)]
        require_qids: bool,
    },

    /// Add speaker attributes to a filtered year
    Enrich {
        /// Year to enrich
        #[arg(long)]
        year: u16,

        /// Only enrich the first N quotations
        #[arg(long)]
        limit: Option<u64>,

        /// Overwrite an existing enriched file
        #[arg(long)]
        force: bool,

        /// Number of enriched quotations to print (default: 10)
        #[arg(long, default_value = "10")]
        preview: usize,

        /// Columns resolved to Wikidata labels (comma-separated)
        #[arg(long, value_delimiter = ',')]
        qid_columns: Option<Vec<String>>,

        /// Columns copied as raw values (comma-separated)
        #[arg(long, value_delimiter = ',')]
        raw_columns: Option<Vec<String>>,
    },

    /// Resolve Wikidata identifiers to labels
    Labels {
        /// Identifiers to resolve (e.g. Q6581097)
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Disambiguate a speaker's candidate QIDs and show their attributes
    Speaker {
        /// Candidate identifiers for the speaker
        #[arg(required = true)]
        qids: Vec<String>,
    },

    /// Show which year files exist at each stage
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("quotescope=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Filter {
            from,
            to,
            require_qids,
        } => {
            if from > to {
                anyhow::bail!("--from ({from}) must not be after --to ({to})");
            }
            let config = Config::load()?;
            let policy = if require_qids {
                FilterPolicy::SpeakerOrEmptyQids
            } else {
                FilterPolicy::SpeakerSentinel
            };

            println!(
                "Filtering Quotebank {from}-{to} from {}...",
                config.input_dir.display()
            );
            let outcomes = quotescope::pipeline::filter::run_years(
                &config.input_dir,
                &config.output_dir,
                from..=to,
                policy,
            )?;
            terminal::display_filter_summary(&outcomes);
            println!("Filtered files are in {}", config.output_dir.display());
        }

        Commands::Enrich {
            year,
            limit,
            force,
            preview,
            qid_columns,
            raw_columns,
        } => {
            let config = Config::load()?;
            let attributes_path = config.require_attributes()?;

            let plan = match (qid_columns, raw_columns) {
                (None, None) => ColumnPlan::default(),
                (qid, raw) => ColumnPlan::from_lists(
                    qid.unwrap_or_else(|| DEFAULT_QID_COLUMNS.map(String::from).to_vec()),
                    raw.unwrap_or_else(|| DEFAULT_RAW_COLUMNS.map(String::from).to_vec()),
                ),
            };

            println!("Loading speaker attributes from {}...", attributes_path.display());
            let table = AttributeTable::load(attributes_path)?;
            plan.validate(&table)?;

            let client = WikidataClient::new(&config.wikidata_url, &config.wikidata_language)?;
            let settings = EnrichSettings {
                limit,
                preview,
                ..EnrichSettings::default()
            };

            let run = quotescope::pipeline::enrich::run_year(
                &config.output_dir,
                year,
                &plan,
                &table,
                &client,
                settings,
                force,
            )
            .await?;

            match run {
                Some(run) => {
                    let columns: Vec<&str> = plan.iter().map(|(name, _)| name).collect();
                    terminal::display_enrich_summary(year, &run);
                    terminal::display_preview(&run.preview, &columns);
                }
                None => {
                    println!(
                        "Enriched file for {year} already exists. {}",
                        "Pass --force to rebuild it.".dimmed()
                    );
                }
            }
        }

        Commands::Labels { ids } => {
            let config = Config::load()?;
            let client = WikidataClient::new(&config.wikidata_url, &config.wikidata_language)?;

            info!(count = ids.len(), "Resolving labels");
            let report = map_ids_to_labels(&client, ids.as_slice()).await;
            terminal::display_label_report(&ids, &report);
        }

        Commands::Speaker { qids } => {
            let config = Config::load()?;
            let attributes_path = config.require_attributes()?;

            let speaker_id = min_qid(qids.iter().map(String::as_str))?.to_string();
            let table = AttributeTable::load(attributes_path)?;
            terminal::display_speaker(&speaker_id, &qids, table.row(&speaker_id));
        }

        Commands::Status => {
            let config = Config::load()?;
            quotescope::status::show(&config)?;
        }
    }

    Ok(())
}
