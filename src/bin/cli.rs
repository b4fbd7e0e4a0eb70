use clap::{Parser, Subcommand};
use places_engine::{recommend::InteractionMatrix, Corpus, EngineConfig, NormalizerKind, PlacesEngine};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "places-engine")]
#[command(about = "Places search & recommendation engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Database path (overrides config and PLACES_DB_PATH)
    #[arg(short, long)]
    db: Option<String>,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use the stemming normalizer instead of the lexical one
    #[arg(long)]
    stemming: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild artifacts from a corpus snapshot
    Build {
        /// Corpus JSON file ({"users": [...], "places": [...], "likes": [...]})
        #[arg(long)]
        corpus: PathBuf,

        /// Only rebuild the text index
        #[arg(long, conflicts_with = "interactions_only")]
        text_only: bool,

        /// Only rebuild the interaction model
        #[arg(long)]
        interactions_only: bool,
    },

    /// Search places by free text
    Search {
        /// Search query
        query: String,

        /// Rank by summed token weight instead of cosine similarity
        #[arg(long)]
        match_score: bool,
    },

    /// Recommend places to a user
    Recommend {
        /// User ID
        user: String,
    },

    /// Pick users to promote a place to
    Promote {
        /// Place ID
        place: String,

        /// Requesting user, never targeted
        #[arg(short, long)]
        user: String,
    },

    /// Get artifact store statistics
    Stats,

    /// Print the like matrix of a corpus as CSV
    ExportMatrix {
        /// Corpus JSON file
        #[arg(long)]
        corpus: PathBuf,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::from_env()?,
    };
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if cli.stemming {
        config.normalizer = NormalizerKind::Stemming;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if let Commands::ExportMatrix { corpus } = &cli.command {
        let corpus = Corpus::from_json_file(corpus)?;
        let matrix = InteractionMatrix::from_corpus(&corpus)?;
        print!("{}", matrix.to_csv_string());
        return Ok(());
    }

    let engine = PlacesEngine::open(config).await?;

    match cli.command {
        Commands::Build {
            corpus,
            text_only,
            interactions_only,
        } => {
            println!("🔨 Building artifacts from {}", corpus.display());
            let corpus = Corpus::from_json_file(&corpus)?;

            let reports = if text_only {
                vec![engine.rebuild_text_index(corpus.places.into()).await?]
            } else if interactions_only {
                vec![engine.rebuild_interactions(corpus.into()).await?]
            } else {
                engine.rebuild_all(corpus).await?
            };

            for report in reports {
                println!(
                    "✅ {}: {} items, {} bytes, {:.1}ms",
                    report.family.as_str(),
                    report.item_count,
                    report.payload_bytes,
                    report.elapsed_ms
                );
            }
        }

        Commands::Search { query, match_score } => {
            println!("🔍 Searching for: {}", query);

            let results = if match_score {
                engine.match_score(&query)?
            } else {
                engine.search_scored(&query)?
            };

            if results.is_empty() {
                println!("\n⚠️ No places found");
            }
            for (i, result) in results.iter().enumerate() {
                println!("   {}. {} ({:.4})", i + 1, result.place_id, result.score);
            }
        }

        Commands::Recommend { user } => {
            let recommendations = engine.recommend_detailed(&user)?;

            println!("⭐ Recommendations for {} ({:?}):", user, recommendations.source);
            for (i, place) in recommendations.places.iter().enumerate() {
                println!("   {}. {}", i + 1, place);
            }
        }

        Commands::Promote { place, user } => {
            let plan = engine.promote(&place, &user)?;

            println!("📣 Promotion of {} requested by {}", plan.place, plan.requested_by);
            println!("   Sent to {} users:", plan.sent);
            for target in &plan.targets {
                println!("   - {}", target);
            }
        }

        Commands::Stats => {
            let stats = engine.store_stats().await?;

            println!("📊 Store Statistics:");
            println!("   Artifacts: {}", stats.total_artifacts);
            println!("   Total bytes: {}", stats.total_bytes);

            if let Some(oldest) = stats.oldest_build {
                println!("   Oldest build: {}", oldest.format("%Y-%m-%d %H:%M:%S"));
            }

            if let Some(newest) = stats.newest_build {
                println!("   Newest build: {}", newest.format("%Y-%m-%d %H:%M:%S"));
            }
        }

        Commands::ExportMatrix { .. } => {}
    }

    Ok(())
}
