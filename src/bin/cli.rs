use clap::{Parser, Subcommand};
use estate_match_engine::{
    retrieval::InMemoryPropertySource, AcceptanceThreshold, EngineConfig, MatchOutcome,
    PropertySummary, RetrievalStrategy, SimilarityEngine,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "estate-match-cli")]
#[command(about = "Estate Match similar-property CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Database path (overrides DB_PATH)
    #[arg(short, long)]
    db: Option<String>,

    /// Backend base URL (overrides API_BASE_URL)
    #[arg(long)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Find properties similar to a reference
    Similar {
        /// Reference property ID (looked up through the source)
        #[arg(long, conflicts_with = "reference")]
        id: Option<String>,

        /// Reference property JSON file
        #[arg(long)]
        reference: Option<PathBuf>,

        /// Retrieval strategy
        #[arg(short, long, default_value = "comprehensive")]
        strategy: String,

        /// Acceptance threshold (30, 40, 50 or 60)
        #[arg(short, long, default_value = "40")]
        threshold: u8,

        /// Rank against a JSON array of listings instead of the backend
        #[arg(long)]
        fixtures: Option<PathBuf>,

        /// Disable cache
        #[arg(long)]
        no_cache: bool,
    },

    /// Get cache statistics
    Stats,

    /// Clean up old cache entries
    Cleanup {
        /// Maximum age in days
        #[arg(short, long, default_value = "30")]
        max_age_days: i64,
    },
}

fn read_reference(path: &PathBuf) -> anyhow::Result<PropertySummary> {
    let json = std::fs::read_to_string(path)?;
    Ok(PropertySummary::from_json(&json)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut config = EngineConfig::from_env()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }

    match cli.command {
        Commands::Similar { id, reference, strategy, threshold, fixtures, no_cache } => {
            let strategy: RetrievalStrategy = strategy.parse()?;
            let threshold = AcceptanceThreshold::try_from(threshold)?;

            let engine = match fixtures {
                Some(path) => {
                    let source = InMemoryPropertySource::from_json_file(&path)?;
                    println!("📂 Loaded {} listings from {}", source.len(), path.display());
                    SimilarityEngine::with_source(Arc::new(source), config)
                }
                None => SimilarityEngine::new(config).await?,
            };

            let reference = match (id, reference) {
                (Some(id), _) => engine.reference_by_id(&id).await?,
                (None, Some(path)) => read_reference(&path)?,
                (None, None) => anyhow::bail!("either --id or --reference is required"),
            };

            println!("🔍 Similar to: {}", reference.display_name());

            let request = engine
                .request_for(reference)
                .with_strategy(strategy)
                .with_threshold(threshold)
                .with_cache(!no_cache);

            let result = engine.find_similar(&request).await?;

            println!("\n{}", result.headline());
            println!("   Strategy: {}", result.strategy);
            println!("   Threshold: {}", result.threshold);
            println!("   Candidates: {}", result.candidates_considered);
            println!("   Cached: {}", result.from_cache);
            println!("   Latency: {:.2}ms", result.latency_ms);

            if result.outcome != MatchOutcome::Empty {
                println!("\n📋 Results:");
                for (i, entry) in result.results.iter().enumerate() {
                    let label = if entry.below_threshold { "Best Match" } else { entry.tier.label() };
                    println!(
                        "   {}. {} - {}% [{}]",
                        i + 1,
                        entry.property.display_name(),
                        entry.score.total,
                        label
                    );
                    let breakdown: Vec<String> = entry
                        .score
                        .breakdown
                        .iter()
                        .map(|(feature, points)| format!("{:?}={}", feature, points))
                        .collect();
                    println!("      {}", breakdown.join(" "));
                }
            }
        }

        Commands::Stats => {
            let engine = SimilarityEngine::new(config).await?;
            let stats = engine.cache_stats().await?;

            println!("📊 Cache Statistics:");
            println!("   Total entries: {}", stats.total_entries);
            println!("   Total hits: {}", stats.total_hits);
            println!("   Avg hits/entry: {:.2}", stats.avg_hit_count);

            if let Some(oldest) = stats.oldest_entry {
                println!("   Oldest entry: {}", oldest.format("%Y-%m-%d %H:%M:%S"));
            }

            if let Some(newest) = stats.newest_entry {
                println!("   Newest entry: {}", newest.format("%Y-%m-%d %H:%M:%S"));
            }
        }

        Commands::Cleanup { max_age_days } => {
            let engine = SimilarityEngine::new(config).await?;
            println!("🧹 Cleaning up entries older than {} days...", max_age_days);

            let deleted = engine.cleanup_cache(max_age_days).await?;

            println!("✅ Deleted {} entries", deleted);
        }
    }

    Ok(())
}
