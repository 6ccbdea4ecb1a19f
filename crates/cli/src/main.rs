use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{DatasetStore, MovieRecord, NotFoundError};
use recommender::SimilarityRecommender;
use server::{AppConfig, MovieRecommendation, RecommendationOrchestrator};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// ReelRecs - "More like this" movie recommendations
#[derive(Parser)]
#[command(name = "reel-recs")]
#[command(about = "Content-based movie recommendations from a precomputed similarity matrix", long_about = None)]
struct Cli {
    /// Directory holding movies.dat and similarity.bin (overrides DATA_DIR)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get movies similar to a title
    Recommend {
        /// Exact catalog title to find similar movies for
        #[arg(long)]
        title: String,

        /// Number of recommendations to return
        #[arg(long)]
        limit: Option<usize>,

        /// Look up a poster for each recommendation
        #[arg(long)]
        posters: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// List catalog titles in order
    Titles {
        /// Maximum number of titles to print
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Search for movies by title
    Search {
        /// Movie title to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    let data_dir = cli.data_dir.clone().unwrap_or_else(|| config.data_dir.clone());

    // Load the dataset once; every command shares it
    eprintln!("Loading similarity dataset from {}...", data_dir.display());
    let start = Instant::now();
    let store = Arc::new(
        DatasetStore::load_from_dir(&data_dir).context("Failed to load similarity dataset")?,
    );
    eprintln!(
        "{} Loaded {} movies in {:?}",
        "✓".green(),
        store.len(),
        start.elapsed()
    );

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend {
            title,
            limit,
            posters,
            json,
        } => {
            let limit = limit.unwrap_or(config.default_recommendations);
            handle_recommend(store, &config, &title, limit, posters, json).await?
        }
        Commands::Titles { limit } => handle_titles(&store, limit),
        Commands::Search { title } => handle_search(&store, &title),
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(store, requests, concurrent).await?,
    }

    Ok(())
}

/// Handle the 'recommend' command
async fn handle_recommend(
    store: Arc<DatasetStore>,
    config: &AppConfig,
    title: &str,
    limit: usize,
    posters: bool,
    json: bool,
) -> Result<()> {
    let recommendations: Vec<MovieRecommendation> = if posters {
        let orchestrator = RecommendationOrchestrator::new(store, config.poster_fetcher()?)
            .with_poster_timeout(config.poster_timeout());
        orchestrator
            .get_recommendations(title, limit)
            .await
            .map_err(|e| match e.downcast_ref::<NotFoundError>().cloned() {
                Some(not_found) => no_such_title(&not_found),
                None => e,
            })?
    } else {
        SimilarityRecommender::new(store)
            .recommend_scored(title, limit)
            .map_err(|e| no_such_title(&e))?
            .into_iter()
            .map(|rec| MovieRecommendation {
                movie_id: rec.movie_id,
                title: rec.title,
                score: rec.score,
                poster_url: String::new(),
            })
            .collect()
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&recommendations)?);
    } else {
        print_recommendations(title, &recommendations, posters);
    }
    Ok(())
}

fn no_such_title(err: &NotFoundError) -> anyhow::Error {
    anyhow!("{} (use `reel-recs search --title ...` to find the exact title)", err)
}

/// Handle the 'titles' command
fn handle_titles(store: &DatasetStore, limit: Option<usize>) {
    let titles = store.list_titles();
    let shown = limit.unwrap_or(titles.len()).min(titles.len());

    for (index, title) in titles.iter().take(shown).enumerate() {
        println!("{:>5}  {}", index.to_string().dimmed(), title);
    }
    if shown < titles.len() {
        println!("... and {} more", titles.len() - shown);
    }
}

/// Case-insensitive substring search, exact matches first, then catalog order
fn search_titles<'a>(store: &'a DatasetStore, query: &str) -> Vec<&'a MovieRecord> {
    let query_lower = query.to_lowercase();

    let mut matches: Vec<(u8, &MovieRecord)> = store
        .catalog()
        .iter()
        .filter_map(|movie| {
            let title_lower = movie.title.to_lowercase();
            if title_lower == query_lower {
                Some((0, movie))
            } else if title_lower.contains(&query_lower) {
                Some((1, movie))
            } else {
                None
            }
        })
        .collect();

    // Stable sort keeps catalog order within each group
    matches.sort_by_key(|(relevance, _)| *relevance);
    matches.into_iter().map(|(_, movie)| movie).collect()
}

/// Handle the 'search' command
fn handle_search(store: &DatasetStore, title: &str) {
    let matches = search_titles(store, title);

    println!("{}", format!("Search results for '{}':", title).bold().blue());
    if matches.is_empty() {
        println!("  no matching titles");
        return;
    }
    for movie in matches.iter().take(20) {
        println!("{}: {}", movie.movie_id, movie.title);
    }
    if matches.len() > 20 {
        println!("... and {} more", matches.len() - 20);
    }
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    store: Arc<DatasetStore>,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    if requests == 0 {
        return Err(anyhow!("--requests must be at least 1"));
    }
    let recommender = SimilarityRecommender::new(store.clone());
    let permits = Arc::new(Semaphore::new(concurrent.max(1)));

    // Pick random catalog titles to query
    let titles: Vec<String> = (0..requests)
        .map(|_| {
            let index = rand::random::<u32>() as usize % store.len();
            store.title_at(index).to_string()
        })
        .collect();

    // Use tokio::spawn to make concurrent requests
    let wall_clock = Instant::now();
    let mut handles = vec![];
    for title in titles {
        let recommender = recommender.clone();
        let permits = permits.clone();
        let handle = tokio::spawn(async move {
            let _permit = permits.acquire_owned().await?;
            let start = Instant::now();
            tokio::task::spawn_blocking(move || recommender.recommend(&title, 5)).await??;
            Ok::<_, anyhow::Error>(start.elapsed())
        });
        handles.push(handle);
    }

    // Wait for all tasks to complete and collect timings
    let mut timings = vec![];
    for handle in handles {
        let elapsed = handle.await??;
        timings.push(elapsed);
    }
    let total_time = wall_clock.elapsed();

    let latency_sum: Duration = timings.iter().sum();
    let avg_latency = latency_sum / (timings.len() as u32);
    timings.sort();
    let percentile = |p: f32| timings[((timings.len() as f32 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f32 / total_time.as_secs_f32();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Helper function to format and print recommendations
fn print_recommendations(title: &str, recommendations: &[MovieRecommendation], posters: bool) {
    println!("{}", format!("Movies similar to '{}':", title).bold().blue());
    if recommendations.is_empty() {
        println!("  no recommendations");
        return;
    }
    for (i, rec) in recommendations.iter().enumerate() {
        println!(
            "{}. {} - Similarity: {:.3}",
            (i + 1).to_string().green(),
            rec.title,
            rec.score
        );
        if posters {
            println!("   Poster: {}", rec.poster_url);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::SimilarityMatrix;

    fn create_test_store() -> DatasetStore {
        let catalog = ["Batman", "Batman Returns", "The Dark Knight", "batman"]
            .iter()
            .enumerate()
            .map(|(index, title)| MovieRecord {
                index,
                movie_id: index as u32,
                title: title.to_string(),
            })
            .collect();
        let matrix = SimilarityMatrix::from_flat(4, vec![0.5; 16]).unwrap();

        DatasetStore::from_parts(catalog, matrix).unwrap()
    }

    #[test]
    fn test_search_exact_matches_first() {
        let store = create_test_store();
        let titles: Vec<&str> = search_titles(&store, "BATMAN")
            .iter()
            .map(|m| m.title.as_str())
            .collect();

        assert_eq!(titles, vec!["Batman", "batman", "Batman Returns"]);
    }

    #[test]
    fn test_search_no_match() {
        let store = create_test_store();
        assert!(search_titles(&store, "Inception").is_empty());
    }
}
