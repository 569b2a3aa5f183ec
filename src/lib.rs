pub mod api;
pub mod cache;
pub mod clients;
pub mod config;
pub mod constants;
pub mod models;
pub mod render;
pub mod search;
pub mod services;
pub mod state;

use std::sync::Arc;
use tokio::signal;

use anyhow::Context;
use chrono::Utc;
use clients::SearchOptions;
pub use config::Config;
use services::search::AdvancedFilters;
use state::SharedState;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let mut log_level = config.general.log_level.clone();
    if config.general.suppress_connection_errors {
        log_level.push_str(",reqwest::retry=off,hyper_util=off");
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    match args[1].as_str() {
        "daemon" | "-d" | "--daemon" => run_daemon(config, prometheus_handle).await,

        "search" | "s" => {
            if args.len() < 3 {
                println!("Usage: newsdesk search <query>");
                return Ok(());
            }
            let query = args[2..].join(" ");
            cmd_search(&config, &query).await
        }

        "suggest" => {
            if args.len() < 3 {
                println!("Usage: newsdesk suggest <partial query>");
                return Ok(());
            }
            let query = args[2..].join(" ");
            cmd_suggest(&config, &query).await
        }

        "latest" | "l" => {
            let limit = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(10);
            cmd_latest(&config, limit).await
        }

        "analytics" => cmd_analytics(&config),

        "profile" => {
            match args.get(2).map(String::as_str) {
                Some("clear") => cmd_profile_clear(&config),
                _ => cmd_profile_show(&config),
            }
        }

        "init" | "--init" => {
            Config::create_default_if_missing()?;
            println!("✓ Config file created. Edit config.toml and run again.");
            Ok(())
        }

        "help" | "-h" | "--help" => {
            print_help();
            Ok(())
        }

        _ => {
            println!("Unknown command: {}", args[1]);
            println!();
            print_help();
            Ok(())
        }
    }
}

fn print_help() {
    println!("Newsdesk - Content Site Search Service");
    println!("Unified search across the article store and site originals");
    println!();
    println!("USAGE:");
    println!("  newsdesk <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("  search <query>    Run a unified search and print the ranked results");
    println!("  suggest <query>   Show typeahead suggestions for a partial query");
    println!("  latest [n]        Show the newest articles (default: 10)");
    println!("  analytics         Print the session analytics snapshot from disk");
    println!("  profile           Show the stored personalization profile");
    println!("  profile clear     Delete all personalization state");
    println!("  daemon            Run the HTTP API server");
    println!("  init              Create default config file");
    println!("  help              Show this help message");
    println!();
    println!("EXAMPLES:");
    println!("  newsdesk search \"chatgpt vs claude\"   # Ranked, merged results");
    println!("  newsdesk suggest clau                 # Completion candidates");
    println!("  newsdesk latest 5                     # Five newest store articles");
    println!("  newsdesk daemon                       # Serve the JSON API");
    println!();
    println!("CONFIG:");
    println!("  Edit config.toml to point at your article store and tune search.");
}

async fn cmd_search(config: &Config, query: &str) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone())?;

    let options = SearchOptions {
        limit: config.search.default_limit,
        include_static: config.search.include_static,
        ..SearchOptions::default()
    };

    let results = state
        .search_service
        .unified_search(query, &options, &AdvancedFilters::default())
        .await;

    if let Some(err) = &results.error {
        println!("⚠ Article store unavailable: {err}");
        println!("  Showing original content only.");
        println!();
    }

    if results.results.is_empty() {
        println!("No results for '{}'", results.query);
        return Ok(());
    }

    println!(
        "{} results for '{}' ({} shown, {} ms{})",
        results.total,
        results.query,
        results.results.len(),
        results.took_ms,
        if results.cache_hit { ", cached" } else { "" }
    );
    println!("{:-<70}", "");

    let now = Utc::now();
    for ranked in &results.results {
        let article = &ranked.article;
        let tag = match ranked.content_type {
            models::ContentType::Original => " [ORIGINAL]",
            models::ContentType::Rss => "",
        };
        let age = article
            .pub_date
            .map_or_else(String::new, |d| format!(" | {}", render::format_time_ago(d, now)));

        println!("• {}{}", article.display_title(), tag);
        println!(
            "  {} | {} min read{} | score {:.1}",
            article.display_source(),
            article.read_time_minutes(),
            age,
            ranked.boosted_score()
        );
    }

    Ok(())
}

async fn cmd_suggest(config: &Config, query: &str) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone())?;
    let suggestions = state
        .suggest_service
        .suggest(query, config.search.suggestion_limit)
        .await;

    if suggestions.is_empty() {
        println!("No suggestions for '{query}'");
        return Ok(());
    }

    for suggestion in suggestions {
        println!("{suggestion}");
    }
    Ok(())
}

async fn cmd_latest(config: &Config, limit: usize) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone())?;
    let articles = state.search_service.latest(limit).await?;

    if articles.is_empty() {
        println!("No articles in the store.");
        return Ok(());
    }

    println!("Latest Articles ({})", articles.len());
    println!("{:-<70}", "");

    let now = Utc::now();
    for article in articles {
        let age = article
            .pub_date
            .map_or_else(|| "unknown date".to_string(), |d| render::format_time_ago(d, now));
        println!("• {}", article.display_title());
        println!("  {} | {}", article.display_source(), age);
    }

    Ok(())
}

fn cmd_analytics(config: &Config) -> anyhow::Result<()> {
    let path = std::path::Path::new(&config.general.data_path).join("analytics.json");
    if !path.exists() {
        println!("No analytics snapshot yet. Run some searches or start the daemon.");
        return Ok(());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    println!("{content}");
    Ok(())
}

fn cmd_profile_show(config: &Config) -> anyhow::Result<()> {
    let profiles = services::ProfileStore::open(&config.general.data_path)?;
    let profile = profiles.snapshot();

    println!("Personalization Profile");
    println!("{:-<70}", "");
    println!("Created:      {}", profile.created);
    println!("Last active:  {}", profile.last_active);
    println!("Searches:     {}", profile.search_history.len());

    let mut interests: Vec<_> = profile.interests.iter().collect();
    interests.sort_by(|a, b| b.1.cmp(a.1));
    if !interests.is_empty() {
        println!();
        println!("Top interests:");
        for (term, count) in interests.iter().take(10) {
            println!("  {count:>4}  {term}");
        }
    }

    if !profile.preferred_sources.is_empty() {
        println!();
        println!("Preferred sources:");
        for source in &profile.preferred_sources {
            println!("  • {source}");
        }
    }

    let recent = profiles.recent_searches();
    if !recent.is_empty() {
        println!();
        println!("Recent searches:");
        for query in recent.iter().take(10) {
            println!("  • {query}");
        }
    }

    Ok(())
}

fn cmd_profile_clear(config: &Config) -> anyhow::Result<()> {
    let profiles = services::ProfileStore::open(&config.general.data_path)?;
    profiles.clear();
    println!("✓ Personalization state cleared.");
    Ok(())
}

async fn run_daemon(
    config: Config,
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
) -> anyhow::Result<()> {
    info!(
        "Newsdesk v{} starting in daemon mode...",
        env!("CARGO_PKG_VERSION")
    );

    let api_state = api::create_app_state_from_config(config.clone(), prometheus_handle)?;

    let flush_handle = {
        let analytics = Arc::clone(&api_state.shared.analytics);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(constants::intervals::ANALYTICS_FLUSH);
            loop {
                interval.tick().await;
                analytics.flush();
            }
        })
    };

    let server_handle: Option<tokio::task::JoinHandle<()>> = if config.server.enabled {
        let port = config.server.port;
        info!("Starting Web API on port {}", port);

        let app = api::router(Arc::clone(&api_state)).await;
        let addr = format!("0.0.0.0:{port}");
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        Some(tokio::spawn(async move {
            info!("🌐 Web Server running at http://0.0.0.0:{}", port);
            if let Err(e) = axum::serve(listener, app).await {
                error!("Web server error: {}", e);
            }
        }))
    } else {
        None
    };

    info!("Daemon running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }

    api_state.shared.analytics.flush();

    flush_handle.abort();
    if let Some(handle) = server_handle {
        handle.abort();
    }
    info!("Daemon stopped");

    Ok(())
}
