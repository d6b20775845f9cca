use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::BufRead;

use civic_client::api::{ApiClient, ApiError};
use civic_client::auth::AuthState;
use civic_client::config::{ClientConfig, ConfigManager};
use civic_client::fact_check::FactCheckFilter;
use civic_client::logging::{init_logging, LogConfig};
use civic_client::storage::FileStorageAdapter;
use civic_client::views;
use civic_client::votes::VoteController;
use civic_types::{ContentKind, JurisdictionLevel, Verdict, VoteDirection};

/// Civic - follow your representatives, read fact-checks, vote on what matters
#[derive(Parser)]
#[command(name = "civic")]
#[command(about = "Command line client for the Civic platform")]
#[command(version)]
struct Cli {
    /// Civic API URL (overrides CIVIC_API_URL and saved config)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Analysis service URL (overrides CIVIC_ANALYSIS_URL and saved config)
    #[arg(long, global = true)]
    analysis_url: Option<String>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Log file path
    #[arg(long, global = true, default_value = "civic_client.log")]
    log_file: String,

    /// Wrap output at this many columns
    #[arg(long, global = true, default_value_t = views::DEFAULT_WIDTH)]
    width: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in with email and password
    Login {
        email: String,
        /// Password (prompted on stdin when omitted)
        #[arg(long, env = "CIVIC_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Vote on an item; repeating a vote withdraws it
    Vote {
        /// politician, post, poll or fact_check
        kind: String,
        id: String,
        /// up or down
        direction: String,
    },
    /// Show vote counts for an item
    Tally { kind: String, id: String },
    /// List published fact-checks
    FactChecks {
        /// Case-insensitive text to look for
        #[arg(long, short)]
        query: Option<String>,
        /// Only show this verdict (e.g. "mostly_false")
        #[arg(long)]
        verdict: Option<String>,
    },
    /// Ask the analysis service about a claim
    Check {
        #[arg(required = true)]
        claim: Vec<String>,
    },
    /// Show a politician's score breakdown
    Score { politician_id: String },
    /// List regions
    Regions {
        #[arg(long)]
        group: Option<String>,
    },
    /// List office types
    Offices {
        /// federal, state or local
        #[arg(long)]
        level: Option<String>,
    },
    /// About this service
    About,
    /// Privacy notice
    Privacy,
    /// Save endpoint URLs to ~/.civic/config.json
    Config {
        #[arg(long)]
        save_api_url: Option<String>,
        #[arg(long)]
        save_analysis_url: Option<String>,
    },
}

fn parse_kind(raw: &str) -> Result<ContentKind> {
    ContentKind::parse(raw).with_context(|| {
        format!(
            "Unknown content kind '{}'. Use politician, post, poll or fact_check",
            raw
        )
    })
}

fn read_password() -> Result<String> {
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn print_unavailable(what: &str, err: &ApiError) {
    log::error!("{} fetch failed: {}", what, err);
    println!("{}", views::unavailable(what));
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::minimal()
    }
    .with_file(&cli.log_file);
    init_logging(&log_config)?;

    let config_manager = ConfigManager::new()?;
    let endpoints = config_manager.resolve(cli.api_url.clone(), cli.analysis_url.clone())?;
    log::info!(
        "Using API {} and analysis service {}",
        endpoints.api_url,
        endpoints.analysis_url
    );

    let mut api = ApiClient::new(&endpoints.api_url, &endpoints.analysis_url);
    let mut auth = AuthState::new(Box::new(FileStorageAdapter::new()?));
    auth.restore()?;
    api.set_session_token(auth.token().map(str::to_string));

    let width = cli.width;
    match cli.command {
        Command::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => read_password()?,
            };
            let response = api
                .login(&email, &password)
                .await
                .context("Login failed")?;
            let name = response.user.name.clone();
            auth.set_credentials(response.user, response.session_token)?;
            println!("Signed in as {}", name);
        }
        Command::Logout => {
            if auth.is_authenticated() {
                if let Err(e) = api.logout().await {
                    log::warn!("Server logout failed: {}", e);
                }
            }
            auth.clear()?;
            println!("Signed out");
        }
        Command::Whoami => {
            if !auth.is_authenticated() {
                println!("Not signed in");
                return Ok(());
            }
            match api.validate_session().await {
                Ok(user) => {
                    let admin = if user.is_admin { " (operator)" } else { "" };
                    println!("{} <{}>{}", user.name, user.email, admin);
                }
                Err(ApiError::Unauthorized(_)) => {
                    auth.clear()?;
                    println!("Session expired; please log in again");
                }
                Err(e) => {
                    log::warn!("Session check failed: {}", e);
                    if let Some(user) = auth.user() {
                        println!("{} <{}> (not verified: server unreachable)", user.name, user.email);
                    }
                }
            }
        }
        Command::Vote {
            kind,
            id,
            direction,
        } => {
            let kind = parse_kind(&kind)?;
            let direction = VoteDirection::parse(&direction)
                .with_context(|| format!("Invalid vote direction '{}'. Use up or down", direction))?;

            let mut controller = VoteController::new(api);
            if auth.is_authenticated() {
                if let Err(e) = controller.load(&auth, kind, &id).await {
                    log::warn!("Could not load current tally: {}", e);
                }
            }
            let tally = controller.vote(&auth, kind, &id, direction).await?;
            print!("{}", views::render_tally(kind, &id, &tally));
        }
        Command::Tally { kind, id } => {
            let kind = parse_kind(&kind)?;
            let mut controller = VoteController::new(api);
            match controller.load(&auth, kind, &id).await {
                Ok(tally) => print!("{}", views::render_tally(kind, &id, &tally)),
                Err(e) => {
                    log::error!("Tally fetch failed: {}", e);
                    println!("{}", views::unavailable("Vote tally"));
                }
            }
        }
        Command::FactChecks { query, verdict } => {
            let verdict = match verdict {
                Some(raw) => Some(
                    Verdict::parse(&raw).with_context(|| format!("Unknown verdict '{}'", raw))?,
                ),
                None => None,
            };
            let filter = FactCheckFilter::new(query, verdict);
            match api.get_fact_checks().await {
                Ok(items) => print!("{}", views::render_fact_checks(&filter.apply(&items), width)),
                Err(e) => print_unavailable("Fact-checks", &e),
            }
        }
        Command::Check { claim } => {
            let claim = claim.join(" ");
            match api.check_claim(&claim).await {
                Ok(analysis) => print!("{}", views::render_analysis(&analysis, width)),
                Err(e) => print_unavailable("Claim analysis", &e),
            }
        }
        Command::Score { politician_id } => match api.get_score_breakdown(&politician_id).await {
            Ok(breakdown) => print!("{}", views::render_score_breakdown(&breakdown, width)),
            Err(e) => print_unavailable("Score breakdown", &e),
        },
        Command::Regions { group } => match api.get_regions(group.as_deref()).await {
            Ok(regions) => print!("{}", views::render_regions(&regions)),
            Err(e) => print_unavailable("Regions", &e),
        },
        Command::Offices { level } => {
            let level = match level {
                Some(raw) => Some(
                    JurisdictionLevel::parse(&raw)
                        .with_context(|| format!("Unknown level '{}'. Use federal, state or local", raw))?,
                ),
                None => None,
            };
            match api.get_offices(level).await {
                Ok(offices) => print!("{}", views::render_offices(&offices, width)),
                Err(e) => print_unavailable("Offices", &e),
            }
        }
        Command::About => print!("{}", views::about_page(width)),
        Command::Privacy => print!("{}", views::privacy_page(width)),
        Command::Config {
            save_api_url,
            save_analysis_url,
        } => {
            let mut config = config_manager.load()?.unwrap_or(ClientConfig {
                api_url: None,
                analysis_url: None,
                last_updated: chrono::Utc::now(),
            });
            if save_api_url.is_some() {
                config.api_url = save_api_url;
            }
            if save_analysis_url.is_some() {
                config.analysis_url = save_analysis_url;
            }
            config.last_updated = chrono::Utc::now();
            config_manager.save(&config)?;
            println!("API: {}", config.api_url.as_deref().unwrap_or("(default)"));
            println!(
                "Analysis: {}",
                config.analysis_url.as_deref().unwrap_or("(default)")
            );
        }
    }

    Ok(())
}
