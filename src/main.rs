use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_CONFIG: i32 = 4;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    /// Ranked list with score bars
    #[default]
    Table,
    /// Tab-separated rank, score, id, name
    Tsv,
    /// Ranking, vote tally and recommendation as JSON
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rank suppliers by weighted score (default if no subcommand)
    Rank {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Show the comparison matrix with the best score per criterion marked
    Matrix,
    /// Strengths and weaknesses of the top two suppliers, head to head
    Compare,
    /// Vote tally, leading supplier and team comments
    Votes,
    /// Decision summary combining scores and team votes
    Recommend,
    /// Interactive decision screen
    Tui,
    /// Create a config file and a starter session interactively
    Init,
}

#[derive(Parser, Debug)]
#[command(name = "offer-bro")]
#[command(about = "Supplier offer ranking by weighted multi-criteria scoring", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/offer-bro/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Path to session file (defaults to the config's `session` entry, then ~/.config/offer-bro/session.yaml)
    #[arg(short, long, global = true)]
    session: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    offer_bro::stderr_buffer::init_logging(cli.verbose);

    let command = cli.command.unwrap_or(Commands::Rank {
        format: OutputFormat::Table,
    });
    let start_time = Instant::now();
    let config_path = cli.config.map(PathBuf::from);

    // Init runs before any config or session exists
    if let Commands::Init = command {
        if let Err(e) = offer_bro::config::init::run_init_wizard(config_path) {
            eprintln!("Init failed: {:#}", e);
            std::process::exit(EXIT_FAILURE);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    // Load config
    let config = match offer_bro::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Load session
    let session_path = offer_bro::session::resolve_session_path(
        cli.session.map(PathBuf::from),
        config.session.as_deref(),
    );
    let session = match offer_bro::session::load_session(&session_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Session error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    let (session_name, mut state) = session.into_state();

    for warning in state.clamp_all() {
        log::warn!("{}", warning);
    }

    // Validate session at startup
    if let Err(errors) = offer_bro::scoring::validate_session(&state) {
        eprintln!("Session errors in {}:", session_path.display());
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }
    for warning in offer_bro::scoring::session_warnings(&state) {
        log::warn!("{}", warning);
    }

    let use_colors = offer_bro::output::should_use_colors();

    // Route based on subcommand
    match command {
        Commands::Rank { format } => {
            let ranked = state.ranked();
            if let Some(top) = ranked.first() {
                log::debug!(
                    "Top of {} ranked: {} ({:.2})",
                    ranked.len(),
                    top.candidate.candidate_name,
                    top.score
                );
            }
            match format {
                OutputFormat::Table => {
                    println!("{}", offer_bro::output::format_ranking_table(&ranked, use_colors))
                }
                OutputFormat::Tsv => {
                    let tsv = offer_bro::output::format_tsv(&ranked);
                    if !tsv.is_empty() {
                        println!("{}", tsv);
                    }
                }
                OutputFormat::Json => match offer_bro::output::format_json(&session_name, &state) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Output error: {:#}", e);
                        std::process::exit(EXIT_FAILURE);
                    }
                },
            }
        }
        Commands::Matrix => println!("{}", offer_bro::output::format_matrix(&state, use_colors)),
        Commands::Compare => {
            println!("{}", offer_bro::output::format_comparison(&state, use_colors))
        }
        Commands::Votes => {
            println!("{}", offer_bro::output::format_vote_summary(&state, use_colors))
        }
        Commands::Recommend => {
            println!("{}", offer_bro::output::format_decision_summary(&state, use_colors))
        }
        Commands::Tui => {
            let theme_colors = offer_bro::tui::resolve_theme(config.theme);
            let app = offer_bro::tui::App::new(
                session_name,
                state,
                config.effective_voter(),
                theme_colors,
            );
            match offer_bro::tui::run_tui(app).await {
                Ok(app) => {
                    println!(
                        "{}",
                        offer_bro::output::format_decision_summary(&app.state, use_colors)
                    );
                }
                Err(e) => {
                    eprintln!("TUI error: {:#}", e);
                    std::process::exit(EXIT_FAILURE);
                }
            }
        }
        // Handled before loading the session
        Commands::Init => {}
    }

    log::debug!("Done in {:?}", start_time.elapsed());
    std::process::exit(EXIT_SUCCESS);
}
