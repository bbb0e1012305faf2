//! Touchline CLI
//!
//! 로스터 → 경기 실행, 또는 랜덤 로스터 생성

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "touchline")]
#[command(about = "Run simulated football matches", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Play one match to full time
    Run {
        /// RNG seed for team generation and the match itself
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Roster JSON with `home` and `away` sections (generated when omitted)
        #[arg(long)]
        roster: Option<PathBuf>,

        /// Engine config override (.yaml / .yml / .json)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Match length in seconds (overrides the config)
        #[arg(long)]
        duration: Option<f32>,

        /// Fixed timestep in seconds
        #[arg(long, default_value_t = 0.05)]
        dt: f32,

        /// Directory for the text match log
        #[arg(long)]
        log: Option<PathBuf>,
    },

    /// Write a generated roster JSON for both sides
    Generate {
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Home formation (4-4-2, 4-3-3, 3-5-2)
        #[arg(long, default_value = "4-4-2")]
        formation: String,

        /// Away formation, defaults to the home one
        #[arg(long)]
        away_formation: Option<String>,

        /// Output JSON path
        #[arg(long)]
        out: PathBuf,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new("touchline_core=info,touchline=info")
                }),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { seed, roster, config, duration, dt, log } => {
            run_match(seed, roster.as_deref(), config.as_deref(), duration, dt, log.as_deref())?;
        }
        Commands::Generate { seed, formation, away_formation, out } => {
            let away_formation = away_formation.unwrap_or_else(|| formation.clone());
            let (home, away) = generate_teams(seed, &formation, &away_formation)?;
            touchline_core::models::save_teams_to_json(&out, &home, &away)
                .with_context(|| format!("writing roster to {}", out.display()))?;
            println!("📄 Roster written to: {}", out.display());
            println!(
                "   {} ({}) vs {} ({})",
                home.name, home.formation.name, away.name, away.formation.name
            );
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn generate_teams(
    seed: u64,
    home_formation: &str,
    away_formation: &str,
) -> Result<(touchline_core::Team, touchline_core::Team)> {
    use rand::SeedableRng;

    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
    let home = touchline_core::generate_team(&mut rng, 1, None, home_formation, 1)
        .context("generating home team")?;
    let away = touchline_core::generate_team(&mut rng, 2, None, away_formation, 100)
        .context("generating away team")?;
    Ok((home, away))
}

#[cfg(feature = "cli")]
fn run_match(
    seed: u64,
    roster: Option<&Path>,
    config: Option<&Path>,
    duration: Option<f32>,
    dt: f32,
    log_dir: Option<&Path>,
) -> Result<()> {
    use std::sync::Arc;
    use touchline_core::config::DEFAULT_CONFIG;
    use touchline_core::{EngineConfig, EventKind, MatchDebugger, MatchEngine};

    if !dt.is_finite() || dt <= 0.0 {
        anyhow::bail!("--dt must be positive, got {}", dt);
    }

    let (home, away) = match roster {
        Some(path) => touchline_core::load_teams_from_json(path)
            .with_context(|| format!("loading roster {}", path.display()))?,
        None => generate_teams(seed, "4-4-2", "4-4-2")?,
    };

    let shared = match (config, duration) {
        (None, None) => Arc::clone(&*DEFAULT_CONFIG),
        _ => {
            let mut cfg = match config {
                Some(path) => EngineConfig::load(path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => EngineConfig::default(),
            };
            if let Some(d) = duration {
                cfg.simulation.match_duration = d.max(0.0);
            }
            cfg.into_shared()
        }
    };

    let mut engine = MatchEngine::new(home, away, shared, seed).context("setting up match")?;
    if let Some(dir) = log_dir {
        let debugger = MatchDebugger::create_in_dir(dir)
            .with_context(|| format!("opening match log in {}", dir.display()))?;
        engine.attach_sink(Box::new(debugger));
    }

    let state = engine.state();
    println!("⚽ {} vs {} (seed {})", state.home_team.name, state.away_team.name, seed);
    tracing::info!("running match at dt={}", dt);

    let ticks = engine.run_to_full_time(dt);
    engine.stop().context("closing match log")?;

    let state = engine.state();
    let (h, a) = engine.score();
    println!("\n✅ Full time after {} ticks ({:.0}s)", ticks, engine.match_time());
    println!("   {} {} - {} {}", state.home_team.name, h, a, state.away_team.name);

    let events = engine.events();
    for kind in [EventKind::Shot, EventKind::Pass, EventKind::Tackle, EventKind::SaveAttempt] {
        println!("   {:<13} {}", kind.as_str(), events.count(kind));
    }
    for goal in events.of_kind(EventKind::Goal) {
        println!("   {}", goal);
    }
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("touchline CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
