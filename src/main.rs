use anyhow::{Context, Result};
use board_autopilot::browser::ChromeSurface;
use board_autopilot::core::settings::{
    default_settings_path, load_settings_or_default, save_settings,
};
use board_autopilot::core::{init_logging, load_settings, AutopilotSettings};
use board_autopilot::game::{TurnSync, UciEngine};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

/// Plays chess in a browser tab with moves from a UCI engine
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Settings file; defaults to settings.json in the user config directory
    #[arg(long, env = "AUTOPILOT_CONFIG")]
    config: Option<PathBuf>,

    /// UCI engine binary
    #[arg(long, env = "AUTOPILOT_ENGINE")]
    engine: Option<PathBuf>,

    /// Search depth per move
    #[arg(long, env = "AUTOPILOT_DEPTH")]
    depth: Option<u32>,

    /// Engine worker threads
    #[arg(long, env = "AUTOPILOT_THREADS")]
    threads: Option<usize>,

    /// Page to play on
    #[arg(long, env = "AUTOPILOT_URL")]
    url: Option<String>,

    /// Run the browser without a window
    #[arg(long, default_value_t = false)]
    headless: bool,

    /// Give up waiting for an opponent reply after this many seconds
    #[arg(long, env = "AUTOPILOT_OPPONENT_TIMEOUT")]
    opponent_timeout: Option<u64>,

    /// Debug logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Write the effective settings to the settings file and exit
    #[arg(long, default_value_t = false)]
    write_config: bool,
}

impl Cli {
    /// Command-line values win over the settings file
    fn apply(&self, settings: &mut AutopilotSettings) {
        if let Some(engine) = &self.engine {
            settings.engine.path = engine.clone();
        }
        if let Some(depth) = self.depth {
            settings.engine.depth = depth;
        }
        if let Some(threads) = self.threads {
            settings.engine.threads = threads;
        }
        if let Some(url) = &self.url {
            settings.url = url.clone();
        }
        if self.headless {
            settings.browser.headless = true;
        }
        if self.opponent_timeout.is_some() {
            settings.opponent_reply_timeout_secs = self.opponent_timeout;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose).context("failed to initialise logging")?;

    if cli.write_config {
        // The target file may not exist yet
        let path = cli.config.clone().unwrap_or_else(default_settings_path);
        let mut settings = load_settings_or_default(&path);
        cli.apply(&mut settings);
        save_settings(&settings, &path)
            .with_context(|| format!("failed to write settings to {:?}", path))?;
        println!("Settings written to {}", path.display());
        return Ok(());
    }

    let mut settings = load_settings(cli.config.as_deref()).context("failed to load settings")?;
    cli.apply(&mut settings);

    let mut engine = UciEngine::spawn(&settings.engine)
        .await
        .with_context(|| format!("failed to start engine {:?}", settings.engine.path))?;

    let surface = ChromeSurface::launch(&settings.browser)
        .await
        .context("failed to launch browser")?;
    surface
        .open(&settings.url)
        .await
        .with_context(|| format!("failed to open {}", settings.url))?;

    info!("Press Play in the browser to start");
    surface
        .wait_for_start(&settings.selectors)
        .await
        .context("failed waiting for the game to start")?;

    let summary = TurnSync::new(
        &surface,
        &mut engine,
        settings.selectors.clone(),
        settings.timing,
        settings.engine.depth,
    )
    .with_opponent_timeout(settings.opponent_reply_timeout())
    .run()
    .await
    .context("turn-sync loop aborted")?;

    match summary.end {
        Some(end) => println!("Game over: {} ({} moves played)", end, summary.moves_played),
        None => println!("Stopped after {} moves", summary.moves_played),
    }
    println!("Final position: {}", summary.final_position);
    if summary.log_regressions > 0 {
        warn!(
            "Move list shrank {} time(s) during the game",
            summary.log_regressions
        );
    }

    if let Err(e) = engine.quit().await {
        warn!("Engine did not shut down cleanly: {}", e);
    }
    if let Err(e) = surface.close().await {
        warn!("Browser did not shut down cleanly: {}", e);
    }
    Ok(())
}
