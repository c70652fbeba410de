//! Stagehand Demo
//!
//! Terminal walkthrough of scene managers, directors and transitions.
//!
//! Usage:
//!   stagehand-demo [OPTIONS] [DEMO]
//!
//! Demos:
//!   simple    Direct switch, fade and slide (default)
//!   timed     Slides paced by tick count and by wall clock
//!   aware     Transition-aware scenes
//!   director  Rule-driven scene changes
//!
//! Options:
//!   -c, --config <PATH>    Config file (default: ~/.config/stagehand/stagehand.toml)
//!   -t, --tps <TPS>        Tick rate override [env: STAGEHAND_TPS]
//!   -l, --log-file <PATH>  Log file (default: $TMPDIR/stagehand-demo.log)

mod app;
mod render;
mod scenes;

use std::fs::File;
use std::io::{self, IsTerminal};
use std::panic;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use stagehand_core::{default_config_path, load_config_from_path, ConfigOverrides, StageConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use app::{App, Demo};

const TTY_HINT: &str = "Run it interactively, or over SSH with `ssh -t`.";

/// Stagehand demo - scene lifecycle orchestration in the terminal
#[derive(Parser, Debug)]
#[command(name = "stagehand-demo")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Demo to run
    #[arg(value_enum, default_value_t = Demo::Simple)]
    demo: Demo,

    /// Config file path
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Host tick rate, overrides the config file
    #[arg(short, long, env = "STAGEHAND_TPS", value_name = "TPS")]
    tps: Option<f64>,

    /// Log file path
    #[arg(short, long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Log to a file; stdout belongs to the terminal UI
    let log_path = args
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("stagehand-demo.log"));
    let log_file = File::create(&log_path)
        .with_context(|| format!("cannot create log file {}", log_path.display()))?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(log_file))
                .with_ansi(false)
                .with_target(false),
        )
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("stagehand_core=info,stagehand_demo=info")),
        )
        .init();

    let config = load(&args)?;
    tracing::info!(
        demo = %args.demo,
        ticks_per_second = config.ticks_per_second,
        source = %config.source(),
        transitions = config.transitions.len(),
        "configuration loaded"
    );

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: stagehand-demo requires a terminal (TTY)");
        eprintln!();
        eprintln!("{TTY_HINT}");
        std::process::exit(1);
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(args.demo, config);
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        tracing::error!(error = %e, "demo stopped");
    }
    result
}

/// Config file, then environment, then command line
fn load(args: &Args) -> anyhow::Result<StageConfig> {
    let path = args.config.clone().or_else(default_config_path);
    let mut config = load_config_from_path(path)?;

    let mut overrides = ConfigOverrides::new();
    if let Some(tps) = args.tps {
        overrides = overrides.with_ticks_per_second(tps);
    }
    overrides.apply(&mut config);
    config.validate()?;

    Ok(config)
}
