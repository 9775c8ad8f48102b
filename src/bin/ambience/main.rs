//! ambience - layered procedural noise in the terminal
//!
//! Run with: cargo run --features serde -- --state ambience.json --log ambience.log

mod app;
mod ui;

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
    sync::Mutex,
};

use ambience::{registry::FileStore, AudioEngine, EngineConfig, SoundRegistry};
use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};

use app::App;

#[derive(Parser)]
#[command(name = "ambience")]
#[command(about = "Brown noise, rain and ocean waves, mixed to taste", long_about = None)]
struct Cli {
    /// JSON file holding each sound's volume and playing state
    #[arg(short, long, default_value = "ambience.json")]
    state: PathBuf,

    /// Write logs to this file (the terminal belongs to the UI)
    #[arg(short, long)]
    log: Option<PathBuf>,

    /// JSON engine configuration (sample rate, master level, meter capacity)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    if let Some(path) = &cli.log {
        let file = File::create(path)
            .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    }

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    let store = FileStore::open(&cli.state)
        .wrap_err_with(|| format!("failed to open state file {}", cli.state.display()))?;
    let registry = SoundRegistry::new(AudioEngine::with_device(config), store);

    let mut terminal = ratatui::init();
    let result = App::new(registry).run(&mut terminal);
    ratatui::restore();
    result
}

fn load_config(path: &Path) -> EyreResult<EngineConfig> {
    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&text).wrap_err("invalid engine configuration")
}
