use std::{path::PathBuf, sync::Arc};

use audio_feedback_core::{
    AppConfig, ChangeFeedback, FeedbackBinding, SimulatedBackend, SoundCatalog,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

fn main() -> audio_feedback_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::demo(),
    };
    let catalog = config.catalog()?;

    match cli.command {
        Commands::Catalog => run_catalog(&catalog),
        Commands::Simulate {
            sound,
            triggers,
            interval,
            length,
            reset_between,
        } => run_simulate(&catalog, &sound, triggers, interval, length, reset_between),
        Commands::Feedback {
            sound,
            values,
            length,
        } => run_feedback(&catalog, &sound, values, length),
    }
}

fn run_catalog(catalog: &SoundCatalog) -> audio_feedback_core::Result<()> {
    for name in catalog.names() {
        let key = catalog.require(name)?;
        let policy = catalog.policy(name).copied().unwrap_or_default();
        println!(
            "{name}: {key} (delay {:.3}s, repeat {:?}, retrigger {:?})",
            policy.delay_seconds(),
            policy.repeat(),
            policy.retrigger()
        );
    }
    Ok(())
}

fn run_simulate(
    catalog: &SoundCatalog,
    sound: &str,
    triggers: u32,
    interval: f64,
    length: f64,
    reset_between: bool,
) -> audio_feedback_core::Result<()> {
    catalog.require(sound)?;
    let backend = simulated_backend(catalog, length);
    let mut controller = catalog.controller(sound, backend.clone());
    tracing::info!(sound, triggers, interval, reset_between, "running simulation");

    for index in 0..triggers {
        if reset_between && index > 0 {
            controller.reset();
        }
        controller.trigger();
        tracing::info!(index, state = ?controller.state(), "triggered");
        backend.advance(interval.max(0.0));
    }
    drop(controller);

    report(&backend);
    Ok(())
}

fn run_feedback(
    catalog: &SoundCatalog,
    sound: &str,
    values: Vec<String>,
    length: f64,
) -> audio_feedback_core::Result<()> {
    let backend = simulated_backend(catalog, length);
    let binding = FeedbackBinding::new(catalog.require(sound)?.clone());
    let mut feedback = ChangeFeedback::new(binding);

    let mut values = values.into_iter();
    let Some(initial) = values.next() else {
        return Err("at least one value is required".into());
    };
    feedback.on_appear(&backend, initial);

    for value in values {
        let fired = feedback.observe(value.clone());
        tracing::info!(value = %value, fired, "observed value");
        backend.advance(0.1);
    }
    feedback.on_disappear();
    drop(feedback);

    report(&backend);
    Ok(())
}

fn simulated_backend(catalog: &SoundCatalog, length: f64) -> Arc<SimulatedBackend> {
    let backend = SimulatedBackend::new();
    for name in catalog.names() {
        if let Some(key) = catalog.key(name) {
            backend.register(key.as_str(), length);
        }
    }
    Arc::new(backend)
}

fn report(backend: &SimulatedBackend) {
    for call in backend.calls() {
        tracing::info!(?call, "backend call");
    }
    tracing::info!(
        accepted_starts = backend.accepted_starts(),
        live_handles = backend.live_handles(),
        "simulation finished"
    );
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Trigger-driven sound feedback playground", long_about = None)]
struct Cli {
    /// JSON file describing the sound catalog. Defaults to a built-in demo.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the configured sounds and their playback policies.
    Catalog,
    /// Trigger a sound repeatedly against the simulated backend.
    Simulate {
        /// Catalog name of the sound to trigger.
        sound: String,
        /// Number of triggers to issue.
        #[arg(short = 'n', long, default_value_t = 3)]
        triggers: u32,
        /// Simulated seconds between triggers.
        #[arg(short, long, default_value_t = 0.1)]
        interval: f64,
        /// Length in seconds given to every simulated sound.
        #[arg(short, long, default_value_t = 1.0)]
        length: f64,
        /// Reset the controller before every trigger after the first.
        #[arg(long)]
        reset_between: bool,
    },
    /// Mount a change-driven feedback, feed it values, then unmount it.
    Feedback {
        /// Catalog name of the sound to play.
        sound: String,
        /// Values observed in order. The first is the mount value.
        #[arg(long, value_delimiter = ',', required = true)]
        values: Vec<String>,
        /// Length in seconds given to every simulated sound.
        #[arg(short, long, default_value_t = 1.0)]
        length: f64,
    },
}
