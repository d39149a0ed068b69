// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless runner: flattens every node group in a scene file.
//!
//! Drives the operator the way the host would, delivering timer events until
//! the batch finishes, then writes the scene back.

use clap::Parser;
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use ungrouper_app::cli::Cli;
use ungrouper_app::operator::{StatusLevel, StatusReport};
use ungrouper_app::{
    HostEvent, OperatorError, OperatorResult, Scene, SceneError, StatusChannel, TimerRegistry,
    UngroupSceneOperator, UngrouperSettings,
};
use ungrouper_graph::SpliceUngroup;

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error("Failed to load settings: {0}")]
    Settings(#[from] std::io::Error),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Operator(#[from] OperatorError),

    #[error("Invalid log filter: {0}")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        tracing::error!("Ungrouper failed: {e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), RunError> {
    let mut settings = UngrouperSettings::load_or_default(&cli.settings_path())?;
    cli.apply(&mut settings);

    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => tracing_subscriber::EnvFilter::try_new(&settings.log_filter)?,
    };
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Ungrouper v{}", env!("CARGO_PKG_VERSION"));

    let mut scene = Scene::load(&cli.scene)?;
    tracing::info!(
        "Loaded {} with {} object(s) and {} material(s)",
        cli.scene.display(),
        scene.objects.len(),
        scene.materials.len()
    );

    let mut context = scene.editor_context();
    let mut timers = TimerRegistry::new();
    let (status, sender) = StatusChannel::new();
    let interval = Duration::from_millis(settings.timer_interval_ms);
    let mut operator = UngroupSceneOperator::new(SpliceUngroup::new(), settings, sender);

    let started = operator.execute(&mut scene, &context, &mut timers);
    forward(status.drain());
    started?;

    while let Some(timer) = operator.timer() {
        std::thread::sleep(interval);
        let result = operator.modal(&HostEvent::Timer(timer), &mut scene, &mut context, &mut timers);
        forward(status.drain());
        if result == OperatorResult::Finished {
            break;
        }
    }

    let output = cli.output_path();
    scene.save(output)?;
    tracing::info!("Saved {}", output.display());
    Ok(())
}

fn forward(reports: Vec<StatusReport>) {
    for report in reports {
        match report.level {
            StatusLevel::Info => tracing::info!("{}", report.message),
            StatusLevel::Warning => tracing::warn!("{}", report.message),
            StatusLevel::Error => tracing::error!("{}", report.message),
        }
    }
}
