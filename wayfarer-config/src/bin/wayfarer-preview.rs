//! Headless carousel preview: validate settings or run one carousel and
//! print its state as JSON lines.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use wayfarer_carousel::{
    AutoplayDriver, Carousel, CarouselConfig, CarouselKey, CarouselMessage,
    CarouselRegistry, update,
};
use wayfarer_config::{
    SettingsLoad, SettingsLoader, bootstrap_subscriber, init_tracing,
};

const FRAME: Duration = Duration::from_millis(16);

#[derive(Parser)]
#[command(
    name = "wayfarer-preview",
    about = "Run Wayfarer carousels headless and print their state"
)]
struct Cli {
    /// Carousel settings file (TOML or JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Autoplay override for every carousel, e.g. `5s` or `off`
    #[arg(long, global = true)]
    autoplay: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate settings and print the effective carousel configs
    Check,
    /// Simulate one carousel and print a JSON line per state change
    Run {
        #[arg(long, default_value = "destination_hero")]
        carousel: String,
        #[arg(long, default_value_t = 5)]
        slides: usize,
        #[arg(long, default_value_t = 1280.0)]
        viewport: f32,
        /// How long to run, e.g. `20s`
        #[arg(long, default_value = "20s", value_parser = humantime::parse_duration)]
        duration: Duration,
        /// Follow the wall clock instead of jumping between wake-ups
        #[arg(long)]
        realtime: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut loader = SettingsLoader::new();
    if let Some(path) = cli.config.clone() {
        loader = loader.with_config_path(path);
    }
    if let Some(raw) = cli.autoplay.clone() {
        loader = loader.with_autoplay_override(raw);
    }
    // The settings pick the real filter; until then log under `RUST_LOG`.
    let load =
        tracing::subscriber::with_default(bootstrap_subscriber(), || {
            loader.load()
        })?;

    init_tracing(&load.settings.logging)?;
    load.warnings.log();
    tracing::info!(target: "wayfarer::config", source = %load.source, "loaded carousel settings");

    match cli.command {
        Command::Check => check(&load),
        Command::Run {
            carousel,
            slides,
            viewport,
            duration,
            realtime,
        } => {
            let config = *load.settings.get(&carousel).with_context(|| {
                format!("no carousel named `{carousel}` in {}", load.source)
            })?;
            let key = CarouselKey::from_preset_name(&carousel)
                .unwrap_or(CarouselKey::Custom("preview"));
            let items: Arc<[String]> =
                (1..=slides).map(|n| format!("slide-{n}")).collect();
            if realtime {
                run_realtime(key, items, config, viewport, duration).await
            } else {
                simulate(key, items, config, viewport, duration)
            }
        }
    }
}

fn check(load: &SettingsLoad) -> Result<()> {
    let report = json!({
        "source": load.source.to_string(),
        "carousels": load.settings.carousels,
        "warnings": load
            .warnings
            .items
            .iter()
            .map(|w| json!({ "message": w.message, "hint": w.hint }))
            .collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Step a virtual clock from one wake-up to the next, painting a frame
/// shortly after every visible change.
fn simulate(
    key: CarouselKey,
    items: Arc<[String]>,
    config: CarouselConfig,
    viewport: f32,
    duration: Duration,
) -> Result<()> {
    let start = Instant::now();
    let end = start + duration;
    let mut registry = CarouselRegistry::new();
    registry.ensure(key.clone(), items, config, viewport, start);
    emit(&registry, &key, Duration::ZERO)?;

    let mut now = start;
    while now < end {
        let painted =
            update(&mut registry, CarouselMessage::AnimationFrame, now)?;
        let ticked = update(&mut registry, CarouselMessage::Tick, now)?;
        if painted || ticked {
            emit(&registry, &key, now - start)?;
        }

        let mut next = registry.next_wake().unwrap_or(end);
        if painted || ticked {
            next = next.min(now + FRAME);
        }
        now = next.max(now + Duration::from_millis(1)).min(end);
    }
    Ok(())
}

/// Drive the carousel on the wall clock, with autoplay on its own task.
async fn run_realtime(
    key: CarouselKey,
    items: Arc<[String]>,
    config: CarouselConfig,
    viewport: f32,
    duration: Duration,
) -> Result<()> {
    let start = Instant::now();
    let interval = config.autoplay_interval();
    // The driver owns the countdown; the carousel only moves when told.
    let local = CarouselConfig {
        autoplay_ms: None,
        ..config
    };
    let mut registry = CarouselRegistry::new();
    registry.ensure(key.clone(), items, local, viewport, start);
    emit(&registry, &key, Duration::ZERO)?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    if let Some(interval) = interval {
        let tx = tx.clone();
        let target = key.clone();
        let driver = AutoplayDriver::start(interval, move || {
            tx.send(CarouselMessage::AutoAdvance(target.clone()))
                .map_err(|_| anyhow!("preview loop has shut down"))
        });
        // Hover, manual steps and unmount now reach the driver.
        registry
            .get_mut(&key)
            .ok_or_else(|| anyhow!("carousel {key:?} is not mounted"))?
            .attach_driver(driver);
    }

    let mut frames = tokio::time::interval(FRAME);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let deadline = tokio::time::sleep(duration);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            Some(message) = rx.recv() => {
                let now = Instant::now();
                if update(&mut registry, message, now)? {
                    emit(&registry, &key, now - start)?;
                }
            }
            _ = frames.tick() => {
                let now = Instant::now();
                let painted = update(&mut registry, CarouselMessage::AnimationFrame, now)?;
                let ticked = update(&mut registry, CarouselMessage::Tick, now)?;
                if painted || ticked {
                    emit(&registry, &key, now - start)?;
                }
            }
        }
    }

    registry.clear();
    Ok(())
}

fn emit(
    registry: &CarouselRegistry<String>,
    key: &CarouselKey,
    elapsed: Duration,
) -> Result<()> {
    let carousel: &Carousel<String> = registry
        .get(key)
        .ok_or_else(|| anyhow!("carousel {key:?} is not mounted"))?;
    let line = json!({
        "t_ms": elapsed.as_millis() as u64,
        "state": carousel.snapshot(),
        "offset": carousel.offset(),
        "transition": carousel.transition_css(),
        "active": carousel
            .logical_index()
            .and_then(|index| carousel.padded().logical().get(index)),
    });
    println!("{}", serde_json::to_string(&line)?);
    Ok(())
}
