use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use scheduler::{Clock, SystemClock};
use seedconfig::{ConfigBuilder, ImageCatalog, PaletteCatalog, Settings};
use stage::{FsImageLoader, Platform, Size};
use tracing_subscriber::EnvFilter;

use crate::cli::{frame_period, RunArgs};
use crate::headless::HeadlessFactory;
use crate::orchestrator::{Orchestrator, OrchestratorOptions};
use crate::paths::AppPaths;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Reads `--config FILE` if given, otherwise `seedpaint.toml` in the config dir.
pub fn load_settings(paths: &AppPaths, explicit: Option<&Path>) -> Result<Settings> {
    let path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| paths.settings_file());
    if explicit.is_some() && !path.exists() {
        anyhow::bail!("settings file {} does not exist", path.display());
    }
    let settings = Settings::load_or_default(&path)
        .with_context(|| format!("failed to load settings from {}", path.display()))?;
    tracing::debug!(path = %path.display(), ?settings, "resolved settings");
    Ok(settings)
}

/// Palette catalog from the flag, the settings file, or the built-in set.
pub fn config_builder(
    settings: &Settings,
    palettes: Option<&Path>,
    debug_luma: bool,
) -> Result<ConfigBuilder> {
    let palettes = match palettes.or(settings.catalog.palettes.as_deref()) {
        Some(path) => PaletteCatalog::from_path(path)
            .with_context(|| format!("failed to load palettes from {}", path.display()))?,
        None => PaletteCatalog::builtin().context("built-in palette catalog is invalid")?,
    };
    let mut defaults = settings.sketch_defaults();
    if debug_luma {
        defaults.debug_luma = true;
    }
    Ok(ConfigBuilder::new(palettes, ImageCatalog::builtin(), defaults))
}

pub fn run(args: RunArgs) -> Result<()> {
    let paths = AppPaths::discover()?;
    let settings = load_settings(&paths, args.config.as_deref())?;
    let builder = config_builder(&settings, args.palettes.as_deref(), args.debug_luma)?;

    let image_root: PathBuf = args
        .maps_dir
        .clone()
        .or_else(|| settings.catalog.maps_dir.clone())
        .unwrap_or_else(|| paths.image_root().to_path_buf());
    let platform = Platform::from_setting(args.platform.unwrap_or(settings.layout.platform));
    let container = args.container.unwrap_or_else(|| {
        let defaults = builder.defaults();
        Size::new(defaults.width, defaults.height)
    });
    tracing::debug!(
        config = %paths.config_dir().display(),
        data = %paths.data_dir().display(),
        images = %image_root.display(),
        ?platform,
        %container,
        "resolved seedpaint paths"
    );

    let factory = HeadlessFactory::new();
    let clock = SystemClock;
    let mut orchestrator = Orchestrator::new(
        builder,
        Arc::new(FsImageLoader::new(image_root)),
        Arc::new(factory.clone()),
        OrchestratorOptions {
            swap_interval: settings.schedule.swap_interval,
            image_timeout: settings.schedule.image_timeout(),
            platform,
        },
        clock.now(),
    )
    .context("invalid schedule")?;
    orchestrator.resize(container);

    let started = clock.now();
    let config = orchestrator.randomize(args.seed.as_deref(), started);
    tracing::info!(
        seed = %config.seed_name,
        fps = args.fps,
        duration = ?args.duration,
        swap_interval = ?settings.schedule.swap_interval,
        "seedpaint started"
    );

    let frame_period = frame_period(args.fps).map_err(anyhow::Error::msg)?;
    let deadline = args.duration.and_then(|duration| deadline(started, duration));
    loop {
        let now = clock.now();
        if deadline.is_some_and(|deadline| now >= deadline) {
            break;
        }
        orchestrator.frame(now);

        let after = clock.now();
        if let Some(next) = now.checked_add(frame_period) {
            thread::sleep(next.saturating_duration_since(after));
        }
    }

    let [foreground, background] = orchestrator.states();
    tracing::info!(
        phase = %orchestrator.phase(),
        caption = %orchestrator.caption().text,
        ?foreground,
        ?background,
        placement = ?orchestrator.placement(orchestrator.phase()),
        total_steps = factory.total_steps(),
        "seedpaint finished"
    );
    Ok(())
}

/// End of a bounded run. A duration past the end of the clock runs unbounded.
fn deadline(started: Instant, duration: Duration) -> Option<Instant> {
    let deadline = started.checked_add(duration);
    if deadline.is_none() {
        tracing::warn!(?duration, "run duration exceeds the clock; running until interrupted");
    }
    deadline
}
