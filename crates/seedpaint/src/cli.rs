use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use seedconfig::PlatformSetting;
use stage::Size;

#[derive(Parser, Debug)]
#[command(
    name = "seedpaint",
    author,
    version,
    about = "Seed-driven generative painting on two alternating surfaces",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Seed for the first configuration; a random one is generated when absent.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<String>,

    /// Settings file to use instead of `seedpaint.toml` in the config directory.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Stop after this long (e.g. `90s`, `5m`); runs until interrupted when absent.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub duration: Option<Duration>,

    /// Host frame rate driving both loops.
    #[arg(long, value_name = "FPS", default_value_t = 60.0, value_parser = parse_fps)]
    pub fps: f32,

    /// Container the surfaces are letterboxed into (e.g. `1920x1080`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_container)]
    pub container: Option<Size>,

    /// Layout quirk class: `auto`, `standard`, or `quirky-fullscreen`.
    #[arg(long, value_name = "PLATFORM", value_parser = parse_platform)]
    pub platform: Option<PlatformSetting>,

    /// Directory that background image paths are resolved against.
    #[arg(long, value_name = "DIR")]
    pub maps_dir: Option<PathBuf>,

    /// Palette catalog (JSON array of colour arrays) replacing the built-in one.
    #[arg(long, value_name = "FILE")]
    pub palettes: Option<PathBuf>,

    /// Render the luminance debug view instead of animating.
    #[arg(long)]
    pub debug_luma: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the configuration a seed expands to as JSON.
    Config(ConfigArgs),
    /// Print resolved config and data directories.
    Paths,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Seed to expand; a random one is generated when absent.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<String>,

    /// Settings file to use instead of `seedpaint.toml` in the config directory.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Palette catalog replacing the built-in one.
    #[arg(long, value_name = "FILE")]
    pub palettes: Option<PathBuf>,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("duration must not be empty".to_string());
    }
    if let Ok(secs) = trimmed.parse::<f64>() {
        if !secs.is_finite() || secs < 0.0 {
            return Err(format!("invalid duration '{trimmed}'"));
        }
        return Duration::try_from_secs_f64(secs)
            .map_err(|err| format!("invalid duration '{trimmed}': {err}"));
    }
    humantime::parse_duration(trimmed).map_err(|err| format!("invalid duration '{trimmed}': {err}"))
}

pub fn parse_fps(value: &str) -> Result<f32, String> {
    let fps: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid frame rate '{value}'"))?;
    if !fps.is_finite() || fps <= 0.0 {
        return Err("frame rate must be greater than zero".to_string());
    }
    frame_period(fps)?;
    Ok(fps)
}

/// Time between host frames at `fps`.
pub fn frame_period(fps: f32) -> Result<Duration, String> {
    Duration::try_from_secs_f32(fps.recip())
        .map_err(|err| format!("frame rate {fps} gives no usable frame period: {err}"))
}

pub fn parse_container(value: &str) -> Result<Size, String> {
    let (w, h) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| "invalid container width".to_string())?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| "invalid container height".to_string())?;
    if width == 0 || height == 0 {
        return Err("container dimensions must be greater than zero".into());
    }
    Ok(Size::new(width, height))
}

pub fn parse_platform(value: &str) -> Result<PlatformSetting, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "auto" => Ok(PlatformSetting::Auto),
        "standard" => Ok(PlatformSetting::Standard),
        "quirky-fullscreen" | "quirky" | "ios" => Ok(PlatformSetting::QuirkyFullscreen),
        other => Err(format!(
            "unknown platform '{other}'; expected auto, standard, or quirky-fullscreen"
        )),
    }
}
