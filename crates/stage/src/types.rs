use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use seedconfig::{Configuration, SeededStream};

use crate::loader::LoadedImage;

/// Width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A drawing surface owned by exactly one loop controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    label: String,
    backing: Size,
}

impl Surface {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            backing: Size::default(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Backing-store size in physical pixels.
    pub fn backing(&self) -> Size {
        self.backing
    }

    /// Sizes the backing store to `width * pixel_ratio` by `height * pixel_ratio`.
    /// A non-finite or non-positive ratio counts as 1.
    pub fn resize_for(&mut self, config: &Configuration) -> Size {
        let ratio = if config.pixel_ratio.is_finite() && config.pixel_ratio > 0.0 {
            config.pixel_ratio
        } else {
            1.0
        };
        self.backing = Size::new(
            (f64::from(config.width) * ratio).round() as u32,
            (f64::from(config.height) * ratio).round() as u32,
        );
        self.backing
    }
}

/// Everything a renderer is constructed from for one reload cycle.
#[derive(Clone)]
pub struct RenderOptions {
    pub config: Arc<Configuration>,
    pub image: Arc<LoadedImage>,
    pub surface: String,
    pub backing: Size,
    /// Private copy of the configuration's stream for the renderer's own draws.
    pub random: SeededStream,
}

impl fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderOptions")
            .field("seed", &self.config.seed_name)
            .field("image", &self.image.src())
            .field("surface", &self.surface)
            .field("backing", &self.backing)
            .field("draws", &self.random.draws())
            .finish()
    }
}

/// Frame-step collaborator that paints onto a surface.
pub trait Renderer {
    /// Resets the surface to its initial state.
    fn clear(&mut self);
    /// Advances the simulation by `dt`. Called once per tick.
    fn step(&mut self, dt: f64) -> Result<()>;
    /// One-shot alternate visualisation; excludes `clear`/`step` in the same cycle.
    fn debug_luma(&mut self);
}

/// Builds a renderer once the cycle's image has loaded.
pub trait RendererFactory {
    fn create(&self, options: RenderOptions) -> Result<Box<dyn Renderer>>;
}
