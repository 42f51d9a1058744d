use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Result;
use rand::Rng;
use seedconfig::SeededStream;
use stage::{LoadedImage, RenderOptions, Renderer, RendererFactory};
use tracing::{debug, info, trace};

/// Renderer that paints nothing and only keeps count of the work it is given.
#[derive(Debug, Default, Clone)]
pub struct HeadlessFactory {
    total_steps: Arc<AtomicU64>,
}

impl HeadlessFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Steps taken by every renderer this factory has built.
    pub fn total_steps(&self) -> u64 {
        self.total_steps.load(Ordering::Relaxed)
    }
}

impl RendererFactory for HeadlessFactory {
    fn create(&self, options: RenderOptions) -> Result<Box<dyn Renderer>> {
        debug!(
            surface = %options.surface,
            seed = %options.config.seed_name,
            image = %options.image.src(),
            backing = %options.backing,
            "creating headless renderer"
        );
        Ok(Box::new(HeadlessRenderer::new(
            options,
            Arc::clone(&self.total_steps),
        )))
    }
}

/// Drops one stroke per step at a seeded position on the source image and
/// keeps the sampled luminance as ink.
struct HeadlessRenderer {
    surface: String,
    image: Arc<LoadedImage>,
    random: SeededStream,
    elapsed: f64,
    steps: u64,
    ink: f64,
    last_stroke: Option<(u32, u32)>,
    total_steps: Arc<AtomicU64>,
}

impl HeadlessRenderer {
    fn new(options: RenderOptions, total_steps: Arc<AtomicU64>) -> Self {
        Self {
            surface: options.surface,
            image: options.image,
            random: options.random,
            elapsed: 0.0,
            steps: 0,
            ink: 0.0,
            last_stroke: None,
            total_steps,
        }
    }

    fn stroke(&mut self) {
        let (width, height) = (self.image.width(), self.image.height());
        if width == 0 || height == 0 {
            return;
        }
        let x = self.random.gen_range(0..width);
        let y = self.random.gen_range(0..height);
        self.ink += f64::from(self.image.sample(x, y).unwrap_or(0.0));
        self.last_stroke = Some((x, y));
    }
}

impl Renderer for HeadlessRenderer {
    fn clear(&mut self) {
        self.elapsed = 0.0;
        self.steps = 0;
        self.ink = 0.0;
        self.last_stroke = None;
        debug!(surface = %self.surface, "cleared surface");
    }

    fn step(&mut self, dt: f64) -> Result<()> {
        self.elapsed += dt;
        self.steps += 1;
        self.stroke();
        self.total_steps.fetch_add(1, Ordering::Relaxed);
        trace!(
            surface = %self.surface,
            step = self.steps,
            elapsed = self.elapsed,
            stroke = ?self.last_stroke,
            ink = self.ink,
            "step"
        );
        Ok(())
    }

    fn debug_luma(&mut self) {
        let luma = self.image.luma();
        let mean = if luma.is_empty() {
            0.0
        } else {
            luma.iter().map(|v| f64::from(*v)).sum::<f64>() / luma.len() as f64 / 255.0
        };
        info!(
            surface = %self.surface,
            image = %self.image.src(),
            width = self.image.width(),
            height = self.image.height(),
            mean_luma = mean,
            "luma debug view"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seedconfig::ConfigBuilder;
    use stage::Size;

    fn renderer(seed: &str) -> HeadlessRenderer {
        let config = Arc::new(ConfigBuilder::builtin().unwrap().build(Some(seed)));
        let image = LoadedImage::new("maps/gradient.png", 4, 4, (0..16).map(|v| v * 16).collect());
        let options = RenderOptions {
            random: config.random.clone(),
            config,
            image: Arc::new(image),
            surface: "foreground".into(),
            backing: Size::new(4, 4),
        };
        HeadlessRenderer::new(options, Arc::default())
    }

    fn paint(renderer: &mut HeadlessRenderer, steps: usize) -> (f64, Option<(u32, u32)>) {
        for _ in 0..steps {
            renderer.step(1.0 / 60.0).unwrap();
        }
        (renderer.ink, renderer.last_stroke)
    }

    #[test]
    fn strokes_replay_for_the_same_seed() {
        let first = paint(&mut renderer("42"), 64);
        let second = paint(&mut renderer("42"), 64);
        assert_eq!(first, second);
        assert!(first.0 > 0.0);
        assert!(first.1.is_some_and(|(x, y)| x < 4 && y < 4));
    }

    #[test]
    fn strokes_differ_between_seeds() {
        assert_ne!(paint(&mut renderer("42"), 64), paint(&mut renderer("7"), 64));
    }

    #[test]
    fn renderer_draws_continue_after_configuration_draws() {
        let mut renderer = renderer("42");
        assert_eq!(renderer.random.draws(), 14);
        paint(&mut renderer, 3);
        assert!(renderer.random.draws() > 14);

        renderer.clear();
        assert_eq!(renderer.ink, 0.0);
        assert_eq!(renderer.last_stroke, None);
        assert_eq!(renderer.steps, 0);
    }

    #[test]
    fn empty_image_takes_no_strokes() {
        let config = Arc::new(ConfigBuilder::builtin().unwrap().build(Some("42")));
        let options = RenderOptions {
            random: config.random.clone(),
            config,
            image: Arc::new(LoadedImage::new("maps/empty.png", 0, 0, Vec::new())),
            surface: "background".into(),
            backing: Size::default(),
        };
        let total = Arc::new(AtomicU64::new(0));
        let mut renderer = HeadlessRenderer::new(options, Arc::clone(&total));
        paint(&mut renderer, 5);
        assert_eq!(renderer.last_stroke, None);
        assert_eq!(renderer.random.draws(), 14);
        assert_eq!(total.load(Ordering::Relaxed), 5);
    }
}
