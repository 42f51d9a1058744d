use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::{Color, ImageCatalog, PaletteCatalog};
use crate::stream::SeededStream;
use crate::ConfigError;

/// Stroke cap used by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Round,
    Square,
}

/// Immutable record handed to both rendering surfaces for one reload.
///
/// Superseded, never mutated: every reload builds a fresh value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub seed_name: String,
    pub palette: Vec<Color>,
    pub background_src: String,
    pub pointilism: f64,
    pub noise_scalar: [f64; 2],
    pub global_alpha: f64,
    pub start_area: f64,
    pub max_radius: f64,
    pub line_style: LineStyle,
    pub interval: f64,
    pub count: u32,
    pub steps: u64,
    pub endless_browser: bool,
    pub debug_luma: bool,
    pub background_scale: f64,
    pub background_fill: String,
    pub pixel_ratio: f64,
    pub width: u32,
    pub height: u32,
    /// The seed's stream positioned after the configuration draws. Renderers
    /// clone it so their own randomness replays with the seed.
    #[serde(skip)]
    pub random: SeededStream,
}

impl Configuration {
    /// Dominant colour of the palette (its first entry).
    pub fn background_color(&self) -> Option<&Color> {
        self.palette.first()
    }

    /// Palette without the dominant colour; candidates for the accent.
    pub fn accent_candidates(&self) -> &[Color] {
        self.palette.get(1..).unwrap_or(&[])
    }
}

/// Configuration fields that never consume draws.
#[derive(Debug, Clone, PartialEq)]
pub struct SketchDefaults {
    pub global_alpha: f64,
    pub count: u32,
    pub steps: u64,
    pub endless_browser: bool,
    pub debug_luma: bool,
    pub background_scale: f64,
    pub background_fill: String,
    pub pixel_ratio: f64,
    pub width: u32,
    pub height: u32,
}

impl Default for SketchDefaults {
    fn default() -> Self {
        Self {
            global_alpha: 0.5,
            count: 5000,
            steps: 8000,
            endless_browser: true,
            debug_luma: false,
            background_scale: 1.0,
            background_fill: "black".to_string(),
            pixel_ratio: 1.0,
            width: 1280 * 2,
            height: 720 * 2,
        }
    }
}

/// One draw (or draw group) in the seed expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawStep {
    ImageIndex,
    Pointilism,
    NoiseScalarLow,
    NoiseScalarHigh,
    StartArea,
    MaxRadius,
    LineStyle,
    Interval,
    PaletteIndex,
    PaletteShuffle,
}

/// The reproducibility contract: reordering these changes every seed's output.
pub const DRAW_ORDER: [DrawStep; 10] = [
    DrawStep::ImageIndex,
    DrawStep::Pointilism,
    DrawStep::NoiseScalarLow,
    DrawStep::NoiseScalarHigh,
    DrawStep::StartArea,
    DrawStep::MaxRadius,
    DrawStep::LineStyle,
    DrawStep::Interval,
    DrawStep::PaletteIndex,
    DrawStep::PaletteShuffle,
];

/// Expands seeds into [`Configuration`]s.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    palettes: PaletteCatalog,
    images: ImageCatalog,
    defaults: SketchDefaults,
    order: [DrawStep; 10],
}

impl ConfigBuilder {
    pub fn new(palettes: PaletteCatalog, images: ImageCatalog, defaults: SketchDefaults) -> Self {
        Self {
            palettes,
            images,
            defaults,
            order: DRAW_ORDER,
        }
    }

    /// Built-in catalogs with default sketch parameters.
    pub fn builtin() -> Result<Self, ConfigError> {
        Ok(Self::new(
            PaletteCatalog::builtin()?,
            ImageCatalog::builtin(),
            SketchDefaults::default(),
        ))
    }

    pub fn defaults(&self) -> &SketchDefaults {
        &self.defaults
    }

    /// Builds the configuration for `seed`, generating a fresh seed when absent.
    pub fn build(&self, seed: Option<&str>) -> Configuration {
        let seed = match seed {
            Some(seed) => seed.to_string(),
            None => random_seed(),
        };
        info!(seed = %seed, "expanding seed");
        let mut stream = SeededStream::new(seed);
        let config = self.expand(&mut stream);
        debug!(
            seed = %config.seed_name,
            draws = stream.draws(),
            image = %config.background_src,
            palette = ?config.palette,
            "configuration built"
        );
        config
    }

    fn expand(&self, stream: &mut SeededStream) -> Configuration {
        let mut draft = Draft::default();
        for step in self.order {
            match step {
                DrawStep::ImageIndex => {
                    let idx = stream.below(self.images.len() as f64).floor() as usize;
                    draft.image_index = idx.min(self.images.len() - 1);
                }
                DrawStep::Pointilism => draft.pointilism = stream.range(0.0, 0.1),
                DrawStep::NoiseScalarLow => draft.noise_scalar[0] = stream.range(0.000001, 0.000001),
                DrawStep::NoiseScalarHigh => draft.noise_scalar[1] = stream.range(0.0002, 0.004),
                DrawStep::StartArea => draft.start_area = stream.range(0.0, 1.5),
                DrawStep::MaxRadius => draft.max_radius = stream.range(5.0, 100.0),
                DrawStep::LineStyle => {
                    draft.line_style = if stream.below(1.0) > 0.5 {
                        LineStyle::Round
                    } else {
                        LineStyle::Square
                    };
                }
                DrawStep::Interval => draft.interval = stream.range(0.001, 0.01),
                DrawStep::PaletteIndex => draft.palette_index = stream.index(self.palettes.len()),
                DrawStep::PaletteShuffle => {
                    let mut palette = self
                        .palettes
                        .get(draft.palette_index)
                        .map(<[Color]>::to_vec)
                        .unwrap_or_default();
                    stream.shuffle(&mut palette);
                    draft.palette = palette;
                }
            }
        }

        let defaults = &self.defaults;
        Configuration {
            seed_name: stream.seed().to_string(),
            palette: draft.palette,
            background_src: self
                .images
                .get(draft.image_index)
                .unwrap_or_default()
                .to_string(),
            pointilism: draft.pointilism,
            noise_scalar: draft.noise_scalar,
            global_alpha: defaults.global_alpha,
            start_area: draft.start_area,
            max_radius: draft.max_radius,
            line_style: draft.line_style,
            interval: draft.interval,
            count: defaults.count,
            steps: defaults.steps,
            endless_browser: defaults.endless_browser,
            debug_luma: defaults.debug_luma,
            background_scale: defaults.background_scale,
            background_fill: defaults.background_fill.clone(),
            pixel_ratio: defaults.pixel_ratio,
            width: defaults.width,
            height: defaults.height,
            random: stream.clone(),
        }
    }

    #[cfg(test)]
    fn with_order(mut self, order: [DrawStep; 10]) -> Self {
        self.order = order;
        self
    }
}

struct Draft {
    image_index: usize,
    pointilism: f64,
    noise_scalar: [f64; 2],
    start_area: f64,
    max_radius: f64,
    line_style: LineStyle,
    interval: f64,
    palette_index: usize,
    palette: Vec<Color>,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            image_index: 0,
            pointilism: 0.0,
            noise_scalar: [0.0; 2],
            start_area: 0.0,
            max_radius: 0.0,
            line_style: LineStyle::Square,
            interval: 0.0,
            palette_index: 0,
            palette: Vec::new(),
        }
    }
}

/// Decimal seed in `[0, 1_000_000)`; not reproducible.
pub fn random_seed() -> String {
    rand::thread_rng().gen_range(0..1_000_000u32).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> ConfigBuilder {
        ConfigBuilder::builtin().unwrap()
    }

    fn colors(values: &[&str]) -> Vec<Color> {
        values.iter().map(|v| Color::from(*v)).collect()
    }

    #[test]
    fn pins_configuration_for_seed_42() {
        let config = builder().build(Some("42"));
        assert_eq!(config.seed_name, "42");
        assert_eq!(config.background_src, "maps/pattern-01.jpg");
        assert_eq!(config.pointilism, 0.017185490054868188);
        assert_eq!(config.noise_scalar, [0.000001, 0.001749570442014146]);
        assert_eq!(config.start_area, 1.3840317641390085);
        assert_eq!(config.max_radius, 79.75820851696913);
        assert_eq!(config.line_style, LineStyle::Round);
        assert_eq!(config.interval, 0.006668332565613198);
        assert_eq!(
            config.palette,
            colors(&["#c7f464", "#ff6b6b", "#556270", "#c44d58", "#4ecdc4"])
        );
    }

    #[test]
    fn pins_configuration_for_seed_7() {
        let config = builder().build(Some("7"));
        assert_eq!(config.background_src, "maps/pattern-04.jpg");
        assert_eq!(config.max_radius, 51.281361525041454);
        assert_eq!(
            config.palette,
            colors(&["#f1d4af", "#ece5ce", "#c5e0dc", "#e08e79", "#774f38"])
        );
    }

    #[test]
    fn same_seed_builds_identical_configurations() {
        let builder = builder();
        for seed in ["42", "", "alpha", "1000000", "ünïcode"] {
            assert_eq!(builder.build(Some(seed)), builder.build(Some(seed)));
        }
    }

    #[test]
    fn carries_stream_positioned_after_configuration_draws() {
        let mut config = builder().build(Some("42"));
        assert_eq!(config.random.seed(), "42");
        assert_eq!(config.random.draws(), 14);

        let mut fresh = SeededStream::new("42");
        for _ in 0..14 {
            fresh.next_f64();
        }
        assert_eq!(config.random, fresh);
        assert_eq!(config.random.next_f64(), fresh.next_f64());
    }

    #[test]
    fn draw_order_is_load_bearing() {
        let mut swapped = DRAW_ORDER;
        swapped.swap(1, 4);
        let reordered = builder().with_order(swapped).build(Some("42"));
        let contract = builder().build(Some("42"));
        assert_ne!(reordered, contract);
        assert!((reordered.pointilism - contract.start_area / 15.0).abs() < 1e-12);
    }

    #[test]
    fn shuffled_palette_is_a_permutation() {
        let builder = builder();
        let catalog = PaletteCatalog::builtin().unwrap();
        for n in 0..64 {
            let seed = n.to_string();
            let config = builder.build(Some(seed.as_str()));
            let mut shuffled = config.palette.clone();
            shuffled.sort();
            let found = (0..catalog.len()).any(|i| {
                let mut catalog_palette = catalog.get(i).unwrap().to_vec();
                catalog_palette.sort();
                catalog_palette == shuffled
            });
            assert!(found, "seed {n} palette is not a catalog permutation");
        }
    }

    #[test]
    fn defaults_do_not_affect_draws() {
        let defaults = SketchDefaults {
            steps: 3,
            endless_browser: false,
            width: 640,
            height: 360,
            ..SketchDefaults::default()
        };
        let custom = ConfigBuilder::new(
            PaletteCatalog::builtin().unwrap(),
            ImageCatalog::builtin(),
            defaults,
        )
        .build(Some("42"));
        let stock = builder().build(Some("42"));
        assert_eq!(custom.steps, 3);
        assert!(!custom.endless_browser);
        assert_eq!(custom.palette, stock.palette);
        assert_eq!(custom.interval, stock.interval);
    }

    #[test]
    fn missing_seed_is_generated() {
        let config = builder().build(None);
        let value: u32 = config.seed_name.parse().expect("numeric seed");
        assert!(value < 1_000_000);
        assert_eq!(config.palette.len(), 5);
    }

    #[test]
    fn accent_candidates_skip_background() {
        let config = builder().build(Some("42"));
        assert_eq!(config.background_color(), Some(&Color::from("#c7f464")));
        assert_eq!(config.accent_candidates().len(), 4);
    }
}
