use std::sync::Arc;
use std::time::{Duration, Instant};

use scheduler::{Phase, SchedulerError, SwapScheduler};
use seedconfig::{Color, ConfigBuilder, Configuration};
use stage::{
    best_contrast, letterbox, ImageLoader, LoopController, LoopState, Placement, Platform,
    RendererFactory, Size, Surface,
};
use tracing::{debug, error};

/// Text and colours shown around the surfaces. Last reload wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Caption {
    pub accent: Option<Color>,
    pub text: String,
    pub page_background: Option<Color>,
}

#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    pub swap_interval: Duration,
    pub image_timeout: Option<Duration>,
    pub platform: Platform,
}

/// Owns both surfaces and alternates them on the swap cadence.
pub struct Orchestrator {
    builder: ConfigBuilder,
    foreground: LoopController,
    background: LoopController,
    scheduler: SwapScheduler,
    caption: Caption,
    container: Size,
    platform: Platform,
    foreground_layout: Option<Placement>,
    background_layout: Option<Placement>,
}

impl Orchestrator {
    pub fn new(
        builder: ConfigBuilder,
        loader: Arc<dyn ImageLoader>,
        factory: Arc<dyn RendererFactory>,
        options: OrchestratorOptions,
        now: Instant,
    ) -> Result<Self, SchedulerError> {
        let scheduler = SwapScheduler::new(options.swap_interval, now)?;
        let controller = |phase: Phase| {
            LoopController::new(
                Surface::new(phase.to_string()),
                Arc::clone(&loader),
                Arc::clone(&factory),
            )
            .with_load_timeout(options.image_timeout)
        };
        Ok(Self {
            builder,
            foreground: controller(Phase::Foreground),
            background: controller(Phase::Background),
            scheduler,
            caption: Caption::default(),
            container: Size::default(),
            platform: options.platform,
            foreground_layout: None,
            background_layout: None,
        })
    }

    pub fn phase(&self) -> Phase {
        self.scheduler.phase()
    }

    pub fn caption(&self) -> &Caption {
        &self.caption
    }

    pub fn controller(&self, phase: Phase) -> &LoopController {
        match phase {
            Phase::Foreground => &self.foreground,
            Phase::Background => &self.background,
        }
    }

    pub fn placement(&self, phase: Phase) -> Option<Placement> {
        match phase {
            Phase::Foreground => self.foreground_layout,
            Phase::Background => self.background_layout,
        }
    }

    /// Builds a configuration for `seed` (random when absent) and loads it
    /// onto the foreground surface. The swap phase is left alone.
    pub fn randomize(&mut self, seed: Option<&str>, now: Instant) -> Arc<Configuration> {
        let config = Arc::new(self.builder.build(seed));
        self.reload_with(Phase::Foreground, Arc::clone(&config), now);
        config
    }

    /// Writes the caption for `config` and reloads the surface for `phase`.
    pub fn reload_with(&mut self, phase: Phase, config: Arc<Configuration>, now: Instant) {
        let accent = config
            .background_color()
            .and_then(|bg| best_contrast(bg, config.accent_candidates()))
            .cloned();
        if phase == Phase::Background {
            self.caption.page_background = config.background_color().cloned();
        }
        self.caption.accent = accent;
        self.caption.text = config.seed_name.clone();
        debug!(
            surface = %phase,
            accent = ?self.caption.accent,
            text = %self.caption.text,
            page = ?self.caption.page_background,
            "caption updated"
        );

        self.controller_mut(phase).reload(config, now);
        self.relayout(phase);
    }

    /// Recomputes both placements for a new container size. Called by the
    /// host on startup and whenever its container changes.
    pub fn resize(&mut self, container: Size) {
        self.container = container;
        self.relayout(Phase::Foreground);
        self.relayout(Phase::Background);
    }

    /// Applies due swaps, then drives both loops for one host frame.
    /// Errors are logged per surface and never stop the other one.
    pub fn frame(&mut self, now: Instant) {
        for swap in self.scheduler.tick(now) {
            self.controller_mut(swap.stop).stop();
            let config = Arc::new(self.builder.build(None));
            self.reload_with(swap.start, config, now);
        }

        for phase in [Phase::Foreground, Phase::Background] {
            let controller = self.controller_mut(phase);
            if let Err(err) = controller.frame(now) {
                error!(surface = %phase, error = %err, "surface cycle failed");
            }
        }
    }

    pub fn states(&self) -> [LoopState; 2] {
        [self.foreground.state(), self.background.state()]
    }

    fn controller_mut(&mut self, phase: Phase) -> &mut LoopController {
        match phase {
            Phase::Foreground => &mut self.foreground,
            Phase::Background => &mut self.background,
        }
    }

    fn relayout(&mut self, phase: Phase) {
        let backing = self.controller(phase).surface().backing();
        let placement = letterbox(backing, self.container, self.platform);
        match placement {
            Some(placement) => debug!(
                surface = %phase,
                container = %self.container,
                top = placement.top,
                width = placement.width,
                height = placement.height,
                "layout"
            ),
            None => debug!(surface = %phase, "surface not sized yet; skipping layout"),
        }
        match phase {
            Phase::Foreground => self.foreground_layout = placement,
            Phase::Background => self.background_layout = placement,
        }
    }
}
