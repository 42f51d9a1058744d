//! Per-surface animation loop.
//!
//! ```text
//!   reload ──▶ Idle ──▶ AwaitingImage ──(image)──▶ Stepping ──(steps done)──▶ Stopped
//!                            │    └──(debug_luma)────────────────────────────▶ Stopped
//!                            └──(load error / timeout / renderer error)──────▶ Failed
//! ```
//!
//! Every reload bumps a generation counter. An image load only completes the
//! cycle whose generation it was requested for, so a superseded load can
//! never start a loop for an old configuration.

use std::sync::Arc;
use std::time::{Duration, Instant};

use seedconfig::Configuration;
use tracing::{debug, error, info, trace};

use crate::loader::{ImageLoader, ImageRequest, LoadError, LoadedImage};
use crate::types::{RenderOptions, Renderer, RendererFactory, Surface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    AwaitingImage,
    Stepping,
    Stopped,
    Failed,
}

#[derive(Debug, thiserror::Error)]
pub enum LoopError {
    #[error("surface '{surface}': {source}")]
    ImageLoad {
        surface: String,
        #[source]
        source: LoadError,
    },
    #[error("surface '{surface}': failed to construct renderer: {error:#}")]
    RendererInit {
        surface: String,
        error: anyhow::Error,
    },
    #[error("surface '{surface}': renderer step {step} failed: {error:#}")]
    Step {
        surface: String,
        step: u64,
        error: anyhow::Error,
    },
}

struct PendingLoad {
    generation: u64,
    request: ImageRequest,
    requested_at: Instant,
}

struct TickSubscription {
    generation: u64,
    renderer: Box<dyn Renderer>,
    step_count: u64,
}

/// Drives one [`Renderer`] per reload on a single surface.
pub struct LoopController {
    surface: Surface,
    loader: Arc<dyn ImageLoader>,
    factory: Arc<dyn RendererFactory>,
    load_timeout: Option<Duration>,
    state: LoopState,
    generation: u64,
    config: Option<Arc<Configuration>>,
    pending: Option<PendingLoad>,
    subscription: Option<TickSubscription>,
}

impl LoopController {
    pub fn new(
        surface: Surface,
        loader: Arc<dyn ImageLoader>,
        factory: Arc<dyn RendererFactory>,
    ) -> Self {
        Self {
            surface,
            loader,
            factory,
            load_timeout: None,
            state: LoopState::Idle,
            generation: 0,
            config: None,
            pending: None,
            subscription: None,
        }
    }

    /// Fails a cycle whose image has not arrived within `timeout`.
    /// `None` waits forever.
    pub fn with_load_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.load_timeout = timeout;
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn label(&self) -> &str {
        self.surface.label()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn config(&self) -> Option<&Arc<Configuration>> {
        self.config.as_ref()
    }

    /// Ticks handled in the current cycle.
    pub fn step_count(&self) -> u64 {
        self.subscription.as_ref().map_or(0, |sub| sub.step_count)
    }

    /// Registered tick handlers; never more than one.
    pub fn active_subscriptions(&self) -> usize {
        usize::from(self.subscription.is_some())
    }

    /// Tears down the current cycle and starts loading `config`'s image.
    /// Returns the new generation.
    pub fn reload(&mut self, config: Arc<Configuration>, now: Instant) -> u64 {
        self.teardown();
        self.generation += 1;
        let backing = self.surface.resize_for(&config);
        let request = self.loader.request(&config.background_src);
        info!(
            surface = %self.surface.label(),
            generation = self.generation,
            seed = %config.seed_name,
            image = %config.background_src,
            backing = %backing,
            "reloading surface"
        );
        self.pending = Some(PendingLoad {
            generation: self.generation,
            request,
            requested_at: now,
        });
        self.config = Some(config);
        self.state = LoopState::AwaitingImage;
        self.generation
    }

    /// Halts ticking. A pending image load is left alone and still starts
    /// the loop when it lands. Safe to call in any state.
    pub fn stop(&mut self) {
        if self.state == LoopState::Stepping {
            info!(
                surface = %self.surface.label(),
                steps = self.step_count(),
                "stopping loop"
            );
            self.state = LoopState::Stopped;
        }
    }

    /// One host frame: checks the pending image while awaiting it, ticks
    /// while stepping. Returns the state after the frame.
    pub fn frame(&mut self, now: Instant) -> Result<LoopState, LoopError> {
        match self.state {
            LoopState::AwaitingImage => self.poll_load(now)?,
            LoopState::Stepping => self.tick()?,
            LoopState::Idle | LoopState::Stopped | LoopState::Failed => {}
        }
        Ok(self.state)
    }

    /// Delivers an image load result for `generation`.
    ///
    /// Returns `Ok(false)` when the result belongs to a superseded reload (or
    /// the cycle is no longer waiting) and is ignored.
    pub fn complete_load(
        &mut self,
        generation: u64,
        result: Result<Arc<LoadedImage>, LoadError>,
    ) -> Result<bool, LoopError> {
        if generation != self.generation || self.state != LoopState::AwaitingImage {
            debug!(
                surface = %self.surface.label(),
                generation,
                current = self.generation,
                "ignoring stale image load"
            );
            return Ok(false);
        }
        let Some(config) = self.config.clone() else {
            return Ok(false);
        };
        self.pending = None;

        let image = match result {
            Ok(image) => image,
            Err(source) => {
                error!(surface = %self.surface.label(), error = %source, "image load failed");
                self.state = LoopState::Failed;
                return Err(LoopError::ImageLoad {
                    surface: self.surface.label().to_string(),
                    source,
                });
            }
        };

        let options = RenderOptions {
            config: Arc::clone(&config),
            image,
            surface: self.surface.label().to_string(),
            backing: self.surface.backing(),
            random: config.random.clone(),
        };
        let mut renderer = match self.factory.create(options) {
            Ok(renderer) => renderer,
            Err(error) => {
                self.state = LoopState::Failed;
                return Err(LoopError::RendererInit {
                    surface: self.surface.label().to_string(),
                    error,
                });
            }
        };

        if config.debug_luma {
            renderer.debug_luma();
            info!(surface = %self.surface.label(), "rendered luma debug view");
            self.state = LoopState::Stopped;
            return Ok(true);
        }

        renderer.clear();
        debug_assert!(self.subscription.is_none());
        self.subscription = Some(TickSubscription {
            generation,
            renderer,
            step_count: 0,
        });
        self.state = LoopState::Stepping;
        info!(
            surface = %self.surface.label(),
            generation,
            steps = config.steps,
            endless = config.endless_browser,
            "loop started"
        );
        Ok(true)
    }

    /// Steps the renderer once if the loop is running.
    pub fn tick(&mut self) -> Result<(), LoopError> {
        if self.state != LoopState::Stepping {
            return Ok(());
        }
        let (Some(config), Some(sub)) = (self.config.as_ref(), self.subscription.as_mut()) else {
            return Ok(());
        };

        if let Err(error) = sub.renderer.step(config.interval) {
            let step = sub.step_count + 1;
            self.subscription = None;
            self.state = LoopState::Failed;
            return Err(LoopError::Step {
                surface: self.surface.label().to_string(),
                step,
                error,
            });
        }
        sub.step_count += 1;
        trace!(
            surface = %self.surface.label(),
            generation = sub.generation,
            step = sub.step_count,
            "tick"
        );

        if !config.endless_browser && sub.step_count > config.steps {
            info!(
                surface = %self.surface.label(),
                steps = sub.step_count,
                "loop finished"
            );
            self.state = LoopState::Stopped;
        }
        Ok(())
    }

    fn poll_load(&mut self, now: Instant) -> Result<(), LoopError> {
        let Some(pending) = self.pending.as_mut() else {
            return Ok(());
        };
        let generation = pending.generation;
        let result = match pending.request.poll() {
            Ok(Some(image)) => Ok(image),
            Ok(None) => match self.load_timeout {
                Some(timeout) if now.saturating_duration_since(pending.requested_at) >= timeout => {
                    let src = self
                        .config
                        .as_ref()
                        .map(|config| config.background_src.clone())
                        .unwrap_or_default();
                    Err(LoadError::TimedOut { src, timeout })
                }
                _ => return Ok(()),
            },
            Err(err) => Err(err),
        };
        self.complete_load(generation, result).map(|_| ())
    }

    fn teardown(&mut self) {
        self.subscription = None;
        self.pending = None;
        self.state = LoopState::Idle;
    }
}

impl std::fmt::Debug for LoopController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopController")
            .field("surface", &self.surface)
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("step_count", &self.step_count())
            .finish()
    }
}
