//! Surfaces, presentation helpers and the per-surface animation loop.
//!
//! A [`LoopController`] owns one [`Surface`]. On every reload it sizes the
//! backing store, asks an [`ImageLoader`] for the configuration's background
//! image and, once that lands, builds a [`Renderer`] through a
//! [`RendererFactory`] and steps it once per host frame.
//!
//! [`letterbox`] and [`best_contrast`] are pure helpers used by the host to
//! place surfaces and pick caption colours.

mod contrast;
mod controller;
mod layout;
mod loader;
mod types;

pub use contrast::{best_contrast, best_contrast_by, contrast_ratio, Rgb};
pub use controller::{LoopController, LoopError, LoopState};
pub use layout::{letterbox, Placement, Platform};
pub use loader::{FsImageLoader, ImageLoader, ImageRequest, LoadError, LoadedImage};
pub use types::{RenderOptions, Renderer, RendererFactory, Size, Surface};
