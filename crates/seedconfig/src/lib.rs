//! Seed expansion for seedpaint.
//!
//! A seed string drives a [`SeededStream`]; [`ConfigBuilder`] consumes that
//! stream in a fixed order to produce an immutable [`Configuration`]:
//!
//! ```text
//!   seed ──▶ SeededStream ──▶ ConfigBuilder (DRAW_ORDER) ──▶ Configuration
//!                                   ▲
//!              PaletteCatalog ──────┤
//!              ImageCatalog ────────┘
//! ```
//!
//! [`Settings`] carries the on-disk `seedpaint.toml` overrides for fields
//! that never consume draws, plus scheduling and catalog locations.

use std::path::PathBuf;

mod builder;
mod catalog;
mod settings;
mod stream;

pub use builder::{
    random_seed, ConfigBuilder, Configuration, DrawStep, LineStyle, SketchDefaults, DRAW_ORDER,
};
pub use catalog::{Color, ImageCatalog, PaletteCatalog};
pub use settings::{
    CatalogSection, LayoutSection, PlatformSetting, ScheduleSection, Settings, SketchSection,
};
pub use stream::SeededStream;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to parse palette catalog: {0}")]
    Catalog(#[from] serde_json::Error),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
