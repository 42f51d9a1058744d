use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const BUILTIN_PALETTES: &str = include_str!("../assets/palettes.json");
const BUILTIN_MAP_COUNT: usize = 12;

/// A colour as written in the palette catalog, usually `#rrggbb`.
///
/// The string is carried as-is; parsing happens where the colour is used.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub String);

impl Color {
    pub fn new(value: impl Into<String>) -> Self {
        Color(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Color {
    fn from(value: &str) -> Self {
        Color(value.to_string())
    }
}

/// Static collection of palettes. The first colour of a palette is its
/// dominant/background colour by convention.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteCatalog {
    palettes: Vec<Vec<Color>>,
}

impl PaletteCatalog {
    /// The catalog embedded in the binary.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_json_str(BUILTIN_PALETTES)
    }

    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let palettes: Vec<Vec<Color>> = serde_json::from_str(input)?;
        Self::new(palettes)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn new(palettes: Vec<Vec<Color>>) -> Result<Self, ConfigError> {
        if palettes.is_empty() {
            return Err(ConfigError::Invalid(
                "palette catalog must contain at least one palette".into(),
            ));
        }
        if let Some(index) = palettes.iter().position(|palette| palette.len() < 2) {
            return Err(ConfigError::Invalid(format!(
                "palette {index} must contain at least two colours"
            )));
        }
        Ok(Self { palettes })
    }

    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&[Color]> {
        self.palettes.get(index).map(Vec::as_slice)
    }
}

/// Ordered list of background images selected by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCatalog {
    sources: Vec<String>,
}

impl ImageCatalog {
    /// `maps/pattern-01.jpg` through `maps/pattern-12.jpg`.
    pub fn builtin() -> Self {
        let sources = (1..=BUILTIN_MAP_COUNT)
            .map(|n| format!("maps/pattern-{n:02}.jpg"))
            .collect();
        Self { sources }
    }

    pub fn new(sources: Vec<String>) -> Result<Self, ConfigError> {
        if sources.is_empty() {
            return Err(ConfigError::Invalid(
                "image catalog must contain at least one image".into(),
            ));
        }
        Ok(Self { sources })
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.sources.get(index).map(String::as_str)
    }
}
