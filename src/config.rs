//! config.rs
//!
//! Versioned settings record, stored as JSON.
//!
//! Only `version` and `birth_date` are required; every other field has a
//! documented default. Anything that fails to parse or validate is an error,
//! never a silent fallback.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::grid::Viewport;
use crate::projection::{Precision, Projection, project};
use crate::svg::Theme;

pub const SETTINGS_VERSION: u32 = 1;
pub const DEFAULT_LIFESPAN_YEARS: i32 = 80;
pub const DEFAULT_ACCENT_COLOR: &str = "#ef4444";

fn default_lifespan() -> i32 {
    DEFAULT_LIFESPAN_YEARS
}

fn default_true() -> bool {
    true
}

fn default_accent() -> String {
    DEFAULT_ACCENT_COLOR.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub version: u32,
    pub birth_date: NaiveDate,
    #[serde(default = "default_lifespan")]
    pub lifespan_years: i32,
    #[serde(default = "default_true")]
    pub show_seconds: bool,
    #[serde(default = "default_true")]
    pub show_percent: bool,
    #[serde(default = "default_accent")]
    pub accent_color: String,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub viewport: Viewport,
}

impl Settings {
    pub fn new(birth_date: NaiveDate) -> Self {
        Self {
            version: SETTINGS_VERSION,
            birth_date,
            lifespan_years: DEFAULT_LIFESPAN_YEARS,
            show_seconds: true,
            show_percent: true,
            accent_color: default_accent(),
            theme: Theme::default(),
            viewport: Viewport::default(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("loading settings from {}", path.display());
        let settings = Self::from_json(&fs::read_to_string(path)?)?;
        info!(
            "loaded settings: born {}, {} year lifespan",
            settings.birth_date, settings.lifespan_years
        );
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.validate()?;
        fs::write(path.as_ref(), self.to_json()?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.version != SETTINGS_VERSION {
            return Err(Error::UnsupportedVersion {
                found: self.version,
                expected: SETTINGS_VERSION,
            });
        }
        if !is_hex_color(&self.accent_color) {
            return Err(Error::invalid(format!(
                "accent_color {:?} is not #rrggbb",
                self.accent_color
            )));
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(Error::invalid("viewport must be non-empty"));
        }
        self.projection().map(|_| ())
    }

    pub fn projection(&self) -> Result<Projection> {
        project(self.birth_date, self.lifespan_years)
    }

    pub fn precision(&self) -> Precision {
        Precision::from_show_seconds(self.show_seconds)
    }
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}
