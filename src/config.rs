use serde::Deserialize;
use std::fs;
use std::path::Path;

use chrono::Local;
use chrono::format::{Item, StrftimeItems};
use tracing::warn;

static DEFAULT_CONFIG: &str = include_str!("default_config.toml");
const DEFAULT_DATE_FORMAT: &str = "%B %d, %Y";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub page: PageConfig,
    pub header: HeaderConfig,
    pub font: FontConfig,
}

/// Page geometry in millimetres.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub width: f64,
    pub height: f64,
    /// Left and right margin.
    pub margin: f64,
    /// Distance from the bottom edge at which content triggers a page break.
    pub bottom_margin: f64,
    /// Draw the "Page n/N" footer.
    pub numbers: bool,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            width: 210.0,
            height: 297.0,
            margin: 10.0,
            bottom_margin: 15.0,
            numbers: true,
        }
    }
}

impl PageConfig {
    /// Width available between the left and right margins.
    pub fn usable_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    /// Lowest y coordinate content may reach before a page break.
    pub fn break_at(&self) -> f64 {
        self.height - self.bottom_margin
    }
}

/// Running header band drawn at the top of every page.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    pub title: String,
    pub author: String,
    pub date_format: String,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            title: "NopCommerce Manual Testing Project".to_string(),
            author: "QA Automation Lead".to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub family: String,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: "Libertinus Serif".to_string(),
        }
    }
}

impl Config {
    /// The defaults embedded at build time.
    pub fn compiled_default() -> Self {
        // build.rs has already rejected a malformed file.
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    /// Load config from a TOML file, or return defaults if not found.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Ignoring invalid config {}: {}", path.display(), e);
                    Self::compiled_default()
                }
            },
            Err(_) => Self::compiled_default(),
        }
    }

    /// Today's date rendered with `header.date_format`.
    pub fn generated_on(&self) -> String {
        let mut items: Vec<Item> = StrftimeItems::new(&self.header.date_format).collect();
        if items.iter().any(|item| matches!(item, Item::Error)) {
            warn!(
                "Invalid header.date_format {:?}, using the default",
                self.header.date_format
            );
            items = StrftimeItems::new(DEFAULT_DATE_FORMAT).collect();
        }
        Local::now().format_with_items(items.into_iter()).to_string()
    }
}
