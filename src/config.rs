//! Immutable application configuration injected into the top-level view.

use serde::{Deserialize, Serialize};

use crate::domain::chart::{ChartTheme, SurfaceOptions};
use crate::domain::errors::AppError;
use crate::domain::selection::SelectionConfig;

pub const DEFAULT_FEED_URL: &str = "wss://stream.binance.com:9443";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Scheme, host and port of the streaming endpoint, without a trailing path.
    pub base_url: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_FEED_URL.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub height: u32,
    /// Width used when the container reports no layout width yet.
    pub fallback_width: u32,
    pub max_candles: usize,
    pub theme: ChartTheme,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self { height: 400, fallback_width: 800, max_candles: 1000, theme: ChartTheme::dark() }
    }
}

impl ChartConfig {
    /// Surface options for a container of the given width.
    pub fn surface_options(&self, container_width: i32) -> SurfaceOptions {
        let width = if container_width > 0 { container_width as u32 } else { self.fallback_width };
        SurfaceOptions::new(width, self.height, self.theme.clone(), self.max_candles)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub feed: FeedConfig,
    pub chart: ChartConfig,
    pub selection: SelectionConfig,
}

impl AppConfig {
    /// Parse a (possibly partial) JSON document; missing sections keep defaults.
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| AppError::ValidationError(format!("Invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.selection.validate()?;
        if !(self.feed.base_url.starts_with("wss://") || self.feed.base_url.starts_with("ws://")) {
            return Err(AppError::ValidationError(format!(
                "Feed URL must use ws:// or wss://: {}",
                self.feed.base_url
            )));
        }
        if self.chart.height == 0 {
            return Err(AppError::ValidationError("Chart height must be positive".to_string()));
        }
        if self.chart.max_candles == 0 {
            return Err(AppError::ValidationError(
                "Chart must keep at least one candle".to_string(),
            ));
        }
        Ok(())
    }
}
