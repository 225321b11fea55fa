use serde::{Deserialize, Serialize};

/// Colors used by the chart surface. Purely cosmetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartTheme {
    pub background: String,
    pub text: String,
    pub grid: String,
    pub crosshair: String,
    pub axis_border: String,
    pub up: String,
    pub down: String,
    /// Outline candle bodies with their wick color.
    pub body_border: bool,
    pub font: String,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self::dark()
    }
}

impl ChartTheme {
    pub fn dark() -> Self {
        Self {
            background: "#1e222d".to_string(),
            text: "#d1d4dc".to_string(),
            grid: "rgba(42, 46, 57, 0.5)".to_string(),
            crosshair: "#758696".to_string(),
            axis_border: "rgba(197, 203, 206, 0.8)".to_string(),
            up: "#26a69a".to_string(),
            down: "#ef5350".to_string(),
            body_border: false,
            font: "11px 'Trebuchet MS', sans-serif".to_string(),
        }
    }

    pub fn candle_color(&self, bullish: bool) -> &str {
        if bullish { &self.up } else { &self.down }
    }
}

/// Parameters a chart surface is created with.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceOptions {
    pub width: u32,
    pub height: u32,
    pub theme: ChartTheme,
    pub max_candles: usize,
}

impl SurfaceOptions {
    pub fn new(width: u32, height: u32, theme: ChartTheme, max_candles: usize) -> Self {
        Self { width, height, theme, max_candles }
    }

    /// Canvas backing-store size for a display with the given pixel ratio.
    pub fn backing_size(&self, pixel_ratio: f64) -> (u32, u32) {
        let scale = |css: u32| ((css as f64 * pixel_ratio).round() as u32).max(1);
        (scale(self.width), scale(self.height))
    }
}

/// Device pixel ratio usable for scaling; anything non-positive or non-finite counts as 1.
pub fn normalized_pixel_ratio(raw: f64) -> f64 {
    if raw.is_finite() && raw > 0.0 { raw } else { 1.0 }
}
