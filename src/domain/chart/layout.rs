//! Pure chart geometry: which bars are visible and where they land on screen.
//!
//! Everything here works in CSS pixels with the origin at the top-left corner
//! of the plot area. The price axis sits to the right of the plot and the time
//! axis below it.

use crate::domain::market_data::{Candle, CandleSeries};

pub const PRICE_AXIS_WIDTH: f64 = 64.0;
pub const TIME_AXIS_HEIGHT: f64 = 26.0;
pub const MIN_BAR_SPACING: f64 = 3.0;
pub const MAX_BAR_SPACING: f64 = 12.0;
/// Minimum horizontal distance between two time labels.
pub const MIN_TIME_LABEL_GAP: f64 = 80.0;
const PRICE_PADDING_RATIO: f64 = 0.1;

/// Screen-space shape of a single candle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandleGeometry {
    pub x: f64,
    pub body_left: f64,
    pub body_width: f64,
    pub body_top: f64,
    pub body_height: f64,
    pub wick_top: f64,
    pub wick_bottom: f64,
    pub bullish: bool,
}

/// Fit-to-content layout of a series on a surface of a given size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub plot_width: f64,
    pub plot_height: f64,
    pub bar_spacing: f64,
    pub first_visible: usize,
    pub visible_count: usize,
    pub min_price: f64,
    pub max_price: f64,
}

impl ChartLayout {
    /// Fit as many of the latest bars as the plot can hold at the minimum spacing.
    ///
    /// Returns `None` for an empty series.
    pub fn fit(series: &CandleSeries, width: u32, height: u32) -> Option<Self> {
        let count = series.len();
        if count == 0 {
            return None;
        }

        let width = width as f64;
        let height = height as f64;
        let plot_width = (width - PRICE_AXIS_WIDTH).max(1.0);
        let plot_height = (height - TIME_AXIS_HEIGHT).max(1.0);

        let capacity = ((plot_width / MIN_BAR_SPACING).floor() as usize).max(1);
        let visible_count = count.min(capacity);
        let first_visible = count - visible_count;
        // A truncated series is drawn at exactly the minimum spacing.
        let bar_spacing = if visible_count < count {
            MIN_BAR_SPACING
        } else {
            (plot_width / visible_count as f64).clamp(MIN_BAR_SPACING, MAX_BAR_SPACING)
        };

        let (low, high) = series.price_range_of(first_visible, visible_count)?;
        let (min_price, max_price) = padded_range(low, high);

        Some(Self {
            width,
            height,
            plot_width,
            plot_height,
            bar_spacing,
            first_visible,
            visible_count,
            min_price,
            max_price,
        })
    }

    pub fn y_for(&self, price: f64) -> f64 {
        (self.max_price - price) / (self.max_price - self.min_price) * self.plot_height
    }

    pub fn price_at(&self, y: f64) -> f64 {
        self.max_price - y / self.plot_height * (self.max_price - self.min_price)
    }

    /// Left edge of the first visible bar. Bars are right-aligned to the price axis.
    fn bars_left(&self) -> f64 {
        self.plot_width - self.visible_count as f64 * self.bar_spacing
    }

    /// Center x of the bar in visible slot `slot`.
    pub fn x_for(&self, slot: usize) -> f64 {
        self.bars_left() + (slot as f64 + 0.5) * self.bar_spacing
    }

    /// Visible slot under an x coordinate, if any.
    pub fn slot_at(&self, x: f64) -> Option<usize> {
        let left = self.bars_left();
        if x < left || x > self.plot_width {
            return None;
        }
        let slot = ((x - left) / self.bar_spacing).floor() as usize;
        Some(slot.min(self.visible_count - 1))
    }

    /// Index into the series of the bar shown in `slot`.
    pub fn series_index(&self, slot: usize) -> usize {
        self.first_visible + slot
    }

    pub fn candle_geometry(&self, slot: usize, candle: &Candle) -> CandleGeometry {
        let x = self.x_for(slot);
        let body_width = (self.bar_spacing * 0.7).floor().max(1.0);
        let open_y = self.y_for(candle.ohlc.open.value());
        let close_y = self.y_for(candle.ohlc.close.value());

        CandleGeometry {
            x,
            body_left: x - body_width / 2.0,
            body_width,
            body_top: open_y.min(close_y),
            body_height: (open_y - close_y).abs().max(1.0),
            wick_top: self.y_for(candle.ohlc.high.value()),
            wick_bottom: self.y_for(candle.ohlc.low.value()),
            bullish: candle.is_bullish(),
        }
    }

    /// `count` evenly spaced price levels strictly inside the visible range.
    pub fn price_ticks(&self, count: usize) -> Vec<f64> {
        let range = self.max_price - self.min_price;
        (1..=count)
            .map(|i| self.min_price + range * i as f64 / (count + 1) as f64)
            .collect()
    }

    /// Visible slots that get a time label; the latest bar always gets one.
    pub fn time_tick_slots(&self) -> Vec<usize> {
        let step = ((MIN_TIME_LABEL_GAP / self.bar_spacing).ceil() as usize).max(1);
        let mut slots: Vec<usize> = (0..self.visible_count).rev().step_by(step).collect();
        slots.reverse();
        slots
    }
}

fn padded_range(low: f64, high: f64) -> (f64, f64) {
    let span = high - low;
    let pad = if span > 0.0 {
        span * PRICE_PADDING_RATIO
    } else if high.abs() > 0.0 {
        high.abs() * 0.01
    } else {
        1.0
    };
    (low - pad, high + pad)
}

/// Price label with precision adapted to the magnitude.
pub fn format_price(price: f64) -> String {
    let magnitude = price.abs();
    if magnitude >= 1.0 {
        format!("{price:.2}")
    } else if magnitude >= 0.01 {
        format!("{price:.4}")
    } else {
        format!("{price:.6}")
    }
}
