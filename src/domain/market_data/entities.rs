pub use super::value_objects::{OHLC, Price, Timestamp};
use crate::domain::errors::AppError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Domain entity - Candle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: Timestamp,
    pub ohlc: OHLC,
}

impl Candle {
    pub fn new(time: Timestamp, ohlc: OHLC) -> Self {
        Self { time, ohlc }
    }

    pub fn is_bullish(&self) -> bool {
        self.ohlc.close >= self.ohlc.open
    }
}

/// What an upsert did to the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The still-open last bar was replaced.
    Updated,
    /// A newer time key started a new bar.
    Appended,
}

/// Domain entity - Candle series keyed by strictly increasing time
#[derive(Debug, Clone)]
pub struct CandleSeries {
    candles: VecDeque<Candle>,
    max_size: usize,
}

impl CandleSeries {
    pub fn new(max_size: usize) -> Self {
        Self { candles: VecDeque::new(), max_size: max_size.max(1) }
    }

    /// Replace the last bar when the time key matches, append when newer.
    ///
    /// Bars older than the last one are rejected rather than inserted: the
    /// series only ever moves forward in time.
    pub fn upsert(&mut self, candle: Candle) -> Result<UpsertOutcome, AppError> {
        if !candle.ohlc.is_valid() {
            return Err(AppError::ValidationError(format!(
                "Inconsistent OHLC for bar {}",
                candle.time.value()
            )));
        }

        if let Some(last) = self.candles.back_mut() {
            if last.time == candle.time {
                *last = candle;
                return Ok(UpsertOutcome::Updated);
            }
            if candle.time < last.time {
                return Err(AppError::ValidationError(format!(
                    "Cannot update bar {} older than last bar {}",
                    candle.time.value(),
                    last.time.value()
                )));
            }
        }

        self.candles.push_back(candle);
        while self.candles.len() > self.max_size {
            self.candles.pop_front();
        }
        Ok(UpsertOutcome::Appended)
    }

    pub fn candles(&self) -> &VecDeque<Candle> {
        &self.candles
    }

    pub fn latest(&self) -> Option<&Candle> {
        self.candles.back()
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_size
    }

    pub fn clear(&mut self) {
        self.candles.clear();
    }

    /// Lowest low and highest high over a range of bars.
    pub fn price_range_of(&self, start: usize, count: usize) -> Option<(f64, f64)> {
        self.candles.iter().skip(start).take(count).fold(None, |acc, candle| {
            let (low, high) = (candle.ohlc.low.value(), candle.ohlc.high.value());
            Some(match acc {
                Some((min, max)) => (f64::min(min, low), f64::max(max, high)),
                None => (low, high),
            })
        })
    }

    pub fn price_range(&self) -> Option<(f64, f64)> {
        self.price_range_of(0, self.candles.len())
    }
}
