use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::domain::errors::AppError;
use crate::domain::market_data::{Symbol, TimeInterval};

/// The (symbol, interval) pair the chart is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[display(fmt = "{} {}", symbol, interval)]
pub struct Selection {
    pub symbol: Symbol,
    pub interval: TimeInterval,
}

impl Selection {
    pub fn new(symbol: Symbol, interval: TimeInterval) -> Self {
        Self { symbol, interval }
    }

    /// Per-symbol kline stream name, e.g. `ethusdt@kline_1m`.
    pub fn stream_name(&self) -> String {
        format!("{}@kline_{}", self.symbol.stream_key(), self.interval.to_binance_str())
    }
}

/// Closed sets of selectable symbols and intervals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub symbols: Vec<Symbol>,
    pub intervals: Vec<TimeInterval>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            symbols: vec![Symbol::from("ETHUSDT"), Symbol::from("BNBUSDT"), Symbol::from("DOTUSDT")],
            intervals: vec![
                TimeInterval::OneMinute,
                TimeInterval::ThreeMinutes,
                TimeInterval::FiveMinutes,
            ],
        }
    }
}

impl SelectionConfig {
    pub fn new(symbols: Vec<Symbol>, intervals: Vec<TimeInterval>) -> Self {
        Self { symbols, intervals }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.symbols.is_empty() {
            return Err(AppError::ValidationError("Symbol set cannot be empty".to_string()));
        }
        if self.intervals.is_empty() {
            return Err(AppError::ValidationError("Interval set cannot be empty".to_string()));
        }
        Ok(())
    }

    /// First symbol with first interval.
    pub fn default_selection(&self) -> Result<Selection, AppError> {
        self.validate()?;
        Ok(Selection::new(self.symbols[0].clone(), self.intervals[0]))
    }
}

/// Currently chosen pair, constrained to the configured sets.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionState {
    config: SelectionConfig,
    current: Selection,
}

impl SelectionState {
    pub fn new(config: SelectionConfig) -> Result<Self, AppError> {
        let current = config.default_selection()?;
        Ok(Self { config, current })
    }

    pub fn current(&self) -> &Selection {
        &self.current
    }

    pub fn symbol(&self) -> &Symbol {
        &self.current.symbol
    }

    pub fn interval(&self) -> TimeInterval {
        self.current.interval
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.config.symbols
    }

    pub fn intervals(&self) -> &[TimeInterval] {
        &self.config.intervals
    }

    pub fn set_symbol(&mut self, symbol: Symbol) -> Result<(), AppError> {
        if !self.config.symbols.contains(&symbol) {
            return Err(AppError::ValidationError(format!("Unknown symbol: {symbol}")));
        }
        self.current.symbol = symbol;
        Ok(())
    }

    pub fn set_interval(&mut self, interval: TimeInterval) -> Result<(), AppError> {
        if !self.config.intervals.contains(&interval) {
            return Err(AppError::ValidationError(format!("Unknown interval: {interval}")));
        }
        self.current.interval = interval;
        Ok(())
    }
}
