use serde::Deserialize;

use crate::domain::errors::{AppError, DecodeResult};
use crate::domain::market_data::{Candle, OHLC, Price, Timestamp};

/// DTO for a kline stream event. Everything outside `k` is ignored.
#[derive(Debug, Deserialize)]
pub struct BinanceKlineEvent {
    #[serde(rename = "k")]
    pub kline: BinanceKline,
}

#[derive(Debug, Deserialize)]
pub struct BinanceKline {
    /// Bar open time in milliseconds.
    #[serde(rename = "t")]
    pub start_time: u64,
    #[serde(rename = "o")]
    pub open_price: String,
    #[serde(rename = "h")]
    pub high_price: String,
    #[serde(rename = "l")]
    pub low_price: String,
    #[serde(rename = "c")]
    pub close_price: String,
}

impl BinanceKline {
    /// Convert the DTO into a domain candle keyed by seconds.
    pub fn to_domain_candle(&self) -> DecodeResult<Candle> {
        let ohlc = OHLC::new(
            parse_price("o", &self.open_price)?,
            parse_price("h", &self.high_price)?,
            parse_price("l", &self.low_price)?,
            parse_price("c", &self.close_price)?,
        );

        if !ohlc.is_valid() {
            return Err(AppError::DecodeError(format!(
                "Inconsistent OHLC in kline {}: o={} h={} l={} c={}",
                self.start_time, self.open_price, self.high_price, self.low_price, self.close_price
            )));
        }

        Ok(Candle::new(Timestamp::from_millis(self.start_time), ohlc))
    }
}

fn parse_price(field: &'static str, raw: &str) -> DecodeResult<Price> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|e| AppError::DecodeError(format!("Field k.{field}: {raw:?} is not a number ({e})")))?;
    if !value.is_finite() {
        return Err(AppError::DecodeError(format!("Field k.{field}: {raw:?} is not finite")));
    }
    Ok(Price::new(value))
}

/// Decode one kline stream message into the latest bar.
pub fn decode_kline(text: &str) -> DecodeResult<Candle> {
    let event: BinanceKlineEvent = serde_json::from_str(text)?;
    event.kline.to_domain_candle()
}
