//! WebSocket client implementations and data transfer objects.
//!
//! Currently this module provides a connector for Binance kline streams.

pub mod binance_client;
pub mod dto;

pub use binance_client::*;
pub use dto::*;
