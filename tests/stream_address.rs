use kline_chart_wasm::application::StreamAddress;
use kline_chart_wasm::config::DEFAULT_FEED_URL;
use kline_chart_wasm::domain::market_data::{Symbol, TimeInterval};
use kline_chart_wasm::domain::selection::{Selection, SelectionConfig};
use quickcheck_macros::quickcheck;

#[test]
fn eth_one_minute_address() {
    let selection = Selection::new(Symbol::from("ETHUSDT"), TimeInterval::OneMinute);
    let address = StreamAddress::kline(DEFAULT_FEED_URL, &selection);
    assert_eq!(address.as_str(), "wss://stream.binance.com:9443/ws/ethusdt@kline_1m");
}

#[test]
fn every_default_combination_has_lowercase_stream_name() {
    let config = SelectionConfig::default();
    let mut addresses = Vec::new();
    for symbol in &config.symbols {
        for interval in &config.intervals {
            let selection = Selection::new(symbol.clone(), *interval);
            addresses.push(StreamAddress::kline(DEFAULT_FEED_URL, &selection).to_string());
        }
    }

    assert_eq!(addresses.len(), 9);
    assert!(addresses.contains(&"wss://stream.binance.com:9443/ws/bnbusdt@kline_3m".to_string()));
    assert!(addresses.contains(&"wss://stream.binance.com:9443/ws/dotusdt@kline_5m".to_string()));
}

#[test]
fn trailing_slash_on_base_url_is_ignored() {
    let selection = Selection::new(Symbol::from("dotusdt"), TimeInterval::FiveMinutes);
    let address = StreamAddress::kline("ws://localhost:9000/", &selection);
    assert_eq!(address.as_str(), "ws://localhost:9000/ws/dotusdt@kline_5m");
}

#[test]
fn month_interval_keeps_uppercase_code() {
    let selection = Selection::new(Symbol::from("ETHUSDT"), TimeInterval::OneMonth);
    assert_eq!(selection.stream_name(), "ethusdt@kline_1M");
}

#[quickcheck]
fn address_ends_with_lowercase_symbol(raw: String) -> bool {
    let cleaned: String = raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    let Ok(symbol) = Symbol::new(&cleaned) else {
        return cleaned.is_empty();
    };
    let selection = Selection::new(symbol, TimeInterval::OneMinute);
    let address = StreamAddress::kline(DEFAULT_FEED_URL, &selection);
    address
        .as_str()
        .ends_with(&format!("/ws/{}@kline_1m", cleaned.to_lowercase()))
}
