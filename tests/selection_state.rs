use kline_chart_wasm::domain::errors::AppError;
use kline_chart_wasm::domain::market_data::{Symbol, TimeInterval};
use kline_chart_wasm::domain::selection::{SelectionConfig, SelectionState};

#[test]
fn starts_on_first_symbol_and_interval() {
    let state = SelectionState::new(SelectionConfig::default()).unwrap();
    assert_eq!(state.symbol(), &Symbol::from("ETHUSDT"));
    assert_eq!(state.interval(), TimeInterval::OneMinute);
    assert_eq!(state.current().to_string(), "ETHUSDT 1m");
}

#[test]
fn exposes_configured_options_in_order() {
    let state = SelectionState::new(SelectionConfig::default()).unwrap();
    let symbols: Vec<&str> = state.symbols().iter().map(Symbol::value).collect();
    assert_eq!(symbols, ["ETHUSDT", "BNBUSDT", "DOTUSDT"]);
    assert_eq!(
        state.intervals(),
        [TimeInterval::OneMinute, TimeInterval::ThreeMinutes, TimeInterval::FiveMinutes]
    );
}

#[test]
fn changing_symbol_keeps_interval() {
    let mut state = SelectionState::new(SelectionConfig::default()).unwrap();
    state.set_interval(TimeInterval::FiveMinutes).unwrap();
    state.set_symbol(Symbol::from("dotusdt")).unwrap();

    assert_eq!(state.symbol().value(), "DOTUSDT");
    assert_eq!(state.interval(), TimeInterval::FiveMinutes);
}

#[test]
fn values_outside_the_set_are_rejected() {
    let mut state = SelectionState::new(SelectionConfig::default()).unwrap();
    let before = state.current().clone();

    assert!(matches!(state.set_symbol(Symbol::from("BTCUSDT")), Err(AppError::ValidationError(_))));
    assert!(matches!(state.set_interval(TimeInterval::OneHour), Err(AppError::ValidationError(_))));
    assert_eq!(state.current(), &before);
}

#[test]
fn empty_sets_are_invalid() {
    let no_symbols = SelectionConfig::new(vec![], vec![TimeInterval::OneMinute]);
    let no_intervals = SelectionConfig::new(vec![Symbol::from("ETHUSDT")], vec![]);
    assert!(SelectionState::new(no_symbols).is_err());
    assert!(SelectionState::new(no_intervals).is_err());
}

#[test]
fn interval_codes_parse_from_option_values() {
    assert_eq!("3m".parse::<TimeInterval>().unwrap(), TimeInterval::ThreeMinutes);
    assert_eq!(TimeInterval::FiveMinutes.to_string(), "5m");
    assert!("7m".parse::<TimeInterval>().is_err());
}

#[test]
fn symbol_validation() {
    assert!(Symbol::new("").is_err());
    assert!(Symbol::new("ETH/USDT").is_err());
    assert_eq!(Symbol::new(" ethusdt ").unwrap().value(), "ETHUSDT");
}
