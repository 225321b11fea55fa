use wasm_bindgen::prelude::*;

use crate::app::App;
use crate::config::AppConfig;
use crate::domain::logging::{LogComponent, get_logger};

pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod time_utils;

/// Install the browser logger and clock, then mount the chart with defaults.
#[wasm_bindgen(start)]
pub fn initialize() {
    console_error_panic_hook::set_once();

    let console_logger = Box::new(infrastructure::services::ConsoleLogger::new_development());
    domain::logging::init_logger(console_logger);

    let browser_time_provider = Box::new(infrastructure::services::BrowserTimeProvider::new());
    domain::logging::init_time_provider(browser_time_provider);

    get_logger().info(
        LogComponent::Presentation("Initialize"),
        "🚀 Kline chart initialized",
    );

    leptos::mount_to_body(|| leptos::view! { <App /> });
}

/// Mount an additional chart application driven by a JSON configuration.
#[wasm_bindgen]
pub fn start_with_config(json: &str) -> Result<(), JsValue> {
    let config = AppConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;

    get_logger().info(
        LogComponent::Presentation("Initialize"),
        &format!("⚙️ Starting with feed {}", config.feed.base_url),
    );

    leptos::mount_to_body(move || leptos::view! { <App config=config /> });
    Ok(())
}
