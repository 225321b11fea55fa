use leptos::html::Div;
use leptos::*;
use std::cell::RefCell;
use std::rc::Rc;

use crate::{
    application::{BindingSlot, ChartFeedBinding, EventSink, FeedEvent, SubscriptionId, route_event},
    config::AppConfig,
    domain::{
        errors::AppError,
        logging::LogComponent,
        market_data::{Symbol, TimeInterval},
        selection::{Selection, SelectionState},
    },
    infrastructure::{rendering::CanvasSurfaceFactory, websocket::BinanceStreamConnector},
    log_error, log_warn,
};

const COMPONENT: LogComponent = LogComponent::Presentation("App");

type BrowserBinding = ChartFeedBinding<CanvasSurfaceFactory, BinanceStreamConnector>;
type BrowserSlot = BindingSlot<CanvasSurfaceFactory, BinanceStreamConnector>;

const STYLES: &str = r#"
.app {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
    background: #131722;
    color: #d1d4dc;
    min-height: 100vh;
    display: flex;
    flex-direction: column;
}
.app-header {
    display: flex;
    justify-content: space-between;
    align-items: center;
    padding: 16px 24px;
    border-bottom: 1px solid #2a2e39;
}
.controls { display: flex; gap: 12px; }
.select-wrapper select {
    background: #1e222d;
    color: #d1d4dc;
    border: 1px solid #363a45;
    border-radius: 4px;
    padding: 6px 10px;
}
.app-main { flex: 1; padding: 24px; }
.chart-container { width: 100%; }
.chart-fault {
    height: 400px;
    display: flex;
    flex-direction: column;
    align-items: center;
    justify-content: center;
    background: #1e222d;
    color: #ef5350;
}
.app-footer { padding: 12px 24px; font-size: 12px; color: #787b86; }
"#;

/// 🦀 Top-level view: selectors, chart region and attribution.
#[component]
pub fn App(#[prop(optional)] config: Option<AppConfig>) -> impl IntoView {
    let config = config.unwrap_or_default();

    let state = match config.validate().and_then(|_| SelectionState::new(config.selection.clone())) {
        Ok(state) => state,
        Err(err) => {
            log_error!(COMPONENT, "❌ Invalid configuration: {}", err);
            return view! { <div class="app"><p class="chart-fault">{err.to_string()}</p></div> }
                .into_view();
        }
    };

    let selection_state = create_rw_signal(state);
    let selection = create_memo(move |_| selection_state.with(|s| s.current().clone()));

    view! {
        <style>{STYLES}</style>
        <div class="app">
            <header class="app-header">
                <h1>"Crypto Market Data"</h1>
                <SelectionControls state=selection_state />
            </header>
            <main class="app-main">
                <ErrorBoundary fallback=|errors| view! { <ChartFault errors=errors /> }>
                    <CandlestickChart selection=selection config=config.clone() />
                </ErrorBoundary>
            </main>
            <footer class="app-footer">
                <p>"Data provided by Binance"</p>
            </footer>
        </div>
    }
    .into_view()
}

/// Symbol and interval pickers over the configured closed sets.
#[component]
fn SelectionControls(state: RwSignal<SelectionState>) -> impl IntoView {
    let symbols = state.with_untracked(|s| s.symbols().to_vec());
    let intervals = state.with_untracked(|s| s.intervals().to_vec());

    let on_symbol = move |ev: ev::Event| {
        let symbol = Symbol::from(event_target_value(&ev).as_str());
        state.update(|s| {
            if let Err(err) = s.set_symbol(symbol) {
                log_warn!(COMPONENT, "{}", err);
            }
        });
    };

    let on_interval = move |ev: ev::Event| {
        let value = event_target_value(&ev);
        match value.parse::<TimeInterval>() {
            Ok(interval) => state.update(|s| {
                if let Err(err) = s.set_interval(interval) {
                    log_warn!(COMPONENT, "{}", err);
                }
            }),
            Err(_) => {
                log_warn!(COMPONENT, "Unknown interval option: {}", value);
            }
        }
    };

    view! {
        <div class="controls">
            <div class="select-wrapper">
                <select
                    prop:value=move || state.with(|s| s.symbol().value().to_string())
                    on:change=on_symbol
                >
                    {symbols
                        .into_iter()
                        .map(|symbol| {
                            let value = symbol.value().to_string();
                            view! { <option value=value.clone()>{value}</option> }
                        })
                        .collect_view()}
                </select>
            </div>
            <div class="select-wrapper">
                <select
                    prop:value=move || state.with(|s| s.interval().to_string())
                    on:change=on_interval
                >
                    {intervals
                        .into_iter()
                        .map(|interval| {
                            let value = interval.to_string();
                            view! { <option value=value.clone()>{value}</option> }
                        })
                        .collect_view()}
                </select>
            </div>
        </div>
    }
}

/// Placeholder shown in place of the chart after a rendering fault.
#[component]
fn ChartFault(errors: RwSignal<Errors>) -> impl IntoView {
    view! {
        <div class="chart-fault">
            <p>"The chart stopped rendering."</p>
            <ul>
                {move || {
                    errors
                        .get()
                        .into_iter()
                        .map(|(_, err)| view! { <li>{err.to_string()}</li> })
                        .collect_view()
                }}
            </ul>
        </div>
    }
}

/// Chart region: owns the binding between the canvas surface and the live feed.
#[component]
pub fn CandlestickChart(#[prop(into)] selection: Signal<Selection>, config: AppConfig) -> impl IntoView {
    let container_ref = create_node_ref::<Div>();
    let fault = create_rw_signal::<Option<AppError>>(None);
    let slot: BrowserSlot = Rc::new(RefCell::new(None));

    {
        let slot = Rc::clone(&slot);
        create_effect(move |_| {
            let selection = selection.get();
            let Some(container) = container_ref.get() else {
                return;
            };
            if fault.get_untracked().is_some() {
                return;
            }

            let mut guard = slot.borrow_mut();
            if guard.is_none() {
                let div: &web_sys::HtmlDivElement = &container;
                let element: web_sys::HtmlElement = div.clone().into();
                let options = config.chart.surface_options(element.client_width());

                let mut binding = new_binding(element, &slot, &config, fault);
                if let Err(err) = binding.mount(&options) {
                    drop(guard);
                    fault.set(Some(err));
                    return;
                }
                *guard = Some(binding);
            }

            if let Some(binding) = guard.as_mut() {
                binding.rebind(selection);
            }
        });
    }

    on_cleanup(move || {
        if let Some(mut binding) = slot.borrow_mut().take() {
            binding.unmount();
        }
    });

    view! {
        <div class="chart-container" node_ref=container_ref></div>
        {move || fault.get().map_or(Ok(()), Err)}
    }
}

fn new_binding(
    container: web_sys::HtmlElement,
    slot: &BrowserSlot,
    config: &AppConfig,
    fault: RwSignal<Option<AppError>>,
) -> BrowserBinding {
    let weak = Rc::downgrade(slot);
    let sink: EventSink = Rc::new(move |id: SubscriptionId, event: FeedEvent| {
        if let Err(err) = route_event(&weak, id, event) {
            log_error!(COMPONENT, "❌ Chart fault: {}", err);
            fault.set(Some(err));
        }
    });

    ChartFeedBinding::new(
        CanvasSurfaceFactory::new(container),
        BinanceStreamConnector::new(),
        config.feed.base_url.clone(),
        sink,
    )
}
