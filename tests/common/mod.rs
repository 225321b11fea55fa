#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use kline_chart_wasm::application::{
    ChartFeedBinding, ChartSurface, EventSink, FeedConnector, FeedEvent, StreamAddress,
    SubscriptionHandle, SubscriptionId, SurfaceFactory,
};
use kline_chart_wasm::domain::chart::{ChartTheme, SurfaceOptions};
use kline_chart_wasm::domain::errors::AppError;
use kline_chart_wasm::domain::market_data::{Candle, CandleSeries, Symbol, TimeInterval, UpsertOutcome};
use kline_chart_wasm::domain::selection::Selection;

pub const BASE_URL: &str = "wss://stream.binance.com:9443";

#[derive(Debug, Clone, PartialEq)]
pub enum FeedCall {
    Open(SubscriptionId, String),
    Close(SubscriptionId),
}

/// Records every open/close in call order.
#[derive(Default)]
pub struct FeedLog {
    pub calls: Vec<FeedCall>,
    pub sinks: Vec<(SubscriptionId, EventSink)>,
    pub fail_next_open: bool,
}

impl FeedLog {
    pub fn opens(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, FeedCall::Open(..))).count()
    }

    pub fn closes(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, FeedCall::Close(_))).count()
    }

    pub fn open_ids(&self) -> Vec<SubscriptionId> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                FeedCall::Open(id, _) => Some(*id),
                FeedCall::Close(_) => None,
            })
            .collect()
    }
}

#[derive(Clone, Default)]
pub struct FakeConnector {
    pub log: Rc<RefCell<FeedLog>>,
}

pub struct FakeHandle {
    id: SubscriptionId,
    log: Rc<RefCell<FeedLog>>,
    closed: bool,
}

impl SubscriptionHandle for FakeHandle {
    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.log.borrow_mut().calls.push(FeedCall::Close(self.id));
        }
    }
}

impl FeedConnector for FakeConnector {
    type Handle = FakeHandle;

    fn open(
        &self,
        id: SubscriptionId,
        address: &StreamAddress,
        sink: EventSink,
    ) -> Result<Self::Handle, AppError> {
        let mut log = self.log.borrow_mut();
        if log.fail_next_open {
            log.fail_next_open = false;
            return Err(AppError::NetworkError("connection refused".to_string()));
        }
        log.calls.push(FeedCall::Open(id, address.as_str().to_string()));
        log.sinks.push((id, sink));
        Ok(FakeHandle { id, log: Rc::clone(&self.log), closed: false })
    }
}

/// Counters shared between the fake factory and every surface it creates.
#[derive(Default)]
pub struct SurfaceLog {
    pub created: usize,
    pub disposed: usize,
    pub fits: usize,
    pub fail_create: bool,
    pub fail_render: bool,
    pub last_series: Vec<Candle>,
}

#[derive(Clone, Default)]
pub struct FakeSurfaceFactory {
    pub log: Rc<RefCell<SurfaceLog>>,
}

pub struct FakeSurface {
    series: CandleSeries,
    log: Rc<RefCell<SurfaceLog>>,
    disposed: bool,
}

impl FakeSurface {
    pub fn candles(&self) -> Vec<Candle> {
        self.series.candles().iter().cloned().collect()
    }
}

impl ChartSurface for FakeSurface {
    fn update(&mut self, candle: Candle) -> Result<UpsertOutcome, AppError> {
        if self.disposed || self.log.borrow().fail_render {
            return Err(AppError::RenderingError("surface lost".to_string()));
        }
        let outcome = self.series.upsert(candle)?;
        self.log.borrow_mut().last_series = self.candles();
        Ok(outcome)
    }

    fn fit_content(&mut self) {
        self.log.borrow_mut().fits += 1;
    }

    fn candle_count(&self) -> usize {
        self.series.len()
    }

    fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            self.series.clear();
            self.log.borrow_mut().disposed += 1;
        }
    }
}

impl SurfaceFactory for FakeSurfaceFactory {
    type Surface = FakeSurface;

    fn create(&self, options: &SurfaceOptions) -> Result<Self::Surface, AppError> {
        let mut log = self.log.borrow_mut();
        if log.fail_create {
            return Err(AppError::RenderingError("no 2d context".to_string()));
        }
        log.created += 1;
        Ok(FakeSurface {
            series: CandleSeries::new(options.max_candles),
            log: Rc::clone(&self.log),
            disposed: false,
        })
    }
}

pub type TestBinding = ChartFeedBinding<FakeSurfaceFactory, FakeConnector>;

/// Events captured by the sink, for tests that do not route them back.
pub type Delivered = Rc<RefCell<Vec<(SubscriptionId, FeedEvent)>>>;

pub struct Harness {
    pub binding: TestBinding,
    pub feed: Rc<RefCell<FeedLog>>,
    pub surfaces: Rc<RefCell<SurfaceLog>>,
    pub delivered: Delivered,
}

pub fn harness() -> Harness {
    let connector = FakeConnector::default();
    let factory = FakeSurfaceFactory::default();
    let delivered: Delivered = Rc::default();
    let captured = Rc::clone(&delivered);
    let sink: EventSink = Rc::new(move |id, event| captured.borrow_mut().push((id, event)));

    Harness {
        feed: Rc::clone(&connector.log),
        surfaces: Rc::clone(&factory.log),
        binding: ChartFeedBinding::new(factory, connector, BASE_URL, sink),
        delivered,
    }
}

pub fn options() -> SurfaceOptions {
    SurfaceOptions::new(800, 400, ChartTheme::default(), 1000)
}

pub fn selection(symbol: &str, interval: TimeInterval) -> Selection {
    Selection::new(Symbol::from(symbol), interval)
}

/// A kline payload in the feed's wire format.
pub fn kline_json(open_time_ms: u64, o: f64, h: f64, l: f64, c: f64) -> String {
    format!(
        r#"{{"e":"kline","E":{},"s":"ETHUSDT","k":{{"t":{},"o":"{}","h":"{}","l":"{}","c":"{}","i":"1m","x":false}}}}"#,
        open_time_ms + 500,
        open_time_ms,
        o,
        h,
        l,
        c
    )
}

pub type TestSlot = Rc<RefCell<Option<TestBinding>>>;

/// A binding kept in a shared slot whose sink routes events back into it,
/// the way the chart component wires it.
pub struct SlotHarness {
    pub slot: TestSlot,
    pub feed: Rc<RefCell<FeedLog>>,
    pub surfaces: Rc<RefCell<SurfaceLog>>,
    pub faults: Rc<RefCell<Vec<AppError>>>,
}

impl SlotHarness {
    /// Deliver an event through the sink captured for subscription `id`.
    pub fn emit(&self, id: SubscriptionId, event: FeedEvent) {
        let sink = self
            .feed
            .borrow()
            .sinks
            .iter()
            .find(|(sink_id, _)| *sink_id == id)
            .map(|(_, sink)| Rc::clone(sink))
            .expect("no sink captured for subscription");
        sink(id, event);
    }
}

pub fn slot_harness() -> SlotHarness {
    let connector = FakeConnector::default();
    let factory = FakeSurfaceFactory::default();
    let feed = Rc::clone(&connector.log);
    let surfaces = Rc::clone(&factory.log);
    let faults: Rc<RefCell<Vec<AppError>>> = Rc::default();

    let slot: TestSlot = Rc::new(RefCell::new(None));
    let weak = Rc::downgrade(&slot);
    let recorded = Rc::clone(&faults);
    let sink: EventSink = Rc::new(move |id, event| {
        if let Err(err) = kline_chart_wasm::application::route_event(&weak, id, event) {
            recorded.borrow_mut().push(err);
        }
    });

    *slot.borrow_mut() = Some(ChartFeedBinding::new(factory, connector, BASE_URL, sink));
    SlotHarness { slot, feed, surfaces, faults }
}
