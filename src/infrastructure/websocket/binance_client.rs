use futures::future::{AbortHandle, Abortable};
use futures::{FutureExt, StreamExt, pin_mut, select};
use gloo_net::websocket::{Message, State, WebSocketError, futures::WebSocket};
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen_futures::spawn_local;

use crate::application::feed::{
    EventSink, FeedConnector, FeedEvent, StreamAddress, SubscriptionHandle, SubscriptionId,
};
use crate::domain::errors::{AppError, NetworkResult};
use crate::domain::logging::LogComponent;
use crate::{log_debug, log_info};

const COMPONENT: LogComponent = LogComponent::Infrastructure("BinanceWS");
/// Close code reported when the stream simply ends.
const NORMAL_CLOSURE: u16 = 1000;
/// How often a connecting socket is checked for `State::Open`.
const OPEN_POLL_INTERVAL_MS: u32 = 50;

/// Opens Binance kline streams over gloo-net websockets.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinanceStreamConnector;

impl BinanceStreamConnector {
    pub fn new() -> Self {
        Self
    }
}

/// A running stream task. Closing aborts the task, which drops and closes the socket.
#[derive(Debug)]
pub struct StreamSubscription {
    id: SubscriptionId,
    abort: AbortHandle,
}

impl SubscriptionHandle for StreamSubscription {
    fn close(&mut self) {
        if !self.abort.is_aborted() {
            log_debug!(COMPONENT, "Aborting stream task {}", self.id);
            self.abort.abort();
        }
    }
}

impl FeedConnector for BinanceStreamConnector {
    type Handle = StreamSubscription;

    fn open(
        &self,
        id: SubscriptionId,
        address: &StreamAddress,
        sink: EventSink,
    ) -> NetworkResult<StreamSubscription> {
        log_info!(COMPONENT, "🔌 Connecting to Binance: {}", address);

        let ws = WebSocket::open(address.as_str())
            .map_err(|e| AppError::NetworkError(format!("Failed to open WebSocket {address}: {e:?}")))?;

        let (abort, registration) = AbortHandle::new_pair();
        let task = Abortable::new(pump_frames(id, ws, sink), registration);
        spawn_local(async move {
            if task.await.is_err() {
                log_debug!(COMPONENT, "Stream task {} aborted", id);
            }
        });

        Ok(StreamSubscription { id, abort })
    }
}

/// Decides when a subscription reports `Opened`: once the socket reports
/// `State::Open`, or with the first frame if that is seen first. Fires once.
#[derive(Debug, Default)]
pub struct OpenTracker {
    reported: bool,
}

impl OpenTracker {
    pub fn is_reported(&self) -> bool {
        self.reported
    }

    pub fn on_state(&mut self, state: State) -> bool {
        if self.reported || !matches!(state, State::Open) {
            return false;
        }
        self.reported = true;
        true
    }

    pub fn on_frame(&mut self) -> bool {
        !std::mem::replace(&mut self.reported, true)
    }
}

enum Step {
    Frame(Option<Result<Message, WebSocketError>>),
    Tick,
}

/// Wait for the next frame, giving up after one poll interval.
async fn next_or_tick(ws: &mut WebSocket) -> Step {
    let next = ws.next().fuse();
    let tick = TimeoutFuture::new(OPEN_POLL_INTERVAL_MS).fuse();
    pin_mut!(next, tick);
    select! {
        frame = next => Step::Frame(frame),
        () = tick => Step::Tick,
    }
}

/// Forward frames from the socket to the sink until the stream ends.
async fn pump_frames(id: SubscriptionId, mut ws: WebSocket, sink: EventSink) {
    let mut open = OpenTracker::default();

    loop {
        let frame = if open.is_reported() {
            ws.next().await
        } else {
            if open.on_state(ws.state()) {
                sink(id, FeedEvent::Opened);
                continue;
            }
            match next_or_tick(&mut ws).await {
                Step::Frame(frame) => frame,
                Step::Tick => continue,
            }
        };
        let Some(frame) = frame else {
            break;
        };

        if frame.is_ok() && open.on_frame() {
            sink(id, FeedEvent::Opened);
        }

        match frame {
            Ok(Message::Text(text)) => sink(id, FeedEvent::Message(text)),
            Ok(Message::Bytes(bytes)) => {
                sink(id, FeedEvent::Message(String::from_utf8_lossy(&bytes).into_owned()))
            }
            Err(WebSocketError::ConnectionClose(event)) => {
                sink(id, FeedEvent::Closed { code: event.code, reason: event.reason });
                return;
            }
            Err(err) => sink(id, FeedEvent::Error(format!("{err:?}"))),
        }
    }

    sink(id, FeedEvent::Closed { code: NORMAL_CLOSURE, reason: "stream ended".to_string() });
}
