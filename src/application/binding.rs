//! Chart-Feed Binding: one chart surface per mount, one live subscription per selection.
//!
//! The binding owns both resources exclusively. Two independent lifecycles run
//! inside it:
//!
//! - the surface is created by [`ChartFeedBinding::mount`] and released by
//!   [`ChartFeedBinding::unmount`]; selection changes never touch it;
//! - the subscription is replaced by [`ChartFeedBinding::rebind`], which closes
//!   the previous subscription before opening the next one.
//!
//! Events are tagged with the [`SubscriptionId`] they were opened under. Anything
//! arriving for an id that is no longer current (a socket still winding down
//! after a switch, or after unmount) is dropped without touching the surface.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::application::feed::{
    EventSink, FeedConnector, FeedEvent, StreamAddress, SubscriptionHandle, SubscriptionId,
};
use crate::application::surface::{ChartSurface, SurfaceFactory};
use crate::domain::chart::SurfaceOptions;
use crate::domain::errors::AppError;
use crate::domain::logging::LogComponent;
use crate::domain::selection::Selection;
use crate::infrastructure::websocket::decode_kline;
use crate::{log_debug, log_error, log_info, log_trace, log_warn};

const COMPONENT: LogComponent = LogComponent::Application("ChartFeedBinding");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    /// Opened locally, no frame received yet.
    Connecting,
    Open,
    /// The feed ended the stream. Stays silent until the selection changes.
    Closed,
}

/// Counters for everything the binding reported or dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindingStats {
    pub candles_applied: u64,
    pub decode_errors: u64,
    pub rejected_candles: u64,
    pub connection_errors: u64,
    pub stale_events: u64,
    pub subscriptions_opened: u64,
    pub subscriptions_closed: u64,
}

struct ActiveSubscription<H> {
    id: SubscriptionId,
    selection: Selection,
    address: StreamAddress,
    handle: H,
    status: SubscriptionStatus,
}

pub struct ChartFeedBinding<F: SurfaceFactory, C: FeedConnector> {
    factory: F,
    connector: C,
    base_url: String,
    sink: EventSink,
    surface: Option<F::Surface>,
    subscription: Option<ActiveSubscription<C::Handle>>,
    next_id: SubscriptionId,
    stats: BindingStats,
    last_error: Option<AppError>,
}

/// Shared slot a UI component keeps its binding in.
pub type BindingSlot<F, C> = Rc<RefCell<Option<ChartFeedBinding<F, C>>>>;

impl<F: SurfaceFactory, C: FeedConnector> ChartFeedBinding<F, C> {
    /// `sink` is handed to every subscription the binding opens.
    pub fn new(factory: F, connector: C, base_url: impl Into<String>, sink: EventSink) -> Self {
        Self {
            factory,
            connector,
            base_url: base_url.into(),
            sink,
            surface: None,
            subscription: None,
            next_id: SubscriptionId::new(1),
            stats: BindingStats::default(),
            last_error: None,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface(&self) -> Option<&F::Surface> {
        self.surface.as_ref()
    }

    pub fn active_selection(&self) -> Option<&Selection> {
        self.subscription.as_ref().map(|active| &active.selection)
    }

    pub fn active_subscription(&self) -> Option<SubscriptionId> {
        self.subscription.as_ref().map(|active| active.id)
    }

    pub fn subscription_status(&self) -> Option<SubscriptionStatus> {
        self.subscription.as_ref().map(|active| active.status)
    }

    pub fn stats(&self) -> BindingStats {
        self.stats
    }

    pub fn last_error(&self) -> Option<&AppError> {
        self.last_error.as_ref()
    }

    /// Create the surface, attach its series and fit the time axis.
    pub fn mount(&mut self, options: &SurfaceOptions) -> Result<(), AppError> {
        if self.surface.is_some() {
            log_warn!(COMPONENT, "Surface already mounted; ignoring mount");
            return Ok(());
        }

        let mut surface = match self.factory.create(options) {
            Ok(surface) => surface,
            Err(err) => {
                log_error!(COMPONENT, "❌ Failed to create chart surface: {}", err);
                self.last_error = Some(err.clone());
                return Err(err);
            }
        };
        surface.fit_content();
        self.surface = Some(surface);

        log_info!(COMPONENT, "📊 Chart surface mounted ({}x{})", options.width, options.height);
        Ok(())
    }

    /// Point the binding at a new selection: close the current subscription, then open one.
    ///
    /// Ignored while unmounted and when the selection is already the active one.
    pub fn rebind(&mut self, selection: Selection) {
        if self.surface.is_none() {
            log_warn!(COMPONENT, "Ignoring rebind to {} while unmounted", selection);
            return;
        }
        if self.active_selection() == Some(&selection) {
            log_debug!(COMPONENT, "Already bound to {}", selection);
            return;
        }

        self.close_subscription();

        let id = self.next_id;
        self.next_id = id.next();
        let address = StreamAddress::kline(&self.base_url, &selection);

        match self.connector.open(id, &address, Rc::clone(&self.sink)) {
            Ok(handle) => {
                log_info!(COMPONENT, "🔌 Opened {} for {} ({})", address, selection, id);
                self.stats.subscriptions_opened += 1;
                self.subscription = Some(ActiveSubscription {
                    id,
                    selection,
                    address,
                    handle,
                    status: SubscriptionStatus::Connecting,
                });
            }
            Err(err) => {
                log_error!(COMPONENT, "❌ Failed to open {}: {}", address, err);
                self.stats.connection_errors += 1;
                self.last_error = Some(err);
            }
        }
    }

    /// Close the active subscription, if any.
    pub fn close_subscription(&mut self) {
        if let Some(mut active) = self.subscription.take() {
            active.handle.close();
            self.stats.subscriptions_closed += 1;
            log_info!(COMPONENT, "🔌 Closed {} ({})", active.address, active.id);
        }
    }

    /// Close the subscription and release the surface. Safe to call repeatedly.
    pub fn unmount(&mut self) {
        self.close_subscription();
        if let Some(mut surface) = self.surface.take() {
            surface.dispose();
            log_info!(COMPONENT, "🧹 Chart surface released");
        }
    }

    /// Process one feed event.
    ///
    /// Decode and connection problems are reported and absorbed. Only a
    /// rendering fault comes back as `Err`; the caller decides how to surface it.
    pub fn handle_event(&mut self, id: SubscriptionId, event: FeedEvent) -> Result<(), AppError> {
        if self.active_subscription() != Some(id) {
            self.stats.stale_events += 1;
            log_debug!(COMPONENT, "Dropping event from inactive subscription {}: {:?}", id, event);
            return Ok(());
        }

        match event {
            FeedEvent::Opened => self.on_opened(),
            FeedEvent::Message(text) => return self.on_message(id, &text),
            FeedEvent::Error(reason) => self.on_error(id, reason),
            FeedEvent::Closed { code, reason } => self.on_closed(id, code, &reason),
        }
        Ok(())
    }

    fn on_opened(&mut self) {
        if let Some(active) = self.subscription.as_mut() {
            active.status = SubscriptionStatus::Open;
            log_info!(COMPONENT, "✅ WebSocket connected: {} ({})", active.address, active.id);
        }
    }

    fn on_message(&mut self, id: SubscriptionId, text: &str) -> Result<(), AppError> {
        let candle = match decode_kline(text) {
            Ok(candle) => candle,
            Err(err) => {
                log_error!(COMPONENT, "❌ Error processing message on {}: {}", id, err);
                self.stats.decode_errors += 1;
                self.last_error = Some(err);
                return Ok(());
            }
        };

        let Some(surface) = self.surface.as_mut() else {
            self.stats.stale_events += 1;
            return Ok(());
        };

        let time = candle.time.value();
        match surface.update(candle) {
            Ok(outcome) => {
                self.stats.candles_applied += 1;
                log_trace!(COMPONENT, "{:?} bar {} on {}", outcome, time, id);
                Ok(())
            }
            Err(AppError::RenderingError(msg)) => {
                let err = AppError::RenderingError(msg);
                log_error!(COMPONENT, "❌ Chart update failed: {}", err);
                self.last_error = Some(err.clone());
                Err(err)
            }
            Err(err) => {
                log_warn!(COMPONENT, "Rejected bar {} on {}: {}", time, id, err);
                self.stats.rejected_candles += 1;
                self.last_error = Some(err);
                Ok(())
            }
        }
    }

    fn on_error(&mut self, id: SubscriptionId, reason: String) {
        log_error!(COMPONENT, "❌ WebSocket error on {}: {}", id, reason);
        self.stats.connection_errors += 1;
        self.last_error = Some(AppError::NetworkError(reason));
    }

    fn on_closed(&mut self, id: SubscriptionId, code: u16, reason: &str) {
        if let Some(active) = self.subscription.as_mut() {
            active.status = SubscriptionStatus::Closed;
        }
        log_warn!(
            COMPONENT,
            "🔌 WebSocket disconnected on {} (code {}, reason {:?}); waiting for a new selection",
            id,
            code,
            reason
        );
    }
}

impl<F: SurfaceFactory, C: FeedConnector> Drop for ChartFeedBinding<F, C> {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Deliver an event to the binding kept in `slot`.
///
/// Events for a binding that no longer exists are dropped. When the binding
/// reports a rendering fault it is unmounted before the fault is returned, so
/// nothing keeps feeding a broken surface.
pub fn route_event<F: SurfaceFactory, C: FeedConnector>(
    slot: &Weak<RefCell<Option<ChartFeedBinding<F, C>>>>,
    id: SubscriptionId,
    event: FeedEvent,
) -> Result<(), AppError> {
    let Some(slot) = slot.upgrade() else {
        return Ok(());
    };
    let Ok(mut guard) = slot.try_borrow_mut() else {
        log_warn!(COMPONENT, "Binding busy; dropping event from {}", id);
        return Ok(());
    };
    let Some(binding) = guard.as_mut() else {
        return Ok(());
    };

    binding.handle_event(id, event).inspect_err(|_| binding.unmount())
}
