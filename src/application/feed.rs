//! Port between the chart binding and a push-only market data feed.

use derive_more::Display;
use std::rc::Rc;

use crate::domain::errors::AppError;
use crate::domain::selection::Selection;

/// Fully-qualified stream URL for one selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[display(fmt = "{}", _0)]
pub struct StreamAddress(String);

impl StreamAddress {
    /// `<base_url>/ws/<symbol-lowercase>@kline_<interval>`
    pub fn kline(base_url: &str, selection: &Selection) -> Self {
        Self(format!("{}/ws/{}", base_url.trim_end_matches('/'), selection.stream_name()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifies one subscription within a binding; never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display(fmt = "#{}", _0)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

/// Notifications a subscription delivers, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Opened,
    Message(String),
    Error(String),
    Closed { code: u16, reason: String },
}

/// Callback a connector delivers events through.
pub type EventSink = Rc<dyn Fn(SubscriptionId, FeedEvent)>;

/// Handle to a live subscription.
pub trait SubscriptionHandle {
    /// Request the subscription to stop. Calling it more than once is harmless.
    fn close(&mut self);
}

/// Opens subscriptions without blocking; completion arrives later as `FeedEvent::Opened`.
pub trait FeedConnector {
    type Handle: SubscriptionHandle;

    fn open(
        &self,
        id: SubscriptionId,
        address: &StreamAddress,
        sink: EventSink,
    ) -> Result<Self::Handle, AppError>;
}
