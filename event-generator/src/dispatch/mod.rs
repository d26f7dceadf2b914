//! Dispatch boundary: where a finished event descriptor leaves the generator.

pub mod http;

pub use http::HttpDispatcher;

use async_trait::async_trait;
use common::{EventCategory, EventDescriptor};
use thiserror::Error;
use tracing::info;

pub const HEADER_EVENT_TYPE: &str = "X-Event-Type";
pub const HEADER_EVENT_URGENCY: &str = "X-Event-Urgency";
pub const HEADER_EVENT_ID: &str = "X-Event-ID";
pub const HEADER_EVENT_REQUEST_TIME: &str = "X-Event-Request-Time";

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server returned error: {status}")]
    Rejected { status: u16 },

    #[error("Send timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Sink for generated events. Failures are reported, never retried.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn send(&self, event: &EventDescriptor) -> Result<(), DispatchError>;
}

/// Header name/value pairs an event is sent with.
pub fn event_headers(event: &EventDescriptor) -> [(&'static str, String); 4] {
    [
        (
            HEADER_EVENT_TYPE,
            EventCategory::label_for_code(event.category.code()).to_string(),
        ),
        (HEADER_EVENT_URGENCY, event.urgency.to_string()),
        (HEADER_EVENT_ID, event.id.to_string()),
        (HEADER_EVENT_REQUEST_TIME, event.request_time()),
    ]
}

/// Dry-run sink: logs what would have been sent and always succeeds.
#[derive(Debug, Default, Clone)]
pub struct LogDispatcher;

#[async_trait]
impl Dispatcher for LogDispatcher {
    async fn send(&self, event: &EventDescriptor) -> Result<(), DispatchError> {
        let [(_, kind), (_, urgency), (_, id), (_, time)] = event_headers(event);
        info!(
            "[dry-run] type={} urgency={} id={} time={}",
            kind, urgency, id, time
        );
        Ok(())
    }
}
