//! Concurrent multi-stream event generation engine.
//!
//! One stream per event category draws urgency levels from that category's
//! distribution, builds an event descriptor and hands it to a [`Dispatcher`].
//! The [`StreamOrchestrator`] runs the streams concurrently and returns once
//! all of them have reached their quota.

pub mod dispatch;
pub mod orchestrator;
pub mod progress;
pub mod sampler;
pub mod stream;

pub use dispatch::{DispatchError, Dispatcher, HttpDispatcher, LogDispatcher};
pub use orchestrator::StreamOrchestrator;
pub use progress::{CategoryStats, ProgressObserver, RunStats, TracingProgress};
pub use sampler::{sample_level, UrgencySampler, FALLBACK_URGENCY};
pub use stream::{StreamGenerator, StreamState};
