//! Observer port - diagnostics sink for services

use crate::services::LogEvent;

/// Receives diagnostic events from services
///
/// Recording must never fail the calling operation, so the method has no
/// return value. Implementations swallow their own errors.
pub trait EventObserver: Send + Sync {
    fn record(&self, event: LogEvent);
}

/// Observer that discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl EventObserver for NoopObserver {
    fn record(&self, _event: LogEvent) {}
}
