//! Process-wide error observer.
//!
//! Execution failures are both answered with a generic 500 and forwarded
//! here, exactly once per failure. The trait seam keeps the forwarding
//! observable in tests.

use crate::error::ServerError;
use tracing::error;

/// Receives every execution failure a handler surfaces to a client.
pub trait ErrorObserver: Send + Sync {
    fn notify(&self, operation: &str, error: &ServerError);
}

/// Default observer: structured log at error level. Failure detail lands in
/// the logs only, never in the client response.
pub struct TracingObserver;

impl ErrorObserver for TracingObserver {
    fn notify(&self, operation: &str, error: &ServerError) {
        error!(operation = %operation, error = %error, "request failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_observer_does_not_panic() {
        TracingObserver.notify("save_treatment_plan", &ServerError::execution("boom"));
    }
}
