//! Audit stage: records one line per request, never rejects.

use crate::audit::{self, AuditSink};
use crate::pipeline::{Stage, StageOutcome};
use crate::request::RequestDescriptor;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// First stage of the pipeline.
///
/// Appends an audit line for every request before any gate gets a say, so
/// rejected requests are on record too. A sink failure is logged and
/// swallowed; a broken audit file must not take the request path down.
pub struct RequestLogStage {
    sink: Arc<dyn AuditSink>,
}

impl RequestLogStage {
    /// Create the stage around a sink.
    #[must_use]
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl Stage for RequestLogStage {
    fn name(&self) -> &'static str {
        "request_log"
    }

    async fn apply(&self, request: &RequestDescriptor) -> StageOutcome {
        let line = audit::format_line(request.received_at, request.username(), &request.path);
        if let Err(error) = self.sink.append(&line) {
            warn!(error = %error, path = %request.path, "failed to append audit line");
        }
        StageOutcome::Continue
    }
}
