//! # Signal Hub
//!
//! Synchronous dispatch of [`ChangeEvent`]s to registered handlers.
//!
//! Handlers are registered per [`EventKind`] through [`SignalHubBuilder`] at
//! startup; nothing registers itself as a side effect of being linked in.
//! One publish runs its handlers sequentially in registration order on the
//! calling task, so ordering between reactions is explicit and a mandatory
//! failure can stop the mutation that triggered it.

use crate::error::{DispatchError, HandlerError};
use crate::events::{ChangeEvent, EventKind};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// What the hub does when a handler reports failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log the failure, record it in the outcome, keep going.
    BestEffort,
    /// Abort the publish; the triggering mutation must not proceed.
    Mandatory,
}

/// A reaction to one kind of lifecycle event.
#[async_trait]
pub trait SignalHandler: Send + Sync {
    /// Stable name used in logs and failure reports.
    fn name(&self) -> &'static str;

    /// How the hub treats this handler's failures.
    fn policy(&self) -> FailurePolicy {
        FailurePolicy::BestEffort
    }

    /// React to one event.
    async fn handle(&self, event: &ChangeEvent) -> Result<(), HandlerError>;
}

/// One best-effort failure recorded during a publish.
#[derive(Debug)]
pub struct HandlerFailure {
    /// Name of the handler that failed.
    pub handler: &'static str,
    /// The failure it reported.
    pub error: HandlerError,
}

/// What happened during one publish that ran to completion.
#[derive(Debug, Default)]
pub struct PublishOutcome {
    /// Handlers that completed without error.
    pub delivered: usize,
    /// Best-effort failures, in the order they occurred.
    pub failures: Vec<HandlerFailure>,
}

impl PublishOutcome {
    /// True when every invoked handler succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Startup-time registry construction for [`SignalHub`].
#[derive(Default)]
pub struct SignalHubBuilder {
    handlers: HashMap<EventKind, Vec<Arc<dyn SignalHandler>>>,
}

impl SignalHubBuilder {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler to the given kind's dispatch list.
    ///
    /// Handlers run in the order they were registered here.
    #[must_use]
    pub fn register(mut self, kind: EventKind, handler: Arc<dyn SignalHandler>) -> Self {
        debug!(kind = ?kind, handler = handler.name(), "handler registered");
        self.handlers.entry(kind).or_default().push(handler);
        self
    }

    /// Freeze the registry.
    #[must_use]
    pub fn build(self) -> SignalHub {
        SignalHub {
            handlers: self.handlers,
            events_published: AtomicU64::new(0),
        }
    }
}

/// Immutable handler registry plus the publish entry point.
pub struct SignalHub {
    handlers: HashMap<EventKind, Vec<Arc<dyn SignalHandler>>>,
    events_published: AtomicU64,
}

impl SignalHub {
    /// Start building a registry.
    #[must_use]
    pub fn builder() -> SignalHubBuilder {
        SignalHubBuilder::new()
    }

    /// Total handlers registered across all kinds.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }

    /// Names of the handlers a kind dispatches to, in dispatch order.
    #[must_use]
    pub fn handler_names(&self, kind: EventKind) -> Vec<&'static str> {
        self.handlers
            .get(&kind)
            .map(|handlers| handlers.iter().map(|h| h.name()).collect())
            .unwrap_or_default()
    }

    /// Total publish calls made against this hub.
    #[must_use]
    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }

    /// Deliver one event to every handler registered for its kind.
    ///
    /// Handlers run sequentially in registration order. A best-effort
    /// failure is logged, recorded, and does not stop later handlers. A
    /// mandatory failure aborts immediately; handlers after it do not run
    /// and the caller must not apply the triggering mutation.
    pub async fn publish(&self, event: &ChangeEvent) -> Result<PublishOutcome, DispatchError> {
        let kind = event.kind();
        self.events_published.fetch_add(1, Ordering::Relaxed);

        let mut outcome = PublishOutcome::default();
        let handlers = match self.handlers.get(&kind) {
            Some(handlers) => handlers,
            None => {
                debug!(kind = ?kind, entity = %event.entity_id(), "no handlers registered");
                return Ok(outcome);
            }
        };

        for handler in handlers {
            debug!(
                kind = ?kind,
                handler = handler.name(),
                entity = %event.entity_id(),
                "delivering event"
            );
            match handler.handle(event).await {
                Ok(()) => outcome.delivered += 1,
                Err(error) => match handler.policy() {
                    FailurePolicy::Mandatory => {
                        warn!(
                            handler = handler.name(),
                            error = %error,
                            "mandatory handler failed, aborting publish"
                        );
                        return Err(DispatchError::MandatoryHandlerFailed {
                            handler: handler.name(),
                            source: error,
                        });
                    }
                    FailurePolicy::BestEffort => {
                        warn!(
                            handler = handler.name(),
                            error = %error,
                            "handler failed, continuing"
                        );
                        outcome.failures.push(HandlerFailure {
                            handler: handler.name(),
                            error,
                        });
                    }
                },
            }
        }
        Ok(outcome)
    }
}
