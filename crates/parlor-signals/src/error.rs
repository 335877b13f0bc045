//! Error types for the dispatch and lifecycle layers.

use parlor_store::StoreError;
use thiserror::Error;

/// Failure produced by a single handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Storage access failed underneath the handler.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Handler-specific failure.
    #[error("{0}")]
    Failed(String),
}

impl HandlerError {
    /// Handler-specific failure from any printable message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// A publish that could not run to completion.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A handler registered as mandatory failed; later handlers did not run.
    #[error("mandatory handler '{handler}' failed: {source}")]
    MandatoryHandlerFailed {
        /// Name of the failing handler.
        handler: &'static str,
        /// The failure it reported.
        #[source]
        source: HandlerError,
    },
}

/// Failure from a lifecycle mutation.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The mutation's own storage access failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Pre-update history capture failed, so the update was not applied.
    #[error("update aborted: {0}")]
    HistoryCapture(#[source] DispatchError),

    /// A post-mutation publish failed after the row change committed.
    #[error("event dispatch failed: {0}")]
    Dispatch(#[source] DispatchError),
}
