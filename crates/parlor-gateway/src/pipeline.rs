//! The ordered, short-circuiting policy pipeline.
//!
//! Stages run in the fixed order they were assembled in; the first rejection
//! wins and nothing after it runs. The audit stage sits first and never
//! rejects, so every request leaves exactly one audit line behind no matter
//! how the later gates decide.

use crate::audit::AuditSink;
use crate::domain::config::{ConfigError, GatewayConfig};
use crate::domain::error::Rejection;
use crate::request::{PolicyDecision, RequestDescriptor};
use crate::stages::{RateLimitStage, RequestLogStage, RoleCheckStage, TimeOfDayStage};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// What a stage tells the executor to do next
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    /// Hand the request to the next stage
    Continue,
    /// Stop here; later stages and the terminal handler must not run
    Reject(Rejection),
}

/// One interception stage.
///
/// Stages inspect the descriptor and either wave the request through or
/// reject it. They never mutate the request.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Stable name used in logs and ordering assertions.
    fn name(&self) -> &'static str;

    /// Inspect one request.
    async fn apply(&self, request: &RequestDescriptor) -> StageOutcome;
}

/// The assembled pipeline.
pub struct PolicyPipeline {
    stages: Vec<Arc<dyn Stage>>,
}

impl PolicyPipeline {
    /// Assemble a pipeline from explicit stages, in the order given.
    #[must_use]
    pub fn new(stages: Vec<Arc<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// Assemble the standard pipeline from configuration.
    ///
    /// Order is fixed: request log, time-of-day gate, rate limit, role
    /// check. Disabled stages are left out entirely.
    pub fn from_config(
        config: &GatewayConfig,
        sink: Arc<dyn AuditSink>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut stages: Vec<Arc<dyn Stage>> = Vec::new();
        if config.audit.enabled {
            stages.push(Arc::new(RequestLogStage::new(sink)));
        }
        if config.time_window.enabled {
            stages.push(Arc::new(TimeOfDayStage::from_config(&config.time_window)));
        }
        if config.rate_limit.enabled {
            stages.push(Arc::new(RateLimitStage::from_config(&config.rate_limit)));
        }
        if config.role_gate.enabled {
            stages.push(Arc::new(RoleCheckStage::from_config(&config.role_gate)));
        }
        Ok(Self::new(stages))
    }

    /// Stage names in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Run every stage against the request and report the decision.
    pub async fn evaluate(&self, request: &RequestDescriptor) -> PolicyDecision {
        for stage in &self.stages {
            match stage.apply(request).await {
                StageOutcome::Continue => {
                    debug!(stage = stage.name(), path = %request.path, "stage passed");
                }
                StageOutcome::Reject(rejection) => {
                    warn!(
                        stage = stage.name(),
                        path = %request.path,
                        status = rejection.status,
                        reason = %rejection.reason,
                        "request rejected"
                    );
                    return PolicyDecision::Rejected(rejection);
                }
            }
        }
        PolicyDecision::Allowed
    }

    /// Evaluate the pipeline and, when allowed, run the terminal handler.
    pub async fn execute<T, F, Fut>(
        &self,
        request: &RequestDescriptor,
        terminal: F,
    ) -> Result<T, Rejection>
    where
        F: FnOnce(RequestDescriptor) -> Fut,
        Fut: Future<Output = T> + Send,
    {
        match self.evaluate(request).await {
            PolicyDecision::Allowed => Ok(terminal(request.clone()).await),
            PolicyDecision::Rejected(rejection) => Err(rejection),
        }
    }
}
