//! Middleware pipeline: runs an ordered list of middleware over one
//! conversation turn, short-circuiting on the first terminal response.
//!
//! Middleware run strictly sequentially; each may depend on context
//! mutations made by the previous one. A middleware that errors is logged
//! and treated as having abstained so a single bad unit never kills the
//! conversation.

pub mod skip_to_lawyer;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::IntakeConfig;
use crate::context::ConversationContext;
use crate::intake::{LawyerSearch, OrganizationStore};
use crate::types::{ChatMessage, MiddlewareAction};

pub use skip_to_lawyer::SkipToLawyerMiddleware;

/// Request-scoped collaborators handed to every middleware.
#[derive(Clone)]
pub struct PipelineServices {
    pub config: Arc<IntakeConfig>,
    pub organizations: Arc<dyn OrganizationStore>,
    pub lawyer_search: Arc<dyn LawyerSearch>,
}

/// What a middleware hands back when it takes a position on the turn.
#[derive(Debug, Clone, PartialEq)]
pub struct MiddlewareResult {
    pub context: ConversationContext,
    pub response: String,
    /// True means the pipeline must not continue; `response` is final.
    pub should_stop: bool,
    pub metadata: Option<MiddlewareAction>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MiddlewareDecision {
    /// No opinion: context unchanged, next middleware runs.
    Abstain,
    Respond(MiddlewareResult),
}

#[async_trait]
pub trait Middleware: Send + Sync {
    fn name(&self) -> &'static str;

    async fn handle(
        &self,
        messages: &[ChatMessage],
        context: &ConversationContext,
        services: &PipelineServices,
    ) -> anyhow::Result<MiddlewareDecision>;
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// A middleware terminated the turn; the result is final.
    Terminal(MiddlewareResult),
    /// No middleware stopped the pipeline; the (possibly mutated) context
    /// goes to the downstream general-purpose agent.
    Continue(ConversationContext),
}

#[derive(Default)]
pub struct Pipeline {
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registration order is execution order.
    pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    pub async fn run(
        &self,
        messages: &[ChatMessage],
        context: ConversationContext,
        services: &PipelineServices,
    ) -> PipelineOutcome {
        let mut context = context;
        for middleware in &self.middleware {
            match middleware.handle(messages, &context, services).await {
                Ok(MiddlewareDecision::Abstain) => {}
                Ok(MiddlewareDecision::Respond(result)) => {
                    if result.should_stop {
                        tracing::debug!(
                            session_id = %result.context.session_id,
                            middleware = middleware.name(),
                            "middleware terminated pipeline"
                        );
                        return PipelineOutcome::Terminal(result);
                    }
                    // Non-terminal response: carry the mutated context to the
                    // next middleware and ultimately the downstream agent.
                    context = result.context;
                }
                Err(err) => {
                    tracing::warn!(
                        session_id = %context.session_id,
                        middleware = middleware.name(),
                        error = %err,
                        "middleware failed; treating as abstention"
                    );
                }
            }
        }
        PipelineOutcome::Continue(context)
    }
}
