//! Conversation middleware core for legal-intake assistants.
//!
//! The host request router hands each inbound turn to a [`pipeline::Pipeline`]
//! together with the session's [`context::ConversationContext`]. Middleware
//! inspect the turn, may mutate the context through explicit patches, and may
//! terminate the pipeline with a final response. The flagship unit,
//! [`pipeline::SkipToLawyerMiddleware`], detects explicit requests to bypass
//! intake and routes them to the public lawyer directory or to an
//! organization's contact-form flow depending on operating mode.
//!
//! The crate owns no wire protocol or CLI; session persistence, UI rendering,
//! and the downstream conversational agent are host concerns.

pub mod config;
pub mod context;
pub mod error;
pub mod intake;
pub mod pipeline;
pub mod telemetry;
pub mod types;

pub use config::{IntakeConfig, KeywordConfig, SearchConfig};
pub use context::{
    ContextPatch, ConversationContext, ConversationPhase, LawyerSearchResults, PendingContactForm,
};
pub use error::{ConfigError, LawyerSearchError, OrganizationLookupError};
pub use intake::{
    HttpLawyerSearch, LawyerSearch, MatterExtractor, MatterInfo, ModeResolver, OrganizationStore,
    StaticOrganizationStore,
};
pub use pipeline::{
    Middleware, MiddlewareDecision, MiddlewareResult, Pipeline, PipelineOutcome, PipelineServices,
    SkipToLawyerMiddleware,
};
pub use types::{
    ChatMessage, LawyerProfile, MessageRole, MiddlewareAction, Organization, SearchResult, Urgency,
};
