//! Detects explicit "skip intake, get me a lawyer" requests and routes them
//! to either the public lawyer directory or the organization's contact form.

use aho_corasick::AhoCorasick;
use async_trait::async_trait;

use crate::config::IntakeConfig;
use crate::context::{
    ContextPatch, ConversationContext, ConversationPhase, FLAG_LOCATION_REQUIRED,
    LawyerSearchResults, PendingContactForm,
};
use crate::error::{ConfigError, LawyerSearchError};
use crate::intake::{MatterExtractor, MatterInfo, ModeResolver, signals};
use crate::pipeline::{Middleware, MiddlewareDecision, MiddlewareResult, PipelineServices};
use crate::types::{ChatMessage, MessageRole, MiddlewareAction};

/// At most this many lawyer summaries are listed, regardless of result size.
const MAX_LISTED_LAWYERS: usize = 3;

/// Conversations at or under this many turns are treated as early enough
/// that a skip request wins even with established legal context.
const EARLY_CONVERSATION_TURNS: usize = 3;

const FALLBACK_ALTERNATIVES: &[&str] = &["bar_association", "online_directories", "case_preparation"];

const CASE_PREP_PIVOT: &str = "In the meantime, I can help you prepare your case details \
so you're ready when you connect with one. You could also try your local bar association's \
referral service or an online directory. Want to start by telling me what happened?";

pub struct SkipToLawyerMiddleware {
    skip_matcher: AhoCorasick,
    urgent_matcher: AhoCorasick,
    extractor: MatterExtractor,
    mode: ModeResolver,
}

impl SkipToLawyerMiddleware {
    pub fn new(config: &IntakeConfig) -> Result<Self, ConfigError> {
        let matcher = |key: &str, phrases: &[String]| {
            AhoCorasick::builder()
                .ascii_case_insensitive(true)
                .build(phrases)
                .map_err(|e| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: e.to_string(),
                })
        };
        Ok(Self {
            skip_matcher: matcher("INTAKE_SKIP_PHRASES", &config.keywords.skip_phrases)?,
            urgent_matcher: matcher("INTAKE_URGENT_PHRASES", &config.keywords.urgent_phrases)?,
            extractor: MatterExtractor::new(&config.keywords),
            mode: ModeResolver::new(config.public_org_slug.clone()),
        })
    }

    /// Public mode: call the directory and terminate the pipeline with either
    /// results or a fallback pivot. Failures never mutate the context.
    async fn lawyer_search_turn(
        &self,
        context: &ConversationContext,
        matter: &MatterInfo,
        transcript: &str,
        services: &PipelineServices,
    ) -> MiddlewareDecision {
        match services
            .lawyer_search
            .search(&matter.matter_type, None)
            .await
        {
            Ok(result) => {
                let shown = result.lawyers.len().min(MAX_LISTED_LAWYERS);
                let response = format_search_response(&matter.matter_type, &result);
                tracing::info!(
                    session_id = %context.session_id,
                    matter_type = %matter.matter_type,
                    total = result.total,
                    shown,
                    "lawyer search succeeded"
                );

                let mut flags = Vec::new();
                if !signals::mentions_location(transcript) {
                    flags.push(FLAG_LOCATION_REQUIRED.to_string());
                }
                let total = result.total;
                let context = context.clone().apply(ContextPatch {
                    lawyer_search_results: Some(LawyerSearchResults {
                        matter_type: matter.matter_type.clone(),
                        lawyers: result.lawyers,
                        total,
                    }),
                    add_safety_flags: flags,
                    ..Default::default()
                });
                MiddlewareDecision::Respond(MiddlewareResult {
                    context,
                    response,
                    should_stop: true,
                    metadata: Some(MiddlewareAction::LawyerSearchSuccess { total, shown }),
                })
            }
            Err(err) => {
                match &err {
                    LawyerSearchError::MissingApiKey => tracing::warn!(
                        session_id = %context.session_id,
                        "lawyer search not configured; falling back to case preparation"
                    ),
                    LawyerSearchError::QuotaExceeded(_) => tracing::info!(
                        session_id = %context.session_id,
                        "lawyer search quota exceeded; pivoting to case preparation"
                    ),
                    other => tracing::error!(
                        session_id = %context.session_id,
                        error = %other,
                        "lawyer search failed; pivoting to case preparation"
                    ),
                }
                MiddlewareDecision::Respond(MiddlewareResult {
                    context: context.clone(),
                    response: fallback_response(&err),
                    should_stop: true,
                    metadata: Some(MiddlewareAction::QuotaExceededFallback {
                        alternatives: FALLBACK_ALTERNATIVES
                            .iter()
                            .map(|s| s.to_string())
                            .collect(),
                    }),
                })
            }
        }
    }

    /// Organization mode: signal intent on the context and let the downstream
    /// agent render the contact-form turn. Deliberately non-terminal.
    fn contact_form_turn(
        &self,
        context: &ConversationContext,
        matter: MatterInfo,
    ) -> MiddlewareDecision {
        tracing::info!(
            session_id = %context.session_id,
            matter_type = %matter.matter_type,
            "routing skip request to organization contact form"
        );
        let matter_type = matter.matter_type.clone();
        let context = context.clone().apply(ContextPatch {
            user_intent: Some("lawyer_contact".to_string()),
            conversation_phase: Some(ConversationPhase::ContactCollection),
            add_established_matter: Some(matter.matter_type.clone()),
            pending_contact_form: Some(PendingContactForm {
                matter_type: matter.matter_type,
                urgency: matter.urgency,
                reason: matter.reason,
            }),
            ..Default::default()
        });
        MiddlewareDecision::Respond(MiddlewareResult {
            context,
            response: String::new(),
            should_stop: false,
            metadata: Some(MiddlewareAction::ContactFormRequested { matter_type }),
        })
    }
}

#[async_trait]
impl Middleware for SkipToLawyerMiddleware {
    fn name(&self) -> &'static str {
        "skip_to_lawyer"
    }

    async fn handle(
        &self,
        messages: &[ChatMessage],
        context: &ConversationContext,
        services: &PipelineServices,
    ) -> anyhow::Result<MiddlewareDecision> {
        // Scan only the latest user turn: lawyer-related words from earlier
        // in the conversation must not hijack the flow.
        let Some(latest) = messages.last() else {
            return Ok(MiddlewareDecision::Abstain);
        };
        if latest.role != MessageRole::User || latest.content.trim().is_empty() {
            return Ok(MiddlewareDecision::Abstain);
        }

        if !self.skip_matcher.is_match(latest.content.as_str()) {
            return Ok(MiddlewareDecision::Abstain);
        }
        let is_urgent = self.urgent_matcher.is_match(latest.content.as_str());

        // Once a matter is established and the conversation has run long,
        // only urgent requests may still interrupt.
        if context.has_established_legal_context()
            && messages.len() > EARLY_CONVERSATION_TURNS
            && !is_urgent
        {
            tracing::debug!(
                session_id = %context.session_id,
                turns = messages.len(),
                "skip phrase suppressed in established conversation"
            );
            return Ok(MiddlewareDecision::Abstain);
        }

        tracing::info!(
            session_id = %context.session_id,
            urgent = is_urgent,
            turns = messages.len(),
            "explicit skip-to-lawyer request detected"
        );

        let public_mode = self
            .mode
            .resolve(context.organization_id.as_deref(), services.organizations.as_ref())
            .await;

        let transcript = messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let matter = self.extractor.extract(&transcript);

        if public_mode {
            Ok(self
                .lawyer_search_turn(context, &matter, &transcript, services)
                .await)
        } else {
            Ok(self.contact_form_turn(context, matter))
        }
    }
}

fn fallback_response(err: &LawyerSearchError) -> String {
    match err {
        LawyerSearchError::MissingApiKey => format!(
            "I can't search the lawyer directory right now. {CASE_PREP_PIVOT}"
        ),
        LawyerSearchError::QuotaExceeded(message)
        | LawyerSearchError::Timeout(message)
        | LawyerSearchError::Service(message) => {
            format!("{message}. {CASE_PREP_PIVOT}")
        }
        LawyerSearchError::Transport(_) => format!(
            "I'm having trouble connecting to the lawyer directory right now. {CASE_PREP_PIVOT}"
        ),
    }
}

fn format_search_response(matter_type: &str, result: &crate::types::SearchResult) -> String {
    let mut out = format!(
        "I found {} lawyers who handle {} matters. Here are the top matches:\n",
        result.total, matter_type
    );
    for (index, lawyer) in result.lawyers.iter().take(MAX_LISTED_LAWYERS).enumerate() {
        out.push('\n');
        out.push_str(&format!("{}. {}", index + 1, format_lawyer_summary(lawyer)));
    }
    out.push_str("\n\nWould you like help preparing questions before you reach out?");
    out
}

fn format_lawyer_summary(lawyer: &crate::types::LawyerProfile) -> String {
    let mut line = lawyer.name.clone();
    if let Some(firm) = &lawyer.firm {
        line.push_str(&format!(" at {firm}"));
    }
    if let Some(location) = &lawyer.location {
        line.push_str(&format!(" ({location})"));
    }
    let mut contact = Vec::new();
    if let Some(phone) = &lawyer.phone {
        contact.push(format!("Phone: {phone}"));
    }
    if let Some(email) = &lawyer.email {
        contact.push(format!("Email: {email}"));
    }
    if !contact.is_empty() {
        line.push_str(&format!("\n   {}", contact.join(" | ")));
    }
    line
}
