//! Per-session conversation state threaded through the middleware pipeline.
//!
//! The context is created once per session by the host's session manager,
//! rehydrated before each pipeline run, and handed back for persistence
//! afterwards. It is not internally synchronized; the session store must
//! serialize access per session before handing it in.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{LawyerProfile, Urgency};

/// Safety flag set when a public-mode search ran without any detectable
/// location in the conversation.
pub const FLAG_LOCATION_REQUIRED: &str = "location_required";

/// Coarse progress marker for the intake conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationPhase {
    #[default]
    Initial,
    Collecting,
    ContactCollection,
    Completed,
}

/// Set when the UI should render a contact form on the next turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingContactForm {
    pub matter_type: String,
    pub urgency: Urgency,
    pub reason: String,
}

/// Cached outcome of the most recent lawyer-directory search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LawyerSearchResults {
    pub matter_type: String,
    pub lawyers: Vec<LawyerProfile>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    pub session_id: Uuid,
    /// None means the conversation is a public-mode candidate.
    pub organization_id: Option<String>,
    pub conversation_phase: ConversationPhase,
    /// Matter types confirmed this session, in confirmation order.
    pub established_matters: Vec<String>,
    pub safety_flags: BTreeSet<String>,
    pub user_intent: Option<String>,
    pub pending_contact_form: Option<PendingContactForm>,
    pub lawyer_search_results: Option<LawyerSearchResults>,
    /// Bumped on every applied patch. Used for staleness checks, not locking.
    pub last_updated: DateTime<Utc>,
}

impl ConversationContext {
    pub fn new(session_id: Uuid, organization_id: Option<String>) -> Self {
        Self {
            session_id,
            organization_id,
            conversation_phase: ConversationPhase::default(),
            established_matters: Vec::new(),
            safety_flags: BTreeSet::new(),
            user_intent: None,
            pending_contact_form: None,
            lawyer_search_results: None,
            last_updated: Utc::now(),
        }
    }

    /// True once a matter has been confirmed or the conversation has moved
    /// past its opening phase. Gates skip-request suppression.
    pub fn has_established_legal_context(&self) -> bool {
        !self.established_matters.is_empty()
            || self.conversation_phase != ConversationPhase::Initial
    }

    /// Apply a patch with value semantics: consumes the old context, returns
    /// the new one, and bumps `last_updated`.
    pub fn apply(mut self, patch: ContextPatch) -> Self {
        if let Some(phase) = patch.conversation_phase {
            self.conversation_phase = phase;
        }
        if let Some(intent) = patch.user_intent {
            self.user_intent = Some(intent);
        }
        if let Some(matter) = patch.add_established_matter
            && !self.established_matters.contains(&matter)
        {
            self.established_matters.push(matter);
        }
        for flag in patch.add_safety_flags {
            self.safety_flags.insert(flag);
        }
        // At most one pending action is active at a time: setting either side
        // supersedes whatever an earlier turn left behind.
        if let Some(form) = patch.pending_contact_form {
            self.pending_contact_form = Some(form);
            self.lawyer_search_results = None;
        }
        if let Some(results) = patch.lawyer_search_results {
            self.lawyer_search_results = Some(results);
            self.pending_contact_form = None;
        }
        self.last_updated = Utc::now();
        self
    }
}

/// Partial update applied to a [`ConversationContext`]. Fields left at their
/// defaults leave the corresponding context field untouched.
#[derive(Debug, Clone, Default)]
pub struct ContextPatch {
    pub conversation_phase: Option<ConversationPhase>,
    pub user_intent: Option<String>,
    /// Appended only if not already present, so a retried trigger with
    /// identical input never double-appends.
    pub add_established_matter: Option<String>,
    pub add_safety_flags: Vec<String>,
    pub pending_contact_form: Option<PendingContactForm>,
    pub lawyer_search_results: Option<LawyerSearchResults>,
}
