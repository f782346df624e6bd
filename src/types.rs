//! Shared DTOs for the intake pipeline and its collaborators.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// One conversation turn as handed to the pipeline by the host router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Urgency derived from conversation text. Never persisted beyond the turn
/// except inside a pending contact form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

/// External directory shape, consumed not owned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LawyerProfile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub lawyers: Vec<LawyerProfile>,
    /// Total matches known to the directory, which may exceed `lawyers.len()`.
    pub total: usize,
}

/// Organization record as returned by the lookup collaborator. Only `slug`
/// participates in mode resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub slug: String,
    pub name: String,
}

/// Structured metadata attached to a terminal middleware response, tagged by
/// the action the middleware took.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MiddlewareAction {
    LawyerSearchSuccess {
        total: usize,
        shown: usize,
    },
    QuotaExceededFallback {
        alternatives: Vec<String>,
    },
    ContactFormRequested {
        matter_type: String,
    },
}
