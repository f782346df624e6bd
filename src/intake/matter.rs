//! Coarse matter classification from raw conversation text.

use crate::config::KeywordConfig;
use crate::types::Urgency;

pub const MAX_REASON_CHARS: usize = 100;

/// Derived per-turn summary of what the user needs. Never persisted on its
/// own; a copy may land inside a pending contact form.
#[derive(Debug, Clone, PartialEq)]
pub struct MatterInfo {
    pub matter_type: String,
    pub urgency: Urgency,
    pub reason: String,
}

pub const GENERAL_CONSULTATION: &str = "General Consultation";

/// Pure keyword-table extractor. Deterministic for identical input; no I/O.
#[derive(Debug, Clone)]
pub struct MatterExtractor {
    matter_types: Vec<String>,
    high_urgency_terms: Vec<String>,
    low_urgency_terms: Vec<String>,
}

impl MatterExtractor {
    pub fn new(keywords: &KeywordConfig) -> Self {
        let lowered = |table: &[String]| {
            table
                .iter()
                .map(|s| s.to_ascii_lowercase())
                .collect::<Vec<_>>()
        };
        Self {
            matter_types: lowered(&keywords.matter_types),
            high_urgency_terms: lowered(&keywords.high_urgency_terms),
            low_urgency_terms: lowered(&keywords.low_urgency_terms),
        }
    }

    pub fn extract(&self, text: &str) -> MatterInfo {
        let lower = text.to_lowercase();
        MatterInfo {
            matter_type: self.matter_type(&lower),
            urgency: self.urgency(&lower),
            reason: truncate_reason(text),
        }
    }

    /// First configured match wins; table order is significant.
    fn matter_type(&self, lower: &str) -> String {
        self.matter_types
            .iter()
            .find(|phrase| lower.contains(phrase.as_str()))
            .cloned()
            .unwrap_or_else(|| GENERAL_CONSULTATION.to_string())
    }

    fn urgency(&self, lower: &str) -> Urgency {
        if self.high_urgency_terms.iter().any(|t| lower.contains(t.as_str())) {
            Urgency::High
        } else if self.low_urgency_terms.iter().any(|t| lower.contains(t.as_str())) {
            Urgency::Low
        } else {
            Urgency::Medium
        }
    }
}

/// Truncate to [`MAX_REASON_CHARS`] characters with a trailing ellipsis,
/// respecting char boundaries.
fn truncate_reason(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(MAX_REASON_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
