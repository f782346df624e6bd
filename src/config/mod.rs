//! Env-driven configuration for the intake middleware core.
//!
//! Keyword tables are configuration data, not globals: they are resolved
//! once at startup and injected into the detectors so hosts can tune or
//! localize them without touching detection code.

mod helpers;

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::config::helpers::{
    optional_env, parse_duration_secs_env, parse_phrases_env, parse_string_env,
};
use crate::error::ConfigError;

const DEFAULT_PUBLIC_ORG_SLUG: &str = "public";
const DEFAULT_SEARCH_BASE_URL: &str = "https://directory.lawyered.example/api/v1/";
const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Phrases that mark an explicit request to bypass intake. Matched against
/// the latest user turn only.
const DEFAULT_SKIP_PHRASES: &[&str] = &[
    "skip the intake",
    "skip intake",
    "find a lawyer",
    "find me a lawyer",
    "need a lawyer",
    "get me a lawyer",
    "talk to a lawyer",
    "speak to a lawyer",
    "speak with a lawyer",
    "connect me with a lawyer",
    "contact your organization",
    "contact the firm",
];

/// Stricter table: phrases urgent enough to override conservative
/// suppression late in a conversation.
const DEFAULT_URGENT_PHRASES: &[&str] = &[
    "need a lawyer asap",
    "lawyer asap",
    "lawyer now",
    "need a lawyer now",
    "need a lawyer immediately",
    "urgent lawyer",
    "emergency lawyer",
];

/// Matter-type phrases in priority order; the first configured match wins.
const DEFAULT_MATTER_TYPES: &[&str] = &[
    "family law",
    "personal injury",
    "criminal defense",
    "estate planning",
    "immigration",
    "bankruptcy",
    "employment law",
    "real estate",
    "business law",
    "intellectual property",
    "landlord",
    "tenant",
];

const DEFAULT_HIGH_URGENCY_TERMS: &[&str] = &["urgent", "emergency", "immediate", "asap"];
const DEFAULT_LOW_URGENCY_TERMS: &[&str] = &["not urgent", "routine"];

/// Lawyer-directory gateway settings.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub base_url: Url,
    /// Absent key is a configuration-level failure surfaced as a fallback
    /// message, never a crash.
    pub api_key: Option<SecretString>,
    pub timeout: Duration,
}

/// Phrase tables driving detection and extraction.
#[derive(Debug, Clone)]
pub struct KeywordConfig {
    pub skip_phrases: Vec<String>,
    pub urgent_phrases: Vec<String>,
    pub matter_types: Vec<String>,
    pub high_urgency_terms: Vec<String>,
    pub low_urgency_terms: Vec<String>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        let table = |d: &[&str]| d.iter().map(|s| s.to_string()).collect();
        Self {
            skip_phrases: table(DEFAULT_SKIP_PHRASES),
            urgent_phrases: table(DEFAULT_URGENT_PHRASES),
            matter_types: table(DEFAULT_MATTER_TYPES),
            high_urgency_terms: table(DEFAULT_HIGH_URGENCY_TERMS),
            low_urgency_terms: table(DEFAULT_LOW_URGENCY_TERMS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// Organizations whose slug equals this marker operate in public mode.
    pub public_org_slug: String,
    pub search: SearchConfig,
    pub keywords: KeywordConfig,
}

impl IntakeConfig {
    /// Resolve configuration from the environment over built-in defaults.
    pub fn resolve() -> Result<Self, ConfigError> {
        let base_url_raw = parse_string_env(
            "LAWYER_SEARCH_BASE_URL",
            DEFAULT_SEARCH_BASE_URL.to_string(),
        )?;
        let base_url = Url::parse(&base_url_raw).map_err(|e| ConfigError::InvalidValue {
            key: "LAWYER_SEARCH_BASE_URL".to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            public_org_slug: parse_string_env(
                "INTAKE_PUBLIC_ORG_SLUG",
                DEFAULT_PUBLIC_ORG_SLUG.to_string(),
            )?
            .to_ascii_lowercase(),
            search: SearchConfig {
                base_url,
                api_key: optional_env("LAWYER_SEARCH_API_KEY")?.map(SecretString::from),
                timeout: parse_duration_secs_env("LAWYER_SEARCH_TIMEOUT_SECS", DEFAULT_SEARCH_TIMEOUT)?,
            },
            keywords: KeywordConfig {
                skip_phrases: parse_phrases_env("INTAKE_SKIP_PHRASES", DEFAULT_SKIP_PHRASES)?,
                urgent_phrases: parse_phrases_env("INTAKE_URGENT_PHRASES", DEFAULT_URGENT_PHRASES)?,
                matter_types: parse_phrases_env("INTAKE_MATTER_TYPES", DEFAULT_MATTER_TYPES)?,
                high_urgency_terms: parse_phrases_env(
                    "INTAKE_HIGH_URGENCY_TERMS",
                    DEFAULT_HIGH_URGENCY_TERMS,
                )?,
                low_urgency_terms: parse_phrases_env(
                    "INTAKE_LOW_URGENCY_TERMS",
                    DEFAULT_LOW_URGENCY_TERMS,
                )?,
            },
        })
    }
}
