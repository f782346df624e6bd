//! Conversation-text heuristics shared by the middleware: contact-detail
//! detection and location/jurisdiction cues.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b").expect("email regex compiles")
});

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    // North-American shapes with optional country code and separators.
    Regex::new(r"(?x)
        (?:\+?1[\s.-]?)?
        (?:\(\d{3}\)|\d{3})
        [\s.-]?\d{3}
        [\s.-]?\d{4}
    ")
    .expect("phone regex compiles")
});

/// Phrases that usually precede a place name.
const LOCATION_CUES: &[&str] = &[
    "located in",
    "i live in",
    "i'm in",
    "i am in",
    "based in",
    "my city",
    "my state",
    "my county",
    "near me",
    "zip code",
    "postal code",
];

const US_STATES: &[&str] = &[
    "alabama", "alaska", "arizona", "arkansas", "california", "colorado", "connecticut",
    "delaware", "florida", "georgia", "hawaii", "idaho", "illinois", "indiana", "iowa",
    "kansas", "kentucky", "louisiana", "maine", "maryland", "massachusetts", "michigan",
    "minnesota", "mississippi", "missouri", "montana", "nebraska", "nevada",
    "new hampshire", "new jersey", "new mexico", "new york", "north carolina",
    "north dakota", "ohio", "oklahoma", "oregon", "pennsylvania", "rhode island",
    "south carolina", "south dakota", "tennessee", "texas", "utah", "vermont",
    "virginia", "washington", "west virginia", "wisconsin", "wyoming",
];

/// True when the text already carries a reachable contact detail.
pub fn contains_contact_details(text: &str) -> bool {
    EMAIL_RE.is_match(text) || PHONE_RE.is_match(text)
}

/// True when the conversation gives any usable location or jurisdiction cue.
/// Deliberately permissive: a false positive only skips a clarifying flag.
pub fn mentions_location(text: &str) -> bool {
    let lower = text.to_lowercase();
    LOCATION_CUES.iter().any(|cue| lower.contains(cue))
        || US_STATES.iter().any(|state| lower.contains(state))
}
