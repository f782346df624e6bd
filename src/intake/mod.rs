//! Intake-domain building blocks: matter extraction, operating-mode
//! resolution, text heuristics, and the lawyer-directory gateway.

pub mod matter;
pub mod mode;
pub mod search;
pub mod signals;

pub use matter::{GENERAL_CONSULTATION, MatterExtractor, MatterInfo};
pub use mode::{ModeResolver, OrganizationStore, StaticOrganizationStore};
pub use search::{HttpLawyerSearch, LawyerSearch};
