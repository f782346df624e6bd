//! Operating-mode resolution: public lawyer search vs. organization intake.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::OrganizationLookupError;
use crate::types::Organization;

/// Lookup contract for the organization/account service. Only the `slug`
/// field participates in mode resolution.
#[async_trait]
pub trait OrganizationStore: Send + Sync {
    async fn get_organization(
        &self,
        id: &str,
    ) -> Result<Option<Organization>, OrganizationLookupError>;
}

/// In-memory store for hosts with a fixed tenant table and for tests.
#[derive(Debug, Default)]
pub struct StaticOrganizationStore {
    organizations: HashMap<String, Organization>,
}

impl StaticOrganizationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_organization(mut self, org: Organization) -> Self {
        self.organizations.insert(org.id.clone(), org);
        self
    }
}

#[async_trait]
impl OrganizationStore for StaticOrganizationStore {
    async fn get_organization(
        &self,
        id: &str,
    ) -> Result<Option<Organization>, OrganizationLookupError> {
        Ok(self.organizations.get(id).cloned())
    }
}

/// Decides whether a conversation runs in public mode (lawyer search) or
/// organization mode (contact-form intake).
#[derive(Debug, Clone)]
pub struct ModeResolver {
    public_org_slug: String,
}

impl ModeResolver {
    pub fn new(public_org_slug: impl Into<String>) -> Self {
        Self {
            public_org_slug: public_org_slug.into().to_ascii_lowercase(),
        }
    }

    /// Returns true for public mode.
    ///
    /// Fails open to public mode on lookup outages and unknown ids: a
    /// directory search is always available, a dead-end contact form is not.
    pub async fn resolve(
        &self,
        organization_id: Option<&str>,
        store: &dyn OrganizationStore,
    ) -> bool {
        let Some(id) = organization_id else {
            tracing::debug!("no organization id; resolving to public mode");
            return true;
        };

        match store.get_organization(id).await {
            Ok(Some(org)) => {
                let public = org.slug.eq_ignore_ascii_case(&self.public_org_slug);
                tracing::debug!(
                    organization_id = %id,
                    slug = %org.slug,
                    public_mode = public,
                    "resolved operating mode"
                );
                public
            }
            Ok(None) => {
                tracing::warn!(organization_id = %id, "organization not found; failing open to public mode");
                true
            }
            Err(err) => {
                tracing::warn!(
                    organization_id = %id,
                    error = %err,
                    "organization lookup failed; failing open to public mode"
                );
                true
            }
        }
    }
}
