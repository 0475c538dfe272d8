use std::sync::Arc;

use async_trait::async_trait;
use authn_sdk::ports::UserDirectory;
use authn_sdk::{AuthNError, Identity, Namespace, PostAuthHook, Request};

/// Replaces the identity's org roles with the user's stored memberships and
/// picks the default org when the request did not target one.
pub struct OrgSync {
    users: Arc<dyn UserDirectory>,
}

impl OrgSync {
    #[must_use]
    pub fn new(users: Arc<dyn UserDirectory>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl PostAuthHook for OrgSync {
    fn name(&self) -> &str {
        "org-sync"
    }

    async fn run(&self, identity: &mut Identity, _r: &Request) -> Result<(), AuthNError> {
        if !identity.client_params.sync_org_roles {
            return Ok(());
        }
        if !matches!(
            identity.namespace(),
            Namespace::User | Namespace::ServiceAccount
        ) {
            return Ok(());
        }

        let memberships = self.users.get_org_memberships(identity.id().id()).await?;

        if identity.org_id <= 0
            && let Some(default) = memberships.first()
        {
            identity.org_id = default.org_id;
        }

        identity.org_roles = memberships.iter().map(|m| (m.org_id, m.role)).collect();
        if let Some(current) = memberships.iter().find(|m| m.org_id == identity.org_id) {
            identity.org_name.clone_from(&current.org_name);
        }

        Ok(())
    }
}
