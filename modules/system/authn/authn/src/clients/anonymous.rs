use std::sync::Arc;

use async_trait::async_trait;
use authn_sdk::ports::OrgDirectory;
use authn_sdk::{AuthNClient, AuthNError, ContextAwareClient, Identity, NamespacedId, Request};

use super::{CLIENT_ANONYMOUS, PRIORITY_ANONYMOUS};
use crate::config::AnonymousConfig;

/// Last-resort client placing every request in the configured org with the
/// configured role.
pub struct AnonymousClient {
    cfg: AnonymousConfig,
    orgs: Arc<dyn OrgDirectory>,
}

impl AnonymousClient {
    #[must_use]
    pub fn new(cfg: AnonymousConfig, orgs: Arc<dyn OrgDirectory>) -> Self {
        Self { cfg, orgs }
    }
}

#[async_trait]
impl AuthNClient for AnonymousClient {
    fn name(&self) -> &str {
        CLIENT_ANONYMOUS
    }

    async fn authenticate(&self, _r: &Request) -> Result<Identity, AuthNError> {
        let org = self
            .orgs
            .get_org_by_name(&self.cfg.org_name)
            .await?
            .ok_or_else(|| {
                tracing::error!(org = %self.cfg.org_name, "Anonymous access org does not exist");
                AuthNError::unauthenticated("anonymous access org not found")
            })?;

        Ok(Identity::builder(NamespacedId::anonymous())
            .org_id(org.id)
            .org_name(&org.name)
            .org_role(org.id, self.cfg.org_role)
            .build())
    }

    fn as_context_aware(&self) -> Option<&dyn ContextAwareClient> {
        Some(self)
    }
}

impl ContextAwareClient for AnonymousClient {
    fn test(&self, _r: &Request) -> bool {
        true
    }

    fn priority(&self) -> i16 {
        PRIORITY_ANONYMOUS
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::test_support::FakeOrgDirectory;
    use authn_sdk::ports::Org;
    use authn_sdk::{Namespace, OrgRole};

    fn client(org_name: &str) -> AnonymousClient {
        let orgs = FakeOrgDirectory {
            orgs: vec![Org {
                id: 1,
                name: "Main Org.".to_owned(),
            }],
        };
        let cfg = AnonymousConfig {
            enabled: true,
            org_name: org_name.to_owned(),
            org_role: OrgRole::Viewer,
        };
        AnonymousClient::new(cfg, Arc::new(orgs))
    }

    #[tokio::test]
    async fn configured_org_and_role() {
        let c = client("Main Org.");
        assert!(c.test(&Request::detached()));

        let identity = c.authenticate(&Request::detached()).await.unwrap();

        assert_eq!(identity.namespace(), Namespace::Anonymous);
        assert_eq!(identity.org_id, 1);
        assert_eq!(identity.org_name, "Main Org.");
        assert_eq!(identity.role(), OrgRole::Viewer);
    }

    #[tokio::test]
    async fn missing_org_is_rejected() {
        let err = client("Nowhere").authenticate(&Request::detached()).await.unwrap_err();
        assert!(err.is_unauthenticated());
    }
}
