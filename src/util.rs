use std::sync::Arc;

use crate::certificates::CertificateStore;
use crate::config::EntitlementConfig;
use crate::data::datasources::signed_payload_verifier::SignedPayloadVerifierImpl;
use crate::data::datasources::subscription_status_datasource::SubscriptionStatusDatasourceImpl;
use crate::data::repositories::entitlement_repository_impl::EntitlementRepositoryImpl;
use crate::domain::entities::entitlement::EntitlementRecord;
use crate::domain::repositories::entitlement_repository::EntitlementRepository;
use crate::errors::EntitlementError;

/// Public entry point for purchase authentication.
///
/// Generic over the repository so embedding servers depend on the trait and
/// tests can inject mocks; `new` wires the concrete App Store datasources.
pub struct EntitlementUtil<R: EntitlementRepository> {
    entitlement_repository: R,
}

impl<R: EntitlementRepository> EntitlementUtil<R> {
    /// Resolves a raw request body (a StoreKit signed transaction or a bare
    /// transaction id) into a verified entitlement record.
    pub async fn resolve_entitlement(
        &self,
        body: &str,
    ) -> Result<EntitlementRecord, EntitlementError> {
        self.entitlement_repository.resolve_entitlement(body).await
    }
}

impl EntitlementUtil<EntitlementRepositoryImpl<SubscriptionStatusDatasourceImpl, SignedPayloadVerifierImpl>> {
    /// Loads the trusted root certificates and wires the production
    /// datasources. Fails fast on incomplete configuration or an incomplete
    /// trust set; requests are never served with either.
    pub fn new(config: &EntitlementConfig) -> Result<Self, EntitlementError> {
        let certificate_store = Arc::new(CertificateStore::load(&config.root_certificates_dir)?);
        Ok(Self {
            entitlement_repository: EntitlementRepositoryImpl::new(config, certificate_store)?,
        })
    }

    /// Convenience constructor reading configuration from the environment.
    pub fn from_env() -> Result<Self, EntitlementError> {
        Self::new(&EntitlementConfig::from_env()?)
    }
}
