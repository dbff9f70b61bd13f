use std::sync::Arc;

use async_trait::async_trait;

use crate::certificates::CertificateStore;
use crate::config::EntitlementConfig;
use crate::data::datasources::signed_payload_verifier::{
    SignedPayloadVerifier, SignedPayloadVerifierImpl,
};
use crate::data::datasources::subscription_status_datasource::{
    SubscriptionStatusDatasource, SubscriptionStatusDatasourceImpl,
};
use crate::data::datasources::utils::extract_transaction_id;
use crate::data::models::app_store_server_api::common::SubscriptionStatus;
use crate::data::models::app_store_server_api::jws_renewal_info_decoded_payload_model::JwsRenewalInfoDecodedPayloadModel;
use crate::data::models::app_store_server_api::jws_transaction_decoded_payload_model::JwsTransactionDecodedPayloadModel;
use crate::data::models::app_store_server_api::status_response_model::SubscriptionGroupIdentifierItemModel;
use crate::domain::entities::entitlement::{EntitlementRecord, EntitlementStatus};
use crate::domain::entities::environment::Environment;
use crate::domain::repositories::entitlement_repository::EntitlementRepository;
use crate::errors::EntitlementError;

pub(crate) struct EntitlementRepositoryImpl<
    A: SubscriptionStatusDatasource,
    V: SignedPayloadVerifier,
> {
    subscription_status_datasource: A,
    signed_payload_verifier: V,
}

#[async_trait]
impl<A: SubscriptionStatusDatasource, V: SignedPayloadVerifier> EntitlementRepository
    for EntitlementRepositoryImpl<A, V>
{
    async fn resolve_entitlement(
        &self,
        body: &str,
    ) -> Result<EntitlementRecord, EntitlementError> {
        let transaction_id = extract_transaction_id(body);
        if transaction_id.is_empty() {
            return Err(EntitlementError::MalformedBody);
        }

        let (environment, response) = match self
            .subscription_status_datasource
            .get_all_subscription_statuses(&transaction_id, Environment::Production)
            .await
        {
            Ok(response) => (Environment::Production, response),
            Err(EntitlementError::TransactionNotFound {
                environment: Environment::Production,
            }) => {
                tracing::debug!(%transaction_id, "unknown in production, retrying in sandbox");
                let response = self
                    .subscription_status_datasource
                    .get_all_subscription_statuses(&transaction_id, Environment::Sandbox)
                    .await?;
                (Environment::Sandbox, response)
            }
            Err(e) => return Err(e),
        };

        let aggregated = aggregate(&response.data);
        let mut record = EntitlementRecord::empty(environment);
        record.status = aggregated.status;

        if let Some(signed_transaction_info) = &aggregated.signed_transaction_info {
            let transaction: JwsTransactionDecodedPayloadModel = self
                .signed_payload_verifier
                .verify_and_decode(signed_transaction_info, environment)
                .await?;
            record.product_id = transaction.product_id;
            record.app_account_id = transaction.app_account_token;
        }
        if let Some(signed_renewal_info) = &aggregated.signed_renewal_info {
            let renewal: JwsRenewalInfoDecodedPayloadModel = self
                .signed_payload_verifier
                .verify_and_decode(signed_renewal_info, environment)
                .await?;
            if let Some(product_id) = renewal.product_id {
                record.product_id = product_id;
            }
        }

        Ok(record)
    }
}

impl EntitlementRepositoryImpl<SubscriptionStatusDatasourceImpl, SignedPayloadVerifierImpl> {
    pub(crate) fn new(
        config: &EntitlementConfig,
        certificate_store: Arc<CertificateStore>,
    ) -> Result<Self, EntitlementError> {
        Ok(Self {
            subscription_status_datasource: SubscriptionStatusDatasourceImpl::new(config)?,
            signed_payload_verifier: SignedPayloadVerifierImpl::new(certificate_store, config)?,
        })
    }
}

#[derive(Debug)]
pub(crate) struct AggregatedTransactions {
    pub(crate) status: EntitlementStatus,
    pub(crate) signed_transaction_info: Option<String>,
    pub(crate) signed_renewal_info: Option<String>,
}

/// Reduces the subscription groups of a status response to one entitlement
/// decision.
///
/// Groups and transactions are visited in received order, which the App
/// Store Server API returns ascending by time. Active is sticky: once seen,
/// no later transaction downgrades the status. The signed-info fields are
/// last-visited-wins regardless of that transaction's status, so the record
/// ends up linked to the most recent account/product information.
pub(crate) fn aggregate(groups: &[SubscriptionGroupIdentifierItemModel]) -> AggregatedTransactions {
    let mut aggregated = AggregatedTransactions {
        status: EntitlementStatus::Expired,
        signed_transaction_info: None,
        signed_renewal_info: None,
    };
    let mut active_seen = false;
    for group in groups {
        for transaction in &group.last_transactions {
            if !active_seen {
                if let Some(status) = transaction.status {
                    aggregated.status = status.into();
                    active_seen = aggregated.status == EntitlementStatus::Active;
                }
            }
            if let Some(info) = &transaction.signed_transaction_info {
                aggregated.signed_transaction_info = Some(info.clone());
            }
            if let Some(info) = &transaction.signed_renewal_info {
                aggregated.signed_renewal_info = Some(info.clone());
            }
        }
    }
    aggregated
}

impl From<SubscriptionStatus> for EntitlementStatus {
    fn from(status: SubscriptionStatus) -> Self {
        match status {
            SubscriptionStatus::Active => EntitlementStatus::Active,
            SubscriptionStatus::Expired => EntitlementStatus::Expired,
            SubscriptionStatus::BillingRetry => EntitlementStatus::BillingRetry,
            SubscriptionStatus::BillingGracePeriod => EntitlementStatus::BillingGracePeriod,
            SubscriptionStatus::Revoked => EntitlementStatus::Revoked,
        }
    }
}
