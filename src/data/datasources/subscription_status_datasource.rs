use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Serialize;

use crate::config::EntitlementConfig;
use crate::constants::{
    APP_STORE_CONNECT_AUDIENCE, APP_STORE_CONNECT_TOKEN_LIFETIME_MINUTES,
    REMOTE_CALL_TIMEOUT_SECONDS, SUBSCRIPTION_STATUS_FILTER,
};
use crate::data::models::app_store_server_api::error_response_model::ErrorResponseModel;
use crate::data::models::app_store_server_api::status_response_model::StatusResponseModel;
use crate::domain::entities::environment::Environment;
use crate::errors::EntitlementError;

#[async_trait]
pub(crate) trait SubscriptionStatusDatasource: Send + Sync {
    /// Get All Subscription Statuses:
    /// https://developer.apple.com/documentation/appstoreserverapi/get_all_subscription_statuses
    ///
    /// transaction_id:
    ///   The identifier of a transaction that belongs to the customer, and
    ///   which may be an original transaction identifier.
    ///
    /// Statuses are filtered server-side to active and billing grace period.
    /// An HTTP 404 maps to `TransactionNotFound` for the given environment;
    /// this is the only failure the caller may recover from. Every other
    /// non-success response propagates the remote code and message
    /// unmodified.
    async fn get_all_subscription_statuses(
        &self,
        transaction_id: &str,
        environment: Environment,
    ) -> Result<StatusResponseModel, EntitlementError>;
}

pub(crate) struct SubscriptionStatusDatasourceImpl {
    http_client: reqwest::Client,
    api_key: String,
    key_id: String,
    issuer_id: String,
    bundle_id: String,
}

#[async_trait]
impl SubscriptionStatusDatasource for SubscriptionStatusDatasourceImpl {
    async fn get_all_subscription_statuses(
        &self,
        transaction_id: &str,
        environment: Environment,
    ) -> Result<StatusResponseModel, EntitlementError> {
        let token = self.build_connect_token()?;
        let url = format!(
            "{}/inApps/v1/subscriptions/{transaction_id}",
            environment.api_base_url()
        );
        let status_filter: Vec<(&str, u8)> = SUBSCRIPTION_STATUS_FILTER
            .iter()
            .map(|code| ("status", *code))
            .collect();

        let response = self
            .http_client
            .get(&url)
            .query(&status_filter)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!(%environment, transaction_id, "transaction not found");
            return Err(EntitlementError::TransactionNotFound { environment });
        }
        if !status.is_success() {
            let raw = response.text().await?;
            let parsed: Option<ErrorResponseModel> = serde_json::from_str(&raw).ok();
            tracing::warn!(
                %environment,
                status = status.as_u16(),
                "App Store Server API returned an error"
            );
            return Err(EntitlementError::RemoteApi {
                status: status.as_u16(),
                error_code: parsed.as_ref().map(|e| e.error_code),
                message: parsed
                    .map(|e| e.error_message)
                    .unwrap_or_else(|| status.to_string()),
                raw,
            });
        }

        Ok(response.json().await?)
    }
}

impl SubscriptionStatusDatasourceImpl {
    pub(crate) fn new(config: &EntitlementConfig) -> Result<Self, EntitlementError> {
        Ok(Self {
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(REMOTE_CALL_TIMEOUT_SECONDS))
                .build()?,
            api_key: config.api_key.clone(),
            key_id: config.key_id.clone(),
            issuer_id: config.issuer_id.clone(),
            bundle_id: config.bundle_id.clone(),
        })
    }

    /// Signs a short-lived App Store Connect API token. Signed per call so
    /// tokens can never go stale while the process is long-lived.
    fn build_connect_token(&self) -> Result<String, EntitlementError> {
        let mut header = jsonwebtoken::Header::new(jsonwebtoken::Algorithm::ES256);
        header.kid = Some(self.key_id.clone());

        #[derive(Debug, Serialize)]
        struct Claims {
            iss: String,
            iat: usize,
            exp: usize,
            aud: String,
            bid: String,
        }
        let claims = Claims {
            iss: self.issuer_id.clone(),
            iat: chrono::Utc::now().timestamp() as usize,
            exp: (chrono::Utc::now()
                + chrono::Duration::minutes(APP_STORE_CONNECT_TOKEN_LIFETIME_MINUTES))
            .timestamp() as usize,
            aud: APP_STORE_CONNECT_AUDIENCE.to_owned(),
            bid: self.bundle_id.clone(),
        };

        let key = jsonwebtoken::EncodingKey::from_ec_pem(self.api_key.as_bytes())?;
        Ok(jsonwebtoken::encode(&header, &claims, &key)?)
    }
}
