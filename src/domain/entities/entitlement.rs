use serde::Serialize;

use super::environment::Environment;

/// The resolved, trusted summary of a user's current subscription state.
///
/// `product_id` and `app_account_id` are only ever populated from a signed
/// payload whose signature verified against the Apple root certificates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitlementRecord {
    /// The app-account token the client attached at purchase time, linking
    /// the transaction to a user on the embedding service. Absent if the app
    /// never provided one.
    pub app_account_id: Option<String>,
    /// Which App Store environment the transaction was found in.
    pub environment: Environment,
    /// Product identifier of the most recent transaction. Empty if no
    /// transaction carried a signed transaction info payload.
    pub product_id: String,
    pub status: EntitlementStatus,
}

impl EntitlementRecord {
    /// A record before any transaction has been aggregated into it: no
    /// account linkage, no product, expired.
    pub(crate) fn empty(environment: Environment) -> Self {
        Self {
            app_account_id: None,
            environment,
            product_id: String::new(),
            status: EntitlementStatus::Expired,
        }
    }

    pub fn is_entitled(&self) -> bool {
        matches!(
            self.status,
            EntitlementStatus::Active | EntitlementStatus::BillingGracePeriod
        )
    }
}

/// Subscription status, mirroring the App Store Server API status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EntitlementStatus {
    Active,
    Expired,
    BillingRetry,
    BillingGracePeriod,
    Revoked,
}
