#![allow(dead_code)]

use serde::Deserialize;

use super::common::{ApiEnvironment, SubscriptionStatus};

type JWSTransaction = String;
type JWSRenewalInfo = String;

/// Data structure returned by the App Store Server API when querying for all
/// subscription statuses of a transaction.
///
/// https://developer.apple.com/documentation/appstoreserverapi/statusresponse
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatusResponseModel {
    /// The server environment in which you're making the request, whether
    /// sandbox or production.
    pub(crate) environment: ApiEnvironment,
    /// The bundle identifier of the app.
    pub(crate) bundle_id: String,
    /// The unique identifier of the app in the App Store.
    pub(crate) app_apple_id: Option<i64>,
    /// An array of subscription information, one entry per subscription
    /// group identifier.
    pub(crate) data: Vec<SubscriptionGroupIdentifierItemModel>,
}

/// The subscription statuses belonging to one subscription group.
///
/// https://developer.apple.com/documentation/appstoreserverapi/subscriptiongroupidentifieritem
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubscriptionGroupIdentifierItemModel {
    /// The identifier of the subscription group the transactions belong to.
    pub(crate) subscription_group_identifier: Option<String>,
    /// The most recent signed transaction (and renewal) information for each
    /// subscription in the group. Ordering reflects remote-service ordering,
    /// assumed ascending by time.
    #[serde(default)]
    pub(crate) last_transactions: Vec<LastTransactionsItemModel>,
}

/// One transaction entry within a subscription group.
///
/// https://developer.apple.com/documentation/appstoreserverapi/lasttransactionsitem
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LastTransactionsItemModel {
    /// The status of the subscription this transaction belongs to.
    pub(crate) status: Option<SubscriptionStatus>,
    /// The original transaction identifier of the subscription.
    pub(crate) original_transaction_id: Option<String>,
    /// Transaction information, signed by the App Store, in JWS format.
    pub(crate) signed_transaction_info: Option<JWSTransaction>,
    /// Subscription renewal information, signed by the App Store, in JWS
    /// format.
    pub(crate) signed_renewal_info: Option<JWSRenewalInfo>,
}
