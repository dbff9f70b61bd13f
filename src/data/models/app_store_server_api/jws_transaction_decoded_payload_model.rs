#![allow(dead_code)]

use serde::Deserialize;

use super::common::ApiEnvironment;

type TimestampMillis = u64;

/// Data structure for the decoded payload of a JWSTransaction, returned by
/// the App Store Server API.
///
/// https://developer.apple.com/documentation/appstoreserverapi/jwstransactiondecodedpayload
///
/// Only the fields the entitlement pipeline consumes are modeled; unknown
/// claims in the payload are ignored on deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JwsTransactionDecodedPayloadModel {
    /// A UUID the app created at purchase time to associate the transaction
    /// with a customer on the embedding service. Absent if the app never
    /// provided one.
    pub(crate) app_account_token: Option<String>,
    /// The bundle identifier of the app.
    pub(crate) bundle_id: Option<String>,
    /// The server environment, either sandbox or production.
    pub(crate) environment: Option<ApiEnvironment>,
    /// The UNIX time, in milliseconds, that the subscription expires or
    /// renews.
    pub(crate) expires_date: Option<TimestampMillis>,
    /// The transaction identifier of the original purchase.
    pub(crate) original_transaction_id: Option<String>,
    /// The unique identifier of the product.
    pub(crate) product_id: String,
    /// The UNIX time, in milliseconds, that the App Store charged the
    /// customer's account.
    pub(crate) purchase_date: Option<TimestampMillis>,
    /// The unique identifier of the transaction.
    pub(crate) transaction_id: Option<String>,
}
