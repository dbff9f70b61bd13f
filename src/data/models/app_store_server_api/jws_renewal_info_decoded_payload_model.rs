#![allow(dead_code)]

use serde::Deserialize;

use super::common::ApiEnvironment;

/// Data structure for the decoded payload of a JWSRenewalInfo, returned by
/// the App Store Server API.
///
/// https://developer.apple.com/documentation/appstoreserverapi/jwsrenewalinfodecodedpayload
///
/// Only the fields the entitlement pipeline consumes are modeled.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JwsRenewalInfoDecodedPayloadModel {
    /// The identifier of the product that renews at the next billing period.
    pub(crate) auto_renew_product_id: Option<String>,
    /// The server environment, either sandbox or production.
    pub(crate) environment: Option<ApiEnvironment>,
    /// The transaction identifier of the original purchase associated with
    /// this renewal.
    pub(crate) original_transaction_id: Option<String>,
    /// The product identifier of the In-App Purchase.
    pub(crate) product_id: Option<String>,
}
