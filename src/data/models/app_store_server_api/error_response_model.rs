#![allow(dead_code)]

use serde::Deserialize;

/// Error body returned by the App Store Server API on non-success responses.
///
/// https://developer.apple.com/documentation/appstoreserverapi/errorpayload
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorResponseModel {
    /// Numeric error code, e.g. 4040010 for TransactionIdNotFoundError.
    pub(crate) error_code: i64,
    /// Human-readable description of the error.
    pub(crate) error_message: String,
}
