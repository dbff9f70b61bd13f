use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::errors::EntitlementError;

/// Splits a compact JWS (`header.payload.signature`) into its three
/// base64url segments.
pub(crate) fn split_compact_jws(data: &str) -> Option<(&str, &str, &str)> {
    let mut segments = data.split('.');
    match (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) {
        (Some(header), Some(payload), Some(signature), None) => {
            Some((header, payload, signature))
        }
        _ => None,
    }
}

/// Decodes the payload of a compact JWS without performing any signature
/// verification. No decoded field may be trusted until the signature has
/// been verified separately.
pub(crate) fn decode_jws_payload<T: DeserializeOwned>(data: &str) -> Result<T, EntitlementError> {
    let (_, payload, _) = split_compact_jws(data)
        .ok_or_else(|| EntitlementError::SignatureInvalid("not a compact JWS".to_string()))?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).map_err(|e| {
        EntitlementError::SignatureInvalid(format!("JWS payload is not base64url: {e}"))
    })?;
    serde_json::from_slice(&bytes)
        .map_err(|e| EntitlementError::SignatureInvalid(format!("failed to parse JWS payload: {e}")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionIdClaim {
    transaction_id: String,
}

/// Derives a transaction id from a raw request body.
///
/// The structured attempt treats the body as a StoreKit signed transaction
/// (compact JWS) and reads its `transactionId` claim; no signature check is
/// needed since the id is only used to query the App Store Server API, whose
/// response is verified before anything is trusted. If the body is not a
/// parseable JWS, it is used verbatim as a bare transaction id (clients
/// submit bare ids during local testing). Infallible; an empty body yields
/// an empty id, which the caller rejects.
pub(crate) fn extract_transaction_id(body: &str) -> String {
    match decode_jws_payload::<TransactionIdClaim>(body) {
        Ok(claims) => claims.transaction_id,
        Err(_) => body.to_string(),
    }
}
