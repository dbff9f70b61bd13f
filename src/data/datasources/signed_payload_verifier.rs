use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use openssl::hash::MessageDigest;
use openssl::ocsp::{OcspCertId, OcspCertStatus, OcspRequest, OcspResponse, OcspResponseStatus};
use openssl::stack::Stack;
use openssl::x509::{X509StoreContext, X509};
use serde::de::DeserializeOwned;

use crate::certificates::CertificateStore;
use crate::config::EntitlementConfig;
use crate::constants::REMOTE_CALL_TIMEOUT_SECONDS;
use crate::domain::entities::environment::Environment;
use crate::errors::EntitlementError;

#[async_trait]
pub(crate) trait SignedPayloadVerifier: Send + Sync {
    /// Verifies one App Store signed payload (JWS, ES256, signing chain in
    /// the `x5c` header) and decodes its claims.
    ///
    /// Any failure is an authentication failure; callers must abort the
    /// resolution rather than fall back to unverified data.
    async fn verify_and_decode<T: DeserializeOwned + Send>(
        &self,
        signed_payload: &str,
        environment: Environment,
    ) -> Result<T, EntitlementError>;
}

pub(crate) struct SignedPayloadVerifierImpl {
    certificate_store: Arc<CertificateStore>,
    http_client: reqwest::Client,
    bundle_id: String,
    app_apple_id: i64,
    ocsp_responder_url: String,
    online_checks: bool,
}

#[async_trait]
impl SignedPayloadVerifier for SignedPayloadVerifierImpl {
    async fn verify_and_decode<T: DeserializeOwned + Send>(
        &self,
        signed_payload: &str,
        environment: Environment,
    ) -> Result<T, EntitlementError> {
        let header = jsonwebtoken::decode_header(signed_payload)
            .map_err(|e| invalid(format!("unparseable JWS header: {e}")))?;
        if header.alg != jsonwebtoken::Algorithm::ES256 {
            return Err(invalid(format!(
                "unexpected signing algorithm {:?}",
                header.alg
            )));
        }

        let chain = decode_x5c_chain(header.x5c.as_deref().unwrap_or_default())?;
        let leaf = chain
            .first()
            .ok_or_else(|| invalid("empty x5c certificate chain".to_string()))?;

        self.verify_certificate_chain(&chain)?;
        if self.online_checks {
            self.check_revocation(&chain).await?;
        }

        let claims = decode_with_leaf_key(signed_payload, leaf)?;
        self.cross_check_claims(&claims, environment)?;

        serde_json::from_value(claims)
            .map_err(|e| invalid(format!("claims do not match expected payload: {e}")))
    }
}

impl SignedPayloadVerifierImpl {
    pub(crate) fn new(
        certificate_store: Arc<CertificateStore>,
        config: &EntitlementConfig,
    ) -> Result<Self, EntitlementError> {
        Ok(Self {
            certificate_store,
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(REMOTE_CALL_TIMEOUT_SECONDS))
                .build()?,
            bundle_id: config.bundle_id.clone(),
            app_apple_id: config.app_apple_id,
            ocsp_responder_url: config.ocsp_responder_url.clone(),
            online_checks: true,
        })
    }

    /// Skips the OCSP callout. Only suitable for offline setups such as
    /// local testing against self-signed chains.
    #[cfg(test)]
    pub(crate) fn without_online_checks(mut self) -> Self {
        self.online_checks = false;
        self
    }

    fn verify_certificate_chain(&self, chain: &[X509]) -> Result<(), EntitlementError> {
        let leaf = &chain[0];
        let mut untrusted = Stack::new()?;
        for certificate in &chain[1..] {
            untrusted.push(certificate.clone())?;
        }
        let mut context = X509StoreContext::new()?;
        let (verified, detail) = context.init(
            self.certificate_store.as_openssl_store(),
            leaf,
            &untrusted,
            |c| {
                let verified = c.verify_cert()?;
                Ok((verified, c.error()))
            },
        )?;
        if !verified {
            return Err(invalid(format!(
                "certificate chain does not anchor to a trusted root: {}",
                detail.error_string()
            )));
        }
        Ok(())
    }

    /// Online revocation check for the leaf certificate, against its issuer.
    /// A revoked or unknown certificate, and any failure to complete the
    /// check, all fail closed.
    async fn check_revocation(&self, chain: &[X509]) -> Result<(), EntitlementError> {
        let leaf = &chain[0];
        let issuer = chain.get(1).unwrap_or(leaf);

        let mut request = OcspRequest::new()?;
        request.add_id(OcspCertId::from_cert(MessageDigest::sha1(), leaf, issuer)?)?;
        let request_der = request.to_der()?;

        let response = self
            .http_client
            .post(&self.ocsp_responder_url)
            .header(reqwest::header::CONTENT_TYPE, "application/ocsp-request")
            .body(request_der)
            .send()
            .await
            .map_err(|e| invalid(format!("OCSP callout failed: {e}")))?;
        if !response.status().is_success() {
            return Err(invalid(format!(
                "OCSP responder returned {}",
                response.status()
            )));
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| invalid(format!("OCSP callout failed: {e}")))?;

        let ocsp_response = OcspResponse::from_der(&body)
            .map_err(|e| invalid(format!("unparseable OCSP response: {e}")))?;
        if ocsp_response.status() != OcspResponseStatus::SUCCESSFUL {
            return Err(invalid("OCSP responder did not answer successfully".to_string()));
        }
        let basic = ocsp_response
            .basic()
            .map_err(|e| invalid(format!("malformed OCSP basic response: {e}")))?;
        let cert_id = OcspCertId::from_cert(MessageDigest::sha1(), leaf, issuer)?;
        let status = basic.find_status(&cert_id).ok_or_else(|| {
            invalid("OCSP response does not cover the certificate".to_string())
        })?;
        status
            .check_validity(300, None)
            .map_err(|e| invalid(format!("OCSP response outside its validity window: {e}")))?;
        if status.status != OcspCertStatus::GOOD {
            return Err(invalid("certificate is revoked or unknown to the OCSP responder".to_string()));
        }
        Ok(())
    }

    /// Payload claims that identify the app must match what this verifier
    /// was configured with, whenever the payload carries them.
    fn cross_check_claims(
        &self,
        claims: &serde_json::Value,
        environment: Environment,
    ) -> Result<(), EntitlementError> {
        if let Some(bundle_id) = claims.get("bundleId").and_then(|v| v.as_str()) {
            if bundle_id != self.bundle_id {
                return Err(invalid(format!(
                    "payload bundle id {bundle_id} does not match configured app"
                )));
            }
        }
        if let Some(app_apple_id) = claims.get("appAppleId").and_then(|v| v.as_i64()) {
            if app_apple_id != self.app_apple_id {
                return Err(invalid(format!(
                    "payload app id {app_apple_id} does not match configured app"
                )));
            }
        }
        if let Some(payload_environment) = claims.get("environment").and_then(|v| v.as_str()) {
            if payload_environment != environment.payload_value() {
                return Err(invalid(format!(
                    "payload environment {payload_environment} does not match {environment}"
                )));
            }
        }
        Ok(())
    }
}

fn invalid(reason: String) -> EntitlementError {
    tracing::error!(%reason, "rejecting signed payload");
    EntitlementError::SignatureInvalid(reason)
}

fn decode_x5c_chain(x5c: &[String]) -> Result<Vec<X509>, EntitlementError> {
    x5c.iter()
        .map(|entry| {
            let der = STANDARD
                .decode(entry)
                .map_err(|e| invalid(format!("x5c entry is not base64: {e}")))?;
            X509::from_der(&der)
                .map_err(|e| invalid(format!("x5c entry is not a certificate: {e}")))
        })
        .collect()
}

/// Verifies the JWS signature with the (already chain-verified) leaf
/// certificate's public key and returns the raw claims. Signed payloads
/// carry no registered claims, so only the signature itself is checked here.
fn decode_with_leaf_key(
    signed_payload: &str,
    leaf: &X509,
) -> Result<serde_json::Value, EntitlementError> {
    let public_key_pem = leaf
        .public_key()
        .and_then(|key| key.public_key_to_pem())
        .map_err(|e| invalid(format!("leaf public key cannot be extracted: {e}")))?;
    let decoding_key = jsonwebtoken::DecodingKey::from_ec_pem(&public_key_pem)
        .map_err(|e| invalid(format!("leaf public key is unusable: {e}")))?;

    let mut validation = jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::ES256);
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    jsonwebtoken::decode::<serde_json::Value>(signed_payload, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| invalid(format!("signature verification failed: {e}")))
}


#[cfg(test)]
mod tests {
    use super::test_support::sign_payload;
    use super::*;
    use crate::certificates::test_support::self_signed_certificate;
    use crate::data::models::app_store_server_api::jws_transaction_decoded_payload_model::JwsTransactionDecodedPayloadModel;

    fn verifier_for(certificate_store: CertificateStore) -> SignedPayloadVerifierImpl {
        SignedPayloadVerifierImpl::new(
            Arc::new(certificate_store),
            &EntitlementConfig {
                api_key: String::new(),
                key_id: String::new(),
                issuer_id: String::new(),
                bundle_id: "com.example.app".to_string(),
                app_apple_id: 123456789,
                root_certificates_dir: "/nonexistent".into(),
                ocsp_responder_url: "http://localhost".to_string(),
            },
        )
        .unwrap()
        .without_online_checks()
    }

    fn transaction_claims() -> serde_json::Value {
        serde_json::json!({
            "bundleId": "com.example.app",
            "environment": "Production",
            "productId": "premium_monthly",
            "appAccountToken": "acc-1",
            "transactionId": "2000000123456789",
        })
    }

    #[tokio::test]
    async fn verifies_and_decodes_trusted_payload() {
        let (certificate, key) = self_signed_certificate("Trusted Signer");
        let verifier =
            verifier_for(CertificateStore::from_certificates(vec![certificate.clone()]).unwrap());
        let payload = sign_payload(&transaction_claims(), &certificate, &key);

        let decoded: JwsTransactionDecodedPayloadModel = verifier
            .verify_and_decode(&payload, Environment::Production)
            .await
            .unwrap();
        assert_eq!(decoded.product_id, "premium_monthly");
        assert_eq!(decoded.app_account_token.as_deref(), Some("acc-1"));
    }

    #[tokio::test]
    async fn rejects_chain_not_anchored_to_trust_set() {
        let (signer_certificate, key) = self_signed_certificate("Untrusted Signer");
        let (trusted_root, _) = self_signed_certificate("Trusted Root");
        let verifier = verifier_for(CertificateStore::from_certificates(vec![trusted_root]).unwrap());
        let payload = sign_payload(&transaction_claims(), &signer_certificate, &key);

        let result: Result<JwsTransactionDecodedPayloadModel, _> =
            verifier.verify_and_decode(&payload, Environment::Production).await;
        assert!(matches!(result, Err(EntitlementError::SignatureInvalid(_))));
    }

    #[tokio::test]
    async fn rejects_tampered_payload() {
        let (certificate, key) = self_signed_certificate("Trusted Signer");
        let verifier =
            verifier_for(CertificateStore::from_certificates(vec![certificate.clone()]).unwrap());
        let payload = sign_payload(&transaction_claims(), &certificate, &key);

        // Swap the payload segment for different claims, keeping the valid
        // signature.
        let mut tampered_claims = transaction_claims();
        tampered_claims["productId"] = "premium_yearly".into();
        let tampered = {
            use base64::engine::general_purpose::URL_SAFE_NO_PAD;
            let segments: Vec<&str> = payload.split('.').collect();
            format!(
                "{}.{}.{}",
                segments[0],
                URL_SAFE_NO_PAD.encode(tampered_claims.to_string()),
                segments[2]
            )
        };

        let result: Result<JwsTransactionDecodedPayloadModel, _> =
            verifier.verify_and_decode(&tampered, Environment::Production).await;
        assert!(matches!(result, Err(EntitlementError::SignatureInvalid(_))));
    }

    #[tokio::test]
    async fn rejects_foreign_bundle_id() {
        let (certificate, key) = self_signed_certificate("Trusted Signer");
        let verifier =
            verifier_for(CertificateStore::from_certificates(vec![certificate.clone()]).unwrap());
        let mut claims = transaction_claims();
        claims["bundleId"] = "com.other.app".into();
        let payload = sign_payload(&claims, &certificate, &key);

        let result: Result<JwsTransactionDecodedPayloadModel, _> =
            verifier.verify_and_decode(&payload, Environment::Production).await;
        assert!(matches!(result, Err(EntitlementError::SignatureInvalid(_))));
    }

    #[tokio::test]
    async fn rejects_environment_mismatch() {
        let (certificate, key) = self_signed_certificate("Trusted Signer");
        let verifier =
            verifier_for(CertificateStore::from_certificates(vec![certificate.clone()]).unwrap());
        let payload = sign_payload(&transaction_claims(), &certificate, &key);

        // Payload says Production, resolution attempt ran against sandbox.
        let result: Result<JwsTransactionDecodedPayloadModel, _> =
            verifier.verify_and_decode(&payload, Environment::Sandbox).await;
        assert!(matches!(result, Err(EntitlementError::SignatureInvalid(_))));
    }

    #[tokio::test]
    async fn rejects_garbage_payload() {
        let (certificate, _) = self_signed_certificate("Trusted Signer");
        let verifier = verifier_for(CertificateStore::from_certificates(vec![certificate]).unwrap());
        let result: Result<JwsTransactionDecodedPayloadModel, _> = verifier
            .verify_and_decode("not-a-jws", Environment::Production)
            .await;
        assert!(matches!(result, Err(EntitlementError::SignatureInvalid(_))));
    }

    #[tokio::test]
    async fn unusable_leaf_key_is_unauthorized_not_internal() {
        use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
        use base64::Engine;
        use crate::certificates::test_support::self_signed_certificate_with_key;

        // A trusted certificate whose key is RSA rather than EC. The chain
        // verifies, but the leaf key cannot back an ES256 signature; that is
        // a property of the presented payload and must be rejected as
        // unauthorized rather than surfaced as an internal failure.
        let rsa = openssl::rsa::Rsa::generate(2048).unwrap();
        let key = openssl::pkey::PKey::from_rsa(rsa).unwrap();
        let certificate = self_signed_certificate_with_key("RSA Signer", &key);
        let verifier =
            verifier_for(CertificateStore::from_certificates(vec![certificate.clone()]).unwrap());

        let header = serde_json::json!({
            "alg": "ES256",
            "x5c": [STANDARD.encode(certificate.to_der().unwrap())],
        });
        let payload = format!(
            "{}.{}.AAAA",
            URL_SAFE_NO_PAD.encode(header.to_string()),
            URL_SAFE_NO_PAD.encode(transaction_claims().to_string())
        );

        let result: Result<JwsTransactionDecodedPayloadModel, _> =
            verifier.verify_and_decode(&payload, Environment::Production).await;
        let error = result.expect_err("RSA leaf key must be rejected");
        assert!(matches!(error, EntitlementError::SignatureInvalid(_)));
        assert_eq!(error.status_code(), 401);
    }
}
