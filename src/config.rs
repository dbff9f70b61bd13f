use std::env;
use std::path::PathBuf;

use crate::constants::DEFAULT_OCSP_RESPONDER_URL;
use crate::errors::EntitlementError;

/// Credentials and trust configuration, established once at process start.
///
/// Absence of any required value is a startup-fatal configuration error;
/// requests are never served with a partial configuration.
#[derive(Debug, Clone)]
pub struct EntitlementConfig {
    /// Contents of the App Store Connect API private key (`.p8`, PEM).
    pub api_key: String,
    pub key_id: String,
    pub issuer_id: String,
    pub bundle_id: String,
    /// Numeric Apple id of the app, cross-checked against signed payloads.
    pub app_apple_id: i64,
    /// Directory holding the four Apple root certificates (DER).
    pub root_certificates_dir: PathBuf,
    /// OCSP responder used for online revocation checks.
    pub ocsp_responder_url: String,
}

impl EntitlementConfig {
    pub fn from_env() -> Result<Self, EntitlementError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            api_key: require("APPLE_API_KEY")?,
            key_id: require("APPLE_KEY_ID")?,
            issuer_id: require("APPLE_ISSUER_ID")?,
            bundle_id: require("APP_BUNDLE_ID")?,
            app_apple_id: require("APP_APPLE_ID")?
                .parse()
                .map_err(|_| EntitlementError::ConfigurationMissing("APP_APPLE_ID"))?,
            root_certificates_dir: require("APPLE_ROOT_CERTIFICATES_DIR")?.into(),
            ocsp_responder_url: env::var("APPLE_OCSP_RESPONDER_URL")
                .unwrap_or_else(|_| DEFAULT_OCSP_RESPONDER_URL.to_string()),
        })
    }
}

fn require(name: &'static str) -> Result<String, EntitlementError> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(EntitlementError::ConfigurationMissing(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_var_is_configuration_error() {
        // Only this test touches these variable names, so no env races.
        env::set_var("APPLE_API_KEY", "key material");
        env::set_var("APPLE_KEY_ID", "ABC123");
        env::set_var("APPLE_ISSUER_ID", "issuer-uuid");
        env::set_var("APP_BUNDLE_ID", "com.example.app");
        env::set_var("APP_APPLE_ID", "123456789");
        env::remove_var("APPLE_ROOT_CERTIFICATES_DIR");

        match EntitlementConfig::from_env() {
            Err(EntitlementError::ConfigurationMissing("APPLE_ROOT_CERTIFICATES_DIR")) => {}
            other => panic!("expected ConfigurationMissing, got {other:?}"),
        }

        env::set_var("APPLE_ROOT_CERTIFICATES_DIR", "/etc/apple-roots");
        let config = EntitlementConfig::from_env().unwrap();
        assert_eq!(config.app_apple_id, 123456789);
        assert_eq!(config.ocsp_responder_url, DEFAULT_OCSP_RESPONDER_URL);
    }
}
