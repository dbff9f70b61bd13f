/// App Store Server API base URLs, per environment.
///
/// https://developer.apple.com/documentation/appstoreserverapi
pub(crate) const APP_STORE_SERVER_API_PRODUCTION_URL: &str =
    "https://api.storekit.itunes.apple.com";
pub(crate) const APP_STORE_SERVER_API_SANDBOX_URL: &str =
    "https://api.storekit-sandbox.itunes.apple.com";

/// Audience claim required by App Store Connect API tokens.
pub(crate) const APP_STORE_CONNECT_AUDIENCE: &str = "appstoreconnect-v1";

/// Lifetime of a freshly signed App Store Connect API token. Apple rejects
/// tokens valid for longer than 60 minutes; a new token is signed per call.
pub(crate) const APP_STORE_CONNECT_TOKEN_LIFETIME_MINUTES: i64 = 10;

/// Subscription status codes requested from Get All Subscription Statuses.
/// 1 = active, 4 = billing grace period.
pub(crate) const SUBSCRIPTION_STATUS_FILTER: [u8; 2] = [1, 4];

/// The four Apple root certificates that anchor signed-payload verification.
/// All four must be present (DER encoded) in the configured directory.
pub(crate) const APPLE_ROOT_CERTIFICATE_FILES: [&str; 4] = [
    "AppleComputerRootCertificate.cer",
    "AppleIncRootCertificate.cer",
    "AppleRootCA-G2.cer",
    "AppleRootCA-G3.cer",
];

/// Default OCSP responder used for online revocation checks.
pub(crate) const DEFAULT_OCSP_RESPONDER_URL: &str = "http://ocsp.apple.com/ocsp03-applerootca";

/// Per-call timeout applied to all remote calls made during a resolution.
pub(crate) const REMOTE_CALL_TIMEOUT_SECONDS: u64 = 15;
