#![allow(dead_code)]

use serde::Deserialize;
use serde_repr::Deserialize_repr;

/// The server environment a payload or response originates from, as Apple
/// spells it inside signed payloads and API responses.
#[derive(Debug, PartialEq, Deserialize)]
pub(crate) enum ApiEnvironment {
    /// Indicates that the data applies to testing in the sandbox environment.
    Sandbox,
    /// Indicates that the data applies to the production environment.
    Production,

    #[serde(untagged)]
    Unknown(String),
}

/// The status of an auto-renewable subscription.
///
/// https://developer.apple.com/documentation/appstoreserverapi/status
#[derive(Debug, Clone, Copy, PartialEq, Deserialize_repr)]
#[repr(u8)]
pub(crate) enum SubscriptionStatus {
    /// The auto-renewable subscription is active.
    Active = 1,
    /// The auto-renewable subscription is expired.
    Expired = 2,
    /// The auto-renewable subscription is in a billing retry period.
    BillingRetry = 3,
    /// The auto-renewable subscription is in a Billing Grace Period.
    BillingGracePeriod = 4,
    /// The auto-renewable subscription is revoked.
    Revoked = 5,
}
