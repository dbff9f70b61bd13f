use async_trait::async_trait;

use crate::domain::entities::entitlement::EntitlementRecord;
use crate::errors::EntitlementError;

#[async_trait]
pub trait EntitlementRepository: Send + Sync {
    /// Resolves a submitted purchase proof (a StoreKit signed transaction or
    /// a bare transaction id) into a verified entitlement record.
    ///
    /// Production is queried first; the sandbox is attempted only when
    /// production does not know the transaction. Signed payloads returned by
    /// the App Store are cryptographically verified before any of their
    /// fields reach the record.
    async fn resolve_entitlement(&self, body: &str)
        -> Result<EntitlementRecord, EntitlementError>;
}
