use std::path::Path;

use openssl::x509::store::{X509Store, X509StoreBuilder};
use openssl::x509::X509;

use crate::constants::APPLE_ROOT_CERTIFICATE_FILES;
use crate::errors::EntitlementError;

/// The fixed set of Apple root certificates that anchors signed-payload
/// verification.
///
/// All four roots must load; a missing or unreadable file is fatal, since an
/// incomplete trust set would weaken verification silently. Read-only after
/// construction and safe for unsynchronized concurrent reads.
pub struct CertificateStore {
    store: X509Store,
}

impl CertificateStore {
    pub fn load(dir: &Path) -> Result<Self, EntitlementError> {
        let mut builder = X509StoreBuilder::new()?;
        for file_name in APPLE_ROOT_CERTIFICATE_FILES {
            let path = dir.join(file_name);
            let der = std::fs::read(&path).map_err(|e| {
                EntitlementError::CertificateMissing(format!("{}: {e}", path.display()))
            })?;
            let certificate = X509::from_der(&der).map_err(|e| {
                EntitlementError::CertificateMissing(format!("{}: {e}", path.display()))
            })?;
            builder.add_cert(certificate)?;
        }
        Ok(Self {
            store: builder.build(),
        })
    }

    /// Build a store from in-memory certificates. Used by tests, and by
    /// embedders that bundle the roots instead of reading them from disk.
    pub fn from_certificates(roots: Vec<X509>) -> Result<Self, EntitlementError> {
        let mut builder = X509StoreBuilder::new()?;
        for certificate in roots {
            builder.add_cert(certificate)?;
        }
        Ok(Self {
            store: builder.build(),
        })
    }

    pub(crate) fn as_openssl_store(&self) -> &X509Store {
        &self.store
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::self_signed_certificate;
    use super::*;

    #[test]
    fn missing_root_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let (certificate, _) = self_signed_certificate("Test Root");
        // Write only the first three of the four expected roots.
        for file_name in &APPLE_ROOT_CERTIFICATE_FILES[..3] {
            std::fs::write(dir.path().join(file_name), certificate.to_der().unwrap()).unwrap();
        }

        match CertificateStore::load(dir.path()) {
            Err(EntitlementError::CertificateMissing(message)) => {
                assert!(message.contains(APPLE_ROOT_CERTIFICATE_FILES[3]));
            }
            other => panic!("expected CertificateMissing, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn unreadable_root_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let (certificate, _) = self_signed_certificate("Test Root");
        for file_name in APPLE_ROOT_CERTIFICATE_FILES {
            std::fs::write(dir.path().join(file_name), certificate.to_der().unwrap()).unwrap();
        }
        // Corrupt one of the present files; this must be as fatal as a
        // missing one.
        std::fs::write(
            dir.path().join(APPLE_ROOT_CERTIFICATE_FILES[1]),
            b"not a certificate",
        )
        .unwrap();

        assert!(matches!(
            CertificateStore::load(dir.path()),
            Err(EntitlementError::CertificateMissing(_))
        ));
    }

    #[test]
    fn loads_complete_trust_set() {
        let dir = tempfile::tempdir().unwrap();
        let (certificate, _) = self_signed_certificate("Test Root");
        for file_name in APPLE_ROOT_CERTIFICATE_FILES {
            std::fs::write(dir.path().join(file_name), certificate.to_der().unwrap()).unwrap();
        }
        assert!(CertificateStore::load(dir.path()).is_ok());
    }
}
