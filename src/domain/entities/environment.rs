use serde::{Deserialize, Serialize};

use crate::constants::{APP_STORE_SERVER_API_PRODUCTION_URL, APP_STORE_SERVER_API_SANDBOX_URL};

/// App Store server environment a resolution attempt runs against.
///
/// Exactly one environment is used per successful resolution; the sandbox is
/// only ever queried after production reports the transaction as unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Production,
    Sandbox,
}

impl Environment {
    pub(crate) fn api_base_url(&self) -> &'static str {
        match self {
            Environment::Production => APP_STORE_SERVER_API_PRODUCTION_URL,
            Environment::Sandbox => APP_STORE_SERVER_API_SANDBOX_URL,
        }
    }

    /// The string Apple uses for this environment inside signed payloads.
    pub(crate) fn payload_value(&self) -> &'static str {
        match self {
            Environment::Production => "Production",
            Environment::Sandbox => "Sandbox",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Environment::Production => "production",
            Environment::Sandbox => "sandbox",
        })
    }
}
