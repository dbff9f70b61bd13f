pub(crate) mod data {
    pub(crate) mod datasources {
        pub(crate) mod signed_payload_verifier;
        pub(crate) mod subscription_status_datasource;
        pub(crate) mod utils;
    }
    pub(crate) mod models {
        pub(crate) mod app_store_server_api {
            pub(crate) mod common;
            pub(crate) mod error_response_model;
            pub(crate) mod jws_renewal_info_decoded_payload_model;
            pub(crate) mod jws_transaction_decoded_payload_model;
            pub(crate) mod status_response_model;
        }
    }
    pub(crate) mod repositories {
        pub(crate) mod entitlement_repository_impl;
    }
}

pub mod domain {
    pub mod entities {
        pub mod entitlement;
        pub mod environment;
    }
    pub mod repositories {
        pub mod entitlement_repository;
    }
}

pub mod certificates;
pub mod config;
pub(crate) mod constants;
pub mod errors;
pub mod util;
