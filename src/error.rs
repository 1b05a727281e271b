use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Unsupported encoding: \"{0}\"")]
    UnsupportedEncoding(String),

    #[error("Could not decode the {encoding} body: {source}")]
    MalformedBody {
        encoding: String,
        #[source]
        source: io::Error,
    },

    #[error("Canister call failed: {0}")]
    Transport(String),

    #[error("Canister reply does not match the http_request interface: {0}")]
    Schema(#[from] candid::Error),

    #[error("Certificate could not be checked: {0}")]
    Verification(String),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
