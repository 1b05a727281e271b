pub mod config;
pub mod handler_proxy;
pub mod options;
pub mod pipeline;
pub mod query_client;
pub mod verifier;

#[cfg(test)]
pub(crate) mod testing;

pub use pipeline::{Gateway, GatewayOutcome, VerificationOutcome};

pub const MSG_SOMETHING_WRONG: &str = "Oops";
pub const MSG_INVALID_STRING: &str = "Not UTF-8";
pub const MSG_INVALID_METHOD: &str = "Unknown method";
pub const MSG_NOT_SUPPORTED: &str = "Tunnelling is not yet supported";
pub const MSG_LOOP_DETECTED: &str = "The request loops back to the gateway";

/// How the gateway names itself in the `Via` header of requests it forwards.
pub const VIA_PSEUDONYM: &str = "ic-page-gateway";

/// Connection-level and framing headers that are never copied from one hop to the next.
const HOP_BY_HOP_HEADERS: [&str; 9] = [
    "connection",
    "proxy-connection",
    "keep-alive",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "content-length",
];

pub fn is_hop_by_hop(name: &str) -> bool {
    let name = name.trim();
    HOP_BY_HOP_HEADERS.iter().any(|h| name.eq_ignore_ascii_case(h))
}
