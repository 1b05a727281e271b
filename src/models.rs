use std::fmt;

use actix_web::web::Bytes;
use candid::CandidType;
use serde::Deserialize;
use serde_bytes::ByteBuf;
use url::Url;

use crate::common;
use crate::error::GatewayError;

pub type HeaderField = (String, String);

/// A request as the browser sent it. `url` is absolute.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<HeaderField>,
    pub body: Bytes,
}

impl InboundRequest {
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(key, _)| key.trim().eq_ignore_ascii_case(name))
    }
}

/// The `HttpRequest` record of the canister's `http_request` query.
#[derive(Debug, Clone, CandidType, Deserialize)]
pub struct BoxedQuery {
    pub method: String,
    pub url: String,
    pub headers: Vec<HeaderField>,
    pub body: ByteBuf,
}

impl BoxedQuery {
    /// Boxes `request` for the canister. `url` must be the parsed form of `request.url`.
    pub fn from_inbound(url: &Url, request: InboundRequest) -> Self {
        let needs_accept_encoding = !request.has_header(common::HEADER_ACCEPT_ENCODING);
        let mut headers = request.headers;
        if needs_accept_encoding {
            headers.push((
                common::HEADER_ACCEPT_ENCODING.to_string(),
                common::DEFAULT_ACCEPT_ENCODING.to_string(),
            ));
        }
        let path_and_query = match url.query() {
            Some(query) if !query.is_empty() => format!("{}?{}", url.path(), query),
            _ => url.path().to_string(),
        };
        Self {
            method: request.method,
            url: path_and_query,
            headers,
            body: ByteBuf::from(request.body.to_vec()),
        }
    }
}

impl fmt::Display for BoxedQuery {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "==================== QUERY ====================")?;
        writeln!(f, "Sent at {}", chrono::offset::Local::now())?;
        writeln!(f, "URL: {}", self.url)?;
        writeln!(f, "Method: {}", self.method)?;
        writeln!(f, "Headers:")?;
        for (k, v) in self.headers.iter() {
            writeln!(f, " - {} = {}", k, v)?;
        }
        write!(f, "Body: {} bytes", self.body.len())
    }
}

/// The `HttpResponse` record returned by the canister. Untrusted until verified.
#[derive(Debug, Clone, CandidType, Deserialize)]
pub struct BoxedResponse {
    pub status_code: u16,
    pub headers: Vec<HeaderField>,
    pub body: ByteBuf,
}

impl fmt::Display for BoxedResponse {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "==================== REPLY ====================")?;
        writeln!(f, "Received at {}", chrono::offset::Local::now())?;
        writeln!(f, "Status: {}", self.status_code)?;
        writeln!(f, "Headers:")?;
        for (k, v) in self.headers.iter() {
            writeln!(f, " - {} = {}", k, v)?;
        }
        write!(f, "Body: {} bytes", self.body.len())
    }
}

/// What the gateway hands back to the browser for a managed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResponse {
    pub status: u16,
    pub headers: Vec<HeaderField>,
    pub body: Vec<u8>,
}

impl GatewayResponse {

    pub fn rejected() -> Self {
        Self::plain_500(common::MSG_BODY_NOT_VERIFIED.to_string())
    }

    pub fn internal_error(error: &GatewayError) -> Self {
        Self::plain_500(format!("Failed to fetch response: {}", error))
    }

    fn plain_500(message: String) -> Self {
        Self {
            status: 500,
            headers: vec![("content-type".to_string(), "text/plain".to_string())],
            body: message.into_bytes(),
        }
    }
}
