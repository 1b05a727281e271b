use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::http::{Method, StatusCode};
use actix_web::{error, web, Error, HttpRequest, HttpResponse};
use url::Url;

use crate::common;
use crate::gateway::options::GatewayOptions;
use crate::gateway::query_client::QueryClient;
use crate::gateway::verifier::CertificateVerifier;
use crate::gateway::{self, Gateway, GatewayOutcome, MSG_INVALID_METHOD, MSG_INVALID_STRING, MSG_LOOP_DETECTED,
                     MSG_NOT_SUPPORTED, MSG_SOMETHING_WRONG, VIA_PSEUDONYM};
use crate::models::{GatewayResponse, InboundRequest};

pub async fn handle<Q, V>(gateway: web::Data<Gateway<Q, V>>,
                          options: web::Data<GatewayOptions>,
                          http_client: web::Data<awc::Client>,
                          request: HttpRequest,
                          body: web::Bytes) -> Result<HttpResponse, Error>
where
    Q: QueryClient + 'static,
    V: CertificateVerifier + 'static,
{
    if request.method() == Method::CONNECT {
        log::debug!("Refusing to tunnel to {}", request.uri());
        return Ok(HttpResponse::MethodNotAllowed()
            .content_type("text/plain")
            .body(MSG_NOT_SUPPORTED));
    }

    let inbound = inbound_request(&request, body)?;
    match gateway.handle(inbound).await {
        GatewayOutcome::Passthrough(inbound) if loops_back(&options, &inbound) => {
            log::warn!("Refusing to forward {} back to the gateway", inbound.url);
            Ok(HttpResponse::build(StatusCode::LOOP_DETECTED)
                .content_type("text/plain")
                .body(MSG_LOOP_DETECTED))
        }
        GatewayOutcome::Passthrough(inbound) => passthrough(&http_client, &options, inbound).await,
        GatewayOutcome::Respond(response) => Ok(to_http_response(response)),
    }
}

/// Captures the browser request, rebuilding the absolute URL for origin-form targets.
fn inbound_request(request: &HttpRequest, body: web::Bytes) -> Result<InboundRequest, Error> {
    let uri = request.uri();
    let url = if uri.scheme().is_some() {
        uri.to_string()
    } else {
        let info = request.connection_info();
        format!("{}://{}{}", info.scheme(), info.host(), uri)
    };

    let mut headers = Vec::with_capacity(request.headers().len());
    for (header_name, header_value) in request.headers().iter().filter(|(h, _)| !gateway::is_hop_by_hop(h.as_str())) {
        let value = header_value.to_str().map_err(|_| error::ErrorBadRequest(MSG_INVALID_STRING))?;
        headers.push((header_name.as_str().to_string(), value.to_string()));
    }

    Ok(InboundRequest {
        method: request.method().to_string(),
        url,
        headers,
        body,
    })
}

/// A request loops when it already went through this gateway or is addressed to it.
fn loops_back(options: &GatewayOptions, inbound: &InboundRequest) -> bool {
    let via_us = inbound.headers.iter()
        .filter(|(key, _)| key.trim().eq_ignore_ascii_case("via"))
        .flat_map(|(_, value)| value.split(','))
        .any(|hop| hop.split_whitespace().nth(1) == Some(VIA_PSEUDONYM));
    if via_us {
        return true;
    }
    match Url::parse(&inbound.url) {
        Ok(url) => url.host_str() == Some(options.bind_addr.trim())
            && url.port_or_known_default() == Some(options.port),
        Err(_) => false,
    }
}

async fn passthrough(http_client: &awc::Client,
                     options: &GatewayOptions,
                     inbound: InboundRequest) -> Result<HttpResponse, Error> {
    let method = Method::from_bytes(inbound.method.as_bytes())
        .map_err(|_| error::ErrorBadRequest(MSG_INVALID_METHOD))?;
    log::debug!("Forwarding {} {}", method, inbound.url);

    let mut forward = http_client
        .request(method, inbound.url.as_str())
        .no_decompress()
        .timeout(options.timeout());
    for (key, value) in &inbound.headers {
        forward = forward.append_header((key.as_str(), value.as_str()));
    }
    forward = forward.append_header(("via", format!("1.1 {}", VIA_PSEUDONYM)));

    let upstream = forward.send_body(inbound.body).await.map_err(|e| {
        log::error!("Failed to reach {} due to {}", inbound.url, e);
        error::ErrorBadGateway(MSG_SOMETHING_WRONG)
    })?;

    let mut client_resp = HttpResponse::build(upstream.status());
    for (header_name, header_value) in upstream.headers().iter().filter(|(h, _)| !gateway::is_hop_by_hop(h.as_str())) {
        client_resp.append_header((header_name.clone(), header_value.clone()));
    }
    Ok(client_resp.streaming(upstream))
}

/// Writes a gateway response to the socket.
///
/// The released body is always the identity form, so `content-encoding` is not
/// sent along with it; framing headers are left to actix.
pub fn to_http_response(response: GatewayResponse) -> HttpResponse {
    let status = StatusCode::from_u16(response.status).unwrap_or_else(|_| {
        log::warn!("Canister answered with an invalid status code: {}", response.status);
        StatusCode::INTERNAL_SERVER_ERROR
    });
    let mut client_resp = HttpResponse::build(status);
    for (key, value) in &response.headers {
        let key = key.trim();
        if gateway::is_hop_by_hop(key) || key.eq_ignore_ascii_case(common::HEADER_CONTENT_ENCODING) {
            continue;
        }
        match (HeaderName::from_bytes(key.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                client_resp.append_header((name, value));
            }
            _ => log::warn!("Dropping a header that cannot be sent: {}", key),
        }
    }
    client_resp.body(response.body)
}
