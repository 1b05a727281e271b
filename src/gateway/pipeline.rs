use url::Url;
use uuid::Uuid;

use crate::common::certificate::CertificateBundle;
use crate::common::{self, codec};
use crate::error::GatewayError;
use crate::gateway::config::GatewayConfig;
use crate::gateway::query_client::QueryClient;
use crate::gateway::verifier::CertificateVerifier;
use crate::models::{BoxedQuery, BoxedResponse, GatewayResponse, HeaderField, InboundRequest};

/// What to do with a request once the gateway has looked at it.
#[derive(Debug)]
pub enum GatewayOutcome {
    /// Not for the managed domain; send it on unchanged.
    Passthrough(InboundRequest),
    Respond(GatewayResponse),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    VerifiedRaw,
    VerifiedDecoded,
    Rejected,
}

/// Reply headers after the single walk over them.
#[derive(Debug, Default)]
struct ReplyHeaders {
    forwarded: Vec<HeaderField>,
    certificate: CertificateBundle,
    content_encoding: String,
}

impl ReplyHeaders {

    fn parse(headers: Vec<HeaderField>) -> Self {
        let mut parsed = Self::default();
        for (key, value) in headers {
            if CertificateBundle::is_certificate_header(&key) {
                parsed.certificate.absorb(&value);
            } else if key.trim().eq_ignore_ascii_case(common::HEADER_CONTENT_ENCODING) {
                parsed.content_encoding = value.trim().to_string();
            }
            parsed.forwarded.push((key, value));
        }
        parsed
    }
}

/// Serves the managed domain from one canister, releasing only verified bodies.
pub struct Gateway<Q, V> {
    config: GatewayConfig,
    query_client: Q,
    verifier: V,
}

impl<Q: QueryClient, V: CertificateVerifier> Gateway<Q, V> {

    pub fn new(config: GatewayConfig, query_client: Q, verifier: V) -> Self {
        Self { config, query_client, verifier }
    }

    #[cfg(test)]
    pub(crate) fn query_client(&self) -> &Q {
        &self.query_client
    }

    #[cfg(test)]
    pub(crate) fn verifier(&self) -> &V {
        &self.verifier
    }

    /// Routes `request` and, for the managed domain, answers it from the canister.
    ///
    /// Every failure is turned into a response here.
    pub async fn handle(&self, request: InboundRequest) -> GatewayOutcome {
        let url = match Url::parse(&request.url) {
            Ok(url) => url,
            Err(e) => {
                let error = GatewayError::from(e);
                error!("Cannot route {:?}: {}", request.url, error);
                return GatewayOutcome::Respond(GatewayResponse::internal_error(&error));
            }
        };
        if !self.config.manages(&url) {
            debug!("Passing through {}", url);
            return GatewayOutcome::Passthrough(request);
        }

        let request_id = Uuid::new_v4().to_string();
        let response = match self.certified_response(&request_id, &url, request).await {
            Ok(response) => response,
            Err(e) => {
                error!("[req:{}] Failed to fetch response: {}", request_id, e);
                GatewayResponse::internal_error(&e)
            }
        };
        GatewayOutcome::Respond(response)
    }

    async fn certified_response(
        &self,
        request_id: &str,
        url: &Url,
        request: InboundRequest,
    ) -> Result<GatewayResponse, GatewayError> {
        let query = BoxedQuery::from_inbound(url, request);
        debug!("[req:{}]\n{}", request_id, query);
        let reply = self.query_client.query(&self.config.canister_id, query).await?;
        debug!("[req:{}]\n{}", request_id, reply);

        let BoxedResponse { status_code, headers, body } = reply;
        let headers = ReplyHeaders::parse(headers);
        let (certificate, tree) = match headers.certificate.parts() {
            Some(parts) => parts,
            None => {
                warn!("[req:{}] No certificate for {}. {}", request_id, url, common::MSG_BODY_NOT_VERIFIED);
                return Ok(GatewayResponse::rejected());
            }
        };

        let identity = codec::decode_body(&body, &headers.content_encoding)?;
        let outcome = self.verify_body(url.path(), &body, &identity, certificate, tree).await?;
        if outcome == VerificationOutcome::Rejected {
            warn!("[req:{}] {}: {}", request_id, common::MSG_BODY_NOT_VERIFIED, url);
            return Ok(GatewayResponse::rejected());
        }

        debug!("[req:{}] {:?} for {}", request_id, outcome, url);
        Ok(GatewayResponse {
            status: status_code,
            headers: headers.forwarded,
            body: identity.into_owned(),
        })
    }

    /// Tries the wire body first and then its decoded form, accepting the first
    /// one the verifier vouches for. A verifier error ends the attempts.
    pub async fn verify_body(
        &self,
        path: &str,
        raw: &[u8],
        decoded: &[u8],
        certificate: &[u8],
        tree: &[u8],
    ) -> Result<VerificationOutcome, GatewayError> {
        let attempts = [
            (VerificationOutcome::VerifiedRaw, raw),
            (VerificationOutcome::VerifiedDecoded, decoded),
        ];
        for (outcome, body) in attempts {
            let verified = self.verifier
                .verify(&self.config.canister_id, path, body, certificate, tree, false)
                .await?;
            if verified {
                return Ok(outcome);
            }
        }
        Ok(VerificationOutcome::Rejected)
    }
}
