//! Recording stand-ins for the canister and the certificate check.

use std::collections::VecDeque;
use std::sync::Mutex;

use candid::Principal;
use futures::future::{self, LocalBoxFuture};
use serde_bytes::ByteBuf;
use url::Url;

use crate::error::GatewayError;
use crate::gateway::config::GatewayConfig;
use crate::gateway::pipeline::Gateway;
use crate::gateway::query_client::QueryClient;
use crate::gateway::verifier::CertificateVerifier;
use crate::models::{BoxedQuery, BoxedResponse};

pub const CANISTER_ID: &str = "jbxh5-eqaaa-aaaae-qaaoq-cai";

pub const CERTIFICATE_HEADER: &str = "certificate=:Q0VSVA==: , tree=:VFJFRQ==:";

pub fn config() -> GatewayConfig {
    GatewayConfig::new(
        "ic0.page",
        Principal::from_text(CANISTER_ID).unwrap(),
        Url::parse("https://ic0.app").unwrap(),
    )
}

pub fn reply(status_code: u16, headers: &[(&str, &str)], body: &[u8]) -> BoxedResponse {
    BoxedResponse {
        status_code,
        headers: headers.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        body: ByteBuf::from(body.to_vec()),
    }
}

/// Answers every query with the same reply, or the same transport failure.
pub struct StaticQueryClient {
    reply: Result<BoxedResponse, String>,
    pub queries: Mutex<Vec<BoxedQuery>>,
}

impl StaticQueryClient {

    pub fn replying(reply: BoxedResponse) -> Self {
        Self { reply: Ok(reply), queries: Mutex::new(vec![]) }
    }

    pub fn failing(message: &str) -> Self {
        Self { reply: Err(message.to_string()), queries: Mutex::new(vec![]) }
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

impl QueryClient for StaticQueryClient {

    fn query<'a>(
        &'a self,
        _canister_id: &'a Principal,
        query: BoxedQuery,
    ) -> LocalBoxFuture<'a, Result<BoxedResponse, GatewayError>> {
        self.queries.lock().unwrap().push(query);
        let reply = self.reply.clone().map_err(GatewayError::Transport);
        Box::pin(future::ready(reply))
    }
}

/// A single verifier call as it was observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyCall {
    pub path: String,
    pub body: Vec<u8>,
    pub certificate: Vec<u8>,
    pub tree: Vec<u8>,
    pub streaming: bool,
}

/// Plays back scripted answers in order; `false` once the script runs out.
pub struct ScriptedVerifier {
    answers: Mutex<VecDeque<Result<bool, GatewayError>>>,
    pub calls: Mutex<Vec<VerifyCall>>,
}

impl ScriptedVerifier {

    pub fn answering(answers: Vec<Result<bool, GatewayError>>) -> Self {
        Self { answers: Mutex::new(answers.into()), calls: Mutex::new(vec![]) }
    }

    pub fn calls(&self) -> Vec<VerifyCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl CertificateVerifier for ScriptedVerifier {

    fn verify<'a>(
        &'a self,
        _canister_id: &'a Principal,
        path: &'a str,
        body: &'a [u8],
        certificate: &'a [u8],
        tree: &'a [u8],
        streaming: bool,
    ) -> LocalBoxFuture<'a, Result<bool, GatewayError>> {
        self.calls.lock().unwrap().push(VerifyCall {
            path: path.to_string(),
            body: body.to_vec(),
            certificate: certificate.to_vec(),
            tree: tree.to_vec(),
            streaming,
        });
        let answer = self.answers.lock().unwrap().pop_front().unwrap_or(Ok(false));
        Box::pin(future::ready(answer))
    }
}

pub fn gateway(
    reply: BoxedResponse,
    answers: Vec<Result<bool, GatewayError>>,
) -> Gateway<StaticQueryClient, ScriptedVerifier> {
    Gateway::new(config(), StaticQueryClient::replying(reply), ScriptedVerifier::answering(answers))
}
