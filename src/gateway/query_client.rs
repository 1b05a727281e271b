use std::time::Duration;

use candid::{Decode, Encode, Principal};
use futures::future::{FutureExt, LocalBoxFuture};
use ic_agent::Agent;

use crate::error::GatewayError;
use crate::models::{BoxedQuery, BoxedResponse};

/// The only method the gateway ever calls, and always as a query.
pub const HTTP_REQUEST_METHOD: &str = "http_request";

/// Sends one boxed request to a canister and returns its boxed reply.
///
/// Implementations make exactly one call and never retry. Any transport or
/// interface failure comes back as a single error.
pub trait QueryClient {
    fn query<'a>(
        &'a self,
        canister_id: &'a Principal,
        query: BoxedQuery,
    ) -> LocalBoxFuture<'a, Result<BoxedResponse, GatewayError>>;
}

pub struct AgentQueryClient {
    agent: Agent,
    timeout: Duration,
}

impl AgentQueryClient {
    pub fn new(agent: Agent, timeout: Duration) -> Self {
        Self { agent, timeout }
    }
}

impl QueryClient for AgentQueryClient {

    fn query<'a>(
        &'a self,
        canister_id: &'a Principal,
        query: BoxedQuery,
    ) -> LocalBoxFuture<'a, Result<BoxedResponse, GatewayError>> {
        async move {
            let arg = Encode!(&query)?;
            let call = self.agent
                .query(canister_id, HTTP_REQUEST_METHOD)
                .with_arg(arg)
                .call();
            let reply = match tokio::time::timeout(self.timeout, call).await {
                Ok(reply) => reply.map_err(|e| GatewayError::Transport(e.to_string()))?,
                Err(_) => {
                    return Err(GatewayError::Transport(format!(
                        "no reply from {} within {:?}", canister_id, self.timeout
                    )))
                }
            };
            let response = Decode!(&reply, BoxedResponse)?;
            Ok(response)
        }
        .boxed_local()
    }
}
