use std::time::Duration;

use candid::Principal;
use clap::Parser;
use url::Url;

use crate::error::GatewayError;
use crate::gateway::config::GatewayConfig;

/// A local gateway that only hands out canister content it could verify.
#[derive(Clone, Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct GatewayOptions {
    /// A bind address. The default value is 127.0.0.1
    #[clap(short, long, default_value = "127.0.0.1")]
    pub bind_addr: String,
    /// The port number that the gateway will listen to the browser. The default value is 8080
    #[clap(short, long, default_value = "8080")]
    pub port: u16,
    /// Requests whose host ends with this domain are served from the canister.
    #[clap(short, long, default_value = "ic0.page")]
    pub domain: String,
    /// The canister that owns the managed domain.
    #[clap(short, long, default_value = "jbxh5-eqaaa-aaaae-qaaoq-cai")]
    pub canister_id: String,
    /// The replica (boundary node) that answers the queries.
    #[clap(short, long, default_value = "https://ic0.app")]
    pub replica_url: String,
    /// Timeout for a single canister query or passthrough request in seconds
    #[clap(long, default_value = "30")]
    pub timeout: u64,
    /// The largest request body accepted from the browser, in bytes
    #[clap(long, default_value = "10485760")]
    pub max_body_size: usize,
    /// Fetch the root key from the replica. Only for local development replicas.
    #[clap(long)]
    pub fetch_root_key: bool,
}

impl GatewayOptions {

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn gateway_config(&self) -> Result<GatewayConfig, GatewayError> {
        let domain = self.domain.trim();
        if domain.is_empty() {
            return Err(GatewayError::InvalidConfig("the managed domain is empty".to_string()));
        }
        let canister_id = Principal::from_text(&self.canister_id).map_err(|e| {
            GatewayError::InvalidConfig(format!("canister id {} due to {}", self.canister_id, e))
        })?;
        let replica_url = Url::parse(&self.replica_url).map_err(|e| {
            GatewayError::InvalidConfig(format!("replica url {} due to {}", self.replica_url, e))
        })?;
        Ok(GatewayConfig::new(domain, canister_id, replica_url))
    }
}

pub fn parse_options() -> GatewayOptions {
    Parser::parse()
}
