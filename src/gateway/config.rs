use candid::Principal;
use url::Url;

/// Everything the pipeline needs to know about the canister it fronts.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub managed_domain: String,
    pub canister_id: Principal,
    pub replica_url: Url,
}

impl GatewayConfig {

    pub fn new(managed_domain: &str, canister_id: Principal, replica_url: Url) -> Self {
        Self {
            managed_domain: managed_domain.to_ascii_lowercase(),
            canister_id,
            replica_url,
        }
    }

    /// Whether `url` is served from the canister rather than passed through.
    pub fn manages(&self, url: &Url) -> bool {
        url.host_str()
            .map(|host| host.ends_with(&self.managed_domain))
            .unwrap_or(false)
    }
}
