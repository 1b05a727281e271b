use candid::Principal;
use futures::future::{self, LocalBoxFuture};
use ic_agent::hash_tree::{self, LookupResult};
use ic_agent::{Agent, Certificate};
use sha2::{Digest, Sha256};

use crate::error::GatewayError;

type HashTree = hash_tree::HashTree<Vec<u8>>;

const ASSETS_LABEL: &[u8] = b"http_assets";

const INDEX_PATH: &str = "/index.html";

/// Decides whether a body is what the canister certified for a path.
///
/// `Ok(false)` means the body does not match; `Err` is reserved for
/// certificates or trees that cannot be read at all.
pub trait CertificateVerifier {
    fn verify<'a>(
        &'a self,
        canister_id: &'a Principal,
        path: &'a str,
        body: &'a [u8],
        certificate: &'a [u8],
        tree: &'a [u8],
        streaming: bool,
    ) -> LocalBoxFuture<'a, Result<bool, GatewayError>>;
}

/// Checks certificates against the root key the agent trusts.
pub struct AgentCertificateVerifier {
    agent: Agent,
}

impl AgentCertificateVerifier {

    pub fn new(agent: Agent) -> Self {
        Self { agent }
    }

    fn check(
        &self,
        canister_id: &Principal,
        path: &str,
        body: &[u8],
        certificate: &[u8],
        tree: &[u8],
    ) -> Result<bool, GatewayError> {
        let certificate: Certificate = serde_cbor::from_slice(certificate)
            .map_err(|e| GatewayError::Verification(format!("malformed certificate: {}", e)))?;
        let tree: HashTree = serde_cbor::from_slice(tree)
            .map_err(|e| GatewayError::Verification(format!("malformed tree: {}", e)))?;

        if let Err(e) = self.agent.verify(&certificate, *canister_id) {
            warn!("Certificate for canister {} is not trusted: {}", canister_id, e);
            return Ok(false);
        }
        if !certifies_tree(&certificate.tree, canister_id, &tree)? {
            warn!("Tree does not match the certified data of canister {}", canister_id);
            return Ok(false);
        }
        Ok(certifies_body(&tree, path, body))
    }
}

/// Whether the canister's certified data is the root hash of `tree`.
fn certifies_tree(certified: &HashTree, canister_id: &Principal, tree: &HashTree) -> Result<bool, GatewayError> {
    match certified.lookup_path([
        b"canister".as_slice(),
        canister_id.as_slice(),
        b"certified_data".as_slice(),
    ]) {
        LookupResult::Found(data) => Ok(data == tree.digest().as_slice()),
        _ => Err(GatewayError::Verification(format!(
            "certificate holds no certified data for canister {}", canister_id
        ))),
    }
}

/// Whether `tree` records the SHA-256 of `body` for `path`, or for the index page when
/// `path` has no entry.
fn certifies_body(tree: &HashTree, path: &str, body: &[u8]) -> bool {
    let body_sha = Sha256::digest(body);
    let asset_sha = lookup_asset(tree, path).or_else(|| lookup_asset(tree, INDEX_PATH));
    asset_sha == Some(body_sha.as_slice())
}

fn lookup_asset<'t>(tree: &'t HashTree, path: &str) -> Option<&'t [u8]> {
    match tree.lookup_path([ASSETS_LABEL, path.as_bytes()]) {
        LookupResult::Found(sha) => Some(sha),
        _ => None,
    }
}

impl CertificateVerifier for AgentCertificateVerifier {

    fn verify<'a>(
        &'a self,
        canister_id: &'a Principal,
        path: &'a str,
        body: &'a [u8],
        certificate: &'a [u8],
        tree: &'a [u8],
        streaming: bool,
    ) -> LocalBoxFuture<'a, Result<bool, GatewayError>> {
        let result = if streaming {
            Err(GatewayError::Verification("streamed bodies are not supported".to_string()))
        } else {
            self.check(canister_id, path, body, certificate, tree)
        };
        Box::pin(future::ready(result))
    }
}

#[cfg(test)]
mod tests {
    use ic_agent::hash_tree::{fork, label, leaf};

    use super::*;

    const CANISTER_ID: &str = "jbxh5-eqaaa-aaaae-qaaoq-cai";

    fn sha(body: &[u8]) -> Vec<u8> {
        Sha256::digest(body).to_vec()
    }

    /// `http_assets` holding `/index.html` and `/style.css`, labels in order.
    fn assets() -> HashTree {
        label(
            ASSETS_LABEL.to_vec(),
            fork(
                label(b"/index.html".to_vec(), leaf(sha(b"<h1>index</h1>"))),
                label(b"/style.css".to_vec(), leaf(sha(b"body {}"))),
            ),
        )
    }

    fn certified_data(canister_id: &Principal, data: Vec<u8>) -> HashTree {
        label(
            b"canister".to_vec(),
            label(canister_id.as_slice().to_vec(), label(b"certified_data".to_vec(), leaf(data))),
        )
    }

    fn verifier() -> AgentCertificateVerifier {
        let agent = Agent::builder().with_url("http://127.0.0.1:4943").build().unwrap();
        AgentCertificateVerifier::new(agent)
    }

    #[test]
    fn body_is_matched_against_its_path() {
        let tree = assets();
        assert!(certifies_body(&tree, "/style.css", b"body {}"));
        assert!(!certifies_body(&tree, "/style.css", b"body { color: red }"));
    }

    #[test]
    fn unknown_paths_fall_back_to_the_index_page() {
        let tree = assets();
        assert!(certifies_body(&tree, "/some/route", b"<h1>index</h1>"));
        assert!(!certifies_body(&tree, "/some/route", b"body {}"));
        assert_eq!(lookup_asset(&tree, "/some/route"), None);
    }

    #[test]
    fn tree_must_hash_to_the_certified_data() {
        let canister_id = Principal::from_text(CANISTER_ID).unwrap();
        let tree = assets();
        let certified = certified_data(&canister_id, tree.digest().to_vec());
        assert!(certifies_tree(&certified, &canister_id, &tree).unwrap());

        let stale = certified_data(&canister_id, vec![0; 32]);
        assert!(!certifies_tree(&stale, &canister_id, &tree).unwrap());
    }

    #[test]
    fn certificate_for_another_canister_is_an_error() {
        let canister_id = Principal::from_text(CANISTER_ID).unwrap();
        let tree = assets();
        let certified = certified_data(&Principal::anonymous(), tree.digest().to_vec());
        assert!(matches!(
            certifies_tree(&certified, &canister_id, &tree),
            Err(GatewayError::Verification(_))
        ));
    }

    #[actix_rt::test]
    async fn malformed_certificate_is_an_error() {
        let canister_id = Principal::from_text(CANISTER_ID).unwrap();
        let tree = serde_cbor::to_vec(&assets()).unwrap();
        let result = verifier()
            .verify(&canister_id, "/index.html", b"<h1>index</h1>", b"CERT", &tree, false)
            .await;
        match result {
            Err(GatewayError::Verification(message)) => assert!(message.contains("certificate"), "{}", message),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn malformed_tree_is_an_error() {
        let canister_id = Principal::from_text(CANISTER_ID).unwrap();
        let certificate = Certificate {
            tree: certified_data(&canister_id, assets().digest().to_vec()),
            signature: vec![0; 48],
            delegation: None,
        };
        let certificate = serde_cbor::to_vec(&certificate).unwrap();
        let result = verifier()
            .verify(&canister_id, "/index.html", b"<h1>index</h1>", &certificate, b"TREE", false)
            .await;
        match result {
            Err(GatewayError::Verification(message)) => assert!(message.contains("tree"), "{}", message),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn streamed_bodies_are_refused() {
        let canister_id = Principal::from_text(CANISTER_ID).unwrap();
        let result = verifier()
            .verify(&canister_id, "/index.html", b"", b"", b"", true)
            .await;
        assert!(matches!(result, Err(GatewayError::Verification(_))));
    }
}
