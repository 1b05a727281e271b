#[macro_use]
extern crate log;

use std::io;

use actix_web::{middleware, web, App, HttpServer};
use ic_agent::Agent;

use ic_page_gateway::common;
use ic_page_gateway::gateway::query_client::AgentQueryClient;
use ic_page_gateway::gateway::verifier::AgentCertificateVerifier;
use ic_page_gateway::gateway::{handler_proxy, options, Gateway};

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new()
        .default_filter_or("actix_server=info,actix_web=info,page_gateway=debug,ic_page_gateway=debug"));

    let options: options::GatewayOptions = options::parse_options();

    common::print_banner("Gateway");

    let config = options.gateway_config()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
    let agent = Agent::builder()
        .with_url(config.replica_url.as_str())
        .build()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    if options.fetch_root_key {
        warn!("Fetching the root key from {}. This is only safe against a local replica.", config.replica_url);
        agent.fetch_root_key().await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    }
    info!("Serving *{} from canister {} through {}", config.managed_domain, config.canister_id, config.replica_url);

    let gateway = web::Data::new(Gateway::new(
        config,
        AgentQueryClient::new(agent.clone(), options.timeout()),
        AgentCertificateVerifier::new(agent),
    ));
    let bind_addr = format!("{}:{}", options.bind_addr, options.port);
    let max_body_size = options.max_body_size;
    let options = web::Data::new(options);

    HttpServer::new(move || {
        App::new()
            // enable logger
            .wrap(middleware::Logger::default())
            .app_data(gateway.clone())
            .app_data(options.clone())
            .app_data(web::PayloadConfig::new(max_body_size))
            .app_data(web::Data::new(awc::Client::default()))
            // every path on every host goes through the gateway
            .default_service(web::to(handler_proxy::handle::<AgentQueryClient, AgentCertificateVerifier>))
    })
        .bind(bind_addr)?
        .run()
        .await
}
