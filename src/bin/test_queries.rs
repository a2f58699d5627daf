/// Smoke test of the query façade against a live node
/// Run with: cargo run --bin test_queries [config.toml] [creator address]

use anyhow::Result;
use std::sync::Arc;

use cosmos_codec::chain::queries::{
    query_client_states, query_client_status, query_denoms_from_creator, query_params, query_pool,
    query_validators,
};
use cosmos_codec::chain::{GrpcTransport, QueryClient, QueryOptions, QueryStore, TokenFactoryRest};
use cosmos_codec::codec::{JsonProjection, Message};
use cosmos_codec::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cosmos_codec=debug".into()),
        )
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let creator = std::env::args().nth(2);
    let config = Config::load_or_default(&path)?;
    let projection = JsonProjection::new(config.codec);

    println!("=== Cosmos Query Test ===\n");
    println!("gRPC endpoint: {}", config.chain.grpc_endpoint);
    println!("REST endpoint: {}", config.chain.rest_endpoint);
    println!("Chain ID: {}\n", config.chain.chain_id);

    let mut transport = GrpcTransport::new(config.chain.clone());
    println!("Connecting...");
    transport.connect().await?;
    println!("Connected!\n");
    let transport = Arc::new(transport);

    println!("=== Staking ===");
    let staking = QueryClient::staking(transport.clone());
    match query_pool(&staking).await {
        Ok(Some(pool)) => println!("✅ Pool: {}", projection.to_plain(&cosmos_codec::chain::proto::staking::pool(), &pool)?),
        Ok(None) => println!("⚠️  Pool response was empty"),
        Err(e) => println!("❌ Pool query failed: {}", e),
    }
    match query_params(&staking).await {
        Ok(params) => println!("✅ Params present: {}", params.is_some()),
        Err(e) => println!("❌ Params query failed: {}", e),
    }
    match query_validators(&staking, Some("BOND_STATUS_BONDED")).await {
        Ok(validators) => {
            println!("✅ {} bonded validators", validators.len());
            for validator in validators.iter().take(3) {
                let moniker = validator
                    .get_message("description")
                    .and_then(|d| d.get_str("moniker"))
                    .unwrap_or_default();
                println!("  {} {}", validator.get_str("operator_address").unwrap_or_default(), moniker);
            }
        }
        Err(e) => println!("❌ Validators query failed: {}", e),
    }
    println!();

    println!("=== IBC client ===");
    let ibc = QueryClient::ibc_client(transport.clone());
    match query_client_states(&ibc).await {
        Ok(states) => {
            println!("✅ {} light clients", states.len());
            if let Some(client_id) = states.first().and_then(|s| s.get_str("client_id")) {
                match query_client_status(&ibc, client_id).await {
                    Ok(status) => println!("  {} is {}", client_id, status),
                    Err(e) => println!("❌ Client status failed: {}", e),
                }
            }
        }
        Err(e) => println!("❌ Client states query failed: {}", e),
    }
    println!();

    println!("=== Token factory ===");
    let tokenfactory = QueryClient::tokenfactory(transport.clone());
    let rest = TokenFactoryRest::from_config(&config.chain, projection)?;
    match rest.params().await {
        Ok(params) => println!("✅ REST params: {}", projection.to_plain(
            &cosmos_codec::chain::proto::tokenfactory::query_params_response(),
            &params,
        )?),
        Err(e) => println!("❌ REST params query failed: {}", e),
    }
    if let Some(creator) = creator.as_deref() {
        match query_denoms_from_creator(&tokenfactory, creator).await {
            Ok(denoms) => println!("✅ gRPC: {} denoms from {}", denoms.len(), creator),
            Err(e) => println!("❌ gRPC denoms query failed: {}", e),
        }
        match rest.denoms_from_creator(creator).await {
            Ok(response) => println!("✅ REST: {}", projection.to_plain(
                &cosmos_codec::chain::proto::tokenfactory::query_denoms_from_creator_response(),
                &response,
            )?),
            Err(e) => println!("❌ REST denoms query failed: {}", e),
        }
    } else {
        println!("Skipping denoms_from_creator (no creator address given)");
    }
    println!();

    println!("=== Query store ===");
    let store = QueryStore::new(QueryClient::staking(transport), projection);
    let options = QueryOptions { subscribe: true, all: false };
    match store.query("Pool", &Message::new(), options).await {
        Ok(_) => {
            let report = store.refresh().await;
            println!(
                "✅ Refreshed {} subscriptions, {} failed",
                report.refreshed.len(),
                report.failed.len()
            );
        }
        Err(e) => println!("❌ Store query failed: {}", e),
    }

    println!("\n=== Test Complete ===");
    Ok(())
}
