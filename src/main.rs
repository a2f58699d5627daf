use anyhow::{bail, Context, Result};
use std::sync::Arc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cosmos_codec::chain::proto::{ibc_client, staking, tokenfactory, ServiceDescriptor};
use cosmos_codec::chain::{GrpcTransport, QueryClient, SchemaRegistry};
use cosmos_codec::codec::{Codec, JsonProjection};
use cosmos_codec::config::Config;

#[derive(Parser)]
#[command(name = "cosmos-codec")]
#[command(about = "Schema-driven protobuf codec and query client for Cosmos chains", version)]
struct Cli {
    /// Configuration file path; defaults apply when it does not exist
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a default configuration file
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "config.toml")]
        output: String,
    },

    /// List every declared message type
    Types,

    /// Show the fields of a message type
    Describe {
        /// Fully-qualified name or type URL, e.g. cosmos.staking.v1beta1.Validator
        type_name: String,
    },

    /// Encode a JSON message to hex protobuf bytes
    Encode {
        type_name: String,
        json: String,
    },

    /// Decode hex protobuf bytes to JSON
    Decode {
        type_name: String,
        #[arg(value_name = "HEX")]
        input: String,
    },

    /// Run a gRPC query against the configured node
    Query {
        /// staking, ibc-client or tokenfactory
        module: String,
        /// RPC name, e.g. Validators
        method: String,
        /// Request as JSON
        #[arg(default_value = "{}")]
        json: String,
        /// Follow pagination to the last page
        #[arg(long)]
        all: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cosmos_codec=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { output } => {
            let config = Config::default();
            config.save(&output)?;
            info!("Configuration file created at: {}", output);
        }
        Commands::Types => {
            for name in SchemaRegistry::global().names() {
                println!("{}", name);
            }
        }
        Commands::Describe { type_name } => {
            let codec = lookup(&type_name)?;
            println!("{}", serde_json::to_string_pretty(&codec.describe())?);
        }
        Commands::Encode { type_name, json } => {
            let projection = projection(&cli.config)?;
            let codec = lookup(&type_name)?;
            let plain: serde_json::Value = serde_json::from_str(&json).context("invalid JSON")?;
            let message = projection.from_plain(&codec, &plain)?;
            println!("{}", hex::encode(codec.encode(&message)?));
        }
        Commands::Decode { type_name, input } => {
            let projection = projection(&cli.config)?;
            let codec = lookup(&type_name)?;
            let bytes = hex::decode(input.trim()).context("invalid hex")?;
            let message = codec.decode(&bytes)?;
            println!("{}", serde_json::to_string_pretty(&projection.to_plain(&codec, &message)?)?);
        }
        Commands::Query { module, method, json, all } => {
            run_query(&cli.config, &module, &method, &json, all).await?;
        }
    }

    Ok(())
}

fn lookup(type_name: &str) -> Result<Arc<Codec>> {
    match SchemaRegistry::global().get(type_name) {
        Some(codec) => Ok(codec),
        None => bail!("Unknown type {}. Run `types` to list declared types", type_name),
    }
}

fn projection(config_path: &str) -> Result<JsonProjection> {
    let config = Config::load_or_default(config_path)?;
    Ok(JsonProjection::new(config.codec))
}

fn query_service(module: &str) -> Result<&'static ServiceDescriptor> {
    match module {
        "staking" => Ok(&staking::QUERY),
        "ibc-client" | "ibc_client" => Ok(&ibc_client::QUERY),
        "tokenfactory" => Ok(&tokenfactory::QUERY),
        other => bail!("Unknown module {}. Use staking, ibc-client or tokenfactory", other),
    }
}

async fn run_query(config_path: &str, module: &str, method: &str, json: &str, all: bool) -> Result<()> {
    let config = Config::load_or_default(config_path)?;
    let projection = JsonProjection::new(config.codec);
    let service = query_service(module)?;
    let Some(descriptor) = service.method(method) else {
        let names: Vec<_> = service.methods.iter().map(|m| m.name).collect();
        bail!("Unknown method {} on {}. Available: {}", method, service.name, names.join(", "));
    };

    let plain: serde_json::Value = serde_json::from_str(json).context("invalid request JSON")?;
    let request = projection.from_plain(&(descriptor.request)(), &plain)?;

    let mut transport = GrpcTransport::new(config.chain.clone());
    transport.connect().await?;
    info!("Connected to {} ({})", config.chain.grpc_endpoint, config.chain.chain_id);

    let client = QueryClient::new(transport, service);
    let response = if all {
        client.call_all(method, &request).await?
    } else {
        client.call(method, &request).await?
    };

    let rendered = projection.to_plain(&(descriptor.response)(), &response)?;
    println!("{}", serde_json::to_string_pretty(&rendered)?);
    Ok(())
}
