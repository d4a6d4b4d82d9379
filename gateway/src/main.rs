//! Inference Gateway - one HTTP entry point in front of SageMaker endpoints,
//! Bedrock foundation models and a hosted completion service.

use std::env;
use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

use inference_gateway::backends::load_aws_config;
use inference_gateway::{
    logging, ApiGatewayEvent, Backends, BedrockBackend, Config, Gateway, HttpCompletionBackend,
    LayeredTargets, SageMakerBackend,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_usage() {
    println!(
        "inference-gateway {}\n\n\
         USAGE:\n    \
         inference-gateway                 serve HTTP\n    \
         inference-gateway --event <FILE>  handle one proxy event (- for stdin)\n    \
         inference-gateway --version",
        VERSION
    );
}

/// Run a single API Gateway proxy event and print the response JSON.
async fn run_event(gateway: &Gateway, source: &str) -> Result<(), Box<dyn std::error::Error>> {
    let raw = if source == "-" {
        let mut raw = String::new();
        tokio::io::stdin().read_to_string(&mut raw).await?;
        raw
    } else {
        tokio::fs::read_to_string(source).await?
    };

    let event: ApiGatewayEvent = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse event from {}: {}", source, e))?;
    let response = gateway.handle_event(event).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("inference-gateway {}", VERSION);
        return Ok(());
    }
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }
    let event_source = match args.iter().position(|a| a == "--event") {
        Some(index) => Some(
            args.get(index + 1)
                .cloned()
                .ok_or("--event requires a file path or -")?,
        ),
        None => None,
    };

    // Load configuration
    let config = Config::load().map_err(|e| {
        format!(
            "Failed to load configuration: {}. \
             Check gateway.toml or the GATEWAY__SECTION__KEY environment variables.",
            e
        )
    })?;

    logging::init(&config.logging.level);

    // Backend clients live for the whole process
    let sdk_config = load_aws_config(&config.aws.region).await;
    tracing::info!("AWS clients bound to region {}", config.aws.region);

    let backends = Backends {
        tensor: Arc::new(SageMakerBackend::new(&sdk_config)),
        foundation: Arc::new(BedrockBackend::new(&sdk_config)),
        completion: Arc::new(HttpCompletionBackend::new()),
    };
    let gateway = Arc::new(Gateway::new(backends, Arc::new(LayeredTargets)));

    if let Some(source) = event_source {
        return run_event(&gateway, &source).await;
    }

    tracing::info!("Starting inference gateway");
    let app = inference_gateway::app(gateway, &config.server);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(
        max_body_bytes = config.server.max_body_bytes,
        "Listening on {}",
        addr
    );

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
