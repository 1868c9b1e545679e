use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tracing::{error, info};

use vnpay_gateway::api::payments::{self, AppState};
use vnpay_gateway::gateway::client::GatewayClient;
use vnpay_gateway::gateway::config::GatewayConfig;
use vnpay_gateway::logging::init_tracing;
use vnpay_gateway::middleware::logging::{request_logging_middleware, UuidRequestId};
use vnpay_gateway::services::callback::CallbackService;
use vnpay_gateway::services::payment_url::PaymentUrlService;
use vnpay_gateway::services::refund::RefundService;
use vnpay_gateway::services::transaction_query::TransactionQueryService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    info!("Starting VNPay gateway service");

    let config = Arc::new(GatewayConfig::from_env().map_err(|e| {
        error!("Failed to load gateway configuration: {}", e);
        e
    })?);

    let client =
        GatewayClient::new(config.api_url.clone(), config.request_timeout_secs).map_err(|e| {
            error!("Failed to initialize gateway HTTP client: {}", e);
            anyhow::anyhow!(e.to_string())
        })?;

    let state = AppState {
        payment_url: Arc::new(PaymentUrlService::new(config.clone())),
        callback: Arc::new(CallbackService::new(config.clone())),
        query: Arc::new(TransactionQueryService::new(config.clone(), client.clone())),
        refund: Arc::new(RefundService::new(config.clone(), client)),
    };

    let app = payments::router(state)
        .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
        .layer(axum::middleware::from_fn(request_logging_middleware))
        .layer(PropagateRequestIdLayer::x_request_id());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
