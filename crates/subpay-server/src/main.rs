//! subpay HTTP Server
//!
//! Axum-based backend for the subscription checkout page: lists plans,
//! creates Razorpay orders and verifies completed payments. Also serves the
//! built WASM frontend.

mod app;
mod handlers;
mod state;

use std::sync::Arc;

use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use subpay_payments::{
    MemoryOrderStore, MemorySubscriptionStore, OrderGateway, RazorpayClient, SubscriptionStore,
};

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    // Subscription catalog
    let subscriptions = MemorySubscriptionStore::from_env()?;
    tracing::info!("Loaded {} subscriptions:", subscriptions.len());
    for subscription in subscriptions.list()? {
        tracing::info!("  • #{} {} ₹{}", subscription.id, subscription.name, subscription.price);
    }

    // Initialize payments
    let razorpay: Option<Arc<dyn OrderGateway>> = match RazorpayClient::from_env() {
        Ok(client) => {
            tracing::info!(key_id = %client.key_id(), "✓ Razorpay configured");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!("⚠ Razorpay not configured - payments disabled ({})", e);
            tracing::warn!("  Set RAZORPAY_KEY_ID and RAZORPAY_KEY_SECRET in .env");
            None
        }
    };

    // Build application state
    let state = AppState {
        subscriptions: Arc::new(subscriptions),
        orders: Arc::new(MemoryOrderStore::new()),
        razorpay,
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Static files (WASM frontend)
    let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "static".into());

    let app = app::router(state)
        .fallback_service(ServeDir::new(&static_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 subpay server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                     - Health check");
    tracing::info!("  GET  /razorpay/subscriptions/    - List subscriptions");
    tracing::info!("  POST /razorpay/pay/              - Create Razorpay order");
    tracing::info!("  POST /razorpay/payment/success/  - Verify payment");
    tracing::info!("  GET  /*                          - Frontend from {}", static_dir);
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
