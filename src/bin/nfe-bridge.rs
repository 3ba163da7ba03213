use std::sync::Arc;

use nfe_bridge::bridge::{BridgeConfig, Issuer, NfeIoDispatch};
use nfe_bridge::frappe::FrappeClient;
use nfe_bridge::nfeio::NfeIoClient;
use nfe_bridge::server::{router, WebhookAuth};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // JSON logs + timestamps, configurable via RUST_LOG.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = BridgeConfig::load()?;
    if config.webhook_secret.is_empty() {
        tracing::warn!("WEBHOOK_SECRET not set; every issuance webhook will be rejected");
    }
    if config.nfe_company_id.is_empty() {
        tracing::warn!("NFE_COMPANY_ID not set; issuance requests will fail upstream");
    }

    let frappe = FrappeClient::new(
        &config.frappe_url,
        &config.frappe_api_key,
        &config.frappe_api_secret,
        config.invoice_doctype.clone(),
    )?;
    let nfeio = NfeIoClient::new(
        &config.nfe_endpoint,
        &config.nfe_consult_endpoint,
        config.nfe_api_key.clone(),
    )?;
    let dispatch = NfeIoDispatch {
        client: nfeio,
        company_id: config.nfe_company_id.clone(),
    };

    let issuer = Arc::new(Issuer::new(frappe, dispatch, config.issuer_state.clone()));
    let app = router(issuer, WebhookAuth::from_config(&config));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
