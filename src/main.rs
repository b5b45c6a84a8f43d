use std::sync::Arc;

use anyhow::Context;
use log::{error, info};
use stk_push::{
    config::{AppConfig, DemoPush},
    payment_gateway::merchant_portal::gateway_timestamp,
    CallbackServer, LoggingHandler, Merchant, MpesaClient, StkPushRequest,
};

async fn send_demo_push(client: &MpesaClient, merchant: &Merchant, push: &DemoPush) {
    let timestamp = gateway_timestamp();
    let request = StkPushRequest::new(
        merchant,
        &timestamp,
        push.amount,
        &push.phone_number,
        &push.call_back_url,
        &push.account_reference,
        &push.transaction_desc,
    );

    match client.initiate_stk_push(&request).await {
        Ok(ack) => info!("{:?}", ack),
        Err(e) => error!("stk push failed: {}", e),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for ctrl-c: {}", e);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let client = MpesaClient::new(&config.gateway)?;

    if let Some(push) = &config.demo_push {
        send_demo_push(&client, &config.merchant, push).await;
    }

    CallbackServer::new(config.server, Arc::new(LoggingHandler))
        .serve_until(shutdown_signal())
        .await
}
