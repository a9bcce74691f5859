//! # thermohubd: thermohub daemon
//!
//! Composition root that wires the demo thermostat integration into the host
//! services and runs it until interrupted.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialise logging
//! - Construct the event bus, the application services and the integration
//!   context handed to the integration
//! - Run the integration lifecycle: setup, persist discoveries, background
//!   updates, teardown
//! - Log every bus event, optionally drive random demo commands
//! - Handle graceful shutdown (Ctrl-C)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;
mod driver;

use std::sync::Arc;

use anyhow::Context;
use thermohub_adapter_demo::{DemoIntegration, TokioScheduler};
use thermohub_app::event_bus::InProcessEventBus;
use thermohub_app::ports::{Integration, IntegrationContext};
use thermohub_app::services::device_service::DeviceService;
use thermohub_app::services::entity_service::EntityService;
use thermohub_app::services::integration_context::ServiceContext;
use thermohub_domain::event::Event;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config.logging.filter);

    // Host services
    let event_bus = Arc::new(InProcessEventBus::new(config.bus.capacity));
    let device_service = Arc::new(DeviceService::new());
    let entity_service = Arc::new(EntityService::new(Arc::clone(&event_bus)));
    let ctx = ServiceContext::new(
        Arc::clone(&device_service),
        Arc::clone(&entity_service),
        Arc::clone(&event_bus),
    );
    let logger = tokio::spawn(log_events(event_bus.subscribe()));

    // Integration
    let scheduler = Arc::new(TokioScheduler::current()?);
    let mut integration = DemoIntegration::new(config.hub.clone(), scheduler);
    let discovered = integration
        .setup()
        .await
        .with_context(|| format!("{} setup failed", integration.name()))?;
    for dd in discovered {
        ctx.persist_discovered(dd)
            .context("failed to register discovered device")?;
    }
    integration
        .start_background(ctx.clone())
        .await
        .context("failed to start background updates")?;

    tracing::info!(
        integration = integration.name(),
        devices = device_service.list_devices().len(),
        entities = entity_service.list_entities().len(),
        "thermohubd running, press Ctrl-C to stop"
    );

    tokio::select! {
        () = driver::run(&integration, &config.demo) => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl-C")?;
            tracing::info!("shutdown requested");
        }
    }

    integration
        .teardown()
        .await
        .context("integration teardown failed")?;
    logger.abort();
    tracing::info!("thermohubd stopped");

    Ok(())
}

fn init_tracing(filter: &str) {
    let (env_filter, rejected) = match EnvFilter::try_new(filter) {
        Ok(env_filter) => (env_filter, None),
        Err(err) => (EnvFilter::new("info"), Some(err)),
    };
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    if let Some(err) = rejected {
        tracing::warn!(filter, error = %err, "invalid log filter, falling back to info");
    }
}

async fn log_events(mut rx: broadcast::Receiver<Event>) {
    loop {
        match rx.recv().await {
            Ok(event) => tracing::info!(
                event_type = %event.event_type,
                entity_id = event.entity_id.as_ref().map_or("-", |id| id.as_str()),
                data = %event.data,
                "event"
            ),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event logger lagging behind, events dropped");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
