//! Demo command driver: periodically retargets a random thermostat.

use rand::Rng;
use thermohub_adapter_demo::{DemoIntegration, SERVICE_SET_TEMPERATURE};
use thermohub_app::ports::Integration;
use thermohub_domain::id::EntityId;
use tokio::time::MissedTickBehavior;

use crate::config::DriverConfig;

/// Send a random `set_temperature` command every configured interval.
///
/// Never returns; when the driver is disabled it just waits forever, so it
/// can sit in a `select!` next to the shutdown signal.
pub async fn run(integration: &DemoIntegration, config: &DriverConfig) {
    let Some(period) = config.interval() else {
        tracing::debug!("demo driver disabled");
        std::future::pending::<()>().await;
        return;
    };

    tracing::info!(?period, "demo driver started");
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let Some((entity_id, target)) = pick_command(integration, config) else {
            continue;
        };
        match integration
            .handle_service_call(
                &entity_id,
                SERVICE_SET_TEMPERATURE,
                serde_json::json!({ "temperature": target }),
            )
            .await
        {
            Ok(entity) => {
                tracing::info!(%entity_id, target, state = %entity.state, "demo command sent");
            }
            Err(err) => tracing::warn!(%entity_id, target, error = %err, "demo command failed"),
        }
    }
}

fn pick_command(integration: &DemoIntegration, config: &DriverConfig) -> Option<(EntityId, i32)> {
    let sensors = integration.sensors();
    if sensors.is_empty() {
        return None;
    }
    let mut rng = rand::rng();
    let sensor = &sensors[rng.random_range(0..sensors.len())];
    let target = rng.random_range(config.min_target..=config.max_target);
    Some((sensor.unique_id().clone(), target))
}
