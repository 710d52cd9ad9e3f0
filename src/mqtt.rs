//! MQTT ceiling override listener
//!
//! Runs as an independent tokio task. Accepted payloads are written to
//! the shared `Ceiling`; nothing else is touched. Connection loss is
//! logged and retried, leaving the ceiling at its last known value.

use crate::ceiling::Ceiling;
use crate::constants::{MQTT_CHANNEL_CAPACITY, MQTT_KEEP_ALIVE_SECS, MQTT_RECONNECT_DELAY_SECS};
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Broker connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqttSettings {
    pub host: String,
    pub port: u16,
    pub topic: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Parse an override payload as a decimal integer
///
/// Range checking is left to `Ceiling::set_override`.
pub fn parse_override(payload: &[u8]) -> Option<i64> {
    std::str::from_utf8(payload).ok()?.trim().parse().ok()
}

/// Apply one received payload to the ceiling
///
/// Returns the accepted value.
pub fn handle_payload(ceiling: &Ceiling, payload: &[u8], now: Instant) -> Option<u8> {
    let value = parse_override(payload)?;
    if ceiling.set_override(value, now) {
        Some(value as u8)
    } else {
        None
    }
}

fn options(settings: &MqttSettings) -> MqttOptions {
    let client_id = format!("evohome-mitm-{}", std::process::id());
    let mut options = MqttOptions::new(client_id, settings.host.clone(), settings.port);
    options.set_keep_alive(Duration::from_secs(MQTT_KEEP_ALIVE_SECS));
    if let Some(username) = &settings.username {
        options.set_credentials(
            username.clone(),
            settings.password.clone().unwrap_or_default(),
        );
    }
    options
}

/// True when `topic` falls under the subscribed `filter`, wildcards included
fn is_override_topic(topic: &str, filter: &str) -> bool {
    rumqttc::matches(topic, filter)
}

/// Listen for overrides until the task is dropped
pub async fn run_listener(settings: MqttSettings, ceiling: Arc<Ceiling>) {
    let (client, mut eventloop) = AsyncClient::new(options(&settings), MQTT_CHANNEL_CAPACITY);

    info!(
        "MQTT listening on {}:{} topic {}",
        settings.host, settings.port, settings.topic
    );

    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                // Subscriptions do not survive a reconnect with a clean session
                match client.try_subscribe(settings.topic.clone(), QoS::AtMostOnce) {
                    Ok(()) => debug!("MQTT connected, subscribed to {}", settings.topic),
                    Err(e) => warn!("MQTT subscribe failed: {}", e),
                }
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                if !is_override_topic(&publish.topic, &settings.topic) {
                    continue;
                }
                match handle_payload(&ceiling, &publish.payload, Instant::now()) {
                    Some(value) => info!("MQTT override max_ch_raw={}", value),
                    None => debug!("MQTT payload ignored: {:?}", publish.payload),
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!(
                    "MQTT unavailable: {}, retrying in {}s",
                    e, MQTT_RECONNECT_DELAY_SECS
                );
                tokio::time::sleep(Duration::from_secs(MQTT_RECONNECT_DELAY_SECS)).await;
            }
        }
    }
}
