use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::OnceCell;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS, SubscribeFilter};
use tokio::task::JoinHandle;
use url::Url;

use crate::constants::defaults;
use crate::mapping::ServerDescriptor;
use crate::router::Sample;

use super::{
    ClientIdentity, DataChange, NotificationSink, TransportError, UpstreamSession,
    UpstreamTransport,
};

const SUPPORTED_SCHEMES: [&str; 2] = ["mqtt", "tcp"];
const REQUEST_CHANNEL_CAPACITY: usize = 10;

/// Upstream transport where every channel key is an MQTT topic
#[derive(Debug, Default, Clone)]
pub struct MqttTransport;

impl MqttTransport {
    pub fn new() -> Self {
        MqttTransport
    }
}

pub(crate) fn parse_endpoint(endpoint: &str) -> Result<(String, u16), TransportError> {
    let invalid = |reason: String| TransportError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason,
    };
    let url = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
    if !SUPPORTED_SCHEMES.contains(&url.scheme()) {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| invalid("missing host".to_string()))?;
    Ok((host.to_string(), url.port().unwrap_or(defaults::MQTT_PORT)))
}

#[async_trait]
impl UpstreamTransport for MqttTransport {
    async fn connect(
        &self,
        server: &ServerDescriptor,
        identity: &ClientIdentity,
    ) -> Result<Box<dyn UpstreamSession>, TransportError> {
        let (host, port) = parse_endpoint(&server.endpoint)?;
        // Brokers drop an older session that reuses a client id
        let client_id = format!("{}-{}", identity.client_id, server.unit_id);
        log::info!("Establishing MQTT connection to {host}:{port} as {client_id}");

        let mut options = MqttOptions::new(client_id, host, port);
        options.set_keep_alive(defaults::MQTT_KEEP_ALIVE);
        if let Some(username) = &server.credentials.username {
            options.set_credentials(
                username.clone(),
                server.credentials.password.clone().unwrap_or_default(),
            );
        }

        let (client, mut eventloop) = AsyncClient::new(options, REQUEST_CHANNEL_CAPACITY);
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => break,
                Ok(notification) => log::trace!("Notification = {notification:?}"),
                Err(e) => {
                    return Err(TransportError::Connect {
                        endpoint: server.endpoint.clone(),
                        reason: e.to_string(),
                    })
                }
            }
        }

        let alive = Arc::new(AtomicBool::new(true));
        let sink = Arc::new(OnceCell::new());
        let event_task = tokio::spawn(drive_event_loop(eventloop, alive.clone(), sink.clone()));
        Ok(Box::new(MqttSession {
            client,
            alive,
            sink,
            event_task,
        }))
    }
}

struct MqttSession {
    client: AsyncClient,
    alive: Arc<AtomicBool>,
    sink: Arc<OnceCell<NotificationSink>>,
    event_task: JoinHandle<()>,
}

async fn drive_event_loop(
    mut eventloop: EventLoop,
    alive: Arc<AtomicBool>,
    sink: Arc<OnceCell<NotificationSink>>,
) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let Some(sink) = sink.get() else {
                    continue;
                };
                let change = DataChange {
                    channel: publish.topic.clone(),
                    value: Sample::parse(&String::from_utf8_lossy(&publish.payload)),
                    source_timestamp: Some(Utc::now()),
                };
                if sink.send_async(change).await.is_err() {
                    log::debug!("Notification receiver gone, leaving event loop");
                    break;
                }
            }
            Ok(notification) => log::trace!("Notification = {notification:?}"),
            Err(e) => {
                log::warn!("MQTT connection error: {e}");
                break;
            }
        }
    }
    alive.store(false, Ordering::SeqCst);
}

#[async_trait]
impl UpstreamSession for MqttSession {
    async fn subscribe(
        &mut self,
        channels: &[String],
        sampling_interval: Duration,
        sink: NotificationSink,
    ) -> Result<usize, TransportError> {
        if self.sink.set(sink).is_err() {
            log::debug!("Session already has a notification sink");
        }
        if channels.is_empty() {
            return Ok(0);
        }
        // Brokers push on publish, the sampling interval has no MQTT equivalent
        log::debug!(
            "Subscribing to {} topic(s), requested sampling {sampling_interval:?}",
            channels.len()
        );
        let filters = channels
            .iter()
            .map(|topic| SubscribeFilter::new(topic.clone(), QoS::AtLeastOnce));
        self.client
            .subscribe_many(filters)
            .await
            .map_err(|e| TransportError::Subscribe(e.to_string()))?;
        Ok(channels.len())
    }

    async fn check_connection(&mut self) -> Result<(), TransportError> {
        if self.alive.load(Ordering::SeqCst) && !self.event_task.is_finished() {
            Ok(())
        } else {
            Err(TransportError::ConnectionLost(
                "MQTT event loop terminated".to_string(),
            ))
        }
    }

    async fn disconnect(&mut self) {
        if let Err(e) = self.client.disconnect().await {
            log::debug!("MQTT disconnect: {e}");
        }
        self.event_task.abort();
    }
}
