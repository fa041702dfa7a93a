//! Upstream sources: the transport seam, per-source workers and notification
//! dispatch into the router
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::mapping::ServerDescriptor;
use crate::router::Sample;

mod dispatch;
mod identity;
mod mqtt;
mod worker;

pub use dispatch::dispatch_notifications;
pub use identity::{get_rand_client_id, ClientIdentity, IdentityStore};
pub use mqtt::MqttTransport;
pub use worker::{UpstreamWorker, WorkerContext, WorkerState, WorkerTiming};

/// One value change pushed by an upstream source
#[derive(Clone, Debug, PartialEq)]
pub struct DataChange {
    pub channel: String,
    pub value: Sample,
    pub source_timestamp: Option<DateTime<Utc>>,
}

pub type NotificationSink = flume::Sender<DataChange>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("could not connect to {endpoint}: {reason}")]
    Connect { endpoint: String, reason: String },
    #[error("connect to {0} timed out")]
    Timeout(String),
    #[error("subscription failed: {0}")]
    Subscribe(String),
    #[error("connection lost: {0}")]
    ConnectionLost(String),
}

#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    async fn connect(
        &self,
        server: &ServerDescriptor,
        identity: &ClientIdentity,
    ) -> Result<Box<dyn UpstreamSession>, TransportError>;
}

#[async_trait]
pub trait UpstreamSession: Send {
    /// Registers one batched subscription; returns the number of channels
    /// accepted
    async fn subscribe(
        &mut self,
        channels: &[String],
        sampling_interval: Duration,
        sink: NotificationSink,
    ) -> Result<usize, TransportError>;

    async fn check_connection(&mut self) -> Result<(), TransportError>;

    async fn disconnect(&mut self);
}
