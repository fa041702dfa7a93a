use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use itertools::Itertools;
use tokio::sync::watch;
use tokio::time::{timeout, Instant};

use crate::constants::defaults;
use crate::mapping::{Scope, SensorDescriptor, ServerDescriptor};
use crate::router::Router;

use super::{
    dispatch_notifications, DataChange, IdentityStore, TransportError, UpstreamSession,
    UpstreamTransport,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerState {
    Disconnected,
    Connecting,
    Subscribed,
    /// The worker has exited its loop
    Stopped,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            WorkerState::Disconnected => "disconnected",
            WorkerState::Connecting => "connecting",
            WorkerState::Subscribed => "subscribed",
            WorkerState::Stopped => "stopped",
        };
        f.write_str(state)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerTiming {
    pub sampling_interval: Duration,
    pub liveness_interval: Duration,
    pub reconnect_delay: Duration,
    pub rediscovery_interval: Duration,
    pub connect_timeout: Duration,
    pub dispatch_capacity: usize,
    pub max_in_flight: usize,
}

impl Default for WorkerTiming {
    fn default() -> Self {
        WorkerTiming {
            sampling_interval: defaults::SAMPLING_INTERVAL,
            liveness_interval: defaults::LIVENESS_INTERVAL,
            reconnect_delay: defaults::RECONNECT_DELAY,
            rediscovery_interval: defaults::REDISCOVERY_INTERVAL,
            connect_timeout: defaults::CONNECT_TIMEOUT,
            dispatch_capacity: defaults::DISPATCH_CAPACITY,
            max_in_flight: defaults::DISPATCH_MAX_IN_FLIGHT,
        }
    }
}

/// Everything a worker needs from its driver, handed over at construction
#[derive(Clone)]
pub struct WorkerContext {
    pub transport: Arc<dyn UpstreamTransport>,
    pub identity: Arc<IdentityStore>,
    pub router: Arc<Router>,
    pub timing: WorkerTiming,
    pub stop: watch::Receiver<bool>,
}

enum SessionEnd {
    Stopped,
    Lost(TransportError),
    Rediscovery,
}

/// Connection lifecycle for one upstream source
pub struct UpstreamWorker {
    server: ServerDescriptor,
    scope: Scope,
    sensors: Vec<SensorDescriptor>,
    ctx: WorkerContext,
    state: watch::Sender<WorkerState>,
}

impl UpstreamWorker {
    pub fn new(
        server: ServerDescriptor,
        sensors: Vec<SensorDescriptor>,
        ctx: WorkerContext,
    ) -> Self {
        let (state, _) = watch::channel(WorkerState::Disconnected);
        UpstreamWorker {
            scope: Scope::Unit(server.unit_id.clone()),
            server,
            sensors,
            ctx,
            state,
        }
    }

    pub fn unit_id(&self) -> &str {
        &self.server.unit_id
    }

    pub fn state(&self) -> watch::Receiver<WorkerState> {
        self.state.subscribe()
    }

    /// Flat, de-duplicated list of every channel the sensors map from
    pub fn subscription_channels(&self) -> Vec<String> {
        self.sensors
            .iter()
            .flat_map(|s| s.channels())
            .unique()
            .map(str::to_string)
            .collect()
    }

    /// Runs until the stop signal is raised; never returns an error
    pub async fn run(mut self) {
        let (sink, notifications) = flume::bounded(self.ctx.timing.dispatch_capacity);
        let dispatcher = tokio::spawn(dispatch_notifications(
            notifications,
            self.ctx.router.clone(),
            self.scope.clone(),
            self.ctx.timing.max_in_flight,
        ));

        while !self.stop_requested() {
            self.set_state(WorkerState::Connecting);
            let end = match self.connect().await {
                Ok(mut session) => {
                    self.set_state(WorkerState::Subscribed);
                    self.subscribe(session.as_mut(), &sink).await;
                    let end = self.watch_session(session.as_mut()).await;
                    session.disconnect().await;
                    Some(end)
                }
                Err(e) => {
                    log::warn!("[{}] {e}", self.server.unit_id);
                    None
                }
            };
            self.set_state(WorkerState::Disconnected);

            match end {
                Some(SessionEnd::Stopped) => break,
                Some(SessionEnd::Rediscovery) => {
                    log::info!("[{}] Reconnecting for rediscovery", self.server.unit_id);
                    continue;
                }
                Some(SessionEnd::Lost(e)) => {
                    log::warn!("[{}] {e}", self.server.unit_id);
                }
                None => {}
            }
            if !self.pause(self.ctx.timing.reconnect_delay).await {
                break;
            }
        }

        self.set_state(WorkerState::Stopped);
        drop(sink);
        if let Err(e) = dispatcher.await {
            log::warn!("[{}] Notification dispatch failed: {e}", self.server.unit_id);
        }
        log::info!("[{}] Worker stopped", self.server.unit_id);
    }

    async fn connect(&self) -> Result<Box<dyn UpstreamSession>, TransportError> {
        log::info!(
            "[{}] Connecting to {}",
            self.server.unit_id,
            self.server.endpoint
        );
        let identity = self.ctx.identity.get();
        match timeout(
            self.ctx.timing.connect_timeout,
            self.ctx.transport.connect(&self.server, identity),
        )
        .await
        {
            Ok(res) => res,
            Err(_) => Err(TransportError::Timeout(self.server.endpoint.clone())),
        }
    }

    async fn subscribe(
        &self,
        session: &mut dyn UpstreamSession,
        sink: &flume::Sender<DataChange>,
    ) {
        let channels = self.subscription_channels();
        match session
            .subscribe(&channels, self.ctx.timing.sampling_interval, sink.clone())
            .await
        {
            Ok(accepted) => log::info!(
                "[{}] Subscribed to {accepted} of {} channel(s)",
                self.server.unit_id,
                channels.len()
            ),
            // The session stays up without data
            Err(e) => log::warn!("[{}] {e}", self.server.unit_id),
        }
    }

    async fn watch_session(&mut self, session: &mut dyn UpstreamSession) -> SessionEnd {
        let rediscover_at = Instant::now() + self.ctx.timing.rediscovery_interval;
        loop {
            if !self.pause(self.ctx.timing.liveness_interval).await {
                return SessionEnd::Stopped;
            }
            if let Err(e) = session.check_connection().await {
                return SessionEnd::Lost(e);
            }
            if Instant::now() >= rediscover_at {
                return SessionEnd::Rediscovery;
            }
        }
    }

    /// Sleeps for `duration`, returning false as soon as a stop is requested
    async fn pause(&mut self, duration: Duration) -> bool {
        let stop_dropped = tokio::select! {
            _ = tokio::time::sleep(duration) => false,
            changed = self.ctx.stop.changed() => changed.is_err(),
        };
        !stop_dropped && !self.stop_requested()
    }

    fn stop_requested(&self) -> bool {
        *self.ctx.stop.borrow()
    }

    fn set_state(&self, state: WorkerState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            log::debug!("[{}] {previous} -> {state}", self.server.unit_id);
        }
    }
}
