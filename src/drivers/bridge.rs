use std::path::PathBuf;
use std::sync::Arc;

use futures::future::{join_all, BoxFuture};
use tokio::sync::watch;

use crate::address_space::AddressSpace;
use crate::upstream::{
    IdentityStore, MqttTransport, UpstreamTransport, UpstreamWorker, WorkerContext, WorkerState,
    WorkerTiming,
};

use super::{Driver, DriverContext, DriverCore, DriverKind};

/// Runs one upstream worker per configured server
pub struct BridgeDriver {
    core: DriverCore,
    transport: Arc<dyn UpstreamTransport>,
    identity: Arc<IdentityStore>,
    timing: WorkerTiming,
    worker_states: Vec<(String, watch::Receiver<WorkerState>)>,
}

impl BridgeDriver {
    pub fn new(config_path: impl Into<PathBuf>, address_space: Arc<dyn AddressSpace>) -> Self {
        BridgeDriver {
            core: DriverCore::new(config_path, address_space),
            transport: Arc::new(MqttTransport::new()),
            identity: Arc::new(IdentityStore::new()),
            timing: WorkerTiming::default(),
            worker_states: Vec::new(),
        }
    }

    pub fn with_transport(mut self, transport: Arc<dyn UpstreamTransport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_timing(mut self, timing: WorkerTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Current state of every worker, by unit id
    pub fn worker_states(&self) -> Vec<(String, WorkerState)> {
        self.worker_states
            .iter()
            .map(|(unit_id, state)| (unit_id.clone(), *state.borrow()))
            .collect()
    }
}

impl Driver for BridgeDriver {
    fn kind(&self) -> DriverKind {
        DriverKind::Bridge
    }

    fn core(&self) -> &DriverCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut DriverCore {
        &mut self.core
    }

    fn subscribe(&mut self, ctx: DriverContext) -> BoxFuture<'static, ()> {
        self.worker_states.clear();
        let mut handles = Vec::new();
        for server in &ctx.compiled.servers {
            let sensors = ctx
                .compiled
                .unit(&server.unit_id)
                .map(|unit| unit.sensors.clone())
                .unwrap_or_default();
            let worker = UpstreamWorker::new(
                server.clone(),
                sensors,
                WorkerContext {
                    transport: self.transport.clone(),
                    identity: self.identity.clone(),
                    router: ctx.router.clone(),
                    timing: self.timing.clone(),
                    stop: ctx.stop.clone(),
                },
            );
            self.worker_states
                .push((worker.unit_id().to_string(), worker.state()));
            handles.push(tokio::spawn(worker.run()));
        }
        log::info!("Launched {} upstream worker(s)", handles.len());

        Box::pin(async move {
            for res in join_all(handles).await {
                if let Err(e) = res {
                    log::warn!("Upstream worker failed: {e}");
                }
            }
        })
    }
}
