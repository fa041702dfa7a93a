//! Driver variants and their shared start/stop lifecycle
//!
//! A driver owns one configuration file. `start` compiles it, materializes
//! the node tree and launches the variant's continuous body returned by
//! [`Driver::subscribe`]; `stop` raises the stop signal and waits for that
//! body to wind down.
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::address_space::AddressSpace;
use crate::config;
use crate::constants::defaults;
use crate::mapping::{compile, CompiledConfig};
use crate::materialize::{MaterializeReport, Materializer};
use crate::router::Router;
use crate::templates::TemplateCatalog;

mod bridge;
mod simulation;

pub use bridge::BridgeDriver;
pub use simulation::{poll_once, SimulationDriver};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverKind {
    /// Simulated water-quality sensors
    Environment,
    /// Simulated feeding sensors
    Feeding,
    /// Live upstream sources
    Bridge,
}

impl DriverKind {
    pub fn config_file_name(&self) -> &'static str {
        match self {
            DriverKind::Environment => defaults::ENVIRONMENT_CONFIG_FILE,
            DriverKind::Feeding => defaults::FEEDING_CONFIG_FILE,
            DriverKind::Bridge => defaults::BRIDGE_CONFIG_FILE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DriverKind::Environment => "environment",
            DriverKind::Feeding => "feeding",
            DriverKind::Bridge => "bridge",
        }
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown driver '{0}'")]
pub struct UnknownDriver(String);

impl FromStr for DriverKind {
    type Err = UnknownDriver;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "environment" => Ok(DriverKind::Environment),
            "feeding" => Ok(DriverKind::Feeding),
            "bridge" => Ok(DriverKind::Bridge),
            other => Err(UnknownDriver(other.to_string())),
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DriverError {
    #[error("driver is already running")]
    AlreadyRunning,
}

/// Owned state handed to a driver's continuous body
#[derive(Clone)]
pub struct DriverContext {
    pub address_space: Arc<dyn AddressSpace>,
    pub catalog: Arc<TemplateCatalog>,
    pub compiled: Arc<CompiledConfig>,
    pub router: Arc<Router>,
    pub stop: watch::Receiver<bool>,
}

impl DriverContext {
    pub fn stop_requested(&self) -> bool {
        *self.stop.borrow()
    }
}

/// State shared by every driver variant
pub struct DriverCore {
    config_path: PathBuf,
    address_space: Arc<dyn AddressSpace>,
    catalog: Arc<TemplateCatalog>,
    compiled: Arc<CompiledConfig>,
    stop_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
    running: bool,
    report: Option<MaterializeReport>,
}

impl DriverCore {
    pub fn new(config_path: impl Into<PathBuf>, address_space: Arc<dyn AddressSpace>) -> Self {
        let (stop_tx, _) = watch::channel(false);
        DriverCore {
            config_path: config_path.into(),
            address_space,
            catalog: Arc::new(TemplateCatalog::standard()),
            compiled: Arc::new(CompiledConfig::default()),
            stop_tx,
            tasks: Vec::new(),
            running: false,
            report: None,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn compiled(&self) -> &CompiledConfig {
        &self.compiled
    }

    /// Report of the last materialization, if `start` ran
    pub fn materialize_report(&self) -> Option<&MaterializeReport> {
        self.report.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Rebuilds the compiled configuration from the config file
    pub fn parse_config(&mut self) {
        let config = config::load_or_empty(&self.config_path);
        self.compiled = Arc::new(compile(&config));
    }

    pub fn materialize(&mut self) -> &MaterializeReport {
        let report = Materializer::new(self.address_space.as_ref(), &self.catalog)
            .materialize_all(&self.compiled.units);
        if !report.is_complete() {
            log::warn!(
                "{} node(s) could not be created, see earlier warnings",
                report.failures.len()
            );
        }
        self.report.insert(report)
    }

    pub fn context(&self) -> DriverContext {
        DriverContext {
            address_space: self.address_space.clone(),
            catalog: self.catalog.clone(),
            compiled: self.compiled.clone(),
            router: Arc::new(Router::new(
                self.address_space.clone(),
                self.compiled.clone(),
            )),
            stop: self.stop_tx.subscribe(),
        }
    }

    fn launch(&mut self, body: BoxFuture<'static, ()>) {
        self.tasks.push(tokio::spawn(body));
        self.running = true;
    }

    fn arm(&mut self) {
        self.stop_tx.send_replace(false);
    }

    /// Raises the stop signal and waits for every task, aborting stragglers
    pub async fn shutdown(&mut self) {
        if !self.running {
            return;
        }
        self.stop_tx.send_replace(true);
        for task in self.tasks.drain(..) {
            let abort = task.abort_handle();
            match tokio::time::timeout(defaults::STOP_GRACE_PERIOD, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => log::warn!("Driver task failed: {e}"),
                Err(_) => {
                    log::warn!("Driver task did not stop in time, aborting");
                    abort.abort();
                }
            }
        }
        self.running = false;
    }
}

#[async_trait]
pub trait Driver: Send {
    fn kind(&self) -> DriverKind;

    fn core(&self) -> &DriverCore;

    fn core_mut(&mut self) -> &mut DriverCore;

    fn parse_config(&mut self) {
        self.core_mut().parse_config();
    }

    /// Continuous body of the driver, run until the context's stop signal
    fn subscribe(&mut self, ctx: DriverContext) -> BoxFuture<'static, ()>;

    async fn start(&mut self) -> Result<(), DriverError> {
        if self.is_running() {
            return Err(DriverError::AlreadyRunning);
        }
        log::info!("Starting {} driver", self.kind());
        self.parse_config();
        self.core_mut().materialize();
        self.core_mut().arm();
        let ctx = self.core().context();
        let body = self.subscribe(ctx);
        self.core_mut().launch(body);
        Ok(())
    }

    async fn stop(&mut self) {
        log::info!("Stopping {} driver", self.kind());
        self.core_mut().shutdown().await;
    }

    fn is_running(&self) -> bool {
        self.core().is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_kind() {
        assert_eq!("bridge".parse::<DriverKind>(), Ok(DriverKind::Bridge));
        assert_eq!(
            "feeding".parse::<DriverKind>().unwrap().config_file_name(),
            "feeding_config.json"
        );
        assert_eq!(
            "sonar".parse::<DriverKind>(),
            Err(UnknownDriver("sonar".into()))
        );
        assert_eq!(DriverKind::Environment.to_string(), "environment");
    }
}
