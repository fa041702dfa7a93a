use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use crate::address_space::{AddressSpace, MemoryAddressSpace};
use crate::drivers::{BridgeDriver, Driver, DriverKind, SimulationDriver};
use crate::helpers::base_path;

/// Starts the driver, then runs until Ctrl-C
pub async fn run_driver(kind: DriverKind, config_path: Option<PathBuf>) -> Result<()> {
    let config_path =
        config_path.unwrap_or_else(|| base_path::config_file(kind.config_file_name()));
    let space: Arc<dyn AddressSpace> =
        Arc::new(MemoryAddressSpace::new(base_path::namespace_uri()));
    log::info!(
        "Using config {} and namespace {}",
        config_path.display(),
        space.namespace_uri()
    );

    let mut driver: Box<dyn Driver> = match kind {
        DriverKind::Environment | DriverKind::Feeding => {
            Box::new(SimulationDriver::new(kind, config_path, space))
        }
        DriverKind::Bridge => Box::new(BridgeDriver::new(config_path, space)),
    };
    driver.start().await?;

    tokio::signal::ctrl_c().await?;
    log::info!("Received Ctrl-C");
    driver.stop().await;
    Ok(())
}
