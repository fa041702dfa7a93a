use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use itertools::Itertools;
use rand::Rng;

use crate::address_space::AddressSpace;
use crate::helpers::{self, base_path};
use crate::mapping::{CompiledConfig, SourceKey, LOCAL_TIMESTAMP_CHANNEL};
use crate::router::{Router, Sample};

use super::{Driver, DriverContext, DriverCore, DriverKind};

/// Generates random values for every configured channel
pub struct SimulationDriver {
    kind: DriverKind,
    core: DriverCore,
    poll_interval: Duration,
}

impl SimulationDriver {
    pub fn new(
        kind: DriverKind,
        config_path: impl Into<PathBuf>,
        address_space: Arc<dyn AddressSpace>,
    ) -> Self {
        SimulationDriver {
            kind,
            core: DriverCore::new(config_path, address_space),
            poll_interval: base_path::poll_interval(),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// One simulation pass: a uniform `[0, 100)` value per channel, then the
/// local time on the sensor's timestamp channel. Each value goes to the
/// sensor's own source key. Returns the number of target writes.
pub fn poll_once(compiled: &CompiledConfig, router: &Router) -> usize {
    let mut rng = rand::thread_rng();
    let local_time = helpers::now_local();
    let mut written = 0;
    for unit in &compiled.units {
        for sensor in &unit.sensors {
            for channel in sensor.channels().unique() {
                let key = SourceKey::new(&unit.scope, channel, &sensor.display_name);
                let value = Sample::Number(rng.gen_range(0.0..100.0));
                written += router.route_key(&key, value, &local_time).targets_written;
            }
            let key = SourceKey::new(&unit.scope, LOCAL_TIMESTAMP_CHANNEL, &sensor.display_name);
            written += router
                .route_key(&key, Sample::Text(local_time.clone()), &local_time)
                .targets_written;
        }
    }
    written
}

async fn simulate(mut ctx: DriverContext, poll_interval: Duration) {
    log::info!(
        "Simulating {} sensor(s) every {poll_interval:?}",
        ctx.compiled.sensor_count()
    );
    while !ctx.stop_requested() {
        let written = poll_once(&ctx.compiled, &ctx.router);
        log::debug!("Simulation pass wrote {written} value(s)");
        tokio::select! {
            _ = tokio::time::sleep(poll_interval) => {}
            changed = ctx.stop.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    log::info!("Simulation stopped");
}

impl Driver for SimulationDriver {
    fn kind(&self) -> DriverKind {
        self.kind
    }

    fn core(&self) -> &DriverCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut DriverCore {
        &mut self.core
    }

    fn subscribe(&mut self, ctx: DriverContext) -> BoxFuture<'static, ()> {
        Box::pin(simulate(ctx, self.poll_interval))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address_space::{MemoryAddressSpace, Value};
    use std::io::Write;

    #[tokio::test]
    async fn test_simulation_writes_and_stops() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"sensors": [{{"unit_id": "u1", "sensor_type": "OxygenSaturationSensorType", "depth": 5,
                "mapping": {{"OxygenSaturation": "u1_o2"}}}}]}}"#
        )
        .unwrap();

        let space = Arc::new(MemoryAddressSpace::new("urn:test"));
        let mut driver =
            SimulationDriver::new(DriverKind::Environment, file.path(), space.clone())
                .with_poll_interval(Duration::from_millis(20));
        driver.start().await.unwrap();
        assert!(driver.is_running());
        tokio::time::sleep(Duration::from_millis(60)).await;
        driver.stop().await;
        assert!(!driver.is_running());

        let node = space
            .get_node("Unit|u1|Sensor|OxygenSaturation_5m.OxygenSaturation")
            .unwrap();
        let value = space.read_value(&node).and_then(|v| v.as_f64()).unwrap();
        assert!((0.0..100.0).contains(&value));
        let stamp = space
            .get_node("Unit|u1|Sensor|OxygenSaturation_5m.LocalTimestamp")
            .unwrap();
        assert!(matches!(space.read_value(&stamp), Some(Value::String(_))));
    }

    #[test]
    fn test_one_timestamp_write_per_sensor() {
        use crate::materialize::Materializer;
        use crate::templates::TemplateCatalog;

        let config = crate::config::from_str(
            r#"{"key_match": "exact", "sensors": [
                {"unit_id": "u1", "sensor_type": "TemperatureSensorType", "depth": 1, "mapping": {"Temperature": "t1"}},
                {"unit_id": "u1", "sensor_type": "TemperatureSensorType", "depth": 2, "mapping": {"Temperature": "t2"}},
                {"unit_id": "u1", "sensor_type": "SeaCurrentSensorType", "mapping": {"Speed": "c", "Direction": "c"}}
            ]}"#,
        )
        .unwrap();
        let compiled = Arc::new(crate::mapping::compile(&config));
        let space = Arc::new(MemoryAddressSpace::new("urn:test"));
        Materializer::new(space.as_ref(), &TemplateCatalog::standard())
            .materialize_all(&compiled.units);
        let router = Router::new(space, compiled.clone());

        // four measurement targets plus one LocalTimestamp target per sensor
        assert_eq!(poll_once(&compiled, &router), 4 + 3);
    }
}
