use std::time::Duration;

pub const LOG_LEVEL: &str = "INFO";

pub const CONFIG_DIR: &str = "config";
pub const ENVIRONMENT_CONFIG_FILE: &str = "env_config.json";
pub const FEEDING_CONFIG_FILE: &str = "feeding_config.json";
pub const BRIDGE_CONFIG_FILE: &str = "bridge_config.json";

pub const NAMESPACE_URI: &str = "http://aquacloud.iothub.thinkbox.no";
pub const EU_NAMESPACE_URI: &str = "http://www.opcfoundation.org/UA/units/un/cefact";
pub const TYPE_DEFINITION_PREFIX: &str = "AquaCloud";

pub const POLL_INTERVAL: Duration = Duration::from_secs(3);

pub const SAMPLING_INTERVAL: Duration = Duration::from_millis(500);
pub const LIVENESS_INTERVAL: Duration = Duration::from_secs(5);
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);
pub const REDISCOVERY_INTERVAL: Duration = Duration::from_secs(60 * 60);
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub const DISPATCH_CAPACITY: usize = 1024;
pub const DISPATCH_MAX_IN_FLIGHT: usize = 16;

pub const STOP_GRACE_PERIOD: Duration = Duration::from_secs(10);

pub const MQTT_PORT: u16 = 1883;
pub const MQTT_KEEP_ALIVE: Duration = Duration::from_secs(30);
