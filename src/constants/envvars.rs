pub const LOGGING_LEVEL: &str = "LOGGING_LEVEL";

pub const CONFIG_DIR: &str = "AB_CONFIG_DIR";
pub const NAMESPACE_URI: &str = "AB_NAMESPACE_URI";
pub const TIME_INTERVAL: &str = "TIME_INTERVAL";
