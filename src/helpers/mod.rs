mod load_dotenv;
mod time;

pub use load_dotenv::load_dotenv;
pub use time::{format_local, now_local, LOCAL_TIMESTAMP_FORMAT};

pub mod base_path;
